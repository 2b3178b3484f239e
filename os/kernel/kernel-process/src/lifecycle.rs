//! Parent/child relinking.
//!
//! Lock discipline: each step takes exactly one child-collection lock (or
//! one parent-reference lock) and releases it before the next is taken. A
//! child moved between two collections is therefore briefly in neither;
//! it is marked in transit for that window so a concurrent detach waits
//! for it instead of missing it. No two unrelated locks are ever nested,
//! so no global lock order is needed and a process may move children into
//! its own collection.

use crate::Process;
use alloc::sync::Arc;
use core::hint::spin_loop;
use core::sync::atomic::Ordering;
use kernel_sync::Interrupts;
use log::debug;

/// Outcome of [`exit`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ExitReport {
    /// Whether the process was removed from a parent's child collection.
    pub detached: bool,
    /// Number of children handed to the system process.
    pub reparented: usize,
}

/// Appends `child` to `parent`'s children and points `child` at `parent`.
pub fn link_child<I: Interrupts + ?Sized>(parent: &Arc<Process>, child: &Arc<Process>, irq: &I) {
    parent.children.lock_irq(irq).push_back(Arc::clone(child));
    child.set_parent(parent, irq);
    debug!("{} linked as child of {}", child.id(), parent.id());
}

/// Removes `process` from its parent's child collection, if it has a parent.
///
/// Returns whether it was found there. A process that is being moved to
/// another collection by [`reparent_children`] is waited for and removed
/// from its new parent.
#[must_use]
pub fn detach_from_parent<I: Interrupts + ?Sized>(process: &Process, irq: &I) -> bool {
    loop {
        let Some(parent) = process.parent(irq) else {
            return false;
        };

        {
            let mut siblings = parent.children.lock_irq(irq);
            if let Some(index) = siblings.iter().position(|c| c.id() == process.id()) {
                siblings.remove(index);
                return true;
            }
        }

        // Not found: either the process was never linked, or it was popped
        // from `parent` and is not yet in its new collection.
        let moving = process.in_transit.load(Ordering::Acquire);
        let unchanged = process
            .parent(irq)
            .is_some_and(|current| Arc::ptr_eq(&current, &parent));
        if !moving && unchanged {
            return false;
        }
        spin_loop();
    }
}

/// Moves every child of `process` into `system`'s child collection.
///
/// Each move removes one child under the source lock and marks it in
/// transit, points it at `system`, then appends it under the destination
/// lock and clears the mark. The number of moves is fixed up front, so
/// reparenting the system process's own children terminates and leaves its
/// collection unchanged as a set.
#[must_use]
pub fn reparent_children<I: Interrupts + ?Sized>(
    process: &Process,
    system: &Arc<Process>,
    irq: &I,
) -> usize {
    let pending = process.children.lock_irq(irq).len();

    let mut moved = 0;
    for _ in 0..pending {
        let child = {
            let mut children = process.children.lock_irq(irq);
            let Some(child) = children.pop_front() else {
                break;
            };
            child.in_transit.store(true, Ordering::Release);
            child
        };

        child.set_parent(system, irq);

        {
            let mut adopted = system.children.lock_irq(irq);
            adopted.push_back(Arc::clone(&child));
            child.in_transit.store(false, Ordering::Release);
        }
        moved += 1;
    }

    if moved > 0 {
        debug!("{} handed {moved} children to {}", process.id(), system.id());
    }
    moved
}

/// Runs the exit bookkeeping of `process`.
///
/// Records `status`, detaches the process from its parent and hands its
/// children to `system`. Terminating the process itself is left to the
/// caller.
#[must_use]
pub fn exit<I: Interrupts + ?Sized>(
    process: &Arc<Process>,
    status: u32,
    system: &Arc<Process>,
    irq: &I,
) -> ExitReport {
    process.set_termination_status(status, irq);
    let detached = detach_from_parent(process, irq);
    let reparented = reparent_children(process, system, irq);

    debug!(
        "{} ({}) exited with status {status:#x}",
        process.id(),
        process.name()
    );

    ExitReport {
        detached,
        reparented,
    }
}

