use crate::irq::IrqGuard;
use crate::registry::{MutexId, MutexInfo, MutexRegistry, global_registry};
use crate::{Blocking, SpinLock, WaitQueue};
use core::sync::atomic::{AtomicBool, Ordering};
use log::trace;

/// Recursion limit of mutexes created as recursive.
pub const MAX_RECURSION_DEPTH: u32 = 0xFF;

/// Sleeping mutual-exclusion lock with an owning thread.
///
/// States:
///
/// * *unheld*: no owner, depth 0;
/// * *held*: owner set, depth 1;
/// * *held recursively*: owner set, depth > 1. Only reachable when the
///   maximum depth is greater than one.
///
/// Contending threads sleep on a FIFO queue. A release hands ownership
/// directly to the head of the queue, so the woken thread already owns the
/// mutex when it runs.
///
/// Re-acquiring beyond the configured depth, and releasing from a thread
/// that is not the owner, are usage faults and panic.
///
/// Every mutex is listed in a [`MutexRegistry`] from creation until
/// [`destroy`](RecursiveMutex::destroy) (or drop).
pub struct RecursiveMutex<B: Blocking> {
    id: MutexId,
    max_depth: u32,
    blocking: B,
    registry: &'static MutexRegistry,
    linked: AtomicBool,
    state: SpinLock<MutexState<B::Thread>>,
}

struct MutexState<T> {
    owner: Option<T>,
    depth: u32,
    waiting: WaitQueue<T>,
}

impl<B: Blocking> RecursiveMutex<B> {
    /// Creates a mutex and lists it in the [global registry](global_registry).
    ///
    /// A recursive mutex may be re-acquired by its owner up to
    /// [`MAX_RECURSION_DEPTH`] times.
    #[must_use]
    pub fn new(blocking: B, recursive: bool) -> Self {
        let max_depth = if recursive { MAX_RECURSION_DEPTH } else { 1 };
        Self::with_max_depth(blocking, max_depth, global_registry())
    }

    /// Creates a mutex with an explicit recursion limit in `registry`.
    ///
    /// # Panics
    /// If `max_depth` is zero.
    #[must_use]
    pub fn with_max_depth(blocking: B, max_depth: u32, registry: &'static MutexRegistry) -> Self {
        assert!(max_depth >= 1, "mutex depth limit must be at least 1");

        let id = MutexId::next();
        {
            let _irq = IrqGuard::new(&blocking);
            registry.register(MutexInfo { id, max_depth });
        }
        trace!("{id} created, max depth {max_depth}");

        Self {
            id,
            max_depth,
            blocking,
            registry,
            linked: AtomicBool::new(true),
            state: SpinLock::new(MutexState {
                owner: None,
                depth: 0,
                waiting: WaitQueue::new(),
            }),
        }
    }

    fn current(&self) -> B::Thread {
        let Some(current) = self.blocking.current_thread() else {
            panic!("{} used without a current thread", self.id);
        };
        current
    }

    /// Acquires the mutex, sleeping while another thread owns it.
    ///
    /// # Panics
    /// If the caller already owns the mutex at its maximum depth, or if there
    /// is no current thread.
    pub fn acquire(&self) {
        let current = self.current();

        let _irq = IrqGuard::new(&self.blocking);
        let mut state = self.state.lock();

        if state.owner.as_ref() == Some(&current) {
            assert!(
                state.depth < self.max_depth,
                "{} re-acquired beyond its maximum depth of {}",
                self.id,
                self.max_depth
            );
            state.depth += 1;
            return;
        }

        if state.owner.is_none() {
            state.owner = Some(current.clone());
            state.depth = 1;
        }

        // Ownership is handed over by `release`; re-check after every wakeup.
        while state.owner.as_ref() != Some(&current) {
            if !state.waiting.contains(&current) {
                state.waiting.push(current.clone());
            }
            self.blocking.take_block_lock();
            drop(state);

            self.blocking.block();

            state = self.state.lock();
        }
    }

    /// Releases one level of ownership.
    ///
    /// The last release hands the mutex to the longest-waiting thread, or
    /// leaves it unheld.
    ///
    /// # Panics
    /// If the caller does not own the mutex.
    pub fn release(&self) {
        let current = self.current();
        let mut state = self.state.lock_irq(&self.blocking);

        assert!(
            state.owner.as_ref() == Some(&current),
            "{} released by a thread that does not own it",
            self.id
        );

        if state.depth > 1 {
            state.depth -= 1;
            return;
        }

        if let Some(next) = state.waiting.pop() {
            state.owner = Some(next.clone());
            state.depth = 1;
            self.blocking.unblock(next);
        } else {
            state.owner = None;
            state.depth = 0;
        }
    }

    /// Acquires the mutex and releases it when the guard drops.
    pub fn lock(&self) -> RecursiveMutexGuard<'_, B> {
        self.acquire();
        RecursiveMutexGuard { mutex: self }
    }

    /// Removes the mutex from its registry. The memory stays with the caller.
    ///
    /// # Panics
    /// If the mutex is held or was already destroyed.
    pub fn destroy(&self) {
        assert!(self.owner().is_none(), "{} destroyed while held", self.id);
        assert!(
            self.linked.swap(false, Ordering::AcqRel),
            "{} destroyed twice",
            self.id
        );
        self.unlink();
    }

    fn unlink(&self) {
        let _irq = IrqGuard::new(&self.blocking);
        let removed = self.registry.unregister(self.id);
        debug_assert!(removed, "{} missing from its registry", self.id);
        trace!("{} destroyed", self.id);
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> MutexId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline]
    #[must_use]
    pub const fn is_recursive(&self) -> bool {
        self.max_depth > 1
    }

    /// The owning thread, if any.
    #[must_use]
    pub fn owner(&self) -> Option<B::Thread> {
        self.state.lock_irq(&self.blocking).owner.clone()
    }

    /// Current recursion depth; zero while unheld.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.state.lock_irq(&self.blocking).depth
    }

    /// Number of threads sleeping on the mutex.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.state.lock_irq(&self.blocking).waiting.len()
    }
}

impl<B: Blocking> Drop for RecursiveMutex<B> {
    fn drop(&mut self) {
        if self.linked.swap(false, Ordering::AcqRel) {
            self.unlink();
        }
    }
}

/// Releases one level of a [`RecursiveMutex`] on drop.
#[must_use = "the mutex is released as soon as the guard is dropped"]
pub struct RecursiveMutexGuard<'a, B: Blocking> {
    mutex: &'a RecursiveMutex<B>,
}

impl<B: Blocking> Drop for RecursiveMutexGuard<'_, B> {
    fn drop(&mut self) {
        self.mutex.release();
    }
}
