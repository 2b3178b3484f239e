use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::AtomicBool;
use kernel_sync::{Interrupts, SpinLock};

/// Process identifier. Also handed to user code as the process handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Pid(u64);

impl Pid {
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid {}", self.0)
    }
}

/// A process as seen by the lifecycle code.
pub struct Process {
    id: Pid,
    name: String,
    parent: SpinLock<Weak<Process>>,
    pub(crate) children: SpinLock<VecDeque<Arc<Process>>>,
    /// Set while the process is being moved between two child collections.
    pub(crate) in_transit: AtomicBool,
    termination_status: SpinLock<Option<u32>>,
    frame_mappings: SpinLock<Vec<u64>>,
}

impl Process {
    /// Creates a process with no parent and no children.
    ///
    /// Every process except the system process is linked to a parent right
    /// after creation (see [`lifecycle::link_child`](crate::lifecycle::link_child)).
    #[must_use]
    pub fn new(id: Pid, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id,
            name: name.into(),
            parent: SpinLock::new(Weak::new()),
            children: SpinLock::new(VecDeque::new()),
            in_transit: AtomicBool::new(false),
            termination_status: SpinLock::new(None),
            frame_mappings: SpinLock::new(Vec::new()),
        })
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> Pid {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent, if one is set and still alive.
    #[must_use]
    pub fn parent<I: Interrupts + ?Sized>(&self, irq: &I) -> Option<Arc<Self>> {
        self.parent.lock_irq(irq).upgrade()
    }

    #[must_use]
    pub fn parent_id<I: Interrupts + ?Sized>(&self, irq: &I) -> Option<Pid> {
        self.parent(irq).map(|p| p.id)
    }

    pub(crate) fn set_parent<I: Interrupts + ?Sized>(&self, parent: &Arc<Self>, irq: &I) {
        *self.parent.lock_irq(irq) = Arc::downgrade(parent);
    }

    /// Identifiers of the current children, in link order.
    #[must_use]
    pub fn children<I: Interrupts + ?Sized>(&self, irq: &I) -> Vec<Pid> {
        self.children.lock_irq(irq).iter().map(|c| c.id).collect()
    }

    /// Looks up a direct child by identifier.
    #[must_use]
    pub fn child<I: Interrupts + ?Sized>(&self, id: Pid, irq: &I) -> Option<Arc<Self>> {
        self.children
            .lock_irq(irq)
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// The exit status, once the process has exited.
    #[must_use]
    pub fn termination_status<I: Interrupts + ?Sized>(&self, irq: &I) -> Option<u32> {
        *self.termination_status.lock_irq(irq)
    }

    pub(crate) fn set_termination_status<I: Interrupts + ?Sized>(&self, status: u32, irq: &I) {
        *self.termination_status.lock_irq(irq) = Some(status);
    }

    /// Records a user page backed by a frame, for the timer-tick inspection.
    pub fn track_frame_mapping<I: Interrupts + ?Sized>(&self, virtual_address: u64, irq: &I) {
        let mut mappings = self.frame_mappings.lock_irq(irq);
        if !mappings.contains(&virtual_address) {
            mappings.push(virtual_address);
        }
    }

    /// Calls `f` for every tracked mapping while holding the mapping lock.
    pub fn for_each_frame_mapping<I: Interrupts + ?Sized>(&self, irq: &I, mut f: impl FnMut(u64)) {
        for &va in self.frame_mappings.lock_irq(irq).iter() {
            f(va);
        }
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
