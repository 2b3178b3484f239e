//! Process-wide registry of live mutexes, kept for introspection.

use crate::{SpinLock, SyncOnceCell};
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Identity of a registered mutex.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MutexId(u64);

impl MutexId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MutexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mutex#{}", self.0)
    }
}

/// What the registry knows about a mutex without touching the mutex itself.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MutexInfo {
    pub id: MutexId,
    pub max_depth: u32,
}

impl MutexInfo {
    #[inline]
    #[must_use]
    pub const fn is_recursive(&self) -> bool {
        self.max_depth > 1
    }
}

/// Collection of every live mutex.
///
/// The registry never owns a mutex: it records identities only, so a mutex
/// may live anywhere its creator chooses. Entries are added on creation and
/// removed on destruction, both under the registry's own lock.
pub struct MutexRegistry {
    entries: SpinLock<Vec<MutexInfo>>,
}

impl Default for MutexRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MutexRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: SpinLock::new(Vec::new()),
        }
    }

    pub(crate) fn register(&self, info: MutexInfo) {
        self.entries.with_lock(|entries| entries.push(info));
    }

    /// Returns `false` if `id` was not registered.
    pub(crate) fn unregister(&self, id: MutexId) -> bool {
        self.entries.with_lock(|entries| {
            entries
                .iter()
                .position(|info| info.id == id)
                .map(|index| entries.swap_remove(index))
                .is_some()
        })
    }

    #[must_use]
    pub fn contains(&self, id: MutexId) -> bool {
        self.entries
            .with_lock(|entries| entries.iter().any(|info| info.id == id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.with_lock(|entries| entries.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the current entries out of the registry.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MutexInfo> {
        self.entries.with_lock(|entries| entries.clone())
    }
}

static GLOBAL: SyncOnceCell<MutexRegistry> = SyncOnceCell::new();

/// The registry all mutexes created via
/// [`RecursiveMutex::new`](crate::RecursiveMutex::new) join.
///
/// Created on first use and never torn down.
#[must_use]
pub fn global_registry() -> &'static MutexRegistry {
    GLOBAL.get_or_init(MutexRegistry::new)
}
