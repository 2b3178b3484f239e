//! # Host-side kernel interfaces
//!
//! Runs the kernel's sleeping primitives on ordinary OS threads:
//!
//! * [`HostInterrupts`] keeps one interrupt flag per OS thread.
//! * [`HostBlocking`] parks OS threads on a condition variable. A wakeup
//!   that arrives before the thread parks is remembered, so the block/unblock
//!   handshake behaves like a real scheduler's block lock.
//!
//! [`HostBlocking::block`] panics unless
//! [`take_block_lock`](Blocking::take_block_lock) was called first, which
//! lets tests catch primitives that sleep without the handoff.

use kernel_sync::{Blocking, Interrupts};
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

thread_local! {
    static INTERRUPTS_ENABLED: Cell<bool> = const { Cell::new(true) };
    static BLOCK_LOCK_TAKEN: Cell<bool> = const { Cell::new(false) };
    static CURRENT: HostThread = HostThread::register();
}

/// Per-OS-thread interrupt flag. Enabled by default.
#[derive(Debug, Default, Copy, Clone)]
pub struct HostInterrupts;

impl Interrupts for HostInterrupts {
    fn are_enabled(&self) -> bool {
        INTERRUPTS_ENABLED.with(Cell::get)
    }

    fn enable(&self) {
        INTERRUPTS_ENABLED.with(|f| f.set(true));
    }

    fn disable(&self) {
        INTERRUPTS_ENABLED.with(|f| f.set(false));
    }
}

/// An OS thread as seen by the sleeping primitives.
#[derive(Clone)]
pub struct HostThread {
    id: u64,
    parker: Arc<Parker>,
}

impl HostThread {
    fn register() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT.fetch_add(1, Ordering::Relaxed),
            parker: Arc::new(Parker::default()),
        }
    }

    /// The calling OS thread.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.with(Clone::clone)
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for HostThread {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HostThread {}

impl fmt::Debug for HostThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostThread({})", self.id)
    }
}

#[derive(Default)]
struct Parker {
    permit: Mutex<bool>,
    wake: Condvar,
}

impl Parker {
    fn park(&self) {
        let mut permit = self.permit.lock().unwrap_or_else(PoisonError::into_inner);
        while !*permit {
            permit = self
                .wake
                .wait(permit)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *permit = false;
    }

    fn unpark(&self) {
        *self.permit.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.notify_one();
    }
}

/// Scheduler stand-in backed by OS threads.
#[derive(Debug, Default, Copy, Clone)]
pub struct HostBlocking;

impl Interrupts for HostBlocking {
    fn are_enabled(&self) -> bool {
        HostInterrupts.are_enabled()
    }

    fn enable(&self) {
        HostInterrupts.enable();
    }

    fn disable(&self) {
        HostInterrupts.disable();
    }
}

impl Blocking for HostBlocking {
    type Thread = HostThread;

    fn current_thread(&self) -> Option<HostThread> {
        Some(HostThread::current())
    }

    fn take_block_lock(&self) {
        BLOCK_LOCK_TAKEN.with(|taken| {
            assert!(!taken.get(), "block lock taken twice");
            taken.set(true);
        });
    }

    fn block(&self) {
        BLOCK_LOCK_TAKEN.with(|taken| {
            assert!(taken.get(), "blocked without taking the block lock");
            taken.set(false);
        });
        HostThread::current().parker.park();
    }

    fn unblock(&self, thread: HostThread) {
        thread.parker.unpark();
    }
}

/// A scheduler with no running thread, for exercising the "no current
/// thread" usage fault.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoThread;

impl Interrupts for NoThread {
    fn are_enabled(&self) -> bool {
        HostInterrupts.are_enabled()
    }

    fn enable(&self) {
        HostInterrupts.enable();
    }

    fn disable(&self) {
        HostInterrupts.disable();
    }
}

impl Blocking for NoThread {
    type Thread = HostThread;

    fn current_thread(&self) -> Option<HostThread> {
        None
    }

    fn take_block_lock(&self) {}

    fn block(&self) {
        unreachable!("no thread to block");
    }

    fn unblock(&self, _thread: HostThread) {}
}

/// Spins (yielding) until `condition` holds. Panics after roughly ten seconds.
///
/// # Panics
/// If the condition does not become true in time.
pub fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    while !condition() {
        assert!(std::time::Instant::now() < deadline, "timed out waiting until {what}");
        std::thread::yield_now();
    }
}
