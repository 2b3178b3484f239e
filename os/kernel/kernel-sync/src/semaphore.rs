use crate::irq::IrqGuard;
use crate::{Blocking, SpinLock, WaitQueue};

/// Counting semaphore built on the scheduler's [`Blocking`] interface.
///
/// The counter is signed: a negative value is the number of units owed to
/// blocked threads. Waiters are served strictly in FIFO order.
///
/// # Wakeups
///
/// [`up`](Semaphore::up) wakes **at most one** waiter per call, however large
/// the increment is. An increment that could satisfy several waiters still
/// releases only the longest-waiting one; the rest need further `up` calls.
pub struct Semaphore<B: Blocking> {
    blocking: B,
    state: SpinLock<SemaphoreState<B::Thread>>,
}

struct SemaphoreState<T> {
    value: i64,
    waiting: WaitQueue<T>,
}

impl<B: Blocking> Semaphore<B> {
    /// Creates a semaphore holding `initial` units and no waiters.
    #[allow(clippy::cast_lossless)]
    #[must_use]
    pub const fn new(blocking: B, initial: u32) -> Self {
        Self {
            blocking,
            state: SpinLock::new(SemaphoreState {
                value: initial as i64,
                waiting: WaitQueue::new(),
            }),
        }
    }

    /// Takes `amount` units, blocking if the counter drops below zero.
    ///
    /// A single wakeup corresponds to a single grant; the counter is not
    /// re-checked after resuming.
    ///
    /// # Panics
    /// If there is no current thread.
    pub fn down(&self, amount: u32) {
        let Some(current) = self.blocking.current_thread() else {
            panic!("semaphore down without a current thread");
        };

        let _irq = IrqGuard::new(&self.blocking);
        let mut state = self.state.lock();

        state.value -= i64::from(amount);
        if state.value < 0 {
            state.waiting.push(current);
            self.blocking.take_block_lock();
            drop(state);

            self.blocking.block();

            // Synchronizes with the release performed by the waker.
            let _resumed = self.state.lock();
        }
    }

    /// Returns `amount` units and wakes the longest-waiting thread, if the
    /// counter was negative before the increment.
    pub fn up(&self, amount: u32) {
        let mut state = self.state.lock_irq(&self.blocking);

        let before = state.value;
        state.value += i64::from(amount);

        if before < 0
            && let Some(thread) = state.waiting.pop()
        {
            self.blocking.unblock(thread);
        }
    }

    /// Current counter value; negative values count owed units.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.state.lock_irq(&self.blocking).value
    }

    /// Number of blocked threads.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.state.lock_irq(&self.blocking).waiting.len()
    }
}
