//! The scheduler's blocking interface, as consumed by the sleeping primitives.

use crate::irq::Interrupts;

/// Suspend/resume operations provided by the scheduler.
///
/// A primitive that decides to sleep must follow this order, with its own
/// internal lock held and interrupts disabled:
///
/// 1. record the current thread on its wait queue,
/// 2. call [`take_block_lock`](Blocking::take_block_lock),
/// 3. release its internal lock,
/// 4. call [`block`](Blocking::block).
///
/// Because the thread is queued and the block lock is taken before the
/// internal lock is dropped, a waker that runs between steps 3 and 4 cannot
/// lose the wakeup.
pub trait Blocking: Interrupts {
    /// Identity of a schedulable thread.
    type Thread: Clone + Eq;

    /// The thread executing the caller, if the scheduler is running.
    fn current_thread(&self) -> Option<Self::Thread>;

    /// Takes the scheduler's block lock on behalf of the current thread.
    fn take_block_lock(&self);

    /// Suspends the current thread until it is passed to
    /// [`unblock`](Blocking::unblock). Releases the block lock.
    fn block(&self);

    /// Marks a blocked thread runnable.
    fn unblock(&self, thread: Self::Thread);
}

impl<B: Blocking + ?Sized> Blocking for &B {
    type Thread = B::Thread;

    #[inline]
    fn current_thread(&self) -> Option<Self::Thread> {
        (**self).current_thread()
    }

    #[inline]
    fn take_block_lock(&self) {
        (**self).take_block_lock();
    }

    #[inline]
    fn block(&self) {
        (**self).block();
    }

    #[inline]
    fn unblock(&self, thread: Self::Thread) {
        (**self).unblock(thread);
    }
}
