use alloc::collections::VecDeque;

/// FIFO queue of blocked threads.
///
/// Threads are woken in the order they blocked. A thread is linked into at
/// most one position of a queue at any time.
#[derive(Debug)]
pub struct WaitQueue<T> {
    threads: VecDeque<T>,
}

impl<T> Default for WaitQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WaitQueue<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            threads: VecDeque::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Removes the longest-waiting thread.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.threads.pop_front()
    }
}

impl<T: Eq> WaitQueue<T> {
    /// Appends `thread` at the tail.
    ///
    /// # Panics
    /// In debug builds, if `thread` is already queued.
    #[inline]
    pub fn push(&mut self, thread: T) {
        debug_assert!(!self.contains(&thread), "thread queued twice");
        self.threads.push_back(thread);
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, thread: &T) -> bool {
        self.threads.contains(thread)
    }
}
