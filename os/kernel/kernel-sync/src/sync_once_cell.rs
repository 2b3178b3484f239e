use core::{
    cell::UnsafeCell,
    hint::spin_loop,
    mem::MaybeUninit,
    sync::atomic::{AtomicU8, Ordering},
};

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum State {
    Empty = 0,
    Writing = 1,
    Ready = 2,
}

/// Write-once cell for process-lifetime singletons such as the
/// [global mutex registry](crate::global_registry).
///
/// The value is published exactly once, either explicitly during boot via
/// [`set`](Self::set) or lazily via [`get_or_init`](Self::get_or_init).
/// There is no teardown: once published, the value lives until shutdown
/// and only shared references to it are ever handed out.
pub struct SyncOnceCell<T> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

// Safety: the value is written by the single thread that won the
// Empty -> Writing transition and only read after Ready is observed.
unsafe impl<T: Send + Sync> Sync for SyncOnceCell<T> {}
unsafe impl<T: Send> Send for SyncOnceCell<T> {}

impl<T> Default for SyncOnceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncOnceCell<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(State::Empty as u8),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// The published value, if any.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        if self.is_initialized() {
            // SAFETY: Ready is only stored after the value was written.
            Some(unsafe { self.published() })
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.load(Ordering::Acquire) == State::Ready as u8
    }

    /// Publishes `value` unless the cell already holds one.
    ///
    /// # Errors
    /// Hands `value` back if another value was published (or is being
    /// published) first.
    pub fn set(&self, value: T) -> Result<&T, T> {
        if !self.begin_write() {
            return Err(value);
        }
        // SAFETY: `begin_write` succeeded, so we are the only writer.
        Ok(unsafe { self.publish(value) })
    }

    /// The published value, running `init` first if nothing was published.
    ///
    /// Concurrent callers spin until the winning initializer is done; `init`
    /// runs at most once.
    #[must_use]
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        if let Some(value) = self.get() {
            return value;
        }

        if self.begin_write() {
            // SAFETY: `begin_write` succeeded, so we are the only writer.
            return unsafe { self.publish(init()) };
        }

        while !self.is_initialized() {
            spin_loop();
        }
        // SAFETY: Ready was observed with Acquire ordering.
        unsafe { self.published() }
    }

    fn begin_write(&self) -> bool {
        self.state
            .compare_exchange(
                State::Empty as u8,
                State::Writing as u8,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .is_ok()
    }

    /// # Safety
    /// The caller must have won [`begin_write`](Self::begin_write).
    unsafe fn publish(&self, value: T) -> &T {
        unsafe { (*self.value.get()).write(value) };
        self.state.store(State::Ready as u8, Ordering::Release);
        unsafe { self.published() }
    }

    /// # Safety
    /// The state must be Ready.
    unsafe fn published(&self) -> &T {
        unsafe { (*self.value.get()).assume_init_ref() }
    }
}

impl<T> Drop for SyncOnceCell<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == State::Ready as u8 {
            // SAFETY: Ready means the value was written and never moved out.
            unsafe { self.value.get_mut().assume_init_drop() };
        }
    }
}
