//! # Kernel synchronization primitives
//!
//! * [`SpinLock`]: the internal lock of every other primitive, optionally
//!   paired with interrupt masking via [`SpinLock::lock_irq`].
//! * [`Semaphore`]: counting wait/signal on top of the scheduler's
//!   [`Blocking`] interface.
//! * [`RecursiveMutex`]: sleeping, owner-tracked, optionally recursive lock,
//!   listed in a [`MutexRegistry`] for its whole life.
//!
//! The sleeping primitives serve waiters strictly FIFO. There is no timeout,
//! cancellation or priority inheritance.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

mod blocking;
pub mod irq;
mod recursive_mutex;
mod registry;
mod semaphore;
mod spin_lock;
mod sync_once_cell;
mod wait_queue;

pub use blocking::Blocking;
pub use irq::{Interrupts, IrqGuard, IrqSpinLockGuard};
pub use recursive_mutex::{MAX_RECURSION_DEPTH, RecursiveMutex, RecursiveMutexGuard};
pub use registry::{MutexId, MutexInfo, MutexRegistry, global_registry};
pub use semaphore::Semaphore;
pub use spin_lock::{SpinLock, SpinLockGuard};
pub use sync_once_cell::SyncOnceCell;
pub use wait_queue::WaitQueue;
