//! # System call dispatch
//!
//! The kernel side of the user/kernel boundary. The entry stub saves the
//! user registers into a [`SyscallFrame`] and hands it to
//! [`Dispatcher::handle`], which
//!
//! 1. re-enables interrupts for the duration of the call,
//! 2. validates the parameter block before reading anything from it,
//! 3. routes the call identifier to its handler, and
//! 4. writes exactly one [`Status`](syscall_abi::Status) back into the frame
//!    and masks interrupts again, on every path.
//!
//! The scheduler, memory manager and process loader are reached through
//! the [`Kernel`] and [`MemoryManager`] traits.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod dispatch;
mod error;
mod frame;
mod handlers;
mod kernel;
mod params;
mod tick;
mod user;

pub use dispatch::Dispatcher;
pub use error::{ProcessCreateError, SyscallError, VmmError};
pub use frame::SyscallFrame;
pub use kernel::{AllocRequest, FreeRegion, Kernel, MemoryManager, PageState};
pub use params::ParameterBlock;
pub use tick::timer_tick;

/// Directory on the system partition that process paths are relative to.
pub const APPLICATIONS_DIRECTORY: &str = "APPLICATIONS";
