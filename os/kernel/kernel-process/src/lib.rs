//! # Processes and their lifecycle
//!
//! A [`Process`] owns its children and points back to its parent with a
//! non-owning reference. Each child collection has its own lock; the
//! [`lifecycle`] operations never hold two of those locks at once.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod lifecycle;
mod process;

pub use process::{Pid, Process};
