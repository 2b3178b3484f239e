//! One module per group of system calls.
//!
//! Handlers read their parameters from the already validated block and
//! report failure through [`SyscallError`](crate::SyscallError); they never
//! write the status themselves.

pub(crate) mod file;
pub(crate) mod memory;
pub(crate) mod process;
pub(crate) mod thread;
pub(crate) mod version;
