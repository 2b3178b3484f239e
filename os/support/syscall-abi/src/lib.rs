//! # System call ABI
//!
//! Types shared between kernel and user code for one build: call
//! identifiers, status words, the interface version and the encodings of
//! memory-management arguments.
//!
//! ## Calling convention
//!
//! * The call identifier is passed in `R8`.
//! * `RBP` points at the *parameter block*: a caller-provided array of
//!   quadwords. Slot 0 conceptually holds the identifier; parameters follow
//!   from slot 1 onward. At least [`PARAMETER_BLOCK_SIZE`] bytes must be
//!   readable.
//! * Exactly one [`Status`] word is written back into `RAX`.
//!
//! Ordinal values are agreed upon between kernel and user code of the same
//! build only; they are not a stable format across versions.

#![no_std]
#![forbid(unsafe_code)]

mod memory;
mod status;
mod sysno;

pub use memory::{PageRights, VmmAllocType, VmmFreeType};
pub use status::Status;
pub use sysno::{Sysno, UnknownSysno};

/// Version of the system call interface compiled into this build.
///
/// User code declares its own version through [`Sysno::IdentifyVersion`].
pub const SYSCALL_IMPLEMENTED_IF_VERSION: u32 = 0x0000_0001;

/// Number of bytes of the parameter block that must be readable before any
/// parameter is touched.
pub const PARAMETER_BLOCK_SIZE: u64 = 0x20;

/// Size of one parameter slot in the parameter block.
pub const PARAMETER_SLOT_SIZE: u64 = 8;

/// Upper bound on absolute paths built by the kernel, terminator included.
pub const MAX_PATH: usize = 260;

/// Opaque handle passed across the user/kernel boundary.
pub type UmHandle = u64;

/// The handle value that never refers to a kernel object.
pub const UM_INVALID_HANDLE_VALUE: UmHandle = 0;

/// The pre-opened standard output handle of every process.
pub const UM_FILE_HANDLE_STDOUT: UmHandle = 0x1;
