use syscall_abi::{PageRights, Status, Sysno, UnknownSysno};

/// Failures reported by the memory manager.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum VmmError {
    #[error("out of memory")]
    OutOfMemory,
    #[error("invalid range")]
    InvalidRange,
    #[error("access to unmapped memory")]
    Unmapped,
    #[error("access denied")]
    AccessDenied,
    #[error("no region allocated at this address")]
    NotAllocated,
}

/// Failures reported by the process loader.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ProcessCreateError {
    #[error("image not found")]
    NotFound,
    #[error("invalid executable image")]
    InvalidImage,
    #[error("out of memory")]
    OutOfMemory,
    #[error("process identifier is not a valid handle")]
    InvalidHandle,
}

/// Why a system call failed.
///
/// These never escape the dispatcher: each one collapses into the single
/// [`Status`] word the caller sees.
#[derive(Debug, thiserror::Error)]
pub enum SyscallError {
    #[error("parameter block at {0:#x} is not readable")]
    InvalidParameterBlock(u64),
    #[error("user buffer {address:#x}+{len:#x} lacks {rights:?} access")]
    BadUserBuffer {
        address: u64,
        len: u64,
        rights: PageRights,
    },
    #[error("required pointer `{0}` is null")]
    NullPointer(&'static str),
    #[error("invalid argument `{0}`")]
    InvalidArgument(&'static str),
    #[error(transparent)]
    UnknownSysno(#[from] UnknownSysno),
    #[error("system call {0:?} is not implemented")]
    Unimplemented(Sysno),
    #[error("user interface version {user:#x} is incompatible with kernel version {kernel:#x}")]
    IncompatibleInterface { user: u32, kernel: u32 },
    #[error("invalid process path")]
    InvalidPath,
    #[error("`{0}` is not valid text")]
    InvalidText(&'static str),
    #[error("no current process")]
    NoCurrentProcess,
    #[error("process creation failed: {0}")]
    ProcessCreate(#[from] ProcessCreateError),
    #[error("memory manager: {0}")]
    Vmm(#[from] VmmError),
}

impl SyscallError {
    /// The status word reported to the caller.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Vmm(VmmError::OutOfMemory) => Status::InsufficientMemory,
            Self::InvalidArgument(_) => Status::InvalidParameter,
            Self::UnknownSysno(_) | Self::Unimplemented(_) => Status::Unsupported,
            Self::IncompatibleInterface { .. } => Status::IncompatibleInterface,
            Self::InvalidParameterBlock(_)
            | Self::BadUserBuffer { .. }
            | Self::NullPointer(_)
            | Self::InvalidPath
            | Self::InvalidText(_)
            | Self::NoCurrentProcess
            | Self::ProcessCreate(_)
            | Self::Vmm(_) => Status::Unsuccessful,
        }
    }
}
