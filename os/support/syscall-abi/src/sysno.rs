
/// System call identifiers.
///
/// The enumeration is closed: any other value decodes to [`UnknownSysno`].
#[repr(u64)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Sysno {
    /// Compare the caller's interface version against the kernel's.
    IdentifyVersion = 0,

    // Thread management
    ThreadExit = 1,
    ThreadCreate = 2,
    ThreadGetTid = 3,
    ThreadWaitForTermination = 4,
    ThreadCloseHandle = 5,

    // Process management
    ProcessExit = 6,
    ProcessCreate = 7,
    ProcessGetPid = 8,
    ProcessWaitForTermination = 9,
    ProcessCloseHandle = 10,

    // Memory management
    VirtualAlloc = 11,
    VirtualFree = 12,

    // File management
    FileCreate = 13,
    FileClose = 14,
    FileRead = 15,
    FileWrite = 16,

    /// Count the threads alive within a time interval.
    GetNumberOfThreadsInInterval = 17,
    /// Swap a page of the caller out to backing storage.
    SwapOut = 18,
    /// Fill a user buffer with a byte value.
    Memset = 19,
}

impl Sysno {
    /// Every identifier known to this build, in ordinal order.
    pub const ALL: [Self; 20] = [
        Self::IdentifyVersion,
        Self::ThreadExit,
        Self::ThreadCreate,
        Self::ThreadGetTid,
        Self::ThreadWaitForTermination,
        Self::ThreadCloseHandle,
        Self::ProcessExit,
        Self::ProcessCreate,
        Self::ProcessGetPid,
        Self::ProcessWaitForTermination,
        Self::ProcessCloseHandle,
        Self::VirtualAlloc,
        Self::VirtualFree,
        Self::FileCreate,
        Self::FileClose,
        Self::FileRead,
        Self::FileWrite,
        Self::GetNumberOfThreadsInInterval,
        Self::SwapOut,
        Self::Memset,
    ];

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self as u64
    }
}

/// A call identifier outside the enumeration of this build.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("unknown system call {0}")]
pub struct UnknownSysno(pub u64);

impl TryFrom<u64> for Sysno {
    type Error = UnknownSysno;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(UnknownSysno(value))
    }
}

impl From<Sysno> for u64 {
    fn from(value: Sysno) -> Self {
        value.as_u64()
    }
}
