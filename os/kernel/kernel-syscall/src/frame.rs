use syscall_abi::Status;

/// User-mode register state saved by the system call entry stub.
///
/// The dispatcher reads the call identifier from `r8` and the parameter
/// block address from `rbp`, and writes the status word into `rax`. Every
/// other register is restored exactly as the user had it.
///
/// Layout must match the push order of the entry stub; with `#[repr(C)]`
/// memory from the frame base looks like:
///
/// ```text
///   +0   rax    (return status)
///   +8   rbx
///   +16  rcx    (user RIP, clobbered by SYSCALL)
///   +24  rdx
///   +32  rsi
///   +40  rdi
///   +48  rbp    (parameter block)
///   +56  r8     (call identifier)
///   ...
///   +112 r15
///   +120 rip
///   +128 rflags
///   +136 rsp
/// ```
#[derive(Debug, Default, Clone, Eq, PartialEq)]
#[repr(C)]
pub struct SyscallFrame {
    pub rax: u64,
    pub rbx: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rbp: u64,
    pub r8: u64,
    pub r9: u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
    pub rip: u64,
    pub rflags: u64,
    pub rsp: u64,
}

impl SyscallFrame {
    /// A frame as the entry stub would save it for the given call.
    #[must_use]
    pub fn for_call(syscall_id: u64, parameter_block: u64) -> Self {
        Self {
            r8: syscall_id,
            rbp: parameter_block,
            ..Self::default()
        }
    }

    /// The raw call identifier.
    #[inline]
    #[must_use]
    pub const fn syscall_id(&self) -> u64 {
        self.r8
    }

    /// User address of the parameter block.
    #[inline]
    #[must_use]
    pub const fn parameter_block(&self) -> u64 {
        self.rbp
    }

    #[inline]
    pub fn set_status(&mut self, status: Status) {
        self.rax = u64::from(status);
    }

    /// The status word as it will be seen by user mode.
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        u32::try_from(self.rax).ok().and_then(Status::from_u32)
    }
}

const _: () = {
    assert!(core::mem::offset_of!(SyscallFrame, rbp) == 48);
    assert!(core::mem::offset_of!(SyscallFrame, r8) == 56);
    assert!(core::mem::size_of::<SyscallFrame>() == 144);
};
