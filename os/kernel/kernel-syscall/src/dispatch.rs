use crate::error::SyscallError;
use crate::frame::SyscallFrame;
use crate::handlers;
use crate::kernel::Kernel;
use crate::params::ParameterBlock;
use kernel_sync::Interrupts;
use log::{error, trace};
use syscall_abi::{Status, Sysno};

/// Routes system calls from user mode to their handlers.
pub struct Dispatcher<K> {
    kernel: K,
}

impl<K: Kernel> Dispatcher<K> {
    #[must_use]
    pub const fn new(kernel: K) -> Self {
        Self { kernel }
    }

    #[must_use]
    pub const fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Handles the system call described by `frame`.
    ///
    /// Must be entered with interrupts disabled. They are enabled while the
    /// call runs and disabled again before this returns, and the status is
    /// always written to `frame.rax`, even if a handler panics.
    ///
    /// # Panics
    /// In debug builds, if interrupts are enabled on entry.
    pub fn handle(&self, frame: &mut SyscallFrame) -> Status {
        let irq = self.kernel.interrupts();
        debug_assert!(
            !irq.are_enabled(),
            "system call entered with interrupts enabled"
        );
        irq.enable();

        let sysno = frame.syscall_id();
        let block = frame.parameter_block();
        let mut epilogue = Epilogue {
            frame,
            irq,
            status: Status::Unsuccessful,
        };

        trace!("system call {sysno:#x} with parameters at {block:#x}");

        let status = match self.dispatch(sysno, block) {
            Ok(()) => Status::Success,
            Err(err) => {
                let status = err.status();
                match &err {
                    SyscallError::InvalidParameterBlock(_) | SyscallError::UnknownSysno(_) => {
                        error!("system call {sysno:#x} rejected: {err}");
                    }
                    _ => trace!("system call {sysno:#x} failed: {err}"),
                }
                status
            }
        };

        epilogue.status = status;
        status
    }

    fn dispatch(&self, sysno: u64, block: u64) -> Result<(), SyscallError> {
        let params = ParameterBlock::open(self.kernel.memory(), block)?;

        let sysno = Sysno::try_from(sysno)?;
        match sysno {
            Sysno::IdentifyVersion => handlers::version::identify(&params),
            Sysno::ThreadExit => handlers::thread::exit(&self.kernel, &params),
            Sysno::ProcessExit => handlers::process::exit(&self.kernel, &params),
            Sysno::ProcessCreate => handlers::process::create(&self.kernel, &params),
            Sysno::VirtualAlloc => handlers::memory::virtual_alloc(&self.kernel, &params),
            Sysno::VirtualFree => handlers::memory::virtual_free(&self.kernel, &params),
            Sysno::FileWrite => handlers::file::write(&self.kernel, &params),
            Sysno::GetNumberOfThreadsInInterval => {
                handlers::thread::threads_in_interval(&self.kernel, &params)
            }
            Sysno::Memset => handlers::memory::memset(&self.kernel, &params),
            Sysno::ThreadCreate
            | Sysno::ThreadGetTid
            | Sysno::ThreadWaitForTermination
            | Sysno::ThreadCloseHandle
            | Sysno::ProcessGetPid
            | Sysno::ProcessWaitForTermination
            | Sysno::ProcessCloseHandle
            | Sysno::FileCreate
            | Sysno::FileClose
            | Sysno::FileRead
            | Sysno::SwapOut => {
                error!("unimplemented system call {sysno:?} called from user mode");
                Err(SyscallError::Unimplemented(sysno))
            }
        }
    }
}

/// Writes the status back and masks interrupts on every exit path.
struct Epilogue<'a, I: Interrupts + ?Sized> {
    frame: &'a mut SyscallFrame,
    irq: &'a I,
    status: Status,
}

impl<I: Interrupts + ?Sized> Drop for Epilogue<'_, I> {
    fn drop(&mut self) {
        trace!("will set user RAX to {:#x}", self.status.as_u32());
        self.frame.set_status(self.status);
        self.irq.disable();
    }
}
