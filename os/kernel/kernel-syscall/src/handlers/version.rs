use crate::error::SyscallError;
use crate::kernel::MemoryManager;
use crate::params::{ParameterBlock, low_u32};
use log::error;
use syscall_abi::SYSCALL_IMPLEMENTED_IF_VERSION;

pub(crate) fn identify<M: MemoryManager + ?Sized>(
    params: &ParameterBlock<'_, M>,
) -> Result<(), SyscallError> {
    let [version] = params.args()?;
    let user = low_u32(version);

    if user != SYSCALL_IMPLEMENTED_IF_VERSION {
        error!(
            "user mode interface version {user:#x} does not match kernel version {SYSCALL_IMPLEMENTED_IF_VERSION:#x}"
        );
        return Err(SyscallError::IncompatibleInterface {
            user,
            kernel: SYSCALL_IMPLEMENTED_IF_VERSION,
        });
    }

    Ok(())
}
