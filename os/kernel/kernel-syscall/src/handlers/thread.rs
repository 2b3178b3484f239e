use crate::error::SyscallError;
use crate::kernel::Kernel;
use crate::params::{ParameterBlock, low_u32};
use crate::user;

/// `ThreadExit(status)`
pub(crate) fn exit<K: Kernel>(
    kernel: &K,
    params: &ParameterBlock<'_, K::Memory>,
) -> Result<(), SyscallError> {
    let [status] = params.args()?;
    kernel.exit_thread(low_u32(status));
    Ok(())
}

/// `GetNumberOfThreadsInInterval(start, end, *count)`
pub(crate) fn threads_in_interval<K: Kernel>(
    kernel: &K,
    params: &ParameterBlock<'_, K::Memory>,
) -> Result<(), SyscallError> {
    let [start, end, count] = params.args()?;
    if start > end {
        return Err(SyscallError::InvalidArgument("end"));
    }
    user::ensure_out_u64(kernel.memory(), "count", count)?;

    let threads = kernel.threads_in_interval(start, end);
    user::write_u64(kernel.memory(), count, threads)
}
