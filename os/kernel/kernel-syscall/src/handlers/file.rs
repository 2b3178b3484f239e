use crate::error::SyscallError;
use crate::kernel::Kernel;
use crate::params::ParameterBlock;
use crate::user;
use alloc::string::String;
use log::{info, warn};
use syscall_abi::{PageRights, UM_FILE_HANDLE_STDOUT};

/// Longest prefix of a standard-output write that is logged.
const MAX_STDOUT_RECORD: u64 = 0x1000;

/// `FileWrite(handle, buffer, bytes_to_write, *bytes_written)`
///
/// Standard output goes to the kernel log as one record. Every other handle
/// is accepted without performing any I/O. Both report the full length as
/// written.
pub(crate) fn write<K: Kernel>(
    kernel: &K,
    params: &ParameterBlock<'_, K::Memory>,
) -> Result<(), SyscallError> {
    let [handle, buffer, bytes_to_write, bytes_written] = params.args()?;
    let memory = kernel.memory();
    user::ensure_out_u64(memory, "bytes_written", bytes_written)?;

    if handle == UM_FILE_HANDLE_STDOUT && bytes_to_write > 0 {
        user::ensure(memory, "buffer", buffer, bytes_to_write, PageRights::READ)?;

        let len = usize::try_from(bytes_to_write.min(MAX_STDOUT_RECORD))
            .map_err(|_| SyscallError::InvalidArgument("bytes_to_write"))?;
        let mut bytes = user::read_bytes(memory, buffer, len)?;
        if let Some(end) = bytes.iter().position(|&b| b == 0) {
            bytes.truncate(end);
        }

        let text = String::from_utf8(bytes).unwrap_or_else(|err| {
            warn!("standard output record is not valid UTF-8");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        });
        let name = kernel.current_process();
        let name = name.as_ref().map_or("?", |p| p.name());
        info!("[{name}]:[{text}]");
    }

    user::write_u64(memory, bytes_written, bytes_to_write)
}
