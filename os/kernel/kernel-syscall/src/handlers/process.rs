use crate::APPLICATIONS_DIRECTORY;
use crate::error::{ProcessCreateError, SyscallError};
use crate::kernel::Kernel;
use crate::params::{ParameterBlock, low_u32};
use crate::user;
use alloc::format;
use alloc::string::String;
use kernel_process::lifecycle;
use log::debug;
use syscall_abi::{MAX_PATH, PageRights, UM_INVALID_HANDLE_VALUE, UmHandle};

/// `ProcessExit(status)`
///
/// Runs the exit bookkeeping, then terminates the calling process.
pub(crate) fn exit<K: Kernel>(
    kernel: &K,
    params: &ParameterBlock<'_, K::Memory>,
) -> Result<(), SyscallError> {
    let [status] = params.args()?;
    let process = kernel
        .current_process()
        .ok_or(SyscallError::NoCurrentProcess)?;
    let system = kernel.system_process();

    let report = lifecycle::exit(&process, low_u32(status), &system, kernel.interrupts());
    debug!(
        "{} handed {} children to {}",
        process.id(),
        report.reparented,
        system.id()
    );

    kernel.terminate_process(&process);
    Ok(())
}

/// `ProcessCreate(path, path_len, arguments, arg_len, *handle)`
///
/// `path` is relative to the applications directory of the system
/// partition. `arguments` may be null.
pub(crate) fn create<K: Kernel>(
    kernel: &K,
    params: &ParameterBlock<'_, K::Memory>,
) -> Result<(), SyscallError> {
    let [path, path_len, arguments, arg_len, handle] = params.args()?;
    let memory = kernel.memory();

    let parent = kernel
        .current_process()
        .ok_or(SyscallError::NoCurrentProcess)?;

    if path_len == 0 || path_len >= MAX_PATH as u64 {
        return Err(SyscallError::InvalidPath);
    }
    user::ensure(memory, "path", path, path_len, PageRights::READ)?;
    user::ensure_out_u64(memory, "handle", handle)?;

    let arguments = if arguments != 0 && arg_len > 0 {
        user::ensure(memory, "arguments", arguments, arg_len, PageRights::READ)?;
        let len = usize::try_from(arg_len).map_err(|_| SyscallError::InvalidArgument("arg_len"))?;
        Some(read_text(kernel, arguments, len, "arguments")?)
    } else {
        None
    };

    let len = usize::try_from(path_len).map_err(|_| SyscallError::InvalidPath)?;
    let relative = read_text(kernel, path, len, "path").map_err(|_| SyscallError::InvalidPath)?;
    if relative.is_empty() {
        return Err(SyscallError::InvalidPath);
    }

    let full_path = format!(
        "{}{APPLICATIONS_DIRECTORY}\\{relative}",
        kernel.system_partition_path()
    );
    if full_path.len() >= MAX_PATH {
        return Err(SyscallError::InvalidPath);
    }

    let child = kernel.create_process(&full_path, arguments.as_deref())?;
    let child_handle: UmHandle = child.id().as_u64();
    let published = if child_handle == UM_INVALID_HANDLE_VALUE {
        Err(SyscallError::ProcessCreate(ProcessCreateError::InvalidHandle))
    } else {
        user::write_u64(memory, handle, child_handle)
    };
    if let Err(err) = published {
        kernel.terminate_process(&child);
        return Err(err);
    }

    lifecycle::link_child(&parent, &child, kernel.interrupts());
    debug!("{} created {} from {full_path}", parent.id(), child.id());
    Ok(())
}

/// Reads a string of at most `len` bytes, stopping at the first NUL.
fn read_text<K: Kernel>(
    kernel: &K,
    address: u64,
    len: usize,
    name: &'static str,
) -> Result<String, SyscallError> {
    let mut bytes = user::read_bytes(kernel.memory(), address, len)?;
    if let Some(end) = bytes.iter().position(|&b| b == 0) {
        bytes.truncate(end);
    }
    String::from_utf8(bytes).map_err(|_| SyscallError::InvalidText(name))
}
