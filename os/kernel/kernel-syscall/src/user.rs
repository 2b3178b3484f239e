//! Access to untrusted user memory.

use crate::error::SyscallError;
use crate::kernel::MemoryManager;
use alloc::vec;
use alloc::vec::Vec;
use syscall_abi::PageRights;

/// Fails unless `[address, address + len)` is non-null and grants `rights`.
pub(crate) fn ensure<M: MemoryManager + ?Sized>(
    memory: &M,
    name: &'static str,
    address: u64,
    len: u64,
    rights: PageRights,
) -> Result<(), SyscallError> {
    if address == 0 {
        return Err(SyscallError::NullPointer(name));
    }
    if !memory.is_buffer_valid(address, len, rights) {
        return Err(SyscallError::BadUserBuffer {
            address,
            len,
            rights,
        });
    }
    Ok(())
}

/// Validates an output pointer for a single quadword.
pub(crate) fn ensure_out_u64<M: MemoryManager + ?Sized>(
    memory: &M,
    name: &'static str,
    address: u64,
) -> Result<(), SyscallError> {
    ensure(memory, name, address, size_of::<u64>() as u64, PageRights::WRITE)
}

pub(crate) fn read_bytes<M: MemoryManager + ?Sized>(
    memory: &M,
    address: u64,
    len: usize,
) -> Result<Vec<u8>, SyscallError> {
    let mut buffer = vec![0; len];
    memory.copy_from_user(address, &mut buffer)?;
    Ok(buffer)
}

pub(crate) fn write_u64<M: MemoryManager + ?Sized>(
    memory: &M,
    address: u64,
    value: u64,
) -> Result<(), SyscallError> {
    memory.copy_to_user(address, &value.to_le_bytes())?;
    Ok(())
}
