use crate::error::SyscallError;
use crate::kernel::{AllocRequest, FreeRegion, Kernel, MemoryManager};
use crate::params::{ParameterBlock, low_u8, low_u32};
use crate::user;
use core::num::NonZeroU64;
use syscall_abi::{PageRights, VmmAllocType, VmmFreeType};

/// `VirtualAlloc(base, size, alloc_type, rights, file, key, *address)`
///
/// File-backed mappings are not supported; `file` and `key` are ignored.
pub(crate) fn virtual_alloc<K: Kernel>(
    kernel: &K,
    params: &ParameterBlock<'_, K::Memory>,
) -> Result<(), SyscallError> {
    let [base, size, alloc_type, rights, _file, _key, allocated] = params.args()?;
    let memory = kernel.memory();

    let request = AllocRequest {
        base: NonZeroU64::new(base),
        size: NonZeroU64::new(size).ok_or(SyscallError::InvalidArgument("size"))?,
        alloc_type: VmmAllocType::from_user(alloc_type)
            .ok_or(SyscallError::InvalidArgument("alloc_type"))?,
        rights: PageRights::from_user(rights).ok_or(SyscallError::InvalidArgument("rights"))?,
    };
    user::ensure_out_u64(memory, "allocated_address", allocated)?;

    let address = memory.alloc_region(&request)?;
    user::write_u64(memory, allocated, address)
}

/// `VirtualFree(address, size, free_type)`
///
/// `size` is only read for a decommit.
pub(crate) fn virtual_free<K: Kernel>(
    kernel: &K,
    params: &ParameterBlock<'_, K::Memory>,
) -> Result<(), SyscallError> {
    let [address, size, free_type] = params.args()?;
    if address == 0 {
        return Err(SyscallError::NullPointer("address"));
    }

    let region = match VmmFreeType::from_user(free_type) {
        Some(VmmFreeType::Release) => FreeRegion::Release,
        Some(VmmFreeType::Decommit) => FreeRegion::Decommit {
            size: NonZeroU64::new(size).ok_or(SyscallError::InvalidArgument("size"))?,
        },
        None => return Err(SyscallError::InvalidArgument("free_type")),
    };

    kernel.memory().free_region(address, region)?;
    Ok(())
}

/// `Memset(address, count, value)`
///
/// `count` is a 32-bit quantity and `value` a byte.
pub(crate) fn memset<K: Kernel>(
    kernel: &K,
    params: &ParameterBlock<'_, K::Memory>,
) -> Result<(), SyscallError> {
    let [address, count, value] = params.args()?;
    if address == 0 {
        return Err(SyscallError::NullPointer("address"));
    }

    kernel
        .memory()
        .fill_user(address, u64::from(low_u32(count)), low_u8(value))?;
    Ok(())
}
