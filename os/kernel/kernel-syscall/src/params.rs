use crate::error::SyscallError;
use crate::kernel::MemoryManager;
use syscall_abi::{PARAMETER_BLOCK_SIZE, PARAMETER_SLOT_SIZE, PageRights};

/// The caller's parameter block, validated for the mandatory window.
///
/// Slot 0 is reserved for the call identifier; [`arg(0)`](Self::arg) is
/// slot 1. Every read goes through the memory manager, so parameters past
/// the mandatory window fail the call instead of faulting.
pub struct ParameterBlock<'k, M: ?Sized> {
    memory: &'k M,
    base: u64,
}

impl<'k, M: MemoryManager + ?Sized> ParameterBlock<'k, M> {
    /// Checks that the mandatory window at `base` is readable.
    ///
    /// Nothing is read from the block.
    ///
    /// # Errors
    /// [`SyscallError::InvalidParameterBlock`] if `base` is null or the window
    /// is not readable.
    pub fn open(memory: &'k M, base: u64) -> Result<Self, SyscallError> {
        if base == 0 || !memory.is_buffer_valid(base, PARAMETER_BLOCK_SIZE, PageRights::READ) {
            return Err(SyscallError::InvalidParameterBlock(base));
        }
        Ok(Self { memory, base })
    }

    #[must_use]
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Reads parameter `index`.
    ///
    /// # Errors
    /// [`SyscallError::InvalidParameterBlock`] if the slot is not readable.
    pub fn arg(&self, index: usize) -> Result<u64, SyscallError> {
        let address = (index as u64)
            .checked_add(1)
            .and_then(|slot| slot.checked_mul(PARAMETER_SLOT_SIZE))
            .and_then(|offset| self.base.checked_add(offset))
            .ok_or(SyscallError::InvalidParameterBlock(self.base))?;

        let mut raw = [0; size_of::<u64>()];
        self.memory
            .copy_from_user(address, &mut raw)
            .map_err(|_| SyscallError::InvalidParameterBlock(self.base))?;
        Ok(u64::from_le_bytes(raw))
    }

    /// Reads the first `N` parameters.
    ///
    /// # Errors
    /// See [`arg`](Self::arg).
    pub fn args<const N: usize>(&self) -> Result<[u64; N], SyscallError> {
        let mut args = [0; N];
        for (index, arg) in args.iter_mut().enumerate() {
            *arg = self.arg(index)?;
        }
        Ok(args)
    }
}

/// The low 32 bits of a parameter slot.
#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn low_u32(raw: u64) -> u32 {
    raw as u32
}

/// The low 8 bits of a parameter slot.
#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn low_u8(raw: u64) -> u8 {
    raw as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_like_narrow_parameters() {
        assert_eq!(low_u32(0xDEAD_BEEF_0000_0042), 0x42);
        assert_eq!(low_u8(0x1FF), 0xFF);
    }
}
