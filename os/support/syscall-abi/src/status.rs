/// Status word returned to user mode in `RAX`.
///
/// Values with the top bit set are failures.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Status {
    Success = 0x0000_0000,
    /// Generic failure; also used for every rejected user buffer.
    Unsuccessful = 0xC000_0001,
    InvalidParameter = 0xC000_000D,
    InsufficientMemory = 0xC000_0017,
    /// The call identifier is known to the ABI but not served by this kernel,
    /// or not known at all.
    Unsupported = 0xC000_00BB,
    /// User and kernel were built against different interface versions.
    IncompatibleInterface = 0xC000_0210,
}

impl Status {
    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        (self as u32) & 0x8000_0000 == 0
    }

    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Decodes a status word, e.g. an exit status supplied by user code.
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0x0000_0000 => Self::Success,
            0xC000_0001 => Self::Unsuccessful,
            0xC000_000D => Self::InvalidParameter,
            0xC000_0017 => Self::InsufficientMemory,
            0xC000_00BB => Self::Unsupported,
            0xC000_0210 => Self::IncompatibleInterface,
            _ => return None,
        })
    }
}

impl From<Status> for u64 {
    fn from(value: Status) -> Self {
        Self::from(value.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_success_is_successful() {
        assert!(Status::Success.is_success());
        assert!(!Status::Unsuccessful.is_success());
        assert!(!Status::Unsupported.is_success());
        assert!(!Status::IncompatibleInterface.is_success());
    }

    #[test]
    fn incompatible_interface_is_distinct_from_generic_failure() {
        assert_ne!(
            u64::from(Status::IncompatibleInterface),
            u64::from(Status::Unsuccessful)
        );
    }

    #[test]
    fn decoding_round_trips_known_words() {
        assert_eq!(Status::from_u32(0xC000_00BB), Some(Status::Unsupported));
        assert_eq!(Status::from_u32(0x1234), None);
    }
}
