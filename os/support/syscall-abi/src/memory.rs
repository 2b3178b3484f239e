use bitfield_struct::bitfield;

/// Access rights of a page or buffer.
#[bitfield(u8, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct PageRights {
    pub read: bool,
    pub write: bool,
    pub execute: bool,

    #[bits(5)]
    __: u8,
}

impl PageRights {
    pub const READ: Self = Self::new().with_read(true);
    pub const WRITE: Self = Self::new().with_write(true);
    pub const READ_WRITE: Self = Self::new().with_read(true).with_write(true);

    /// Decodes a user-supplied rights word, rejecting undefined bits.
    #[must_use]
    pub const fn from_user(raw: u64) -> Option<Self> {
        if raw & !0b111 != 0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        Some(Self::from_bits(raw as u8))
    }

    /// Whether every right in `other` is also granted by `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.into_bits() & other.into_bits() == other.into_bits()
    }
}

/// How a region is allocated.
#[bitfield(u8, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct VmmAllocType {
    /// Reserve address space.
    pub reserve: bool,
    /// Back the region with memory.
    pub commit: bool,
    /// Map frames immediately instead of on first access.
    pub not_lazy: bool,

    #[bits(5)]
    __: u8,
}

impl VmmAllocType {
    /// Decodes a user-supplied allocation type.
    ///
    /// At least one of `reserve` and `commit` must be present and no undefined
    /// bit may be set.
    #[must_use]
    pub const fn from_user(raw: u64) -> Option<Self> {
        if raw & !0b111 != 0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let ty = Self::from_bits(raw as u8);
        if !ty.reserve() && !ty.commit() {
            return None;
        }
        Some(ty)
    }
}

/// How a region is freed.
///
/// The two kinds differ in whether a size is meaningful: a release always
/// covers the entire region, a decommit covers an explicit range.
#[repr(u64)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VmmFreeType {
    /// Decommit a partial range; requires a size.
    Decommit = 0x1,
    /// Release the entire region; any size is ignored.
    Release = 0x2,
}

impl VmmFreeType {
    #[must_use]
    pub const fn from_user(raw: u64) -> Option<Self> {
        match raw {
            0x1 => Some(Self::Decommit),
            0x2 => Some(Self::Release),
            _ => None,
        }
    }
}
