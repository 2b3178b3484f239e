//! Collaborators consumed by the dispatcher.
//!
//! The scheduler, the memory manager and the process loader live elsewhere
//! in the kernel; system calls only reach them through these traits.

use crate::error::{ProcessCreateError, VmmError};
use alloc::sync::Arc;
use core::num::NonZeroU64;
use kernel_process::Process;
use kernel_sync::Interrupts;
use syscall_abi::{PageRights, VmmAllocType};

/// The kernel as seen from a system call running on the calling thread.
pub trait Kernel {
    type Interrupts: Interrupts;
    type Memory: MemoryManager;

    fn interrupts(&self) -> &Self::Interrupts;

    /// The address space of the calling process.
    fn memory(&self) -> &Self::Memory;

    fn current_process(&self) -> Option<Arc<Process>>;

    /// The root process that adopts orphaned children.
    fn system_process(&self) -> Arc<Process>;

    /// Root of the system partition, including its trailing separator
    /// (e.g. `C:\`).
    fn system_partition_path(&self) -> &str;

    /// Loads the image at the absolute `path`.
    ///
    /// The new process is not linked to any parent yet.
    fn create_process(
        &self,
        path: &str,
        arguments: Option<&str>,
    ) -> Result<Arc<Process>, ProcessCreateError>;

    /// Tears down `process` after its exit bookkeeping has run.
    ///
    /// Does not return when `process` is the caller's own process.
    fn terminate_process(&self, process: &Arc<Process>);

    /// Terminates the calling thread.
    ///
    /// Does not return on a real scheduler.
    fn exit_thread(&self, status: u32);

    /// Number of threads whose lifetime intersects `[start, end]`.
    fn threads_in_interval(&self, start: u64, end: u64) -> u64;

    /// The scheduler's periodic tick.
    fn thread_tick(&self);
}

/// The parts of the virtual memory manager used by system calls.
///
/// Every user address handed to these methods is untrusted. Implementations
/// check it against the calling process's address space and fail instead
/// of faulting.
pub trait MemoryManager {
    /// Whether `[address, address + len)` is mapped with at least `rights`.
    fn is_buffer_valid(&self, address: u64, len: u64, rights: PageRights) -> bool;

    fn copy_from_user(&self, address: u64, buffer: &mut [u8]) -> Result<(), VmmError>;

    fn copy_to_user(&self, address: u64, data: &[u8]) -> Result<(), VmmError>;

    fn fill_user(&self, address: u64, len: u64, value: u8) -> Result<(), VmmError>;

    /// Reserves and/or commits a region, returning its base address.
    fn alloc_region(&self, request: &AllocRequest) -> Result<u64, VmmError>;

    fn free_region(&self, address: u64, region: FreeRegion) -> Result<(), VmmError>;

    /// Hardware state of the page backing `virtual_address` in `process`.
    fn page_state(&self, process: &Process, virtual_address: u64) -> Option<PageState>;
}

/// A validated virtual allocation request.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AllocRequest {
    /// Preferred base address; the memory manager picks one if `None`.
    pub base: Option<NonZeroU64>,
    pub size: NonZeroU64,
    pub alloc_type: VmmAllocType,
    pub rights: PageRights,
}

/// What to free at an address.
///
/// Releasing always drops the whole region that starts there, so it carries
/// no size. Decommitting is partial and needs one.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FreeRegion {
    Release,
    Decommit { size: NonZeroU64 },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PageState {
    pub physical: u64,
    pub accessed: bool,
    pub dirty: bool,
}
