#![allow(dead_code)]

use kernel_host::HostInterrupts;
use kernel_process::{Pid, Process, lifecycle};
use kernel_sync::Interrupts;
use kernel_syscall::{
    AllocRequest, Dispatcher, FreeRegion, Kernel, MemoryManager, PageState, ProcessCreateError,
    SyscallFrame, VmmError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use syscall_abi::{PARAMETER_BLOCK_SIZE, PageRights, Status, Sysno};

pub const IRQ: HostInterrupts = HostInterrupts;

/// Where [`call`] places the parameter block.
pub const BLOCK: u64 = 0x7000_0000;

/// A scratch buffer every test process has mapped read/write.
pub const SCRATCH: u64 = 0x4000_0000;
pub const SCRATCH_LEN: u64 = 0x1000;

/// A read-only page.
pub const READ_ONLY: u64 = 0x5000_0000;

struct Region {
    base: u64,
    bytes: Vec<u8>,
    rights: PageRights,
}

impl Region {
    fn covers(&self, address: u64, len: u64) -> bool {
        let end = self.base + self.bytes.len() as u64;
        address >= self.base && address.checked_add(len).is_some_and(|e| e <= end)
    }
}

/// A flat user address space made of explicitly mapped regions.
#[derive(Default)]
pub struct FakeMemory {
    regions: Mutex<Vec<Region>>,
    reads: AtomicUsize,
    pub allocations: Mutex<Vec<AllocRequest>>,
    pub frees: Mutex<Vec<(u64, FreeRegion)>>,
    pub alloc_result: Mutex<Option<Result<u64, VmmError>>>,
    pub page_states: Mutex<HashMap<u64, PageState>>,
}

impl FakeMemory {
    pub fn map(&self, base: u64, len: u64, rights: PageRights) {
        self.regions.lock().unwrap().push(Region {
            base,
            bytes: vec![0; usize::try_from(len).unwrap()],
            rights,
        });
    }

    pub fn unmap(&self, base: u64) {
        self.regions.lock().unwrap().retain(|r| r.base != base);
    }

    /// Writes without any rights check.
    pub fn poke(&self, address: u64, data: &[u8]) {
        self.with_region(address, data.len() as u64, |bytes| bytes.copy_from_slice(data))
            .expect("poke outside mapped memory");
    }

    /// Reads without any rights check.
    pub fn peek(&self, address: u64, len: usize) -> Vec<u8> {
        self.with_region(address, len as u64, |bytes| bytes.to_vec())
            .expect("peek outside mapped memory")
    }

    pub fn peek_u64(&self, address: u64) -> u64 {
        u64::from_le_bytes(self.peek(address, 8).try_into().unwrap())
    }

    /// Number of reads through [`MemoryManager::copy_from_user`].
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn with_region<R>(&self, address: u64, len: u64, f: impl FnOnce(&mut [u8]) -> R) -> Option<R> {
        let mut regions = self.regions.lock().unwrap();
        let region = regions.iter_mut().find(|r| r.covers(address, len))?;
        let start = usize::try_from(address - region.base).unwrap();
        let end = start + usize::try_from(len).unwrap();
        Some(f(&mut region.bytes[start..end]))
    }
}

impl MemoryManager for FakeMemory {
    fn is_buffer_valid(&self, address: u64, len: u64, rights: PageRights) -> bool {
        self.regions
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.covers(address, len) && r.rights.contains(rights))
    }

    fn copy_from_user(&self, address: u64, buffer: &mut [u8]) -> Result<(), VmmError> {
        if !self.is_buffer_valid(address, buffer.len() as u64, PageRights::READ) {
            return Err(VmmError::Unmapped);
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.with_region(address, buffer.len() as u64, |bytes| {
            buffer.copy_from_slice(bytes);
        })
        .ok_or(VmmError::Unmapped)
    }

    fn copy_to_user(&self, address: u64, data: &[u8]) -> Result<(), VmmError> {
        if !self.is_buffer_valid(address, data.len() as u64, PageRights::WRITE) {
            return Err(VmmError::AccessDenied);
        }
        self.with_region(address, data.len() as u64, |bytes| bytes.copy_from_slice(data))
            .ok_or(VmmError::Unmapped)
    }

    fn fill_user(&self, address: u64, len: u64, value: u8) -> Result<(), VmmError> {
        if !self.is_buffer_valid(address, len, PageRights::WRITE) {
            return Err(VmmError::AccessDenied);
        }
        self.with_region(address, len, |bytes| bytes.fill(value))
            .ok_or(VmmError::Unmapped)
    }

    fn alloc_region(&self, request: &AllocRequest) -> Result<u64, VmmError> {
        self.allocations.lock().unwrap().push(*request);
        let result = *self.alloc_result.lock().unwrap();
        result.unwrap_or(Ok(request.base.map_or(0x1_0000_0000, |b| b.get())))
    }

    fn free_region(&self, address: u64, region: FreeRegion) -> Result<(), VmmError> {
        self.frees.lock().unwrap().push((address, region));
        Ok(())
    }

    fn page_state(&self, _process: &Process, virtual_address: u64) -> Option<PageState> {
        self.page_states
            .lock()
            .unwrap()
            .get(&virtual_address)
            .copied()
    }
}

/// A kernel whose collaborators only record what they were asked to do.
pub struct FakeKernel {
    pub memory: FakeMemory,
    pub system: Arc<Process>,
    pub current: Option<Arc<Process>>,
    pub next_pid: AtomicU64,
    pub create_error: Mutex<Option<ProcessCreateError>>,
    pub panic_on_create: AtomicBool,
    pub created: Mutex<Vec<(String, Option<String>)>>,
    pub terminated: Mutex<Vec<Pid>>,
    pub exited_threads: Mutex<Vec<u32>>,
    pub interval_queries: Mutex<Vec<(u64, u64)>>,
    pub threads: u64,
    pub ticks: AtomicUsize,
    /// Interrupt state observed whenever a collaborator was called.
    pub irq_seen: Mutex<Vec<bool>>,
}

impl FakeKernel {
    /// A kernel whose current process is `init` (pid 1), a child of the
    /// system process (pid 0).
    pub fn new() -> Self {
        let system = Process::new(Pid::new(0), "system");
        let init = Process::new(Pid::new(1), "init");
        lifecycle::link_child(&system, &init, &IRQ);

        let memory = FakeMemory::default();
        memory.map(SCRATCH, SCRATCH_LEN, PageRights::READ_WRITE);
        memory.map(READ_ONLY, 0x1000, PageRights::READ);

        Self {
            memory,
            system,
            current: Some(init),
            next_pid: AtomicU64::new(100),
            create_error: Mutex::new(None),
            panic_on_create: AtomicBool::new(false),
            created: Mutex::default(),
            terminated: Mutex::default(),
            exited_threads: Mutex::default(),
            interval_queries: Mutex::default(),
            threads: 7,
            ticks: AtomicUsize::new(0),
            irq_seen: Mutex::default(),
        }
    }

    pub fn init(&self) -> &Arc<Process> {
        self.current.as_ref().unwrap()
    }

    fn observe(&self) {
        self.irq_seen.lock().unwrap().push(IRQ.are_enabled());
    }
}

impl Kernel for FakeKernel {
    type Interrupts = HostInterrupts;
    type Memory = FakeMemory;

    fn interrupts(&self) -> &HostInterrupts {
        &IRQ
    }

    fn memory(&self) -> &FakeMemory {
        &self.memory
    }

    fn current_process(&self) -> Option<Arc<Process>> {
        self.current.clone()
    }

    fn system_process(&self) -> Arc<Process> {
        Arc::clone(&self.system)
    }

    fn system_partition_path(&self) -> &str {
        "C:\\"
    }

    fn create_process(
        &self,
        path: &str,
        arguments: Option<&str>,
    ) -> Result<Arc<Process>, ProcessCreateError> {
        self.observe();
        assert!(
            !self.panic_on_create.load(Ordering::SeqCst),
            "loader crashed"
        );
        self.created
            .lock()
            .unwrap()
            .push((path.to_owned(), arguments.map(str::to_owned)));
        if let Some(err) = *self.create_error.lock().unwrap() {
            return Err(err);
        }
        let id = self.next_pid.fetch_add(1, Ordering::SeqCst);
        Ok(Process::new(Pid::new(id), format!("proc{id}")))
    }

    fn terminate_process(&self, process: &Arc<Process>) {
        self.observe();
        self.terminated.lock().unwrap().push(process.id());
    }

    fn exit_thread(&self, status: u32) {
        self.observe();
        self.exited_threads.lock().unwrap().push(status);
    }

    fn threads_in_interval(&self, start: u64, end: u64) -> u64 {
        self.observe();
        self.interval_queries.lock().unwrap().push((start, end));
        self.threads
    }

    fn thread_tick(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }
}

/// Maps a parameter block holding `sysno` and `args` at [`BLOCK`].
pub fn map_block(memory: &FakeMemory, sysno: u64, args: &[u64]) {
    let len = PARAMETER_BLOCK_SIZE.max(8 * (args.len() as u64 + 1));
    memory.map(BLOCK, len, PageRights::READ);
    let mut bytes = sysno.to_le_bytes().to_vec();
    for arg in args {
        bytes.extend_from_slice(&arg.to_le_bytes());
    }
    memory.poke(BLOCK, &bytes);
}

/// Enters the dispatcher the way the entry stub does.
pub fn enter(dispatcher: &Dispatcher<FakeKernel>, frame: &mut SyscallFrame) -> Status {
    IRQ.disable();
    dispatcher.handle(frame)
}

/// Issues `sysno(args...)` and returns the status left in RAX.
pub fn call(dispatcher: &Dispatcher<FakeKernel>, sysno: Sysno, args: &[u64]) -> Status {
    let memory = &dispatcher.kernel().memory;
    memory.unmap(BLOCK);
    map_block(memory, sysno.as_u64(), args);

    let mut frame = SyscallFrame::for_call(sysno.as_u64(), BLOCK);
    let status = enter(dispatcher, &mut frame);
    assert_eq!(frame.status(), Some(status));
    status
}

pub fn dispatcher() -> Dispatcher<FakeKernel> {
    Dispatcher::new(FakeKernel::new())
}

/// Writes `text` into the scratch buffer at `offset`.
pub fn put_text(dispatcher: &Dispatcher<FakeKernel>, offset: u64, text: &str) -> u64 {
    let address = SCRATCH + offset;
    dispatcher.kernel().memory.poke(address, text.as_bytes());
    address
}
