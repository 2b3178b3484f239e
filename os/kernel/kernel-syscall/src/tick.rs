use crate::kernel::{Kernel, MemoryManager};
use log::debug;

/// Runs the periodic timer work on behalf of the interrupted thread.
///
/// Forwards to the scheduler tick, then reports the tracked pages of the
/// current process that the hardware marked as accessed or dirty. Returns
/// the number of such pages.
pub fn timer_tick<K: Kernel>(kernel: &K) -> usize {
    kernel.thread_tick();

    let Some(process) = kernel.current_process() else {
        return 0;
    };

    let memory = kernel.memory();
    let mut touched = 0;
    process.for_each_frame_mapping(kernel.interrupts(), |virtual_address| {
        if let Some(state) = memory.page_state(&process, virtual_address)
            && (state.accessed || state.dirty)
        {
            debug!(
                "{}: page {virtual_address:#x} -> {:#x} accessed={} dirty={}",
                process.id(),
                state.physical,
                state.accessed,
                state.dirty
            );
            touched += 1;
        }
    });
    touched
}
