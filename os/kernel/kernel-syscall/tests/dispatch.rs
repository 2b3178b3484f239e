mod common;

use common::*;
use kernel_sync::Interrupts;
use kernel_syscall::SyscallFrame;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use syscall_abi::{PageRights, SYSCALL_IMPLEMENTED_IF_VERSION, Status, Sysno};

#[test]
fn matching_version_succeeds() {
    let d = dispatcher();
    let status = call(&d, Sysno::IdentifyVersion, &[u64::from(SYSCALL_IMPLEMENTED_IF_VERSION)]);
    assert_eq!(status, Status::Success);
}

#[test]
fn version_mismatch_is_not_a_generic_failure() {
    let d = dispatcher();
    let status = call(
        &d,
        Sysno::IdentifyVersion,
        &[u64::from(SYSCALL_IMPLEMENTED_IF_VERSION) + 1],
    );
    assert_eq!(status, Status::IncompatibleInterface);
    assert_ne!(status, Status::Unsuccessful);
}

#[test]
fn unreadable_parameter_block_reads_nothing() {
    let d = dispatcher();
    let mut frame = SyscallFrame::for_call(Sysno::IdentifyVersion.as_u64(), 0xDEAD_0000);

    let status = enter(&d, &mut frame);

    assert_eq!(status, Status::Unsuccessful);
    assert_eq!(frame.status(), Some(Status::Unsuccessful));
    assert_eq!(d.kernel().memory.reads(), 0);
}

#[test]
fn null_parameter_block_is_rejected() {
    let d = dispatcher();
    let mut frame = SyscallFrame::for_call(Sysno::ThreadExit.as_u64(), 0);

    assert_eq!(enter(&d, &mut frame), Status::Unsuccessful);
    assert!(d.kernel().exited_threads.lock().unwrap().is_empty());
}

#[test]
fn block_shorter_than_the_mandatory_window_is_rejected() {
    let d = dispatcher();
    d.kernel().memory.map(BLOCK, 0x18, PageRights::READ);
    let mut frame = SyscallFrame::for_call(Sysno::IdentifyVersion.as_u64(), BLOCK);

    assert_eq!(enter(&d, &mut frame), Status::Unsuccessful);
    assert_eq!(d.kernel().memory.reads(), 0);
}

#[test]
fn unknown_identifier_is_unsupported() {
    let d = dispatcher();
    map_block(&d.kernel().memory, 0x1234, &[]);
    let mut frame = SyscallFrame::for_call(0x1234, BLOCK);

    assert_eq!(enter(&d, &mut frame), Status::Unsupported);
    assert_eq!(frame.status(), Some(Status::Unsupported));
}

#[test]
fn recognised_but_unimplemented_calls_are_unsupported() {
    let d = dispatcher();
    for sysno in [
        Sysno::ThreadCreate,
        Sysno::ProcessGetPid,
        Sysno::FileRead,
        Sysno::SwapOut,
    ] {
        assert_eq!(call(&d, sysno, &[]), Status::Unsupported, "{sysno:?}");
    }
}

#[test]
fn identifier_comes_from_the_register_not_the_block() {
    let d = dispatcher();
    // Slot 0 claims an unknown call; R8 asks for the version check.
    map_block(
        &d.kernel().memory,
        0xFFFF,
        &[u64::from(SYSCALL_IMPLEMENTED_IF_VERSION)],
    );
    let mut frame = SyscallFrame::for_call(Sysno::IdentifyVersion.as_u64(), BLOCK);

    assert_eq!(enter(&d, &mut frame), Status::Success);
}

#[test]
fn interrupts_are_enabled_during_the_call_and_masked_after() {
    let d = dispatcher();
    assert_eq!(call(&d, Sysno::ThreadExit, &[0]), Status::Success);

    assert_eq!(*d.kernel().irq_seen.lock().unwrap(), vec![true]);
    assert!(!IRQ.are_enabled());
}

#[test]
fn interrupts_are_masked_after_a_failed_call() {
    let d = dispatcher();
    let mut frame = SyscallFrame::for_call(Sysno::ThreadExit.as_u64(), 0);
    let _ = enter(&d, &mut frame);
    assert!(!IRQ.are_enabled());
}

#[test]
fn only_rax_is_written() {
    let d = dispatcher();
    map_block(&d.kernel().memory, Sysno::ThreadExit.as_u64(), &[3]);
    let mut frame = SyscallFrame {
        rbx: 1,
        rcx: 2,
        rdi: 3,
        r15: 4,
        rip: 0x40_1000,
        rsp: 0x7FFF_0000,
        ..SyscallFrame::for_call(Sysno::ThreadExit.as_u64(), BLOCK)
    };
    let before = frame.clone();

    let _ = enter(&d, &mut frame);

    assert_eq!(
        frame,
        SyscallFrame {
            rax: 0,
            ..before
        }
    );
}

#[test]
fn status_is_written_even_if_a_handler_panics() {
    let d = dispatcher();
    d.kernel().panic_on_create.store(true, Ordering::SeqCst);
    let path = put_text(&d, 0, "app.exe");
    let handle = SCRATCH + 0x800;
    map_block(&d.kernel().memory, Sysno::ProcessCreate.as_u64(), &[path, 7, 0, 0, handle]);

    let mut frame = SyscallFrame {
        rax: 0xAAAA,
        ..SyscallFrame::for_call(Sysno::ProcessCreate.as_u64(), BLOCK)
    };
    let result = panic::catch_unwind(AssertUnwindSafe(|| enter(&d, &mut frame)));

    assert!(result.is_err());
    assert_eq!(frame.status(), Some(Status::Unsuccessful));
    assert!(!IRQ.are_enabled());
}

#[test]
fn parameters_past_the_window_are_validated() {
    let d = dispatcher();
    // VirtualAlloc reads seven parameters; only three fit in the window.
    d.kernel().memory.map(BLOCK, 0x20, PageRights::READ);
    d.kernel().memory.poke(
        BLOCK,
        &[
            Sysno::VirtualAlloc.as_u64().to_le_bytes(),
            0u64.to_le_bytes(),
            0x1000u64.to_le_bytes(),
            3u64.to_le_bytes(),
        ]
        .concat(),
    );
    let mut frame = SyscallFrame::for_call(Sysno::VirtualAlloc.as_u64(), BLOCK);

    assert_eq!(enter(&d, &mut frame), Status::Unsuccessful);
    assert!(d.kernel().memory.allocations.lock().unwrap().is_empty());
}
