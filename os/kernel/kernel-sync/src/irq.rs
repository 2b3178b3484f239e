//! Local interrupt masking.
//!
//! Masking interrupts is never used as the only means of exclusion: every
//! primitive in this crate pairs an [`IrqGuard`] with its own spin lock, so
//! the critical section is also protected against other execution units.

use crate::{SpinLock, SpinLockGuard};
use core::ops::{Deref, DerefMut};

/// Control over the interrupt flag of the current execution unit.
pub trait Interrupts {
    /// Whether interrupts are currently enabled.
    fn are_enabled(&self) -> bool;

    /// Enables interrupts.
    fn enable(&self);

    /// Disables interrupts.
    fn disable(&self);
}

impl<I: Interrupts + ?Sized> Interrupts for &I {
    #[inline]
    fn are_enabled(&self) -> bool {
        (**self).are_enabled()
    }

    #[inline]
    fn enable(&self) {
        (**self).enable();
    }

    #[inline]
    fn disable(&self) {
        (**self).disable();
    }
}

/// RAII guard that disables interrupts on creation and restores them on drop.
///
/// `IrqGuard::new()` snapshots the interrupt state. If interrupts were
/// enabled, it disables them. On drop, interrupts are re-enabled **only** if
/// they were previously enabled, preserving the original state. Guards nest.
///
/// # Examples
///
/// ```no_run
/// use kernel_sync::irq::{Interrupts, IrqGuard};
///
/// fn critical<I: Interrupts>(irq: &I) {
///     let _g = IrqGuard::new(irq); // interrupts disabled here if previously enabled
///     // critical section
/// } // state restored
/// ```
pub struct IrqGuard<'a, I: Interrupts + ?Sized> {
    irq: &'a I,
    /// Whether interrupts were enabled when the guard was created.
    were_enabled: bool,
}

impl<'a, I: Interrupts + ?Sized> IrqGuard<'a, I> {
    /// Disables interrupts if they are currently enabled and remembers the state.
    #[inline]
    #[must_use]
    pub fn new(irq: &'a I) -> Self {
        let enabled = irq.are_enabled();
        if enabled {
            irq.disable();
        }
        Self {
            irq,
            were_enabled: enabled,
        }
    }

    /// Whether interrupts will be re-enabled when this guard drops.
    #[inline]
    #[must_use]
    pub const fn were_enabled(&self) -> bool {
        self.were_enabled
    }
}

impl<I: Interrupts + ?Sized> Drop for IrqGuard<'_, I> {
    /// Restores interrupts only if they were previously enabled.
    fn drop(&mut self) {
        if self.were_enabled {
            self.irq.enable();
        }
    }
}

/// A spin lock guard that also keeps interrupts disabled while held.
///
/// Created via [`SpinLock::lock_irq`]: interrupts are masked first, then the
/// lock is taken. On drop the lock is released first and interrupts are
/// restored afterwards.
pub struct IrqSpinLockGuard<'a, T, I: Interrupts + ?Sized> {
    // Field order is drop order: unlock before restoring interrupts.
    guard: SpinLockGuard<'a, T>,
    _irq: IrqGuard<'a, I>,
}

impl<T> SpinLock<T> {
    /// Acquires the lock with interrupts disabled for the guard's lifetime.
    #[inline]
    pub fn lock_irq<'a, I: Interrupts + ?Sized>(
        &'a self,
        irq: &'a I,
    ) -> IrqSpinLockGuard<'a, T, I> {
        let ig = IrqGuard::new(irq);
        let guard = self.lock();
        IrqSpinLockGuard { guard, _irq: ig }
    }
}

impl<T, I: Interrupts + ?Sized> Deref for IrqSpinLockGuard<'_, T, I> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T, I: Interrupts + ?Sized> DerefMut for IrqSpinLockGuard<'_, T, I> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

/// The interrupt flag of an x86-64 CPU, driven by `cli`/`sti`.
///
/// # Safety & Privilege
///
/// These operations must run in a context where `cli`/`sti` are legal
/// (e.g., kernel or a suitable hypervisor context). Calling from user space
/// raises `#GP`.
#[cfg(feature = "asm")]
#[derive(Debug, Default, Copy, Clone)]
pub struct X86Interrupts;

#[cfg(feature = "asm")]
impl Interrupts for X86Interrupts {
    #[inline]
    fn are_enabled(&self) -> bool {
        (x86::rflags() & (1 << 9)) != 0
    }

    #[inline]
    fn enable(&self) {
        x86::sti_enable_interrupts();
    }

    #[inline]
    fn disable(&self) {
        x86::cli_stop_interrupts();
    }
}

#[cfg(feature = "asm")]
mod x86 {
    /// Disables hardware interrupts (`cli`).
    #[inline]
    pub fn cli_stop_interrupts() {
        unsafe { core::arch::asm!("cli", options(nomem, nostack, preserves_flags)) }
    }

    /// Enables hardware interrupts (`sti`).
    #[inline]
    pub fn sti_enable_interrupts() {
        unsafe { core::arch::asm!("sti", options(nomem, nostack, preserves_flags)) }
    }

    /// Returns the current `RFLAGS` value (via `pushfq/pop`).
    ///
    /// Bit 9 (`IF`) indicates whether interrupts are enabled.
    #[inline]
    #[must_use]
    pub fn rflags() -> u64 {
        let r: u64;
        unsafe { core::arch::asm!("pushfq; pop {}", out(reg) r, options(preserves_flags)) }
        r
    }
}
