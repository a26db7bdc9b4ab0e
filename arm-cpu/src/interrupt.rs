//! Interrupt masking
//!
//! ARMv4 has no `cpsid`/`cpsie`, so every change is a read-modify-write of the
//! control field of CPSR.

use core::sync::atomic::{compiler_fence, Ordering};

use crate::register::Cpsr;

/// Return the current interrupt level
///
/// This is the I and F bits of CPSR, exactly as they sit in the register. A
/// set bit means that class of interrupt is masked.
#[inline]
pub fn level() -> u32 {
    Cpsr::read().isr_level()
}

/// Mask IRQ and FIQ, returning the level that was in force before
#[inline]
pub fn disable() -> u32 {
    let previous: u32;
    unsafe {
        core::arch::asm!(
            "mrs    {prev}, cpsr",
            "orr    {tmp}, {prev}, #{mask}",
            "msr    cpsr_c, {tmp}",
            prev = out(reg) previous,
            tmp = out(reg) _,
            mask = const Cpsr::ISR_MASK,
            options(nomem, nostack, preserves_flags)
        );
    }
    compiler_fence(Ordering::SeqCst);
    previous & Cpsr::ISR_MASK
}

/// Unmask IRQ and FIQ
///
/// # Safety
///
/// Do not call this function inside an interrupt-based critical section
#[inline]
pub unsafe fn enable() {
    compiler_fence(Ordering::SeqCst);
    unsafe {
        core::arch::asm!(
            "mrs    {tmp}, cpsr",
            "bic    {tmp}, {tmp}, #{mask}",
            "msr    cpsr_c, {tmp}",
            tmp = out(reg) _,
            mask = const Cpsr::ISR_MASK,
            options(nomem, nostack, preserves_flags)
        );
    }
}

/// Put the I and F bits back to `level`, as returned by [`disable`]
///
/// Bits of `level` outside I and F are ignored.
///
/// # Safety
///
/// Do not unmask interrupts this way inside an interrupt-based critical
/// section
#[inline]
pub unsafe fn restore(level: u32) {
    compiler_fence(Ordering::SeqCst);
    unsafe {
        core::arch::asm!(
            "mrs    {tmp}, cpsr",
            "bic    {tmp}, {tmp}, #{mask}",
            "orr    {tmp}, {tmp}, {level}",
            "msr    cpsr_c, {tmp}",
            tmp = out(reg) _,
            level = in(reg) level & Cpsr::ISR_MASK,
            mask = const Cpsr::ISR_MASK,
            options(nomem, nostack, preserves_flags)
        );
    }
}
