//! Simple assembly routines

use crate::{register::cpsr::ProcessorMode, register::Cpsr, BankedRegisters};

/// Emit an NOP instruction
///
/// ARMv4 has no architectural NOP, so the assembler emits `mov r0, r0`.
#[inline]
pub fn nop() {
    unsafe { core::arch::asm!("nop", options(nomem, nostack, preserves_flags)) }
}

/// Spin forever with interrupts left as they are
///
/// This is where an unrecoverable fault ends up. Only an external reset gets
/// the processor out of here.
#[inline]
pub fn halt() -> ! {
    loop {
        nop();
    }
}

/// Read the stack pointer and link register banked for `mode`
///
/// The processor switches to `mode` with IRQ and FIQ masked, copies SP and LR,
/// and switches back to the mode it was called from, all within one `asm!`
/// block. Nothing can be dispatched between the two mode switches, so the
/// values read belong to `mode` and the caller's mode is left unchanged.
///
/// User mode shares its bank with System mode and we could never leave User
/// mode again, so a request for [`ProcessorMode::Usr`] reads the System bank.
///
/// Must be called from a privileged mode.
#[inline]
pub fn banked_registers(mode: ProcessorMode) -> BankedRegisters {
    let mode = match mode {
        ProcessorMode::Usr => ProcessorMode::Sys,
        other => other,
    };
    let target = Cpsr::new_with_raw_value(0)
        .with_mode(mode)
        .with_i(true)
        .with_f(true)
        .raw_value();
    let sp: u32;
    let lr: u32;
    unsafe {
        core::arch::asm!(
            "mrs    r3, cpsr",
            "msr    cpsr_c, r0",
            "mov    r1, sp",
            "mov    r2, lr",
            "msr    cpsr_c, r3",
            in("r0") target,
            out("r1") sp,
            out("r2") lr,
            out("r3") _,
            options(nomem, nostack, preserves_flags)
        );
    }
    BankedRegisters { sp, lr }
}
