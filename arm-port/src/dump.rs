//! Diagnostic dumps of the state a fault left behind

use core::fmt::Write;

use arm_cpu::register::{Cpsr, ProcessorMode};

use crate::platform::Platform;

/// Number of stack words printed by [`print_full_context`]
pub const STACK_DUMP_WORDS: u32 = 48;

/// Stack words per output line
pub const STACK_DUMP_WORDS_PER_LINE: u32 = 6;

/// Human readable name of a processor mode
pub fn mode_label(mode: ProcessorMode) -> &'static str {
    match mode {
        ProcessorMode::Usr => "user",
        ProcessorMode::Fiq => "fiq",
        ProcessorMode::Irq => "irq",
        ProcessorMode::Svc => "super",
        ProcessorMode::Abt => "abort",
        ProcessorMode::Und => "undef",
        ProcessorMode::Sys => "system",
    }
}

/// Name of the mode held in the low five bits of a status register value
///
/// Anything that is not one of the seven modes is "unknown".
pub fn mode_name(spsr: u32) -> &'static str {
    Cpsr::new_with_raw_value(spsr)
        .mode()
        .map(mode_label)
        .unwrap_or("unknown")
}

/// Print the state of the mode that was interrupted
///
/// `spsr` is the saved status register of the fault. The stack pointer and
/// link register banked for its mode are recovered, then a window of
/// [`STACK_DUMP_WORDS`] words is printed from that stack pointer up.
pub fn print_full_context<S: Platform>(sys: &mut S, spsr: u32) -> core::fmt::Result {
    let thread = sys.executing_thread();
    writeln!(sys, "active thread thread {}", thread)?;

    let mode = match Cpsr::new_with_raw_value(spsr).mode() {
        Ok(mode) => mode,
        Err(bits) => {
            // we can't switch into a reserved mode to look at its registers
            writeln!(sys, "Previous mode unknown ({:#04x}), no stack to show", bits)?;
            return Ok(());
        }
    };

    let banked = sys.banked_registers(mode);
    let cpsr = sys.cpsr();
    writeln!(
        sys,
        "Previous mode {} sp=0x{:08x} lr=0x{:08x} and actual cpsr={:08x}",
        mode_label(mode),
        banked.sp,
        banked.lr,
        cpsr.raw_value()
    )?;

    for i in 0..STACK_DUMP_WORDS {
        // Safety: this is the live stack of the interrupted mode
        let word = unsafe { sys.read_u32(banked.sp.wrapping_add(i * 4)) };
        write!(sys, " 0x{:08x}", word)?;
        if (i + 1) % STACK_DUMP_WORDS_PER_LINE == 0 {
            writeln!(sys)?;
        }
    }
    Ok(())
}
