//! What to do about a data abort on a single word load
//!
//! The shipped behaviour is [`HaltOnly`]. [`DecodeAndResume`] performs the
//! load a byte at a time, which gets past alignment faults on word loads with
//! an immediate offset and no write back. Every other addressing form is still
//! only reported.

use core::fmt::Write;

use crate::{
    decode::{Indexing, Instruction},
    frame::ExceptionFrame,
    platform::Platform,
};

/// Result of a fix-up attempt
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fixup {
    /// The destination register holds the loaded value; skip the instruction
    Resumed,
    /// Nothing was done
    NotHandled,
}

/// A strategy for faulting `LDR` instructions
pub trait LoadFixup: Copy {
    /// Try to complete the load `insn` on behalf of the faulting code
    fn fixup_load<S: Platform>(
        &self,
        sys: &mut S,
        insn: Instruction,
        frame: &mut ExceptionFrame,
    ) -> Fixup;
}

/// Never emulate anything
#[derive(Debug, Copy, Clone, Default)]
pub struct HaltOnly;

impl LoadFixup for HaltOnly {
    fn fixup_load<S: Platform>(
        &self,
        _sys: &mut S,
        _insn: Instruction,
        _frame: &mut ExceptionFrame,
    ) -> Fixup {
        Fixup::NotHandled
    }
}

/// Emulate `LDR Rd, [Rn, #+/-imm12]` and resume
#[derive(Debug, Copy, Clone, Default)]
pub struct DecodeAndResume;

impl LoadFixup for DecodeAndResume {
    fn fixup_load<S: Platform>(
        &self,
        sys: &mut S,
        insn: Instruction,
        frame: &mut ExceptionFrame,
    ) -> Fixup {
        if insn.register_offset() {
            return Fixup::NotHandled;
        }
        match insn.indexing() {
            Indexing::PostIndexed => {
                let _ = writeln!(sys, "\tPost-indexed");
                Fixup::NotHandled
            }
            Indexing::UserMode => {
                let _ = writeln!(sys, "\tUser mode");
                Fixup::NotHandled
            }
            Indexing::PreIndexed => {
                let _ = writeln!(sys, "\tPre-indexed");
                Fixup::NotHandled
            }
            Indexing::Offset => {
                let rd = insn.data_register();
                if rd == 15 {
                    let _ = writeln!(sys, "\tLoad into PC");
                    return Fixup::NotHandled;
                }
                let addr = insn.offset_address(frame.register(insn.base_register()));
                let mut bytes = [0u8; 4];
                for (i, byte) in (0u32..).zip(bytes.iter_mut()) {
                    // Safety: these are the bytes the faulting load asked for.
                    // If they are not mapped the nested abort is reported and
                    // the system halts.
                    *byte = unsafe { sys.read_u8(addr.wrapping_add(i)) };
                }
                frame.set_register(rd, u32::from_le_bytes(bytes));
                Fixup::Resumed
            }
        }
    }
}
