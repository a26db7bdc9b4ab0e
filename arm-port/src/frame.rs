//! The register block the assembly trampolines hand to us

/// Registers captured by an exception trampoline
///
/// The trampoline pushes r0 to r12, the stack pointer and the link register in
/// that order and passes a pointer to the block. For undefined instruction,
/// software interrupt and prefetch abort entries, `ip` (r12) carries the vector
/// number of the exception that was taken.
///
/// This layout is shared with assembly, do not reorder.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExceptionFrame {
    /// r0 to r12
    pub r: [u32; 13],
    /// r13 of the interrupted mode
    pub sp: u32,
    /// r14 of the exception mode, i.e. the return address
    pub lr: u32,
}

impl ExceptionFrame {
    /// Size of the block in bytes, must match the trampolines
    pub const SIZE: usize = 15 * 4;

    /// The frame pointer (r11)
    pub fn fp(&self) -> u32 {
        self.r[11]
    }

    /// The intra-procedure scratch register (r12)
    pub fn ip(&self) -> u32 {
        self.r[12]
    }

    /// Read register `n` as the faulting instruction would have seen it
    ///
    /// r15 reads as the address of the instruction plus 8, which for a data
    /// abort is exactly the saved link register.
    pub fn register(&self, n: u8) -> u32 {
        match n {
            0..=12 => self.r[usize::from(n)],
            13 => self.sp,
            14 | 15 => self.lr,
            _ => 0,
        }
    }

    /// Overwrite general purpose register `n`
    ///
    /// Only r0 to r14 can be written; anything else is refused with `false`.
    pub fn set_register(&mut self, n: u8, value: u32) -> bool {
        match n {
            0..=12 => self.r[usize::from(n)] = value,
            13 => self.sp = value,
            14 => self.lr = value,
            _ => return false,
        }
        true
    }
}
