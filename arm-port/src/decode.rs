//! Just enough of the A32 load/store encodings to explain a data abort

use arbitrary_int::{u12, u4, Number};

/// Bits of the decode field (instruction bits 27:20) that pick a class
pub const CLASS_MASK: u8 = 0xC5;

/// The load/store classes a data abort can come from
///
/// The discriminant is the decode field masked with [`CLASS_MASK`]: bits 27
/// and 26 separate block from single transfers, bit 22 is the byte (or
/// S-bit) flag and bit 20 is load/store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, num_enum::TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LoadStore {
    /// Store multiple
    Stm1 = 0x80,
    /// Store multiple, user bank registers
    Stm2 = 0x84,
    /// Store word
    Str = 0x40,
    /// Store byte
    Strb = 0x44,
    /// Load multiple
    Ldm1 = 0x81,
    /// Load multiple, user bank registers or with CPSR restore
    Ldm23 = 0x85,
    /// Load word
    Ldr = 0x41,
    /// Load byte
    Ldrb = 0x45,
}

impl LoadStore {
    /// The name printed when an abort of this class is taken
    pub fn label(&self) -> &'static str {
        match self {
            LoadStore::Stm1 => "STM1",
            LoadStore::Stm2 => "STM2",
            LoadStore::Str => "STR",
            LoadStore::Strb => "STRB",
            LoadStore::Ldm1 => "LDM1",
            LoadStore::Ldm23 => "LDM23",
            LoadStore::Ldr => "LDR",
            LoadStore::Ldrb => "LDRB",
        }
    }
}

/// How a single data transfer uses its base register (P and W bits)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indexing {
    /// P=0, W=0: access at the base, then write back base +/- offset
    PostIndexed,
    /// P=0, W=1: post-indexed, with the access made as if from User mode
    UserMode,
    /// P=1, W=0: access at base +/- offset, base not updated
    Offset,
    /// P=1, W=1: access at base +/- offset, which is written back
    PreIndexed,
}

/// An A32 single data transfer / block transfer instruction word
#[bitbybit::bitfield(u32)]
pub struct Instruction {
    /// Condition code
    #[bits(28..=31, r)]
    cond: u4,
    /// Register (rather than immediate) offset
    #[bit(25, r)]
    i: bool,
    /// Pre-indexing
    #[bit(24, r)]
    p: bool,
    /// Add the offset (rather than subtract it)
    #[bit(23, r)]
    u: bool,
    /// Write back
    #[bit(21, r)]
    w: bool,
    /// Base register
    #[bits(16..=19, r)]
    rn: u4,
    /// Source/destination register
    #[bits(12..=15, r)]
    rd: u4,
    /// 12-bit immediate offset
    #[bits(0..=11, r)]
    imm12: u12,
}

impl Instruction {
    /// Instruction bits 27:20
    pub const fn decode_field(&self) -> u8 {
        (self.raw_value() >> 20) as u8
    }

    /// Classify the instruction, `None` if it is not a load/store we know
    pub fn class(&self) -> Option<LoadStore> {
        LoadStore::try_from(self.decode_field() & CLASS_MASK).ok()
    }

    /// The condition field
    pub fn condition(&self) -> u8 {
        self.cond().as_u8()
    }

    /// Does the instruction take its offset from a register?
    pub fn register_offset(&self) -> bool {
        self.i()
    }

    /// Which of the four indexing forms the P and W bits select
    pub fn indexing(&self) -> Indexing {
        match (self.p(), self.w()) {
            (false, false) => Indexing::PostIndexed,
            (false, true) => Indexing::UserMode,
            (true, false) => Indexing::Offset,
            (true, true) => Indexing::PreIndexed,
        }
    }

    /// Is the offset added to the base?
    pub fn adds_offset(&self) -> bool {
        self.u()
    }

    /// The base register number
    pub fn base_register(&self) -> u8 {
        self.rn().as_u8()
    }

    /// The source/destination register number
    pub fn data_register(&self) -> u8 {
        self.rd().as_u8()
    }

    /// The unsigned 12-bit immediate offset
    pub fn immediate_offset(&self) -> u32 {
        u32::from(self.imm12().as_u16())
    }

    /// Apply the immediate offset to `base` in the direction the U bit asks for
    pub fn offset_address(&self, base: u32) -> u32 {
        if self.adds_offset() {
            base.wrapping_add(self.immediate_offset())
        } else {
            base.wrapping_sub(self.immediate_offset())
        }
    }
}

impl core::fmt::Debug for Instruction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Instruction({:#010x})", self.raw_value())
    }
}
