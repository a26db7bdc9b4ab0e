//! Code for managing the *Current Program Status Register*
//!
//! The same layout is used for the *Saved Program Status Register* that the
//! processor banks on exception entry, so [`Cpsr`] also decodes SPSR values.

use arbitrary_int::{u5, Number};

/// The current mode of the processor
#[derive(Debug, Copy, Clone, PartialEq, Eq, num_enum::TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ProcessorMode {
    /// User Mode
    Usr = 0b10000,
    /// FIQ Mode
    Fiq = 0b10001,
    /// IRQ Mode
    Irq = 0b10010,
    /// Supervisor Mode
    Svc = 0b10011,
    /// Abort Mode
    Abt = 0b10111,
    /// Undefined Mode
    Und = 0b11011,
    /// System Mode
    Sys = 0b11111,
}

/// CPSR (*Current Program Status Register*)
#[bitbybit::bitfield(u32)]
pub struct Cpsr {
    /// Negative Result from ALU
    #[bit(31, rw)]
    n: bool,
    /// Zero Result from ALU
    #[bit(30, rw)]
    z: bool,
    /// ALU operation Carry Out
    #[bit(29, rw)]
    c: bool,
    /// ALU operation Overflow
    #[bit(28, rw)]
    v: bool,
    /// IRQ Interrupts Disabled
    #[bit(7, rw)]
    i: bool,
    /// FIQ Interrupts Disabled
    #[bit(6, rw)]
    f: bool,
    /// Thumb state
    #[bit(5, rw)]
    t: bool,
    /// Mode field
    #[bits(0..=4, rw)]
    mode_bits: u5,
}

impl Cpsr {
    /// The bits that make up the interrupt level (I and F)
    pub const ISR_MASK: u32 = Cpsr::new_with_raw_value(0)
        .with_i(true)
        .with_f(true)
        .raw_value();

    /// The processor mode, or the raw field if it names no mode
    pub fn mode(&self) -> Result<ProcessorMode, u8> {
        let bits = self.mode_bits().as_u8();
        ProcessorMode::try_from(bits).map_err(|_| bits)
    }

    /// Replace the mode field
    pub const fn with_mode(self, mode: ProcessorMode) -> Cpsr {
        self.with_mode_bits(u5::new(mode as u8))
    }

    /// The I and F bits, left in place
    pub const fn isr_level(&self) -> u32 {
        self.raw_value() & Self::ISR_MASK
    }

    /// Reads CPSR (*Current Program Status Register*)
    #[cfg(target_arch = "arm")]
    #[inline]
    pub fn read() -> Self {
        let r: u32;
        // Safety: Reading this register has no side-effects and is atomic
        unsafe {
            core::arch::asm!("mrs {}, CPSR", out(reg) r, options(nomem, nostack, preserves_flags));
        }
        Self::new_with_raw_value(r)
    }
}

impl core::fmt::Debug for Cpsr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "CPSR {{ N={} Z={} C={} V={} I={} F={} T={} MODE={:?} }}",
            self.n() as u8,
            self.z() as u8,
            self.c() as u8,
            self.v() as u8,
            self.i() as u8,
            self.f() as u8,
            self.t() as u8,
            self.mode(),
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Cpsr {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "CPSR({=u32:#x})", self.raw_value())
    }
}
