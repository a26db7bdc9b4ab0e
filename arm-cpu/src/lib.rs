//! CPU/peripheral support for classic Arm AArch32 processors (ARMv4T/ARMv5TE)
//!
//! The register types are plain bitfields and work on any host, which is how
//! the kernel port tests its fault handling. Everything that executes an Arm
//! instruction is only available when building for `target_arch = "arm"`.

#![no_std]

#[cfg(target_arch = "arm")]
pub mod asm;

#[cfg(target_arch = "arm")]
pub mod interrupt;

#[cfg(all(target_arch = "arm", feature = "critical-section-single-core"))]
mod critical_section;

pub mod register;

/// The register values a mode keeps in its own bank
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BankedRegisters {
    /// The banked stack pointer (R13)
    pub sp: u32,
    /// The banked link register (R14)
    pub lr: u32,
}
