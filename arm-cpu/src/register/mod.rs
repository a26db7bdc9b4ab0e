//! Access registers in classic AArch32 processors

pub mod cpsr;

#[doc(inline)]
pub use cpsr::{Cpsr, ProcessorMode};
