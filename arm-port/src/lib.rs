//! # Kernel CPU port for classic Arm (ARMv4T/ARMv5TE)
//!
//! This library is the architecture specific part of a real-time kernel: it
//! prepares thread contexts, installs the exception vectors and decides what
//! happens when a thread or an interrupt handler faults.
//!
//! The kernel proper (scheduler, thread objects, interrupt nesting) is not
//! here. The handlers reach it through the [`Kernel`] trait, reach the
//! processor through [`Processor`], and write their diagnostics to a
//! [`core::fmt::Write`] console. A type that is all three is a [`Platform`].
//! The handlers themselves are plain functions of a [`FaultContext`] and a
//! platform, so they run just as well on the host under test.
//!
//! ## Features
//!
//! - `critical-section-single-core`: use the interrupt-masking
//!   `critical-section` implementation from `arm-cpu`.
//! - `ldr-fixup`: on target, a data abort on `LDR Rd, [Rn, #+/-imm]` is
//!   completed byte by byte and execution resumes, instead of halting. See
//!   [`fixup::DecodeAndResume`].
//! - `defmt`: adds `defmt::Format` implementations.
//!
//! ## Information about the Run-Time
//!
//! When built for `target_arch = "arm"`, the `arch` module supplies the glue.
//! We assume the following global symbols exist:
//!
//! ### Assembly trampolines
//!
//! These save the registers into an [`ExceptionFrame`] on the exception stack
//! and call into Rust. They must call in with IRQ masked, as the processor
//! left it on exception entry.
//!
//! * `_asm_undef_swi_handler` - taken for undefined instructions and software
//!   interrupts. Stores the vector number in r12 and calls
//!   `_default_exception_handler(frame)`.
//! * `_asm_abort_handler` - taken for prefetch aborts, IRQ and FIQ. Stores
//!   the vector number in r12 and calls `_default_exception_handler(frame)`.
//! * `_asm_data_abort_handler` - taken for data aborts. Calls
//!   `_data_abort_handler(insn, spsr, frame)` with the faulting instruction
//!   word and the SPSR. If that function returns, reload the registers from
//!   the frame and return to the instruction after the one that faulted.
//!
//! ### Kernel hooks
//!
//! * `extern "C" fn _kernel_isr_nest_level() -> u32` - the interrupt nesting
//!   depth.
//! * `extern "C" fn _kernel_executing_thread() -> u32` - object id of the
//!   running thread.
//! * `extern "C" fn _kernel_delete_thread(id: u32)` - delete a thread.
//!
//! ## Outputs
//!
//! This library produces global symbols called:
//!
//! * `_default_exception_handler` - reports the fault and either locks the
//!   system (fault inside an interrupt handler) or deletes the faulting
//!   thread.
//! * `_data_abort_handler` - records and reports a data abort, then halts
//!   unless the `ldr-fixup` feature could complete the access.
//!
//! Interrupt stacks are set up by the board support package before the kernel
//! starts; there is nothing for the port to do there.

#![cfg_attr(not(test), no_std)]

pub mod abort;
pub mod context;
pub mod decode;
pub mod dump;
pub mod fault;
pub mod fixup;
pub mod frame;
pub mod platform;
pub mod vectors;

#[cfg(target_arch = "arm")]
pub mod arch;

pub use abort::{AbortHistory, ABORT_HISTORY_LEN};
pub use context::ContextControl;
pub use fault::{
    default_exception_handler, shared_data_abort, Disposition, ExceptionHook, FaultContext,
};
pub use frame::ExceptionFrame;
pub use platform::{Kernel, Platform, Processor, ThreadId};
pub use vectors::{
    install_exception_vectors, ExceptionEntries, Handler, Vector, VectorError, VectorTable,
    MAX_EXCEPTIONS, VECTOR_TABLE_BASE,
};
