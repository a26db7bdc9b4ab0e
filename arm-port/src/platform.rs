//! The parts of the system the port talks to but does not own
//!
//! The fault handlers only ever see these traits. On target they are
//! implemented by [`crate::arch`]; tests implement them with a mock.

use arm_cpu::{
    register::{Cpsr, ProcessorMode},
    BankedRegisters,
};

/// Object identifier of a thread
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct ThreadId(pub u32);

impl core::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// The enclosing kernel
pub trait Kernel {
    /// How many interrupt handlers are active right now
    fn isr_nest_level(&self) -> u32;

    /// The thread that was running when the exception was taken
    fn executing_thread(&self) -> ThreadId;

    /// Ask the scheduler to destroy a thread
    ///
    /// When `id` is the executing thread this does not come back on a real
    /// system.
    fn delete_thread(&mut self, id: ThreadId);
}

/// Access to the processor state the fault handlers need
pub trait Processor {
    /// The current program status register
    fn cpsr(&self) -> Cpsr;

    /// Read the SP and LR banked for `mode`
    ///
    /// Implementations must leave the processor in the mode it was in and
    /// must not let an interrupt or another fault observe the intermediate
    /// mode; the switch, the capture and the switch back are one atomic
    /// sequence.
    fn banked_registers(&mut self, mode: ProcessorMode) -> BankedRegisters;

    /// Mask IRQ and FIQ, returning the previous interrupt level
    fn disable_interrupts(&mut self) -> u32;

    /// Read a byte of memory
    ///
    /// # Safety
    ///
    /// `addr` must be readable. A bad address raises another abort.
    unsafe fn read_u8(&self, addr: u32) -> u8;

    /// Read a naturally aligned word of memory
    ///
    /// # Safety
    ///
    /// `addr` must be readable and word aligned.
    unsafe fn read_u32(&self, addr: u32) -> u32;
}

/// Everything a fault handler is given: the kernel, the processor and a
/// console for diagnostics
pub trait Platform: Kernel + Processor + core::fmt::Write {}

impl<T> Platform for T where T: Kernel + Processor + core::fmt::Write {}
