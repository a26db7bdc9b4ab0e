//! Running the fault handlers on a real core
//!
//! [`Target`] is the [`Platform`](crate::Platform) made of the kernel hooks,
//! the processor itself and a semihosting console. The fault state lives in a
//! `critical_section::Mutex`, and the `extern "C"` functions here are what the
//! assembly trampolines call.

use core::cell::RefCell;

use arm_cpu::{
    asm,
    register::{Cpsr, ProcessorMode},
    BankedRegisters,
};

use crate::{
    fault::{shared_data_abort, Disposition, FaultContext},
    frame::ExceptionFrame,
    platform::{Kernel, Processor, ThreadId},
    vectors::{install_exception_vectors, ExceptionEntries, VectorError, VectorTable},
};

#[cfg(feature = "ldr-fixup")]
type ActiveFixup = crate::fixup::DecodeAndResume;

#[cfg(not(feature = "ldr-fixup"))]
type ActiveFixup = crate::fixup::HaltOnly;

extern "C" {
    fn _asm_undef_swi_handler();
    fn _asm_abort_handler();
    fn _asm_data_abort_handler();

    fn _kernel_isr_nest_level() -> u32;
    fn _kernel_executing_thread() -> u32;
    fn _kernel_delete_thread(id: u32);
}

/// The system we are running on
pub struct Target;

impl Kernel for Target {
    fn isr_nest_level(&self) -> u32 {
        unsafe { _kernel_isr_nest_level() }
    }

    fn executing_thread(&self) -> ThreadId {
        ThreadId(unsafe { _kernel_executing_thread() })
    }

    fn delete_thread(&mut self, id: ThreadId) {
        unsafe { _kernel_delete_thread(id.0) }
    }
}

impl Processor for Target {
    fn cpsr(&self) -> Cpsr {
        Cpsr::read()
    }

    fn banked_registers(&mut self, mode: ProcessorMode) -> BankedRegisters {
        asm::banked_registers(mode)
    }

    fn disable_interrupts(&mut self) -> u32 {
        arm_cpu::interrupt::disable()
    }

    unsafe fn read_u8(&self, addr: u32) -> u8 {
        unsafe { (addr as usize as *const u8).read_volatile() }
    }

    unsafe fn read_u32(&self, addr: u32) -> u32 {
        unsafe { (addr as usize as *const u32).read_volatile() }
    }
}

impl core::fmt::Write for Target {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        semihosting::print!("{}", s);
        Ok(())
    }
}

static FAULTS: critical_section::Mutex<RefCell<FaultContext<Target, ActiveFixup>>> =
    critical_section::Mutex::new(RefCell::new(FaultContext::new(ActiveFixup {})));

/// Point the exception vectors at our trampolines
///
/// # Safety
///
/// The redirection table at [`VECTOR_TABLE_BASE`](crate::VECTOR_TABLE_BASE)
/// must be writable RAM, and nothing else may be writing to it.
pub unsafe fn init_exception_management() -> Result<(), VectorError> {
    let mut table = unsafe { VectorTable::redirection() };
    install_exception_vectors(
        &mut table,
        &ExceptionEntries {
            undef_swi: _asm_undef_swi_handler,
            abort: _asm_abort_handler,
            data_abort: _asm_data_abort_handler,
        },
    )
}

/// Swap the handler used for undefined instructions, software interrupts and
/// prefetch aborts
pub fn set_exception_hook(
    hook: crate::fault::ExceptionHook<Target>,
) -> crate::fault::ExceptionHook<Target> {
    critical_section::with(|cs| FAULTS.borrow_ref_mut(cs).set_exception_hook(hook))
}

/// Number of data aborts taken since boot
pub fn abort_count() -> u32 {
    critical_section::with(|cs| FAULTS.borrow_ref(cs).history().count())
}

fn conclude(disposition: Disposition) {
    match disposition {
        Disposition::Resume => {}
        // deleting the running thread should never come back here
        Disposition::Halt | Disposition::ThreadDeleted(_) => {
            // a critical section may have put the interrupt level back on exit
            arm_cpu::interrupt::disable();
            asm::halt()
        }
    }
}

/// Called by the undefined instruction, software interrupt and prefetch abort
/// trampolines
///
/// # Safety
///
/// `frame` must point at the register block the trampoline saved.
#[no_mangle]
pub unsafe extern "C" fn _default_exception_handler(frame: *const ExceptionFrame) {
    let frame = unsafe { &*frame };
    // Take the hook out first: deleting the running thread never returns, and
    // the fault state must not stay borrowed when it doesn't.
    let hook = critical_section::with(|cs| FAULTS.borrow_ref(cs).exception_hook());
    conclude(hook(&mut Target, frame));
}

/// Called by the data abort trampoline
///
/// Returning means the abort was fixed up and the trampoline should resume
/// after the faulting instruction.
///
/// # Safety
///
/// `frame` must point at the register block the trampoline saved, and the
/// trampoline must load the registers back from it before resuming.
#[no_mangle]
pub unsafe extern "C" fn _data_abort_handler(insn: u32, spsr: u32, frame: *mut ExceptionFrame) {
    let frame = unsafe { &mut *frame };
    conclude(shared_data_abort(&FAULTS, &mut Target, insn, spsr, frame));
}
