//! Fault handling: the default exception handler and the data abort handler
//!
//! Neither handler lets the faulting code carry on unless a fix-up succeeded.
//! They report what happened on the console and hand back a [`Disposition`]
//! that says how the story ends; [`crate::arch`] turns that into a halt on
//! target.

use core::{cell::RefCell, fmt::Write};

use crate::{
    abort::{AbortHistory, ABORT_HISTORY_LEN},
    decode::{Instruction, LoadStore},
    dump::print_full_context,
    fixup::{Fixup, HaltOnly, LoadFixup},
    frame::ExceptionFrame,
    platform::{Platform, ThreadId},
};

/// How a fault was disposed of
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Disposition {
    /// The fault was fixed up; return to the trampoline and carry on
    Resume,
    /// Nothing can be done; stop the processor
    Halt,
    /// The faulting thread was handed to the scheduler for deletion
    ThreadDeleted(ThreadId),
}

/// Signature of a handler for undefined instructions, software interrupts and
/// prefetch aborts
pub type ExceptionHook<S> = fn(&mut S, &ExceptionFrame) -> Disposition;

const RULE: &str = "----------------------------------------------------------";

/// The handler every exception goes to unless a hook replaces it
///
/// A fault taken while an interrupt handler was running has nothing to do
/// with the interrupted thread, and the return address points back at the
/// faulting instruction, so the only way out is to lock the system. A fault
/// in thread context costs the thread its life.
pub fn default_exception_handler<S: Platform>(
    sys: &mut S,
    frame: &ExceptionFrame,
) -> Disposition {
    let thread = sys.executing_thread();
    let _ = report_exception(sys, frame, thread);

    if sys.isr_nest_level() > 0 {
        let _ = writeln!(sys, "Exception while executing ISR!!!. System locked");
        Disposition::Halt
    } else {
        let _ = writeln!(sys, "*********** FAULTY THREAD WILL BE DELETED **************");
        sys.delete_thread(thread);
        Disposition::ThreadDeleted(thread)
    }
}

fn report_exception<S: Platform>(
    sys: &mut S,
    frame: &ExceptionFrame,
    thread: ThreadId,
) -> core::fmt::Result {
    let pc = frame.lr.wrapping_sub(4);
    writeln!(sys)?;
    writeln!(sys, "{}", RULE)?;
    writeln!(
        sys,
        "Exception 0x{:x} caught at PC 0x{:x} by thread {}",
        frame.ip(),
        pc,
        thread.0
    )?;
    writeln!(sys, "{}", RULE)?;
    writeln!(sys, "Processor execution context at time of the fault was  :")?;
    writeln!(sys, "{}", RULE)?;
    let r = &frame.r;
    writeln!(
        sys,
        " r0  = {:8x}  r1  = {:8x}  r2  = {:8x}  r3  = {:8x}",
        r[0], r[1], r[2], r[3]
    )?;
    writeln!(
        sys,
        " r4  = {:8x}  r5  = {:8x}  r6  = {:8x}  r7  = {:8x}",
        r[4], r[5], r[6], r[7]
    )?;
    writeln!(
        sys,
        " r8  = {:8x}  r9  = {:8x}  r10 = {:8x}",
        r[8], r[9], r[10]
    )?;
    writeln!(
        sys,
        " fp  = {:8x}  ip  = {:8x}  sp  = {:8x}  pc  = {:8x}",
        frame.fp(),
        frame.ip(),
        frame.sp,
        pc
    )?;
    writeln!(sys, "{}", RULE)
}

/// State owned by the fault handlers
///
/// `S` is the platform the handlers run against, `F` the strategy for
/// faulting word loads and `N` the depth of the abort history.
pub struct FaultContext<S, F = HaltOnly, const N: usize = ABORT_HISTORY_LEN> {
    history: AbortHistory<N>,
    exception_hook: ExceptionHook<S>,
    fixup: F,
    handling_abort: bool,
}

impl<S: Platform, F: LoadFixup, const N: usize> FaultContext<S, F, N> {
    /// A context that sends exceptions to [`default_exception_handler`]
    pub const fn new(fixup: F) -> Self {
        FaultContext {
            history: AbortHistory::new(),
            exception_hook: default_exception_handler::<S>,
            fixup,
            handling_abort: false,
        }
    }

    /// Replace the exception handler, returning the one it replaces
    pub fn set_exception_hook(&mut self, hook: ExceptionHook<S>) -> ExceptionHook<S> {
        core::mem::replace(&mut self.exception_hook, hook)
    }

    /// The handler [`exception`](Self::exception) dispatches to
    pub fn exception_hook(&self) -> ExceptionHook<S> {
        self.exception_hook
    }

    /// The data aborts seen so far
    pub fn history(&self) -> &AbortHistory<N> {
        &self.history
    }

    /// Handle an undefined instruction, software interrupt or prefetch abort
    pub fn exception(&mut self, sys: &mut S, frame: &ExceptionFrame) -> Disposition {
        (self.exception_hook)(sys, frame)
    }

    /// Start handling a data abort
    ///
    /// Records the fault address (`lr - 8`) in the history and hands back a
    /// copy of the fix-up strategy, so the rest of the work can run without
    /// holding on to this context. Returns `None` if a data abort is already
    /// being handled: the handler itself faulted.
    pub fn enter_data_abort(&mut self, frame: &ExceptionFrame) -> Option<F> {
        self.history.record(frame.lr.wrapping_sub(8));
        if self.handling_abort {
            None
        } else {
            self.handling_abort = true;
            Some(self.fixup)
        }
    }

    /// Finish handling a data abort
    pub fn leave_data_abort(&mut self) {
        self.handling_abort = false;
    }

    /// Handle a data abort
    ///
    /// `insn` is the instruction that faulted, `spsr` the status register of
    /// the interrupted code and `frame` its registers. Every abort is recorded
    /// in the history. Unless the fix-up strategy completes the access, the
    /// fault is reported, interrupts are masked and the answer is
    /// [`Disposition::Halt`]; the nesting level is not consulted and no
    /// thread is deleted.
    pub fn data_abort(
        &mut self,
        sys: &mut S,
        insn: u32,
        spsr: u32,
        frame: &mut ExceptionFrame,
    ) -> Disposition {
        let disposition = match self.enter_data_abort(frame) {
            Some(fixup) => report_data_abort(sys, &fixup, insn, spsr, frame),
            None => nested_data_abort(sys, frame),
        };
        self.leave_data_abort();
        disposition
    }
}

/// Handle a data abort against fault state shared behind a
/// `critical_section::Mutex`
///
/// The state is only borrowed to record the abort and at the end to close it
/// off, so the report and the fix-up can themselves fault. An abort taken
/// while the first one is still being handled is reported by
/// [`nested_data_abort`].
pub fn shared_data_abort<S: Platform, F: LoadFixup, const N: usize>(
    faults: &critical_section::Mutex<RefCell<FaultContext<S, F, N>>>,
    sys: &mut S,
    insn: u32,
    spsr: u32,
    frame: &mut ExceptionFrame,
) -> Disposition {
    let entered = critical_section::with(|cs| faults.borrow_ref_mut(cs).enter_data_abort(frame));
    let Some(fixup) = entered else {
        return nested_data_abort(sys, frame);
    };
    let disposition = report_data_abort(sys, &fixup, insn, spsr, frame);
    if disposition == Disposition::Resume {
        critical_section::with(|cs| faults.borrow_ref_mut(cs).leave_data_abort());
    }
    disposition
}

/// Decode, fix up or report a data abort
///
/// This is the part of [`FaultContext::data_abort`] that touches the
/// faulting code's memory.
pub fn report_data_abort<S: Platform, F: LoadFixup>(
    sys: &mut S,
    fixup: &F,
    insn: u32,
    spsr: u32,
    frame: &mut ExceptionFrame,
) -> Disposition {
    let fault_addr = frame.lr.wrapping_sub(8);
    let instruction = Instruction::new_with_raw_value(insn);
    let class = instruction.class();
    let _ = writeln!(sys);
    let _ = writeln!(sys);
    match class {
        Some(class) => {
            let _ = writeln!(sys, "{}", class.label());
        }
        None => {
            let _ = writeln!(sys, "Unrecognized instruction");
        }
    }

    if class == Some(LoadStore::Ldr) && fixup.fixup_load(sys, instruction, frame) == Fixup::Resumed
    {
        return Disposition::Resume;
    }

    let _ = writeln!(
        sys,
        "data_abort at address 0x{:x}, instruction: 0x{:x},   spsr = 0x{:x}",
        fault_addr, insn, spsr
    );
    let _ = print_full_context(sys, spsr);

    sys.disable_interrupts();
    Disposition::Halt
}

/// A data abort taken while reporting another one
///
/// Nothing past the frame is trusted: the address is printed, interrupts
/// are masked and the system stops.
pub fn nested_data_abort<S: Platform>(sys: &mut S, frame: &ExceptionFrame) -> Disposition {
    let _ = writeln!(
        sys,
        "\n\ndata_abort at address 0x{:x} while handling a data abort. System locked",
        frame.lr.wrapping_sub(8)
    );
    sys.disable_interrupts();
    Disposition::Halt
}
