//! Thread context set-up

use arm_cpu::register::{Cpsr, ProcessorMode};

/// The registers a thread switch saves and restores
///
/// Shared with the context switch assembly, do not reorder.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContextControl {
    pub cpsr: u32,
    pub r4: u32,
    pub r5: u32,
    pub r6: u32,
    pub r7: u32,
    pub r8: u32,
    pub r9: u32,
    pub r10: u32,
    pub fp: u32,
    pub sp: u32,
    pub lr: u32,
}

/// Mode bits every new thread starts with
const THREAD_MODE: u32 = Cpsr::new_with_raw_value(0)
    .with_mode(ProcessorMode::Svc)
    .raw_value();

impl ContextControl {
    /// Prepare a context so the dispatcher can switch to it
    ///
    /// The stack grows down from `stack_base + size`, the first switch
    /// "returns" to `entry_point`, and the thread runs in Supervisor mode with
    /// `new_level` as its interrupt level. `new_level` is OR'd in as given.
    ///
    /// `_is_fp` is accepted for the kernel's benefit; there is no floating
    /// point state on these cores.
    pub fn initialize(
        &mut self,
        stack_base: u32,
        size: u32,
        new_level: u32,
        entry_point: u32,
        _is_fp: bool,
    ) {
        self.sp = stack_base.wrapping_add(size);
        self.lr = entry_point;
        self.cpsr = new_level | THREAD_MODE;
    }
}
