//! Code that implements the `critical-section` traits on classic Arm cores
//!
//! Only a single-core version exists: ARMv4 and ARMv5 parts have no way to
//! tell cores apart, so there is nothing to build a spin-lock around. Select it
//! with the `critical-section-single-core` feature.
//!
//! Entering masks both IRQ and FIQ. The restore state is the I/F level that
//! was in force before, and leaving puts exactly that level back, so a
//! section entered with FIQ live and IRQ masked does not unmask IRQ on exit.

struct SingleCoreCriticalSection;

critical_section::set_impl!(SingleCoreCriticalSection);

unsafe impl critical_section::Impl for SingleCoreCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        // the level is the I and F bits (0xC0), so it fits the u8 state
        crate::interrupt::disable() as u8
    }

    unsafe fn release(level: critical_section::RawRestoreState) {
        // Safety: we are leaving the outermost section that saw this level,
        // or an inner one that saw interrupts already masked
        unsafe { crate::interrupt::restore(u32::from(level)) }
    }
}
