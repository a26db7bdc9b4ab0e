//! The exception vector redirection table
//!
//! The hardware vectors at address zero each load the PC from a slot in a
//! table that sits straight after them, so re-targeting an exception means
//! writing one word into that table.

use core::marker::PhantomData;

/// Number of exception vectors on the architecture
pub const MAX_EXCEPTIONS: usize = 8;

/// Where the redirection table lives: straight after the eight hardware
/// vectors
pub const VECTOR_TABLE_BASE: usize = MAX_EXCEPTIONS * 4;

/// Something that can sit in a vector slot
///
/// These are assembly trampolines and are never called from Rust.
pub type Handler = unsafe extern "C" fn();

/// The exception vectors, numbered by their offset from address zero
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Vector {
    Reset = 0,
    Undefined = 1,
    SoftwareInterrupt = 2,
    PrefetchAbort = 3,
    DataAbort = 4,
    Reserved = 5,
    Irq = 6,
    Fiq = 7,
}

impl Vector {
    /// The slot this vector uses in the redirection table
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl From<Vector> for usize {
    fn from(vector: Vector) -> usize {
        vector.index()
    }
}

/// Ways the vector table can be misused
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VectorError {
    /// The index is past the end of the table
    OutOfRange { index: usize, len: usize },
}

impl core::fmt::Display for VectorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            VectorError::OutOfRange { index, len } => {
                write!(f, "vector {} out of range (table has {} slots)", index, len)
            }
        }
    }
}

/// A handle on a table of exception handler slots
///
/// All accesses are bounds checked and volatile.
pub struct VectorTable<'a> {
    base: *mut Option<Handler>,
    len: usize,
    _slots: PhantomData<&'a mut [Option<Handler>]>,
}

impl VectorTable<'static> {
    /// The redirection table at [`VECTOR_TABLE_BASE`]
    ///
    /// # Safety
    ///
    /// The redirection table must be mapped, writable, and not otherwise
    /// aliased for as long as the handle exists.
    pub unsafe fn redirection() -> VectorTable<'static> {
        unsafe { VectorTable::from_raw(VECTOR_TABLE_BASE as *mut Option<Handler>, MAX_EXCEPTIONS) }
    }
}

impl<'a> VectorTable<'a> {
    /// Build a handle on `len` slots starting at `base`
    ///
    /// # Safety
    ///
    /// `base` must point at `len` writable, aligned slots that live for `'a`
    /// and that nothing else accesses through the handle's lifetime.
    pub unsafe fn from_raw(base: *mut Option<Handler>, len: usize) -> VectorTable<'a> {
        VectorTable {
            base,
            len,
            _slots: PhantomData,
        }
    }

    /// Use a slice of slots as the table
    pub fn from_slice(slots: &'a mut [Option<Handler>]) -> VectorTable<'a> {
        VectorTable {
            base: slots.as_mut_ptr(),
            len: slots.len(),
            _slots: PhantomData,
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is this an empty table?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check(&self, index: usize) -> Result<(), VectorError> {
        if index < self.len {
            Ok(())
        } else {
            Err(VectorError::OutOfRange {
                index,
                len: self.len,
            })
        }
    }

    /// Read the handler in a slot
    pub fn get(&self, index: impl Into<usize>) -> Result<Option<Handler>, VectorError> {
        let index = index.into();
        self.check(index)?;
        // Safety: the index is in range and the constructor vouched for the slots
        Ok(unsafe { self.base.add(index).read_volatile() })
    }

    /// Write the handler in a slot
    pub fn set(
        &mut self,
        index: impl Into<usize>,
        handler: Option<Handler>,
    ) -> Result<(), VectorError> {
        let index = index.into();
        self.check(index)?;
        // Safety: the index is in range and the constructor vouched for the slots
        unsafe { self.base.add(index).write_volatile(handler) };
        Ok(())
    }

    /// Point a vector at `new`
    ///
    /// If `old` is given it receives whatever was in the slot before the new
    /// handler went in.
    pub fn install(
        &mut self,
        index: impl Into<usize>,
        new: Handler,
        old: Option<&mut Option<Handler>>,
    ) -> Result<(), VectorError> {
        let index = index.into();
        let previous = self.get(index)?;
        if let Some(old) = old {
            *old = previous;
        }
        self.set(index, Some(new))
    }
}

/// The trampolines that [`install_exception_vectors`] wires up
#[derive(Copy, Clone)]
pub struct ExceptionEntries {
    /// Takes undefined instructions and software interrupts
    pub undef_swi: Handler,
    /// Takes prefetch aborts, IRQ and FIQ
    pub abort: Handler,
    /// Takes data aborts
    pub data_abort: Handler,
}

/// Install the exception trampolines into the vector table
///
/// Runs with interrupts masked, so nothing can be taken through a half
/// written table.
pub fn install_exception_vectors(
    table: &mut VectorTable<'_>,
    entries: &ExceptionEntries,
) -> Result<(), VectorError> {
    critical_section::with(|_cs| {
        table.install(Vector::Undefined, entries.undef_swi, None)?;
        table.install(Vector::SoftwareInterrupt, entries.undef_swi, None)?;
        table.install(Vector::PrefetchAbort, entries.abort, None)?;
        table.install(Vector::DataAbort, entries.data_abort, None)?;
        table.install(Vector::Fiq, entries.abort, None)?;
        table.install(Vector::Irq, entries.abort, None)?;
        Ok(())
    })
}
