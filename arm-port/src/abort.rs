//! Bookkeeping of data aborts

/// Default number of fault addresses kept
pub const ABORT_HISTORY_LEN: usize = 1024;

/// A ring of the most recent data abort addresses
///
/// Entry `count % N` is written next. The count only ever goes up (wrapping
/// at `u32::MAX`), so with a power-of-two `N` the slot rule holds forever.
#[derive(Debug, Clone)]
pub struct AbortHistory<const N: usize = ABORT_HISTORY_LEN> {
    addresses: [u32; N],
    count: u32,
}

impl<const N: usize> AbortHistory<N> {
    /// An empty history
    pub const fn new() -> Self {
        AbortHistory {
            addresses: [0; N],
            count: 0,
        }
    }

    /// Note one more abort at `addr`
    pub fn record(&mut self, addr: u32) {
        if N == 0 {
            self.count = self.count.wrapping_add(1);
            return;
        }
        self.addresses[self.count as usize % N] = addr;
        self.count = self.count.wrapping_add(1);
    }

    /// How many aborts have been recorded in total
    pub fn count(&self) -> u32 {
        self.count
    }

    /// How many addresses the ring can hold
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The raw ring, in slot order
    pub fn slots(&self) -> &[u32; N] {
        &self.addresses
    }

    /// The address of the most recent abort
    pub fn last(&self) -> Option<u32> {
        if self.count == 0 || N == 0 {
            return None;
        }
        Some(self.addresses[(self.count as usize).wrapping_sub(1) % N])
    }

    /// The addresses still held, oldest first
    pub fn recent(&self) -> impl Iterator<Item = u32> + '_ {
        let held = (self.count as usize).min(N);
        let start = (self.count as usize).wrapping_sub(held);
        (0..held).map(move |i| self.addresses[start.wrapping_add(i) % N])
    }
}

impl<const N: usize> Default for AbortHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}
