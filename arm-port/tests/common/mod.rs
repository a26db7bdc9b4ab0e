//! A pretend system for driving the fault handlers on the host

#![allow(dead_code)]

use arm_cpu::{
    register::{Cpsr, ProcessorMode},
    BankedRegisters,
};
use arm_port::{Kernel, Processor, ThreadId};

pub const THREAD: ThreadId = ThreadId(0x0A01_0001);

pub const STACK_BASE: u32 = 0x2000_0000;

pub struct MockSystem {
    pub nest_level: u32,
    pub thread: ThreadId,
    pub deleted: Vec<ThreadId>,
    pub console: String,
    pub cpsr: Cpsr,
    pub banked: BankedRegisters,
    pub banked_requests: Vec<ProcessorMode>,
    pub interrupts_disabled: usize,
    pub memory_base: u32,
    pub memory: Vec<u8>,
}

impl MockSystem {
    pub fn new() -> MockSystem {
        MockSystem {
            nest_level: 0,
            thread: THREAD,
            deleted: Vec::new(),
            console: String::new(),
            cpsr: Cpsr::new_with_raw_value(0xD7),
            banked: BankedRegisters {
                sp: STACK_BASE,
                lr: 0x0000_8124,
            },
            banked_requests: Vec::new(),
            interrupts_disabled: 0,
            memory_base: STACK_BASE,
            memory: Vec::new(),
        }
    }

    pub fn with_nest_level(mut self, level: u32) -> MockSystem {
        self.nest_level = level;
        self
    }

    /// Back `base..` with the given words, little-endian
    pub fn with_words(mut self, base: u32, words: &[u32]) -> MockSystem {
        self.memory_base = base;
        self.memory = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        self
    }

    /// Back `base..` with the given bytes
    pub fn with_bytes(mut self, base: u32, bytes: &[u8]) -> MockSystem {
        self.memory_base = base;
        self.memory = bytes.to_vec();
        self
    }
}

impl Kernel for MockSystem {
    fn isr_nest_level(&self) -> u32 {
        self.nest_level
    }

    fn executing_thread(&self) -> ThreadId {
        self.thread
    }

    fn delete_thread(&mut self, id: ThreadId) {
        self.deleted.push(id);
    }
}

impl Processor for MockSystem {
    fn cpsr(&self) -> Cpsr {
        self.cpsr
    }

    fn banked_registers(&mut self, mode: ProcessorMode) -> BankedRegisters {
        self.banked_requests.push(mode);
        self.banked
    }

    fn disable_interrupts(&mut self) -> u32 {
        self.interrupts_disabled += 1;
        let level = self.cpsr.isr_level();
        self.cpsr = Cpsr::new_with_raw_value(self.cpsr.raw_value() | Cpsr::ISR_MASK);
        level
    }

    unsafe fn read_u8(&self, addr: u32) -> u8 {
        addr.checked_sub(self.memory_base)
            .and_then(|offset| self.memory.get(offset as usize))
            .copied()
            .unwrap_or(0)
    }

    unsafe fn read_u32(&self, addr: u32) -> u32 {
        let mut bytes = [0u8; 4];
        for (i, byte) in (0u32..).zip(bytes.iter_mut()) {
            *byte = unsafe { self.read_u8(addr + i) };
        }
        u32::from_le_bytes(bytes)
    }
}

impl core::fmt::Write for MockSystem {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.console.push_str(s);
        Ok(())
    }
}
