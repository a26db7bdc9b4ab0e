//! Host tests for the data abort handler

mod common;

use arm_cpu::register::ProcessorMode;
use arm_port::{
    fixup::{DecodeAndResume, HaltOnly},
    Disposition, ExceptionFrame, FaultContext,
};
use common::{MockSystem, STACK_BASE};

const DATA_BASE: u32 = 0x3000_0000;

fn frame_at(lr: u32) -> ExceptionFrame {
    ExceptionFrame {
        lr,
        ..Default::default()
    }
}

fn halt_only() -> FaultContext<MockSystem> {
    FaultContext::new(HaltOnly)
}

fn decode_and_resume() -> FaultContext<MockSystem, DecodeAndResume> {
    FaultContext::new(DecodeAndResume)
}

/// Memory with 0x12345678 sitting unaligned at DATA_BASE + 9
fn unaligned_word() -> MockSystem {
    let mut bytes = [0u8; 16];
    bytes[9..13].copy_from_slice(&0x1234_5678u32.to_le_bytes());
    MockSystem::new().with_bytes(DATA_BASE, &bytes)
}

#[test]
fn unrecognized_instruction_halts_without_deleting() {
    let mut faults = halt_only();
    let mut sys = MockSystem::new().with_nest_level(0);
    let mut frame = frame_at(0x0000_8008);
    // mov r0, r0
    let disposition = faults.data_abort(&mut sys, 0xE1A0_0000, 0x6000_0010, &mut frame);
    assert_eq!(disposition, Disposition::Halt);
    assert!(sys.deleted.is_empty());
    assert_eq!(sys.interrupts_disabled, 1);
    assert!(sys.console.contains("\n\nUnrecognized instruction\n"));
    assert!(sys.console.contains(
        "data_abort at address 0x8000, instruction: 0xe1a00000,   spsr = 0x60000010"
    ));
    assert_eq!(faults.history().count(), 1);
    assert_eq!(faults.history().last(), Some(0x8000));
}

#[test]
fn nesting_level_is_not_consulted() {
    let mut faults = halt_only();
    let mut sys = MockSystem::new().with_nest_level(3);
    let disposition = faults.data_abort(&mut sys, 0xE1A0_0000, 0x12, &mut frame_at(0x8008));
    assert_eq!(disposition, Disposition::Halt);
    assert!(sys.deleted.is_empty());
    assert!(!sys.console.contains("System locked"));
}

#[test]
fn every_class_prints_its_label_and_halts() {
    let cases = [
        (0xE92D_4010, "STM1"),
        (0xE8C0_0002, "STM2"),
        (0xE581_0004, "STR"),
        (0xE5C1_0000, "STRB"),
        (0xE890_0006, "LDM1"),
        (0xE8D0_0002, "LDM23"),
        (0xE591_0004, "LDR"),
        (0xE5D1_0000, "LDRB"),
    ];
    for (insn, label) in cases {
        let mut faults = decode_and_resume();
        let mut sys = MockSystem::new();
        let mut frame = frame_at(0x8008);
        // with r1 = 0 the LDR case reads zeros and resumes
        let disposition = faults.data_abort(&mut sys, insn, 0x13, &mut frame);
        assert!(
            sys.console.starts_with(&format!("\n\n{}\n", label)),
            "{}: {}",
            label,
            sys.console
        );
        let expect = if label == "LDR" {
            Disposition::Resume
        } else {
            Disposition::Halt
        };
        assert_eq!(disposition, expect, "{}", label);
    }
}

#[test]
fn full_context_is_dumped_on_halt() {
    let words: Vec<u32> = (0..64).collect();
    let mut faults = halt_only();
    let mut sys = MockSystem::new().with_words(STACK_BASE, &words);
    faults.data_abort(&mut sys, 0xE581_0004, 0x0000_0013, &mut frame_at(0x8008));

    assert_eq!(sys.banked_requests, vec![ProcessorMode::Svc]);
    assert!(sys.console.contains("active thread thread 0x0a010001\n"));
    assert!(sys
        .console
        .contains("Previous mode super sp=0x20000000 lr=0x00008124 and actual cpsr=000000d7\n"));
    assert!(sys
        .console
        .contains(" 0x00000000 0x00000001 0x00000002 0x00000003 0x00000004 0x00000005\n"));
    assert!(sys
        .console
        .ends_with(" 0x0000002a 0x0000002b 0x0000002c 0x0000002d 0x0000002e 0x0000002f\n"));
    assert!(!sys.console.contains("0x00000030"));
    let dump_lines = sys
        .console
        .lines()
        .filter(|line| line.starts_with(" 0x"))
        .count();
    assert_eq!(dump_lines, 8);
}

#[test]
fn user_mode_fault_is_read_through_its_bank() {
    let mut faults = halt_only();
    let mut sys = MockSystem::new();
    faults.data_abort(&mut sys, 0xE581_0004, 0x10, &mut frame_at(0x8008));
    assert_eq!(sys.banked_requests, vec![ProcessorMode::Usr]);
    assert!(sys.console.contains("Previous mode user"));
}

#[test]
fn reserved_mode_skips_the_stack_window() {
    let mut faults = halt_only();
    let mut sys = MockSystem::new();
    let disposition = faults.data_abort(&mut sys, 0xE581_0004, 0x15, &mut frame_at(0x8008));
    assert_eq!(disposition, Disposition::Halt);
    assert!(sys.banked_requests.is_empty());
    assert!(sys.console.contains("Previous mode unknown (0x15)"));
    assert!(!sys.console.contains(" 0x00000000"));
}

#[test]
fn history_records_every_abort() {
    let mut faults = decode_and_resume();
    for lr in [0x8008u32, 0x800C, 0x8010] {
        let mut sys = unaligned_word();
        let mut frame = frame_at(lr);
        frame.r[5] = DATA_BASE + 1;
        // ldr r3, [r5, #8] resumes, the others halt
        let insn = if lr == 0x800C { 0xE595_3008 } else { 0xE1A0_0000 };
        faults.data_abort(&mut sys, insn, 0x13, &mut frame);
    }
    assert_eq!(faults.history().count(), 3);
    assert!(faults.history().recent().eq([0x8000, 0x8004, 0x8008]));
}

#[test]
fn halt_only_leaves_ldr_alone() {
    let mut faults = halt_only();
    let mut sys = unaligned_word();
    let mut frame = frame_at(0x8008);
    frame.r[5] = DATA_BASE + 1;
    frame.r[3] = 0xCAFE;
    // ldr r3, [r5, #8]
    let disposition = faults.data_abort(&mut sys, 0xE595_3008, 0x13, &mut frame);
    assert_eq!(disposition, Disposition::Halt);
    assert_eq!(frame.r[3], 0xCAFE);
    assert_eq!(sys.interrupts_disabled, 1);
}

#[test]
fn offset_load_is_completed_and_resumed() {
    let mut faults = decode_and_resume();
    let mut sys = unaligned_word();
    let mut frame = frame_at(0x8008);
    frame.r[5] = DATA_BASE + 1;
    // ldr r3, [r5, #8]
    let disposition = faults.data_abort(&mut sys, 0xE595_3008, 0x13, &mut frame);
    assert_eq!(disposition, Disposition::Resume);
    assert_eq!(frame.r[3], 0x1234_5678);
    // base register untouched
    assert_eq!(frame.r[5], DATA_BASE + 1);
    assert_eq!(sys.interrupts_disabled, 0);
    assert!(!sys.console.contains("data_abort at address"));
    assert_eq!(faults.history().count(), 1);
}

#[test]
fn negative_offset_is_subtracted() {
    let mut faults = decode_and_resume();
    let mut sys = unaligned_word();
    let mut frame = frame_at(0x8008);
    frame.r[5] = DATA_BASE + 13;
    // ldr r3, [r5, #-4]
    let disposition = faults.data_abort(&mut sys, 0xE515_3004, 0x13, &mut frame);
    assert_eq!(disposition, Disposition::Resume);
    assert_eq!(frame.r[3], 0x1234_5678);
}

#[test]
fn pc_relative_load_uses_pc_plus_eight() {
    let mut faults = decode_and_resume();
    let mut sys = unaligned_word();
    // faulting instruction at DATA_BASE + 1, so PC reads as DATA_BASE + 9
    let mut frame = frame_at(DATA_BASE + 9);
    // ldr r0, [pc, #0]
    let disposition = faults.data_abort(&mut sys, 0xE59F_0000, 0x13, &mut frame);
    assert_eq!(disposition, Disposition::Resume);
    assert_eq!(frame.r[0], 0x1234_5678);
}

#[test]
fn other_addressing_forms_stay_unimplemented() {
    let cases = [
        // ldr r3, [r5], #8
        (0xE495_3008, Some("\tPost-indexed\n")),
        // ldrt r3, [r5], #8
        (0xE4B5_3008, Some("\tUser mode\n")),
        // ldr r3, [r5, #8]!
        (0xE5B5_3008, Some("\tPre-indexed\n")),
        // ldr r3, [r5, r2]
        (0xE795_3002, None),
        // ldr pc, [r5, #8]
        (0xE595_F008, Some("\tLoad into PC\n")),
    ];
    for (insn, note) in cases {
        let mut faults = decode_and_resume();
        let mut sys = unaligned_word();
        let mut frame = frame_at(0x8008);
        frame.r[5] = DATA_BASE + 1;
        let before = frame;
        let disposition = faults.data_abort(&mut sys, insn, 0x13, &mut frame);
        assert_eq!(disposition, Disposition::Halt, "{:#010x}", insn);
        assert_eq!(frame, before, "{:#010x}", insn);
        assert!(sys.console.starts_with("\n\nLDR\n"));
        if let Some(note) = note {
            assert!(sys.console.contains(note), "{:#010x}: {}", insn, sys.console);
        }
        assert!(sys.console.contains("data_abort at address 0x8000"));
    }
}
