use super::*;
use crate::interrupts::SERVICE_CYCLES;
use crate::memory::FlatMemory;
use crate::registers::Flag;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// CPU with PC parked at `start` and the given program in memory.
fn cpu_with_program(start: u16, program: &[u8]) -> (Cpu, FlatMemory) {
    let mut cpu = Cpu::new();
    let mut mem = FlatMemory::default();
    mem.load(start, program);
    cpu.regs.pc = start;
    (cpu, mem)
}

#[test]
fn reset_matches_post_boot_register_state() {
    init_logger();
    let mut cpu = Cpu::new();
    let mut mem = FlatMemory::default();
    mem.write_byte(0x0100, 0x00); // NOP

    assert_eq!(cpu.regs.pc, 0x0100);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.regs.bc(), 0x0013);
    assert_eq!(cpu.regs.de(), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x014D);
    assert_eq!(cpu.state(), CpuState::Normal);

    assert_eq!(cpu.step(&mut mem), 4);
    assert_eq!(cpu.regs.pc, 0x0101);

    // reset() restores the same state after the machine has run.
    cpu.interrupts.enable(Interrupt::Timer, true);
    cpu.interrupts.request(Interrupt::Timer, true);
    cpu.reset();
    assert_eq!(cpu.regs.pc, 0x0100);
    assert_eq!(cpu.regs.af(), 0x01B0);
    assert!(!cpu.interrupts.enabled(Interrupt::Timer));
    assert!(!cpu.interrupts.requested(Interrupt::Timer));
    assert!(!cpu.interrupts.master_enabled());
}

#[test]
fn vblank_service_pushes_pc_and_jumps_to_vector() {
    init_logger();
    let mut cpu = Cpu::new();
    let mut mem = FlatMemory::default();

    cpu.regs.pc = 0x1234;
    cpu.regs.sp = 0xFFFE;
    cpu.interrupts.enable(Interrupt::VBlank, true);
    cpu.interrupts.request(Interrupt::VBlank, true);
    cpu.interrupts.set_master_enabled(true);

    let cycles = cpu.interrupts.step(&mut mem, &mut cpu.regs);
    assert_eq!(cycles, SERVICE_CYCLES);
    assert_eq!(cpu.regs.pc, 0x0040);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(mem.read_byte(0xFFFC), 0x34);
    assert_eq!(mem.read_byte(0xFFFD), 0x12);
    assert!(!cpu.interrupts.requested(Interrupt::VBlank));
    assert!(!cpu.interrupts.master_enabled());
}

#[test]
fn interrupt_service_follows_the_executed_instruction() {
    let (mut cpu, mut mem) = cpu_with_program(0x0200, &[0x00]); // NOP

    cpu.interrupts.enable(Interrupt::VBlank, true);
    cpu.interrupts.request(Interrupt::VBlank, true);
    cpu.interrupts.set_master_enabled(true);

    // One tick: the NOP plus the interrupt entry.
    assert_eq!(cpu.step(&mut mem), 4 + SERVICE_CYCLES);
    assert_eq!(cpu.regs.pc, 0x0040);
    // The pushed return address points past the NOP.
    assert_eq!(mem.read_word(cpu.regs.sp), 0x0201);
}

#[test]
fn interrupt_priority_orders_timer_before_joypad() {
    let mut cpu = Cpu::new();
    let mut mem = FlatMemory::default();

    cpu.regs.pc = 0x1000;
    cpu.interrupts.enable(Interrupt::Timer, true);
    cpu.interrupts.enable(Interrupt::Joypad, true);
    cpu.interrupts.request(Interrupt::Timer, true);
    cpu.interrupts.request(Interrupt::Joypad, true);
    cpu.interrupts.set_master_enabled(true);

    assert_eq!(cpu.interrupts.step(&mut mem, &mut cpu.regs), SERVICE_CYCLES);
    assert_eq!(cpu.regs.pc, 0x0050, "timer first");
    assert!(cpu.interrupts.requested(Interrupt::Joypad));

    // Servicing cleared IME; once it is re-enabled the joypad line follows.
    cpu.interrupts.set_master_enabled(true);
    assert_eq!(cpu.interrupts.step(&mut mem, &mut cpu.regs), SERVICE_CYCLES);
    assert_eq!(cpu.regs.pc, 0x0060, "joypad second");
    assert!(!cpu.interrupts.requested(Interrupt::Joypad));
}

#[test]
fn ei_enables_master_only_after_the_following_instruction() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xFB, 0x00, 0x00]); // EI; NOP; NOP

    assert_eq!(cpu.step(&mut mem), 4);
    assert!(
        !cpu.interrupts.master_enabled(),
        "IME still clear right after EI"
    );

    assert_eq!(cpu.step(&mut mem), 4);
    assert!(
        cpu.interrupts.master_enabled(),
        "IME set once the next instruction completed"
    );
}

#[test]
fn pending_interrupt_waits_out_the_ei_delay() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xFB, 0x00]); // EI; NOP

    cpu.interrupts.enable(Interrupt::Serial, true);
    cpu.interrupts.request(Interrupt::Serial, true);

    // EI itself must not let the interrupt through.
    assert_eq!(cpu.step(&mut mem), 4);
    assert_eq!(cpu.regs.pc, 0x0001);

    // The NOP completes, IME turns on, and the service happens in the same
    // tick.
    assert_eq!(cpu.step(&mut mem), 4 + SERVICE_CYCLES);
    assert_eq!(cpu.regs.pc, 0x0058);
}

#[test]
fn di_disables_immediately_and_cancels_ei() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xFB, 0xF3, 0x00]); // EI; DI; NOP

    cpu.step(&mut mem); // EI
    cpu.step(&mut mem); // DI
    assert!(!cpu.interrupts.master_enabled());

    // The armed countdown must not fire after DI.
    cpu.step(&mut mem); // NOP
    assert!(!cpu.interrupts.master_enabled());
}

#[test]
fn halt_idles_at_four_cycles_until_woken() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0x76, 0x3C]); // HALT; INC A

    assert_eq!(cpu.step(&mut mem), 4);
    assert_eq!(cpu.state(), CpuState::Halted);
    let halted_pc = cpu.regs.pc;

    for _ in 0..10 {
        assert_eq!(cpu.step(&mut mem), 4);
        assert_eq!(cpu.regs.pc, halted_pc, "PC frozen while halted");
    }

    // A pending-and-enabled line wakes the core even with IME clear; the
    // interrupt itself is not serviced.
    cpu.interrupts.enable(Interrupt::Timer, true);
    cpu.interrupts.request(Interrupt::Timer, true);
    assert_eq!(cpu.step(&mut mem), 4);
    assert_eq!(cpu.state(), CpuState::Normal);
    assert_eq!(cpu.regs.pc, halted_pc);

    // Execution resumes with the instruction after HALT.
    let a = cpu.regs.a;
    cpu.step(&mut mem);
    assert_eq!(cpu.regs.a, a.wrapping_add(1));
}

#[test]
fn halt_wake_services_interrupt_when_ime_is_set() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0x76]); // HALT

    cpu.interrupts.set_master_enabled(true);
    assert_eq!(cpu.step(&mut mem), 4);
    assert_eq!(cpu.state(), CpuState::Halted);

    cpu.interrupts.enable(Interrupt::VBlank, true);
    cpu.interrupts.request(Interrupt::VBlank, true);
    assert_eq!(cpu.step(&mut mem), 4 + SERVICE_CYCLES);
    assert_eq!(cpu.state(), CpuState::Normal);
    assert_eq!(cpu.regs.pc, 0x0040);
}

#[test]
fn halt_with_pending_interrupt_and_ime_set_does_not_halt() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0x76, 0x00]); // HALT; NOP

    cpu.interrupts.enable(Interrupt::Timer, true);
    cpu.interrupts.request(Interrupt::Timer, true);
    cpu.interrupts.set_master_enabled(true);

    // HALT falls straight through to the interrupt entry.
    assert_eq!(cpu.step(&mut mem), 4 + SERVICE_CYCLES);
    assert_eq!(cpu.state(), CpuState::Normal);
    assert_eq!(cpu.regs.pc, 0x0050);
}

#[test]
fn ei_halt_with_pending_interrupt_services_cleanly() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xFB, 0x76]); // EI; HALT
    mem.load(0x0050, &[0x3C, 0x00]); // handler: INC A; NOP

    cpu.interrupts.enable(Interrupt::Timer, true);
    cpu.interrupts.request(Interrupt::Timer, true);

    assert_eq!(cpu.step(&mut mem), 4); // EI
    assert!(!cpu.interrupts.master_enabled());

    // HALT completes the EI countdown; the interrupt is taken in the same
    // tick and the core goes straight into the handler, with no halt and
    // no double fetch of the handler's first byte.
    assert_eq!(cpu.step(&mut mem), 4 + SERVICE_CYCLES);
    assert_eq!(cpu.state(), CpuState::Normal);
    assert_eq!(cpu.regs.pc, 0x0050);
    assert_eq!(mem.read_word(cpu.regs.sp), 0x0002, "return address after HALT");

    let a = cpu.regs.a;
    assert_eq!(cpu.step(&mut mem), 4);
    assert_eq!(cpu.regs.a, a.wrapping_add(1));
    assert_eq!(cpu.regs.pc, 0x0051, "handler advances past its first byte");

    cpu.step(&mut mem);
    assert_eq!(cpu.regs.a, a.wrapping_add(1), "INC A ran exactly once");
    assert_eq!(cpu.regs.pc, 0x0052);
}

#[test]
fn halt_bug_fetches_the_following_byte_twice() {
    init_logger();
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0x76, 0x3C, 0x00]); // HALT; INC A; NOP

    // Pending-and-enabled with IME clear trips the hardware bug.
    cpu.interrupts.enable(Interrupt::Timer, true);
    cpu.interrupts.request(Interrupt::Timer, true);

    assert_eq!(cpu.step(&mut mem), 4);
    assert_eq!(cpu.state(), CpuState::HaltBug);
    assert_eq!(cpu.regs.pc, 0x0001);

    // The INC A executes but PC snaps back to 0x0001.
    let a = cpu.regs.a;
    assert_eq!(cpu.step(&mut mem), 4);
    assert_eq!(cpu.regs.a, a.wrapping_add(1));
    assert_eq!(cpu.regs.pc, 0x0001, "next fetch re-reads the same byte");
    assert_eq!(cpu.state(), CpuState::Normal);

    // Second time around the INC A runs for real.
    cpu.step(&mut mem);
    assert_eq!(cpu.regs.a, a.wrapping_add(2));
    assert_eq!(cpu.regs.pc, 0x0002);
}

#[test]
fn stop_consumes_nothing_and_wakes_on_joypad_request() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0x10, 0x00, 0x3C]); // STOP; INC A

    assert_eq!(cpu.step(&mut mem), 4);
    assert_eq!(cpu.state(), CpuState::Stopped);
    assert_eq!(cpu.regs.pc, 0x0002, "STOP consumes its padding byte");

    for _ in 0..5 {
        assert_eq!(cpu.step(&mut mem), 0);
        assert_eq!(cpu.state(), CpuState::Stopped);
    }

    // The joypad request wakes the core even though the line is masked off
    // in the enable bits.
    assert!(!cpu.interrupts.enabled(Interrupt::Joypad));
    cpu.interrupts.request(Interrupt::Joypad, true);
    assert_eq!(cpu.step(&mut mem), 0);
    assert_eq!(cpu.state(), CpuState::Normal);

    let a = cpu.regs.a;
    cpu.step(&mut mem);
    assert_eq!(cpu.regs.a, a.wrapping_add(1));
}

#[test]
fn prefixed_instructions_split_across_two_ticks() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xCB, 0x37, 0x00]); // SWAP A; NOP

    cpu.regs.a = 0xF1;
    assert_eq!(cpu.step(&mut mem), 4, "first tick charges the prefix fetch");
    assert_eq!(cpu.regs.a, 0xF1, "body deferred to the next tick");
    assert_eq!(cpu.regs.pc, 0x0002, "both bytes already consumed");

    assert_eq!(cpu.step(&mut mem), 4, "second tick reports the remainder");
    assert_eq!(cpu.regs.a, 0x1F);
}

#[test]
fn no_interrupt_service_while_an_instruction_is_outstanding() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xCB, 0x37]); // SWAP A

    cpu.interrupts.enable(Interrupt::VBlank, true);
    cpu.interrupts.request(Interrupt::VBlank, true);
    cpu.interrupts.set_master_enabled(true);

    // Padding tick: no dispatch yet.
    assert_eq!(cpu.step(&mut mem), 4);
    assert_ne!(cpu.regs.pc, 0x0040);

    // Completion tick: body plus interrupt entry.
    assert_eq!(cpu.step(&mut mem), 4 + SERVICE_CYCLES);
    assert_eq!(cpu.regs.pc, 0x0040);
}

#[test]
fn bit_test_through_hl_splits_as_four_then_eight() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xCB, 0x46]); // BIT 0, (HL)

    cpu.regs.set_hl(0xC000);
    mem.write_byte(0xC000, 0x01);
    assert_eq!(cpu.step(&mut mem), 4);
    assert_eq!(cpu.step(&mut mem), 8, "12 cycles total for BIT b, (HL)");
    assert!(!cpu.regs.flag(Flag::Z));
}

#[test]
fn push_writes_high_byte_at_the_higher_address() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xC5, 0xD1]); // PUSH BC; POP DE

    cpu.regs.sp = 0xFFFE;
    cpu.regs.set_bc(0xABCD);
    assert_eq!(cpu.step(&mut mem), 16);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(mem.read_byte(0xFFFD), 0xAB);
    assert_eq!(mem.read_byte(0xFFFC), 0xCD);

    assert_eq!(cpu.step(&mut mem), 12);
    assert_eq!(cpu.regs.de(), 0xABCD);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn pop_af_masks_the_low_nibble_of_f() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xF1]); // POP AF

    cpu.regs.sp = 0xC000;
    mem.write_word(0xC000, 0x12FF);
    cpu.step(&mut mem);
    assert_eq!(cpu.regs.af(), 0x12F0);
}

#[test]
fn conditional_branches_charge_taken_and_untaken_costs() {
    // JR NZ, +2 with Z clear (taken) and Z set (untaken).
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0x20, 0x02]);
    cpu.regs.set_flag(Flag::Z, false);
    assert_eq!(cpu.step(&mut mem), 12);
    assert_eq!(cpu.regs.pc, 0x0004);

    cpu.regs.pc = 0x0000;
    cpu.regs.set_flag(Flag::Z, true);
    assert_eq!(cpu.step(&mut mem), 8);
    assert_eq!(cpu.regs.pc, 0x0002);

    // RET C taken vs untaken.
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xD8]);
    cpu.regs.sp = 0xC000;
    mem.write_word(0xC000, 0x1234);
    cpu.regs.set_flag(Flag::C, true);
    assert_eq!(cpu.step(&mut mem), 20);
    assert_eq!(cpu.regs.pc, 0x1234);

    cpu.regs.pc = 0x0000;
    cpu.regs.set_flag(Flag::C, false);
    assert_eq!(cpu.step(&mut mem), 8);
    assert_eq!(cpu.regs.pc, 0x0001);
}

#[test]
fn call_and_ret_round_trip_through_the_stack() {
    let mut program = [0u8; 0x30];
    program[0x00] = 0xCD; // CALL 0x0020
    program[0x01] = 0x20;
    program[0x02] = 0x00;
    program[0x20] = 0xC9; // RET
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &program);

    cpu.regs.sp = 0xFFFE;
    assert_eq!(cpu.step(&mut mem), 24);
    assert_eq!(cpu.regs.pc, 0x0020);
    assert_eq!(mem.read_word(cpu.regs.sp), 0x0003);

    assert_eq!(cpu.step(&mut mem), 16);
    assert_eq!(cpu.regs.pc, 0x0003);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn rst_jumps_to_its_fixed_slot() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xEF]); // RST 28h

    cpu.regs.sp = 0xFFFE;
    assert_eq!(cpu.step(&mut mem), 16);
    assert_eq!(cpu.regs.pc, 0x0028);
    assert_eq!(mem.read_word(cpu.regs.sp), 0x0001);
}

#[test]
fn reti_restores_master_enable_without_delay() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xD9]); // RETI

    cpu.regs.sp = 0xC000;
    mem.write_word(0xC000, 0x0300);
    assert_eq!(cpu.step(&mut mem), 16);
    assert_eq!(cpu.regs.pc, 0x0300);
    assert!(cpu.interrupts.master_enabled());
}

#[test]
fn program_counter_wraps_around_the_address_space() {
    let mut cpu = Cpu::new();
    let mut mem = FlatMemory::default();
    mem.write_byte(0xFFFF, 0x3C); // INC A

    cpu.regs.pc = 0xFFFF;
    cpu.step(&mut mem);
    assert_eq!(cpu.regs.pc, 0x0000);
}

#[test]
#[should_panic(expected = "unsupported opcode")]
fn unmapped_opcode_faults() {
    let (mut cpu, mut mem) = cpu_with_program(0x0000, &[0xD3]);
    cpu.step(&mut mem);
}

#[test]
#[should_panic(expected = "runs past the end of the address space")]
fn flat_memory_rejects_images_past_the_end() {
    let mut mem = FlatMemory::default();
    mem.load(0xFFFF, &[0x00, 0x00]);
}

#[test]
fn flat_memory_words_are_little_endian() {
    let mut mem = FlatMemory::default();
    mem.write_word(0x8000, 0xBEEF);
    assert_eq!(mem.read_byte(0x8000), 0xEF);
    assert_eq!(mem.read_byte(0x8001), 0xBE);
    assert_eq!(mem.read_word(0x8000), 0xBEEF);
}
