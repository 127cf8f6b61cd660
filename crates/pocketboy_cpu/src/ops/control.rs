use crate::interrupts::InterruptController;
use crate::memory::Memory;
use crate::registers::Registers;

use super::{Cond, OpTable};

/// Relative jump. The displacement is signed, relative to the address
/// following the operand. 12 cycles taken, 8 untaken.
fn jr(mem: &mut dyn Memory, regs: &mut Registers, cond: bool) -> u32 {
    let offset = regs.fetch8(mem) as i8;
    if cond {
        regs.pc = regs.pc.wrapping_add(offset as i16 as u16);
        12
    } else {
        8
    }
}

/// Absolute jump. 16 cycles taken, 12 untaken.
fn jp(mem: &mut dyn Memory, regs: &mut Registers, cond: bool) -> u32 {
    let addr = regs.fetch16(mem);
    if cond {
        regs.pc = addr;
        16
    } else {
        12
    }
}

/// Call: push the return address, jump. 24 cycles taken, 12 untaken.
fn call(mem: &mut dyn Memory, regs: &mut Registers, cond: bool) -> u32 {
    let addr = regs.fetch16(mem);
    if cond {
        let ret = regs.pc;
        regs.push16(mem, ret);
        regs.pc = addr;
        24
    } else {
        12
    }
}

/// Conditional return. 20 cycles taken, 8 untaken (plain RET is 16).
fn ret_cond(mem: &mut dyn Memory, regs: &mut Registers, cond: bool) -> u32 {
    if cond {
        regs.pc = regs.pop16(mem);
        20
    } else {
        8
    }
}

pub(super) fn install(t: &mut OpTable) {
    // JR r8.
    t.op(0x18, Box::new(|mem, regs, _ints| jr(mem, regs, true)));

    // JR cc, r8: 0x20/0x28/0x30/0x38.
    for (i, cond) in Cond::ORDER.into_iter().enumerate() {
        let opcode = 0x20 + (i as u8) * 8;
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let taken = cond.holds(regs);
                jr(mem, regs, taken)
            }),
        );
    }

    // JP a16.
    t.op(0xC3, Box::new(|mem, regs, _ints| jp(mem, regs, true)));

    // JP cc, a16: 0xC2/0xCA/0xD2/0xDA.
    for (i, cond) in Cond::ORDER.into_iter().enumerate() {
        let opcode = 0xC2 + (i as u8) * 8;
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let taken = cond.holds(regs);
                jp(mem, regs, taken)
            }),
        );
    }

    // JP (HL): jump straight to HL, no operand fetch.
    t.op(
        0xE9,
        Box::new(|_mem, regs, _ints| {
            regs.pc = regs.hl();
            4
        }),
    );

    // CALL a16.
    t.op(0xCD, Box::new(|mem, regs, _ints| call(mem, regs, true)));

    // CALL cc, a16: 0xC4/0xCC/0xD4/0xDC.
    for (i, cond) in Cond::ORDER.into_iter().enumerate() {
        let opcode = 0xC4 + (i as u8) * 8;
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let taken = cond.holds(regs);
                call(mem, regs, taken)
            }),
        );
    }

    // RET.
    t.op(
        0xC9,
        Box::new(|mem, regs, _ints| {
            regs.pc = regs.pop16(mem);
            16
        }),
    );

    // RET cc: 0xC0/0xC8/0xD0/0xD8.
    for (i, cond) in Cond::ORDER.into_iter().enumerate() {
        let opcode = 0xC0 + (i as u8) * 8;
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let taken = cond.holds(regs);
                ret_cond(mem, regs, taken)
            }),
        );
    }

    // RETI: return and re-enable interrupts immediately (no EI delay).
    t.op(
        0xD9,
        Box::new(|mem, regs, ints: &mut InterruptController| {
            regs.pc = regs.pop16(mem);
            ints.set_master_enabled(true);
            16
        }),
    );

    // RST nn: push PC and jump to the fixed slot encoded in the opcode.
    for i in 0..8u8 {
        let opcode = 0xC7 + i * 8;
        let vector = (opcode & 0x38) as u16;
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let ret = regs.pc;
                regs.push16(mem, ret);
                regs.pc = vector;
                16
            }),
        );
    }
}
