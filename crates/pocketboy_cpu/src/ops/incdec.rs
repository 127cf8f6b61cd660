use crate::registers::{Flag, Registers};

use super::{OpTable, Target, R16};

/// 8-bit increment used by INC r and INC (HL).
///
/// Half-carry is set when the low nibble was 0xF before incrementing; N is
/// forced clear; C is untouched.
fn inc8(regs: &mut Registers, value: u8) -> u8 {
    let result = value.wrapping_add(1);
    regs.set_flag(Flag::Z, result == 0);
    regs.set_flag(Flag::N, false);
    regs.set_flag(Flag::H, (value & 0x0F) == 0x0F);
    result
}

/// 8-bit decrement used by DEC r and DEC (HL).
///
/// Half-carry is set when the low nibble was 0x0 before decrementing; N is
/// forced set; C is untouched.
fn dec8(regs: &mut Registers, value: u8) -> u8 {
    let result = value.wrapping_sub(1);
    regs.set_flag(Flag::Z, result == 0);
    regs.set_flag(Flag::N, true);
    regs.set_flag(Flag::H, (value & 0x0F) == 0);
    result
}

pub(super) fn install(t: &mut OpTable) {
    // INC r / INC (HL): 0x04/0x0C/.../0x3C.
    for (i, target) in Target::ORDER.into_iter().enumerate() {
        let opcode = 0x04 + (i as u8) * 8;
        let cycles = if target.is_memory() { 12 } else { 4 };
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let value = target.read(mem, regs);
                let result = inc8(regs, value);
                target.write(mem, regs, result);
                cycles
            }),
        );
    }

    // DEC r / DEC (HL): 0x05/0x0D/.../0x3D.
    for (i, target) in Target::ORDER.into_iter().enumerate() {
        let opcode = 0x05 + (i as u8) * 8;
        let cycles = if target.is_memory() { 12 } else { 4 };
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let value = target.read(mem, regs);
                let result = dec8(regs, value);
                target.write(mem, regs, result);
                cycles
            }),
        );
    }

    // INC rr / DEC rr: flag-free 16-bit counters.
    for (i, pair) in [R16::BC, R16::DE, R16::HL, R16::SP].into_iter().enumerate() {
        let inc_opcode = 0x03 + (i as u8) * 0x10;
        t.op(
            inc_opcode,
            Box::new(move |_mem, regs, _ints| {
                let value = pair.get(regs).wrapping_add(1);
                pair.set(regs, value);
                8
            }),
        );

        let dec_opcode = 0x0B + (i as u8) * 0x10;
        t.op(
            dec_opcode,
            Box::new(move |_mem, regs, _ints| {
                let value = pair.get(regs).wrapping_sub(1);
                pair.set(regs, value);
                8
            }),
        );
    }
}
