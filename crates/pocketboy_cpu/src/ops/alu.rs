use crate::registers::{Flag, Registers};

use super::{OpTable, Target, R16};

/// Core 8-bit ADD/ADC operation on A.
///
/// `with_carry` selects between ADD (false) and ADC (true).
pub(super) fn add8(regs: &mut Registers, value: u8, with_carry: bool) {
    let a = regs.a;
    let carry_in = if with_carry && regs.flag(Flag::C) { 1u8 } else { 0 };

    let half = (a & 0x0F) + (value & 0x0F) + carry_in;
    let full = (a as u16) + (value as u16) + (carry_in as u16);
    let result = full as u8;

    regs.a = result;

    regs.clear_flags();
    regs.set_flag(Flag::Z, result == 0);
    regs.set_flag(Flag::H, (half & 0x10) != 0);
    regs.set_flag(Flag::C, full > 0xFF);
}

/// Core 8-bit SUB/SBC operation on A. N is always set.
pub(super) fn sub8(regs: &mut Registers, value: u8, with_carry: bool) {
    let a = regs.a;
    let carry_in = if with_carry && regs.flag(Flag::C) { 1i16 } else { 0 };

    let half = (a & 0x0F) as i16 - (value & 0x0F) as i16 - carry_in;
    let full = a as i16 - value as i16 - carry_in;
    let result = full as u8;

    regs.a = result;

    regs.clear_flags();
    regs.set_flag(Flag::Z, result == 0);
    regs.set_flag(Flag::N, true);
    regs.set_flag(Flag::H, half < 0);
    regs.set_flag(Flag::C, full < 0);
}

/// Compare A with `value`, setting flags as if `A - value` was performed.
/// A itself is not modified.
pub(super) fn cp8(regs: &mut Registers, value: u8) {
    let a = regs.a;
    let half = (a & 0x0F) as i16 - (value & 0x0F) as i16;
    let full = a as i16 - value as i16;

    regs.clear_flags();
    regs.set_flag(Flag::Z, full as u8 == 0);
    regs.set_flag(Flag::N, true);
    regs.set_flag(Flag::H, half < 0);
    regs.set_flag(Flag::C, full < 0);
}

pub(super) fn and8(regs: &mut Registers, value: u8) {
    let result = regs.a & value;
    regs.a = result;

    regs.clear_flags();
    regs.set_flag(Flag::Z, result == 0);
    regs.set_flag(Flag::H, true);
}

pub(super) fn or8(regs: &mut Registers, value: u8) {
    let result = regs.a | value;
    regs.a = result;

    regs.clear_flags();
    regs.set_flag(Flag::Z, result == 0);
}

pub(super) fn xor8(regs: &mut Registers, value: u8) {
    let result = regs.a ^ value;
    regs.a = result;

    regs.clear_flags();
    regs.set_flag(Flag::Z, result == 0);
}

/// 16-bit add into HL. Z is unaffected; N is cleared; H and C come from
/// bit 12 and bit 16 of the addition.
pub(super) fn add16_hl(regs: &mut Registers, value: u16) {
    let hl = regs.hl();
    let result = hl.wrapping_add(value);

    regs.set_flag(Flag::N, false);
    regs.set_flag(Flag::H, (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
    regs.set_flag(Flag::C, (hl as u32) + (value as u32) > 0xFFFF);

    regs.set_hl(result);
}

/// Signed 8-bit immediate added to a 16-bit base (ADD SP,r8 and
/// LD HL,SP+r8). Z and N are cleared; H and C come from the low byte.
pub(super) fn add16_signed(regs: &mut Registers, base: u16, imm8: u8) -> u16 {
    let offset = imm8 as i8 as i16 as u16;
    regs.set_flag(Flag::Z, false);
    regs.set_flag(Flag::N, false);
    regs.set_flag(Flag::H, (base & 0x000F) + (offset & 0x000F) > 0x000F);
    regs.set_flag(Flag::C, (base & 0x00FF) + (offset & 0x00FF) > 0x00FF);
    base.wrapping_add(offset)
}

/// Decimal adjust accumulator after BCD addition/subtraction.
///
/// Uses C, H, N and A to compute a correction value; updates A, Z, H, C and
/// leaves N unchanged.
fn daa(regs: &mut Registers) {
    let mut a = regs.a;
    let mut adjust: u8 = if regs.flag(Flag::C) { 0x60 } else { 0x00 };
    if regs.flag(Flag::H) {
        adjust |= 0x06;
    }

    if !regs.flag(Flag::N) {
        // After an addition.
        if (a & 0x0F) > 0x09 {
            adjust |= 0x06;
        }
        if a > 0x99 {
            adjust |= 0x60;
        }
        a = a.wrapping_add(adjust);
    } else {
        // After a subtraction.
        a = a.wrapping_sub(adjust);
    }

    regs.set_flag(Flag::C, adjust >= 0x60);
    regs.set_flag(Flag::H, false);
    regs.set_flag(Flag::Z, a == 0);
    regs.a = a;
}

/// The eight accumulator operations in opcode-row order (0x80–0xBF and the
/// matching immediate column).
#[derive(Clone, Copy)]
enum AluKind {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluKind {
    const ORDER: [AluKind; 8] = [
        AluKind::Add,
        AluKind::Adc,
        AluKind::Sub,
        AluKind::Sbc,
        AluKind::And,
        AluKind::Xor,
        AluKind::Or,
        AluKind::Cp,
    ];

    fn apply(self, regs: &mut Registers, value: u8) {
        match self {
            AluKind::Add => add8(regs, value, false),
            AluKind::Adc => add8(regs, value, true),
            AluKind::Sub => sub8(regs, value, false),
            AluKind::Sbc => sub8(regs, value, true),
            AluKind::And => and8(regs, value),
            AluKind::Xor => xor8(regs, value),
            AluKind::Or => or8(regs, value),
            AluKind::Cp => cp8(regs, value),
        }
    }
}

pub(super) fn install(t: &mut OpTable) {
    // ADD/ADC/SUB/SBC/AND/XOR/OR/CP A, r|(HL): 0x80–0xBF.
    for (row, kind) in AluKind::ORDER.into_iter().enumerate() {
        for (col, target) in Target::ORDER.into_iter().enumerate() {
            let opcode = 0x80 + (row as u8) * 8 + col as u8;
            let cycles = if target.is_memory() { 8 } else { 4 };
            t.op(
                opcode,
                Box::new(move |mem, regs, _ints| {
                    let value = target.read(mem, regs);
                    kind.apply(regs, value);
                    cycles
                }),
            );
        }
    }

    // ALU A, d8: 0xC6/0xCE/0xD6/0xDE/0xE6/0xEE/0xF6/0xFE.
    for (row, kind) in AluKind::ORDER.into_iter().enumerate() {
        let opcode = 0xC6 + (row as u8) * 8;
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let value = regs.fetch8(mem);
                kind.apply(regs, value);
                8
            }),
        );
    }

    // ADD HL, rr: 0x09/0x19/0x29/0x39.
    for (i, pair) in [R16::BC, R16::DE, R16::HL, R16::SP].into_iter().enumerate() {
        let opcode = 0x09 + (i as u8) * 0x10;
        t.op(
            opcode,
            Box::new(move |_mem, regs, _ints| {
                let value = pair.get(regs);
                add16_hl(regs, value);
                8
            }),
        );
    }

    // ADD SP, r8.
    t.op(
        0xE8,
        Box::new(|mem, regs, _ints| {
            let imm = regs.fetch8(mem);
            let sp = regs.sp;
            regs.sp = add16_signed(regs, sp, imm);
            16
        }),
    );

    // Rotate A instructions (unprefixed).
    //
    // Similar to the prefixed rotates but always operating on A and with
    // slightly different flag semantics: Z is always cleared, whatever the
    // result. The prefixed counterparts compute Z from the result.
    t.op(
        0x07,
        Box::new(|_mem, regs, _ints| {
            // RLCA: rotate A left. Bit 7 to Carry and bit 0.
            let a = regs.a;
            regs.a = a.rotate_left(1);
            regs.clear_flags();
            regs.set_flag(Flag::C, (a & 0x80) != 0);
            4
        }),
    );
    t.op(
        0x0F,
        Box::new(|_mem, regs, _ints| {
            // RRCA: rotate A right. Bit 0 to Carry and bit 7.
            let a = regs.a;
            regs.a = a.rotate_right(1);
            regs.clear_flags();
            regs.set_flag(Flag::C, (a & 0x01) != 0);
            4
        }),
    );
    t.op(
        0x17,
        Box::new(|_mem, regs, _ints| {
            // RLA: rotate A left through Carry.
            let a = regs.a;
            let carry_in = if regs.flag(Flag::C) { 1 } else { 0 };
            regs.a = (a << 1) | carry_in;
            regs.clear_flags();
            regs.set_flag(Flag::C, (a & 0x80) != 0);
            4
        }),
    );
    t.op(
        0x1F,
        Box::new(|_mem, regs, _ints| {
            // RRA: rotate A right through Carry.
            let a = regs.a;
            let carry_in = if regs.flag(Flag::C) { 0x80 } else { 0 };
            regs.a = (a >> 1) | carry_in;
            regs.clear_flags();
            regs.set_flag(Flag::C, (a & 0x01) != 0);
            4
        }),
    );

    // DAA.
    t.op(
        0x27,
        Box::new(|_mem, regs, _ints| {
            daa(regs);
            4
        }),
    );

    // CPL.
    t.op(
        0x2F,
        Box::new(|_mem, regs, _ints| {
            regs.a = !regs.a;
            regs.set_flag(Flag::N, true);
            regs.set_flag(Flag::H, true);
            4
        }),
    );

    // SCF.
    t.op(
        0x37,
        Box::new(|_mem, regs, _ints| {
            regs.set_flag(Flag::C, true);
            regs.set_flag(Flag::N, false);
            regs.set_flag(Flag::H, false);
            4
        }),
    );

    // CCF.
    t.op(
        0x3F,
        Box::new(|_mem, regs, _ints| {
            let carry = regs.flag(Flag::C);
            regs.set_flag(Flag::C, !carry);
            regs.set_flag(Flag::N, false);
            regs.set_flag(Flag::H, false);
            4
        }),
    );
}
