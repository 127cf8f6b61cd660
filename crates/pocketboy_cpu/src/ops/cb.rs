use crate::registers::{Flag, Registers};

use super::{OpTable, Target};

/// The eight rotate/shift shapes in the low quarter of the prefix table.
///
/// All of them compute Z from the result, unlike the unprefixed accumulator
/// rotates which force Z clear.
#[derive(Clone, Copy)]
enum ShiftKind {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl ShiftKind {
    const ORDER: [ShiftKind; 8] = [
        ShiftKind::Rlc,
        ShiftKind::Rrc,
        ShiftKind::Rl,
        ShiftKind::Rr,
        ShiftKind::Sla,
        ShiftKind::Sra,
        ShiftKind::Swap,
        ShiftKind::Srl,
    ];

    fn apply(self, regs: &mut Registers, value: u8) -> u8 {
        let (result, carry) = match self {
            ShiftKind::Rlc => (value.rotate_left(1), (value & 0x80) != 0),
            ShiftKind::Rrc => (value.rotate_right(1), (value & 0x01) != 0),
            ShiftKind::Rl => {
                let carry_in = if regs.flag(Flag::C) { 1 } else { 0 };
                ((value << 1) | carry_in, (value & 0x80) != 0)
            }
            ShiftKind::Rr => {
                let carry_in = if regs.flag(Flag::C) { 0x80 } else { 0 };
                ((value >> 1) | carry_in, (value & 0x01) != 0)
            }
            ShiftKind::Sla => (value << 1, (value & 0x80) != 0),
            ShiftKind::Sra => ((value >> 1) | (value & 0x80), (value & 0x01) != 0),
            ShiftKind::Swap => ((value << 4) | (value >> 4), false),
            ShiftKind::Srl => (value >> 1, (value & 0x01) != 0),
        };

        regs.clear_flags();
        regs.set_flag(Flag::Z, result == 0);
        regs.set_flag(Flag::C, carry);
        result
    }
}

pub(super) fn install(t: &mut OpTable) {
    for (i, target) in Target::ORDER.into_iter().enumerate() {
        let col = i as u8;

        // Rotates and shifts: 0x00–0x3F.
        for (row, kind) in ShiftKind::ORDER.into_iter().enumerate() {
            let sub = (row as u8) * 8 + col;
            let cycles = if target.is_memory() { 16 } else { 8 };
            t.cb_op(
                sub,
                Box::new(move |mem, regs, _ints| {
                    let value = target.read(mem, regs);
                    let result = kind.apply(regs, value);
                    target.write(mem, regs, result);
                    cycles
                }),
            );
        }

        for bit in 0..8u8 {
            // BIT b, r: 0x40–0x7F. Z from the tested bit, H set, N clear,
            // C preserved. No write-back.
            let sub = 0x40 + bit * 8 + col;
            let cycles = if target.is_memory() { 12 } else { 8 };
            t.cb_op(
                sub,
                Box::new(move |mem, regs, _ints| {
                    let value = target.read(mem, regs);
                    regs.set_flag(Flag::Z, (value & (1 << bit)) == 0);
                    regs.set_flag(Flag::N, false);
                    regs.set_flag(Flag::H, true);
                    cycles
                }),
            );

            // RES b, r: 0x80–0xBF. Flags untouched.
            let sub = 0x80 + bit * 8 + col;
            let cycles = if target.is_memory() { 16 } else { 8 };
            t.cb_op(
                sub,
                Box::new(move |mem, regs, _ints| {
                    let value = target.read(mem, regs) & !(1 << bit);
                    target.write(mem, regs, value);
                    cycles
                }),
            );

            // SET b, r: 0xC0–0xFF. Flags untouched.
            let sub = 0xC0 + bit * 8 + col;
            t.cb_op(
                sub,
                Box::new(move |mem, regs, _ints| {
                    let value = target.read(mem, regs) | (1 << bit);
                    target.write(mem, regs, value);
                    cycles
                }),
            );
        }
    }
}
