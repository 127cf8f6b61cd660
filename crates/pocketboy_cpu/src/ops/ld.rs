use crate::registers::Registers;

use super::{alu, OpTable, Target, R16};

/// Address register plus the post-access HL adjustment used by the
/// LD (BC/DE/HL±),A family and its mirror loads.
#[derive(Clone, Copy)]
enum Indirect {
    Bc,
    De,
    HlInc,
    HlDec,
}

impl Indirect {
    const ORDER: [Indirect; 4] = [Indirect::Bc, Indirect::De, Indirect::HlInc, Indirect::HlDec];

    fn address(self, regs: &mut Registers) -> u16 {
        match self {
            Indirect::Bc => regs.bc(),
            Indirect::De => regs.de(),
            Indirect::HlInc => {
                let addr = regs.hl();
                regs.set_hl(addr.wrapping_add(1));
                addr
            }
            Indirect::HlDec => {
                let addr = regs.hl();
                regs.set_hl(addr.wrapping_sub(1));
                addr
            }
        }
    }
}

pub(super) fn install(t: &mut OpTable) {
    // LD rr, d16: 0x01/0x11/0x21/0x31.
    for (i, pair) in [R16::BC, R16::DE, R16::HL, R16::SP].into_iter().enumerate() {
        let opcode = 0x01 + (i as u8) * 0x10;
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let value = regs.fetch16(mem);
                pair.set(regs, value);
                12
            }),
        );
    }

    // LD r, d8 and LD (HL), d8: 0x06/0x0E/.../0x3E.
    for (i, target) in Target::ORDER.into_iter().enumerate() {
        let opcode = 0x06 + (i as u8) * 8;
        let cycles = if target.is_memory() { 12 } else { 8 };
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let value = regs.fetch8(mem);
                target.write(mem, regs, value);
                cycles
            }),
        );
    }

    // LD r1, r2 and the (HL) transfers: 0x40–0x7F minus 0x76 (HALT).
    for (d, dst) in Target::ORDER.into_iter().enumerate() {
        for (s, src) in Target::ORDER.into_iter().enumerate() {
            let opcode = 0x40 + (d as u8) * 8 + s as u8;
            if opcode == 0x76 {
                continue;
            }
            let cycles = if dst.is_memory() || src.is_memory() { 8 } else { 4 };
            t.op(
                opcode,
                Box::new(move |mem, regs, _ints| {
                    let value = src.read(mem, regs);
                    dst.write(mem, regs, value);
                    cycles
                }),
            );
        }
    }

    // LD (BC/DE/HL±), A: 0x02/0x12/0x22/0x32.
    for (i, ind) in Indirect::ORDER.into_iter().enumerate() {
        let opcode = 0x02 + (i as u8) * 0x10;
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let addr = ind.address(regs);
                mem.write_byte(addr, regs.a);
                8
            }),
        );
    }

    // LD A, (BC/DE/HL±): 0x0A/0x1A/0x2A/0x3A.
    for (i, ind) in Indirect::ORDER.into_iter().enumerate() {
        let opcode = 0x0A + (i as u8) * 0x10;
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let addr = ind.address(regs);
                regs.a = mem.read_byte(addr);
                8
            }),
        );
    }

    // LD (a16), SP.
    t.op(
        0x08,
        Box::new(|mem, regs, _ints| {
            let addr = regs.fetch16(mem);
            mem.write_word(addr, regs.sp);
            20
        }),
    );

    // LDH (a8), A / LDH A, (a8): high-page loads at 0xFF00 + imm8.
    t.op(
        0xE0,
        Box::new(|mem, regs, _ints| {
            let offset = regs.fetch8(mem) as u16;
            mem.write_byte(0xFF00u16.wrapping_add(offset), regs.a);
            12
        }),
    );
    t.op(
        0xF0,
        Box::new(|mem, regs, _ints| {
            let offset = regs.fetch8(mem) as u16;
            regs.a = mem.read_byte(0xFF00u16.wrapping_add(offset));
            12
        }),
    );

    // LDH (C), A / LDH A, (C).
    t.op(
        0xE2,
        Box::new(|mem, regs, _ints| {
            mem.write_byte(0xFF00u16.wrapping_add(regs.c as u16), regs.a);
            8
        }),
    );
    t.op(
        0xF2,
        Box::new(|mem, regs, _ints| {
            regs.a = mem.read_byte(0xFF00u16.wrapping_add(regs.c as u16));
            8
        }),
    );

    // LD (a16), A / LD A, (a16).
    t.op(
        0xEA,
        Box::new(|mem, regs, _ints| {
            let addr = regs.fetch16(mem);
            mem.write_byte(addr, regs.a);
            16
        }),
    );
    t.op(
        0xFA,
        Box::new(|mem, regs, _ints| {
            let addr = regs.fetch16(mem);
            regs.a = mem.read_byte(addr);
            16
        }),
    );

    // LD HL, SP+r8.
    t.op(
        0xF8,
        Box::new(|mem, regs, _ints| {
            let imm = regs.fetch8(mem);
            let sp = regs.sp;
            let result = alu::add16_signed(regs, sp, imm);
            regs.set_hl(result);
            12
        }),
    );

    // LD SP, HL.
    t.op(
        0xF9,
        Box::new(|_mem, regs, _ints| {
            regs.sp = regs.hl();
            8
        }),
    );
}
