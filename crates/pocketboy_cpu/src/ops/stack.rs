use super::{OpTable, R16};

pub(super) fn install(t: &mut OpTable) {
    // PUSH rr: 0xC5/0xD5/0xE5/0xF5. AF sits in the last slot.
    for (i, pair) in [R16::BC, R16::DE, R16::HL, R16::AF].into_iter().enumerate() {
        let opcode = 0xC5 + (i as u8) * 0x10;
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let value = pair.get(regs);
                regs.push16(mem, value);
                16
            }),
        );
    }

    // POP rr: 0xC1/0xD1/0xE1/0xF1. POP AF goes through the masked setter,
    // so the low nibble of F stays zero whatever was on the stack.
    for (i, pair) in [R16::BC, R16::DE, R16::HL, R16::AF].into_iter().enumerate() {
        let opcode = 0xC1 + (i as u8) * 0x10;
        t.op(
            opcode,
            Box::new(move |mem, regs, _ints| {
                let value = regs.pop16(mem);
                pair.set(regs, value);
                12
            }),
        );
    }
}
