use super::{Effect, OpTable};

pub(super) fn install(t: &mut OpTable) {
    // NOP.
    t.op(0x00, Box::new(|_mem, _regs, _ints| 4));

    // HALT. The body only charges the cycles; whether the CPU enters the
    // Halted state, trips the HALT bug or keeps running depends on the
    // interrupt state and is decided by the state machine.
    t.op_with_effect(0x76, Effect::Halt, Box::new(|_mem, _regs, _ints| 4));

    // STOP is encoded as two bytes; the second is fetched and discarded so
    // PC matches hardware.
    t.op_with_effect(
        0x10,
        Effect::Stop,
        Box::new(|mem, regs, _ints| {
            let _padding = regs.fetch8(mem);
            4
        }),
    );

    // DI: master-enable drops immediately, cancelling any armed EI.
    t.op(
        0xF3,
        Box::new(|_mem, _regs, ints| {
            ints.set_master_enabled(false);
            4
        }),
    );

    // EI: master-enable flips only after the next instruction completes.
    t.op(
        0xFB,
        Box::new(|_mem, _regs, ints| {
            ints.schedule_enable();
            4
        }),
    );
}
