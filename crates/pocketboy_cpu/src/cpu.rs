#[cfg(test)]
mod tests;

use crate::interrupts::{Interrupt, InterruptController};
use crate::memory::Memory;
use crate::ops::{Effect, OpTable, PREFIX};
use crate::registers::Registers;

/// Execution state of the core.
///
/// Transitions are driven only by instruction execution (HALT/STOP) and by
/// the interrupt controller's wake conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuState {
    Normal,
    Halted,
    Stopped,
    HaltBug,
}

/// An instruction whose padding was charged on the previous tick and whose
/// body still has to run.
#[derive(Clone, Copy, Debug)]
struct Deferred {
    key: u16,
    /// Opcode address, kept for fault diagnostics.
    at: u16,
    /// PC to restore after the body runs, when this instruction executes
    /// under the HALT bug.
    restore_pc: Option<u16>,
}

/// Game Boy CPU core (Sharp LR35902 class).
///
/// The host drives it one tick at a time through [`Cpu::step`] and uses the
/// returned cycle count to advance the sibling subsystems by the same amount;
/// that count is the core's only timing contract with the rest of the
/// machine.
pub struct Cpu {
    pub regs: Registers,
    pub interrupts: InterruptController,
    state: CpuState,
    deferred: Option<Deferred>,
    table: OpTable,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            interrupts: InterruptController::new(),
            state: CpuState::Normal,
            deferred: None,
            table: OpTable::new(),
        };
        cpu.apply_post_boot_state();
        cpu
    }

    /// Reset to the power-on state without rebuilding the dispatch table.
    pub fn reset(&mut self) {
        self.regs = Registers::default();
        self.interrupts.reset();
        self.state = CpuState::Normal;
        self.deferred = None;
        self.apply_post_boot_state();
    }

    /// Registers as the DMG boot ROM leaves them when it hands control to
    /// cartridge code at 0x0100. Compatibility test ROMs assume these exact
    /// values.
    fn apply_post_boot_state(&mut self) {
        self.regs.set_af(0x01B0);
        self.regs.set_bc(0x0013);
        self.regs.set_de(0x00D8);
        self.regs.set_hl(0x014D);
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;
    }

    #[inline]
    pub fn state(&self) -> CpuState {
        self.state
    }

    /// Run one tick: at most one instruction plus any interrupt entry, and
    /// return the number of T-cycles consumed.
    ///
    /// Halted ticks idle at 4 cycles; Stopped ticks consume nothing until a
    /// Joypad request wakes the core.
    pub fn step(&mut self, mem: &mut dyn Memory) -> u32 {
        match self.state {
            CpuState::Stopped => {
                // STOP wakes on a raised Joypad request line even when the
                // line is masked off in the enable bits.
                if self.interrupts.requested(Interrupt::Joypad) {
                    self.state = CpuState::Normal;
                }
                0
            }
            CpuState::Halted => {
                if self.interrupts.pending() {
                    self.state = CpuState::Normal;
                }
                // The controller still runs: the EI countdown resolves and a
                // pending interrupt is serviced on the wake tick when IME
                // allows it.
                4 + self.interrupts.step(mem, &mut self.regs)
            }
            CpuState::Normal | CpuState::HaltBug => self.step_instruction(mem),
        }
    }

    fn step_instruction(&mut self, mem: &mut dyn Memory) -> u32 {
        if let Some(deferred) = self.deferred.take() {
            return self.finish_deferred(mem, deferred);
        }

        // Under the HALT bug the next instruction runs normally but PC snaps
        // back afterwards, so the byte after HALT is fetched twice.
        let restore_pc = (self.state == CpuState::HaltBug).then_some(self.regs.pc);
        let at = self.regs.pc;
        let key = self.fetch_key(mem);

        let op = self.table.resolve(key, at);
        let padding = op.padding;
        let effect = op.effect;

        if padding > 0 {
            // Two-phase execution: charge the padding now, run the body on
            // the next tick. No interrupt service while the instruction is
            // outstanding.
            self.deferred = Some(Deferred {
                key,
                at,
                restore_pc,
            });
            return padding;
        }

        let cycles = (op.exec)(mem, &mut self.regs, &mut self.interrupts);
        self.apply_effect(effect);
        self.retire(restore_pc);
        let serviced = self.interrupts.step(mem, &mut self.regs);
        if serviced > 0 && effect == Effect::Halt {
            // The EI countdown can resolve in the same tick as HALT, in
            // which case the interrupt is taken right away and the core
            // runs the handler normally instead of halting or tripping
            // the bug.
            self.state = CpuState::Normal;
        }
        cycles + serviced
    }

    fn finish_deferred(&mut self, mem: &mut dyn Memory, deferred: Deferred) -> u32 {
        let op = self.table.resolve(deferred.key, deferred.at);
        let padding = op.padding;
        let effect = op.effect;

        let total = (op.exec)(mem, &mut self.regs, &mut self.interrupts);
        debug_assert!(total >= padding, "padding exceeds instruction cost");
        let cycles = total - padding;

        self.apply_effect(effect);
        self.retire(deferred.restore_pc);
        cycles + self.interrupts.step(mem, &mut self.regs)
    }

    /// Fetch the next dispatch key, resolving the extended-prefix escape by
    /// fetching a second byte.
    fn fetch_key(&mut self, mem: &mut dyn Memory) -> u16 {
        let opcode = self.regs.fetch8(mem);
        if opcode == PREFIX {
            let sub = self.regs.fetch8(mem);
            ((PREFIX as u16) << 8) | sub as u16
        } else {
            opcode as u16
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Stop => self.state = CpuState::Stopped,
            Effect::Halt => {
                if self.interrupts.pending() {
                    if !self.interrupts.master_enabled() {
                        // Pending-and-enabled with IME clear: the CPU does
                        // not halt, and the following byte is fetched twice.
                        self.state = CpuState::HaltBug;
                    }
                    // With IME set the pending interrupt is serviced right
                    // after HALT; the core stays in Normal.
                } else {
                    self.state = CpuState::Halted;
                }
            }
        }
    }

    /// Finish a HALT-bug instruction: PC snaps back to its pre-fetch value
    /// and the core leaves the bug state.
    fn retire(&mut self, restore_pc: Option<u16>) {
        if let Some(pc) = restore_pc {
            self.regs.pc = pc;
            if self.state == CpuState::HaltBug {
                self.state = CpuState::Normal;
            }
        }
    }
}
