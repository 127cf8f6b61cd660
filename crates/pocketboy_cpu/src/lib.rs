//! Cycle-accurate Sharp LR35902 (Game Boy) CPU core.
//!
//! The core owns the register file, the opcode dispatch table and the
//! interrupt controller; everything else (bus, PPU, APU, timer, joypad) is
//! an external collaborator reached through the [`Memory`] trait and the
//! interrupt-request API. The host loop calls [`Cpu::step`] repeatedly and
//! feeds the returned cycle count to the sibling subsystems.

pub mod cpu;
pub mod interrupts;
pub mod memory;
pub mod ops;
pub mod registers;

pub use cpu::{Cpu, CpuState};
pub use interrupts::{Interrupt, InterruptController, InterruptFlags};
pub use memory::{FlatMemory, Memory};
pub use ops::OpTable;
pub use registers::{Flag, Registers};
