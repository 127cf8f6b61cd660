mod alu;
mod cb;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;


use crate::interrupts::InterruptController;
use crate::memory::Memory;
use crate::registers::{Flag, Registers};

/// The extended-prefix escape opcode. Prefixed operations are keyed as
/// `(PREFIX << 8) | second_byte` in the dispatch table.
pub const PREFIX: u8 = 0xCB;

/// Cycles charged up front for an extended-prefix operation (the prefix
/// fetch). The state machine returns this on the first tick and defers the
/// operation body to the next one, reporting `total - padding` there.
pub(crate) const PREFIX_PADDING: u32 = 4;

/// One instruction body: a stateless mapping from the three collaborators to
/// the number of T-cycles the hardware spends on it.
pub(crate) type OpExec =
    Box<dyn Fn(&mut dyn Memory, &mut Registers, &mut InterruptController) -> u32 + Send + Sync>;

/// State transition requested by an operation, applied by the CPU state
/// machine after the body runs. Keeps the operation signature fixed to the
/// memory/register/interrupt collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Effect {
    None,
    Halt,
    Stop,
}

pub(crate) struct Op {
    pub(crate) padding: u32,
    pub(crate) effect: Effect,
    pub(crate) exec: OpExec,
}

/// The opcode dispatch table: one operation per legal one- or two-byte
/// opcode, built once at startup and never mutated afterwards.
pub struct OpTable {
    base: [Option<Op>; 256],
    cb: [Option<Op>; 256],
}

impl OpTable {
    pub fn new() -> Self {
        let mut table = Self {
            base: std::array::from_fn(|_| None),
            cb: std::array::from_fn(|_| None),
        };
        system::install(&mut table);
        ld::install(&mut table);
        alu::install(&mut table);
        incdec::install(&mut table);
        control::install(&mut table);
        stack::install(&mut table);
        cb::install(&mut table);
        table
    }

    /// Whether `key` resolves to an operation. Keys above 0xFF are treated
    /// as prefixed lookups and must carry the prefix in the high byte.
    pub fn contains(&self, key: u16) -> bool {
        self.lookup(key).is_some()
    }

    fn lookup(&self, key: u16) -> Option<&Op> {
        if key <= 0xFF {
            self.base[key as usize].as_ref()
        } else if (key >> 8) as u8 == PREFIX {
            self.cb[(key & 0xFF) as usize].as_ref()
        } else {
            None
        }
    }

    /// Resolve `key` or raise the unsupported-instruction fault.
    ///
    /// An unmapped opcode means either one of the documented holes in the
    /// base table or a miscounted fetch; both are programming defects the
    /// core must not paper over, so this panics instead of recovering.
    pub(crate) fn resolve(&self, key: u16, at: u16) -> &Op {
        match self.lookup(key) {
            Some(op) => op,
            None => {
                log::error!("unsupported opcode 0x{key:02X} at pc=0x{at:04X}");
                panic!("unsupported opcode 0x{key:02X} at pc=0x{at:04X}");
            }
        }
    }

    fn set_base(&mut self, opcode: u8, op: Op) {
        debug_assert!(
            self.base[opcode as usize].is_none(),
            "duplicate opcode 0x{opcode:02X}"
        );
        self.base[opcode as usize] = Some(op);
    }

    /// Register a plain base-table operation.
    fn op(&mut self, opcode: u8, exec: OpExec) {
        self.set_base(
            opcode,
            Op {
                padding: 0,
                effect: Effect::None,
                exec,
            },
        );
    }

    /// Register a base-table operation that requests a state transition.
    fn op_with_effect(&mut self, opcode: u8, effect: Effect, exec: OpExec) {
        self.set_base(
            opcode,
            Op {
                padding: 0,
                effect,
                exec,
            },
        );
    }

    /// Register an extended-prefix operation; these carry the prefix-fetch
    /// padding so their latency splits across two ticks.
    fn cb_op(&mut self, sub: u8, exec: OpExec) {
        debug_assert!(
            self.cb[sub as usize].is_none(),
            "duplicate prefixed opcode 0x{sub:02X}"
        );
        self.cb[sub as usize] = Some(Op {
            padding: PREFIX_PADDING,
            effect: Effect::None,
            exec,
        });
    }
}

impl Default for OpTable {
    fn default() -> Self {
        Self::new()
    }
}

/// 8-bit register accessor, the getter/setter pair parametrizing the shared
/// operation bodies instantiated at table-construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum R8 {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl R8 {
    #[inline]
    pub(crate) fn get(self, regs: &Registers) -> u8 {
        match self {
            R8::A => regs.a,
            R8::B => regs.b,
            R8::C => regs.c,
            R8::D => regs.d,
            R8::E => regs.e,
            R8::H => regs.h,
            R8::L => regs.l,
        }
    }

    #[inline]
    pub(crate) fn set(self, regs: &mut Registers, value: u8) {
        match self {
            R8::A => regs.a = value,
            R8::B => regs.b = value,
            R8::C => regs.c = value,
            R8::D => regs.d = value,
            R8::E => regs.e = value,
            R8::H => regs.h = value,
            R8::L => regs.l = value,
        }
    }
}

/// 16-bit register accessor for the paired views plus SP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum R16 {
    AF,
    BC,
    DE,
    HL,
    SP,
}

impl R16 {
    #[inline]
    pub(crate) fn get(self, regs: &Registers) -> u16 {
        match self {
            R16::AF => regs.af(),
            R16::BC => regs.bc(),
            R16::DE => regs.de(),
            R16::HL => regs.hl(),
            R16::SP => regs.sp,
        }
    }

    #[inline]
    pub(crate) fn set(self, regs: &mut Registers, value: u16) {
        match self {
            R16::AF => regs.set_af(value),
            R16::BC => regs.set_bc(value),
            R16::DE => regs.set_de(value),
            R16::HL => regs.set_hl(value),
            R16::SP => regs.sp = value,
        }
    }
}

/// Operand target in the standard opcode-table register order:
/// B, C, D, E, H, L, (HL), A. Memory targets read/write through HL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Target {
    Reg(R8),
    HlIndirect,
}

impl Target {
    pub(crate) const ORDER: [Target; 8] = [
        Target::Reg(R8::B),
        Target::Reg(R8::C),
        Target::Reg(R8::D),
        Target::Reg(R8::E),
        Target::Reg(R8::H),
        Target::Reg(R8::L),
        Target::HlIndirect,
        Target::Reg(R8::A),
    ];

    #[inline]
    pub(crate) fn read(self, mem: &mut dyn Memory, regs: &Registers) -> u8 {
        match self {
            Target::Reg(r) => r.get(regs),
            Target::HlIndirect => mem.read_byte(regs.hl()),
        }
    }

    #[inline]
    pub(crate) fn write(self, mem: &mut dyn Memory, regs: &mut Registers, value: u8) {
        match self {
            Target::Reg(r) => r.set(regs, value),
            Target::HlIndirect => mem.write_byte(regs.hl(), value),
        }
    }

    #[inline]
    pub(crate) fn is_memory(self) -> bool {
        matches!(self, Target::HlIndirect)
    }
}

/// Branch condition over the Z and C flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Cond {
    NotZero,
    Zero,
    NotCarry,
    Carry,
}

impl Cond {
    /// Conditions in opcode order (the `cc` field of JR/JP/CALL/RET cc).
    pub(crate) const ORDER: [Cond; 4] = [Cond::NotZero, Cond::Zero, Cond::NotCarry, Cond::Carry];

    #[inline]
    pub(crate) fn holds(self, regs: &Registers) -> bool {
        match self {
            Cond::NotZero => !regs.flag(Flag::Z),
            Cond::Zero => regs.flag(Flag::Z),
            Cond::NotCarry => !regs.flag(Flag::C),
            Cond::Carry => regs.flag(Flag::C),
        }
    }
}
