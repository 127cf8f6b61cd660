use bitflags::bitflags;

use crate::memory::Memory;
use crate::registers::Registers;

/// The five maskable interrupt lines, in priority order.
///
/// VBlank has the highest priority, Joypad the lowest. Each line has a fixed
/// service routine address the CPU jumps to when the interrupt is taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    VBlank,
    Lcd,
    Timer,
    Serial,
    Joypad,
}

impl Interrupt {
    /// All lines, highest priority first.
    pub const PRIORITY: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::Lcd,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    #[inline]
    pub fn mask(self) -> InterruptFlags {
        match self {
            Interrupt::VBlank => InterruptFlags::VBLANK,
            Interrupt::Lcd => InterruptFlags::LCD,
            Interrupt::Timer => InterruptFlags::TIMER,
            Interrupt::Serial => InterruptFlags::SERIAL,
            Interrupt::Joypad => InterruptFlags::JOYPAD,
        }
    }

    /// Fixed service routine address for this line.
    #[inline]
    pub fn service_address(self) -> u16 {
        match self {
            Interrupt::VBlank => 0x0040,
            Interrupt::Lcd => 0x0048,
            Interrupt::Timer => 0x0050,
            Interrupt::Serial => 0x0058,
            Interrupt::Joypad => 0x0060,
        }
    }
}

bitflags! {
    /// Per-line interrupt bits, shared by the enable and request masks.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InterruptFlags: u8 {
        const VBLANK = 1 << 0;
        const LCD = 1 << 1;
        const TIMER = 1 << 2;
        const SERIAL = 1 << 3;
        const JOYPAD = 1 << 4;
    }
}

/// Interrupt controller: enable/request masks, the master-enable gate, and
/// the delayed-activation countdown armed by EI.
///
/// Sibling subsystems raise interrupts by calling `request` between CPU
/// ticks; the CPU itself drives `step` once per instruction.
#[derive(Clone, Debug, Default)]
pub struct InterruptController {
    enabled: InterruptFlags,
    requested: InterruptFlags,
    ime: bool,
    /// Two-step EI countdown. 2 = armed this instruction, 1 = one more
    /// instruction to go, 0 = idle. IME flips true when it reaches zero.
    enable_delay: u8,
}

/// Cycles consumed by a full interrupt entry (push PC + vector jump).
pub const SERVICE_CYCLES: u32 = 20;

impl InterruptController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all masks, the master-enable gate and any armed EI countdown.
    pub fn reset(&mut self) {
        self.enabled = InterruptFlags::empty();
        self.requested = InterruptFlags::empty();
        self.ime = false;
        self.enable_delay = 0;
    }

    /// Set or clear the enable bit for `kind`; independent of master-enable.
    pub fn enable(&mut self, kind: Interrupt, on: bool) {
        self.enabled.set(kind.mask(), on);
    }

    /// Set or clear the request bit for `kind`; independent of master-enable.
    pub fn request(&mut self, kind: Interrupt, on: bool) {
        self.requested.set(kind.mask(), on);
    }

    #[inline]
    pub fn enabled(&self, kind: Interrupt) -> bool {
        self.enabled.contains(kind.mask())
    }

    #[inline]
    pub fn requested(&self, kind: Interrupt) -> bool {
        self.requested.contains(kind.mask())
    }

    /// True when at least one line is both requested and enabled.
    #[inline]
    pub fn pending(&self) -> bool {
        !(self.requested & self.enabled).is_empty()
    }

    #[inline]
    pub fn master_enabled(&self) -> bool {
        self.ime
    }

    /// Flip master-enable immediately. DI and RETI use this; DI also
    /// cancels an armed EI countdown.
    pub fn set_master_enabled(&mut self, on: bool) {
        self.ime = on;
        if !on {
            self.enable_delay = 0;
        }
    }

    /// Arm the delayed enable used by EI: IME becomes true only after the
    /// instruction following EI completes.
    pub fn schedule_enable(&mut self) {
        self.enable_delay = 2;
    }

    /// Resolve the EI countdown, then service the highest-priority pending
    /// interrupt if master-enable allows it.
    ///
    /// Servicing clears master-enable and the line's request bit, pushes PC
    /// and jumps to the service address, charging [`SERVICE_CYCLES`].
    /// Returns 0 when nothing is serviced.
    pub fn step(&mut self, mem: &mut dyn Memory, regs: &mut Registers) -> u32 {
        match self.enable_delay {
            2 => self.enable_delay = 1,
            1 => {
                self.enable_delay = 0;
                self.ime = true;
            }
            _ => {}
        }

        if !self.ime {
            return 0;
        }

        let pending = self.requested & self.enabled;
        if pending.is_empty() {
            return 0;
        }

        // Highest-priority line wins; the scan order is the hardware's.
        for kind in Interrupt::PRIORITY {
            if pending.contains(kind.mask()) {
                return self.service(mem, regs, kind);
            }
        }
        0
    }

    fn service(&mut self, mem: &mut dyn Memory, regs: &mut Registers, kind: Interrupt) -> u32 {
        self.ime = false;
        self.requested.remove(kind.mask());

        let pc = regs.pc;
        regs.push16(mem, pc);
        regs.pc = kind.service_address();

        log::debug!(
            "interrupt dispatch: {:?} vector=0x{:04X} from pc=0x{:04X} sp=0x{:04X}",
            kind,
            regs.pc,
            pc,
            regs.sp,
        );

        SERVICE_CYCLES
    }
}
