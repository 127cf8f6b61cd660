use crate::memory::Memory;

/// Registers for the Game Boy CPU (LR35902).
///
/// The core is Z80-like with an 8-bit ALU and a 16-bit address space.
/// Eight 8-bit registers pair up into the AF/BC/DE/HL views; `sp` and `pc`
/// are plain 16-bit counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct Registers {
    pub a: u8,
    f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    #[inline]
    pub fn f(&self) -> u8 {
        self.f
    }

    /// Lower 4 bits of F are always zero; every write path masks them out.
    #[inline]
    pub fn set_f(&mut self, value: u8) {
        self.f = value & 0xF0;
    }

    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        self.set_f(f);
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }

    #[inline]
    pub fn flag(&self, flag: Flag) -> bool {
        (self.f & (1 << flag as u8)) != 0
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        if value {
            self.f |= 1 << flag as u8;
        } else {
            self.f &= !(1 << flag as u8);
        }
    }

    #[inline]
    pub fn clear_flags(&mut self) {
        self.f = 0;
    }

    /// Fetch the byte at PC and advance PC by one (wrapping mod 0x10000).
    #[inline]
    pub fn fetch8(&mut self, mem: &mut dyn Memory) -> u8 {
        let value = mem.read_byte(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    /// Fetch a little-endian word operand at PC and advance PC by two.
    #[inline]
    pub fn fetch16(&mut self, mem: &mut dyn Memory) -> u16 {
        let lo = self.fetch8(mem) as u16;
        let hi = self.fetch8(mem) as u16;
        (hi << 8) | lo
    }

    /// Push a word onto the stack: high byte first at descending addresses.
    ///
    /// Stack grows downward; memory[SP] = low, memory[SP + 1] = high.
    #[inline]
    pub fn push16(&mut self, mem: &mut dyn Memory, value: u16) {
        let lo = value as u8;
        let hi = (value >> 8) as u8;
        self.sp = self.sp.wrapping_sub(1);
        mem.write_byte(self.sp, hi);
        self.sp = self.sp.wrapping_sub(1);
        mem.write_byte(self.sp, lo);
    }

    /// Pop a word off the stack; mirror image of `push16`.
    #[inline]
    pub fn pop16(&mut self, mem: &mut dyn Memory) -> u16 {
        let lo = mem.read_byte(self.sp) as u16;
        let hi = mem.read_byte(self.sp.wrapping_add(1)) as u16;
        self.sp = self.sp.wrapping_add(2);
        (hi << 8) | lo
    }
}

/// Flag bits in the F register.
///
/// Layout (bit index in the byte, from MSB to LSB):
/// - bit 7: Z (zero)
/// - bit 6: N (subtract)
/// - bit 5: H (half carry)
/// - bit 4: C (carry)
/// - bits 0–3 are always zero.
#[derive(Clone, Copy, Debug)]
pub enum Flag {
    Z = 7,
    N = 6,
    H = 5,
    C = 4,
}
