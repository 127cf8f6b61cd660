/// Abstraction over the byte-addressable memory the CPU executes against.
///
/// The CPU issues reads for opcode/operand fetches and explicit loads, and
/// writes for explicit stores and stack pushes. It never interprets
/// memory-region semantics (bank switching, echo RAM and friends belong to
/// the bus implementation), and it caches nothing between `step` calls.
pub trait Memory {
    fn read_byte(&mut self, addr: u16) -> u8;
    fn write_byte(&mut self, addr: u16, value: u8);

    /// Little-endian word read.
    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read_byte(addr) as u16;
        let hi = self.read_byte(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Little-endian word write.
    fn write_word(&mut self, addr: u16, value: u16) {
        self.write_byte(addr, value as u8);
        self.write_byte(addr.wrapping_add(1), (value >> 8) as u8);
    }
}

/// A flat 64 KiB address space.
///
/// Good enough for exercising the CPU in isolation and for simple hosts;
/// real machines substitute a bus with mappers and IO behind this trait.
pub struct FlatMemory {
    bytes: [u8; 0x10000],
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self {
            bytes: [0; 0x10000],
        }
    }
}

impl FlatMemory {
    /// Copy a program image into the address space starting at `offset`.
    ///
    /// The image must fit below 0x10000; an image running past the end of
    /// the address space is a host programming defect and panics.
    pub fn load(&mut self, offset: u16, image: &[u8]) {
        let start = offset as usize;
        let end = start + image.len();
        assert!(
            end <= self.bytes.len(),
            "image of {} bytes at 0x{offset:04X} runs past the end of the address space",
            image.len()
        );
        self.bytes[start..end].copy_from_slice(image);
    }
}

impl Memory for FlatMemory {
    fn read_byte(&mut self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize] = value;
    }
}
