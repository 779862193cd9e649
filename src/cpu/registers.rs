//! The 6502 register file.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// # CPU status register (P) flags
    ///
    /// | Bit | Mask | Name              |
    /// |-----|------|-------------------|
    /// | 7   | 0x80 | NEGATIVE          |
    /// | 6   | 0x40 | OVERFLOW          |
    /// | 5   | 0x20 | UNUSED            |
    /// | 4   | 0x10 | BREAK             |
    /// | 3   | 0x08 | DECIMAL           |
    /// | 2   | 0x04 | INTERRUPT_DISABLE |
    /// | 1   | 0x02 | ZERO              |
    /// | 0   | 0x01 | CARRY             |
    ///
    /// BREAK and UNUSED are not real flag bits on the NMOS parts: they read
    /// back as 1 whenever P is pushed or restored in emulation mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        /// Carry flag
        const CARRY = 0b0000_0001;
        /// Zero flag
        const ZERO = 0b0000_0010;
        /// Interrupt disable
        const INTERRUPT_DISABLE = 0b0000_0100;
        /// Decimal mode (BCD arithmetic for ADC/SBC)
        const DECIMAL = 0b0000_1000;
        /// Break flag (set when P is pushed by BRK, clear for IRQ/NMI)
        const BREAK = 0b0001_0000;
        /// Unused (always 1 when pushed to stack)
        const UNUSED = 0b0010_0000;
        /// Overflow flag
        const OVERFLOW = 0b0100_0000;
        /// Negative flag
        const NEGATIVE = 0b1000_0000;
    }
}

/// The 6502 register file.
///
/// The accumulator is 16 bits wide so the same register block can serve a
/// 65C816 data model; in emulation mode only the low byte is used and the
/// high byte stays zero.
#[derive(Debug, Clone, Copy)]
pub struct Registers {
    /// Accumulator
    pub a: u16,
    /// X index register
    pub x: u8,
    /// Y index register
    pub y: u8,
    /// Stack pointer (stack lives at 0x0100 + S)
    pub s: u8,
    /// Program counter
    pub pc: u16,
    /// Status register
    pub p: StatusFlags,
}

impl Registers {
    /// Power-on state: A=X=Y=0, S=0xFF, P=0x34 (I, B, bit 5 set).
    pub fn new() -> Self {
        Registers {
            a: 0,
            x: 0,
            y: 0,
            s: 0xff,
            pc: 0,
            p: StatusFlags::INTERRUPT_DISABLE | StatusFlags::BREAK | StatusFlags::UNUSED,
        }
    }

    /// Accumulator low byte.
    #[inline]
    pub fn a8(&self) -> u8 {
        self.a as u8
    }

    /// Store an 8-bit result in the accumulator.
    #[inline]
    pub fn set_a8(&mut self, value: u8) {
        self.a = u16::from(value);
    }

    /// Update N and Z from an 8-bit result.
    pub fn set_nz(&mut self, result: u8) {
        self.p.set(StatusFlags::ZERO, result == 0);
        self.p.set(StatusFlags::NEGATIVE, result & 0x80 != 0);
    }

    /// Carry flag as a 0/1 addend.
    #[inline]
    pub fn carry_in(&self) -> u8 {
        u8::from(self.p.contains(StatusFlags::CARRY))
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PC {:04x}, A {:02x}, X {:02x}, Y {:02x}, S {:02x}, P {:02x} (",
            self.pc,
            self.a,
            self.x,
            self.y,
            self.s,
            self.p.bits()
        )?;
        for i in (0..8).rev() {
            let c = if self.p.bits() & (1 << i) != 0 {
                b"czidxmvn"[i] as char
            } else {
                '.'
            };
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}
