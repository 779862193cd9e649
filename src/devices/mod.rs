//! Apex character devices.
//!
//! A character device is the host side of the Apex byte-I/O handler: a
//! small capability bundle of open/input/output/close operations. Each
//! operation receives the register file (the Apex calling convention
//! passes data in A) and reports success; the vector layer turns failure
//! into the carry flag for the emulated caller.

use crate::cpu::Registers;

mod console;
mod file;
mod printer;

pub use console::ConsoleDevice;
pub use file::FileByteDevice;
pub use printer::PrinterDevice;

/// Byte returned by input when nothing more will come (Ctrl-Z, ASCII SUB).
pub const EOF_BYTE: u8 = 0x1a;

/// The character-device capability set.
///
/// Defaults mirror the Apex driver skeleton: opens and close succeed,
/// input is never announced as available.
pub trait CharDevice {
    fn open_for_input(&mut self, _regs: &mut Registers) -> bool {
        true
    }

    fn open_for_output(&mut self, _regs: &mut Registers) -> bool {
        true
    }

    /// Read one byte into A.
    fn input_byte(&mut self, regs: &mut Registers) -> bool;

    /// Write the byte in A.
    fn output_byte(&mut self, regs: &mut Registers) -> bool;

    fn input_byte_available(&mut self, _regs: &mut Registers) -> bool {
        false
    }

    fn close(&mut self, _regs: &mut Registers) -> bool {
        true
    }
}

/// EOF source and output sink.
pub struct NullDevice;

impl CharDevice for NullDevice {
    fn input_byte(&mut self, regs: &mut Registers) -> bool {
        regs.set_a8(EOF_BYTE);
        true
    }

    fn output_byte(&mut self, _regs: &mut Registers) -> bool {
        // discard
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_device_reads_eof_and_swallows_output() {
        let mut dev = NullDevice;
        let mut regs = Registers::new();
        assert!(dev.input_byte(&mut regs));
        assert_eq!(regs.a8(), EOF_BYTE);
        regs.set_a8(b'x');
        assert!(dev.output_byte(&mut regs));
        assert!(dev.open_for_input(&mut regs));
        assert!(dev.open_for_output(&mut regs));
        assert!(!dev.input_byte_available(&mut regs));
        assert!(dev.close(&mut regs));
    }
}
