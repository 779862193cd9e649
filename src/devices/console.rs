//! Console device: standard input/output with CR/LF translation.

use std::io::{Read, Write};

use super::CharDevice;
use crate::cpu::Registers;

/// Apex device 0/1: the terminal.
///
/// Apex programs speak CR line endings. Inbound LF becomes CR; outbound
/// CR becomes LF, and an outbound CR LF pair collapses to a single LF
/// (one byte of history).
pub struct ConsoleDevice {
    last_output: u8,
}

impl ConsoleDevice {
    pub fn new() -> Self {
        ConsoleDevice { last_output: 0 }
    }

    /// CR/LF translation for one outbound byte; `None` drops the byte.
    fn translate_output(&mut self, byte: u8) -> Option<u8> {
        let collapse = byte == b'\n' && self.last_output == b'\r';
        self.last_output = byte;
        if collapse {
            return None;
        }
        Some(if byte == b'\r' { b'\n' } else { byte })
    }
}

impl Default for ConsoleDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl CharDevice for ConsoleDevice {
    fn input_byte(&mut self, regs: &mut Registers) -> bool {
        let mut byte = [0u8; 1];
        match std::io::stdin().read(&mut byte) {
            Ok(1) => {
                let c = if byte[0] == b'\n' { b'\r' } else { byte[0] };
                regs.set_a8(c);
                true
            }
            _ => false,
        }
    }

    fn output_byte(&mut self, regs: &mut Registers) -> bool {
        let Some(c) = self.translate_output(regs.a8()) else {
            return true;
        };
        let mut stdout = std::io::stdout();
        stdout.write_all(&[c]).is_ok() && stdout.flush().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cr_becomes_lf() {
        let mut console = ConsoleDevice::new();
        assert_eq!(console.translate_output(b'\r'), Some(b'\n'));
        assert_eq!(console.translate_output(b'A'), Some(b'A'));
    }

    #[test]
    fn cr_lf_pair_collapses_to_one_lf() {
        let mut console = ConsoleDevice::new();
        assert_eq!(console.translate_output(b'\r'), Some(b'\n'));
        assert_eq!(console.translate_output(b'\n'), None);
        // a bare LF afterwards passes through
        assert_eq!(console.translate_output(b'\n'), Some(b'\n'));
    }
}
