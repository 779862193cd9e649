//! Printer device (Apex device 2): output only.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::{CharDevice, EOF_BYTE};
use crate::cpu::Registers;

/// Line-printer stand-in writing to a host file.
pub struct PrinterDevice {
    output_file: Option<File>,
    output_open: bool,
}

impl PrinterDevice {
    pub fn new() -> Self {
        PrinterDevice {
            output_file: None,
            output_open: false,
        }
    }

    /// Attach (and truncate) the host printer file.
    pub fn open_output_file(&mut self, path: &Path) -> Result<()> {
        self.output_file = Some(
            File::create(path)
                .with_context(|| format!("couldn't open printer file \"{}\"", path.display()))?,
        );
        Ok(())
    }
}

impl Default for PrinterDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl CharDevice for PrinterDevice {
    fn open_for_input(&mut self, _regs: &mut Registers) -> bool {
        false
    }

    fn open_for_output(&mut self, _regs: &mut Registers) -> bool {
        if self.output_file.is_none() {
            return false;
        }
        self.output_open = true;
        true
    }

    fn input_byte(&mut self, regs: &mut Registers) -> bool {
        regs.set_a8(EOF_BYTE);
        false
    }

    fn output_byte(&mut self, regs: &mut Registers) -> bool {
        if !self.output_open {
            return false;
        }
        let Some(file) = self.output_file.as_mut() else {
            return false;
        };
        let mut c = regs.a8();
        if c == b'\r' {
            c = b'\n';
        }
        file.write_all(&[c]).is_ok()
    }

    fn close(&mut self, _regs: &mut Registers) -> bool {
        self.output_open = false;
        true
    }
}
