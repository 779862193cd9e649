//! File-backed byte device (Apex device 3).

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::{Context, Result};

use super::{CharDevice, EOF_BYTE};
use crate::cpu::Registers;

/// Byte-at-a-time file I/O.
///
/// The host files are configured once at start (`-i`/`-o`); the emulated
/// program then opens, reads/writes and closes the device through the
/// Apex handler. Text mode translates LF to CR on input and CR to LF on
/// output; binary mode passes bytes through.
pub struct FileByteDevice {
    input_file: Option<File>,
    input_open: bool,
    input_binary: bool,
    input_at_eof: bool,
    output_file: Option<File>,
    output_open: bool,
    output_binary: bool,
}

impl FileByteDevice {
    pub fn new() -> Self {
        FileByteDevice {
            input_file: None,
            input_open: false,
            input_binary: false,
            input_at_eof: false,
            output_file: None,
            output_open: false,
            output_binary: false,
        }
    }

    /// Attach the host input file.
    pub fn open_input_file(&mut self, path: &Path, binary_mode: bool) -> Result<()> {
        self.input_binary = binary_mode;
        self.input_file = Some(
            File::open(path)
                .with_context(|| format!("couldn't open input file \"{}\"", path.display()))?,
        );
        Ok(())
    }

    /// Attach (and truncate) the host output file.
    pub fn open_output_file(&mut self, path: &Path, binary_mode: bool) -> Result<()> {
        self.output_binary = binary_mode;
        self.output_file = Some(
            File::create(path)
                .with_context(|| format!("couldn't open output file \"{}\"", path.display()))?,
        );
        Ok(())
    }
}

impl Default for FileByteDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl CharDevice for FileByteDevice {
    fn open_for_input(&mut self, _regs: &mut Registers) -> bool {
        let Some(file) = self.input_file.as_mut() else {
            return false;
        };
        if file.seek(SeekFrom::Start(0)).is_err() {
            return false;
        }
        self.input_open = true;
        self.input_at_eof = false;
        true
    }

    fn open_for_output(&mut self, _regs: &mut Registers) -> bool {
        if self.output_file.is_none() {
            return false;
        }
        self.output_open = true;
        true
    }

    fn input_byte(&mut self, regs: &mut Registers) -> bool {
        if !self.input_open {
            return false;
        }
        if self.input_at_eof {
            regs.set_a8(EOF_BYTE);
            return true;
        }
        let Some(file) = self.input_file.as_mut() else {
            return false;
        };
        let mut byte = [0u8; 1];
        match file.read(&mut byte) {
            Ok(0) => {
                self.input_at_eof = true;
                regs.set_a8(EOF_BYTE);
                true
            }
            Ok(_) => {
                let mut c = byte[0];
                if !self.input_binary && c == b'\n' {
                    c = b'\r';
                }
                regs.set_a8(c);
                true
            }
            Err(_) => false,
        }
    }

    fn output_byte(&mut self, regs: &mut Registers) -> bool {
        if !self.output_open {
            return false;
        }
        let Some(file) = self.output_file.as_mut() else {
            return false;
        };
        let mut c = regs.a8();
        if !self.output_binary && c == b'\r' {
            c = b'\n';
        }
        file.write_all(&[c]).is_ok()
    }

    fn close(&mut self, _regs: &mut Registers) -> bool {
        self.input_open = false;
        self.output_open = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn input_translates_and_reports_eof() {
        let mut host = NamedTempFile::new().unwrap();
        host.write_all(b"A\n").unwrap();

        let mut dev = FileByteDevice::new();
        dev.open_input_file(host.path(), false).unwrap();
        let mut regs = Registers::new();

        assert!(dev.open_for_input(&mut regs));
        assert!(dev.input_byte(&mut regs));
        assert_eq!(regs.a8(), b'A');
        assert!(dev.input_byte(&mut regs));
        assert_eq!(regs.a8(), b'\r'); // LF -> CR in text mode
        assert!(dev.input_byte(&mut regs));
        assert_eq!(regs.a8(), EOF_BYTE); // EOF reports success with SUB
        assert!(dev.input_byte(&mut regs));
        assert_eq!(regs.a8(), EOF_BYTE); // and keeps doing so
    }

    #[test]
    fn reopen_rewinds_to_the_start() {
        let mut host = NamedTempFile::new().unwrap();
        host.write_all(b"xy").unwrap();

        let mut dev = FileByteDevice::new();
        dev.open_input_file(host.path(), true).unwrap();
        let mut regs = Registers::new();

        assert!(dev.open_for_input(&mut regs));
        assert!(dev.input_byte(&mut regs));
        assert_eq!(regs.a8(), b'x');
        assert!(dev.open_for_input(&mut regs));
        assert!(dev.input_byte(&mut regs));
        assert_eq!(regs.a8(), b'x');
    }

    #[test]
    fn io_without_configured_files_fails() {
        let mut dev = FileByteDevice::new();
        let mut regs = Registers::new();
        assert!(!dev.open_for_input(&mut regs));
        assert!(!dev.open_for_output(&mut regs));
        assert!(!dev.input_byte(&mut regs));
        assert!(!dev.output_byte(&mut regs));
    }

    #[test]
    fn output_translates_cr_and_close_blocks_io() {
        let host = NamedTempFile::new().unwrap();
        let mut dev = FileByteDevice::new();
        dev.open_output_file(host.path(), false).unwrap();
        let mut regs = Registers::new();

        assert!(dev.open_for_output(&mut regs));
        regs.set_a8(b'H');
        assert!(dev.output_byte(&mut regs));
        regs.set_a8(b'\r');
        assert!(dev.output_byte(&mut regs));
        assert!(dev.close(&mut regs));
        regs.set_a8(b'x');
        assert!(!dev.output_byte(&mut regs));

        let written = std::fs::read(host.path()).unwrap();
        assert_eq!(written, b"H\n");
    }
}
