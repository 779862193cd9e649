//! The Apex system-call surface.
//!
//! Apex reserves the "system page" at 0xBF00..0xBFFF for entry vectors
//! and kernel state. Instead of emulating resident kernel code, the run
//! loop traps a PC inside the entry-vector band and dispatches to a host
//! handler here; afterwards it synthesizes the `RTS` the real kernel
//! would have executed.

use std::fmt;

use log::{error, info};

use crate::cpu::{Registers, StatusFlags};
use crate::devices::CharDevice;
use crate::memory::Memory;

/// Apex works in 256-byte pages.
pub const PAGE_SIZE: usize = 0x100;

/// Base address of the system page.
pub const SYS_PAGE: u16 = 0xbf00;

/// The first 0x50 bytes of the system page belong to the program image.
pub const SYS_PAGE_PROGRAM_AREA_SIZE: usize = 0x50;

/// Offsets into the system page.
pub mod syspage {
    // offsets 0x00 through 0x4f belong to the program

    /// 3 (JMP)  program restart vector
    pub const VRSTRT: u16 = 0x00;
    /// 3 (JMP)  program start vector
    pub const VSTART: u16 = 0x03;
    /// 3 (JMP)  program normal exit address, usually KRENTR
    pub const VEXIT: u16 = 0x06;
    /// 3 (JMP)  program error exit address, usually KRELOD
    pub const VERROR: u16 = 0x09;
    /// 3 (JMP)  user abort exit address, usually KSAVER
    pub const VABORT: u16 = 0x0c;
    /// 2        base addr of user program
    pub const USRMEM: u16 = 0x15;
    /// 1        user program size in 256-byte pages
    pub const PROSIZ: u16 = 0x17;
    /// 1        rerun flag
    pub const RERUNF: u16 = 0x20;
    /// 1        last page+1 for user program (max $b0)
    pub const USRTOP: u16 = 0x29;

    // offsets 0x50 through 0xff belong to Apex

    /// 2        input line pointer ($ff = null)
    pub const LINIDX: u16 = 0x5a;
    /// 1        current byte I/O device
    pub const NOWDEV: u16 = 0x5c;
    /// 1        error device number
    pub const ERRDEV: u16 = 0x5f;
    /// 1        "real" input line pointer of the console handler
    pub const LINPTR: u16 = 0x61;
    /// 16       8 pointers to I/O device handlers
    pub const DRVTAB: u16 = 0xc0;

    // entry vectors to resident code, 3 bytes (JMP) each

    /// boot in Apex (warm start)
    pub const KRENTR: u16 = 0xd0;
    /// preserve current user image
    pub const KSAVER: u16 = 0xd3;
    /// reload Apex (cold start)
    pub const KRELOD: u16 = 0xd6;
    /// byte I/O routine
    pub const KHAND: u16 = 0xd9;
    /// file lookup routine
    pub const KSCAN: u16 = 0xdc;
    /// reset disk driver
    pub const KRESTD: u16 = 0xdf;
    /// read contiguous disk blocks
    pub const KREAD: u16 = 0xe2;
    /// write contiguous disk blocks
    pub const KWRITE: u16 = 0xe5;
}

/// First address of the entry-vector band.
pub const VECTOR_START: u16 = SYS_PAGE + syspage::KRENTR;
/// One past the last address of the entry-vector band.
pub const VECTOR_END: u16 = SYS_PAGE + syspage::KWRITE + 3;

/// Number of character-device slots.
pub const MAX_CHAR_DEVICES: usize = 8;

/// Which vector a program exited through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitVector {
    Krentr,
    Ksaver,
    Krelod,
}

impl fmt::Display for ExitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExitVector::Krentr => "KRENTR",
            ExitVector::Ksaver => "KSAVER",
            ExitVector::Krelod => "KRELOD",
        };
        write!(f, "{}", name)
    }
}

/// Result of dispatching one entry-vector call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorOutcome {
    /// Handled; resume the program with a synthesized RTS.
    Continue,
    /// Program exited normally through the named vector.
    Exit(ExitVector),
    /// Unsupported call; stop execution.
    Halt,
}

/// Host-side Apex kernel surface: entry-vector dispatch plus the
/// character-device table.
pub struct Apex {
    devices: [Option<Box<dyn CharDevice>>; MAX_CHAR_DEVICES],
}

impl Apex {
    pub fn new() -> Self {
        Apex {
            devices: std::array::from_fn(|_| None),
        }
    }

    /// Install a character device in one of the eight slots.
    pub fn install_device(&mut self, number: usize, device: Box<dyn CharDevice>) {
        assert!(number < MAX_CHAR_DEVICES, "invalid device number {}", number);
        self.devices[number] = Some(device);
    }

    /// Seed the system-page state a freshly loaded program expects.
    pub fn init(&self, mem: &mut Memory) {
        mem.write_8(u32::from(SYS_PAGE + syspage::LINIDX), 0xff);
        // the I2L runtime uses the console handler's LINPTR but calls it
        // LINIDX, so null that one too
        mem.write_8(u32::from(SYS_PAGE + syspage::LINPTR), 0xff);
    }

    /// Is `pc` inside the entry-vector band?
    pub fn in_vector_band(pc: u16) -> bool {
        (VECTOR_START..VECTOR_END).contains(&pc)
    }

    /// Emulate the Apex entry vector the PC sits on.
    pub fn vector_exec(&mut self, regs: &mut Registers, mem: &Memory) -> VectorOutcome {
        match regs.pc.wrapping_sub(SYS_PAGE) {
            syspage::KRENTR => self.exit(ExitVector::Krentr),
            syspage::KSAVER => self.exit(ExitVector::Ksaver),
            syspage::KRELOD => self.exit(ExitVector::Krelod),
            syspage::KHAND => self.khand(regs, mem),
            syspage::KSCAN => {
                // takes a pointer to an 11-character blank-padded file
                // name in (A, Y); fills in block info on success
                error!("KSCAN not implemented");
                VectorOutcome::Halt
            }
            syspage::KRESTD => {
                info!("KRESTD called, does nothing");
                regs.p.remove(StatusFlags::CARRY);
                VectorOutcome::Continue
            }
            syspage::KREAD => {
                error!("KREAD not implemented");
                VectorOutcome::Halt
            }
            syspage::KWRITE => {
                error!("KWRITE not implemented");
                VectorOutcome::Halt
            }
            _ => {
                error!("unrecognized Apex entry vector {:04x}", regs.pc);
                VectorOutcome::Halt
            }
        }
    }

    fn exit(&self, vector: ExitVector) -> VectorOutcome {
        info!("program exited via {}", vector);
        VectorOutcome::Exit(vector)
    }

    /// KHAND: byte I/O on the device selected by NOWDEV. The function
    /// code (device-handler entry offset) arrives in X; arguments, if
    /// any, in A and Y. Carry reports failure back to the caller.
    fn khand(&mut self, regs: &mut Registers, mem: &Memory) -> VectorOutcome {
        let function = regs.x;
        let nowdev = mem.read_8(u32::from(SYS_PAGE + syspage::NOWDEV));

        if let Some(Some(device)) = self.devices.get_mut(nowdev as usize) {
            let success = match function {
                0x00 => Some(device.open_for_input(regs)),
                0x03 => Some(device.open_for_output(regs)),
                0x06 => Some(device.input_byte(regs)),
                0x09 => Some(device.output_byte(regs)),
                0x0c => Some(device.close(regs)),
                0x0f if nowdev <= 1 => Some(device.input_byte_available(regs)),
                _ => None,
            };
            if let Some(success) = success {
                regs.p.set(StatusFlags::CARRY, !success);
                return VectorOutcome::Continue;
            }
        }
        error!(
            "bad KHAND call, NOWDEV {:02x}, A {:02x}, X {:02x}, Y {:02x}",
            nowdev,
            regs.a8(),
            regs.x,
            regs.y
        );
        VectorOutcome::Halt
    }
}

impl Default for Apex {
    fn default() -> Self {
        Self::new()
    }
}
