//! Apex entry-vector dispatch driven the way the run loop drives it.

use std::io::Write;

use tempfile::NamedTempFile;

use apex65::apex::{self, Apex, ExitVector, VectorOutcome};
use apex65::cpu::{Cpu, Registers, StatusFlags};
use apex65::devices::{CharDevice, FileByteDevice};
use apex65::isa::VariantSet;
use apex65::memory::Memory;

/// Test double capturing every byte the program outputs.
struct RecordingDevice {
    output: std::rc::Rc<std::cell::RefCell<Vec<u8>>>,
}

impl CharDevice for RecordingDevice {
    fn input_byte(&mut self, regs: &mut Registers) -> bool {
        regs.set_a8(apex65::devices::EOF_BYTE);
        true
    }

    fn output_byte(&mut self, regs: &mut Registers) -> bool {
        self.output.borrow_mut().push(regs.a8());
        true
    }
}

const KHAND: u16 = apex::SYS_PAGE + apex::syspage::KHAND;

#[test]
fn khand_output_byte_reaches_the_console_device() {
    let output = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let mut apex = Apex::new();
    apex.install_device(
        0,
        Box::new(RecordingDevice {
            output: output.clone(),
        }),
    );

    let mut cpu = Cpu::new(VariantSet::MOS6502);
    let mut mem = Memory::new();
    mem.write_8(u32::from(apex::SYS_PAGE + apex::syspage::NOWDEV), 0x00);

    // the program reaches the vector through a JSR
    let jsr_program = [0x20, (KHAND & 0xff) as u8, (KHAND >> 8) as u8];
    mem.load_slice(0x2000, &jsr_program);
    cpu.regs.pc = 0x2000;
    assert!(!cpu.execute_instruction(&mut mem));
    assert_eq!(cpu.regs.pc, KHAND);

    cpu.regs.set_a8(b'H');
    cpu.regs.x = 0x09;
    cpu.regs.p.insert(StatusFlags::CARRY);
    assert_eq!(
        apex.vector_exec(&mut cpu.regs, &mem),
        VectorOutcome::Continue
    );
    cpu.execute_rts(&mut mem);

    assert_eq!(output.borrow().as_slice(), b"H");
    assert!(!cpu.regs.p.contains(StatusFlags::CARRY));
    assert_eq!(cpu.regs.pc, 0x2003); // back after the JSR
}

/// Drive the same loop `main` runs: a program that opens device 3 for
/// output, writes a byte, closes it, and exits through VEXIT.
#[test]
fn program_writes_through_the_file_device_and_exits() {
    let host_out = NamedTempFile::new().unwrap();

    let mut apex = Apex::new();
    let mut file_device = FileByteDevice::new();
    file_device
        .open_output_file(host_out.path(), false)
        .unwrap();
    apex.install_device(3, Box::new(file_device));

    let mut cpu = Cpu::new(VariantSet::MOS6502);
    let mut mem = Memory::new();
    apex.init(&mut mem);
    mem.write_8(u32::from(apex::SYS_PAGE + apex::syspage::NOWDEV), 0x03);

    let khand_lo = (KHAND & 0xff) as u8;
    let khand_hi = (KHAND >> 8) as u8;
    #[rustfmt::skip]
    let program = [
        0xa2, 0x03,                   // ldx #$03        open for output
        0x20, khand_lo, khand_hi,     // jsr KHAND
        0xa9, b'H',                   // lda #'H'
        0xa2, 0x09,                   // ldx #$09        output byte
        0x20, khand_lo, khand_hi,     // jsr KHAND
        0xa2, 0x0c,                   // ldx #$0c        close
        0x20, khand_lo, khand_hi,     // jsr KHAND
        0x4c, 0x06, 0xbf,             // jmp VEXIT
    ];
    mem.load_slice(0x2000, &program);
    // VEXIT holds the usual JMP KRENTR
    mem.load_slice(
        u32::from(apex::SYS_PAGE + apex::syspage::VEXIT),
        &[0x4c, 0xd0, 0xbf],
    );
    cpu.regs.pc = 0x2000;

    let exit = loop {
        if Apex::in_vector_band(cpu.regs.pc) {
            match apex.vector_exec(&mut cpu.regs, &mem) {
                VectorOutcome::Continue => cpu.execute_rts(&mut mem),
                VectorOutcome::Exit(v) => break v,
                VectorOutcome::Halt => panic!("unexpected halt"),
            }
        } else {
            assert!(!cpu.execute_instruction(&mut mem), "unexpected CPU halt");
        }
    };

    assert_eq!(exit, ExitVector::Krentr);
    assert_eq!(std::fs::read(host_out.path()).unwrap(), b"H");
}

/// A program reading device 3 sees its input file, then EOF as Ctrl-Z.
#[test]
fn program_reads_through_the_file_device() {
    let mut host_in = NamedTempFile::new().unwrap();
    host_in.write_all(b"ab").unwrap();

    let mut apex = Apex::new();
    let mut file_device = FileByteDevice::new();
    file_device.open_input_file(host_in.path(), true).unwrap();
    apex.install_device(3, Box::new(file_device));

    let mut cpu = Cpu::new(VariantSet::MOS6502);
    let mut mem = Memory::new();
    mem.write_8(u32::from(apex::SYS_PAGE + apex::syspage::NOWDEV), 0x03);

    let mut call = |cpu: &mut Cpu, mem: &mut Memory, function: u8| {
        cpu.regs.x = function;
        cpu.regs.pc = KHAND;
        // fake the return address JSR would have pushed
        mem.write_8(0x01ff, 0x20);
        mem.write_8(0x01fe, 0x00);
        cpu.regs.s = 0xfd;
        assert_eq!(apex.vector_exec(&mut cpu.regs, mem), VectorOutcome::Continue);
        cpu.execute_rts(mem);
        assert!(!cpu.regs.p.contains(StatusFlags::CARRY));
    };

    call(&mut cpu, &mut mem, 0x00); // open for input
    call(&mut cpu, &mut mem, 0x06);
    assert_eq!(cpu.regs.a8(), b'a');
    call(&mut cpu, &mut mem, 0x06);
    assert_eq!(cpu.regs.a8(), b'b');
    call(&mut cpu, &mut mem, 0x06);
    assert_eq!(cpu.regs.a8(), apex65::devices::EOF_BYTE);
}

#[test]
fn device_failure_sets_carry_without_halting() {
    let mut apex = Apex::new();
    apex.install_device(3, Box::new(FileByteDevice::new()));
    let mut mem = Memory::new();
    mem.write_8(u32::from(apex::SYS_PAGE + apex::syspage::NOWDEV), 0x03);

    // no host file configured: open-for-input fails, carry comes back set
    let mut regs = Registers::new();
    regs.pc = KHAND;
    regs.x = 0x00;
    assert_eq!(apex.vector_exec(&mut regs, &mem), VectorOutcome::Continue);
    assert!(regs.p.contains(StatusFlags::CARRY));
}
