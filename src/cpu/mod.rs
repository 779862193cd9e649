//! 6502 execution engine.
//!
//! Instruction-level emulation: each [`Cpu::execute_instruction`] call
//! fetches, decodes and retires exactly one instruction, accounting cycles
//! from the catalog data (base + addressing mode + dynamic penalties).
//! NMOS/CMOS behavioral differences (the `JMP (abs)` page-wrap bug, BCD
//! flag timing, decimal clearing on interrupt) are configuration derived
//! from the active variant set, not separate code paths.

use log::{error, trace};

use crate::isa::{Inst, InstructionSet, Mode, Opcode, VariantSet};
use crate::memory::Memory;

mod registers;

pub use registers::{Registers, StatusFlags};

/// The hardware stack lives in page one.
pub const STACK_BASE: u16 = 0x0100;

/// NMI vector address.
pub const VECTOR_NMI: u16 = 0xfffa;
/// Reset vector address.
pub const VECTOR_RESET: u16 = 0xfffc;
/// IRQ/BRK vector address.
pub const VECTOR_IRQ: u16 = 0xfffe;

fn bcd_digit_sign_extend(digit: u8) -> i8 {
    (digit | if digit & 0x08 != 0 { 0xf0 } else { 0x00 }) as i8
}

/// The CPU: register file plus the execution state derived from the
/// selected instruction-set variants.
pub struct Cpu {
    pub regs: Registers,
    isa: InstructionSet,
    cmos: bool,
    absolute_ind_fixed: bool,
    interrupt_clears_decimal: bool,
    bcd_cmos: bool,
    halt: bool,
    instruction_count: u64,
    cycle_count: u64,
    /// Cycles of the instruction currently retiring.
    instruction_cycles: u8,
    trace: bool,
}

impl Cpu {
    pub fn new(variants: VariantSet) -> Self {
        let cmos = variants.contains(VariantSet::CMOS);
        Cpu {
            regs: Registers::new(),
            isa: InstructionSet::new(variants),
            cmos,
            absolute_ind_fixed: cmos,
            interrupt_clears_decimal: cmos,
            bcd_cmos: cmos,
            halt: false,
            instruction_count: 0,
            cycle_count: 0,
            instruction_cycles: 0,
            trace: false,
        }
    }

    pub fn instruction_set(&self) -> &InstructionSet {
        &self.isa
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn reset_counters(&mut self) {
        self.instruction_count = 0;
        self.cycle_count = 0;
    }

    pub fn set_trace(&mut self, value: bool) {
        self.trace = value;
    }

    /// Fetch, decode and execute one instruction.
    ///
    /// Returns `true` when execution must stop: undefined opcode, a
    /// branch or jump to its own address (deterministic tight loop), or
    /// an interrupt vector pointing at 0x0000.
    pub fn execute_instruction(&mut self, mem: &mut Memory) -> bool {
        let opcode = mem.read_8(self.regs.pc.into());
        let Some(info) = self.isa.lookup(opcode) else {
            error!(
                "undefined opcode {:02x} at {:04x}",
                opcode, self.regs.pc
            );
            return true;
        };
        let info = *info;
        self.instruction_cycles = info.base_cycles
            + info.mode.added_cycles()
            + u8::from(self.cmos && info.cmos_extra_cycle);
        if self.trace {
            let pc = u32::from(self.regs.pc);
            let bytes = [
                mem.read_8(pc),
                mem.read_8(pc + 1),
                mem.read_8(pc + 2),
            ];
            trace!(
                "*** {:04x} {}",
                self.regs.pc,
                self.isa.disassemble(self.regs.pc, bytes)
            );
        }
        self.regs.pc = self.regs.pc.wrapping_add(1);
        let (ea1, ea2) = self.effective_address(mem, &info);
        self.execute(&info, ea1, ea2, mem);
        self.instruction_count += 1;
        self.cycle_count += u64::from(self.instruction_cycles);
        self.trace_registers();
        self.halt
    }

    /// Synthesize an `RTS`, used when control returns from an Apex
    /// vector handled on the host side.
    pub fn execute_rts(&mut self, mem: &mut Memory) {
        self.rts(mem);
        self.trace_registers();
    }

    /// The interrupt/BRK sequence: push PC and P (bit 5 forced, bit 4 per
    /// `brk`), set I (CMOS also clears D), then load PC from the two-byte
    /// vector at `vector`. A vector pointing at 0x0000 halts.
    pub fn go_vector(&mut self, mem: &mut Memory, vector: u16, brk: bool) {
        self.stack_push(mem, (self.regs.pc >> 8) as u8);
        self.stack_push(mem, self.regs.pc as u8);
        let mut p = self.regs.p | StatusFlags::UNUSED;
        p.set(StatusFlags::BREAK, brk);
        self.stack_push(mem, p.bits());
        self.regs.p.insert(StatusFlags::INTERRUPT_DISABLE);
        if self.interrupt_clears_decimal {
            self.regs.p.remove(StatusFlags::DECIMAL);
        }
        self.regs.pc = mem.read_16_le(vector.into());
        if self.regs.pc == 0x0000 {
            error!("vector {:04x} points at 0000", vector);
            self.halt = true;
        }
    }

    fn trace_registers(&self) {
        if self.trace {
            trace!("--- cycle {}, {}", self.cycle_count, self.regs);
        }
    }

    /// Resolve the operand location (`ea1`) and, for branches, the branch
    /// target (`ea2`). Reads happen in the order the addressing mode
    /// dictates; conditional page-crossing penalties are added here.
    fn effective_address(&mut self, mem: &Memory, info: &Opcode) -> (u32, u32) {
        let mut ea1 = 0u32;
        let mut ea2 = 0u32;
        match info.mode {
            Mode::Implied | Mode::Accumulator => {}
            Mode::Immediate => {
                ea1 = self.regs.pc.into();
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            Mode::ZeroPage => {
                ea1 = mem.read_8(self.regs.pc.into()).into();
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            Mode::ZeroPageX => {
                let zp = mem.read_8(self.regs.pc.into());
                self.regs.pc = self.regs.pc.wrapping_add(1);
                ea1 = zp.wrapping_add(self.regs.x).into();
            }
            Mode::ZeroPageY => {
                let zp = mem.read_8(self.regs.pc.into());
                self.regs.pc = self.regs.pc.wrapping_add(1);
                ea1 = zp.wrapping_add(self.regs.y).into();
            }
            Mode::ZpInd => {
                let zp = mem.read_8(self.regs.pc.into());
                self.regs.pc = self.regs.pc.wrapping_add(1);
                ea1 = u32::from(mem.read_8(zp.into()))
                    | (u32::from(mem.read_8(zp.wrapping_add(1).into())) << 8);
            }
            Mode::ZpXInd => {
                let zp = mem.read_8(self.regs.pc.into()).wrapping_add(self.regs.x);
                self.regs.pc = self.regs.pc.wrapping_add(1);
                ea1 = u32::from(mem.read_8(zp.into()))
                    | (u32::from(mem.read_8(zp.wrapping_add(1).into())) << 8);
            }
            Mode::ZpIndY => {
                let zp = mem.read_8(self.regs.pc.into());
                self.regs.pc = self.regs.pc.wrapping_add(1);
                let base = u32::from(mem.read_8(zp.into()))
                    | (u32::from(mem.read_8(zp.wrapping_add(1).into())) << 8);
                ea1 = base + u32::from(self.regs.y);
                if info.page_cross_cycle && (ea1 & 0xff00) != (base & 0xff00) {
                    self.instruction_cycles += 1;
                }
            }
            Mode::Absolute => {
                ea1 = mem.read_16_le(self.regs.pc.into()).into();
                self.regs.pc = self.regs.pc.wrapping_add(2);
            }
            Mode::AbsoluteX => {
                let base = u32::from(mem.read_16_le(self.regs.pc.into()));
                self.regs.pc = self.regs.pc.wrapping_add(2);
                ea1 = base + u32::from(self.regs.x);
                if (!self.cmos && info.rmw_extra_cycle)
                    || (info.page_cross_cycle && (ea1 & 0xff00) != (base & 0xff00))
                {
                    self.instruction_cycles += 1;
                }
            }
            Mode::AbsoluteY => {
                let base = u32::from(mem.read_16_le(self.regs.pc.into()));
                self.regs.pc = self.regs.pc.wrapping_add(2);
                ea1 = base + u32::from(self.regs.y);
                if info.page_cross_cycle && (ea1 & 0xff00) != (base & 0xff00) {
                    self.instruction_cycles += 1;
                }
            }
            Mode::AbsoluteInd => {
                let pointer = mem.read_16_le(self.regs.pc.into());
                self.regs.pc = self.regs.pc.wrapping_add(2);
                ea1 = mem.read_8(pointer.into()).into();
                let high = if self.absolute_ind_fixed {
                    // CMOS increments the whole pointer
                    pointer.wrapping_add(1)
                } else {
                    // NMOS only increments the low byte
                    (pointer & 0xff00) | (pointer.wrapping_add(1) & 0x00ff)
                };
                ea1 |= u32::from(mem.read_8(high.into())) << 8;
            }
            Mode::AbsXInd => {
                let pointer = mem
                    .read_16_le(self.regs.pc.into())
                    .wrapping_add(self.regs.x.into());
                self.regs.pc = self.regs.pc.wrapping_add(2);
                ea1 = mem.read_16_le(pointer.into()).into();
            }
            Mode::ZpRelative => {
                ea1 = mem.read_8(self.regs.pc.into()).into();
                self.regs.pc = self.regs.pc.wrapping_add(1);
                ea2 = self.relative_target(mem);
            }
            Mode::Relative => {
                ea2 = self.relative_target(mem);
            }
            Mode::Relative16 => {
                let displacement = mem.read_16_le(self.regs.pc.into());
                self.regs.pc = self.regs.pc.wrapping_add(1);
                ea2 = u32::from(displacement.wrapping_add(self.regs.pc));
            }
            Mode::StVecIndY => {
                let offset = mem.read_8(self.regs.pc.into());
                self.regs.pc = self.regs.pc.wrapping_add(1);
                let pointer = u32::from(STACK_BASE | u16::from(self.regs.s)) + u32::from(offset);
                ea1 = mem.read_16_le(pointer).into();
            }
        }
        (ea1, ea2)
    }

    fn relative_target(&mut self, mem: &Memory) -> u32 {
        let offset = mem.read_8(self.regs.pc.into()) as i8;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        u32::from(self.regs.pc.wrapping_add(offset as u16))
    }

    fn stack_push(&mut self, mem: &mut Memory, byte: u8) {
        let addr = STACK_BASE | u16::from(self.regs.s);
        self.regs.s = self.regs.s.wrapping_sub(1);
        mem.write_8(addr.into(), byte);
    }

    fn stack_pop(&mut self, mem: &Memory) -> u8 {
        self.regs.s = self.regs.s.wrapping_add(1);
        mem.read_8((STACK_BASE | u16::from(self.regs.s)).into())
    }

    fn tight_loop_halt(&mut self, address: u16) {
        error!("halted at instruction at {:04x}", address);
        error!("registers: {}", self.regs);
        self.halt = true;
    }

    /// Taken branch: one extra cycle, one more if the target is on a
    /// different page. A branch to its own instruction halts.
    fn branch(&mut self, target: u32) {
        let target = target as u16;
        self.instruction_cycles += 1;
        if (self.regs.pc & 0xff00) != (target & 0xff00) {
            self.instruction_cycles += 1;
        }
        if target == self.regs.pc.wrapping_sub(2) {
            self.tight_loop_halt(target);
        }
        self.regs.pc = target;
    }

    fn execute(&mut self, info: &Opcode, ea1: u32, ea2: u32, mem: &mut Memory) {
        match info.inst {
            Inst::Adc => self.adc(mem, ea1),
            Inst::And => {
                let value = self.regs.a8() & mem.read_8(ea1);
                self.regs.set_a8(value);
                self.regs.set_nz(value);
            }
            Inst::Asl => {
                let byte = self.read_rmw(mem, info, ea1);
                self.regs.p.set(StatusFlags::CARRY, byte & 0x80 != 0);
                let result = byte << 1;
                self.regs.set_nz(result);
                self.write_rmw(mem, info, ea1, result);
            }
            Inst::Bbr => {
                let operand = mem.read_8(ea1);
                if operand & (1 << info.bit_number()) == 0 {
                    self.branch(ea2);
                }
            }
            Inst::Bbs => {
                let operand = mem.read_8(ea1);
                if operand & (1 << info.bit_number()) != 0 {
                    self.branch(ea2);
                }
            }
            Inst::Bcc => {
                if !self.regs.p.contains(StatusFlags::CARRY) {
                    self.branch(ea2);
                }
            }
            Inst::Bcs => {
                if self.regs.p.contains(StatusFlags::CARRY) {
                    self.branch(ea2);
                }
            }
            Inst::Beq => {
                if self.regs.p.contains(StatusFlags::ZERO) {
                    self.branch(ea2);
                }
            }
            Inst::Bit => {
                let operand = mem.read_8(ea1);
                self.regs
                    .p
                    .set(StatusFlags::ZERO, operand & self.regs.a8() == 0);
                if info.mode != Mode::Immediate {
                    self.regs.p.set(StatusFlags::NEGATIVE, operand & 0x80 != 0);
                    self.regs.p.set(StatusFlags::OVERFLOW, operand & 0x40 != 0);
                }
            }
            Inst::Bmi => {
                if self.regs.p.contains(StatusFlags::NEGATIVE) {
                    self.branch(ea2);
                }
            }
            Inst::Bne => {
                if !self.regs.p.contains(StatusFlags::ZERO) {
                    self.branch(ea2);
                }
            }
            Inst::Bpl => {
                if !self.regs.p.contains(StatusFlags::NEGATIVE) {
                    self.branch(ea2);
                }
            }
            Inst::Bra => self.branch(ea2),
            Inst::Brk => {
                // BRK is a two-byte instruction
                self.regs.pc = self.regs.pc.wrapping_add(1);
                self.go_vector(mem, VECTOR_IRQ, true);
            }
            Inst::Bvc => {
                if !self.regs.p.contains(StatusFlags::OVERFLOW) {
                    self.branch(ea2);
                }
            }
            Inst::Bvs => {
                if self.regs.p.contains(StatusFlags::OVERFLOW) {
                    self.branch(ea2);
                }
            }
            Inst::Clc => self.regs.p.remove(StatusFlags::CARRY),
            Inst::Cld => self.regs.p.remove(StatusFlags::DECIMAL),
            Inst::Cli => self.regs.p.remove(StatusFlags::INTERRUPT_DISABLE),
            Inst::Clv => self.regs.p.remove(StatusFlags::OVERFLOW),
            Inst::Cmp => self.compare(mem, ea1, self.regs.a8()),
            Inst::Cpx => self.compare(mem, ea1, self.regs.x),
            Inst::Cpy => self.compare(mem, ea1, self.regs.y),
            Inst::Dec => {
                let result = self.read_rmw(mem, info, ea1).wrapping_sub(1);
                self.regs.set_nz(result);
                self.write_rmw(mem, info, ea1, result);
            }
            Inst::Dex => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                self.regs.set_nz(self.regs.x);
            }
            Inst::Dey => {
                self.regs.y = self.regs.y.wrapping_sub(1);
                self.regs.set_nz(self.regs.y);
            }
            Inst::Eor => {
                let value = self.regs.a8() ^ mem.read_8(ea1);
                self.regs.set_a8(value);
                self.regs.set_nz(value);
            }
            Inst::Inc => {
                let result = self.read_rmw(mem, info, ea1).wrapping_add(1);
                self.regs.set_nz(result);
                self.write_rmw(mem, info, ea1, result);
            }
            Inst::Inx => {
                self.regs.x = self.regs.x.wrapping_add(1);
                self.regs.set_nz(self.regs.x);
            }
            Inst::Iny => {
                self.regs.y = self.regs.y.wrapping_add(1);
                self.regs.set_nz(self.regs.y);
            }
            Inst::Jmp => {
                if ea1 as u16 == self.regs.pc.wrapping_sub(3) {
                    self.tight_loop_halt(ea1 as u16);
                }
                self.regs.pc = ea1 as u16;
            }
            Inst::Jsr => {
                let ret_addr = self.regs.pc.wrapping_sub(1);
                self.stack_push(mem, (ret_addr >> 8) as u8);
                self.stack_push(mem, ret_addr as u8);
                self.regs.pc = ea1 as u16;
            }
            Inst::Lda => {
                let value = mem.read_8(ea1);
                self.regs.set_a8(value);
                self.regs.set_nz(value);
            }
            Inst::Ldx => {
                self.regs.x = mem.read_8(ea1);
                self.regs.set_nz(self.regs.x);
            }
            Inst::Ldy => {
                self.regs.y = mem.read_8(ea1);
                self.regs.set_nz(self.regs.y);
            }
            Inst::Lsr => {
                let byte = self.read_rmw(mem, info, ea1);
                self.regs.p.set(StatusFlags::CARRY, byte & 0x01 != 0);
                let result = byte >> 1;
                self.regs.set_nz(result);
                self.write_rmw(mem, info, ea1, result);
            }
            Inst::Nop => {}
            Inst::Ora => {
                let value = self.regs.a8() | mem.read_8(ea1);
                self.regs.set_a8(value);
                self.regs.set_nz(value);
            }
            Inst::Pha => self.stack_push(mem, self.regs.a8()),
            Inst::Php => {
                // break and reserved bits read back as set
                self.stack_push(mem, self.regs.p.bits() | 0x30);
            }
            Inst::Phx => self.stack_push(mem, self.regs.x),
            Inst::Phy => self.stack_push(mem, self.regs.y),
            Inst::Pla => {
                let value = self.stack_pop(mem);
                self.regs.set_a8(value);
                self.regs.set_nz(value);
            }
            Inst::Plp => {
                let value = self.stack_pop(mem);
                self.regs.p = StatusFlags::from_bits_retain(value)
                    | StatusFlags::BREAK
                    | StatusFlags::UNUSED;
            }
            Inst::Plx => {
                self.regs.x = self.stack_pop(mem);
                self.regs.set_nz(self.regs.x);
            }
            Inst::Ply => {
                self.regs.y = self.stack_pop(mem);
                self.regs.set_nz(self.regs.y);
            }
            Inst::Rmb => {
                let operand = mem.read_8(ea1) & !(1 << info.bit_number());
                mem.write_8(ea1, operand);
            }
            Inst::Rol => {
                let byte = self.read_rmw(mem, info, ea1);
                let new_carry = byte & 0x80 != 0;
                let result = (byte << 1) | self.regs.carry_in();
                self.regs.p.set(StatusFlags::CARRY, new_carry);
                self.regs.set_nz(result);
                self.write_rmw(mem, info, ea1, result);
            }
            Inst::Ror => {
                let byte = self.read_rmw(mem, info, ea1);
                let new_carry = byte & 0x01 != 0;
                let result = (byte >> 1) | (self.regs.carry_in() << 7);
                self.regs.p.set(StatusFlags::CARRY, new_carry);
                self.regs.set_nz(result);
                self.write_rmw(mem, info, ea1, result);
            }
            Inst::Rti => {
                let value = self.stack_pop(mem);
                self.regs.p = StatusFlags::from_bits_retain(value)
                    | StatusFlags::BREAK
                    | StatusFlags::UNUSED;
                let lo = u16::from(self.stack_pop(mem));
                let hi = u16::from(self.stack_pop(mem));
                self.regs.pc = lo | (hi << 8);
            }
            Inst::Rts => self.rts(mem),
            Inst::Sbc => self.sbc(mem, ea1),
            Inst::Sec => self.regs.p.insert(StatusFlags::CARRY),
            Inst::Sed => self.regs.p.insert(StatusFlags::DECIMAL),
            Inst::Sei => self.regs.p.insert(StatusFlags::INTERRUPT_DISABLE),
            Inst::Smb => {
                let operand = mem.read_8(ea1) | (1 << info.bit_number());
                mem.write_8(ea1, operand);
            }
            Inst::Sta => mem.write_8(ea1, self.regs.a8()),
            Inst::Stx => mem.write_8(ea1, self.regs.x),
            Inst::Sty => mem.write_8(ea1, self.regs.y),
            Inst::Stz => mem.write_8(ea1, 0x00),
            Inst::Tax => {
                self.regs.x = self.regs.a8();
                self.regs.set_nz(self.regs.x);
            }
            Inst::Tay => {
                self.regs.y = self.regs.a8();
                self.regs.set_nz(self.regs.y);
            }
            Inst::Trb => {
                let operand = mem.read_8(ea1);
                self.regs
                    .p
                    .set(StatusFlags::ZERO, self.regs.a8() & operand == 0);
                mem.write_8(ea1, operand & !self.regs.a8());
            }
            Inst::Tsb => {
                let operand = mem.read_8(ea1);
                self.regs
                    .p
                    .set(StatusFlags::ZERO, self.regs.a8() & operand == 0);
                mem.write_8(ea1, operand | self.regs.a8());
            }
            Inst::Tsx => {
                self.regs.x = self.regs.s;
                self.regs.set_nz(self.regs.x);
            }
            Inst::Txa => {
                let value = self.regs.x;
                self.regs.set_a8(value);
                self.regs.set_nz(value);
            }
            Inst::Txs => self.regs.s = self.regs.x,
            Inst::Tya => {
                let value = self.regs.y;
                self.regs.set_a8(value);
                self.regs.set_nz(value);
            }
            _ => {
                // Catalog record without execution support (65CE02/WDC
                // extensions); unreachable from the CLI-selectable parts.
                error!(
                    "instruction {} ({:02x}) not implemented",
                    info.mnemonic, info.opcode
                );
                self.halt = true;
            }
        }
    }

    fn read_rmw(&self, mem: &Memory, info: &Opcode, ea1: u32) -> u8 {
        if info.mode == Mode::Accumulator {
            self.regs.a8()
        } else {
            mem.read_8(ea1)
        }
    }

    fn write_rmw(&mut self, mem: &mut Memory, info: &Opcode, ea1: u32, byte: u8) {
        if info.mode == Mode::Accumulator {
            self.regs.set_a8(byte);
        } else {
            mem.write_8(ea1, byte);
        }
    }

    fn compare(&mut self, mem: &Memory, ea1: u32, register: u8) {
        let operand = mem.read_8(ea1) ^ 0xff;
        let result = u16::from(register) + u16::from(operand) + 1;
        self.regs.p.set(StatusFlags::CARRY, result & 0x100 != 0);
        self.regs.set_nz(result as u8);
    }

    fn rts(&mut self, mem: &mut Memory) {
        let lo = u16::from(self.stack_pop(mem));
        let hi = u16::from(self.stack_pop(mem));
        self.regs.pc = (lo | (hi << 8)).wrapping_add(1);
    }

    fn adc(&mut self, mem: &Memory, ea1: u32) {
        let operand = mem.read_8(ea1);
        let carry_in = self.regs.carry_in();
        let a = self.regs.a8();
        let binary = u16::from(a) + u16::from(operand) + u16::from(carry_in);
        let binary_7_bit = (a & 0x7f) + (operand & 0x7f) + carry_in;
        let carry_8 = binary & 0x100 != 0;
        let carry_7 = binary_7_bit & 0x80 != 0;
        let binary = binary as u8;
        if !self.regs.p.contains(StatusFlags::DECIMAL) {
            self.regs.set_nz(binary);
            self.regs.p.set(StatusFlags::CARRY, carry_8);
            self.regs.p.set(StatusFlags::OVERFLOW, carry_8 != carry_7);
            self.regs.set_a8(binary);
        } else {
            // see US patent 3,991,307, Integrated circuit microprocessor
            // with parallel binary adder having on-the-fly correction to
            // provide decimal results, Charles Ingerham Peddle et al.
            let mut lsd = u16::from(a & 0x0f) + u16::from(operand & 0x0f) + u16::from(carry_in);
            let mut msd = u16::from(a >> 4) + u16::from(operand >> 4);
            let carry_4 = lsd > 0x09;
            if carry_4 {
                lsd += 0x06;
                msd += 0x01;
            }
            if !self.bcd_cmos {
                // NMOS: N from the pre-correction sum, Z from the binary sum
                let partial = ((msd << 4) | (lsd & 0x0f)) as u8;
                self.regs.p.set(StatusFlags::NEGATIVE, partial & 0x80 != 0);
                self.regs.p.set(StatusFlags::ZERO, binary == 0);
            }
            let signed_msd = i16::from(bcd_digit_sign_extend(a >> 4))
                + i16::from(bcd_digit_sign_extend(operand >> 4))
                + i16::from(carry_4);
            self.regs
                .p
                .set(StatusFlags::OVERFLOW, !(-8..=7).contains(&signed_msd));
            if msd > 0x09 {
                msd += 0x06;
            }
            self.regs.p.set(StatusFlags::CARRY, msd > 0x0f);
            let result = ((msd << 4) | (lsd & 0x0f)) as u8;
            self.regs.set_a8(result);
            if self.bcd_cmos {
                self.regs.set_nz(result);
                self.instruction_cycles += 1;
            }
        }
    }

    fn sbc(&mut self, mem: &Memory, ea1: u32) {
        let operand = mem.read_8(ea1) ^ 0xff;
        let carry_in = self.regs.carry_in();
        let a = self.regs.a8();
        let result16 = u16::from(a) + u16::from(operand) + u16::from(carry_in);
        let result_7_bit = (a & 0x7f) + (operand & 0x7f) + carry_in;
        let carry_8 = result16 & 0x100 != 0;
        let carry_7 = result_7_bit & 0x80 != 0;
        let result = result16 as u8;
        self.regs.set_nz(result);
        self.regs.p.set(StatusFlags::CARRY, carry_8);
        self.regs.p.set(StatusFlags::OVERFLOW, carry_8 != carry_7);
        if !self.regs.p.contains(StatusFlags::DECIMAL) {
            self.regs.set_a8(result);
        } else {
            // see the decimal mode comments in adc()
            let result_4_bit = (a & 0x0f) + (operand & 0x0f) + carry_in;
            let carry_4 = result_4_bit & 0x10 != 0;
            let mut r = u16::from(result);
            if !carry_4 {
                // NMOS corrects only the low nibble; CMOS lets the
                // correction propagate through the byte
                r = if self.bcd_cmos {
                    (r + 0xfa) & 0xff
                } else {
                    (r & 0xf0) | ((r + 0xfa) & 0x0f)
                };
            }
            if !carry_8 {
                r = (r + 0xa0) & 0xff;
            }
            let r = r as u8;
            if self.bcd_cmos {
                self.regs.set_nz(r);
                self.instruction_cycles += 1;
            }
            self.regs.set_a8(r);
        }
    }
}
