//! The static instruction table.
//!
//! One record per (opcode, variant) pair. Cycle totals decompose as
//! `base_cycles + Mode::added_cycles()`; the three flag bits select the
//! dynamic penalties (page crossing, forced NMOS read-modify-write cycle,
//! CMOS `JMP (abs)` fix-up).

use super::{Inst, Mode, Opcode, Variant};

use Inst::*;
use Mode::*;
use Variant::{Base, CbmCmos, Cmos, Rockwell, WdcCmos};

/// No dynamic cycle penalties.
const N: u8 = 0;
/// Page crossing adds a cycle.
const P: u8 = 1 << 0;
/// NMOS indexed read-modify-write always adds a cycle.
const R: u8 = 1 << 1;
/// CMOS adds a cycle (65C02 `JMP (abs)` fix).
const C: u8 = 1 << 2;

const fn op(
    mnemonic: &'static str,
    variant: Variant,
    inst: Inst,
    mode: Mode,
    opcode: u8,
    base_cycles: u8,
    flags: u8,
) -> Opcode {
    Opcode {
        mnemonic,
        variant,
        inst,
        mode,
        opcode,
        base_cycles,
        page_cross_cycle: flags & P != 0,
        rmw_extra_cycle: flags & R != 0,
        cmos_extra_cycle: flags & C != 0,
    }
}

pub(super) static MAIN_TABLE: &[Opcode] = &[
    op("adc", Base, Adc, Immediate, 0x69, 2, N),
    op("adc", Base, Adc, ZeroPage, 0x65, 2, N),
    op("adc", Base, Adc, ZeroPageX, 0x75, 2, N),
    op("adc", Cmos, Adc, ZpInd, 0x72, 2, N),
    op("adc", Base, Adc, ZpXInd, 0x61, 2, N),
    op("adc", Base, Adc, ZpIndY, 0x71, 2, P),
    op("adc", Base, Adc, Absolute, 0x6d, 2, N),
    op("adc", Base, Adc, AbsoluteX, 0x7d, 2, P),
    op("adc", Base, Adc, AbsoluteY, 0x79, 2, P),
    //
    op("and", Base, And, Immediate, 0x29, 2, N),
    op("and", Base, And, ZeroPage, 0x25, 2, N),
    op("and", Base, And, ZeroPageX, 0x35, 2, N),
    op("and", Cmos, And, ZpInd, 0x32, 2, N),
    op("and", Base, And, ZpXInd, 0x21, 2, N),
    op("and", Base, And, ZpIndY, 0x31, 2, P),
    op("and", Base, And, Absolute, 0x2d, 2, N),
    op("and", Base, And, AbsoluteX, 0x3d, 2, P),
    op("and", Base, And, AbsoluteY, 0x39, 2, P),
    //
    op("asl", Base, Asl, Accumulator, 0x0a, 2, N),
    op("asl", Base, Asl, ZeroPage, 0x06, 4, N),
    op("asl", Base, Asl, ZeroPageX, 0x16, 4, N),
    op("asl", Base, Asl, Absolute, 0x0e, 4, N),
    op("asl", Base, Asl, AbsoluteX, 0x1e, 4, P | R),
    //
    op("asr", CbmCmos, Asr, Accumulator, 0x43, 2, N),
    op("asr", CbmCmos, Asr, ZeroPage, 0x44, 3, N),
    op("asr", CbmCmos, Asr, ZeroPageX, 0x54, 3, N),
    //
    op("asw", CbmCmos, Asw, Absolute, 0xcb, 5, N),
    //
    op("aug", CbmCmos, Aug, Implied, 0x5c, 4, N), // 4-byte instruction
    //
    op("bbr0", Rockwell, Bbr, ZpRelative, 0x0f, 2, N),
    op("bbr1", Rockwell, Bbr, ZpRelative, 0x1f, 2, N),
    op("bbr2", Rockwell, Bbr, ZpRelative, 0x2f, 2, N),
    op("bbr3", Rockwell, Bbr, ZpRelative, 0x3f, 2, N),
    op("bbr4", Rockwell, Bbr, ZpRelative, 0x4f, 2, N),
    op("bbr5", Rockwell, Bbr, ZpRelative, 0x5f, 2, N),
    op("bbr6", Rockwell, Bbr, ZpRelative, 0x6f, 2, N),
    op("bbr7", Rockwell, Bbr, ZpRelative, 0x7f, 2, N),
    //
    op("bbs0", Rockwell, Bbs, ZpRelative, 0x8f, 2, N),
    op("bbs1", Rockwell, Bbs, ZpRelative, 0x9f, 2, N),
    op("bbs2", Rockwell, Bbs, ZpRelative, 0xaf, 2, N),
    op("bbs3", Rockwell, Bbs, ZpRelative, 0xbf, 2, N),
    op("bbs4", Rockwell, Bbs, ZpRelative, 0xcf, 2, N),
    op("bbs5", Rockwell, Bbs, ZpRelative, 0xdf, 2, N),
    op("bbs6", Rockwell, Bbs, ZpRelative, 0xef, 2, N),
    op("bbs7", Rockwell, Bbs, ZpRelative, 0xff, 2, N),
    //
    op("bcc", Base, Bcc, Relative, 0x90, 2, N),
    op("bcc", CbmCmos, Bcc, Relative16, 0x93, 2, N),
    op("bcs", Base, Bcs, Relative, 0xb0, 2, N),
    op("bcs", CbmCmos, Bcs, Relative16, 0xb3, 2, N),
    op("beq", Base, Beq, Relative, 0xf0, 2, N),
    op("beq", CbmCmos, Beq, Relative16, 0xf3, 2, N),
    //
    op("bit", Cmos, Bit, Immediate, 0x89, 2, N),
    op("bit", Base, Bit, ZeroPage, 0x24, 2, N),
    op("bit", Cmos, Bit, ZeroPageX, 0x34, 2, N),
    op("bit", Base, Bit, Absolute, 0x2c, 2, N),
    op("bit", Cmos, Bit, AbsoluteX, 0x3c, 2, P),
    //
    op("bmi", Base, Bmi, Relative, 0x30, 2, N),
    op("bmi", CbmCmos, Bmi, Relative16, 0x33, 2, N),
    op("bne", Base, Bne, Relative, 0xd0, 2, N),
    op("bne", CbmCmos, Bne, Relative16, 0xd3, 2, N),
    op("bpl", Base, Bpl, Relative, 0x10, 2, N),
    op("bpl", CbmCmos, Bpl, Relative16, 0x13, 2, N),
    //
    op("brk", Base, Brk, Implied, 0x00, 7, N),
    //
    op("bra", Cmos, Bra, Relative, 0x80, 2, N), // Commodore calls this BRU
    op("bra", CbmCmos, Bra, Relative16, 0x83, 2, N),
    //
    op("bsr", CbmCmos, Bsr, Relative16, 0x63, 4, N),
    //
    op("bvc", Base, Bvc, Relative, 0x50, 2, N),
    op("bvc", CbmCmos, Bvc, Relative16, 0x53, 2, N),
    op("bvs", Base, Bvs, Relative, 0x70, 2, N),
    op("bvs", CbmCmos, Bvs, Relative16, 0x73, 2, N),
    //
    op("clc", Base, Clc, Implied, 0x18, 2, N),
    op("cld", Base, Cld, Implied, 0xd8, 2, N),
    op("cle", CbmCmos, Cle, Implied, 0x02, 2, N),
    op("cli", Base, Cli, Implied, 0x58, 2, N),
    op("clv", Base, Clv, Implied, 0xb8, 2, N),
    //
    op("cmp", Base, Cmp, Immediate, 0xc9, 2, N),
    op("cmp", Base, Cmp, ZeroPage, 0xc5, 2, N),
    op("cmp", Base, Cmp, ZeroPageX, 0xd5, 2, N),
    op("cmp", Cmos, Cmp, ZpInd, 0xd2, 2, N),
    op("cmp", Base, Cmp, ZpXInd, 0xc1, 2, N),
    op("cmp", Base, Cmp, ZpIndY, 0xd1, 2, P),
    op("cmp", Base, Cmp, Absolute, 0xcd, 2, N),
    op("cmp", Base, Cmp, AbsoluteX, 0xdd, 2, P),
    op("cmp", Base, Cmp, AbsoluteY, 0xd9, 2, P),
    //
    op("cpx", Base, Cpx, Immediate, 0xe0, 2, N),
    op("cpx", Base, Cpx, ZeroPage, 0xe4, 2, N),
    op("cpx", Base, Cpx, Absolute, 0xec, 2, N),
    //
    op("cpy", Base, Cpy, Immediate, 0xc0, 2, N),
    op("cpy", Base, Cpy, ZeroPage, 0xc4, 2, N),
    op("cpy", Base, Cpy, Absolute, 0xcc, 2, N),
    //
    op("cpz", CbmCmos, Cpz, Immediate, 0xc2, 2, N),
    op("cpz", CbmCmos, Cpz, ZeroPage, 0xd4, 2, N),
    op("cpz", CbmCmos, Cpz, Absolute, 0xdc, 2, N),
    //
    op("dec", Cmos, Dec, Accumulator, 0x3a, 2, N),
    op("dec", Base, Dec, ZeroPage, 0xc6, 4, N),
    op("dec", Base, Dec, ZeroPageX, 0xd6, 4, N),
    op("dec", Base, Dec, Absolute, 0xce, 4, N),
    op("dec", Base, Dec, AbsoluteX, 0xde, 5, N),
    //
    op("dew", CbmCmos, Dew, ZeroPage, 0xc3, 5, N),
    op("dex", Base, Dex, Implied, 0xca, 2, N),
    op("dey", Base, Dey, Implied, 0x88, 2, N),
    op("dez", CbmCmos, Dez, Implied, 0x3b, 2, N),
    //
    op("eor", Base, Eor, Immediate, 0x49, 2, N),
    op("eor", Base, Eor, ZeroPage, 0x45, 2, N),
    op("eor", Base, Eor, ZeroPageX, 0x55, 2, N),
    op("eor", Cmos, Eor, ZpInd, 0x52, 2, N),
    op("eor", Base, Eor, ZpXInd, 0x41, 2, N),
    op("eor", Base, Eor, ZpIndY, 0x51, 2, P),
    op("eor", Base, Eor, Absolute, 0x4d, 2, N),
    op("eor", Base, Eor, AbsoluteX, 0x5d, 2, P),
    op("eor", Base, Eor, AbsoluteY, 0x59, 2, P),
    //
    op("inc", Cmos, Inc, Accumulator, 0x1a, 2, N),
    op("inc", Base, Inc, ZeroPage, 0xe6, 4, N),
    op("inc", Base, Inc, ZeroPageX, 0xf6, 4, N),
    op("inc", Base, Inc, Absolute, 0xee, 4, N),
    op("inc", Base, Inc, AbsoluteX, 0xfe, 5, N),
    //
    op("inw", CbmCmos, Inw, ZeroPage, 0xe3, 5, N),
    op("inx", Base, Inx, Implied, 0xe8, 2, N),
    op("iny", Base, Iny, Implied, 0xc8, 2, N),
    op("inz", CbmCmos, Inz, Implied, 0x1b, 2, N),
    //
    op("jmp", Base, Jmp, Absolute, 0x4c, 1, N),
    op("jmp", Base, Jmp, AbsoluteInd, 0x6c, 1, C),
    op("jmp", Cmos, Jmp, AbsXInd, 0x7c, 2, N),
    //
    op("jsr", Base, Jsr, Absolute, 0x20, 4, N),
    op("jsr", CbmCmos, Jsr, AbsoluteInd, 0x22, 3, N),
    op("jsr", CbmCmos, Jsr, AbsXInd, 0x23, 3, N),
    //
    op("lda", Base, Lda, Immediate, 0xa9, 2, N),
    op("lda", Base, Lda, ZeroPage, 0xa5, 2, N),
    op("lda", Base, Lda, ZeroPageX, 0xb5, 2, N),
    op("lda", Cmos, Lda, ZpInd, 0xb2, 2, N),
    op("lda", Base, Lda, ZpXInd, 0xa1, 2, N),
    op("lda", Base, Lda, ZpIndY, 0xb1, 2, P),
    op("lda", Base, Lda, Absolute, 0xad, 2, N),
    op("lda", Base, Lda, AbsoluteX, 0xbd, 2, P),
    op("lda", Base, Lda, AbsoluteY, 0xb9, 2, P),
    op("lda", CbmCmos, Lda, StVecIndY, 0xe2, 2, N),
    //
    op("ldx", Base, Ldx, Immediate, 0xa2, 2, N),
    op("ldx", Base, Ldx, ZeroPage, 0xa6, 2, N),
    op("ldx", Base, Ldx, ZeroPageY, 0xb6, 2, N),
    op("ldx", Base, Ldx, Absolute, 0xae, 2, N),
    op("ldx", Base, Ldx, AbsoluteY, 0xbe, 2, P),
    //
    op("ldy", Base, Ldy, Immediate, 0xa0, 2, N),
    op("ldy", Base, Ldy, ZeroPage, 0xa4, 2, N),
    op("ldy", Base, Ldy, ZeroPageX, 0xb4, 2, N),
    op("ldy", Base, Ldy, Absolute, 0xac, 2, N),
    op("ldy", Base, Ldy, AbsoluteX, 0xbc, 2, P),
    //
    op("ldz", CbmCmos, Ldz, Immediate, 0xa3, 2, N),
    op("ldz", CbmCmos, Ldz, Absolute, 0xab, 2, N),
    op("ldz", CbmCmos, Ldz, AbsoluteX, 0xbb, 2, P),
    //
    op("lsr", Base, Lsr, Accumulator, 0x4a, 2, N),
    op("lsr", Base, Lsr, ZeroPage, 0x46, 4, N),
    op("lsr", Base, Lsr, ZeroPageX, 0x56, 4, N),
    op("lsr", Base, Lsr, Absolute, 0x4e, 4, N),
    op("lsr", Base, Lsr, AbsoluteX, 0x5e, 4, P | R),
    //
    op("neg", CbmCmos, Neg, Accumulator, 0x42, 2, N),
    //
    op("nop", Base, Nop, Implied, 0xea, 2, N),
    //
    op("ora", Base, Ora, Immediate, 0x09, 2, N),
    op("ora", Base, Ora, ZeroPage, 0x05, 2, N),
    op("ora", Base, Ora, ZeroPageX, 0x15, 2, N),
    op("ora", Cmos, Ora, ZpInd, 0x12, 2, N),
    op("ora", Base, Ora, ZpXInd, 0x01, 2, N),
    op("ora", Base, Ora, ZpIndY, 0x11, 2, P),
    op("ora", Base, Ora, Absolute, 0x0d, 2, N),
    op("ora", Base, Ora, AbsoluteX, 0x1d, 2, P),
    op("ora", Base, Ora, AbsoluteY, 0x19, 2, P),
    //
    op("pha", Base, Pha, Implied, 0x48, 3, N),
    op("php", Base, Php, Implied, 0x08, 3, N),
    op("phw", CbmCmos, Phw, Immediate, 0xf4, 5, N),
    op("phw", CbmCmos, Phw, Absolute, 0xfc, 5, N),
    op("phx", Cmos, Phx, Implied, 0xda, 3, N),
    op("phy", Cmos, Phy, Implied, 0x5a, 3, N),
    op("phz", CbmCmos, Phz, Implied, 0xdb, 3, N),
    //
    op("pla", Base, Pla, Implied, 0x68, 4, N),
    op("plp", Base, Plp, Implied, 0x28, 4, N),
    op("plx", Cmos, Plx, Implied, 0xfa, 4, N),
    op("ply", Cmos, Ply, Implied, 0x7a, 4, N),
    op("plz", CbmCmos, Plz, Implied, 0xfb, 4, N),
    //
    op("rmb0", Rockwell, Rmb, ZeroPage, 0x07, 4, N),
    op("rmb1", Rockwell, Rmb, ZeroPage, 0x17, 4, N),
    op("rmb2", Rockwell, Rmb, ZeroPage, 0x27, 4, N),
    op("rmb3", Rockwell, Rmb, ZeroPage, 0x37, 4, N),
    op("rmb4", Rockwell, Rmb, ZeroPage, 0x47, 4, N),
    op("rmb5", Rockwell, Rmb, ZeroPage, 0x57, 4, N),
    op("rmb6", Rockwell, Rmb, ZeroPage, 0x67, 4, N),
    op("rmb7", Rockwell, Rmb, ZeroPage, 0x77, 4, N),
    //
    op("rol", Base, Rol, Accumulator, 0x2a, 2, N),
    op("rol", Base, Rol, ZeroPage, 0x26, 4, N),
    op("rol", Base, Rol, ZeroPageX, 0x36, 4, N),
    op("rol", Base, Rol, Absolute, 0x2e, 4, N),
    op("rol", Base, Rol, AbsoluteX, 0x3e, 4, P | R),
    //
    // very early 6502 didn't have ROR
    op("ror", Base, Ror, Accumulator, 0x6a, 2, N),
    op("ror", Base, Ror, ZeroPage, 0x66, 4, N),
    op("ror", Base, Ror, ZeroPageX, 0x76, 4, N),
    op("ror", Base, Ror, Absolute, 0x6e, 4, N),
    op("ror", Base, Ror, AbsoluteX, 0x7e, 4, P | R),
    //
    op("row", CbmCmos, Row, Absolute, 0xeb, 4, N),
    //
    op("rti", Base, Rti, Implied, 0x40, 6, N),
    op("rtn", CbmCmos, Rtn, Immediate, 0x62, 7, N),
    op("rts", Base, Rts, Implied, 0x60, 6, N),
    //
    op("sbc", Base, Sbc, Immediate, 0xe9, 2, N),
    op("sbc", Base, Sbc, ZeroPage, 0xe5, 2, N),
    op("sbc", Base, Sbc, ZeroPageX, 0xf5, 2, N),
    op("sbc", Cmos, Sbc, ZpInd, 0xf2, 2, N),
    op("sbc", Base, Sbc, ZpXInd, 0xe1, 2, N),
    op("sbc", Base, Sbc, ZpIndY, 0xf1, 2, P),
    op("sbc", Base, Sbc, Absolute, 0xed, 2, N),
    op("sbc", Base, Sbc, AbsoluteX, 0xfd, 2, P),
    op("sbc", Base, Sbc, AbsoluteY, 0xf9, 2, P),
    //
    op("sec", Base, Sec, Implied, 0x38, 2, N),
    op("sed", Base, Sed, Implied, 0xf8, 2, N),
    op("see", CbmCmos, See, Implied, 0x03, 2, N),
    op("sei", Base, Sei, Implied, 0x78, 2, N),
    //
    op("smb0", Rockwell, Smb, ZeroPage, 0x87, 4, N),
    op("smb1", Rockwell, Smb, ZeroPage, 0x97, 4, N),
    op("smb2", Rockwell, Smb, ZeroPage, 0xa7, 4, N),
    op("smb3", Rockwell, Smb, ZeroPage, 0xb7, 4, N),
    op("smb4", Rockwell, Smb, ZeroPage, 0xc7, 4, N),
    op("smb5", Rockwell, Smb, ZeroPage, 0xd7, 4, N),
    op("smb6", Rockwell, Smb, ZeroPage, 0xe7, 4, N),
    op("smb7", Rockwell, Smb, ZeroPage, 0xf7, 4, N),
    //
    op("sta", Base, Sta, ZeroPage, 0x85, 2, N),
    op("sta", Base, Sta, ZeroPageX, 0x95, 2, N),
    op("sta", Cmos, Sta, ZpInd, 0x92, 2, N),
    op("sta", Base, Sta, ZpXInd, 0x81, 2, N),
    op("sta", Base, Sta, ZpIndY, 0x91, 3, N),
    op("sta", Base, Sta, Absolute, 0x8d, 2, N),
    op("sta", Base, Sta, AbsoluteX, 0x9d, 3, N),
    op("sta", Base, Sta, AbsoluteY, 0x99, 3, N),
    op("sta", CbmCmos, Sta, StVecIndY, 0x82, 2, N),
    //
    op("stp", WdcCmos, Stp, Implied, 0xdb, 3, N),
    //
    op("stx", Base, Stx, ZeroPage, 0x86, 2, N),
    op("stx", Base, Stx, ZeroPageY, 0x96, 2, N),
    op("stx", Base, Stx, Absolute, 0x8e, 2, N),
    op("stx", CbmCmos, Stx, AbsoluteY, 0x9b, 3, N),
    //
    op("sty", Base, Sty, ZeroPage, 0x84, 2, N),
    op("sty", Base, Sty, ZeroPageX, 0x94, 2, N),
    op("sty", Base, Sty, Absolute, 0x8c, 2, N),
    op("sty", CbmCmos, Sty, AbsoluteX, 0x8b, 3, N),
    //
    op("stz", Cmos, Stz, ZeroPage, 0x64, 2, N),
    op("stz", Cmos, Stz, ZeroPageX, 0x74, 2, N),
    op("stz", Cmos, Stz, Absolute, 0x9c, 2, N),
    op("stz", Cmos, Stz, AbsoluteX, 0x9e, 3, N),
    //
    op("tab", CbmCmos, Tab, Implied, 0x5b, 2, N),
    op("tax", Base, Tax, Implied, 0xaa, 2, N),
    op("tay", Base, Tay, Implied, 0xa8, 2, N),
    op("taz", CbmCmos, Taz, Implied, 0x4b, 2, N),
    op("tba", CbmCmos, Tba, Implied, 0x7b, 2, N),
    //
    op("trb", Cmos, Trb, ZeroPage, 0x14, 4, N),
    op("trb", Cmos, Trb, Absolute, 0x1c, 4, N),
    op("tsb", Cmos, Tsb, ZeroPage, 0x04, 4, N),
    op("tsb", Cmos, Tsb, Absolute, 0x0c, 4, N),
    //
    op("tsx", Base, Tsx, Implied, 0xba, 2, N),
    op("tsy", CbmCmos, Tsy, Implied, 0x0b, 2, N),
    op("txa", Base, Txa, Implied, 0x8a, 2, N),
    op("txs", Base, Txs, Implied, 0x9a, 2, N),
    op("tya", Base, Tya, Implied, 0x98, 2, N),
    op("tys", CbmCmos, Tys, Implied, 0x2b, 2, N),
    op("tza", CbmCmos, Tza, Implied, 0x6b, 2, N),
    //
    op("wai", WdcCmos, Wai, Implied, 0xcb, 3, N),
];
