//! Instruction-set catalog for the 6502 family.
//!
//! A static table maps every opcode of every supported variant to an
//! instruction record (mnemonic, kind, addressing mode, cycle data).
//! Constructing an [`InstructionSet`] selects the records belonging to an
//! active [`VariantSet`] and builds the opcode and mnemonic indices.

use std::collections::HashMap;

use bitflags::bitflags;

mod disasm;
mod table;

/// The instruction family a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Original NMOS 6502 instructions.
    Base,
    /// Bit branch/manipulate families on some Rockwell parts (R6500/13 etc.).
    Rockwell,
    /// CMOS 65C02 additions.
    Cmos,
    /// WDC 65C02 additions (STP, WAI).
    WdcCmos,
    /// WDC 65C816 16-bit extensions.
    Wdc16Bit,
    /// Commodore 65CE02 extensions.
    CbmCmos,
}

impl Variant {
    const fn flag(self) -> VariantSet {
        match self {
            Variant::Base => VariantSet::BASE,
            Variant::Rockwell => VariantSet::ROCKWELL,
            Variant::Cmos => VariantSet::CMOS,
            Variant::WdcCmos => VariantSet::WDC_CMOS,
            Variant::Wdc16Bit => VariantSet::WDC_16BIT,
            Variant::CbmCmos => VariantSet::CBM_CMOS,
        }
    }
}

bitflags! {
    /// Set of active instruction families.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VariantSet: u8 {
        const BASE      = 0b00000001;
        const ROCKWELL  = 0b00000010;
        const CMOS      = 0b00000100;
        const WDC_CMOS  = 0b00001000;
        const WDC_16BIT = 0b00010000;
        const CBM_CMOS  = 0b00100000;
    }
}

impl VariantSet {
    /// MOS 6502 (NMOS).
    pub const MOS6502: VariantSet = VariantSet::BASE;
    /// Rockwell NMOS parts with the bit instructions.
    pub const R6502: VariantSet = VariantSet::BASE.union(VariantSet::ROCKWELL);
    /// Plain 65C02.
    pub const C65C02: VariantSet = VariantSet::BASE.union(VariantSet::CMOS);
    /// Rockwell R65C02.
    pub const R65C02: VariantSet = VariantSet::C65C02.union(VariantSet::ROCKWELL);
    /// WDC W65C02S.
    pub const WDC65C02: VariantSet = VariantSet::R65C02.union(VariantSet::WDC_CMOS);
    /// WDC W65C816.
    pub const WDC65C816: VariantSet = VariantSet::C65C02
        .union(VariantSet::WDC_CMOS)
        .union(VariantSet::WDC_16BIT);
    /// Commodore/CSG 65CE02.
    pub const CSG65CE02: VariantSet = VariantSet::R65C02.union(VariantSet::CBM_CMOS);
}

/// Instruction kind, independent of addressing mode.
///
/// The bit branch/manipulate families (`Bbr`, `Bbs`, `Rmb`, `Smb`) are
/// single kinds; the bit index is recovered from the opcode's high nibble
/// as `(opcode >> 4) & 7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    Adc, And, Asl, Asr, Asw, Aug,
    Bbr, Bbs,
    Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Bra,
    Brk, Bsr, Bvc, Bvs, Clc, Cld, Cle, Cli,
    Clv, Cmp, Cpx, Cpy, Cpz, Dec, Dew, Dex,
    Dey, Dez, Eor, Inc, Inw, Inx, Iny, Inz,
    Jmp, Jsr, Lda, Ldx, Ldy, Ldz, Lsr, Neg,
    Nop, Ora, Pha, Php, Phw, Phx, Phy, Phz,
    Pla, Plp, Plx, Ply, Plz,
    Rmb, Rol, Ror, Row, Rti, Rtn, Rts, Sbc,
    Sec, Sed, See, Sei, Smb,
    Sta, Stp, Stx, Sty, Stz, Tab, Tax, Tay,
    Taz, Tba, Trb, Tsb, Tsx, Tsy, Txa, Txs,
    Tya, Tys, Tza, Wai,
}

/// Addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    /// `(zp)` — CMOS.
    ZpInd,
    /// `(zp,x)`
    ZpXInd,
    /// `(zp),y`
    ZpIndY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// `(abs)` — JMP only.
    AbsoluteInd,
    /// `(abs,x)` — CMOS.
    AbsXInd,
    Relative,
    /// Rockwell BBR/BBS: one zero-page byte, then one relative byte.
    ZpRelative,
    /// 16-bit relative — Commodore 65CE02.
    Relative16,
    /// `(zp,sp),y` — Commodore 65CE02.
    StVecIndY,
}

impl Mode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_size(self) -> u8 {
        match self {
            Mode::Implied | Mode::Accumulator => 0,
            Mode::Immediate
            | Mode::ZeroPage
            | Mode::ZeroPageX
            | Mode::ZeroPageY
            | Mode::ZpInd
            | Mode::ZpXInd
            | Mode::ZpIndY
            | Mode::Relative
            | Mode::StVecIndY => 1,
            Mode::Absolute
            | Mode::AbsoluteX
            | Mode::AbsoluteY
            | Mode::AbsoluteInd
            | Mode::AbsXInd
            | Mode::ZpRelative
            | Mode::Relative16 => 2,
        }
    }

    /// Cycles the mode contributes on top of a record's base cycles.
    pub const fn added_cycles(self) -> u8 {
        match self {
            Mode::Implied | Mode::Accumulator | Mode::Immediate | Mode::Relative => 0,
            Mode::ZeroPage | Mode::Relative16 => 1,
            Mode::ZeroPageX | Mode::ZeroPageY => 2,
            Mode::ZpInd | Mode::ZpIndY | Mode::ZpRelative => 3,
            Mode::Absolute | Mode::AbsoluteX | Mode::AbsoluteY => 2,
            Mode::ZpXInd | Mode::AbsoluteInd | Mode::AbsXInd | Mode::StVecIndY => 4,
        }
    }
}

/// One catalog record: everything static about an opcode.
#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    pub mnemonic: &'static str,
    pub variant: Variant,
    pub inst: Inst,
    pub mode: Mode,
    pub opcode: u8,
    /// Cycles on top of [`Mode::added_cycles`]; dynamic penalties
    /// (page crossing, branch taken, BCD fix-up) come on top of both.
    pub base_cycles: u8,
    /// Indexed read crossing a page boundary costs one extra cycle.
    pub page_cross_cycle: bool,
    /// NMOS always pays the extra cycle for indexed read-modify-write.
    pub rmw_extra_cycle: bool,
    /// 65C02 adds one cycle fixing the NMOS `JMP (abs)` page-wrap bug.
    pub cmos_extra_cycle: bool,
}

impl Opcode {
    /// Bit index for the Rockwell bit families.
    pub fn bit_number(&self) -> u8 {
        (self.opcode >> 4) & 7
    }
}

/// Opcode catalog for one active variant set.
pub struct InstructionSet {
    variants: VariantSet,
    by_opcode: [Option<&'static Opcode>; 0x100],
    by_mnemonic: HashMap<&'static str, Vec<&'static Opcode>>,
}

impl InstructionSet {
    /// Build the catalog for `variants`.
    ///
    /// Panics if two active records claim the same opcode; that is a bug
    /// in the static table, not a runtime condition.
    pub fn new(variants: VariantSet) -> Self {
        let mut by_opcode: [Option<&'static Opcode>; 0x100] = [None; 0x100];
        let mut by_mnemonic: HashMap<&'static str, Vec<&'static Opcode>> = HashMap::new();
        for info in table::MAIN_TABLE {
            if !variants.contains(info.variant.flag()) {
                continue;
            }
            assert!(
                by_opcode[info.opcode as usize].is_none(),
                "duplicate opcode {:02x} in instruction table",
                info.opcode
            );
            by_opcode[info.opcode as usize] = Some(info);
            by_mnemonic.entry(info.mnemonic).or_default().push(info);
        }
        InstructionSet {
            variants,
            by_opcode,
            by_mnemonic,
        }
    }

    pub fn variants(&self) -> VariantSet {
        self.variants
    }

    /// Record for an opcode byte, or `None` if undefined in the active set.
    pub fn lookup(&self, opcode: u8) -> Option<&'static Opcode> {
        self.by_opcode[opcode as usize]
    }

    /// All active records for a mnemonic (case-insensitive).
    pub fn records(&self, mnemonic: &str) -> Option<&[&'static Opcode]> {
        let lower = mnemonic.to_ascii_lowercase();
        self.by_mnemonic.get(lower.as_str()).map(Vec::as_slice)
    }

    pub fn valid_mnemonic(&self, mnemonic: &str) -> bool {
        self.records(mnemonic).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_predefined_sets_are_free_of_duplicates() {
        for set in [
            VariantSet::MOS6502,
            VariantSet::R6502,
            VariantSet::C65C02,
            VariantSet::R65C02,
            VariantSet::WDC65C02,
            VariantSet::WDC65C816,
            VariantSet::CSG65CE02,
        ] {
            // Construction asserts uniqueness.
            let _ = InstructionSet::new(set);
        }
    }

    #[test]
    fn nmos_lookup() {
        let isa = InstructionSet::new(VariantSet::MOS6502);
        let lda = isa.lookup(0xa9).unwrap();
        assert_eq!(lda.mnemonic, "lda");
        assert_eq!(lda.inst, Inst::Lda);
        assert_eq!(lda.mode, Mode::Immediate);

        // CMOS-only opcodes are undefined on the NMOS part.
        assert!(isa.lookup(0x72).is_none()); // adc (zp)
        assert!(isa.lookup(0x80).is_none()); // bra
        assert!(isa.lookup(0x0f).is_none()); // bbr0
    }

    #[test]
    fn r65c02_lookup() {
        let isa = InstructionSet::new(VariantSet::R65C02);
        assert_eq!(isa.lookup(0x72).unwrap().inst, Inst::Adc);
        assert_eq!(isa.lookup(0x80).unwrap().inst, Inst::Bra);
        assert_eq!(isa.lookup(0x0f).unwrap().inst, Inst::Bbr);
        assert_eq!(isa.lookup(0x9c).unwrap().inst, Inst::Stz);
        // 65CE02 extensions stay out.
        assert!(isa.lookup(0x43).is_none()); // asr a
    }

    #[test]
    fn rockwell_bit_numbers_come_from_the_high_nibble() {
        let isa = InstructionSet::new(VariantSet::R65C02);
        for bit in 0..8u8 {
            let bbr = isa.lookup(0x0f | (bit << 4)).unwrap();
            assert_eq!(bbr.inst, Inst::Bbr);
            assert_eq!(bbr.bit_number(), bit);
            let smb = isa.lookup(0x87 | (bit << 4)).unwrap();
            assert_eq!(smb.inst, Inst::Smb);
            assert_eq!(smb.bit_number(), bit);
        }
    }

    #[test]
    fn mnemonic_index() {
        let isa = InstructionSet::new(VariantSet::MOS6502);
        let lda = isa.records("LDA").unwrap();
        assert_eq!(lda.len(), 8); // no (zp) on NMOS
        assert!(isa.valid_mnemonic("adc"));
        assert!(!isa.valid_mnemonic("stz"));

        let isa = InstructionSet::new(VariantSet::R65C02);
        assert_eq!(isa.records("lda").unwrap().len(), 9);
    }

    #[test]
    fn operand_sizes() {
        assert_eq!(Mode::Implied.operand_size(), 0);
        assert_eq!(Mode::Accumulator.operand_size(), 0);
        assert_eq!(Mode::Immediate.operand_size(), 1);
        assert_eq!(Mode::ZpIndY.operand_size(), 1);
        assert_eq!(Mode::Absolute.operand_size(), 2);
        assert_eq!(Mode::ZpRelative.operand_size(), 2);
    }

    #[test]
    fn documented_cycle_totals() {
        let isa = InstructionSet::new(VariantSet::R65C02);
        let total = |op: u8| {
            let info = isa.lookup(op).unwrap();
            info.base_cycles + info.mode.added_cycles()
        };
        assert_eq!(total(0xa9), 2); // lda #
        assert_eq!(total(0xa5), 3); // lda zp
        assert_eq!(total(0xb5), 4); // lda zp,x
        assert_eq!(total(0xad), 4); // lda abs
        assert_eq!(total(0xbd), 4); // lda abs,x (+1 page)
        assert_eq!(total(0xa1), 6); // lda (zp,x)
        assert_eq!(total(0xb1), 5); // lda (zp),y (+1 page)
        assert_eq!(total(0xb2), 5); // lda (zp)
        assert_eq!(total(0x8d), 4); // sta abs
        assert_eq!(total(0x9d), 5); // sta abs,x
        assert_eq!(total(0x91), 6); // sta (zp),y
        assert_eq!(total(0x06), 5); // asl zp
        assert_eq!(total(0x1e), 6); // asl abs,x (+1 forced on NMOS)
        assert_eq!(total(0xde), 7); // dec abs,x
        assert_eq!(total(0x4c), 3); // jmp abs
        assert_eq!(total(0x6c), 5); // jmp (abs) (+1 on CMOS)
        assert_eq!(total(0x7c), 6); // jmp (abs,x)
        assert_eq!(total(0x20), 6); // jsr
        assert_eq!(total(0x60), 6); // rts
        assert_eq!(total(0x00), 7); // brk
        assert_eq!(total(0x48), 3); // pha
        assert_eq!(total(0x68), 4); // pla
        assert_eq!(total(0xf0), 2); // beq (untaken)
        assert_eq!(total(0x0f), 5); // bbr0 (untaken)
        assert_eq!(total(0x07), 5); // rmb0
        assert_eq!(total(0x14), 5); // trb zp
        assert_eq!(total(0x1c), 6); // trb abs
    }

    #[test]
    fn cycle_penalty_flags() {
        let isa = InstructionSet::new(VariantSet::R65C02);
        assert!(isa.lookup(0xbd).unwrap().page_cross_cycle); // lda abs,x
        assert!(!isa.lookup(0x9d).unwrap().page_cross_cycle); // sta abs,x
        assert!(isa.lookup(0x1e).unwrap().rmw_extra_cycle); // asl abs,x
        assert!(!isa.lookup(0xde).unwrap().rmw_extra_cycle); // dec abs,x is 7 on both
        assert!(isa.lookup(0x6c).unwrap().cmos_extra_cycle); // jmp (abs)
        assert!(!isa.lookup(0x4c).unwrap().cmos_extra_cycle);
    }
}
