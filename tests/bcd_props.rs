//! Property-based tests: decimal arithmetic against a reference model,
//! binary arithmetic against widened math, and state invariants across
//! randomized legal instructions.

use proptest::prelude::*;

use apex65::cpu::{Cpu, StatusFlags};
use apex65::isa::VariantSet;
use apex65::memory::Memory;

fn packed_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Run a two-instruction program: LDA #a then ADC/SBC #m, with the
/// requested decimal and carry flags.
fn run_arith(variants: VariantSet, opcode: u8, a: u8, m: u8, decimal: bool, carry: bool) -> Cpu {
    let mut cpu = Cpu::new(variants);
    cpu.regs.pc = 0x0400;
    cpu.regs.p.set(StatusFlags::DECIMAL, decimal);
    cpu.regs.p.set(StatusFlags::CARRY, carry);
    let mut mem = Memory::new();
    mem.load_slice(0x0400, &[0xa9, a, opcode, m]);
    assert!(!cpu.execute_instruction(&mut mem));
    assert!(!cpu.execute_instruction(&mut mem));
    cpu
}

proptest! {
    /// Decimal ADC with valid BCD operands produces the decimal sum,
    /// on NMOS and CMOS alike.
    #[test]
    fn decimal_adc_matches_the_decimal_model(
        a in 0u8..100,
        m in 0u8..100,
        carry in any::<bool>(),
        cmos in any::<bool>(),
    ) {
        let variants = if cmos { VariantSet::R65C02 } else { VariantSet::MOS6502 };
        let cpu = run_arith(variants, 0x69, packed_bcd(a), packed_bcd(m), true, carry);

        let sum = u16::from(a) + u16::from(m) + u16::from(carry);
        prop_assert_eq!(cpu.regs.a8(), packed_bcd((sum % 100) as u8));
        prop_assert_eq!(cpu.regs.p.contains(StatusFlags::CARRY), sum > 99);
    }

    /// NMOS decimal ADC leaves Z tracking the binary sum; CMOS recomputes
    /// Z and N from the corrected result.
    #[test]
    fn decimal_adc_flag_timing(
        a in 0u8..100,
        m in 0u8..100,
        carry in any::<bool>(),
    ) {
        let pa = packed_bcd(a);
        let pm = packed_bcd(m);
        let binary = u16::from(pa) + u16::from(pm) + u16::from(carry);

        let nmos = run_arith(VariantSet::MOS6502, 0x69, pa, pm, true, carry);
        prop_assert_eq!(
            nmos.regs.p.contains(StatusFlags::ZERO),
            binary & 0xff == 0
        );

        let cmos = run_arith(VariantSet::R65C02, 0x69, pa, pm, true, carry);
        let result = cmos.regs.a8();
        prop_assert_eq!(cmos.regs.p.contains(StatusFlags::ZERO), result == 0);
        prop_assert_eq!(
            cmos.regs.p.contains(StatusFlags::NEGATIVE),
            result & 0x80 != 0
        );
    }

    /// Decimal SBC with valid BCD operands produces the decimal
    /// difference modulo 100, with carry reporting "no borrow".
    #[test]
    fn decimal_sbc_matches_the_decimal_model(
        a in 0u8..100,
        m in 0u8..100,
        carry in any::<bool>(),
        cmos in any::<bool>(),
    ) {
        let variants = if cmos { VariantSet::R65C02 } else { VariantSet::MOS6502 };
        let cpu = run_arith(variants, 0xe9, packed_bcd(a), packed_bcd(m), true, carry);

        let borrow = i16::from(!carry);
        let diff = i16::from(a) - i16::from(m) - borrow;
        let expected = diff.rem_euclid(100) as u8;
        prop_assert_eq!(cpu.regs.a8(), packed_bcd(expected));
        prop_assert_eq!(cpu.regs.p.contains(StatusFlags::CARRY), diff >= 0);
    }

    /// Binary ADC agrees with widened arithmetic for every (A, M, C).
    #[test]
    fn binary_adc_matches_widened_arithmetic(
        a in any::<u8>(),
        m in any::<u8>(),
        carry in any::<bool>(),
    ) {
        let cpu = run_arith(VariantSet::MOS6502, 0x69, a, m, false, carry);

        let wide = u16::from(a) + u16::from(m) + u16::from(carry);
        let result = wide as u8;
        prop_assert_eq!(cpu.regs.a8(), result);
        prop_assert_eq!(cpu.regs.p.contains(StatusFlags::CARRY), wide > 0xff);
        prop_assert_eq!(cpu.regs.p.contains(StatusFlags::ZERO), result == 0);
        prop_assert_eq!(
            cpu.regs.p.contains(StatusFlags::NEGATIVE),
            result & 0x80 != 0
        );
        // signed overflow: both operands share a sign the result lacks
        let expected_v = (a ^ result) & (m ^ result) & 0x80 != 0;
        prop_assert_eq!(cpu.regs.p.contains(StatusFlags::OVERFLOW), expected_v);
    }

    /// Binary SBC agrees with widened arithmetic for every (A, M, C).
    #[test]
    fn binary_sbc_matches_widened_arithmetic(
        a in any::<u8>(),
        m in any::<u8>(),
        carry in any::<bool>(),
    ) {
        let cpu = run_arith(VariantSet::MOS6502, 0xe9, a, m, false, carry);

        let wide = i16::from(a) - i16::from(m) - i16::from(!carry);
        let result = wide as u8;
        prop_assert_eq!(cpu.regs.a8(), result);
        prop_assert_eq!(cpu.regs.p.contains(StatusFlags::CARRY), wide >= 0);
        let expected_v = (a ^ m) & (a ^ result) & 0x80 != 0;
        prop_assert_eq!(cpu.regs.p.contains(StatusFlags::OVERFLOW), expected_v);
    }

    /// Every legal instruction leaves the register file within its
    /// invariants, whatever the operands and starting state.
    #[test]
    fn legal_instructions_preserve_register_invariants(
        opcode_index in 0usize..151,
        operand1 in any::<u8>(),
        operand2 in any::<u8>(),
        a in any::<u8>(),
        x in any::<u8>(),
        y in any::<u8>(),
        s in any::<u8>(),
        p_bits in any::<u8>(),
    ) {
        let isa = apex65::isa::InstructionSet::new(VariantSet::MOS6502);
        let legal: Vec<u8> = (0..=255u8).filter(|&op| isa.lookup(op).is_some()).collect();
        let opcode = legal[opcode_index % legal.len()];

        let mut cpu = Cpu::new(VariantSet::MOS6502);
        cpu.regs.pc = 0x0400;
        cpu.regs.set_a8(a);
        cpu.regs.x = x;
        cpu.regs.y = y;
        cpu.regs.s = s;
        cpu.regs.p = StatusFlags::from_bits_retain(p_bits & !StatusFlags::DECIMAL.bits());
        let mut mem = Memory::new();
        mem.load_slice(0x0400, &[opcode, operand1, operand2]);

        let _ = cpu.execute_instruction(&mut mem);

        prop_assert!(cpu.regs.a <= 0xff, "accumulator left its 8-bit range");
        prop_assert!(cpu.cycle_count() >= 1);
        prop_assert!(cpu.instruction_count() == 1);
    }

    /// N and Z always describe the value a load leaves in the register.
    #[test]
    fn load_flags_describe_the_result(value in any::<u8>()) {
        let mut cpu = Cpu::new(VariantSet::MOS6502);
        cpu.regs.pc = 0x0400;
        let mut mem = Memory::new();
        mem.load_slice(0x0400, &[0xa9, value]);
        assert!(!cpu.execute_instruction(&mut mem));
        prop_assert_eq!(cpu.regs.p.contains(StatusFlags::ZERO), value == 0);
        prop_assert_eq!(cpu.regs.p.contains(StatusFlags::NEGATIVE), value & 0x80 != 0);
    }
}
