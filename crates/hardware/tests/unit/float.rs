//! Floating-point register bank and mixed-type arithmetic.

use ooosim_core::config::Config;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::TestContext;

#[rstest]
#[case::adds("ADDS", 1.5, 2.0, 3.5)]
#[case::subs("SUBS", 1.5, 2.0, -0.5)]
#[case::mults("MULTS", 1.5, 2.0, 3.0)]
#[case::divs("DIVS", 1.5, 2.0, 0.75)]
fn test_fp_arithmetic(#[case] op: &str, #[case] a: f32, #[case] b: f32, #[case] expected: f32) {
    let mut ctx = TestContext::asm(&format!("{op} F1 F2 F3\nEOP"), Config::default());
    ctx.sim.set_fp_register(2, a);
    ctx.sim.set_fp_register(3, b);
    let _ = ctx.run_to_end();

    assert_eq!(ctx.sim.fp_register(1), expected);
}

#[test]
fn test_int_operand_promoted_in_fp_op() {
    let mut ctx = TestContext::asm("ADDS F1 R2 F3\nEOP", Config::default());
    ctx.sim.set_int_register(2, -3);
    ctx.sim.set_fp_register(3, 0.5);
    let _ = ctx.run_to_end();

    assert_eq!(ctx.sim.fp_register(1), -2.5);
}

#[test]
fn test_fp_operand_switches_int_op_to_float() {
    let mut ctx = TestContext::asm("ADD R1 F2 R3\nEOP", Config::default());
    ctx.sim.set_fp_register(2, 1.5);
    ctx.sim.set_int_register(3, 2);
    let _ = ctx.run_to_end();

    assert_eq!(ctx.reg(1) as u32, 3.5f32.to_bits());
}

#[test]
fn test_fp_chain_forwards_through_tags() {
    let mut ctx = TestContext::asm(
        "MULTS F1 F2 F2
         ADDS  F3 F1 F2
         DIVS  F4 F3 F2
         EOP",
        Config::default(),
    );
    ctx.sim.set_fp_register(2, 4.0);
    let _ = ctx.run_to_end();

    assert_eq!(ctx.sim.fp_register(1), 16.0);
    assert_eq!(ctx.sim.fp_register(3), 20.0);
    assert_eq!(ctx.sim.fp_register(4), 5.0);
}

#[test]
fn test_fp_memory_round_trip() {
    let mut ctx = TestContext::asm(
        "LWS F1 0x20(R0)
         ADDS F2 F1 F1
         SWS F2 0x24(R0)
         EOP",
        Config::default(),
    );
    ctx.sim.write_memory(0x20, 1.25f32.to_bits()).unwrap();
    let _ = ctx.run_to_end();

    assert_eq!(ctx.sim.fp_register(1), 1.25);
    assert_eq!(ctx.sim.read_memory(0x24).unwrap(), 2.5f32.to_bits());
    assert_eq!(ctx.sim.stats().inst_load, 1);
    assert_eq!(ctx.sim.stats().inst_store, 1);
}

#[test]
fn test_fp_branch_compares_as_float() {
    let mut ctx = TestContext::asm(
        "      BLTZ F1 neg
               ADDI R1 R0 1
         neg:  EOP",
        Config::default(),
    );
    ctx.sim.set_fp_register(1, -0.5);
    let _ = ctx.run_to_end();

    assert_eq!(ctx.sim.stats().branch_mispredictions, 1);
}
