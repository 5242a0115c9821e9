//! End-to-end programs run to completion.

use ooosim_core::common::UNDEFINED;
use ooosim_core::SimError;
use ooosim_core::config::Config;
use ooosim_core::sim::StepOutcome;
use pretty_assertions::assert_eq;

use crate::common::harness::ample;
use crate::common::{ProgramBuilder, TestContext};

#[test]
fn test_independent_adds_then_sum() {
    let mut ctx = TestContext::asm(
        "ADDI R1 R0 5
         ADDI R2 R0 7
         ADD  R3 R1 R2
         EOP",
        Config::default(),
    );
    let cycles = ctx.run_to_end();

    assert_eq!(ctx.reg(3), 12);
    assert_eq!(cycles, 6);
    assert_eq!(ctx.sim.instructions_executed(), 3);
    assert_eq!(ctx.sim.stats().inst_alu, 3);
}

#[test]
fn test_untouched_registers_stay_undefined() {
    let mut ctx = TestContext::asm("ADDI R1 R0 1\nEOP", Config::default());
    let _ = ctx.run_to_end();

    assert_eq!(ctx.reg(0), 0);
    assert_eq!(ctx.reg(1), 1);
    assert_eq!(ctx.reg(2) as u32, UNDEFINED);
    assert_eq!(ctx.sim.fp_register(4).to_bits(), UNDEFINED);
}

#[test]
fn test_counting_loop() {
    let mut ctx = TestContext::asm(
        "      ADDI R1 R0 5
               ADDI R2 R0 0
         loop: ADD  R2 R2 R1
               SUBI R1 R1 1
               BNEZ R1 loop
               EOP",
        Config::default(),
    );
    let _ = ctx.run_to_end();

    assert_eq!(ctx.reg(1), 0);
    assert_eq!(ctx.reg(2), 15);
    let stats = ctx.sim.stats();
    assert_eq!(stats.instructions_committed, 2 + 5 * 3);
    assert_eq!(stats.inst_branch, 5);
    assert_eq!(stats.branch_mispredictions, 4);
    assert!(stats.instructions_squashed > 0);
}

#[test]
fn test_array_sum_through_memory() {
    let mut ctx = TestContext::asm(
        "      ADDI R1 R0 0x100
               ADDI R2 R0 4
               ADDI R3 R0 0
         loop: LW   R4 0(R1)
               ADD  R3 R3 R4
               ADDI R1 R1 4
               SUBI R2 R2 1
               BNEZ R2 loop
               SW   R3 0x200(R0)
               EOP",
        ample(),
    );
    for (i, v) in [3, 5, 7, 11].into_iter().enumerate() {
        ctx.sim.write_memory(0x100 + 4 * i as u32, v).unwrap();
    }
    let _ = ctx.run_to_end();

    assert_eq!(ctx.reg(3), 26);
    assert_eq!(ctx.sim.read_memory(0x200).unwrap(), 26);
    assert_eq!(ctx.sim.stats().inst_load, 4);
    assert_eq!(ctx.sim.stats().inst_store, 1);
}

#[test]
fn test_builder_program_matches_asm() {
    let program = ProgramBuilder::new()
        .addi(1, 0, 20)
        .addi(2, 0, 22)
        .add(3, 1, 2)
        .sw(3, 8, 0)
        .lw(4, 8, 0)
        .eop()
        .build();
    let mut ctx = TestContext::new(&program, Config::default());
    let _ = ctx.run_to_end();

    assert_eq!(ctx.reg(4), 42);
    assert_eq!(ctx.sim.read_memory(8).unwrap(), 42);
}

#[test]
fn test_nop_commits_as_alu() {
    let mut ctx = TestContext::asm("NOP\nNOP\nEOP", Config::default());
    let _ = ctx.run_to_end();

    assert_eq!(ctx.sim.instructions_executed(), 2);
    assert_eq!(ctx.sim.stats().inst_alu, 2);
}

#[test]
fn test_immediate_eop_finishes() {
    let mut ctx = TestContext::asm("EOP", Config::default());
    assert!(matches!(ctx.step(), StepOutcome::Finished));
    assert_eq!(ctx.sim.instructions_executed(), 0);
    // Stepping a finished machine is a no-op.
    assert!(matches!(ctx.step(), StepOutcome::Finished));
    assert_eq!(ctx.sim.cycles(), 1);
}

#[test]
fn test_relocated_program_runs() {
    let mut config = Config::default();
    config.general.base_address = 0x1000;
    let mut ctx = TestContext::asm(
        "      ADDI R1 R0 1
               BNEZ R1 skip
               ADDI R2 R0 9
         skip: ADDI R3 R0 3
               EOP",
        config,
    );
    assert_eq!(ctx.sim.pc(), 0x1000);
    let _ = ctx.run_to_end();

    assert_eq!(ctx.reg(3), 3);
    assert_eq!(ctx.reg(2) as u32, UNDEFINED);
}

#[test]
fn test_reset_replays_identically() {
    let source = "ADDI R1 R0 3
                  MULT R2 R1 R1
                  SW   R2 0(R0)
                  EOP";
    let mut ctx = TestContext::asm(source, Config::default());
    let first = ctx.run_to_end();
    assert_eq!(ctx.reg(2), 9);

    ctx.sim.reset();
    assert_eq!(ctx.sim.cycles(), 0);
    assert_eq!(ctx.reg(2) as u32, UNDEFINED);
    assert_eq!(ctx.sim.read_memory(0).unwrap(), UNDEFINED);

    let second = ctx.run_to_end();
    assert_eq!(first, second);
    assert_eq!(ctx.reg(2), 9);
}

#[test]
fn test_run_with_cycle_limit() {
    let mut ctx = TestContext::asm("DIV R1 R2 R3\nEOP", Config::default());
    ctx.sim.set_int_register(2, 12);
    ctx.sim.set_int_register(3, 4);

    assert_eq!(ctx.sim.run(Some(2)).unwrap(), 2);
    assert!(!ctx.sim.is_finished());
    let rest = ctx.sim.run(None).unwrap();
    assert!(rest > 0);
    assert!(ctx.sim.is_finished());
    assert_eq!(ctx.reg(1), 3);
}

#[test]
fn test_fetch_past_program_end_is_fatal() {
    let mut ctx = TestContext::asm("ADDI R1 R0 1", Config::default());
    let err = ctx.sim.run(None).unwrap_err();
    assert!(matches!(err, SimError::FetchOutOfBounds { pc: 4, .. }), "{err}");
}
