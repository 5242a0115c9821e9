//! Register renaming, tag forwarding and write-after-write handling.

use ooosim_core::config::Config;
use ooosim_core::core::pipeline::rob::RobTag;
use pretty_assertions::assert_eq;

use crate::common::TestContext;

#[test]
fn test_consumer_waits_on_producer_tag() {
    let mut ctx = TestContext::asm(
        "DIV  R1 R2 R3
         ADDI R4 R1 1
         EOP",
        Config::default(),
    );
    ctx.sim.set_int_register(2, 20);
    ctx.sim.set_int_register(3, 5);
    let _ = ctx.step();

    let rob = ctx.sim.rob_snapshot();
    let div = rob.iter().find(|e| e.pc == 0).unwrap();
    let addi = ctx.sim.station_snapshot().into_iter().find(|s| s.pc == 4).unwrap();
    assert_eq!(addi.waiting[0], Some(div.tag));
    assert_eq!(addi.values[0], None);
    assert_eq!(addi.values[1], Some(1));
    assert_eq!(ctx.sim.pending_int_register(1), Some(RobTag(div.tag)));
    assert_eq!(ctx.sim.pending_int_register(4), Some(RobTag(addi.dest)));

    let _ = ctx.run_to_end();
    assert_eq!(ctx.reg(1), 4);
    assert_eq!(ctx.reg(4), 5);
}

#[test]
fn test_later_writer_keeps_register_busy() {
    let mut ctx = TestContext::asm(
        "DIV  R1 R2 R3
         ADDI R1 R0 7
         EOP",
        Config::default(),
    );
    ctx.sim.set_int_register(2, 10);
    ctx.sim.set_int_register(3, 2);

    let _ = ctx.step();
    let addi_tag = ctx.sim.rob_snapshot().iter().find(|e| e.pc == 4).unwrap().tag;
    assert_eq!(ctx.sim.pending_int_register(1), Some(RobTag(addi_tag)));

    // Stop once the divide has left the ROB.
    let _ = ctx.step_until(|_, sim| !sim.rob_snapshot().iter().any(|e| e.pc == 0));
    assert!(ctx.sim.rob_snapshot().iter().any(|e| e.pc == 4));
    assert_eq!(ctx.reg(1), 5);
    assert_eq!(ctx.sim.pending_int_register(1), Some(RobTag(addi_tag)));

    let _ = ctx.run_to_end();
    assert_eq!(ctx.reg(1), 7);
    assert_eq!(ctx.sim.pending_int_register(1), None);
}

#[test]
fn test_squashed_younger_writer_leaves_older_value() {
    let mut ctx = TestContext::asm(
        "      DIV  R1 R2 R3
               BEQZ R0 skip
               ADDI R1 R0 9
         skip: EOP",
        Config::default(),
    );
    ctx.sim.set_int_register(2, 10);
    ctx.sim.set_int_register(3, 2);

    let _ = ctx.step_until(|_, sim| sim.rob_snapshot().iter().any(|e| e.pc == 8));
    let addi_tag = ctx.sim.rob_snapshot().iter().find(|e| e.pc == 8).unwrap().tag;
    assert_eq!(ctx.sim.pending_int_register(1), Some(RobTag(addi_tag)));

    // The divide commits under a stale tag: the value lands, the busy flag stays.
    let _ = ctx.step_until(|_, sim| !sim.rob_snapshot().iter().any(|e| e.pc == 0));
    assert_eq!(ctx.reg(1), 5);
    assert_eq!(ctx.sim.pending_int_register(1), Some(RobTag(addi_tag)));

    let _ = ctx.run_to_end();
    assert_eq!(ctx.reg(1), 5);
    assert_eq!(ctx.sim.pending_int_register(1), None);
    assert_eq!(ctx.sim.stats().instructions_squashed, 1);
}

#[test]
fn test_ready_uncommitted_value_is_forwarded_at_issue() {
    let mut config = Config::default();
    config.pipeline.issue_width = 1;
    let mut ctx = TestContext::asm(
        "DIV  R5 R6 R7
         ADDI R1 R0 9
         NOP
         NOP
         ADD  R2 R1 R1
         EOP",
        config,
    );
    ctx.sim.set_int_register(6, 1);
    ctx.sim.set_int_register(7, 1);

    // The ADD issues while ADDI is finished but stuck behind the divide.
    let _ = ctx.step_until(|_, sim| sim.station_snapshot().iter().any(|s| s.pc == 16));
    let add = ctx.sim.station_snapshot().into_iter().find(|s| s.pc == 16).unwrap();
    assert_eq!(add.values, [Some(9), Some(9)]);
    assert_eq!(add.waiting, [None, None]);
    assert!(ctx.sim.rob_snapshot().iter().any(|e| e.pc == 4 && e.ready));

    let _ = ctx.run_to_end();
    assert_eq!(ctx.reg(2), 18);
}

#[test]
fn test_r0_is_never_renamed() {
    let mut ctx = TestContext::asm(
        "ADDI R0 R0 5
         ADD  R1 R0 R0
         EOP",
        Config::default(),
    );
    let _ = ctx.step();
    assert_eq!(ctx.sim.pending_int_register(0), None);
    let _ = ctx.run_to_end();
    assert_eq!(ctx.reg(0), 0);
    assert_eq!(ctx.reg(1), 0);
}

#[test]
fn test_fp_and_int_banks_rename_independently() {
    let mut ctx = TestContext::asm(
        "ADDI R1 R0 3
         ADDS F1 F2 F3
         EOP",
        Config::default(),
    );
    ctx.sim.set_fp_register(2, 1.5);
    ctx.sim.set_fp_register(3, 2.0);
    let _ = ctx.step();

    let r1 = ctx.sim.pending_int_register(1).unwrap();
    let f1 = ctx.sim.pending_fp_register(1).unwrap();
    assert_ne!(r1, f1);

    let _ = ctx.run_to_end();
    assert_eq!(ctx.reg(1), 3);
    assert_eq!(ctx.sim.fp_register(1), 3.5);
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn test_set_register_out_of_range_panics() {
    let mut ctx = TestContext::asm("EOP", Config::default());
    ctx.sim.set_int_register(32, 1);
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn test_pending_register_out_of_range_panics() {
    let ctx = TestContext::asm("EOP", Config::default());
    let _ = ctx.sim.pending_fp_register(32);
}
