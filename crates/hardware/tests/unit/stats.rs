//! Statistics counters and rendered reports.

use ooosim_core::config::Config;
use ooosim_core::sim::report;
use ooosim_core::stats::STATS_SECTIONS;

use crate::common::TestContext;

const MIXED: &str = "
        ADDI R1 R0 0x40
        SW   R1 0(R1)
        LW   R2 0(R1)
        BEQZ R0 end
        ADDI R3 R0 1
  end:  EOP";

#[test]
fn test_counters_add_up() {
    let mut ctx = TestContext::asm(MIXED, Config::default());
    let cycles = ctx.run_to_end();
    let s = ctx.sim.stats();

    assert_eq!(s.cycles, cycles);
    assert_eq!(s.instructions_committed, 4);
    assert_eq!(s.inst_alu + s.inst_load + s.inst_store + s.inst_branch, s.instructions_committed);
    assert_eq!((s.inst_alu, s.inst_load, s.inst_store, s.inst_branch), (1, 1, 1, 1));
    assert_eq!(s.loads_bypassed, 1);
    assert_eq!(s.branch_mispredictions, 1);
    assert!((ctx.sim.ipc() - 4.0 / cycles as f64).abs() < 1e-9);
}

#[test]
fn test_stats_serialize_to_json() {
    let mut ctx = TestContext::asm(MIXED, Config::default());
    let _ = ctx.run_to_end();

    let json = serde_json::to_value(ctx.sim.stats()).unwrap();
    assert_eq!(json["instructions_committed"], 4);
    assert_eq!(json["loads_bypassed"], 1);
    assert!(json.get("start_time").is_none());
}

#[test]
fn test_render_selected_sections() {
    let mut ctx = TestContext::asm(MIXED, Config::default());
    let _ = ctx.run_to_end();
    let stats = ctx.sim.stats();

    let all = stats.render_sections(&[]);
    assert!(all.contains("sim_cycles"));
    assert!(all.contains("bp.mispredicts         1"));
    assert!(all.contains("stalls.rob_full"));

    let only = stats.render_sections(&["speculation".to_string()]);
    assert!(only.contains("loads.bypassed         1"));
    assert!(!only.contains("sim_cycles"));
    assert!(STATS_SECTIONS.contains(&"speculation"));
}

#[test]
fn test_status_report_mid_run() {
    let mut ctx = TestContext::asm(MIXED, Config::default());
    let _ = ctx.step();
    let _ = ctx.step();

    let status = report::status(&ctx.sim);
    assert!(status.contains("PENDING INSTRUCTIONS STATUS"));
    assert!(status.contains("REORDER BUFFER"));
    assert!(status.contains("GENERAL PURPOSE REGISTERS"));

    let _ = ctx.run_to_end();
    let log = report::log(&ctx.sim);
    assert!(log.contains("EXECUTION LOG"));
    let dump = report::memory(&ctx.sim, 0x40, 0x44).unwrap();
    assert!(dump.contains("0x00000040: 40 00 00 00"));
}
