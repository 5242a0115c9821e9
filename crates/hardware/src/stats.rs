//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the out-of-order core. It provides:
//! 1. **Cycle and IPC:** Total cycles, committed instructions, and derived metrics.
//! 2. **Instruction mix:** Committed counts by category (ALU, load, store, branch).
//! 3. **Speculation:** Branch mispredictions and squashed instructions.
//! 4. **Stalls:** Issue stalls on a full ROB or reservation station, and loads
//!    held back by disambiguation or the store interlock.

use std::time::Instant;

use serde::Serialize;

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Instructions committed (`EOP` excluded, squashed instructions never count).
    pub instructions_committed: u64,

    /// Committed loads.
    pub inst_load: u64,
    /// Committed stores.
    pub inst_store: u64,
    /// Committed branches and jumps.
    pub inst_branch: u64,
    /// Committed ALU operations (everything else, `NOP` included).
    pub inst_alu: u64,

    /// Branches that committed with a mispredicted (taken) outcome.
    pub branch_mispredictions: u64,
    /// Instructions discarded by squashes.
    pub instructions_squashed: u64,
    /// Loads satisfied by store-to-load forwarding.
    pub loads_bypassed: u64,

    /// Issue cycles cut short by a full reorder buffer.
    pub stalls_rob_full: u64,
    /// Issue cycles cut short by a full reservation-station pool.
    pub stalls_rs_full: u64,
    /// Load dispatch attempts held by disambiguation or the store interlock.
    pub stalls_memory: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_committed: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_alu: 0,
            branch_mispredictions: 0,
            instructions_squashed: 0,
            loads_bypassed: 0,
            stalls_rob_full: 0,
            stalls_rs_full: 0,
            stalls_memory: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"instruction_mix"`, `"speculation"`, `"stalls"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "instruction_mix", "speculation", "stalls"];

impl SimStats {
    /// Committed instructions per cycle; 0 before the first cycle.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions_committed as f64 / self.cycles as f64
        }
    }

    /// Renders the requested sections (all of them for an empty slice).
    pub fn render_sections(&self, sections: &[String]) -> String {
        use std::fmt::Write;

        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let cyc = self.cycles.max(1) as f64;
        let instr = self.instructions_committed.max(1) as f64;
        let pct = |n: u64, of: f64| (n as f64 / of) * 100.0;
        let mut out = String::new();

        let _ = writeln!(out, "\n==========================================================");
        let _ = writeln!(out, "OUT-OF-ORDER CORE SIMULATION STATISTICS");
        let _ = writeln!(out, "==========================================================");
        if want("summary") {
            let seconds = self.start_time.elapsed().as_secs_f64();
            let _ = writeln!(out, "host_seconds             {seconds:.4} s");
            let _ = writeln!(out, "sim_cycles               {}", self.cycles);
            let _ = writeln!(out, "sim_insts                {}", self.instructions_committed);
            let _ = writeln!(out, "sim_ipc                  {:.4}", self.ipc());
            let _ = writeln!(out, "sim_cpi                  {:.4}", cyc / instr);
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("instruction_mix") {
            let _ = writeln!(out, "INSTRUCTION MIX");
            for (name, n) in [
                ("op.alu", self.inst_alu),
                ("op.load", self.inst_load),
                ("op.store", self.inst_store),
                ("op.branch", self.inst_branch),
            ] {
                let _ = writeln!(out, "  {name:<22} {n} ({:.2}%)", pct(n, instr));
            }
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("speculation") {
            let _ = writeln!(out, "SPECULATION");
            let _ = writeln!(out, "  bp.mispredicts         {}", self.branch_mispredictions);
            let _ = writeln!(out, "  squashed.insts         {}", self.instructions_squashed);
            let _ = writeln!(out, "  loads.bypassed         {}", self.loads_bypassed);
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("stalls") {
            let _ = writeln!(out, "STALLS");
            for (name, n) in [
                ("stalls.rob_full", self.stalls_rob_full),
                ("stalls.rs_full", self.stalls_rs_full),
                ("stalls.memory", self.stalls_memory),
            ] {
                let _ = writeln!(out, "  {name:<22} {n} ({:.2}%)", pct(n, cyc));
            }
        }
        let _ = writeln!(out, "==========================================================");
        out
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an
    /// empty slice to print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        print!("{}", self.render_sections(sections));
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
