//! Simulator harness.
//!
//! `TestContext` owns a `Simulator`, installs a test log subscriber once, and
//! checks the cross-structure invariants after every cycle it drives.

use ooosim_core::config::Config;
use ooosim_core::isa::{Program, asm};
use ooosim_core::sim::{Simulator, StepOutcome};

/// Cycle budget after which a test is considered hung.
pub const MAX_CYCLES: u64 = 10_000;

pub struct TestContext {
    pub sim: Simulator,
}

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A config with room for everything: wide issue, big ROB, many lanes.
pub fn ample() -> Config {
    let mut c = Config::default();
    c.pipeline.rob_size = 32;
    c.pipeline.issue_width = 4;
    c.pipeline.int_stations = 8;
    c.pipeline.add_stations = 8;
    c.pipeline.mult_stations = 8;
    c.pipeline.load_stations = 8;
    c.units.integer.instances = 4;
    c.units.adder.instances = 4;
    c.units.multiplier.instances = 4;
    c.units.divider.instances = 4;
    c
}

impl TestContext {
    pub fn new(program: &Program, config: Config) -> Self {
        init_logging();
        let sim = Simulator::new(program, config).expect("valid config");
        Self { sim }
    }

    pub fn asm(source: &str, config: Config) -> Self {
        Self::new(&asm::parse(source).expect("program assembles"), config)
    }

    pub fn reg(&self, n: usize) -> i32 {
        self.sim.int_register(n)
    }

    /// Steps one cycle and checks invariants.
    pub fn step(&mut self) -> StepOutcome {
        let outcome = self.sim.step().expect("no fatal error");
        self.check_invariants();
        outcome
    }

    /// Steps until the program finishes; panics if it hangs.
    pub fn run_to_end(&mut self) -> u64 {
        while !self.sim.is_finished() {
            assert!(self.sim.cycles() < MAX_CYCLES, "program did not finish");
            let _ = self.step();
        }
        self.sim.cycles()
    }

    /// Steps until `pred` holds after a cycle; panics if it never does.
    pub fn step_until(&mut self, mut pred: impl FnMut(&StepOutcome, &Simulator) -> bool) -> StepOutcome {
        loop {
            assert!(self.sim.cycles() < MAX_CYCLES, "condition never reached");
            let outcome = self.step();
            if pred(&outcome, &self.sim) {
                return outcome;
            }
        }
    }

    /// Cross-structure invariants that hold at every cycle boundary:
    /// - the ROB never exceeds its capacity;
    /// - every operand tag a station waits on names a live, unfinished ROB entry;
    /// - no live ROB entry is ready while a station still waits for it;
    /// - every busy register names a live ROB entry.
    pub fn check_invariants(&self) {
        let rob = self.sim.rob_snapshot();
        assert!(rob.len() <= self.sim.rob_capacity());

        for station in self.sim.station_snapshot() {
            for tag in station.waiting.iter().flatten() {
                let producer = rob.iter().find(|e| e.tag == *tag);
                assert!(
                    producer.is_some_and(|p| !p.ready),
                    "station {:?} waits on tag {tag} which is gone or already broadcast",
                    station
                );
            }
        }

        for n in 0..32 {
            for tag in [self.sim.pending_int_register(n), self.sim.pending_fp_register(n)]
                .into_iter()
                .flatten()
            {
                assert!(rob.iter().any(|e| e.tag == tag.0), "register {n} names dead tag {tag}");
            }
        }
    }
}
