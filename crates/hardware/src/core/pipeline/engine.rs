//! Out-of-order execution engine.
//!
//! The engine owns the speculative structures (ROB, reservation stations and
//! execution lanes) and composes the four stages into one cycle:
//! 1. **Tick:** commit, writeback, execute, issue, then end-of-cycle finalize.
//! 2. **Squash:** Discards every speculative structure and redirects fetch.
//!
//! Only the stage functions and the squash path mutate these structures; the
//! driver sees them through read-only accessors.

use tracing::debug;

use crate::common::SimError;
use crate::config::Config;
use crate::core::Cpu;
use crate::core::cpu::InstructionRecord;
use crate::core::pipeline::reservation::Stations;
use crate::core::pipeline::rob::Rob;
use crate::core::pipeline::stages::{
    CommitOutcome, commit_stage, execute_stage, issue_stage, writeback_stage,
};
use crate::core::units::lanes::ExecUnits;
use crate::isa::StationKind;

/// Summary of one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleReport {
    /// What commit did.
    pub commit: CommitOutcome,
    /// Results broadcast by writeback.
    pub written_back: usize,
    /// Instructions issued.
    pub issued: usize,
}

/// ROB, reservation stations and lanes of the out-of-order core.
#[derive(Debug)]
pub struct Engine {
    /// Reorder buffer.
    pub rob: Rob,
    /// Reservation-station pools.
    pub stations: Stations,
    /// Timed lanes and the bypass lane.
    pub units: ExecUnits,
    issue_width: usize,
    memory_latency: u32,
}

impl Engine {
    /// Builds empty structures sized by `config`.
    pub fn new(config: &Config) -> Self {
        let p = &config.pipeline;
        let mut capacities = [0; 4];
        capacities[StationKind::Int.index()] = p.int_stations;
        capacities[StationKind::Add.index()] = p.add_stations;
        capacities[StationKind::Mult.index()] = p.mult_stations;
        capacities[StationKind::Load.index()] = p.load_stations;

        let units = &config.units;
        Self {
            rob: Rob::new(p.rob_size),
            stations: Stations::new(capacities),
            units: ExecUnits::new(|unit| {
                let u = units.get(unit);
                (u.latency, u.instances)
            }),
            issue_width: p.issue_width,
            memory_latency: config.units.memory.latency,
        }
    }

    /// Runs one cycle of every stage.
    pub fn tick(&mut self, cpu: &mut Cpu) -> Result<CycleReport, SimError> {
        cpu.cycle += 1;
        cpu.stats.cycles = cpu.cycle;

        let commit = commit_stage(cpu, &mut self.rob, self.memory_latency)?;
        if let CommitOutcome::Squash { target } = commit {
            // Fetch resumes at the target next cycle.
            self.squash(cpu, target);
            return Ok(CycleReport {
                commit,
                written_back: 0,
                issued: 0,
            });
        }

        let written_back = writeback_stage(cpu, &mut self.rob, &mut self.stations, &mut self.units);
        execute_stage(cpu, &mut self.rob, &mut self.stations, &mut self.units)?;
        let issued = issue_stage(cpu, &mut self.rob, &mut self.stations, self.issue_width)?;

        let _ = self.stations.finalize();
        Ok(CycleReport {
            commit,
            written_back,
            issued,
        })
    }

    /// Discards all speculative state and redirects fetch to `target`.
    ///
    /// Lanes and the bypass lane are cleared, every pool is emptied, every
    /// remaining ROB entry is logged as squashed and every busy flag is
    /// cleared.
    pub fn squash(&mut self, cpu: &mut Cpu, target: u32) {
        self.units.clear();
        self.stations.clear();
        let drained = self.rob.flush_all();
        cpu.stats.instructions_squashed += drained.len() as u64;
        cpu.log
            .extend(drained.iter().map(|e| InstructionRecord::from_entry(e, true)));
        cpu.regs.clear_busy();
        cpu.mem_block = false;
        cpu.eop_reached = false;
        debug!(cycle = cpu.cycle, target, squashed = drained.len(), "squash");
        cpu.pc = target;
    }

    /// No instruction is in flight.
    pub fn is_drained(&self) -> bool {
        self.rob.is_empty() && self.stations.is_empty() && !self.units.is_busy()
    }

    /// Empties every structure.
    pub fn reset(&mut self) {
        self.units.clear();
        self.stations.clear();
        let _ = self.rob.flush_all();
    }
}
