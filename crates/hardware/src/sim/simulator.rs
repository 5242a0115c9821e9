//! Simulator: owns the CPU state and the execution engine side-by-side.
//!
//! The CPU holds architectural state (registers, memory, pc, statistics) and
//! the engine holds the speculative structures. Keeping them as siblings lets
//! every stage borrow both mutably without interior mutability.

use tracing::debug;

use crate::common::SimError;
use crate::config::Config;
use crate::core::Cpu;
use crate::core::cpu::InstructionRecord;
use crate::core::pipeline::reservation::Operand;
use crate::core::pipeline::rob::{RobTag, Stage};
use crate::core::pipeline::stages::CommitOutcome;
use crate::core::pipeline::{CycleReport, Engine};
use crate::core::units::lanes::LaneOp;
use crate::isa::instruction::Reg;
use crate::isa::{ExecUnit, Instruction, Program, StationKind};
use crate::stats::SimStats;

/// Result of stepping one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Work remains.
    Running(CycleReport),
    /// A mispredicted branch committed and fetch was redirected.
    Squashed {
        /// New program counter.
        target: u32,
    },
    /// End of program reached and every in-flight instruction retired.
    Finished,
}

/// One live ROB slot as seen by observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RobSlotView {
    /// Slot index (the entry's tag).
    pub tag: usize,
    /// Instruction address.
    pub pc: u32,
    /// Result computed.
    pub ready: bool,
    /// Most recent stage.
    pub stage: Stage,
    /// Destination register of a register-writing instruction.
    pub dest_reg: Option<Reg>,
    /// Store address, if known.
    pub dest: Option<u32>,
    /// Result or resolved target.
    pub value: u32,
    /// Taken branch.
    pub mis_pred: bool,
}

/// One occupied reservation station as seen by observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StationView {
    /// Pool the station belongs to.
    pub kind: StationKind,
    /// Position within the pool.
    pub index: usize,
    /// Allocation order.
    pub id: u64,
    /// Instruction address.
    pub pc: u32,
    /// Operand values (`Vj`, `Vk`), `None` while pending.
    pub values: [Option<u32>; 2],
    /// Operand tags (`Qj`, `Qk`), `None` once resolved.
    pub waiting: [Option<usize>; 2],
    /// Own ROB tag.
    pub dest: usize,
    /// Effective address of a memory operation.
    pub addr: Option<u32>,
    /// Handed to a lane.
    pub in_exec: bool,
}

/// One execution lane as seen by observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneView {
    /// Unit class.
    pub unit: ExecUnit,
    /// Lane index within the class.
    pub index: usize,
    /// Remaining countdown.
    pub ttl: u32,
    /// Tag of the occupying operation.
    pub tag: Option<usize>,
    /// Result computed, waiting for writeback.
    pub done: bool,
}

/// Top-level simulator: CPU architectural state + execution engine.
#[derive(Debug)]
pub struct Simulator {
    cpu: Cpu,
    engine: Engine,
    config: Config,
}

impl Simulator {
    /// Builds a simulator for `program` after validating `config`.
    pub fn new(program: &Program, config: Config) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            cpu: Cpu::new(program, &config),
            engine: Engine::new(&config),
            config,
        })
    }

    /// The configuration the simulator was built with.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Advances the simulator by one clock cycle.
    ///
    /// After an error the machine state is undefined and the simulator must
    /// not be stepped again.
    pub fn step(&mut self) -> Result<StepOutcome, SimError> {
        if self.is_finished() {
            return Ok(StepOutcome::Finished);
        }
        let report = self.engine.tick(&mut self.cpu)?;
        Ok(match report.commit {
            CommitOutcome::Squash { target } => StepOutcome::Squashed { target },
            _ if self.is_finished() => StepOutcome::Finished,
            _ => StepOutcome::Running(report),
        })
    }

    /// Steps until the program finishes or `max_cycles` cycles have run.
    /// Returns the number of cycles stepped.
    pub fn run(&mut self, max_cycles: Option<u64>) -> Result<u64, SimError> {
        let mut stepped = 0;
        while !self.is_finished() && max_cycles.is_none_or(|max| stepped < max) {
            let _ = self.step()?;
            stepped += 1;
        }
        debug!(stepped, finished = self.is_finished(), "run stopped");
        Ok(stepped)
    }

    /// `EOP` was fetched and nothing is left in flight.
    pub fn is_finished(&self) -> bool {
        self.cpu.eop_reached && self.engine.is_drained()
    }

    /// Restores the power-on state without reloading the program.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.engine.reset();
    }

    /// Committed value of integer register `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not a register number.
    pub fn int_register(&self, n: usize) -> i32 {
        self.cpu.regs.value(Reg::int(n)) as i32
    }

    /// Committed value of floating-point register `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not a register number.
    pub fn fp_register(&self, n: usize) -> f32 {
        f32::from_bits(self.cpu.regs.value(Reg::fp(n)))
    }

    /// Overwrites integer register `n` (writes to `R0` are dropped).
    ///
    /// # Panics
    ///
    /// Panics if `n` is not a register number.
    pub fn set_int_register(&mut self, n: usize, value: i32) {
        self.cpu.regs.write(Reg::int(n), value as u32);
    }

    /// Overwrites floating-point register `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not a register number.
    pub fn set_fp_register(&mut self, n: usize, value: f32) {
        self.cpu.regs.write(Reg::fp(n), value.to_bits());
    }

    /// ROB tag of the outstanding producer of integer register `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not a register number.
    pub fn pending_int_register(&self, n: usize) -> Option<RobTag> {
        self.cpu.regs.producer(Reg::int(n))
    }

    /// ROB tag of the outstanding producer of floating-point register `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not a register number.
    pub fn pending_fp_register(&self, n: usize) -> Option<RobTag> {
        self.cpu.regs.producer(Reg::fp(n))
    }

    /// Reads the data-memory word at `addr`.
    pub fn read_memory(&self, addr: u32) -> Result<u32, SimError> {
        self.cpu.memory.read_u32(addr)
    }

    /// Writes the data-memory word at `addr`.
    pub fn write_memory(&mut self, addr: u32, value: u32) -> Result<(), SimError> {
        self.cpu.memory.write_u32(addr, value)
    }

    /// Live ROB entries from head to tail.
    pub fn rob_snapshot(&self) -> Vec<RobSlotView> {
        self.engine
            .rob
            .iter()
            .map(|e| RobSlotView {
                tag: e.tag.0,
                pc: e.inst().pc,
                ready: e.ready,
                stage: e.dyn_inst.stage,
                dest_reg: e.inst().dst.filter(|_| e.inst().info().writes_dest()),
                dest: e.dest,
                value: e.value,
                mis_pred: e.mis_pred,
            })
            .collect()
    }

    /// ROB capacity.
    pub fn rob_capacity(&self) -> usize {
        self.engine.rob.capacity()
    }

    /// Occupied reservation stations, pool by pool in allocation order.
    pub fn station_snapshot(&self) -> Vec<StationView> {
        let mut views = Vec::new();
        for pool in self.engine.stations.pools() {
            for (index, e) in pool.entries().iter().enumerate() {
                views.push(StationView {
                    kind: pool.kind(),
                    index,
                    id: e.id,
                    pc: e.inst.pc,
                    values: e.ops.map(Operand::value),
                    waiting: e.ops.map(|op| op.tag().map(|t| t.0)),
                    dest: e.tag.0,
                    addr: e.addr,
                    in_exec: e.in_exec,
                });
            }
        }
        views
    }

    /// Station capacity of one pool.
    pub fn station_capacity(&self, kind: StationKind) -> usize {
        self.engine.stations.pool(kind).capacity()
    }

    /// Every lane of every unit class.
    pub fn lane_snapshot(&self) -> Vec<LaneView> {
        let mut views = Vec::new();
        for unit in self.engine.units.units() {
            for (index, lane) in unit.lanes().iter().enumerate() {
                views.push(LaneView {
                    unit: unit.unit(),
                    index,
                    ttl: lane.ttl,
                    tag: lane.op.as_ref().map(|op| op.tag.0),
                    done: lane.op.as_ref().is_some_and(LaneOp::is_done),
                });
            }
        }
        views
    }

    /// Operations waiting in the bypass lane.
    pub fn bypass_len(&self) -> usize {
        self.engine.units.bypass.ops().len()
    }

    /// Every instruction that committed or was squashed, in order.
    pub fn instruction_log(&self) -> &[InstructionRecord] {
        &self.cpu.log
    }

    /// Instructions currently in the ROB, oldest first.
    pub fn pending_instructions(&self) -> Vec<InstructionRecord> {
        self.engine
            .rob
            .iter()
            .map(|e| InstructionRecord::from_entry(e, false))
            .collect()
    }

    /// The loaded program.
    pub fn program(&self) -> &[Instruction] {
        self.cpu.program().instructions()
    }

    /// Performance counters.
    pub const fn stats(&self) -> &SimStats {
        &self.cpu.stats
    }

    /// Cycles stepped since construction or reset.
    pub const fn cycles(&self) -> u64 {
        self.cpu.cycle
    }

    /// Committed instructions (`EOP` excluded).
    pub const fn instructions_executed(&self) -> u64 {
        self.cpu.stats.instructions_committed
    }

    /// Committed instructions per cycle.
    pub fn ipc(&self) -> f64 {
        self.cpu.stats.ipc()
    }

    /// Address of the next instruction to fetch.
    pub const fn pc(&self) -> u32 {
        self.cpu.pc
    }

    /// A committing store holds the memory interlock.
    pub const fn memory_blocked(&self) -> bool {
        self.cpu.mem_block
    }
}
