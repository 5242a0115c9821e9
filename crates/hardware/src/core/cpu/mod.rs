//! CPU architectural state.
//!
//! This module defines the central `Cpu` structure, the context object every
//! pipeline stage receives. It owns:
//! 1. **Architectural State:** Register file, program counter and data memory.
//! 2. **Instruction Memory:** The relocated, immutable program and its base address.
//! 3. **Cycle Bookkeeping:** Cycle counter, end-of-program and memory-interlock flags.
//! 4. **Diagnostics:** Statistics and the committed/squashed instruction log.
//!
//! The reorder buffer, reservation stations and lanes are owned by the
//! execution engine and only reached through the stage functions.

use tracing::debug;

use crate::common::{INSTRUCTION_WIDTH, SimError};
use crate::config::Config;
use crate::core::arch::RegisterFile;
use crate::core::pipeline::rob::{RobEntry, StageTimes};
use crate::core::units::memory::DataMemory;
use crate::isa::{Instruction, Program};
use crate::stats::SimStats;

/// One retired or squashed instruction, as recorded in the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstructionRecord {
    /// The static instruction.
    pub inst: Instruction,
    /// Cycles at which it entered each stage.
    pub times: StageTimes,
    /// Discarded by a misprediction squash instead of committing.
    pub squashed: bool,
}

impl InstructionRecord {
    /// Records a ROB entry leaving the machine.
    pub const fn from_entry(entry: &RobEntry, squashed: bool) -> Self {
        Self {
            inst: entry.dyn_inst.inst,
            times: entry.dyn_inst.times,
            squashed,
        }
    }
}

/// Architectural and bookkeeping state shared by all pipeline stages.
#[derive(Debug)]
pub struct Cpu {
    /// Integer and floating-point registers.
    pub regs: RegisterFile,
    /// Address of the next instruction to fetch.
    pub pc: u32,
    /// Data memory.
    pub memory: DataMemory,
    /// Current cycle; the first stepped cycle is 1.
    pub cycle: u64,
    /// `EOP` was fetched; issue stops until a squash redirects fetch.
    pub eop_reached: bool,
    /// A committing store is draining to memory.
    pub mem_block: bool,
    /// Loads wait for `mem_block` to clear before using the memory unit.
    pub store_interlock: bool,
    /// Emit one `info` event per committed instruction.
    pub trace: bool,
    /// Performance statistics.
    pub stats: SimStats,
    /// Every instruction that left the machine, in order.
    pub log: Vec<InstructionRecord>,
    program: Program,
    base: u32,
}

impl Cpu {
    /// Creates the CPU for `program` loaded at `config.general.base_address`.
    pub fn new(program: &Program, config: &Config) -> Self {
        let base = config.general.base_address;
        Self {
            regs: RegisterFile::new(),
            pc: base,
            memory: DataMemory::new(config.memory.size),
            cycle: 0,
            eop_reached: false,
            mem_block: false,
            store_interlock: config.pipeline.store_interlock,
            trace: config.general.trace,
            stats: SimStats::default(),
            log: Vec::new(),
            program: program.relocated(base),
            base,
        }
    }

    /// Program base address.
    #[inline]
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// The relocated program.
    #[inline]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// Fetches the instruction at `pc`.
    pub fn fetch(&self, pc: u32) -> Result<Instruction, SimError> {
        let index = (i64::from(pc) - i64::from(self.base)) / i64::from(INSTRUCTION_WIDTH);
        usize::try_from(index)
            .ok()
            .and_then(|i| self.program.get(i))
            .copied()
            .ok_or(SimError::FetchOutOfBounds { pc, index })
    }

    /// Restores the power-on state: registers and memory UNDEFINED, pc at the
    /// base address, counters and log cleared.
    pub fn reset(&mut self) {
        debug!(base = self.base, "cpu reset");
        self.regs = RegisterFile::new();
        self.pc = self.base;
        self.memory.reset();
        self.cycle = 0;
        self.eop_reached = false;
        self.mem_block = false;
        self.stats = SimStats::default();
        self.log.clear();
    }
}
