//! Core processor implementation.
//!
//! This module contains the out-of-order core: architectural state, the
//! speculative pipeline structures and stages, and the execution units
//! those stages drive.

/// Architectural register file with renaming tags.
pub mod arch;

/// CPU architectural state and instruction log.
pub mod cpu;

/// ROB, reservation stations, disambiguation, stages and the engine.
pub mod pipeline;

/// Execution units (ALU, branch resolution, lanes, data memory).
pub mod units;

pub use self::cpu::Cpu;
