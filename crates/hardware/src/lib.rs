//! Out-of-order processor scheduling core.
//!
//! This crate implements a cycle-stepped Tomasulo-style core with the following:
//! 1. **ISA:** A consolidated opcode table, decoded instructions and an assembler.
//! 2. **Core:** Register renaming, reorder buffer, reservation stations and timed lanes.
//! 3. **Memory Ordering:** Store-to-load disambiguation with forwarding.
//! 4. **Recovery:** In-order commit with squash on branch misprediction.
//! 5. **Simulation:** Configuration, statistics, status reports and the driver API.
//!
//! # Examples
//!
//! ```
//! use ooosim_core::{Config, Simulator, isa::asm};
//!
//! let program = asm::parse("ADDI R1 R0 5\nADDI R2 R0 7\nADD R3 R1 R2\nEOP").unwrap();
//! let mut sim = Simulator::new(&program, Config::default()).unwrap();
//! sim.run(None).unwrap();
//! assert_eq!(sim.int_register(3), 12);
//! assert_eq!(sim.instructions_executed(), 3);
//! ```

/// Common constants, bit conversions and the fatal error type.
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// Out-of-order core (register file, pipeline structures, stages, units).
pub mod core;
/// Instruction set (opcode table, instructions, assembler).
pub mod isa;
/// Simulator context and status reports.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Fatal simulator error.
pub use crate::common::SimError;
/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Finalized instruction sequence consumed by the simulator.
pub use crate::isa::Program;
/// Main simulator type; owns CPU state and the execution engine.
pub use crate::sim::Simulator;
