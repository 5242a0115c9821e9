//! Instruction Set Definitions.
//!
//! Contains the opcode table, the decoded instruction model and the assembly
//! front end that turns program text into a finalized instruction array.
//!
//! # Layout
//!
//! * `opcode`: Opcodes, execution-unit classes and the consolidated per-opcode table.
//! * `instruction`: The immutable decoded instruction and the `Program` container.
//! * `asm`: Text assembler with two-pass label resolution.

/// Assembly text parser producing a `Program`.
pub mod asm;

/// Decoded static instruction and program container.
pub mod instruction;

/// Opcodes and the opcode-indexed property table.
pub mod opcode;

pub use instruction::{Instruction, Program};
pub use opcode::{AluOp, BranchCond, ExecUnit, Format, OpInfo, Opcode, StationKind};
