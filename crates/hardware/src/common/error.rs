//! Fatal simulator conditions.
//!
//! Every variant represents a violated internal invariant or a malformed
//! program/configuration, never a normal hazard. Full ROBs, full reservation
//! stations, aliasing loads and unresolved branches are backpressure and are
//! handled by stalling; branch mispredictions are handled by the squash path.

use thiserror::Error;

use crate::isa::Opcode;

/// Fatal error raised by a pipeline stage or by the simulator context.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimError {
    /// The program counter points outside instruction memory.
    #[error("out of bound access of instruction memory: pc={pc:#010x} index={index}")]
    FetchOutOfBounds {
        /// Program counter that was fetched.
        pc: u32,
        /// Instruction index derived from `(pc - base) / 4`.
        index: i64,
    },

    /// An opcode reached a component that has no rule for it.
    #[error("opcode {0} is not supported by this unit")]
    UnsupportedOpcode(Opcode),

    /// More than one memory-class operation completed in a single cycle.
    #[error("structural hazard at memory: {completions} completions in cycle {cycle}")]
    StructuralHazard {
        /// Cycle in which the hazard was detected.
        cycle: u64,
        /// Number of memory completions observed.
        completions: usize,
    },

    /// A pop was attempted on an empty reorder buffer.
    #[error("reorder buffer underflow")]
    RobUnderflow,

    /// A disambiguation scan did not find the querying load in the ROB.
    #[error("corrupted ROB scan: load tag {tag} not found")]
    CorruptRobScan {
        /// ROB tag of the load that issued the scan.
        tag: usize,
    },

    /// A store reached commit without an effective address.
    #[error("store at pc={pc:#010x} committed without an address")]
    MissingStoreAddress {
        /// Program counter of the store.
        pc: u32,
    },

    /// A data-memory access fell outside the configured memory.
    #[error("memory access out of range: {addr:#010x} (size {size:#x})")]
    MemoryOutOfBounds {
        /// Faulting byte address.
        addr: u32,
        /// Configured memory size in bytes.
        size: usize,
    },

    /// A data-memory access was not aligned to a word boundary.
    #[error("unaligned memory access: {0:#010x}")]
    UnalignedAccess(u32),

    /// The configuration cannot describe a working machine.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
