//! Out-of-order pipeline implementation.
//!
//! This module contains the speculative machinery of the core:
//! 1. **ROB:** Circular, tag-addressed buffer enforcing in-order commit.
//! 2. **Reservation Stations:** Per-class pools of renamed, waiting operations.
//! 3. **Disambiguation:** Store-to-load ordering and forwarding checks.
//! 4. **Stages:** Commit, writeback, execute and issue procedures.
//! 5. **Engine:** Composition of the stages into one cycle, plus squash.

/// Store-to-load disambiguation.
pub mod disambiguation;

/// Cycle composition and squash recovery.
pub mod engine;

/// Reservation-station pools.
pub mod reservation;

/// Reorder buffer.
pub mod rob;

/// Pipeline stage implementations (commit, writeback, execute, issue).
pub mod stages;

pub use engine::{CycleReport, Engine};
