//! Simulation driver interface.
//!
//! Provides the [`Simulator`] context that owns the CPU state and the
//! execution engine, plus read-only text reports of its state.

/// Status and memory reports.
pub mod report;

/// The simulator context.
pub mod simulator;

pub use simulator::{LaneView, RobSlotView, Simulator, StationView, StepOutcome};
