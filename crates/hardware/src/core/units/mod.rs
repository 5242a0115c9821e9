//! Execution units and functional components.
//!
//! This module contains the datapath pieces driven by the pipeline stages:
//! the shared ALU, branch resolution, the timed execution lanes with their
//! bypass lane, and the data memory.

/// Shared integer/floating-point Arithmetic Logic Unit.
pub mod alu;

/// Branch Resolution Unit under a static not-taken policy.
pub mod bru;

/// Timed execution lanes and the bypass lane.
pub mod lanes;

/// Word-addressed data memory.
pub mod memory;
