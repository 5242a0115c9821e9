//! Architectural state.
//!
//! This module contains the state visible to software: the renamable
//! integer and floating-point register banks.

/// Renamable register file (committed value + outstanding producer tag).
pub mod regfile;

pub use regfile::{RegisterEntry, RegisterFile};
