//! Store-to-load disambiguation.
//!
//! A load with a known address scans the older part of the ROB from its own
//! position toward the head. The nearest older store that could touch the
//! same word decides the outcome:
//! 1. **Unknown address:** the store might alias, so the load waits.
//! 2. **Matching address, value ready:** the store's value is forwarded.
//! 3. **Matching address, value pending:** the load waits.
//!
//! Stores with a known, different address are transparent.

use crate::common::SimError;
use crate::core::pipeline::rob::{Rob, RobTag};

/// Outcome of a disambiguation scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemOrdering {
    /// No older store aliases; read data memory.
    Clear,
    /// The nearest aliasing store already holds this value.
    Bypass(u32),
    /// An older store might alias or has not produced its value yet.
    Conflict,
}

/// Classifies the load tagged `load` at address `addr` against every older
/// in-flight store.
pub fn disambiguate(rob: &Rob, load: RobTag, addr: u32) -> Result<MemOrdering, SimError> {
    let pos = rob
        .position(load)
        .ok_or(SimError::CorruptRobScan { tag: load.0 })?;

    for n in (0..pos).rev() {
        let Some(entry) = rob.nth(n) else {
            return Err(SimError::CorruptRobScan { tag: load.0 });
        };
        if !entry.inst().is_store() {
            continue;
        }
        match entry.dest {
            None => return Ok(MemOrdering::Conflict),
            Some(dest) if dest == addr => {
                return Ok(if entry.ready {
                    MemOrdering::Bypass(entry.value)
                } else {
                    MemOrdering::Conflict
                });
            }
            Some(_) => {}
        }
    }
    Ok(MemOrdering::Clear)
}
