//! Branch Resolution Unit.
//!
//! Fetch follows a static "always not taken" policy, so every taken branch
//! and every `JUMP` is a misprediction. Resolution produces the next pc the
//! program should have fetched; commit squashes when `mis_pred` is set.

use crate::common::SimError;
use crate::core::units::lanes::LaneResult;
use crate::isa::Instruction;

/// Resolves a branch whose condition operand is `operand`.
///
/// The result value is the branch target when taken and the fall-through
/// address otherwise.
pub fn resolve(inst: &Instruction, operand: u32, is_float: bool) -> Result<LaneResult, SimError> {
    let cond = inst
        .info()
        .branch
        .ok_or(SimError::UnsupportedOpcode(inst.opcode))?;
    Ok(if cond.taken(operand, is_float) {
        LaneResult {
            value: inst.branch_target(),
            mis_pred: true,
            fault: None,
        }
    } else {
        LaneResult::value(inst.npc())
    })
}
