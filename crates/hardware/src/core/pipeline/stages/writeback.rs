//! Writeback (WR) Stage.
//!
//! Every lane whose result was computed in an earlier cycle, and every
//! bypass-lane operation, broadcasts `(tag, value)`:
//! 1. to every reservation station waiting on that tag, in every pool;
//! 2. to the ROB entry at that tag, which becomes ready.
//!
//! The producing reservation station is only marked for removal; the pools
//! are compacted at the end of the cycle. Loads and stores whose base
//! operand was just delivered resolve their address here, and stores publish
//! it to the ROB for disambiguation.

use tracing::trace;

use crate::core::Cpu;
use crate::core::pipeline::reservation::Stations;
use crate::core::pipeline::rob::{Rob, Stage};
use crate::core::units::lanes::{ExecUnits, LaneOp};
use crate::isa::ExecUnit;

/// Executes the Writeback stage. Returns the number of results broadcast.
pub fn writeback_stage(
    cpu: &Cpu,
    rob: &mut Rob,
    stations: &mut Stations,
    units: &mut ExecUnits,
) -> usize {
    let mut finished: Vec<LaneOp> = units.bypass.drain();
    for unit in ExecUnit::ALL {
        finished.extend(units.unit_mut(unit).drain_done());
    }

    let mut count = 0;
    for op in finished {
        let Some(result) = op.result else {
            continue;
        };
        if let Some(entry) = rob.get_mut(op.tag) {
            entry.ready = true;
            entry.value = result.value;
            entry.mis_pred = result.mis_pred;
            entry.fault = result.fault;
            if op.inst.is_store() {
                entry.dest = op.addr;
            }
            let _ = entry.dyn_inst.advance(Stage::WriteResult, cpu.cycle);
        }
        let woken = stations.broadcast(op.tag, result.value);
        stations.mark_retiring(op.tag);
        trace!(cycle = cpu.cycle, tag = %op.tag, value = result.value, woken, "writeback {}", op.inst);
        count += 1;
    }

    for (tag, addr) in stations.resolve_addresses() {
        rob.set_store_address(tag, addr);
    }
    count
}
