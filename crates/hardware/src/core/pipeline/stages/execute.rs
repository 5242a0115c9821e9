//! Execute (EXE) Stage.
//!
//! Runs in two phases every cycle:
//! 1. **Dispatch:** Each reservation station whose operands are ready and
//!    that is not yet executing is handed to a free lane of its unit class,
//!    oldest first within each pool. Stores and forwarded loads enter the
//!    bypass lane and complete immediately. Loads that must read memory are
//!    first disambiguated against older stores and are limited to one memory
//!    dispatch per cycle, optionally gated by the store interlock.
//! 2. **Countdown:** Every occupied lane ticks once. A lane reaching zero
//!    computes its result: ALU operation, branch resolution, or memory read.
//!    A faulting memory read yields a result carrying the fault.
//!
//! Results become visible to consumers only at the next cycle's writeback.

use tracing::trace;

use crate::common::SimError;
use crate::core::Cpu;
use crate::core::pipeline::disambiguation::{MemOrdering, disambiguate};
use crate::core::pipeline::reservation::{RsEntry, Stations};
use crate::core::pipeline::rob::{Rob, Stage};
use crate::core::units::alu::Alu;
use crate::core::units::bru;
use crate::core::units::lanes::{ExecUnits, LaneOp, LaneResult};
use crate::core::units::memory::DataMemory;
use crate::isa::{ExecUnit, StationKind};

/// Where an eligible reservation station goes this cycle.
enum Route {
    /// Complete in the bypass lane with this value.
    Bypass(u32),
    /// Enter a timed lane of this unit.
    Lane(ExecUnit),
    /// Stay in the station.
    Hold,
}

fn lane_op(entry: &RsEntry, result: Option<LaneResult>) -> LaneOp {
    LaneOp {
        tag: entry.tag,
        inst: entry.inst,
        ops: [entry.value(0), entry.value(1)],
        float: entry.float,
        addr: entry.addr,
        result,
    }
}

/// Computes the result of an operation whose countdown just expired.
fn compute(op: &LaneOp, memory: &DataMemory) -> Result<LaneResult, SimError> {
    let info = op.inst.info();
    if info.is_load {
        let addr = op.addr.ok_or(SimError::UnsupportedOpcode(op.inst.opcode))?;
        // The load may be on a wrong path; commit decides whether this is fatal.
        return Ok(memory.read_u32(addr).map_or_else(LaneResult::fault, LaneResult::value));
    }
    if info.is_branch() {
        return bru::resolve(&op.inst, op.ops[0], op.float[0]);
    }
    Ok(LaneResult::value(Alu::execute(
        info.alu,
        op.ops[0],
        op.ops[1],
        op.float[0],
        op.float[1],
    )))
}

/// Executes the Execute stage.
pub fn execute_stage(
    cpu: &mut Cpu,
    rob: &mut Rob,
    stations: &mut Stations,
    units: &mut ExecUnits,
) -> Result<(), SimError> {
    dispatch(cpu, rob, stations, units)?;

    for unit in ExecUnit::ALL {
        let memory = &cpu.memory;
        let finished = units.unit_mut(unit).tick(|op| compute(op, memory))?;
        if unit == ExecUnit::Memory && finished > 1 {
            return Err(SimError::StructuralHazard {
                cycle: cpu.cycle,
                completions: finished,
            });
        }
    }
    Ok(())
}

fn dispatch(cpu: &mut Cpu, rob: &mut Rob, stations: &mut Stations, units: &mut ExecUnits) -> Result<(), SimError> {
    let mut memory_dispatched = false;

    for kind in StationKind::ALL {
        for entry in stations.pool_mut(kind).entries_mut() {
            if !entry.can_dispatch() {
                continue;
            }
            let info = entry.inst.info();
            let unit = info.unit.ok_or(SimError::UnsupportedOpcode(entry.inst.opcode))?;
            let _ = entry.resolve_address();

            let route = if info.is_store {
                Route::Bypass(entry.value(1))
            } else if info.is_load {
                let addr = entry.addr.ok_or(SimError::UnsupportedOpcode(entry.inst.opcode))?;
                match disambiguate(rob, entry.tag, addr)? {
                    MemOrdering::Bypass(value) => {
                        cpu.stats.loads_bypassed += 1;
                        Route::Bypass(value)
                    }
                    MemOrdering::Conflict => {
                        cpu.stats.stalls_memory += 1;
                        Route::Hold
                    }
                    MemOrdering::Clear if cpu.store_interlock && cpu.mem_block => {
                        cpu.stats.stalls_memory += 1;
                        Route::Hold
                    }
                    MemOrdering::Clear if memory_dispatched => Route::Hold,
                    MemOrdering::Clear => Route::Lane(unit),
                }
            } else {
                Route::Lane(unit)
            };

            let dispatched = match route {
                Route::Bypass(value) => {
                    units.bypass.push(lane_op(entry, Some(LaneResult::value(value))));
                    true
                }
                Route::Lane(unit) => {
                    let placed = units.unit_mut(unit).dispatch(lane_op(entry, None));
                    if placed && unit == ExecUnit::Memory {
                        memory_dispatched = true;
                    }
                    placed
                }
                Route::Hold => false,
            };

            if dispatched {
                entry.in_exec = true;
                if let Some(rob_entry) = rob.get_mut(entry.tag) {
                    let _ = rob_entry.dyn_inst.advance(Stage::Execute, cpu.cycle);
                }
                trace!(cycle = cpu.cycle, tag = %entry.tag, "dispatch {}", entry.inst);
            }
        }
    }
    Ok(())
}
