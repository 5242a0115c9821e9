//! Commit Stage: retire the ROB head in program order.
//!
//! At most one instruction leaves the ROB per cycle:
//! 1. A head that is not ready stalls commit. A ready load that faulted
//!    in memory raises its fault now, once it is known to be on the
//!    committed path.
//! 2. A ready store first drains to memory for the memory unit's latency,
//!    holding the memory interlock meanwhile, then writes its word.
//! 3. A register result is committed; the busy flag is only cleared if the
//!    register still names this entry as its producer.
//! 4. A taken branch signals a squash toward its resolved target.

use tracing::{debug, info, trace};

use crate::common::SimError;
use crate::core::Cpu;
use crate::core::cpu::InstructionRecord;
use crate::core::pipeline::rob::{Rob, Stage};

/// What the commit stage did this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The ROB is empty.
    Idle,
    /// The head is not ready.
    Stalled,
    /// The head store is still draining to memory.
    Draining,
    /// One instruction committed.
    Committed,
    /// A mispredicted branch committed; fetch must resume at `target`.
    Squash {
        /// Resolved branch target.
        target: u32,
    },
}

/// Executes the Commit stage.
///
/// `memory_latency` is the drain time of a committing store.
pub fn commit_stage(cpu: &mut Cpu, rob: &mut Rob, memory_latency: u32) -> Result<CommitOutcome, SimError> {
    let Some(head) = rob.peek_head_mut() else {
        return Ok(CommitOutcome::Idle);
    };
    if !head.ready {
        return Ok(CommitOutcome::Stalled);
    }
    if let Some(fault) = &head.fault {
        return Err(fault.clone());
    }

    if head.inst().is_store() {
        let left = head.store_delay.unwrap_or(memory_latency).saturating_sub(1);
        if left > 0 {
            head.store_delay = Some(left);
            cpu.mem_block = true;
            trace!(pc = head.inst().pc, left, "store draining");
            return Ok(CommitOutcome::Draining);
        }
        let addr = head.dest.ok_or(SimError::MissingStoreAddress { pc: head.inst().pc })?;
        cpu.memory.write_u32(addr, head.value)?;
        cpu.mem_block = false;
    }

    let mut entry = rob.pop_head()?;
    let _ = entry.dyn_inst.advance(Stage::Commit, cpu.cycle);
    let inst = *entry.inst();
    let op = inst.info();

    if op.writes_dest()
        && let Some(dst) = inst.dst
    {
        cpu.regs.commit(dst, entry.tag, entry.value);
    }

    let stats = &mut cpu.stats;
    stats.instructions_committed += 1;
    if op.is_load {
        stats.inst_load += 1;
    } else if op.is_store {
        stats.inst_store += 1;
    } else if op.is_branch() {
        stats.inst_branch += 1;
    } else {
        stats.inst_alu += 1;
    }
    cpu.log.push(InstructionRecord::from_entry(&entry, false));

    if cpu.trace {
        info!(cycle = cpu.cycle, pc = inst.pc, value = entry.value, "commit {inst}");
    } else {
        debug!(cycle = cpu.cycle, pc = inst.pc, tag = %entry.tag, "commit {inst}");
    }

    if entry.mis_pred {
        cpu.stats.branch_mispredictions += 1;
        return Ok(CommitOutcome::Squash {
            target: entry.value,
        });
    }
    Ok(CommitOutcome::Committed)
}
