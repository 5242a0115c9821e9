//! Issue Stage: fetch, rename and dispatch into reservation stations.
//!
//! Up to `width` instructions are issued per cycle, in program order. The
//! batch ends early when:
//! 1. the ROB is full;
//! 2. `EOP` is fetched (issue stops for good, in-flight work drains);
//! 3. the target reservation-station pool is full (nothing may jump ahead);
//! 4. a branch was issued (one basic block per cycle).
//!
//! Capacity is checked before any slot is written, so a stalled instruction
//! leaves no partial state behind.

use tracing::{debug, info, trace};

use crate::common::{INSTRUCTION_WIDTH, SimError};
use crate::core::Cpu;
use crate::core::arch::RegisterFile;
use crate::core::pipeline::reservation::{Operand, Stations};
use crate::core::pipeline::rob::Rob;
use crate::isa::instruction::Reg;
use crate::isa::{Format, Opcode};

/// Renames a source register.
///
/// A register with no outstanding producer yields its committed value. A
/// busy register yields the producer's ROB value if it is already ready, and
/// otherwise the producer's tag to wait on.
pub fn rename(regs: &RegisterFile, rob: &Rob, reg: Reg) -> Operand {
    match regs.producer(reg).map(|tag| (tag, rob.get(tag))) {
        Some((_, Some(entry))) if entry.ready => Operand::Ready(entry.value),
        Some((tag, Some(_))) => Operand::Pending(tag),
        _ => Operand::Ready(regs.value(reg)),
    }
}

/// Executes the Issue stage. Returns the number of instructions issued.
pub fn issue_stage(cpu: &mut Cpu, rob: &mut Rob, stations: &mut Stations, width: usize) -> Result<usize, SimError> {
    let mut issued = 0;
    if cpu.eop_reached {
        return Ok(issued);
    }

    while issued < width {
        if rob.is_full() {
            cpu.stats.stalls_rob_full += 1;
            trace!(cycle = cpu.cycle, "issue stalled: ROB full");
            break;
        }

        let inst = cpu.fetch(cpu.pc)?;
        if inst.opcode == Opcode::Eop {
            cpu.eop_reached = true;
            info!(cycle = cpu.cycle, pc = inst.pc, "end of program reached");
            break;
        }

        let info = inst.info();
        let kind = info.unit.ok_or(SimError::UnsupportedOpcode(inst.opcode))?.station();
        if stations.pool(kind).is_full() {
            cpu.stats.stalls_rs_full += 1;
            debug!(cycle = cpu.cycle, pool = kind.name(), "issue stalled: stations full");
            break;
        }
        let Some(tag) = rob.allocate(inst, cpu.cycle) else {
            break;
        };

        let source = |reg: Option<Reg>| match reg {
            Some(r) => (rename(&cpu.regs, &*rob, r), r.float),
            None => (Operand::Ready(0), false),
        };
        let (a, a_float) = source(inst.src1);
        let (b, b_float) = if info.format == Format::Immediate {
            (Operand::Ready(inst.imm as u32), false)
        } else {
            source(inst.src2)
        };

        let mut entry = stations.entry(tag, inst, [a, b], [a_float, b_float]);
        if let Some(addr) = entry.resolve_address()
            && info.is_store
        {
            rob.set_store_address(tag, addr);
        }
        let _ = stations.pool_mut(kind).insert(entry);

        if info.writes_dest()
            && let Some(dst) = inst.dst
        {
            cpu.regs.set_producer(dst, tag);
        }

        trace!(cycle = cpu.cycle, %tag, pc = inst.pc, "issue {inst}");
        cpu.pc = cpu.pc.wrapping_add(INSTRUCTION_WIDTH);
        issued += 1;

        if info.is_branch() {
            break;
        }
    }
    Ok(issued)
}
