//! Human-readable status reports.
//!
//! Every function renders a read-only view of a [`Simulator`] into a
//! `String`; none of them touch machine state.

use std::fmt::Write;

use crate::common::constants::WORD_BYTES;
use crate::common::{NUM_FP_REGISTERS, NUM_GP_REGISTERS, SimError, UNDEFINED};
use crate::core::cpu::InstructionRecord;
use crate::sim::simulator::Simulator;

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn opt<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn hex(v: Option<u32>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("0x{v:08x}"))
}

/// Registers that hold a value or are waiting on a producer.
///
/// UNDEFINED registers with no producer are omitted.
pub fn registers(sim: &Simulator) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "GENERAL PURPOSE REGISTERS");
    let _ = writeln!(out, "{:>8}{:>22}{:>5}", "Register", "Value", "ROB");
    for n in 0..NUM_GP_REGISTERS {
        if let Some(tag) = sim.pending_int_register(n) {
            let _ = writeln!(out, "{:>8}{:>22}{:>5}", format!("R{n}"), "-", tag);
        } else {
            let v = sim.int_register(n);
            if v as u32 != UNDEFINED {
                let _ = writeln!(out, "{:>8}{:>11}/0x{:08x}{:>5}", format!("R{n}"), v, v as u32, "-");
            }
        }
    }
    for n in 0..NUM_FP_REGISTERS {
        if let Some(tag) = sim.pending_fp_register(n) {
            let _ = writeln!(out, "{:>8}{:>22}{:>5}", format!("F{n}"), "-", tag);
        } else {
            let v = sim.fp_register(n);
            if v.to_bits() != UNDEFINED {
                let _ = writeln!(out, "{:>8}{:>11}/0x{:08x}{:>5}", format!("F{n}"), v, v.to_bits(), "-");
            }
        }
    }
    out
}

/// Every ROB slot in index order, free slots included.
pub fn rob(sim: &Simulator) -> String {
    let live = sim.rob_snapshot();
    let mut out = String::new();
    let _ = writeln!(out, "REORDER BUFFER");
    let _ = writeln!(
        out,
        "{:>5}{:>6}{:>7}{:>12}{:>10}{:>12}{:>12}",
        "Entry", "Busy", "Ready", "PC", "State", "Dest", "Value"
    );
    for slot in 0..sim.rob_capacity() {
        match live.iter().find(|e| e.tag == slot) {
            Some(e) => {
                let dest = e
                    .dest_reg
                    .map(|r| r.to_string())
                    .or_else(|| e.dest.map(|a| format!("0x{a:08x}")))
                    .unwrap_or_else(|| "-".to_string());
                let value = if e.ready { format!("0x{:08x}", e.value) } else { "-".to_string() };
                let _ = writeln!(
                    out,
                    "{:>5}{:>6}{:>7}{:>12}{:>10}{:>12}{:>12}",
                    slot,
                    "yes",
                    yes_no(e.ready),
                    format!("0x{:08x}", e.pc),
                    e.stage.to_string(),
                    dest,
                    value
                );
            }
            None => {
                let _ = writeln!(out, "{:>5}{:>6}{:>7}{:>12}{:>10}{:>12}{:>12}", slot, "no", "no", "-", "-", "-", "-");
            }
        }
    }
    out
}

/// Occupied reservation stations, grouped by pool.
pub fn stations(sim: &Simulator) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "RESERVATION STATIONS");
    let _ = writeln!(
        out,
        "{:>7}{:>6}{:>12}{:>12}{:>12}{:>6}{:>6}{:>6}{:>12}",
        "Name", "Busy", "PC", "Vj", "Vk", "Qj", "Qk", "Dest", "Address"
    );
    let views = sim.station_snapshot();
    for kind in crate::isa::StationKind::ALL {
        for index in 0..sim.station_capacity(kind) {
            let name = format!("{}{}", kind.name(), index + 1);
            match views.iter().find(|v| v.kind == kind && v.index == index) {
                Some(v) => {
                    let _ = writeln!(
                        out,
                        "{:>7}{:>6}{:>12}{:>12}{:>12}{:>6}{:>6}{:>6}{:>12}",
                        name,
                        "yes",
                        format!("0x{:08x}", v.pc),
                        hex(v.values[0]),
                        hex(v.values[1]),
                        opt(v.waiting[0]),
                        opt(v.waiting[1]),
                        v.dest,
                        hex(v.addr)
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "{:>7}{:>6}{:>12}{:>12}{:>12}{:>6}{:>6}{:>6}{:>12}",
                        name, "no", "-", "-", "-", "-", "-", "-", "-"
                    );
                }
            }
        }
    }
    out
}

fn records(title: &str, records: &[InstructionRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{:>10}{:>7}{:>7}{:>7}{:>7}  {}", "PC", "Issue", "Exe", "WR", "Commit", "Instruction");
    for r in records {
        let commit = if r.squashed { "squash".to_string() } else { opt(r.times.commit) };
        let _ = writeln!(
            out,
            "{:>10}{:>7}{:>7}{:>7}{:>7}  {}",
            format!("0x{:08x}", r.inst.pc),
            opt(r.times.issue),
            opt(r.times.execute),
            opt(r.times.write_result),
            commit,
            r.inst
        );
    }
    out
}

/// Instructions still in the ROB with their stage cycles.
pub fn pending_instructions(sim: &Simulator) -> String {
    records("PENDING INSTRUCTIONS STATUS", &sim.pending_instructions())
}

/// Every instruction that left the machine.
pub fn log(sim: &Simulator) -> String {
    records("EXECUTION LOG", sim.instruction_log())
}

/// Pending instructions, ROB, reservation stations and registers.
pub fn status(sim: &Simulator) -> String {
    [pending_instructions(sim), rob(sim), stations(sim), registers(sim)].join("\n")
}

/// Data memory bytes in `[start, end)`, one aligned word per line.
pub fn memory(sim: &Simulator, start: u32, end: u32) -> Result<String, SimError> {
    let mut out = String::new();
    let _ = writeln!(out, "DATA MEMORY[0x{start:08x}:0x{end:08x}]");
    let mut addr = start - start % WORD_BYTES;
    while addr < end {
        let bytes = sim.read_memory(addr)?.to_le_bytes();
        let _ = write!(out, "0x{addr:08x}: ");
        for b in bytes {
            let _ = write!(out, "{b:02x} ");
        }
        let _ = writeln!(out);
        addr = match addr.checked_add(WORD_BYTES) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(out)
}
