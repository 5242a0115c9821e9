//! Randomized programs and machine shapes, checked against a sequential
//! interpreter. Out-of-order execution must never change the architectural
//! result, and the cross-structure invariants in the harness must hold on
//! every cycle along the way.

use ooosim_core::common::UNDEFINED;
use ooosim_core::config::Config;
use ooosim_core::isa::{Opcode, Program};
use proptest::prelude::*;

use crate::common::builder::r;
use crate::common::{ProgramBuilder, TestContext};

const REGS: usize = 8;
const SLOTS: i32 = 4;

#[derive(Clone, Copy, Debug)]
enum Op {
    Addi { rd: usize, rs: usize, imm: i32 },
    Alu { op: Opcode, rd: usize, rs1: usize, rs2: usize },
    Store { rv: usize, slot: i32 },
    Load { rd: usize, slot: i32 },
    Branch { op: Opcode, rs: usize, skip: usize },
}

fn reg() -> impl Strategy<Value = usize> {
    0..REGS
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1..REGS, reg(), -8..8i32).prop_map(|(rd, rs, imm)| Op::Addi { rd, rs, imm }),
        3 => (
            prop::sample::select(vec![Opcode::Add, Opcode::Sub, Opcode::Xor, Opcode::Mult, Opcode::Div]),
            1..REGS,
            reg(),
            reg()
        )
            .prop_map(|(op, rd, rs1, rs2)| Op::Alu { op, rd, rs1, rs2 }),
        1 => (reg(), 0..SLOTS).prop_map(|(rv, slot)| Op::Store { rv, slot }),
        1 => (1..REGS, 0..SLOTS).prop_map(|(rd, slot)| Op::Load { rd, slot }),
        1 => (prop::sample::select(vec![Opcode::Beqz, Opcode::Bnez, Opcode::Bgtz]), reg(), 0..3usize)
            .prop_map(|(op, rs, skip)| Op::Branch { op, rs, skip }),
    ]
}

fn config() -> impl Strategy<Value = Config> {
    (
        (1..12usize, 1..5usize, 1..4usize, 1..4usize, 1..5usize),
        prop::collection::vec((1..6u32, 1..3usize), 5),
        any::<bool>(),
    )
        .prop_map(|((rob, width, int, mult, load), units, interlock)| {
            let mut c = Config::default();
            c.pipeline.rob_size = rob;
            c.pipeline.issue_width = width;
            c.pipeline.int_stations = int;
            c.pipeline.mult_stations = mult;
            c.pipeline.load_stations = load;
            c.pipeline.store_interlock = interlock;
            for (unit, (latency, instances)) in [
                &mut c.units.integer,
                &mut c.units.adder,
                &mut c.units.multiplier,
                &mut c.units.divider,
                &mut c.units.memory,
            ]
            .into_iter()
            .zip(units)
            {
                unit.latency = latency;
                unit.instances = instances;
            }
            c
        })
}

fn assemble(ops: &[Op]) -> Program {
    let end = ops.len();
    let mut b = ProgramBuilder::new();
    for (i, op) in ops.iter().enumerate() {
        b = match *op {
            Op::Addi { rd, rs, imm } => b.addi(rd, rs, imm),
            Op::Alu { op, rd, rs1, rs2 } => b.reg(op, r(rd), r(rs1), r(rs2)),
            Op::Store { rv, slot } => b.sw(rv, slot * 4, 0),
            Op::Load { rd, slot } => b.lw(rd, slot * 4, 0),
            Op::Branch { op, rs, skip } => b.branch(op, r(rs), (i + 1 + skip).min(end)),
        };
    }
    b.eop().build()
}

/// Executes `ops` one at a time.
fn interpret(ops: &[Op], init: &[i32; REGS]) -> ([i32; REGS], [u32; SLOTS as usize], u64) {
    let mut regs = *init;
    regs[0] = 0;
    let mut mem = [UNDEFINED; SLOTS as usize];
    let mut pc = 0;
    let mut retired = 0;
    let write = |regs: &mut [i32; REGS], rd: usize, v: i32| {
        if rd != 0 {
            regs[rd] = v;
        }
    };

    while pc < ops.len() {
        retired += 1;
        let mut next = pc + 1;
        match ops[pc] {
            Op::Addi { rd, rs, imm } => {
                let v = regs[rs].wrapping_add(imm);
                write(&mut regs, rd, v);
            }
            Op::Alu { op, rd, rs1, rs2 } => {
                let (a, b) = (regs[rs1], regs[rs2]);
                let v = match op {
                    Opcode::Add => a.wrapping_add(b),
                    Opcode::Sub => a.wrapping_sub(b),
                    Opcode::Xor => a ^ b,
                    Opcode::Mult => a.wrapping_mul(b),
                    Opcode::Div if b == 0 => UNDEFINED as i32,
                    Opcode::Div => a.wrapping_div(b),
                    other => unreachable!("{other:?}"),
                };
                write(&mut regs, rd, v);
            }
            Op::Store { rv, slot } => mem[slot as usize] = regs[rv] as u32,
            Op::Load { rd, slot } => {
                let v = mem[slot as usize] as i32;
                write(&mut regs, rd, v);
            }
            Op::Branch { op, rs, skip } => {
                let v = regs[rs];
                let taken = match op {
                    Opcode::Beqz => v == 0,
                    Opcode::Bnez => v != 0,
                    Opcode::Bgtz => v > 0,
                    other => unreachable!("{other:?}"),
                };
                if taken {
                    next = (pc + 1 + skip).min(ops.len());
                }
            }
        }
        pc = next;
    }
    (regs, mem, retired)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_matches_sequential_execution(
        ops in prop::collection::vec(op(), 1..24),
        init in prop::array::uniform8(-4..6i32),
        config in config(),
    ) {
        let (regs, mem, retired) = interpret(&ops, &init);

        let mut ctx = TestContext::new(&assemble(&ops), config);
        for (n, v) in init.iter().enumerate().skip(1) {
            ctx.sim.set_int_register(n, *v);
        }
        let _ = ctx.run_to_end();

        for (n, expected) in regs.iter().enumerate() {
            prop_assert_eq!(ctx.reg(n), *expected, "R{}", n);
        }
        for (slot, expected) in mem.iter().enumerate() {
            prop_assert_eq!(ctx.sim.read_memory(slot as u32 * 4).unwrap(), *expected, "mem[{}]", slot * 4);
        }
        prop_assert_eq!(ctx.sim.instructions_executed(), retired);
        prop_assert!(ctx.sim.rob_snapshot().is_empty());
        for n in 0..REGS {
            prop_assert_eq!(ctx.sim.pending_int_register(n), None);
        }
    }

    #[test]
    fn prop_commit_order_is_program_order(
        ops in prop::collection::vec(op(), 1..16),
        config in config(),
    ) {
        let mut ctx = TestContext::new(&assemble(&ops), config);
        let _ = ctx.run_to_end();

        let committed: Vec<_> = ctx.sim.instruction_log().iter().filter(|r| !r.squashed).collect();
        for pair in committed.windows(2) {
            let (a, b) = (pair[0].times.commit.unwrap(), pair[1].times.commit.unwrap());
            prop_assert!(a < b, "commits at {} then {}", a, b);
        }
        for rec in &committed {
            let t = rec.times;
            prop_assert!(t.issue < t.execute && t.execute <= t.write_result && t.write_result < t.commit);
        }
    }
}
