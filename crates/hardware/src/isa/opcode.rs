//! Opcodes and the consolidated opcode table.
//!
//! Every property the pipeline needs about an opcode (which execution unit
//! runs it, which reservation-station pool holds it, what the ALU does with
//! it, how its operands are laid out and whether it is a load, store or
//! branch) is looked up once in [`Opcode::info`] instead of being re-derived
//! by range matches in each stage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Instruction opcodes understood by the simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opcode {
    /// Load word into an integer register.
    Lw,
    /// Store word from an integer register.
    Sw,
    /// Integer add.
    Add,
    /// Integer add immediate.
    Addi,
    /// Integer subtract.
    Sub,
    /// Integer subtract immediate.
    Subi,
    /// Bitwise XOR.
    Xor,
    /// Bitwise XOR immediate.
    Xori,
    /// Bitwise OR.
    Or,
    /// Bitwise OR immediate.
    Ori,
    /// Bitwise AND.
    And,
    /// Bitwise AND immediate.
    Andi,
    /// Integer multiply.
    Mult,
    /// Integer divide.
    Div,
    /// Branch if equal to zero.
    Beqz,
    /// Branch if not equal to zero.
    Bnez,
    /// Branch if less than zero.
    Bltz,
    /// Branch if greater than zero.
    Bgtz,
    /// Branch if less than or equal to zero.
    Blez,
    /// Branch if greater than or equal to zero.
    Bgez,
    /// Unconditional jump.
    Jump,
    /// End of program marker.
    Eop,
    /// No operation.
    Nop,
    /// Load word into a floating-point register.
    Lws,
    /// Store word from a floating-point register.
    Sws,
    /// Floating-point add.
    Adds,
    /// Floating-point subtract.
    Subs,
    /// Floating-point multiply.
    Mults,
    /// Floating-point divide.
    Divs,
}

/// Execution-unit classes. Each class owns an array of timed lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecUnit {
    /// Integer ALU, also resolves branches.
    Integer,
    /// Floating-point adder.
    Adder,
    /// Multiplier (integer and floating point).
    Multiplier,
    /// Divider (integer and floating point).
    Divider,
    /// Memory port for loads that must read data memory.
    Memory,
}

impl ExecUnit {
    /// All unit classes in lane-scan order.
    pub const ALL: [Self; 5] = [
        Self::Integer,
        Self::Adder,
        Self::Multiplier,
        Self::Divider,
        Self::Memory,
    ];

    /// Dense index of this unit class.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Reservation-station pool that feeds this unit class.
    pub const fn station(self) -> StationKind {
        match self {
            Self::Integer => StationKind::Int,
            Self::Adder => StationKind::Add,
            Self::Multiplier | Self::Divider => StationKind::Mult,
            Self::Memory => StationKind::Load,
        }
    }
}

/// Reservation-station pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StationKind {
    /// Integer ALU and branch operations.
    Int,
    /// Floating-point add/subtract.
    Add,
    /// Multiply and divide.
    Mult,
    /// Loads and stores.
    Load,
}

impl StationKind {
    /// All pools in scan order.
    pub const ALL: [Self; 4] = [Self::Int, Self::Add, Self::Mult, Self::Load];

    /// Dense index of this pool.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Display name used in status reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "Int",
            Self::Add => "Add",
            Self::Mult => "Mult",
            Self::Load => "Load",
        }
    }
}

/// Operation performed by the shared ALU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// Addition (also address generation and branch targets).
    Add,
    /// Subtraction.
    Sub,
    /// Bitwise XOR.
    Xor,
    /// Bitwise OR.
    Or,
    /// Bitwise AND.
    And,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Passes operand A through unchanged (stores, no-ops).
    Pass,
}

/// Condition evaluated by a branch against its single source operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchCond {
    /// Taken when the operand equals zero.
    Eqz,
    /// Taken when the operand is not zero.
    Nez,
    /// Taken when the operand is negative.
    Ltz,
    /// Taken when the operand is positive.
    Gtz,
    /// Taken when the operand is zero or negative.
    Lez,
    /// Taken when the operand is zero or positive.
    Gez,
    /// Always taken.
    Always,
}

impl BranchCond {
    /// Evaluates the condition. Float-tagged operands compare as `f32`,
    /// integer operands as signed 32-bit values.
    pub fn taken(self, operand: u32, is_float: bool) -> bool {
        let ord = if is_float {
            f32::from_bits(operand).partial_cmp(&0.0)
        } else {
            Some((operand as i32).cmp(&0))
        };
        let Some(ord) = ord else {
            // NaN compares unordered: only "not equal to zero" holds.
            return matches!(self, Self::Nez | Self::Always);
        };
        match self {
            Self::Eqz => ord.is_eq(),
            Self::Nez => ord.is_ne(),
            Self::Ltz => ord.is_lt(),
            Self::Gtz => ord.is_gt(),
            Self::Lez => ord.is_le(),
            Self::Gez => ord.is_ge(),
            Self::Always => true,
        }
    }
}

/// Operand layout of an opcode, mirroring the assembly syntax.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// `OP Rd Rs1 Rs2`
    Register,
    /// `OP Rd Rs1 imm`
    Immediate,
    /// `OP Rd imm(Rbase)`
    Load,
    /// `OP Rvalue imm(Rbase)`
    Store,
    /// `OP Rs1 label`
    Branch,
    /// `OP label`
    Jump,
    /// No operands.
    None,
}

/// Static properties of an opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpInfo {
    /// Assembly mnemonic.
    pub mnemonic: &'static str,
    /// Execution unit, or `None` for the end-of-program marker.
    pub unit: Option<ExecUnit>,
    /// ALU operation applied at execute.
    pub alu: AluOp,
    /// Operand layout.
    pub format: Format,
    /// Branch condition for control-flow opcodes.
    pub branch: Option<BranchCond>,
    /// Whether the destination register is in the floating-point bank.
    pub float_dest: bool,
    /// Whether the opcode reads data memory.
    pub is_load: bool,
    /// Whether the opcode writes data memory.
    pub is_store: bool,
}

impl OpInfo {
    const fn new(mnemonic: &'static str, unit: Option<ExecUnit>, alu: AluOp, format: Format) -> Self {
        Self {
            mnemonic,
            unit,
            alu,
            format,
            branch: None,
            float_dest: false,
            is_load: matches!(format, Format::Load),
            is_store: matches!(format, Format::Store),
        }
    }

    const fn branch(mnemonic: &'static str, cond: BranchCond, format: Format) -> Self {
        let mut info = Self::new(mnemonic, Some(ExecUnit::Integer), AluOp::Add, format);
        info.branch = Some(cond);
        info
    }

    const fn float(mut self) -> Self {
        self.float_dest = true;
        self
    }

    /// Whether the opcode changes control flow.
    #[inline]
    pub const fn is_branch(&self) -> bool {
        self.branch.is_some()
    }

    /// Whether the opcode produces a register result.
    #[inline]
    pub const fn writes_dest(&self) -> bool {
        matches!(self.format, Format::Register | Format::Immediate | Format::Load)
    }
}

use ExecUnit::{Adder, Divider, Integer, Memory, Multiplier};

static TABLE: [OpInfo; 29] = [
    OpInfo::new("LW", Some(Memory), AluOp::Add, Format::Load),
    OpInfo::new("SW", Some(Memory), AluOp::Pass, Format::Store),
    OpInfo::new("ADD", Some(Integer), AluOp::Add, Format::Register),
    OpInfo::new("ADDI", Some(Integer), AluOp::Add, Format::Immediate),
    OpInfo::new("SUB", Some(Integer), AluOp::Sub, Format::Register),
    OpInfo::new("SUBI", Some(Integer), AluOp::Sub, Format::Immediate),
    OpInfo::new("XOR", Some(Integer), AluOp::Xor, Format::Register),
    OpInfo::new("XORI", Some(Integer), AluOp::Xor, Format::Immediate),
    OpInfo::new("OR", Some(Integer), AluOp::Or, Format::Register),
    OpInfo::new("ORI", Some(Integer), AluOp::Or, Format::Immediate),
    OpInfo::new("AND", Some(Integer), AluOp::And, Format::Register),
    OpInfo::new("ANDI", Some(Integer), AluOp::And, Format::Immediate),
    OpInfo::new("MULT", Some(Multiplier), AluOp::Mul, Format::Register),
    OpInfo::new("DIV", Some(Divider), AluOp::Div, Format::Register),
    OpInfo::branch("BEQZ", BranchCond::Eqz, Format::Branch),
    OpInfo::branch("BNEZ", BranchCond::Nez, Format::Branch),
    OpInfo::branch("BLTZ", BranchCond::Ltz, Format::Branch),
    OpInfo::branch("BGTZ", BranchCond::Gtz, Format::Branch),
    OpInfo::branch("BLEZ", BranchCond::Lez, Format::Branch),
    OpInfo::branch("BGEZ", BranchCond::Gez, Format::Branch),
    OpInfo::branch("JUMP", BranchCond::Always, Format::Jump),
    OpInfo::new("EOP", None, AluOp::Pass, Format::None),
    OpInfo::new("NOP", Some(Integer), AluOp::Pass, Format::None),
    OpInfo::new("LWS", Some(Memory), AluOp::Add, Format::Load).float(),
    OpInfo::new("SWS", Some(Memory), AluOp::Pass, Format::Store),
    OpInfo::new("ADDS", Some(Adder), AluOp::Add, Format::Register).float(),
    OpInfo::new("SUBS", Some(Adder), AluOp::Sub, Format::Register).float(),
    OpInfo::new("MULTS", Some(Multiplier), AluOp::Mul, Format::Register).float(),
    OpInfo::new("DIVS", Some(Divider), AluOp::Div, Format::Register).float(),
];

impl Opcode {
    /// Every opcode, in table order.
    pub const ALL: [Self; 29] = [
        Self::Lw,
        Self::Sw,
        Self::Add,
        Self::Addi,
        Self::Sub,
        Self::Subi,
        Self::Xor,
        Self::Xori,
        Self::Or,
        Self::Ori,
        Self::And,
        Self::Andi,
        Self::Mult,
        Self::Div,
        Self::Beqz,
        Self::Bnez,
        Self::Bltz,
        Self::Bgtz,
        Self::Blez,
        Self::Bgez,
        Self::Jump,
        Self::Eop,
        Self::Nop,
        Self::Lws,
        Self::Sws,
        Self::Adds,
        Self::Subs,
        Self::Mults,
        Self::Divs,
    ];

    /// Looks up the static properties of this opcode.
    #[inline]
    pub fn info(self) -> &'static OpInfo {
        &TABLE[self as usize]
    }

    /// Assembly mnemonic.
    #[inline]
    pub fn mnemonic(self) -> &'static str {
        self.info().mnemonic
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Error returned when a mnemonic does not name an opcode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownOpcode;

impl FromStr for Opcode {
    type Err = UnknownOpcode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
            .ok_or(UnknownOpcode)
    }
}
