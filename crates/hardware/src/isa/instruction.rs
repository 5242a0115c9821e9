//! Decoded static instructions.
//!
//! An [`Instruction`] is produced once by the assembler and never changes
//! afterwards. Operand validity is expressed with `Option<Reg>`: a `None`
//! source or destination is not meaningful for that opcode.

use std::fmt;

use crate::isa::opcode::{Format, OpInfo, Opcode};

/// Architectural register reference (bank + number).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reg {
    /// Register number within its bank.
    pub num: usize,
    /// Whether the register lives in the floating-point bank.
    pub float: bool,
}

impl Reg {
    /// Integer register `R<num>`.
    pub const fn int(num: usize) -> Self {
        Self { num, float: false }
    }

    /// Floating-point register `F<num>`.
    pub const fn fp(num: usize) -> Self {
        Self { num, float: true }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bank = if self.float { 'F' } else { 'R' };
        write!(f, "{bank}{}", self.num)
    }
}

/// A decoded, immutable instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Operation.
    pub opcode: Opcode,
    /// Destination register, if the opcode writes one.
    pub dst: Option<Reg>,
    /// First source: ALU operand A, branch condition, or memory base.
    pub src1: Option<Reg>,
    /// Second source: ALU operand B, or the value register of a store.
    pub src2: Option<Reg>,
    /// Immediate, memory offset, or branch offset relative to `pc + 4`.
    pub imm: i32,
    /// Address of this instruction; stamped when the program is loaded.
    pub pc: u32,
}

impl Instruction {
    const fn bare(opcode: Opcode) -> Self {
        Self {
            opcode,
            dst: None,
            src1: None,
            src2: None,
            imm: 0,
            pc: 0,
        }
    }

    /// `OP Rd Rs1 Rs2`
    pub const fn register(opcode: Opcode, dst: Reg, src1: Reg, src2: Reg) -> Self {
        let mut inst = Self::bare(opcode);
        inst.dst = Some(dst);
        inst.src1 = Some(src1);
        inst.src2 = Some(src2);
        inst
    }

    /// `OP Rd Rs1 imm`
    pub const fn immediate(opcode: Opcode, dst: Reg, src1: Reg, imm: i32) -> Self {
        let mut inst = Self::bare(opcode);
        inst.dst = Some(dst);
        inst.src1 = Some(src1);
        inst.imm = imm;
        inst
    }

    /// `OP Rd imm(Rbase)`
    pub const fn load(opcode: Opcode, dst: Reg, imm: i32, base: Reg) -> Self {
        let mut inst = Self::bare(opcode);
        inst.dst = Some(dst);
        inst.src1 = Some(base);
        inst.imm = imm;
        inst
    }

    /// `OP Rvalue imm(Rbase)`
    pub const fn store(opcode: Opcode, value: Reg, imm: i32, base: Reg) -> Self {
        let mut inst = Self::bare(opcode);
        inst.src1 = Some(base);
        inst.src2 = Some(value);
        inst.imm = imm;
        inst
    }

    /// `OP Rs1 offset`
    pub const fn branch(opcode: Opcode, cond: Reg, offset: i32) -> Self {
        let mut inst = Self::bare(opcode);
        inst.src1 = Some(cond);
        inst.imm = offset;
        inst
    }

    /// `JUMP offset`
    pub const fn jump(offset: i32) -> Self {
        let mut inst = Self::bare(Opcode::Jump);
        inst.imm = offset;
        inst
    }

    /// `NOP`
    pub const fn nop() -> Self {
        Self::bare(Opcode::Nop)
    }

    /// `EOP`
    pub const fn eop() -> Self {
        Self::bare(Opcode::Eop)
    }

    /// Static opcode properties.
    #[inline]
    pub fn info(&self) -> &'static OpInfo {
        self.opcode.info()
    }

    /// Whether this instruction reads data memory.
    #[inline]
    pub fn is_load(&self) -> bool {
        self.info().is_load
    }

    /// Whether this instruction writes data memory.
    #[inline]
    pub fn is_store(&self) -> bool {
        self.info().is_store
    }

    /// Whether this instruction changes control flow.
    #[inline]
    pub fn is_branch(&self) -> bool {
        self.info().is_branch()
    }

    /// Address of the next sequential instruction.
    #[inline]
    pub const fn npc(&self) -> u32 {
        self.pc.wrapping_add(crate::common::INSTRUCTION_WIDTH)
    }

    /// Resolved target of a branch or jump.
    #[inline]
    pub const fn branch_target(&self) -> u32 {
        self.npc().wrapping_add_signed(self.imm)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = |r: Option<Reg>| r.map_or_else(|| "?".to_string(), |r| r.to_string());
        match self.info().format {
            Format::Register => write!(
                f,
                "{} {} {} {}",
                self.opcode,
                reg(self.dst),
                reg(self.src1),
                reg(self.src2)
            ),
            Format::Immediate => write!(
                f,
                "{} {} {} {}",
                self.opcode,
                reg(self.dst),
                reg(self.src1),
                self.imm
            ),
            Format::Load => write!(
                f,
                "{} {} {}({})",
                self.opcode,
                reg(self.dst),
                self.imm,
                reg(self.src1)
            ),
            Format::Store => write!(
                f,
                "{} {} {}({})",
                self.opcode,
                reg(self.src2),
                self.imm,
                reg(self.src1)
            ),
            Format::Branch => write!(f, "{} {} {:+}", self.opcode, reg(self.src1), self.imm),
            Format::Jump => write!(f, "{} {:+}", self.opcode, self.imm),
            Format::None => write!(f, "{}", self.opcode),
        }
    }
}

/// A finalized, 0-indexed instruction array.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Wraps a decoded instruction sequence.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Number of instructions.
    #[inline]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the program has no instructions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// All instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Returns a copy with each instruction's `pc` stamped relative to `base`.
    pub fn relocated(&self, base: u32) -> Self {
        let instructions = self
            .instructions
            .iter()
            .zip(0u32..)
            .map(|(inst, i)| Instruction {
                pc: base.wrapping_add(i * crate::common::INSTRUCTION_WIDTH),
                ..*inst
            })
            .collect();
        Self { instructions }
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}
