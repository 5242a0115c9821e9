//! Assembly front end.
//!
//! Turns program text into a finalized [`Program`]. Syntax, one instruction
//! per line:
//!
//! ```text
//! loop:  LW    R1 0(R2)      # load
//!        ADDI  R2 R2 -4
//!        BNEZ  R2 loop
//!        EOP
//! ```
//!
//! Operands may be separated by whitespace or commas. A label alone on a line
//! binds to the next instruction. Branch labels resolve to byte offsets
//! relative to the instruction after the branch, so forward references are
//! patched once the label is seen.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::common::NUM_GP_REGISTERS;
use crate::isa::instruction::{Instruction, Program, Reg};
use crate::isa::opcode::{Format, Opcode};

/// Assembly failure, located by 1-based source line.
#[derive(Debug, Error)]
pub enum AsmError {
    /// The first token is neither an opcode nor a label.
    #[error("line {line}: unknown opcode `{token}`")]
    UnknownOpcode {
        /// Source line.
        line: usize,
        /// Offending token.
        token: String,
    },

    /// An operand is missing or has the wrong shape.
    #[error("line {line}: malformed operand `{token}` (expected {expected})")]
    BadOperand {
        /// Source line.
        line: usize,
        /// Offending token, empty if missing.
        token: String,
        /// What the parser was looking for.
        expected: &'static str,
    },

    /// Extra tokens after the last operand.
    #[error("line {line}: unexpected trailing token `{token}`")]
    TrailingToken {
        /// Source line.
        line: usize,
        /// First unexpected token.
        token: String,
    },

    /// The same label was defined twice.
    #[error("line {line}: duplicate label `{label}`")]
    DuplicateLabel {
        /// Source line of the second definition.
        line: usize,
        /// Label name.
        label: String,
    },

    /// A branch refers to a label that is never defined.
    #[error("line {line}: unresolved label `{label}`")]
    UnresolvedLabel {
        /// Source line of the branch.
        line: usize,
        /// Label name.
        label: String,
    },

    /// The source file could not be read.
    #[error("unable to read {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Reads and assembles a program file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Program, AsmError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| AsmError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&text)
}

/// Assembles program text.
pub fn parse(source: &str) -> Result<Program, AsmError> {
    let mut instructions = Vec::new();
    let mut labels: HashMap<String, usize> = HashMap::new();
    // Branches waiting for a label: (instruction index, label, source line).
    let mut pending: Vec<(usize, String, usize)> = Vec::new();

    for (lineno, raw) in source.lines().enumerate() {
        let line = lineno + 1;
        let text = strip_comment(raw);
        let mut tokens = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .peekable();

        let Some(mut first) = tokens.next() else {
            continue;
        };

        if let Some(label) = first.strip_suffix(':') {
            if labels.insert(label.to_string(), instructions.len()).is_some() {
                return Err(AsmError::DuplicateLabel {
                    line,
                    label: label.to_string(),
                });
            }
            match tokens.next() {
                Some(next) => first = next,
                None => continue,
            }
        }

        let opcode: Opcode = first.parse().map_err(|_| AsmError::UnknownOpcode {
            line,
            token: first.to_string(),
        })?;

        let mut operands = Operands { tokens, line };
        let index = instructions.len();
        let inst = match opcode.info().format {
            Format::Register => Instruction::register(
                opcode,
                operands.reg()?,
                operands.reg()?,
                operands.reg()?,
            ),
            Format::Immediate => {
                Instruction::immediate(opcode, operands.reg()?, operands.reg()?, operands.imm()?)
            }
            Format::Load => {
                let dst = operands.reg()?;
                let (imm, base) = operands.displacement()?;
                Instruction::load(opcode, dst, imm, base)
            }
            Format::Store => {
                let value = operands.reg()?;
                let (imm, base) = operands.displacement()?;
                Instruction::store(opcode, value, imm, base)
            }
            Format::Branch => {
                let cond = operands.reg()?;
                pending.push((index, operands.label()?, line));
                Instruction::branch(opcode, cond, 0)
            }
            Format::Jump => {
                pending.push((index, operands.label()?, line));
                Instruction::jump(0)
            }
            Format::None => match opcode {
                Opcode::Eop => Instruction::eop(),
                _ => Instruction::nop(),
            },
        };
        operands.finish()?;
        instructions.push(inst);
    }

    for (index, label, line) in pending {
        let target = labels
            .get(&label)
            .copied()
            .ok_or(AsmError::UnresolvedLabel { line, label })?;
        instructions[index].imm = label_offset(target, index);
    }

    Ok(Program::new(instructions))
}

/// Byte offset from the instruction after `from` to `target`.
fn label_offset(target: usize, from: usize) -> i32 {
    (target as i64 - from as i64 - 1) as i32 * crate::common::INSTRUCTION_WIDTH as i32
}

fn strip_comment(line: &str) -> &str {
    line.find(['#', ';']).map_or(line, |i| &line[..i])
}

struct Operands<'a, I: Iterator<Item = &'a str>> {
    tokens: std::iter::Peekable<I>,
    line: usize,
}

impl<'a, I: Iterator<Item = &'a str>> Operands<'a, I> {
    fn next(&mut self, expected: &'static str) -> Result<&'a str, AsmError> {
        self.tokens.next().ok_or(AsmError::BadOperand {
            line: self.line,
            token: String::new(),
            expected,
        })
    }

    fn bad(&self, token: &str, expected: &'static str) -> AsmError {
        AsmError::BadOperand {
            line: self.line,
            token: token.to_string(),
            expected,
        }
    }

    fn reg(&mut self) -> Result<Reg, AsmError> {
        let token = self.next("register")?;
        parse_reg(token).ok_or_else(|| self.bad(token, "register"))
    }

    fn imm(&mut self) -> Result<i32, AsmError> {
        let token = self.next("immediate")?;
        parse_imm(token).ok_or_else(|| self.bad(token, "immediate"))
    }

    fn label(&mut self) -> Result<String, AsmError> {
        Ok(self.next("label")?.to_string())
    }

    /// `imm(Rbase)`, tolerating a space before the parenthesis.
    fn displacement(&mut self) -> Result<(i32, Reg), AsmError> {
        let token = self.next("offset(base)")?;
        let joined;
        let split_base = !token.contains('(')
            && matches!(self.tokens.peek(), Some(next) if next.starts_with('('));
        let text = if split_base {
            joined = format!("{token}{}", self.next("offset(base)")?);
            joined.as_str()
        } else {
            token
        };
        let parsed = text.split_once('(').and_then(|(off, rest)| {
            let base = parse_reg(rest.strip_suffix(')')?)?;
            let imm = if off.is_empty() { 0 } else { parse_imm(off)? };
            Some((imm, base))
        });
        parsed.ok_or_else(|| self.bad(text, "offset(base)"))
    }

    fn finish(mut self) -> Result<(), AsmError> {
        match self.tokens.next() {
            Some(token) => Err(AsmError::TrailingToken {
                line: self.line,
                token: token.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn parse_reg(token: &str) -> Option<Reg> {
    let mut chars = token.chars();
    let float = match chars.next()? {
        'R' | 'r' => false,
        'F' | 'f' => true,
        _ => return None,
    };
    let num: usize = chars.as_str().parse().ok()?;
    (num < NUM_GP_REGISTERS).then_some(Reg { num, float })
}

fn parse_imm(token: &str) -> Option<i32> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let magnitude = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        i64::from(u32::from_str_radix(hex, 16).ok()?)
    } else {
        body.parse::<i64>().ok()?
    };
    let value = if negative { -magnitude } else { magnitude };
    // Hex literals may spell a full 32-bit pattern such as 0xFFFFFFFF.
    i32::try_from(value).ok().or_else(|| u32::try_from(value).ok().map(|v| v as i32))
}
