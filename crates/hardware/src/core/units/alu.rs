//! Shared integer/floating-point ALU.
//!
//! One ALU serves every execution-unit class. If either operand is tagged
//! as floating point, the operation runs in `f32`: float-tagged operands are
//! reinterpreted from their bit pattern and integer operands are converted
//! by value. Bitwise operations truncate both operands to integers first and
//! the result is re-encoded as a float bit pattern.
//!
//! Integer arithmetic is 32-bit two's complement with wrapping overflow.
//! Division by zero yields the UNDEFINED pattern instead of trapping.

use crate::common::{UNDEFINED, f32_to_word, word_to_f32};
use crate::isa::AluOp;

/// Arithmetic Logic Unit shared by all execution-unit classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alu;

impl Alu {
    /// Executes `op` on `a` and `b`; `a_float`/`b_float` tag each operand.
    ///
    /// # Examples
    ///
    /// ```
    /// use ooosim_core::core::units::alu::Alu;
    /// use ooosim_core::isa::AluOp;
    ///
    /// assert_eq!(Alu::execute(AluOp::Add, 5, 7, false, false), 12);
    /// assert_eq!(Alu::execute(AluOp::Sub, 1, 3, false, false), (-2i32) as u32);
    ///
    /// let sum = Alu::execute(AluOp::Add, 1.5f32.to_bits(), 2, true, false);
    /// assert_eq!(f32::from_bits(sum), 3.5);
    /// ```
    pub fn execute(op: AluOp, a: u32, b: u32, a_float: bool, b_float: bool) -> u32 {
        if a_float || b_float {
            Self::execute_float(op, Self::to_float(a, a_float), Self::to_float(b, b_float))
        } else {
            Self::execute_int(op, a as i32, b as i32) as u32
        }
    }

    #[inline]
    fn to_float(word: u32, is_float: bool) -> f32 {
        if is_float { word_to_f32(word) } else { word as i32 as f32 }
    }

    fn execute_int(op: AluOp, a: i32, b: i32) -> i32 {
        match op {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Xor => a ^ b,
            AluOp::Or => a | b,
            AluOp::And => a & b,
            AluOp::Mul => a.wrapping_mul(b),
            AluOp::Div => {
                if b == 0 {
                    UNDEFINED as i32
                } else {
                    a.wrapping_div(b)
                }
            }
            AluOp::Pass => a,
        }
    }

    fn execute_float(op: AluOp, a: f32, b: f32) -> u32 {
        let result = match op {
            AluOp::Add => a + b,
            AluOp::Sub => a - b,
            AluOp::Mul => a * b,
            AluOp::Div => a / b,
            AluOp::Xor => ((a as i32) ^ (b as i32)) as f32,
            AluOp::Or => ((a as i32) | (b as i32)) as f32,
            AluOp::And => ((a as i32) & (b as i32)) as f32,
            AluOp::Pass => a,
        };
        f32_to_word(result)
    }
}
