//! Common utilities and types used throughout the simulator.
//!
//! This module provides the building blocks shared by every pipeline component:
//! 1. **Constants:** Register counts, instruction width and the UNDEFINED pattern.
//! 2. **Error Handling:** The fatal `SimError` conditions raised by the core.
//! 3. **Bit Conversion:** Reinterpretation helpers between `u32` words and `f32`.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types for fatal simulator conditions.
pub mod error;

pub use constants::{INSTRUCTION_WIDTH, NUM_FP_REGISTERS, NUM_GP_REGISTERS, UNDEFINED};
pub use error::SimError;

/// Reinterprets a raw 32-bit word as an IEEE-754 single.
#[inline]
pub fn word_to_f32(word: u32) -> f32 {
    f32::from_bits(word)
}

/// Reinterprets an IEEE-754 single as its raw 32-bit word.
#[inline]
pub fn f32_to_word(value: f32) -> u32 {
    value.to_bits()
}
