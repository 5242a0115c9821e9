//! System-wide constants.

/// Number of integer (general-purpose) architectural registers.
pub const NUM_GP_REGISTERS: usize = 32;

/// Number of floating-point architectural registers.
pub const NUM_FP_REGISTERS: usize = 32;

/// Size of one instruction in bytes; the program counter advances by this amount.
pub const INSTRUCTION_WIDTH: u32 = 4;

/// Size of one data-memory access in bytes. All accesses are aligned words.
pub const WORD_BYTES: u32 = 4;

/// Bit pattern used for "no value": uninitialized registers and memory.
pub const UNDEFINED: u32 = 0xFFFF_FFFF;

/// Byte value that freshly reset data memory is filled with.
pub const UNDEFINED_BYTE: u8 = 0xFF;
