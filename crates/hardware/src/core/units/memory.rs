//! Byte-addressable data memory.
//!
//! Every access is a little-endian 32-bit word at a word-aligned address.
//! Misaligned or out-of-range addresses are fatal and reported as
//! [`SimError`] instead of being clamped.

use crate::common::SimError;
use crate::common::constants::{UNDEFINED_BYTE, WORD_BYTES};

/// Flat data memory.
#[derive(Clone, Debug)]
pub struct DataMemory {
    bytes: Vec<u8>,
}

impl DataMemory {
    /// Creates `size` bytes of memory, every byte UNDEFINED.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![UNDEFINED_BYTE; size],
        }
    }

    /// Size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the memory has no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Resets every byte to UNDEFINED.
    pub fn reset(&mut self) {
        self.bytes.fill(UNDEFINED_BYTE);
    }

    fn word_range(&self, addr: u32) -> Result<std::ops::Range<usize>, SimError> {
        if addr % WORD_BYTES != 0 {
            return Err(SimError::UnalignedAccess(addr));
        }
        let start = addr as usize;
        let end = start + WORD_BYTES as usize;
        if end > self.bytes.len() {
            return Err(SimError::MemoryOutOfBounds {
                addr,
                size: self.bytes.len(),
            });
        }
        Ok(start..end)
    }

    /// Reads the word at `addr`.
    pub fn read_u32(&self, addr: u32) -> Result<u32, SimError> {
        let range = self.word_range(addr)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[range]);
        Ok(u32::from_le_bytes(word))
    }

    /// Writes `value` to the word at `addr`.
    pub fn write_u32(&mut self, addr: u32, value: u32) -> Result<(), SimError> {
        let range = self.word_range(addr)?;
        self.bytes[range].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}
