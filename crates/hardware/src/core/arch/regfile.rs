//! Renamable architectural register file.
//!
//! Two banks (integer and floating point) of [`RegisterEntry`]. Each entry
//! holds the last committed value plus the ROB tag of the most recent
//! in-flight producer. Integer register `R0` reads as zero, drops writes and
//! is never renamed.

use crate::common::{NUM_FP_REGISTERS, NUM_GP_REGISTERS, UNDEFINED};
use crate::core::pipeline::rob::RobTag;
use crate::isa::instruction::Reg;

/// One architectural register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterEntry {
    /// Last committed value.
    pub value: u32,
    /// ROB tag of the outstanding producer; `Some` means busy.
    pub tag: Option<RobTag>,
}

impl RegisterEntry {
    const fn reset() -> Self {
        Self {
            value: UNDEFINED,
            tag: None,
        }
    }

    /// Whether an in-flight producer will overwrite this register.
    #[inline]
    pub const fn is_busy(&self) -> bool {
        self.tag.is_some()
    }
}

/// Integer and floating-point register banks.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    gpr: [RegisterEntry; NUM_GP_REGISTERS],
    fpr: [RegisterEntry; NUM_FP_REGISTERS],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a register file with every register UNDEFINED and not busy
    /// (`R0` reads as zero).
    pub fn new() -> Self {
        let mut gpr = [RegisterEntry::reset(); NUM_GP_REGISTERS];
        gpr[0].value = 0;
        Self {
            gpr,
            fpr: [RegisterEntry::reset(); NUM_FP_REGISTERS],
        }
    }

    #[inline]
    const fn is_zero(reg: Reg) -> bool {
        !reg.float && reg.num == 0
    }

    /// Entry for a register.
    #[inline]
    pub fn entry(&self, reg: Reg) -> &RegisterEntry {
        if reg.float {
            &self.fpr[reg.num]
        } else {
            &self.gpr[reg.num]
        }
    }

    #[inline]
    fn entry_mut(&mut self, reg: Reg) -> &mut RegisterEntry {
        if reg.float {
            &mut self.fpr[reg.num]
        } else {
            &mut self.gpr[reg.num]
        }
    }

    /// Committed value of a register.
    #[inline]
    pub fn value(&self, reg: Reg) -> u32 {
        self.entry(reg).value
    }

    /// Outstanding producer tag of a register, if any.
    #[inline]
    pub fn producer(&self, reg: Reg) -> Option<RobTag> {
        self.entry(reg).tag
    }

    /// Overwrites the committed value without touching the producer tag.
    pub fn write(&mut self, reg: Reg, value: u32) {
        if !Self::is_zero(reg) {
            self.entry_mut(reg).value = value;
        }
    }

    /// Marks `tag` as the newest producer of `reg`. A later rename always
    /// replaces an earlier one.
    pub fn set_producer(&mut self, reg: Reg, tag: RobTag) {
        if !Self::is_zero(reg) {
            self.entry_mut(reg).tag = Some(tag);
        }
    }

    /// Commits `value` produced by `tag`. The busy flag is cleared only if
    /// `tag` is still the newest producer; a younger renamer keeps it.
    pub fn commit(&mut self, reg: Reg, tag: RobTag, value: u32) {
        if Self::is_zero(reg) {
            return;
        }
        let entry = self.entry_mut(reg);
        entry.value = value;
        if entry.tag == Some(tag) {
            entry.tag = None;
        }
    }

    /// Clears every busy flag (squash recovery).
    pub fn clear_busy(&mut self) {
        for entry in self.gpr.iter_mut().chain(self.fpr.iter_mut()) {
            entry.tag = None;
        }
    }

    /// Whether any register in either bank is busy.
    pub fn any_busy(&self) -> bool {
        self.gpr.iter().chain(self.fpr.iter()).any(RegisterEntry::is_busy)
    }

    /// Integer bank in register order.
    pub fn gprs(&self) -> &[RegisterEntry] {
        &self.gpr
    }

    /// Floating-point bank in register order.
    pub fn fprs(&self) -> &[RegisterEntry] {
        &self.fpr
    }
}
