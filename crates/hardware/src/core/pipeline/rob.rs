//! Reorder Buffer (ROB) for in-order commit.
//!
//! The ROB is a fixed-capacity circular buffer that tracks in-flight
//! instructions from issue through commit. It provides:
//! 1. **Allocation:** Assigns each instruction a tag equal to its slot index.
//! 2. **Completion:** Records results broadcast by writeback.
//! 3. **In-order Commit:** Retires instructions from the head in program order.
//! 4. **Lookup:** O(1) peek by tag and by logical position, independently.
//! 5. **Flush:** Drains every entry on a misprediction squash.
//!
//! A tag is only meaningful while its slot is live; the slot cannot be
//! reallocated until the entry has been popped or flushed.

use std::fmt;

use crate::common::SimError;
use crate::isa::Instruction;

/// Tag identifying an in-flight instruction: its ROB slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RobTag(pub usize);

impl fmt::Display for RobTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline stage an instruction has most recently entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Stage {
    /// Renamed and waiting in a reservation station.
    #[default]
    Issue,
    /// Dispatched to a lane.
    Execute,
    /// Result broadcast.
    WriteResult,
    /// Retired.
    Commit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Issue => "ISSUE",
            Self::Execute => "EXE",
            Self::WriteResult => "WR",
            Self::Commit => "COMMIT",
        })
    }
}

/// Cycle at which each stage was entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StageTimes {
    /// Issue cycle.
    pub issue: Option<u64>,
    /// Dispatch-to-lane cycle.
    pub execute: Option<u64>,
    /// Writeback cycle.
    pub write_result: Option<u64>,
    /// Commit cycle.
    pub commit: Option<u64>,
}

/// Runtime wrapper around one static instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DynInst {
    /// The static instruction.
    pub inst: Instruction,
    /// Most recent stage.
    pub stage: Stage,
    /// Stage entry cycles.
    pub times: StageTimes,
}

impl DynInst {
    /// Creates a dynamic instance issued at `cycle`.
    pub fn issued(inst: Instruction, cycle: u64) -> Self {
        Self {
            inst,
            stage: Stage::Issue,
            times: StageTimes {
                issue: Some(cycle),
                ..StageTimes::default()
            },
        }
    }

    fn last_transition(&self) -> Option<u64> {
        let t = self.times;
        t.commit.or(t.write_result).or(t.execute).or(t.issue)
    }

    /// Moves to `stage` at `cycle`. Returns `false` without changing anything
    /// if the instruction already changed stage during `cycle` or the move
    /// would go backwards.
    pub fn advance(&mut self, stage: Stage, cycle: u64) -> bool {
        if stage <= self.stage || self.last_transition().is_some_and(|c| c >= cycle) {
            return false;
        }
        self.stage = stage;
        let slot = match stage {
            Stage::Issue => &mut self.times.issue,
            Stage::Execute => &mut self.times.execute,
            Stage::WriteResult => &mut self.times.write_result,
            Stage::Commit => &mut self.times.commit,
        };
        *slot = Some(cycle);
        true
    }
}

/// A single entry in the Reorder Buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RobEntry {
    /// Tag (slot index) of this entry.
    pub tag: RobTag,
    /// The owned dynamic instruction.
    pub dyn_inst: DynInst,
    /// Result has been broadcast.
    pub ready: bool,
    /// Result value, store data, or resolved branch target.
    pub value: u32,
    /// Effective address of a store once computable.
    pub dest: Option<u32>,
    /// Branch was taken while fetch assumed not-taken.
    pub mis_pred: bool,
    /// Remaining memory delay of a store draining at the head.
    pub store_delay: Option<u32>,
    /// Memory fault of a load, raised only if the load commits.
    pub fault: Option<SimError>,
}

impl RobEntry {
    /// The static instruction.
    #[inline]
    pub const fn inst(&self) -> &Instruction {
        &self.dyn_inst.inst
    }
}

/// Reorder Buffer — circular buffer for in-order commit.
#[derive(Debug)]
pub struct Rob {
    /// Fixed-size slot array; `None` marks a free slot.
    entries: Vec<Option<RobEntry>>,
    /// Index of the oldest entry (commit point).
    head: usize,
    /// Index where the next entry will be allocated.
    tail: usize,
    /// Number of live entries.
    count: usize,
}

impl Rob {
    /// Creates a new ROB with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, || None);
        Self {
            entries,
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Returns the ROB capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of occupied entries.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the ROB is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the ROB is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Returns the number of free slots.
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.entries.len() - self.count
    }

    /// Allocates the tail slot for an instruction issued at `cycle`.
    /// Returns `None` if the ROB is full.
    pub fn allocate(&mut self, inst: Instruction, cycle: u64) -> Option<RobTag> {
        if self.is_full() {
            return None;
        }

        let tag = RobTag(self.tail);
        self.entries[self.tail] = Some(RobEntry {
            tag,
            dyn_inst: DynInst::issued(inst, cycle),
            ready: false,
            value: 0,
            dest: None,
            mis_pred: false,
            store_delay: None,
            fault: None,
        });

        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
        Some(tag)
    }

    /// Entry for a live tag.
    #[inline]
    pub fn get(&self, tag: RobTag) -> Option<&RobEntry> {
        self.entries.get(tag.0).and_then(Option::as_ref)
    }

    /// Mutable entry for a live tag.
    #[inline]
    pub fn get_mut(&mut self, tag: RobTag) -> Option<&mut RobEntry> {
        self.entries.get_mut(tag.0).and_then(Option::as_mut)
    }

    /// Records a broadcast result. Ignores tags whose slot is no longer live.
    pub fn complete(&mut self, tag: RobTag, value: u32) {
        if let Some(entry) = self.get_mut(tag) {
            entry.ready = true;
            entry.value = value;
        }
    }

    /// Records the effective address of a store.
    pub fn set_store_address(&mut self, tag: RobTag, addr: u32) {
        if let Some(entry) = self.get_mut(tag) {
            entry.dest = Some(addr);
        }
    }

    /// Returns a reference to the head entry (oldest), if the ROB is non-empty.
    pub fn peek_head(&self) -> Option<&RobEntry> {
        if self.count == 0 {
            None
        } else {
            self.entries[self.head].as_ref()
        }
    }

    /// Returns a mutable reference to the head entry.
    pub fn peek_head_mut(&mut self) -> Option<&mut RobEntry> {
        if self.count == 0 {
            None
        } else {
            self.entries[self.head].as_mut()
        }
    }

    /// Entry at logical position `n` (0 = head, `len() - 1` = youngest).
    pub fn nth(&self, n: usize) -> Option<&RobEntry> {
        if n >= self.count {
            return None;
        }
        self.entries[(self.head + n) % self.entries.len()].as_ref()
    }

    /// Logical position of a live tag.
    pub fn position(&self, tag: RobTag) -> Option<usize> {
        self.get(tag)?;
        let cap = self.entries.len();
        Some((tag.0 + cap - self.head) % cap)
    }

    /// Removes and returns the head entry.
    pub fn pop_head(&mut self) -> Result<RobEntry, SimError> {
        if self.count == 0 {
            return Err(SimError::RobUnderflow);
        }
        let entry = self.entries[self.head].take().ok_or(SimError::RobUnderflow)?;
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
        Ok(entry)
    }

    /// Removes every entry, returning them oldest first.
    pub fn flush_all(&mut self) -> Vec<RobEntry> {
        let mut drained = Vec::with_capacity(self.count);
        for _ in 0..self.count {
            if let Some(entry) = self.entries[self.head].take() {
                drained.push(entry);
            }
            self.head = (self.head + 1) % self.entries.len();
        }
        self.head = 0;
        self.tail = 0;
        self.count = 0;
        drained
    }

    /// Iterates live entries from head (oldest) to tail (youngest).
    pub fn iter(&self) -> impl Iterator<Item = &RobEntry> + '_ {
        (0..self.count).filter_map(move |n| self.nth(n))
    }

    /// Iterates every physical slot in index order; `None` for free slots.
    pub fn slots(&self) -> impl Iterator<Item = Option<&RobEntry>> + '_ {
        self.entries.iter().map(Option::as_ref)
    }

    /// Physical index of the head slot.
    #[inline]
    pub const fn head_index(&self) -> usize {
        self.head
    }
}
