//! Reservation stations.
//!
//! One [`StationPool`] per [`StationKind`] holds renamed operations until
//! both operands are available. Operands are either a resolved value or the
//! ROB tag of the producer to wait for; a writeback broadcast replaces the
//! tag with the value in every pool at once.
//!
//! Removal is two-phase: writeback only marks an entry as retiring, and
//! [`Stations::finalize`] erases marked entries after every stage of the
//! cycle has run.

use crate::core::pipeline::rob::RobTag;
use crate::isa::{Instruction, StationKind};

/// One source operand of a pending operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// The value is known.
    Ready(u32),
    /// Waiting for the broadcast of this ROB tag.
    Pending(RobTag),
}

impl Operand {
    /// Whether the value is known.
    #[inline]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Resolved value, if any.
    #[inline]
    pub const fn value(self) -> Option<u32> {
        match self {
            Self::Ready(v) => Some(v),
            Self::Pending(_) => None,
        }
    }

    /// Producer tag, if still waiting.
    #[inline]
    pub const fn tag(self) -> Option<RobTag> {
        match self {
            Self::Ready(_) => None,
            Self::Pending(t) => Some(t),
        }
    }

    /// Captures a broadcast. Returns true if this operand was waiting on `tag`.
    pub fn capture(&mut self, tag: RobTag, value: u32) -> bool {
        if *self == Self::Pending(tag) {
            *self = Self::Ready(value);
            true
        } else {
            false
        }
    }
}

/// A pending operation in a reservation station.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsEntry {
    /// Allocation order, used for display and oldest-first dispatch.
    pub id: u64,
    /// ROB tag of this operation; the identity its result is broadcast under.
    pub tag: RobTag,
    /// The static instruction.
    pub inst: Instruction,
    /// Operand A (ALU source 1, branch condition, memory base) and operand B
    /// (ALU source 2 or immediate, store value).
    pub ops: [Operand; 2],
    /// Whether each operand is a floating-point value.
    pub float: [bool; 2],
    /// Effective address of a load or store once the base is known.
    pub addr: Option<u32>,
    /// Already handed to a lane.
    pub in_exec: bool,
    /// Result broadcast this cycle; erased at finalize.
    pub retiring: bool,
}

impl RsEntry {
    /// Both operands are known.
    #[inline]
    pub fn operands_ready(&self) -> bool {
        self.ops.iter().all(|op| op.is_ready())
    }

    /// Operands are ready and the entry has not been dispatched.
    #[inline]
    pub fn can_dispatch(&self) -> bool {
        !self.in_exec && !self.retiring && self.operands_ready()
    }

    /// Computes the effective address once the base operand is known.
    /// Returns the address only on the call that first resolves it.
    pub fn resolve_address(&mut self) -> Option<u32> {
        let info = self.inst.info();
        if self.addr.is_some() || !(info.is_load || info.is_store) {
            return None;
        }
        let base = self.ops[0].value()?;
        let addr = base.wrapping_add(self.inst.imm as u32);
        self.addr = Some(addr);
        Some(addr)
    }

    /// Value of operand `i`, or 0 while pending.
    #[inline]
    pub fn value(&self, i: usize) -> u32 {
        self.ops[i].value().unwrap_or(0)
    }
}

/// Fixed-capacity pool of reservation stations of one kind.
#[derive(Clone, Debug)]
pub struct StationPool {
    kind: StationKind,
    capacity: usize,
    entries: Vec<RsEntry>,
}

impl StationPool {
    /// Creates an empty pool.
    pub fn new(kind: StationKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Pool kind.
    #[inline]
    pub const fn kind(&self) -> StationKind {
        self.kind
    }

    /// Number of stations.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Occupied stations, including entries retiring this cycle.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No station is occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every station is occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Occupies a station. The caller checks [`Self::is_full`] first;
    /// returns false without side effects if the pool is full.
    pub fn insert(&mut self, entry: RsEntry) -> bool {
        if self.is_full() {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Entries in allocation order.
    pub fn entries(&self) -> &[RsEntry] {
        &self.entries
    }

    /// Mutable entries in allocation order.
    pub fn entries_mut(&mut self) -> &mut [RsEntry] {
        &mut self.entries
    }

    /// Entry owning `tag`.
    pub fn find(&self, tag: RobTag) -> Option<&RsEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// Mutable entry owning `tag`.
    pub fn find_mut(&mut self, tag: RobTag) -> Option<&mut RsEntry> {
        self.entries.iter_mut().find(|e| e.tag == tag)
    }

    fn finalize(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.retiring);
        before - self.entries.len()
    }
}

/// All reservation-station pools.
#[derive(Clone, Debug)]
pub struct Stations {
    pools: [StationPool; 4],
    next_id: u64,
}

impl Stations {
    /// Creates pools with the given `[int, add, mult, load]` capacities.
    pub fn new(capacities: [usize; 4]) -> Self {
        Self {
            pools: StationKind::ALL.map(|kind| StationPool::new(kind, capacities[kind.index()])),
            next_id: 0,
        }
    }

    /// Pool of one kind.
    #[inline]
    pub fn pool(&self, kind: StationKind) -> &StationPool {
        &self.pools[kind.index()]
    }

    /// Mutable pool of one kind.
    #[inline]
    pub fn pool_mut(&mut self, kind: StationKind) -> &mut StationPool {
        &mut self.pools[kind.index()]
    }

    /// All pools in scan order.
    pub fn pools(&self) -> &[StationPool] {
        &self.pools
    }

    /// Builds a new entry with the next allocation id.
    pub fn entry(&mut self, tag: RobTag, inst: Instruction, ops: [Operand; 2], float: [bool; 2]) -> RsEntry {
        let id = self.next_id;
        self.next_id += 1;
        RsEntry {
            id,
            tag,
            inst,
            ops,
            float,
            addr: None,
            in_exec: false,
            retiring: false,
        }
    }

    /// Delivers a `(tag, value)` broadcast to every waiting operand in every
    /// pool. Returns the number of operands woken.
    pub fn broadcast(&mut self, tag: RobTag, value: u32) -> usize {
        let mut woken = 0;
        for entry in self.pools.iter_mut().flat_map(|p| p.entries.iter_mut()) {
            for op in &mut entry.ops {
                if op.capture(tag, value) {
                    woken += 1;
                }
            }
        }
        woken
    }

    /// Resolves load/store addresses whose base became known. Returns
    /// `(tag, addr)` for every store resolved by this call, so the caller can
    /// publish the address to the ROB.
    pub fn resolve_addresses(&mut self) -> Vec<(RobTag, u32)> {
        let mut stores = Vec::new();
        for entry in &mut self.pools[StationKind::Load.index()].entries {
            if let Some(addr) = entry.resolve_address()
                && entry.inst.is_store()
            {
                stores.push((entry.tag, addr));
            }
        }
        stores
    }

    /// Schedules the entry owning `tag` for removal at finalize.
    pub fn mark_retiring(&mut self, tag: RobTag) {
        for pool in &mut self.pools {
            if let Some(entry) = pool.find_mut(tag) {
                entry.retiring = true;
                return;
            }
        }
    }

    /// Erases every entry marked for removal. Returns how many were erased.
    pub fn finalize(&mut self) -> usize {
        self.pools.iter_mut().map(StationPool::finalize).sum()
    }

    /// Empties every pool (squash).
    pub fn clear(&mut self) {
        for pool in &mut self.pools {
            pool.entries.clear();
        }
    }

    /// No pool holds an entry.
    pub fn is_empty(&self) -> bool {
        self.pools.iter().all(StationPool::is_empty)
    }

    /// Whether any entry still waits on `tag`.
    pub fn references(&self, tag: RobTag) -> bool {
        self.pools
            .iter()
            .flat_map(|p| p.entries.iter())
            .any(|e| e.ops.iter().any(|op| op.tag() == Some(tag)))
    }
}
