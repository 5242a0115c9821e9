//! Timed execution lanes.
//!
//! Every [`ExecUnit`] class owns a [`FunctionalUnit`]: an array of lanes,
//! each holding at most one in-flight [`LaneOp`] and a countdown. A lane
//! becomes terminal when its countdown reaches zero; the result is computed
//! at that moment and stays in the lane until writeback frees it.
//!
//! Stores and bypass-satisfied loads skip the timed lanes and go to the
//! [`BypassLane`], where they complete in the cycle they enter.
//!
//! A load whose memory access fails does not stop the machine: the fault
//! travels with the result and is only raised if the load commits.

use crate::common::{SimError, UNDEFINED};
use crate::core::pipeline::rob::RobTag;
use crate::isa::{ExecUnit, Instruction};

/// Value produced by a finished operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaneResult {
    /// Register value, store data, or resolved next pc for branches.
    pub value: u32,
    /// A branch was taken (fetch assumed not-taken).
    pub mis_pred: bool,
    /// Memory fault deferred to commit.
    pub fault: Option<SimError>,
}

impl LaneResult {
    /// A plain value.
    #[inline]
    pub const fn value(value: u32) -> Self {
        Self {
            value,
            mis_pred: false,
            fault: None,
        }
    }

    /// A failed memory access. The value is UNDEFINED.
    pub fn fault(fault: SimError) -> Self {
        Self {
            value: UNDEFINED,
            mis_pred: false,
            fault: Some(fault),
        }
    }
}

/// An operation in flight in a lane, carrying everything needed to compute
/// its result without looking back at its reservation station.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaneOp {
    /// ROB tag the result will be broadcast under.
    pub tag: RobTag,
    /// The static instruction.
    pub inst: Instruction,
    /// Operand values.
    pub ops: [u32; 2],
    /// Floating-point tags of the operands.
    pub float: [bool; 2],
    /// Effective address for memory operations.
    pub addr: Option<u32>,
    /// Result, once the countdown has expired.
    pub result: Option<LaneResult>,
}

impl LaneOp {
    /// Whether the result has been computed.
    #[inline]
    pub const fn is_done(&self) -> bool {
        self.result.is_some()
    }
}

/// One concurrent operation slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lane {
    /// Occupying operation.
    pub op: Option<LaneOp>,
    /// Cycles left before the result is computed.
    pub ttl: u32,
}

impl Lane {
    /// No operation occupies this lane.
    #[inline]
    pub const fn is_free(&self) -> bool {
        self.op.is_none()
    }
}

/// Lanes of one execution-unit class.
#[derive(Clone, Debug)]
pub struct FunctionalUnit {
    unit: ExecUnit,
    latency: u32,
    lanes: Vec<Lane>,
}

impl FunctionalUnit {
    /// Creates `instances` free lanes with the given latency.
    pub fn new(unit: ExecUnit, latency: u32, instances: usize) -> Self {
        Self {
            unit,
            latency,
            lanes: vec![Lane::default(); instances],
        }
    }

    /// Unit class.
    #[inline]
    pub const fn unit(&self) -> ExecUnit {
        self.unit
    }

    /// Cycles an operation occupies a lane.
    #[inline]
    pub const fn latency(&self) -> u32 {
        self.latency
    }

    /// All lanes.
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Whether some lane can accept an operation.
    pub fn has_free_lane(&self) -> bool {
        self.lanes.iter().any(Lane::is_free)
    }

    /// Places `op` in the first free lane with a full countdown.
    /// Returns false if every lane is occupied.
    pub fn dispatch(&mut self, op: LaneOp) -> bool {
        let latency = self.latency;
        match self.lanes.iter_mut().find(|l| l.is_free()) {
            Some(lane) => {
                *lane = Lane {
                    op: Some(op),
                    ttl: latency,
                };
                true
            }
            None => false,
        }
    }

    /// Advances every counting lane by one cycle. Lanes reaching zero get
    /// their result from `finish`. Returns the number of lanes that finished.
    pub fn tick<F>(&mut self, mut finish: F) -> Result<usize, SimError>
    where
        F: FnMut(&LaneOp) -> Result<LaneResult, SimError>,
    {
        let mut finished = 0;
        for lane in &mut self.lanes {
            let Some(op) = lane.op.as_mut() else {
                continue;
            };
            if lane.ttl == 0 {
                continue;
            }
            lane.ttl -= 1;
            if lane.ttl == 0 {
                op.result = Some(finish(op)?);
                finished += 1;
            }
        }
        Ok(finished)
    }

    /// Removes and returns every operation whose result is ready.
    pub fn drain_done(&mut self) -> Vec<LaneOp> {
        let mut done = Vec::new();
        for lane in &mut self.lanes {
            if lane.op.as_ref().is_some_and(LaneOp::is_done) {
                done.extend(lane.op.take());
                lane.ttl = 0;
            }
        }
        done
    }

    /// Frees every lane.
    pub fn clear(&mut self) {
        self.lanes.fill(Lane::default());
    }

    /// Whether any lane is occupied.
    pub fn is_busy(&self) -> bool {
        self.lanes.iter().any(|l| !l.is_free())
    }
}

/// Zero-extra-latency lane for stores and forwarded loads.
#[derive(Clone, Debug, Default)]
pub struct BypassLane {
    ops: Vec<LaneOp>,
}

impl BypassLane {
    /// Adds a finished operation; it is written back next cycle.
    pub fn push(&mut self, op: LaneOp) {
        self.ops.push(op);
    }

    /// Removes and returns every pending operation in entry order.
    pub fn drain(&mut self) -> Vec<LaneOp> {
        std::mem::take(&mut self.ops)
    }

    /// Pending operations.
    pub fn ops(&self) -> &[LaneOp] {
        &self.ops
    }

    /// Discards everything.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Every functional unit plus the bypass lane.
#[derive(Clone, Debug)]
pub struct ExecUnits {
    units: [FunctionalUnit; 5],
    /// Operations that skip the timed lanes.
    pub bypass: BypassLane,
}

impl ExecUnits {
    /// Builds one functional unit per class from `(latency, instances)`.
    pub fn new(config: impl Fn(ExecUnit) -> (u32, usize)) -> Self {
        Self {
            units: ExecUnit::ALL.map(|unit| {
                let (latency, instances) = config(unit);
                FunctionalUnit::new(unit, latency, instances)
            }),
            bypass: BypassLane::default(),
        }
    }

    /// Functional unit of one class.
    #[inline]
    pub fn unit(&self, unit: ExecUnit) -> &FunctionalUnit {
        &self.units[unit.index()]
    }

    /// Mutable functional unit of one class.
    #[inline]
    pub fn unit_mut(&mut self, unit: ExecUnit) -> &mut FunctionalUnit {
        &mut self.units[unit.index()]
    }

    /// All functional units in class order.
    pub fn units(&self) -> &[FunctionalUnit] {
        &self.units
    }

    /// Frees every lane and the bypass lane (squash).
    pub fn clear(&mut self) {
        for unit in &mut self.units {
            unit.clear();
        }
        self.bypass.clear();
    }

    /// Whether any work is in flight.
    pub fn is_busy(&self) -> bool {
        !self.bypass.is_empty() || self.units.iter().any(FunctionalUnit::is_busy)
    }
}
