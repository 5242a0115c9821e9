//! Configuration system for the simulator.
//!
//! This module defines all configuration structures used to parameterize the
//! machine. It provides:
//! 1. **Defaults:** Baseline sizes for memory, ROB, reservation stations and lanes.
//! 2. **Structures:** Hierarchical config for general, memory, pipeline and unit settings.
//! 3. **Validation:** Rejects configurations that cannot describe a working machine.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built from
//! `Config::default()` and adjusted field by field.

use serde::Deserialize;

use crate::common::SimError;
use crate::isa::ExecUnit;

/// Default configuration constants for the simulator.
mod defaults {
    /// Address the first instruction is loaded at.
    pub const BASE_ADDRESS: u32 = 0x0000_0000;

    /// Data memory size in bytes (64 KiB).
    pub const MEMORY_SIZE: usize = 64 * 1024;

    /// Reorder buffer entries.
    pub const ROB_SIZE: usize = 8;

    /// Instructions fetched and dispatched per cycle.
    pub const ISSUE_WIDTH: usize = 2;

    /// Integer reservation stations.
    pub const INT_STATIONS: usize = 4;

    /// Floating-point add reservation stations.
    pub const ADD_STATIONS: usize = 2;

    /// Multiply/divide reservation stations.
    pub const MULT_STATIONS: usize = 2;

    /// Load/store buffers.
    pub const LOAD_STATIONS: usize = 4;

    /// `(latency, instances)` of the integer unit.
    pub const INTEGER_UNIT: (u32, usize) = (1, 2);

    /// `(latency, instances)` of the floating-point adder.
    pub const ADDER_UNIT: (u32, usize) = (2, 1);

    /// `(latency, instances)` of the multiplier.
    pub const MULTIPLIER_UNIT: (u32, usize) = (4, 1);

    /// `(latency, instances)` of the divider.
    pub const DIVIDER_UNIT: (u32, usize) = (8, 1);

    /// `(latency, instances)` of the memory unit.
    pub const MEMORY_UNIT: (u32, usize) = (2, 1);
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use ooosim_core::config::Config;
///
/// let json = r#"{
///     "pipeline": { "rob_size": 16, "issue_width": 4 },
///     "units": { "memory": { "latency": 3, "instances": 1 } }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.pipeline.rob_size, 16);
/// assert_eq!(config.units.memory.latency, 3);
/// assert_eq!(config.units.integer.latency, 1);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General simulation settings
    pub general: GeneralConfig,
    /// Data memory configuration
    pub memory: MemoryConfig,
    /// Reorder buffer, issue width and reservation station sizes
    pub pipeline: PipelineConfig,
    /// Execution unit latencies and lane counts
    pub units: UnitsConfig,
}

impl Config {
    /// Parses a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every size, count and latency describes a working machine.
    pub fn validate(&self) -> Result<(), SimError> {
        let fail = |msg: String| Err(SimError::InvalidConfig(msg));

        if self.memory.size == 0 || self.memory.size % 4 != 0 {
            return fail(format!(
                "memory size {} must be a non-zero multiple of 4",
                self.memory.size
            ));
        }
        if self.general.base_address % 4 != 0 {
            return fail(format!(
                "base address {:#x} must be word aligned",
                self.general.base_address
            ));
        }
        let p = &self.pipeline;
        for (name, value) in [
            ("rob_size", p.rob_size),
            ("issue_width", p.issue_width),
            ("int_stations", p.int_stations),
            ("add_stations", p.add_stations),
            ("mult_stations", p.mult_stations),
            ("load_stations", p.load_stations),
        ] {
            if value == 0 {
                return fail(format!("pipeline.{name} must be at least 1"));
            }
        }
        for unit in ExecUnit::ALL {
            let u = self.units.get(unit);
            if u.latency == 0 || u.instances == 0 {
                return fail(format!(
                    "unit {unit:?} needs latency >= 1 and instances >= 1 (got {}, {})",
                    u.latency, u.instances
                ));
            }
        }
        Ok(())
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Address of the first instruction; `pc` starts here.
    pub base_address: u32,
    /// Emit per-stage trace events (consumed by a `tracing` subscriber).
    pub trace: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            base_address: defaults::BASE_ADDRESS,
            trace: false,
        }
    }
}

/// Data memory settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Size of byte-addressable data memory.
    pub size: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size: defaults::MEMORY_SIZE,
        }
    }
}

/// Out-of-order window sizing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Reorder buffer entries.
    pub rob_size: usize,
    /// Maximum instructions fetched and dispatched per cycle.
    pub issue_width: usize,
    /// Integer reservation stations.
    pub int_stations: usize,
    /// Floating-point add reservation stations.
    pub add_stations: usize,
    /// Multiply/divide reservation stations.
    pub mult_stations: usize,
    /// Load/store buffers.
    pub load_stations: usize,
    /// Hold loads out of the memory unit while a committing store drains.
    pub store_interlock: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rob_size: defaults::ROB_SIZE,
            issue_width: defaults::ISSUE_WIDTH,
            int_stations: defaults::INT_STATIONS,
            add_stations: defaults::ADD_STATIONS,
            mult_stations: defaults::MULT_STATIONS,
            load_stations: defaults::LOAD_STATIONS,
            store_interlock: true,
        }
    }
}

/// Latency and lane count of one execution-unit class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UnitConfig {
    /// Cycles an operation occupies a lane.
    pub latency: u32,
    /// Number of lanes (concurrent operations).
    pub instances: usize,
}

impl UnitConfig {
    const fn from_pair((latency, instances): (u32, usize)) -> Self {
        Self { latency, instances }
    }
}

/// Execution unit configuration, one entry per class.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    /// Integer ALU and branch unit.
    pub integer: UnitConfig,
    /// Floating-point adder.
    pub adder: UnitConfig,
    /// Multiplier.
    pub multiplier: UnitConfig,
    /// Divider.
    pub divider: UnitConfig,
    /// Memory unit; its latency also times a committing store.
    pub memory: UnitConfig,
}

impl UnitsConfig {
    /// Configuration of one unit class.
    pub const fn get(&self, unit: ExecUnit) -> UnitConfig {
        match unit {
            ExecUnit::Integer => self.integer,
            ExecUnit::Adder => self.adder,
            ExecUnit::Multiplier => self.multiplier,
            ExecUnit::Divider => self.divider,
            ExecUnit::Memory => self.memory,
        }
    }

    /// Mutable configuration of one unit class.
    pub const fn get_mut(&mut self, unit: ExecUnit) -> &mut UnitConfig {
        match unit {
            ExecUnit::Integer => &mut self.integer,
            ExecUnit::Adder => &mut self.adder,
            ExecUnit::Multiplier => &mut self.multiplier,
            ExecUnit::Divider => &mut self.divider,
            ExecUnit::Memory => &mut self.memory,
        }
    }
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            integer: UnitConfig::from_pair(defaults::INTEGER_UNIT),
            adder: UnitConfig::from_pair(defaults::ADDER_UNIT),
            multiplier: UnitConfig::from_pair(defaults::MULTIPLIER_UNIT),
            divider: UnitConfig::from_pair(defaults::DIVIDER_UNIT),
            memory: UnitConfig::from_pair(defaults::MEMORY_UNIT),
        }
    }
}
