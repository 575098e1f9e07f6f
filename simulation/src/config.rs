//! Host-overridable configuration for a simulation.

use std::time::Duration;

use light_bike_core::GridSize;
use light_bike_system_chaser::Tuning;
use light_bike_system_progression::Config as ProgressionConfig;
use light_bike_system_spawning::Config as SpawnConfig;
use serde::{Deserialize, Serialize};

/// Aggregated tuning surface for the arena.
///
/// Every section falls back to its defaults when omitted, so hosts may
/// deserialize a partial document and override only what they need.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Play-area geometry the grid is derived from.
    pub grid: GridConfig,
    /// Cadence hosts should call `tick` at.
    pub timing: TimingConfig,
    /// Bot decision tuning.
    pub bots: Tuning,
    /// Spawn placement parameters.
    pub spawn: SpawnConfig,
    /// Level curve and bot cap.
    pub progression: ProgressionConfig,
}

/// Play area measured in pixels and the pixel size of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Width of the play area.
    pub play_area_width: u32,
    /// Height of the play area.
    pub play_area_height: u32,
    /// Side length of one square cell.
    pub cell_size: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            play_area_width: 800,
            play_area_height: 600,
            cell_size: 8,
        }
    }
}

impl GridConfig {
    /// Grid dimensions derived from the play area; 100×75 by default.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        GridSize::from_play_area(self.play_area_width, self.play_area_height, self.cell_size)
    }
}

/// Tick cadence. The simulation never sleeps; this is advice for drivers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Milliseconds between ticks (25 steps per second by default).
    pub tick_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 40,
        }
    }
}

impl TimingConfig {
    /// Interval between ticks.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
