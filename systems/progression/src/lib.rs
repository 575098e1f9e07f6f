#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level progression that sits on top of the round simulation.
//!
//! The simulation itself has no notion of levels. This system maps a level
//! number to the size of the bot roster and decides what follows a finished
//! round: the next level when the player survived, game over otherwise.

use serde::{Deserialize, Serialize};

/// Knobs controlling how difficulty ramps with the level number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bots present before the per-level increase is applied.
    pub base_bots: u32,
    /// Extra bots added for every level.
    pub bots_per_level: u32,
    /// Hard ceiling on the bot roster.
    pub max_bots: u32,
    /// Highest reachable level; levels start at one.
    pub max_level: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_bots: 2,
            bots_per_level: 2,
            max_bots: 50,
            max_level: 50,
        }
    }
}

impl Config {
    /// Number of bots spawned for `level`: `min(max_bots, base + per_level × level)`.
    #[must_use]
    pub fn bot_count_for_level(&self, level: u32) -> u32 {
        self.bots_per_level
            .saturating_mul(level)
            .saturating_add(self.base_bots)
            .min(self.max_bots)
    }

    /// Clamps a requested level into `1..=max_level`.
    #[must_use]
    pub fn clamp_level(&self, level: u32) -> u32 {
        level.clamp(1, self.max_level.max(1))
    }
}

/// What happens after a round finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The player won; play continues at the contained level.
    NextLevel(u32),
    /// The player did not win; the run ends at the contained level.
    GameOver(u32),
}

/// Tracks the current level of a run.
#[derive(Clone, Debug)]
pub struct Progression {
    config: Config,
    level: u32,
}

impl Progression {
    /// Starts a run at `start_level`, clamped into the valid range.
    #[must_use]
    pub fn new(config: Config, start_level: u32) -> Self {
        let level = config.clamp_level(start_level);
        Self { config, level }
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Bots to spawn for the current level.
    #[must_use]
    pub fn bot_count(&self) -> u32 {
        self.config.bot_count_for_level(self.level)
    }

    /// Records the outcome of the round played at the current level.
    pub fn record_round(&mut self, player_won: bool) -> Advance {
        if player_won {
            self.level = self.config.clamp_level(self.level.saturating_add(1));
            Advance::NextLevel(self.level)
        } else {
            Advance::GameOver(self.level)
        }
    }
}
