#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system responsible for laying out the roster of a new round.
//!
//! Every random draw goes through the caller's [`Rng`], so a seeded generator
//! reproduces the same layout.

use std::ops::RangeInclusive;

use light_bike_core::{
    AgentColor, AgentKind, AgentSeed, CellCoord, GridSize, Heading, DEFAULT_PLAYER_NAME, PALETTE,
};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

/// Placement parameters for the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cells kept clear between spawn points and the grid border.
    pub margin: u32,
    /// Random draws attempted before giving up on a free cell.
    pub max_attempts: u32,
    /// Cell used when every attempt hit an occupied cell.
    pub fallback: CellCoord,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            margin: 3,
            max_attempts: 300,
            fallback: CellCoord::new(10, 10),
        }
    }
}

/// Outcome of a single placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// A free cell was drawn within the attempt budget.
    Free(CellCoord),
    /// The attempt budget ran out; the cell may already be taken.
    Fallback(CellCoord),
}

impl Placement {
    /// Cell chosen by the placement.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        match self {
            Self::Free(cell) | Self::Fallback(cell) => *cell,
        }
    }
}

/// Pure system that builds spawn seeds for a round.
#[derive(Clone, Debug, Default)]
pub struct Spawning {
    config: Config,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Configuration the system was created with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Builds one player followed by `bot_count` bots.
    ///
    /// The player receives a random palette color; bots draw from the palette
    /// without the player's color. Bots are named `Bot1..=BotN`.
    pub fn roster<R: Rng>(
        &self,
        grid: GridSize,
        player_name: &str,
        bot_count: u32,
        rng: &mut R,
    ) -> Vec<AgentSeed> {
        let capacity = usize::try_from(bot_count).unwrap_or(0).saturating_add(1);
        let mut seeds: Vec<AgentSeed> = Vec::with_capacity(capacity);
        let mut taken: Vec<CellCoord> = Vec::with_capacity(capacity);

        let player_color = pick_color(&PALETTE, rng);
        let name = match player_name.trim() {
            "" => DEFAULT_PLAYER_NAME.to_owned(),
            trimmed => trimmed.to_owned(),
        };
        seeds.push(self.seed(name, player_color, AgentKind::Player, grid, &mut taken, rng));

        let bot_palette: Vec<AgentColor> = PALETTE
            .iter()
            .copied()
            .filter(|color| *color != player_color)
            .collect();
        for index in 1..=bot_count {
            let color = pick_color(&bot_palette, rng);
            seeds.push(self.seed(
                format!("Bot{index}"),
                color,
                AgentKind::Bot,
                grid,
                &mut taken,
                rng,
            ));
        }

        seeds
    }

    /// Draws a spawn cell that is not in `taken`, falling back to the
    /// configured default cell when the attempt budget runs out.
    pub fn place<R: Rng>(&self, grid: GridSize, taken: &[CellCoord], rng: &mut R) -> Placement {
        let columns = spawn_range(grid.columns(), self.config.margin);
        let rows = spawn_range(grid.rows(), self.config.margin);

        if let (Some(columns), Some(rows)) = (columns, rows) {
            for _ in 0..self.config.max_attempts {
                let cell = CellCoord::new(
                    rng.gen_range(columns.clone()),
                    rng.gen_range(rows.clone()),
                );
                if !taken.contains(&cell) {
                    return Placement::Free(cell);
                }
            }
        }

        let fallback = CellCoord::new(
            self.config
                .fallback
                .column()
                .min(grid.columns().saturating_sub(1)),
            self.config.fallback.row().min(grid.rows().saturating_sub(1)),
        );
        tracing::warn!(
            attempts = self.config.max_attempts,
            column = fallback.column(),
            row = fallback.row(),
            "spawn placement exhausted; using fallback cell"
        );
        Placement::Fallback(fallback)
    }

    fn seed<R: Rng>(
        &self,
        name: String,
        color: AgentColor,
        kind: AgentKind,
        grid: GridSize,
        taken: &mut Vec<CellCoord>,
        rng: &mut R,
    ) -> AgentSeed {
        let cell = self.place(grid, taken, rng).cell();
        taken.push(cell);
        let heading = Heading::ALL
            .choose(rng)
            .copied()
            .unwrap_or(Heading::Right);
        AgentSeed {
            name,
            color,
            kind,
            cell,
            heading,
        }
    }
}

/// Inclusive range of spawnable indices along one axis. The margin is dropped
/// when the axis is too short to honour it.
fn spawn_range(extent: u32, margin: u32) -> Option<RangeInclusive<u32>> {
    let last = extent.checked_sub(1)?;
    match margin.checked_mul(2) {
        Some(both) if both < extent => Some(margin..=last - margin),
        _ => Some(0..=last),
    }
}

fn pick_color<R: Rng>(palette: &[AgentColor], rng: &mut R) -> AgentColor {
    palette.choose(rng).copied().unwrap_or(PALETTE[0])
}
