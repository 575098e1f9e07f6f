#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bot decision policy that keeps bikes alive while steering toward a target.
//!
//! Each tick a bot weighs four candidate headings in a fixed order (straight,
//! left, right, back). A candidate is safe when the bot could keep travelling
//! along it for the configured look-ahead without touching a wall or a trail.
//! Among safe candidates the bot occasionally wanders at random, otherwise it
//! chases the target or keeps cruising. After every decision the bot commits
//! to its heading for a short cooldown so it does not jitter between choices.

use light_bike_core::{CellCoord, Heading, OccupancyView};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

/// Tuning knobs governing bot behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Cells simulated ahead when judging whether a heading is safe.
    pub look_ahead: u32,
    /// Probability of picking a random safe heading instead of chasing.
    pub random_turn_probability: f64,
    /// Upper bound on how far ahead a chase projection reaches; the effective
    /// depth is the smaller of this and `look_ahead`.
    pub chase_projection: u32,
    /// Ticks a cornered bot keeps its desperate heading.
    pub cornered_cooldown: u32,
    /// Ticks a bot keeps its heading after any other decision.
    pub turn_cooldown: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            look_ahead: 12,
            random_turn_probability: 0.02,
            chase_projection: 6,
            cornered_cooldown: 4,
            turn_cooldown: 6,
        }
    }
}

/// Why a bot picked its heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// No candidate was safe; the heading is a random guess.
    Cornered,
    /// A random safe heading was picked.
    Wander,
    /// The safe heading that closes in on the target was picked.
    Chase,
    /// No target was available; the first safe heading was picked.
    Cruise,
}

/// Heading chosen by the policy together with the cooldown it earns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Heading the bot should travel along.
    pub heading: Heading,
    /// Ticks to skip before deciding again.
    pub cooldown: u32,
    /// Branch of the policy that produced the heading.
    pub intent: Intent,
}

/// Candidate headings in evaluation order: straight, left, right, back.
#[must_use]
pub const fn candidates(heading: Heading) -> [Heading; 4] {
    [
        heading,
        heading.turn_left(),
        heading.turn_right(),
        heading.opposite(),
    ]
}

/// Pure decision policy shared by every bot.
#[derive(Clone, Debug, Default)]
pub struct Chaser {
    tuning: Tuning,
}

impl Chaser {
    /// Creates a policy with the provided tuning.
    #[must_use]
    pub const fn new(tuning: Tuning) -> Self {
        Self { tuning }
    }

    /// Tuning the policy was created with.
    #[must_use]
    pub const fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Reports whether travelling `look_ahead` cells from `from` along
    /// `heading` stays inside the grid and off every trail.
    #[must_use]
    pub fn is_safe(&self, from: CellCoord, heading: Heading, occupancy: OccupancyView<'_>) -> bool {
        let mut cell = from;
        for _ in 0..self.tuning.look_ahead {
            match cell.step(heading) {
                Some(next) if occupancy.is_free(next) => cell = next,
                _ => return false,
            }
        }
        true
    }

    /// Chooses the heading for the upcoming move of a bot at `cell`.
    pub fn decide<R: Rng>(
        &self,
        cell: CellCoord,
        heading: Heading,
        target: Option<CellCoord>,
        occupancy: OccupancyView<'_>,
        rng: &mut R,
    ) -> Decision {
        let candidates = candidates(heading);
        let safe: Vec<Heading> = candidates
            .iter()
            .copied()
            .filter(|candidate| self.is_safe(cell, *candidate, occupancy))
            .collect();

        let Some(&first_safe) = safe.first() else {
            return Decision {
                heading: candidates.choose(rng).copied().unwrap_or(heading),
                cooldown: self.tuning.cornered_cooldown,
                intent: Intent::Cornered,
            };
        };

        if safe.len() > 1 && rng.gen::<f64>() < self.tuning.random_turn_probability {
            return Decision {
                heading: safe.choose(rng).copied().unwrap_or(first_safe),
                cooldown: self.tuning.turn_cooldown,
                intent: Intent::Wander,
            };
        }

        if let Some(target) = target {
            let depth = self.tuning.look_ahead.min(self.tuning.chase_projection);
            let mut best: Option<(Heading, i64)> = None;
            for candidate in safe.iter().copied() {
                let distance = squared_distance(project(cell, candidate, depth), target);
                if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                    best = Some((candidate, distance));
                }
            }
            return Decision {
                heading: best.map_or(first_safe, |(candidate, _)| candidate),
                cooldown: self.tuning.turn_cooldown,
                intent: Intent::Chase,
            };
        }

        Decision {
            heading: first_safe,
            cooldown: self.tuning.turn_cooldown,
            intent: Intent::Cruise,
        }
    }
}

/// Per-bot memory carried between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChaserState {
    cooldown: u32,
}

impl ChaserState {
    /// Creates a bot memory that decides on its first tick.
    #[must_use]
    pub const fn new() -> Self {
        Self { cooldown: 0 }
    }

    /// Ticks left before the bot decides again.
    #[must_use]
    pub const fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Runs the policy unless the bot is cooling down.
    ///
    /// Returns `None` while cooling down, in which case the cooldown shrinks by
    /// one and the bot keeps its heading.
    pub fn steer<R: Rng>(
        &mut self,
        chaser: &Chaser,
        cell: CellCoord,
        heading: Heading,
        target: Option<CellCoord>,
        occupancy: OccupancyView<'_>,
        rng: &mut R,
    ) -> Option<Decision> {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return None;
        }

        let decision = chaser.decide(cell, heading, target, occupancy, rng);
        self.cooldown = decision.cooldown;
        Some(decision)
    }
}

/// Position reached after `steps` moves, ignoring the grid bounds.
fn project(cell: CellCoord, heading: Heading, steps: u32) -> (i64, i64) {
    let (dc, dr) = heading.unit();
    let steps = i64::from(steps);
    (
        i64::from(cell.column()) + dc * steps,
        i64::from(cell.row()) + dr * steps,
    )
}

fn squared_distance(point: (i64, i64), target: CellCoord) -> i64 {
    let dc = point.0 - i64::from(target.column());
    let dr = point.1 - i64::from(target.row());
    dc * dc + dr * dr
}
