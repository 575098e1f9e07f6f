//! Round loop for a headless campaign.

use std::thread;

use anyhow::{bail, Context, Result};
use light_bike_simulation::{Simulation, TickResult};
use light_bike_system_progression::{Advance, Progression};
use rand::Rng;
use serde::Serialize;

/// What the campaign should play.
#[derive(Clone, Debug)]
pub(crate) struct Plan {
    pub(crate) player_name: String,
    pub(crate) rounds: u32,
    pub(crate) realtime: bool,
}

/// Outcome of one finished round.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct RoundReport {
    level: u32,
    bots: u32,
    player_won: bool,
    result: TickResult,
}

impl RoundReport {
    /// One-line human readable description.
    pub(crate) fn summary(&self) -> String {
        let winner = self.result.winner_name.as_deref().unwrap_or("nobody");
        format!(
            "level {}: {} bots, {} won after {} ticks",
            self.level, self.bots, winner, self.result.tick
        )
    }
}

/// Plays rounds until the plan is exhausted or the player loses.
pub(crate) fn run<R: Rng>(
    simulation: &mut Simulation<R>,
    progression: &mut Progression,
    plan: &Plan,
) -> Result<Vec<RoundReport>> {
    let mut reports = Vec::new();
    for _ in 0..plan.rounds {
        let level = progression.level();
        let bots = progression.bot_count();
        simulation
            .start_round(&plan.player_name, bots)
            .with_context(|| format!("failed to start level {level}"))?;

        let result = play_round(simulation, plan.realtime)
            .with_context(|| format!("level {level} did not finish"))?;
        let player_won = result.winner.is_some() && result.winner == simulation.player();
        reports.push(RoundReport {
            level,
            bots,
            player_won,
            result,
        });

        match progression.record_round(player_won) {
            Advance::NextLevel(next) => tracing::info!(level = next, "advancing"),
            Advance::GameOver(last) => {
                tracing::info!(level = last, "game over");
                break;
            }
        }
    }
    Ok(reports)
}

fn play_round<R: Rng>(simulation: &mut Simulation<R>, realtime: bool) -> Result<TickResult> {
    let limit = simulation.config().grid.size().cell_count().saturating_add(1);
    let interval = simulation.config().timing.tick_interval();
    loop {
        let result = simulation.tick()?;
        if result.round_over {
            return Ok(result);
        }
        if result.tick >= limit {
            bail!("still running after {limit} ticks");
        }
        if realtime {
            thread::sleep(interval);
        }
    }
}
