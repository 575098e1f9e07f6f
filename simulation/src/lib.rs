#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless simulation driving rounds of the light bike arena.
//!
//! [`Simulation`] owns the authoritative [`World`], one [`DecisionPolicy`] per
//! agent, and the random source every stochastic choice draws from. Hosts
//! start rounds, forward player input and call [`Simulation::tick`] at the
//! configured cadence; rendering and input capture stay outside.

mod config;
mod policy;

use light_bike_core::{
    AgentId, AgentSeed, AgentSnapshot, Command, Event, GridSize, Heading, InvariantViolation,
    RoundPhase,
};
use light_bike_system_chaser::Chaser;
use light_bike_system_spawning::Spawning;
use light_bike_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{Config, GridConfig, TimingConfig};
pub use policy::{DecisionPolicy, PlayerControl};

/// Errors surfaced by the simulation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    /// The world rejected a command.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
    /// The configured play area yields no cells.
    #[error("play area of {columns}x{rows} cells cannot host a round")]
    EmptyGrid {
        /// Columns derived from the play area.
        columns: u32,
        /// Rows derived from the play area.
        rows: u32,
    },
}

/// Observable state after a tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickResult {
    /// Ticks processed in the current round.
    pub tick: u64,
    /// Agents still moving.
    pub alive_count: usize,
    /// Every agent of the round, dead or alive, ordered by identifier.
    pub agents: Vec<AgentSnapshot>,
    /// Whether the round has finished.
    pub round_over: bool,
    /// Sole survivor of a finished round.
    pub winner: Option<AgentId>,
    /// Display name of the sole survivor.
    pub winner_name: Option<String>,
}

/// Round driver combining the world with agent policies.
#[derive(Debug)]
pub struct Simulation<R = ChaCha8Rng> {
    config: Config,
    world: World,
    chaser: Chaser,
    spawning: Spawning,
    policies: Vec<DecisionPolicy>,
    player: Option<AgentId>,
    control: PlayerControl,
    rng: R,
    events: Vec<Event>,
}

impl Simulation<ChaCha8Rng> {
    /// Creates a simulation whose random choices derive from `seed`.
    #[must_use]
    pub fn seeded(config: Config, seed: u64) -> Self {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    /// Creates a simulation drawing every random choice from `rng`.
    pub fn with_rng(config: Config, rng: R) -> Self {
        Self {
            chaser: Chaser::new(config.bots),
            spawning: Spawning::new(config.spawn),
            config,
            world: World::new(),
            policies: Vec::new(),
            player: None,
            control: PlayerControl::Manual,
            rng,
            events: Vec::new(),
        }
    }

    /// Configuration the simulation was created with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Selects who steers the player from the next round on.
    pub fn set_player_control(&mut self, control: PlayerControl) {
        self.control = control;
    }

    /// Starts a round on the configured grid with one player and
    /// `bot_count` bots. The bot count is capped at the configured maximum.
    pub fn start_round(&mut self, player_name: &str, bot_count: u32) -> Result<(), SimulationError> {
        let grid = self.config.grid.size();
        if grid.cell_count() == 0 {
            return Err(SimulationError::EmptyGrid {
                columns: grid.columns(),
                rows: grid.rows(),
            });
        }

        let max_bots = self.config.progression.max_bots;
        if bot_count > max_bots {
            tracing::debug!(requested = bot_count, max_bots, "bot count capped");
        }
        let roster = self
            .spawning
            .roster(grid, player_name, bot_count.min(max_bots), &mut self.rng);
        self.start_round_with(grid, roster)
    }

    /// Starts a round with an explicit layout. Agent identifiers follow the
    /// roster order.
    pub fn start_round_with(
        &mut self,
        grid: GridSize,
        roster: Vec<AgentSeed>,
    ) -> Result<(), SimulationError> {
        let policies: Vec<DecisionPolicy> = roster
            .iter()
            .map(|seed| DecisionPolicy::for_kind(seed.kind, self.control))
            .collect();

        self.events.clear();
        world::apply(
            &mut self.world,
            Command::StartRound { grid, roster },
            &mut self.events,
        )?;
        self.policies = policies;
        self.player = query::player(&self.world);
        Ok(())
    }

    /// Requests a new heading for the player's next move.
    ///
    /// Returns `false` when the request is ignored: no running round, a dead
    /// or autopiloted player, or a heading that reverses the current one.
    /// Several accepted requests within one tick collapse to the last.
    pub fn set_player_heading(&mut self, heading: Heading) -> bool {
        if query::phase(&self.world) != RoundPhase::Running {
            return false;
        }
        let Some(player) = self.player else {
            return false;
        };
        let Some(snapshot) = query::agent(&self.world, player) else {
            return false;
        };
        if !snapshot.alive {
            return false;
        }
        if heading == snapshot.heading.opposite() {
            tracing::debug!(current = ?snapshot.heading, requested = ?heading, "reversal rejected");
            return false;
        }

        usize::try_from(player.get())
            .ok()
            .and_then(|index| self.policies.get_mut(index))
            .map_or(false, |policy| policy.queue(heading))
    }

    /// Advances the round by one step.
    ///
    /// Every live agent's policy runs against the occupancy as it stood at
    /// the start of the tick, then all agents move simultaneously.
    pub fn tick(&mut self) -> Result<TickResult, SimulationError> {
        let phase = query::phase(&self.world);
        if phase != RoundPhase::Running {
            return Err(InvariantViolation::NotRunning { phase }.into());
        }

        self.events.clear();
        let agents = query::agent_view(&self.world);
        let occupancy = query::occupancy_view(&self.world);
        let target = self
            .player
            .and_then(|player| agents.get(player))
            .filter(|player| player.alive)
            .map(|player| player.cell);

        let mut commands = Vec::new();
        for (agent, policy) in agents.iter().zip(self.policies.iter_mut()) {
            if !agent.alive {
                continue;
            }
            let chasing = target.filter(|_| Some(agent.id) != self.player);
            let next = policy.next_heading(&self.chaser, agent, chasing, occupancy, &mut self.rng);
            if let Some(heading) = next.filter(|heading| *heading != agent.heading) {
                commands.push(Command::SetHeading {
                    agent: agent.id,
                    heading,
                });
            }
        }
        commands.push(Command::Tick);

        for command in commands {
            world::apply(&mut self.world, command, &mut self.events)?;
        }
        Ok(self.snapshot())
    }

    /// Current observable state without advancing.
    #[must_use]
    pub fn snapshot(&self) -> TickResult {
        let agents = query::agent_view(&self.world).into_vec();
        let winner = query::winner(&self.world);
        let winner_name = winner.and_then(|winner| {
            agents
                .iter()
                .find(|agent| agent.id == winner)
                .map(|agent| agent.name.clone())
        });
        TickResult {
            tick: query::tick_index(&self.world),
            alive_count: agents.iter().filter(|agent| agent.alive).count(),
            agents,
            round_over: query::phase(&self.world) == RoundPhase::RoundOver,
            winner,
            winner_name,
        }
    }

    /// Lifecycle phase of the current round.
    #[must_use]
    pub fn phase(&self) -> RoundPhase {
        query::phase(&self.world)
    }

    /// Identifier of the player in the current round.
    #[must_use]
    pub const fn player(&self) -> Option<AgentId> {
        self.player
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Events produced by the most recent round start or tick.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
