#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the light bike arena.
//!
//! The world owns the [`GridWorld`] occupancy model and the agent roster.
//! Everything that mutates either goes through [`apply`]; systems observe the
//! world exclusively through the [`query`] module.

mod grid;

use std::collections::BTreeMap;

use light_bike_core::{
    AgentColor, AgentId, AgentKind, AgentSeed, CellCoord, Command, CrashCause, Event, GridSize,
    Heading, InvariantViolation, RoundPhase,
};

pub use grid::GridWorld;

/// Represents the authoritative arena state.
#[derive(Debug)]
pub struct World {
    grid: GridWorld,
    agents: Vec<Agent>,
    phase: RoundPhase,
    tick_index: u64,
    winner: Option<AgentId>,
}

impl World {
    /// Creates an idle world with an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: GridWorld::new(GridSize::new(0, 0)),
            agents: Vec::new(),
            phase: RoundPhase::Idle,
            tick_index: 0,
            winner: None,
        }
    }

    fn require_running(&self) -> Result<(), InvariantViolation> {
        if self.phase == RoundPhase::Running {
            Ok(())
        } else {
            Err(InvariantViolation::NotRunning { phase: self.phase })
        }
    }

    fn agent_mut(&mut self, agent: AgentId) -> Result<&mut Agent, InvariantViolation> {
        let index = usize::try_from(agent.get()).ok();
        index
            .and_then(|index| self.agents.get_mut(index))
            .ok_or(InvariantViolation::UnknownAgent { agent })
    }

    fn start_round(
        &mut self,
        grid: GridSize,
        roster: Vec<AgentSeed>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), InvariantViolation> {
        if let Some(seed) = roster.iter().find(|seed| !grid.contains(seed.cell)) {
            return Err(InvariantViolation::OutOfBounds {
                cell: seed.cell,
                grid,
            });
        }

        self.grid.resize(grid);
        self.agents.clear();
        self.tick_index = 0;
        self.winner = None;

        let agents = u32::try_from(roster.len()).unwrap_or(u32::MAX);
        out_events.push(Event::RoundStarted { grid, agents });

        for (index, seed) in roster.into_iter().enumerate() {
            let id = AgentId::new(u32::try_from(index).unwrap_or(u32::MAX));
            if self.grid.is_occupied(seed.cell) {
                tracing::warn!(
                    agent = id.get(),
                    column = seed.cell.column(),
                    row = seed.cell.row(),
                    "agent spawned on top of another agent"
                );
            } else {
                self.grid.occupy(seed.cell)?;
            }
            out_events.push(Event::AgentSpawned {
                agent: id,
                cell: seed.cell,
                heading: seed.heading,
            });
            self.agents.push(Agent::from_seed(id, seed));
        }

        self.phase = RoundPhase::Running;
        tracing::debug!(
            columns = grid.columns(),
            rows = grid.rows(),
            agents,
            "round started"
        );
        Ok(())
    }

    /// Moves every live agent one cell, resolving all collisions against the
    /// occupancy as it stood before the tick.
    fn advance_agents(&mut self, out_events: &mut Vec<Event>) -> Result<(), InvariantViolation> {
        let targets: Vec<Option<Option<CellCoord>>> = self
            .agents
            .iter()
            .map(|agent| {
                agent.alive.then(|| {
                    agent
                        .cell
                        .step(agent.heading)
                        .filter(|next| self.grid.in_bounds(*next))
                })
            })
            .collect();

        let mut claims: BTreeMap<CellCoord, u32> = BTreeMap::new();
        for next in targets.iter().flatten().flatten() {
            if !self.grid.is_occupied(*next) {
                *claims.entry(*next).or_insert(0) += 1;
            }
        }

        let verdicts: Vec<Option<Verdict>> = targets
            .iter()
            .map(|target| {
                target.map(|next| match next {
                    None => Verdict::Crash(CrashCause::Wall),
                    Some(cell) if self.grid.is_occupied(cell) => Verdict::Crash(CrashCause::Trail),
                    Some(cell) if claims.get(&cell).copied().unwrap_or(0) > 1 => {
                        Verdict::Crash(CrashCause::HeadOn)
                    }
                    Some(cell) => Verdict::Move(cell),
                })
            })
            .collect();

        for (agent, verdict) in self.agents.iter_mut().zip(verdicts) {
            match verdict {
                None => {}
                Some(Verdict::Move(next)) => {
                    self.grid.occupy(next)?;
                    let from = agent.cell;
                    agent.advance(next);
                    out_events.push(Event::AgentAdvanced {
                        agent: agent.id,
                        from,
                        to: next,
                    });
                }
                Some(Verdict::Crash(cause)) => {
                    agent.alive = false;
                    tracing::debug!(agent = agent.id.get(), name = %agent.name, ?cause, "agent crashed");
                    out_events.push(Event::AgentCrashed {
                        agent: agent.id,
                        cell: agent.cell,
                        cause,
                    });
                }
            }
        }

        Ok(())
    }

    fn evaluate_round(&mut self, out_events: &mut Vec<Event>) {
        let mut alive = self.agents.iter().filter(|agent| agent.alive);
        let survivor = alive.next().map(|agent| agent.id);
        let more_alive = alive.next().is_some();

        let over = match survivor {
            None => true,
            Some(_) => !more_alive && self.agents.len() > 1,
        };
        if !over {
            return;
        }

        self.phase = RoundPhase::RoundOver;
        self.winner = survivor;
        tracing::info!(
            winner = survivor.map(|id| id.get()),
            ticks = self.tick_index,
            "round over"
        );
        out_events.push(Event::RoundOver { winner: survivor });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Errors indicate a bug in the caller: ticking or steering outside a running
/// round, referencing an unknown agent, or spawning outside the grid.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), InvariantViolation> {
    match command {
        Command::StartRound { grid, roster } => world.start_round(grid, roster, out_events),
        Command::SetHeading { agent, heading } => {
            world.require_running()?;
            let agent = world.agent_mut(agent)?;
            if agent.alive && agent.heading != heading {
                out_events.push(Event::HeadingChanged {
                    agent: agent.id,
                    from: agent.heading,
                    to: heading,
                });
                agent.heading = heading;
            }
            Ok(())
        }
        Command::Tick => {
            world.require_running()?;
            world.tick_index = world.tick_index.saturating_add(1);
            world.advance_agents(out_events)?;
            world.evaluate_round(out_events);
            Ok(())
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use light_bike_core::{
        AgentId, AgentKind, AgentSnapshot, AgentView, GridSize, OccupancyView, RoundPhase,
    };

    use super::{GridWorld, World};

    /// Lifecycle phase of the current round.
    #[must_use]
    pub fn phase(world: &World) -> RoundPhase {
        world.phase
    }

    /// Number of ticks processed in the current round.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Dimensions of the active grid.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.grid.size()
    }

    /// Provides read-only access to the occupancy model.
    #[must_use]
    pub fn grid(world: &World) -> &GridWorld {
        &world.grid
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.grid.view()
    }

    /// Captures a read-only view of every agent in the roster, dead or alive.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(world.agents.iter().map(|agent| agent.snapshot()).collect())
    }

    /// Identifier of the first player-controlled agent, if any.
    #[must_use]
    pub fn player(world: &World) -> Option<AgentId> {
        world
            .agents
            .iter()
            .find(|agent| agent.kind == AgentKind::Player)
            .map(|agent| agent.id)
    }

    /// Snapshot of a single agent.
    #[must_use]
    pub fn agent(world: &World, agent: AgentId) -> Option<AgentSnapshot> {
        let index = usize::try_from(agent.get()).ok()?;
        world.agents.get(index).map(|agent| agent.snapshot())
    }

    /// Number of agents still alive.
    #[must_use]
    pub fn alive_count(world: &World) -> usize {
        world.agents.iter().filter(|agent| agent.alive).count()
    }

    /// Sole survivor of a finished round, if there was one.
    #[must_use]
    pub fn winner(world: &World) -> Option<AgentId> {
        world.winner
    }
}

#[derive(Clone, Copy, Debug)]
enum Verdict {
    Move(CellCoord),
    Crash(CrashCause),
}

#[derive(Clone, Debug)]
struct Agent {
    id: AgentId,
    name: String,
    color: AgentColor,
    kind: AgentKind,
    cell: CellCoord,
    heading: Heading,
    alive: bool,
    trail: Vec<CellCoord>,
}

impl Agent {
    fn from_seed(id: AgentId, seed: AgentSeed) -> Self {
        Self {
            id,
            name: seed.name,
            color: seed.color,
            kind: seed.kind,
            cell: seed.cell,
            heading: seed.heading,
            alive: true,
            trail: vec![seed.cell],
        }
    }

    fn advance(&mut self, destination: CellCoord) {
        self.cell = destination;
        self.trail.push(destination);
    }

    fn snapshot(&self) -> light_bike_core::AgentSnapshot {
        light_bike_core::AgentSnapshot {
            id: self.id,
            name: self.name.clone(),
            color: self.color,
            kind: self.kind,
            cell: self.cell,
            heading: self.heading,
            alive: self.alive,
            trail: self.trail.clone(),
        }
    }
}
