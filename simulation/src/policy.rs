//! Per-agent decision policies evaluated at the start of every tick.

use light_bike_core::{AgentKind, AgentSnapshot, CellCoord, Heading, OccupancyView};
use light_bike_system_chaser::{Chaser, ChaserState};
use rand::Rng;

/// Who steers the player's bike.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerControl {
    /// Headings come from [`crate::Simulation::set_player_heading`].
    #[default]
    Manual,
    /// The player is steered by the bot policy and ignores input.
    Autopilot,
}

/// Decision policy attached to one agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecisionPolicy {
    /// Applies the most recent accepted heading request, if any.
    PlayerInput {
        /// Request waiting for the next tick.
        queued: Option<Heading>,
    },
    /// Bot that chases the live player.
    ChaserBot(ChaserState),
    /// Player steered by the bot policy without a target.
    Autopilot(ChaserState),
}

impl DecisionPolicy {
    pub(crate) fn for_kind(kind: AgentKind, control: PlayerControl) -> Self {
        match (kind, control) {
            (AgentKind::Bot, _) => Self::ChaserBot(ChaserState::new()),
            (AgentKind::Player, PlayerControl::Manual) => Self::PlayerInput { queued: None },
            (AgentKind::Player, PlayerControl::Autopilot) => Self::Autopilot(ChaserState::new()),
        }
    }

    /// Queues a heading request; only manual players accept input.
    pub(crate) fn queue(&mut self, heading: Heading) -> bool {
        match self {
            Self::PlayerInput { queued } => {
                *queued = Some(heading);
                true
            }
            Self::ChaserBot(_) | Self::Autopilot(_) => false,
        }
    }

    /// Heading the agent should travel along this tick, or `None` to keep
    /// its current heading.
    pub(crate) fn next_heading<R: Rng>(
        &mut self,
        chaser: &Chaser,
        agent: &AgentSnapshot,
        target: Option<CellCoord>,
        occupancy: OccupancyView<'_>,
        rng: &mut R,
    ) -> Option<Heading> {
        match self {
            Self::PlayerInput { queued } => queued.take(),
            Self::ChaserBot(state) => state
                .steer(chaser, agent.cell, agent.heading, target, occupancy, rng)
                .map(|decision| decision.heading),
            Self::Autopilot(state) => state
                .steer(chaser, agent.cell, agent.heading, None, occupancy, rng)
                .map(|decision| decision.heading),
        }
    }
}
