#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the light bike arena.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Drivers submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! happened. Systems read immutable views ([`AgentView`], [`OccupancyView`])
//! and respond exclusively with new commands, so no system ever mutates the
//! occupancy grid directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name assigned to the player when the host supplies an empty one.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Neon palette agents are painted with.
pub const PALETTE: [AgentColor; 11] = [
    AgentColor::from_rgb(0x00, 0xff, 0xff),
    AgentColor::from_rgb(0x7c, 0xfc, 0x00),
    AgentColor::from_rgb(0xff, 0xd7, 0x00),
    AgentColor::from_rgb(0xff, 0x7f, 0x50),
    AgentColor::from_rgb(0xff, 0x49, 0xa4),
    AgentColor::from_rgb(0x66, 0xcc, 0xff),
    AgentColor::from_rgb(0xb1, 0x9c, 0xd9),
    AgentColor::from_rgb(0xff, 0xa0, 0x7a),
    AgentColor::from_rgb(0x7f, 0xff, 0xd4),
    AgentColor::from_rgb(0x39, 0xff, 0x14),
    AgentColor::from_rgb(0xff, 0x6e, 0xc7),
];

/// Lifecycle phase of a single round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No round has been started yet.
    Idle,
    /// Agents are moving and the world accepts ticks.
    Running,
    /// At most one agent survived; the round accepts no further ticks.
    RoundOver,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets the world to a fresh grid and spawns the provided roster.
    StartRound {
        /// Dimensions of the grid used for the whole round.
        grid: GridSize,
        /// Agents to spawn, in identifier order.
        roster: Vec<AgentSeed>,
    },
    /// Requests that an agent travel along a new heading on the next tick.
    SetHeading {
        /// Identifier of the agent that steers.
        agent: AgentId,
        /// Heading the agent should adopt.
        heading: Heading,
    },
    /// Advances every live agent by exactly one cell.
    Tick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Announces that a new round began on the provided grid.
    RoundStarted {
        /// Dimensions of the grid for the round.
        grid: GridSize,
        /// Number of agents spawned into the round.
        agents: u32,
    },
    /// Confirms that an agent entered the arena.
    AgentSpawned {
        /// Identifier assigned to the agent.
        agent: AgentId,
        /// Cell the agent occupies after spawning.
        cell: CellCoord,
        /// Initial heading of the agent.
        heading: Heading,
    },
    /// Confirms that an agent adopted a new heading.
    HeadingChanged {
        /// Identifier of the agent that turned.
        agent: AgentId,
        /// Heading before the change.
        from: Heading,
        /// Heading after the change.
        to: Heading,
    },
    /// Confirms that an agent moved into a fresh cell.
    AgentAdvanced {
        /// Identifier of the agent that advanced.
        agent: AgentId,
        /// Cell the agent occupied before moving.
        from: CellCoord,
        /// Cell the agent occupies after moving.
        to: CellCoord,
    },
    /// Reports that an agent died while attempting to move.
    AgentCrashed {
        /// Identifier of the agent that crashed.
        agent: AgentId,
        /// Last cell the agent occupied while alive.
        cell: CellCoord,
        /// What the agent ran into.
        cause: CrashCause,
    },
    /// Announces that the round has finished.
    RoundOver {
        /// Sole survivor, if any agent remained alive.
        winner: Option<AgentId>,
    },
}

/// Obstacles that end an agent's run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrashCause {
    /// The agent left the grid.
    Wall,
    /// The agent entered a cell that already belongs to a trail.
    Trail,
    /// Two or more agents entered the same free cell on the same tick.
    HeadOn,
}

/// Failures that indicate a bug in the driver or the world itself.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A cell that already belongs to a trail was occupied again.
    #[error("cell ({}, {}) is already occupied", .cell.column(), .cell.row())]
    DoubleOccupy {
        /// Cell that was occupied twice.
        cell: CellCoord,
    },
    /// A cell outside the grid was handed to the occupancy model.
    #[error(
        "cell ({}, {}) lies outside the {}x{} grid",
        .cell.column(),
        .cell.row(),
        .grid.columns(),
        .grid.rows()
    )]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
        /// Dimensions of the active grid.
        grid: GridSize,
    },
    /// A round-only command arrived while no round was running.
    #[error("round is not running (phase {phase:?})")]
    NotRunning {
        /// Phase the world was in when the command arrived.
        phase: RoundPhase,
    },
    /// A command referenced an agent that is not part of the roster.
    #[error("agent {} is not part of the roster", .agent.get())]
    UnknownAgent {
        /// Identifier that failed to resolve.
        agent: AgentId,
    },
}

/// Cardinal travel directions available to agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Heading {
    /// Every heading, in the order spawn draws index into.
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Down, Heading::Left, Heading::Right];

    /// Heading pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Heading after a quarter turn counter-clockwise.
    #[must_use]
    pub const fn turn_left(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
            Self::Right => Self::Up,
        }
    }

    /// Heading after a quarter turn clockwise.
    #[must_use]
    pub const fn turn_right(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    /// Column and row offsets of a single step.
    #[must_use]
    pub const fn unit(self) -> (i64, i64) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Unique identifier assigned to an agent for the duration of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Distinguishes the externally steered agent from computer opponents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// The agent driven by host input.
    Player,
    /// A computer-controlled opponent.
    Bot,
}

/// Visual appearance applied to an agent and its trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl AgentColor {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Neighbouring cell in the provided heading.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant;
    /// the upper bound is checked by the grid.
    #[must_use]
    pub fn step(self, heading: Heading) -> Option<CellCoord> {
        match heading {
            Heading::Up => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Heading::Down => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Heading::Left => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
            Heading::Right => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
        }
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Dimensions of the cell grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a grid description with explicit dimensions.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Derives the grid that fits inside a play area of the given pixel size.
    ///
    /// Partial cells at the right and bottom edges are discarded. A zero cell
    /// size produces an empty grid.
    #[must_use]
    pub const fn from_play_area(width: u32, height: u32, cell_size: u32) -> Self {
        if cell_size == 0 {
            return Self::new(0, 0);
        }
        Self::new(width / cell_size, height / cell_size)
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Everything the world needs to place an agent at round start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSeed {
    /// Display name of the agent.
    pub name: String,
    /// Appearance of the agent and its trail.
    pub color: AgentColor,
    /// Whether the agent is the player or a bot.
    pub kind: AgentKind,
    /// Cell the agent spawns on.
    pub cell: CellCoord,
    /// Heading the agent starts with.
    pub heading: Heading,
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// Display name of the agent.
    pub name: String,
    /// Appearance assigned to the agent.
    pub color: AgentColor,
    /// Whether the agent is the player or a bot.
    pub kind: AgentKind,
    /// Head cell; for dead agents the last cell occupied while alive.
    pub cell: CellCoord,
    /// Current heading.
    pub heading: Heading,
    /// Whether the agent is still moving.
    pub alive: bool,
    /// Every cell the agent occupied since spawning, oldest first.
    pub trail: Vec<CellCoord>,
}

/// Read-only snapshot describing all agents within the arena.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured agent snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific agent.
    #[must_use]
    pub fn get(&self, agent: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots
            .binary_search_by_key(&agent, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of agents that are still alive.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.snapshots.iter().filter(|snapshot| snapshot.alive).count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [bool],
    grid: GridSize,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided cell slice.
    ///
    /// The slice is laid out row-major and must hold one entry per grid cell.
    #[must_use]
    pub fn new(cells: &'a [bool], grid: GridSize) -> Self {
        Self { cells, grid }
    }

    /// Dimensions of the underlying grid.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        self.grid.contains(cell)
    }

    /// Reports whether the cell belongs to any trail. Cells outside the grid
    /// are never occupied.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.grid
            .index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Reports whether an agent could enter the cell.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.in_bounds(cell) && !self.is_occupied(cell)
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|occupied| **occupied).count()
    }

    /// Iterator over every occupied cell in row-major order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = CellCoord> + 'a {
        let columns = self.grid.columns().max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, occupied)| **occupied)
            .filter_map(move |(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(CellCoord::new(index % columns, index / columns))
            })
    }
}

/// Computes the row-major index of a cell, if it lies inside the grid.
#[must_use]
pub fn cell_index(grid: GridSize, cell: CellCoord) -> Option<usize> {
    grid.index(cell)
}
