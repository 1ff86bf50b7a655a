#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the sample manipulator engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters parse raw operator input
//! into [`Command`] values, the world executes those commands via its `apply`
//! entry point, and then reports [`Event`] values describing what happened.
//! Systems consume event streams and immutable snapshots; they never reach
//! into world state directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length of the square grid used when no configuration is supplied.
pub const DEFAULT_GRID_SIDE: u32 = 10;

/// Number of samples scattered across the grid when a session starts.
pub const DEFAULT_SAMPLE_COUNT: usize = 3;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Moves the manipulator one cell toward decreasing columns.
    Left,
    /// Moves the manipulator one cell toward increasing columns.
    Right,
    /// Moves the manipulator one cell toward decreasing rows.
    Up,
    /// Moves the manipulator one cell toward increasing rows.
    Down,
    /// Attempts to pick up an uncollected sample beneath the manipulator.
    Pick,
    /// Releases the sample currently carried by the manipulator.
    Drop,
    /// Symbol outside the operator alphabet; applying it has no effect.
    Unknown(char),
}

impl Command {
    /// Symbol typed by the operator to request a move to the left.
    pub const LEFT_SYMBOL: char = 'Л';
    /// Symbol typed by the operator to request a move to the right.
    pub const RIGHT_SYMBOL: char = 'П';
    /// Symbol typed by the operator to request a move up.
    pub const UP_SYMBOL: char = 'В';
    /// Symbol typed by the operator to request a move down.
    pub const DOWN_SYMBOL: char = 'Н';
    /// Symbol typed by the operator to request a pick.
    pub const PICK_SYMBOL: char = 'О';
    /// Symbol typed by the operator to request a drop.
    pub const DROP_SYMBOL: char = 'Б';

    /// Interprets a single operator symbol.
    ///
    /// Every symbol maps to a command; symbols outside the alphabet become
    /// [`Command::Unknown`] so that interpretation stays total.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Self {
        match symbol {
            Self::LEFT_SYMBOL => Self::Left,
            Self::RIGHT_SYMBOL => Self::Right,
            Self::UP_SYMBOL => Self::Up,
            Self::DOWN_SYMBOL => Self::Down,
            Self::PICK_SYMBOL => Self::Pick,
            Self::DROP_SYMBOL => Self::Drop,
            other => Self::Unknown(other),
        }
    }

    /// Symbol the operator types to request this command.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Left => Self::LEFT_SYMBOL,
            Self::Right => Self::RIGHT_SYMBOL,
            Self::Up => Self::UP_SYMBOL,
            Self::Down => Self::DOWN_SYMBOL,
            Self::Pick => Self::PICK_SYMBOL,
            Self::Drop => Self::DROP_SYMBOL,
            Self::Unknown(symbol) => symbol,
        }
    }

    /// Direction of travel for movement commands.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Left => Some(Direction::West),
            Self::Right => Some(Direction::East),
            Self::Up => Some(Direction::North),
            Self::Down => Some(Direction::South),
            Self::Pick | Self::Drop | Self::Unknown(_) => None,
        }
    }
}

/// Parses an operator string into commands, one per character.
pub fn parse_commands(input: &str) -> impl Iterator<Item = Command> + '_ {
    input.chars().map(Command::from_symbol)
}

/// Events reported by the world after processing a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the manipulator moved between two cells.
    ManipulatorMoved {
        /// Cell the manipulator occupied before moving.
        from: CellCoord,
        /// Cell the manipulator occupies after moving.
        to: CellCoord,
    },
    /// Reports that a move was clamped at the grid boundary.
    MovementBlocked {
        /// Cell the manipulator remained in.
        at: CellCoord,
        /// Direction of the rejected step.
        direction: Direction,
    },
    /// Confirms that a sample was collected and is now carried.
    SamplePicked {
        /// Position of the sample within the world's sample sequence.
        index: usize,
        /// Cell the sample was collected from.
        at: CellCoord,
    },
    /// Confirms that the carried sample was released.
    SampleDropped {
        /// Cell the manipulator occupied when releasing the sample.
        at: CellCoord,
    },
    /// Reports that a command had no effect on the world.
    CommandIgnored {
        /// Command that was ignored.
        command: Command,
    },
}

/// Cardinal movement directions available to the manipulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

/// Location of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Cell in the upper-left corner where the manipulator starts.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Cell one step away in `direction`, clamped to a grid of side `side`.
    ///
    /// Returns `self` unchanged when the step would leave the grid.
    #[must_use]
    pub fn step_clamped(self, direction: Direction, side: u32) -> Self {
        let last = side.saturating_sub(1);
        match direction {
            Direction::West => Self::new(self.x.saturating_sub(1), self.y),
            Direction::East => Self::new(self.x.saturating_add(1).min(last), self.y),
            Direction::North => Self::new(self.x, self.y.saturating_sub(1)),
            Direction::South => Self::new(self.x, self.y.saturating_add(1).min(last)),
        }
    }
}

/// Errors produced while validating a grid configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The grid must contain at least one cell.
    #[error("grid side length must be at least 1")]
    EmptyGrid,
}

/// Dimensions of the square grid and the number of samples scattered on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGridConfig")]
pub struct GridConfig {
    side: u32,
    sample_count: usize,
}

impl GridConfig {
    /// Creates a validated grid configuration.
    pub const fn new(side: u32, sample_count: usize) -> Result<Self, ConfigError> {
        if side == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        Ok(Self { side, sample_count })
    }

    /// Number of cells along each edge of the grid.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Number of samples generated for a fresh session.
    #[must_use]
    pub const fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() < self.side && cell.y() < self.side
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            side: DEFAULT_GRID_SIDE,
            sample_count: DEFAULT_SAMPLE_COUNT,
        }
    }
}

#[derive(Deserialize)]
struct RawGridConfig {
    side: u32,
    sample_count: usize,
}

impl TryFrom<RawGridConfig> for GridConfig {
    type Error = ConfigError;

    fn try_from(raw: RawGridConfig) -> Result<Self, Self::Error> {
        Self::new(raw.side, raw.sample_count)
    }
}

/// Serialized form of a single sample as recorded in history snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleSnapshot {
    /// Column occupied by the sample.
    pub x: u32,
    /// Row occupied by the sample.
    pub y: u32,
    /// Indicates whether the sample has been picked up.
    pub collected: bool,
}

impl SampleSnapshot {
    /// Cell occupied by the sample.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        CellCoord::new(self.x, self.y)
    }
}

/// Ordered copy of every sample's state at a point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SamplesSnapshot {
    samples: Vec<SampleSnapshot>,
}

impl SamplesSnapshot {
    /// Creates a snapshot from samples listed in world order.
    #[must_use]
    pub fn from_samples(samples: Vec<SampleSnapshot>) -> Self {
        Self { samples }
    }

    /// Iterator over the captured samples in world order.
    pub fn iter(&self) -> impl Iterator<Item = &SampleSnapshot> {
        self.samples.iter()
    }

    /// Captured samples in world order.
    #[must_use]
    pub fn as_slice(&self) -> &[SampleSnapshot] {
        &self.samples
    }

    /// Number of captured samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Reports whether the snapshot captured no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples already collected.
    #[must_use]
    pub fn collected_count(&self) -> usize {
        self.samples.iter().filter(|sample| sample.collected).count()
    }
}

/// Immutable view of the manipulator used for animation and queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ManipulatorSnapshot {
    /// Cell currently occupied by the manipulator.
    pub position: CellCoord,
    /// Indicates whether a picked sample is being carried.
    pub holding: bool,
}

#[cfg(test)]
mod tests {
    use super::{
        parse_commands, CellCoord, Command, ConfigError, Direction, GridConfig, SampleSnapshot,
        SamplesSnapshot,
    };

    #[test]
    fn symbols_round_trip_through_commands() {
        for command in [
            Command::Left,
            Command::Right,
            Command::Up,
            Command::Down,
            Command::Pick,
            Command::Drop,
        ] {
            assert_eq!(Command::from_symbol(command.symbol()), command);
        }
    }

    #[test]
    fn unrecognised_symbols_become_unknown_commands() {
        assert_eq!(Command::from_symbol('L'), Command::Unknown('L'));
        assert_eq!(Command::Unknown('x').symbol(), 'x');
    }

    #[test]
    fn parse_commands_counts_characters_not_bytes() {
        let commands: Vec<_> = parse_commands("ППО?").collect();
        assert_eq!(
            commands,
            vec![
                Command::Right,
                Command::Right,
                Command::Pick,
                Command::Unknown('?')
            ]
        );
    }

    #[test]
    fn step_clamped_stays_inside_grid() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step_clamped(Direction::West, 10), corner);
        assert_eq!(corner.step_clamped(Direction::North, 10), corner);

        let far = CellCoord::new(9, 9);
        assert_eq!(far.step_clamped(Direction::East, 10), far);
        assert_eq!(far.step_clamped(Direction::South, 10), far);
        assert_eq!(
            far.step_clamped(Direction::West, 10),
            CellCoord::new(8, 9)
        );
    }

    #[test]
    fn grid_config_rejects_empty_grid() {
        assert_eq!(GridConfig::new(0, 3), Err(ConfigError::EmptyGrid));
        let config = GridConfig::new(4, 0).expect("valid config");
        assert!(config.contains(CellCoord::new(3, 3)));
        assert!(!config.contains(CellCoord::new(4, 0)));
    }

    #[test]
    fn grid_config_deserialization_is_validated() {
        let parsed: GridConfig =
            serde_json::from_str(r#"{"side":5,"sample_count":2}"#).expect("parse");
        assert_eq!(parsed, GridConfig::new(5, 2).expect("valid"));
        assert!(serde_json::from_str::<GridConfig>(r#"{"side":0,"sample_count":2}"#).is_err());
    }

    #[test]
    fn samples_snapshot_serializes_as_plain_array() {
        let snapshot = SamplesSnapshot::from_samples(vec![SampleSnapshot {
            x: 2,
            y: 3,
            collected: false,
        }]);
        let json = serde_json::to_string(&snapshot).expect("serialize");
        assert_eq!(json, r#"[{"x":2,"y":3,"collected":false}]"#);
    }
}
