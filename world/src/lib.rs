#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the sample manipulator.
//!
//! The world owns the manipulator and the samples scattered across the grid.
//! It is mutated exclusively through [`apply`], which interprets a single
//! [`Command`] and reports the outcome as [`Event`] values, and through
//! [`reset`], which restores the layout generated when the session began.
//! Read-only access is offered by the [`query`] module.

use manipulator_core::{CellCoord, Command, Event, GridConfig, SampleSnapshot};
use rand::Rng;

/// Represents the authoritative manipulator world state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct World {
    config: GridConfig,
    manipulator: Manipulator,
    samples: Vec<Sample>,
    pristine: Vec<Sample>,
}

impl World {
    /// Creates a fresh world with samples scattered by the provided random source.
    ///
    /// Coordinates are drawn independently, so several samples may share a cell.
    #[must_use]
    pub fn generate<R: Rng + ?Sized>(config: GridConfig, rng: &mut R) -> Self {
        let cells: Vec<CellCoord> = (0..config.sample_count())
            .map(|_| sample_cell(rng, config.side()))
            .collect();
        Self::with_samples(config, cells)
    }

    /// Creates a fresh world with samples placed at explicit cells.
    ///
    /// Cells outside the grid are clamped onto its nearest edge.
    #[must_use]
    pub fn with_samples(config: GridConfig, cells: impl IntoIterator<Item = CellCoord>) -> Self {
        let last = config.side() - 1;
        let samples: Vec<Sample> = cells
            .into_iter()
            .map(|cell| {
                Sample::uncollected(CellCoord::new(cell.x().min(last), cell.y().min(last)))
            })
            .collect();
        Self {
            config,
            manipulator: Manipulator::default(),
            pristine: samples.clone(),
            samples,
        }
    }

    fn first_uncollected_at(&self, cell: CellCoord) -> Option<usize> {
        self.samples
            .iter()
            .position(|sample| sample.cell == cell && !sample.collected)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Every command yields a valid world. Commands that cannot take effect are
/// reported through [`Event::CommandIgnored`] or [`Event::MovementBlocked`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Left | Command::Right | Command::Up | Command::Down => {
            let Some(direction) = command.direction() else {
                return;
            };
            let from = world.manipulator.position;
            let to = from.step_clamped(direction, world.config.side());
            if to == from {
                out_events.push(Event::MovementBlocked { at: from, direction });
            } else {
                world.manipulator.position = to;
                out_events.push(Event::ManipulatorMoved { from, to });
            }
        }
        Command::Pick => {
            let at = world.manipulator.position;
            let candidate = if world.manipulator.holding {
                None
            } else {
                world.first_uncollected_at(at)
            };
            match candidate {
                Some(index) => {
                    world.samples[index].collected = true;
                    world.manipulator.holding = true;
                    out_events.push(Event::SamplePicked { index, at });
                }
                None => out_events.push(Event::CommandIgnored { command }),
            }
        }
        Command::Drop => {
            if world.manipulator.holding {
                world.manipulator.holding = false;
                out_events.push(Event::SampleDropped {
                    at: world.manipulator.position,
                });
            } else {
                out_events.push(Event::CommandIgnored { command });
            }
        }
        Command::Unknown(_) => out_events.push(Event::CommandIgnored { command }),
    }
}

/// Restores the manipulator and samples to the state generated for the session.
pub fn reset(world: &mut World) {
    world.manipulator = Manipulator::default();
    world.samples.clone_from(&world.pristine);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Sample, World};
    use manipulator_core::{GridConfig, ManipulatorSnapshot, SamplesSnapshot};

    /// Provides read-only access to the world's grid configuration.
    #[must_use]
    pub fn config(world: &World) -> GridConfig {
        world.config
    }

    /// Captures the manipulator's current position and holding state.
    #[must_use]
    pub fn manipulator(world: &World) -> ManipulatorSnapshot {
        ManipulatorSnapshot {
            position: world.manipulator.position,
            holding: world.manipulator.holding,
        }
    }

    /// Captures every sample in world order.
    #[must_use]
    pub fn samples(world: &World) -> SamplesSnapshot {
        SamplesSnapshot::from_samples(world.samples.iter().map(Sample::snapshot).collect())
    }

    /// Captures the samples exactly as they were generated for the session.
    #[must_use]
    pub fn pristine_samples(world: &World) -> SamplesSnapshot {
        SamplesSnapshot::from_samples(world.pristine.iter().map(Sample::snapshot).collect())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Manipulator {
    position: CellCoord,
    holding: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Sample {
    cell: CellCoord,
    collected: bool,
}

impl Sample {
    const fn uncollected(cell: CellCoord) -> Self {
        Self {
            cell,
            collected: false,
        }
    }

    const fn snapshot(&self) -> SampleSnapshot {
        SampleSnapshot {
            x: self.cell.x(),
            y: self.cell.y(),
            collected: self.collected,
        }
    }
}

fn sample_cell<R: Rng + ?Sized>(rng: &mut R, side: u32) -> CellCoord {
    CellCoord::new(rng.gen_range(0..side), rng.gen_range(0..side))
}
