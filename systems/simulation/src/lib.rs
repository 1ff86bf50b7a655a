#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation engine that folds operator command strings over the world.
//!
//! The engine owns the authoritative [`World`] behind an execution lock. A
//! run holds the lock from its first symbol to its last, so a second run (or a
//! reset) requested in the meantime is rejected with
//! [`SimulationError::RunInFlight`] instead of interleaving with it. Each
//! applied symbol is reported to a [`StepObserver`], which is where adapters
//! hook animation and pacing.

use std::{
    sync::{Mutex, MutexGuard, TryLockError},
    thread,
    time::Duration,
};

use manipulator_core::{Command, Event, ManipulatorSnapshot, SamplesSnapshot};
use manipulator_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Errors reported when the engine cannot accept a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// Another command sequence is still executing against the world.
    #[error("a command sequence is already running against this world")]
    RunInFlight,
}

/// Intermediate state reported after a single symbol has been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepFrame<'a> {
    /// Zero-based position of the symbol within the command string.
    pub index: usize,
    /// Symbol exactly as it appeared in the command string.
    pub symbol: char,
    /// Command the symbol was interpreted as.
    pub command: Command,
    /// Manipulator state after the command was applied.
    pub manipulator: ManipulatorSnapshot,
    /// Events the world reported while applying the command.
    pub events: &'a [Event],
}

/// Receives every intermediate frame produced by a run.
pub trait StepObserver {
    /// Called once per symbol, after it has been applied and before the next one.
    fn on_step(&mut self, frame: &StepFrame<'_>);
}

/// Observer that ignores every frame, for headless execution.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&mut self, _frame: &StepFrame<'_>) {}
}

/// Observer that forwards frames and then pauses so each one stays visible.
#[derive(Debug)]
pub struct ThrottledObserver<O> {
    inner: O,
    delay: Duration,
}

impl<O: StepObserver> ThrottledObserver<O> {
    /// Wraps `inner`, pausing for `delay` after every forwarded frame.
    #[must_use]
    pub const fn new(inner: O, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Pause applied after each frame.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Consumes the wrapper, yielding the inner observer.
    #[must_use]
    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: StepObserver> StepObserver for ThrottledObserver<O> {
    fn on_step(&mut self, frame: &StepFrame<'_>) {
        self.inner.on_step(frame);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

/// Raw materials produced by a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// World state after the final symbol.
    pub world: World,
    /// Samples as they were before the first symbol.
    pub initial_snapshot: SamplesSnapshot,
    /// Samples as they were after the final symbol.
    pub final_snapshot: SamplesSnapshot,
    /// Number of symbols applied.
    pub steps: usize,
}

impl RunOutcome {
    /// Manipulator state after the final symbol.
    #[must_use]
    pub fn manipulator(&self) -> ManipulatorSnapshot {
        query::manipulator(&self.world)
    }
}

/// Read-only copy of the world captured between runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSnapshot {
    /// Current manipulator state.
    pub manipulator: ManipulatorSnapshot,
    /// Current samples in world order.
    pub samples: SamplesSnapshot,
}

/// Guarded owner of the world that executes command strings one at a time.
#[derive(Debug)]
pub struct Simulation {
    world: Mutex<World>,
}

impl Simulation {
    /// Takes ownership of a freshly generated world.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            world: Mutex::new(world),
        }
    }

    /// Applies every symbol of `commands` in order, reporting each step to `observer`.
    ///
    /// Snapshots capture only the samples; manipulator state is returned
    /// through [`RunOutcome::world`]. An empty string applies nothing and
    /// yields identical snapshots.
    pub fn run<O>(&self, commands: &str, observer: &mut O) -> Result<RunOutcome, SimulationError>
    where
        O: StepObserver + ?Sized,
    {
        let mut world = self.acquire("run")?;
        debug!(symbols = commands.chars().count(), "starting command run");

        let initial_snapshot = query::samples(&world);
        let mut events = Vec::new();
        let mut steps = 0usize;

        for (index, symbol) in commands.chars().enumerate() {
            let command = Command::from_symbol(symbol);
            events.clear();
            world::apply(&mut world, command, &mut events);

            let frame = StepFrame {
                index,
                symbol,
                command,
                manipulator: query::manipulator(&world),
                events: &events,
            };
            trace!(?frame, "applied command");
            observer.on_step(&frame);
            steps += 1;
        }

        let final_snapshot = query::samples(&world);
        let manipulator = query::manipulator(&world);
        info!(
            steps,
            x = manipulator.position.x(),
            y = manipulator.position.y(),
            holding = manipulator.holding,
            collected = final_snapshot.collected_count(),
            "command run finished",
        );

        Ok(RunOutcome {
            world: world.clone(),
            initial_snapshot,
            final_snapshot,
            steps,
        })
    }

    /// Restores the manipulator and samples to the layout generated for the session.
    pub fn reset(&self) -> Result<(), SimulationError> {
        let mut world = self.acquire("reset")?;
        world::reset(&mut world);
        debug!("world reset to generated layout");
        Ok(())
    }

    /// Captures the current manipulator and samples.
    pub fn snapshot(&self) -> Result<WorldSnapshot, SimulationError> {
        let world = self.acquire("snapshot")?;
        Ok(WorldSnapshot {
            manipulator: query::manipulator(&world),
            samples: query::samples(&world),
        })
    }

    /// Consumes the engine, yielding the world it guarded.
    #[must_use]
    pub fn into_world(self) -> World {
        self.world
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn acquire(&self, operation: &'static str) -> Result<MutexGuard<'_, World>, SimulationError> {
        match self.world.try_lock() {
            Ok(guard) => Ok(guard),
            // Every transition leaves the world valid, so state behind a
            // poisoned lock is still usable.
            Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => {
                warn!(operation, "rejected while a command run is in flight");
                Err(SimulationError::RunInFlight)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manipulator_core::{CellCoord, GridConfig};

    #[derive(Default)]
    struct FrameLog {
        frames: Vec<(usize, char, ManipulatorSnapshot)>,
        events: Vec<Event>,
    }

    impl StepObserver for FrameLog {
        fn on_step(&mut self, frame: &StepFrame<'_>) {
            self.frames
                .push((frame.index, frame.symbol, frame.manipulator));
            self.events.extend_from_slice(frame.events);
        }
    }

    struct Reentrant<'a> {
        simulation: &'a Simulation,
        rejections: Vec<Option<SimulationError>>,
    }

    impl StepObserver for Reentrant<'_> {
        fn on_step(&mut self, _frame: &StepFrame<'_>) {
            let run = self.simulation.run("П", &mut NoopObserver);
            self.rejections.push(run.err());
            self.rejections.push(self.simulation.reset().err());
            self.rejections.push(self.simulation.snapshot().err());
        }
    }

    fn simulation() -> Simulation {
        Simulation::new(World::with_samples(
            GridConfig::default(),
            [CellCoord::new(1, 0)],
        ))
    }

    const fn at(x: u32, y: u32, holding: bool) -> ManipulatorSnapshot {
        ManipulatorSnapshot {
            position: CellCoord::new(x, y),
            holding,
        }
    }

    #[test]
    fn frames_report_every_symbol_in_order() {
        let simulation = simulation();
        let mut log = FrameLog::default();

        let outcome = simulation.run("ПОx", &mut log).expect("run");
        assert_eq!(outcome.steps, 3);
        assert_eq!(
            log.frames,
            vec![
                (0, 'П', at(1, 0, false)),
                (1, 'О', at(1, 0, true)),
                (2, 'x', at(1, 0, true)),
            ]
        );
    }

    #[test]
    fn frames_carry_step_events() {
        let simulation = simulation();
        let mut log = FrameLog::default();
        let _ = simulation.run("ПОЛ", &mut log).expect("run");
        assert_eq!(
            log.events,
            vec![
                Event::ManipulatorMoved {
                    from: CellCoord::ORIGIN,
                    to: CellCoord::new(1, 0)
                },
                Event::SamplePicked {
                    index: 0,
                    at: CellCoord::new(1, 0)
                },
                Event::ManipulatorMoved {
                    from: CellCoord::new(1, 0),
                    to: CellCoord::ORIGIN
                },
            ]
        );
    }

    #[test]
    fn reentrant_requests_from_observer_are_rejected() {
        let simulation = simulation();
        let mut observer = Reentrant {
            simulation: &simulation,
            rejections: Vec::new(),
        };

        let outcome = simulation.run("ПП", &mut observer).expect("outer run");
        assert_eq!(outcome.manipulator(), at(2, 0, false));
        assert_eq!(observer.rejections.len(), 6);
        assert!(observer
            .rejections
            .iter()
            .all(|rejection| *rejection == Some(SimulationError::RunInFlight)));

        assert!(simulation.snapshot().is_ok());
    }

    #[test]
    fn throttled_observer_forwards_frames() {
        let simulation = simulation();
        let mut observer = ThrottledObserver::new(FrameLog::default(), Duration::from_millis(1));
        let _ = simulation.run("ЛЛЛ", &mut observer).expect("run");
        assert_eq!(observer.delay(), Duration::from_millis(1));
        assert_eq!(observer.into_inner().frames.len(), 3);
    }
}
