//! Operator session: one world, its execution lock, and the run history.

use anyhow::{bail, Result};
use manipulator_core::GridConfig;
use manipulator_system_history::{HistoryLog, HistoryRecord, HistoryRecorder};
use manipulator_system_optimizer::optimize;
use manipulator_system_simulation::{Simulation, StepObserver, WorldSnapshot};
use manipulator_world::World;
use rand::Rng;
use time::OffsetDateTime;
use tracing::info;

/// Couples the simulation engine with the history it feeds.
#[derive(Debug)]
pub(crate) struct Session {
    grid: GridConfig,
    simulation: Simulation,
    history: HistoryLog,
}

impl Session {
    /// Starts a session with samples scattered by `rng`.
    pub(crate) fn generate<R: Rng + ?Sized>(grid: GridConfig, rng: &mut R) -> Self {
        Self {
            grid,
            simulation: Simulation::new(World::generate(grid, rng)),
            history: HistoryLog::new(),
        }
    }

    /// Grid the session was created with.
    pub(crate) const fn grid(&self) -> GridConfig {
        self.grid
    }

    /// Executes a command string and records the completed run.
    ///
    /// Whitespace is stripped before execution. A string with no commands
    /// left is rejected, matching the required field of the operator form.
    pub(crate) fn execute<O>(&mut self, raw: &str, observer: &mut O) -> Result<&HistoryRecord>
    where
        O: StepObserver + ?Sized,
    {
        let commands: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if commands.is_empty() {
            bail!("commands are required");
        }

        let outcome = self.simulation.run(&commands, observer)?;
        let optimized = optimize(&commands);
        info!(original = %commands, optimized = %optimized, "recording command run");

        self.history.record(HistoryRecord::new(
            commands,
            optimized,
            OffsetDateTime::now_utc(),
            outcome.initial_snapshot,
            outcome.final_snapshot,
        ));
        self.history
            .latest()
            .ok_or_else(|| anyhow::anyhow!("history lost the record it just stored"))
    }

    /// Restores the generated layout.
    pub(crate) fn reset(&self) -> Result<()> {
        self.simulation.reset()?;
        Ok(())
    }

    /// Captures the current world state for display.
    pub(crate) fn snapshot(&self) -> Result<WorldSnapshot> {
        Ok(self.simulation.snapshot()?)
    }

    /// Records completed so far, newest first.
    pub(crate) const fn history(&self) -> &HistoryLog {
        &self.history
    }
}
