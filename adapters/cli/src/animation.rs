//! Text renderer that draws the grid after every applied command.

use std::io::{self, Write};

use manipulator_core::{CellCoord, Event, ManipulatorSnapshot, SamplesSnapshot};
use manipulator_system_simulation::{StepFrame, StepObserver};

const EMPTY_CELL: char = '.';
const SAMPLE_CELL: char = 'o';
const MANIPULATOR_CELL: char = 'M';
const LOADED_MANIPULATOR_CELL: char = '+';

/// Observer that redraws the grid for every frame of a run.
///
/// Sample collection is tracked from [`Event::SamplePicked`] so the renderer
/// never touches the world directly.
#[derive(Debug)]
pub(crate) struct GridAnimator<W> {
    out: W,
    side: u32,
    uncollected: Vec<Option<CellCoord>>,
    error: Option<io::Error>,
}

impl<W: Write> GridAnimator<W> {
    /// Prepares an animator for a run starting from `samples`.
    pub(crate) fn new(out: W, side: u32, samples: &SamplesSnapshot) -> Self {
        let uncollected = samples
            .iter()
            .map(|sample| (!sample.collected).then(|| sample.cell()))
            .collect();
        Self {
            out,
            side,
            uncollected,
            error: None,
        }
    }

    /// Reports the first write failure encountered during the run, if any.
    pub(crate) fn finish(self) -> io::Result<W> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.out),
        }
    }

    fn draw(&mut self, frame: &StepFrame<'_>) -> io::Result<()> {
        writeln!(
            self.out,
            "step {} '{}' -> ({}, {}){}",
            frame.index + 1,
            frame.symbol,
            frame.manipulator.position.x(),
            frame.manipulator.position.y(),
            if frame.manipulator.holding { " holding" } else { "" },
        )?;
        for row in render_rows(self.side, frame.manipulator, &self.uncollected) {
            writeln!(self.out, "{row}")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> StepObserver for GridAnimator<W> {
    fn on_step(&mut self, frame: &StepFrame<'_>) {
        for event in frame.events {
            if let Event::SamplePicked { index, .. } = event {
                if let Some(slot) = self.uncollected.get_mut(*index) {
                    *slot = None;
                }
            }
        }

        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.draw(frame) {
            self.error = Some(error);
        }
    }
}

fn render_rows(
    side: u32,
    manipulator: ManipulatorSnapshot,
    uncollected: &[Option<CellCoord>],
) -> Vec<String> {
    (0..side)
        .map(|y| {
            (0..side)
                .map(|x| {
                    let cell = CellCoord::new(x, y);
                    if cell == manipulator.position {
                        if manipulator.holding {
                            LOADED_MANIPULATOR_CELL
                        } else {
                            MANIPULATOR_CELL
                        }
                    } else if uncollected.contains(&Some(cell)) {
                        SAMPLE_CELL
                    } else {
                        EMPTY_CELL
                    }
                })
                .collect::<String>()
        })
        .collect()
}
