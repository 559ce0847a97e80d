//! Headless runs.
//!
//! [`HeadlessRunner`] drives an [`AnimationDriver`] with a [`FixedStepClock`]
//! and a [`QueueScheduler`], firing frames back to back instead of waiting
//! for a display. Runs are fully deterministic: the same simulation, frame
//! rate and frame count always produce the same final state.

use serde::Serialize;
use tracing::info;

use super::{AnimationDriver, DriverConfig, DriverStats, FrameOutcome, QueueScheduler};
use crate::engine::FixedStepClock;
use crate::error::LabResult;
use crate::render::{Painter, Readout};
use crate::sims::{Simulation, SimulationKind};

/// Summary of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport<St: Serialize> {
    /// Simulation that ran.
    pub kind: SimulationKind,
    /// Frames delivered to the driver.
    pub frames_run: u64,
    /// Whether the terminal condition was reached.
    pub finished: bool,
    /// Driver counters.
    pub stats: DriverStats,
    /// Final state.
    pub state: St,
    /// Final readouts.
    pub readouts: Vec<Readout>,
}

/// Fixed-rate, display-less driver.
pub struct HeadlessRunner<S: Simulation> {
    driver: AnimationDriver<S, FixedStepClock, QueueScheduler>,
    scheduler: QueueScheduler,
}

impl<S: Simulation> HeadlessRunner<S> {
    /// Create a runner delivering `fps` frames per simulated second.
    #[must_use]
    pub fn new(sim: S, fps: u32, config: &DriverConfig) -> Self {
        let scheduler = QueueScheduler::new();
        let driver = AnimationDriver::new(
            sim,
            FixedStepClock::from_fps(fps),
            scheduler.clone(),
            config,
        );
        Self { driver, scheduler }
    }

    /// The underlying driver.
    #[must_use]
    pub const fn driver(&self) -> &AnimationDriver<S, FixedStepClock, QueueScheduler> {
        &self.driver
    }

    /// Mutable access to the underlying driver.
    pub fn driver_mut(&mut self) -> &mut AnimationDriver<S, FixedStepClock, QueueScheduler> {
        &mut self.driver
    }

    /// Run up to `max_frames` frames, stopping early on the terminal condition.
    ///
    /// # Errors
    ///
    /// Propagates scheduling errors from the driver.
    pub fn run(&mut self, max_frames: u64) -> LabResult<RunReport<S::State>> {
        self.run_inner(max_frames, None)
    }

    /// Like [`run`](Self::run), painting every frame.
    ///
    /// # Errors
    ///
    /// Propagates scheduling and paint errors.
    pub fn run_with_painter(
        &mut self,
        max_frames: u64,
        painter: &mut dyn Painter,
    ) -> LabResult<RunReport<S::State>> {
        self.run_inner(max_frames, Some(painter))
    }

    fn run_inner(
        &mut self,
        max_frames: u64,
        mut painter: Option<&mut dyn Painter>,
    ) -> LabResult<RunReport<S::State>> {
        if let Some(p) = painter.as_mut() {
            p.paint(self.driver.frame())?;
        }
        self.driver.start()?;

        let mut frames_run = 0;
        let mut finished = false;
        while frames_run < max_frames {
            let Some(handle) = self.scheduler.pop_due() else {
                break;
            };
            let outcome = self.driver.on_frame(handle)?;
            frames_run += 1;
            if let Some(p) = painter.as_mut() {
                p.paint(self.driver.frame())?;
            }
            if outcome == FrameOutcome::Finished {
                finished = true;
                break;
            }
        }
        self.driver.pause();

        let report = RunReport {
            kind: self.driver.sim().kind(),
            frames_run,
            finished,
            stats: self.driver.stats(),
            state: self.driver.sim().snapshot(),
            readouts: self.driver.readouts(),
        };
        info!(
            kind = %report.kind,
            frames = report.frames_run,
            finished = report.finished,
            frozen = report.stats.frozen_frames,
            "headless run complete"
        );
        Ok(report)
    }
}
