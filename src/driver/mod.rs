//! Animation driver.
//!
//! Shared state machine behind every simulation view:
//!
//! ```text
//!            start / toggle
//!   ┌──────┐ ─────────────────▶ ┌─────────┐
//!   │ Idle │                    │ Running │ ──┐ on_frame: integrate,
//!   └──────┘ ◀───────────────── └─────────┘ ◀─┘ check, render, reschedule
//!        pause / reset / terminal
//! ```
//!
//! Every transition that leaves Running cancels the pending frame, and so
//! does dropping the driver. A frame callback that arrives when its handle
//! is no longer pending is ignored.
//!
//! Each accepted frame runs **integrate → Jidoka check → render**. A frame
//! that produces a non-finite value is rolled back to the pre-step snapshot
//! and the previous primitives stay on screen.

pub mod headless;
pub mod scheduler;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::engine::jidoka::ViolationSeverity;
use crate::engine::{
    DeltaPolicy, FrameDelta, JidokaConfig, JidokaGuard, JidokaVerdict, JidokaViolation, SimTime,
    TickSource,
};
use crate::error::LabResult;
use crate::render::{Readout, RenderCommand, Surface};
use crate::sims::{Simulation, StepOutcome};

pub use headless::{HeadlessRunner, RunReport};
pub use scheduler::{CallbackSlot, FrameHandle, FrameScheduler, QueueScheduler};

/// Whether the driver is scheduling frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

/// Driver settings shared by every host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Δt handling.
    #[serde(default)]
    pub delta_policy: DeltaPolicy,
    /// Per-frame anomaly guard.
    #[serde(default)]
    pub jidoka: JidokaConfig,
    /// Canvas size.
    #[serde(default)]
    pub surface: Surface,
}

/// What a frame callback did.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Callback was stale and did nothing.
    Ignored,
    /// State advanced and the next frame is scheduled.
    Advanced(FrameDelta),
    /// Step rejected and rolled back; the next frame is scheduled.
    Frozen(JidokaViolation),
    /// Terminal condition reached; the driver is now Idle.
    Finished,
}

/// Counters accumulated since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverStats {
    /// Frames integrated (including frozen ones).
    pub frames: u64,
    /// Frames rolled back by the Jidoka guard.
    pub frozen_frames: u64,
    /// Frames whose Δt was shortened by the delta policy.
    pub clamped_frames: u64,
    /// Frames flagged for energy drift.
    pub drift_warnings: u64,
    /// Stale callbacks ignored.
    pub ignored_callbacks: u64,
}

/// Drives one simulation from a clock and a frame scheduler.
pub struct AnimationDriver<S, C, F>
where
    S: Simulation,
    C: TickSource,
    F: FrameScheduler,
{
    sim: S,
    clock: C,
    scheduler: F,
    surface: Surface,
    delta_policy: DeltaPolicy,
    guard: JidokaGuard,
    run_state: RunState,
    pending: Option<FrameHandle>,
    last_timestamp: Option<SimTime>,
    frame: Vec<RenderCommand>,
    stats: DriverStats,
}

impl<S, C, F> AnimationDriver<S, C, F>
where
    S: Simulation,
    C: TickSource,
    F: FrameScheduler,
{
    /// Create an idle driver and render the initial state.
    pub fn new(sim: S, clock: C, scheduler: F, config: &DriverConfig) -> Self {
        let frame = sim.render(&config.surface);
        Self {
            sim,
            clock,
            scheduler,
            surface: config.surface,
            delta_policy: config.delta_policy,
            guard: JidokaGuard::new(config.jidoka),
            run_state: RunState::Idle,
            pending: None,
            last_timestamp: None,
            frame,
            stats: DriverStats::default(),
        }
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Whether frames are being scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// The driven simulation.
    #[must_use]
    pub const fn sim(&self) -> &S {
        &self.sim
    }

    /// Handle of the frame currently awaited, if any.
    #[must_use]
    pub const fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Canvas size.
    #[must_use]
    pub const fn surface(&self) -> Surface {
        self.surface
    }

    /// Primitives of the last rendered frame.
    #[must_use]
    pub fn frame(&self) -> &[RenderCommand] {
        &self.frame
    }

    /// Readouts for the current configuration and state.
    #[must_use]
    pub fn readouts(&self) -> Vec<Readout> {
        self.sim.readouts()
    }

    /// Counters.
    #[must_use]
    pub const fn stats(&self) -> DriverStats {
        self.stats
    }

    /// Start if idle, pause if running. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Scheduler` if the first frame cannot be requested.
    pub fn toggle(&mut self) -> LabResult<RunState> {
        if self.is_running() {
            self.pause();
        } else {
            self.start()?;
        }
        Ok(self.run_state)
    }

    /// Begin animating. No-op while already running.
    ///
    /// A simulation that already reached its terminal condition is reset
    /// first, so starting again relaunches it.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Scheduler` if the first frame cannot be requested.
    pub fn start(&mut self) -> LabResult<()> {
        if self.is_running() {
            return Ok(());
        }
        if self.sim.is_finished() {
            self.sim.reset();
            self.frame = self.sim.render(&self.surface);
        }

        let handle = self.scheduler.request_frame()?;
        self.last_timestamp = Some(self.clock.now());
        self.guard.arm(&self.sim);
        self.pending = Some(handle);
        self.run_state = RunState::Running;
        debug!(kind = %self.sim.kind(), ?handle, "animation started");
        Ok(())
    }

    /// Stop animating, keeping the current state on screen.
    pub fn pause(&mut self) {
        if !self.is_running() {
            return;
        }
        self.cancel_pending();
        self.run_state = RunState::Idle;
        debug!(kind = %self.sim.kind(), "animation paused");
    }

    /// Stop animating and restore the initial state for the current config.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.run_state = RunState::Idle;
        self.last_timestamp = None;
        self.sim.reset();
        self.guard.reset();
        self.frame = self.sim.render(&self.surface);
        debug!(kind = %self.sim.kind(), "animation reset");
    }

    /// Replace the simulation parameters.
    ///
    /// Parameters are locked while running: the call is ignored and returns
    /// `false`. Otherwise the state is reinitialised and re-rendered.
    pub fn set_config(&mut self, config: S::Config) -> bool {
        if self.is_running() {
            debug!(kind = %self.sim.kind(), "ignoring config change while running");
            return false;
        }
        self.sim.set_config(config);
        self.guard.reset();
        self.last_timestamp = None;
        self.frame = self.sim.render(&self.surface);
        true
    }

    /// Change the canvas size and re-render.
    pub fn resize(&mut self, surface: Surface) {
        self.surface = surface;
        self.frame = self.sim.render(&self.surface);
    }

    /// Handle a frame callback from the host.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Scheduler` if the next frame cannot be requested.
    /// The driver is left Idle in that case.
    pub fn on_frame(&mut self, handle: FrameHandle) -> LabResult<FrameOutcome> {
        if self.pending != Some(handle) || !self.is_running() {
            self.stats.ignored_callbacks += 1;
            trace!(?handle, pending = ?self.pending, "ignoring stale frame callback");
            return Ok(FrameOutcome::Ignored);
        }
        self.pending = None;

        let now = self.clock.now();
        let raw = self.last_timestamp.map_or(0.0, |last| now.secs_since(last));
        self.last_timestamp = Some(now);
        let delta = self.delta_policy.apply(raw);
        if delta.was_clamped() {
            self.stats.clamped_frames += 1;
            debug!(raw = delta.raw, dt = delta.dt, "frame delta clamped");
        }

        let snapshot = self.sim.snapshot();
        let step = self.sim.integrate(delta.dt);
        self.stats.frames += 1;

        match self.guard.check(&self.sim) {
            JidokaVerdict::Continue => {}
            JidokaVerdict::Drifting { drift, severity } => {
                self.stats.drift_warnings += 1;
                if severity == ViolationSeverity::Critical {
                    warn!(kind = %self.sim.kind(), drift, "energy drift beyond tolerance");
                } else {
                    debug!(kind = %self.sim.kind(), drift, "energy drift approaching tolerance");
                }
            }
            JidokaVerdict::Freeze(violation) => {
                self.sim.restore(snapshot);
                self.stats.frozen_frames += 1;
                warn!(kind = %self.sim.kind(), ?violation, dt = delta.dt, "frame frozen");
                self.schedule_next()?;
                return Ok(FrameOutcome::Frozen(violation));
            }
        }

        self.frame = self.sim.render(&self.surface);

        if step == StepOutcome::Finished {
            self.run_state = RunState::Idle;
            debug!(kind = %self.sim.kind(), "terminal condition reached");
            return Ok(FrameOutcome::Finished);
        }

        self.schedule_next()?;
        Ok(FrameOutcome::Advanced(delta))
    }

    /// Cancel any pending frame and go idle. Called on drop.
    pub fn teardown(&mut self) {
        self.cancel_pending();
        self.run_state = RunState::Idle;
    }

    fn schedule_next(&mut self) -> LabResult<()> {
        match self.scheduler.request_frame() {
            Ok(handle) => {
                self.pending = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.run_state = RunState::Idle;
                Err(e)
            }
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
            trace!(?handle, "pending frame cancelled");
        }
    }
}

impl<S, C, F> Drop for AnimationDriver<S, C, F>
where
    S: Simulation,
    C: TickSource,
    F: FrameScheduler,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<S, C, F> std::fmt::Debug for AnimationDriver<S, C, F>
where
    S: Simulation + std::fmt::Debug,
    C: TickSource,
    F: FrameScheduler,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationDriver")
            .field("sim", &self.sim)
            .field("run_state", &self.run_state)
            .field("pending", &self.pending)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
