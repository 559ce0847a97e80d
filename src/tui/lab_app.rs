//! Lab TUI application state and logic.
//!
//! The terminal loop plays the role of the browser: every tick it fires
//! the frame the driver asked for, if any, and repaints.

use crossterm::event::KeyCode;

use crate::config::LabConfig;
use crate::driver::{AnimationDriver, FrameOutcome, QueueScheduler, RunState};
use crate::engine::{TickSource, WallClock};
use crate::render::{Painter, Readout};
use crate::sims::{AnyConfig, AnySimulation, Simulation, SimulationKind, Slider, WaveType};
use crate::tui::painter::TerminalPainter;

/// Application state for the lab TUI.
pub struct LabApp<C: TickSource = WallClock> {
    driver: AnimationDriver<AnySimulation, C, QueueScheduler>,
    scheduler: QueueScheduler,
    painter: TerminalPainter,
    /// Per-simulation parameters, kept across switches.
    config: LabConfig,
    /// Index of the highlighted slider.
    pub selected: usize,
    /// One-line message for the status bar.
    pub status: String,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl LabApp<WallClock> {
    /// Create an app on the wall clock.
    #[must_use]
    pub fn new(kind: SimulationKind, config: LabConfig) -> Self {
        Self::with_clock(kind, config, WallClock::new())
    }
}

impl<C: TickSource> LabApp<C> {
    /// Create an app on the given clock.
    #[must_use]
    pub fn with_clock(kind: SimulationKind, config: LabConfig, clock: C) -> Self {
        let scheduler = QueueScheduler::new();
        let driver = AnimationDriver::new(
            AnySimulation::from_config(config.sim_config(kind)),
            clock,
            scheduler.clone(),
            &config.driver,
        );
        let mut app = Self {
            driver,
            scheduler,
            painter: TerminalPainter::new(config.driver.surface),
            config,
            selected: 0,
            status: String::new(),
            should_quit: false,
        };
        app.repaint();
        app
    }

    /// Simulation on screen.
    #[must_use]
    pub fn kind(&self) -> SimulationKind {
        self.driver.sim().kind()
    }

    /// Whether the animation is running.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.driver.run_state()
    }

    /// The animation driver.
    #[must_use]
    pub const fn driver(&self) -> &AnimationDriver<AnySimulation, C, QueueScheduler> {
        &self.driver
    }

    /// Canvas painter holding the last frame.
    #[must_use]
    pub const fn painter(&self) -> &TerminalPainter {
        &self.painter
    }

    /// Readouts for the side panel.
    #[must_use]
    pub fn readouts(&self) -> Vec<Readout> {
        self.driver.readouts()
    }

    /// Sliders of the current simulation with their values.
    #[must_use]
    pub fn sliders(&self) -> Vec<(Slider, f64)> {
        let config = self.driver.sim().config();
        config
            .sliders()
            .iter()
            .filter_map(|s| config.param(s.name).map(|v| (*s, v)))
            .collect()
    }

    /// Fire the pending frame, if any.
    pub fn update(&mut self) {
        let Some(handle) = self.scheduler.pop_due() else {
            return;
        };
        match self.driver.on_frame(handle) {
            Ok(FrameOutcome::Ignored) => return,
            Ok(FrameOutcome::Frozen(violation)) => {
                self.status = format!("Frame frozen: {violation:?}");
            }
            Ok(FrameOutcome::Finished) => self.status = "Landed".to_string(),
            Ok(FrameOutcome::Advanced(_)) => {}
            Err(e) => self.status = e.to_string(),
        }
        self.repaint();
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyCode) {
        self.status.clear();
        match key {
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => {
                if let Err(e) = self.driver.toggle() {
                    self.status = e.to_string();
                }
            }
            KeyCode::Char('r' | 'R') => self.driver.reset(),
            KeyCode::Char('1') => self.switch(SimulationKind::Pendulum),
            KeyCode::Char('2') => self.switch(SimulationKind::Projectile),
            KeyCode::Char('3') => self.switch(SimulationKind::Wave),
            KeyCode::Char('w' | 'W') => self.toggle_wave_type(),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let count = self.driver.sim().config().sliders().len();
                self.selected = (self.selected + 1).min(count.saturating_sub(1));
            }
            KeyCode::Left => self.nudge(-1),
            KeyCode::Right => self.nudge(1),
            _ => {}
        }
        self.repaint();
    }

    fn switch(&mut self, kind: SimulationKind) {
        if kind == self.kind() {
            return;
        }
        if self.apply(self.config.sim_config(kind)) {
            self.selected = 0;
        }
    }

    fn nudge(&mut self, notches: i32) {
        let config = self.driver.sim().config();
        let Some(slider) = config.sliders().get(self.selected) else {
            return;
        };
        match config.nudge(slider.name, notches) {
            Ok(next) => {
                self.apply(next);
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn toggle_wave_type(&mut self) {
        if let AnyConfig::Wave(mut wave) = self.driver.sim().config() {
            wave.wave_type = match wave.wave_type {
                WaveType::Sine => WaveType::Square,
                WaveType::Square => WaveType::Sine,
            };
            self.apply(AnyConfig::Wave(wave));
        }
    }

    /// Hand a new configuration to the driver; refused while running.
    fn apply(&mut self, next: AnyConfig) -> bool {
        if !self.driver.set_config(next.clone()) {
            self.status = "Pause to change parameters".to_string();
            return false;
        }
        match next {
            AnyConfig::Pendulum(c) => self.config.pendulum = c,
            AnyConfig::Projectile(c) => self.config.projectile = c,
            AnyConfig::Wave(c) => self.config.wave = c,
        }
        true
    }

    fn repaint(&mut self) {
        if let Err(e) = self.painter.paint(self.driver.frame()) {
            self.status = e.to_string();
        }
    }
}
