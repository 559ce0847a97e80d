//! Lifecycle tests for the lab TUI driven by key presses.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crossterm::event::KeyCode;

use super::lab_app::LabApp;
use super::painter::TermShape;
use crate::config::LabConfig;
use crate::driver::RunState;
use crate::engine::FixedStepClock;
use crate::render::readout;
use crate::sims::{AnyState, Simulation, SimulationKind};

fn app(kind: SimulationKind) -> LabApp<FixedStepClock> {
    LabApp::with_clock(kind, LabConfig::default(), FixedStepClock::from_fps(60))
}

fn wave_phase(app: &LabApp<FixedStepClock>) -> f64 {
    match app.driver().sim().snapshot() {
        AnyState::Wave(state) => state.phase,
        other => panic!("expected wave state, got {other:?}"),
    }
}

#[test]
fn test_idle_updates_do_not_animate() {
    let mut app = app(SimulationKind::Wave);
    for _ in 0..10 {
        app.update();
    }
    assert_eq!(wave_phase(&app), 0.0);
}

#[test]
fn test_running_wave_phase_increases() {
    let mut app = app(SimulationKind::Wave);
    app.handle_key(KeyCode::Char(' '));

    let mut last = wave_phase(&app);
    for _ in 0..30 {
        app.update();
        let phase = wave_phase(&app);
        assert!(phase > last);
        last = phase;
    }
    // Half a second at 1 Hz.
    assert!((last - std::f64::consts::PI).abs() < 1e-6);
}

#[test]
fn test_pause_freezes_then_resume_continues() {
    let mut app = app(SimulationKind::Wave);
    app.handle_key(KeyCode::Char(' '));
    app.update();
    app.handle_key(KeyCode::Char(' '));
    let paused = wave_phase(&app);

    app.update();
    app.update();
    assert_eq!(wave_phase(&app), paused);

    app.handle_key(KeyCode::Char(' '));
    app.update();
    assert!(wave_phase(&app) > paused);
}

#[test]
fn test_reset_restores_initial_readouts() {
    let mut app = app(SimulationKind::Pendulum);
    let initial = app.readouts();

    app.handle_key(KeyCode::Char(' '));
    for _ in 0..20 {
        app.update();
    }
    assert_ne!(app.readouts(), initial);

    app.handle_key(KeyCode::Char('r'));
    assert_eq!(app.run_state(), RunState::Idle);
    assert_eq!(app.readouts(), initial);
}

#[test]
fn test_projectile_lands_and_stops() {
    let mut app = app(SimulationKind::Projectile);
    app.handle_key(KeyCode::Char(' '));
    for _ in 0..1_000 {
        app.update();
    }
    assert_eq!(app.run_state(), RunState::Idle);
    assert_eq!(app.status, "Landed");

    let readouts = app.readouts();
    let height = readout::find(&readouts, "Height").expect("height readout");
    assert_eq!(height.display_value(), "0.0 m");
}

#[test]
fn test_canvas_redrawn_after_frames() {
    let mut app = app(SimulationKind::Pendulum);
    let before = app.painter().shapes().to_vec();

    app.handle_key(KeyCode::Char(' '));
    for _ in 0..5 {
        app.update();
    }
    let after = app.painter().shapes();
    assert_eq!(before.len(), after.len());
    assert_ne!(before.as_slice(), after);
    assert!(after.iter().any(|s| matches!(s, TermShape::Circle(_))));
}
