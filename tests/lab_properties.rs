//! End-to-end properties of the lab simulations and the animation driver.

use std::cell::Cell;
use std::rc::Rc;

use scinapse::engine::jidoka::Inspect;
use scinapse::prelude::*;
use scinapse::render::readout;
use scinapse::sims::{FlightTimePolicy, PendulumState, StepOutcome};

/// Clock shared between a test and the driver that owns it.
#[derive(Clone, Default)]
struct SharedClock(Rc<Cell<SimTime>>);

impl SharedClock {
    fn advance(&self, secs: f64) {
        self.0.set(self.0.get() + SimTime::from_secs(secs));
    }
}

impl TickSource for SharedClock {
    fn now(&mut self) -> SimTime {
        self.0.get()
    }
}

type Driver<S> = AnimationDriver<S, SharedClock, QueueScheduler>;

fn driver<S: Simulation>(sim: S) -> (Driver<S>, SharedClock, QueueScheduler) {
    let clock = SharedClock::default();
    let scheduler = QueueScheduler::new();
    let driver = AnimationDriver::new(
        sim,
        clock.clone(),
        scheduler.clone(),
        &DriverConfig::default(),
    );
    (driver, clock, scheduler)
}

fn tick<S: Simulation>(
    driver: &mut Driver<S>,
    clock: &SharedClock,
    scheduler: &QueueScheduler,
    secs: f64,
) -> FrameOutcome {
    clock.advance(secs);
    let handle = scheduler.pop_due().expect("frame pending");
    driver.on_frame(handle).expect("frame handled")
}

/// Pendulum that blows up on one chosen step.
#[derive(Debug)]
struct Poisoned {
    inner: PendulumSim,
    poison_on: u32,
    steps: u32,
}

impl Inspect for Poisoned {
    fn scalars(&self) -> Vec<(&'static str, f64)> {
        self.inner.scalars()
    }
}

impl Simulation for Poisoned {
    type Config = PendulumConfig;
    type State = PendulumState;

    fn kind(&self) -> SimulationKind {
        SimulationKind::Pendulum
    }

    fn config(&self) -> PendulumConfig {
        self.inner.config()
    }

    fn set_config(&mut self, config: PendulumConfig) {
        self.inner.set_config(config);
    }

    fn snapshot(&self) -> PendulumState {
        self.inner.snapshot()
    }

    fn restore(&mut self, state: PendulumState) {
        self.inner.restore(state);
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn integrate(&mut self, dt: f64) -> StepOutcome {
        self.steps += 1;
        let outcome = self.inner.integrate(dt);
        if self.steps == self.poison_on {
            let mut state = self.inner.snapshot();
            state.angular_velocity = f64::NAN;
            self.inner.restore(state);
        }
        outcome
    }

    fn render(&self, surface: &Surface) -> Vec<RenderCommand> {
        self.inner.render(surface)
    }

    fn readouts(&self) -> Vec<Readout> {
        self.inner.readouts()
    }
}

// Property: undamped pendulum energy stays within 5% over 10 s at 60 fps.
#[test]
fn pendulum_energy_is_conserved_at_small_dt() {
    let mut sim = PendulumSim::default();
    let initial = sim.normalized_energy();
    let mut worst: f64 = 0.0;
    for _ in 0..600 {
        sim.integrate(1.0 / 60.0);
        worst = worst.max(((sim.normalized_energy() - initial) / initial).abs());
    }
    assert!(worst < 0.05, "energy drift {worst}");
}

#[test]
fn damped_pendulum_loses_energy() {
    let mut sim = PendulumSim::new(PendulumConfig::explore());
    let initial = sim.normalized_energy();
    for _ in 0..600 {
        sim.integrate(1.0 / 60.0);
    }
    assert!(sim.normalized_energy() < 0.5 * initial);
}

#[test]
fn pendulum_period_readout_matches_small_angle_formula() {
    let sim = PendulumSim::default();
    let expected = 2.0 * std::f64::consts::PI * (1.5_f64 / 9.8).sqrt();
    assert!((sim.config().period() - expected).abs() < 1e-12);
    assert!((expected - 2.459).abs() < 1e-3);

    let readouts = sim.readouts();
    let period = readout::find(&readouts, "Period").expect("period readout");
    assert_eq!(period.display_value(), "2.46 s");
}

#[test]
fn projectile_metrics_for_lab_defaults() {
    let config = ProjectileConfig::default();
    assert!((config.range() - 255.1).abs() < 0.05);
    assert!((config.max_height() - 63.78).abs() < 0.01);
    assert!((config.flight_time() - 7.216).abs() < 0.001);
}

// Property: on level ground the closed-form flight time matches the
// frame-stepped landing within one frame.
#[test]
fn projectile_landing_matches_closed_form() {
    for policy in [FlightTimePolicy::Quadratic, FlightTimePolicy::LevelGround] {
        for angle_deg in [15.0, 30.0, 45.0, 60.0, 80.0] {
            let config = ProjectileConfig {
                angle_deg,
                flight_time_policy: policy,
                ..ProjectileConfig::default()
            };
            let expected = config.flight_time();
            let mut runner =
                HeadlessRunner::new(ProjectileSim::new(config), 60, &DriverConfig::default());
            let report = runner.run(10_000).expect("run");
            assert!(report.finished);
            assert!(
                (report.state.time - expected).abs() <= 1.0 / 60.0 + 1e-9,
                "angle {angle_deg}: landed at {} expected {expected}",
                report.state.time
            );
        }
    }
}

#[test]
fn landed_projectile_stops_scheduling() {
    let (mut driver, clock, scheduler) = driver(ProjectileSim::default());
    driver.start().expect("start");
    let mut frames = 0;
    while tick(&mut driver, &clock, &scheduler, 1.0 / 60.0) != FrameOutcome::Finished {
        frames += 1;
        assert!(frames < 1_000);
    }
    assert_eq!(driver.run_state(), RunState::Idle);
    assert!(scheduler.pop_due().is_none());
    let readouts = driver.readouts();
    assert_eq!(
        readout::find(&readouts, "Height").map(Readout::display_value),
        Some("0.0 m".to_string())
    );
}

// Property: phase strictly increases while running and is frozen while idle.
#[test]
fn wave_phase_monotonic_while_running_frozen_while_idle() {
    let (mut driver, clock, scheduler) = driver(WaveSim::default());
    driver.start().expect("start");
    let mut last = driver.sim().state().phase;
    for i in 0..120 {
        let dt = if i % 7 == 0 { 0.5 } else { 1.0 / 60.0 };
        tick(&mut driver, &clock, &scheduler, dt);
        let phase = driver.sim().state().phase;
        assert!(phase > last);
        last = phase;
    }

    driver.pause();
    clock.advance(10.0);
    assert!(scheduler.pop_due().is_none());
    assert_eq!(driver.sim().state().phase, last);
}

#[test]
fn wave_samples_stay_within_amplitude() {
    let surface = Surface::default();
    for wave_type in [WaveType::Sine, WaveType::Square] {
        for amplitude in [10.0, 50.0, 100.0] {
            let mut sim = WaveSim::new(WaveConfig {
                amplitude,
                wave_type,
                ..WaveConfig::default()
            });
            for _ in 0..50 {
                sim.integrate(0.013);
                for (_, y) in sim.samples(&surface) {
                    assert!((y - surface.center_y()).abs() <= amplitude + 1e-9);
                }
            }
        }
    }
}

#[test]
fn reset_twice_equals_reset_once() {
    let (mut driver, clock, scheduler) = driver(PendulumSim::default());
    driver.start().expect("start");
    for _ in 0..30 {
        tick(&mut driver, &clock, &scheduler, 1.0 / 60.0);
    }
    driver.reset();
    let once = driver.sim().snapshot();
    driver.reset();
    assert_eq!(driver.sim().snapshot(), once);
    assert_eq!(once, PendulumState::released(&PendulumConfig::default()));
}

// Property: a parameter set before a run reads back unchanged after it,
// and setters are refused while running.
#[test]
fn parameters_round_trip_and_lock_while_running() {
    let (mut driver, clock, scheduler) = driver(AnySimulation::default_for(SimulationKind::Wave));
    let tuned = driver
        .sim()
        .config()
        .with_param("frequency", 2.3)
        .expect("frequency slider");
    assert!(driver.set_config(tuned.clone()));

    driver.start().expect("start");
    let other = tuned.with_param("frequency", 4.0).expect("frequency slider");
    assert!(!driver.set_config(other));
    tick(&mut driver, &clock, &scheduler, 1.0 / 60.0);
    driver.pause();

    assert_eq!(driver.sim().config().param("frequency"), Some(2.3));
}

#[test]
fn stalled_frame_is_clamped() {
    let (mut driver, clock, scheduler) = driver(PendulumSim::default());
    driver.start().expect("start");
    let outcome = tick(&mut driver, &clock, &scheduler, 30.0);
    let FrameOutcome::Advanced(delta) = outcome else {
        panic!("expected an advanced frame, got {outcome:?}");
    };
    assert!(delta.was_clamped());
    assert!((delta.raw - 30.0).abs() < 1e-9);
    assert!(driver.sim().state().elapsed <= 1.0 / 30.0 + 1e-12);
}

#[test]
fn unclamped_policy_passes_stall_through() {
    let config = DriverConfig {
        delta_policy: DeltaPolicy::Unclamped,
        ..DriverConfig::default()
    };
    let clock = SharedClock::default();
    let scheduler = QueueScheduler::new();
    let mut driver =
        AnimationDriver::new(WaveSim::default(), clock.clone(), scheduler.clone(), &config);
    driver.start().expect("start");
    let outcome = tick(&mut driver, &clock, &scheduler, 2.0);
    assert!(matches!(outcome, FrameOutcome::Advanced(d) if !d.was_clamped()));
    assert!((driver.sim().state().elapsed - 2.0).abs() < 1e-9);
}

#[test]
fn non_finite_step_keeps_last_good_frame() {
    let poisoned = Poisoned {
        inner: PendulumSim::default(),
        poison_on: 3,
        steps: 0,
    };
    let (mut driver, clock, scheduler) = driver(poisoned);
    driver.start().expect("start");
    tick(&mut driver, &clock, &scheduler, 1.0 / 60.0);
    tick(&mut driver, &clock, &scheduler, 1.0 / 60.0);
    let good_state = driver.sim().snapshot();
    let good_frame = driver.frame().to_vec();

    let outcome = tick(&mut driver, &clock, &scheduler, 1.0 / 60.0);
    assert!(matches!(outcome, FrameOutcome::Frozen(_)));
    assert_eq!(driver.sim().snapshot(), good_state);
    assert_eq!(driver.frame(), good_frame.as_slice());

    // The loop keeps running and recovers on the next frame.
    assert!(driver.is_running());
    let outcome = tick(&mut driver, &clock, &scheduler, 1.0 / 60.0);
    assert!(matches!(outcome, FrameOutcome::Advanced(_)));
    assert!(driver.sim().snapshot().angular_velocity.is_finite());
}

#[test]
fn stale_callback_after_pause_is_ignored() {
    let (mut driver, clock, scheduler) = driver(WaveSim::default());
    driver.start().expect("start");
    let stale = scheduler.pop_due().expect("frame pending");
    driver.pause();
    clock.advance(1.0);
    assert_eq!(driver.on_frame(stale).expect("handled"), FrameOutcome::Ignored);
    assert_eq!(driver.sim().state().phase, 0.0);
}

#[test]
fn dropping_a_running_driver_cancels_its_frame() {
    let scheduler = QueueScheduler::new();
    {
        let mut driver = AnimationDriver::new(
            PendulumSim::default(),
            SharedClock::default(),
            scheduler.clone(),
            &DriverConfig::default(),
        );
        driver.start().expect("start");
        assert_eq!(scheduler.outstanding(), 1);
    }
    assert_eq!(scheduler.outstanding(), 0);
    assert_eq!(scheduler.cancelled(), 1);
}

#[test]
fn out_of_range_config_is_rejected() {
    let yaml = "pendulum:\n  length_cm: 5000\n  gravity: 9.8\n  initial_angle_deg: 45\n";
    assert!(LabConfig::from_yaml(yaml).is_err());

    let yaml = "wave:\n  amplitude: 50\n  frequency: 0\n  wave_type: sine\n";
    assert!(LabConfig::from_yaml(yaml).is_err());
}

#[test]
fn presets_drive_headless_runs() {
    for name in scinapse::config::PRESETS {
        let config = LabConfig::preset(name).expect("bundled preset");
        for kind in SimulationKind::ALL {
            let mut runner = HeadlessRunner::new(
                AnySimulation::from_config(config.sim_config(kind)),
                config.run.fps,
                &config.driver,
            );
            let report = runner.run(120).expect("run");
            assert_eq!(report.kind, kind);
            assert_eq!(report.stats.frozen_frames, 0);
        }
    }
}
