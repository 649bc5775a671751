//! Runner behaviour against a rapier2d collision world.
//!
//! The level is a single long platform with its top surface at `y = 0`,
//! spanning `x` in `[-5, 45]`, plus a short ledge ending at `x = 5` for the
//! edge-slide checks.

use strider_control::prelude::*;
use strider_engine::prelude::*;
use strider_sim::prelude::*;

const FRAME: f32 = 1.0 / 60.0;
const CHARACTER: Vec3 = Vec3::new(0.125, 0.4, 0.0);

fn long_platform(position: Vec3) -> RapierBackend {
    let mut backend = RapierBackend::new(position, CHARACTER);
    backend.add_platform(Vec3::new(20.0, -0.5, 0.0), Vec3::new(25.0, 0.5, 0.0));
    backend
}

fn rig(backend: RapierBackend) -> RunnerRig<RapierBackend, CueRecorder, BreakableSet> {
    let coordinator = CoordinatorBuilder::new()
        .simulate(SimulationConfig::default(), backend)
        .unwrap()
        .animation(CueRecorder::new())
        .breakables(BreakableSet::new())
        .switcher(Switchboard::new())
        .build()
        .unwrap();
    RunnerRig::new(coordinator, TickConfig::default())
}

#[test]
fn falling_runner_lands_and_runs() {
    let mut rig = rig(long_platform(Vec3::new(0.0, 0.5, 0.0)));
    rig.emit(RunnerEvent::GameStart);

    let mut landing_velocity = None;
    for _ in 0..60 {
        rig.advance(FRAME);
        let sim = rig.coordinator().simulation();
        if sim.is_grounded() && landing_velocity.is_none() {
            landing_velocity = Some(sim.velocity_y_before_grounded());
        }
    }

    let landing_velocity = landing_velocity.expect("runner should land within a second");
    assert!(landing_velocity < RESTING_VELOCITY);

    let sim = rig.coordinator().simulation();
    assert!(sim.is_grounded());
    assert_eq!(sim.velocity_y(), RESTING_VELOCITY);
    assert!(sim.position().y >= 0.0 && sim.position().y < 0.05);
    assert!(sim.position().x > 2.0, "runner should have run forward, x = {}", sim.position().x);
}

#[test]
fn jump_clears_the_ground_and_comes_back() {
    let mut rig = rig(long_platform(Vec3::new(0.0, 0.02, 0.0)));
    rig.emit(RunnerEvent::GameStart);
    rig.run_frames(30, FRAME);
    assert!(rig.coordinator().simulation().is_grounded());

    assert!(rig.press_jump());
    rig.run_frames(10, FRAME);
    let sim = rig.coordinator().simulation();
    assert!(!sim.is_grounded());
    assert!(sim.position().y > 0.3, "y = {}", sim.position().y);

    rig.run_frames(120, FRAME);
    let sim = rig.coordinator().simulation();
    assert!(sim.is_grounded());
    assert!(sim.position().y < 0.05);
}

#[test]
fn runner_slides_off_a_ledge_it_overhangs() {
    let mut backend = RapierBackend::new(Vec3::new(5.15, 0.0, 0.0), CHARACTER);
    backend.add_platform(Vec3::new(0.0, -0.5, 0.0), Vec3::new(5.0, 0.5, 0.0));
    let mut sim = Simulation::initialize(SimulationConfig::default(), backend).unwrap();

    sim.integrate_physics(FRAME);

    assert!(!sim.is_grounded());
    let expected = 5.15 + SimulationConfig::default().edge_slide_speed * FRAME;
    assert!((sim.position().x - expected).abs() < 1e-5);
}

#[test]
fn triggers_do_not_hold_the_runner_up() {
    let mut backend = long_platform(Vec3::new(0.0, 2.0, 0.0));
    backend.add_trigger(Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 0.5, 0.0));
    let mut rig = rig(backend);
    rig.emit(RunnerEvent::GameStart);
    rig.run_frames(90, FRAME);

    let sim = rig.coordinator().simulation();
    assert!(sim.is_grounded());
    assert!(sim.position().y < 0.05);
}

#[test]
fn zone_events_change_run_speed() {
    let config = SimulationConfig::default();
    let mut rig = rig(long_platform(Vec3::new(0.0, 0.02, 0.0)));
    rig.emit(RunnerEvent::GameStart);
    rig.advance(FRAME);
    assert_eq!(rig.coordinator().simulation().velocity().x, config.run_speed);

    let pad = ZoneId(1);
    rig.emit(RunnerEvent::ZoneEntered { zone: pad, kind: ZoneKind::Accelerator });
    rig.advance(FRAME);
    assert_eq!(rig.coordinator().simulation().velocity().x, config.run_speed_fast);

    rig.emit(RunnerEvent::ZoneExited { zone: pad, kind: ZoneKind::Accelerator });
    rig.advance(FRAME);
    assert_eq!(rig.coordinator().simulation().velocity().x, config.run_speed);
}

#[test]
fn restart_returns_to_start_through_geometry() {
    let start = Vec3::new(0.0, 0.02, 0.0);
    let mut rig = rig(long_platform(start));
    rig.emit(RunnerEvent::GameStart);
    rig.run_frames(120, FRAME);
    assert!(rig.coordinator().simulation().position().x > 5.0);

    rig.emit(RunnerEvent::PlayerHitObstacle);
    rig.run_frames(5, FRAME);
    rig.emit(RunnerEvent::GameRestart);
    rig.advance(FRAME);

    let sim = rig.coordinator().simulation();
    assert!(sim.backend().translation_enabled());
    assert!(sim.position().x < 0.2, "x = {}", sim.position().x);
    assert!(rig.coordinator().flags().running);
}

#[test]
fn buffered_jump_lifts_the_runner_after_landing() {
    let mut rig = rig(long_platform(Vec3::new(0.0, 0.15, 0.0)));
    rig.emit(RunnerEvent::GameStart);
    rig.advance(FRAME);
    assert!(!rig.coordinator().simulation().is_grounded());

    assert!(rig.press_jump());
    rig.advance(FRAME);
    assert!(rig.coordinator().simulation().pre_jump().is_pending());

    let mut landed = false;
    let mut peak_after_landing: f32 = 0.0;
    for _ in 0..120 {
        rig.advance(FRAME);
        let sim = rig.coordinator().simulation();
        landed |= sim.is_grounded();
        if landed {
            peak_after_landing = peak_after_landing.max(sim.position().y);
        }
    }

    assert!(landed);
    assert!(!rig.coordinator().simulation().pre_jump().is_pending());
    assert!(peak_after_landing > 0.3, "peak after landing = {peak_after_landing}");
}

#[test]
fn ground_jump_survives_fast_frames() {
    const FAST_FRAME: f32 = 1.0 / 240.0;

    // Cover every phase of the frame against the 60 Hz fixed step.
    for phase in 0..4 {
        let mut rig = rig(long_platform(Vec3::new(0.0, 0.02, 0.0)));
        rig.emit(RunnerEvent::GameStart);
        rig.run_frames(120 + phase, FAST_FRAME);
        assert!(rig.coordinator().simulation().is_grounded());

        assert!(rig.press_jump());
        let mut peak: f32 = 0.0;
        for _ in 0..240 {
            rig.advance(FAST_FRAME);
            peak = peak.max(rig.coordinator().simulation().position().y);
        }
        assert!(peak > 0.3, "phase {phase}: jump peaked at {peak}");
    }
}
