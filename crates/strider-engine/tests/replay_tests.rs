//! Integration tests for snapshots and deterministic replay.
//!
//! Recording runs against a rapier2d level; replays run on freshly built rigs
//! with the same level, so any hidden state outside the snapshot shows up as
//! a divergence.

use proptest::prelude::*;
use strider_control::prelude::*;
use strider_engine::prelude::*;
use strider_sim::prelude::*;

const FRAME: f32 = 1.0 / 60.0;

fn level() -> RapierBackend {
    let mut backend = RapierBackend::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.125, 0.4, 0.0));
    backend.add_platform(Vec3::new(20.0, -0.5, 0.0), Vec3::new(25.0, 0.5, 0.0));
    backend.add_platform(Vec3::new(52.0, 1.0, 0.0), Vec3::new(5.0, 0.5, 0.0));
    backend
}

fn rapier_rig() -> RunnerRig<RapierBackend, CueRecorder, BreakableSet> {
    let coordinator = CoordinatorBuilder::new()
        .simulate(SimulationConfig::default(), level())
        .unwrap()
        .animation(CueRecorder::new())
        .breakables(BreakableSet::new())
        .switcher(Switchboard::new())
        .build()
        .unwrap();
    RunnerRig::new(coordinator, TickConfig::default())
}

fn scripted_rig() -> RunnerRig<ScriptedBackend, CueRecorder, BreakableSet> {
    let backend = ScriptedBackend::new(Vec3::new(0.0, 0.5, 0.0)).with_floor(0.0);
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

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[test]
fn restored_rig_continues_identically() {
    let mut rig = rapier_rig();
    rig.emit(RunnerEvent::GameStart);
    rig.run_frames(45, FRAME);
    rig.press_jump();
    let snapshot = rig.capture_snapshot();

    rig.run_frames(60, FRAME);
    let expected = rig.state_hash();
    let expected_position = rig.coordinator().simulation().position();

    rig.restore_from_snapshot(&snapshot).unwrap();
    rig.run_frames(60, FRAME);
    assert_eq!(rig.state_hash(), expected);
    assert_eq!(rig.coordinator().simulation().position(), expected_position);
}

#[test]
fn snapshot_moves_between_rigs() {
    let mut source = rapier_rig();
    source.emit(RunnerEvent::GameStart);
    source.run_frames(30, FRAME);
    let json = source.capture_snapshot().to_json().unwrap();

    let mut target = rapier_rig();
    target
        .restore_from_snapshot(&RigSnapshot::from_json(&json).unwrap())
        .unwrap();
    assert_eq!(target.state_hash(), source.state_hash());

    source.run_frames(30, FRAME);
    target.run_frames(30, FRAME);
    assert_eq!(target.state_hash(), source.state_hash());
}

#[test]
fn restart_resets_to_the_same_state_from_any_point() {
    let mut early = rapier_rig();
    let mut late = rapier_rig();
    for rig in [&mut early, &mut late] {
        rig.emit(RunnerEvent::GameStart);
    }
    early.run_frames(20, FRAME);
    late.run_frames(20, FRAME);
    late.press_jump();
    late.run_frames(50, FRAME);

    for rig in [&mut early, &mut late] {
        rig.emit(RunnerEvent::GameRestart);
        rig.advance(FRAME);
    }

    let a = early.coordinator().simulation();
    let b = late.coordinator().simulation();
    assert_eq!(a.position(), b.position());
    assert_eq!(a.velocity(), b.velocity());
    assert_eq!(a.is_grounded(), b.is_grounded());
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

#[test]
fn rapier_session_replays_without_divergence() {
    let mut rig = rapier_rig();
    let mut recorder = ReplayRecorder::new(rig.capture_snapshot(), 15);
    rig.emit(RunnerEvent::GameStart);

    for frame in 0..240u32 {
        match frame {
            60 | 150 => {
                rig.press_jump();
            }
            100 => rig.emit(RunnerEvent::ZoneEntered {
                zone: ZoneId(3),
                kind: ZoneKind::Slime,
            }),
            120 => rig.emit(RunnerEvent::ZoneExited {
                zone: ZoneId(3),
                kind: ZoneKind::Slime,
            }),
            200 => {
                rig.press_roll();
            }
            _ => {}
        }
        recorder.record_frame(&rig, FRAME);
        rig.advance(FRAME);
    }
    let log = recorder.finish();
    let expected = rig.state_hash();

    let mut fresh = rapier_rig();
    let result = replay(&mut fresh, &log).unwrap();
    assert!(result.completed, "diverged: {:?}", result.first_divergence);
    assert_eq!(result.frames_replayed, 240);
    assert_eq!(fresh.state_hash(), expected);
}

#[test]
fn tampered_checkpoint_reports_first_divergence() {
    let mut rig = rapier_rig();
    let mut recorder = ReplayRecorder::new(rig.capture_snapshot(), 10);
    rig.emit(RunnerEvent::GameStart);
    for _ in 0..50 {
        recorder.record_frame(&rig, FRAME);
        rig.advance(FRAME);
    }
    let mut log = recorder.finish();

    for entry in &mut log.entries {
        if let ReplayEntry::Checkpoint { frame: 30, state_hash } = entry {
            *state_hash = "0".repeat(64);
        }
    }

    let result = replay(&mut rapier_rig(), &log).unwrap();
    assert!(!result.completed);
    assert_eq!(result.frames_replayed, 30);
    let divergence = result.first_divergence.unwrap();
    assert_eq!(divergence.frame, 30);
    assert_eq!(divergence.expected_hash, "0".repeat(64));
}

#[test]
fn variable_frame_lengths_replay_exactly() {
    let mut rig = scripted_rig();
    let mut recorder = ReplayRecorder::new(rig.capture_snapshot(), 1);
    rig.emit(RunnerEvent::GameStart);
    let lengths = [1.0 / 30.0, 1.0 / 144.0, 0.05, 0.2, 1.0 / 60.0];
    for i in 0..100 {
        if i == 50 {
            rig.press_jump();
        }
        let dt = lengths[i % lengths.len()];
        recorder.record_frame(&rig, dt);
        rig.advance(dt);
    }
    let log = recorder.finish();
    assert!(rig.clock().dropped_steps() > 0);

    let mut fresh = scripted_rig();
    assert!(replay(&mut fresh, &log).unwrap().completed);
    assert_eq!(fresh.state_hash(), rig.state_hash());
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

fn event_strategy() -> impl Strategy<Value = Option<RunnerEvent>> {
    prop_oneof![
        3 => Just(None),
        1 => Just(Some(RunnerEvent::GameStart)),
        1 => Just(Some(RunnerEvent::GameRestart)),
        1 => Just(Some(RunnerEvent::GamePaused)),
        1 => Just(Some(RunnerEvent::GameResumed)),
        1 => Just(Some(RunnerEvent::GameOver)),
        1 => Just(Some(RunnerEvent::PlayerHitObstacle)),
        1 => Just(Some(RunnerEvent::JumpPressed)),
        1 => Just(Some(RunnerEvent::RollPressed)),
        1 => Just(Some(RunnerEvent::ClickMenu)),
        1 => (1u64..3).prop_map(|z| Some(RunnerEvent::ZoneEntered {
            zone: ZoneId(z),
            kind: if z == 1 { ZoneKind::Accelerator } else { ZoneKind::Slime },
        })),
        1 => (1u64..3).prop_map(|z| Some(RunnerEvent::ZoneExited {
            zone: ZoneId(z),
            kind: if z == 1 { ZoneKind::Accelerator } else { ZoneKind::Slime },
        })),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_event_script_replays(script in prop::collection::vec((event_strategy(), 1u32..8), 1..40)) {
        let mut rig = scripted_rig();
        let mut recorder = ReplayRecorder::new(rig.capture_snapshot(), 4);

        for (event, frames) in &script {
            if let Some(event) = event {
                rig.emit(*event);
            }
            for _ in 0..*frames {
                recorder.record_frame(&rig, FRAME);
                rig.advance(FRAME);
            }
        }
        let log = recorder.finish();

        let mut fresh = scripted_rig();
        let result = replay(&mut fresh, &log).unwrap();
        prop_assert!(result.completed);
        prop_assert_eq!(fresh.state_hash(), rig.state_hash());
    }
}
