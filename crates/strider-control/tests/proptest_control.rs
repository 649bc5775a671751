//! Property tests for the coordinator.
//!
//! Random contact sequences check fragile deduplication; random event streams
//! check that a restart always lands the runner back on its start, running.

use proptest::prelude::*;
use strider_control::prelude::*;
use strider_sim::{ScriptedBackend, SimulationConfig, Vec3};

type TestCoordinator = Coordinator<ScriptedBackend, CueRecorder, BreakableSet, Switchboard>;

fn coordinator(breakable: impl IntoIterator<Item = u64>) -> TestCoordinator {
    let mut backend = ScriptedBackend::new(Vec3::new(1.0, 2.0, 0.0));
    backend.set_ground(true);
    let mut breakables = BreakableSet::new();
    for id in breakable {
        breakables.insert(ObjectId(id));
    }
    CoordinatorBuilder::new()
        .simulate(SimulationConfig::default(), backend)
        .unwrap()
        .animation(CueRecorder::new())
        .breakables(breakables)
        .switcher(Switchboard::new())
        .build()
        .unwrap()
}

fn event_strategy() -> impl Strategy<Value = RunnerEvent> {
    prop_oneof![
        Just(RunnerEvent::GameStart),
        Just(RunnerEvent::GameRestart),
        Just(RunnerEvent::GameOver),
        Just(RunnerEvent::GameResumed),
        Just(RunnerEvent::GamePaused),
        Just(RunnerEvent::PlayerHitObstacle),
        Just(RunnerEvent::PlayerDrowned {
            surface: Vec3::new(3.0, -1.0, 0.0)
        }),
        Just(RunnerEvent::ClickPlay),
        Just(RunnerEvent::ClickMenu),
        Just(RunnerEvent::JumpPressed),
        Just(RunnerEvent::RollPressed),
        (0..4u64, any::<bool>()).prop_map(|(id, accel)| RunnerEvent::ZoneEntered {
            zone: ZoneId(id),
            kind: if accel { ZoneKind::Accelerator } else { ZoneKind::Slime },
        }),
        (0..4u64, any::<bool>()).prop_map(|(id, accel)| RunnerEvent::ZoneExited {
            zone: ZoneId(id),
            kind: if accel { ZoneKind::Accelerator } else { ZoneKind::Slime },
        }),
        (0..4u64).prop_map(|id| RunnerEvent::FragileContact { object: ObjectId(id) }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1_000))]

    #[test]
    fn fragile_breaks_once_per_distinct_contact(contacts in prop::collection::vec(0..5u64, 0..60)) {
        let mut c = coordinator(0..5);

        let mut expected = Vec::new();
        let mut last = None;
        for &id in &contacts {
            if last != Some(id) {
                expected.push(ObjectId(id));
            }
            last = Some(id);
            c.hit_fragile(ObjectId(id));
        }

        prop_assert_eq!(c.breakables().broken(), expected.as_slice());
    }

    #[test]
    fn restart_after_any_history_lands_running_at_start(
        events in prop::collection::vec(event_strategy(), 0..40),
        frames in prop::collection::vec(1u32..50, 0..40),
    ) {
        let mut bus = EventBus::new();
        let mut c = coordinator(0..2);
        c.add_listeners(&mut bus);

        for (i, event) in events.iter().enumerate() {
            bus.emit(*event);
            bus.dispatch(&mut [&mut c]);
            c.switcher_mut().commit();
            if let Some(&ms) = frames.get(i) {
                let dt = ms as f32 / 1000.0;
                if c.is_enabled() {
                    c.frame_tick(dt);
                    c.fixed_tick(dt);
                }
            }
        }

        bus.emit(RunnerEvent::GameRestart);
        bus.dispatch(&mut [&mut c]);
        c.switcher_mut().commit();

        let start = c.simulation().state().start_position;
        prop_assert_eq!(c.simulation().position(), start);
        prop_assert_eq!(c.simulation().velocity().x, c.simulation().config().run_speed);
        prop_assert!(c.is_enabled());
        prop_assert!(c.input_enabled());
        prop_assert!(c.flags().running);
        prop_assert!(!c.broke_accelerator());
    }
}
