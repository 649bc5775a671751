//! Headless run -- a scripted session over a small rapier2d level.
//!
//! Run with:
//!   cargo run --example headless_run -p strider-engine [-- path/to/config.json]
//!
//! Set `RUST_LOG=strider_control=info,strider_sim=debug` to follow the
//! coordinator and the simulation.

use strider_control::prelude::*;
use strider_engine::prelude::*;
use strider_sim::{SimulationConfig, Vec3};

const FRAME: f32 = 1.0 / 60.0;

// ---------------------------------------------------------------------------
// Level setup
// ---------------------------------------------------------------------------

/// Ground, a gap, and a raised platform, plus an accelerator pad trigger.
fn build_level() -> RapierBackend {
    let mut backend = RapierBackend::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.125, 0.4, 0.0));
    backend.add_platform(Vec3::new(10.0, -0.5, 0.0), Vec3::new(12.0, 0.5, 0.0));
    backend.add_platform(Vec3::new(35.0, -0.3, 0.0), Vec3::new(10.0, 0.5, 0.0));
    backend.add_trigger(Vec3::new(12.0, 0.5, 0.0), Vec3::new(2.0, 0.5, 0.0));
    backend
}

fn load_config() -> anyhow::Result<SimulationConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            Ok(SimulationConfig::from_json(&json)?)
        }
        None => Ok(SimulationConfig::default()),
    }
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let coordinator = CoordinatorBuilder::new()
        .simulate(load_config()?, build_level())?
        .animation(CueRecorder::new())
        .breakables(BreakableSet::new())
        .switcher(Switchboard::new())
        .build()?;
    let mut rig = RunnerRig::new(coordinator, TickConfig::default());
    let mut recorder = ReplayRecorder::new(rig.capture_snapshot(), 30);

    rig.emit(RunnerEvent::ClickPlay);
    rig.emit(RunnerEvent::GameStart);

    let pad = ZoneId(1);
    let mut on_pad = false;
    for frame in 0..600u32 {
        let x = rig.coordinator().simulation().position().x;

        // The host owns trigger overlap; the rig only hears about it.
        let over_pad = (10.0..14.0).contains(&x);
        if over_pad != on_pad {
            on_pad = over_pad;
            rig.emit(if over_pad {
                RunnerEvent::ZoneEntered { zone: pad, kind: ZoneKind::Accelerator }
            } else {
                RunnerEvent::ZoneExited { zone: pad, kind: ZoneKind::Accelerator }
            });
        }

        if x > 20.0 && rig.coordinator().simulation().is_grounded() {
            rig.press_jump();
        }

        recorder.record_frame(&rig, FRAME);
        let report = rig.advance(FRAME);

        if frame % 60 == 0 {
            let sim = rig.coordinator().simulation();
            println!(
                "frame {frame:4}  x = {:7.3}  y = {:6.3}  vy = {:6.2}  grounded = {:5}  steps = {}",
                sim.position().x,
                sim.position().y,
                sim.velocity_y(),
                sim.is_grounded(),
                report.fixed_steps,
            );
        }

        if rig.coordinator().simulation().position().y < -10.0 {
            println!("fell out of the level at frame {frame}");
            rig.emit(RunnerEvent::GameOver);
            recorder.record_frame(&rig, FRAME);
            rig.advance(FRAME);
            break;
        }
    }

    let log = recorder.finish();
    let expected = rig.state_hash();
    println!(
        "recorded {} frames, {} cues, final hash {}",
        log.total_frames,
        rig.coordinator().animation().cues().len(),
        &expected[..16]
    );

    let mut fresh = RunnerRig::new(
        CoordinatorBuilder::new()
            .simulate(load_config()?, build_level())?
            .animation(CueRecorder::new())
            .breakables(BreakableSet::new())
            .switcher(Switchboard::new())
            .build()?,
        TickConfig::default(),
    );
    let result = replay(&mut fresh, &log)?;
    match result.first_divergence {
        None => println!(
            "replay matched over {} frames (hash {})",
            result.frames_replayed,
            &fresh.state_hash()[..16]
        ),
        Some(divergence) => println!(
            "replay diverged at frame {}: expected {} got {}",
            divergence.frame, divergence.expected_hash, divergence.actual_hash
        ),
    }

    Ok(())
}
