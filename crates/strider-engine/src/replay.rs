//! Deterministic replay with event recording and checkpoint verification.
//!
//! A [`ReplayRecorder`] captures, for every frame, the frame `dt` and the
//! events queued for that frame, plus periodic state-hash checkpoints. The
//! resulting [`ReplayLog`] is JSON-serializable. [`replay`] restores the
//! initial snapshot onto a rig, re-emits each frame's events, advances by the
//! recorded `dt` and compares hashes at every checkpoint.
//!
//! # Recording
//!
//! ```
//! use strider_control::prelude::*;
//! use strider_engine::prelude::*;
//! use strider_sim::{ScriptedBackend, SimulationConfig, Vec3};
//!
//! # fn make_rig() -> RunnerRig<ScriptedBackend, CueRecorder, BreakableSet> {
//! #     let backend = ScriptedBackend::new(Vec3::ZERO).with_floor(0.0);
//! #     let coordinator = CoordinatorBuilder::new()
//! #         .simulate(SimulationConfig::default(), backend).unwrap()
//! #         .animation(CueRecorder::new())
//! #         .breakables(BreakableSet::new())
//! #         .switcher(Switchboard::new())
//! #         .build().unwrap();
//! #     RunnerRig::new(coordinator, TickConfig::default())
//! # }
//! let mut rig = make_rig();
//! let mut recorder = ReplayRecorder::new(rig.capture_snapshot(), 10);
//!
//! rig.emit(RunnerEvent::GameStart);
//! for frame in 0..60 {
//!     if frame == 30 {
//!         rig.press_jump();
//!     }
//!     recorder.record_frame(&rig, 1.0 / 60.0);
//!     rig.advance(1.0 / 60.0);
//! }
//! let log = recorder.finish();
//!
//! let mut fresh = make_rig();
//! let result = replay(&mut fresh, &log).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! assert_eq!(fresh.state_hash(), rig.state_hash());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strider_control::{AnimationController, BreakableRegistry, RunnerEvent};
use strider_sim::MotionBackend;
use tracing::{debug, warn};

use crate::rig::RunnerRig;
use crate::snapshot::RigSnapshot;

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// Initial snapshot plus the ordered per-frame inputs and checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Replay starts by restoring this snapshot.
    pub initial_snapshot: RigSnapshot,
    /// Number of frames recorded. Frames are numbered from 0.
    pub total_frames: u64,
    pub entries: Vec<ReplayEntry>,
}

/// One entry in a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// A frame's length and the events queued before it was advanced.
    Frame {
        frame: u64,
        dt: f32,
        events: Vec<RunnerEvent>,
    },
    /// State hash taken after the frame's events were queued, before the
    /// frame was advanced.
    Checkpoint { frame: u64, state_hash: String },
}

impl ReplayLog {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// ReplayResult
// ---------------------------------------------------------------------------

/// The outcome of [`replay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Whether every recorded frame was replayed without divergence.
    pub completed: bool,
    pub frames_replayed: u64,
    /// The first checkpoint whose hash did not match. `None` if all matched.
    pub first_divergence: Option<ReplayDivergence>,
}

/// A checkpoint where replayed state differed from the recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub frame: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// ReplayRecorder
// ---------------------------------------------------------------------------

/// Records a rig's frames into a [`ReplayLog`].
///
/// Call [`record_frame`](Self::record_frame) right before each
/// [`RunnerRig::advance`], after queuing that frame's events.
#[derive(Debug)]
pub struct ReplayRecorder {
    log: ReplayLog,
    /// Checkpoint every `checkpoint_interval` frames; 0 disables checkpoints.
    checkpoint_interval: u64,
}

impl ReplayRecorder {
    /// Start recording from `snapshot`.
    pub fn new(snapshot: RigSnapshot, checkpoint_interval: u64) -> Self {
        Self {
            log: ReplayLog {
                initial_snapshot: snapshot,
                total_frames: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
        }
    }

    /// Record the frame about to run: its `dt`, the rig's queued events and,
    /// on checkpoint frames, the state hash.
    pub fn record_frame<B, A, R>(&mut self, rig: &RunnerRig<B, A, R>, dt: f32)
    where
        B: MotionBackend,
        A: AnimationController,
        R: BreakableRegistry,
    {
        let frame = self.log.total_frames;

        self.log.entries.push(ReplayEntry::Frame {
            frame,
            dt,
            events: rig.bus().pending_events().copied().collect(),
        });

        if self.checkpoint_interval > 0 && frame % self.checkpoint_interval == 0 {
            self.log.entries.push(ReplayEntry::Checkpoint {
                frame,
                state_hash: rig.state_hash(),
            });
        }

        self.log.total_frames += 1;
    }

    /// Frames recorded so far.
    pub fn frames_recorded(&self) -> u64 {
        self.log.total_frames
    }

    /// Finish recording and return the log.
    pub fn finish(self) -> ReplayLog {
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Replay `log` on `rig`, verifying every checkpoint.
///
/// The log is validated before the rig is touched: every frame in
/// `0..total_frames` needs exactly one frame entry and at most one
/// checkpoint. Replay then restores the initial snapshot and, per frame,
/// queues the recorded events, checks the checkpoint and advances.
///
/// Replay stops at the first divergence and reports it.
///
/// # Errors
///
/// Returns an error if the log is malformed or the initial snapshot fails
/// verification. On error the rig is unmodified.
pub fn replay<B, A, R>(rig: &mut RunnerRig<B, A, R>, log: &ReplayLog) -> anyhow::Result<ReplayResult>
where
    B: MotionBackend,
    A: AnimationController,
    R: BreakableRegistry,
{
    let mut frames: BTreeMap<u64, (f32, &[RunnerEvent])> = BTreeMap::new();
    let mut checkpoints: BTreeMap<u64, &str> = BTreeMap::new();

    for entry in &log.entries {
        match entry {
            ReplayEntry::Frame { frame, dt, events } => {
                if *frame >= log.total_frames {
                    anyhow::bail!(
                        "replay log has frame entry {frame} beyond total_frames {}",
                        log.total_frames
                    );
                }
                if frames.insert(*frame, (*dt, events.as_slice())).is_some() {
                    anyhow::bail!("replay log contains duplicate frame entry {frame}");
                }
            }
            ReplayEntry::Checkpoint { frame, state_hash } => {
                if checkpoints.insert(*frame, state_hash.as_str()).is_some() {
                    anyhow::bail!("replay log contains duplicate checkpoint at frame {frame}");
                }
            }
        }
    }

    if frames.len() as u64 != log.total_frames {
        anyhow::bail!(
            "replay log has {} frame entries for {} frames",
            frames.len(),
            log.total_frames
        );
    }

    rig.restore_from_snapshot(&log.initial_snapshot)
        .map_err(|e| anyhow::anyhow!("failed to restore initial snapshot for replay: {e}"))?;

    // Frame entries carry every queued event, including any the snapshot held.
    rig.bus_mut().clear_pending();

    let mut frames_replayed = 0;
    for (&frame, &(dt, events)) in &frames {
        for event in events {
            rig.emit(*event);
        }

        if let Some(&expected) = checkpoints.get(&frame) {
            let actual = rig.state_hash();
            if actual != expected {
                warn!(frame, expected, actual = %actual, "replay diverged");
                return Ok(ReplayResult {
                    completed: false,
                    frames_replayed,
                    first_divergence: Some(ReplayDivergence {
                        frame,
                        expected_hash: expected.to_owned(),
                        actual_hash: actual,
                    }),
                });
            }
        }

        rig.advance(dt);
        frames_replayed += 1;
    }

    debug!(frames_replayed, "replay completed");
    Ok(ReplayResult {
        completed: true,
        frames_replayed,
        first_divergence: None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
