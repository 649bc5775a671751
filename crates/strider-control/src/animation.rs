//! Animation collaborator.
//!
//! The coordinator fires cues and never waits for them. The only thing it
//! reads back is [`AnimationController::is_sliding`], which decides whether a
//! jump broke an accelerator ride.

use serde::{Deserialize, Serialize};
use strider_sim::{KinematicState, Vec3};

/// Animation state machine driven by the coordinator.
pub trait AnimationController {
    fn play_running(&mut self);
    fn play_to_run(&mut self);
    fn play_stand(&mut self);
    fn play_jump(&mut self);
    fn play_roll(&mut self);
    fn play_hit_obstacle(&mut self);
    /// Play the drown animation at the water surface.
    fn play_drown(&mut self, position: Vec3);
    fn play_slide(&mut self);
    fn end_slide(&mut self);
    /// Whether the slide animation is currently playing.
    fn is_sliding(&self) -> bool;
    fn reset_animation(&mut self);
    fn restart_run_animation(&mut self);
    fn resume(&mut self);
    fn pause(&mut self);
    /// Push the latest physics state into animation parameters. Called after
    /// every fixed tick.
    fn sync_physics_parameters(&mut self, state: &KinematicState);
}

/// A single fired cue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnimationCue {
    Running,
    ToRun,
    Stand,
    Jump,
    Roll,
    HitObstacle,
    Drown { position: Vec3 },
    Slide,
    EndSlide,
    Reset,
    RestartRun,
    Resume,
    Pause,
}

/// An [`AnimationController`] that records cues instead of playing them.
///
/// Physics syncs are counted rather than logged since they arrive every
/// fixed tick.
#[derive(Debug, Clone, Default)]
pub struct CueRecorder {
    cues: Vec<AnimationCue>,
    sliding: bool,
    sync_count: u64,
    last_synced: Option<KinematicState>,
}

impl CueRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues fired so far, oldest first.
    pub fn cues(&self) -> &[AnimationCue] {
        &self.cues
    }

    /// Take the recorded cues, leaving the log empty.
    pub fn take_cues(&mut self) -> Vec<AnimationCue> {
        std::mem::take(&mut self.cues)
    }

    /// Override the sliding flag without recording a cue.
    pub fn set_sliding(&mut self, sliding: bool) {
        self.sliding = sliding;
    }

    /// Number of physics syncs received.
    pub fn sync_count(&self) -> u64 {
        self.sync_count
    }

    /// State passed to the most recent physics sync.
    pub fn last_synced(&self) -> Option<&KinematicState> {
        self.last_synced.as_ref()
    }
}

impl AnimationController for CueRecorder {
    fn play_running(&mut self) {
        self.cues.push(AnimationCue::Running);
    }

    fn play_to_run(&mut self) {
        self.cues.push(AnimationCue::ToRun);
    }

    fn play_stand(&mut self) {
        self.cues.push(AnimationCue::Stand);
    }

    fn play_jump(&mut self) {
        self.cues.push(AnimationCue::Jump);
    }

    fn play_roll(&mut self) {
        self.cues.push(AnimationCue::Roll);
    }

    fn play_hit_obstacle(&mut self) {
        self.cues.push(AnimationCue::HitObstacle);
    }

    fn play_drown(&mut self, position: Vec3) {
        self.cues.push(AnimationCue::Drown { position });
    }

    fn play_slide(&mut self) {
        self.sliding = true;
        self.cues.push(AnimationCue::Slide);
    }

    fn end_slide(&mut self) {
        self.sliding = false;
        self.cues.push(AnimationCue::EndSlide);
    }

    fn is_sliding(&self) -> bool {
        self.sliding
    }

    fn reset_animation(&mut self) {
        self.sliding = false;
        self.cues.push(AnimationCue::Reset);
    }

    fn restart_run_animation(&mut self) {
        self.cues.push(AnimationCue::RestartRun);
    }

    fn resume(&mut self) {
        self.cues.push(AnimationCue::Resume);
    }

    fn pause(&mut self) {
        self.cues.push(AnimationCue::Pause);
    }

    fn sync_physics_parameters(&mut self, state: &KinematicState) {
        self.sync_count += 1;
        self.last_synced = Some(*state);
    }
}
