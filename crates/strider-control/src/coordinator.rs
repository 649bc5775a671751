//! The control coordinator: game-lifecycle state machine over the simulation.
//!
//! The [`Coordinator`] owns the [`Simulation`] and its three collaborators.
//! It reacts to [`RunnerEvent`]s by calling simulation actions, firing
//! animation cues and toggling subsystems, and forwards the scheduler's frame
//! and fixed ticks to the integrator.
//!
//! The coordinator does not gate its own ticks. Disabling
//! [`SubsystemId::PLAYER_LOGIC`] asks the scheduler to stop calling
//! [`frame_tick`](Coordinator::frame_tick) and
//! [`fixed_tick`](Coordinator::fixed_tick); events are still handled.

use serde::{Deserialize, Serialize};
use strider_sim::{MotionBackend, Simulation, SimulationConfig, Vec3};
use tracing::{debug, info, trace};

use crate::animation::AnimationController;
use crate::events::{EventBus, EventKind, EventListener, ListenerId, RunnerEvent};
use crate::fragile::{BreakableRegistry, ObjectId};
use crate::switcher::{SubsystemId, SubsystemSwitcher};
use crate::zones::{ZoneId, ZoneKind, ZoneTracker};
use crate::ControlError;

// ---------------------------------------------------------------------------
// RunFlags / ControlState
// ---------------------------------------------------------------------------

/// Informational game-phase flags. Several can be set at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFlags {
    /// A run is in progress and forward speed changes apply.
    pub running: bool,
    pub paused: bool,
    pub game_over: bool,
    pub drowned: bool,
    pub in_menu: bool,
}

/// Everything the coordinator remembers besides its collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub flags: RunFlags,
    /// Set when the player jumps off an accelerator mid-slide; blocks the
    /// accelerator from boosting again until every accelerator is left.
    pub broke_accelerator: bool,
    pub last_hit_fragile: Option<ObjectId>,
    pub zones: ZoneTracker,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assembles a [`Coordinator`], failing fast on a missing collaborator.
#[derive(Debug)]
pub struct CoordinatorBuilder<B, A, R, S> {
    simulation: Option<Simulation<B>>,
    animation: Option<A>,
    breakables: Option<R>,
    switcher: Option<S>,
}

impl<B, A, R, S> Default for CoordinatorBuilder<B, A, R, S> {
    fn default() -> Self {
        Self {
            simulation: None,
            animation: None,
            breakables: None,
            switcher: None,
        }
    }
}

impl<B, A, R, S> CoordinatorBuilder<B, A, R, S>
where
    B: MotionBackend,
    A: AnimationController,
    R: BreakableRegistry,
    S: SubsystemSwitcher,
{
    /// Start with no collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an already initialized simulation.
    pub fn simulation(mut self, simulation: Simulation<B>) -> Self {
        self.simulation = Some(simulation);
        self
    }

    /// Initialize a simulation from `config` over `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Sim`] if the configuration is invalid.
    pub fn simulate(self, config: SimulationConfig, backend: B) -> Result<Self, ControlError> {
        let simulation = Simulation::initialize(config, backend)?;
        Ok(self.simulation(simulation))
    }

    /// Set the animation controller that receives cues.
    pub fn animation(mut self, animation: A) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Set the registry consulted on fragile contact.
    pub fn breakables(mut self, breakables: R) -> Self {
        self.breakables = Some(breakables);
        self
    }

    /// Set the switcher that gates input and the coordinator's ticks.
    pub fn switcher(mut self, switcher: S) -> Self {
        self.switcher = Some(switcher);
        self
    }

    /// Build the coordinator and run its start-up step.
    ///
    /// Start-up disables input and the coordinator's own ticks and marks the
    /// game as sitting in the menu; `GameStart` brings them back.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::MissingCollaborator`] naming the first
    /// collaborator that was never supplied.
    pub fn build(self) -> Result<Coordinator<B, A, R, S>, ControlError> {
        fn missing(name: &'static str) -> ControlError {
            ControlError::MissingCollaborator { name }
        }

        let simulation = self.simulation.ok_or_else(|| missing("simulation"))?;
        let animation = self.animation.ok_or_else(|| missing("animation"))?;
        let breakables = self.breakables.ok_or_else(|| missing("breakables"))?;
        let mut switcher = self.switcher.ok_or_else(|| missing("switcher"))?;

        switcher.disable(SubsystemId::INPUT);
        switcher.disable(SubsystemId::PLAYER_LOGIC);

        let state = ControlState {
            flags: RunFlags {
                in_menu: true,
                ..Default::default()
            },
            ..Default::default()
        };

        debug!("coordinator built; input and player logic disabled until start");

        Ok(Coordinator {
            simulation,
            animation,
            breakables,
            switcher,
            listener: None,
            state,
        })
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Translates runner events into simulation actions and animation cues.
#[derive(Debug)]
pub struct Coordinator<B, A, R, S> {
    simulation: Simulation<B>,
    animation: A,
    breakables: R,
    switcher: S,
    listener: Option<ListenerId>,
    state: ControlState,
}

impl<B, A, R, S> Coordinator<B, A, R, S>
where
    B: MotionBackend,
    A: AnimationController,
    R: BreakableRegistry,
    S: SubsystemSwitcher,
{
    // -- bus registration ---------------------------------------------------

    /// Register with `bus` and subscribe to every kind this coordinator
    /// handles. Calling it again changes nothing.
    pub fn add_listeners(&mut self, bus: &mut EventBus) -> ListenerId {
        let id = *self.listener.get_or_insert_with(|| bus.register_listener());
        let added = EventKind::ALL
            .into_iter()
            .filter(|&kind| bus.subscribe(id, kind))
            .count();
        debug!(%id, added, "coordinator listeners added");
        id
    }

    /// Unsubscribe from every handled kind. Calling it again changes nothing.
    ///
    /// The listener id is kept, so adding the listeners back keeps the
    /// coordinator's place in delivery order.
    pub fn remove_listeners(&mut self, bus: &mut EventBus) {
        let Some(id) = self.listener else {
            return;
        };
        let removed = EventKind::ALL
            .into_iter()
            .filter(|&kind| bus.unsubscribe(id, kind))
            .count();
        debug!(%id, removed, "coordinator listeners removed");
    }

    // -- event handling -----------------------------------------------------

    /// Apply one event.
    pub fn handle(&mut self, event: &RunnerEvent) {
        trace!(?event, "handling event");
        match *event {
            RunnerEvent::GameStart => self.on_game_start(),
            RunnerEvent::GameRestart => self.on_game_restart(),
            RunnerEvent::GameOver => self.on_game_over(),
            RunnerEvent::GameResumed => self.on_game_resumed(),
            RunnerEvent::GamePaused => self.on_game_paused(),
            RunnerEvent::PlayerHitObstacle => self.on_player_hit_obstacle(),
            RunnerEvent::PlayerDrowned { surface } => self.on_player_drowned(surface),
            RunnerEvent::ClickPlay => self.on_click_play(),
            RunnerEvent::ClickMenu => self.on_click_menu(),
            RunnerEvent::JumpPressed => self.on_jump_pressed(),
            RunnerEvent::RollPressed => self.on_roll_pressed(),
            RunnerEvent::ZoneEntered { zone, kind } => self.enter_zone(zone, kind),
            RunnerEvent::ZoneExited { zone, kind } => self.exit_zone(zone, kind),
            RunnerEvent::FragileContact { object } => {
                self.hit_fragile(object);
            }
        }
    }

    fn on_game_start(&mut self) {
        info!("game started");
        self.resume();
        self.state.flags = RunFlags {
            running: true,
            ..Default::default()
        };
        self.simulation.run_forward();
        self.animation.play_running();
    }

    fn on_game_restart(&mut self) {
        info!("game restarted");
        self.resume();
        self.state.flags = RunFlags {
            running: true,
            ..Default::default()
        };
        self.simulation.move_to_start_position();
        self.simulation.run_forward();
        self.animation.reset_animation();
        self.animation.restart_run_animation();
        self.animation.play_running();

        self.state.broke_accelerator = false;
        self.state.zones.clear();
    }

    fn on_game_over(&mut self) {
        info!("game over");
        self.switcher.disable(SubsystemId::INPUT);
        self.state.flags.running = false;
        self.state.flags.game_over = true;
        self.animation.play_stand();
    }

    fn on_game_resumed(&mut self) {
        info!("game resumed");
        self.resume();
    }

    fn on_game_paused(&mut self) {
        info!("game paused");
        self.switcher.disable(SubsystemId::INPUT);
        self.switcher.disable(SubsystemId::PLAYER_LOGIC);
        self.state.flags.paused = true;
        self.animation.pause();
    }

    fn on_player_hit_obstacle(&mut self) {
        debug!("player hit obstacle");
        self.simulation.hit_by_obstacle();
        self.state.flags.running = false;
        self.animation.play_hit_obstacle();
    }

    fn on_player_drowned(&mut self, surface: Vec3) {
        info!(x = surface.x, y = surface.y, "player drowned");
        self.switcher.disable(SubsystemId::PLAYER_LOGIC);
        self.state.flags.running = false;
        self.state.flags.drowned = true;
        self.simulation.run_stop();
        self.animation.play_drown(surface);
    }

    fn on_click_play(&mut self) {
        debug!("play clicked");
        self.state.flags.in_menu = false;
        self.animation.play_to_run();
    }

    fn on_click_menu(&mut self) {
        info!("returned to menu");
        self.switcher.disable(SubsystemId::INPUT);
        self.switcher.disable(SubsystemId::PLAYER_LOGIC);
        self.state.flags = RunFlags {
            in_menu: true,
            ..Default::default()
        };
        self.animation.resume();
        self.animation.reset_animation();
        self.simulation.move_to_start_position();

        self.state.broke_accelerator = false;
        self.state.zones.clear();
    }

    fn on_jump_pressed(&mut self) {
        debug!(grounded = self.simulation.is_grounded(), "jump pressed");
        self.simulation.jump();
        if self.animation.is_sliding() {
            debug!("jump broke accelerator slide");
            self.state.broke_accelerator = true;
        }
        self.animation.end_slide();
        self.animation.play_jump();
    }

    fn on_roll_pressed(&mut self) {
        debug!(grounded = self.simulation.is_grounded(), "roll pressed");
        self.simulation.roll();
        self.animation.play_roll();
    }

    /// Enable input and the coordinator's ticks, and resume animation.
    fn resume(&mut self) {
        self.switcher.enable(SubsystemId::INPUT);
        self.switcher.enable(SubsystemId::PLAYER_LOGIC);
        self.state.flags.paused = false;
        self.animation.resume();
    }

    // -- fragile objects ----------------------------------------------------

    /// Break `object` on contact, once per distinct contact.
    ///
    /// Touching the same object as last time does nothing. Returns whether
    /// the registry broke something.
    pub fn hit_fragile(&mut self, object: ObjectId) -> bool {
        if self.state.last_hit_fragile == Some(object) {
            return false;
        }
        self.state.last_hit_fragile = Some(object);
        self.breakables.break_on_contact(object)
    }

    // -- zones --------------------------------------------------------------

    /// The character started overlapping `zone`.
    pub fn enter_zone(&mut self, zone: ZoneId, kind: ZoneKind) {
        if !self.state.zones.enter(zone, kind) {
            return;
        }
        debug!(zone = zone.0, ?kind, "zone entered");

        self.state.zones.cancel_slime_restore();
        let running = self.state.flags.running;
        match kind {
            ZoneKind::Accelerator => {
                if running && !self.state.broke_accelerator {
                    self.simulation.run_on_accelerator();
                    self.animation.play_slide();
                }
            }
            ZoneKind::Slime => {
                if running {
                    self.simulation.run_on_slime();
                }
            }
        }
    }

    /// The character stopped overlapping `zone`.
    pub fn exit_zone(&mut self, zone: ZoneId, kind: ZoneKind) {
        if !self.state.zones.exit(zone, kind) {
            return;
        }
        debug!(zone = zone.0, ?kind, "zone exited");

        match kind {
            ZoneKind::Accelerator => {
                if self.state.zones.in_accelerator() {
                    return;
                }
                self.state.broke_accelerator = false;
                self.animation.end_slide();
                if self.state.flags.running {
                    if self.state.zones.in_slime() {
                        self.simulation.run_on_slime();
                    } else {
                        self.simulation.run_forward();
                    }
                }
            }
            ZoneKind::Slime => {
                if !self.state.zones.in_slime() {
                    self.state.zones.arm_slime_restore();
                }
            }
        }
    }

    fn restore_speed_after_slime(&mut self) {
        if !self.state.flags.running {
            return;
        }
        if self.state.zones.in_accelerator() && !self.state.broke_accelerator {
            self.simulation.run_on_accelerator();
        } else {
            self.simulation.run_forward();
        }
        debug!(speed = self.simulation.velocity().x, "run speed restored after slime");
    }

    // -- ticks --------------------------------------------------------------

    /// Variable-rate tick: translation, pre-jump buffer, slime restore lag.
    pub fn frame_tick(&mut self, dt: f32) {
        self.simulation.integrate_horizontal(dt);
        self.simulation.advance_pre_jump(dt);
        if self.state.zones.advance_slime_restore(dt) {
            self.restore_speed_after_slime();
        }
    }

    /// Fixed-rate tick: physics integration and animation parameter sync.
    pub fn fixed_tick(&mut self, dt: f32) {
        self.simulation.integrate_physics(dt);
        self.animation
            .sync_physics_parameters(self.simulation.state());
    }

    // -- state --------------------------------------------------------------

    /// Whether the scheduler should run this coordinator's ticks.
    pub fn is_enabled(&self) -> bool {
        self.switcher.is_enabled(SubsystemId::PLAYER_LOGIC)
    }

    /// Whether input should be polled.
    pub fn input_enabled(&self) -> bool {
        self.switcher.is_enabled(SubsystemId::INPUT)
    }

    /// Informational lifecycle flags.
    pub fn flags(&self) -> RunFlags {
        self.state.flags
    }

    /// Whether a jump broke the current accelerator slide.
    pub fn broke_accelerator(&self) -> bool {
        self.state.broke_accelerator
    }

    /// The fragile object touched most recently, if any.
    pub fn last_hit_fragile(&self) -> Option<ObjectId> {
        self.state.last_hit_fragile
    }

    /// Accelerator and slime zones currently overlapped.
    pub fn zones(&self) -> &ZoneTracker {
        &self.state.zones
    }

    /// The id handed out by [`add_listeners`](Self::add_listeners), if any.
    pub fn listener(&self) -> Option<ListenerId> {
        self.listener
    }

    /// Capture the coordinator's own state for a snapshot.
    pub fn control_state(&self) -> ControlState {
        self.state.clone()
    }

    /// Reinstate state captured by [`control_state`](Self::control_state).
    pub fn restore_control_state(&mut self, state: ControlState) {
        self.state = state;
    }

    // -- collaborators ------------------------------------------------------

    /// The simulation this coordinator drives.
    pub fn simulation(&self) -> &Simulation<B> {
        &self.simulation
    }

    /// Mutable access to the simulation, for level setup and snapshots.
    pub fn simulation_mut(&mut self) -> &mut Simulation<B> {
        &mut self.simulation
    }

    /// The animation controller.
    pub fn animation(&self) -> &A {
        &self.animation
    }

    /// Mutable access to the animation controller.
    pub fn animation_mut(&mut self) -> &mut A {
        &mut self.animation
    }

    /// The breakable registry.
    pub fn breakables(&self) -> &R {
        &self.breakables
    }

    /// Mutable access to the breakable registry.
    pub fn breakables_mut(&mut self) -> &mut R {
        &mut self.breakables
    }

    /// The subsystem switcher.
    pub fn switcher(&self) -> &S {
        &self.switcher
    }

    /// Mutable access to the switcher; the scheduler commits through this.
    pub fn switcher_mut(&mut self) -> &mut S {
        &mut self.switcher
    }
}

impl<B, A, R, S> EventListener for Coordinator<B, A, R, S>
where
    B: MotionBackend,
    A: AnimationController,
    R: BreakableRegistry,
    S: SubsystemSwitcher,
{
    fn listener_id(&self) -> Option<ListenerId> {
        self.listener
    }

    fn handle_event(&mut self, event: &RunnerEvent) {
        self.handle(event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
