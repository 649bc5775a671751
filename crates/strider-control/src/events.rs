//! Typed runner events and the bus that delivers them.
//!
//! The bus is owned by whoever composes the game (see `strider-engine`'s
//! `RunnerRig`); there is no global dispatcher. Listeners register once to get
//! a [`ListenerId`], subscribe to the [`EventKind`]s they handle, and receive
//! events when the owner calls [`EventBus::dispatch`].
//!
//! Delivery is synchronous and deterministic:
//!
//! - events are delivered in emission order (FIFO);
//! - each event goes to its subscribers in listener registration order;
//! - the bus is mutably borrowed for the whole dispatch, so a handler cannot
//!   emit or re-enter it.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};
use strider_sim::Vec3;
use tracing::trace;

use crate::fragile::ObjectId;
use crate::zones::{ZoneId, ZoneKind};

// ---------------------------------------------------------------------------
// RunnerEvent
// ---------------------------------------------------------------------------

/// Everything the control layer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RunnerEvent {
    // -- game lifecycle --
    GameStart,
    GameRestart,
    GameOver,
    GameResumed,
    GamePaused,
    PlayerHitObstacle,
    /// The player fell into water; `surface` is where the drown animation
    /// should play.
    PlayerDrowned { surface: Vec3 },

    // -- menu --
    ClickPlay,
    ClickMenu,

    // -- input --
    JumpPressed,
    RollPressed,

    // -- collisions --
    ZoneEntered { zone: ZoneId, kind: ZoneKind },
    ZoneExited { zone: ZoneId, kind: ZoneKind },
    FragileContact { object: ObjectId },
}

impl RunnerEvent {
    /// The payload-free discriminant used for subscriptions.
    pub fn kind(&self) -> EventKind {
        match self {
            RunnerEvent::GameStart => EventKind::GameStart,
            RunnerEvent::GameRestart => EventKind::GameRestart,
            RunnerEvent::GameOver => EventKind::GameOver,
            RunnerEvent::GameResumed => EventKind::GameResumed,
            RunnerEvent::GamePaused => EventKind::GamePaused,
            RunnerEvent::PlayerHitObstacle => EventKind::PlayerHitObstacle,
            RunnerEvent::PlayerDrowned { .. } => EventKind::PlayerDrowned,
            RunnerEvent::ClickPlay => EventKind::ClickPlay,
            RunnerEvent::ClickMenu => EventKind::ClickMenu,
            RunnerEvent::JumpPressed => EventKind::JumpPressed,
            RunnerEvent::RollPressed => EventKind::RollPressed,
            RunnerEvent::ZoneEntered { .. } => EventKind::ZoneEntered,
            RunnerEvent::ZoneExited { .. } => EventKind::ZoneExited,
            RunnerEvent::FragileContact { .. } => EventKind::FragileContact,
        }
    }
}

/// Discriminant of a [`RunnerEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    GameStart,
    GameRestart,
    GameOver,
    GameResumed,
    GamePaused,
    PlayerHitObstacle,
    PlayerDrowned,
    ClickPlay,
    ClickMenu,
    JumpPressed,
    RollPressed,
    ZoneEntered,
    ZoneExited,
    FragileContact,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 14] = [
        EventKind::GameStart,
        EventKind::GameRestart,
        EventKind::GameOver,
        EventKind::GameResumed,
        EventKind::GamePaused,
        EventKind::PlayerHitObstacle,
        EventKind::PlayerDrowned,
        EventKind::ClickPlay,
        EventKind::ClickMenu,
        EventKind::JumpPressed,
        EventKind::RollPressed,
        EventKind::ZoneEntered,
        EventKind::ZoneExited,
        EventKind::FragileContact,
    ];
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// Identity handed out by [`EventBus::register_listener`].
///
/// Ids are allocated in increasing order, so comparing ids compares
/// registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Something that can receive events from an [`EventBus`].
pub trait EventListener {
    /// The id this listener registered under, or `None` if it never
    /// registered (it then receives nothing).
    fn listener_id(&self) -> Option<ListenerId>;

    /// Handle one delivered event.
    fn handle_event(&mut self, event: &RunnerEvent);
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// FIFO event queue with per-kind subscriptions.
#[derive(Debug, Default)]
pub struct EventBus {
    next_listener: u32,
    /// Subscribers per kind, kept sorted by id (registration order).
    subscriptions: BTreeMap<EventKind, Vec<ListenerId>>,
    queue: VecDeque<RunnerEvent>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new listener identity.
    pub fn register_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        id
    }

    /// Subscribe `listener` to `kind`.
    ///
    /// Returns `false` (and changes nothing) if it was already subscribed.
    pub fn subscribe(&mut self, listener: ListenerId, kind: EventKind) -> bool {
        let subscribers = self.subscriptions.entry(kind).or_default();
        match subscribers.binary_search(&listener) {
            Ok(_) => false,
            Err(index) => {
                subscribers.insert(index, listener);
                true
            }
        }
    }

    /// Unsubscribe `listener` from `kind`.
    ///
    /// Returns `false` (and changes nothing) if it was not subscribed.
    pub fn unsubscribe(&mut self, listener: ListenerId, kind: EventKind) -> bool {
        let Some(subscribers) = self.subscriptions.get_mut(&kind) else {
            return false;
        };
        match subscribers.binary_search(&listener) {
            Ok(index) => {
                subscribers.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Whether `listener` is subscribed to `kind`.
    pub fn is_subscribed(&self, listener: ListenerId, kind: EventKind) -> bool {
        self.subscriptions
            .get(&kind)
            .is_some_and(|subscribers| subscribers.binary_search(&listener).is_ok())
    }

    /// Number of listeners subscribed to `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscriptions.get(&kind).map_or(0, Vec::len)
    }

    /// Queue an event for the next [`dispatch`](Self::dispatch).
    pub fn emit(&mut self, event: RunnerEvent) {
        trace!(?event, "event queued");
        self.queue.push_back(event);
    }

    /// Number of queued events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queued events in emission order.
    pub fn pending_events(&self) -> impl Iterator<Item = &RunnerEvent> {
        self.queue.iter()
    }

    /// Drop every queued event without delivering it.
    pub fn clear_pending(&mut self) {
        self.queue.clear();
    }

    /// Drain the queue, delivering each event to its subscribers.
    ///
    /// Subscribed ids with no matching entry in `listeners` are skipped.
    /// Returns the number of deliveries made.
    pub fn dispatch(&mut self, listeners: &mut [&mut dyn EventListener]) -> usize {
        let mut delivered = 0;

        while let Some(event) = self.queue.pop_front() {
            let Some(subscribers) = self.subscriptions.get(&event.kind()) else {
                trace!(?event, "event has no subscribers");
                continue;
            };

            for id in subscribers {
                let target = listeners
                    .iter_mut()
                    .find(|listener| listener.listener_id() == Some(*id));
                if let Some(listener) = target {
                    listener.handle_event(&event);
                    delivered += 1;
                }
            }
        }

        delivered
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
