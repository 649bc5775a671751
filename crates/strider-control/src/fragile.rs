//! Breakable scene objects.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identity of a scene object the runner can collide with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Looks up an object's "break on player contact" capability and invokes it.
pub trait BreakableRegistry {
    /// Break `object` if it is breakable.
    ///
    /// Returns `true` if the object exposes the capability and it was invoked,
    /// `false` if the object is not breakable.
    fn break_on_contact(&mut self, object: ObjectId) -> bool;
}

/// A registry backed by a set of breakable ids that logs every breakage.
#[derive(Debug, Clone, Default)]
pub struct BreakableSet {
    breakable: BTreeSet<ObjectId>,
    broken: Vec<ObjectId>,
}

impl BreakableSet {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `object` as breakable.
    pub fn insert(&mut self, object: ObjectId) {
        self.breakable.insert(object);
    }

    /// Every break invocation so far, in order.
    pub fn broken(&self) -> &[ObjectId] {
        &self.broken
    }

    /// How many times `object` has been broken.
    pub fn break_count(&self, object: ObjectId) -> usize {
        self.broken.iter().filter(|&&o| o == object).count()
    }
}

impl BreakableRegistry for BreakableSet {
    fn break_on_contact(&mut self, object: ObjectId) -> bool {
        if !self.breakable.contains(&object) {
            return false;
        }
        self.broken.push(object);
        debug!(object = object.0, "fragile object broken");
        true
    }
}
