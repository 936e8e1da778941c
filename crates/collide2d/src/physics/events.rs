//! Collision event bus
//!
//! Decouples gameplay reactions (scoring, absorption, fusion) from the
//! physics core. Listeners are registered as shared handles; the bus
//! holds non-owning references and clones its listener list before each
//! dispatch so removal during a callback is safe.

use std::rc::Rc;

use crate::physics::body::EntityId;
use crate::physics::narrow_phase::ContactKind;

/// Canonical unordered pair key: always `(min, max)` of the two ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    /// Smaller entity id
    pub min: EntityId,
    /// Larger entity id
    pub max: EntityId,
}

impl PairKey {
    /// Build a key from two ids in any order
    pub fn new(a: EntityId, b: EntityId) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Whether the key references the given entity
    pub fn contains(&self, id: EntityId) -> bool {
        self.min == id || self.max == id
    }
}

/// What happened to a collision pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEventKind {
    /// A pair began overlapping this frame
    Detected,
    /// Position/velocity resolution ran for an overlapping pair
    Resolved,
}

/// Event delivered to collision listeners
#[derive(Debug, Clone, Copy)]
pub struct CollisionEvent {
    /// What happened
    pub kind: CollisionEventKind,
    /// First entity (smaller id)
    pub entity_a: EntityId,
    /// Second entity (larger id)
    pub entity_b: EntityId,
    /// Which geometric test matched the pair
    pub contact_kind: ContactKind,
    /// Impulse magnitude applied by resolution; zero for `Detected` events
    pub impulse: f32,
}

/// Receives collision events from the engine
pub trait CollisionListener {
    /// Called for every dispatched event
    fn on_collision_event(&self, event: &CollisionEvent);
}

/// Registry of collision listeners
#[derive(Default)]
pub struct CollisionEventBus {
    listeners: Vec<Rc<dyn CollisionListener>>,
}

impl CollisionEventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; duplicate handles are ignored
    pub fn add_listener(&mut self, listener: Rc<dyn CollisionListener>) {
        let already = self
            .listeners
            .iter()
            .any(|existing| Rc::ptr_eq(existing, &listener));
        if !already {
            self.listeners.push(listener);
        }
    }

    /// Unregister a listener by handle identity
    pub fn remove_listener(&mut self, listener: &Rc<dyn CollisionListener>) {
        self.listeners
            .retain(|existing| !Rc::ptr_eq(existing, listener));
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver an event to every listener
    ///
    /// Iterates over a copy of the registration list, so listeners may
    /// add or remove registrations from inside their callback.
    pub fn emit(&self, event: &CollisionEvent) {
        let snapshot: Vec<_> = self.listeners.clone();
        for listener in snapshot {
            listener.on_collision_event(event);
        }
    }
}
