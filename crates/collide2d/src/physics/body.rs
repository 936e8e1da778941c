//! Entity capability set consumed by the collision engine
//!
//! The engine is polymorphic over any concrete entity type: game code owns
//! entity lifetimes and hands the engine shared handles. Positions are
//! entity centers; bounding rectangles are derived from center and size.

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::math::{Rect, Vec2};

/// Unique entity identifier
pub type EntityId = u64;

/// Capabilities a concrete entity must expose to participate in collision
/// detection and resolution
///
/// The engine never owns the entity; it reads and writes through this trait
/// during `update` only. All positions refer to the entity's center.
pub trait PhysicsBody {
    /// Unique id, stable for the entity's lifetime
    fn id(&self) -> EntityId;

    /// Center position in world space
    fn position(&self) -> Vec2;

    /// Move the entity's center
    fn set_position(&mut self, position: Vec2);

    /// Current velocity
    fn velocity(&self) -> Vec2;

    /// Overwrite the velocity
    fn set_velocity(&mut self, velocity: Vec2);

    /// Mass; must be positive for dynamic bodies. Ignored for entities
    /// registered as static (treated as infinite).
    fn mass(&self) -> f32;

    /// Bounding width
    fn width(&self) -> f32;

    /// Bounding height
    fn height(&self) -> f32;

    /// Axis-aligned bounding rectangle, derived from center and size
    fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position(), self.width(), self.height())
    }

    /// Restitution coefficient in [0, 1]: 1 is perfectly elastic
    fn restitution(&self) -> f32 {
        0.8
    }

    /// Friction coefficient in [0, 1]
    fn friction(&self) -> f32 {
        0.1
    }

    /// Whether the entity currently participates in collision detection
    fn is_active(&self) -> bool {
        true
    }

    /// Whether the entity is alive; dead entities are skipped and their
    /// collision keys pruned
    fn is_alive(&self) -> bool {
        true
    }

    /// Collision group name used by the pluggable collision filter
    fn collision_group(&self) -> &str {
        "default"
    }

    /// Called once when a new collision with `other` is detected
    fn on_collision(&mut self, _other: EntityId) {}
}

/// Shared, non-owning handle to an entity
///
/// The engine is single-threaded (see `CollisionWorld::update`), so
/// `Rc<RefCell<_>>` reference semantics match the external-ownership model.
pub type BodyHandle = Rc<RefCell<dyn PhysicsBody>>;

/// A ready-made entity implementation
///
/// Suitable for tests and for games that do not need their own entity
/// type. Constructed via [`Body::circle`] or [`Body::rect`].
#[derive(Debug, Clone)]
pub struct Body {
    id: EntityId,
    position: Vec2,
    velocity: Vec2,
    mass: f32,
    width: f32,
    height: f32,
    restitution: f32,
    friction: f32,
    group: String,
    active: bool,
    alive: bool,
    /// Ids of entities this body collided with, most recent last
    pub collision_log: Vec<EntityId>,
}

impl Body {
    /// Create a circular body from center and radius
    pub fn circle(id: EntityId, position: Vec2, radius: f32, mass: f32) -> Self {
        Self::rect(id, position, radius * 2.0, radius * 2.0, mass)
    }

    /// Create a rectangular body from center and size
    pub fn rect(id: EntityId, position: Vec2, width: f32, height: f32, mass: f32) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::zeros(),
            mass,
            width,
            height,
            restitution: 0.8,
            friction: 0.1,
            group: String::from("default"),
            active: true,
            alive: true,
            collision_log: Vec::new(),
        }
    }

    /// Set the initial velocity (builder style)
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the restitution coefficient (builder style)
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set the friction coefficient (builder style)
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Set the collision group (builder style)
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Wrap this body in a shared handle
    pub fn into_handle(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Activate or deactivate the body
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Mark the body dead; it stops participating and its collision keys
    /// are pruned on the next frame
    pub fn kill(&mut self) {
        self.alive = false;
        self.active = false;
    }
}

impl PhysicsBody for Body {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn restitution(&self) -> f32 {
        self.restitution
    }

    fn friction(&self) -> f32 {
        self.friction
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn collision_group(&self) -> &str {
        &self.group
    }

    fn on_collision(&mut self, other: EntityId) {
        self.collision_log.push(other);
    }
}
