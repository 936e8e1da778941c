//! Collision detection and resolution
//!
//! Submodules follow the frame pipeline: [`body`] defines what the engine
//! operates on, [`narrow_phase`] produces contacts, [`resolution`] applies
//! impulses and corrections, [`events`] and [`stats`] observe, and
//! [`collision_system`] ties it together.

pub mod body;
pub mod collision_system;
pub mod events;
pub mod filter;
pub mod narrow_phase;
pub mod resolution;
pub mod stats;

pub use body::{Body, BodyHandle, EntityId, PhysicsBody};
pub use collision_system::CollisionWorld;
pub use events::{
    CollisionEvent, CollisionEventBus, CollisionEventKind, CollisionListener, PairKey,
};
pub use filter::{AllowAll, CollisionFilter, GroupFilter};
pub use narrow_phase::{BodySnapshot, CollisionResult, ContactKind, ShapeClass};
pub use resolution::{ResolutionContext, ResolveBody};
pub use stats::CollisionStats;
