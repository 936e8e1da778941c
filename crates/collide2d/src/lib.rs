//! 2D collision detection and physics resolution engine
//!
//! A frame-oriented collision engine for games with many moving entities:
//! a quadtree broad phase narrows the candidate set, exact shape tests
//! (circle-circle, rect-rect, circle-AABB) confirm contacts, and an
//! impulse-based resolver separates overlapping bodies and exchanges
//! momentum with restitution and positional correction. A lightweight
//! event bus reports new and resolved collisions to registered listeners.
//!
//! The engine does not own entities. Game code registers shared handles to
//! anything implementing [`physics::PhysicsBody`] and calls
//! [`physics::CollisionWorld::update`] once per simulation tick; movement
//! integration stays with the caller.
//!
//! ```
//! use collide2d::config::CollisionConfig;
//! use collide2d::foundation::math::{Rect, Vec2};
//! use collide2d::physics::{Body, CollisionWorld};
//!
//! let mut world = CollisionWorld::new(CollisionConfig::default());
//! world.add_entity(Body::circle(1, Vec2::new(100.0, 100.0), 10.0, 1.0).into_handle(), false);
//! world.add_entity(Body::circle(2, Vec2::new(115.0, 100.0), 10.0, 1.0).into_handle(), false);
//! world.update(1.0 / 60.0, Rect::new(0.0, 0.0, 1000.0, 1000.0)).unwrap();
//! assert_eq!(world.stats().total_collisions(), 1);
//! ```

pub mod config;
pub mod error;
pub mod foundation;
pub mod physics;
pub mod spatial;

pub use config::CollisionConfig;
pub use error::CollisionError;

/// Commonly used types, importable in one line
pub mod prelude {
    pub use crate::config::CollisionConfig;
    pub use crate::error::CollisionError;
    pub use crate::foundation::math::{Rect, Vec2};
    pub use crate::physics::{
        Body, BodyHandle, CollisionEvent, CollisionEventKind, CollisionFilter, CollisionListener,
        CollisionWorld, EntityId, GroupFilter, PairKey, PhysicsBody,
    };
}
