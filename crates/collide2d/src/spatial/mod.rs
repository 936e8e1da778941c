//! Spatial partitioning for broad-phase collision detection

pub mod quadtree;

pub use quadtree::{Quadtree, QuadtreeConfig};
