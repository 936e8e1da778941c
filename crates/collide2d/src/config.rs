//! Engine configuration
//!
//! All collision tunables in one serializable structure, loadable from
//! TOML. Defaults are the values the engine was tuned with.

use serde::{Deserialize, Serialize};

use crate::error::CollisionError;

/// Tunables for the collision engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Maximum objects per quadtree node before subdivision
    pub max_objects_per_node: usize,

    /// Maximum quadtree subdivision depth
    pub max_levels: u32,

    /// Penetration tolerated before positional correction kicks in
    pub slop: f32,

    /// Fraction of residual overlap corrected per frame
    pub correction_percent: f32,

    /// Clamp circular bodies to the world bounds after resolution,
    /// reflecting velocity scaled by restitution
    pub confine_to_bounds: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            max_objects_per_node: 10,
            max_levels: 5,
            slop: 0.01,
            correction_percent: 0.8,
            confine_to_bounds: false,
        }
    }
}

impl CollisionConfig {
    /// Parse a configuration from a TOML document
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, CollisionError> {
        Ok(toml::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = CollisionConfig::default();
        assert_eq!(config.max_objects_per_node, 10);
        assert_eq!(config.max_levels, 5);
        assert!((config.slop - 0.01).abs() < f32::EPSILON);
        assert!((config.correction_percent - 0.8).abs() < f32::EPSILON);
        assert!(!config.confine_to_bounds);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CollisionConfig::from_toml_str(
            "max_objects_per_node = 6\nconfine_to_bounds = true\n",
        )
        .unwrap();
        assert_eq!(config.max_objects_per_node, 6);
        assert!(config.confine_to_bounds);
        assert_eq!(config.max_levels, 5);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(CollisionConfig::from_toml_str("max_levels = \"deep\"").is_err());
    }
}
