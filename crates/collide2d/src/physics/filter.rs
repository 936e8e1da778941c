//! Collision filtering by entity group
//!
//! A pluggable allow-list decides which entity categories may collide
//! before any narrow-phase test runs. The default filter allows every
//! pair.

use std::collections::{HashMap, HashSet};

/// Decides whether two collision groups may collide
pub trait CollisionFilter {
    /// Return `true` if entities in these groups should be tested
    fn allow_collision(&self, group_a: &str, group_b: &str) -> bool;
}

/// Default filter: every pair collides
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl CollisionFilter for AllowAll {
    fn allow_collision(&self, _group_a: &str, _group_b: &str) -> bool {
        true
    }
}

/// Explicit allow-list over named groups
///
/// Pairs never registered via [`GroupFilter::allow_collision_between`] are
/// denied. Registration is symmetric.
#[derive(Debug, Clone, Default)]
pub struct GroupFilter {
    allowed: HashMap<String, HashSet<String>>,
}

impl GroupFilter {
    /// Create an empty filter that denies everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow collisions between two groups (in both directions)
    pub fn allow_collision_between(&mut self, group_a: &str, group_b: &str) {
        self.allowed
            .entry(group_a.to_owned())
            .or_default()
            .insert(group_b.to_owned());
        self.allowed
            .entry(group_b.to_owned())
            .or_default()
            .insert(group_a.to_owned());
    }

    /// Remove all registered pairs
    pub fn clear(&mut self) {
        self.allowed.clear();
    }
}

impl CollisionFilter for GroupFilter {
    fn allow_collision(&self, group_a: &str, group_b: &str) -> bool {
        self.allowed
            .get(group_a)
            .is_some_and(|groups| groups.contains(group_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all_is_permissive() {
        let filter = AllowAll;
        assert!(filter.allow_collision("player", "enemy"));
        assert!(filter.allow_collision("anything", "anything"));
    }

    #[test]
    fn test_group_filter_is_symmetric() {
        let mut filter = GroupFilter::new();
        filter.allow_collision_between("player", "enemy");

        assert!(filter.allow_collision("player", "enemy"));
        assert!(filter.allow_collision("enemy", "player"));
        assert!(!filter.allow_collision("player", "pickup"));
        assert!(!filter.allow_collision("pickup", "enemy"));
    }

    #[test]
    fn test_same_group_requires_registration() {
        let mut filter = GroupFilter::new();
        assert!(!filter.allow_collision("debris", "debris"));
        filter.allow_collision_between("debris", "debris");
        assert!(filter.allow_collision("debris", "debris"));
    }
}
