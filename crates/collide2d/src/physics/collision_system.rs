//! Core collision engine
//!
//! Drives the per-frame pipeline: rebuild the quadtree from the live
//! entity set, broad phase (spatial candidate queries), narrow phase
//! (exact shape tests), impulse resolution, event dispatch, and active-set
//! cleanup.
//!
//! The whole step is a single-threaded synchronous call with no internal
//! suspension points; entity state is owned exclusively by the simulation
//! thread for the duration of [`CollisionWorld::update`]. Processing order
//! is deterministic given a fixed entity insertion order.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::{debug, warn};

use crate::config::CollisionConfig;
use crate::error::CollisionError;
use crate::foundation::math::Rect;
use crate::physics::body::{BodyHandle, EntityId};
use crate::physics::events::{
    CollisionEvent, CollisionEventBus, CollisionEventKind, CollisionListener, PairKey,
};
use crate::physics::filter::{AllowAll, CollisionFilter};
use crate::physics::narrow_phase::{detect, BodySnapshot, CollisionResult};
use crate::physics::resolution::{ResolutionContext, ResolveBody};
use crate::physics::stats::CollisionStats;
use crate::spatial::{Quadtree, QuadtreeConfig};

/// Default world region covered before the first `update` supplies bounds
const DEFAULT_WORLD_BOUNDS: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 10_000.0,
    height: 10_000.0,
};

struct EntityEntry {
    handle: BodyHandle,
    is_static: bool,
}

/// The collision detection and resolution engine
///
/// Entities are registered as shared handles and remain owned by game
/// code; the engine reads and mutates them only inside `update`.
pub struct CollisionWorld {
    config: CollisionConfig,
    entities: Vec<EntityEntry>,
    quadtree: Quadtree,
    active_collisions: HashSet<PairKey>,
    bus: CollisionEventBus,
    filter: Box<dyn CollisionFilter>,
    resolution: ResolutionContext,
    stats: CollisionStats,
}

impl CollisionWorld {
    /// Create an engine with the given configuration
    pub fn new(config: CollisionConfig) -> Self {
        let quadtree_config = QuadtreeConfig {
            max_objects_per_node: config.max_objects_per_node,
            max_levels: config.max_levels,
        };
        Self {
            resolution: ResolutionContext::new(&config),
            config,
            entities: Vec::new(),
            quadtree: Quadtree::new(DEFAULT_WORLD_BOUNDS, quadtree_config),
            active_collisions: HashSet::new(),
            bus: CollisionEventBus::new(),
            filter: Box::new(AllowAll),
            stats: CollisionStats::new(),
        }
    }

    /// Register an entity
    ///
    /// `is_static` marks the entity as immovable (infinite mass): it is
    /// detected against but never repositioned or accelerated. Returns
    /// `false` if an entity with the same id is already registered.
    pub fn add_entity(&mut self, handle: BodyHandle, is_static: bool) -> bool {
        let id = handle.borrow().id();
        if self.find_entity(id).is_some() {
            warn!("entity {id} already registered, ignoring");
            return false;
        }
        self.entities.push(EntityEntry { handle, is_static });
        true
    }

    /// Unregister an entity and prune its active collision keys
    pub fn remove_entity(&mut self, id: EntityId) {
        self.entities.retain(|entry| entry.handle.borrow().id() != id);
        self.active_collisions.retain(|key| !key.contains(id));
    }

    /// Register a collision listener
    pub fn add_collision_listener(&mut self, listener: Rc<dyn CollisionListener>) {
        self.bus.add_listener(listener);
    }

    /// Unregister a collision listener
    pub fn remove_collision_listener(&mut self, listener: &Rc<dyn CollisionListener>) {
        self.bus.remove_listener(listener);
    }

    /// Replace the collision filter (default: all pairs collide)
    pub fn set_filter(&mut self, filter: Box<dyn CollisionFilter>) {
        self.filter = filter;
    }

    /// Collision statistics for diagnostics
    pub fn stats(&self) -> &CollisionStats {
        &self.stats
    }

    /// Pairs currently considered touching
    pub fn active_collisions(&self) -> &HashSet<PairKey> {
        &self.active_collisions
    }

    /// Ids of every entity currently colliding with `id`
    pub fn colliding_with(&self, id: EntityId) -> Vec<EntityId> {
        self.active_collisions
            .iter()
            .filter(|key| key.contains(id))
            .map(|key| if key.min == id { key.max } else { key.min })
            .collect()
    }

    /// Number of registered entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Advance the engine one simulation tick
    ///
    /// Rebuild -> detect -> resolve -> cleanup, wrapped in frame timing.
    /// `delta_time` is validated but not used for integration; movement is
    /// owned by the caller. Malformed per-pair data degrades gracefully
    /// (the pair is skipped and logged); only invalid caller input is an
    /// error.
    pub fn update(&mut self, delta_time: f32, world_bounds: Rect) -> Result<(), CollisionError> {
        if !delta_time.is_finite() || delta_time < 0.0 {
            return Err(CollisionError::InvalidDeltaTime(delta_time));
        }
        if !world_bounds.is_finite() || world_bounds.width <= 0.0 || world_bounds.height <= 0.0 {
            return Err(CollisionError::InvalidWorldBounds(world_bounds));
        }

        self.stats.start_frame();

        let (snapshots, groups) = self.capture_snapshots();
        self.rebuild_quadtree(world_bounds, &snapshots);

        let candidates = self.broad_phase(&snapshots);
        self.stats.set_broad_phase_candidates(candidates.len());

        let mut confirmed = self.narrow_phase(&candidates, &snapshots, &groups);
        self.resolve_collisions(&mut confirmed, &snapshots);

        if self.config.confine_to_bounds {
            self.confine_to_bounds(&world_bounds);
        }

        // Cleanup: keys survive only while their pair still overlaps and
        // both entities are live, re-tested against post-resolution
        // positions
        self.active_collisions = self.prune_active(&confirmed);

        self.stats
            .set_active_collisions(self.active_collisions.len());
        self.stats.end_frame();
        debug!(
            "collision frame: {} candidates, {} active, {:.3} ms",
            candidates.len(),
            self.active_collisions.len(),
            self.stats.last_frame_millis()
        );

        Ok(())
    }

    /// Snapshot geometry and groups for every live entity
    ///
    /// Entities that are inactive, dead, or carry non-finite geometry get
    /// `None` and sit the frame out.
    fn capture_snapshots(&self) -> (Vec<Option<BodySnapshot>>, Vec<String>) {
        let mut snapshots = Vec::with_capacity(self.entities.len());
        let mut groups = Vec::with_capacity(self.entities.len());
        for entry in &self.entities {
            let body = entry.handle.borrow();
            groups.push(body.collision_group().to_owned());
            if !body.is_active() || !body.is_alive() {
                snapshots.push(None);
                continue;
            }
            let snapshot = BodySnapshot::capture(&*body);
            if snapshot.is_finite() {
                snapshots.push(Some(snapshot));
            } else {
                warn!("entity {}: non-finite geometry, skipping this frame", snapshot.id);
                snapshots.push(None);
            }
        }
        (snapshots, groups)
    }

    fn rebuild_quadtree(&mut self, world_bounds: Rect, snapshots: &[Option<BodySnapshot>]) {
        self.quadtree.set_bounds(world_bounds);
        self.quadtree.clear();
        for snapshot in snapshots.iter().flatten() {
            self.quadtree.insert(snapshot.id, snapshot.bounds);
        }
    }

    /// Broad phase: emit unique unordered candidate pairs
    ///
    /// Each pair is reported once as `(i, j)` with `i < j` in the stable
    /// entity list, regardless of which side's query discovered it.
    fn broad_phase(&self, snapshots: &[Option<BodySnapshot>]) -> Vec<(usize, usize)> {
        let index_by_id: HashMap<EntityId, usize> = snapshots
            .iter()
            .enumerate()
            .filter_map(|(i, snapshot)| snapshot.map(|s| (s.id, i)))
            .collect();

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut nearby = Vec::new();

        for (i, snapshot) in snapshots.iter().enumerate() {
            let Some(snapshot) = snapshot else { continue };
            nearby.clear();
            self.quadtree.retrieve(snapshot.bounds, &mut nearby);
            for &other_id in &nearby {
                let Some(&j) = index_by_id.get(&other_id) else {
                    continue;
                };
                if j == i {
                    continue;
                }
                if seen.insert(PairKey::new(snapshot.id, other_id)) {
                    candidates.push((i.min(j), i.max(j)));
                }
            }
        }
        candidates
    }

    /// Narrow phase: exact tests plus new-collision notification
    fn narrow_phase(
        &mut self,
        candidates: &[(usize, usize)],
        snapshots: &[Option<BodySnapshot>],
        groups: &[String],
    ) -> Vec<(usize, usize, CollisionResult)> {
        let mut confirmed = Vec::new();

        for &(i, j) in candidates {
            let (Some(snap_a), Some(snap_b)) = (&snapshots[i], &snapshots[j]) else {
                continue;
            };
            if !self.filter.allow_collision(&groups[i], &groups[j]) {
                continue;
            }
            let Some(result) = detect(snap_a, snap_b) else {
                continue;
            };

            let key = PairKey::new(snap_a.id, snap_b.id);
            if !self.active_collisions.contains(&key) {
                // New this frame: count it, tell listeners, trigger the
                // entities' own callbacks
                self.stats.record_collision();
                self.bus.emit(&CollisionEvent {
                    kind: CollisionEventKind::Detected,
                    entity_a: key.min,
                    entity_b: key.max,
                    contact_kind: result.kind,
                    impulse: 0.0,
                });
                self.entities[i].handle.borrow_mut().on_collision(snap_b.id);
                self.entities[j].handle.borrow_mut().on_collision(snap_a.id);
            }

            confirmed.push((i, j, result));
        }
        confirmed
    }

    /// Apply position and velocity corrections for confirmed contacts
    ///
    /// The applied impulse magnitude is written back into each contact's
    /// result and carried on the `Resolved` event.
    fn resolve_collisions(
        &mut self,
        confirmed: &mut [(usize, usize, CollisionResult)],
        snapshots: &[Option<BodySnapshot>],
    ) {
        for (i, j, result) in confirmed.iter_mut() {
            let resolved = {
                let entry_a = &self.entities[*i];
                let entry_b = &self.entities[*j];
                let mut borrow_a = entry_a.handle.borrow_mut();
                let mut borrow_b = entry_b.handle.borrow_mut();
                let mut side_a = ResolveBody {
                    body: &mut *borrow_a,
                    is_static: entry_a.is_static,
                };
                let mut side_b = ResolveBody {
                    body: &mut *borrow_b,
                    is_static: entry_b.is_static,
                };
                self.resolution.resolve(&mut side_a, &mut side_b, result)
            };

            // Borrows are released before listeners run, so a listener may
            // inspect the entities it is being told about
            if let Some(impulse) = resolved {
                result.impulse = impulse;
                let key = Self::pair_key(snapshots, *i, *j);
                self.bus.emit(&CollisionEvent {
                    kind: CollisionEventKind::Resolved,
                    entity_a: key.min,
                    entity_b: key.max,
                    contact_kind: result.kind,
                    impulse,
                });
            }
        }
    }

    /// Re-test confirmed pairs against post-resolution positions
    ///
    /// A pair that resolution fully separated drops out of the active set
    /// this frame, so re-contact on a later frame counts as a new
    /// collision.
    fn prune_active(&self, confirmed: &[(usize, usize, CollisionResult)]) -> HashSet<PairKey> {
        let mut active = HashSet::new();
        for &(i, j, _) in confirmed {
            let (Some(snap_a), Some(snap_b)) = (self.live_snapshot(i), self.live_snapshot(j))
            else {
                continue;
            };
            if detect(&snap_a, &snap_b).is_some() {
                active.insert(PairKey::new(snap_a.id, snap_b.id));
            }
        }
        active
    }

    fn live_snapshot(&self, index: usize) -> Option<BodySnapshot> {
        let body = self.entities[index].handle.borrow();
        if !body.is_active() || !body.is_alive() {
            return None;
        }
        let snapshot = BodySnapshot::capture(&*body);
        snapshot.is_finite().then_some(snapshot)
    }

    fn confine_to_bounds(&mut self, world_bounds: &Rect) {
        for entry in &self.entities {
            if entry.is_static {
                continue;
            }
            let mut body = entry.handle.borrow_mut();
            if body.is_active() && body.is_alive() {
                ResolutionContext::resolve_wall_collision(&mut *body, world_bounds);
            }
        }
    }

    fn pair_key(snapshots: &[Option<BodySnapshot>], i: usize, j: usize) -> PairKey {
        // Confirmed contacts always come from live snapshots
        let id_a = snapshots[i].map_or(0, |s| s.id);
        let id_b = snapshots[j].map_or(0, |s| s.id);
        PairKey::new(id_a, id_b)
    }

    fn find_entity(&self, id: EntityId) -> Option<&EntityEntry> {
        self.entities
            .iter()
            .find(|entry| entry.handle.borrow().id() == id)
    }
}
