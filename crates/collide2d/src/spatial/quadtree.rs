//! Quadtree spatial partitioning structure
//!
//! Divides 2D space into hierarchical quadrants for fast collision
//! candidate queries. A node splits into 4 children when its object count
//! exceeds a threshold, and objects straddling a quadrant boundary stay at
//! the shallowest node whose region fully contains them.
//!
//! The tree is rebuilt wholesale every frame, so nodes live in a flat
//! arena indexed by `usize` rather than in an owning pointer graph;
//! `clear` truncates the arena back to the root and reuses its capacity.

use crate::foundation::math::Rect;
use crate::physics::body::EntityId;

/// Configuration for quadtree behavior
#[derive(Debug, Clone)]
pub struct QuadtreeConfig {
    /// Maximum objects per node before subdivision
    pub max_objects_per_node: usize,

    /// Maximum subdivision depth
    pub max_levels: u32,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            max_objects_per_node: 10,
            max_levels: 5,
        }
    }
}

/// Quadrant order: NE, NW, SW, SE
const QUADRANT_COUNT: usize = 4;

/// Single node in the quadtree arena
#[derive(Debug, Clone)]
struct Node {
    /// World-space region covered by this node
    bounds: Rect,

    /// Nesting level (0 = root)
    level: u32,

    /// Objects stored at this node: those not fully contained by any child
    objects: Vec<(EntityId, Rect)>,

    /// Arena indices of the 4 children, None if this node is a leaf
    children: Option<[usize; QUADRANT_COUNT]>,
}

impl Node {
    fn new(bounds: Rect, level: u32) -> Self {
        Self {
            bounds,
            level,
            objects: Vec::new(),
            children: None,
        }
    }
}

/// Quadtree spatial index over entity bounding rectangles
#[derive(Debug, Clone)]
pub struct Quadtree {
    nodes: Vec<Node>,
    config: QuadtreeConfig,
}

impl Quadtree {
    /// Create a new quadtree covering the given world bounds
    pub fn new(bounds: Rect, config: QuadtreeConfig) -> Self {
        Self {
            nodes: vec![Node::new(bounds, 0)],
            config,
        }
    }

    /// Remove all objects and collapse the tree back to the root
    ///
    /// Keeps the root bounds and the arena's allocated capacity.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0].objects.clear();
        self.nodes[0].children = None;
    }

    /// Replace the world bounds covered by the root
    ///
    /// Call before a rebuild; existing nodes are not re-fitted.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.nodes[0].bounds = bounds;
    }

    /// Insert an object with its bounding rectangle
    pub fn insert(&mut self, id: EntityId, bounds: Rect) {
        self.insert_at(0, id, bounds);
    }

    /// Collect all objects stored at nodes overlapping the query region
    ///
    /// The result is a superset of everything that could overlap `bounds`
    /// (it may contain false positives and duplicates, never false
    /// negatives for objects inside the world bounds).
    pub fn retrieve(&self, bounds: Rect, out: &mut Vec<EntityId>) {
        self.retrieve_at(0, bounds, out);
    }

    /// Total number of stored objects
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|node| node.objects.len()).sum()
    }

    /// Whether the tree holds no objects
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes currently in the arena
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn insert_at(&mut self, node: usize, id: EntityId, bounds: Rect) {
        if let Some(children) = self.nodes[node].children {
            if let Some(quadrant) = self.quadrant_for(node, &bounds) {
                self.insert_at(children[quadrant], id, bounds);
                return;
            }
        }

        self.nodes[node].objects.push((id, bounds));

        let should_split = self.nodes[node].objects.len() > self.config.max_objects_per_node
            && self.nodes[node].level < self.config.max_levels;
        if should_split {
            if self.nodes[node].children.is_none() {
                self.split(node);
            }
            self.redistribute(node);
        }
    }

    /// Push objects that fit entirely within a child down one level
    fn redistribute(&mut self, node: usize) {
        let Some(children) = self.nodes[node].children else {
            return;
        };

        let mut i = 0;
        while i < self.nodes[node].objects.len() {
            let (id, bounds) = self.nodes[node].objects[i];
            if let Some(quadrant) = self.quadrant_for(node, &bounds) {
                self.nodes[node].objects.remove(i);
                self.insert_at(children[quadrant], id, bounds);
            } else {
                i += 1;
            }
        }
    }

    /// Subdivide a node into 4 equal children
    fn split(&mut self, node: usize) {
        let bounds = self.nodes[node].bounds;
        let level = self.nodes[node].level;
        let half_w = bounds.width / 2.0;
        let half_h = bounds.height / 2.0;

        let quadrants = [
            // NE
            Rect::new(bounds.x + half_w, bounds.y, half_w, half_h),
            // NW
            Rect::new(bounds.x, bounds.y, half_w, half_h),
            // SW
            Rect::new(bounds.x, bounds.y + half_h, half_w, half_h),
            // SE
            Rect::new(bounds.x + half_w, bounds.y + half_h, half_w, half_h),
        ];

        let base = self.nodes.len();
        for quadrant_bounds in quadrants {
            self.nodes.push(Node::new(quadrant_bounds, level + 1));
        }
        self.nodes[node].children = Some([base, base + 1, base + 2, base + 3]);
    }

    /// Which child quadrant fully contains `bounds`, if any
    fn quadrant_for(&self, node: usize, bounds: &Rect) -> Option<usize> {
        let node_bounds = &self.nodes[node].bounds;
        let vertical_mid = node_bounds.x + node_bounds.width / 2.0;
        let horizontal_mid = node_bounds.y + node_bounds.height / 2.0;

        let in_top = bounds.bottom() < horizontal_mid;
        let in_bottom = bounds.top() > horizontal_mid;
        let in_left = bounds.right() < vertical_mid;
        let in_right = bounds.left() > vertical_mid;

        match (in_left, in_right, in_top, in_bottom) {
            (_, true, true, _) => Some(0),  // NE
            (true, _, true, _) => Some(1),  // NW
            (true, _, _, true) => Some(2),  // SW
            (_, true, _, true) => Some(3),  // SE
            _ => None,
        }
    }

    fn retrieve_at(&self, node: usize, bounds: Rect, out: &mut Vec<EntityId>) {
        let current = &self.nodes[node];

        if let Some(children) = current.children {
            if let Some(quadrant) = self.quadrant_for(node, &bounds) {
                self.retrieve_at(children[quadrant], bounds, out);
            } else {
                // Query straddles a boundary: aggregate every child
                for child in children {
                    self.retrieve_at(child, bounds, out);
                }
            }
        }

        // Node-local objects straddle child boundaries, so they are
        // candidates for any query passing through this region
        out.extend(current.objects.iter().map(|(id, _)| *id));
    }
}
