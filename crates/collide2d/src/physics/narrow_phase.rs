//! Exact geometric collision tests
//!
//! The narrow phase confirms or refutes broad-phase candidate pairs using
//! the precise test for each pair of shapes: circle-circle, rect-rect, or
//! circle-AABB.
//!
//! Shape classification is a heuristic: an entity whose width/height aspect
//! ratio is within [`CIRCLE_ASPECT_TOLERANCE`] of square is treated as a
//! circle, otherwise as a rectangle. Near-square rectangles therefore
//! collide as circles; callers that need exact rectangle behavior should
//! give their entities a distinctly non-square bound.

use crate::foundation::math::{Rect, Vec2};
use crate::physics::body::{EntityId, PhysicsBody};

/// Aspect-ratio tolerance below which a bound counts as circular
pub const CIRCLE_ASPECT_TOLERANCE: f32 = 0.1;

/// Geometric class a bounding box is tested as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeClass {
    /// Near-square bound, tested as a circle of radius `max(w, h) / 2`
    Circle,
    /// Elongated bound, tested as an axis-aligned rectangle
    Rect,
}

/// Classify a bounding box by its aspect ratio
pub fn classify(width: f32, height: f32) -> ShapeClass {
    let longest = width.max(height);
    if longest <= 0.0 {
        return ShapeClass::Circle;
    }
    if (width - height).abs() / longest < CIRCLE_ASPECT_TOLERANCE {
        ShapeClass::Circle
    } else {
        ShapeClass::Rect
    }
}

/// Radius used when a bound is treated as a circle
pub fn bounding_radius(width: f32, height: f32) -> f32 {
    width.max(height) / 2.0
}

/// Which pair of shape classes produced a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Both bounds circular
    CircleCircle,
    /// Both bounds rectangular
    RectRect,
    /// A circular, B rectangular
    CircleRect,
    /// A rectangular, B circular
    RectCircle,
}

impl ContactKind {
    /// Diagnostic tag for logs and events
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CircleCircle => "circle_circle",
            Self::RectRect => "rect_rect",
            Self::CircleRect => "circle_rect",
            Self::RectCircle => "rect_circle",
        }
    }
}

/// Contact details for one detected overlap
///
/// Transient: produced during a frame's narrow phase and never persisted.
/// The normal is a unit vector pointing from entity A toward entity B.
#[derive(Debug, Clone, Copy)]
pub struct CollisionResult {
    /// Penetration depth along the normal, always >= 0
    pub overlap: f32,
    /// Unit contact normal, A to B
    pub normal: Vec2,
    /// Representative contact point in world space
    pub contact: Vec2,
    /// Impulse magnitude applied by resolution; 0 until resolved
    pub impulse: f32,
    /// Which geometric test produced this contact
    pub kind: ContactKind,
}

/// Per-frame geometric snapshot of one entity
///
/// Captured once at the start of detection so narrow-phase tests never
/// re-borrow entity handles mid-frame.
#[derive(Debug, Clone, Copy)]
pub struct BodySnapshot {
    /// Entity id
    pub id: EntityId,
    /// Center position
    pub position: Vec2,
    /// Bounding rectangle
    pub bounds: Rect,
    /// Bounding width
    pub width: f32,
    /// Bounding height
    pub height: f32,
    /// Classified shape
    pub shape: ShapeClass,
}

impl BodySnapshot {
    /// Capture a snapshot from a live entity
    pub fn capture(body: &dyn PhysicsBody) -> Self {
        let (width, height) = (body.width(), body.height());
        Self {
            id: body.id(),
            position: body.position(),
            bounds: body.bounds(),
            width,
            height,
            shape: classify(width, height),
        }
    }

    /// Whether the snapshot geometry is usable (no NaN/infinite values)
    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.bounds.is_finite()
    }

    fn radius(&self) -> f32 {
        bounding_radius(self.width, self.height)
    }
}

/// Run the exact test matching both entities' shape classes
///
/// Returns contact details when the shapes overlap, `None` otherwise.
/// Symmetric: `detect(a, b)` collides iff `detect(b, a)` does.
pub fn detect(a: &BodySnapshot, b: &BodySnapshot) -> Option<CollisionResult> {
    match (a.shape, b.shape) {
        (ShapeClass::Circle, ShapeClass::Circle) => circle_circle(a, b),
        (ShapeClass::Rect, ShapeClass::Rect) => rect_rect(a, b),
        (ShapeClass::Circle, ShapeClass::Rect) => {
            circle_aabb(a, b).map(|result| CollisionResult {
                kind: ContactKind::CircleRect,
                ..result
            })
        }
        (ShapeClass::Rect, ShapeClass::Circle) => {
            // Run the circle-AABB test from the circle's side, then flip
            // the normal back into A-to-B orientation
            circle_aabb(b, a).map(|result| CollisionResult {
                normal: -result.normal,
                kind: ContactKind::RectCircle,
                ..result
            })
        }
    }
}

/// Circle-circle: collide iff center distance < sum of radii
///
/// Boundary exclusive: circles exactly touching do not collide.
fn circle_circle(a: &BodySnapshot, b: &BodySnapshot) -> Option<CollisionResult> {
    let (radius_a, radius_b) = (a.radius(), b.radius());
    let delta = b.position - a.position;
    let distance_sq = delta.norm_squared();
    let min_distance = radius_a + radius_b;

    if distance_sq >= min_distance * min_distance {
        return None;
    }

    let distance = distance_sq.sqrt();
    let normal = if distance > 0.0 {
        delta / distance
    } else {
        // Concentric centers: direction is decided at resolution time
        Vec2::new(1.0, 0.0)
    };

    Some(CollisionResult {
        overlap: min_distance - distance,
        normal,
        contact: a.position + normal * radius_a,
        impulse: 0.0,
        kind: ContactKind::CircleCircle,
    })
}

/// Rect-rect: standard axis-aligned overlap test
fn rect_rect(a: &BodySnapshot, b: &BodySnapshot) -> Option<CollisionResult> {
    let (ra, rb) = (a.bounds, b.bounds);
    if !ra.intersects(&rb) {
        return None;
    }

    let overlap_x = ra.right().min(rb.right()) - ra.left().max(rb.left());
    let overlap_y = ra.bottom().min(rb.bottom()) - ra.top().max(rb.top());

    // Normal along the axis of minimum penetration, pointing A to B
    let (overlap, normal) = if overlap_x < overlap_y {
        let sign = if ra.center().x <= rb.center().x { 1.0 } else { -1.0 };
        (overlap_x, Vec2::new(sign, 0.0))
    } else {
        let sign = if ra.center().y <= rb.center().y { 1.0 } else { -1.0 };
        (overlap_y, Vec2::new(0.0, sign))
    };

    // Center of the overlap region
    let contact = Vec2::new(
        (ra.left().max(rb.left()) + ra.right().min(rb.right())) / 2.0,
        (ra.top().max(rb.top()) + ra.bottom().min(rb.bottom())) / 2.0,
    );

    Some(CollisionResult {
        overlap,
        normal,
        contact,
        impulse: 0.0,
        kind: ContactKind::RectRect,
    })
}

/// Circle-AABB: clamp the circle center to the rectangle to find the
/// closest point; collide iff that point is closer than the radius
///
/// `circle` is treated as the circle side; the returned normal points from
/// the circle toward the rectangle.
fn circle_aabb(circle: &BodySnapshot, rect: &BodySnapshot) -> Option<CollisionResult> {
    let radius = circle.radius();
    let closest = rect.bounds.clamp_point(circle.position);
    let delta = circle.position - closest;
    let distance_sq = delta.norm_squared();

    if distance_sq >= radius * radius {
        return None;
    }

    let distance = distance_sq.sqrt();
    let normal = if distance > 0.0 {
        // From circle toward rectangle surface
        -delta / distance
    } else {
        // Center inside the rectangle: push out along the axis of larger
        // center offset
        let offset = circle.position - rect.bounds.center();
        if offset.x.abs() > offset.y.abs() {
            Vec2::new(if offset.x > 0.0 { -1.0 } else { 1.0 }, 0.0)
        } else {
            Vec2::new(0.0, if offset.y > 0.0 { -1.0 } else { 1.0 })
        }
    };

    Some(CollisionResult {
        overlap: radius - distance,
        normal,
        contact: closest,
        impulse: 0.0,
        kind: ContactKind::CircleRect,
    })
}

/// Area of the lens formed by two overlapping circles
///
/// Zero when disjoint; the smaller circle's full area when one circle
/// contains the other. Used by absorption-style gameplay to decide how
/// much of a body is covered.
pub fn circle_overlap_area(radius_a: f32, radius_b: f32, distance: f32) -> f32 {
    use std::f32::consts::PI;

    if distance >= radius_a + radius_b {
        return 0.0;
    }
    if distance <= (radius_a - radius_b).abs() {
        let r = radius_a.min(radius_b);
        return PI * r * r;
    }

    let d2 = distance * distance;
    let (ra2, rb2) = (radius_a * radius_a, radius_b * radius_b);
    let alpha = ((d2 + ra2 - rb2) / (2.0 * distance * radius_a)).acos();
    let beta = ((d2 + rb2 - ra2) / (2.0 * distance * radius_b)).acos();
    let triangle = 0.5
        * ((-distance + radius_a + radius_b)
            * (distance + radius_a - radius_b)
            * (distance - radius_a + radius_b)
            * (distance + radius_a + radius_b))
            .sqrt();

    ra2 * alpha + rb2 * beta - triangle
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn circle(id: EntityId, x: f32, y: f32, radius: f32) -> BodySnapshot {
        BodySnapshot {
            id,
            position: Vec2::new(x, y),
            bounds: Rect::from_center_size(Vec2::new(x, y), radius * 2.0, radius * 2.0),
            width: radius * 2.0,
            height: radius * 2.0,
            shape: ShapeClass::Circle,
        }
    }

    fn rect(id: EntityId, x: f32, y: f32, width: f32, height: f32) -> BodySnapshot {
        BodySnapshot {
            id,
            position: Vec2::new(x, y),
            bounds: Rect::from_center_size(Vec2::new(x, y), width, height),
            width,
            height,
            shape: ShapeClass::Rect,
        }
    }

    #[test]
    fn test_classify_aspect_heuristic() {
        assert_eq!(classify(10.0, 10.0), ShapeClass::Circle);
        assert_eq!(classify(10.0, 9.5), ShapeClass::Circle);
        assert_eq!(classify(10.0, 8.0), ShapeClass::Rect);
        assert_eq!(classify(5.0, 20.0), ShapeClass::Rect);
    }

    #[test]
    fn test_circle_threshold_is_exclusive() {
        // radius 10 each: overlap at distance 15, none at exactly 20 or 25
        let a = circle(1, 0.0, 0.0, 10.0);
        assert!(detect(&a, &circle(2, 15.0, 0.0, 10.0)).is_some());
        assert!(detect(&a, &circle(2, 20.0, 0.0, 10.0)).is_none());
        assert!(detect(&a, &circle(2, 25.0, 0.0, 10.0)).is_none());
    }

    #[test]
    fn test_circle_circle_overlap_and_normal() {
        let a = circle(1, 0.0, 0.0, 10.0);
        let b = circle(2, 15.0, 0.0, 10.0);
        let result = detect(&a, &b).unwrap();
        assert_relative_eq!(result.overlap, 5.0);
        assert_relative_eq!(result.normal.x, 1.0);
        assert_relative_eq!(result.normal.y, 0.0);
        assert_relative_eq!(result.contact.x, 10.0);
        assert_eq!(result.kind, ContactKind::CircleCircle);
    }

    #[test]
    fn test_detection_symmetry() {
        let shapes = [
            circle(1, 0.0, 0.0, 10.0),
            circle(2, 12.0, 5.0, 8.0),
            rect(3, 6.0, 0.0, 30.0, 10.0),
            rect(4, 0.0, 8.0, 25.0, 6.0),
        ];
        for a in &shapes {
            for b in &shapes {
                if a.id != b.id {
                    assert_eq!(
                        detect(a, b).is_some(),
                        detect(b, a).is_some(),
                        "asymmetry between {} and {}",
                        a.id,
                        b.id
                    );
                }
            }
        }
    }

    #[test]
    fn test_rect_rect_min_penetration_axis() {
        // Deep vertical overlap, shallow horizontal: push along x
        let a = rect(1, 0.0, 0.0, 20.0, 40.0);
        let b = rect(2, 18.0, 0.0, 20.0, 40.0);
        let result = detect(&a, &b).unwrap();
        assert_eq!(result.kind, ContactKind::RectRect);
        assert_relative_eq!(result.overlap, 2.0);
        assert_relative_eq!(result.normal.x, 1.0);
        assert_relative_eq!(result.normal.y, 0.0);
    }

    #[test]
    fn test_circle_aabb_clamp() {
        let c = circle(1, 0.0, 0.0, 10.0);
        // Rectangle whose left edge sits 8 units from the circle center
        let r = rect(2, 28.0, 0.0, 40.0, 12.0);
        let result = detect(&c, &r).unwrap();
        assert_eq!(result.kind, ContactKind::CircleRect);
        assert_relative_eq!(result.overlap, 2.0);
        // Normal points from circle toward the rectangle
        assert_relative_eq!(result.normal.x, 1.0);

        // Too far: closest point at distance 10 is outside (exclusive)
        let r_far = rect(2, 30.0, 0.0, 40.0, 12.0);
        assert!(detect(&c, &r_far).is_none());
    }

    #[test]
    fn test_rect_circle_normal_flipped() {
        let r = rect(1, 28.0, 0.0, 40.0, 12.0);
        let c = circle(2, 0.0, 0.0, 10.0);
        let result = detect(&r, &c).unwrap();
        assert_eq!(result.kind, ContactKind::RectCircle);
        // A is the rectangle, B the circle: normal points rect -> circle
        assert_relative_eq!(result.normal.x, -1.0);
    }

    #[test]
    fn test_overlap_area_bounds() {
        use std::f32::consts::PI;

        // Disjoint
        assert_relative_eq!(circle_overlap_area(10.0, 10.0, 25.0), 0.0);
        // Containment: smaller circle's area
        assert_relative_eq!(
            circle_overlap_area(10.0, 3.0, 2.0),
            PI * 9.0,
            epsilon = 1e-4
        );
        // Concentric equal circles: full area
        assert_relative_eq!(
            circle_overlap_area(10.0, 10.0, 0.0),
            PI * 100.0,
            epsilon = 1e-3
        );
        // Partial overlap lies strictly between zero and the full area
        let partial = circle_overlap_area(10.0, 10.0, 10.0);
        assert!(partial > 0.0 && partial < PI * 100.0);
    }
}
