//! Impulse-based collision resolution
//!
//! Consumes confirmed contacts and mutates entity position and velocity:
//! inverse-mass-weighted separation, restitution impulses along the
//! contact normal, and a small positional correction pass that removes
//! residual overlap without visible jitter.
//!
//! State lives in an explicit [`ResolutionContext`] owned by the
//! simulation loop; there is no process-wide shared cache.

use std::f32::consts::TAU;

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::CollisionConfig;
use crate::foundation::math::{Rect, Vec2};
use crate::physics::body::PhysicsBody;
use crate::physics::narrow_phase::{bounding_radius, CollisionResult, ContactKind};

/// Seed for the fallback-normal RNG; fixed so runs are reproducible
const FALLBACK_NORMAL_SEED: u64 = 0x2d_c0_11_1d_e2;

/// One side of a contact during resolution
pub struct ResolveBody<'a> {
    /// Mutable access to the entity
    pub body: &'a mut dyn PhysicsBody,
    /// Whether the entity was registered as static (infinite mass)
    pub is_static: bool,
}

impl ResolveBody<'_> {
    fn inv_mass(&self) -> f32 {
        if self.is_static {
            return 0.0;
        }
        let mass = self.body.mass();
        if mass > 0.0 {
            1.0 / mass
        } else {
            0.0
        }
    }
}

/// Mutable resolution state owned by the collision world
pub struct ResolutionContext {
    slop: f32,
    correction_percent: f32,
    rng: StdRng,
}

impl ResolutionContext {
    /// Create a context from engine configuration
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            slop: config.slop,
            correction_percent: config.correction_percent,
            rng: StdRng::seed_from_u64(FALLBACK_NORMAL_SEED),
        }
    }

    /// Resolve one confirmed contact, dispatching on its kind
    ///
    /// Returns the applied impulse magnitude, or `None` when the pair was
    /// skipped (both static, no remaining overlap, or degenerate data).
    pub fn resolve(
        &mut self,
        a: &mut ResolveBody<'_>,
        b: &mut ResolveBody<'_>,
        contact: &CollisionResult,
    ) -> Option<f32> {
        if !finite(a.body.position()) || !finite(b.body.position()) {
            warn!(
                "skipping resolution for pair ({}, {}): non-finite position",
                a.body.id(),
                b.body.id()
            );
            return None;
        }

        match contact.kind {
            ContactKind::CircleCircle => self.resolve_circle_circle(a, b),
            ContactKind::RectRect => Self::resolve_rect_rect(a, b),
            ContactKind::CircleRect => Self::resolve_circle_aabb(a, b),
            ContactKind::RectCircle => Self::resolve_circle_aabb(b, a),
        }
    }

    /// Circle-circle: separation, impulse, positional correction
    fn resolve_circle_circle(
        &mut self,
        a: &mut ResolveBody<'_>,
        b: &mut ResolveBody<'_>,
    ) -> Option<f32> {
        let radius_a = bounding_radius(a.body.width(), a.body.height());
        let radius_b = bounding_radius(b.body.width(), b.body.height());
        let min_distance = radius_a + radius_b;

        let (inv_a, inv_b) = (a.inv_mass(), b.inv_mass());
        let inv_sum = inv_a + inv_b;
        if inv_sum == 0.0 {
            // Two static bodies never move
            return None;
        }

        let delta = b.body.position() - a.body.position();
        let distance = delta.norm();
        let normal = if distance > 0.0 {
            delta / distance
        } else {
            // Coincident centers: pick a pseudo-random direction instead
            // of dividing by zero
            self.fallback_normal()
        };

        let overlap = min_distance - distance;
        if overlap <= 0.0 {
            return None;
        }

        // Mass-weighted separation: each body moves in proportion to the
        // other's share of the total mass; a static body stays put
        let pos_a = a.body.position() - normal * (overlap * inv_a / inv_sum);
        let pos_b = b.body.position() + normal * (overlap * inv_b / inv_sum);
        a.body.set_position(pos_a);
        b.body.set_position(pos_b);

        // Restitution impulse along the normal
        let relative = b.body.velocity() - a.body.velocity();
        let vel_along_normal = relative.dot(&normal);
        let mut impulse = 0.0;
        if vel_along_normal <= 0.0 {
            let e = a.body.restitution().min(b.body.restitution());
            impulse = -(1.0 + e) * vel_along_normal / inv_sum;
            let impulse_vec = normal * impulse;
            a.body.set_velocity(a.body.velocity() - impulse_vec * inv_a);
            b.body.set_velocity(b.body.velocity() + impulse_vec * inv_b);
        }

        // Positional correction on whatever overlap remains after the
        // separation above; the slop keeps resting contacts from jittering
        let residual = min_distance - (b.body.position() - a.body.position()).norm();
        let correction = (residual - self.slop).max(0.0) / inv_sum * self.correction_percent;
        if correction > 0.0 {
            let correction_vec = normal * correction;
            a.body
                .set_position(a.body.position() - correction_vec * inv_a);
            b.body
                .set_position(b.body.position() + correction_vec * inv_b);
        }

        Some(impulse)
    }

    /// Rect-rect: push apart along the axis of minimum penetration and
    /// exchange the velocity component on that axis
    ///
    /// The velocity swap is deliberately not mass-weighted; it reads well
    /// for gameplay and is cheap, but is not a rigorous response. Static
    /// bodies are never moved and never have velocity written.
    fn resolve_rect_rect(a: &mut ResolveBody<'_>, b: &mut ResolveBody<'_>) -> Option<f32> {
        if a.is_static && b.is_static {
            return None;
        }

        let (ra, rb) = (a.body.bounds(), b.body.bounds());
        let overlap_x = ra.right().min(rb.right()) - ra.left().max(rb.left());
        let overlap_y = ra.bottom().min(rb.bottom()) - ra.top().max(rb.top());
        if overlap_x <= 0.0 || overlap_y <= 0.0 {
            return None;
        }

        let both_dynamic = !a.is_static && !b.is_static;
        let (va, vb) = (a.body.velocity(), b.body.velocity());

        if overlap_x < overlap_y {
            let direction = if ra.center().x < rb.center().x { -1.0 } else { 1.0 };
            let separation = if both_dynamic { overlap_x / 2.0 } else { overlap_x };
            if !a.is_static {
                let pos = a.body.position();
                a.body.set_position(Vec2::new(pos.x + direction * separation, pos.y));
            }
            if !b.is_static {
                let pos = b.body.position();
                b.body.set_position(Vec2::new(pos.x - direction * separation, pos.y));
            }
            if !a.is_static {
                a.body.set_velocity(Vec2::new(vb.x, va.y));
            }
            if !b.is_static {
                b.body.set_velocity(Vec2::new(va.x, vb.y));
            }
        } else {
            let direction = if ra.center().y < rb.center().y { -1.0 } else { 1.0 };
            let separation = if both_dynamic { overlap_y / 2.0 } else { overlap_y };
            if !a.is_static {
                let pos = a.body.position();
                a.body.set_position(Vec2::new(pos.x, pos.y + direction * separation));
            }
            if !b.is_static {
                let pos = b.body.position();
                b.body.set_position(Vec2::new(pos.x, pos.y - direction * separation));
            }
            if !a.is_static {
                a.body.set_velocity(Vec2::new(va.x, vb.y));
            }
            if !b.is_static {
                b.body.set_velocity(Vec2::new(vb.x, va.y));
            }
        }

        Some(0.0)
    }

    /// Circle-AABB: push the circle out along the closest-point normal
    ///
    /// No impulse is applied; the rectangle (often static geometry) is
    /// never touched.
    fn resolve_circle_aabb(circle: &mut ResolveBody<'_>, rect: &mut ResolveBody<'_>) -> Option<f32> {
        if circle.is_static {
            return None;
        }

        let radius = bounding_radius(circle.body.width(), circle.body.height());
        let rect_bounds = rect.body.bounds();
        let center = circle.body.position();
        let closest = rect_bounds.clamp_point(center);
        let delta = center - closest;
        let distance = delta.norm();

        if distance >= radius {
            return None;
        }
        let overlap = radius - distance;

        let push = if distance > 0.0 {
            delta / distance
        } else {
            // Center exactly on the rectangle edge or corner: push along
            // the axis of larger center offset
            let offset = center - rect_bounds.center();
            if offset.x.abs() > offset.y.abs() {
                Vec2::new(offset.x.signum(), 0.0)
            } else {
                Vec2::new(0.0, offset.y.signum())
            }
        };

        circle.body.set_position(center + push * overlap);
        Some(0.0)
    }

    /// Confine a circular body to the world rectangle
    ///
    /// Clamps the center so the bounding circle stays inside and reflects
    /// the velocity component into the world, scaled by restitution.
    pub fn resolve_wall_collision(body: &mut dyn PhysicsBody, world_bounds: &Rect) {
        let radius = bounding_radius(body.width(), body.height());
        let mut position = body.position();
        let mut velocity = body.velocity();
        let restitution = body.restitution();

        if position.x - radius < world_bounds.left() {
            position.x = world_bounds.left() + radius;
            velocity.x = velocity.x.abs() * restitution;
        }
        if position.x + radius > world_bounds.right() {
            position.x = world_bounds.right() - radius;
            velocity.x = -velocity.x.abs() * restitution;
        }
        if position.y - radius < world_bounds.top() {
            position.y = world_bounds.top() + radius;
            velocity.y = velocity.y.abs() * restitution;
        }
        if position.y + radius > world_bounds.bottom() {
            position.y = world_bounds.bottom() - radius;
            velocity.y = -velocity.y.abs() * restitution;
        }

        body.set_position(position);
        body.set_velocity(velocity);
    }

    fn fallback_normal(&mut self) -> Vec2 {
        let angle: f32 = self.rng.gen::<f32>() * TAU;
        Vec2::new(angle.cos(), angle.sin())
    }
}

fn finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::Body;
    use crate::physics::narrow_phase::{detect, BodySnapshot};
    use approx::assert_relative_eq;

    fn context() -> ResolutionContext {
        ResolutionContext::new(&CollisionConfig::default())
    }

    fn resolve_pair(
        ctx: &mut ResolutionContext,
        a: &mut Body,
        a_static: bool,
        b: &mut Body,
        b_static: bool,
    ) -> Option<f32> {
        let contact = detect(&BodySnapshot::capture(a), &BodySnapshot::capture(b))?;
        let mut ra = ResolveBody {
            body: a,
            is_static: a_static,
        };
        let mut rb = ResolveBody {
            body: b,
            is_static: b_static,
        };
        ctx.resolve(&mut ra, &mut rb, &contact)
    }

    #[test]
    fn test_separation_convergence_equal_masses() {
        let mut ctx = context();
        // Radii 10 + 10, centers 15 apart: overlap 5
        let mut a = Body::circle(1, Vec2::new(0.0, 0.0), 10.0, 1.0);
        let mut b = Body::circle(2, Vec2::new(15.0, 0.0), 10.0, 1.0);

        resolve_pair(&mut ctx, &mut a, false, &mut b, false).unwrap();

        let distance = (b.position() - a.position()).norm();
        assert_relative_eq!(distance, 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_head_on_elastic_swap() {
        let mut ctx = context();
        let mut a = Body::circle(1, Vec2::new(0.0, 0.0), 10.0, 1.0)
            .with_velocity(Vec2::new(5.0, 0.0))
            .with_restitution(1.0);
        let mut b = Body::circle(2, Vec2::new(19.0, 0.0), 10.0, 1.0)
            .with_velocity(Vec2::new(-5.0, 0.0))
            .with_restitution(1.0);

        resolve_pair(&mut ctx, &mut a, false, &mut b, false).unwrap();

        assert_relative_eq!(a.velocity().x, -5.0, epsilon = 1e-4);
        assert_relative_eq!(b.velocity().x, 5.0, epsilon = 1e-4);
        let distance = (b.position() - a.position()).norm();
        assert_relative_eq!(distance, 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_momentum_conserved_unequal_masses() {
        let mut ctx = context();
        let mut a = Body::circle(1, Vec2::new(0.0, 0.0), 10.0, 2.0)
            .with_velocity(Vec2::new(4.0, 0.0))
            .with_restitution(1.0);
        let mut b = Body::circle(2, Vec2::new(18.0, 0.0), 10.0, 3.0)
            .with_velocity(Vec2::new(-2.0, 0.0))
            .with_restitution(1.0);

        let before = a.mass() * a.velocity() + b.mass() * b.velocity();
        resolve_pair(&mut ctx, &mut a, false, &mut b, false).unwrap();
        let after = a.mass() * a.velocity() + b.mass() * b.velocity();

        assert_relative_eq!(before.x, after.x, epsilon = 1e-3);
        assert_relative_eq!(before.y, after.y, epsilon = 1e-3);
    }

    #[test]
    fn test_energy_never_injected() {
        for &restitution in &[0.0, 0.3, 0.7, 1.0] {
            let mut ctx = context();
            let mut a = Body::circle(1, Vec2::new(0.0, 0.0), 10.0, 1.5)
                .with_velocity(Vec2::new(6.0, 1.0))
                .with_restitution(restitution);
            let mut b = Body::circle(2, Vec2::new(17.0, 2.0), 10.0, 2.5)
                .with_velocity(Vec2::new(-3.0, 0.5))
                .with_restitution(restitution);

            let energy = |body: &Body| 0.5 * body.mass() * body.velocity().norm_squared();
            let before = energy(&a) + energy(&b);
            resolve_pair(&mut ctx, &mut a, false, &mut b, false).unwrap();
            let after = energy(&a) + energy(&b);

            assert!(
                after <= before + 1e-3,
                "restitution {restitution}: energy grew from {before} to {after}"
            );
        }
    }

    #[test]
    fn test_static_body_never_moves() {
        let mut ctx = context();
        let mut wall = Body::circle(1, Vec2::new(0.0, 0.0), 10.0, 1.0);
        let mut ball = Body::circle(2, Vec2::new(15.0, 0.0), 10.0, 1.0)
            .with_velocity(Vec2::new(-5.0, 0.0));

        resolve_pair(&mut ctx, &mut wall, true, &mut ball, false).unwrap();

        assert_eq!(wall.position(), Vec2::new(0.0, 0.0));
        assert_eq!(wall.velocity(), Vec2::zeros());
        // The dynamic body takes the full separation
        let distance = (ball.position() - wall.position()).norm();
        assert_relative_eq!(distance, 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_both_static_skipped() {
        let mut ctx = context();
        let mut a = Body::circle(1, Vec2::new(0.0, 0.0), 10.0, 1.0);
        let mut b = Body::circle(2, Vec2::new(5.0, 0.0), 10.0, 1.0);
        assert!(resolve_pair(&mut ctx, &mut a, true, &mut b, true).is_none());
        assert_eq!(a.position(), Vec2::new(0.0, 0.0));
        assert_eq!(b.position(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_coincident_centers_separate() {
        let mut ctx = context();
        let mut a = Body::circle(1, Vec2::new(50.0, 50.0), 10.0, 1.0);
        let mut b = Body::circle(2, Vec2::new(50.0, 50.0), 10.0, 1.0);

        resolve_pair(&mut ctx, &mut a, false, &mut b, false).unwrap();

        let distance = (b.position() - a.position()).norm();
        assert!(distance > 0.0, "coincident circles must be pushed apart");
        assert_relative_eq!(distance, 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_separating_bodies_skip_impulse() {
        let mut ctx = context();
        let mut a = Body::circle(1, Vec2::new(0.0, 0.0), 10.0, 1.0)
            .with_velocity(Vec2::new(-3.0, 0.0));
        let mut b = Body::circle(2, Vec2::new(15.0, 0.0), 10.0, 1.0)
            .with_velocity(Vec2::new(3.0, 0.0));

        let impulse = resolve_pair(&mut ctx, &mut a, false, &mut b, false).unwrap();
        assert_relative_eq!(impulse, 0.0);
        // Velocities untouched, only positions separated
        assert_relative_eq!(a.velocity().x, -3.0);
        assert_relative_eq!(b.velocity().x, 3.0);
    }

    #[test]
    fn test_rect_rect_axis_push_and_velocity_swap() {
        let mut ctx = context();
        let mut a = Body::rect(1, Vec2::new(0.0, 0.0), 20.0, 40.0, 1.0)
            .with_velocity(Vec2::new(2.0, 0.0));
        let mut b = Body::rect(2, Vec2::new(18.0, 0.0), 20.0, 40.0, 1.0)
            .with_velocity(Vec2::new(-2.0, 0.0));

        resolve_pair(&mut ctx, &mut a, false, &mut b, false).unwrap();

        // Pushed apart along x (overlap 2, half each)
        assert_relative_eq!(a.position().x, -1.0, epsilon = 1e-4);
        assert_relative_eq!(b.position().x, 19.0, epsilon = 1e-4);
        // X velocity components exchanged
        assert_relative_eq!(a.velocity().x, -2.0);
        assert_relative_eq!(b.velocity().x, 2.0);
    }

    #[test]
    fn test_rect_rect_static_side_untouched() {
        let mut ctx = context();
        let mut wall = Body::rect(1, Vec2::new(0.0, 0.0), 20.0, 40.0, 1.0);
        let mut mover = Body::rect(2, Vec2::new(18.0, 0.0), 20.0, 40.0, 1.0)
            .with_velocity(Vec2::new(-2.0, 0.0));

        resolve_pair(&mut ctx, &mut wall, true, &mut mover, false).unwrap();

        assert_eq!(wall.position(), Vec2::new(0.0, 0.0));
        assert_eq!(wall.velocity(), Vec2::zeros());
        // Dynamic body takes the full 2-unit separation
        assert_relative_eq!(mover.position().x, 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_circle_pushed_out_of_rect() {
        let mut ctx = context();
        let mut ball = Body::circle(1, Vec2::new(0.0, 0.0), 10.0, 1.0);
        let mut block = Body::rect(2, Vec2::new(28.0, 0.0), 40.0, 12.0, 1.0);
        let before_block = block.position();

        resolve_pair(&mut ctx, &mut ball, false, &mut block, true).unwrap();

        // Closest point was at x=8, overlap 2: circle pushed to x=-2
        assert_relative_eq!(ball.position().x, -2.0, epsilon = 1e-4);
        assert_eq!(block.position(), before_block);
    }

    #[test]
    fn test_wall_collision_reflects_with_restitution() {
        let world = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut body = Body::circle(1, Vec2::new(-5.0, 50.0), 10.0, 1.0)
            .with_velocity(Vec2::new(-4.0, 0.0))
            .with_restitution(0.5);

        ResolutionContext::resolve_wall_collision(&mut body, &world);

        assert_relative_eq!(body.position().x, 10.0);
        assert_relative_eq!(body.velocity().x, 2.0);
    }
}
