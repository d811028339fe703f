//! Steering rules.
//!
//! Every function here reads a frame snapshot and returns an acceleration; none
//! of them mutate a boid. The driver collects the results for the whole flock
//! before any boid is written, so the outcome does not depend on scan order.

use crate::boid::Boid;
use crate::collider::Raycast;
use crate::config::{CenterParams, RuleParams, SimulationConfig};
use crate::vector::{sign, Axis, Ray, Vector3D};

/// Sums collected in the single pairwise scan over the other boids
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Neighborhood {
    /// Sum of `neighbour - boid` offsets inside the separation range, each
    /// scaled by the linear falloff `(range - d) / range`.
    pub separation: Vector3D,
    pub separation_count: usize,
    /// Sum of `neighbour.velocity - boid.velocity` over visible neighbours.
    pub alignment: Vector3D,
    pub alignment_count: usize,
    pub cohesion_sum: Vector3D,
    pub cohesion_count: usize,
}

impl Neighborhood {
    /// Scan every other boid in `boids` exactly once.
    pub fn gather<'a, I>(boid: &Boid, boids: I, config: &SimulationConfig) -> Self
    where
        I: IntoIterator<Item = &'a Boid>,
    {
        let mut neighborhood = Self::default();
        for other in boids {
            if other.id != boid.id {
                neighborhood.accumulate(boid, other, config);
            }
        }
        neighborhood
    }

    pub fn accumulate(&mut self, boid: &Boid, other: &Boid, config: &SimulationConfig) {
        let offset = other.position - boid.position;
        let distance = offset.magnitude();

        let range = config.separation.range;
        if distance < range {
            self.separation += offset * ((range - distance) / range);
            self.separation_count += 1;
        }

        if distance < config.alignment.range && in_view(boid, &offset, config.alignment_view_angle)
        {
            self.alignment += other.velocity - boid.velocity;
            self.alignment_count += 1;
        }

        if distance < config.cohesion.range {
            self.cohesion_sum += other.position;
            self.cohesion_count += 1;
        }
    }
}

fn in_view(boid: &Boid, offset: &Vector3D, view_angle: Option<f32>) -> bool {
    match view_angle {
        Some(angle) => offset.angle_to(&boid.velocity) < angle,
        None => true,
    }
}

/// Push away from close neighbours, with the same magnitude however many there are.
pub fn separation(neighborhood: &Neighborhood, params: &RuleParams, dt: f32) -> Vector3D {
    neighborhood.separation.normalize() * (-dt * params.power)
}

/// Steer toward the heading of visible neighbours.
pub fn alignment(neighborhood: &Neighborhood, params: &RuleParams, dt: f32) -> Vector3D {
    if neighborhood.alignment_count == 0 {
        return Vector3D::zero();
    }
    neighborhood.alignment.normalize() * (dt * params.power)
}

/// Steer toward the neighbour centroid, diluted by group size.
pub fn cohesion(boid: &Boid, neighborhood: &Neighborhood, params: &RuleParams, dt: f32) -> Vector3D {
    if neighborhood.cohesion_count == 0 {
        return Vector3D::zero();
    }
    let count = neighborhood.cohesion_count as f32;
    let center = neighborhood.cohesion_sum / count;
    (center - boid.position).normalize() * (dt * params.power / count)
}

/// Curve away from whatever the boid is heading into.
pub fn avoid_obstacles<C>(boid: &Boid, colliders: &C, params: &RuleParams) -> Vector3D
where
    C: Raycast + ?Sized,
{
    let ray = Ray::new(boid.position, boid.velocity);
    match colliders.raycast(&ray) {
        Some(hit) if hit.distance < params.range => {
            let strength = params.power * (params.range - hit.distance) / hit.distance;
            (hit.normal + boid.velocity).normalize() * strength
        }
        _ => Vector3D::zero(),
    }
}

/// Flee the pointer ray while it is engaged and within range.
pub fn avoid_predator(boid: &Boid, predator: Option<&Ray>, params: &RuleParams) -> Vector3D {
    let Some(ray) = predator else {
        return Vector3D::zero();
    };
    let closest = ray.closest_point_to_point(&boid.position);
    let mouse_distance = params.range - closest.distance(&boid.position);
    if mouse_distance <= 0.0 {
        return Vector3D::zero();
    }
    (closest - boid.position).normalize() * (-params.power * mouse_distance / params.range)
}

/// Constant pull toward the world origin.
pub fn center(boid: &Boid, params: &CenterParams) -> Vector3D {
    (-boid.position).normalize() * params.power
}

/// Mirror `pending` on every axis where the boid is past the boundary and still
/// moving outward.
pub fn reflect_at_bounds(boid: &Boid, pending: Vector3D, bounds: &Vector3D) -> Vector3D {
    let mut reflected = pending;
    for axis in Axis::ALL {
        if boid.position.get(axis) * sign(boid.velocity.get(axis)) > bounds.get(axis) {
            reflected.set(axis, -pending.get(axis));
        }
    }
    reflected
}

/// Every steering contribution for one boid in one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Steering {
    pub separation: Vector3D,
    pub alignment: Vector3D,
    pub cohesion: Vector3D,
    pub collision: Vector3D,
    pub predator: Vector3D,
    pub center: Vector3D,
}

impl Steering {
    pub fn compute<'a, I, C>(
        boid: &Boid,
        boids: I,
        colliders: &C,
        predator: Option<&Ray>,
        config: &SimulationConfig,
        dt: f32,
    ) -> Self
    where
        I: IntoIterator<Item = &'a Boid>,
        C: Raycast + ?Sized,
    {
        let neighborhood = Neighborhood::gather(boid, boids, config);
        Self {
            separation: separation(&neighborhood, &config.separation, dt),
            alignment: alignment(&neighborhood, &config.alignment, dt),
            cohesion: cohesion(boid, &neighborhood, &config.cohesion, dt),
            collision: avoid_obstacles(boid, colliders, &config.collision),
            predator: avoid_predator(boid, predator, &config.predator),
            center: center(boid, &config.center),
        }
    }

    pub fn total(&self) -> Vector3D {
        self.separation + self.alignment + self.cohesion + self.collision + self.predator + self.center
    }
}

/// Next-frame velocity of `boid` given the current snapshot of the flock.
///
/// The accumulation starts from the boid's current velocity, never from a
/// previous `pending_velocity`, and the result is unit length (or zero if
/// every term cancelled exactly).
pub fn evaluate<'a, I, C>(
    boid: &Boid,
    boids: I,
    colliders: &C,
    predator: Option<&Ray>,
    config: &SimulationConfig,
    dt: f32,
) -> Vector3D
where
    I: IntoIterator<Item = &'a Boid>,
    C: Raycast + ?Sized,
{
    let steering = Steering::compute(boid, boids, colliders, predator, config, dt);
    let pending = (boid.velocity + steering.total()).normalize();
    reflect_at_bounds(boid, pending, &config.bounds)
}
