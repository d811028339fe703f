use rand::Rng;

use crate::vector::{Quaternion, Vector3D};

/// Stable identity of a boid for the lifetime of the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoidId(pub u64);

/// What the renderer needs to draw one boid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoidPose {
    pub id: BoidId,
    pub position: Vector3D,
    pub orientation: Quaternion,
}

/// A single boid entity
#[derive(Debug, Clone)]
pub struct Boid {
    pub id: BoidId,
    pub position: Vector3D,
    /// Unit heading; speed is constant across boids and frames.
    pub velocity: Vector3D,
    /// Next frame's velocity, written by the evaluation pass.
    pub pending_velocity: Vector3D,
    pub orientation: Quaternion,
}

impl Boid {
    pub fn new(id: BoidId, position: Vector3D, velocity: Vector3D) -> Self {
        Self {
            id,
            position,
            velocity,
            pending_velocity: Vector3D::zero(),
            orientation: Quaternion::look_along(velocity),
        }
    }

    /// Spawn inside the box `[-bounds, bounds]` with a uniformly random unit heading.
    pub fn random<R: Rng + ?Sized>(id: BoidId, bounds: Vector3D, rng: &mut R) -> Self {
        let position = random_point_in_box(bounds, rng);
        let velocity = random_unit_vector(rng);
        Self::new(id, position, velocity)
    }

    /// Advance the position along the current heading, face it, then commit the
    /// pending velocity.
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.orientation = Quaternion::look_along(self.velocity);
        // A zero pending velocity (every steering term cancelled) keeps the old heading.
        if !self.pending_velocity.is_zero() {
            self.velocity = self.pending_velocity;
        }
    }

    pub fn pose(&self) -> BoidPose {
        BoidPose {
            id: self.id,
            position: self.position,
            orientation: self.orientation,
        }
    }
}

pub(crate) fn random_point_in_box<R: Rng + ?Sized>(half_extents: Vector3D, rng: &mut R) -> Vector3D {
    Vector3D::new(
        symmetric(half_extents.x, rng),
        symmetric(half_extents.y, rng),
        symmetric(half_extents.z, rng),
    )
}

fn symmetric<R: Rng + ?Sized>(extent: f32, rng: &mut R) -> f32 {
    if extent > 0.0 {
        rng.gen_range(-extent..extent)
    } else {
        0.0
    }
}

/// Uniform direction on the unit sphere by rejection sampling the unit ball
pub(crate) fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vector3D {
    loop {
        let candidate = Vector3D::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let len_sq = candidate.magnitude_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return candidate.normalize();
        }
    }
}
