//! The agent pool and its resize protocol.

use alloc::collections::VecDeque;

use rand::Rng;

use crate::boid::{Boid, BoidId, BoidPose};
use crate::config::RemovalPolicy;
use crate::vector::Vector3D;

/// Outcome of one [`Flock::set_target_count`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resize {
    pub spawned: usize,
    pub removed: usize,
}

/// Every live boid, oldest at the front.
///
/// Must not be resized while an evaluation pass holds a snapshot of it.
#[derive(Debug, Clone, Default)]
pub struct Flock {
    boids: VecDeque<Boid>,
    next_id: u64,
}

impl Flock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count<R: Rng + ?Sized>(count: usize, bounds: Vector3D, rng: &mut R) -> Self {
        let mut flock = Self::new();
        flock.set_target_count(count, bounds, RemovalPolicy::default(), rng);
        flock
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Boid> + '_ {
        self.boids.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Boid> + '_ {
        self.boids.iter_mut()
    }

    pub fn get(&self, id: BoidId) -> Option<&Boid> {
        self.boids.iter().find(|boid| boid.id == id)
    }

    /// Contiguous view used by the evaluation pass
    pub fn as_slice(&mut self) -> &[Boid] {
        self.boids.make_contiguous()
    }

    pub fn poses(&self) -> impl Iterator<Item = BoidPose> + '_ {
        self.boids.iter().map(Boid::pose)
    }

    /// Insert a boid built elsewhere, assigning it a fresh id.
    pub fn add_boid(&mut self, position: Vector3D, velocity: Vector3D) -> BoidId {
        let id = self.allocate_id();
        self.boids.push_back(Boid::new(id, position, velocity));
        id
    }

    pub fn spawn<R: Rng + ?Sized>(&mut self, bounds: Vector3D, rng: &mut R) -> BoidId {
        let id = self.allocate_id();
        self.boids.push_back(Boid::random(id, bounds, rng));
        id
    }

    /// Remove one boid from the end `policy` names, in O(1).
    pub fn remove(&mut self, policy: RemovalPolicy) -> Option<Boid> {
        match policy {
            RemovalPolicy::Newest => self.boids.pop_back(),
            RemovalPolicy::Oldest => self.boids.pop_front(),
        }
    }

    /// Spawn or remove boids until exactly `count` are live.
    pub fn set_target_count<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        bounds: Vector3D,
        policy: RemovalPolicy,
        rng: &mut R,
    ) -> Resize {
        let mut resize = Resize::default();

        while self.boids.len() < count {
            self.spawn(bounds, rng);
            resize.spawned += 1;
        }
        while self.boids.len() > count {
            if self.remove(policy).is_none() {
                break;
            }
            resize.removed += 1;
        }

        if resize != Resize::default() {
            log::debug!(
                "flock resized to {} (+{} -{}, {:?} removed first)",
                self.boids.len(),
                resize.spawned,
                resize.removed,
                policy
            );
        }
        resize
    }

    fn allocate_id(&mut self) -> BoidId {
        let id = BoidId(self.next_id);
        self.next_id += 1;
        id
    }
}
