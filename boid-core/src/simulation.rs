//! The per-frame driver: reconcile with the config, evaluate, integrate.

use alloc::vec::Vec;

use rand::Rng;

use crate::behavior;
use crate::boid::BoidPose;
use crate::clock::scaled_delta;
use crate::collider::{ColliderRegistry, ObstaclePose};
use crate::config::SimulationConfig;
use crate::flock::{Flock, Resize};
use crate::predator::PredatorTarget;
use crate::vector::Vector3D;

/// What happened in one call to [`Simulation::step`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub frame: u64,
    pub delta_time: f32,
    pub boid_count: usize,
    pub obstacle_count: usize,
    pub resize: Resize,
    pub predator_engaged: bool,
    /// No evaluation or integration ran because the delta time was zero.
    pub frozen: bool,
}

/// Owns every piece of mutable simulation state.
///
/// The configuration is not stored: each frame receives the current snapshot,
/// so edits made between frames are picked up without any cache to invalidate.
pub struct Simulation<R> {
    flock: Flock,
    colliders: ColliderRegistry,
    rng: R,
    active: bool,
    frame: u64,
    pending: Vec<Vector3D>,
}

impl<R: Rng> Simulation<R> {
    pub fn new(config: &SimulationConfig, rng: R) -> Self {
        let mut simulation = Self {
            flock: Flock::new(),
            colliders: ColliderRegistry::new(config.bounds),
            rng,
            active: true,
            frame: 0,
            pending: Vec::new(),
        };
        simulation.sync(config);
        log::info!(
            "simulation ready with {} boids and {} obstacles",
            simulation.flock.len(),
            simulation.colliders.obstacle_count()
        );
        simulation
    }

    pub fn flock(&self) -> &Flock {
        &self.flock
    }

    /// Direct pool access for hosts that place boids themselves. Only call
    /// between frames.
    pub fn flock_mut(&mut self) -> &mut Flock {
        &mut self.flock
    }

    pub fn colliders(&self) -> &ColliderRegistry {
        &self.colliders
    }

    pub fn colliders_mut(&mut self) -> &mut ColliderRegistry {
        &mut self.colliders
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Pause or resume. Pausing freezes positions and headings; nothing is reset.
    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            log::info!("simulation {}", if active { "resumed" } else { "paused" });
        }
        self.active = active;
    }

    /// Bring the pool and the colliders in line with `config`.
    pub fn sync(&mut self, config: &SimulationConfig) -> Resize {
        self.colliders.set_bounds(config.bounds);
        self.colliders.resize_obstacles(&config.obstacles, &mut self.rng);
        self.flock.set_target_count(
            config.boid_count,
            config.bounds,
            config.removal,
            &mut self.rng,
        )
    }

    /// Run one frame with `elapsed` seconds of wall time since the previous one.
    pub fn step(
        &mut self,
        config: &SimulationConfig,
        elapsed: f32,
        predator: &PredatorTarget,
    ) -> FrameStats {
        let resize = self.sync(config);
        let delta_time = scaled_delta(elapsed, config.time_scale, self.active);
        self.frame += 1;

        let mut stats = FrameStats {
            frame: self.frame,
            delta_time,
            boid_count: self.flock.len(),
            obstacle_count: self.colliders.obstacle_count(),
            resize,
            predator_engaged: predator.is_engaged(),
            frozen: delta_time <= 0.0,
        };
        if stats.frozen {
            return stats;
        }

        self.evaluate(config, predator, delta_time);
        self.integrate(delta_time);

        stats.boid_count = self.flock.len();
        log::trace!(
            "frame {} dt={:.4} boids={}",
            stats.frame,
            delta_time,
            stats.boid_count
        );
        stats
    }

    /// Read-only pass: every pending velocity is computed from the same snapshot
    /// before any boid is written.
    fn evaluate(&mut self, config: &SimulationConfig, predator: &PredatorTarget, dt: f32) {
        let boids = self.flock.as_slice();
        let colliders = &self.colliders;

        self.pending.clear();
        self.pending.extend(boids.iter().map(|boid| {
            behavior::evaluate(boid, boids, colliders, predator.ray(), config, dt)
        }));

        for (boid, pending) in self.flock.iter_mut().zip(self.pending.drain(..)) {
            boid.pending_velocity = pending;
        }
    }

    fn integrate(&mut self, dt: f32) {
        for boid in self.flock.iter_mut() {
            boid.integrate(dt);
        }
    }

    pub fn boid_poses(&self) -> impl Iterator<Item = BoidPose> + '_ {
        self.flock.poses()
    }

    pub fn obstacle_poses(&self) -> impl Iterator<Item = ObstaclePose> + '_ {
        self.colliders.obstacle_poses()
    }
}
