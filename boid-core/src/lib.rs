#![cfg_attr(not(feature = "std"), no_std)]

//! Flocking simulation core.
//!
//! One frame is a read-only evaluation pass over a snapshot of the flock
//! followed by an integration pass that commits every boid's new heading.

extern crate alloc;

pub mod behavior;
pub mod boid;
pub mod clock;
pub mod collider;
pub mod config;
pub mod flock;
pub mod predator;
pub mod simulation;
pub mod vector;

pub use behavior::{evaluate, Neighborhood, Steering};
pub use boid::{Boid, BoidId, BoidPose};
#[cfg(feature = "std")]
pub use clock::SystemClock;
pub use clock::{Clock, FixedClock};
pub use collider::{BoxCollider, ColliderRegistry, Hit, ObstaclePose, Raycast, SphereCollider};
pub use config::{
    CenterParams, ConfigError, ObstacleLayout, RemovalPolicy, RuleParams, SimulationConfig,
};
pub use flock::{Flock, Resize};
pub use predator::{CameraPose, PointerInput, PredatorTarget};
pub use simulation::{FrameStats, Simulation};
pub use vector::{Axis, Quaternion, Ray, Vector3D};
