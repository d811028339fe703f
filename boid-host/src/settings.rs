//! Conversions between the wire types and the simulation core.

use std::path::Path;

use anyhow::{Context, Result};
use boid_core::{
    CenterParams, ObstacleLayout, Quaternion, RemovalPolicy, RuleParams, SimulationConfig,
    Vector3D,
};
use boid_shared::{
    BoidPose, ObstaclePose, Orientation, RemovalOrder, RuleSettings, SimulationSettings, Vec3,
};

/// Read and validate a settings file. Missing fields take their defaults.
pub fn load_settings(path: &Path) -> Result<SimulationSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let settings: SimulationSettings = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
    checked_config(&settings)
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    Ok(settings)
}

/// Convert `settings` after checking them against the wire limits and then
/// against the core's own config rules.
pub fn checked_config(settings: &SimulationSettings) -> Result<SimulationConfig> {
    settings.validate().context("Settings out of range")?;
    let config = to_config(settings);
    config.validate().context("Rejected by the simulation")?;
    Ok(config)
}

fn rule(settings: &RuleSettings) -> RuleParams {
    RuleParams::new(settings.power, settings.range)
}

pub fn to_vector(v: &Vec3) -> Vector3D {
    Vector3D::new(v.x, v.y, v.z)
}

pub fn to_vec3(v: &Vector3D) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_orientation(q: &Quaternion) -> Orientation {
    Orientation {
        x: q.x,
        y: q.y,
        z: q.z,
        w: q.w,
    }
}

/// The snapshot handed to the simulation every frame
pub fn to_config(settings: &SimulationSettings) -> SimulationConfig {
    SimulationConfig {
        time_scale: settings.time_scale,
        boid_count: settings.boid_count,
        bounds: to_vector(&settings.bounds),
        obstacles: ObstacleLayout {
            count: settings.obstacles.count,
            radius: settings.obstacles.radius,
            spread: settings.obstacles.spread,
        },
        separation: rule(&settings.separation),
        alignment: rule(&settings.alignment),
        cohesion: rule(&settings.cohesion),
        collision: rule(&settings.collision),
        predator: rule(&settings.predator),
        center: CenterParams {
            power: settings.center.power,
        },
        alignment_view_angle: settings.alignment_view_angle.map(f32::to_radians),
        removal: match settings.removal {
            RemovalOrder::Newest => RemovalPolicy::Newest,
            RemovalOrder::Oldest => RemovalPolicy::Oldest,
        },
    }
}

/// Parse `x,y,z` into a point, for command-line arguments.
pub fn parse_point(text: &str) -> std::result::Result<Vector3D, String> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z but got '{}'", text));
    }
    let mut values = [0.0f32; 3];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part
            .parse()
            .map_err(|e| format!("invalid coordinate '{}': {}", part, e))?;
        if !value.is_finite() {
            return Err(format!("coordinate '{}' is not finite", part));
        }
    }
    Ok(Vector3D::new(values[0], values[1], values[2]))
}

pub fn boid_pose(pose: &boid_core::BoidPose) -> BoidPose {
    BoidPose {
        id: pose.id.0,
        position: to_vec3(&pose.position),
        orientation: to_orientation(&pose.orientation),
    }
}

pub fn obstacle_pose(pose: &boid_core::ObstaclePose) -> ObstaclePose {
    ObstaclePose {
        index: pose.index,
        center: to_vec3(&pose.center),
        radius: pose.radius,
        visible: pose.visible,
    }
}
