#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Largest population a control surface may ask for; the neighbour scan is
/// quadratic, so interactive frame rates end around here.
pub const MAX_BOIDS: usize = 1000;
pub const MAX_OBSTACLES: usize = 64;
pub const MAX_TIME_SCALE: f32 = 3.0;

/// Represents a 2D pointer position in normalized device coordinates (-1..1)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pointer update sent by the control surface each time the pointer moves
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointerUpdate {
    /// Optional pointer position (None means released: no predator)
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Orientation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Power (acceleration magnitude) and range (interaction radius) of one rule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleSettings {
    pub power: f32,
    pub range: f32,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            power: 1.0,
            range: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CenterSettings {
    pub power: f32,
}

impl Default for CenterSettings {
    fn default() -> Self {
        Self { power: 0.05 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObstacleSettings {
    pub count: usize,
    pub radius: f32,
    pub spread: f32,
}

impl Default for ObstacleSettings {
    fn default() -> Self {
        Self {
            count: 3,
            radius: 0.3,
            spread: 0.6,
        }
    }
}

/// Which boids go first when the population shrinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RemovalOrder {
    #[default]
    Newest,
    Oldest,
}

/// Boid simulation configuration as edited by the control surface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationSettings {
    pub time_scale: f32,
    pub boid_count: usize,
    /// Half extents of the bounding volume.
    pub bounds: Vec3,
    pub obstacles: ObstacleSettings,
    pub separation: RuleSettings,
    pub alignment: RuleSettings,
    pub cohesion: RuleSettings,
    pub collision: RuleSettings,
    pub predator: RuleSettings,
    pub center: CenterSettings,
    /// Half-angle of the alignment view cone in degrees; `null` disables it.
    pub alignment_view_angle: Option<f32>,
    pub removal: RemovalOrder,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            boid_count: 10,
            bounds: Vec3::splat(3.0),
            obstacles: ObstacleSettings::default(),
            separation: RuleSettings::default(),
            alignment: RuleSettings::default(),
            cohesion: RuleSettings::default(),
            collision: RuleSettings::default(),
            predator: RuleSettings::default(),
            center: CenterSettings::default(),
            alignment_view_angle: Some(30.0),
            removal: RemovalOrder::default(),
        }
    }
}

/// Why a settings record was refused
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    TooMany {
        field: &'static str,
        value: usize,
        max: usize,
    },
}

impl core::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SettingsError::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{} = {} is outside [{}, {}]", field, value, min, max),
            SettingsError::TooMany { field, value, max } => {
                write!(f, "{} = {} exceeds the maximum of {}", field, value, max)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SettingsError {}

fn check(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), SettingsError> {
    // NaN fails both comparisons
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Ranges are strictly positive: a zero range divides by zero in the rules.
const MIN_RANGE: f32 = 1e-3;
const MAX_RULE_VALUE: f32 = 100.0;

impl SimulationSettings {
    /// Constrain input ranges before a record reaches the simulation.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check("time_scale", self.time_scale, 0.0, MAX_TIME_SCALE)?;
        if self.boid_count > MAX_BOIDS {
            return Err(SettingsError::TooMany {
                field: "boid_count",
                value: self.boid_count,
                max: MAX_BOIDS,
            });
        }
        if self.obstacles.count > MAX_OBSTACLES {
            return Err(SettingsError::TooMany {
                field: "obstacles.count",
                value: self.obstacles.count,
                max: MAX_OBSTACLES,
            });
        }
        check("bounds.x", self.bounds.x, MIN_RANGE, MAX_RULE_VALUE)?;
        check("bounds.y", self.bounds.y, MIN_RANGE, MAX_RULE_VALUE)?;
        check("bounds.z", self.bounds.z, MIN_RANGE, MAX_RULE_VALUE)?;
        check("obstacles.radius", self.obstacles.radius, MIN_RANGE, MAX_RULE_VALUE)?;
        check("obstacles.spread", self.obstacles.spread, 0.0, 1.0)?;

        for (name, rule) in [
            ("separation", &self.separation),
            ("alignment", &self.alignment),
            ("cohesion", &self.cohesion),
            ("collision", &self.collision),
            ("predator", &self.predator),
        ] {
            check(name, rule.power, 0.0, MAX_RULE_VALUE)?;
            check(name, rule.range, MIN_RANGE, MAX_RULE_VALUE)?;
        }
        check("center", self.center.power, 0.0, MAX_RULE_VALUE)?;
        if let Some(angle) = self.alignment_view_angle {
            check("alignment_view_angle", angle, 0.0, 180.0)?;
        }
        Ok(())
    }
}

/// Settings update message sent from the control surface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsUpdate {
    pub settings: SimulationSettings,
}

/// Everything the control surface can send, one JSON object per line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    Settings(SettingsUpdate),
    Pointer(PointerUpdate),
    ObstacleVisibility { index: usize, visible: bool },
    BoundsVisibility { visible: bool },
    Pause,
    Resume,
    Shutdown,
}

#[cfg(feature = "std")]
impl ControlMessage {
    /// Parse one line of the newline-delimited control stream.
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Pose of one boid for the renderer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoidPose {
    pub id: u64,
    pub position: Vec3,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ObstaclePose {
    pub index: usize,
    pub center: Vec3,
    pub radius: f32,
    pub visible: bool,
}

/// Every pose the renderer needs for one frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub delta_time: f32,
    /// Half extents of the bounding box
    pub bounds: Vec3,
    pub bounds_visible: bool,
    pub boids: Vec<BoidPose>,
    pub obstacles: Vec<ObstaclePose>,
}

#[cfg(feature = "std")]
impl FrameSnapshot {
    /// Single-line JSON encoding, for newline-delimited output streams.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Periodic status report from the simulation host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub frame: u64,
    pub boid_count: usize,
    pub obstacle_count: usize,
    pub fps: u32,
    pub predator_active: bool,
    pub paused: bool,
}
