//! Plain-data configuration read by the driver every frame.

use crate::vector::Vector3D;

/// Acceleration magnitude and interaction radius of one steering rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleParams {
    pub power: f32,
    pub range: f32,
}

impl RuleParams {
    pub const fn new(power: f32, range: f32) -> Self {
        Self { power, range }
    }
}

impl Default for RuleParams {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// The centering bias has no range; it always pulls toward the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterParams {
    pub power: f32,
}

impl Default for CenterParams {
    fn default() -> Self {
        Self { power: 0.05 }
    }
}

/// Which end of the pool loses agents when the target count drops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    #[default]
    Newest,
    Oldest,
}

/// Spherical obstacle placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleLayout {
    pub count: usize,
    pub radius: f32,
    /// Fraction of the bounding half extents that sphere centers are drawn from.
    pub spread: f32,
}

impl Default for ObstacleLayout {
    fn default() -> Self {
        Self {
            count: 3,
            radius: 0.3,
            spread: 0.6,
        }
    }
}

/// Configuration for the boid simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub time_scale: f32,
    pub boid_count: usize,
    pub bounds: Vector3D,
    pub obstacles: ObstacleLayout,
    pub separation: RuleParams,
    pub alignment: RuleParams,
    pub cohesion: RuleParams,
    pub collision: RuleParams,
    pub predator: RuleParams,
    pub center: CenterParams,
    /// Half-angle of the forward cone alignment neighbours must sit in.
    /// `None` disables the gate.
    pub alignment_view_angle: Option<f32>,
    pub removal: RemovalPolicy,
}

pub const DEFAULT_VIEW_ANGLE: f32 = core::f32::consts::PI / 6.0;

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            boid_count: 10,
            bounds: Vector3D::splat(3.0),
            obstacles: ObstacleLayout::default(),
            separation: RuleParams::default(),
            alignment: RuleParams::default(),
            cohesion: RuleParams::default(),
            collision: RuleParams::default(),
            predator: RuleParams::default(),
            center: CenterParams::default(),
            alignment_view_angle: Some(DEFAULT_VIEW_ANGLE),
            removal: RemovalPolicy::default(),
        }
    }
}

/// Reasons a configuration is rejected by [`SimulationConfig::validate`]
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonFinite(&'static str),
    NegativePower(&'static str),
    NonPositiveRange(&'static str),
    NonPositiveBounds,
    SpreadOutOfRange(f32),
    NegativeTimeScale(f32),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::NonFinite(field) => write!(f, "{} must be finite", field),
            ConfigError::NegativePower(rule) => write!(f, "{} power must not be negative", rule),
            ConfigError::NonPositiveRange(rule) => write!(f, "{} range must be positive", rule),
            ConfigError::NonPositiveBounds => {
                write!(f, "bounding half extents must be positive on every axis")
            }
            ConfigError::SpreadOutOfRange(spread) => {
                write!(f, "obstacle spread {} is outside [0, 1]", spread)
            }
            ConfigError::NegativeTimeScale(scale) => {
                write!(f, "time scale {} must not be negative", scale)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

impl SimulationConfig {
    /// Rules that carry a range, by name
    pub fn ranged_rules(&self) -> [(&'static str, RuleParams); 5] {
        [
            ("separation", self.separation),
            ("alignment", self.alignment),
            ("cohesion", self.cohesion),
            ("collision", self.collision),
            ("predator", self.predator),
        ]
    }

    /// Check the ranges a control surface should enforce.
    ///
    /// The simulation itself never calls this; a zero range simply yields
    /// non-finite steering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_scale.is_finite() {
            return Err(ConfigError::NonFinite("time scale"));
        }
        if self.time_scale < 0.0 {
            return Err(ConfigError::NegativeTimeScale(self.time_scale));
        }
        if !self.bounds.is_finite() {
            return Err(ConfigError::NonFinite("bounds"));
        }
        if self.bounds.x <= 0.0 || self.bounds.y <= 0.0 || self.bounds.z <= 0.0 {
            return Err(ConfigError::NonPositiveBounds);
        }
        for (name, rule) in self.ranged_rules() {
            if !rule.power.is_finite() || !rule.range.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
            if rule.power < 0.0 {
                return Err(ConfigError::NegativePower(name));
            }
            if rule.range <= 0.0 {
                return Err(ConfigError::NonPositiveRange(name));
            }
        }
        if !self.center.power.is_finite() {
            return Err(ConfigError::NonFinite("center"));
        }
        if self.center.power < 0.0 {
            return Err(ConfigError::NegativePower("center"));
        }
        if !(0.0..=1.0).contains(&self.obstacles.spread) {
            return Err(ConfigError::SpreadOutOfRange(self.obstacles.spread));
        }
        if !self.obstacles.radius.is_finite() || self.obstacles.radius <= 0.0 {
            return Err(ConfigError::NonPositiveRange("obstacle radius"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.boid_count, 10);
        assert_eq!(config.bounds, Vector3D::splat(3.0));
        assert_eq!(config.removal, RemovalPolicy::Newest);
    }

    #[test]
    fn test_zero_range_rejected() {
        let mut config = SimulationConfig::default();
        config.cohesion.range = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveRange("cohesion"))
        );
    }

    #[test]
    fn test_negative_power_rejected() {
        let mut config = SimulationConfig::default();
        config.predator.power = -1.0;
        assert_eq!(config.validate(), Err(ConfigError::NegativePower("predator")));
    }

    #[test]
    fn test_bounds_and_spread_rejected() {
        let mut config = SimulationConfig::default();
        config.bounds.y = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveBounds));

        let mut config = SimulationConfig::default();
        config.obstacles.spread = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::SpreadOutOfRange(1.5)));
    }
}
