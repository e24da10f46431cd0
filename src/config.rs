//! Physics and engine configuration
//!
//! Fixed for the lifetime of a bridge: only gravity can change at runtime.
//! Loadable from JSON; missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::PhysicsError;

/// Material applied to every fixture the bridge creates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDef {
    pub density: f32,
    /// Conventionally in [0, 1], not enforced
    pub friction: f32,
    /// Conventionally in [0, 1], not enforced
    pub restitution: f32,
}

impl Default for MaterialDef {
    fn default() -> Self {
        Self {
            density: DEFAULT_DENSITY,
            friction: DEFAULT_FRICTION,
            restitution: DEFAULT_RESTITUTION,
        }
    }
}

/// Physics bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Vertical gravity (stored on the world, not applied by the integrator)
    pub gravity: f32,
    /// Seconds advanced per bridge update
    pub time_step: f32,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    /// Material for bridge-created fixtures
    pub material: MaterialDef,
    /// Damping stored on bridge-created bodies
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            time_step: PHYSICS_DT,
            velocity_iterations: VELOCITY_ITERATIONS,
            position_iterations: POSITION_ITERATIONS,
            material: MaterialDef::default(),
            linear_damping: DEFAULT_LINEAR_DAMPING,
            angular_damping: DEFAULT_ANGULAR_DAMPING,
        }
    }
}

impl PhysicsConfig {
    /// Default configuration with a different gravity
    pub fn with_gravity(gravity: f32) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, PhysicsError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, PhysicsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the world cannot step with
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.gravity.is_finite() {
            return Err(PhysicsError::invalid("gravity", "must be finite"));
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(PhysicsError::invalid("time_step", "must be positive and finite"));
        }
        if self.velocity_iterations == 0 {
            return Err(PhysicsError::invalid("velocity_iterations", "must be at least 1"));
        }
        if self.position_iterations == 0 {
            return Err(PhysicsError::invalid("position_iterations", "must be at least 1"));
        }
        if self.material.density < 0.0 {
            return Err(PhysicsError::invalid("material.density", "must not be negative"));
        }
        if self.linear_damping < 0.0 || self.angular_damping < 0.0 {
            return Err(PhysicsError::invalid("damping", "must not be negative"));
        }
        Ok(())
    }
}

/// Engine context configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub world_width: f32,
    pub world_height: f32,
    pub physics: PhysicsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            physics: PhysicsConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, PhysicsError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return Err(PhysicsError::invalid("world size", "must be positive"));
        }
        self.physics.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = PhysicsConfig::default();
        assert_eq!(config.time_step, 1.0 / 60.0);
        assert_eq!(config.velocity_iterations, 8);
        assert_eq!(config.position_iterations, 3);
        assert_eq!(config.material.density, 1.0);
        assert_eq!(config.material.friction, 0.3);
        assert_eq!(config.material.restitution, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PhysicsConfig::from_json(r#"{ "gravity": -9.8 }"#).unwrap();
        assert_eq!(config.gravity, -9.8);
        assert_eq!(config.time_step, PHYSICS_DT);
        assert_eq!(config.material, MaterialDef::default());
    }

    #[test]
    fn test_rejects_zero_time_step() {
        let err = PhysicsConfig::from_json(r#"{ "time_step": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            PhysicsError::InvalidConfiguration { field: "time_step", .. }
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = PhysicsConfig::from_json("{ gravity: ").unwrap_err();
        assert!(matches!(err, PhysicsError::Deserialization(_)));
    }

    #[test]
    fn test_json_round_trip_preserves_custom_values() {
        let mut config = PhysicsConfig::with_gravity(-3.0);
        config.material.restitution = 0.9;
        let json = config.to_json().unwrap();
        assert_eq!(PhysicsConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_engine_config_rejects_empty_world() {
        let err = EngineConfig::from_json(r#"{ "world_width": 0.0 }"#).unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidConfiguration { .. }));
        assert!(EngineConfig::default().validate().is_ok());
    }
}
