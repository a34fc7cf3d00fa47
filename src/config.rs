//! Movement tuning
//!
//! Fixed at controller construction. Hosts that persist tuning can round-trip
//! it through JSON; missing keys fall back to the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Collision layer bitmask used to filter sensor rays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Mask containing a single layer index (0..32)
    pub const fn layer(index: u32) -> Self {
        LayerMask(1 << index)
    }

    /// True if the two masks share at least one layer
    #[inline]
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 | rhs.0)
    }
}

/// Movement parameters for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // === Travel ===
    /// Linear speed (units/s)
    pub speed: f32,

    // === Sensing ===
    /// Sensor ray length (units)
    pub ray_length: f32,
    /// Sensor ray offsets from heading (degrees)
    pub ray_offsets_deg: Vec<f32>,
    /// Layers the sensor rays can hit
    pub obstacle_layers: LayerMask,

    // === Zigzag ===
    /// Random deflection range on obstacle (± degrees)
    pub zigzag_deflection_deg: f32,

    // === Spiral ===
    /// Random deflection range on obstacle (± degrees)
    pub spiral_deflection_deg: f32,
    /// Angular rate at construction (deg/s)
    pub spiral_start_speed: f32,
    /// Angular rate floor (deg/s)
    pub spiral_min_speed: f32,
    /// Angular rate ceiling (deg/s)
    pub spiral_max_speed: f32,
    /// Angular rate decay (deg/s²)
    pub spiral_deceleration: f32,
    /// Wobble amplitude (deg/s)
    pub oscillation_amplitude: f32,
    /// Wobble angular frequency (rad/s)
    pub oscillation_frequency: f32,

    // === Presentation ===
    /// Keep updating facing angle while powered off
    pub face_while_off: bool,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: SPEED,

            ray_length: RAY_LENGTH,
            ray_offsets_deg: RAY_OFFSETS_DEG.to_vec(),
            obstacle_layers: LayerMask::ALL,

            zigzag_deflection_deg: ZIGZAG_DEFLECTION_DEG,

            spiral_deflection_deg: SPIRAL_DEFLECTION_DEG,
            spiral_start_speed: SPIRAL_START_SPEED,
            spiral_min_speed: SPIRAL_MIN_SPEED,
            spiral_max_speed: SPIRAL_MAX_SPEED,
            spiral_deceleration: SPIRAL_DECELERATION,
            oscillation_amplitude: OSCILLATION_AMPLITUDE,
            oscillation_frequency: OSCILLATION_FREQUENCY,

            face_while_off: true,
        }
    }
}

impl MovementConfig {
    /// Default tuning restricted to the given obstacle layers
    pub fn with_layers(obstacle_layers: LayerMask) -> Self {
        Self {
            obstacle_layers,
            ..Self::default()
        }
    }

    /// Parse a JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MovementConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("speed", self.speed)?;
        positive("ray_length", self.ray_length)?;
        if self.ray_offsets_deg.is_empty() {
            return Err(ConfigError::NoSensorRays);
        }
        if let Some(offset) = self.ray_offsets_deg.iter().find(|o| !o.is_finite()) {
            return Err(ConfigError::NotFinite {
                field: "ray_offsets_deg",
                value: *offset,
            });
        }

        non_negative("zigzag_deflection_deg", self.zigzag_deflection_deg)?;
        non_negative("spiral_deflection_deg", self.spiral_deflection_deg)?;
        non_negative("spiral_deceleration", self.spiral_deceleration)?;
        non_negative("oscillation_amplitude", self.oscillation_amplitude)?;
        finite("oscillation_frequency", self.oscillation_frequency)?;

        positive("spiral_min_speed", self.spiral_min_speed)?;
        finite("spiral_max_speed", self.spiral_max_speed)?;
        if self.spiral_min_speed > self.spiral_max_speed {
            return Err(ConfigError::SpiralRange {
                min: self.spiral_min_speed,
                max: self.spiral_max_speed,
            });
        }
        let start = self.spiral_start_speed.abs();
        if !(self.spiral_min_speed..=self.spiral_max_speed).contains(&start) {
            return Err(ConfigError::SpiralStartOutOfRange {
                start: self.spiral_start_speed,
                min: self.spiral_min_speed,
                max: self.spiral_max_speed,
            });
        }

        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
