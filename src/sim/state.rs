//! Movement state and core simulation types
//!
//! Everything that changes between ticks lives in [`MovementState`], so a
//! snapshot is enough to resume an agent exactly where it left off.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::MovementConfig;
use crate::consts::DEFAULT_HEADING;
use crate::unit_heading;

/// Which motion model runs on each fixed tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementMode {
    /// Straight lines, random turn on obstacle
    #[default]
    Zigzag,
    /// Decaying spiral, handedness flips on obstacle
    Spiral,
}

impl MovementMode {
    pub fn toggled(self) -> Self {
        match self {
            MovementMode::Zigzag => MovementMode::Spiral,
            MovementMode::Spiral => MovementMode::Zigzag,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementMode::Zigzag => "Zigzag",
            MovementMode::Spiral => "Spiral",
        }
    }
}

impl fmt::Display for MovementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Motor power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerState {
    #[default]
    On,
    Off,
}

impl PowerState {
    pub fn toggled(self) -> Self {
        match self {
            PowerState::On => PowerState::Off,
            PowerState::Off => PowerState::On,
        }
    }

    pub fn is_on(self) -> bool {
        self == PowerState::On
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PowerState::On => "ON",
            PowerState::Off => "OFF",
        })
    }
}

/// Mutable per-agent state (serializable for snapshots)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementState {
    pub(crate) mode: MovementMode,
    pub(crate) power: PowerState,
    /// Unit direction of travel
    pub(crate) heading: Vec2,
    /// Signed spiral angular rate (deg/s); sign is handedness
    pub(crate) spiral_speed: f32,
}

impl MovementState {
    /// Power-up state: Zigzag, On, heading down
    pub fn new(config: &MovementConfig) -> Self {
        Self {
            mode: MovementMode::Zigzag,
            power: PowerState::On,
            heading: DEFAULT_HEADING,
            spiral_speed: config.spiral_start_speed,
        }
    }

    /// Build a state from raw parts, enforcing the heading and spiral invariants
    pub fn from_parts(
        mode: MovementMode,
        power: PowerState,
        heading: Vec2,
        spiral_speed: f32,
        config: &MovementConfig,
    ) -> Self {
        Self {
            mode,
            power,
            heading,
            spiral_speed,
        }
        .sanitized(config)
    }

    /// Re-establish invariants on a state that came from outside
    pub fn sanitized(mut self, config: &MovementConfig) -> Self {
        self.heading = unit_heading(self.heading);
        if !self.spiral_speed.is_finite() {
            self.spiral_speed = config.spiral_start_speed;
        }
        let sign = self.spiral_speed.signum();
        let magnitude = self
            .spiral_speed
            .abs()
            .clamp(config.spiral_min_speed, config.spiral_max_speed);
        self.spiral_speed = sign * magnitude;
        self
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    pub fn power(&self) -> PowerState {
        self.power
    }

    pub fn heading(&self) -> Vec2 {
        self.heading
    }

    pub fn spiral_speed(&self) -> f32 {
        self.spiral_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = MovementState::new(&MovementConfig::default());
        assert_eq!(state.mode(), MovementMode::Zigzag);
        assert_eq!(state.power(), PowerState::On);
        assert_eq!(state.heading(), Vec2::new(0.0, -1.0));
        assert_eq!(state.spiral_speed(), 120.0);
    }

    #[test]
    fn test_toggles_are_involutions() {
        assert_eq!(MovementMode::Zigzag.toggled().toggled(), MovementMode::Zigzag);
        assert_eq!(MovementMode::Zigzag.toggled(), MovementMode::Spiral);
        assert_eq!(PowerState::On.toggled(), PowerState::Off);
        assert_eq!(PowerState::Off.toggled().toggled(), PowerState::Off);
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(MovementMode::Spiral.to_string(), "Spiral");
        assert_eq!(PowerState::On.to_string(), "ON");
        assert_eq!(PowerState::Off.to_string(), "OFF");
    }

    #[test]
    fn test_from_parts_sanitizes() {
        let config = MovementConfig::default();
        let state = MovementState::from_parts(
            MovementMode::Spiral,
            PowerState::Off,
            Vec2::new(10.0, 0.0),
            -400.0,
            &config,
        );
        assert_eq!(state.heading(), Vec2::X);
        assert_eq!(state.spiral_speed(), -150.0);

        let state = MovementState::from_parts(
            MovementMode::Spiral,
            PowerState::On,
            Vec2::ZERO,
            10.0,
            &config,
        );
        assert_eq!(state.heading(), DEFAULT_HEADING);
        assert_eq!(state.spiral_speed(), 50.0);
    }

    #[test]
    fn test_state_json_round_trip() {
        let config = MovementConfig::default();
        let state = MovementState::from_parts(
            MovementMode::Spiral,
            PowerState::Off,
            Vec2::new(0.6, 0.8),
            -75.0,
            &config,
        );
        let json = serde_json::to_string(&state).unwrap();
        let back: MovementState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
