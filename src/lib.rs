//! Roomba Drive - movement controller for a simulated 2D vacuum robot
//!
//! Core modules:
//! - `sim`: Per-agent state machine, obstacle sensing and motion models
//! - `config`: Tunable movement parameters
//! - `debug`: Read-only replay of the sensor rays for developer overlays
//! - `room`: Headless SDF room used by the demo binary and integration tests

pub mod config;
pub mod debug;
pub mod error;
pub mod room;
pub mod sim;

pub use config::{LayerMask, MovementConfig};
pub use error::{ConfigError, ControllerError};
pub use sim::{
    Command, CommandQueue, CommandSender, ControllerEvent, FixedTick, MotionSink, MovementMode,
    MovementState, PowerState, RayCaster, VacuumController, VacuumControllerBuilder,
};

use glam::Vec2;

/// Movement configuration defaults
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (50 Hz, the usual physics rate)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Linear travel speed (units/s)
    pub const SPEED: f32 = 5.0;
    /// Initial direction of travel
    pub const DEFAULT_HEADING: Vec2 = Vec2::new(0.0, -1.0);

    /// Obstacle sensor ray length (units)
    pub const RAY_LENGTH: f32 = 1.5;
    /// Sensor ray offsets relative to heading (degrees)
    pub const RAY_OFFSETS_DEG: [f32; 3] = [-30.0, 0.0, 30.0];

    /// Zigzag deflection range on obstacle (± degrees)
    pub const ZIGZAG_DEFLECTION_DEG: f32 = 120.0;
    /// Spiral deflection range on obstacle (± degrees)
    pub const SPIRAL_DEFLECTION_DEG: f32 = 45.0;

    /// Spiral angular rate at power-up (deg/s)
    pub const SPIRAL_START_SPEED: f32 = 120.0;
    /// Spiral angular rate floor (deg/s) - widest spiral
    pub const SPIRAL_MIN_SPEED: f32 = 50.0;
    /// Spiral angular rate ceiling (deg/s)
    pub const SPIRAL_MAX_SPEED: f32 = 150.0;
    /// Spiral angular deceleration (deg/s²)
    pub const SPIRAL_DECELERATION: f32 = 10.0;

    /// Wobble amplitude added to the spiral rate (deg/s)
    pub const OSCILLATION_AMPLITUDE: f32 = 5.0;
    /// Wobble angular frequency (rad/s of elapsed time)
    pub const OSCILLATION_FREQUENCY: f32 = 2.0;

    /// Sprite forward axis offset relative to +X (degrees)
    pub const SPRITE_FORWARD_OFFSET_DEG: f32 = 90.0;
}

/// Rotate a vector counter-clockwise by `degrees`
#[inline]
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Normalize a heading, falling back to the default heading if it degenerated
#[inline]
pub fn unit_heading(v: Vec2) -> Vec2 {
    v.try_normalize().unwrap_or(consts::DEFAULT_HEADING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_deg_quarter_turn() {
        let v = rotate_deg(Vec2::new(0.0, -1.0), 90.0);
        assert!((v - Vec2::new(1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_unit_heading_zero_falls_back() {
        assert_eq!(unit_heading(Vec2::ZERO), consts::DEFAULT_HEADING);
        assert_eq!(unit_heading(Vec2::new(f32::NAN, 1.0)), consts::DEFAULT_HEADING);
        let v = unit_heading(Vec2::new(3.0, 4.0));
        assert!((v.length() - 1.0).abs() < 1e-6);
    }
}
