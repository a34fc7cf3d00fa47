//! Motion models
//!
//! Both models take the obstacle reading as an input so they can be driven
//! without a world. Each returns the velocity for the tick and mutates only
//! the heading and spiral rate of the state.

use glam::Vec2;
use rand::Rng;

use super::state::MovementState;
use crate::config::MovementConfig;
use crate::consts::SPRITE_FORWARD_OFFSET_DEG;
use crate::{rotate_deg, unit_heading};

/// Result of one motion step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Velocity to hand to the motion sink
    pub velocity: Vec2,
    /// Random turn applied because of an obstacle (degrees)
    pub deflection_deg: Option<f32>,
}

/// Turn the heading by a uniform random angle in [-range, range] degrees
fn deflect<R: Rng>(state: &mut MovementState, range_deg: f32, rng: &mut R) -> f32 {
    let angle = rng.random_range(-range_deg..=range_deg);
    state.heading = unit_heading(rotate_deg(state.heading, angle));
    angle
}

/// Straight-line travel with a coarse random turn whenever something is ahead
pub fn step_zigzag<R: Rng>(
    state: &mut MovementState,
    config: &MovementConfig,
    obstacle_ahead: bool,
    rng: &mut R,
) -> StepOutcome {
    let deflection_deg =
        obstacle_ahead.then(|| deflect(state, config.zigzag_deflection_deg, rng));

    StepOutcome {
        velocity: state.heading * config.speed,
        deflection_deg,
    }
}

/// Decaying spiral. Order: deflect + flip handedness, decay, wobble, clamp, turn.
pub fn step_spiral<R: Rng>(
    state: &mut MovementState,
    config: &MovementConfig,
    obstacle_ahead: bool,
    dt: f32,
    elapsed: f32,
    rng: &mut R,
) -> StepOutcome {
    let deflection_deg = obstacle_ahead.then(|| {
        let angle = deflect(state, config.spiral_deflection_deg, rng);
        state.spiral_speed = -state.spiral_speed;
        angle
    });

    state.spiral_speed = next_spiral_speed(state.spiral_speed, config, dt, elapsed);

    let turn = state.spiral_speed * dt;
    state.heading = unit_heading(rotate_deg(state.heading, turn));

    StepOutcome {
        velocity: state.heading * config.speed,
        deflection_deg,
    }
}

/// Advance the signed spiral rate by one tick of decay and wobble
///
/// The result always has the same sign as `speed` and a magnitude inside
/// `[spiral_min_speed, spiral_max_speed]`.
pub fn next_spiral_speed(speed: f32, config: &MovementConfig, dt: f32, elapsed: f32) -> f32 {
    let sign = speed.signum();
    let min = config.spiral_min_speed;
    let max = config.spiral_max_speed;

    let mut next = if speed.abs() > min {
        speed - sign * config.spiral_deceleration * dt
    } else {
        sign * min
    };

    next += spiral_wobble(config, elapsed) * dt;
    next = next.clamp(-max, max);

    // Wobble can dip just under the floor; the band is exact
    if next.abs() < min || next.signum() != sign {
        next = sign * min;
    }
    next
}

/// Periodic rate perturbation (deg/s) at elapsed time `elapsed` seconds
#[inline]
pub fn spiral_wobble(config: &MovementConfig, elapsed: f32) -> f32 {
    (elapsed * config.oscillation_frequency).sin() * config.oscillation_amplitude
}

/// Sprite rotation (degrees) for a heading; sprite forward is +Y
#[inline]
pub fn facing_angle(heading: Vec2) -> f32 {
    heading.y.atan2(heading.x).to_degrees() + SPRITE_FORWARD_OFFSET_DEG
}
