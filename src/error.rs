//! Construction-time errors
//!
//! Ticks and toggles never fail. Everything that can go wrong is a wiring or
//! tuning fault, reported once by [`crate::VacuumControllerBuilder::build`].

use thiserror::Error;

/// Rejected movement tuning
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("config could not be parsed: {0}")]
    Parse(String),
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("at least one sensor ray offset is required")]
    NoSensorRays,
    #[error("spiral speed range is inverted: min {min} > max {max}")]
    SpiralRange { min: f32, max: f32 },
    #[error("spiral start speed {start} is outside [{min}, {max}] in magnitude")]
    SpiralStartOutOfRange { start: f32, min: f32, max: f32 },
}

/// Controller could not be assembled
#[derive(Debug, Error, PartialEq)]
pub enum ControllerError {
    #[error("no ray caster supplied; obstacle sensing needs a spatial query service")]
    MissingRayCaster,
    #[error("no motion sink supplied; velocity and orientation have nowhere to go")]
    MissingMotionSink,
    #[error("invalid movement config: {0}")]
    InvalidConfig(#[from] ConfigError),
}
