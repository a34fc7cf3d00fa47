//! Vacuum agent simulation
//!
//! All movement logic lives here. Like any fixed-timestep sim code it must
//! stay deterministic:
//! - Fixed timestep supplied by the host
//! - Seeded RNG only
//! - No rendering or platform dependencies (world access goes through traits)

pub mod commands;
pub mod controller;
pub mod motion;
pub mod sensing;
pub mod state;

pub use commands::{Command, CommandQueue, CommandSender};
pub use controller::{
    ControllerEvent, FixedTick, MAX_PENDING_EVENTS, MotionSink, VacuumController,
    VacuumControllerBuilder,
};
pub use motion::{StepOutcome, facing_angle, next_spiral_speed, step_spiral, step_zigzag};
pub use sensing::{RayCaster, is_obstacle_ahead, sensor_directions};
pub use state::{MovementMode, MovementState, PowerState};
