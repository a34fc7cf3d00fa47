//! Per-agent movement controller
//!
//! Host wiring:
//! - fixed-rate scheduler → [`VacuumController::on_fixed_tick`]
//! - render loop → [`VacuumController::on_frame_tick`]
//! - input events → [`VacuumController::toggle_power`] / [`VacuumController::toggle_mode`],
//!   or a [`CommandSender`] when input arrives on another thread
//!
//! Velocity and facing leave through the host's [`MotionSink`]; obstacle
//! queries go to the host's [`RayCaster`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::commands::{Command, CommandQueue, CommandSender};
use super::motion::{self, StepOutcome};
use super::sensing::{self, RayCaster};
use super::state::{MovementMode, MovementState, PowerState};
use crate::config::MovementConfig;
use crate::debug::{RaySegment, sensor_rays};
use crate::error::ControllerError;

/// Maximum undrained notifications kept; oldest are dropped first
pub const MAX_PENDING_EVENTS: usize = 64;

/// Host body receiving the controller's outputs
pub trait MotionSink {
    /// Called once per fixed tick (zero while powered off)
    fn set_velocity(&mut self, velocity: Vec2);
    /// Called once per frame tick with the sprite rotation in degrees
    fn set_orientation(&mut self, degrees: f32);
}

impl<T: MotionSink + ?Sized> MotionSink for Rc<RefCell<T>> {
    fn set_velocity(&mut self, velocity: Vec2) {
        self.borrow_mut().set_velocity(velocity);
    }

    fn set_orientation(&mut self, degrees: f32) {
        self.borrow_mut().set_orientation(degrees);
    }
}

/// Inputs for one fixed tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTick {
    /// Seconds since the previous fixed tick
    pub dt: f32,
    /// Seconds since the host started (wobble phase)
    pub elapsed: f32,
    /// Current agent position in world units
    pub position: Vec2,
}

/// Human-readable notifications for the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerEvent {
    PowerChanged(PowerState),
    ModeChanged(MovementMode),
    ObstacleAvoided {
        mode: MovementMode,
        deflection_deg: f32,
    },
}

impl fmt::Display for ControllerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerEvent::PowerChanged(power) => write!(f, "Roomba is now {power}"),
            ControllerEvent::ModeChanged(mode) => write!(f, "Switched to {mode} mode"),
            ControllerEvent::ObstacleAvoided {
                mode,
                deflection_deg,
            } => write!(f, "Obstacle ahead in {mode} mode, turned {deflection_deg:.1}°"),
        }
    }
}

/// Assembles a [`VacuumController`], checking that the host wired everything
pub struct VacuumControllerBuilder<R = Pcg32> {
    config: MovementConfig,
    state: Option<MovementState>,
    ray_caster: Option<Box<dyn RayCaster>>,
    motion_sink: Option<Box<dyn MotionSink>>,
    rng: R,
    commands: Option<CommandQueue>,
}

impl VacuumControllerBuilder<Pcg32> {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            state: None,
            ray_caster: None,
            motion_sink: None,
            rng: Pcg32::seed_from_u64(0),
            commands: None,
        }
    }

    /// Seed the default deflection RNG
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Pcg32::seed_from_u64(seed);
        self
    }
}

impl<R: Rng> VacuumControllerBuilder<R> {
    pub fn ray_caster(mut self, caster: impl RayCaster + 'static) -> Self {
        self.ray_caster = Some(Box::new(caster));
        self
    }

    pub fn motion_sink(mut self, sink: impl MotionSink + 'static) -> Self {
        self.motion_sink = Some(Box::new(sink));
        self
    }

    /// Resume from a snapshot instead of the power-up state
    pub fn state(mut self, state: MovementState) -> Self {
        self.state = Some(state);
        self
    }

    /// Accept toggles from other threads through a queue
    pub fn command_queue(mut self, queue: CommandQueue) -> Self {
        self.commands = Some(queue);
        self
    }

    /// Replace the deflection RNG (tests inject scripted or seeded sources)
    pub fn rng<R2: Rng>(self, rng: R2) -> VacuumControllerBuilder<R2> {
        VacuumControllerBuilder {
            config: self.config,
            state: self.state,
            ray_caster: self.ray_caster,
            motion_sink: self.motion_sink,
            rng,
            commands: self.commands,
        }
    }

    pub fn build(self) -> Result<VacuumController<R>, ControllerError> {
        let result = self.assemble();
        if let Err(e) = &result {
            log::warn!("Vacuum controller not built: {e}");
        }
        result
    }

    fn assemble(self) -> Result<VacuumController<R>, ControllerError> {
        self.config.validate()?;
        let ray_caster = self.ray_caster.ok_or(ControllerError::MissingRayCaster)?;
        let motion_sink = self.motion_sink.ok_or(ControllerError::MissingMotionSink)?;

        let state = match self.state {
            Some(state) => state.sanitized(&self.config),
            None => MovementState::new(&self.config),
        };

        log::info!(
            "Vacuum controller ready: {} mode, power {}",
            state.mode(),
            state.power()
        );

        Ok(VacuumController {
            config: self.config,
            state,
            ray_caster,
            motion_sink,
            rng: self.rng,
            commands: self.commands,
            events: Vec::new(),
        })
    }
}

/// Movement state machine for one vacuum agent
pub struct VacuumController<R = Pcg32> {
    config: MovementConfig,
    state: MovementState,
    ray_caster: Box<dyn RayCaster>,
    motion_sink: Box<dyn MotionSink>,
    rng: R,
    commands: Option<CommandQueue>,
    events: Vec<ControllerEvent>,
}

impl VacuumController {
    pub fn builder(config: MovementConfig) -> VacuumControllerBuilder {
        VacuumControllerBuilder::new(config)
    }
}

impl<R: Rng> VacuumController<R> {
    /// Advance one fixed timestep and push the resulting velocity to the sink
    pub fn on_fixed_tick(&mut self, tick: FixedTick) -> Vec2 {
        self.process_commands();

        let velocity = if self.state.power.is_on() {
            match self.state.mode {
                MovementMode::Zigzag => self.step_zigzag(tick),
                MovementMode::Spiral => self.step_spiral(tick),
            }
        } else {
            Vec2::ZERO
        };

        self.motion_sink.set_velocity(velocity);
        velocity
    }

    /// Push the sprite facing to the sink; None if suppressed while off
    pub fn on_frame_tick(&mut self) -> Option<f32> {
        if !self.state.power.is_on() && !self.config.face_while_off {
            return None;
        }
        let angle = self.facing_angle();
        self.motion_sink.set_orientation(angle);
        Some(angle)
    }

    /// Zigzag step for this tick (does not touch the sink)
    pub fn step_zigzag(&mut self, tick: FixedTick) -> Vec2 {
        let ahead = self.is_obstacle_ahead(tick.position);
        let outcome = motion::step_zigzag(&mut self.state, &self.config, ahead, &mut self.rng);
        self.record_step(MovementMode::Zigzag, outcome)
    }

    /// Spiral step for this tick (does not touch the sink)
    pub fn step_spiral(&mut self, tick: FixedTick) -> Vec2 {
        let ahead = self.is_obstacle_ahead(tick.position);
        let outcome = motion::step_spiral(
            &mut self.state,
            &self.config,
            ahead,
            tick.dt,
            tick.elapsed,
            &mut self.rng,
        );
        self.record_step(MovementMode::Spiral, outcome)
    }

    /// Sensor fan check from `position` along the current heading
    pub fn is_obstacle_ahead(&self, position: Vec2) -> bool {
        sensing::is_obstacle_ahead(
            &*self.ray_caster,
            &self.config,
            position,
            self.state.heading,
        )
    }

    pub fn toggle_power(&mut self) {
        self.state.power = self.state.power.toggled();
        log::info!("Roomba is now {}", self.state.power);
        self.push_event(ControllerEvent::PowerChanged(self.state.power));
    }

    pub fn toggle_mode(&mut self) {
        self.state.mode = self.state.mode.toggled();
        log::info!("Switched to {} mode", self.state.mode);
        self.push_event(ControllerEvent::ModeChanged(self.state.mode));
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::TogglePower => self.toggle_power(),
            Command::ToggleMode => self.toggle_mode(),
        }
    }

    /// Producer handle for the inbox, if one was configured
    pub fn command_sender(&self) -> Option<CommandSender> {
        self.commands.as_ref().map(CommandQueue::sender)
    }

    /// Take pending notifications, oldest first
    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Sensor rays as they would be cast from `position` (visualization only)
    pub fn debug_rays(&self, position: Vec2) -> Vec<RaySegment> {
        sensor_rays(&self.config, position, self.state.heading)
    }

    pub fn facing_angle(&self) -> f32 {
        motion::facing_angle(self.state.heading)
    }

    pub fn snapshot(&self) -> MovementState {
        self.state
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn mode(&self) -> MovementMode {
        self.state.mode
    }

    pub fn power(&self) -> PowerState {
        self.state.power
    }

    pub fn heading(&self) -> Vec2 {
        self.state.heading
    }

    pub fn spiral_speed(&self) -> f32 {
        self.state.spiral_speed
    }

    fn process_commands(&mut self) {
        let pending = match &self.commands {
            Some(queue) => queue.drain(),
            None => return,
        };
        for command in pending {
            self.apply(command);
        }
    }

    fn record_step(&mut self, mode: MovementMode, outcome: StepOutcome) -> Vec2 {
        if let Some(deflection_deg) = outcome.deflection_deg {
            log::debug!("{mode}: obstacle ahead, turned {deflection_deg:.1}°");
            self.push_event(ControllerEvent::ObstacleAvoided {
                mode,
                deflection_deg,
            });
        }
        outcome.velocity
    }

    fn push_event(&mut self, event: ControllerEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayerMask;

    #[derive(Default)]
    struct Recorder {
        velocities: Vec<Vec2>,
        orientations: Vec<f32>,
    }

    impl MotionSink for Recorder {
        fn set_velocity(&mut self, velocity: Vec2) {
            self.velocities.push(velocity);
        }

        fn set_orientation(&mut self, degrees: f32) {
            self.orientations.push(degrees);
        }
    }

    fn open_floor(_: Vec2, _: Vec2, _: f32, _: LayerMask) -> bool {
        false
    }

    fn wall_everywhere(_: Vec2, _: Vec2, _: f32, _: LayerMask) -> bool {
        true
    }

    fn tick() -> FixedTick {
        FixedTick {
            dt: 0.02,
            elapsed: 0.0,
            position: Vec2::ZERO,
        }
    }

    fn controller(
        caster: fn(Vec2, Vec2, f32, LayerMask) -> bool,
    ) -> (VacuumController, Rc<RefCell<Recorder>>) {
        let sink = Rc::new(RefCell::new(Recorder::default()));
        let controller = VacuumController::builder(MovementConfig::default())
            .ray_caster(caster)
            .motion_sink(sink.clone())
            .seed(9)
            .build()
            .unwrap();
        (controller, sink)
    }

    #[test]
    fn test_build_requires_ray_caster() {
        let result = VacuumController::builder(MovementConfig::default())
            .motion_sink(Recorder::default())
            .build();
        assert!(matches!(result, Err(ControllerError::MissingRayCaster)));
    }

    #[test]
    fn test_build_requires_motion_sink() {
        let result = VacuumController::builder(MovementConfig::default())
            .ray_caster(open_floor)
            .build();
        assert!(matches!(result, Err(ControllerError::MissingMotionSink)));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = MovementConfig {
            speed: -1.0,
            ..Default::default()
        };
        let result = VacuumController::builder(config)
            .ray_caster(open_floor)
            .motion_sink(Recorder::default())
            .build();
        assert!(matches!(result, Err(ControllerError::InvalidConfig(_))));
    }

    #[test]
    fn test_fixed_tick_feeds_sink() {
        let (mut c, sink) = controller(open_floor);
        let v = c.on_fixed_tick(tick());
        assert_eq!(v, Vec2::new(0.0, -5.0));
        assert_eq!(sink.borrow().velocities, vec![Vec2::new(0.0, -5.0)]);
    }

    #[test]
    fn test_power_off_zero_velocity_and_frozen_state() {
        let (mut c, sink) = controller(wall_everywhere);
        c.toggle_mode();
        c.toggle_power();
        let before = c.snapshot();
        for _ in 0..5 {
            assert_eq!(c.on_fixed_tick(tick()), Vec2::ZERO);
        }
        assert_eq!(c.snapshot(), before);
        assert!(sink.borrow().velocities.iter().all(|v| *v == Vec2::ZERO));
    }

    #[test]
    fn test_events_and_messages() {
        let (mut c, _) = controller(open_floor);
        c.toggle_power();
        c.toggle_mode();
        let messages: Vec<String> = c.drain_events().iter().map(|e| e.to_string()).collect();
        assert_eq!(messages, vec!["Roomba is now OFF", "Switched to Spiral mode"]);
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_obstacle_event_emitted() {
        let (mut c, _) = controller(wall_everywhere);
        c.on_fixed_tick(tick());
        let events = c.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            ControllerEvent::ObstacleAvoided {
                mode: MovementMode::Zigzag,
                ..
            }
        ));
    }

    #[test]
    fn test_event_backlog_is_bounded() {
        let (mut c, _) = controller(wall_everywhere);
        for _ in 0..(MAX_PENDING_EVENTS + 10) {
            c.on_fixed_tick(tick());
        }
        assert_eq!(c.drain_events().len(), MAX_PENDING_EVENTS);
    }

    #[test]
    fn test_frame_tick_faces_heading() {
        let (mut c, sink) = controller(open_floor);
        assert!(c.on_frame_tick().unwrap().abs() < 1e-4);
        c.toggle_power();
        // Facing keeps updating while off by default
        assert!(c.on_frame_tick().unwrap().abs() < 1e-4);
        assert_eq!(sink.borrow().orientations.len(), 2);
    }

    #[test]
    fn test_frame_tick_suppressed_when_configured() {
        let sink = Rc::new(RefCell::new(Recorder::default()));
        let config = MovementConfig {
            face_while_off: false,
            ..Default::default()
        };
        let mut c = VacuumController::builder(config)
            .ray_caster(open_floor)
            .motion_sink(sink.clone())
            .build()
            .unwrap();
        c.toggle_power();
        assert_eq!(c.on_frame_tick(), None);
        assert!(sink.borrow().orientations.is_empty());
    }

    #[test]
    fn test_command_queue_drained_on_tick() {
        let sink = Rc::new(RefCell::new(Recorder::default()));
        let mut c = VacuumController::builder(MovementConfig::default())
            .ray_caster(open_floor)
            .motion_sink(sink.clone())
            .command_queue(CommandQueue::new())
            .build()
            .unwrap();
        let sender = c.command_sender().unwrap();
        sender.toggle_power();
        assert_eq!(c.power(), PowerState::On);
        assert_eq!(c.on_fixed_tick(tick()), Vec2::ZERO);
        assert_eq!(c.power(), PowerState::Off);
    }

    #[test]
    fn test_debug_rays_follow_heading() {
        let (mut c, _) = controller(open_floor);
        let rays = c.debug_rays(Vec2::new(2.0, 0.0));
        assert_eq!(rays.len(), 3);
        assert_eq!(rays[1].direction, c.heading());
        // Still available while powered off
        c.toggle_power();
        assert_eq!(c.debug_rays(Vec2::ZERO).len(), 3);
    }

    #[test]
    fn test_resume_from_snapshot() {
        let (mut c, _) = controller(open_floor);
        c.toggle_mode();
        let snapshot = c.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: MovementState = serde_json::from_str(&json).unwrap();

        let c2 = VacuumController::builder(MovementConfig::default())
            .ray_caster(open_floor)
            .motion_sink(Recorder::default())
            .state(restored)
            .build()
            .unwrap();
        assert_eq!(c2.mode(), MovementMode::Spiral);
        assert_eq!(c2.heading(), c.heading());
    }
}
