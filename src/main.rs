//! Roomba Drive headless demo
//!
//! Drops one vacuum into a furnished SDF room, drives it with a fixed-timestep
//! accumulator from a jittery frame clock, replays a short script of toggles
//! and prints a JSON summary of the run.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use serde::Serialize;

use roomba_drive::consts::{MAX_SUBSTEPS, SIM_DT};
use roomba_drive::room::{Body, Coverage, Obstacle, Room, Shape};
use roomba_drive::{
    CommandQueue, CommandSender, ControllerError, ControllerEvent, FixedTick, LayerMask,
    MovementConfig, MovementMode, VacuumController,
};

const SEED: u64 = 0x5eed;
const ROOM_WIDTH: f32 = 12.0;
const ROOM_HEIGHT: f32 = 8.0;
const BODY_RADIUS: f32 = 0.35;
const RUN_SECONDS: f32 = 90.0;

const WALLS: LayerMask = LayerMask::layer(0);
const FURNITURE: LayerMask = LayerMask::layer(1);
const RUGS: LayerMask = LayerMask::layer(2);

/// Toggle script: (time in seconds, action)
const SCRIPT: &[(f32, Action)] = &[
    (30.0, Action::Mode),
    (55.0, Action::Power),
    (58.0, Action::Power),
    (75.0, Action::Mode),
];

#[derive(Debug, Clone, Copy)]
enum Action {
    Power,
    Mode,
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    seconds: f32,
    ticks: u64,
    frames: u64,
    final_mode: MovementMode,
    final_position: Vec2,
    final_heading: Vec2,
    spiral_speed: f32,
    obstacle_turns: u32,
    wall_contacts: u32,
    coverage: f32,
    obstacles: Vec<Obstacle>,
}

fn furnished_room() -> Room {
    Room::rectangle(ROOM_WIDTH, ROOM_HEIGHT, WALLS)
        .with(Obstacle {
            shape: Shape::Box {
                center: Vec2::new(-3.0, 1.5),
                half_extents: Vec2::new(1.2, 0.6),
            },
            layers: FURNITURE,
        })
        .with(Obstacle {
            shape: Shape::Circle {
                center: Vec2::new(2.5, -1.0),
                radius: 0.8,
            },
            layers: FURNITURE,
        })
        // Rugs are on their own layer; the sensor filter ignores them
        .with(Obstacle {
            shape: Shape::Circle {
                center: Vec2::new(0.0, 2.0),
                radius: 1.0,
            },
            layers: RUGS,
        })
}

struct Demo {
    controller: VacuumController,
    commands: CommandSender,
    body: Rc<RefCell<Body>>,
    room: Room,
    coverage: Coverage,
    accumulator: f32,
    elapsed: f32,
    ticks: u64,
    frames: u64,
    script_pos: usize,
    obstacle_turns: u32,
}

impl Demo {
    fn new() -> Result<Self, ControllerError> {
        let room = furnished_room();
        let body = Rc::new(RefCell::new(Body::new(Vec2::ZERO, BODY_RADIUS)));
        let config = MovementConfig::with_layers(WALLS | FURNITURE);

        let queue = CommandQueue::new();
        let commands = queue.sender();

        let controller = VacuumController::builder(config)
            .ray_caster(room.clone())
            .motion_sink(body.clone())
            .command_queue(queue)
            .seed(SEED)
            .build()?;

        Ok(Self {
            controller,
            commands,
            body,
            coverage: Coverage::new(ROOM_WIDTH, ROOM_HEIGHT, 0.5),
            room,
            accumulator: 0.0,
            elapsed: 0.0,
            ticks: 0,
            frames: 0,
            script_pos: 0,
            obstacle_turns: 0,
        })
    }

    /// Post any scripted toggles that are due
    fn fire_script(&mut self) {
        while let Some((at, action)) = SCRIPT.get(self.script_pos) {
            if *at > self.elapsed {
                break;
            }
            match action {
                Action::Power => self.commands.toggle_power(),
                Action::Mode => self.commands.toggle_mode(),
            };
            self.script_pos += 1;
        }
    }

    /// Run simulation ticks for one rendered frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.fire_script();

            let position = self.body.borrow().position;
            self.controller.on_fixed_tick(FixedTick {
                dt: SIM_DT,
                elapsed: self.elapsed,
                position,
            });

            let mut body = self.body.borrow_mut();
            body.integrate(SIM_DT, &self.room);
            self.coverage.mark(body.position);
            drop(body);

            self.accumulator -= SIM_DT;
            self.elapsed += SIM_DT;
            self.ticks += 1;
            substeps += 1;
        }

        self.controller.on_frame_tick();
        self.frames += 1;

        for event in self.controller.drain_events() {
            match event {
                ControllerEvent::ObstacleAvoided { .. } => {
                    self.obstacle_turns += 1;
                    log::debug!("[{:6.2}s] {event}", self.elapsed);
                }
                _ => log::info!("[{:6.2}s] {event}", self.elapsed),
            }
        }
    }

    fn summary(&self) -> Summary {
        let body = self.body.borrow();
        Summary {
            seed: SEED,
            seconds: self.elapsed,
            ticks: self.ticks,
            frames: self.frames,
            final_mode: self.controller.mode(),
            final_position: body.position,
            final_heading: self.controller.heading(),
            spiral_speed: self.controller.spiral_speed(),
            obstacle_turns: self.obstacle_turns,
            wall_contacts: body.contacts,
            coverage: self.coverage.fraction(),
            obstacles: self.room.obstacles().to_vec(),
        }
    }
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Roomba Drive demo starting...");

    let mut demo = match Demo::new() {
        Ok(demo) => demo,
        Err(e) => {
            log::error!("Could not set up demo: {e}");
            std::process::exit(1);
        }
    };

    // Frame clock alternates between 60 and ~45 fps to exercise the accumulator
    let frame_times = [1.0 / 60.0, 1.0 / 45.0, 1.0 / 60.0, 1.0 / 75.0];
    let mut frame = 0;
    while demo.elapsed < RUN_SECONDS {
        demo.update(frame_times[frame % frame_times.len()]);
        frame += 1;
    }

    log::info!(
        "Run finished: {} ticks, coverage {:.1}%",
        demo.ticks,
        demo.coverage.fraction() * 100.0
    );

    match serde_json::to_string_pretty(&demo.summary()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not serialize summary: {e}"),
    }
}
