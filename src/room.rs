//! Headless SDF room
//!
//! A minimal world for running the controller without an engine: walls and
//! furniture are signed distance fields, rays are sphere-traced against them,
//! and a kinematic [`Body`] integrates velocity and resolves penetration.

use std::rc::Rc;

use glam::Vec2;
use serde::Serialize;

use crate::config::LayerMask;
use crate::sim::{MotionSink, RayCaster};

/// Ray hits closer than this count as contact
const HIT_EPSILON: f32 = 1e-3;
/// Sphere-tracing iteration cap
const MAX_MARCH_STEPS: usize = 64;

/// Signed distance to a circle
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Signed distance to an axis-aligned box
pub fn sd_box(p: Vec2, center: Vec2, half_extents: Vec2) -> f32 {
    let d = (p - center).abs() - half_extents;
    d.max(Vec2::ZERO).length() + d.x.max(d.y).min(0.0)
}

/// Obstacle geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    Box { center: Vec2, half_extents: Vec2 },
    /// Inside of a rectangular room; the walls are the solid part
    Enclosure { center: Vec2, half_extents: Vec2 },
}

impl Shape {
    pub fn distance(&self, p: Vec2) -> f32 {
        match *self {
            Shape::Circle { center, radius } => sd_circle(p, center, radius),
            Shape::Box {
                center,
                half_extents,
            } => sd_box(p, center, half_extents),
            Shape::Enclosure {
                center,
                half_extents,
            } => -sd_box(p, center, half_extents),
        }
    }
}

/// A solid shape on one or more collision layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Obstacle {
    pub shape: Shape,
    pub layers: LayerMask,
}

/// Compute SDF gradient (surface normal) using central differences
pub fn sdf_gradient<F>(p: Vec2, sdf: F) -> Vec2
where
    F: Fn(Vec2) -> f32,
{
    let eps = 1e-3;
    let dx = sdf(p + Vec2::new(eps, 0.0)) - sdf(p - Vec2::new(eps, 0.0));
    let dy = sdf(p + Vec2::new(0.0, eps)) - sdf(p - Vec2::new(0.0, eps));
    Vec2::new(dx, dy).normalize_or_zero()
}

/// Static obstacle set; clones share the same geometry
#[derive(Debug, Clone)]
pub struct Room {
    obstacles: Rc<[Obstacle]>,
}

impl Room {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self {
            obstacles: obstacles.into(),
        }
    }

    /// Rectangular room of the given size centered on the origin
    pub fn rectangle(width: f32, height: f32, wall_layers: LayerMask) -> Self {
        Self::new(vec![Obstacle {
            shape: Shape::Enclosure {
                center: Vec2::ZERO,
                half_extents: Vec2::new(width, height) * 0.5,
            },
            layers: wall_layers,
        }])
    }

    /// Same room with one more obstacle
    pub fn with(&self, obstacle: Obstacle) -> Self {
        let mut obstacles = self.obstacles.to_vec();
        obstacles.push(obstacle);
        Self::new(obstacles)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Distance to the nearest obstacle on `filter`'s layers
    pub fn distance(&self, p: Vec2, filter: LayerMask) -> f32 {
        self.obstacles
            .iter()
            .filter(|o| o.layers.intersects(filter))
            .map(|o| o.shape.distance(p))
            .fold(f32::MAX, f32::min)
    }

    /// Sphere-trace a ray; returns the hit distance
    pub fn raymarch(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        filter: LayerMask,
    ) -> Option<f32> {
        let dir = direction.try_normalize()?;
        let mut t = 0.0;

        for _ in 0..MAX_MARCH_STEPS {
            let d = self.distance(origin + dir * t, filter);
            if d < HIT_EPSILON {
                return Some(t);
            }
            t += d;
            if t > max_distance {
                break;
            }
        }

        None
    }
}

impl RayCaster for Room {
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32, filter: LayerMask) -> bool {
        self.raymarch(origin, direction, max_distance, filter).is_some()
    }
}

/// Kinematic disc that follows the controller's velocity
#[derive(Debug, Clone)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Sprite rotation (degrees)
    pub orientation: f32,
    pub radius: f32,
    /// Ticks on which the body was pushed out of an obstacle
    pub contacts: u32,
}

impl Body {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            orientation: 0.0,
            radius,
            contacts: 0,
        }
    }

    /// Move by velocity * dt, then push out of anything solid
    pub fn integrate(&mut self, dt: f32, room: &Room) {
        self.position += self.velocity * dt;

        let mut touched = false;
        for obstacle in room.obstacles() {
            let sdf = |p: Vec2| obstacle.shape.distance(p);
            let dist = sdf(self.position);
            if dist < self.radius {
                let normal = sdf_gradient(self.position, sdf);
                self.position += normal * (self.radius - dist);
                touched = true;
            }
        }
        if touched {
            self.contacts += 1;
        }
    }
}

impl MotionSink for Body {
    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn set_orientation(&mut self, degrees: f32) {
        self.orientation = degrees;
    }
}

/// Grid of floor cells the body has passed over
#[derive(Debug, Clone)]
pub struct Coverage {
    origin: Vec2,
    cell_size: f32,
    cols: usize,
    rows: usize,
    visited: Vec<bool>,
}

impl Coverage {
    /// Grid over a `width` x `height` area centered on the origin
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let cols = (width / cell_size).ceil().max(1.0) as usize;
        let rows = (height / cell_size).ceil().max(1.0) as usize;
        Self {
            origin: Vec2::new(width, height) * -0.5,
            cell_size,
            cols,
            rows,
            visited: vec![false; cols * rows],
        }
    }

    pub fn mark(&mut self, p: Vec2) {
        let local = (p - self.origin) / self.cell_size;
        if local.x < 0.0 || local.y < 0.0 {
            return;
        }
        let (col, row) = (local.x as usize, local.y as usize);
        if col < self.cols && row < self.rows {
            self.visited[row * self.cols + col] = true;
        }
    }

    /// Fraction of cells visited (0-1)
    pub fn fraction(&self) -> f32 {
        let seen = self.visited.iter().filter(|v| **v).count();
        seen as f32 / self.visited.len() as f32
    }
}
