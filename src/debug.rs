//! Sensor ray overlay
//!
//! Read-only replay of the rays the controller casts, for developer tooling.
//! Nothing here feeds back into movement decisions.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::config::MovementConfig;
use crate::sim::sensor_directions;

/// One sensor ray as cast from the agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySegment {
    pub origin: Vec2,
    /// Unit direction
    pub direction: Vec2,
    pub length: f32,
}

impl RaySegment {
    /// Far end of the ray
    #[inline]
    pub fn end(&self) -> Vec2 {
        self.origin + self.direction * self.length
    }
}

/// Rays for an agent at `position` facing `heading`, in configured offset order
pub fn sensor_rays(config: &MovementConfig, position: Vec2, heading: Vec2) -> Vec<RaySegment> {
    sensor_directions(heading, &config.ray_offsets_deg)
        .map(|direction| RaySegment {
            origin: position,
            direction,
            length: config.ray_length,
        })
        .collect()
}

/// Line-list vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl DebugVertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Overlay colors
pub mod colors {
    pub const SENSOR_RAY: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
}

/// Two vertices per ray, ready to upload as a line list
pub fn ray_line_vertices(rays: &[RaySegment], color: [f32; 4]) -> Vec<DebugVertex> {
    rays.iter()
        .flat_map(|ray| {
            let end = ray.end();
            [
                DebugVertex::new(ray.origin.x, ray.origin.y, color),
                DebugVertex::new(end.x, end.y, color),
            ]
        })
        .collect()
}
