//! Short-range obstacle sensing
//!
//! A fan of rays is cast from the agent along its heading. Any hit counts;
//! which ray hit and how far away does not matter.

use glam::Vec2;

use crate::config::{LayerMask, MovementConfig};
use crate::rotate_deg;

/// Host spatial query: does a ray hit a collider on one of `filter`'s layers?
pub trait RayCaster {
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32, filter: LayerMask)
        -> bool;
}

impl<F> RayCaster for F
where
    F: Fn(Vec2, Vec2, f32, LayerMask) -> bool,
{
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32, filter: LayerMask) -> bool {
        self(origin, direction, max_distance, filter)
    }
}

/// Sensor ray directions for a heading, in configured offset order
pub fn sensor_directions<'a>(
    heading: Vec2,
    offsets_deg: &'a [f32],
) -> impl Iterator<Item = Vec2> + 'a {
    offsets_deg
        .iter()
        .map(move |&offset| rotate_deg(heading, offset))
}

/// True if any sensor ray from `position` hits an obstacle
pub fn is_obstacle_ahead<C: RayCaster + ?Sized>(
    caster: &C,
    config: &MovementConfig,
    position: Vec2,
    heading: Vec2,
) -> bool {
    sensor_directions(heading, &config.ray_offsets_deg)
        .any(|dir| caster.cast_ray(position, dir, config.ray_length, config.obstacle_layers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_sensor_directions_fan() {
        let dirs: Vec<Vec2> = sensor_directions(Vec2::new(0.0, -1.0), &[-30.0, 0.0, 30.0]).collect();
        assert_eq!(dirs.len(), 3);
        assert!((dirs[1] - Vec2::new(0.0, -1.0)).length() < 1e-6);
        // -30° turns clockwise from "down", towards -X
        assert!(dirs[0].x < 0.0);
        assert!(dirs[2].x > 0.0);
        for d in dirs {
            assert!((d.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_no_hits_means_clear() {
        let caster = |_: Vec2, _: Vec2, _: f32, _: LayerMask| false;
        let config = MovementConfig::default();
        assert!(!is_obstacle_ahead(&caster, &config, Vec2::ZERO, Vec2::X));
    }

    #[test]
    fn test_any_single_ray_hit_is_enough() {
        let config = MovementConfig::default();
        // Only the +30° ray sees a wall
        let hit_dir = rotate_deg(Vec2::X, 30.0);
        let caster = move |_: Vec2, dir: Vec2, _: f32, _: LayerMask| (dir - hit_dir).length() < 1e-4;
        assert!(is_obstacle_ahead(&caster, &config, Vec2::ZERO, Vec2::X));
    }

    #[test]
    fn test_casts_use_configured_length_and_filter() {
        let config = MovementConfig {
            ray_length: 2.5,
            obstacle_layers: LayerMask::layer(4),
            ..Default::default()
        };
        let seen = RefCell::new(Vec::new());
        let caster = |origin: Vec2, _: Vec2, dist: f32, filter: LayerMask| {
            seen.borrow_mut().push((origin, dist, filter));
            false
        };
        let origin = Vec2::new(3.0, -2.0);
        is_obstacle_ahead(&caster, &config, origin, Vec2::Y);
        let seen = seen.into_inner();
        assert_eq!(seen.len(), 3);
        for (o, dist, filter) in seen {
            assert_eq!(o, origin);
            assert_eq!(dist, 2.5);
            assert_eq!(filter, LayerMask::layer(4));
        }
    }
}
