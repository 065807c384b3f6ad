//! 3D collider shapes and the geometric queries the sensor needs.
//!
//! A [`Collider`] is either solid or a trigger volume. Trigger volumes report
//! enter/exit edges through the
//! [`trigger_detector`](crate::systems::trigger::trigger_detector) system and
//! are ignored by ray queries. Solid colliders block rays.

use bevy_ecs::prelude::Component;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Geometric shape of a collider, centered on the entity position plus offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ColliderShape {
    /// Axis-aligned box described by its half extents.
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Collider {
    pub shape: ColliderShape,
    pub offset: Vec3,
    /// Trigger volumes generate enter/exit events but do not block rays.
    pub is_trigger: bool,
}

impl Collider {
    /// Solid axis-aligned box with the given full size.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self {
            shape: ColliderShape::Box {
                half_extents: Vec3::new(width, height, depth).abs() * 0.5,
            },
            offset: Vec3::ZERO,
            is_trigger: false,
        }
    }

    /// Solid sphere with the given radius.
    pub fn ball(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Sphere {
                radius: radius.abs(),
            },
            offset: Vec3::ZERO,
            is_trigger: false,
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Turn this collider into a trigger volume.
    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn center(&self, position: Vec3) -> Vec3 {
        position + self.offset
    }

    /// Returns (min, max) of the collider bounds for a given entity position.
    pub fn aabb(&self, position: Vec3) -> (Vec3, Vec3) {
        let center = self.center(position);
        let half = match self.shape {
            ColliderShape::Box { half_extents } => half_extents.abs(),
            ColliderShape::Sphere { radius } => Vec3::splat(radius.abs()),
        };
        (center - half, center + half)
    }

    /// Overlap test against another collider at a different entity position.
    ///
    /// Touching surfaces do not count as overlapping.
    pub fn overlaps(&self, position: Vec3, other: &Self, other_position: Vec3) -> bool {
        match (self.shape, other.shape) {
            (ColliderShape::Box { .. }, ColliderShape::Box { .. }) => {
                let (min_a, max_a) = self.aabb(position);
                let (min_b, max_b) = other.aabb(other_position);
                min_a.cmplt(max_b).all() && max_a.cmpgt(min_b).all()
            }
            (ColliderShape::Sphere { radius: ra }, ColliderShape::Sphere { radius: rb }) => {
                let reach = ra.abs() + rb.abs();
                self.center(position)
                    .distance_squared(other.center(other_position))
                    < reach * reach
            }
            (ColliderShape::Box { .. }, ColliderShape::Sphere { radius }) => {
                self.sphere_overlaps_box(position, other.center(other_position), radius)
            }
            (ColliderShape::Sphere { radius }, ColliderShape::Box { .. }) => {
                other.sphere_overlaps_box(other_position, self.center(position), radius)
            }
        }
    }

    fn sphere_overlaps_box(&self, position: Vec3, sphere_center: Vec3, radius: f32) -> bool {
        let (min, max) = self.aabb(position);
        let closest = sphere_center.clamp(min, max);
        closest.distance_squared(sphere_center) < radius * radius
    }

    /// Distance along a ray to the first surface of this collider.
    ///
    /// `direction` must be normalized. Rays that start inside the collider
    /// do not hit it, and neither do surfaces behind the origin.
    pub fn ray_distance(&self, position: Vec3, origin: Vec3, direction: Vec3) -> Option<f32> {
        match self.shape {
            ColliderShape::Box { .. } => {
                let (min, max) = self.aabb(position);
                ray_aabb(origin, direction, min, max)
            }
            ColliderShape::Sphere { radius } => {
                ray_sphere(origin, direction, self.center(position), radius.abs())
            }
        }
    }
}

fn ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    for axis in 0..3 {
        let (o, d) = (origin[axis], direction[axis]);
        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
    }
    if t_exit < t_enter || t_enter < 0.0 {
        return None;
    }
    Some(t_enter)
}

fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let m = origin - center;
    let c = m.length_squared() - radius * radius;
    if c < 0.0 {
        return None;
    }
    let b = m.dot(direction);
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some((-b - discriminant.sqrt()).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_cuboid_aabb() {
        let c = Collider::cuboid(2.0, 4.0, 6.0).with_offset(Vec3::new(1.0, 0.0, 0.0));
        let (min, max) = c.aabb(Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(min, Vec3::new(10.0, 8.0, 7.0));
        assert_eq!(max, Vec3::new(12.0, 12.0, 13.0));
    }

    #[test]
    fn test_box_box_overlap_and_touching() {
        let a = Collider::cuboid(2.0, 2.0, 2.0);
        let b = Collider::cuboid(2.0, 2.0, 2.0);
        assert!(a.overlaps(Vec3::ZERO, &b, Vec3::new(1.5, 0.0, 0.0)));
        assert!(!a.overlaps(Vec3::ZERO, &b, Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_sphere_sphere_overlap() {
        let a = Collider::ball(1.0);
        let b = Collider::ball(1.0);
        assert!(a.overlaps(Vec3::ZERO, &b, Vec3::new(0.0, 1.9, 0.0)));
        assert!(!a.overlaps(Vec3::ZERO, &b, Vec3::new(0.0, 2.1, 0.0)));
    }

    #[test]
    fn test_sphere_box_overlap_is_symmetric() {
        let sphere = Collider::ball(1.0);
        let cube = Collider::cuboid(2.0, 2.0, 2.0);
        let near = Vec3::new(1.5, 0.0, 0.0);
        let corner = Vec3::new(1.8, 1.8, 0.0);
        assert!(sphere.overlaps(near, &cube, Vec3::ZERO));
        assert!(cube.overlaps(Vec3::ZERO, &sphere, near));
        // Inside the bounds of the sphere's AABB but outside the sphere.
        assert!(!sphere.overlaps(corner, &cube, Vec3::ZERO));
        assert!(!cube.overlaps(Vec3::ZERO, &sphere, corner));
    }

    #[test]
    fn test_ray_hits_box_front_face() {
        let cube = Collider::cuboid(2.0, 2.0, 2.0);
        let t = cube.ray_distance(Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO, Vec3::X);
        assert!(approx_eq(t.unwrap(), 4.0));
    }

    #[test]
    fn test_ray_misses_box_behind_or_beside() {
        let cube = Collider::cuboid(2.0, 2.0, 2.0);
        assert!(cube
            .ray_distance(Vec3::new(-5.0, 0.0, 0.0), Vec3::ZERO, Vec3::X)
            .is_none());
        assert!(cube
            .ray_distance(Vec3::new(5.0, 3.0, 0.0), Vec3::ZERO, Vec3::X)
            .is_none());
    }

    #[test]
    fn test_ray_from_inside_does_not_hit() {
        let cube = Collider::cuboid(2.0, 2.0, 2.0);
        assert!(cube.ray_distance(Vec3::ZERO, Vec3::ZERO, Vec3::X).is_none());
        let sphere = Collider::ball(1.0);
        assert!(sphere.ray_distance(Vec3::ZERO, Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn test_ray_hits_sphere() {
        let sphere = Collider::ball(1.0);
        let t = sphere.ray_distance(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Z);
        assert!(approx_eq(t.unwrap(), 9.0));
        assert!(sphere
            .ray_distance(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::X)
            .is_none());
    }

    #[test]
    fn test_shape_deserializes_from_tagged_json() {
        let shape: ColliderShape =
            serde_json::from_str(r#"{ "shape": "sphere", "radius": 3.0 }"#).unwrap();
        assert_eq!(shape, ColliderShape::Sphere { radius: 3.0 });
        let shape: ColliderShape =
            serde_json::from_str(r#"{ "shape": "box", "half_extents": [1.0, 2.0, 3.0] }"#)
                .unwrap();
        assert_eq!(
            shape,
            ColliderShape::Box {
                half_extents: Vec3::new(1.0, 2.0, 3.0)
            }
        );
    }
}
