use bevy_ecs::prelude::Component;
use glam::Vec3;

/// World-space position (pivot) of an entity.
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct MapPosition {
    pub pos: Vec3,
}

impl MapPosition {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            pos: Vec3::new(x, y, z),
        }
    }

    pub fn from_vec3(pos: Vec3) -> Self {
        Self { pos }
    }
}
