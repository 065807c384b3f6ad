//! Orientation of an entity, expressed as a unit forward vector.
//!
//! Line-of-sight checks turn a sensor toward its target by rewriting this
//! component (the equivalent of a "look at").

use bevy_ecs::prelude::Component;
use glam::Vec3;

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Facing {
    pub forward: Vec3,
}

impl Default for Facing {
    fn default() -> Self {
        Self { forward: Vec3::Z }
    }
}

impl Facing {
    /// Point `forward` from `from` toward `to`.
    ///
    /// Returns false and leaves the facing untouched when both points
    /// coincide, since there is no direction to look at.
    pub fn look_at(&mut self, from: Vec3, to: Vec3) -> bool {
        match (to - from).try_normalize() {
            Some(dir) => {
                self.forward = dir;
                true
            }
            None => false,
        }
    }
}
