//! Kinematic body component.
//!
//! The [`RigidBody`] component stores a constant velocity that the
//! [`movement`](crate::systems::movement::movement) system integrates into
//! [`MapPosition`](super::mapposition::MapPosition) every frame. This is how
//! bodies walk in and out of trigger volumes in headless scenes.
//!
//! The `frozen` flag temporarily disables movement without losing the
//! velocity.

use bevy_ecs::prelude::Component;
use glam::Vec3;

/// Kinematic body storing a velocity in world units per second.
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct RigidBody {
    pub velocity: Vec3,
    /// When true, the movement system skips this entity.
    pub frozen: bool,
}

impl RigidBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_velocity(velocity: Vec3) -> Self {
        Self {
            velocity,
            frozen: false,
        }
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }
}
