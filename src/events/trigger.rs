//! Trigger volume enter/exit events.
//!
//! The [`trigger_detector`](crate::systems::trigger::trigger_detector) system
//! emits [`TriggerEnterEvent`] when a collider starts overlapping a trigger
//! volume and [`TriggerExitEvent`] when it stops. Each overlap produces
//! exactly one enter and at most one exit; entities despawned while inside a
//! volume are dropped silently.
//!
//! Detection sensors consume both through the observers in
//! [`crate::systems::detection`]. Tests and host integrations can also trigger
//! them by hand to drive a sensor without any geometry.

use bevy_ecs::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEnterEvent {
    /// Entity owning the trigger volume.
    pub volume: Entity,
    /// Entity that entered the volume.
    pub other: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerExitEvent {
    /// Entity owning the trigger volume.
    pub volume: Entity,
    /// Entity that left the volume.
    pub other: Entity,
}
