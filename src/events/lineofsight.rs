//! Explicit line-of-sight requests.
//!
//! Line of sight is never evaluated on its own. Trigger a
//! [`LineOfSightRequest`] for a sensor whenever a fresh sample is wanted; the
//! [`line_of_sight_observer`](crate::systems::lineofsight::line_of_sight_observer)
//! casts the ray, stores the outcome on the sensor and turns it toward a
//! visible target.

use bevy_ecs::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOfSightRequest {
    pub sensor: Entity,
}
