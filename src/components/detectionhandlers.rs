//! Per-slot detection handlers.
//!
//! [`DetectionHandlers`] maps each of the six
//! [`DetectionSlot`](crate::components::detectionsensor::DetectionSlot)s to an
//! optional handler. When a sensor on the same entity detects something, the
//! handler of the sensor's slot runs synchronously inside the detection
//! observer and may queue any [`Commands`].
//!
//! # Example
//!
//! ```ignore
//! commands.spawn((
//!     DetectionSensor::by_tag("Player"),
//!     DetectionHandlers::new().on(
//!         DetectionSlot::TagWithoutLineOfSight,
//!         |sensor, commands| {
//!             commands.entity(sensor).insert(Alerted);
//!         },
//!     ),
//! ));
//! ```

use std::fmt;

use bevy_ecs::prelude::*;

use crate::components::detectionsensor::DetectionSlot;

/// Handler signature: receives the sensor entity and the observer's commands.
pub type DetectionCallback = Box<dyn Fn(Entity, &mut Commands) + Send + Sync>;

#[derive(Component, Default)]
pub struct DetectionHandlers {
    slots: [Option<DetectionCallback>; DetectionSlot::COUNT],
}

impl DetectionHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` for `slot`, replacing any previous one.
    pub fn on(
        mut self,
        slot: DetectionSlot,
        handler: impl Fn(Entity, &mut Commands) + Send + Sync + 'static,
    ) -> Self {
        self.set(slot, handler);
        self
    }

    pub fn set(
        &mut self,
        slot: DetectionSlot,
        handler: impl Fn(Entity, &mut Commands) + Send + Sync + 'static,
    ) {
        self.slots[slot.index()] = Some(Box::new(handler));
    }

    pub fn clear(&mut self, slot: DetectionSlot) {
        self.slots[slot.index()] = None;
    }

    pub fn has(&self, slot: DetectionSlot) -> bool {
        self.slots[slot.index()].is_some()
    }

    /// Run the handler for `slot`, if any. Returns whether one ran.
    pub fn invoke(&self, slot: DetectionSlot, sensor: Entity, commands: &mut Commands) -> bool {
        match &self.slots[slot.index()] {
            Some(handler) => {
                handler(sensor, commands);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for DetectionHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let installed: Vec<DetectionSlot> = DetectionSlot::ALL
            .into_iter()
            .filter(|slot| self.has(*slot))
            .collect();
        f.debug_struct("DetectionHandlers")
            .field("installed", &installed)
            .finish()
    }
}
