//! Trigger volume overlap detection.
//!
//! Every entity with a trigger [`Collider`], a [`MapPosition`] and
//! [`TriggerContacts`] is tested against every other collider each frame.
//! Differences against the previous frame become [`TriggerEnterEvent`]s and
//! [`TriggerExitEvent`]s. Entities that vanished (despawned or lost their
//! collider) are dropped from the contact set without an exit event.

use bevy_ecs::prelude::*;
use log::debug;
use rustc_hash::FxHashSet;

use crate::components::collider::Collider;
use crate::components::mapposition::MapPosition;
use crate::components::triggercontacts::TriggerContacts;
use crate::events::trigger::{TriggerEnterEvent, TriggerExitEvent};

pub fn trigger_detector(
    mut volumes: Query<(Entity, &Collider, &MapPosition, &mut TriggerContacts)>,
    colliders: Query<(Entity, &Collider, &MapPosition)>,
    mut commands: Commands,
) {
    for (volume, trigger, position, mut contacts) in volumes.iter_mut() {
        if !trigger.is_trigger {
            continue;
        }

        let overlapping: FxHashSet<Entity> = colliders
            .iter()
            .filter(|(other, collider, other_position)| {
                *other != volume && trigger.overlaps(position.pos, collider, other_position.pos)
            })
            .map(|(other, _, _)| other)
            .collect();

        let (entered, exited) = contacts.update(overlapping);

        for other in entered {
            debug!("{:?} entered trigger {:?}", other, volume);
            commands.trigger(TriggerEnterEvent { volume, other });
        }
        for other in exited {
            if !colliders.contains(other) {
                debug!("{:?} vanished from trigger {:?}", other, volume);
                continue;
            }
            debug!("{:?} exited trigger {:?}", other, volume);
            commands.trigger(TriggerExitEvent { volume, other });
        }
    }
}
