//! Overlap bookkeeping for trigger volumes.
//!
//! The [`trigger_detector`](crate::systems::trigger::trigger_detector) system
//! compares the entities overlapping a trigger this frame against the set
//! stored here to find enter and exit edges.

use bevy_ecs::prelude::{Component, Entity};
use rustc_hash::FxHashSet;

#[derive(Component, Debug, Clone, Default)]
pub struct TriggerContacts {
    inside: FxHashSet<Entity>,
}

impl TriggerContacts {
    pub fn contains(&self, entity: Entity) -> bool {
        self.inside.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.inside.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inside.is_empty()
    }

    /// Replace the contact set, returning (entered, exited) entities.
    pub fn update(&mut self, now: FxHashSet<Entity>) -> (Vec<Entity>, Vec<Entity>) {
        let mut entered: Vec<Entity> = now.difference(&self.inside).copied().collect();
        let mut exited: Vec<Entity> = self.inside.difference(&now).copied().collect();
        entered.sort();
        exited.sort();
        self.inside = now;
        (entered, exited)
    }
}
