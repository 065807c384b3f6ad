//! Physics layers and layer masks.
//!
//! Every collider may sit on one of 32 layers ([`PhysicsLayer`]). A
//! [`LayerMask`] selects a set of layers; an entity is a member of the mask
//! when the bit of its layer is set.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Number of distinct physics layers.
pub const LAYER_COUNT: u8 = 32;

/// Layer index of an entity, in `0..LAYER_COUNT`.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PhysicsLayer(pub u8);

impl PhysicsLayer {
    /// Bit of this layer inside a [`LayerMask`]. Out-of-range layers have no bit.
    pub fn bit(self) -> u32 {
        if self.0 < LAYER_COUNT {
            1u32 << self.0
        } else {
            0
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Mask selecting exactly the given layers.
    pub fn from_layers(layers: &[u8]) -> Self {
        LayerMask(
            layers
                .iter()
                .fold(0, |mask, &layer| mask | PhysicsLayer(layer).bit()),
        )
    }

    pub fn contains(self, layer: PhysicsLayer) -> bool {
        self.0 & layer.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}
