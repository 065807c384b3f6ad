//! ECS components for entities.
//!
//! This module groups all component types that can be attached to entities in
//! the simulated world. Components define data such as position, collision
//! volumes, classification tags and the detection sensor state.
//!
//! Submodules overview:
//! - [`collider`] – box or sphere collision volume, optionally a trigger
//! - [`detectionhandlers`] – per-slot callbacks run when a sensor detects something
//! - [`detectionsensor`] – sensor settings, detected flag and classification
//! - [`facing`] – forward direction turned by line-of-sight checks
//! - [`layer`] – physics layer of an entity and layer masks
//! - [`mapposition`] – world-space position (pivot) for an entity
//! - [`rigidbody`] – simple kinematic body storing velocity
//! - [`tag`] – single classification label for an entity
//! - [`triggercontacts`] – entities currently inside a trigger volume

pub mod collider;
pub mod detectionhandlers;
pub mod detectionsensor;
pub mod facing;
pub mod layer;
pub mod mapposition;
pub mod rigidbody;
pub mod tag;
pub mod triggercontacts;
