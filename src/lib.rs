//! Detection sensor library.
//!
//! Trigger-volume sensors that classify entities by tag, physics layer or
//! identity, remember what they saw for a configurable time after it leaves,
//! and optionally confirm it with a line-of-sight raycast. The ECS components,
//! resources, systems and events are exposed here for the headless runner and
//! for integration tests.

pub mod components;
pub mod error;
pub mod events;
pub mod resources;
pub mod scene;
pub mod simulation;
pub mod systems;
