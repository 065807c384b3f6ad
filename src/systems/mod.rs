//! Simulation systems.
//!
//! This module groups all ECS systems and observers that advance the
//! simulation.
//!
//! Submodules overview
//! - [`detection`] – sensor validation and enter/exit/timeout observers
//! - [`lineofsight`] – raycast line-of-sight samples and the request observer
//! - [`movement`] – integrate positions from rigid body velocities and time
//! - [`time`] – update simulation time and delta, process forget timers
//! - [`trigger`] – trigger volume overlap checks and enter/exit emission

pub mod detection;
pub mod lineofsight;
pub mod movement;
pub mod time;
pub mod trigger;
