//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution.
//!
//! Overview
//! - `leavetimers` – cancellable one-shot timers that clear detected flags
//! - `sensorconfig` – sensor defaults and simulation settings loaded from INI
//! - `worldtime` – simulation time and delta
pub mod leavetimers;
pub mod sensorconfig;
pub mod worldtime;
