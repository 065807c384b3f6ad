//! Event types exchanged between systems and observers.
//!
//! Events provide a decoupled way for systems to communicate without direct
//! dependencies.
//!
//! Submodules:
//! - [`lineofsight`] – requests for a one-shot line-of-sight sample
//! - [`timer`] – forget timer expirations for detection sensors
//! - [`trigger`] – enter/exit notifications emitted by trigger volumes
//!
//! See each submodule for concrete event data and semantics.
pub mod lineofsight;
pub mod timer;
pub mod trigger;
