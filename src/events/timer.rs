//! Forget-timer expiration events.
//!
//! When a timer in [`LeaveTimers`](crate::resources::leavetimers::LeaveTimers)
//! reaches its deadline, [`LeaveTimerExpired`] is triggered with the owning
//! sensor and the handle. The sensor only honors the handle it is still
//! waiting on.
//!
//! # Related
//!
//! - [`crate::systems::time::update_leave_timers`] – the system that emits these events
//! - [`crate::systems::detection::leave_timer_observer`] – the observer clearing the flag

use bevy_ecs::prelude::*;

use crate::resources::leavetimers::TimerHandle;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveTimerExpired {
    /// Sensor entity that scheduled the timer.
    pub sensor: Entity,
    pub handle: TimerHandle,
}
