//! Time update systems.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per frame and advances the forget timers.
use bevy_ecs::prelude::*;
use log::debug;

use crate::events::timer::LeaveTimerExpired;
use crate::resources::leavetimers::LeaveTimers;
use crate::resources::worldtime::WorldTime;

/// Update elapsed and delta seconds on the `WorldTime` resource.
///
/// `dt` is expected to be the unscaled frame delta in seconds. The function
/// applies the current `time_scale` and writes both `elapsed` and `delta`.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    let scaled_dt = dt * wt.time_scale;
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.frame_count += 1;
}

/// Advance [`LeaveTimers`] by the scaled frame delta and trigger a
/// [`LeaveTimerExpired`] for every timer that reached its deadline.
pub fn update_leave_timers(
    world_time: Res<WorldTime>,
    mut timers: ResMut<LeaveTimers>,
    mut commands: Commands,
) {
    for (handle, sensor) in timers.advance(world_time.delta) {
        debug!("Leave timer {:?} of {:?} expired", handle, sensor);
        commands.trigger(LeaveTimerExpired { sensor, handle });
    }
}
