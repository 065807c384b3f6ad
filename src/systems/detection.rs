//! Detection sensor systems and observers.
//!
//! - [`validate_sensors`] – checks added or changed sensors and marks broken ones
//! - [`sensor_removed_observer`] – cancels the forget timers of removed sensors
//! - [`detection_enter_observer`] – classifies entities entering a sensor volume
//! - [`detection_exit_observer`] – (re)starts the forget timer when a target leaves
//! - [`leave_timer_observer`] – clears the detected flag when a forget timer fires
//!
//! # Event Flow
//!
//! 1. `trigger_detector` emits `TriggerEnterEvent` / `TriggerExitEvent`
//! 2. The enter observer runs the sensor classifier; on a match the flag is
//!    set, the pending forget timer is cancelled and the handler of the
//!    sensor's slot runs
//! 3. The exit observer cancels the pending timer and schedules a new one
//! 4. `update_leave_timers` emits `LeaveTimerExpired`, and the timer observer
//!    clears the flag if the handle is still the one the sensor waits on

use bevy_ecs::lifecycle::Remove;
use bevy_ecs::prelude::*;
use log::{debug, error, info};

use crate::components::detectionhandlers::DetectionHandlers;
use crate::components::detectionsensor::{DetectionSensor, InvalidSensor, SubjectView};
use crate::components::layer::PhysicsLayer;
use crate::components::tag::Tag;
use crate::events::timer::LeaveTimerExpired;
use crate::events::trigger::{TriggerEnterEvent, TriggerExitEvent};
use crate::resources::leavetimers::LeaveTimers;

/// Validate every sensor added or modified since the last run.
///
/// Sensors that fail get an [`InvalidSensor`] marker and are ignored by the
/// detection observers. A marked sensor whose configuration has been fixed
/// loses the marker again.
pub fn validate_sensors(
    sensors: Query<(Entity, &DetectionSensor, Option<&InvalidSensor>), Changed<DetectionSensor>>,
    mut commands: Commands,
) {
    for (entity, sensor, marker) in sensors.iter() {
        match (sensor.validate(), marker) {
            (Err(reason), Some(InvalidSensor(previous))) if *previous == reason => {}
            (Err(reason), _) => {
                error!("Sensor {:?} disabled: {}", entity, reason);
                commands.entity(entity).insert(InvalidSensor(reason));
            }
            (Ok(()), Some(_)) => {
                info!("Sensor {:?} re-enabled", entity);
                commands.entity(entity).remove::<InvalidSensor>();
            }
            (Ok(()), None) => {}
        }
    }
}

/// Drop the pending forget timers of a sensor that is removed or despawned.
pub fn sensor_removed_observer(
    trigger: On<Remove, DetectionSensor>,
    mut timers: ResMut<LeaveTimers>,
) {
    let sensor = trigger.event().entity;
    let cancelled = timers.cancel_all_for(sensor);
    if cancelled > 0 {
        debug!("Sensor {:?} removed, cancelled {} forget timer(s)", sensor, cancelled);
    }
}

pub fn detection_enter_observer(
    trigger: On<TriggerEnterEvent>,
    mut sensors: Query<(&mut DetectionSensor, Option<&DetectionHandlers>), Without<InvalidSensor>>,
    subjects: Query<(Option<&Tag>, Option<&PhysicsLayer>)>,
    mut timers: ResMut<LeaveTimers>,
    mut commands: Commands,
) {
    let event = trigger.event();
    let Ok((mut sensor, handlers)) = sensors.get_mut(event.volume) else {
        return;
    };
    let Ok((tag, layer)) = subjects.get(event.other) else {
        return;
    };
    let subject = SubjectView {
        entity: event.other,
        tag,
        layer,
    };

    let was_detected = sensor.is_detected();
    let Some(slot) = sensor.on_enter(&subject, &mut *timers) else {
        return;
    };
    if !was_detected {
        info!(
            "Sensor {:?} detected {:?} by {}",
            event.volume, event.other, sensor.method
        );
    }
    if let Some(handlers) = handlers {
        handlers.invoke(slot, event.volume, &mut commands);
    }
}

pub fn detection_exit_observer(
    trigger: On<TriggerExitEvent>,
    mut sensors: Query<&mut DetectionSensor, Without<InvalidSensor>>,
    subjects: Query<(Option<&Tag>, Option<&PhysicsLayer>)>,
    mut timers: ResMut<LeaveTimers>,
) {
    let event = trigger.event();
    let Ok(mut sensor) = sensors.get_mut(event.volume) else {
        return;
    };
    let Ok((tag, layer)) = subjects.get(event.other) else {
        return;
    };
    let subject = SubjectView {
        entity: event.other,
        tag,
        layer,
    };
    sensor.on_exit(event.volume, &subject, &mut *timers);
}

pub fn leave_timer_observer(
    trigger: On<LeaveTimerExpired>,
    mut sensors: Query<&mut DetectionSensor>,
) {
    let event = trigger.event();
    let Ok(mut sensor) = sensors.get_mut(event.sensor) else {
        return;
    };
    if sensor.on_reset_elapsed(event.handle) {
        info!("Sensor {:?} lost track of its target", event.sensor);
    }
}
