//! World setup and the per-frame update schedule.
//!
//! [`init_world`] inserts the shared resources and registers every observer;
//! [`build_update_schedule`] orders the systems of one frame:
//!
//! 1. `validate_sensors` – mark misconfigured sensors before they can detect,
//!    and clear the mark once a sensor is fixed
//! 2. `update_leave_timers` – fire forget timers that reached their deadline
//! 3. `movement` – integrate rigid body velocities
//! 4. `trigger_detector` – emit trigger enter/exit events
//! 5. `request_line_of_sight` – optional per-frame line-of-sight sampling
//!
//! A timer scheduled by an exit starts counting on the next frame.
//!
//! [`step`] runs one frame the same way the binary's main loop does.

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;

use crate::resources::leavetimers::LeaveTimers;
use crate::resources::sensorconfig::SensorConfig;
use crate::resources::worldtime::WorldTime;
use crate::systems::detection::{
    detection_enter_observer, detection_exit_observer, leave_timer_observer,
    sensor_removed_observer, validate_sensors,
};
use crate::systems::lineofsight::{line_of_sight_observer, request_line_of_sight};
use crate::systems::movement::movement;
use crate::systems::time::{update_leave_timers, update_world_time};
use crate::systems::trigger::trigger_detector;

/// Insert resources and observers into `world`.
pub fn init_world(world: &mut World, config: SensorConfig) {
    world.insert_resource(WorldTime::default().with_time_scale(config.simulation.time_scale));
    world.insert_resource(LeaveTimers::new());
    world.insert_resource(config);

    world.spawn(Observer::new(detection_enter_observer));
    world.spawn(Observer::new(detection_exit_observer));
    world.spawn(Observer::new(leave_timer_observer));
    world.spawn(Observer::new(sensor_removed_observer));
    world.spawn(Observer::new(line_of_sight_observer));
    // Ensure the observers are registered before any system triggers events.
    world.flush();
}

pub fn build_update_schedule(sample_line_of_sight: bool) -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(
        (
            validate_sensors,
            update_leave_timers,
            movement,
            trigger_detector,
        )
            .chain(),
    );
    if sample_line_of_sight {
        update.add_systems(request_line_of_sight.after(trigger_detector));
    }
    update
}

/// Advance the world by one frame of `dt` unscaled seconds.
pub fn step(world: &mut World, update: &mut Schedule, dt: f32) {
    update_world_time(world, dt);
    update.run(world);
    world.clear_trackers();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::collider::Collider;
    use crate::components::detectionsensor::DetectionSensor;
    use crate::components::mapposition::MapPosition;
    use crate::components::rigidbody::RigidBody;
    use crate::components::tag::Tag;
    use crate::components::triggercontacts::TriggerContacts;
    use glam::Vec3;

    #[test]
    fn test_init_world_inserts_resources() {
        let mut world = World::new();
        let mut config = SensorConfig::new();
        config.simulation.time_scale = 0.5;
        init_world(&mut world, config);
        assert!(world.contains_resource::<LeaveTimers>());
        assert!(world.contains_resource::<SensorConfig>());
        assert!((world.resource::<WorldTime>().time_scale - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_walk_through_detects_then_forgets() {
        let mut world = World::new();
        init_world(&mut world, SensorConfig::new());
        let sensor = world
            .spawn((
                MapPosition::new(0.0, 0.0, 0.0),
                Collider::ball(2.0).trigger(),
                TriggerContacts::default(),
                DetectionSensor::by_tag("Player").with_leave_duration(0.5),
            ))
            .id();
        world.spawn((
            MapPosition::new(-3.0, 0.0, 0.0),
            RigidBody::with_velocity(Vec3::new(10.0, 0.0, 0.0)),
            Collider::ball(0.5),
            Tag::new("Player"),
        ));

        let mut update = build_update_schedule(false);
        let mut seen = false;
        // 0.1s frames: inside the volume between x=-2.5 and x=2.5
        for _ in 0..5 {
            step(&mut world, &mut update, 0.1);
            seen |= world.get::<DetectionSensor>(sensor).unwrap().is_detected();
        }
        assert!(seen);
        for _ in 0..10 {
            step(&mut world, &mut update, 0.1);
        }
        assert!(!world.get::<DetectionSensor>(sensor).unwrap().is_detected());
        assert_eq!(world.resource::<WorldTime>().frame_count, 15);
    }
}
