//! Line-of-sight queries.
//!
//! A line-of-sight sample casts a single ray from the sensor's configured
//! origin toward its target and looks at the first solid collider hit. If that
//! collider carries the sensor's line-of-sight tag, the target is visible and
//! the sensor is turned to face it.
//!
//! Samples are one-shot and never re-evaluated automatically. Hosts ask for
//! one by triggering [`LineOfSightRequest`], by calling [`check_line_of_sight`]
//! with exclusive world access, or by scheduling [`request_line_of_sight`],
//! which requests a sample every frame for each detected sensor that requires
//! line of sight.
//!
//! The target is the sensor's explicit `target` entity when set, otherwise the
//! entity it detected most recently.

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, warn};

use crate::components::collider::Collider;
use crate::components::detectionsensor::{DetectionSensor, InvalidSensor};
use crate::components::facing::Facing;
use crate::components::mapposition::MapPosition;
use crate::components::tag::Tag;
use crate::error::LineOfSightError;
use crate::events::lineofsight::LineOfSightRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOfSightOutcome {
    /// The sensor has not detected anything, so no ray was cast.
    NotDetected,
    /// The first hit carries the line-of-sight tag.
    Clear { target: Entity, hit: Entity },
    /// Nothing was hit, or the first hit is not tagged for line of sight.
    Obstructed { target: Entity, hit: Option<Entity> },
}

impl LineOfSightOutcome {
    pub fn is_clear(self) -> bool {
        matches!(self, LineOfSightOutcome::Clear { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
    pub point: Vec3,
}

/// A solid collider a ray can hit.
#[derive(Debug, Clone, Copy)]
pub struct Obstacle<'a> {
    pub entity: Entity,
    pub collider: &'a Collider,
    pub position: Vec3,
    pub tag: Option<&'a Tag>,
}

/// Cast an unbounded ray and return the closest hit.
///
/// Trigger colliders and the `ignore` entity are skipped. `direction` does
/// not need to be normalized; a zero direction hits nothing.
pub fn raycast<'a>(
    origin: Vec3,
    direction: Vec3,
    obstacles: impl IntoIterator<Item = Obstacle<'a>>,
    ignore: Option<Entity>,
) -> Option<(RayHit, Option<&'a Tag>)> {
    let direction = direction.try_normalize()?;
    obstacles
        .into_iter()
        .filter(|obstacle| !obstacle.collider.is_trigger && Some(obstacle.entity) != ignore)
        .filter_map(|obstacle| {
            obstacle
                .collider
                .ray_distance(obstacle.position, origin, direction)
                .map(|distance| {
                    let hit = RayHit {
                        entity: obstacle.entity,
                        distance,
                        point: origin + direction * distance,
                    };
                    (hit, obstacle.tag)
                })
        })
        .min_by(|(a, _), (b, _)| a.distance.total_cmp(&b.distance))
}

/// Evaluate line of sight for `sensor` without touching the world.
///
/// `position_of` resolves entity positions. The origin is resolved first, so a
/// missing origin is reported even when nothing is detected.
pub fn evaluate_line_of_sight<'a>(
    sensor: &DetectionSensor,
    position_of: impl Fn(Entity) -> Option<Vec3>,
    obstacles: impl IntoIterator<Item = Obstacle<'a>>,
) -> Result<LineOfSightOutcome, LineOfSightError> {
    let origin = sensor
        .line_of_sight_origin
        .ok_or(LineOfSightError::MissingOrigin)?;
    let origin_position =
        position_of(origin).ok_or(LineOfSightError::OriginWithoutPosition(origin))?;

    if !sensor.is_detected() {
        return Ok(LineOfSightOutcome::NotDetected);
    }

    let target = sensor
        .target
        .or(sensor.last_detected())
        .ok_or(LineOfSightError::MissingTarget)?;
    let target_position =
        position_of(target).ok_or(LineOfSightError::TargetWithoutPosition(target))?;

    let hit = raycast(
        origin_position,
        target_position - origin_position,
        obstacles,
        Some(origin),
    );
    let outcome = match hit {
        Some((hit, Some(tag))) if tag.is(&sensor.line_of_sight_tag) => LineOfSightOutcome::Clear {
            target,
            hit: hit.entity,
        },
        Some((hit, _)) => LineOfSightOutcome::Obstructed {
            target,
            hit: Some(hit.entity),
        },
        None => LineOfSightOutcome::Obstructed { target, hit: None },
    };
    Ok(outcome)
}

/// Turn the sensor toward its target when the outcome is clear.
fn face_target(
    outcome: LineOfSightOutcome,
    sensor_position: Option<Vec3>,
    target_position: Option<Vec3>,
    facing: Option<&mut Facing>,
) {
    if let (LineOfSightOutcome::Clear { .. }, Some(from), Some(to), Some(facing)) =
        (outcome, sensor_position, target_position, facing)
    {
        facing.look_at(from, to);
    }
}

fn outcome_target(outcome: LineOfSightOutcome) -> Option<Entity> {
    match outcome {
        LineOfSightOutcome::NotDetected => None,
        LineOfSightOutcome::Clear { target, .. } | LineOfSightOutcome::Obstructed { target, .. } => {
            Some(target)
        }
    }
}

/// Sample line of sight for `sensor` with exclusive world access.
///
/// Stores the outcome on the sensor and updates its [`Facing`] on success.
pub fn check_line_of_sight(
    world: &mut World,
    sensor: Entity,
) -> Result<LineOfSightOutcome, LineOfSightError> {
    let outcome = {
        let mut obstacles = world.query::<(Entity, &Collider, &MapPosition, Option<&Tag>)>();
        let world_ref: &World = world;
        let config = world_ref
            .get::<DetectionSensor>(sensor)
            .ok_or(LineOfSightError::UnknownSensor(sensor))?;
        evaluate_line_of_sight(
            config,
            |entity| world_ref.get::<MapPosition>(entity).map(|p| p.pos),
            obstacles
                .iter(world_ref)
                .map(|(entity, collider, position, tag)| Obstacle {
                    entity,
                    collider,
                    position: position.pos,
                    tag,
                }),
        )?
    };

    let sensor_position = world.get::<MapPosition>(sensor).map(|p| p.pos);
    let target_position =
        outcome_target(outcome).and_then(|t| world.get::<MapPosition>(t).map(|p| p.pos));
    let mut entity = world.entity_mut(sensor);
    if let Some(mut config) = entity.get_mut::<DetectionSensor>() {
        config.record_line_of_sight(outcome);
    }
    let mut facing = entity.get_mut::<Facing>();
    face_target(
        outcome,
        sensor_position,
        target_position,
        facing.as_deref_mut(),
    );
    Ok(outcome)
}

/// Observer answering [`LineOfSightRequest`]s.
///
/// Failures are logged and leave the stored outcome untouched.
pub fn line_of_sight_observer(
    trigger: On<LineOfSightRequest>,
    mut sensors: Query<(&mut DetectionSensor, Option<&mut Facing>)>,
    positions: Query<&MapPosition>,
    obstacles: Query<(Entity, &Collider, &MapPosition, Option<&Tag>)>,
) {
    let entity = trigger.event().sensor;
    let Ok((mut sensor, facing)) = sensors.get_mut(entity) else {
        warn!("Line of sight requested for unknown sensor {:?}", entity);
        return;
    };
    let position_of = |e: Entity| positions.get(e).ok().map(|p| p.pos);

    let result = evaluate_line_of_sight(
        &sensor,
        position_of,
        obstacles
            .iter()
            .map(|(entity, collider, position, tag)| Obstacle {
                entity,
                collider,
                position: position.pos,
                tag,
            }),
    );
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!("Line of sight for {:?} failed: {}", entity, err);
            return;
        }
    };
    debug!("Line of sight for {:?}: {:?}", entity, outcome);

    sensor.record_line_of_sight(outcome);
    face_target(
        outcome,
        position_of(entity),
        outcome_target(outcome).and_then(position_of),
        facing.map(|f| f.into_inner()),
    );
}

/// Request a line-of-sight sample for every detected sensor that requires it.
pub fn request_line_of_sight(
    sensors: Query<(Entity, &DetectionSensor), Without<InvalidSensor>>,
    mut commands: Commands,
) {
    for (entity, sensor) in sensors.iter() {
        if sensor.line_of_sight_required && sensor.is_detected() {
            commands.trigger(LineOfSightRequest { sensor: entity });
        }
    }
}
