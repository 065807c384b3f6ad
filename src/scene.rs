//! Data-driven scene description.
//!
//! A scene is a JSON document listing named bodies and named sensors. Bodies
//! are plain colliders that may move with a constant velocity; sensors own a
//! trigger volume and a [`DetectionSensor`]. Sensor fields that are omitted
//! fall back to the [`SensorDefaults`] loaded from the INI configuration.
//!
//! Entity references (`target`, `line_of_sight_origin`) are names, resolved
//! after every entity of the scene has been spawned. Loading is all or
//! nothing: a scene that fails to resolve spawns no entity at all.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "bodies": [
//!     { "name": "player", "position": [-10.0, 0.0, 0.0], "velocity": [4.0, 0.0, 0.0],
//!       "collider": { "shape": "sphere", "radius": 0.5 }, "tag": "Player", "layer": 3 }
//!   ],
//!   "sensors": [
//!     { "name": "guard", "position": [0.0, 0.0, 0.0],
//!       "collider": { "shape": "sphere", "radius": 5.0 },
//!       "method": "tag", "tag": "Player", "leave_duration": 2.0 }
//!   ]
//! }
//! ```

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::info;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::components::collider::{Collider, ColliderShape};
use crate::components::detectionsensor::{DetectionMethod, DetectionSensor};
use crate::components::facing::Facing;
use crate::components::layer::{LayerMask, PhysicsLayer};
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::components::tag::Tag;
use crate::components::triggercontacts::TriggerContacts;
use crate::error::SceneError;
use crate::resources::sensorconfig::SensorDefaults;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SceneData {
    #[serde(default)]
    pub bodies: Vec<BodyData>,
    #[serde(default)]
    pub sensors: Vec<SensorData>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BodyData {
    pub name: String,
    pub position: Vec3,
    #[serde(default)]
    pub velocity: Vec3,
    /// Bodies without a collider are pure reference points (e.g. ray origins).
    #[serde(default)]
    pub collider: Option<ColliderShape>,
    #[serde(default)]
    pub trigger: bool,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub layer: Option<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SensorData {
    pub name: String,
    pub position: Vec3,
    /// Sensors may patrol too.
    #[serde(default)]
    pub velocity: Vec3,
    pub collider: ColliderShape,
    #[serde(default)]
    pub method: Option<DetectionMethod>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub layer_mask: Option<LayerMask>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub line_of_sight: Option<bool>,
    #[serde(default)]
    pub line_of_sight_origin: Option<String>,
    #[serde(default)]
    pub line_of_sight_tag: Option<String>,
    #[serde(default)]
    pub leave_duration: Option<f32>,
    #[serde(default)]
    pub detected: Option<bool>,
}

/// Spawned scene entities by name.
pub type SceneEntities = FxHashMap<String, Entity>;

impl SceneData {
    /// Loads scene data from a JSON file at the specified path.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, SceneError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// A guard watching for a player who walks straight through its range.
    pub fn demo() -> Self {
        SceneData {
            bodies: vec![
                BodyData {
                    name: "player".to_string(),
                    position: Vec3::new(-10.0, 0.0, 0.0),
                    velocity: Vec3::new(4.0, 0.0, 0.0),
                    collider: Some(ColliderShape::Sphere { radius: 0.5 }),
                    trigger: false,
                    tag: Some("Player".to_string()),
                    layer: Some(3),
                },
                BodyData {
                    name: "guard_eye".to_string(),
                    position: Vec3::new(0.0, 1.5, 0.0),
                    velocity: Vec3::ZERO,
                    collider: None,
                    trigger: false,
                    tag: None,
                    layer: None,
                },
            ],
            sensors: vec![SensorData {
                name: "guard".to_string(),
                position: Vec3::ZERO,
                velocity: Vec3::ZERO,
                collider: ColliderShape::Sphere { radius: 5.0 },
                method: Some(DetectionMethod::Tag),
                tag: Some("Player".to_string()),
                layer_mask: None,
                target: None,
                line_of_sight: Some(true),
                line_of_sight_origin: Some("guard_eye".to_string()),
                line_of_sight_tag: None,
                leave_duration: Some(2.0),
                detected: None,
            }],
        }
    }

    /// Every name in the scene, or the first one that is used twice.
    fn unique_names(&self) -> Result<FxHashSet<&str>, SceneError> {
        let mut seen = FxHashSet::default();
        let names = self
            .bodies
            .iter()
            .map(|b| &b.name)
            .chain(self.sensors.iter().map(|s| &s.name));
        for name in names {
            if !seen.insert(name.as_str()) {
                return Err(SceneError::DuplicateName(name.clone()));
            }
        }
        Ok(seen)
    }
}

impl SensorData {
    fn to_sensor(
        &self,
        defaults: &SensorDefaults,
        lookup: impl Fn(&str) -> Option<Entity>,
    ) -> Result<DetectionSensor, SceneError> {
        let resolve =
            |name: &String| lookup(name).ok_or_else(|| SceneError::UnknownEntity(name.clone()));
        let mut sensor = defaults.to_sensor();
        if let Some(method) = self.method {
            sensor.method = method;
        }
        if let Some(tag) = &self.tag {
            sensor.tag = tag.clone();
        }
        if let Some(mask) = self.layer_mask {
            sensor.layer_mask = mask;
        }
        if let Some(target) = &self.target {
            sensor.target = Some(resolve(target)?);
        }
        if let Some(required) = self.line_of_sight {
            sensor.line_of_sight_required = required;
        }
        if let Some(origin) = &self.line_of_sight_origin {
            sensor.line_of_sight_origin = Some(resolve(origin)?);
        }
        if let Some(tag) = &self.line_of_sight_tag {
            sensor.line_of_sight_tag = tag.clone();
        }
        if let Some(duration) = self.leave_duration {
            sensor.leave_duration = duration;
        }
        if let Some(detected) = self.detected {
            sensor = sensor.initially_detected(detected);
        }
        sensor.validate().map_err(|source| SceneError::Sensor {
            name: self.name.clone(),
            source,
        })?;
        Ok(sensor)
    }
}

/// Spawn every body and sensor of `scene` into `world`.
///
/// The scene is checked as a whole before the first entity is spawned, so a
/// duplicated name, an unknown entity reference or a misconfigured sensor
/// ([`SceneError::Sensor`]) leaves `world` untouched.
pub fn spawn_scene(
    world: &mut World,
    scene: &SceneData,
    defaults: &SensorDefaults,
) -> Result<SceneEntities, SceneError> {
    let names = scene.unique_names()?;
    for data in &scene.sensors {
        data.to_sensor(defaults, |name| {
            names.contains(name).then_some(Entity::PLACEHOLDER)
        })?;
    }
    let mut entities = SceneEntities::default();

    for body in &scene.bodies {
        let mut entity = world.spawn((
            MapPosition::from_vec3(body.position),
            RigidBody::with_velocity(body.velocity),
        ));
        if let Some(shape) = body.collider {
            entity.insert(Collider {
                shape,
                offset: Vec3::ZERO,
                is_trigger: body.trigger,
            });
        }
        if let Some(tag) = &body.tag {
            entity.insert(Tag::new(tag.clone()));
        }
        if let Some(layer) = body.layer {
            entity.insert(PhysicsLayer(layer));
        }
        entities.insert(body.name.clone(), entity.id());
    }

    for sensor in &scene.sensors {
        let id = world
            .spawn((
                MapPosition::from_vec3(sensor.position),
                RigidBody::with_velocity(sensor.velocity),
                Collider {
                    shape: sensor.collider,
                    offset: Vec3::ZERO,
                    is_trigger: true,
                },
                TriggerContacts::default(),
                Facing::default(),
            ))
            .id();
        entities.insert(sensor.name.clone(), id);
    }

    for data in &scene.sensors {
        let sensor = data.to_sensor(defaults, |name| entities.get(name).copied())?;
        world.entity_mut(entities[&data.name]).insert(sensor);
    }

    info!(
        "Spawned scene: {} bodies, {} sensors",
        scene.bodies.len(),
        scene.sensors.len()
    );
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_scene_spawns_and_resolves_origin() {
        let mut world = World::new();
        let entities =
            spawn_scene(&mut world, &SceneData::demo(), &SensorDefaults::default()).unwrap();
        let guard = entities["guard"];
        let sensor = world.get::<DetectionSensor>(guard).unwrap();
        assert_eq!(sensor.line_of_sight_origin, Some(entities["guard_eye"]));
        assert!(world.get::<Collider>(guard).unwrap().is_trigger);
        assert!(world.get::<Collider>(entities["guard_eye"]).is_none());
        assert_eq!(
            world.get::<Tag>(entities["player"]),
            Some(&Tag::new("Player"))
        );
    }

    #[test]
    fn test_sensor_fields_fall_back_to_defaults() {
        let scene = SceneData::from_json(
            r#"{ "sensors": [ { "name": "s", "position": [0, 0, 0],
                 "collider": { "shape": "box", "half_extents": [1, 1, 1] } } ] }"#,
        )
        .unwrap();
        let defaults = SensorDefaults {
            tag: "Intruder".to_string(),
            leave_duration: 4.0,
            ..SensorDefaults::default()
        };
        let mut world = World::new();
        let entities = spawn_scene(&mut world, &scene, &defaults).unwrap();
        let sensor = world.get::<DetectionSensor>(entities["s"]).unwrap();
        assert_eq!(sensor.tag, "Intruder");
        assert!((sensor.leave_duration - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_reference_is_an_error() {
        let scene = SceneData::from_json(
            r#"{ "sensors": [ { "name": "s", "position": [0, 0, 0],
                 "collider": { "shape": "sphere", "radius": 1 },
                 "method": "gameobject", "target": "ghost" } ] }"#,
        )
        .unwrap();
        let mut world = World::new();
        let err = spawn_scene(&mut world, &scene, &SensorDefaults::default()).unwrap_err();
        assert!(matches!(err, SceneError::UnknownEntity(name) if name == "ghost"));
        assert_eq!(world.query::<Entity>().iter(&world).count(), 0);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut scene = SceneData::demo();
        scene.bodies[1].name = "player".to_string();
        let mut world = World::new();
        let err = spawn_scene(&mut world, &scene, &SensorDefaults::default()).unwrap_err();
        assert!(matches!(err, SceneError::DuplicateName(name) if name == "player"));
        assert_eq!(world.query::<Entity>().iter(&world).count(), 0);
    }

    #[test]
    fn test_misconfigured_sensor_is_reported_by_name() {
        let scene = SceneData::from_json(
            r#"{ "sensors": [ { "name": "blind", "position": [0, 0, 0],
                 "collider": { "shape": "sphere", "radius": 1 },
                 "line_of_sight": true } ] }"#,
        )
        .unwrap();
        let mut world = World::new();
        let err = spawn_scene(&mut world, &scene, &SensorDefaults::default()).unwrap_err();
        assert!(matches!(err, SceneError::Sensor { name, .. } if name == "blind"));
        assert_eq!(world.query::<Entity>().iter(&world).count(), 0);
    }

    #[test]
    fn test_failed_load_leaves_no_bodies_behind() {
        let scene = SceneData::from_json(
            r#"{ "bodies": [ { "name": "wall", "position": [1, 0, 0],
                 "collider": { "shape": "box", "half_extents": [1, 1, 1] } } ],
               "sensors": [
                 { "name": "ok", "position": [0, 0, 0],
                   "collider": { "shape": "sphere", "radius": 1 }, "tag": "Player" },
                 { "name": "watcher", "position": [0, 0, 0],
                   "collider": { "shape": "sphere", "radius": 1 },
                   "line_of_sight": true, "line_of_sight_origin": "wall",
                   "method": "gameobject", "target": "ghost" } ] }"#,
        )
        .unwrap();
        let mut world = World::new();
        let err = spawn_scene(&mut world, &scene, &SensorDefaults::default()).unwrap_err();
        assert!(matches!(err, SceneError::UnknownEntity(name) if name == "ghost"));
        assert_eq!(world.query::<Entity>().iter(&world).count(), 0);

        // The same scene loads once the reference exists.
        let mut fixed = scene.clone();
        fixed.sensors[1].target = Some("ok".to_string());
        let entities = spawn_scene(&mut world, &fixed, &SensorDefaults::default()).unwrap();
        let watcher = world.get::<DetectionSensor>(entities["watcher"]).unwrap();
        assert_eq!(watcher.target, Some(entities["ok"]));
        assert_eq!(watcher.line_of_sight_origin, Some(entities["wall"]));
    }
}
