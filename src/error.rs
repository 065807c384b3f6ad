//! Error types shared by the sensor, configuration, and scene modules.

use std::path::PathBuf;

use bevy_ecs::prelude::Entity;
use thiserror::Error;

/// A [`DetectionSensor`](crate::components::detectionsensor::DetectionSensor)
/// whose configuration cannot work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorConfigError {
    #[error("game-object detection requires a target entity")]
    MissingTarget,
    #[error("tag detection requires a non-empty tag")]
    EmptyTag,
    #[error("layer detection requires a non-empty layer mask")]
    EmptyLayerMask,
    #[error("leave duration must be a finite, non-negative number of seconds (got {0})")]
    InvalidLeaveDuration(f32),
    #[error("line of sight is required but no ray origin is configured")]
    MissingLineOfSightOrigin,
    #[error("unknown detection method '{0}' (expected tag, layer or gameobject)")]
    UnknownMethod(String),
}

/// Failure of an explicit line-of-sight query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineOfSightError {
    #[error("no line-of-sight origin is configured")]
    MissingOrigin,
    #[error("line-of-sight origin {0:?} has no position")]
    OriginWithoutPosition(Entity),
    #[error("no target to check line of sight against")]
    MissingTarget,
    #[error("line-of-sight target {0:?} has no position")]
    TargetWithoutPosition(Entity),
    #[error("sensor {0:?} does not exist")]
    UnknownSensor(Entity),
}

/// Errors produced while loading or saving the INI configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config file {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },
    #[error("failed to save config file {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid value for [{section}] {key}: {reason}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Sensor(#[from] SensorConfigError),
}

/// Errors produced while loading or spawning a JSON scene.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scene file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scene references unknown entity '{0}'")]
    UnknownEntity(String),
    #[error("scene defines '{0}' more than once")]
    DuplicateName(String),
    #[error("sensor '{name}' is misconfigured: {source}")]
    Sensor {
        name: String,
        #[source]
        source: SensorConfigError,
    },
}
