//! Sensor and simulation configuration resource.
//!
//! Holds the default settings for every sensor spawned without explicit
//! values, plus the headless simulation parameters. Values are loaded from an
//! INI file; keys that are absent keep their defaults, keys that are present
//! but malformed are reported as errors.
//!
//! # Configuration File Format
//!
//! ```ini
//! [sensor]
//! method = tag
//! tag = Player
//! layer_mask = 1
//! line_of_sight = false
//! line_of_sight_tag = Player
//! leave_duration = 2.0
//! detected = false
//!
//! [simulation]
//! frames = 600
//! delta = 0.016666
//! time_scale = 1.0
//! sample_line_of_sight = false
//! ```

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;

use crate::components::detectionsensor::{
    DEFAULT_LEAVE_DURATION, DEFAULT_LINE_OF_SIGHT_TAG, DetectionMethod, DetectionSensor,
};
use crate::components::layer::LayerMask;
use crate::error::ConfigError;

const DEFAULT_TAG: &str = "Player";
const DEFAULT_LAYER_MASK: u32 = 1;
const DEFAULT_FRAMES: u64 = 600;
const DEFAULT_DELTA: f32 = 1.0 / 60.0;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Default values applied to sensors that do not override them.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDefaults {
    pub method: DetectionMethod,
    pub tag: String,
    pub layer_mask: LayerMask,
    pub line_of_sight_required: bool,
    pub line_of_sight_tag: String,
    pub leave_duration: f32,
    pub initially_detected: bool,
}

impl Default for SensorDefaults {
    fn default() -> Self {
        Self {
            method: DetectionMethod::Tag,
            tag: DEFAULT_TAG.to_string(),
            layer_mask: LayerMask(DEFAULT_LAYER_MASK),
            line_of_sight_required: false,
            line_of_sight_tag: DEFAULT_LINE_OF_SIGHT_TAG.to_string(),
            leave_duration: DEFAULT_LEAVE_DURATION,
            initially_detected: false,
        }
    }
}

impl SensorDefaults {
    /// Build a sensor from these defaults. Entity references (target and
    /// line-of-sight origin) are left unset.
    pub fn to_sensor(&self) -> DetectionSensor {
        let mut sensor = DetectionSensor::default();
        sensor.method = self.method;
        sensor.tag = self.tag.clone();
        sensor.layer_mask = self.layer_mask;
        sensor.line_of_sight_required = self.line_of_sight_required;
        sensor.line_of_sight_tag = self.line_of_sight_tag.clone();
        sensor.leave_duration = self.leave_duration;
        sensor.initially_detected(self.initially_detected)
    }
}

/// Parameters of the headless simulation loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub frames: u64,
    /// Unscaled seconds per frame.
    pub delta: f32,
    pub time_scale: f32,
    /// Sample line of sight every frame for sensors that require it.
    pub sample_line_of_sight: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            frames: DEFAULT_FRAMES,
            delta: DEFAULT_DELTA,
            time_scale: DEFAULT_TIME_SCALE,
            sample_line_of_sight: false,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SensorConfig {
    pub sensor: SensorDefaults,
    pub simulation: SimulationSettings,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(section: &'static str, key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        section,
        key,
        reason: reason.into(),
    }
}

impl SensorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            sensor: SensorDefaults::default(),
            simulation: SimulationSettings::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file at `config_path`.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        ini.load(&self.config_path).map_err(|reason| ConfigError::Load {
            path: self.config_path.clone(),
            reason,
        })?;
        self.apply_ini(&ini)?;
        info!(
            "Loaded config from {}: method={}, leave_duration={}s, frames={}",
            self.config_path.display(),
            self.sensor.method,
            self.sensor.leave_duration,
            self.simulation.frames
        );
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, contents: &str) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        ini.read(contents.to_string())
            .map_err(|reason| ConfigError::Load {
                path: self.config_path.clone(),
                reason,
            })?;
        self.apply_ini(&ini)
    }

    fn apply_ini(&mut self, ini: &Ini) -> Result<(), ConfigError> {
        // [sensor] section
        if let Some(method) = ini.get("sensor", "method") {
            self.sensor.method = method.parse()?;
        }
        if let Some(tag) = ini.get("sensor", "tag") {
            self.sensor.tag = tag;
        }
        if let Some(mask) = ini
            .getuint("sensor", "layer_mask")
            .map_err(|e| invalid("sensor", "layer_mask", e))?
        {
            let mask = u32::try_from(mask)
                .map_err(|_| invalid("sensor", "layer_mask", "mask does not fit in 32 bits"))?;
            self.sensor.layer_mask = LayerMask(mask);
        }
        if let Some(required) = ini
            .getbool("sensor", "line_of_sight")
            .map_err(|e| invalid("sensor", "line_of_sight", e))?
        {
            self.sensor.line_of_sight_required = required;
        }
        if let Some(tag) = ini.get("sensor", "line_of_sight_tag") {
            self.sensor.line_of_sight_tag = tag;
        }
        if let Some(duration) = ini
            .getfloat("sensor", "leave_duration")
            .map_err(|e| invalid("sensor", "leave_duration", e))?
        {
            let duration = duration as f32;
            if !duration.is_finite() || duration < 0.0 {
                return Err(invalid(
                    "sensor",
                    "leave_duration",
                    format!("{duration} is not a non-negative number of seconds"),
                ));
            }
            self.sensor.leave_duration = duration;
        }
        if let Some(detected) = ini
            .getbool("sensor", "detected")
            .map_err(|e| invalid("sensor", "detected", e))?
        {
            self.sensor.initially_detected = detected;
        }

        // [simulation] section
        if let Some(frames) = ini
            .getuint("simulation", "frames")
            .map_err(|e| invalid("simulation", "frames", e))?
        {
            self.simulation.frames = frames;
        }
        if let Some(delta) = ini
            .getfloat("simulation", "delta")
            .map_err(|e| invalid("simulation", "delta", e))?
        {
            if !(delta > 0.0 && delta.is_finite()) {
                return Err(invalid("simulation", "delta", "must be positive"));
            }
            self.simulation.delta = delta as f32;
        }
        if let Some(scale) = ini
            .getfloat("simulation", "time_scale")
            .map_err(|e| invalid("simulation", "time_scale", e))?
        {
            if !(scale >= 0.0 && scale.is_finite()) {
                return Err(invalid("simulation", "time_scale", "must be non-negative"));
            }
            self.simulation.time_scale = scale as f32;
        }
        if let Some(sample) = ini
            .getbool("simulation", "sample_line_of_sight")
            .map_err(|e| invalid("simulation", "sample_line_of_sight", e))?
        {
            self.simulation.sample_line_of_sight = sample;
        }
        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        // [sensor] section
        ini.set("sensor", "method", Some(self.sensor.method.to_string()));
        ini.set("sensor", "tag", Some(self.sensor.tag.clone()));
        ini.set("sensor", "layer_mask", Some(self.sensor.layer_mask.0.to_string()));
        ini.set(
            "sensor",
            "line_of_sight",
            Some(self.sensor.line_of_sight_required.to_string()),
        );
        ini.set(
            "sensor",
            "line_of_sight_tag",
            Some(self.sensor.line_of_sight_tag.clone()),
        );
        ini.set(
            "sensor",
            "leave_duration",
            Some(self.sensor.leave_duration.to_string()),
        );
        ini.set(
            "sensor",
            "detected",
            Some(self.sensor.initially_detected.to_string()),
        );

        // [simulation] section
        ini.set("simulation", "frames", Some(self.simulation.frames.to_string()));
        ini.set("simulation", "delta", Some(self.simulation.delta.to_string()));
        ini.set(
            "simulation",
            "time_scale",
            Some(self.simulation.time_scale.to_string()),
        );
        ini.set(
            "simulation",
            "sample_line_of_sight",
            Some(self.simulation.sample_line_of_sight.to_string()),
        );
        ini
    }

    /// Save configuration to the INI file. Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        self.to_ini()
            .write(&self.config_path)
            .map_err(|source| ConfigError::Save {
                path: self.config_path.clone(),
                source,
            })?;
        info!("Saved config to {}", self.config_path.display());
        Ok(())
    }
}
