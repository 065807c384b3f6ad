//! Detection sensor headless runner.
//!
//! Loads sensor defaults from an INI file and a scene from JSON, then steps
//! the simulation for a fixed number of frames using:
//! - **bevy_ecs** for entity-component-system architecture
//! - **glam** for 3D vector math
//!
//! Detection changes are reported through the `log` facade; set `RUST_LOG`
//! to `debug` to also see every trigger contact and timer.
//!
//! # Main Loop
//!
//! 1. Parse the command line and load `config.ini` (defaults if absent)
//! 2. Spawn the scene (the built-in demo when `--scene` is not given)
//! 3. Register observers and systems
//! 4. Step the world for the configured number of frames
//! 5. Print the final state of every sensor
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --scene assets/scenes/patrol.json --sample-line-of-sight
//! ```

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use clap::Parser;
use log::{error, info};

use detection_sensor::components::detectionsensor::DetectionSensor;
use detection_sensor::resources::leavetimers::LeaveTimers;
use detection_sensor::resources::sensorconfig::SensorConfig;
use detection_sensor::resources::worldtime::WorldTime;
use detection_sensor::scene::{SceneData, spawn_scene};
use detection_sensor::simulation::{build_update_schedule, init_world, step};

/// Trigger-volume detection sensors, simulated headless.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// INI file with sensor defaults and simulation settings.
    /// Defaults to ./config.ini; a missing default file is not an error.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON scene to simulate. Uses a built-in demo scene when omitted.
    #[arg(long, value_name = "PATH")]
    scene: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long)]
    frames: Option<u64>,

    /// Unscaled seconds per frame.
    #[arg(long)]
    delta: Option<f32>,

    /// Sample line of sight every frame for detected sensors that require it.
    #[arg(long)]
    sample_line_of_sight: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // --------------- Configuration ---------------
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = SensorConfig::with_path(path);
            if let Err(e) = config.load_from_file() {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
            config
        }
        None => {
            let mut config = SensorConfig::new();
            if config.config_path.exists() {
                if let Err(e) = config.load_from_file() {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            } else {
                info!("No {} found, using defaults", config.config_path.display());
            }
            config
        }
    };
    if let Some(frames) = cli.frames {
        config.simulation.frames = frames;
    }
    if let Some(delta) = cli.delta {
        if !(delta > 0.0 && delta.is_finite()) {
            eprintln!("Error: --delta must be a positive number of seconds");
            std::process::exit(1);
        }
        config.simulation.delta = delta;
    }
    config.simulation.sample_line_of_sight |= cli.sample_line_of_sight;

    let scene = match &cli.scene {
        Some(path) => match SceneData::load_from_file(path) {
            Ok(scene) => scene,
            Err(e) => {
                eprintln!("Error loading scene {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => {
            info!("No scene given, running the demo scene");
            SceneData::demo()
        }
    };

    // --------------- ECS world + resources ---------------
    let frames = config.simulation.frames;
    let delta = config.simulation.delta;
    let sample_line_of_sight = config.simulation.sample_line_of_sight;
    let defaults = config.sensor.clone();

    let mut world = World::new();
    init_world(&mut world, config);
    let entities = match spawn_scene(&mut world, &scene, &defaults) {
        Ok(entities) => entities,
        Err(e) => {
            eprintln!("Error spawning scene: {e}");
            std::process::exit(1);
        }
    };

    let mut update = build_update_schedule(sample_line_of_sight);
    if let Err(e) = update.initialize(&mut world) {
        error!("Failed to initialize schedule: {e}");
        std::process::exit(1);
    }

    // --------------- Main loop ---------------
    info!(
        "Simulating {} frames of {:.4}s (line of sight sampling: {})",
        frames, delta, sample_line_of_sight
    );
    for _ in 0..frames {
        step(&mut world, &mut update, delta);
    }

    // --------------- Report ---------------
    let elapsed = world.resource::<WorldTime>().elapsed;
    info!("Simulation finished after {:.2}s", elapsed);
    let mut names: Vec<_> = entities.iter().collect();
    names.sort();
    for (name, entity) in names {
        let Some(sensor) = world.get::<DetectionSensor>(*entity) else {
            continue;
        };
        let last_seen = sensor
            .last_detected()
            .and_then(|seen| entities.iter().find(|(_, e)| **e == seen))
            .map(|(name, _)| name.as_str())
            .unwrap_or("-");
        info!(
            "Sensor '{}': detected={}, last_detected={}, line_of_sight={:?}",
            name,
            sensor.is_detected(),
            last_seen,
            sensor.last_line_of_sight()
        );
        if let Some(remaining) = sensor
            .pending_reset()
            .and_then(|handle| world.resource::<LeaveTimers>().remaining(handle))
        {
            info!(
                "Sensor '{}' forgets its target in {:.2}s",
                name, remaining
            );
        }
    }
}
