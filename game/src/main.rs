use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use nyanchu::logging::init_logging;
use nyanchu::platform::executable_dir;
use nyanchu::{Engine, EngineConfig};

const CONFIG_PATH: &str = "nyanchu.toml";
const BGM: &str = "bgm.ogg";

/// Demo scene state. Later this holds the game's object model.
struct Demo {
    angle: f32,
}

impl Demo {
    fn update(&mut self, dt: f32) {
        self.angle = (self.angle + dt) % std::f32::consts::TAU;
    }

    fn cube_transform(&self) -> Mat4 {
        Mat4::from_axis_angle(Vec3::new(0.3, 1.0, 0.0).normalize(), self.angle)
    }
}

/// Places a config may live, most specific first: the working directory,
/// next to the executable, then the game crate when run through cargo.
fn config_candidates() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    if let Ok(dir) = executable_dir() {
        dirs.push(dir);
    }
    dirs.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")));
    dirs.into_iter().map(|dir| dir.join(CONFIG_PATH)).collect()
}

fn find_config(candidates: &[PathBuf]) -> Option<&Path> {
    candidates.iter().map(PathBuf::as_path).find(|p| p.is_file())
}

/// Loads the first config found; `None` means defaults were used.
fn load_config() -> Result<(EngineConfig, Option<PathBuf>)> {
    let candidates = config_candidates();
    let Some(path) = find_config(&candidates) else {
        return Ok((EngineConfig::default(), None));
    };
    let config =
        EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?;
    Ok((config, Some(path.to_path_buf())))
}

fn main() -> Result<()> {
    let (config, config_path) = load_config()?;
    init_logging(&config.logging);
    match config_path {
        Some(path) => log::info!("config loaded from {}", path.display()),
        None => log::info!("{CONFIG_PATH} not found, using defaults"),
    }

    // ---- Create engine (game owns this) ----
    let mut engine = Engine::new(config);
    engine.init().context("engine failed to start")?;

    if let Err(err) = engine.play_bgm(BGM) {
        log::warn!("no background music: {err}");
    }

    let mut demo = Demo { angle: 0.0 };
    while engine.is_running() {
        engine.poll_events();
        if !engine.is_running() {
            break;
        }

        engine.begin_frame()?;
        demo.update(engine.delta_time());

        let renderer = engine.renderer()?;
        renderer.draw_cube(demo.cube_transform());
        renderer.draw_triangle();

        engine.end_frame()?;
    }

    engine.shutdown();
    Ok(())
}
