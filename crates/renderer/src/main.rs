//! Deferred lighting demo
//!
//! Controls:
//! - `0`-`3`: select camera
//! - `N`: toggle day/night
//! - `F`: toggle fog, `T`: toggle fog animation
//! - `B`: toggle Blinn-Phong / Phong
//! - `L`: toggle light markers
//! - `=` / `-`: double / halve the specular exponent
//! - Arrow keys: nudge the directional light
//! - `Escape`: quit

use anyhow::Context as _;
use app::cli::CommonArgs;
use app::{App, AppConfig, FrameContext, InputState, KeyCode};
use clap::Parser;
use glam::Vec3;
use renderer::config::DemoConfig;
use renderer::{
    CpuDeferred, DeferredRenderer, FrameInput, Scene, ShadingSettings, Weather, load_config, mesh,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Directional light nudge rate (direction units per second)
const NUDGE_SPEED: f32 = 1.0;

const CAMERA_KEYS: [KeyCode; 4] = [
    KeyCode::Digit0,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
];

#[derive(Parser, Debug)]
#[command(name = "deferred-demo", about = "Deferred lighting demo")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Render one frame on the CPU to a PNG and exit without opening a window
    #[arg(long, value_name = "PATH")]
    cpu_reference: Option<PathBuf>,

    /// Seed for the random cube layout
    #[arg(long)]
    seed: Option<u64>,

    /// Camera index for --cpu-reference
    #[arg(long, default_value_t = 0)]
    camera: usize,

    /// Scene time in seconds for --cpu-reference
    #[arg(long, default_value_t = 0.0)]
    time: f32,
}

struct DemoApp {
    config: DemoConfig,
    scene: Scene,
    weather: Weather,
    settings: ShadingSettings,
    renderer: DeferredRenderer,
    exit_requested: bool,
}

impl DemoApp {
    fn new(config: DemoConfig, scene: Scene) -> Self {
        Self {
            weather: config.weather,
            settings: config.shading,
            config,
            scene,
            renderer: DeferredRenderer::new(),
            exit_requested: false,
        }
    }

    fn handle_input(&mut self, input: &InputState, delta_time: f32) {
        if input.just_pressed(KeyCode::Escape) {
            self.exit_requested = true;
        }

        for (index, key) in CAMERA_KEYS.iter().enumerate() {
            if input.just_pressed(*key) && self.scene.select_camera(index) {
                tracing::info!("Camera {}", index);
            }
        }

        if input.just_pressed(KeyCode::KeyN) {
            self.weather.daylight = !self.weather.daylight;
            let time_of_day = if self.weather.daylight {
                "Day"
            } else {
                "Night"
            };
            tracing::info!("{}", time_of_day);
        }
        if input.just_pressed(KeyCode::KeyF) {
            self.weather.fog = !self.weather.fog;
            tracing::info!("Fog {}", on_off(self.weather.fog));
        }
        if input.just_pressed(KeyCode::KeyT) {
            self.weather.animate_fog = !self.weather.animate_fog;
            tracing::info!("Fog animation {}", on_off(self.weather.animate_fog));
        }
        if input.just_pressed(KeyCode::KeyB) {
            self.settings.blinn = !self.settings.blinn;
            let model = if self.settings.blinn {
                "Blinn-Phong"
            } else {
                "Phong"
            };
            tracing::info!("Specular model: {}", model);
        }
        if input.just_pressed(KeyCode::KeyL) {
            self.scene.light_markers = !self.scene.light_markers;
            tracing::info!("Light markers {}", on_off(self.scene.light_markers));
        }
        if input.just_pressed(KeyCode::Equal) {
            self.settings.scale_specular_power(2.0);
            tracing::info!("Specular power {}", self.settings.specular_power);
        }
        if input.just_pressed(KeyCode::Minus) {
            self.settings.scale_specular_power(0.5);
            tracing::info!("Specular power {}", self.settings.specular_power);
        }

        let mut nudge = Vec3::ZERO;
        if input.is_key_down(KeyCode::ArrowLeft) {
            nudge.x -= 1.0;
        }
        if input.is_key_down(KeyCode::ArrowRight) {
            nudge.x += 1.0;
        }
        if input.is_key_down(KeyCode::ArrowUp) {
            nudge.y += 1.0;
        }
        if input.is_key_down(KeyCode::ArrowDown) {
            nudge.y -= 1.0;
        }
        if nudge != Vec3::ZERO {
            let nudge = nudge * NUDGE_SPEED * delta_time;
            self.scene.nudge_directional(nudge);
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

impl App for DemoApp {
    fn init(&mut self, ctx: &FrameContext) -> anyhow::Result<()> {
        let scene_config = &self.config.scene;
        let sphere = mesh::sphere(
            scene_config.sphere_radius,
            scene_config.sphere_sectors,
            scene_config.sphere_stacks,
        )?;

        unsafe { self.renderer.init_gl(ctx.gl, &sphere, ctx.size)? };
        Ok(())
    }

    fn update(&mut self, ctx: &FrameContext, input: &InputState) {
        self.handle_input(input, ctx.delta_time);
        self.scene.animate(ctx.elapsed);
        self.weather.update(ctx.elapsed);
    }

    fn render(&mut self, ctx: &FrameContext) -> anyhow::Result<()> {
        let frame = FrameInput {
            scene: &self.scene,
            weather: &self.weather,
            settings: self.settings,
            time: ctx.elapsed,
            size: ctx.size,
        };
        unsafe { self.renderer.render(ctx.gl, &frame)? };
        Ok(())
    }

    fn shutdown(&mut self, ctx: &FrameContext) {
        unsafe { self.renderer.destroy_gl(ctx.gl) };
        tracing::info!("Renderer destroyed");
    }

    fn should_exit(&self) -> bool {
        self.exit_requested
    }
}

/// Render a single frame with the software renderer and save it
fn render_cpu_reference(
    config: &DemoConfig,
    mut scene: Scene,
    args: &Args,
    path: &Path,
) -> anyhow::Result<()> {
    if !scene.select_camera(args.camera) {
        anyhow::bail!("camera index {} out of range", args.camera);
    }
    scene.animate(args.time);
    let mut weather = config.weather;
    weather.update(args.time);

    let cpu = CpuDeferred::new(config.window.width, config.window.height);
    let start = Instant::now();
    let image = cpu.render(&scene, &weather, config.shading, args.time);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(
        "CPU reference ({}x{}) written to {} in {:.2?}",
        cpu.width,
        cpu.height,
        path.display(),
        start.elapsed()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config_path = args.common.config_path().map(PathBuf::as_path);
    let mut config = load_config(config_path).context("loading config")?;
    if let Some(seed) = args.seed {
        config.scene.seed = seed;
    }

    let scene = Scene::new(&config.scene)?;

    if let Some(path) = &args.cpu_reference {
        return render_cpu_reference(&config, scene, &args, path);
    }

    let app_config = args.common.apply_to(
        AppConfig::new(config.window.title.clone())
            .with_size(config.window.width, config.window.height),
    );

    app::run_app(DemoApp::new(config, scene), app_config)?;
    Ok(())
}
