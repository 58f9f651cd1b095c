//! Demo configuration loaded from TOML

use serde::Deserialize;
use std::path::Path;

use crate::error::{RenderError, Result};
use crate::lighting::MAX_LIGHTS;
use crate::scene::CubeLayout;
use crate::shading::ShadingSettings;
use crate::weather::Weather;

/// Config file read when no `--config` path is given
pub const DEFAULT_CONFIG_PATH: &str = "deferred.toml";

/// Configuration loaded from a TOML file
///
/// Every section and field is optional; missing values take the defaults
/// below.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DemoConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub weather: Weather,
    #[serde(default)]
    pub shading: ShadingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_title() -> String {
    "Deferred Lighting".to_string()
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SceneConfig {
    #[serde(default)]
    pub cubes: CubeLayout,
    /// Number of cubes for the `random` layout
    #[serde(default = "default_random_cube_count")]
    pub random_cube_count: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// How many entries of the light table are live
    #[serde(default = "default_light_count")]
    pub light_count: usize,
    #[serde(default = "default_sphere_radius")]
    pub sphere_radius: f32,
    #[serde(default = "default_sphere_sectors")]
    pub sphere_sectors: u32,
    #[serde(default = "default_sphere_stacks")]
    pub sphere_stacks: u32,
    /// Draw an unlit cube at each point and spot light
    #[serde(default = "default_light_markers")]
    pub light_markers: bool,
}

fn default_random_cube_count() -> usize {
    100
}

fn default_seed() -> u64 {
    42
}

fn default_light_count() -> usize {
    MAX_LIGHTS
}

fn default_sphere_radius() -> f32 {
    0.5
}

fn default_sphere_sectors() -> u32 {
    32
}

fn default_sphere_stacks() -> u32 {
    16
}

fn default_light_markers() -> bool {
    true
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            cubes: CubeLayout::default(),
            random_cube_count: default_random_cube_count(),
            seed: default_seed(),
            light_count: default_light_count(),
            sphere_radius: default_sphere_radius(),
            sphere_sectors: default_sphere_sectors(),
            sphere_stacks: default_sphere_stacks(),
            light_markers: default_light_markers(),
        }
    }
}

/// Parse configuration from TOML text
///
/// Values the interactive controls keep in range are rejected here when a
/// file puts them outside it.
pub fn parse_config(text: &str) -> Result<DemoConfig> {
    let config: DemoConfig = toml::from_str(text)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &DemoConfig) -> Result<()> {
    if config.scene.light_count > MAX_LIGHTS {
        return Err(RenderError::TooManyLights {
            count: config.scene.light_count,
            max: MAX_LIGHTS,
        });
    }

    let (width, height) = (config.window.width, config.window.height);
    if width == 0 || height == 0 {
        let reason = format!("size {}x{} is empty", width, height);
        return Err(invalid("window", reason));
    }

    let power = config.shading.specular_power;
    let min = ShadingSettings::MIN_SPECULAR_POWER;
    let max = ShadingSettings::MAX_SPECULAR_POWER;
    if !(min..=max).contains(&power) {
        let reason = format!("{} is outside {}..={}", power, min, max);
        return Err(invalid("shading.specular_power", reason));
    }

    let density = config.weather.fog_density;
    if !density.is_finite() || density < 0.0 {
        let reason = format!("{} is not a finite non-negative number", density);
        return Err(invalid("weather.fog_density", reason));
    }

    Ok(())
}

fn invalid(field: &'static str, reason: String) -> RenderError {
    RenderError::ConfigValue { field, reason }
}

/// Load configuration
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
/// used if present and the built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<DemoConfig> {
    let path = match path {
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                return Ok(DemoConfig::default());
            }
            default
        }
    };

    let text = std::fs::read_to_string(path).map_err(|source| RenderError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&text)?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::FogStage;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.scene.cubes, CubeLayout::Fixed);
        assert_eq!(config.scene.light_count, MAX_LIGHTS);
        assert_eq!(config.shading.specular_power, 32.0);
        assert!(config.weather.daylight);
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            r#"
            [scene]
            cubes = "random"
            random_cube_count = 10

            [weather]
            fog = true
            fog_stage = "geometry"

            [shading]
            blinn = false
            "#,
        )
        .unwrap();
        assert_eq!(config.scene.cubes, CubeLayout::Random);
        assert_eq!(config.scene.random_cube_count, 10);
        assert_eq!(config.scene.seed, 42);
        assert!(config.weather.fog);
        assert_eq!(config.weather.fog_stage, FogStage::Geometry);
        assert!(config.weather.animate_fog);
        assert!(!config.shading.blinn);
        assert_eq!(config.shading.specular_power, 32.0);
    }

    #[test]
    fn test_light_count_over_limit() {
        let result = parse_config("[scene]\nlight_count = 7\n");
        assert!(matches!(result, Err(RenderError::TooManyLights { .. })));
    }

    fn rejected_field(text: &str) -> Option<&'static str> {
        match parse_config(text) {
            Err(RenderError::ConfigValue { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_specular_power_out_of_range() {
        for power in ["-4.0", "0.0", "512.0"] {
            let text = format!("[shading]\nspecular_power = {}\n", power);
            assert_eq!(rejected_field(&text), Some("shading.specular_power"));
        }
        for power in ["1.0", "256.0"] {
            let text = format!("[shading]\nspecular_power = {}\n", power);
            assert!(parse_config(&text).is_ok(), "rejected {}", power);
        }
    }

    #[test]
    fn test_negative_fog_density() {
        let text = "[weather]\nfog_density = -2.0\n";
        assert_eq!(rejected_field(text), Some("weather.fog_density"));
        assert!(parse_config("[weather]\nfog_density = 0.0\n").is_ok());
    }

    #[test]
    fn test_empty_window_size() {
        assert_eq!(rejected_field("[window]\nwidth = 0\n"), Some("window"));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let result = parse_config("[scene\n");
        assert!(matches!(result, Err(RenderError::ConfigParse(_))));
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = load_config(Some(Path::new("/nonexistent/deferred.toml")));
        assert!(matches!(result, Err(RenderError::ConfigIo { .. })));
    }
}
