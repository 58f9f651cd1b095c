//! Config file loading

use glam::Vec3;
use renderer::config::{DemoConfig, load_config};
use renderer::shading::{Fragment, LightingParams, shade_fragment};
use renderer::{CubeLayout, FogStage, Light, RenderError, Scene};
use std::io::Write;

fn write_config(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(text.as_bytes()).expect("write temp file");
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
        [window]
        title = "Fog test"
        width = 1024
        height = 768

        [scene]
        cubes = "none"
        light_count = 3
        sphere_sectors = 12
        sphere_stacks = 6

        [weather]
        daylight = false
        fog = true
        fog_density = 0.3
        animate_fog = false
        fog_stage = "lighting"

        [shading]
        specular_power = 64.0
        blinn = false
        "#,
    );

    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.window.title, "Fog test");
    assert_eq!((config.window.width, config.window.height), (1024, 768));
    assert_eq!(config.scene.cubes, CubeLayout::None);
    assert_eq!(config.scene.light_count, 3);
    assert_eq!(config.scene.sphere_sectors, 12);
    assert!(!config.weather.daylight);
    assert!(config.weather.fog);
    assert_eq!(config.weather.fog_stage, FogStage::Lighting);
    assert_eq!(config.weather.fog_density, 0.3);
    assert_eq!(config.shading.specular_power, 64.0);
    assert!(!config.shading.blinn);
}

#[test]
fn test_scene_from_config_layouts() {
    let mut config = DemoConfig::default();
    let scene = Scene::new(&config.scene).unwrap();
    assert_eq!(scene.objects.len(), 3 + 12);
    assert_eq!(scene.lights.len(), 6);

    config.scene.cubes = CubeLayout::Random;
    config.scene.random_cube_count = 25;
    config.scene.light_count = 2;
    let scene = Scene::new(&config.scene).unwrap();
    assert_eq!(scene.objects.len(), 3 + 25);
    assert_eq!(scene.lights.len(), 2);

    config.scene.cubes = CubeLayout::None;
    let scene = Scene::new(&config.scene).unwrap();
    assert_eq!(scene.objects.len(), 3);
}

#[test]
fn test_scene_rejects_too_many_lights() {
    let mut config = DemoConfig::default();
    config.scene.light_count = 9;
    assert!(matches!(
        Scene::new(&config.scene),
        Err(RenderError::TooManyLights { count: 9, .. })
    ));
}

#[test]
fn test_unknown_enum_value_is_error() {
    let file = write_config("[scene]\ncubes = \"spiral\"\n");
    assert!(matches!(
        load_config(Some(file.path())),
        Err(RenderError::ConfigParse(_))
    ));
}

#[test]
fn test_sample_config_matches_defaults() {
    let sample = renderer::config::parse_config(include_str!("../deferred.toml")).unwrap();
    let defaults = DemoConfig::default();
    assert_eq!(sample.window.title, defaults.window.title);
    assert_eq!(sample.scene.cubes, defaults.scene.cubes);
    assert_eq!(sample.scene.light_count, defaults.scene.light_count);
    assert_eq!(sample.scene.light_markers, defaults.scene.light_markers);
    assert_eq!(sample.weather, defaults.weather);
    assert_eq!(sample.shading, defaults.shading);
}

#[test]
fn test_negative_specular_power_file_is_rejected() {
    let file = write_config("[shading]\nspecular_power = -4.0\n");
    assert!(matches!(
        load_config(Some(file.path())),
        Err(RenderError::ConfigValue { .. })
    ));
}

#[test]
fn test_accepted_specular_range_shades_finite() {
    // Light directly behind the surface: N.H and V.R are both zero
    let fragment = Fragment {
        position: Vec3::new(0.0, 0.0, -2.0),
        normal: Vec3::Z,
        albedo: Vec3::new(1.0, 0.2, 0.2),
    };
    let light = Light::point(Vec3::new(0.0, 0.0, -4.0), Vec3::X);

    for power in ["1.0", "256.0"] {
        for blinn in [true, false] {
            let text = format!("[shading]\nspecular_power = {power}\nblinn = {blinn}\n");
            let file = write_config(&text);
            let config = load_config(Some(file.path())).unwrap();
            let params = LightingParams {
                lights: std::slice::from_ref(&light),
                daylight: true,
                fog_density: None,
                settings: config.shading,
            };
            let color = shade_fragment(&fragment, &params);
            assert!(color.is_finite(), "{}: {}", text, color);
        }
    }
}

#[test]
fn test_negative_fog_density_file_is_rejected() {
    let file = write_config("[weather]\nfog = true\nfog_density = -2.0\n");
    assert!(matches!(
        load_config(Some(file.path())),
        Err(RenderError::ConfigValue { .. })
    ));
}
