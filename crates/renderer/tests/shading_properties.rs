//! Properties of the shading model functions

use glam::Vec3;
use renderer::lighting::{AMBIENT_DAY, AMBIENT_NIGHT, FOG_COLOR, SPOT_INNER_COS, SPOT_OUTER_COS};
use renderer::shading::{
    Fragment, LightingParams, ShadingSettings, ambient, attenuation, fog_blend, shade_fragment,
    spot_intensity,
};
use renderer::{Light, LightKind};

#[test]
fn test_attenuation_monotonic() {
    assert_eq!(attenuation(0.0), 1.0);
    let mut previous = attenuation(0.0);
    for i in 1..500 {
        let a = attenuation(i as f32 * 0.05);
        assert!(a < previous, "not decreasing at step {}", i);
        assert!(a > 0.0);
        previous = a;
    }
}

/// Unit vector whose dot product with `axis` (a unit vector along +Z) is `cos`
fn at_angle(cos: f32) -> Vec3 {
    Vec3::new((1.0 - cos * cos).max(0.0).sqrt(), 0.0, cos)
}

#[test]
fn test_spot_cone() {
    // Spot points down -Z, so fragments below see the light along +Z
    let spot_dir = Vec3::NEG_Z;

    assert_eq!(spot_intensity(at_angle(1.0), spot_dir), 1.0);
    let inside = at_angle(SPOT_INNER_COS + 0.01);
    assert_eq!(spot_intensity(inside, spot_dir), 1.0);
    let outside = at_angle(SPOT_OUTER_COS - 0.01);
    assert_eq!(spot_intensity(outside, spot_dir), 0.0);
    assert_eq!(spot_intensity(at_angle(0.0), spot_dir), 0.0);

    // Linear between the cone edges
    let mid = (SPOT_INNER_COS + SPOT_OUTER_COS) / 2.0;
    assert!((spot_intensity(at_angle(mid), spot_dir) - 0.5).abs() < 1e-3);
    let quarter = SPOT_OUTER_COS + 0.25 * (SPOT_INNER_COS - SPOT_OUTER_COS);
    let intensity = spot_intensity(at_angle(quarter), spot_dir);
    assert!((intensity - 0.25).abs() < 1e-3);
}

#[test]
fn test_ambient_depends_only_on_daylight() {
    for albedo in [Vec3::ONE, Vec3::new(0.2, 0.7, 0.1), Vec3::ZERO] {
        assert_eq!(ambient(albedo, true), albedo * AMBIENT_DAY);
        assert_eq!(ambient(albedo, false), albedo * AMBIENT_NIGHT);
    }
}

#[test]
fn test_fog_limits() {
    let color = Vec3::new(0.9, 0.1, 0.3);
    assert_eq!(fog_blend(color, 0.0, 0.7), color);
    let far = fog_blend(color, 1.0e4, 0.7);
    assert!((far - FOG_COLOR).length() < 1e-5);
    // Zero density leaves the colour untouched at any distance
    assert_eq!(fog_blend(color, 50.0, 0.0), color);
}

#[test]
fn test_no_lights_is_ambient_only() {
    let fragment = Fragment {
        position: Vec3::new(0.0, 0.0, -2.0),
        normal: Vec3::Z,
        albedo: Vec3::new(0.5, 0.5, 1.0),
    };
    let params = LightingParams {
        lights: &[],
        daylight: false,
        fog_density: None,
        settings: ShadingSettings::default(),
    };
    let color = shade_fragment(&fragment, &params);
    assert_eq!(color, fragment.albedo * AMBIENT_NIGHT);
}

#[test]
fn test_light_behind_surface_adds_no_diffuse() {
    let fragment = Fragment {
        position: Vec3::new(0.0, 0.0, -2.0),
        normal: Vec3::Z,
        albedo: Vec3::ONE,
    };
    let behind = Light::point(Vec3::new(0.0, 0.0, -4.0), Vec3::ONE);
    assert_eq!(behind.kind, LightKind::Point);
    let params = LightingParams {
        lights: std::slice::from_ref(&behind),
        daylight: true,
        fog_density: None,
        settings: ShadingSettings::default(),
    };
    let lit = shade_fragment(&fragment, &params);
    // L = -Z and V = +Z: half vector is degenerate, no diffuse
    assert!((lit - Vec3::splat(AMBIENT_DAY)).length() < 1e-5);
}
