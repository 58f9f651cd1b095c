//! CPU definition of the deferred shading model
//!
//! `shaders/lighting.frag` evaluates the same terms per pixel on the GPU.
//! All vectors are in view space: the camera sits at the origin looking
//! down -Z, so the view vector of a fragment is `normalize(-position)`.

use glam::Vec3;
use serde::Deserialize;

use crate::lighting::{
    AMBIENT_DAY, AMBIENT_NIGHT, ATTENUATION_LINEAR, ATTENUATION_QUADRATIC, FOG_COLOR, Light,
    LightKind, SPOT_INNER_COS, SPOT_OUTER_COS,
};

/// Specular highlight settings
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShadingSettings {
    /// Specular exponent
    pub specular_power: f32,
    /// Blinn-Phong (half vector) when true, Phong (reflection vector) otherwise
    pub blinn: bool,
}

impl Default for ShadingSettings {
    fn default() -> Self {
        Self {
            specular_power: 32.0,
            blinn: true,
        }
    }
}

impl ShadingSettings {
    pub const MIN_SPECULAR_POWER: f32 = 1.0;
    pub const MAX_SPECULAR_POWER: f32 = 256.0;

    /// Multiply the exponent, staying within 1..=256
    pub fn scale_specular_power(&mut self, factor: f32) {
        self.specular_power = (self.specular_power * factor)
            .clamp(Self::MIN_SPECULAR_POWER, Self::MAX_SPECULAR_POWER);
    }
}

/// One g-buffer sample moved into view space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub position: Vec3,
    pub normal: Vec3,
    pub albedo: Vec3,
}

/// Per-frame inputs to [`shade_fragment`]
#[derive(Debug, Clone, Copy)]
pub struct LightingParams<'a> {
    /// Lights already transformed into view space
    pub lights: &'a [Light],
    pub daylight: bool,
    /// Fog density, or `None` when fog is not applied in this pass
    pub fog_density: Option<f32>,
    pub settings: ShadingSettings,
}

/// Distance falloff: 1 at distance 0, strictly decreasing after
#[inline]
pub fn attenuation(distance: f32) -> f32 {
    1.0 / (1.0 + ATTENUATION_LINEAR * distance + ATTENUATION_QUADRATIC * distance * distance)
}

/// Spot cone factor for direction `to_light` (fragment towards light)
///
/// 1 inside the inner cone, 0 outside the outer cone, linear between.
#[inline]
pub fn spot_intensity(to_light: Vec3, spot_direction: Vec3) -> f32 {
    let theta = to_light.dot((-spot_direction).normalize_or_zero());
    ((theta - SPOT_OUTER_COS) / (SPOT_INNER_COS - SPOT_OUTER_COS)).clamp(0.0, 1.0)
}

#[inline]
pub fn ambient(albedo: Vec3, daylight: bool) -> Vec3 {
    albedo * if daylight { AMBIENT_DAY } else { AMBIENT_NIGHT }
}

#[inline]
pub fn diffuse(normal: Vec3, to_light: Vec3, light_color: Vec3, albedo: Vec3) -> Vec3 {
    normal.dot(to_light).max(0.0) * light_color * albedo
}

/// Blinn-Phong or Phong highlight
///
/// Not gated on `N·L`; surfaces facing away from a light can still catch a
/// highlight when the view vector lines up.
pub fn specular(
    normal: Vec3,
    to_light: Vec3,
    to_view: Vec3,
    light_color: Vec3,
    settings: &ShadingSettings,
) -> Vec3 {
    let base = if settings.blinn {
        let halfway = (to_light + to_view).normalize_or_zero();
        normal.dot(halfway).max(0.0)
    } else {
        let reflected = reflect(-to_light, normal);
        to_view.dot(reflected).max(0.0)
    };
    base.powf(settings.specular_power) * light_color
}

#[inline]
fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

/// Exponential fog visibility: 1 at the eye, towards 0 far away
#[inline]
pub fn fog_factor(distance: f32, density: f32) -> f32 {
    (-density * distance).exp()
}

/// Blend `color` towards [`FOG_COLOR`] by distance from the eye
pub fn fog_blend(color: Vec3, distance: f32, density: f32) -> Vec3 {
    let f = fog_factor(distance, density);
    f * color + (1.0 - f) * FOG_COLOR
}

/// Contribution of a single light (view space)
pub fn light_contribution(
    light: &Light,
    fragment: &Fragment,
    normal: Vec3,
    to_view: Vec3,
    daylight: bool,
    settings: &ShadingSettings,
) -> Vec3 {
    match light.kind {
        LightKind::Directional => {
            if !daylight {
                return Vec3::ZERO;
            }
            let l = light.direction.normalize_or_zero();
            diffuse(normal, l, light.color, fragment.albedo)
                + specular(normal, l, to_view, light.color, settings)
        }
        LightKind::Point | LightKind::Spot => {
            let to_light = light.position - fragment.position;
            let l = to_light.normalize_or_zero();
            let mut lit = attenuation(to_light.length())
                * (diffuse(normal, l, light.color, fragment.albedo)
                    + specular(normal, l, to_view, light.color, settings));
            if light.kind == LightKind::Spot {
                lit *= spot_intensity(l, light.direction);
            }
            lit
        }
    }
}

/// Full lighting for one covered pixel
pub fn shade_fragment(fragment: &Fragment, params: &LightingParams) -> Vec3 {
    let normal = fragment.normal.normalize_or_zero();
    let to_view = (-fragment.position).normalize_or_zero();

    let mut color = ambient(fragment.albedo, params.daylight);
    for light in params.lights {
        color += light_contribution(
            light,
            fragment,
            normal,
            to_view,
            params.daylight,
            &params.settings,
        );
    }

    match params.fog_density {
        Some(density) => fog_blend(color, fragment.position.length(), density),
        None => color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attenuation_at_zero() {
        assert_eq!(attenuation(0.0), 1.0);
    }

    #[test]
    fn test_attenuation_known_value() {
        // 1 / (1 + 0.9 + 0.62)
        assert!((attenuation(1.0) - 1.0 / 2.52).abs() < 1e-6);
    }

    #[test]
    fn test_spot_edges() {
        let down = Vec3::new(0.0, 0.0, -1.0);
        // Straight below the light: fully lit
        assert_eq!(spot_intensity(Vec3::Z, down), 1.0);
        // Perpendicular: outside the cone
        assert_eq!(spot_intensity(Vec3::X, down), 0.0);
    }

    #[test]
    fn test_blinn_and_phong_peak_on_mirror_direction() {
        let settings_blinn = ShadingSettings::default();
        let settings_phong = ShadingSettings {
            blinn: false,
            ..Default::default()
        };
        let n = Vec3::Z;
        let l = Vec3::new(1.0, 0.0, 1.0).normalize();
        let v = Vec3::new(-1.0, 0.0, 1.0).normalize();
        let blinn = specular(n, l, v, Vec3::ONE, &settings_blinn);
        let phong = specular(n, l, v, Vec3::ONE, &settings_phong);
        assert!((blinn - Vec3::ONE).length() < 1e-5);
        assert!((phong - Vec3::ONE).length() < 1e-5);
    }

    #[test]
    fn test_degenerate_vectors_give_zero() {
        let n = Vec3::Z;
        let v = Vec3::Z;
        for blinn in [true, false] {
            let settings = ShadingSettings {
                blinn,
                ..Default::default()
            };
            // Light exactly opposite the viewer: the half vector is zero
            let s = specular(n, -v, v, Vec3::ONE, &settings);
            assert!(s.is_finite());
            assert_eq!(s, Vec3::ZERO);
        }
        assert_eq!(spot_intensity(Vec3::Z, Vec3::ZERO), 0.0);
    }

    #[test]
    fn test_scale_specular_power_clamps() {
        let mut settings = ShadingSettings::default();
        for _ in 0..10 {
            settings.scale_specular_power(2.0);
        }
        assert_eq!(settings.specular_power, 256.0);
        for _ in 0..20 {
            settings.scale_specular_power(0.5);
        }
        assert_eq!(settings.specular_power, 1.0);
    }

    #[test]
    fn test_directional_only_by_day() {
        let light = Light::directional(Vec3::Z, Vec3::ONE);
        let fragment = Fragment {
            position: Vec3::new(0.0, 0.0, -1.0),
            normal: Vec3::Z,
            albedo: Vec3::ONE,
        };
        let settings = ShadingSettings::default();
        let day = light_contribution(&light, &fragment, Vec3::Z, Vec3::Z, true, &settings);
        let night = light_contribution(&light, &fragment, Vec3::Z, Vec3::Z, false, &settings);
        assert!(day.x > 1.0);
        assert_eq!(night, Vec3::ZERO);
    }
}
