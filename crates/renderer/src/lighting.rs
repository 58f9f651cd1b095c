//! Light model and constants
//!
//! The GPU lighting shader and the CPU reference shader both read these
//! values; the shader receives `MAX_LIGHTS` as an injected `#define`, so
//! the array length declared in GLSL always matches the host.

use glam::{Mat3, Mat4, Vec3};

use crate::error::{RenderError, Result};

/// Maximum number of simultaneous lights (shader array length)
pub const MAX_LIGHTS: usize = 6;

/// Ambient multiplier applied to albedo during the day
pub const AMBIENT_DAY: f32 = 0.4;

/// Ambient multiplier applied to albedo at night
pub const AMBIENT_NIGHT: f32 = 0.08;

/// Linear term of the point/spot distance falloff
pub const ATTENUATION_LINEAR: f32 = 0.9;

/// Quadratic term of the point/spot distance falloff
pub const ATTENUATION_QUADRATIC: f32 = 0.62;

/// Cosine of the spot cone's inner edge (full intensity inside)
pub const SPOT_INNER_COS: f32 = 0.91;

/// Cosine of the spot cone's outer edge (zero intensity outside)
pub const SPOT_OUTER_COS: f32 = 0.82;

/// Colour that fog fades towards
pub const FOG_COLOR: Vec3 = Vec3::new(0.6, 0.6, 0.6);

/// Clear colour for pixels no object covers
pub const BACKGROUND_COLOR: Vec3 = Vec3::new(0.1, 0.1, 0.1);

/// Light type, with the integer tag the shader switches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum LightKind {
    Point = 0,
    Directional = 1,
    Spot = 2,
}

impl LightKind {
    #[inline]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// A single light
///
/// `position` is unused for directional lights and `direction` is unused
/// for point lights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
}

impl Light {
    pub const fn point(position: Vec3, color: Vec3) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            direction: Vec3::ZERO,
            color,
        }
    }

    pub const fn directional(direction: Vec3, color: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            position: Vec3::ZERO,
            direction,
            color,
        }
    }

    pub const fn spot(position: Vec3, direction: Vec3, color: Vec3) -> Self {
        Self {
            kind: LightKind::Spot,
            position,
            direction,
            color,
        }
    }

    /// Transform into view space
    ///
    /// Positions are points (w = 1) and directions are vectors (w = 0);
    /// directions go through the view's inverse-transpose and are
    /// renormalised.
    pub fn to_view(&self, view: &Mat4) -> Self {
        let direction = Mat3::from_mat4(*view).inverse().transpose() * self.direction;
        Self {
            kind: self.kind,
            position: view.transform_point3(self.position),
            direction: direction.normalize_or_zero(),
            color: self.color,
        }
    }
}

/// Built-in light table, in the order lights are enabled
pub const LIGHT_TABLE: [Light; MAX_LIGHTS] = [
    Light::point(Vec3::new(0.0, 0.0, 0.3), Vec3::new(0.0, 0.0, 1.0)),
    Light::point(Vec3::new(0.0, 2.0, 0.2), Vec3::new(1.0, 0.0, 0.0)),
    Light::directional(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 1.0, 1.0)),
    Light::spot(
        Vec3::new(0.0, 0.0, 0.7),
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::new(1.0, 1.0, 1.0),
    ),
    Light::point(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
    Light::point(Vec3::new(1.0, -1.0, 0.2), Vec3::new(0.0, 0.0, 1.0)),
];

/// Index in [`LIGHT_TABLE`] of the point light that orbits the origin
pub const ORBITING_LIGHT: usize = 4;

/// Bounded list of lights
///
/// Never holds more than [`MAX_LIGHTS`] entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightSet {
    lights: Vec<Light>,
}

impl LightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting lists longer than [`MAX_LIGHTS`]
    pub fn from_lights(lights: Vec<Light>) -> Result<Self> {
        if lights.len() > MAX_LIGHTS {
            return Err(RenderError::TooManyLights {
                count: lights.len(),
                max: MAX_LIGHTS,
            });
        }
        Ok(Self { lights })
    }

    /// The first `count` entries of [`LIGHT_TABLE`]
    pub fn from_table(count: usize) -> Result<Self> {
        if count > MAX_LIGHTS {
            return Err(RenderError::TooManyLights {
                count,
                max: MAX_LIGHTS,
            });
        }
        Ok(Self {
            lights: LIGHT_TABLE[..count].to_vec(),
        })
    }

    pub fn push(&mut self, light: Light) -> Result<()> {
        if self.lights.len() >= MAX_LIGHTS {
            return Err(RenderError::TooManyLights {
                count: self.lights.len() + 1,
                max: MAX_LIGHTS,
            });
        }
        self.lights.push(light);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn as_slice(&self) -> &[Light] {
        &self.lights
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Light> {
        self.lights.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    /// First directional light, if any
    pub fn directional_mut(&mut self) -> Option<&mut Light> {
        self.lights
            .iter_mut()
            .find(|light| light.kind == LightKind::Directional)
    }

    /// All lights transformed into view space
    pub fn to_view(&self, view: &Mat4) -> Vec<Light> {
        self.lights
            .iter()
            .map(|light| light.to_view(view))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_set_rejects_overflow() {
        let mut set = LightSet::from_table(MAX_LIGHTS).unwrap();
        assert_eq!(set.len(), MAX_LIGHTS);
        let err = set.push(Light::point(Vec3::ZERO, Vec3::ONE)).unwrap_err();
        assert!(matches!(
            err,
            RenderError::TooManyLights {
                count: 7,
                max: MAX_LIGHTS
            }
        ));
    }

    #[test]
    fn test_from_lights_limit() {
        let lights = vec![Light::point(Vec3::ZERO, Vec3::ONE); MAX_LIGHTS + 1];
        assert!(LightSet::from_lights(lights).is_err());

        let lights = vec![Light::point(Vec3::ZERO, Vec3::ONE); MAX_LIGHTS];
        assert_eq!(LightSet::from_lights(lights).unwrap().len(), MAX_LIGHTS);
    }

    #[test]
    fn test_from_table_truncates() {
        let set = LightSet::from_table(2).unwrap();
        assert_eq!(set.as_slice(), &LIGHT_TABLE[..2]);
        assert!(LightSet::from_table(MAX_LIGHTS + 1).is_err());
    }

    #[test]
    fn test_directional_ignores_translation() {
        let eye = Vec3::new(5.0, -3.0, 2.0);
        let view = Mat4::look_at_rh(eye, eye - Vec3::Z, Vec3::Y);
        let light = Light::directional(Vec3::new(0.0, 0.0, 1.0), Vec3::ONE).to_view(&view);
        // Camera looks down -Z with no rotation, so +Z stays +Z
        assert!((light.direction - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_point_position_to_view() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::Y);
        let light = Light::point(Vec3::ZERO, Vec3::ONE).to_view(&view);
        assert!((light.position - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
    }
}
