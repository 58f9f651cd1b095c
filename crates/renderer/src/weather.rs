//! Day/night and fog state

use glam::Vec3;
use serde::Deserialize;

use crate::lighting::{BACKGROUND_COLOR, FOG_COLOR};

/// Fog density oscillation, in [0, 1]
pub fn fog_density(time: f32) -> f32 {
    0.5 * (0.3 * time).sin() + 0.5
}

/// Which pass applies fog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FogStage {
    /// Blend the lit colour in the lighting pass
    #[default]
    Lighting,
    /// Blend the albedo written by the geometry pass
    Geometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Weather {
    pub daylight: bool,
    pub fog: bool,
    pub fog_density: f32,
    /// Drive `fog_density` from [`fog_density`] each frame
    pub animate_fog: bool,
    pub fog_stage: FogStage,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            daylight: true,
            fog: false,
            fog_density: fog_density(0.0),
            animate_fog: true,
            fog_stage: FogStage::Lighting,
        }
    }
}

impl Weather {
    pub fn update(&mut self, time: f32) {
        if self.animate_fog {
            self.fog_density = fog_density(time);
        }
    }

    /// Fog density for the lighting pass, if it applies fog
    pub fn lighting_fog(&self) -> Option<f32> {
        (self.fog && self.fog_stage == FogStage::Lighting).then_some(self.fog_density)
    }

    /// Fog density for the geometry pass, if it applies fog
    pub fn geometry_fog(&self) -> Option<f32> {
        (self.fog && self.fog_stage == FogStage::Geometry).then_some(self.fog_density)
    }

    /// Colour of pixels no object covers
    pub fn background(&self) -> Vec3 {
        if self.fog {
            FOG_COLOR
        } else {
            BACKGROUND_COLOR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fog_density_range() {
        for i in 0..200 {
            let d = fog_density(i as f32 * 0.37);
            assert!((0.0..=1.0).contains(&d), "density {} out of range", d);
        }
        assert!((fog_density(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_update_respects_animate_flag() {
        let mut weather = Weather {
            animate_fog: false,
            fog_density: 0.25,
            ..Default::default()
        };
        weather.update(3.0);
        assert_eq!(weather.fog_density, 0.25);

        weather.animate_fog = true;
        weather.update(3.0);
        assert!((weather.fog_density - fog_density(3.0)).abs() < 1e-6);
    }

    #[test]
    fn test_fog_stage_selects_pass() {
        let mut weather = Weather {
            fog: true,
            ..Default::default()
        };
        assert!(weather.lighting_fog().is_some());
        assert!(weather.geometry_fog().is_none());

        weather.fog_stage = FogStage::Geometry;
        assert!(weather.lighting_fog().is_none());
        assert!(weather.geometry_fog().is_some());

        weather.fog = false;
        assert!(weather.geometry_fog().is_none());
        assert_eq!(weather.background(), BACKGROUND_COLOR);
    }
}
