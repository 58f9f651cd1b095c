//! Scene objects, built-in tables and per-frame animation

use glam::{Mat3, Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::camera::{CAMERA_TABLE, Camera};
use crate::config::SceneConfig;
use crate::error::Result;
use crate::lighting::{LightKind, LightSet, ORBITING_LIGHT};

/// Radians per second objects spin around their rotation axis
pub const ROTATION_SPEED: f32 = 0.5;

/// Distance of the moon from the centre of the green sphere
pub const MOON_ORBIT_RADIUS: f32 = 0.6;

/// Radians per second for the moon's orbit
pub const MOON_ORBIT_SPEED: f32 = 1.0;

/// Distance of the orbiting red light from the origin
pub const LIGHT_ORBIT_RADIUS: f32 = 1.0;

/// Scale of the unlit cube drawn at each point and spot light
pub const LIGHT_MARKER_SCALE: f32 = 0.01;

const WHITE: Vec3 = Vec3::ONE;
const GREEN: Vec3 = Vec3::new(0.0, 1.0, 0.0);
const BLUE: Vec3 = Vec3::new(0.0, 0.0, 1.0);
const CUBE_SCALE: f32 = 0.1;
const CUBE_AXIS: Vec3 = Vec3::splat(0.1);

/// Range random cube coordinates are drawn from
const RANDOM_RANGE: std::ops::Range<f32> = -1.0..0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Cube,
    Sphere,
}

/// Renderable instance of the unit cube or the shared sphere mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub shape: Shape,
    pub color: Vec3,
    pub position: Vec3,
    /// Spin axis; zero disables rotation
    pub rotation_axis: Vec3,
    pub scale: f32,
}

impl SceneObject {
    pub fn model_matrix(&self, time: f32) -> Mat4 {
        model_matrix(self.position, self.scale, self.rotation_axis, time)
    }
}

/// `translate(position) * scale(s) * rotate(axis, time * 0.5)`
pub fn model_matrix(position: Vec3, scale: f32, axis: Vec3, time: f32) -> Mat4 {
    let model = Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(scale));
    if axis.length_squared() > 0.0 {
        model * Mat4::from_axis_angle(axis.normalize(), time * ROTATION_SPEED)
    } else {
        model
    }
}

/// Inverse-transpose of the model's upper 3x3
pub fn normal_matrix(model: &Mat4) -> Mat3 {
    Mat3::from_mat4(*model).inverse().transpose()
}

/// Which cube field to place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CubeLayout {
    #[default]
    Fixed,
    Random,
    None,
}

/// Green planet, its moon and the enclosing blue sphere
pub fn sphere_table() -> [SceneObject; 3] {
    let planet = SceneObject {
        shape: Shape::Sphere,
        color: GREEN,
        position: Vec3::new(-0.1, -0.1, 0.0),
        rotation_axis: Vec3::splat(0.1),
        scale: 0.4,
    };
    [
        planet,
        SceneObject {
            position: moon_position(planet.position, 0.0),
            scale: 0.07,
            ..planet
        },
        SceneObject {
            shape: Shape::Sphere,
            color: BLUE,
            position: Vec3::ZERO,
            rotation_axis: Vec3::ZERO,
            scale: 6.0,
        },
    ]
}

/// Index of the moon in [`sphere_table`]
const MOON: usize = 1;

pub fn fixed_cubes() -> Vec<SceneObject> {
    const POSITIONS: [[f32; 3]; 12] = [
        [0.3, 0.0, 0.0],
        [1.0, 0.3, -1.0],
        [0.7, -0.3, -0.1],
        [0.7, 0.3, 0.6],
        [-0.5, 0.3, -0.2],
        [0.0, 0.3, 0.2],
        [0.2, 0.3, 0.0],
        [1.0, 0.3, 0.0],
        [-1.0, 0.3, 0.3],
        [0.0, 0.3, 0.2],
        [0.0, -1.3, 0.5],
        [0.0, 2.3, 0.7],
    ];
    POSITIONS
        .iter()
        .map(|p| SceneObject {
            shape: Shape::Cube,
            color: WHITE,
            position: Vec3::from_array(*p),
            rotation_axis: CUBE_AXIS,
            scale: CUBE_SCALE,
        })
        .collect()
}

/// `count` white cubes; each cube spins around its own position vector
pub fn random_cubes(count: usize, seed: u64) -> Vec<SceneObject> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let p = Vec3::new(
                rng.random_range(RANDOM_RANGE),
                rng.random_range(RANDOM_RANGE),
                rng.random_range(RANDOM_RANGE),
            );
            SceneObject {
                shape: Shape::Cube,
                color: WHITE,
                position: p,
                rotation_axis: p,
                scale: CUBE_SCALE,
            }
        })
        .collect()
}

/// Moon centre at `time`, circling `planet` in its XY plane
pub fn moon_position(planet: Vec3, time: f32) -> Vec3 {
    let angle = time * MOON_ORBIT_SPEED;
    planet + Vec3::new(angle.cos(), angle.sin(), 0.0) * MOON_ORBIT_RADIUS
}

/// Position of the orbiting point light at `time`
pub fn orbiting_light_position(time: f32) -> Vec3 {
    Vec3::new(time.sin(), 0.0, time.cos()) * LIGHT_ORBIT_RADIUS
}

/// Everything the passes draw, owned by the application
#[derive(Debug, Clone)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: LightSet,
    pub sphere_radius: f32,
    /// Draw [`Scene::marker_objects`] as unlit cubes
    pub light_markers: bool,
    camera_index: usize,
}

impl Scene {
    pub fn new(config: &SceneConfig) -> Result<Self> {
        let mut objects: Vec<SceneObject> = sphere_table().to_vec();
        match config.cubes {
            CubeLayout::Fixed => objects.extend(fixed_cubes()),
            CubeLayout::Random => {
                objects.extend(random_cubes(config.random_cube_count, config.seed))
            }
            CubeLayout::None => {}
        }

        let lights = LightSet::from_table(config.light_count)?;

        tracing::info!(
            "Scene: {} objects, {} lights, cube layout {:?}",
            objects.len(),
            lights.len(),
            config.cubes
        );

        Ok(Self {
            objects,
            lights,
            sphere_radius: config.sphere_radius,
            light_markers: config.light_markers,
            camera_index: 0,
        })
    }

    /// Scene with explicit contents, no animated entries and no light markers
    pub fn from_parts(objects: Vec<SceneObject>, lights: LightSet, sphere_radius: f32) -> Self {
        Self {
            objects,
            lights,
            sphere_radius,
            light_markers: false,
            camera_index: 0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &CAMERA_TABLE[self.camera_index]
    }

    pub fn camera_index(&self) -> usize {
        self.camera_index
    }

    /// Switch camera; out-of-range indices are ignored
    pub fn select_camera(&mut self, index: usize) -> bool {
        if index < CAMERA_TABLE.len() {
            self.camera_index = index;
            true
        } else {
            false
        }
    }

    /// Move animated entries to their positions at `time`
    pub fn animate(&mut self, time: f32) {
        let planet = sphere_table()[0].position;
        if let Some(moon) = self.objects.get_mut(MOON) {
            if moon.shape == Shape::Sphere {
                moon.position = moon_position(planet, time);
            }
        }
        if let Some(light) = self.lights.get_mut(ORBITING_LIGHT) {
            if light.kind == LightKind::Point {
                light.position = orbiting_light_position(time);
            }
        }
    }

    /// White cubes at every point and spot light, empty when markers are off
    ///
    /// Directional lights have no position and get no marker.
    pub fn marker_objects(&self) -> Vec<SceneObject> {
        if !self.light_markers {
            return Vec::new();
        }
        self.lights
            .iter()
            .filter(|light| light.kind != LightKind::Directional)
            .map(|light| SceneObject {
                shape: Shape::Cube,
                color: WHITE,
                position: light.position,
                rotation_axis: Vec3::ZERO,
                scale: LIGHT_MARKER_SCALE,
            })
            .collect()
    }

    /// Offset the directional light's direction (arrow keys)
    pub fn nudge_directional(&mut self, delta: Vec3) {
        if let Some(light) = self.lights.directional_mut() {
            light.direction += delta;
        }
    }
}
