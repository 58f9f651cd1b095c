//! Software deferred renderer
//!
//! Ray-casts the geometry pass into an in-memory g-buffer, then shades it
//! with the functions in [`crate::shading`]. Produces the same image as the
//! GL pipeline up to sphere tessellation and 8-bit albedo quantisation, and
//! runs without a GL context.

use glam::{Mat3, Mat4, Vec2, Vec3};
use image::{Rgb, RgbImage};

use crate::camera::Camera;
use crate::scene::{Scene, Shape, normal_matrix};
use crate::shading::{Fragment, LightingParams, ShadingSettings, fog_blend, shade_fragment};
use crate::weather::Weather;

/// Ray for raytracing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Same ray expressed in another space; `t` values are preserved
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }
}

/// Nearest hit along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub t: f32,
    pub normal: Vec3,
}

/// Slab test against the unit cube (extents ±0.5)
pub fn intersect_unit_cube(ray: &Ray) -> Option<Hit> {
    let box_min = Vec3::splat(-0.5);
    let box_max = Vec3::splat(0.5);

    let inv_dir = 1.0 / ray.direction;
    let t_min = (box_min - ray.origin) * inv_dir;
    let t_max = (box_max - ray.origin) * inv_dir;

    let t1 = t_min.min(t_max);
    let t2 = t_min.max(t_max);

    let t_near = t1.x.max(t1.y).max(t1.z);
    let t_far = t2.x.min(t2.y).min(t2.z);

    if t_near > t_far || t_far < 0.0 {
        return None;
    }

    let t = if t_near > 0.0 { t_near } else { t_far };
    let local_point = ray.at(t);

    // Face normal from the dominant axis of the hit point
    let d = local_point.abs();
    let max_component = d.x.max(d.y).max(d.z);
    let normal = if (max_component - d.x).abs() < 0.0001 {
        Vec3::new(local_point.x.signum(), 0.0, 0.0)
    } else if (max_component - d.y).abs() < 0.0001 {
        Vec3::new(0.0, local_point.y.signum(), 0.0)
    } else {
        Vec3::new(0.0, 0.0, local_point.z.signum())
    };

    Some(Hit { t, normal })
}

/// Nearest non-negative hit on a sphere of `radius` at the origin
///
/// A ray starting inside the sphere hits the far side, whose outward
/// normal is reported unchanged.
pub fn intersect_sphere(ray: &Ray, radius: f32) -> Option<Hit> {
    let a = ray.direction.length_squared();
    let b = 2.0 * ray.origin.dot(ray.direction);
    let c = ray.origin.length_squared() - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || a == 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t0 = (-b - sqrt_d) / (2.0 * a);
    let t1 = (-b + sqrt_d) / (2.0 * a);
    let t = if t0 >= 0.0 {
        t0
    } else if t1 >= 0.0 {
        t1
    } else {
        return None;
    };

    Some(Hit {
        t,
        normal: ray.at(t).normalize_or_zero(),
    })
}

/// Ray through the centre of pixel (x, y), row 0 at the top
///
/// Starts on the near plane so only geometry the rasteriser would keep is
/// hit.
pub fn pixel_ray(inv_view_proj: &Mat4, x: u32, y: u32, width: u32, height: u32) -> Ray {
    let ndc = Vec2::new(
        (x as f32 + 0.5) / width as f32 * 2.0 - 1.0,
        1.0 - (y as f32 + 0.5) / height as f32 * 2.0,
    );
    let near = inv_view_proj.project_point3(ndc.extend(-1.0));
    let far = inv_view_proj.project_point3(ndc.extend(1.0));
    Ray {
        origin: near,
        direction: (far - near).normalize(),
    }
}

/// One covered g-buffer texel (world space)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GSample {
    pub position: Vec3,
    pub normal: Vec3,
    pub albedo: Vec3,
    /// Light marker: shown as `albedo`, no lighting or fog
    pub emissive: bool,
}

/// In-memory g-buffer; `None` where no object covers the pixel
#[derive(Debug, Clone, PartialEq)]
pub struct GBufferImage {
    width: u32,
    height: u32,
    samples: Vec<Option<GSample>>,
}

impl GBufferImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&GSample> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples[(y * self.width + x) as usize].as_ref()
    }

    /// Number of covered pixels
    pub fn coverage(&self) -> usize {
        self.samples.iter().filter(|s| s.is_some()).count()
    }
}

/// Quantise a linear colour the way an 8-bit framebuffer does
pub fn to_rgb8(color: Vec3) -> Rgb<u8> {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    Rgb([c.x as u8, c.y as u8, c.z as u8])
}

/// Lighting pass over an in-memory g-buffer
///
/// `params.lights` must already be in view space.
pub fn shade_gbuffer(
    gbuffer: &GBufferImage,
    view: &Mat4,
    params: &LightingParams,
    background: Vec3,
) -> RgbImage {
    let normal_view = Mat3::from_mat4(*view).inverse().transpose();
    let background = to_rgb8(background);

    let shade = |x: u32, y: u32| match gbuffer.get(x, y) {
        None => background,
        Some(sample) if sample.emissive => to_rgb8(sample.albedo),
        Some(sample) => {
            let fragment = Fragment {
                position: view.transform_point3(sample.position),
                normal: normal_view * sample.normal,
                albedo: sample.albedo,
            };
            to_rgb8(shade_fragment(&fragment, params))
        }
    };
    RgbImage::from_fn(gbuffer.width, gbuffer.height, shade)
}

/// CPU implementation of both deferred passes
#[derive(Debug, Clone, Copy)]
pub struct CpuDeferred {
    pub width: u32,
    pub height: u32,
}

impl CpuDeferred {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Ray-cast every object and light marker, keeping the nearest hit per pixel
    ///
    /// With `fog_density` set the stored albedo of lit surfaces is
    /// fog-blended by view distance, as the geometry shader does.
    pub fn geometry_pass(
        &self,
        scene: &Scene,
        camera: &Camera,
        time: f32,
        fog_density: Option<f32>,
    ) -> GBufferImage {
        let view = camera.view_matrix();
        let inv_view_proj = camera.view_projection(self.aspect_ratio()).inverse();

        // Per-object transforms are the same for every pixel
        let markers = scene.marker_objects();
        let objects: Vec<_> = scene
            .objects
            .iter()
            .map(|object| (object, false))
            .chain(markers.iter().map(|marker| (marker, true)))
            .map(|(object, emissive)| {
                let model = object.model_matrix(time);
                (object, emissive, model.inverse(), normal_matrix(&model))
            })
            .collect();

        let mut samples = Vec::with_capacity((self.width * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let ray = pixel_ray(&inv_view_proj, x, y, self.width, self.height);

                let mut nearest: Option<(f32, GSample)> = None;
                for (object, emissive, inv_model, normal_mat) in &objects {
                    let local = ray.transformed(inv_model);
                    let hit = match object.shape {
                        Shape::Cube => intersect_unit_cube(&local),
                        Shape::Sphere => intersect_sphere(&local, scene.sphere_radius),
                    };
                    let Some(hit) = hit else { continue };
                    if nearest.is_some_and(|(t, _)| t <= hit.t) {
                        continue;
                    }

                    let position = ray.at(hit.t);
                    let albedo = match fog_density {
                        Some(density) if !*emissive => {
                            let distance = view.transform_point3(position).length();
                            fog_blend(object.color, distance, density)
                        }
                        _ => object.color,
                    };
                    nearest = Some((
                        hit.t,
                        GSample {
                            position,
                            normal: (*normal_mat * hit.normal).normalize_or_zero(),
                            albedo,
                            emissive: *emissive,
                        },
                    ));
                }
                samples.push(nearest.map(|(_, sample)| sample));
            }
        }

        GBufferImage {
            width: self.width,
            height: self.height,
            samples,
        }
    }

    /// Render the scene's active camera at `time`
    pub fn render(
        &self,
        scene: &Scene,
        weather: &Weather,
        settings: ShadingSettings,
        time: f32,
    ) -> RgbImage {
        let camera = scene.camera();
        let gbuffer = self.geometry_pass(scene, camera, time, weather.geometry_fog());

        let view = camera.view_matrix();
        let view_lights = scene.lights.to_view(&view);
        let params = LightingParams {
            lights: &view_lights,
            daylight: weather.daylight,
            fog_density: weather.lighting_fog(),
            settings,
        };
        tracing::debug!(
            "CPU lighting pass: {}/{} pixels covered",
            gbuffer.coverage(),
            self.width * self.height
        );
        shade_gbuffer(&gbuffer, &view, &params, weather.background())
    }
}
