//! Deferred renderer: owns the g-buffer and both passes
//!
//! # Usage
//!
//! ```ignore
//! let mut renderer = DeferredRenderer::new();
//! unsafe { renderer.init_gl(gl, &sphere_mesh, (800, 600))? };
//!
//! // In render loop:
//! unsafe { renderer.render(gl, &frame)? };
//!
//! // On shutdown:
//! unsafe { renderer.destroy_gl(gl) };
//! ```

use glow::Context;

use crate::error::Result;
use crate::gbuffer::GBuffer;
use crate::mesh::MeshData;
use crate::scene::Scene;
use crate::shading::{LightingParams, ShadingSettings};
use crate::weather::Weather;

use super::geometry_pass::{GeometryFrame, GeometryPass};
use super::lighting_pass::{LightingFrame, LightingPass};

/// Everything one frame depends on
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub scene: &'a Scene,
    pub weather: &'a Weather,
    pub settings: ShadingSettings,
    /// Seconds since start, drives object rotation
    pub time: f32,
    /// Framebuffer size in pixels
    pub size: (u32, u32),
}

impl FrameInput<'_> {
    pub fn aspect_ratio(&self) -> f32 {
        if self.size.1 > 0 {
            self.size.0 as f32 / self.size.1 as f32
        } else {
            1.0
        }
    }
}

#[derive(Default)]
pub struct DeferredRenderer {
    gbuffer: Option<GBuffer>,
    geometry: GeometryPass,
    lighting: LightingPass,
}

impl DeferredRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the g-buffer and compile both passes
    ///
    /// Shader compile or link failures are returned with the driver log.
    ///
    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn init_gl(
        &mut self,
        gl: &Context,
        sphere: &MeshData,
        size: (u32, u32),
    ) -> Result<()> {
        unsafe {
            tracing::info!("Compiling deferred shading programs...");
            self.geometry.init_gl(gl, sphere)?;
            self.lighting.init_gl(gl)?;
            self.gbuffer = Some(GBuffer::new(gl, size.0, size.1)?);
            tracing::info!("Deferred renderer initialized at {}x{}", size.0, size.1);
            Ok(())
        }
    }

    /// Run the geometry and lighting passes for one frame
    ///
    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn render(&mut self, gl: &Context, frame: &FrameInput) -> Result<()> {
        let Some(gbuffer) = self.gbuffer.as_mut() else {
            return Ok(());
        };

        let camera = frame.scene.camera();
        let view = camera.view_matrix();
        let projection = camera.projection_matrix(frame.aspect_ratio());
        let view_lights = frame.scene.lights.to_view(&view);

        unsafe {
            gbuffer.resize(gl, frame.size.0, frame.size.1)?;

            self.geometry.render(
                gl,
                gbuffer,
                frame.scene,
                &GeometryFrame {
                    view,
                    projection,
                    time: frame.time,
                    fog_density: frame.weather.geometry_fog(),
                },
            );

            self.lighting.render(
                gl,
                gbuffer,
                &LightingFrame {
                    view,
                    params: LightingParams {
                        lights: &view_lights,
                        daylight: frame.weather.daylight,
                        fog_density: frame.weather.lighting_fog(),
                        settings: frame.settings,
                    },
                    background: frame.weather.background(),
                    viewport: frame.size,
                },
            );
        }
        Ok(())
    }

    /// Release all GL resources
    ///
    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn destroy_gl(&mut self, gl: &Context) {
        unsafe {
            self.geometry.destroy_gl(gl);
            self.lighting.destroy_gl(gl);
            if let Some(gbuffer) = self.gbuffer.take() {
                gbuffer.destroy(gl);
            }
        }
    }
}

impl Drop for DeferredRenderer {
    fn drop(&mut self) {
        let programs = self.geometry.is_initialized() || self.lighting.is_initialized();
        if self.gbuffer.is_some() || programs {
            tracing::warn!("DeferredRenderer dropped without calling destroy_gl()");
        }
    }
}
