//! Lighting pass: shades the g-buffer onto the default framebuffer

use glam::{Mat3, Mat4, Vec3};
use glow::*;

use crate::error::{RenderError, Result};
use crate::gbuffer::GBuffer;
use crate::lighting::{
    AMBIENT_DAY, AMBIENT_NIGHT, ATTENUATION_LINEAR, ATTENUATION_QUADRATIC, FOG_COLOR, LightKind,
    MAX_LIGHTS, SPOT_INNER_COS, SPOT_OUTER_COS,
};
use crate::shader_utils::{create_program, glsl_float, glsl_vec3, inject_defines};
use crate::shading::LightingParams;

const VERTEX_SHADER_SOURCE: &str = include_str!("../shaders/lighting.vert");
const FRAGMENT_SHADER_SOURCE: &str = include_str!("../shaders/lighting.frag");

/// Constants the lighting shader receives as `#define`s
pub fn shader_defines() -> Vec<(&'static str, String)> {
    vec![
        ("MAX_LIGHTS", MAX_LIGHTS.to_string()),
        ("LIGHT_POINT", LightKind::Point.as_i32().to_string()),
        ("LIGHT_DIRECTIONAL", LightKind::Directional.as_i32().to_string()),
        ("LIGHT_SPOT", LightKind::Spot.as_i32().to_string()),
        ("AMBIENT_DAY", glsl_float(AMBIENT_DAY)),
        ("AMBIENT_NIGHT", glsl_float(AMBIENT_NIGHT)),
        ("ATTENUATION_LINEAR", glsl_float(ATTENUATION_LINEAR)),
        ("ATTENUATION_QUADRATIC", glsl_float(ATTENUATION_QUADRATIC)),
        ("SPOT_INNER_COS", glsl_float(SPOT_INNER_COS)),
        ("SPOT_OUTER_COS", glsl_float(SPOT_OUTER_COS)),
        ("FOG_COLOR", glsl_vec3(FOG_COLOR)),
    ]
}

/// Fragment shader source with host constants injected
pub fn fragment_source() -> String {
    inject_defines(FRAGMENT_SHADER_SOURCE, &shader_defines())
}

pub fn vertex_source() -> &'static str {
    VERTEX_SHADER_SOURCE
}

struct LightLocations {
    kind: Option<UniformLocation>,
    position: Option<UniformLocation>,
    direction: Option<UniformLocation>,
    color: Option<UniformLocation>,
}

struct LightingGlResources {
    program: Program,
    /// Empty VAO; the fullscreen triangle comes from gl_VertexID
    vao: VertexArray,

    lights: Vec<LightLocations>,
    light_count_loc: Option<UniformLocation>,
    view_loc: Option<UniformLocation>,
    normal_view_loc: Option<UniformLocation>,
    daylight_loc: Option<UniformLocation>,
    fog_enabled_loc: Option<UniformLocation>,
    fog_density_loc: Option<UniformLocation>,
    background_loc: Option<UniformLocation>,
    specular_power_loc: Option<UniformLocation>,
    blinn_loc: Option<UniformLocation>,
}

/// Per-frame inputs to the lighting pass
#[derive(Debug, Clone, Copy)]
pub struct LightingFrame<'a> {
    pub view: Mat4,
    pub params: LightingParams<'a>,
    pub background: Vec3,
    pub viewport: (u32, u32),
}

#[derive(Default)]
pub struct LightingPass {
    gl_resources: Option<LightingGlResources>,
}

impl LightingPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.gl_resources.is_some()
    }

    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn init_gl(&mut self, gl: &Context) -> Result<()> {
        unsafe {
            let program = create_program(gl, VERTEX_SHADER_SOURCE, &fragment_source())?;

            let vao = gl
                .create_vertex_array()
                .map_err(|e| RenderError::gl_object("VAO", e))?;

            let lights = (0..MAX_LIGHTS)
                .map(|i| {
                    let field = |name: &str| format!("u_lights[{}].{}", i, name);
                    LightLocations {
                        kind: gl.get_uniform_location(program, &field("kind")),
                        position: gl.get_uniform_location(program, &field("position")),
                        direction: gl.get_uniform_location(program, &field("direction")),
                        color: gl.get_uniform_location(program, &field("color")),
                    }
                })
                .collect();

            // Sampler units match GBuffer::bind_textures
            gl.use_program(Some(program));
            for (unit, name) in ["u_gPosition", "u_gNormal", "u_gAlbedo"].iter().enumerate() {
                gl.uniform_1_i32(gl.get_uniform_location(program, name).as_ref(), unit as i32);
            }
            gl.use_program(None);

            self.gl_resources = Some(LightingGlResources {
                lights,
                light_count_loc: gl.get_uniform_location(program, "u_lightCount"),
                view_loc: gl.get_uniform_location(program, "u_view"),
                normal_view_loc: gl.get_uniform_location(program, "u_normalView"),
                daylight_loc: gl.get_uniform_location(program, "u_daylight"),
                fog_enabled_loc: gl.get_uniform_location(program, "u_fogEnabled"),
                fog_density_loc: gl.get_uniform_location(program, "u_fogDensity"),
                background_loc: gl.get_uniform_location(program, "u_background"),
                specular_power_loc: gl.get_uniform_location(program, "u_specularPower"),
                blinn_loc: gl.get_uniform_location(program, "u_blinn"),
                program,
                vao,
            });
            tracing::debug!("Lighting pass ready (MAX_LIGHTS = {})", MAX_LIGHTS);
            Ok(())
        }
    }

    /// Shade every pixel of the g-buffer into the default framebuffer
    ///
    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn render(&self, gl: &Context, gbuffer: &GBuffer, frame: &LightingFrame) {
        let Some(res) = &self.gl_resources else {
            return;
        };
        let params = &frame.params;

        unsafe {
            gl.bind_framebuffer(FRAMEBUFFER, None);
            gl.viewport(0, 0, frame.viewport.0 as i32, frame.viewport.1 as i32);
            gl.disable(DEPTH_TEST);
            let background = frame.background;
            gl.clear_color(background.x, background.y, background.z, 1.0);
            gl.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT);

            gl.use_program(Some(res.program));
            gbuffer.bind_textures(gl);

            let normal_view = Mat3::from_mat4(frame.view).inverse().transpose();
            let view = frame.view.to_cols_array();
            gl.uniform_matrix_4_f32_slice(res.view_loc.as_ref(), false, &view);
            gl.uniform_matrix_3_f32_slice(
                res.normal_view_loc.as_ref(),
                false,
                &normal_view.to_cols_array(),
            );

            let count = params.lights.len().min(MAX_LIGHTS);
            gl.uniform_1_i32(res.light_count_loc.as_ref(), count as i32);
            for (light, locs) in params.lights.iter().zip(&res.lights) {
                gl.uniform_1_i32(locs.kind.as_ref(), light.kind.as_i32());
                set_vec3(gl, locs.position.as_ref(), light.position);
                set_vec3(gl, locs.direction.as_ref(), light.direction);
                set_vec3(gl, locs.color.as_ref(), light.color);
            }

            gl.uniform_1_i32(res.daylight_loc.as_ref(), params.daylight as i32);
            let fog_enabled = params.fog_density.is_some() as i32;
            gl.uniform_1_i32(res.fog_enabled_loc.as_ref(), fog_enabled);
            let fog_density = params.fog_density.unwrap_or(0.0);
            gl.uniform_1_f32(res.fog_density_loc.as_ref(), fog_density);
            set_vec3(gl, res.background_loc.as_ref(), background);

            let settings = &params.settings;
            gl.uniform_1_f32(res.specular_power_loc.as_ref(), settings.specular_power);
            gl.uniform_1_i32(res.blinn_loc.as_ref(), settings.blinn as i32);

            gl.bind_vertex_array(Some(res.vao));
            gl.draw_arrays(TRIANGLES, 0, 3);

            gl.bind_vertex_array(None);
            gl.use_program(None);
        }
    }

    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn destroy_gl(&mut self, gl: &Context) {
        if let Some(res) = self.gl_resources.take() {
            unsafe {
                gl.delete_program(res.program);
                gl.delete_vertex_array(res.vao);
            }
        }
    }
}

unsafe fn set_vec3(gl: &Context, location: Option<&UniformLocation>, value: Vec3) {
    unsafe {
        gl.uniform_3_f32(location, value.x, value.y, value.z);
    }
}
