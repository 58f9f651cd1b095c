//! Geometry pass: rasterises scene objects into the g-buffer

use glam::Mat4;
use glow::*;

use crate::error::{RenderError, Result};
use crate::gbuffer::GBuffer;
use crate::lighting::FOG_COLOR;
use crate::mesh::{self, FLOATS_PER_VERTEX, MeshData};
use crate::scene::{Scene, SceneObject, Shape, normal_matrix};
use crate::shader_utils::{create_program, glsl_vec3, inject_defines};

const VERTEX_SHADER_SOURCE: &str = include_str!("../shaders/geometry.vert");
const FRAGMENT_SHADER_SOURCE: &str = include_str!("../shaders/geometry.frag");

/// Fragment shader source with host constants injected
pub fn fragment_source() -> String {
    let defines = [("FOG_COLOR", glsl_vec3(FOG_COLOR))];
    inject_defines(FRAGMENT_SHADER_SOURCE, &defines)
}

pub fn vertex_source() -> &'static str {
    VERTEX_SHADER_SOURCE
}

/// Mesh uploaded to GL buffers
struct GlMesh {
    vao: VertexArray,
    vbo: Buffer,
    ebo: Buffer,
    index_count: i32,
}

impl GlMesh {
    unsafe fn upload(gl: &Context, mesh: &MeshData) -> Result<Self> {
        unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| RenderError::gl_object("VAO", e))?;
            gl.bind_vertex_array(Some(vao));

            let vbo = gl
                .create_buffer()
                .map_err(|e| RenderError::gl_object("VBO", e))?;
            gl.bind_buffer(ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                ARRAY_BUFFER,
                bytemuck::cast_slice(&mesh.vertices),
                STATIC_DRAW,
            );

            let ebo = gl
                .create_buffer()
                .map_err(|e| RenderError::gl_object("EBO", e))?;
            gl.bind_buffer(ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&mesh.indices),
                STATIC_DRAW,
            );

            let stride = (FLOATS_PER_VERTEX * std::mem::size_of::<f32>()) as i32;

            // Position attribute (location 0)
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, FLOAT, false, stride, 0);

            // Normal attribute (location 1)
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                3,
                FLOAT,
                false,
                stride,
                3 * std::mem::size_of::<f32>() as i32,
            );

            gl.bind_vertex_array(None);

            Ok(Self {
                vao,
                vbo,
                ebo,
                index_count: mesh.index_count() as i32,
            })
        }
    }

    unsafe fn draw(&self, gl: &Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(TRIANGLES, self.index_count, UNSIGNED_INT, 0);
        }
    }

    unsafe fn destroy(self, gl: &Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
        }
    }
}

struct GeometryGlResources {
    program: Program,
    cube: GlMesh,
    sphere: GlMesh,

    model_loc: Option<UniformLocation>,
    view_loc: Option<UniformLocation>,
    projection_loc: Option<UniformLocation>,
    normal_matrix_loc: Option<UniformLocation>,
    albedo_loc: Option<UniformLocation>,
    fog_enabled_loc: Option<UniformLocation>,
    fog_density_loc: Option<UniformLocation>,
    emissive_loc: Option<UniformLocation>,
}

impl GeometryGlResources {
    /// Set the per-object uniforms and draw its mesh; the program must be bound
    unsafe fn draw_object(&self, gl: &Context, object: &SceneObject, time: f32) {
        let model = object.model_matrix(time);
        let normal = normal_matrix(&model);
        let color = object.color;

        unsafe {
            gl.uniform_matrix_4_f32_slice(self.model_loc.as_ref(), false, &model.to_cols_array());
            gl.uniform_matrix_3_f32_slice(
                self.normal_matrix_loc.as_ref(),
                false,
                &normal.to_cols_array(),
            );
            gl.uniform_3_f32(self.albedo_loc.as_ref(), color.x, color.y, color.z);

            match object.shape {
                Shape::Cube => self.cube.draw(gl),
                Shape::Sphere => self.sphere.draw(gl),
            }
        }
    }
}

/// Per-frame camera and fog inputs
#[derive(Debug, Clone, Copy)]
pub struct GeometryFrame {
    pub view: Mat4,
    pub projection: Mat4,
    pub time: f32,
    /// Fog density when fog is applied to albedo in this pass
    pub fog_density: Option<f32>,
}

#[derive(Default)]
pub struct GeometryPass {
    gl_resources: Option<GeometryGlResources>,
}

impl GeometryPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.gl_resources.is_some()
    }

    /// Compile shaders and upload the cube and sphere meshes
    ///
    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn init_gl(&mut self, gl: &Context, sphere: &MeshData) -> Result<()> {
        unsafe {
            let program = create_program(gl, VERTEX_SHADER_SOURCE, &fragment_source())?;
            let cube = GlMesh::upload(gl, &mesh::cube())?;
            tracing::debug!(
                "Uploading sphere mesh: {} vertices, {} indices",
                sphere.vertex_count(),
                sphere.index_count()
            );
            let sphere = GlMesh::upload(gl, sphere)?;

            self.gl_resources = Some(GeometryGlResources {
                model_loc: gl.get_uniform_location(program, "u_model"),
                view_loc: gl.get_uniform_location(program, "u_view"),
                projection_loc: gl.get_uniform_location(program, "u_projection"),
                normal_matrix_loc: gl.get_uniform_location(program, "u_normalMatrix"),
                albedo_loc: gl.get_uniform_location(program, "u_albedo"),
                fog_enabled_loc: gl.get_uniform_location(program, "u_fogEnabled"),
                fog_density_loc: gl.get_uniform_location(program, "u_fogDensity"),
                emissive_loc: gl.get_uniform_location(program, "u_emissive"),
                program,
                cube,
                sphere,
            });
            Ok(())
        }
    }

    /// Fill the g-buffer with every object in the scene, then the light markers
    ///
    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn render(
        &self,
        gl: &Context,
        gbuffer: &GBuffer,
        scene: &Scene,
        frame: &GeometryFrame,
    ) {
        let Some(res) = &self.gl_resources else {
            return;
        };

        unsafe {
            gbuffer.begin_geometry(gl);
            gl.enable(DEPTH_TEST);
            gl.disable(BLEND);

            gl.use_program(Some(res.program));
            gl.uniform_matrix_4_f32_slice(
                res.view_loc.as_ref(),
                false,
                &frame.view.to_cols_array(),
            );
            gl.uniform_matrix_4_f32_slice(
                res.projection_loc.as_ref(),
                false,
                &frame.projection.to_cols_array(),
            );
            gl.uniform_1_i32(
                res.fog_enabled_loc.as_ref(),
                frame.fog_density.is_some() as i32,
            );
            gl.uniform_1_f32(
                res.fog_density_loc.as_ref(),
                frame.fog_density.unwrap_or(0.0),
            );

            gl.uniform_1_i32(res.emissive_loc.as_ref(), 0);
            for object in &scene.objects {
                res.draw_object(gl, object, frame.time);
            }

            gl.uniform_1_i32(res.emissive_loc.as_ref(), 1);
            for marker in &scene.marker_objects() {
                res.draw_object(gl, marker, frame.time);
            }

            gl.bind_vertex_array(None);
            gl.use_program(None);
            gl.bind_framebuffer(FRAMEBUFFER, None);
        }
    }

    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn destroy_gl(&mut self, gl: &Context) {
        if let Some(res) = self.gl_resources.take() {
            unsafe {
                gl.delete_program(res.program);
                res.cube.destroy(gl);
                res.sphere.destroy(gl);
            }
        }
    }
}
