//! Geometry buffer: the render targets written by the geometry pass

use glow::*;

use crate::error::{RenderError, Result};

/// Default g-buffer size before the first resize
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Colour attachments in shader output order
const ATTACHMENTS: [u32; 3] = [COLOR_ATTACHMENT0, COLOR_ATTACHMENT1, COLOR_ATTACHMENT2];

/// Framebuffer with position, normal and albedo textures plus depth
pub struct GBuffer {
    framebuffer: Framebuffer,
    /// World-space position (RGB16F)
    position: Texture,
    /// World-space unit normal (RGB16F); zero where nothing was drawn
    normal: Texture,
    /// Flat surface colour (RGBA8); alpha 0 marks unlit surfaces
    albedo: Texture,
    depth: Renderbuffer,
    width: u32,
    height: u32,
}

impl GBuffer {
    /// Create all targets at the given size
    ///
    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn new(gl: &Context, width: u32, height: u32) -> Result<Self> {
        unsafe {
            let framebuffer = gl
                .create_framebuffer()
                .map_err(|e| RenderError::gl_object("g-buffer framebuffer", e))?;
            let position = gl
                .create_texture()
                .map_err(|e| RenderError::gl_object("position texture", e))?;
            let normal = gl
                .create_texture()
                .map_err(|e| RenderError::gl_object("normal texture", e))?;
            let albedo = gl
                .create_texture()
                .map_err(|e| RenderError::gl_object("albedo texture", e))?;
            let depth = gl
                .create_renderbuffer()
                .map_err(|e| RenderError::gl_object("depth renderbuffer", e))?;

            let mut gbuffer = Self {
                framebuffer,
                position,
                normal,
                albedo,
                depth,
                width: 0,
                height: 0,
            };
            gbuffer.resize(gl, width, height)?;
            Ok(gbuffer)
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reallocate storage if the size changed
    ///
    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn resize(&mut self, gl: &Context, width: u32, height: u32) -> Result<()> {
        if (self.width == width && self.height == height) || width == 0 || height == 0 {
            return Ok(());
        }

        unsafe {
            allocate_texture(gl, self.position, RGB16F, RGB, FLOAT, width, height);
            allocate_texture(gl, self.normal, RGB16F, RGB, FLOAT, width, height);
            allocate_texture(gl, self.albedo, RGBA8, RGBA, UNSIGNED_BYTE, width, height);
            gl.bind_texture(TEXTURE_2D, None);

            gl.bind_renderbuffer(RENDERBUFFER, Some(self.depth));
            gl.renderbuffer_storage(RENDERBUFFER, DEPTH_COMPONENT24, width as i32, height as i32);
            gl.bind_renderbuffer(RENDERBUFFER, None);

            gl.bind_framebuffer(FRAMEBUFFER, Some(self.framebuffer));
            let textures = [self.position, self.normal, self.albedo];
            for (attachment, texture) in ATTACHMENTS.iter().zip(textures) {
                gl.framebuffer_texture_2d(FRAMEBUFFER, *attachment, TEXTURE_2D, Some(texture), 0);
            }
            gl.framebuffer_renderbuffer(
                FRAMEBUFFER,
                DEPTH_ATTACHMENT,
                RENDERBUFFER,
                Some(self.depth),
            );
            gl.draw_buffers(&ATTACHMENTS);

            let status = gl.check_framebuffer_status(FRAMEBUFFER);
            gl.bind_framebuffer(FRAMEBUFFER, None);
            if status != FRAMEBUFFER_COMPLETE {
                return Err(RenderError::IncompleteFramebuffer(status));
            }
        }

        self.width = width;
        self.height = height;
        tracing::debug!("G-buffer resized to {}x{}", width, height);
        Ok(())
    }

    /// Bind as draw target and clear every attachment to zero
    ///
    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn begin_geometry(&self, gl: &Context) {
        unsafe {
            gl.bind_framebuffer(FRAMEBUFFER, Some(self.framebuffer));
            gl.viewport(0, 0, self.width as i32, self.height as i32);
            gl.clear_color(0.0, 0.0, 0.0, 0.0);
            gl.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT);
        }
    }

    /// Bind position, normal and albedo to texture units 0, 1 and 2
    ///
    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn bind_textures(&self, gl: &Context) {
        unsafe {
            let textures = [self.position, self.normal, self.albedo];
            for (unit, texture) in textures.into_iter().enumerate() {
                gl.active_texture(TEXTURE0 + unit as u32);
                gl.bind_texture(TEXTURE_2D, Some(texture));
            }
        }
    }

    /// # Safety
    /// Must be called with an active GL context.
    pub unsafe fn destroy(self, gl: &Context) {
        unsafe {
            gl.delete_framebuffer(self.framebuffer);
            gl.delete_texture(self.position);
            gl.delete_texture(self.normal);
            gl.delete_texture(self.albedo);
            gl.delete_renderbuffer(self.depth);
        }
    }
}

unsafe fn allocate_texture(
    gl: &Context,
    texture: Texture,
    internal_format: u32,
    format: u32,
    data_type: u32,
    width: u32,
    height: u32,
) {
    unsafe {
        gl.bind_texture(TEXTURE_2D, Some(texture));
        gl.tex_image_2d(
            TEXTURE_2D,
            0,
            internal_format as i32,
            width as i32,
            height as i32,
            0,
            format,
            data_type,
            PixelUnpackData::Slice(None::<&[u8]>),
        );
        gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_MIN_FILTER, NEAREST as i32);
        gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_MAG_FILTER, NEAREST as i32);
        gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_WRAP_S, CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_WRAP_T, CLAMP_TO_EDGE as i32);
    }
}
