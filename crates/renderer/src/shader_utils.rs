//! Shader compilation helpers

use glow::*;

use crate::error::{RenderError, Result};

fn stage_name(shader_type: u32) -> &'static str {
    match shader_type {
        VERTEX_SHADER => "vertex",
        FRAGMENT_SHADER => "fragment",
        _ => "unknown",
    }
}

/// Compile a shader from source code
///
/// # Safety
/// Requires an active OpenGL context
pub unsafe fn compile_shader(gl: &Context, shader_type: u32, source: &str) -> Result<Shader> {
    unsafe {
        let shader = gl
            .create_shader(shader_type)
            .map_err(|e| RenderError::gl_object("shader", e))?;

        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(RenderError::ShaderCompile {
                stage: stage_name(shader_type),
                log,
            });
        }

        Ok(shader)
    }
}

/// Create and link a shader program from vertex and fragment shader sources
///
/// # Safety
/// Requires an active OpenGL context
pub unsafe fn create_program(
    gl: &Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<Program> {
    unsafe {
        let program = gl
            .create_program()
            .map_err(|e| RenderError::gl_object("program", e))?;

        let vertex_shader = compile_shader(gl, VERTEX_SHADER, vertex_src)?;
        let fragment_shader = match compile_shader(gl, FRAGMENT_SHADER, fragment_src) {
            Ok(shader) => shader,
            Err(e) => {
                gl.delete_shader(vertex_shader);
                gl.delete_program(program);
                return Err(e);
            }
        };

        gl.attach_shader(program, vertex_shader);
        gl.attach_shader(program, fragment_shader);
        gl.link_program(program);

        gl.detach_shader(program, vertex_shader);
        gl.detach_shader(program, fragment_shader);
        gl.delete_shader(vertex_shader);
        gl.delete_shader(fragment_shader);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(RenderError::ProgramLink(log));
        }

        Ok(program)
    }
}

/// Insert `#define NAME VALUE` lines right after the `#version` directive
///
/// GLSL requires `#version` to be the first statement, so defines cannot
/// simply be prepended.
pub fn inject_defines(source: &str, defines: &[(&str, String)]) -> String {
    let block: String = defines
        .iter()
        .map(|(name, value)| format!("#define {} {}\n", name, value))
        .collect();

    match source.find("#version") {
        Some(start) => {
            let line_end = source[start..]
                .find('\n')
                .map(|i| start + i + 1)
                .unwrap_or(source.len());
            let mut out = String::with_capacity(source.len() + block.len() + 1);
            out.push_str(&source[..line_end]);
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&block);
            out.push_str(&source[line_end..]);
            out
        }
        None => block + source,
    }
}

/// GLSL literal for a float (always has a decimal point)
pub fn glsl_float(value: f32) -> String {
    format!("{:?}", value)
}

/// GLSL `vec3(...)` literal
pub fn glsl_vec3(value: glam::Vec3) -> String {
    format!(
        "vec3({}, {}, {})",
        glsl_float(value.x),
        glsl_float(value.y),
        glsl_float(value.z)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_after_version() {
        let src = "#version 330 core\nvoid main() {}\n";
        let out = inject_defines(src, &[("MAX_LIGHTS", "6".to_string())]);
        assert_eq!(
            out,
            "#version 330 core\n#define MAX_LIGHTS 6\nvoid main() {}\n"
        );
    }

    #[test]
    fn test_inject_keeps_leading_comment() {
        let src = "// header\n#version 330 core\nvoid main() {}";
        let out = inject_defines(src, &[("A", "1".to_string()), ("B", "2".to_string())]);
        let expected = "// header\n#version 330 core\n#define A 1\n#define B 2\n";
        assert!(out.starts_with(expected));
    }

    #[test]
    fn test_glsl_literals() {
        assert_eq!(glsl_float(1.0), "1.0");
        assert_eq!(glsl_float(0.4), "0.4");
        assert_eq!(glsl_vec3(glam::Vec3::splat(0.6)), "vec3(0.6, 0.6, 0.6)");
    }
}
