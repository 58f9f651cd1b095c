//! Shader sources receive host constants
//!
//! These checks run without a GL context; they verify the text handed to
//! the driver, not compilation.

use renderer::MAX_LIGHTS;
use renderer::renderers::{geometry_pass, lighting_pass};

#[test]
fn test_lighting_shader_gets_max_lights() {
    let source = lighting_pass::fragment_source();
    let mut lines = source.lines();
    assert_eq!(lines.next(), Some("#version 330 core"));
    assert_eq!(
        lines.next(),
        Some(format!("#define MAX_LIGHTS {}", MAX_LIGHTS).as_str())
    );
    assert!(source.contains("uniform Light u_lights[MAX_LIGHTS];"));
    assert!(source.contains("uniform int u_lightCount;"));
}

#[test]
fn test_lighting_shader_defines_every_constant() {
    let source = lighting_pass::fragment_source();
    for (name, value) in lighting_pass::shader_defines() {
        let line = format!("#define {} {}", name, value);
        assert!(source.contains(&line), "missing `{}`", line);
    }
    assert!(source.contains("#define LIGHT_DIRECTIONAL 1"));
    assert!(source.contains("#define LIGHT_SPOT 2"));
    assert!(source.contains("#define FOG_COLOR vec3(0.6, 0.6, 0.6)"));
}

#[test]
fn test_geometry_shader_sources() {
    let fragment = geometry_pass::fragment_source();
    let header = "#version 330 core\n#define FOG_COLOR vec3(0.6, 0.6, 0.6)\n";
    assert!(fragment.starts_with(header));
    for output in ["g_position", "g_normal", "g_albedo"] {
        assert!(fragment.contains(output), "missing output {}", output);
    }

    let vertex = geometry_pass::vertex_source();
    assert!(vertex.starts_with("#version 330 core"));
    assert!(vertex.contains("u_normalMatrix"));
    assert!(lighting_pass::vertex_source().contains("gl_VertexID"));
}

#[test]
fn test_lighting_shader_guards_normalize() {
    let source = lighting_pass::fragment_source();
    assert!(source.contains("vec3 safeNormalize(vec3 v)"));
    let unguarded = source
        .replace("safeNormalize(", "")
        .matches("normalize(")
        .count();
    assert_eq!(unguarded, 0, "bare normalize() in lighting shader");
}
