//! Deferred lighting renderer
//!
//! Renders cubes and spheres lit by point, directional and spot lights in
//! two passes: a geometry pass writes position, normal and albedo into a
//! g-buffer, and a fullscreen lighting pass shades it with ambient,
//! diffuse, Blinn-Phong/Phong specular and optional exponential fog.
//!
//! # Architecture
//!
//! - **mesh**: procedural sphere and unit cube
//! - **lighting**: light types, the bounded light set and model constants
//! - **shading**: CPU definition of the shading model
//! - **scene** / **camera** / **weather**: what is drawn and how it animates
//! - **renderers**: GL deferred pipeline and the CPU reference renderer
//! - **config**: TOML demo configuration

// Core modules
pub mod camera;
pub mod config;
pub mod error;
pub mod lighting;
pub mod mesh;
pub mod scene;
pub mod shading;
pub mod weather;

// GL plumbing
pub mod gbuffer;
pub mod shader_utils;

// Renderer implementations
pub mod renderers;

pub use camera::{CAMERA_TABLE, Camera};
pub use config::{DemoConfig, load_config};
pub use error::{RenderError, Result};
pub use lighting::{LIGHT_TABLE, Light, LightKind, LightSet, MAX_LIGHTS};
pub use mesh::MeshData;
pub use renderers::{CpuDeferred, DeferredRenderer, FrameInput};
pub use scene::{CubeLayout, Scene, SceneObject, Shape};
pub use shading::{LightingParams, ShadingSettings};
pub use weather::{FogStage, Weather};
