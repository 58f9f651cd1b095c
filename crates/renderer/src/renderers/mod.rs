//! Renderer implementations
//!
//! - [`DeferredRenderer`]: GL geometry + lighting passes
//! - [`CpuDeferred`]: software version of both passes, no GL context needed

pub mod cpu_deferred;
pub mod deferred;
pub mod geometry_pass;
pub mod lighting_pass;

pub use cpu_deferred::{CpuDeferred, GBufferImage, GSample, shade_gbuffer};
pub use deferred::{DeferredRenderer, FrameInput};
pub use geometry_pass::GeometryPass;
pub use lighting_pass::LightingPass;
