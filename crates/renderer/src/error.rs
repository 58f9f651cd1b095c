//! Error types for the deferred renderer

use std::path::PathBuf;
use thiserror::Error;

/// Result type for renderer operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while building or drawing the scene
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{stage} shader compilation failed:\n{log}")]
    ShaderCompile { stage: &'static str, log: String },

    #[error("shader program link failed:\n{0}")]
    ProgramLink(String),

    #[error("failed to create {what}: {reason}")]
    GlObject { what: &'static str, reason: String },

    #[error("framebuffer incomplete (status 0x{0:x})")]
    IncompleteFramebuffer(u32),

    #[error("invalid sphere tessellation: {sectors} sectors, {stacks} stacks")]
    InvalidTessellation { sectors: u32, stacks: u32 },

    #[error("too many lights: {count} requested, at most {max} supported")]
    TooManyLights { count: usize, max: usize },

    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    ConfigValue { field: &'static str, reason: String },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl RenderError {
    /// Wrap a GL object creation failure
    pub(crate) fn gl_object(what: &'static str, reason: impl ToString) -> Self {
        Self::GlObject {
            what,
            reason: reason.to_string(),
        }
    }
}
