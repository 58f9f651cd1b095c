//! Application framework for native OpenGL demos
//!
//! This crate provides the pieces every windowed demo needs and nothing more:
//!
//! - [`App`] trait: lifecycle hooks for application logic
//! - [`FrameContext`]: per-frame GL context, window and timing
//! - [`InputState`]: keyboard state with held and just-pressed queries
//! - [`AppRuntime`] / [`run_app`]: window creation, GL 3.3 core context
//!   setup and the event loop
//! - [`cli::CommonArgs`]: command line arguments shared by all demos

use glow::Context;
use winit::event::WindowEvent;
use winit::window::Window;

pub mod cli;
mod input;
mod runner;

pub use input::InputState;
pub use runner::{create_event_loop, run_app, AppConfig, AppRuntime, DebugMode, RuntimeError};

/// Re-export so applications can name keys without depending on winit directly
pub use winit::keyboard::KeyCode;

/// Frame context passed to lifecycle methods
///
/// Contains everything an app needs for one frame without storing it.
pub struct FrameContext<'a> {
    /// OpenGL context
    pub gl: &'a Context,
    /// Window reference
    pub window: &'a Window,
    /// Time since last frame in seconds
    pub delta_time: f32,
    /// Total elapsed time since app start in seconds
    pub elapsed: f32,
    /// Current frame number
    pub frame: u64,
    /// Framebuffer size in pixels (width, height)
    pub size: (u32, u32),
}

impl FrameContext<'_> {
    /// Aspect ratio of the framebuffer, 1.0 for a zero-height window
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        if self.size.1 > 0 {
            self.size.0 as f32 / self.size.1 as f32
        } else {
            1.0
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.size.0
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.size.1
    }
}

/// Application lifecycle
///
/// 1. `init()` - once, after the GL context is current
/// 2. `update()` + `render()` - every frame
/// 3. `shutdown()` - once, before the context is dropped
pub trait App {
    /// Create GL resources and initial state
    ///
    /// An error here aborts the run; the runtime exits the event loop and
    /// hands the error back from [`run_app`].
    fn init(&mut self, ctx: &FrameContext) -> anyhow::Result<()>;

    /// Handle a raw window event (resize, focus, ...)
    fn on_event(&mut self, _event: &WindowEvent) {}

    /// Advance application state by one frame
    fn update(&mut self, ctx: &FrameContext, input: &InputState);

    /// Issue the frame's draw calls
    ///
    /// An error ends the run: the runtime calls `shutdown()`, exits the
    /// event loop and hands the error back from [`run_app`].
    fn render(&mut self, ctx: &FrameContext) -> anyhow::Result<()>;

    /// Release GL resources
    fn shutdown(&mut self, ctx: &FrameContext);

    /// Return true to leave the event loop after the current update
    fn should_exit(&self) -> bool {
        false
    }
}
