//! Application runner for OpenGL applications
//!
//! Provides the window creation, OpenGL context setup, and event loop
//! management that is common across all demos.

use glow::{Context, HasContext};
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

#[cfg(target_os = "linux")]
use winit::platform::x11::EventLoopBuilderExtX11;

use crate::{App, FrameContext, InputState};

/// Errors that end a run before or during the event loop
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(String),

    #[error("OpenGL context error: {0}")]
    Context(#[from] glutin::error::Error),

    #[error("application failed to initialize: {0:#}")]
    Init(anyhow::Error),

    #[error("frame {frame} failed to render: {error:#}")]
    Render { frame: u64, error: anyhow::Error },
}

/// Debug mode configuration
#[derive(Debug, Clone)]
pub struct DebugMode {
    /// Number of frames to run before exiting
    pub frames: u64,
    /// Path to save the final frame screenshot
    pub output_path: PathBuf,
}

impl DebugMode {
    pub fn new(frames: u64) -> Self {
        Self {
            frames,
            output_path: PathBuf::from("output/frame_last.png"),
        }
    }
}

/// Configuration for the application window
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// OpenGL major version
    pub gl_major: u8,
    /// OpenGL minor version
    pub gl_minor: u8,
    /// Optional debug mode configuration
    pub debug_mode: Option<DebugMode>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Application".to_string(),
            width: 800,
            height: 600,
            gl_major: 3,
            gl_minor: 3,
            debug_mode: None,
        }
    }
}

impl AppConfig {
    /// Create a new configuration with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the window size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the OpenGL version
    pub fn with_gl_version(mut self, major: u8, minor: u8) -> Self {
        self.gl_major = major;
        self.gl_minor = minor;
        self
    }

    /// Enable debug mode with the specified number of frames
    pub fn with_debug_mode(mut self, frames: u64) -> Self {
        self.debug_mode = Some(DebugMode::new(frames));
        self
    }
}

/// Window, context and surface, created together in `resumed`
struct GlState {
    window: Window,
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    gl: Context,
}

/// Runtime state for an application
pub struct AppRuntime<A: App> {
    config: AppConfig,
    app: A,
    gl_state: Option<GlState>,

    // Timing
    start_time: Instant,
    last_update: Instant,
    frame_count: u64,

    input: InputState,
    initialized: bool,
    error: Option<RuntimeError>,
}

impl<A: App> AppRuntime<A> {
    /// Create a new runtime with the given app and configuration
    pub fn new(app: A, config: AppConfig) -> Self {
        Self {
            config,
            app,
            gl_state: None,
            start_time: Instant::now(),
            last_update: Instant::now(),
            frame_count: 0,
            input: InputState::default(),
            initialized: false,
            error: None,
        }
    }

    /// Get a mutable reference to the app
    pub fn app_mut(&mut self) -> &mut A {
        &mut self.app
    }

    /// Take the error that ended the run, if any
    pub fn take_error(&mut self) -> Option<RuntimeError> {
        self.error.take()
    }

    fn create_gl_state(&self, event_loop: &ActiveEventLoop) -> Result<GlState, RuntimeError> {
        let window_attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.width,
                self.config.height,
            ));

        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_transparency(false);

        let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attributes));

        let (window, gl_config) = display_builder
            .build(event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .expect("glutin offers at least one config")
            })
            .map_err(|e| RuntimeError::Window(e.to_string()))?;

        let no_window = || RuntimeError::Window("display builder returned no window".into());
        let window = window.ok_or_else(no_window)?;
        let raw_handle = window
            .window_handle()
            .map_err(|e| RuntimeError::Window(e.to_string()))?
            .as_raw();
        let gl_display = gl_config.display();

        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(
                self.config.gl_major,
                self.config.gl_minor,
            ))))
            .build(Some(raw_handle));

        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes)? };

        let size = window.inner_size();
        let (width, height) = non_zero_size(size.width, size.height)
            .ok_or_else(|| RuntimeError::Window("window has zero size".into()))?;
        let builder = SurfaceAttributesBuilder::<WindowSurface>::new();
        let attrs = builder.build(raw_handle, width, height);

        let surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs)? };
        let context = not_current.make_current(&surface)?;

        let gl = unsafe { Context::from_loader_function_cstr(|s| gl_display.get_proc_address(s)) };

        Ok(GlState {
            window,
            context,
            surface,
            gl,
        })
    }

    /// Capture the current framebuffer and save to file
    fn capture_frame(
        gl: &Context,
        size: (u32, u32),
        output_path: &std::path::Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        use image::{ImageBuffer, Rgba};

        let width = size.0 as usize;
        let height = size.1 as usize;
        let mut pixels = vec![0u8; width * height * 4];

        unsafe {
            gl.read_pixels(
                0,
                0,
                size.0 as i32,
                size.1 as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(Some(&mut pixels)),
            );
        }

        // Flip image vertically (OpenGL has origin at bottom-left)
        let mut flipped = vec![0u8; width * height * 4];
        for y in 0..height {
            let src_offset = y * width * 4;
            let dst_offset = (height - 1 - y) * width * 4;
            flipped[dst_offset..dst_offset + width * 4]
                .copy_from_slice(&pixels[src_offset..src_offset + width * 4]);
        }

        let img = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(size.0, size.1, flipped);
        let img = img.ok_or("Failed to create image buffer")?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        img.save(output_path)?;
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RuntimeError) {
        tracing::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

fn non_zero_size(width: u32, height: u32) -> Option<(NonZeroU32, NonZeroU32)> {
    Some((NonZeroU32::new(width)?, NonZeroU32::new(height)?))
}

impl<A: App> ApplicationHandler for AppRuntime<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gl_state.is_some() {
            return;
        }

        tracing::info!("Initializing window and GL context");
        let state = match self.create_gl_state(event_loop) {
            Ok(state) => state,
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        };
        tracing::info!(
            "OpenGL {}.{} core context created",
            self.config.gl_major,
            self.config.gl_minor
        );

        if !self.initialized {
            let size = state.window.inner_size();
            let ctx = FrameContext {
                gl: &state.gl,
                window: &state.window,
                delta_time: 0.0,
                elapsed: 0.0,
                frame: 0,
                size: (size.width, size.height),
            };
            if let Err(e) = self.app.init(&ctx) {
                self.gl_state = Some(state);
                self.fail(event_loop, RuntimeError::Init(e));
                return;
            }
            self.initialized = true;
            tracing::info!("App initialized");
        }

        self.gl_state = Some(state);
        self.start_time = Instant::now();
        self.last_update = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::KeyboardInput { event, .. } = &event {
            if let PhysicalKey::Code(keycode) = event.physical_key {
                match event.state {
                    ElementState::Pressed => self.input.press(keycode),
                    ElementState::Released => self.input.release(keycode),
                }
            }
        }

        self.app.on_event(&event);

        let Some(state) = self.gl_state.as_ref() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                if self.initialized {
                    let size = state.window.inner_size();
                    let ctx = FrameContext {
                        gl: &state.gl,
                        window: &state.window,
                        delta_time: 0.0,
                        elapsed: self.start_time.elapsed().as_secs_f32(),
                        frame: self.frame_count,
                        size: (size.width, size.height),
                    };
                    self.app.shutdown(&ctx);
                    self.initialized = false;
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                // Minimised windows report zero size; keep the old surface
                if let Some((width, height)) = non_zero_size(size.width, size.height) {
                    state.surface.resize(&state.context, width, height);
                }
                state.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if !self.initialized {
                    return;
                }

                let now = Instant::now();
                let delta_time = (now - self.last_update).as_secs_f32();
                self.last_update = now;
                let elapsed = self.start_time.elapsed().as_secs_f32();
                let size = state.window.inner_size();

                let ctx = FrameContext {
                    gl: &state.gl,
                    window: &state.window,
                    delta_time,
                    elapsed,
                    frame: self.frame_count,
                    size: (size.width, size.height),
                };

                self.app.update(&ctx, &self.input);
                self.input.end_frame();

                if self.app.should_exit() {
                    tracing::info!("App requested exit");
                    self.app.shutdown(&ctx);
                    self.initialized = false;
                    event_loop.exit();
                    return;
                }

                if let Err(error) = self.app.render(&ctx) {
                    self.app.shutdown(&ctx);
                    self.initialized = false;
                    let frame = self.frame_count;
                    self.fail(event_loop, RuntimeError::Render { frame, error });
                    return;
                }

                if let Err(e) = state.surface.swap_buffers(&state.context) {
                    tracing::warn!("swap_buffers failed: {}", e);
                }

                self.frame_count += 1;

                if let Some(debug_mode) = &self.config.debug_mode {
                    if self.frame_count >= debug_mode.frames {
                        tracing::info!(
                            "Frame {}/{} - capturing screenshot and exiting",
                            self.frame_count,
                            debug_mode.frames
                        );
                        match Self::capture_frame(&state.gl, ctx.size, &debug_mode.output_path) {
                            Ok(()) => tracing::info!(
                                "Screenshot saved to: {}",
                                debug_mode.output_path.display()
                            ),
                            Err(e) => tracing::error!("Failed to capture frame: {}", e),
                        }
                        self.app.shutdown(&ctx);
                        self.initialized = false;
                        event_loop.exit();
                        return;
                    }
                    tracing::debug!("Frame {}/{}", self.frame_count, debug_mode.frames);
                }

                state.window.request_redraw();
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.gl_state.as_ref() {
            state.window.request_redraw();
        }
    }
}

/// Run an application with the given configuration
///
/// This creates the event loop, window, GL context, and runs the app until
/// it exits. Initialization failures are returned rather than panicking.
pub fn run_app<A: App>(app: A, config: AppConfig) -> Result<(), RuntimeError> {
    let event_loop = create_event_loop()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runtime = AppRuntime::new(app, config);
    event_loop.run_app(&mut runtime)?;

    match runtime.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Create an event loop (forces X11 on Linux)
pub fn create_event_loop() -> Result<EventLoop<()>, RuntimeError> {
    #[cfg(target_os = "linux")]
    {
        let mut builder = EventLoop::builder();
        builder.with_x11();
        Ok(builder.build()?)
    }

    #[cfg(not(target_os = "linux"))]
    {
        Ok(EventLoop::new()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_keeps_cause_chain() {
        let cause = anyhow::anyhow!("framebuffer incomplete (status 0x8cd6)");
        let error = cause.context("deferred render");
        let message = RuntimeError::Render { frame: 12, error }.to_string();
        assert!(message.starts_with("frame 12 failed to render"));
        assert!(message.contains("deferred render"));
        assert!(message.contains("status 0x8cd6"));
    }

    #[test]
    fn test_runtime_error_converts_to_anyhow() {
        let error = anyhow::anyhow!("boom");
        let result: anyhow::Result<()> = Err(RuntimeError::Render { frame: 0, error }.into());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("boom"));
    }

    #[test]
    fn test_default_config_requests_gl_33() {
        let config = AppConfig::new("Demo");
        assert_eq!((config.gl_major, config.gl_minor), (3, 3));
        assert_eq!((config.width, config.height), (800, 600));
        assert!(config.debug_mode.is_none());
    }
}
