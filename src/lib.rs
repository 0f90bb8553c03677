//! Aurora Backdrop
//!
//! GPU-accelerated animated aurora background renderer.
//!
//! # Features
//!
//! - Shader program building with per-stage compile diagnostics via naga
//! - Full-viewport aurora effect driven by (resolution, time) uniforms
//! - Windowed rendering over a wgpu surface, resized by per-tick polling
//! - Headless rendering with pixel readback for tests and frame dumps
//! - Animation-loop lifecycle with cooperative cancellation
//! - Windowed host via winit (when the `winit` feature is enabled)

pub mod animation;
pub mod gpu;

#[cfg(feature = "winit")]
pub mod app;

// Re-export commonly used types
pub use animation::{AnimationLoop, Phase, TickHandle, TickScheduler};
pub use gpu::{
    parse_hex_color, AuroraOptions, AuroraPipeline, AuroraUniforms, FrameRenderer, GpuContext,
    GpuError, Palette, RendererError, ShaderError, ShaderProgram, ShaderStage, SurfaceRenderer,
};

#[cfg(feature = "winit")]
pub use app::AuroraApp;
