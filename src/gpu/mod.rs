//! GPU rendering using wgpu.
//!
//! Provides the shader program builder, the aurora pipeline, and two
//! renderers over it: a windowed one presenting to a surface and a headless
//! one with pixel readback.

pub mod context;
pub mod pipeline;
pub mod program;
pub mod renderer;
pub mod surface;

pub use context::{GpuContext, GpuError};
pub use pipeline::{parse_hex_color, AuroraOptions, AuroraPipeline, AuroraUniforms, Palette};
pub use program::{ShaderError, ShaderProgram, ShaderStage};
pub use renderer::FrameRenderer;
pub use surface::SurfaceRenderer;

/// Errors that disable the renderer component.
///
/// The host logs these and leaves the surface blank; they never propagate as
/// a panic.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("Shader error: {0}")]
    Shader(#[from] ShaderError),
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
