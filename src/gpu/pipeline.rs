//! Aurora rendering pipeline: geometry, uniforms, and mount-time options.

use wgpu::util::DeviceExt;
use wgpu::{BindGroup, Buffer, Device, Queue, TextureFormat};

use super::program::{ShaderError, ShaderProgram};

/// Built-in vertex stage source (full-viewport quad).
pub const VERTEX_SHADER: &str = include_str!("shaders/fullscreen.vert.wgsl");
/// Built-in fragment stage source (aurora effect).
pub const FRAGMENT_SHADER: &str = include_str!("shaders/aurora.frag.wgsl");

/// Quad vertex in normalized device coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

/// Full-viewport quad as a 4-vertex triangle strip covering [-1,1]x[-1,1].
pub const FULLSCREEN_QUAD: [QuadVertex; 4] = [
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, -1.0] },
    QuadVertex { position: [-1.0, 1.0] },
    QuadVertex { position: [1.0, 1.0] },
];

/// Uniform data passed to the fragment shader.
///
/// `resolution` and `time` are the only per-frame values; the rest is fixed
/// at mount time from [`AuroraOptions`]. Layout mirrors the WGSL
/// `AuroraUniforms` block.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AuroraUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub drift_speed: f32,
    pub deep: [f32; 4],
    pub violet: [f32; 4],
    pub magenta: [f32; 4],
    pub mask_exponent: f32,
    pub intensity: f32,
    pub dither: f32,
    pub _padding: f32,
}

/// Three-color palette blended by the wave signal.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Palette {
    pub deep: [f32; 3],
    pub violet: [f32; 3],
    pub magenta: [f32; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            deep: [0.0, 0.1, 0.5],
            violet: [0.4, 0.0, 0.8],
            magenta: [0.9, 0.1, 0.6],
        }
    }
}

/// Mount-time configuration for the aurora effect.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AuroraOptions {
    pub palette: Palette,
    /// Phase speed multiplier applied to elapsed seconds.
    pub drift_speed: f32,
    /// Exponent of the vertical luminance falloff.
    pub mask_exponent: f32,
    /// Overall brightness multiplier.
    pub intensity: f32,
    /// Amplitude of the hashed-noise dither (0 disables it).
    pub dither: f32,
}

impl Default for AuroraOptions {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            drift_speed: 0.3,
            mask_exponent: 1.5,
            intensity: 1.2,
            dither: 1.0 / 255.0,
        }
    }
}

impl AuroraOptions {
    /// Compute the uniform block for one frame.
    ///
    /// Pure: the same (width, height, time) always produces the same values.
    pub fn frame_uniforms(&self, width: u32, height: u32, time: f32) -> AuroraUniforms {
        let p = &self.palette;
        AuroraUniforms {
            resolution: [width as f32, height as f32],
            time,
            drift_speed: self.drift_speed,
            deep: [p.deep[0], p.deep[1], p.deep[2], 1.0],
            violet: [p.violet[0], p.violet[1], p.violet[2], 1.0],
            magenta: [p.magenta[0], p.magenta[1], p.magenta[2], 1.0],
            mask_exponent: self.mask_exponent,
            intensity: self.intensity,
            dither: self.dither,
            _padding: 0.0,
        }
    }
}

/// Parse hex color to RGB floats (accepts 6-char RGB or 8-char RGBA, alpha is ignored).
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f32 / 255.0;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f32 / 255.0;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f32 / 255.0;
    Some([r, g, b])
}

/// Linked program plus the GPU-resident buffers it draws with.
pub struct AuroraPipeline {
    pub program: ShaderProgram,
    pub uniform_buffer: Buffer,
    pub vertex_buffer: Buffer,
    pub bind_group: BindGroup,
    options: AuroraOptions,
}

impl AuroraPipeline {
    /// Build the program and allocate geometry and uniform storage.
    ///
    /// The vertex buffer is immutable after this call.
    pub async fn new(
        device: &Device,
        format: TextureFormat,
        options: AuroraOptions,
    ) -> Result<Self, ShaderError> {
        let program = ShaderProgram::build(device, format, VERTEX_SHADER, FRAGMENT_SHADER).await?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("aurora_uniforms"),
            size: std::mem::size_of::<AuroraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("aurora_quad"),
            contents: bytemuck::cast_slice(&FULLSCREEN_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let bind_group = program.create_bind_group(device, &uniform_buffer);

        Ok(Self {
            program,
            uniform_buffer,
            vertex_buffer,
            bind_group,
            options,
        })
    }

    /// Upload this frame's resolution and time.
    pub fn write_frame(&self, queue: &Queue, width: u32, height: u32, time: f32) {
        let uniforms = self.options.frame_uniforms(width, height, time);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Record the full-viewport draw into an open render pass.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.program.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..FULLSCREEN_QUAD.len() as u32, 0..1);
    }

    /// Get the mount-time options.
    pub fn options(&self) -> &AuroraOptions {
        &self.options
    }
}
