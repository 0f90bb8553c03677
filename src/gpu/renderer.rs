//! Headless aurora frame renderer.
//!
//! Renders the effect into an offscreen texture and reads the pixels back.
//! Used by the tests and the frame-dump demo; windowed presentation lives in
//! [`super::surface`].

use super::context::GpuContext;
use super::pipeline::{AuroraOptions, AuroraPipeline};
use super::RendererError;
use wgpu::{Texture, TextureDescriptor, TextureView};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Headless aurora renderer with pixel readback.
pub struct FrameRenderer {
    ctx: GpuContext,
    pipeline: AuroraPipeline,
    render_texture: Texture,
    render_view: TextureView,
    width: u32,
    height: u32,
}

impl FrameRenderer {
    /// Create a renderer targeting a `width` x `height` offscreen texture.
    pub async fn new(width: u32, height: u32, options: AuroraOptions) -> Result<Self, RendererError> {
        let ctx = GpuContext::new().await?;
        let pipeline = AuroraPipeline::new(&ctx.device, FORMAT, options).await?;
        let (render_texture, render_view) = create_target(&ctx, width, height);

        Ok(Self {
            ctx,
            pipeline,
            render_texture,
            render_view,
            width,
            height,
        })
    }

    /// Resize the render target.
    ///
    /// The pipeline and geometry are untouched; only the target texture is
    /// recreated, mirroring the per-tick viewport reconfiguration of the
    /// windowed path.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        let (texture, view) = create_target(&self.ctx, width, height);
        self.render_texture = texture;
        self.render_view = view;
        self.width = width;
        self.height = height;
    }

    /// Render one frame at `time` seconds and return RGBA pixel data.
    pub fn render_frame(&self, time: f32) -> Vec<u8> {
        self.pipeline
            .write_frame(&self.ctx.queue, self.width, self.height, time);

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("aurora_render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("aurora_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.render_view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.pipeline.draw(&mut render_pass);
        }

        // Copy texture to buffer for readback
        let bytes_per_pixel = 4u32;
        let unpadded_row_bytes = self.width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row_bytes = unpadded_row_bytes.div_ceil(align) * align;
        let buffer_size = (padded_row_bytes * self.height) as u64;

        let readback_buffer = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("aurora_readback_buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.render_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );

        self.ctx.queue.submit(std::iter::once(encoder.finish()));

        // Read back pixels
        let buffer_slice = readback_buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            sender.send(result).unwrap();
        });
        self.ctx
            .device
            .poll(wgpu::PollType::wait_indefinitely())
            .unwrap();
        receiver.recv().unwrap().unwrap();

        let data = buffer_slice.get_mapped_range();

        // Remove row padding if present
        let mut pixels = Vec::with_capacity((self.width * self.height * 4) as usize);
        for row in 0..self.height {
            let start = (row * padded_row_bytes) as usize;
            let end = start + unpadded_row_bytes as usize;
            pixels.extend_from_slice(&data[start..end]);
        }

        pixels
    }

    /// Get the current render target size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get GPU adapter info.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.ctx.adapter_info()
    }
}

fn create_target(ctx: &GpuContext, width: u32, height: u32) -> (Texture, TextureView) {
    let texture = ctx.device.create_texture(&TextureDescriptor {
        label: Some("aurora_render_target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_renderer_creation() {
        let result = FrameRenderer::new(320, 180, AuroraOptions::default()).await;
        if let Ok(renderer) = result {
            let info = renderer.adapter_info();
            assert!(!info.name.is_empty());
        }
    }

    #[tokio::test]
    async fn test_render_frame_size_and_content() {
        let result = FrameRenderer::new(320, 180, AuroraOptions::default()).await;
        if let Ok(renderer) = result {
            let pixels = renderer.render_frame(0.0);
            assert_eq!(pixels.len(), 320 * 180 * 4);

            let has_color = pixels.chunks(4).any(|p| p[0] > 0 || p[1] > 0 || p[2] > 0);
            assert!(has_color, "rendered frame should contain colored pixels");
        }
    }
}
