//! Windowed aurora renderer presenting to a swapchain surface.

use super::context::GpuContext;
use super::pipeline::{AuroraOptions, AuroraPipeline};
use super::RendererError;
use wgpu::{Surface, SurfaceConfiguration};

/// Aurora renderer bound to one drawable surface.
///
/// Owns the context, program, and geometry for the surface's entire
/// lifetime. Dropping the renderer releases every GPU object; the host must
/// stop its animation loop first so no tick runs against a dropped surface.
pub struct SurfaceRenderer {
    ctx: GpuContext,
    surface: Surface<'static>,
    config: SurfaceConfiguration,
    pipeline: AuroraPipeline,
}

impl SurfaceRenderer {
    /// Acquire a GPU context on `target` and build the program and geometry.
    ///
    /// Any failure here means the effect cannot run on this surface; the
    /// caller should log it and leave the component disabled.
    pub async fn attach(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        options: AuroraOptions,
    ) -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::METAL | wgpu::Backends::VULKAN | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(target)
            .map_err(super::GpuError::from)?;
        let ctx = GpuContext::with_instance(instance, Some(&surface)).await?;

        let caps = surface.get_capabilities(&ctx.adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(caps.formats[0]);

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: caps.present_modes[0],
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&ctx.device, &config);

        let pipeline = AuroraPipeline::new(&ctx.device, format, options).await?;

        log::info!(
            "aurora renderer attached: {}x{} on {}",
            config.width,
            config.height,
            ctx.adapter_info().name
        );

        Ok(Self {
            ctx,
            surface,
            config,
            pipeline,
        })
    }

    /// Reconfigure the swapchain if the polled surface size changed.
    ///
    /// Called every tick; the comparison is cheap, so no resize-event
    /// subscription is needed. Returns whether a reconfigure happened.
    pub fn resize_if_needed(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        if width == self.config.width && height == self.config.height {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.ctx.device, &self.config);
        true
    }

    /// Render one tick at `time` seconds against the live surface size.
    ///
    /// Resizes first, then updates uniforms, draws the quad, and presents.
    /// A lost or outdated swapchain is reconfigured and the frame skipped;
    /// the next tick draws normally.
    pub fn render(&mut self, size: (u32, u32), time: f32) -> Result<(), RendererError> {
        self.resize_if_needed(size.0, size.1);

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.surface.configure(&self.ctx.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.pipeline
            .write_frame(&self.ctx.queue, self.config.width, self.config.height, time);

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("aurora_surface_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("aurora_surface_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }

    /// Get the configured surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Get GPU adapter info.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.ctx.adapter_info()
    }
}
