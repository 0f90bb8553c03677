//! Shader program building: per-stage compilation and pipeline linking.
//!
//! Each stage is compiled and validated independently through naga so a
//! broken shader reports which stage failed, with the full compiler log,
//! before any GPU object is created. Linking (render pipeline creation) is
//! wrapped in a wgpu validation error scope so interface mismatches surface
//! as values instead of device panics.

use std::fmt;

use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline, TextureFormat};

use super::pipeline::QuadVertex;

/// Shader stage identifier, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn entry_point(self) -> &'static str {
        match self {
            Self::Vertex => "vs_main",
            Self::Fragment => "fs_main",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Errors from building a shader program.
///
/// A failed build returns one of these and nothing else: no partially usable
/// program value can exist.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program failed to link:\n{log}")]
    Link { log: String },
    #[error("{stage} shader has no `{name}` entry point")]
    MissingEntryPoint { stage: ShaderStage, name: String },
    #[error("fragment shader does not declare the uniform block at group {group}, binding {binding}")]
    MissingBinding { group: u32, binding: u32 },
}

/// Parse and validate one WGSL stage without touching the device.
///
/// Returns the naga IR module on success so callers can inspect the shader
/// interface (entry points, resource bindings).
pub fn validate_stage(stage: ShaderStage, source: &str) -> Result<naga::Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage,
        log: e.emit_to_string(source),
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    validator
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage,
            log: e.emit_to_string(source),
        })?;

    let entry = stage.entry_point();
    if !module.entry_points.iter().any(|ep| ep.name == entry) {
        return Err(ShaderError::MissingEntryPoint {
            stage,
            name: entry.to_string(),
        });
    }

    Ok(module)
}

/// A linked, usable shader program for full-viewport quad rendering.
#[derive(Debug)]
pub struct ShaderProgram {
    pub pipeline: RenderPipeline,
    pub bind_group_layout: BindGroupLayout,
}

impl ShaderProgram {
    /// Compile both stages, then link them into a render pipeline targeting
    /// `format`. One-shot: invoked once per mount, no caching.
    pub async fn build(
        device: &Device,
        format: TextureFormat,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        validate_stage(ShaderStage::Vertex, vertex_source)?;
        let fragment_module = validate_stage(ShaderStage::Fragment, fragment_source)?;

        // The per-frame uniform block must be declared where the bind group
        // expects it, otherwise drawing would dereference a missing binding.
        let uniform_binding = naga::ResourceBinding {
            group: 0,
            binding: 0,
        };
        let has_uniforms = fragment_module
            .global_variables
            .iter()
            .any(|(_, var)| var.binding.as_ref() == Some(&uniform_binding));
        if !has_uniforms {
            return Err(ShaderError::MissingBinding {
                group: uniform_binding.group,
                binding: uniform_binding.binding,
            });
        }

        let vertex_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("aurora_vertex_shader"),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("aurora_fragment_shader"),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("aurora_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("aurora_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let error_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("aurora_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_shader,
                entry_point: Some(ShaderStage::Vertex.entry_point()),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x2,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_shader,
                entry_point: Some(ShaderStage::Fragment.entry_point()),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    // Output is always fully opaque; nothing to blend.
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        if let Some(error) = error_scope.pop().await {
            return Err(ShaderError::Link {
                log: error.to_string(),
            });
        }

        Ok(Self {
            pipeline,
            bind_group_layout,
        })
    }

    /// Create the bind group exposing the uniform buffer to the program.
    pub fn create_bind_group(&self, device: &Device, uniform_buffer: &Buffer) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("aurora_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::pipeline::{FRAGMENT_SHADER, VERTEX_SHADER};

    #[test]
    fn test_builtin_shaders_validate() {
        validate_stage(ShaderStage::Vertex, VERTEX_SHADER).unwrap();
        validate_stage(ShaderStage::Fragment, FRAGMENT_SHADER).unwrap();
    }

    #[test]
    fn test_fragment_syntax_error_names_fragment_stage() {
        let broken = "@fragment fn fs_main() -> @location(0) vec4<f32> { retrn vec4<f32>(0.0); }";
        let err = validate_stage(ShaderStage::Fragment, broken).unwrap_err();
        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_entry_point() {
        let source = "@fragment fn not_main() -> @location(0) vec4<f32> { return vec4<f32>(0.0, 0.0, 0.0, 1.0); }";
        let err = validate_stage(ShaderStage::Fragment, source).unwrap_err();
        match err {
            ShaderError::MissingEntryPoint { stage, name } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert_eq!(name, "fs_main");
            }
            other => panic!("expected missing entry point, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_build_rejects_fragment_without_uniform_block() {
        let Ok(ctx) = crate::gpu::GpuContext::new().await else {
            eprintln!("Skipping test - GPU not available");
            return;
        };
        let fragment = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(0.0, 0.0, 0.0, 1.0); }";
        let err = ShaderProgram::build(
            &ctx.device,
            wgpu::TextureFormat::Rgba8Unorm,
            VERTEX_SHADER,
            fragment,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ShaderError::MissingBinding { group: 0, binding: 0 }));
    }

    #[tokio::test]
    async fn test_link_failure_is_captured_as_value() {
        let Ok(ctx) = crate::gpu::GpuContext::new().await else {
            eprintln!("Skipping test - GPU not available");
            return;
        };
        // Valid as a stage, but references a bind group the pipeline layout
        // does not provide, so the failure only appears at link time.
        let fragment = "
            struct AuroraUniforms { resolution: vec2<f32>, time: f32, }
            @group(0) @binding(0) var<uniform> u: AuroraUniforms;
            @group(1) @binding(0) var<uniform> extra: vec4<f32>;
            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return vec4<f32>(u.time, extra.x, 0.0, 1.0);
            }
        ";
        let err = ShaderProgram::build(
            &ctx.device,
            wgpu::TextureFormat::Rgba8Unorm,
            VERTEX_SHADER,
            fragment,
        )
        .await
        .unwrap_err();
        match err {
            ShaderError::Link { log } => assert!(!log.is_empty()),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_build_builtin_program() {
        let Ok(ctx) = crate::gpu::GpuContext::new().await else {
            eprintln!("Skipping test - GPU not available");
            return;
        };
        ShaderProgram::build(
            &ctx.device,
            wgpu::TextureFormat::Rgba8Unorm,
            VERTEX_SHADER,
            FRAGMENT_SHADER,
        )
        .await
        .unwrap();
    }
}
