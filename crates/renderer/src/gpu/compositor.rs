use anyhow::anyhow;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::warn;

use crate::compositor::Compositor;
use crate::error::EngineError;
use crate::shader::ShaderUniforms;
use crate::textures::DecodedImage;
use crate::viewport::Viewport;

use super::context::GpuContext;
use super::pipeline::TransitionPipeline;
use super::textures::SlideTextures;
use super::uniforms::TransitionParams;

struct GpuResources {
    context: GpuContext,
    pipeline: TransitionPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    slides: Option<SlideTextures>,
}

/// wgpu-backed compositor presenting straight to a window surface.
pub struct GpuCompositor {
    resources: Option<GpuResources>,
}

impl GpuCompositor {
    /// Creates the device, swapchain, pipeline and uniform buffer.
    ///
    /// `target` must outlive the compositor.
    pub fn new<T>(target: &T, viewport: Viewport) -> anyhow::Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, viewport)?;
        let pipeline = TransitionPipeline::new(&context.device, context.surface_format);
        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("transition uniforms"),
            size: std::mem::size_of::<TransitionParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("transition uniform bind group"),
                layout: &pipeline.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        Ok(Self {
            resources: Some(GpuResources {
                context,
                pipeline,
                uniform_buffer,
                uniform_bind_group,
                slides: None,
            }),
        })
    }

    fn live(&mut self) -> Result<&mut GpuResources, EngineError> {
        let resources = self
            .resources
            .as_mut()
            .ok_or_else(|| EngineError::ContextLost("GPU compositor already released".into()))?;
        if resources.context.is_device_lost() {
            return Err(EngineError::ContextLost("GPU device lost".into()));
        }
        Ok(resources)
    }
}

impl GpuResources {
    /// Acquires the next swapchain image. `None` means skip this frame.
    fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>, EngineError> {
        match self.context.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost or outdated; reconfiguring");
                self.context.reconfigure();
                Ok(None)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(EngineError::ContextLost("surface out of memory".into()))
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout; retrying next frame");
                Ok(None)
            }
            Err(other) => {
                warn!(error = ?other, "surface error; retrying next frame");
                Ok(None)
            }
        }
    }

    fn encode_pass(
        &mut self,
        frame: &wgpu::SurfaceTexture,
        load: wgpu::LoadOp<wgpu::Color>,
        pair: Option<(usize, usize)>,
    ) -> Result<(), EngineError> {
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("transition encoder"),
                });
        {
            let bind_group = match pair {
                Some((from, to)) => {
                    let slides = self
                        .slides
                        .as_mut()
                        .ok_or_else(|| EngineError::Render(anyhow!("no slides uploaded")))?;
                    let group = slides
                        .pair(&self.context.device, &self.pipeline.slide_layout, from, to)
                        .ok_or_else(|| {
                            EngineError::Render(anyhow!("slide pair {from}->{to} out of range"))
                        })?;
                    Some(group)
                }
                None => None,
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("transition pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            if let Some(group) = bind_group {
                render_pass.set_pipeline(&self.pipeline.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_bind_group(1, group, &[]);
                render_pass.draw(0..3, 0..1);
            }
        }
        self.context.queue.submit(Some(encoder.finish()));
        Ok(())
    }
}

impl Compositor for GpuCompositor {
    fn resize(&mut self, viewport: Viewport) -> Result<(), EngineError> {
        self.live()?.context.resize(viewport);
        Ok(())
    }

    fn upload_slides(&mut self, images: &[DecodedImage]) -> Result<(), EngineError> {
        let resources = self.live()?;
        if let Some(mut previous) = resources.slides.take() {
            previous.destroy();
        }
        let context = &resources.context;
        let slides = SlideTextures::upload(
            &context.device,
            &context.queue,
            images,
            context.max_dimension(),
        );
        tracing::debug!(count = slides.len(), "slide textures resident");
        resources.slides = Some(slides);
        Ok(())
    }

    fn draw(&mut self, uniforms: &ShaderUniforms) -> Result<(), EngineError> {
        let resources = self.live()?;
        let Some(frame) = resources.acquire()? else {
            return Ok(());
        };
        resources.context.queue.write_buffer(
            &resources.uniform_buffer,
            0,
            bytemuck::bytes_of(&TransitionParams::from(uniforms)),
        );
        resources.encode_pass(
            &frame,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            Some((uniforms.from, uniforms.to)),
        )?;
        frame.present();
        Ok(())
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<(), EngineError> {
        let resources = self.live()?;
        let Some(frame) = resources.acquire()? else {
            return Ok(());
        };
        let [r, g, b, a] = color.map(f64::from);
        resources.encode_pass(&frame, wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }), None)?;
        frame.present();
        Ok(())
    }

    fn release(&mut self) {
        let Some(mut resources) = self.resources.take() else {
            return;
        };
        if let Some(mut slides) = resources.slides.take() {
            slides.destroy();
        }
        resources.uniform_buffer.destroy();
        tracing::debug!("GPU resources released");
    }
}

impl Drop for GpuCompositor {
    fn drop(&mut self) {
        self.release();
    }
}
