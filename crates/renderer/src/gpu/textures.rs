use std::collections::HashMap;

use wgpu::util::{DeviceExt, TextureDataOrder};

use crate::textures::{downscale_to_fit, DecodedImage};

pub(crate) struct SlideTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Every slide of the deck resident on the GPU, plus bind groups for the
/// slide pairs that have been drawn so far.
pub(crate) struct SlideTextures {
    slides: Vec<SlideTexture>,
    sampler: wgpu::Sampler,
    pairs: HashMap<(usize, usize), wgpu::BindGroup>,
}

impl SlideTextures {
    /// Uploads every slide, shrinking any image with a side longer than
    /// `max_dimension` so the texture stays within device limits.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        images: &[DecodedImage],
        max_dimension: u32,
    ) -> Self {
        let slides = images
            .iter()
            .enumerate()
            .map(|(index, image)| {
                let scaled = downscale_to_fit(&image.pixels, max_dimension);
                if let Some(scaled) = scaled.as_ref() {
                    tracing::warn!(
                        index,
                        width = image.width(),
                        height = image.height(),
                        max_dimension,
                        "slide exceeds GPU texture limit; uploading at {}x{}",
                        scaled.width(),
                        scaled.height()
                    );
                }
                let pixels = scaled.as_ref().unwrap_or(&image.pixels);
                let texture = device.create_texture_with_data(
                    queue,
                    &wgpu::TextureDescriptor {
                        label: Some(&format!("slide texture #{index}")),
                        size: wgpu::Extent3d {
                            width: pixels.width(),
                            height: pixels.height(),
                            depth_or_array_layers: 1,
                        },
                        mip_level_count: 1,
                        sample_count: 1,
                        dimension: wgpu::TextureDimension::D2,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                        view_formats: &[],
                    },
                    TextureDataOrder::LayerMajor,
                    pixels.as_raw(),
                );
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                tracing::debug!(
                    index,
                    width = pixels.width(),
                    height = pixels.height(),
                    "uploaded slide texture"
                );
                SlideTexture { texture, view }
            })
            .collect();

        // Single level, so the mipmap filter never comes into play.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("slide sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            slides,
            sampler,
            pairs: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Bind group sampling `from` and `to`, created on first use.
    pub fn pair(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        from: usize,
        to: usize,
    ) -> Option<&wgpu::BindGroup> {
        if from >= self.slides.len() || to >= self.slides.len() {
            return None;
        }
        let slides = &self.slides;
        let sampler = &self.sampler;
        let group = self.pairs.entry((from, to)).or_insert_with(|| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("slide pair {from}->{to}")),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&slides[from].view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&slides[to].view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        });
        Some(group)
    }

    pub fn destroy(&mut self) {
        self.pairs.clear();
        for slide in self.slides.drain(..) {
            slide.texture.destroy();
        }
    }
}
