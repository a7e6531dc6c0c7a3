use anyhow::anyhow;
use image::{Rgba, RgbaImage};

use crate::compositor::Compositor;
use crate::error::EngineError;
use crate::shader::{shade, ShaderUniforms};
use crate::textures::DecodedImage;
use crate::viewport::Viewport;

/// CPU rasteriser running the same blend as the GPU shader.
///
/// Used for headless snapshots and for exercising sessions in tests.
#[derive(Debug, Default)]
pub struct SoftwareCompositor {
    frame: RgbaImage,
    slides: Vec<RgbaImage>,
    frames_drawn: u64,
    last_uniforms: Option<ShaderUniforms>,
    released: bool,
}

impl SoftwareCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn into_frame(self) -> RgbaImage {
        self.frame
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn last_uniforms(&self) -> Option<&ShaderUniforms> {
        self.last_uniforms.as_ref()
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn ensure_live(&self) -> Result<(), EngineError> {
        if self.released {
            Err(EngineError::ContextLost(
                "software compositor already released".into(),
            ))
        } else {
            Ok(())
        }
    }

    fn slide(&self, index: usize) -> Result<&RgbaImage, EngineError> {
        self.slides
            .get(index)
            .ok_or_else(|| EngineError::Render(anyhow!("slide {index} is not resident")))
    }
}

impl Compositor for SoftwareCompositor {
    fn resize(&mut self, viewport: Viewport) -> Result<(), EngineError> {
        self.ensure_live()?;
        if self.frame.dimensions() != (viewport.width(), viewport.height()) {
            self.frame = RgbaImage::new(viewport.width(), viewport.height());
        }
        Ok(())
    }

    fn upload_slides(&mut self, images: &[DecodedImage]) -> Result<(), EngineError> {
        self.ensure_live()?;
        self.slides = images.iter().map(|image| image.pixels.clone()).collect();
        Ok(())
    }

    fn draw(&mut self, uniforms: &ShaderUniforms) -> Result<(), EngineError> {
        self.ensure_live()?;
        let from = self.slide(uniforms.from)?;
        let to = self.slide(uniforms.to)?;
        let (width, height) = self.frame.dimensions();
        let mut frame = RgbaImage::new(width, height);
        for (x, y, pixel) in frame.enumerate_pixels_mut() {
            let uv = [
                (x as f32 + 0.5) / width as f32,
                (y as f32 + 0.5) / height as f32,
            ];
            let color = shade(
                uv,
                uniforms,
                |uv| sample_bilinear(from, uv),
                |uv| sample_bilinear(to, uv),
            );
            *pixel = to_rgba8(color);
        }
        self.frame = frame;
        self.frames_drawn += 1;
        self.last_uniforms = Some(*uniforms);
        Ok(())
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<(), EngineError> {
        self.ensure_live()?;
        let fill = to_rgba8(color);
        for pixel in self.frame.pixels_mut() {
            *pixel = fill;
        }
        self.frames_drawn += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.slides.clear();
        self.released = true;
    }
}

/// Bilinear fetch with clamp-to-edge addressing, like the GPU sampler.
fn sample_bilinear(image: &RgbaImage, uv: [f32; 2]) -> [f32; 4] {
    let (width, height) = image.dimensions();
    let x = uv[0] * width as f32 - 0.5;
    let y = uv[1] * height as f32 - 0.5;
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let texel = |tx: f32, ty: f32| {
        let tx = (tx.max(0.0) as u32).min(width - 1);
        let ty = (ty.max(0.0) as u32).min(height - 1);
        image.get_pixel(tx, ty).0.map(|channel| f32::from(channel) / 255.0)
    };
    let top_left = texel(x0, y0);
    let top_right = texel(x0 + 1.0, y0);
    let bottom_left = texel(x0, y0 + 1.0);
    let bottom_right = texel(x0 + 1.0, y0 + 1.0);
    let mut out = [0.0; 4];
    for channel in 0..4 {
        let top = top_left[channel] + (top_right[channel] - top_left[channel]) * fx;
        let bottom = bottom_left[channel] + (bottom_right[channel] - bottom_left[channel]) * fx;
        out[channel] = top + (bottom - top) * fy;
    }
    out
}

fn to_rgba8(color: [f32; 4]) -> Rgba<u8> {
    Rgba(color.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8))
}

#[cfg(test)]
mod tests {
    use scheduler::Direction;

    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> DecodedImage {
        DecodedImage {
            pixels: RgbaImage::from_pixel(width, height, Rgba(color)),
        }
    }

    fn uniforms(from: usize, to: usize, progress: f32) -> ShaderUniforms {
        ShaderUniforms {
            from,
            to,
            progress,
            direction: Direction::Forward.vector(),
            from_aspect: 1.0,
            to_aspect: 1.0,
            canvas_aspect: 2.0,
        }
    }

    fn ready(width: u32, height: u32) -> SoftwareCompositor {
        let mut compositor = SoftwareCompositor::new();
        compositor
            .resize(Viewport::new(width, height).unwrap())
            .unwrap();
        compositor
            .upload_slides(&[solid(4, 4, [200, 0, 0, 255]), solid(4, 4, [0, 0, 100, 255])])
            .unwrap();
        compositor
    }

    #[test]
    fn resting_frame_is_from_slide() {
        let mut compositor = ready(8, 4);
        compositor.draw(&uniforms(0, 0, 0.0)).unwrap();
        assert!(compositor.frame().pixels().all(|p| p.0 == [200, 0, 0, 255]));
        assert_eq!(compositor.frames_drawn(), 1);
    }

    #[test]
    fn completed_frame_is_to_slide() {
        let mut compositor = ready(8, 4);
        compositor.draw(&uniforms(0, 1, 1.0)).unwrap();
        assert!(compositor.frame().pixels().all(|p| p.0 == [0, 0, 100, 255]));
    }

    #[test]
    fn midpoint_mixes_both_slides() {
        let mut compositor = ready(8, 4);
        compositor.draw(&uniforms(0, 1, 0.5)).unwrap();
        let pixel = compositor.frame().get_pixel(3, 2).0;
        assert_eq!(pixel, [100, 0, 50, 255]);
    }

    #[test]
    fn clear_fills_background() {
        let mut compositor = ready(3, 3);
        compositor.clear([12.0 / 255.0, 10.0 / 255.0, 9.0 / 255.0, 1.0]).unwrap();
        assert!(compositor.frame().pixels().all(|p| p.0 == [12, 10, 9, 255]));
    }

    #[test]
    fn bilinear_interpolates_between_texels() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
        let middle = sample_bilinear(&image, [0.5, 0.5]);
        assert!((middle[0] - 0.5).abs() < 1e-6);
        assert_eq!(sample_bilinear(&image, [0.0, 0.5])[0], 0.0);
        assert_eq!(sample_bilinear(&image, [1.0, 0.5])[0], 1.0);
    }

    #[test]
    fn missing_slide_is_an_error() {
        let mut compositor = ready(2, 2);
        assert!(compositor.draw(&uniforms(0, 5, 0.5)).is_err());
    }

    #[test]
    fn released_compositor_refuses_work() {
        let mut compositor = ready(2, 2);
        compositor.release();
        compositor.release();
        assert!(compositor.is_released());
        assert_eq!(compositor.slide_count(), 0);
        assert!(matches!(
            compositor.draw(&uniforms(0, 0, 0.0)),
            Err(EngineError::ContextLost(_))
        ));
    }
}
