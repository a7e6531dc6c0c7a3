use crate::error::EngineError;
use crate::shader::ShaderUniforms;
use crate::textures::DecodedImage;
use crate::viewport::Viewport;

/// A target that can draw the transition quad.
///
/// The session owns exactly one compositor and drives it once per frame:
/// `clear` while slides are still loading, `draw` afterwards. Implementations
/// must tolerate `release` being called more than once.
pub trait Compositor {
    /// Resizes the render target. Called before the first frame and on every
    /// host resize.
    fn resize(&mut self, viewport: Viewport) -> Result<(), EngineError>;

    /// Makes every slide image resident, in deck order.
    fn upload_slides(&mut self, images: &[DecodedImage]) -> Result<(), EngineError>;

    /// Draws one frame of the cross-dissolve.
    fn draw(&mut self, uniforms: &ShaderUniforms) -> Result<(), EngineError>;

    /// Fills the target with a solid color (straight RGBA in `[0, 1]`).
    fn clear(&mut self, color: [f32; 4]) -> Result<(), EngineError>;

    /// Frees every resource. The compositor is unusable afterwards.
    fn release(&mut self);
}
