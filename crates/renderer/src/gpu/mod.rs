//! wgpu implementation of [`crate::Compositor`].
//!
//! - `context` owns the instance, device and surface and reconfigures the
//!   swapchain on resize.
//! - `pipeline` compiles the GLSL from [`crate::compile`] into the single
//!   render pipeline.
//! - `textures` uploads decoded slides and caches one bind group per slide
//!   pair.
//! - `uniforms` is the std140 uniform block layout.

mod compositor;
mod context;
mod pipeline;
mod textures;
mod uniforms;

pub use compositor::GpuCompositor;
