//! Renderer crate for heroreel, the full-bleed hero slideshow.
//!
//! The crate turns an ordered deck of images into a cross-dissolve with
//! directional motion blur. The overall flow is:
//!
//! ```text
//!   heroreel / HostConfig
//!          │
//!          ▼
//!   run_window ──▶ Session::activate ──▶ TextureLoad (one thread per slide)
//!                        │
//!     every frame ──▶ Session::frame ──▶ Slideshow::tick ──▶ ShaderUniforms
//!                                                               │
//!                                     Compositor::draw ◀────────┘
//!                                (GpuCompositor | SoftwareCompositor)
//! ```
//!
//! [`Session`] owns every resource for one mounted slideshow and releases
//! them on teardown or drop. The transition math lives in [`shader`] for the
//! CPU path and in GLSL for the GPU path; both read the same constants.

mod compile;
mod compositor;
pub mod cover;
mod error;
mod gpu;
mod session;
pub mod shader;
mod software;
pub mod textures;
mod types;
mod viewport;
mod window;

pub use compositor::Compositor;
pub use error::{AssetError, EngineError};
pub use gpu::GpuCompositor;
pub use session::{Session, SessionPhase};
pub use shader::ShaderUniforms;
pub use software::SoftwareCompositor;
pub use textures::{DecodedImage, TextureLoad};
pub use types::{CallToAction, Caption, EngineOptions, ImageSource, Overlay, Slide};
pub use viewport::Viewport;
pub use window::{run_window, HostConfig};

pub use scheduler::{Direction, TransitionState};
