use thiserror::Error;

/// Failures that stop the slideshow engine.
///
/// Redundant navigation requests are not errors and never show up here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A slide image could not be turned into a texture. The deck never
    /// becomes ready; the host should fall back to a static image.
    #[error("failed to load slide {index} from `{source_name}`")]
    AssetLoad {
        index: usize,
        source_name: String,
        #[source]
        source: AssetError,
    },
    #[error(transparent)]
    Deck(#[from] scheduler::SlideshowError),
    /// The texture loader went away before every slide resolved.
    #[error("texture loader stopped before all slides resolved")]
    LoaderDisconnected,
    /// The GPU device or surface is gone. The host must rebuild the session.
    #[error("render context lost: {0}")]
    ContextLost(String),
    /// Any other fatal rendering failure.
    #[error(transparent)]
    Render(#[from] anyhow::Error),
}

/// Why a single image failed to decode.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read image file")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image")]
    Decode(#[from] image::ImageError),
    #[error("image has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },
}
