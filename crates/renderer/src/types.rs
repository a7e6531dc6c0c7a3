use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use scheduler::DEFAULT_AUTOPLAY_INTERVAL;

/// Where a slide's pixels come from.
#[derive(Clone)]
pub enum ImageSource {
    /// Image file on disk; format is sniffed from its contents.
    Path(PathBuf),
    /// Already-encoded image bytes (PNG, JPEG, ...).
    Encoded { label: String, bytes: Arc<[u8]> },
}

impl ImageSource {
    pub fn encoded(label: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        ImageSource::Encoded {
            label: label.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ImageSource::Encoded { label, bytes } => f
                .debug_struct("Encoded")
                .field("label", label)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(path) => write!(f, "{}", path.display()),
            ImageSource::Encoded { label, .. } => f.write_str(label),
        }
    }
}

/// Overlay text carried alongside a slide. The engine never reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caption {
    pub eyebrow: String,
    pub title: String,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallToAction {
    pub label: String,
    pub href: String,
}

/// One entry of the ordered deck. Its position in the deck is its index.
#[derive(Debug, Clone)]
pub struct Slide {
    pub image: ImageSource,
    pub caption: Caption,
    /// Overrides [`EngineOptions::cta`] while this slide is at rest.
    pub cta: Option<CallToAction>,
}

impl Slide {
    pub fn new(image: ImageSource) -> Self {
        Self {
            image,
            caption: Caption::default(),
            cta: None,
        }
    }

    pub fn with_caption(mut self, caption: Caption) -> Self {
        self.caption = caption;
        self
    }
}

/// Session-wide settings supplied by the host.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Autoplay interval; `None` disables autoplay.
    pub autoplay: Option<Duration>,
    /// Cap applied to the device pixel ratio when sizing the render target.
    pub max_pixel_ratio: f64,
    /// Resting background shown until every texture is resident.
    pub background: [u8; 3],
    pub cta: Option<CallToAction>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            autoplay: Some(DEFAULT_AUTOPLAY_INTERVAL),
            max_pixel_ratio: 2.0,
            background: [0x0c, 0x0a, 0x09],
            cta: None,
        }
    }
}

impl EngineOptions {
    pub(crate) fn background_rgba(&self) -> [f32; 4] {
        let [r, g, b] = self.background;
        [
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        ]
    }
}

/// What the overlay UI needs to draw this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay<'a> {
    /// Resting slide index; drives the active indicator dot.
    pub index: usize,
    pub slide_count: usize,
    /// True while a transition is running; controls should be disabled.
    pub transitioning: bool,
    /// False until every texture is resident.
    pub ready: bool,
    pub caption: &'a Caption,
    pub cta: Option<&'a CallToAction>,
}
