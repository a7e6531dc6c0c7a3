use renderer::{CallToAction, Caption, EngineOptions, ImageSource, Slide};
use slideconfig::DeckConfig;

/// Engine inputs built from a validated deck file.
#[derive(Debug, Clone)]
pub struct DeckInputs {
    pub slides: Vec<Slide>,
    pub options: EngineOptions,
    pub fallback: Option<ImageSource>,
}

impl DeckInputs {
    pub fn from_config(config: &DeckConfig) -> Self {
        let slides = config
            .slides
            .iter()
            .map(|entry| Slide {
                image: ImageSource::Path(entry.image.clone()),
                caption: Caption {
                    eyebrow: entry.eyebrow.clone(),
                    title: entry.title.clone(),
                    subtitle: entry.subtitle.clone(),
                },
                cta: entry.call_to_action(None).map(convert_cta),
            })
            .collect();
        let options = EngineOptions {
            autoplay: config.autoplay_interval(),
            max_pixel_ratio: config.max_pixel_ratio,
            background: config.background.0,
            cta: config.cta.clone().map(convert_cta),
        };
        Self {
            slides,
            options,
            fallback: config.fallback_image.clone().map(ImageSource::Path),
        }
    }
}

fn convert_cta(cta: slideconfig::CallToAction) -> CallToAction {
    CallToAction {
        label: cta.label,
        href: cta.href,
    }
}
