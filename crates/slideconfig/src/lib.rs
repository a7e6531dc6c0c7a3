use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read configuration at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Deck description consumed by the slideshow host.
#[derive(Debug, Clone, Deserialize)]
pub struct DeckConfig {
    pub version: u32,
    /// Autoplay interval; zero disables autoplay.
    #[serde(
        default = "default_autoplay",
        deserialize_with = "deserialize_duration_opt"
    )]
    pub autoplay: Option<Duration>,
    /// Upper bound on device pixel ratio used when sizing the render target.
    #[serde(default = "default_max_pixel_ratio")]
    pub max_pixel_ratio: f64,
    /// Color shown before the deck is ready and behind failed decks.
    #[serde(default = "default_background")]
    pub background: Rgb,
    /// Static image the host shows when a slide fails to load.
    #[serde(default)]
    pub fallback_image: Option<PathBuf>,
    #[serde(default)]
    pub cta: Option<CallToAction>,
    #[serde(default)]
    pub slides: Vec<SlideEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallToAction {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlideEntry {
    pub image: PathBuf,
    #[serde(default)]
    pub eyebrow: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub cta_label: Option<String>,
    #[serde(default)]
    pub cta_href: Option<String>,
}

impl SlideEntry {
    /// Per-slide call to action, falling back to the deck-wide one.
    pub fn call_to_action(&self, deck: Option<&CallToAction>) -> Option<CallToAction> {
        match (&self.cta_label, &self.cta_href) {
            (Some(label), Some(href)) => Some(CallToAction {
                label: label.clone(),
                href: href.clone(),
            }),
            _ => deck.cloned(),
        }
    }
}

/// 8-bit sRGB color written as `#rrggbb` in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let hex = raw.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(format!("invalid color '{raw}'; expected #rrggbb"));
        }
        let channel = |offset: usize| {
            u8::from_str_radix(&hex[offset..offset + 2], 16)
                .map_err(|err| format!("invalid color '{raw}': {err}"))
        };
        Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Rgb::parse(&raw).map_err(de::Error::custom)
    }
}

fn default_autoplay() -> Option<Duration> {
    Some(Duration::from_millis(5000))
}

fn default_max_pixel_ratio() -> f64 {
    2.0
}

fn default_background() -> Rgb {
    Rgb([0x0c, 0x0a, 0x09])
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

/// Parses a human-readable duration (`"5s"`, `"750ms"`) or a bare number of
/// seconds, as accepted by the config file.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if seconds.is_nan() || seconds.is_sign_negative() {
            return Err(format!("duration '{raw}' must be non-negative"));
        }
        return Duration::try_from_secs_f64(seconds)
            .map_err(|err| format!("invalid duration '{raw}': {err}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{raw}': {err}"))
}

impl DeckConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: DeckConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads and validates a deck file; relative image paths are resolved
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for slide in &mut self.slides {
            if slide.image.is_relative() {
                slide.image = base.join(&slide.image);
            }
        }
        if let Some(fallback) = self.fallback_image.as_mut() {
            if fallback.is_relative() {
                *fallback = base.join(&*fallback);
            }
        }
    }

    /// Autoplay interval with the "zero disables" rule applied.
    pub fn autoplay_interval(&self) -> Option<Duration> {
        self.autoplay.filter(|interval| !interval.is_zero())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.slides.is_empty() {
            return Err(ConfigError::Invalid(
                "config must define at least one slide".into(),
            ));
        }

        if !self.max_pixel_ratio.is_finite() || self.max_pixel_ratio < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "max_pixel_ratio must be >= 1 (got {})",
                self.max_pixel_ratio
            )));
        }

        for (index, slide) in self.slides.iter().enumerate() {
            if slide.image.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "slide {index} has an empty image path"
                )));
            }
            if slide.cta_label.is_some() != slide.cta_href.is_some() {
                return Err(ConfigError::Invalid(format!(
                    "slide {index} must set both cta_label and cta_href, or neither"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
version = 1
autoplay = "6s"
max_pixel_ratio = 1.5
background = "#102030"
fallback_image = "images/building-exterior.jpeg"

[cta]
label = "View apartments"
href = "/en/apartments"

[[slides]]
image = "images/facade.jpeg"
eyebrow = "Tallinn"
title = "A quiet courtyard"
subtitle = "Restored 1930s building"

[[slides]]
image = "/srv/images/interior.jpeg"
eyebrow = "Interior"
title = "Light-filled rooms"
cta_label = "See plans"
cta_href = "/en/plans"
"##;

    #[test]
    fn parses_sample_config() {
        let config = DeckConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.autoplay_interval(), Some(Duration::from_secs(6)));
        assert_eq!(config.max_pixel_ratio, 1.5);
        assert_eq!(config.background, Rgb([0x10, 0x20, 0x30]));
        assert_eq!(config.slides.len(), 2);
        assert_eq!(config.slides[0].subtitle.as_deref(), Some("Restored 1930s building"));
        assert!(config.slides[1].subtitle.is_none());
    }

    #[test]
    fn applies_defaults() {
        let config = DeckConfig::from_toml_str(
            r#"
version = 1

[[slides]]
image = "one.png"
"#,
        )
        .unwrap();
        assert_eq!(config.autoplay_interval(), Some(Duration::from_millis(5000)));
        assert_eq!(config.max_pixel_ratio, 2.0);
        assert_eq!(config.background, Rgb([0x0c, 0x0a, 0x09]));
        assert!(config.fallback_image.is_none());
        assert!(config.cta.is_none());
    }

    #[test]
    fn zero_autoplay_disables() {
        let config = DeckConfig::from_toml_str(
            r#"
version = 1
autoplay = 0

[[slides]]
image = "one.png"
"#,
        )
        .unwrap();
        assert_eq!(config.autoplay_interval(), None);
    }

    #[test]
    fn slide_cta_overrides_deck_cta() {
        let config = DeckConfig::from_toml_str(SAMPLE).unwrap();
        let deck = config.cta.as_ref();
        assert_eq!(
            config.slides[0].call_to_action(deck).map(|cta| cta.label),
            Some("View apartments".to_string())
        );
        assert_eq!(
            config.slides[1].call_to_action(deck).map(|cta| cta.href),
            Some("/en/plans".to_string())
        );
    }

    #[test]
    fn rejects_empty_deck() {
        let err = DeckConfig::from_toml_str("version = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_small_pixel_ratio() {
        let err = DeckConfig::from_toml_str(
            r#"
version = 1
max_pixel_ratio = 0.5

[[slides]]
image = "one.png"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_half_specified_cta() {
        let err = DeckConfig::from_toml_str(
            r#"
version = 1

[[slides]]
image = "one.png"
cta_label = "Go"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_color() {
        let err = DeckConfig::from_toml_str(
            r#"
version = 1
background = "teal"

[[slides]]
image = "one.png"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.toml");
        fs::write(&path, SAMPLE).unwrap();

        let config = DeckConfig::load(&path).unwrap();
        assert_eq!(config.slides[0].image, dir.path().join("images/facade.jpeg"));
        assert_eq!(config.slides[1].image, PathBuf::from("/srv/images/interior.jpeg"));
        assert_eq!(
            config.fallback_image,
            Some(dir.path().join("images/building-exterior.jpeg"))
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DeckConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn parses_cli_durations() {
        assert_eq!(parse_duration("5"), Ok(Duration::from_secs(5)));
        assert_eq!(parse_duration("750ms"), Ok(Duration::from_millis(750)));
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("inf").is_err());
        assert!(parse_duration("1e30").is_err());
    }

    #[test]
    fn rejects_unrepresentable_autoplay() {
        for value in ["inf", "1e30"] {
            let input = format!(
                "version = 1\nautoplay = {value}\n\n[[slides]]\nimage = \"a.png\"\n"
            );
            let err = DeckConfig::from_toml_str(&input).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{value}: {err}");
        }
    }
}
