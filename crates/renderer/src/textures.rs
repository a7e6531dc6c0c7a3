//! Background image acquisition.
//!
//! Every slide is decoded on its own worker thread; results come back over a
//! channel and are collected by index so the deck keeps its order no matter
//! which image finishes first.

use std::thread;

use crossbeam_channel::{Receiver, TryRecvError};
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::error::{AssetError, EngineError};
use crate::types::ImageSource;

/// A slide image decoded to straight RGBA8, top row first.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub pixels: RgbaImage,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.pixels.width() as f32 / self.pixels.height() as f32
    }
}

type LoadResult = (usize, Result<RgbaImage, AssetError>);

/// In-flight decode of a whole deck.
pub struct TextureLoad {
    receiver: Receiver<LoadResult>,
    names: Vec<String>,
    slots: Vec<Option<RgbaImage>>,
    remaining: usize,
    delivered: bool,
}

impl TextureLoad {
    pub fn spawn(sources: &[ImageSource]) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        for (index, source) in sources.iter().cloned().enumerate() {
            let sender = sender.clone();
            thread::spawn(move || {
                let result = decode(&source);
                if let Err(err) = &result {
                    tracing::debug!(index, %source, error = %err, "slide decode failed");
                }
                let _ = sender.send((index, result));
            });
        }
        Self {
            receiver,
            names: sources.iter().map(ToString::to_string).collect(),
            slots: sources.iter().map(|_| None).collect(),
            remaining: sources.len(),
            delivered: false,
        }
    }

    /// Drains finished decodes without blocking.
    ///
    /// Returns the full deck once every slide has decoded, and fails on the
    /// first slide that could not be decoded. After the deck has been handed
    /// out once this keeps returning `Ok(None)`.
    pub fn poll(&mut self) -> Result<Option<Vec<DecodedImage>>, EngineError> {
        while self.remaining > 0 {
            match self.receiver.try_recv() {
                Ok(message) => self.accept(message)?,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(EngineError::LoaderDisconnected),
            }
        }
        Ok(self.take_all())
    }

    /// Blocks until every slide has decoded or one has failed.
    pub fn wait(mut self) -> Result<Vec<DecodedImage>, EngineError> {
        while self.remaining > 0 {
            let message = self
                .receiver
                .recv()
                .map_err(|_| EngineError::LoaderDisconnected)?;
            self.accept(message)?;
        }
        self.take_all().ok_or(EngineError::LoaderDisconnected)
    }

    fn accept(&mut self, (index, result): LoadResult) -> Result<(), EngineError> {
        match result {
            Ok(pixels) => {
                if let Some(slot) = self.slots.get_mut(index) {
                    if slot.replace(pixels).is_none() {
                        self.remaining -= 1;
                    }
                }
                Ok(())
            }
            Err(source) => Err(EngineError::AssetLoad {
                index,
                source_name: self.names.get(index).cloned().unwrap_or_default(),
                source,
            }),
        }
    }

    fn take_all(&mut self) -> Option<Vec<DecodedImage>> {
        if self.delivered || self.slots.iter().any(Option::is_none) {
            return None;
        }
        self.delivered = true;
        let images = std::mem::take(&mut self.slots)
            .into_iter()
            .flatten()
            .map(|pixels| DecodedImage { pixels })
            .collect();
        Some(images)
    }
}

/// Decodes one source synchronously.
pub fn decode(source: &ImageSource) -> Result<RgbaImage, AssetError> {
    let image = match source {
        ImageSource::Path(path) => {
            let bytes = std::fs::read(path)?;
            image::load_from_memory(&bytes)?
        }
        ImageSource::Encoded { bytes, .. } => image::load_from_memory(bytes)?,
    };
    let rgba = image.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(AssetError::Empty {
            width: rgba.width(),
            height: rgba.height(),
        });
    }
    Ok(rgba)
}

/// Shrinks `image`, keeping its aspect, until neither side exceeds
/// `max_dimension`. `None` means it already fits.
pub(crate) fn downscale_to_fit(image: &RgbaImage, max_dimension: u32) -> Option<RgbaImage> {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if max_dimension == 0 || longest <= max_dimension {
        return None;
    }
    let scale = f64::from(max_dimension) / f64::from(longest);
    let fit = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, max_dimension);
    Some(imageops::resize(
        image,
        fit(width),
        fit(height),
        FilterType::Triangle,
    ))
}
