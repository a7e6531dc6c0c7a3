/// Pixel size of the render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    /// Returns `None` for a degenerate (zero-area) surface, e.g. a minimised
    /// window.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            None
        } else {
            Some(Self { width, height })
        }
    }

    /// Sizes the render target for a window of `physical` pixels at
    /// `scale_factor`, rendering at no more than `max_pixel_ratio` device
    /// pixels per logical pixel.
    pub fn for_window(
        physical: (u32, u32),
        scale_factor: f64,
        max_pixel_ratio: f64,
    ) -> Option<Self> {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        let ratio = scale.min(max_pixel_ratio.max(1.0));
        let fit = |pixels: u32| {
            if pixels == 0 {
                0
            } else {
                ((f64::from(pixels) / scale * ratio).round() as u32).max(1)
            }
        };
        Self::new(fit(physical.0), fit(physical.1))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn canvas_aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_area() {
        assert!(Viewport::new(0, 10).is_none());
        assert!(Viewport::new(10, 0).is_none());
        assert!(Viewport::for_window((0, 0), 2.0, 2.0).is_none());
    }

    #[test]
    fn keeps_physical_size_under_cap() {
        let viewport = Viewport::for_window((2880, 1800), 2.0, 2.0).unwrap();
        assert_eq!((viewport.width(), viewport.height()), (2880, 1800));
    }

    #[test]
    fn caps_dense_displays() {
        let viewport = Viewport::for_window((3000, 1500), 3.0, 2.0).unwrap();
        assert_eq!((viewport.width(), viewport.height()), (2000, 1000));
        assert!((viewport.canvas_aspect() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn tolerates_bogus_scale_factor() {
        let viewport = Viewport::for_window((800, 600), 0.0, 2.0).unwrap();
        assert_eq!((viewport.width(), viewport.height()), (800, 600));
    }
}
