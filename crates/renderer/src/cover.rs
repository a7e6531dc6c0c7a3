//! Fill-and-crop UV mapping, the shader-side equivalent of CSS
//! `object-fit: cover`.

/// Axis-aligned rectangle in image UV space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl UvRect {
    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }
}

/// Maps a canvas UV onto the image so the image covers the canvas.
///
/// When the canvas is relatively wider than the image the vertical range is
/// compressed around 0.5 (top and bottom are cropped); otherwise the
/// horizontal range is.
pub fn cover_uv(uv: [f32; 2], canvas_aspect: f32, image_aspect: f32) -> [f32; 2] {
    let ratio = canvas_aspect / image_aspect;
    if ratio >= 1.0 {
        [uv[0], 0.5 + (uv[1] - 0.5) / ratio]
    } else {
        [0.5 + (uv[0] - 0.5) * ratio, uv[1]]
    }
}

/// The part of the image that ends up visible on the canvas.
pub fn cover_rect(canvas_aspect: f32, image_aspect: f32) -> UvRect {
    UvRect {
        min: cover_uv([0.0, 0.0], canvas_aspect, image_aspect),
        max: cover_uv([1.0, 1.0], canvas_aspect, image_aspect),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASPECTS: [f32; 9] = [0.25, 0.5, 0.75, 1.0, 4.0 / 3.0, 1.5, 16.0 / 9.0, 2.4, 5.0];

    #[test]
    fn visible_region_stays_inside_image() {
        for canvas in ASPECTS {
            for image in ASPECTS {
                let rect = cover_rect(canvas, image);
                for value in rect.min.iter().chain(rect.max.iter()) {
                    assert!(
                        (0.0..=1.0).contains(value),
                        "canvas {canvas} image {image}: {rect:?}"
                    );
                }
                assert!(rect.width() > 0.0 && rect.height() > 0.0);
            }
        }
    }

    #[test]
    fn visible_region_has_canvas_aspect() {
        for canvas in ASPECTS {
            for image in ASPECTS {
                let rect = cover_rect(canvas, image);
                let aspect = rect.width() / rect.height() * image;
                assert!(
                    (aspect - canvas).abs() < 1e-4 * canvas.max(1.0),
                    "canvas {canvas} image {image}: got {aspect}"
                );
            }
        }
    }

    #[test]
    fn one_axis_is_never_cropped() {
        for canvas in ASPECTS {
            for image in ASPECTS {
                let rect = cover_rect(canvas, image);
                let full_x = rect.width() == 1.0;
                let full_y = rect.height() == 1.0;
                assert!(full_x || full_y, "canvas {canvas} image {image}: {rect:?}");
            }
        }
    }

    #[test]
    fn wide_canvas_crops_top_and_bottom() {
        let rect = cover_rect(2.0, 1.0);
        assert_eq!(rect.min, [0.0, 0.25]);
        assert_eq!(rect.max, [1.0, 0.75]);
    }

    #[test]
    fn tall_canvas_crops_left_and_right() {
        let rect = cover_rect(0.5, 1.0);
        assert_eq!(rect.min, [0.25, 0.0]);
        assert_eq!(rect.max, [0.75, 1.0]);
    }

    #[test]
    fn matching_aspect_is_identity() {
        let uv = [0.3, 0.8];
        assert_eq!(cover_uv(uv, 1.5, 1.5), uv);
    }
}
