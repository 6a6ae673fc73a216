//! Rasterization: draw the decoded image onto an off-screen canvas.
//!
//! The canvas is sized to the image's natural dimensions, so drawing is a
//! 1:1 copy with no scaling and no cropping. Everything is normalised to
//! RGBA8 here, which is the only pixel layout encoders ever see.

use crate::error::ConvertError;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage, RgbaImage};
use tracing::debug;

/// An RGBA8 pixel buffer sitting between decode and encode.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    pixels: RgbaImage,
}

impl RasterSurface {
    /// Wrap an existing RGBA buffer.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Row-major RGBA bytes, `width * height * 4` long.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Drop alpha by compositing over black, the way a premultiplied canvas
    /// is serialised to an opaque format.
    pub fn flatten_over_black(&self) -> RgbImage {
        let (width, height) = self.dimensions();
        RgbImage::from_fn(width, height, |x, y| {
            let [r, g, b, a] = self.pixels.get_pixel(x, y).0;
            let scale = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
            Rgb([scale(r), scale(g), scale(b)])
        })
    }
}

/// Draw `image` onto a canvas of its natural size.
///
/// The canvas starts transparent, so drawing is a straight pixel copy:
/// semi-transparent pixels keep their exact RGBA values.
pub fn rasterize(image: &DynamicImage) -> Result<RasterSurface, ConvertError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ConvertError::EmptySurface { width, height });
    }

    let pixels = image.to_rgba8();
    debug!("Rasterized {}x{} px onto canvas", width, height);
    Ok(RasterSurface { pixels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba};

    #[test]
    fn canvas_matches_natural_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(13, 7, Rgba([9, 9, 9, 255])));
        let surface = rasterize(&img).unwrap();
        assert_eq!(surface.dimensions(), (13, 7));
        assert_eq!(surface.as_raw().len(), 13 * 7 * 4);
        assert_eq!(*surface.pixels().get_pixel(12, 6), Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn grayscale_is_expanded_to_rgba() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 3, Luma([200])));
        let surface = rasterize(&img).unwrap();
        assert_eq!(*surface.pixels().get_pixel(1, 1), Rgba([200, 200, 200, 255]));
    }

    #[test]
    fn translucent_pixels_are_copied_exactly() {
        let ramp = RgbaImage::from_fn(256, 1, |x, _| Rgba([255, 128, 7, x as u8]));
        let surface = rasterize(&DynamicImage::ImageRgba8(ramp.clone())).unwrap();
        assert_eq!(surface.pixels(), &ramp);
    }

    #[test]
    fn zero_area_is_rejected() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 5));
        assert!(matches!(
            rasterize(&img),
            Err(ConvertError::EmptySurface { width: 0, height: 5 })
        ));
    }

    #[test]
    fn flatten_composites_over_black() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([200, 100, 50, 255]));
        img.put_pixel(1, 0, Rgba([200, 100, 50, 0]));
        let rgb = RasterSurface::from_rgba(img).flatten_over_black();
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([200, 100, 50]));
        assert_eq!(*rgb.get_pixel(1, 0), Rgb([0, 0, 0]));
    }
}
