//! QR encoding and rasterization.
//!
//! The module matrix comes from the `qrcode` crate at error-correction level
//! L. Rasterization follows the usual writer layout: a quiet zone of four
//! modules on each side, each module scaled to an integer block of pixels,
//! the symbol centered on a white square of the requested edge length. If the
//! symbol with its quiet zone does not fit, the edge grows to fit it at one
//! pixel per module.

use std::fmt;

use image::{GrayImage, Luma};
use log::debug;
use qrcode::{Color, EcLevel, QrCode};

/// Edge length of the rendered QR image in pixels
pub const DEFAULT_QR_SIZE: u32 = 512;
/// Light modules around the symbol on each side
pub const QUIET_ZONE_MODULES: u32 = 4;
/// Smallest QR symbol (version 1) is 21 modules wide
pub const MIN_QR_SIZE: u32 = 21;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QrEncodingError {
    #[error("Text of {length} bytes cannot be encoded as a QR code: {reason}")]
    Unencodable { length: usize, reason: String },
}

/// Square monochrome raster: every pixel is pure black or pure white
#[derive(Clone, PartialEq)]
pub struct QrRaster(GrayImage);

impl QrRaster {
    /// Wrap a grayscale image, snapping every pixel to black or white.
    ///
    /// Returns `None` for empty or non-square images.
    pub fn from_image(mut image: GrayImage) -> Option<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || width != height {
            return None;
        }
        for pixel in image.pixels_mut() {
            *pixel = if pixel.0[0] < 128 { DARK } else { LIGHT };
        }
        Some(Self(image))
    }

    pub fn edge(&self) -> u32 {
        self.0.width()
    }

    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] == DARK.0[0]
    }

    pub fn dark_pixel_count(&self) -> usize {
        self.0.pixels().filter(|p| **p == DARK).count()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }
}

impl fmt::Debug for QrRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QrRaster({}x{})", self.0.width(), self.0.height())
    }
}

/// Renders text as a QR raster of a fixed edge length
#[derive(Debug, Clone)]
pub struct QrEncoder {
    size: u32,
}

impl QrEncoder {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(MIN_QR_SIZE) }
    }

    /// Encode `text` and rasterize it
    pub fn encode(&self, text: &str) -> Result<QrRaster, QrEncodingError> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::L).map_err(|e| {
            QrEncodingError::Unencodable {
                length: text.len(),
                reason: e.to_string(),
            }
        })?;

        let raster = self.rasterize(&code);
        debug!(
            "Encoded {} bytes into {}-module QR rendered at {} px",
            text.len(),
            code.width(),
            raster.edge()
        );
        Ok(raster)
    }

    fn rasterize(&self, code: &QrCode) -> QrRaster {
        let modules = code.width() as u32;
        let with_quiet_zone = modules + QUIET_ZONE_MODULES * 2;
        let edge = self.size.max(with_quiet_zone);
        let scale = edge / with_quiet_zone;
        let padding = (edge - modules * scale) / 2;

        let mut image = GrayImage::from_pixel(edge, edge, LIGHT);
        for my in 0..modules {
            for mx in 0..modules {
                if code[(mx as usize, my as usize)] != Color::Dark {
                    continue;
                }
                let left = padding + mx * scale;
                let top = padding + my * scale;
                for y in top..top + scale {
                    for x in left..left + scale {
                        image.put_pixel(x, y, DARK);
                    }
                }
            }
        }
        QrRaster(image)
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_QR_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_is_fixed_size_and_monochrome() {
        let raster = QrEncoder::default().encode("LPJ-01012000").unwrap();
        assert_eq!(raster.edge(), 512);
        assert_eq!(raster.as_image().height(), 512);
        assert!(raster.as_image().pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert!(raster.dark_pixel_count() > 0);
    }

    #[test]
    fn test_module_layout_for_short_code() {
        // Version 1 (21 modules) + 8 quiet modules = 29; 512 / 29 = 17 px per module,
        // symbol spans 357 px, leaving 77 px of padding on each side.
        let raster = QrEncoder::default().encode("LPJ-01012000").unwrap();

        assert!(!raster.is_dark(0, 0));
        assert!(!raster.is_dark(76, 76));
        // top-left finder: outer ring and center are dark
        assert!(raster.is_dark(77, 77));
        assert!(raster.is_dark(77 + 16, 77 + 16));
        assert!(raster.is_dark(77 + 3 * 17 + 8, 77 + 3 * 17 + 8));
        // light ring of the finder
        assert!(!raster.is_dark(77 + 17 + 8, 77 + 17 + 8));
        // top-right finder starts at module 14
        assert!(raster.is_dark(77 + 14 * 17, 77));
        // right quiet zone
        assert!(!raster.is_dark(77 + 357, 100));
        assert!(!raster.is_dark(511, 511));
    }

    #[test]
    fn test_each_module_is_a_uniform_block() {
        let raster = QrEncoder::default().encode("GMG-06031927").unwrap();
        for my in 0..21u32 {
            for mx in 0..21u32 {
                let left = 77 + mx * 17;
                let top = 77 + my * 17;
                let expected = raster.is_dark(left, top);
                assert_eq!(raster.is_dark(left + 16, top + 16), expected);
                assert_eq!(raster.is_dark(left + 8, top), expected);
            }
        }
    }

    #[test]
    fn test_deterministic_output() {
        let encoder = QrEncoder::default();
        let first = encoder.encode("ABC-01012000").unwrap();
        assert_eq!(first, encoder.encode("ABC-01012000").unwrap());
        assert_ne!(first, encoder.encode("ABD-01012000").unwrap());
    }

    #[test]
    fn test_small_size_grows_to_fit_symbol() {
        let raster = QrEncoder::new(10).encode("LPJ-01012000").unwrap();
        assert_eq!(raster.edge(), 29);
        assert!(raster.is_dark(4, 4));
        assert!(!raster.is_dark(3, 3));
    }

    #[test]
    fn test_oversized_text_is_an_error() {
        let text = "a".repeat(4000);
        let err = QrEncoder::default().encode(&text).unwrap_err();
        assert!(matches!(err, QrEncodingError::Unencodable { length: 4000, .. }));
    }

    #[test]
    fn test_from_image_snaps_and_rejects_non_square() {
        let gray = GrayImage::from_pixel(4, 4, Luma([100]));
        let raster = QrRaster::from_image(gray).unwrap();
        assert_eq!(raster.dark_pixel_count(), 16);

        assert!(QrRaster::from_image(GrayImage::new(4, 3)).is_none());
        assert!(QrRaster::from_image(GrayImage::new(0, 0)).is_none());
        assert_eq!(format!("{:?}", raster), "QrRaster(4x4)");
    }
}
