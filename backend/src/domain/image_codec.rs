//! PNG + Base64 text encoding of QR rasters, used for the draft cache and the
//! `qr` column of committed records.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use log::warn;

use crate::domain::qr_encoder::QrRaster;

#[derive(Debug, thiserror::Error)]
pub enum ImageCodecError {
    #[error("Failed to encode QR image as PNG: {0}")]
    Png(#[from] image::ImageError),
}

/// PNG-compress the raster and Base64-encode it (standard alphabet, padded)
pub fn encode_png_base64(raster: &QrRaster) -> Result<String, ImageCodecError> {
    let mut bytes = Vec::new();
    raster
        .as_image()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(STANDARD.encode(bytes))
}

/// Encode an optional raster; an absent image encodes as the empty string
pub fn serialize(raster: Option<&QrRaster>) -> Result<String, ImageCodecError> {
    match raster {
        Some(raster) => encode_png_base64(raster),
        None => Ok(String::new()),
    }
}

/// Decode text produced by [`serialize`].
///
/// Never fails: empty, malformed Base64 or a corrupt PNG payload all yield
/// `None`. Line breaks and other ASCII whitespace inside the Base64 text are
/// ignored so wrapped payloads decode too.
pub fn deserialize(encoded: &str) -> Option<QrRaster> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let bytes = match STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Ignoring cached QR image with invalid Base64: {}", e);
            return None;
        }
    };

    let image = match image::load_from_memory_with_format(&bytes, ImageFormat::Png) {
        Ok(image) => image,
        Err(e) => {
            warn!("Ignoring cached QR image with unreadable PNG payload: {}", e);
            return None;
        }
    };

    let raster = QrRaster::from_image(image.into_luma8());
    if raster.is_none() {
        warn!("Ignoring cached QR image that is not a square raster");
    }
    raster
}
