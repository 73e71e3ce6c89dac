// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image decoding.
//!
//! This module turns stored image bytes into RGBA pixels for display and
//! probes formats and dimensions without a full decode.

use anyhow::{Context, Result};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// A decoded image ready for display.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels, row-major
    pub pixels: Vec<u8>,
}

/// Decode image bytes into RGBA pixels.
pub fn decode_image(data: &[u8]) -> Result<LoadedImage> {
    let img = image::load_from_memory(data).context("Failed to decode image")?;
    let rgba = img.to_rgba8();
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

/// Read width and height from the image header.
pub fn image_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    let dims = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()
        .context("Failed to read image dimensions")?;
    Ok(dims)
}

/// Detect the image format from its leading bytes.
pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    image::guess_format(data).ok()
}

/// MIME type of the image, if it is one.
pub fn content_type(data: &[u8]) -> Option<&'static str> {
    detect_format(data).map(|format| format.to_mime_type())
}

#[cfg(test)]
pub(crate) fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_and_content_type() {
        let png = png_fixture(7, 3);
        assert_eq!(image_dimensions(&png).unwrap(), (7, 3));
        assert_eq!(content_type(&png), Some("image/png"));
    }

    #[test]
    fn test_decode_rgba() {
        let loaded = decode_image(&png_fixture(2, 2)).unwrap();
        assert_eq!((loaded.width, loaded.height), (2, 2));
        assert_eq!(loaded.pixels.len(), 16);
        assert_eq!(&loaded.pixels[..4], &[200, 30, 30, 255]);
    }

    #[test]
    fn test_non_image_rejected() {
        assert!(content_type(b"just some text").is_none());
        assert!(decode_image(b"just some text").is_err());
        assert!(image_dimensions(b"just some text").is_err());
    }
}
