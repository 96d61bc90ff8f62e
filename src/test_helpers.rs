//! Shared test utilities for the raster-canvas test suite.
//!
//! Fixture images are synthesized in memory with the `image` crate rather
//! than checked in, so every test controls the exact pixels and metadata it
//! starts from.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let path = tmp.path().join("photo.jpg");
//! std::fs::write(&path, jpeg_with_orientation(40, 20, 6)).unwrap();
//! ```

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

// =========================================================================
// Pixel fixtures
// =========================================================================

/// An opaque image whose red channel grows left to right and green channel
/// top to bottom, so every flip and rotation is distinguishable.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    let last = |n: u32| n.saturating_sub(1).max(1);
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / last(width)) as u8;
        let g = (y * 255 / last(height)) as u8;
        Rgba([r, g, 128, 255])
    })
}

// =========================================================================
// Encoded fixtures
// =========================================================================

pub fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub fn write_png(path: &Path, image: &RgbaImage) {
    std::fs::write(path, png_bytes(image)).unwrap();
}

/// A gradient JPEG carrying an EXIF orientation tag.
pub fn jpeg_with_orientation(width: u32, height: u32, code: u16) -> Vec<u8> {
    jpeg_with_exif(width, height, None, code)
}

/// A gradient JPEG whose EXIF block holds an orientation tag and, when
/// given, a camera make.
///
/// The encoder writes no EXIF of its own, so an APP1 segment holding a
/// little-endian TIFF directory (0x010F Make ASCII, 0x0112 Orientation
/// SHORT) is spliced in right after the SOI marker.
pub fn jpeg_with_exif(width: u32, height: u32, make: Option<&str>, code: u16) -> Vec<u8> {
    let rgb = image::DynamicImage::ImageRgba8(gradient_image(width, height)).to_rgb8();
    let mut jpeg = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "encoder output must start with SOI");

    let entries: u16 = if make.is_some() { 2 } else { 1 };
    let data_offset = 8 + 2 + 12 * entries as u32 + 4;

    let mut tiff = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
    tiff.extend_from_slice(&entries.to_le_bytes());
    let mut data = Vec::new();
    if let Some(make) = make {
        let mut ascii = make.as_bytes().to_vec();
        ascii.push(0);
        tiff.extend_from_slice(&0x010Fu16.to_le_bytes());
        tiff.extend_from_slice(&2u16.to_le_bytes());
        tiff.extend_from_slice(&(ascii.len() as u32).to_le_bytes());
        if ascii.len() <= 4 {
            ascii.resize(4, 0);
            tiff.extend_from_slice(&ascii);
        } else {
            tiff.extend_from_slice(&data_offset.to_le_bytes());
            data.extend_from_slice(&ascii);
        }
    }
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&code.to_le_bytes());
    tiff.extend_from_slice(&[0x00, 0x00]);
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(&data);

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);

    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend_from_slice(&payload);

    let mut out = Vec::with_capacity(jpeg.len() + segment.len());
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}
