//! Fixtures shared by the integration tests.
//!
//! Images are synthesized with the `image` crate; nothing is checked in.

#![allow(dead_code)]

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Opaque gradient: red grows left to right, green top to bottom.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    let last = |n: u32| n.saturating_sub(1).max(1);
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / last(width)) as u8,
            (y * 255 / last(height)) as u8,
            64,
            255,
        ])
    })
}

pub fn write_gradient_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    gradient(width, height).save(&path).unwrap();
    path
}

pub fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub fn decode_rgba(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

/// A gradient JPEG with an APP1 EXIF segment holding only the orientation
/// tag (0x0112) in a little-endian TIFF directory.
pub fn jpeg_with_orientation(width: u32, height: u32, code: u16) -> Vec<u8> {
    jpeg_with_exif(width, height, None, code)
}

/// Like [`jpeg_with_orientation`], with a Make (0x010F) entry ahead of the
/// orientation when `make` is given. Values longer than four bytes live
/// after the directory.
pub fn jpeg_with_exif(width: u32, height: u32, make: Option<&str>, code: u16) -> Vec<u8> {
    let rgb = image::DynamicImage::ImageRgba8(gradient(width, height)).to_rgb8();
    let mut jpeg = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .unwrap();

    let count: u16 = if make.is_some() { 2 } else { 1 };
    let data_offset = 8 + 2 + 12 * count as u32 + 4;

    let mut payload = b"Exif\0\0II*\0".to_vec();
    payload.extend_from_slice(&8u32.to_le_bytes());
    payload.extend_from_slice(&count.to_le_bytes());
    let mut data = Vec::new();
    if let Some(make) = make {
        let mut ascii = make.as_bytes().to_vec();
        ascii.push(0);
        payload.extend_from_slice(&0x010Fu16.to_le_bytes());
        payload.extend_from_slice(&2u16.to_le_bytes());
        payload.extend_from_slice(&(ascii.len() as u32).to_le_bytes());
        if ascii.len() <= 4 {
            ascii.resize(4, 0);
            payload.extend_from_slice(&ascii);
        } else {
            payload.extend_from_slice(&data_offset.to_le_bytes());
            data = ascii;
        }
    }
    payload.extend_from_slice(&0x0112u16.to_le_bytes());
    payload.extend_from_slice(&3u16.to_le_bytes());
    payload.extend_from_slice(&1u32.to_le_bytes());
    payload.extend_from_slice(&code.to_le_bytes());
    payload.extend_from_slice(&[0, 0]);
    payload.extend_from_slice(&0u32.to_le_bytes());
    payload.extend_from_slice(&data);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}
