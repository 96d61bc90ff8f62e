//! Pure Rust image engine, no system libraries.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode / encode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust codecs) |
//! | EXIF fields → `exif:<TagName>` properties | `kamadak-exif` over `ImageDecoder::exif_metadata` |
//! | PNG text chunks ↔ properties | `png` (`tEXt`/`zTXt`/`iTXt` in, `iTXt` out) |
//! | Resize | `image::imageops::resize` with the mapped filter |
//! | Crop / composite / flip / flop / quarter turns | `image::imageops` |
//! | Free-angle rotation | `imageproc::geometric_transformations::warp_into` |
//! | Noise | `imageproc::noise::gaussian_noise` (fixed seed) |
//! | Blur / sharpen / contrast | `imageops::blur`, `unsharpen`, `contrast` |
//! | Vector merge | [`render`](super::render) (`tiny-skia` + `cosmic-text`) |
//!
//! Modulate, sepia, sigmoidal contrast and adaptive blur are small per-pixel
//! loops written here.
//!
//! Only PNG output carries properties; JPEG, TIFF and WebP are written
//! without them.

use super::backend::{BackendError, Dimensions, EngineResult, ImageEngine};
use super::calculations::rotated_bounds;
use super::params::{Filter, Modulation, Quality, Region, ResizeParams, Sharpening};
use super::render;
use crate::color::Color;
use crate::drawing::DrawCommand;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

/// Pure Rust engine using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustEngine;

impl RustEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Raster handle for [`RustEngine`].
#[derive(Debug, Clone, Default)]
pub struct RustRaster {
    image: Option<RgbaImage>,
    background: Color,
    properties: BTreeMap<String, String>,
    quality: Quality,
    format: Option<ImageFormat>,
    exception: Option<String>,
}

impl RustRaster {
    /// The decoded pixels, if any.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    fn fail(&mut self, message: impl Into<String>) -> BackendError {
        record(&mut self.exception, message.into())
    }

    fn pixels(&mut self, op: &str) -> EngineResult<&mut RgbaImage> {
        let Self {
            image, exception, ..
        } = self;
        image
            .as_mut()
            .ok_or_else(|| record(exception, format!("{op}: no images defined")))
    }

    /// Replace the pixels with `f(current)`.
    fn apply(&mut self, op: &str, f: impl FnOnce(&RgbaImage) -> RgbaImage) -> EngineResult<()> {
        let img = self.pixels(op)?;
        *img = f(&*img);
        Ok(())
    }
}

fn record(slot: &mut Option<String>, message: String) -> BackendError {
    *slot = Some(message.clone());
    BackendError::ProcessingFailed(message)
}

fn filter_type(filter: Filter) -> FilterType {
    match filter {
        Filter::Point => FilterType::Nearest,
        Filter::Triangle => FilterType::Triangle,
        Filter::Gaussian => FilterType::Gaussian,
        Filter::Catrom => FilterType::CatmullRom,
        Filter::Lanczos => FilterType::Lanczos3,
    }
}

struct Decoded {
    image: RgbaImage,
    format: Option<ImageFormat>,
    properties: BTreeMap<String, String>,
}

fn decode_bytes(bytes: &[u8]) -> image::ImageResult<Decoded> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format();
    let mut decoder = reader.into_decoder()?;

    let mut properties = match format {
        Some(ImageFormat::Png) => png_text(bytes),
        _ => BTreeMap::new(),
    };
    if let Some(raw) = decoder.exif_metadata().ok().flatten() {
        properties.extend(exif_properties(raw));
    }

    let image = DynamicImage::from_decoder(decoder)?.to_rgba8();
    Ok(Decoded {
        image,
        format,
        properties,
    })
}

/// Decode `bytes` into the raster, replacing pixels and properties.
fn decode(raster: &mut RustRaster, bytes: &[u8], source: &str) -> EngineResult<()> {
    let Decoded {
        image: img,
        format,
        properties,
    } = decode_bytes(bytes).map_err(|e| raster.fail(format!("unable to decode {source}: {e}")))?;

    log::debug!(
        target: "canvas",
        "decoded {} ({}x{}, {:?}, {} properties)",
        source,
        img.width(),
        img.height(),
        format,
        properties.len()
    );
    raster.properties = properties;
    raster.image = Some(img);
    raster.format = format;
    Ok(())
}

// =========================================================================
// Metadata
// =========================================================================

/// IFD pointers are structure, not metadata.
const EXIF_POINTERS: [exif::Tag; 3] = [
    exif::Tag::ExifIFDPointer,
    exif::Tag::GPSInfoIFDPointer,
    exif::Tag::InteropIFDPointer,
];

/// One `exif:<TagName>` property per known field of the primary image.
fn exif_properties(raw: Vec<u8>) -> Vec<(String, String)> {
    let raw = if raw.starts_with(b"Exif\0\0") {
        raw[6..].to_vec()
    } else {
        raw
    };
    let exif = match exif::Reader::new().read_raw(raw) {
        Ok(exif) => exif,
        Err(e) => {
            log::warn!(target: "canvas", "ignoring unreadable EXIF block: {e}");
            return Vec::new();
        }
    };
    exif.fields()
        .filter(|field| field.ifd_num == exif::In::PRIMARY)
        .filter(|field| field.tag.description().is_some() && !EXIF_POINTERS.contains(&field.tag))
        .filter_map(|field| Some((format!("exif:{}", field.tag), exif_text(&field.value)?)))
        .collect()
}

/// Plain text for an EXIF value: numbers comma-separated, rationals as
/// `num/denom`. Opaque binary values are skipped.
fn exif_text(value: &exif::Value) -> Option<String> {
    use exif::Value;

    fn join<T: ToString>(items: &[T]) -> String {
        items.iter().map(T::to_string).collect::<Vec<_>>().join(",")
    }

    let text = match value {
        Value::Ascii(parts) => parts
            .iter()
            .map(|part| String::from_utf8_lossy(part).trim_end_matches('\0').trim().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Byte(v) => join(v),
        Value::Short(v) => join(v),
        Value::Long(v) => join(v),
        Value::SByte(v) => join(v),
        Value::SShort(v) => join(v),
        Value::SLong(v) => join(v),
        Value::Float(v) => join(v),
        Value::Double(v) => join(v),
        Value::Rational(v) => v
            .iter()
            .map(|r| format!("{}/{}", r.num, r.denom))
            .collect::<Vec<_>>()
            .join(","),
        Value::SRational(v) => v
            .iter()
            .map(|r| format!("{}/{}", r.num, r.denom))
            .collect::<Vec<_>>()
            .join(","),
        Value::Undefined(bytes, _) if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') => {
            String::from_utf8_lossy(bytes).trim().to_string()
        }
        _ => return None,
    };
    Some(text)
}

/// Text chunks stored ahead of the pixel data, keyed by their keyword.
fn png_text(bytes: &[u8]) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    let reader = match png::Decoder::new(Cursor::new(bytes)).read_info() {
        Ok(reader) => reader,
        Err(e) => {
            log::warn!(target: "canvas", "skipping PNG text chunks: {e}");
            return properties;
        }
    };
    let info = reader.info();
    for chunk in &info.uncompressed_latin1_text {
        properties.insert(chunk.keyword.clone(), chunk.text.clone());
    }
    for chunk in &info.compressed_latin1_text {
        if let Ok(text) = chunk.get_text() {
            properties.insert(chunk.keyword.clone(), text);
        }
    }
    for chunk in &info.utf8_text {
        if let Ok(text) = chunk.get_text() {
            properties.insert(chunk.keyword.clone(), text);
        }
    }
    properties
}

/// PNG keywords are 1-79 printable Latin-1 characters without leading,
/// trailing or doubled spaces.
fn is_png_keyword(key: &str) -> bool {
    (1..=79).contains(&key.len())
        && key.chars().all(|c| c.is_ascii_graphic() || c == ' ')
        && !key.starts_with(' ')
        && !key.ends_with(' ')
        && !key.contains("  ")
}

// =========================================================================
// Encoding
// =========================================================================

/// RGBA PNG with one `iTXt` chunk per property.
fn encode_png(img: &RgbaImage, properties: &BTreeMap<String, String>) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, img.width(), img.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        for (key, value) in properties {
            if !is_png_keyword(key) {
                log::warn!(target: "canvas", "property `{key}` is not a valid PNG keyword, not written");
                continue;
            }
            encoder
                .add_itxt_chunk(key.clone(), value.clone())
                .map_err(|e| format!("PNG text chunk `{key}`: {e}"))?;
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| format!("Png encode failed: {e}"))?;
        writer
            .write_image_data(img.as_raw())
            .map_err(|e| format!("Png encode failed: {e}"))?;
        writer.finish().map_err(|e| format!("Png encode failed: {e}"))?;
    }
    Ok(buf)
}

/// Encode pixels in `format`. JPEG drops alpha and honors `quality`; PNG
/// carries `properties` as text chunks.
fn encode(
    img: &RgbaImage,
    format: ImageFormat,
    quality: Quality,
    properties: &BTreeMap<String, String>,
) -> Result<Vec<u8>, String> {
    if format == ImageFormat::Png {
        return encode_png(img, properties);
    }
    let mut bytes = Cursor::new(Vec::new());
    let dynamic = DynamicImage::ImageRgba8(img.clone());
    let result = match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.value() as u8);
            DynamicImage::ImageRgb8(dynamic.to_rgb8()).write_with_encoder(encoder)
        }
        other => dynamic.write_to(&mut bytes, other),
    };
    result.map_err(|e| format!("{format:?} encode failed: {e}"))?;
    Ok(bytes.into_inner())
}

/// Clip `region` to a `width × height` raster as `(x0, y0, x1, y1)`.
fn clip(region: Region, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let x0 = region.x.max(0);
    let y0 = region.y.max(0);
    let x1 = (region.x + region.width as i64).min(width as i64);
    let y1 = (region.y + region.height as i64).min(height as i64);
    (x1 > x0 && y1 > y0).then_some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

/// Clip `[start, start + len)` to `[0, limit)` as `(start, len)`.
fn span(start: i64, len: u32, limit: u32) -> (u32, u32) {
    let a = start.clamp(0, limit as i64) as u32;
    let b = (start + len as i64).clamp(0, limit as i64) as u32;
    (a, b.saturating_sub(a))
}

/// Rotate about the center onto a canvas grown to the rotated bounds.
fn rotate_free(img: &RgbaImage, background: Color, degrees: f64) -> RgbaImage {
    let (src_w, src_h) = img.dimensions();
    let (dst_w, dst_h) = rotated_bounds(src_w, src_h, degrees);
    // Source center to origin, turn clockwise on the y-down grid, origin to
    // the center of the grown canvas.
    let projection = Projection::translate(dst_w as f32 / 2.0, dst_h as f32 / 2.0)
        * Projection::rotate(degrees.to_radians() as f32)
        * Projection::translate(-(src_w as f32) / 2.0, -(src_h as f32) / 2.0);
    let fill = Rgba(background.to_array());
    let mut out = RgbaImage::from_pixel(dst_w, dst_h, fill);
    warp_into(img, &projection, Interpolation::Bilinear, fill, &mut out);
    out
}

fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let delta = max - min;
    if delta == 0.0 {
        return (0.0, 0.0, l);
    }
    let s = delta / (1.0 - (2.0 * l - 1.0).abs());
    let h = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(1.0) * 6.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    (r + m, g + m, b + m)
}

fn to_unit(v: u8) -> f64 {
    v as f64 / 255.0
}

fn from_unit(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn modulate_pixels(img: &RgbaImage, m: Modulation) -> RgbaImage {
    // Hue percent maps 0..200 onto a -180..180 degree turn.
    let hue_shift = (m.hue - 100.0) / 200.0;
    let mut out = img.clone();
    for p in out.pixels_mut() {
        let (h, s, l) = rgb_to_hsl(to_unit(p[0]), to_unit(p[1]), to_unit(p[2]));
        let (r, g, b) = hsl_to_rgb(
            h + hue_shift,
            (s * m.saturation / 100.0).clamp(0.0, 1.0),
            (l * m.brightness / 100.0).clamp(0.0, 1.0),
        );
        p.0 = [from_unit(r), from_unit(g), from_unit(b), p[3]];
    }
    out
}

fn sigmoidal(img: &RgbaImage, sharpen: bool, alpha: f64, beta: f64) -> RgbaImage {
    let mid = (beta / 100.0).clamp(0.0, 1.0);
    let logistic = |u: f64| 1.0 / (1.0 + (alpha * (mid - u)).exp());
    let (lo, hi) = (logistic(0.0), logistic(1.0));
    let table: Vec<u8> = (0..=255u32)
        .map(|v| {
            let u = v as f64 / 255.0;
            if alpha.abs() < f64::EPSILON {
                return v as u8;
            }
            let out = if sharpen {
                (logistic(u) - lo) / (hi - lo)
            } else {
                let y = (u * (hi - lo) + lo).clamp(1e-12, 1.0 - 1e-12);
                mid - (1.0 / y - 1.0).ln() / alpha
            };
            from_unit(out)
        })
        .collect();
    let mut out = img.clone();
    for p in out.pixels_mut() {
        for c in 0..3 {
            p[c] = table[p[c] as usize];
        }
    }
    out
}

fn sepia(img: &RgbaImage, threshold: f64) -> RgbaImage {
    let t = (threshold / 100.0).clamp(0.0, 1.0);
    let mut out = img.clone();
    for p in out.pixels_mut() {
        let i = 0.299 * to_unit(p[0]) + 0.587 * to_unit(p[1]) + 0.114 * to_unit(p[2]);
        let r = if i > t { 1.0 } else { i + 1.0 - t };
        let g = if i > 7.0 * t / 6.0 { 1.0 } else { i + 1.0 - 7.0 * t / 6.0 };
        let b = if i < t / 6.0 { 0.0 } else { i - t / 6.0 };
        p.0 = [from_unit(r), from_unit(g), from_unit(b), p[3]];
    }
    out
}

fn luminance(p: &Rgba<u8>) -> f64 {
    0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64
}

/// Blur that fades out across strong luminance edges.
fn adaptive(img: &RgbaImage, sigma: f64) -> RgbaImage {
    let blurred = imageops::blur(img, sigma.max(0.1) as f32);
    let (w, h) = img.dimensions();
    RgbaImage::from_fn(w, h, |x, y| {
        let here = luminance(img.get_pixel(x, y));
        let right = luminance(img.get_pixel((x + 1).min(w - 1), y));
        let below = luminance(img.get_pixel(x, (y + 1).min(h - 1)));
        let edge = ((right - here).abs() + (below - here).abs()) / 128.0;
        let weight = 1.0 - edge.min(1.0);
        let a = img.get_pixel(x, y);
        let b = blurred.get_pixel(x, y);
        let mix = |i: usize| (a[i] as f64 * (1.0 - weight) + b[i] as f64 * weight).round() as u8;
        Rgba([mix(0), mix(1), mix(2), mix(3)])
    })
}

const NOISE_SEED: u64 = 0x9E37_79B9_7F4A_7C15;
const NOISE_SIGMA: f64 = 12.0;

/// Gaussian grain from a fixed seed, so the same raster always gets the same
/// grain. Alpha is left as it was.
fn noise(img: &RgbaImage) -> RgbaImage {
    let mut out = imageproc::noise::gaussian_noise(img, 0.0, NOISE_SIGMA, NOISE_SEED);
    for (noisy, original) in out.pixels_mut().zip(img.pixels()) {
        noisy[3] = original[3];
    }
    out
}

impl ImageEngine for RustEngine {
    type Raster = RustRaster;

    fn new_raster(&self, background: Color) -> RustRaster {
        RustRaster {
            background,
            ..RustRaster::default()
        }
    }

    fn read_file(&self, raster: &mut RustRaster, path: &Path) -> EngineResult<()> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                raster.exception = Some(format!("unable to open {}: {e}", path.display()));
                return Err(BackendError::Io(e));
            }
        };
        decode(raster, &bytes, &path.display().to_string())
    }

    fn read_blob(&self, raster: &mut RustRaster, bytes: &[u8]) -> EngineResult<()> {
        decode(raster, bytes, "blob")
    }

    fn write_file(&self, raster: &mut RustRaster, path: &Path) -> EngineResult<()> {
        let format = match ImageFormat::from_path(path) {
            Ok(format) => format,
            Err(e) => return Err(raster.fail(format!("{}: {e}", path.display()))),
        };
        let quality = raster.quality;
        let properties = raster.properties.clone();
        let img = raster.pixels("write")?;
        let bytes = encode(img, format, quality, &properties).map_err(|e| raster.fail(e))?;
        if let Err(e) = std::fs::write(path, bytes) {
            raster.exception = Some(format!("unable to write {}: {e}", path.display()));
            return Err(BackendError::Io(e));
        }
        Ok(())
    }

    fn write_blob(&self, raster: &mut RustRaster) -> EngineResult<Vec<u8>> {
        let format = raster.format.unwrap_or(ImageFormat::Png);
        let quality = raster.quality;
        let properties = raster.properties.clone();
        let img = raster.pixels("blob")?;
        encode(img, format, quality, &properties).map_err(|e| raster.fail(e))
    }

    fn set_format(&self, raster: &mut RustRaster, format: &str) -> EngineResult<()> {
        match ImageFormat::from_extension(format.trim_start_matches('.')) {
            Some(f) if f.writing_enabled() => {
                raster.format = Some(f);
                Ok(())
            }
            _ => Err(raster.fail(format!("unrecognized image format `{format}`"))),
        }
    }

    fn format(&self, raster: &RustRaster) -> Option<String> {
        raster
            .format
            .and_then(|format| format.extensions_str().first())
            .map(|ext| ext.to_string())
    }

    fn duplicate(&self, raster: &RustRaster) -> RustRaster {
        RustRaster {
            exception: None,
            ..raster.clone()
        }
    }

    fn new_image(&self, raster: &mut RustRaster, width: u32, height: u32) -> EngineResult<()> {
        if width == 0 || height == 0 {
            return Err(raster.fail(format!("invalid image size {width}x{height}")));
        }
        raster.image = Some(RgbaImage::from_pixel(
            width,
            height,
            Rgba(raster.background.to_array()),
        ));
        Ok(())
    }

    fn dimensions(&self, raster: &RustRaster) -> Dimensions {
        raster
            .image
            .as_ref()
            .map(|img| Dimensions::new(img.width(), img.height()))
            .unwrap_or_default()
    }

    fn property_names(&self, raster: &RustRaster) -> Vec<String> {
        raster.properties.keys().cloned().collect()
    }

    fn property(&self, raster: &RustRaster, key: &str) -> Option<String> {
        raster.properties.get(key).cloned()
    }

    fn set_property(&self, raster: &mut RustRaster, key: &str, value: &str) -> EngineResult<()> {
        if key.trim().is_empty() {
            return Err(raster.fail("property key must not be empty"));
        }
        raster
            .properties
            .insert(key.trim().to_string(), value.to_string());
        Ok(())
    }

    fn quality(&self, raster: &RustRaster) -> Quality {
        raster.quality
    }

    fn set_quality(&self, raster: &mut RustRaster, quality: Quality) -> EngineResult<()> {
        raster.quality = quality;
        Ok(())
    }

    fn set_background(&self, raster: &mut RustRaster, color: Color) -> EngineResult<()> {
        raster.background = color;
        Ok(())
    }

    fn resize(&self, raster: &mut RustRaster, params: &ResizeParams) -> EngineResult<()> {
        if params.width == 0 || params.height == 0 {
            return Err(raster.fail(format!(
                "invalid resize geometry {}x{}",
                params.width, params.height
            )));
        }
        let filter = filter_type(params.filter);
        let blur = params.blur;
        raster.apply("resize", |img| {
            let resized = imageops::resize(img, params.width, params.height, filter);
            // Blur factors away from 1.0 widen or narrow the result.
            if blur > 1.0 {
                imageops::blur(&resized, (blur - 1.0) as f32)
            } else if blur < 1.0 {
                imageops::unsharpen(&resized, (1.0 - blur) as f32, 0)
            } else {
                resized
            }
        })
    }

    fn adaptive_resize(&self, raster: &mut RustRaster, width: u32, height: u32) -> EngineResult<()> {
        if width == 0 || height == 0 {
            return Err(raster.fail(format!("invalid resize geometry {width}x{height}")));
        }
        raster.apply("adaptive resize", |img| {
            imageops::resize(img, width, height, FilterType::CatmullRom)
        })
    }

    fn crop(&self, raster: &mut RustRaster, region: Region) -> EngineResult<()> {
        let img = raster.pixels("crop")?;
        match clip(region, img.width(), img.height()) {
            Some((x0, y0, x1, y1)) => {
                *img = imageops::crop_imm(&*img, x0, y0, x1 - x0, y1 - y0).to_image();
                Ok(())
            }
            None => Err(raster.fail("geometry does not contain image")),
        }
    }

    fn chop(&self, raster: &mut RustRaster, region: Region) -> EngineResult<()> {
        let img = raster.pixels("chop")?;
        let (width, height) = img.dimensions();
        // Columns and rows are clipped independently; a zero extent removes none.
        let (x0, cut_w) = span(region.x, region.width, width);
        let (y0, cut_h) = span(region.y, region.height, height);
        if cut_w == 0 && cut_h == 0 {
            return Err(raster.fail("geometry does not contain image"));
        }
        if cut_w == width || cut_h == height {
            return Err(raster.fail("chop would remove the whole image"));
        }
        let src = img.clone();
        *img = RgbaImage::from_fn(width - cut_w, height - cut_h, |x, y| {
            let sx = if x < x0 { x } else { x + cut_w };
            let sy = if y < y0 { y } else { y + cut_h };
            *src.get_pixel(sx, sy)
        });
        Ok(())
    }

    fn composite_over(
        &self,
        dst: &mut RustRaster,
        src: &RustRaster,
        x: i64,
        y: i64,
    ) -> EngineResult<()> {
        let Some(top) = src.image.as_ref() else {
            return Err(dst.fail("composite: source has no images defined"));
        };
        let bottom = dst.pixels("composite")?;
        imageops::overlay(bottom, top, x, y);
        Ok(())
    }

    fn rotate(&self, raster: &mut RustRaster, background: Color, degrees: f64) -> EngineResult<()> {
        let turn = degrees.rem_euclid(360.0);
        let quarter = (turn / 90.0).round();
        let img = raster.pixels("rotate")?;
        if (turn - quarter * 90.0).abs() < 1e-9 {
            *img = match quarter as u32 % 4 {
                1 => imageops::rotate90(&*img),
                2 => imageops::rotate180(&*img),
                3 => imageops::rotate270(&*img),
                _ => return Ok(()),
            };
        } else {
            *img = rotate_free(&*img, background, degrees);
        }
        Ok(())
    }

    fn flip(&self, raster: &mut RustRaster) -> EngineResult<()> {
        imageops::flip_vertical_in_place(raster.pixels("flip")?);
        Ok(())
    }

    fn flop(&self, raster: &mut RustRaster) -> EngineResult<()> {
        imageops::flip_horizontal_in_place(raster.pixels("flop")?);
        Ok(())
    }

    fn modulate(&self, raster: &mut RustRaster, modulation: Modulation) -> EngineResult<()> {
        raster.apply("modulate", |img| modulate_pixels(img, modulation))
    }

    fn blur(&self, raster: &mut RustRaster, sigma: f64) -> EngineResult<()> {
        raster.apply("blur", |img| imageops::blur(img, sigma as f32))
    }

    fn adaptive_blur(&self, raster: &mut RustRaster, sigma: f64) -> EngineResult<()> {
        raster.apply("adaptive blur", |img| adaptive(img, sigma))
    }

    fn add_noise(&self, raster: &mut RustRaster) -> EngineResult<()> {
        raster.apply("noise", noise)
    }

    fn sigmoidal_contrast(
        &self,
        raster: &mut RustRaster,
        sharpen: bool,
        alpha: f64,
        beta: f64,
    ) -> EngineResult<()> {
        raster.apply("sigmoidal contrast", |img| sigmoidal(img, sharpen, alpha, beta))
    }

    fn contrast(&self, raster: &mut RustRaster, sharpen: bool) -> EngineResult<()> {
        let amount = if sharpen { 12.0 } else { -12.0 };
        raster.apply("contrast", |img| imageops::contrast(img, amount))
    }

    fn sepia_tone(&self, raster: &mut RustRaster, threshold: f64) -> EngineResult<()> {
        raster.apply("sepia", |img| sepia(img, threshold))
    }

    fn sharpen(&self, raster: &mut RustRaster, sharpening: Sharpening) -> EngineResult<()> {
        raster.apply("sharpen", |img| imageops::unsharpen(img, sharpening.sigma as f32, 0))
    }

    fn draw(&self, raster: &mut RustRaster, commands: &[DrawCommand]) -> EngineResult<()> {
        let img = raster.pixels("draw")?;
        render::draw_commands(img, commands).map_err(|e| raster.fail(e))
    }

    fn last_error(&self, raster: &mut RustRaster) -> Option<String> {
        raster.exception.take()
    }
}
