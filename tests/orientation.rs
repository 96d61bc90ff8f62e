//! Orientation normalization checked against the `image` crate's own
//! EXIF orientation handling.

mod common;

use common::{decode_rgba, gradient, jpeg_with_orientation, png_bytes};
use image::DynamicImage;
use image::metadata::Orientation as ExifOrientation;
use raster_canvas::{Canvas, CanvasError, Orientation};
use tempfile::TempDir;

fn oriented_canvas(code: u8) -> Canvas {
    let mut canvas = Canvas::new();
    canvas.open_blob(&png_bytes(&gradient(6, 4))).unwrap();
    canvas.set_metadata("exif:Orientation", &code.to_string()).unwrap();
    canvas
}

#[test]
fn every_code_matches_reference_correction() {
    for code in 1..=8u8 {
        let mut canvas = oriented_canvas(code);
        canvas.auto_orientate().unwrap();
        assert_eq!(canvas.orientation().unwrap(), Some(Orientation::TopLeft));

        let mut expected = DynamicImage::ImageRgba8(gradient(6, 4));
        expected.apply_orientation(ExifOrientation::from_exif(code).unwrap());

        let actual = decode_rgba(&canvas.blob().unwrap());
        assert_eq!(actual, expected.to_rgba8(), "orientation code {code}");
    }
}

#[test]
fn second_pass_is_a_no_op() {
    for code in 1..=8u8 {
        let mut canvas = oriented_canvas(code);
        canvas.auto_orientate().unwrap();
        let once = canvas.raster().unwrap().image().unwrap().clone();

        canvas.auto_orientate().unwrap();
        assert_eq!(canvas.raster().unwrap().image().unwrap(), &once, "code {code}");
        assert_eq!(
            canvas.metadata().unwrap().get("exif:Orientation").map(String::as_str),
            Some("1")
        );
    }
}

#[test]
fn missing_tag_fails_without_touching_pixels() {
    let mut canvas = Canvas::new();
    canvas.open_blob(&png_bytes(&gradient(6, 4))).unwrap();
    let before = canvas.raster().unwrap().image().unwrap().clone();

    assert!(matches!(canvas.auto_orientate(), Err(CanvasError::NoOrientationData)));
    assert_eq!(canvas.raster().unwrap().image().unwrap(), &before);
}

#[test]
fn unparsable_tag_is_treated_as_missing() {
    let mut canvas = Canvas::new();
    canvas.open_blob(&png_bytes(&gradient(6, 4))).unwrap();
    canvas.set_metadata("exif:Orientation", "upside down").unwrap();
    assert!(matches!(canvas.auto_orientate(), Err(CanvasError::NoOrientationData)));
}

#[test]
fn exif_tag_from_jpeg_file_is_honored() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("portrait.jpg");
    std::fs::write(&path, jpeg_with_orientation(40, 20, 6)).unwrap();

    let mut canvas = Canvas::new();
    canvas.open(&path).unwrap();
    assert_eq!(canvas.orientation().unwrap(), Some(Orientation::RightTop));

    canvas.auto_orientate().unwrap();
    assert_eq!(canvas.dimensions().unwrap(), (20, 40));
    assert_eq!(canvas.orientation().unwrap(), Some(Orientation::TopLeft));
}
