//! # Pipeline Tests
//!
//! End-to-end conversions through the public API: real encoded images in,
//! ZPL text out, parsed back with the graphic field decoder.

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use std::io::Cursor;
use std::path::Path;

use zplgfa::pipeline::{self, ConvertOptions, Pipeline, Stage};
use zplgfa::protocol::graphic_field::{self, GraphicEncoding};
use zplgfa::raster::{ResampleFilter, Rotation};
use zplgfa::{PrinterConfig, ZplError};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn encode_png(image: DynamicImage) -> Vec<u8> {
    let mut out = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

/// Black and white squares of `cell` pixels, black in the top-left corner.
fn checkerboard(width: u32, height: u32, cell: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Luma([0])
        } else {
            Luma([255])
        }
    }))
}

fn options(source_dpi: f64, target_dpi: f64) -> ConvertOptions {
    ConvertOptions {
        source_dpi,
        target_dpi,
        rotation: Rotation::None,
        ..ConvertOptions::default()
    }
}

// ============================================================================
// SCALING
// ============================================================================

#[test]
fn test_checkerboard_100_to_300_dpi() {
    let png = encode_png(checkerboard(100, 100, 1));

    let conversion = pipeline::convert_bytes(&png, &options(100.0, 300.0)).unwrap();

    assert_eq!((conversion.width, conversion.height), (300, 300));
    let header = conversion.field.header();
    assert_eq!(header.bytes_per_row, 38);
    assert_eq!(header.total_bytes, 300usize.div_ceil(8) as u32 * 300);

    let parsed = graphic_field::parse(&conversion.zpl).unwrap();
    assert_eq!(parsed.header, header);
    assert_eq!(parsed.bytes.len(), 11400);
}

#[test]
fn test_nearest_upscale_keeps_cells() {
    let png = encode_png(checkerboard(32, 32, 8));
    let opts = ConvertOptions {
        filter: ResampleFilter::Nearest,
        ..options(100.0, 200.0)
    };

    let conversion = pipeline::convert_bytes(&png, &opts).unwrap();
    let bitmap = graphic_field::parse(&conversion.zpl)
        .unwrap()
        .to_bitmap()
        .unwrap();

    // Cells are now 16 dots; sample their centres
    for cy in 0..4 {
        for cx in 0..4 {
            let black = (cx + cy) % 2 == 0;
            assert_eq!(bitmap.get(cx * 16 + 8, cy * 16 + 8), black, "cell {},{}", cx, cy);
        }
    }
}

#[test]
fn test_default_rotation_turns_landscape_into_portrait() {
    let png = encode_png(checkerboard(60, 20, 4));

    let conversion = pipeline::convert_bytes(
        &png,
        &ConvertOptions {
            source_dpi: 200.0,
            target_dpi: 300.0,
            ..ConvertOptions::default()
        },
    )
    .unwrap();

    assert_eq!((conversion.width, conversion.height), (30, 90));
}

#[test]
fn test_printer_preset_sets_target_dpi() {
    let png = encode_png(checkerboard(406, 10, 2));
    let opts = options(406.0, 1.0).for_printer(&PrinterConfig::ZEBRA_203);

    let conversion = pipeline::convert_bytes(&png, &opts).unwrap();
    assert_eq!((conversion.width, conversion.height), (203, 5));
}

// ============================================================================
// FLATTENING AND ENCODING
// ============================================================================

#[test]
fn test_transparent_image_is_white() {
    let png = encode_png(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        24,
        4,
        Rgba([0, 0, 0, 0]),
    )));

    let conversion = pipeline::convert_bytes(&png, &options(300.0, 300.0)).unwrap();
    assert_eq!(conversion.zpl, "^GFA,12,12,3,,:::^FS");
}

#[test]
fn test_encodings_carry_the_same_bitmap() {
    let png = encode_png(checkerboard(37, 23, 3));

    let decoded: Vec<(GraphicEncoding, Vec<u8>)> =
        [GraphicEncoding::Hex, GraphicEncoding::CompressedHex, GraphicEncoding::Z64]
            .into_iter()
            .map(|encoding| {
                let opts = ConvertOptions {
                    encoding,
                    ..options(300.0, 300.0)
                };
                let conversion = pipeline::convert_bytes(&png, &opts).unwrap();
                assert_eq!(conversion.field.encoding(), encoding);
                (encoding, graphic_field::parse(&conversion.zpl).unwrap().bytes)
            })
            .collect();

    assert_eq!(decoded[0].1.len(), 5 * 23);
    assert_eq!(decoded[0].1, decoded[1].1);
    assert_eq!(decoded[0].1, decoded[2].1);
}

#[test]
fn test_label_output_parses() {
    let png = encode_png(checkerboard(16, 16, 4));
    let opts = ConvertOptions {
        label: true,
        origin_x: 30,
        origin_y: 40,
        ..options(203.0, 203.0)
    };

    let conversion = pipeline::convert_bytes(&png, &opts).unwrap();

    assert!(conversion.zpl.starts_with("^XA\n^FO30,40^GFA,32,32,2,"));
    assert!(conversion.zpl.ends_with("^FS\n^XZ\n"));
    let bitmap = graphic_field::parse(&conversion.zpl)
        .unwrap()
        .to_bitmap()
        .unwrap();
    assert!(bitmap.get(0, 0));
    assert!(!bitmap.get(4, 0));
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_corrupt_input_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.png");
    let output = dir.path().join("broken.zpl");

    // A PNG signature followed by garbage
    let mut bytes = encode_png(checkerboard(8, 8, 1));
    bytes.truncate(20);
    std::fs::write(&input, &bytes).unwrap();

    let err = pipeline::convert_file(&input, &output, &options(200.0, 300.0)).unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Decoding));
    assert!(matches!(err.root_cause(), ZplError::UnsupportedOrCorruptImage(_)));
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_invalid_dpi_fails_before_reading_input() {
    let missing = Path::new("/nonexistent/zplgfa/input.png");
    let output = Path::new("/nonexistent/zplgfa/output.zpl");

    for (source, target) in [(0.0, 300.0), (200.0, -5.0), (f64::NAN, 300.0), (200.0, f64::INFINITY)] {
        let err = pipeline::convert_file(missing, output, &options(source, target)).unwrap_err();
        assert!(matches!(err, ZplError::InvalidDpi(_)), "{:?}", err);
    }
}

#[test]
fn test_unwritable_output_aborts_in_emitting() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    std::fs::write(&input, encode_png(checkerboard(8, 8, 1))).unwrap();
    let output = dir.path().join("no-such-dir").join("out.zpl");

    let mut pipeline = Pipeline::new(options(200.0, 200.0)).unwrap();
    let err = pipeline.run_file(&input, &output).unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Emitting));
    assert!(matches!(err.root_cause(), ZplError::Io(_)));
    assert_eq!(pipeline.stage(), Stage::Aborted);
    assert!(!output.exists());
}
