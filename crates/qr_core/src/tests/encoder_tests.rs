use super::*;
use shared::domain::{ColorPalette, QR_MARGIN_MODULES};

fn options(width: u32, level: ErrorCorrectionLevel, dark: &str, light: &str) -> RenderOptions {
    RenderOptions {
        width,
        margin: QR_MARGIN_MODULES,
        error_correction_level: level,
        color: ColorPalette {
            dark: dark.to_string(),
            light: light.to_string(),
        },
    }
}

fn decode(png: &[u8]) -> RgbaImage {
    image::load_from_memory(png).expect("decode png").to_rgba8()
}

#[tokio::test]
async fn renders_png_at_requested_width() {
    let encoded = QrcodeEncoder
        .encode(
            "https://example.com",
            &options(256, ErrorCorrectionLevel::M, "#000000", "#ffffff"),
        )
        .await
        .expect("encode");

    assert_eq!(encoded.width, 256);
    let image = decode(&encoded.png);
    assert_eq!((image.width(), image.height()), (256, 256));
    assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

#[test]
fn applies_palette_colors() {
    let encoded = encode_png(
        "hello",
        &options(200, ErrorCorrectionLevel::L, "#ff0000", "#00ff00"),
    )
    .expect("encode");
    let image = decode(&encoded.png);

    let pixels: Vec<[u8; 4]> = image.pixels().map(|p| p.0).collect();
    assert!(pixels.contains(&[255, 0, 0, 255]));
    assert!(pixels.contains(&[0, 255, 0, 255]));
    assert!(pixels
        .iter()
        .all(|p| *p == [255, 0, 0, 255] || *p == [0, 255, 0, 255]));
}

#[test]
fn finder_pattern_starts_after_margin() {
    let encoded = encode_png(
        "hello",
        &options(1024, ErrorCorrectionLevel::L, "#000000", "#ffffff"),
    )
    .expect("encode");
    let image = decode(&encoded.png);
    let total = encoded.modules as f64 + 2.0;
    let scale = 1024.0 / total;
    // Centre of the first module inside the margin is the finder's dark corner.
    let probe = (scale * 1.5) as u32;
    assert_eq!(image.get_pixel(probe, probe).0, [0, 0, 0, 255]);
}

#[test]
fn rejects_malformed_colors() {
    let err = encode_png(
        "hello",
        &options(256, ErrorCorrectionLevel::M, "black", "#ffffff"),
    )
    .expect_err("bad dark color");
    assert!(matches!(err, EncodeError::InvalidColor { role: "dark", .. }));

    let err = encode_png(
        "hello",
        &options(256, ErrorCorrectionLevel::M, "#000", "#12"),
    )
    .expect_err("bad light color");
    assert!(matches!(err, EncodeError::InvalidColor { role: "light", .. }));
}

#[test]
fn reports_data_too_long_for_level() {
    // Version 40-H holds at most 1273 bytes.
    let text = "x".repeat(1800);
    let err = encode_png(&text, &options(512, ErrorCorrectionLevel::H, "#000", "#fff"))
        .expect_err("too long for H");
    assert_eq!(
        err,
        EncodeError::DataTooLong {
            level: "H".to_string()
        }
    );

    encode_png(&text, &options(512, ErrorCorrectionLevel::L, "#000", "#fff"))
        .expect("fits at L");
}
