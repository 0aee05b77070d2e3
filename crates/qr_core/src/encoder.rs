//! Default encoder: `qrcode` builds the symbol, `image` rasterizes it to PNG.

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use qrcode::{types::QrError, Color, EcLevel, QrCode};
use shared::{
    domain::{parse_hex_color, Rgba8},
    ErrorCorrectionLevel, RenderOptions,
};

use crate::{EncodeError, EncodedImage, QrEncoder};

/// Module scale used when the requested width cannot fit one pixel per module.
const FALLBACK_SCALE: f64 = 4.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct QrcodeEncoder;

#[async_trait]
impl QrEncoder for QrcodeEncoder {
    async fn encode(
        &self,
        text: &str,
        options: &RenderOptions,
    ) -> Result<EncodedImage, EncodeError> {
        let text = text.to_string();
        let options = options.clone();
        tokio::task::spawn_blocking(move || encode_png(&text, &options))
            .await
            .map_err(|err| EncodeError::Worker(err.to_string()))?
    }
}

fn ec_level(level: ErrorCorrectionLevel) -> EcLevel {
    match level {
        ErrorCorrectionLevel::L => EcLevel::L,
        ErrorCorrectionLevel::M => EcLevel::M,
        ErrorCorrectionLevel::Q => EcLevel::Q,
        ErrorCorrectionLevel::H => EcLevel::H,
    }
}

fn palette_color(role: &'static str, value: &str) -> Result<Rgba8, EncodeError> {
    parse_hex_color(value).ok_or_else(|| EncodeError::InvalidColor {
        role,
        value: value.to_string(),
    })
}

/// Synchronous encode used by [`QrcodeEncoder`].
pub fn encode_png(text: &str, options: &RenderOptions) -> Result<EncodedImage, EncodeError> {
    let dark = palette_color("dark", &options.color.dark)?;
    let light = palette_color("light", &options.color.light)?;

    let level = ec_level(options.error_correction_level);
    let code = QrCode::with_error_correction_level(text.as_bytes(), level).map_err(|err| match err {
        QrError::DataTooLong => EncodeError::DataTooLong {
            level: options.error_correction_level.to_string(),
        },
        other => EncodeError::Symbol(other.to_string()),
    })?;

    let image = rasterize(&code, options.width, options.margin, dark, light);
    let edge = image.width();
    let png = encode_rgba_png(image)?;
    Ok(EncodedImage {
        png,
        width: edge,
        modules: code.width(),
    })
}

/// Scales the symbol plus margin to exactly `width` pixels when it fits,
/// using a fractional module size; otherwise falls back to 4 px per module.
fn rasterize(code: &QrCode, width: u32, margin: u32, dark: Rgba8, light: Rgba8) -> RgbaImage {
    let modules = code.width();
    let colors = code.to_colors();
    let total = modules as u32 + margin * 2;

    let (scale, edge) = if width >= total {
        (width as f64 / total as f64, width)
    } else {
        (FALLBACK_SCALE, (total as f64 * FALLBACK_SCALE) as u32)
    };
    let scaled_margin = margin as f64 * scale;
    let inner_end = edge as f64 - scaled_margin;

    let mut image = RgbaImage::from_pixel(edge, edge, Rgba(light.0));
    for y in 0..edge {
        let fy = y as f64;
        if fy < scaled_margin || fy >= inner_end {
            continue;
        }
        let src_y = (((fy - scaled_margin) / scale) as usize).min(modules - 1);
        for x in 0..edge {
            let fx = x as f64;
            if fx < scaled_margin || fx >= inner_end {
                continue;
            }
            let src_x = (((fx - scaled_margin) / scale) as usize).min(modules - 1);
            if colors[src_y * modules + src_x] == Color::Dark {
                image.put_pixel(x, y, Rgba(dark.0));
            }
        }
    }
    image
}

fn encode_rgba_png(image: RgbaImage) -> Result<Vec<u8>, EncodeError> {
    let dynamic = image::DynamicImage::ImageRgba8(image);
    let mut out = std::io::Cursor::new(Vec::new());
    dynamic
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|err| EncodeError::Png(err.to_string()))?;
    Ok(out.into_inner())
}

#[cfg(test)]
#[path = "tests/encoder_tests.rs"]
mod tests;
