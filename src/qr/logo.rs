use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::models::customization::{MAX_LOGO_SIZE, MIN_LOGO_SIZE};

/// Gap between the logo and the edge of its backing circle, in pixels.
pub(crate) const LOGO_PADDING: f32 = 10.0;

/// Decode a logo sent as a data URI or as bare base64.
pub(crate) fn decode_logo(payload: &str) -> Result<DynamicImage, String> {
    let encoded = match payload.split_once(',') {
        Some((header, data)) if header.starts_with("data:") => data,
        _ => payload,
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| format!("logo is not valid base64: {}", e))?;
    image::load_from_memory(&bytes).map_err(|e| format!("logo could not be decoded: {}", e))
}

pub(crate) fn logo_side(canvas_side: u32, ratio: f32) -> u32 {
    let ratio = ratio.clamp(MIN_LOGO_SIZE as f32, MAX_LOGO_SIZE as f32);
    ((canvas_side as f32) * ratio).round().max(1.0) as u32
}

/// Paint an opaque backing circle in the center of the canvas and place the
/// logo on top of it.
pub(crate) fn overlay_logo(canvas: &mut RgbaImage, logo: &DynamicImage, ratio: f32, backing: Rgba<u8>) {
    let side = canvas.width().min(canvas.height());
    let target = logo_side(side, ratio);
    let resized = logo.resize(target, target, FilterType::Lanczos3).to_rgba8();

    let center = side as f32 / 2.0;
    let radius = target as f32 / 2.0 + LOGO_PADDING;
    let backing = Rgba([backing.0[0], backing.0[1], backing.0[2], 255]);

    let lo = (center - radius).floor().max(0.0) as u32;
    let hi = ((center + radius).ceil() as u32).min(side);
    for y in lo..hi {
        for x in lo..hi {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            if dx * dx + dy * dy <= radius * radius {
                canvas.put_pixel(x, y, backing);
            }
        }
    }

    let x = (side - resized.width()) / 2;
    let y = (side - resized.height()) / 2;
    imageops::overlay(canvas, &resized, x as i64, y as i64);
}
