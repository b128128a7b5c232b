use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use qrcode::{EcLevel, QrCode};

use super::RenderError;
use super::color::{lerp, parse_hex_color};
use super::logo::{decode_logo, overlay_logo};
use super::shapes::{ModuleGrid, ShapeStyle, is_inked};
use crate::models::customization::{
    CornerDotStyle, CornerSquareStyle, Customization, DEFAULT_LOGO_SIZE, DotStyle, GradientType,
};

pub const STYLED_SIZE: u32 = 800;
pub const PLAIN_SIZE: u32 = 400;
/// Quiet zone, in modules.
pub const MARGIN: u32 = 2;
const SUPERSAMPLE: u32 = 2;
const DATA_URI_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gradient {
    /// Top-left to bottom-right.
    Linear { start: Rgba<u8>, end: Rgba<u8> },
    /// Center outwards.
    Radial { start: Rgba<u8>, end: Rgba<u8> },
}

impl Gradient {
    fn color_at(&self, x: u32, y: u32, side: u32) -> Rgba<u8> {
        let max = side.saturating_sub(1).max(1) as f32;
        match *self {
            Gradient::Linear { start, end } => lerp(start, end, (x + y) as f32 / (2.0 * max)),
            Gradient::Radial { start, end } => {
                let c = max / 2.0;
                let d = (x as f32 - c).hypot(y as f32 - c);
                lerp(start, end, d / c.hypot(c))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub dot_style: DotStyle,
    pub corner_square_style: CornerSquareStyle,
    pub corner_dot_style: CornerDotStyle,
    pub background: Rgba<u8>,
    pub foreground: Rgba<u8>,
    pub gradient: Option<Gradient>,
    /// Raw logo payload. Decoded during rendering; a bad payload is skipped.
    pub logo: Option<String>,
    pub logo_size: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dot_style: DotStyle::Square,
            corner_square_style: CornerSquareStyle::Square,
            corner_dot_style: CornerDotStyle::Square,
            background: Rgba([255, 255, 255, 255]),
            foreground: Rgba([0, 0, 0, 255]),
            gradient: None,
            logo: None,
            logo_size: DEFAULT_LOGO_SIZE as f32,
        }
    }
}

impl RenderOptions {
    pub fn from_customization(
        customization: &Customization,
        logo: Option<String>,
    ) -> Result<Self, RenderError> {
        let color = |value: &str| {
            parse_hex_color(value)
                .ok_or_else(|| RenderError::Render(format!("invalid color '{}'", value)))
        };

        let start = color(&customization.gradient_start_color)?;
        let end = color(&customization.gradient_end_color)?;
        let gradient = match customization.gradient_type {
            GradientType::None => None,
            GradientType::Linear => Some(Gradient::Linear { start, end }),
            GradientType::Radial => Some(Gradient::Radial { start, end }),
        };

        Ok(Self {
            dot_style: customization.dot_style,
            corner_square_style: customization.corner_square_style,
            corner_dot_style: customization.corner_dot_style,
            background: color(&customization.background_color)?,
            foreground: color(&customization.foreground_color)?,
            gradient,
            logo,
            logo_size: customization.logo_size as f32,
        })
    }

    /// No shapes, gradient or logo requested.
    pub fn is_plain(&self) -> bool {
        self.dot_style == DotStyle::Square
            && self.corner_square_style == CornerSquareStyle::Square
            && self.corner_dot_style == CornerDotStyle::Square
            && self.gradient.is_none()
            && self.logo.is_none()
    }

    fn shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            dot: self.dot_style,
            corner_square: self.corner_square_style,
            corner_dot: self.corner_dot_style,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQr {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RenderedQr {
    pub fn to_data_uri(&self) -> String {
        format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(&self.png))
    }
}

/// PNG bytes of a data URI produced by [`RenderedQr::to_data_uri`].
pub fn png_from_data_uri(uri: &str) -> Option<Vec<u8>> {
    let encoded = uri.strip_prefix(DATA_URI_PREFIX)?;
    STANDARD.decode(encoded).ok()
}

/// Render `data` as a QR image. Pure: the same input always gives the same
/// output.
pub fn render_qr(data: &str, options: &RenderOptions) -> Result<RenderedQr, RenderError> {
    if data.trim().is_empty() {
        return Err(RenderError::Encoding("nothing to encode".to_string()));
    }

    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H)
        .map_err(|e| RenderError::Encoding(e.to_string()))?;
    let grid = ModuleGrid::from_code(&code);

    let canvas = if options.is_plain() {
        rasterize_plain(&grid, options)
    } else {
        let mut canvas = rasterize_styled(&grid, options);
        if let Some(payload) = &options.logo {
            match decode_logo(payload) {
                Ok(logo) => overlay_logo(&mut canvas, &logo, options.logo_size, options.background),
                Err(e) => log::warn!("Rendering QR without logo: {}", e),
            }
        }
        canvas
    };

    encode_png(canvas)
}

fn rasterize_plain(grid: &ModuleGrid, options: &RenderOptions) -> RgbaImage {
    let side = PLAIN_SIZE as u64;
    let total = (grid.width() as u32 + 2 * MARGIN) as u64;
    let module = |p: u32| (p as u64 * total / side) as i32 - MARGIN as i32;

    RgbaImage::from_fn(PLAIN_SIZE, PLAIN_SIZE, |x, y| {
        if grid.is_dark(module(x), module(y)) {
            options.foreground
        } else {
            options.background
        }
    })
}

fn rasterize_styled(grid: &ModuleGrid, options: &RenderOptions) -> RgbaImage {
    let side = STYLED_SIZE;
    let module_px = side as f32 / (grid.width() as f32 + 2.0 * MARGIN as f32);
    let style = options.shape_style();
    let samples = (SUPERSAMPLE * SUPERSAMPLE) as f32;
    let step = 1.0 / SUPERSAMPLE as f32;

    RgbaImage::from_fn(side, side, |x, y| {
        let mut hits = 0u32;
        for sy in 0..SUPERSAMPLE {
            for sx in 0..SUPERSAMPLE {
                let px = x as f32 + (sx as f32 + 0.5) * step;
                let py = y as f32 + (sy as f32 + 0.5) * step;
                let fx = px / module_px - MARGIN as f32;
                let fy = py / module_px - MARGIN as f32;
                if is_inked(grid, &style, fx, fy) {
                    hits += 1;
                }
            }
        }
        if hits == 0 {
            return options.background;
        }

        // Gradient only ever paints over ink.
        let ink = match &options.gradient {
            Some(gradient) => gradient.color_at(x, y, side),
            None => options.foreground,
        };
        lerp(options.background, ink, hits as f32 / samples)
    })
}

fn encode_png(canvas: RgbaImage) -> Result<RenderedQr, RenderError> {
    let (width, height) = canvas.dimensions();
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| RenderError::Render(e.to_string()))?;
    Ok(RenderedQr { png, width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:5000/track/0123456789ab";

    fn decode(qr: &RenderedQr) -> RgbaImage {
        image::load_from_memory(&qr.png).unwrap().to_rgba8()
    }

    fn grid() -> ModuleGrid {
        ModuleGrid::from_code(&QrCode::with_error_correction_level(URL, EcLevel::H).unwrap())
    }

    fn module_center(module: u32, module_px: f32) -> u32 {
        ((module + MARGIN) as f32 * module_px + module_px / 2.0) as u32
    }

    fn logo_payload(color: Rgba<u8>) -> String {
        let img = RgbaImage::from_pixel(32, 32, color);
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn empty_data_is_an_encoding_error() {
        let err = render_qr("", &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::Encoding(_)));
        let err = render_qr("   ", &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::Encoding(_)));
    }

    #[test]
    fn oversized_data_is_an_encoding_error() {
        let data = "x".repeat(4000);
        let err = render_qr(&data, &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::Encoding(_)));
    }

    #[test]
    fn plain_render_is_byte_identical() {
        let options = RenderOptions::default();
        assert!(options.is_plain());
        let first = render_qr(URL, &options).unwrap();
        let second = render_qr(URL, &options).unwrap();
        assert_eq!(first.png, second.png);
        assert_eq!((first.width, first.height), (PLAIN_SIZE, PLAIN_SIZE));
    }

    #[test]
    fn plain_render_uses_requested_colors() {
        let options = RenderOptions {
            foreground: Rgba([10, 20, 30, 255]),
            background: Rgba([250, 240, 230, 255]),
            ..Default::default()
        };
        assert!(options.is_plain());
        let img = decode(&render_qr(URL, &options).unwrap());
        let module_px = PLAIN_SIZE as f32 / (grid().width() as u32 + 2 * MARGIN) as f32;

        assert_eq!(img.get_pixel(0, 0), &options.background);
        let c = module_center(0, module_px);
        assert_eq!(img.get_pixel(c, c), &options.foreground);
    }

    const CORNER_PAIRS: [(CornerSquareStyle, CornerDotStyle); 8] = [
        (CornerSquareStyle::Square, CornerDotStyle::Square),
        (CornerSquareStyle::Square, CornerDotStyle::Dot),
        (CornerSquareStyle::Rounded, CornerDotStyle::Square),
        (CornerSquareStyle::Rounded, CornerDotStyle::Dot),
        (CornerSquareStyle::ExtraRounded, CornerDotStyle::Square),
        (CornerSquareStyle::ExtraRounded, CornerDotStyle::Dot),
        (CornerSquareStyle::Dot, CornerDotStyle::Square),
        (CornerSquareStyle::Dot, CornerDotStyle::Dot),
    ];

    /// Every QR payload a decoder finds in the image.
    fn scan(qr: &RenderedQr) -> Vec<String> {
        let luma = image::load_from_memory(&qr.png).unwrap().to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            luma.width() as usize,
            luma.height() as usize,
            |x, y| luma.get_pixel(x as u32, y as u32).0[0],
        );
        prepared
            .detect_grids()
            .into_iter()
            .filter_map(|grid| grid.decode().ok())
            .map(|(_, content)| content)
            .collect()
    }

    #[test]
    fn styled_render_keeps_module_states() {
        let grid = grid();
        let module_px = STYLED_SIZE as f32 / (grid.width() as u32 + 2 * MARGIN) as f32;

        for (corner_square_style, corner_dot_style) in CORNER_PAIRS {
            let options = RenderOptions {
                dot_style: DotStyle::Dots,
                corner_square_style,
                corner_dot_style,
                ..Default::default()
            };
            let img = decode(&render_qr(URL, &options).unwrap());
            assert_eq!(img.dimensions(), (STYLED_SIZE, STYLED_SIZE));

            for my in 0..grid.width() {
                for mx in 0..grid.width() {
                    let px = img.get_pixel(
                        module_center(mx as u32, module_px),
                        module_center(my as u32, module_px),
                    );
                    let expected = if grid.is_dark(mx, my) {
                        options.foreground
                    } else {
                        options.background
                    };
                    assert_eq!(
                        px, &expected,
                        "{:?}/{:?} module ({}, {})",
                        corner_square_style, corner_dot_style, mx, my
                    );
                }
            }
        }
    }

    #[test]
    fn plain_render_scans() {
        let qr = render_qr(URL, &RenderOptions::default()).unwrap();
        assert_eq!(scan(&qr), vec![URL.to_string()]);
    }

    #[test]
    fn every_dot_style_scans() {
        for dot_style in [
            DotStyle::Square,
            DotStyle::Rounded,
            DotStyle::Dots,
            DotStyle::Classy,
            DotStyle::ClassyRounded,
        ] {
            let options = RenderOptions {
                dot_style,
                gradient: Some(Gradient::Linear {
                    start: Rgba([0, 0, 0, 255]),
                    end: Rgba([40, 40, 120, 255]),
                }),
                ..Default::default()
            };
            let qr = render_qr(URL, &options).unwrap();
            assert_eq!(scan(&qr), vec![URL.to_string()], "{:?}", dot_style);
        }
    }

    #[test]
    fn every_corner_style_scans() {
        for (corner_square_style, corner_dot_style) in CORNER_PAIRS {
            let options = RenderOptions {
                dot_style: DotStyle::Rounded,
                corner_square_style,
                corner_dot_style,
                ..Default::default()
            };
            let qr = render_qr(URL, &options).unwrap();
            assert_eq!(
                scan(&qr),
                vec![URL.to_string()],
                "{:?}/{:?}",
                corner_square_style,
                corner_dot_style
            );
        }
    }

    #[test]
    fn render_with_logo_scans() {
        let options = RenderOptions {
            dot_style: DotStyle::ClassyRounded,
            corner_square_style: CornerSquareStyle::ExtraRounded,
            corner_dot_style: CornerDotStyle::Dot,
            logo: Some(logo_payload(Rgba([200, 30, 30, 255]))),
            logo_size: 0.2,
            ..Default::default()
        };
        let qr = render_qr(URL, &options).unwrap();
        assert_eq!(scan(&qr), vec![URL.to_string()]);
    }

    #[test]
    fn gradient_paints_only_ink() {
        let red = Rgba([255, 0, 0, 255]);
        let blue = Rgba([0, 0, 255, 255]);
        let options = RenderOptions {
            gradient: Some(Gradient::Linear { start: red, end: blue }),
            ..Default::default()
        };
        let img = decode(&render_qr(URL, &options).unwrap());
        let module_px = STYLED_SIZE as f32 / (grid().width() as u32 + 2 * MARGIN) as f32;

        // quiet zone untouched
        assert_eq!(img.get_pixel(0, 0), &options.background);
        assert_eq!(img.get_pixel(STYLED_SIZE - 1, STYLED_SIZE - 1), &options.background);

        // top-left finder sits near the start of the gradient
        let c = module_center(0, module_px);
        let px = img.get_pixel(c, c);
        assert!(px.0[0] > 200 && px.0[2] < 60, "{:?}", px);
    }

    #[test]
    fn radial_gradient_starts_in_the_center() {
        let g = Gradient::Radial {
            start: Rgba([0, 0, 0, 255]),
            end: Rgba([255, 255, 255, 255]),
        };
        assert_eq!(g.color_at(400, 400, 801), Rgba([0, 0, 0, 255]));
        assert_eq!(g.color_at(0, 0, 801), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn corrupt_logo_falls_back_to_the_image_without_logo() {
        let styled = RenderOptions {
            dot_style: DotStyle::Rounded,
            ..Default::default()
        };
        let with_bad_logo = RenderOptions {
            logo: Some("data:image/png;base64,@@@not-an-image@@@".to_string()),
            ..styled.clone()
        };

        let expected = render_qr(URL, &styled).unwrap();
        let rendered = render_qr(URL, &with_bad_logo).unwrap();
        assert_eq!(rendered.png, expected.png);
    }

    #[test]
    fn logo_sits_on_a_background_disc() {
        let options = RenderOptions {
            logo: Some(logo_payload(Rgba([0, 200, 0, 255]))),
            logo_size: 0.2,
            ..Default::default()
        };
        assert!(!options.is_plain());
        let img = decode(&render_qr(URL, &options).unwrap());
        let mid = STYLED_SIZE / 2;

        let center = img.get_pixel(mid, mid);
        assert!(center.0[1] > 180 && center.0[0] < 30, "{:?}", center);
        // 160 px logo, backing reaches 90 px from the center
        assert_eq!(img.get_pixel(mid + 85, mid), &options.background);
        assert_eq!(img.get_pixel(mid, mid - 85), &options.background);
    }

    #[test]
    fn data_uri_round_trip() {
        let qr = render_qr(URL, &RenderOptions::default()).unwrap();
        let uri = qr.to_data_uri();
        assert!(uri.starts_with(DATA_URI_PREFIX));
        assert_eq!(png_from_data_uri(&uri), Some(qr.png));
        assert_eq!(png_from_data_uri("data:image/svg+xml;base64,AAAA"), None);
    }

    #[test]
    fn options_follow_customization() {
        let customization = Customization {
            gradient_type: GradientType::Radial,
            gradient_start_color: "#FF0000".into(),
            gradient_end_color: "#0000FF".into(),
            ..Default::default()
        };
        let options = RenderOptions::from_customization(&customization, None).unwrap();
        assert_eq!(
            options.gradient,
            Some(Gradient::Radial {
                start: Rgba([255, 0, 0, 255]),
                end: Rgba([0, 0, 255, 255]),
            })
        );
        assert!(!options.is_plain());

        let plain = RenderOptions::from_customization(&Customization::default(), None).unwrap();
        assert!(plain.is_plain());
    }
}
