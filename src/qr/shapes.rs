use qrcode::{Color, QrCode};

use crate::models::customization::{CornerDotStyle, CornerSquareStyle, DotStyle};

const FINDER: f32 = 7.0;
// Round enough to read as a circle, square enough to keep the corner modules.
const RING_EXPONENT: i32 = 6;
const CENTER_EXPONENT: i32 = 4;

/// Dark/light state of every module in a symbol.
pub(crate) struct ModuleGrid {
    width: i32,
    dark: Vec<bool>,
}

impl ModuleGrid {
    pub(crate) fn from_code(code: &QrCode) -> Self {
        Self {
            width: code.width() as i32,
            dark: code.to_colors().into_iter().map(|c| c == Color::Dark).collect(),
        }
    }

    pub(crate) fn width(&self) -> i32 {
        self.width
    }

    /// Out-of-range coordinates read as light.
    pub(crate) fn is_dark(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width || y >= self.width {
            return false;
        }
        self.dark[(y * self.width + x) as usize]
    }

    /// Top-left corner of the finder pattern covering `(fx, fy)`, if any.
    fn finder_origin(&self, fx: f32, fy: f32) -> Option<(f32, f32)> {
        let far = (self.width as f32) - FINDER;
        let near = |v: f32| v < FINDER;
        let high = |v: f32| v >= far;
        if near(fx) && near(fy) {
            Some((0.0, 0.0))
        } else if high(fx) && near(fy) {
            Some((far, 0.0))
        } else if near(fx) && high(fy) {
            Some((0.0, far))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ShapeStyle {
    pub dot: DotStyle,
    pub corner_square: CornerSquareStyle,
    pub corner_dot: CornerDotStyle,
}

/// Whether the point `(fx, fy)`, in module units, is covered by ink.
/// Ink never leaves the box of a dark module, so light modules stay light.
pub(crate) fn is_inked(grid: &ModuleGrid, style: &ShapeStyle, fx: f32, fy: f32) -> bool {
    let w = grid.width() as f32;
    if fx < 0.0 || fy < 0.0 || fx >= w || fy >= w {
        return false;
    }

    if let Some((ox, oy)) = grid.finder_origin(fx, fy) {
        return finder_inked(style, fx - ox, fy - oy);
    }

    let mx = fx.floor() as i32;
    let my = fy.floor() as i32;
    if !grid.is_dark(mx, my) {
        return false;
    }
    dot_inked(style.dot, grid, mx, my, fx - mx as f32, fy - my as f32)
}

/// Finder pattern: 7x7 ring with a 3x3 center, drawn as one shape so the
/// corner styles can round it as a whole. Every ring and center module keeps
/// its center inked and every separator module keeps its center clear, so
/// the rounding stays within what a decoder tolerates.
fn finder_inked(style: &ShapeStyle, lx: f32, ly: f32) -> bool {
    let px = lx - FINDER / 2.0;
    let py = ly - FINDER / 2.0;

    let ring = match style.corner_square {
        CornerSquareStyle::Square => rounded_ring(px, py, 0.0, 0.0),
        CornerSquareStyle::Rounded => rounded_ring(px, py, 0.75, 0.25),
        CornerSquareStyle::ExtraRounded => rounded_ring(px, py, 1.25, 0.75),
        CornerSquareStyle::Dot => {
            superellipse(px, py, 3.5, RING_EXPONENT) <= 1.0
                && superellipse(px, py, 2.5, RING_EXPONENT) > 1.0
        }
    };

    let center = match style.corner_dot {
        CornerDotStyle::Square => rounded_box(px, py, 1.5, 0.0) <= 0.0,
        CornerDotStyle::Dot => superellipse(px, py, 1.5, CENTER_EXPONENT) <= 1.0,
    };

    ring || center
}

fn rounded_ring(px: f32, py: f32, outer_r: f32, inner_r: f32) -> bool {
    rounded_box(px, py, 3.5, outer_r) <= 0.0 && rounded_box(px, py, 2.5, inner_r) > 0.0
}

/// `|x/half|^n + |y/half|^n`, at most 1 inside the curve.
fn superellipse(px: f32, py: f32, half: f32, n: i32) -> f32 {
    (px.abs() / half).powi(n) + (py.abs() / half).powi(n)
}

/// Shape of a single dark module, `u`/`v` in [0, 1) within the module.
fn dot_inked(style: DotStyle, grid: &ModuleGrid, mx: i32, my: i32, u: f32, v: f32) -> bool {
    if style == DotStyle::Square {
        return true;
    }
    if style == DotStyle::Dots {
        return (u - 0.5).powi(2) + (v - 0.5).powi(2) <= 0.25;
    }

    let dx = if u < 0.5 { -1 } else { 1 };
    let dy = if v < 0.5 { -1 } else { 1 };
    // Corners touching a dark neighbour stay square so runs read as one shape.
    let exposed = !grid.is_dark(mx + dx, my) && !grid.is_dark(mx, my + dy);
    if !exposed {
        return true;
    }

    let leading_diagonal = dx == dy; // top-left or bottom-right
    let radius = match style {
        DotStyle::Rounded => 0.5,
        DotStyle::Classy if leading_diagonal => 0.5,
        DotStyle::Classy => 0.0,
        DotStyle::ClassyRounded if leading_diagonal => 0.5,
        DotStyle::ClassyRounded => 0.25,
        DotStyle::Square | DotStyle::Dots => 0.0,
    };
    corner_inked(u, v, radius)
}

fn corner_inked(u: f32, v: f32, r: f32) -> bool {
    if r <= 0.0 {
        return true;
    }
    let du = if u < 0.5 { u } else { 1.0 - u };
    let dv = if v < 0.5 { v } else { 1.0 - v };
    if du >= r || dv >= r {
        return true;
    }
    (r - du).powi(2) + (r - dv).powi(2) <= r * r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ModuleGrid {
        let code = QrCode::with_error_correction_level(b"https://example.com", qrcode::EcLevel::H)
            .unwrap();
        ModuleGrid::from_code(&code)
    }

    #[test]
    fn grid_reports_finder_modules_as_dark() {
        let grid = grid();
        assert!(grid.is_dark(0, 0));
        assert!(grid.is_dark(6, 6));
        assert!(!grid.is_dark(1, 1));
        assert!(!grid.is_dark(-1, 0));
        assert!(!grid.is_dark(grid.width(), 0));
    }

    #[test]
    fn rounded_box_distance() {
        assert!(rounded_box(0.0, 0.0, 1.0, 0.0) < 0.0);
        assert!((rounded_box(2.0, 0.0, 1.0, 0.0) - 1.0).abs() < 1e-6);
        // the rounded corner cuts off the box corner
        assert!(rounded_box(0.95, 0.95, 1.0, 0.5) > 0.0);
        assert!(rounded_box(0.95, 0.95, 1.0, 0.0) <= 0.0);
    }

    const DOT_STYLES: [DotStyle; 5] = [
        DotStyle::Square,
        DotStyle::Rounded,
        DotStyle::Dots,
        DotStyle::Classy,
        DotStyle::ClassyRounded,
    ];
    const CORNER_SQUARES: [CornerSquareStyle; 4] = [
        CornerSquareStyle::Square,
        CornerSquareStyle::Rounded,
        CornerSquareStyle::ExtraRounded,
        CornerSquareStyle::Dot,
    ];
    const CORNER_DOTS: [CornerDotStyle; 2] = [CornerDotStyle::Square, CornerDotStyle::Dot];

    fn all_styles() -> Vec<ShapeStyle> {
        let mut styles = Vec::new();
        for dot in DOT_STYLES {
            for corner_square in CORNER_SQUARES {
                for corner_dot in CORNER_DOTS {
                    styles.push(ShapeStyle {
                        dot,
                        corner_square,
                        corner_dot,
                    });
                }
            }
        }
        styles
    }

    #[test]
    fn module_centers_keep_their_state_for_every_style() {
        let grid = grid();
        for style in all_styles() {
            for y in 0..grid.width() {
                for x in 0..grid.width() {
                    let inked = is_inked(&grid, &style, x as f32 + 0.5, y as f32 + 0.5);
                    assert_eq!(inked, grid.is_dark(x, y), "{:?} at ({}, {})", style, x, y);
                }
            }
        }
    }

    #[test]
    fn finder_module_centers_survive_small_offsets() {
        // a rendered pixel samples up to ~0.05 modules away from the center
        let grid = grid();
        for style in all_styles() {
            for y in 0..7 {
                for x in 0..7 {
                    for (dx, dy) in [(-0.06, -0.06), (0.06, 0.06), (-0.06, 0.06), (0.06, -0.06)] {
                        let fx = x as f32 + 0.5 + dx;
                        let fy = y as f32 + 0.5 + dy;
                        assert_eq!(
                            is_inked(&grid, &style, fx, fy),
                            grid.is_dark(x, y),
                            "{:?} near ({}, {})",
                            style,
                            x,
                            y
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn corner_styles_shape_the_finder() {
        let grid = grid();
        let square = ShapeStyle::default();
        let dot = ShapeStyle {
            corner_square: CornerSquareStyle::Dot,
            corner_dot: CornerDotStyle::Dot,
            ..Default::default()
        };
        // the outermost corner of the ring is cut by the round style only
        assert!(is_inked(&grid, &square, 0.05, 0.05));
        assert!(!is_inked(&grid, &dot, 0.05, 0.05));
        // edge midpoints and the center stay dark in both
        assert!(is_inked(&grid, &dot, 3.5, 0.5));
        assert!(is_inked(&grid, &dot, 3.5, 3.5));
        // separator ring between outer ring and center stays light
        assert!(!is_inked(&grid, &dot, 3.5, 1.5));
        assert!(!is_inked(&grid, &square, 3.5, 1.5));
    }
}
