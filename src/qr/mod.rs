//! QR rendering pipeline.
//!
//! A tracking URL is encoded at error-correction level H and rasterized
//! either on the plain path (400 px, hard modules, byte-stable output) or
//! on the styled path (800 px, per-module shapes, optional gradient ink and
//! a centered logo on a circular backing). Output is always PNG.

pub mod color;
mod logo;
pub mod render;
mod shapes;

use std::fmt;

pub use render::{Gradient, RenderOptions, RenderedQr, png_from_data_uri, render_qr};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The payload cannot be turned into a QR symbol.
    Encoding(String),
    Render(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Encoding(msg) => write!(f, "QR encoding failed: {}", msg),
            RenderError::Render(msg) => write!(f, "QR rendering failed: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}
