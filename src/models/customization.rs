use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::qr::color::parse_hex_color;
use crate::structs::link_request::CustomizationRequest;

pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";
pub const DEFAULT_FOREGROUND: &str = "#000000";
pub const DEFAULT_LOGO_SIZE: f64 = 0.2;
pub const MIN_LOGO_SIZE: f64 = 0.1;
pub const MAX_LOGO_SIZE: f64 = 0.4;

/// Shape used for ordinary data modules.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DotStyle {
    #[default]
    Square,
    Rounded,
    Dots,
    Classy,
    ClassyRounded,
}

/// Shape of the outer 7x7 ring of each finder pattern.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CornerSquareStyle {
    #[default]
    Square,
    Rounded,
    ExtraRounded,
    Dot,
}

/// Shape of the inner 3x3 block of each finder pattern.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CornerDotStyle {
    #[default]
    Square,
    Dot,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GradientType {
    #[default]
    None,
    Linear,
    Radial,
}

macro_rules! impl_from_str {
    ($ty:ident, $field:literal, { $($name:literal => $variant:ident),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    other => Err(AppError::validation(format!(
                        "Unknown {} '{}'",
                        $field, other
                    ))),
                }
            }
        }
    };
}

impl_from_str!(DotStyle, "dotStyle", {
    "square" => Square,
    "rounded" => Rounded,
    "dots" => Dots,
    "classy" => Classy,
    "classy-rounded" => ClassyRounded,
});

impl_from_str!(CornerSquareStyle, "cornerSquareStyle", {
    "square" => Square,
    "rounded" => Rounded,
    "extra-rounded" => ExtraRounded,
    "dot" => Dot,
});

impl_from_str!(CornerDotStyle, "cornerDotStyle", {
    "square" => Square,
    "dot" => Dot,
});

impl_from_str!(GradientType, "gradientType", {
    "none" => None,
    "linear" => Linear,
    "radial" => Radial,
});

/// Snapshot of the rendering options a link was created with.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub dot_style: DotStyle,
    pub corner_square_style: CornerSquareStyle,
    pub corner_dot_style: CornerDotStyle,
    pub background_color: String,
    pub foreground_color: String,
    pub gradient_type: GradientType,
    pub gradient_start_color: String,
    pub gradient_end_color: String,
    pub has_logo: bool,
    pub logo_size: f64,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            dot_style: DotStyle::default(),
            corner_square_style: CornerSquareStyle::default(),
            corner_dot_style: CornerDotStyle::default(),
            background_color: DEFAULT_BACKGROUND.to_string(),
            foreground_color: DEFAULT_FOREGROUND.to_string(),
            gradient_type: GradientType::default(),
            gradient_start_color: DEFAULT_FOREGROUND.to_string(),
            gradient_end_color: DEFAULT_FOREGROUND.to_string(),
            has_logo: false,
            logo_size: DEFAULT_LOGO_SIZE,
        }
    }
}

impl Customization {
    /// Normalize a raw request into a validated snapshot. Missing values take
    /// the defaults, gradient endpoints fall back to the foreground color.
    pub fn from_request(req: &CustomizationRequest, has_logo: bool) -> Result<Self, AppError> {
        fn parse_or_default<T: FromStr<Err = AppError> + Default>(
            value: &Option<String>,
        ) -> Result<T, AppError> {
            match value.as_deref().map(str::trim) {
                None | Some("") => Ok(T::default()),
                Some(v) => v.parse(),
            }
        }

        let background_color = color_or(&req.background_color, DEFAULT_BACKGROUND, "backgroundColor")?;
        let foreground_color = color_or(&req.foreground_color, DEFAULT_FOREGROUND, "foregroundColor")?;
        let gradient_start_color =
            color_or(&req.gradient_start_color, &foreground_color, "gradientStartColor")?;
        let gradient_end_color =
            color_or(&req.gradient_end_color, &foreground_color, "gradientEndColor")?;

        let logo_size = req.logo_size.unwrap_or(DEFAULT_LOGO_SIZE);
        if !(MIN_LOGO_SIZE..=MAX_LOGO_SIZE).contains(&logo_size) {
            return Err(AppError::validation(format!(
                "logoSize must be between {} and {}",
                MIN_LOGO_SIZE, MAX_LOGO_SIZE
            )));
        }

        Ok(Self {
            dot_style: parse_or_default(&req.dot_style)?,
            corner_square_style: parse_or_default(&req.corner_square_style)?,
            corner_dot_style: parse_or_default(&req.corner_dot_style)?,
            background_color,
            foreground_color,
            gradient_type: parse_or_default(&req.gradient_type)?,
            gradient_start_color,
            gradient_end_color,
            has_logo,
            logo_size,
        })
    }
}

fn color_or(value: &Option<String>, fallback: &str, field: &str) -> Result<String, AppError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(fallback.to_string()),
        Some(v) if parse_hex_color(v).is_some() => Ok(v.to_string()),
        Some(v) => Err(AppError::validation(format!("Invalid {} '{}'", field, v))),
    }
}
