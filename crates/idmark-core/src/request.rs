//! Watermark request and styling

use crate::tiling::{DEFAULT_TILE_SPACING, TILE_FONT_SCALE, TILE_OPACITY_SCALE};
use crate::{Result, WatermarkError};
use serde::{Deserialize, Serialize};

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Gray level (0.0 black - 1.0 white)
    pub fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }

    /// Mid gray used by identity watermarks
    pub fn mid_gray() -> Self {
        Self::gray(0.6)
    }

    /// Red color
    pub fn red() -> Self {
        Self::rgb(1.0, 0.0, 0.0)
    }

    fn channels(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::mid_gray()
    }
}

/// Visual parameters of a watermark
///
/// Every field has a default, so a partial JSON document is a valid style:
///
/// ```
/// use idmark_core::WatermarkStyle;
///
/// let style: WatermarkStyle = serde_json::from_str(r#"{ "opacity": 0.4 }"#).unwrap();
/// assert_eq!(style.opacity, 0.4);
/// assert_eq!(style.font_size, 42.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkStyle {
    /// Opacity of the primary block (0.0 - 1.0)
    pub opacity: f64,
    /// Font size of the primary block in points
    pub font_size: f64,
    /// Fill color
    pub color: Color,
    /// Rotation in degrees, counter-clockwise
    pub angle: f64,
    /// Distance between successive baselines in points
    pub line_spacing: f64,
    /// Grid step between the primary block and its tiles in points
    pub tile_spacing: f64,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            opacity: 0.25,
            font_size: 42.0,
            color: Color::mid_gray(),
            angle: -45.0,
            line_spacing: 50.0,
            tile_spacing: DEFAULT_TILE_SPACING,
        }
    }
}

impl WatermarkStyle {
    /// Font size of the tiled copies
    pub fn tile_font_size(&self) -> f64 {
        self.font_size * TILE_FONT_SCALE
    }

    /// Opacity of the tiled copies
    pub fn tile_opacity(&self) -> f64 {
        self.opacity * TILE_OPACITY_SCALE
    }

    /// Check every parameter is within its documented range
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(invalid(format!(
                "opacity must be within 0..=1, got {}",
                self.opacity
            )));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(invalid(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if !(self.line_spacing.is_finite() && self.line_spacing > 0.0) {
            return Err(invalid(format!(
                "line spacing must be positive, got {}",
                self.line_spacing
            )));
        }
        if !(self.tile_spacing.is_finite() && self.tile_spacing > 0.0) {
            return Err(invalid(format!(
                "tile spacing must be positive, got {}",
                self.tile_spacing
            )));
        }
        if !self.angle.is_finite() {
            return Err(invalid(format!("angle must be finite, got {}", self.angle)));
        }
        if let Some(channel) = self
            .color
            .channels()
            .into_iter()
            .find(|c| !(0.0..=1.0).contains(c))
        {
            return Err(invalid(format!(
                "color channels must be within 0..=1, got {channel}"
            )));
        }
        Ok(())
    }
}

/// Font used to draw the watermark
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FontChoice {
    /// Standard Helvetica with WinAnsi encoding (no font file embedded)
    #[default]
    Helvetica,
    /// TrueType / OpenType font file bytes, embedded as a Type0 font
    TrueType(Vec<u8>),
}

/// A complete watermark request: the text lines plus how to draw them
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkRequest {
    /// Lines from top to bottom
    pub lines: Vec<String>,
    pub style: WatermarkStyle,
    pub font: FontChoice,
}

impl WatermarkRequest {
    /// Create a request with the default style and Helvetica
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            style: WatermarkStyle::default(),
            font: FontChoice::default(),
        }
    }

    pub fn with_style(mut self, style: WatermarkStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_font(mut self, font: FontChoice) -> Self {
        self.font = font;
        self
    }

    /// Validate the request before any document work starts
    pub fn validate(&self) -> Result<()> {
        if self.lines.is_empty() {
            return Err(invalid("at least one text line is required".to_string()));
        }
        self.style.validate()
    }
}

fn invalid(message: String) -> WatermarkError {
    WatermarkError::InvalidRequest(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_style() {
        let style = WatermarkStyle::default();
        assert_eq!(style.opacity, 0.25);
        assert_eq!(style.font_size, 42.0);
        assert_eq!(style.color, Color::rgb(0.6, 0.6, 0.6));
        assert_eq!(style.angle, -45.0);
        assert_eq!(style.line_spacing, 50.0);
        assert_eq!(style.tile_spacing, 200.0);
    }

    #[test]
    fn test_tile_scaling() {
        let style = WatermarkStyle::default();
        assert!((style.tile_font_size() - 33.6).abs() < 1e-9);
        assert!((style.tile_opacity() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_color_from_rgb() {
        let color = Color::from_rgb(255, 0, 51);
        assert_eq!(color, Color::rgb(1.0, 0.0, 0.2));
    }

    #[test]
    fn test_validate_default_request() {
        let request = WatermarkRequest::new(vec!["A".into(), "B".into()]);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_lines() {
        let request = WatermarkRequest::new(Vec::new());
        assert!(matches!(
            request.validate(),
            Err(WatermarkError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let cases = [
            WatermarkStyle {
                opacity: 1.5,
                ..Default::default()
            },
            WatermarkStyle {
                opacity: f64::NAN,
                ..Default::default()
            },
            WatermarkStyle {
                font_size: 0.0,
                ..Default::default()
            },
            WatermarkStyle {
                line_spacing: -1.0,
                ..Default::default()
            },
            WatermarkStyle {
                tile_spacing: f64::INFINITY,
                ..Default::default()
            },
            WatermarkStyle {
                angle: f64::NAN,
                ..Default::default()
            },
            WatermarkStyle {
                color: Color::rgb(0.0, 2.0, 0.0),
                ..Default::default()
            },
        ];

        for style in cases {
            let request = WatermarkRequest::new(vec!["A".into()]).with_style(style.clone());
            assert!(request.validate().is_err(), "{style:?}");
        }
    }

    #[test]
    fn test_style_from_partial_json() {
        let style: WatermarkStyle =
            serde_json::from_str(r#"{ "angle": 30, "color": { "r": 1, "g": 0, "b": 0 } }"#)
                .unwrap();
        assert_eq!(style.angle, 30.0);
        assert_eq!(style.color, Color::red());
        assert_eq!(style.opacity, 0.25);
    }

    #[test]
    fn test_style_json_roundtrip() {
        let style = WatermarkStyle {
            opacity: 0.5,
            ..Default::default()
        };
        let json = serde_json::to_string(&style).unwrap();
        let back: WatermarkStyle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, style);
    }
}
