//! Field mappings: placed text elements consumed by the render pipeline.
//!
//! A [`FieldMapping`] describes one text element the interactive editor
//! placed on the template: which data column it reads, where it sits in
//! template-pixel space, and how it is styled. The wire format is
//! camelCase JSON so saved editor configurations load unchanged.

use std::collections::HashMap;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::LaurelError;

/// One data row: column name → trimmed string value.
pub type Row = HashMap<String, String>;

/// Horizontal text alignment within the field's `max_width` box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// A placed text element, created by the editor and consumed read-only
/// by the render pipeline.
///
/// `(x, y)` is the top-left anchor of the glyph box in template pixels,
/// not the text baseline. `max_width` bounds the rendered text
/// (`0.0` = unbounded) and doubles as the alignment anchor box.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    /// Unique identifier assigned by the editor.
    pub id: String,
    /// Source-data column this field reads its value from.
    pub column: String,
    pub x: f32,
    pub y: f32,
    pub font_family: String,
    /// Base font size in pixels; auto-shrink may reduce it per row.
    pub font_size: f32,
    /// Fill color as a hex string (`#rgb` or `#rrggbb`).
    pub color: String,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub max_width: f32,
}

impl FieldMapping {
    /// Check the editor-supplied geometry invariants.
    ///
    /// Called once per batch before any rendering starts; a violated
    /// invariant aborts the whole batch.
    pub fn validate(&self) -> Result<(), LaurelError> {
        if self.x < 0.0 || self.y < 0.0 {
            return Err(LaurelError::InvalidField(format!(
                "field '{}' has negative position ({}, {})",
                self.id, self.x, self.y
            )));
        }
        if self.font_size < 8.0 {
            return Err(LaurelError::InvalidField(format!(
                "field '{}' has font size {} (minimum is 8)",
                self.id, self.font_size
            )));
        }
        Ok(())
    }

    /// Parsed fill color. Invalid hex strings fall back to black.
    pub fn fill_color(&self) -> Rgba<u8> {
        parse_hex_color(&self.color).unwrap_or(Rgba([0, 0, 0, 255]))
    }
}

/// Parse `#rgb` or `#rrggbb` into an opaque RGBA color.
pub fn parse_hex_color(s: &str) -> Option<Rgba<u8>> {
    let hex = s.trim().strip_prefix('#')?;
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = (v << 4) | v;
            }
            Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgba([r, g, b, 255]))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_field() -> FieldMapping {
        FieldMapping {
            id: "f1".to_string(),
            column: "Name".to_string(),
            x: 100.0,
            y: 200.0,
            font_family: "Open Sans".to_string(),
            font_size: 28.0,
            color: "#336699".to_string(),
            align: Align::Center,
            max_width: 400.0,
        }
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#000000"), Some(Rgba([0, 0, 0, 255])));
        assert_eq!(parse_hex_color("#ff8800"), Some(Rgba([255, 136, 0, 255])));
        assert_eq!(parse_hex_color("#f80"), Some(Rgba([255, 136, 0, 255])));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }

    #[test]
    fn test_fill_color_falls_back_to_black() {
        let mut field = sample_field();
        field.color = "not-a-color".to_string();
        assert_eq!(field.fill_color(), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_validate_accepts_sane_geometry() {
        assert!(sample_field().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_position() {
        let mut field = sample_field();
        field.x = -1.0;
        assert!(field.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tiny_font() {
        let mut field = sample_field();
        field.font_size = 7.0;
        assert!(field.validate().is_err());
    }

    #[test]
    fn test_deserializes_editor_json() {
        let json = r##"{
            "id": "abc",
            "column": "Name",
            "x": 10,
            "y": 20,
            "fontFamily": "Arial",
            "fontSize": 32,
            "color": "#000000",
            "align": "right",
            "maxWidth": 300
        }"##;
        let field: FieldMapping = serde_json::from_str(json).unwrap();
        assert_eq!(field.font_family, "Arial");
        assert_eq!(field.align, Align::Right);
        assert_eq!(field.max_width, 300.0);
    }
}
