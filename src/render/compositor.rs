//! Certificate compositing: template plus mapped fields for one row.
//!
//! Pure raster work with no file I/O, so it can be tested against
//! pixel-sampling assertions and reused unchanged by both the batch
//! pipeline and preview.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::error::LaurelError;
use crate::field::{FieldMapping, Row};
use crate::font::ResolvedFonts;
use crate::render::text::draw_field;

/// Render one certificate: the template as the full-canvas background,
/// then every mapped field in list order (later fields draw over
/// earlier ones).
///
/// Fields whose row value is empty render nothing; fields whose family
/// is missing from `fonts` are skipped, mirroring the resolver's
/// never-fail policy.
pub fn render_certificate(
    template: &RgbaImage,
    fields: &[FieldMapping],
    row: &Row,
    fonts: &ResolvedFonts,
) -> RgbaImage {
    // Canvas is exactly the template: same dimensions, background
    // blitted at the origin, unscaled.
    let mut canvas = template.clone();

    for field in fields {
        let text = row
            .get(&field.column)
            .map(|v| v.trim())
            .unwrap_or_default();
        if text.is_empty() {
            continue;
        }
        let Some(resolved) = fonts.get(&field.font_family) else {
            continue;
        };
        draw_field(&mut canvas, text, field, &resolved.face);
    }

    canvas
}

/// Losslessly encode a rendered certificate as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, LaurelError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| LaurelError::Render(format!("PNG encode failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Render and encode in one step: the buffer handed to disk writes and
/// preview responses.
pub fn composite(
    template: &RgbaImage,
    fields: &[FieldMapping],
    row: &Row,
    fonts: &ResolvedFonts,
) -> Result<Vec<u8>, LaurelError> {
    encode_png(&render_certificate(template, fields, row, fonts))
}
