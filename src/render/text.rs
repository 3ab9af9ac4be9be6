//! Text field rendering: measurement, auto-shrink, and glyph drawing.
//!
//! Renders one text value onto an RGBA canvas with anti-aliased glyph
//! coverage from ab_glyph. Layout is deliberately simple: a single line
//! of advance-summed glyphs, no kerning, no wrapping. The only sizing
//! policy is shrink-to-fit against the field's `max_width` box.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use image::{Rgba, RgbaImage};

use crate::field::{Align, FieldMapping};

/// Measured advance width of `text` at `size` pixels, in pixels.
pub fn measure_width(face: &FontArc, size: f32, text: &str) -> f32 {
    let scaled = face.as_scaled(PxScale::from(size));
    text.chars()
        .map(|ch| scaled.h_advance(face.glyph_id(ch)))
        .sum()
}

/// Smallest size the auto-shrink loop may reach for a base size.
pub fn shrink_floor(font_size: f32) -> f32 {
    (font_size * 0.4).round().max(8.0)
}

/// Auto-shrink: step the size down from `field.font_size` until the
/// text fits `field.max_width`, stopping at the floor. Overflow at the
/// floor is accepted silently; there is no truncation or wrapping.
pub fn shrink_to_fit(face: &FontArc, text: &str, field: &FieldMapping) -> f32 {
    let mut size = field.font_size;
    if field.max_width <= 0.0 {
        return size;
    }
    let floor = shrink_floor(field.font_size);
    while size > floor && measure_width(face, size, text) > field.max_width {
        size -= 1.0;
    }
    size
}

/// Draw one field's text onto the canvas.
///
/// Coordinate contract (matches the editor's placement):
/// - `field.y` is the top of the em box, not the baseline, so vertical
///   placement is identical across fonts with different metrics.
/// - The horizontal anchor is derived from `field.align` and the same
///   `max_width` box the shrink loop uses.
///
/// Empty or whitespace-only text is a no-op, not an error.
pub fn draw_field(canvas: &mut RgbaImage, text: &str, field: &FieldMapping, face: &FontArc) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }

    let size = shrink_to_fit(face, text, field);
    let width = measure_width(face, size, text);

    // Anchor point inside the max_width box, then back off to the draw
    // origin based on the measured width.
    let start_x = match field.align {
        Align::Left => field.x,
        Align::Center => {
            let anchor = if field.max_width > 0.0 {
                field.x + field.max_width / 2.0
            } else {
                field.x
            };
            anchor - width / 2.0
        }
        Align::Right => {
            let anchor = if field.max_width > 0.0 {
                field.x + field.max_width
            } else {
                field.x
            };
            anchor - width
        }
    };

    let scale = PxScale::from(size);
    let scaled = face.as_scaled(scale);
    let baseline_y = field.y + scaled.ascent();
    let color = field.fill_color();

    let mut caret_x = start_x;
    for ch in text.chars() {
        let glyph_id = face.glyph_id(ch);
        let advance = scaled.h_advance(glyph_id);
        let glyph = glyph_id.with_scale_and_position(scale, point(caret_x, baseline_y));
        caret_x += advance;

        let Some(outlined) = face.outline_glyph(glyph) else {
            continue; // whitespace and glyphless codepoints
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|px, py, coverage| {
            let x = px as i32 + bounds.min.x as i32;
            let y = py as i32 + bounds.min.y as i32;
            if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
                blend_pixel(canvas, x as u32, y as u32, color, coverage);
            }
        });
    }
}

/// Source-over blend of `color` at `coverage` opacity onto one pixel.
fn blend_pixel(canvas: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>, coverage: f32) {
    let alpha = (coverage * color.0[3] as f32 / 255.0).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x, y);
    for i in 0..3 {
        let src = color.0[i] as f32;
        let existing = dst.0[i] as f32;
        dst.0[i] = (src * alpha + existing * (1.0 - alpha)).round() as u8;
    }
    let dst_a = dst.0[3] as f32 / 255.0;
    dst.0[3] = ((alpha + dst_a * (1.0 - alpha)) * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Align;
    use crate::font::{FontCatalog, LAST_RESORT};

    fn test_face() -> Option<FontArc> {
        let catalog = FontCatalog::default();
        let path = catalog.native_path(LAST_RESORT)?;
        let bytes = std::fs::read(path).ok()?;
        FontArc::try_from_vec(bytes).ok()
    }

    fn field(font_size: f32, max_width: f32, align: Align) -> FieldMapping {
        FieldMapping {
            id: "t".to_string(),
            column: "Name".to_string(),
            x: 10.0,
            y: 10.0,
            font_family: LAST_RESORT.to_string(),
            font_size,
            color: "#000000".to_string(),
            align,
            max_width,
        }
    }

    fn white_canvas(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    fn dark_pixel_count(canvas: &RgbaImage) -> usize {
        canvas.pixels().filter(|p| p.0[0] < 200).count()
    }

    #[test]
    fn test_shrink_floor() {
        assert_eq!(shrink_floor(28.0), 11.0);
        assert_eq!(shrink_floor(40.0), 16.0);
        // 0.4 × 16 = 6.4, clamped up to the absolute minimum of 8
        assert_eq!(shrink_floor(16.0), 8.0);
    }

    #[test]
    fn test_measure_scales_with_size() {
        let Some(face) = test_face() else {
            eprintln!("skipping: no native fonts installed");
            return;
        };
        let small = measure_width(&face, 12.0, "Hello");
        let large = measure_width(&face, 24.0, "Hello");
        assert!(small > 0.0);
        assert!(large > small * 1.5);
    }

    #[test]
    fn test_shrink_unbounded_keeps_base_size() {
        let Some(face) = test_face() else {
            eprintln!("skipping: no native fonts installed");
            return;
        };
        let f = field(28.0, 0.0, Align::Left);
        assert_eq!(shrink_to_fit(&face, "a very long line of text", &f), 28.0);
    }

    #[test]
    fn test_shrink_fits_or_hits_floor() {
        let Some(face) = test_face() else {
            eprintln!("skipping: no native fonts installed");
            return;
        };
        let f = field(28.0, 100.0, Align::Left);
        let text = "Bob Bob Bob Bob Bob Bob";
        let size = shrink_to_fit(&face, text, &f);
        let floor = shrink_floor(28.0);
        assert!(size >= floor);
        assert!(size < 28.0, "long text must shrink below the base size");
        if size > floor {
            assert!(measure_width(&face, size, text) <= f.max_width);
        }
    }

    #[test]
    fn test_shrink_stops_at_floor_on_overflow() {
        let Some(face) = test_face() else {
            eprintln!("skipping: no native fonts installed");
            return;
        };
        // 5px box cannot fit anything: must stop exactly at the floor
        let f = field(30.0, 5.0, Align::Left);
        assert_eq!(shrink_to_fit(&face, "Overflowing", &f), shrink_floor(30.0));
    }

    #[test]
    fn test_draw_empty_text_is_noop() {
        let Some(face) = test_face() else {
            eprintln!("skipping: no native fonts installed");
            return;
        };
        let mut canvas = white_canvas(120, 60);
        draw_field(&mut canvas, "   ", &field(20.0, 0.0, Align::Left), &face);
        assert_eq!(dark_pixel_count(&canvas), 0);
    }

    #[test]
    fn test_draw_marks_canvas() {
        let Some(face) = test_face() else {
            eprintln!("skipping: no native fonts installed");
            return;
        };
        let mut canvas = white_canvas(200, 60);
        draw_field(&mut canvas, "Alice", &field(24.0, 0.0, Align::Left), &face);
        assert!(dark_pixel_count(&canvas) > 0);
    }

    #[test]
    fn test_alignment_anchors() {
        let Some(face) = test_face() else {
            eprintln!("skipping: no native fonts installed");
            return;
        };
        // A 300px wide box at x=10; "Hi" is far narrower, so ink should
        // land near the left, middle, and right of the box respectively.
        let make = |align| {
            let mut canvas = white_canvas(400, 60);
            let mut f = field(24.0, 300.0, align);
            f.x = 10.0;
            draw_field(&mut canvas, "Hi", &f, &face);
            let xs: Vec<u32> = canvas
                .enumerate_pixels()
                .filter(|(_, _, p)| p.0[0] < 200)
                .map(|(x, _, _)| x)
                .collect();
            (*xs.iter().min().unwrap(), *xs.iter().max().unwrap())
        };

        let (left_min, left_max) = make(Align::Left);
        let (center_min, center_max) = make(Align::Center);
        let (right_min, right_max) = make(Align::Right);

        assert!(left_min >= 8 && left_min < 60);
        let center_mid = (center_min + center_max) / 2;
        assert!((140..=180).contains(&center_mid), "center mid was {center_mid}");
        assert!(right_max <= 315 && right_max > 260, "right max was {right_max}");
    }
}
