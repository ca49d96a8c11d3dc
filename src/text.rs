//! Glyph layout and rasterization for the technical labels drawn onto the
//! sheet. One line at a time, coverage-callback based: the rasterizer owns
//! translation, rotation, clipping, and blending.

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};

/// Find a usable monospace system font for labels. Labels are decoration —
/// when no font can be loaded the caller just skips them.
pub fn load_label_font() -> Option<FontArc> {
    use font_kit::family_name::FamilyName;
    use font_kit::properties::Properties;
    use font_kit::source::SystemSource;

    let source = SystemSource::new();
    let handle = source
        .select_best_match(
            &[FamilyName::Monospace, FamilyName::SansSerif],
            &Properties::new(),
        )
        .ok()?;
    let font = handle.load().ok()?;
    let data = font.copy_font_data()?;
    FontArc::try_from_vec((*data).clone()).ok()
}

/// Advance width of a single line at the given pixel size (kerning applied).
pub fn line_width(font: &FontArc, text: &str, size: f32) -> f32 {
    let scaled = font.as_scaled(size);
    let mut cursor = 0.0f32;
    let mut last: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = last {
            cursor += scaled.kern(prev, id);
        }
        cursor += scaled.h_advance(id);
        last = Some(id);
    }
    cursor
}

/// Ascent and full line height at the given pixel size.
pub fn line_metrics(font: &FontArc, size: f32) -> (f32, f32) {
    let scaled = font.as_scaled(size);
    (scaled.ascent(), scaled.height())
}

/// Rasterize one line with its top-left corner at (0, 0), invoking
/// `plot(x, y, coverage)` for every covered pixel. Coverage is 0.0–1.0.
pub fn rasterize_line<F: FnMut(i32, i32, f32)>(
    font: &FontArc,
    text: &str,
    size: f32,
    mut plot: F,
) {
    let scaled = font.as_scaled(size);
    let ascent = scaled.ascent();
    let mut cursor = 0.0f32;
    let mut last: Option<GlyphId> = None;

    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = last {
            cursor += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(size, point(cursor, ascent));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let bx = bounds.min.x as i32;
            let by = bounds.min.y as i32;
            outlined.draw(|gx, gy, coverage| {
                if coverage > 0.0 {
                    plot(bx + gx as i32, by + gy as i32, coverage.min(1.0));
                }
            });
        }
        cursor += scaled.h_advance(id);
        last = Some(id);
    }
}
