//! The rasterizer: turns a document into pixels.
//!
//! Rendering is a fixed multi-pass walk over a `width × height` RGBA
//! buffer: background and hazard stripes, per-zone strip fills, grid lines
//! and labels, the texel-density overlay, the global color filter, and (in
//! interactive mode only) the selection highlight. Every render fully owns
//! and overwrites the buffer — there is no incremental path.

use ab_glyph::FontArc;
use image::{Rgba, RgbaImage};
use rand::Rng;
use rayon::prelude::*;

use crate::color::parse_hex_or_black;
use crate::log_warn;
use crate::sheet::{
    Document, FillType, LayoutMode, OutlineFillStyle, RenderStyle, SheetConfig, TrimStrip,
    TrimZone,
};
use crate::text;

/// Reference density the checker/texel tile size is calibrated against.
const BASE_DENSITY: f32 = 512.0;
const BASE_TILE_SIZE: f32 = 128.0;

/// Diagonal hazard-stripe background outside the zones.
const HAZARD_COLOR: [u8; 4] = [0x1e, 0x29, 0x3b, 255];
const HAZARD_SPACING: i32 = 60;
const HAZARD_WIDTH: i32 = 7;

const AMBER: [u8; 4] = [0xfb, 0xbf, 0x24, 255];

/// What the render target is used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// On-screen: color filters always apply, selection highlight allowed.
    Interactive,
    /// Download artifact: filters gated by `export_post_processing`,
    /// selection highlight never drawn.
    Export,
}

/// Per-render inputs that are not part of the document.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Active zone ids, in selection order.
    pub selection: Vec<String>,
    pub show_selection_overlay: bool,
}

/// Checker/texel tile edge in pixels for a density target.
fn dynamic_grid_size(density_target: u32) -> f32 {
    let density = if density_target == 0 { BASE_DENSITY } else { density_target as f32 };
    BASE_TILE_SIZE / (density / BASE_DENSITY)
}

// ============================================================================
// Geometry + painting primitives
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl Rect {
    fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    fn intersect(self, o: Rect) -> Rect {
        let x0 = self.x.max(o.x);
        let y0 = self.y.max(o.y);
        let x1 = (self.x + self.w).min(o.x + o.w);
        let y1 = (self.y + self.h).min(o.y + o.h);
        Rect { x: x0, y: y0, w: (x1 - x0).max(0), h: (y1 - y0).max(0) }
    }

    fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

fn blend_px(dst: &mut Rgba<u8>, c: [u8; 4]) {
    let a = c[3] as u32;
    if a == 0 {
        return;
    }
    if a == 255 {
        *dst = Rgba(c);
        return;
    }
    let ia = 255 - a;
    for i in 0..3 {
        dst.0[i] = ((c[i] as u32 * a + dst.0[i] as u32 * ia) / 255) as u8;
    }
    dst.0[3] = (a + dst.0[3] as u32 * ia / 255).min(255) as u8;
}

/// Clipped, translated drawing surface over the shared pixel buffer.
/// Coordinates given to the methods are local; `ox`/`oy` shift them into
/// sheet space and `clip` bounds every write.
struct Painter<'a> {
    img: &'a mut RgbaImage,
    clip: Rect,
    ox: i32,
    oy: i32,
}

impl<'a> Painter<'a> {
    fn full(img: &'a mut RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        let clip = Rect::new(0, 0, w as i32, h as i32);
        Painter { img, clip, ox: 0, oy: 0 }
    }

    fn zone(img: &'a mut RgbaImage, zone_rect: Rect) -> Self {
        let (w, h) = img.dimensions();
        let clip = zone_rect.intersect(Rect::new(0, 0, w as i32, h as i32));
        Painter { img, clip, ox: zone_rect.x, oy: zone_rect.y }
    }

    fn device_rect(&self, x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect::new(x + self.ox, y + self.oy, w, h).intersect(self.clip)
    }

    /// Opaque overwrite (alpha included).
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: [u8; 4]) {
        let r = self.device_rect(x, y, w, h);
        for py in r.y..r.y + r.h {
            for px in r.x..r.x + r.w {
                self.img.put_pixel(px as u32, py as u32, Rgba(c));
            }
        }
    }

    /// Source-over blend using the color's alpha.
    fn blend_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: [u8; 4]) {
        let r = self.device_rect(x, y, w, h);
        for py in r.y..r.y + r.h {
            for px in r.x..r.x + r.w {
                blend_px(self.img.get_pixel_mut(px as u32, py as u32), c);
            }
        }
    }

    /// Punch a fully transparent hole (wireframe transparent export).
    fn clear_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let r = self.device_rect(x, y, w, h);
        for py in r.y..r.y + r.h {
            for px in r.x..r.x + r.w {
                self.img.put_pixel(px as u32, py as u32, Rgba([0, 0, 0, 0]));
            }
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, c: [u8; 4]) {
        let px = x + self.ox;
        let py = y + self.oy;
        if px >= self.clip.x
            && px < self.clip.x + self.clip.w
            && py >= self.clip.y
            && py < self.clip.y + self.clip.h
        {
            blend_px(self.img.get_pixel_mut(px as u32, py as u32), c);
        }
    }

    /// 1 px dashed line, horizontal or vertical, `(on, off)` dash pattern.
    fn dashed_line(
        &mut self,
        x: i32,
        y: i32,
        len: i32,
        vertical: bool,
        c: [u8; 4],
        on: i32,
        off: i32,
    ) {
        let period = (on + off).max(1);
        for t in 0..len.max(0) {
            if t % period < on {
                if vertical {
                    self.blend_pixel(x, y + t, c);
                } else {
                    self.blend_pixel(x + t, y, c);
                }
            }
        }
    }

    /// Rect outline of the given thickness, centered on the rect path the
    /// way a canvas `strokeRect` is.
    fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, thickness: i32, c: [u8; 4]) {
        let t = thickness.max(1);
        let half = t / 2;
        self.blend_rect(x - half, y - half, w + t, t, c); // top
        self.blend_rect(x - half, y + h - half, w + t, t, c); // bottom
        self.blend_rect(x - half, y - half + t, t, h - t, c); // left
        self.blend_rect(x + w - half, y - half + t, t, h - t, c); // right
    }

    /// Dashed rect outline. The dash phase runs continuously around the
    /// perimeter starting at the top-left corner, offset by `dash_offset`.
    fn stroke_rect_dashed(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        thickness: i32,
        c: [u8; 4],
        on: i32,
        off: i32,
        dash_offset: i32,
    ) {
        let t = thickness.max(1);
        let half = t / 2;
        let period = (on + off).max(1);
        let mut s = dash_offset;
        // top, right, bottom, left — clockwise
        let edges: [(i32, i32, i32, i32, i32); 4] = [
            (x, y, 1, 0, w),
            (x + w, y, 0, 1, h),
            (x + w, y + h, -1, 0, w),
            (x, y + h, 0, -1, h),
        ];
        for (sx, sy, dx, dy, len) in edges {
            for step in 0..len {
                if s.rem_euclid(period) < on {
                    let px = sx + dx * step;
                    let py = sy + dy * step;
                    self.blend_rect(px - half, py - half, t, t, c);
                }
                s += 1;
            }
        }
    }
}

// ============================================================================
// Text helpers
// ============================================================================

#[derive(Clone, Copy)]
enum Anchor {
    /// (x, y) is the text center.
    Center,
    /// x is the left edge, y the vertical center.
    LeftCenter,
    /// x is the right edge, y the top.
    TopRight,
}

/// Draw one line of outlined text. `rotate` turns the line 90° counter-
/// clockwise around its center (only meaningful with `Anchor::Center`).
#[allow(clippy::too_many_arguments)]
fn draw_text(
    p: &mut Painter,
    font: &FontArc,
    s: &str,
    size: f32,
    x: f32,
    y: f32,
    anchor: Anchor,
    color: [u8; 4],
    outline: Option<[u8; 4]>,
    rotate: bool,
) {
    let width = text::line_width(font, s, size);
    let (_, height) = text::line_metrics(font, size);

    // Collect coverage once; blit it for the outline ring and the fill.
    let mut pixels: Vec<(i32, i32, f32)> = Vec::new();
    text::rasterize_line(font, s, size, |gx, gy, cov| pixels.push((gx, gy, cov)));

    let (cx, cy) = match anchor {
        Anchor::Center => (x, y),
        Anchor::LeftCenter => (x + width / 2.0, y),
        Anchor::TopRight => (x - width / 2.0, y + height / 2.0),
    };

    let place = |gx: i32, gy: i32| -> (i32, i32) {
        let lx = gx as f32 - width / 2.0;
        let ly = gy as f32 - height / 2.0;
        if rotate {
            ((cx + ly).round() as i32, (cy - lx).round() as i32)
        } else {
            ((cx + lx).round() as i32, (cy + ly).round() as i32)
        }
    };

    if let Some(oc) = outline {
        for &(gx, gy, cov) in &pixels {
            let (px, py) = place(gx, gy);
            let c = [oc[0], oc[1], oc[2], (oc[3] as f32 * cov) as u8];
            for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (1, 1), (-1, 1), (1, -1)]
            {
                p.blend_pixel(px + dx, py + dy, c);
            }
        }
    }
    for &(gx, gy, cov) in &pixels {
        let (px, py) = place(gx, gy);
        p.blend_pixel(px, py, [color[0], color[1], color[2], (color[3] as f32 * cov) as u8]);
    }
}

// ============================================================================
// Fill routines
// ============================================================================

fn opaque(rgb: [u8; 3]) -> [u8; 4] {
    [rgb[0], rgb[1], rgb[2], 255]
}

fn draw_checker(p: &mut Painter, x: i32, y: i32, w: i32, h: i32, color: [u8; 4], grid: f32) {
    p.fill_rect(x, y, w, h, color);
    let size = (grid.round() as i32).max(2);
    let overlay = [0, 0, 0, 26]; // 10% black
    let mut row = 0;
    while row * size < h {
        let mut col = 0;
        while col * size < w {
            if (row + col) % 2 == 0 {
                let cw = size.min(w - col * size);
                let ch = size.min(h - row * size);
                p.blend_rect(x + col * size, y + row * size, cw, ch, overlay);
            }
            col += 1;
        }
        row += 1;
    }
}

/// Per-pixel additive noise in ±10 on each of R, G, B (one draw shared by
/// all three channels, alpha untouched). This is the only O(pixels) fill and
/// dominates render cost on large noise strips.
fn draw_noise<R: Rng>(
    p: &mut Painter,
    rng: &mut R,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: [u8; 4],
) {
    p.fill_rect(x, y, w, h, color);
    let r = p.device_rect(x, y, w, h);
    for py in r.y..r.y + r.h {
        for px in r.x..r.x + r.w {
            let noise = rng.gen_range(-10i16..=10);
            let dst = p.img.get_pixel_mut(px as u32, py as u32);
            for i in 0..3 {
                dst.0[i] = (dst.0[i] as i16 + noise).clamp(0, 255) as u8;
            }
        }
    }
}

/// Base color at the top fading to black at the bottom of the segment.
fn draw_gradient_v(p: &mut Painter, x: i32, y: i32, w: i32, h: i32, color: [u8; 4]) {
    if h <= 0 {
        return;
    }
    for row in 0..h {
        let t = row as f32 / h.max(1) as f32;
        let c = [
            (color[0] as f32 * (1.0 - t)) as u8,
            (color[1] as f32 * (1.0 - t)) as u8,
            (color[2] as f32 * (1.0 - t)) as u8,
            255,
        ];
        p.fill_rect(x, y + row, w, 1, c);
    }
}

/// Gradient-depth style overlay: white 10% at top → transparent at the
/// middle → black 30% at the bottom, regardless of the underlying fill.
fn draw_depth_overlay(p: &mut Painter, x: i32, y: i32, w: i32, h: i32) {
    if h <= 0 {
        return;
    }
    for row in 0..h {
        let t = row as f32 / h as f32;
        let c = if t < 0.5 {
            [255, 255, 255, (25.0 * (1.0 - t * 2.0)) as u8]
        } else {
            [0, 0, 0, (76.0 * (t * 2.0 - 1.0)) as u8]
        };
        if c[3] > 0 {
            p.blend_rect(x, y + row, w, 1, c);
        }
    }
}

/// Paint one subdivision segment according to the strip's fill type and the
/// active global style.
#[allow(clippy::too_many_arguments)]
fn fill_segment<R: Rng>(
    p: &mut Painter,
    rng: &mut R,
    config: &SheetConfig,
    strip: &TrimStrip,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color_hex: &str,
    grid_size: f32,
) {
    let color = opaque(parse_hex_or_black(color_hex));

    if config.render_style == RenderStyle::Outline {
        p.fill_rect(x, y, w, h, color);
        let thickness = config.outline_thickness.max(1) as i32;
        let effective = thickness.min(w.min(h) / 2);
        let ix = x + effective;
        let iy = y + effective;
        let iw = w - effective * 2;
        let ih = h - effective * 2;
        match config.outline_fill_style {
            OutlineFillStyle::Transparent => p.clear_rect(ix, iy, iw, ih),
            OutlineFillStyle::Solid => p.fill_rect(ix, iy, iw, ih, [0, 0, 0, 255]),
        }
        return;
    }

    match strip.fill_type {
        FillType::Flat => p.fill_rect(x, y, w, h, color),
        FillType::Checker => draw_checker(p, x, y, w, h, color, grid_size),
        FillType::Noise => draw_noise(p, rng, x, y, w, h, color),
        FillType::GradientV => draw_gradient_v(p, x, y, w, h, color),
    }

    if config.render_style == RenderStyle::Gradient {
        draw_depth_overlay(p, x, y, w, h);
    }
}

// ============================================================================
// Zone rendering
// ============================================================================

fn zone_pixel_rect(zone: &TrimZone, config: &SheetConfig) -> Rect {
    Rect::new(
        (zone.x * config.width as f32).round() as i32,
        (zone.y * config.height as f32).round() as i32,
        (zone.width * config.width as f32).round() as i32,
        (zone.height * config.height as f32).round() as i32,
    )
}

/// Pixel rect (zone-local) of subdivision `i` of a strip starting at
/// `main_pos` along the main axis.
fn segment_rect(
    strip: &TrimStrip,
    i: u32,
    main_pos: i32,
    cross_size: i32,
    vertical: bool,
) -> (i32, i32, i32, i32) {
    // The field is public, so a zero can reach us despite the model's
    // clamping helpers.
    let subs = strip.subdivisions.max(1);
    let seg = cross_size as f32 / subs as f32;
    let start = (i as f32 * seg).round() as i32;
    let end = if i == subs - 1 { cross_size } else { ((i + 1) as f32 * seg).round() as i32 };
    let main = strip.height as i32;
    if vertical {
        (main_pos, start, main, end - start)
    } else {
        (start, main_pos, end - start, main)
    }
}

fn render_zone<R: Rng>(
    img: &mut RgbaImage,
    rng: &mut R,
    zone: &TrimZone,
    config: &SheetConfig,
    grid_size: f32,
    font: Option<&FontArc>,
    transparent_bg: bool,
) {
    let rect = zone_pixel_rect(zone, config);
    let (zw, zh) = (rect.w, rect.h);
    let mut p = Painter::zone(img, rect);
    if p.clip.is_empty() {
        return;
    }

    if !transparent_bg {
        p.fill_rect(0, 0, zw, zh, [0, 0, 0, 255]);
    }

    let vertical = zone.layout_mode == LayoutMode::Vertical;
    let cross = if vertical { zh } else { zw };

    // Pass A: fills.
    let mut main_pos = 0i32;
    for strip in &zone.strips {
        for i in 0..strip.subdivisions.max(1) {
            let (x, y, w, h) = segment_rect(strip, i, main_pos, cross, vertical);
            fill_segment(&mut p, rng, config, strip, x, y, w, h, strip.subdivision_color(i as usize), grid_size);
        }
        main_pos += strip.height as i32;
    }

    // Pass B: guides and labels over the fills.
    let grid_color = opaque(parse_hex_or_black(&config.strip_grid_color));
    let separator = [0, 0, 0, 102]; // 40% black
    let mut main_pos = 0i32;
    for strip in &zone.strips {
        let size = strip.height as i32;

        if config.render_style != RenderStyle::Outline {
            // Solid line at the strip boundary.
            let line = main_pos + size - 1;
            if vertical {
                p.blend_rect(line, 0, 1, zh, separator);
            } else {
                p.blend_rect(0, line, zw, 1, separator);
            }

            // Dashed cuts at subdivision boundaries.
            if strip.subdivisions > 1 {
                let seg = cross as f32 / strip.subdivisions as f32;
                for i in 1..strip.subdivisions {
                    let at = (i as f32 * seg).round() as i32 - 1;
                    if vertical {
                        p.dashed_line(main_pos, at, size, false, grid_color, 5, 3);
                    } else {
                        p.dashed_line(at, main_pos, size, true, grid_color, 5, 3);
                    }
                }
            }
        }

        if let Some(font) = font {
            draw_strip_labels(&mut p, font, strip, main_pos, zw, zh, vertical, config.render_style);
        }

        main_pos += strip.height as i32;
    }

    // Faint zone border for structure visibility.
    p.blend_rect(0, 0, zw, 1, [255, 255, 255, 51]);
    p.blend_rect(0, zh - 1, zw, 1, [255, 255, 255, 51]);
    p.blend_rect(0, 1, 1, zh - 2, [255, 255, 255, 51]);
    p.blend_rect(zw - 1, 1, 1, zh - 2, [255, 255, 255, 51]);
}

/// Centered pixel-size label plus the strip name near the zone edge.
#[allow(clippy::too_many_arguments)]
fn draw_strip_labels(
    p: &mut Painter,
    font: &FontArc,
    strip: &TrimStrip,
    main_pos: i32,
    zw: i32,
    zh: i32,
    vertical: bool,
    style: RenderStyle,
) {
    let size = strip.height as i32;
    let font_size = (size as f32 * 0.4).clamp(16.0, 32.0);

    let (text_color, stroke_color) = if style == RenderStyle::Outline {
        ([0x88, 0x88, 0x88, 255], [0, 0, 0, 255])
    } else {
        ([255, 255, 255, 255], [0, 0, 0, 204])
    };

    let center_text = format!("{}px", strip.height);
    let text_w = text::line_width(font, &center_text, font_size);

    if vertical {
        let cx = main_pos as f32 + size as f32 / 2.0;
        let cy = zh as f32 / 2.0;
        let rotate = (size as f32) < text_w;
        draw_text(
            p, font, &center_text, font_size, cx, cy, Anchor::Center, text_color,
            Some(stroke_color), rotate,
        );
    } else {
        draw_text(
            p,
            font,
            &center_text,
            font_size,
            zw as f32 / 2.0,
            main_pos as f32 + size as f32 / 2.0,
            Anchor::Center,
            text_color,
            Some(stroke_color),
            false,
        );
    }

    // Name label only where it stays readable.
    if size > 32 {
        let name_color = if style == RenderStyle::Outline {
            [0x66, 0x66, 0x66, 255]
        } else {
            [255, 255, 255, 230]
        };
        if vertical {
            let rotate = size < 60;
            draw_text(
                p,
                font,
                &strip.name,
                20.0,
                main_pos as f32 + size as f32 / 2.0,
                30.0,
                Anchor::Center,
                name_color,
                Some(stroke_color),
                rotate,
            );
        } else {
            draw_text(
                p,
                font,
                &strip.name,
                20.0,
                10.0,
                main_pos as f32 + 20.0,
                Anchor::LeftCenter,
                name_color,
                Some(stroke_color),
                false,
            );
        }
    }
}

// ============================================================================
// Global overlays and filters
// ============================================================================

fn draw_hazard_stripes(img: &mut RgbaImage) {
    let (w, h) = img.dimensions();
    for y in 0..h {
        for x in 0..w {
            if ((x + y) as i32) % HAZARD_SPACING < HAZARD_WIDTH {
                img.put_pixel(x, y, Rgba(HAZARD_COLOR));
            }
        }
    }
}

fn draw_texel_overlay(img: &mut RgbaImage, config: &SheetConfig, font: Option<&FontArc>) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let density = config.texel_density_target.max(1) as f32;
    let tile = dynamic_grid_size(config.texel_density_target).max(1.0) as i32;

    let mut p = Painter::full(img);
    let mut row = 0;
    while row * tile < h {
        let mut col = 0;
        while col * tile < w {
            let c = if (row + col) % 2 == 0 {
                [255, 255, 255, 38] // 15% white
            } else {
                [0, 0, 0, 38] // 15% black
            };
            let cw = tile.min(w - col * tile);
            let ch = tile.min(h - row * tile);
            p.blend_rect(col * tile, row * tile, cw, ch, c);
            col += 1;
        }
        row += 1;
    }

    let Some(font) = font else { return };

    let tile_meters = tile as f32 / density;
    let grid_label = if tile_meters >= 1.0 {
        format!("{:.2}m", tile_meters)
    } else {
        format!("{:.2}cm", tile_meters * 100.0)
    };
    let lines = [
        format!("SHEET: {:.2}m x {:.2}m", w as f32 / density, h as f32 / density),
        format!("@ {} px/m", config.texel_density_target),
        format!("GRID: {} ({}px)", grid_label, tile),
    ];

    let padding = 10.0;
    let line_height = 16.0;
    for (i, line) in lines.iter().enumerate() {
        draw_text(
            &mut p,
            font,
            line,
            12.0,
            w as f32 - padding,
            padding + i as f32 * line_height,
            Anchor::TopRight,
            AMBER,
            Some([0, 0, 0, 255]),
            false,
        );
    }
}

/// Saturation matrix + brightness multiply over the whole buffer, matching
/// the interactive view's `saturate()`/`brightness()` filter chain. Rows in
/// parallel — this touches every pixel.
fn apply_color_filters(img: &mut RgbaImage, saturation: f32, brightness: f32) {
    if (saturation - 1.0).abs() < f32::EPSILON && (brightness - 1.0).abs() < f32::EPSILON {
        return;
    }
    let s = saturation;
    let row_len = img.width() as usize * 4;
    let m = [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ];
    img.par_chunks_mut(row_len).for_each(|row| {
        for px in row.chunks_exact_mut(4) {
            let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
            for i in 0..3 {
                let v = (m[i][0] * r + m[i][1] * g + m[i][2] * b) * brightness;
                px[i] = v.clamp(0.0, 255.0) as u8;
            }
        }
    });
}

fn draw_selection_overlay(img: &mut RgbaImage, doc: &Document, selection: &[String]) {
    let mut p = Painter::full(img);
    for id in selection {
        let Some(zone) = doc.zone(id) else { continue };
        let r = zone_pixel_rect(zone, &doc.config);
        // Solid black base, then two interleaved dash passes for contrast
        // against any fill color.
        p.stroke_rect(r.x, r.y, r.w, r.h, 6, [0, 0, 0, 255]);
        p.stroke_rect_dashed(r.x, r.y, r.w, r.h, 4, AMBER, 10, 5, 0);
        p.stroke_rect_dashed(r.x, r.y, r.w, r.h, 4, [255, 255, 255, 255], 10, 5, 7);
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Render a document into a fresh pixel buffer. `font` may be `None`, in
/// which case all text labels are skipped.
pub fn render_document<R: Rng>(
    doc: &Document,
    mode: RenderMode,
    opts: &RenderOptions,
    font: Option<&FontArc>,
    rng: &mut R,
) -> RgbaImage {
    let config = &doc.config;
    let mut img = RgbaImage::new(config.width.max(1), config.height.max(1));

    let apply_filters = match mode {
        RenderMode::Interactive => true,
        RenderMode::Export => config.export_post_processing,
    };
    let transparent_bg = config.render_style == RenderStyle::Outline
        && config.outline_fill_style == OutlineFillStyle::Transparent;
    let grid_size = dynamic_grid_size(config.texel_density_target);

    // Pass 1: global background.
    if !transparent_bg {
        for px in img.pixels_mut() {
            *px = Rgba([0, 0, 0, 255]);
        }
        draw_hazard_stripes(&mut img);
    }

    // Pass 2: zones.
    for zone in &doc.zones {
        render_zone(&mut img, rng, zone, config, grid_size, font, transparent_bg);
    }

    // Pass 3: texel density reference grid.
    if config.show_texel_density {
        draw_texel_overlay(&mut img, config, font);
    }

    // Pass 4: post-processing filters.
    if apply_filters {
        apply_color_filters(&mut img, config.global_saturation, config.global_brightness);
    }

    // Pass 5: selection highlight — interactive only, drawn after the
    // filters so the highlight colors stay exact.
    if mode == RenderMode::Interactive
        && opts.show_selection_overlay
        && !opts.selection.is_empty()
    {
        draw_selection_overlay(&mut img, doc, &opts.selection);
    }

    img
}

/// Owns the on-screen pixel buffer and the label font. The buffer is shared
/// between interactive and export renders, so exporting re-renders the
/// interactive view afterwards to restore it.
pub struct TrimCanvas {
    buffer: RgbaImage,
    font: Option<FontArc>,
}

impl TrimCanvas {
    pub fn new() -> Self {
        let font = text::load_label_font();
        if font.is_none() {
            log_warn!("No system font found for labels; rendering without text");
        }
        TrimCanvas { buffer: RgbaImage::new(1, 1), font }
    }

    /// Canvas without a label font. Deterministic output regardless of the
    /// host's installed fonts.
    pub fn without_font() -> Self {
        TrimCanvas { buffer: RgbaImage::new(1, 1), font: None }
    }

    pub fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Full redraw of the owned buffer.
    pub fn render<R: Rng>(
        &mut self,
        doc: &Document,
        mode: RenderMode,
        opts: &RenderOptions,
        rng: &mut R,
    ) {
        self.buffer = render_document(doc, mode, opts, self.font.as_ref(), rng);
    }

    /// PNG-encode an export-mode render, then restore the interactive view.
    /// The restore is not optional: the buffer is shared and the export
    /// render overwrites it.
    pub fn export_png_bytes<R: Rng>(
        &mut self,
        doc: &Document,
        opts: &RenderOptions,
        rng: &mut R,
    ) -> Result<Vec<u8>, crate::io::TrimError> {
        self.render(doc, RenderMode::Export, opts, rng);
        let encoded = crate::io::encode_png(&self.buffer)?;
        self.render(doc, RenderMode::Interactive, opts, rng);
        Ok(encoded)
    }
}

impl Default for TrimCanvas {
    fn default() -> Self {
        TrimCanvas::new()
    }
}
