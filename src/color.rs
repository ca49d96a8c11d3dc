//! Hex color utilities: parsing, HSL conversion, and the palette
//! generators used by the strip generators and the recolor tools.

use rand::Rng;

/// Fixed base palette cycled through by strip index during generation.
pub const PALETTE: [&str; 12] = [
    "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#00FFFF", "#FF00FF",
    "#FFFFFF", "#808080", "#FFA500", "#800080", "#008080", "#FFC0CB",
];

/// Palette color for an arbitrary index (wraps around).
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Parse `#RRGGBB` (or `#RGB`) into RGB bytes. Returns None for anything else.
pub fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let s = hex.strip_prefix('#')?;
    match s.len() {
        6 => {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some([r, g, b])
        }
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in s.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 16 + v;
            }
            Some(out)
        }
        _ => None,
    }
}

/// Parse a hex color, falling back to opaque black for malformed input.
/// Colors are an opaque wire format here; bad values degrade, never error.
pub fn parse_hex_or_black(hex: &str) -> [u8; 3] {
    parse_hex(hex).unwrap_or([0, 0, 0])
}

/// HSL → `#RRGGBB`. `h` in degrees, `s`/`l` in percent (0–100).
pub fn hsl_to_hex(h: f32, s: f32, l: f32) -> String {
    let l = l / 100.0;
    let a = s * l.min(1.0 - l) / 100.0;
    let f = |n: f32| -> u8 {
        let k = (n + h / 30.0) % 12.0;
        let c = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (255.0 * c).round() as u8
    };
    format!("#{:02x}{:02x}{:02x}", f(0.0), f(8.0), f(4.0))
}

/// Deterministic visually-distinct color for an index, spread around the hue
/// wheel by the golden angle so neighbouring indices never look alike.
pub fn unique_color(index: u32) -> String {
    let golden_angle = 137.508_f32;
    let hue = (index as f32 * golden_angle) % 360.0;
    let sat = 65.0 + (index % 5) as f32 * 5.0;
    let lig = 45.0 + (index % 3) as f32 * 10.0;
    hsl_to_hex(hue, sat, lig)
}

/// Random mid-saturation color over the full hue range.
pub fn random_full_range_color<R: Rng>(rng: &mut R) -> String {
    let h = rng.gen_range(0..360) as f32;
    let s = rng.gen_range(50..100) as f32;
    let l = rng.gen_range(30..80) as f32;
    hsl_to_hex(h, s, l)
}

/// `count` colors evenly distributed around the hue wheel, starting from
/// `hue_offset` degrees. Saturation/lightness alternate slightly so adjacent
/// entries stay distinguishable even at high counts.
pub fn distributed_colors(count: usize, hue_offset: f32) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }
    let step = 360.0 / count as f32;
    (0..count)
        .map(|i| {
            let hue = (hue_offset + i as f32 * step) % 360.0;
            let sat = 70.0 + (i % 2) as f32 * 20.0;
            let lig = 45.0 + (i % 3) as f32 * 10.0;
            hsl_to_hex(hue, sat, lig)
        })
        .collect()
}

/// Fisher–Yates shuffle, in place.
pub fn shuffle<R: Rng, T>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn parses_six_digit_hex() {
        assert_eq!(parse_hex("#FF8000"), Some([255, 128, 0]));
        assert_eq!(parse_hex("#000000"), Some([0, 0, 0]));
    }

    #[test]
    fn parses_short_hex() {
        assert_eq!(parse_hex("#F00"), Some([255, 0, 0]));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(parse_hex("FF8000"), None);
        assert_eq!(parse_hex("#GG0000"), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex_or_black("nonsense"), [0, 0, 0]);
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl_to_hex(0.0, 100.0, 50.0), "#ff0000");
        assert_eq!(hsl_to_hex(120.0, 100.0, 50.0), "#00ff00");
        assert_eq!(hsl_to_hex(240.0, 100.0, 50.0), "#0000ff");
        assert_eq!(hsl_to_hex(0.0, 0.0, 100.0), "#ffffff");
        assert_eq!(hsl_to_hex(0.0, 0.0, 0.0), "#000000");
    }

    #[test]
    fn distributed_colors_count_and_validity() {
        let colors = distributed_colors(7, 42.0);
        assert_eq!(colors.len(), 7);
        for c in &colors {
            assert!(parse_hex(c).is_some(), "invalid hex: {c}");
        }
        assert!(distributed_colors(0, 0.0).is_empty());
    }

    #[test]
    fn unique_color_is_deterministic() {
        assert_eq!(unique_color(5), unique_color(5));
        assert_ne!(unique_color(0), unique_color(1));
    }

    #[test]
    fn shuffle_preserves_elements() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut v: Vec<u32> = (0..32).collect();
        shuffle(&mut rng, &mut v);
        let mut sorted = v.clone();
        sorted.sort();
        assert_eq!(sorted, (0..32).collect::<Vec<_>>());
    }
}
