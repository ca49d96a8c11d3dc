//! Zone topology generation and sheet-level reconfiguration.

use crate::generators::default_zone_strips;
use crate::sheet::{Document, LayoutMode, SheetConfig, TrimZone};

/// The closed set of zone topologies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPreset {
    /// One full-sheet zone.
    Single,
    /// 2×2 quadrants.
    Quad,
    /// Top/bottom halves.
    SplitH,
    /// Left/right halves.
    SplitV,
    /// 2 rows × 3 columns.
    SixPack,
    /// 3×3 grid.
    Grid9,
}

impl LayoutPreset {
    pub fn parse(s: &str) -> Option<LayoutPreset> {
        match s {
            "single" => Some(LayoutPreset::Single),
            "quad" => Some(LayoutPreset::Quad),
            "split_h" => Some(LayoutPreset::SplitH),
            "split_v" => Some(LayoutPreset::SplitV),
            "six_pack" => Some(LayoutPreset::SixPack),
            "grid_9" => Some(LayoutPreset::Grid9),
            _ => None,
        }
    }

    pub fn all() -> &'static [LayoutPreset] {
        &[
            LayoutPreset::Single,
            LayoutPreset::Quad,
            LayoutPreset::SplitH,
            LayoutPreset::SplitV,
            LayoutPreset::SixPack,
            LayoutPreset::Grid9,
        ]
    }
}

/// One planned zone: normalized rect, orientation, and the deterministic
/// seed index used to stagger the default palette per position.
#[derive(Clone, Debug, PartialEq)]
pub struct ZonePlan {
    pub id: &'static str,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub layout_mode: LayoutMode,
    pub seed: u32,
}

fn slot(
    id: &'static str,
    name: String,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    mode: LayoutMode,
    seed: u32,
) -> ZonePlan {
    ZonePlan { id, name, x, y, width: w, height: h, layout_mode: mode, seed }
}

/// Declarative topology table. Kept separate from zone construction so the
/// geometry can be checked without generating strips.
pub fn plan(preset: LayoutPreset) -> Vec<ZonePlan> {
    use LayoutMode::{Horizontal, Vertical};
    match preset {
        LayoutPreset::Single => {
            vec![slot("main", "Main Layout".into(), 0.0, 0.0, 1.0, 1.0, Horizontal, 0)]
        }
        LayoutPreset::Quad => vec![
            slot("tl", "Top Left".into(), 0.0, 0.0, 0.5, 0.5, Horizontal, 0),
            slot("tr", "Top Right".into(), 0.5, 0.0, 0.5, 0.5, Horizontal, 1),
            slot("bl", "Bot Left".into(), 0.0, 0.5, 0.5, 0.5, Vertical, 2),
            slot("br", "Bot Right".into(), 0.5, 0.5, 0.5, 0.5, Vertical, 3),
        ],
        LayoutPreset::SplitH => vec![
            slot("top", "Top Half".into(), 0.0, 0.0, 1.0, 0.5, Horizontal, 0),
            slot("bot", "Bottom Half".into(), 0.0, 0.5, 1.0, 0.5, Horizontal, 1),
        ],
        LayoutPreset::SplitV => vec![
            slot("left", "Left Half".into(), 0.0, 0.0, 0.5, 1.0, Vertical, 0),
            slot("right", "Right Half".into(), 0.5, 0.0, 0.5, 1.0, Vertical, 1),
        ],
        LayoutPreset::SixPack => {
            const IDS: [&str; 6] = ["zp_0_0", "zp_0_1", "zp_0_2", "zp_1_0", "zp_1_1", "zp_1_2"];
            let mut out = Vec::with_capacity(6);
            for r in 0..2u32 {
                for c in 0..3u32 {
                    out.push(slot(
                        IDS[(r * 3 + c) as usize],
                        format!("Zone R{}:C{}", r + 1, c + 1),
                        c as f32 / 3.0,
                        r as f32 * 0.5,
                        1.0 / 3.0,
                        0.5,
                        Vertical,
                        r * 3 + c,
                    ));
                }
            }
            out
        }
        LayoutPreset::Grid9 => {
            const IDS: [&str; 9] = [
                "g9_0_0", "g9_0_1", "g9_0_2", "g9_1_0", "g9_1_1", "g9_1_2", "g9_2_0", "g9_2_1",
                "g9_2_2",
            ];
            let mut out = Vec::with_capacity(9);
            for r in 0..3u32 {
                for c in 0..3u32 {
                    out.push(slot(
                        IDS[(r * 3 + c) as usize],
                        format!("Grid {}-{}", r + 1, c + 1),
                        c as f32 / 3.0,
                        r as f32 / 3.0,
                        1.0 / 3.0,
                        1.0 / 3.0,
                        Vertical,
                        r * 3 + c,
                    ));
                }
            }
            out
        }
    }
}

/// Replace the whole zone set with a fresh topology. Each new zone is
/// seeded with the default 25/50/25 fill against its own pixel extent.
/// Callers should clear the active selection afterwards — the old zone ids
/// are gone.
pub fn generate_layout(doc: &Document, preset: LayoutPreset) -> Document {
    let config = doc.config.clone();
    let zones = plan(preset)
        .into_iter()
        .map(|p| {
            let zone_px = match p.layout_mode {
                LayoutMode::Vertical => (p.width * config.width as f32).round() as u32,
                LayoutMode::Horizontal => (p.height * config.height as f32).round() as u32,
            };
            TrimZone {
                id: p.id.to_string(),
                name: p.name,
                x: p.x,
                y: p.y,
                width: p.width,
                height: p.height,
                layout_mode: p.layout_mode,
                strips: default_zone_strips(zone_px, p.seed),
            }
        })
        .collect();
    Document { config, zones }
}

/// Set the stacking orientation of every selected zone. Strip sizes are
/// left alone — the validation report shows any resulting mismatch.
pub fn set_orientation(doc: &Document, selection: &[String], mode: LayoutMode) -> Document {
    let zones = doc
        .zones
        .iter()
        .map(|z| {
            if selection.contains(&z.id) {
                TrimZone { layout_mode: mode, ..z.clone() }
            } else {
                z.clone()
            }
        })
        .collect();
    Document { config: doc.config.clone(), zones }
}

/// Change the square canvas resolution, rescaling every strip in every zone
/// by `new_size / old_size` (rounded, minimum 1 px) so the proportional
/// layout is preserved.
pub fn change_resolution(doc: &Document, new_size: u32) -> Document {
    let ratio = new_size as f32 / doc.config.height as f32;
    let zones = doc
        .zones
        .iter()
        .map(|z| {
            let mut zone = z.clone();
            for strip in &mut zone.strips {
                strip.height = ((strip.height as f32 * ratio).round() as u32).max(1);
            }
            zone
        })
        .collect();
    let config = SheetConfig { width: new_size, height: new_size, ..doc.config.clone() };
    Document { config, zones }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;

    #[test]
    fn plans_cover_expected_zone_counts() {
        assert_eq!(plan(LayoutPreset::Single).len(), 1);
        assert_eq!(plan(LayoutPreset::Quad).len(), 4);
        assert_eq!(plan(LayoutPreset::SplitH).len(), 2);
        assert_eq!(plan(LayoutPreset::SplitV).len(), 2);
        assert_eq!(plan(LayoutPreset::SixPack).len(), 6);
        assert_eq!(plan(LayoutPreset::Grid9).len(), 9);
    }

    #[test]
    fn plans_tile_the_unit_square() {
        for &preset in LayoutPreset::all() {
            let area: f32 = plan(preset).iter().map(|p| p.width * p.height).sum();
            assert!((area - 1.0).abs() < 1e-5, "{preset:?} area {area}");
        }
    }

    #[test]
    fn generated_layouts_validate_cleanly() {
        let doc = Document::default();
        for &preset in LayoutPreset::all() {
            let out = generate_layout(&doc, preset);
            let v = validate(&out);
            assert!(v.is_valid, "{preset:?} produced invalid zones");
            assert!(out.zones.iter().all(|z| !z.strips.is_empty()));
        }
    }

    #[test]
    fn sibling_zones_get_distinct_seeds() {
        let doc = Document::default();
        let out = generate_layout(&doc, LayoutPreset::Quad);
        assert_ne!(
            out.zones[0].strips[0].base_color,
            out.zones[1].strips[0].base_color
        );
    }

    #[test]
    fn resolution_change_rescales_and_stays_valid() {
        let doc = Document::default(); // 2048, strips sum to 2048
        let out = change_resolution(&doc, 4096);
        assert_eq!(out.config.width, 4096);
        assert_eq!(out.config.height, 4096);
        assert!(validate(&out).is_valid);
    }

    #[test]
    fn resolution_roundtrip_within_rounding_tolerance() {
        let doc = Document::default();
        let there = change_resolution(&doc, 1024);
        let back = change_resolution(&there, 2048);
        for (a, b) in doc.zones[0].strips.iter().zip(&back.zones[0].strips) {
            let diff = (a.height as i64 - b.height as i64).abs();
            assert!(diff <= 1, "{} vs {}", a.height, b.height);
        }
    }

    #[test]
    fn resolution_change_clamps_to_one_pixel() {
        let mut doc = Document::default();
        doc.zones[0].strips[0].height = 1;
        let out = change_resolution(&doc, 1024);
        assert!(out.zones[0].strips[0].height >= 1);
    }

    #[test]
    fn set_orientation_touches_only_selection() {
        let doc = generate_layout(&Document::default(), LayoutPreset::SplitH);
        let out = set_orientation(&doc, &["top".to_string()], LayoutMode::Vertical);
        assert_eq!(out.zones[0].layout_mode, LayoutMode::Vertical);
        assert_eq!(out.zones[1].layout_mode, LayoutMode::Horizontal);
    }
}
