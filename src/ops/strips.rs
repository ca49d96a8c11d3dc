//! Strip-level mutators: add/remove/update/reorder/recolor and the
//! fill-remaining helper. All multi-selection aware.

use rand::Rng;

use crate::color::{distributed_colors, palette_color, shuffle};
use crate::sheet::{Document, FillType, TrimStrip, TrimZone, mint_id};
use crate::validate::validate;

/// Partial strip update. `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct StripUpdate {
    pub name: Option<String>,
    pub height: Option<u32>,
    pub fill_type: Option<FillType>,
    pub base_color: Option<String>,
    pub subdivisions: Option<u32>,
    pub subdivision_colors: Option<Vec<String>>,
}

fn map_selected<F>(doc: &Document, selection: &[String], f: F) -> Document
where
    F: Fn(&TrimZone) -> TrimZone,
{
    let zones = doc
        .zones
        .iter()
        .map(|z| if selection.contains(&z.id) { f(z) } else { z.clone() })
        .collect();
    Document { config: doc.config.clone(), zones }
}

/// Append one default 128 px strip to every selected zone. The strip's
/// palette color and name follow the primary (first-selected) zone's strip
/// count so repeated adds cycle colors predictably.
pub fn add_strip(doc: &Document, selection: &[String]) -> Document {
    let Some(primary) = selection.first().and_then(|id| doc.zone(id)) else {
        return doc.clone();
    };
    let idx = primary.strips.len();
    let base = palette_color(idx);
    let template = TrimStrip::new(&format!("Strip_{}", idx + 1), 128, base, 1);

    map_selected(doc, selection, |z| {
        let mut zone = z.clone();
        let mut strip = template.clone();
        strip.id = mint_id();
        zone.strips.push(strip);
        zone
    })
}

/// Remove the strip with `strip_id` from every selected zone containing it.
/// Zones without that id are left as they were.
pub fn remove_strip(doc: &Document, selection: &[String], strip_id: &str) -> Document {
    map_selected(doc, selection, |z| {
        let mut zone = z.clone();
        zone.strips.retain(|s| s.id != strip_id);
        zone
    })
}

/// Apply a partial update to the strip with `strip_id` in every selected
/// zone. Updating the base color without explicitly supplying subdivision
/// colors resets all subdivision slots to the new base, keeping plain
/// single-color strips consistent. The subdivision-count/color-list length
/// invariant is restored afterwards in every case.
pub fn update_strip(
    doc: &Document,
    selection: &[String],
    strip_id: &str,
    update: &StripUpdate,
) -> Document {
    map_selected(doc, selection, |z| {
        let mut zone = z.clone();
        for strip in zone.strips.iter_mut().filter(|s| s.id == strip_id) {
            if let Some(name) = &update.name {
                strip.name = name.clone();
            }
            if let Some(height) = update.height {
                strip.height = height;
            }
            if let Some(fill) = update.fill_type {
                strip.fill_type = fill;
            }
            if let Some(subs) = update.subdivisions {
                strip.subdivisions = subs.max(1);
            }
            if let Some(colors) = &update.subdivision_colors {
                strip.subdivision_colors = colors.clone();
            }
            if let Some(base) = &update.base_color {
                strip.base_color = base.clone();
                if update.subdivision_colors.is_none() {
                    strip.subdivision_colors =
                        vec![base.clone(); strip.subdivisions as usize];
                }
            }
            strip.sync_subdivision_colors();
        }
        zone
    })
}

/// Swap the strip at `index` with its neighbour at `index + direction`
/// (`direction` = ±1) in every selected zone. Out-of-bounds targets leave
/// that zone unchanged.
pub fn move_strip(doc: &Document, selection: &[String], index: usize, direction: i32) -> Document {
    map_selected(doc, selection, |z| {
        let mut zone = z.clone();
        let target = index as i64 + direction as i64;
        if target >= 0 && (target as usize) < zone.strips.len() && index < zone.strips.len() {
            zone.strips.swap(index, target as usize);
        }
        zone
    })
}

/// Append a checker "Reserve_Fill" strip sized to each zone's *own*
/// remaining space. Zones already at (or past) their target get nothing.
pub fn fill_remaining(doc: &Document, selection: &[String]) -> Document {
    let fits = validate(doc);
    map_selected(doc, selection, |z| {
        let mut zone = z.clone();
        let remaining = fits.zone(&z.id).map(|f| f.remaining).unwrap_or(0);
        if remaining > 0 {
            let strip = TrimStrip::new("Reserve_Fill", remaining as u32, "#333333", 1)
                .with_fill(FillType::Checker);
            zone.strips.push(strip);
        }
        zone
    })
}

/// Recolor every subdivision slot of the primary zone with shuffled
/// hue-distributed colors, then mirror that strip content to all selected
/// zones. The hue wheel start is randomized so each run yields a fresh
/// palette.
pub fn unique_colors<R: Rng>(doc: &Document, selection: &[String], rng: &mut R) -> Document {
    let Some(primary) = selection.first().and_then(|id| doc.zone(id)) else {
        return doc.clone();
    };

    let total_slots: usize = primary.strips.iter().map(|s| s.subdivisions.max(1) as usize).sum();
    if total_slots == 0 {
        return doc.clone();
    }

    let hue_offset = rng.gen_range(0..360) as f32;
    let mut palette = distributed_colors(total_slots, hue_offset);
    shuffle(rng, &mut palette);

    let mut color_index = 0usize;
    let colored: Vec<TrimStrip> = primary
        .strips
        .iter()
        .map(|s| {
            let mut strip = s.clone();
            let slots = strip.subdivisions.max(1) as usize;
            let colors: Vec<String> = (0..slots)
                .map(|_| {
                    let c = palette[color_index % palette.len()].clone();
                    color_index += 1;
                    c
                })
                .collect();
            strip.base_color = colors[0].clone();
            strip.subdivision_colors = colors;
            strip
        })
        .collect();

    map_selected(doc, selection, |z| {
        let mut zone = z.clone();
        zone.strips = colored.clone();
        zone
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::parse_hex;
    use crate::sheet::{LayoutMode, SheetConfig, TrimZone};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn doc_two_zones() -> (Document, Vec<String>) {
        let mk = |id: &str, x: f32| TrimZone {
            id: id.to_string(),
            name: id.to_string(),
            x,
            y: 0.0,
            width: 0.5,
            height: 1.0,
            layout_mode: LayoutMode::Horizontal,
            strips: vec![
                TrimStrip::new("A", 512, "#ff0000", 1),
                TrimStrip::new("B", 512, "#00ff00", 2),
            ],
        };
        let doc = Document {
            config: SheetConfig::default(),
            zones: vec![mk("z1", 0.0), mk("z2", 0.5)],
        };
        let sel = doc.all_zone_ids();
        (doc, sel)
    }

    #[test]
    fn add_strip_appends_to_all_selected() {
        let (doc, sel) = doc_two_zones();
        let out = add_strip(&doc, &sel);
        assert_eq!(out.zones[0].strips.len(), 3);
        assert_eq!(out.zones[1].strips.len(), 3);
        assert_eq!(out.zones[0].strips[2].height, 128);
        // Fresh ids per zone, never shared.
        assert_ne!(out.zones[0].strips[2].id, out.zones[1].strips[2].id);
        // Input untouched.
        assert_eq!(doc.zones[0].strips.len(), 2);
    }

    #[test]
    fn remove_strip_is_noop_for_unknown_id() {
        let (doc, sel) = doc_two_zones();
        let out = remove_strip(&doc, &sel, "does-not-exist");
        assert_eq!(out, doc);
    }

    #[test]
    fn remove_strip_only_touches_selected_zones() {
        let (doc, _) = doc_two_zones();
        let victim = doc.zones[0].strips[0].id.clone();
        let out = remove_strip(&doc, &["z1".to_string()], &victim);
        assert_eq!(out.zones[0].strips.len(), 1);
        assert_eq!(out.zones[1].strips.len(), 2);
    }

    #[test]
    fn base_color_update_resets_subdivision_colors() {
        let (doc, sel) = doc_two_zones();
        let id = doc.zones[0].strips[1].id.clone();
        let update = StripUpdate {
            base_color: Some("#123456".to_string()),
            ..StripUpdate::default()
        };
        let out = update_strip(&doc, &sel, &id, &update);
        let strip = &out.zones[0].strips[1];
        assert_eq!(strip.base_color, "#123456");
        assert_eq!(strip.subdivision_colors, vec!["#123456".to_string(); 2]);
    }

    #[test]
    fn explicit_subdivision_colors_survive_base_color_update() {
        let (doc, sel) = doc_two_zones();
        let id = doc.zones[0].strips[1].id.clone();
        let update = StripUpdate {
            base_color: Some("#123456".to_string()),
            subdivision_colors: Some(vec!["#aaa111".to_string(), "#bbb222".to_string()]),
            ..StripUpdate::default()
        };
        let out = update_strip(&doc, &sel, &id, &update);
        let strip = &out.zones[0].strips[1];
        assert_eq!(
            strip.subdivision_colors,
            vec!["#aaa111".to_string(), "#bbb222".to_string()]
        );
    }

    #[test]
    fn subdivision_count_change_restores_invariant() {
        let (doc, sel) = doc_two_zones();
        let id = doc.zones[0].strips[0].id.clone();
        let update = StripUpdate { subdivisions: Some(6), ..StripUpdate::default() };
        let out = update_strip(&doc, &sel, &id, &update);
        let strip = &out.zones[0].strips[0];
        assert_eq!(strip.subdivisions, 6);
        assert_eq!(strip.subdivision_colors.len(), 6);
    }

    #[test]
    fn move_strip_swaps_within_bounds_only() {
        let (doc, sel) = doc_two_zones();
        let out = move_strip(&doc, &sel, 0, 1);
        assert_eq!(out.zones[0].strips[0].name, "B");
        assert_eq!(out.zones[0].strips[1].name, "A");

        let out = move_strip(&doc, &sel, 0, -1);
        assert_eq!(out, doc);
        let out = move_strip(&doc, &sel, 1, 1);
        assert_eq!(out, doc);
    }

    #[test]
    fn fill_remaining_uses_each_zones_own_gap() {
        let (mut doc, sel) = doc_two_zones();
        // z1 needs 1024 more; z2 is already exact.
        doc.zones[0].strips[1].height = 512;
        doc.zones[1].strips[0].height = 1536;
        let out = fill_remaining(&doc, &sel);
        assert_eq!(out.zones[0].strips.len(), 3);
        let fill = &out.zones[0].strips[2];
        assert_eq!(fill.height, 1024);
        assert_eq!(fill.fill_type, FillType::Checker);
        assert_eq!(fill.name, "Reserve_Fill");
        assert_eq!(out.zones[1].strips.len(), 2);
    }

    #[test]
    fn unique_colors_assigns_valid_colors_to_every_slot() {
        let (doc, sel) = doc_two_zones();
        let mut rng = StdRng::seed_from_u64(5);
        let out = unique_colors(&doc, &sel, &mut rng);
        for zone in &out.zones {
            for strip in &zone.strips {
                assert_eq!(strip.subdivision_colors.len(), strip.subdivisions.max(1) as usize);
                assert_eq!(strip.base_color, strip.subdivision_colors[0]);
                for c in &strip.subdivision_colors {
                    assert!(parse_hex(c).is_some());
                }
            }
        }
        // Mirrored: both zones show the primary zone's coloring.
        assert_eq!(
            out.zones[0].strips[1].subdivision_colors,
            out.zones[1].strips[1].subdivision_colors
        );
    }

    #[test]
    fn mutators_do_not_share_nested_state_with_input() {
        let (doc, sel) = doc_two_zones();
        let mut out = add_strip(&doc, &sel);
        out.zones[0].strips[0].subdivision_colors[0] = "#changed".to_string();
        assert_eq!(doc.zones[0].strips[0].subdivision_colors[0], "#ff0000");
    }
}
