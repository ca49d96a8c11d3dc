//! Projection synchronizer: slices one sheet-level strip sequence across a
//! set of selected zones so a single continuous pattern reads correctly
//! over zone boundaries (a floor texture spanning four quadrants, say).
//!
//! The first selected zone is the master; its layout mode picks the single
//! projection axis for every selected zone. Mixing orientations in one
//! selection is allowed — the result is well defined but follows the master
//! alone.

use crate::sheet::{Document, LayoutMode, TrimStrip, TrimZone, mint_id};

/// One global strip positioned as an absolute pixel interval `[start, end)`.
struct Segment<'a> {
    strip: &'a TrimStrip,
    start: i64,
    end: i64,
}

/// Replace the strips of every selected zone with its slice of
/// `global_strips`, projected along the master zone's axis.
///
/// Each zone ends up with local strips that exactly tile the zone's own
/// pixel span: interval intersection over a partition leaves no gaps and no
/// overlaps. Every materialized strip gets a fresh id. Zones outside the
/// selection, and the document itself when the selection is empty or names
/// no known zone, come back unchanged.
pub fn project_onto_zones(
    doc: &Document,
    selection: &[String],
    global_strips: &[TrimStrip],
) -> Document {
    let Some(master) = selection.first().and_then(|id| doc.zone(id)) else {
        return doc.clone();
    };
    let axis_vertical = master.layout_mode == LayoutMode::Vertical;

    // Global strips → absolute segments via running cumulative sum.
    let mut pos = 0i64;
    let segments: Vec<Segment> = global_strips
        .iter()
        .map(|s| {
            let seg = Segment { strip: s, start: pos, end: pos + s.height as i64 };
            pos = seg.end;
            seg
        })
        .collect();

    let zones = doc
        .zones
        .iter()
        .map(|z| {
            if !selection.contains(&z.id) {
                return z.clone();
            }
            let (z_start, z_end) = zone_span(z, doc, axis_vertical);
            let local: Vec<TrimStrip> = segments
                .iter()
                .filter_map(|seg| {
                    let start = seg.start.max(z_start);
                    let end = seg.end.min(z_end);
                    if end <= start {
                        return None;
                    }
                    let mut strip = seg.strip.clone();
                    strip.id = mint_id();
                    strip.height = (end - start) as u32;
                    Some(strip)
                })
                .collect();
            TrimZone { strips: local, ..z.clone() }
        })
        .collect();

    Document { config: doc.config.clone(), zones }
}

/// A zone's pixel interval along the projection axis.
fn zone_span(zone: &TrimZone, doc: &Document, axis_vertical: bool) -> (i64, i64) {
    if axis_vertical {
        let w = doc.config.width as f32;
        (
            (zone.x * w).round() as i64,
            ((zone.x + zone.width) * w).round() as i64,
        )
    } else {
        let h = doc.config.height as f32;
        (
            (zone.y * h).round() as i64,
            ((zone.y + zone.height) * h).round() as i64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{LayoutMode, SheetConfig, TrimStrip, TrimZone};

    fn zone(id: &str, x: f32, w: f32, mode: LayoutMode) -> TrimZone {
        TrimZone {
            id: id.to_string(),
            name: id.to_string(),
            x,
            y: 0.0,
            width: w,
            height: 1.0,
            layout_mode: mode,
            strips: Vec::new(),
        }
    }

    fn two_column_doc() -> Document {
        let config = SheetConfig { width: 2048, height: 2048, ..SheetConfig::default() };
        Document {
            config,
            zones: vec![
                zone("left", 0.0, 0.5, LayoutMode::Vertical),
                zone("right", 0.5, 0.5, LayoutMode::Vertical),
            ],
        }
    }

    fn strips(heights: &[u32]) -> Vec<TrimStrip> {
        heights
            .iter()
            .enumerate()
            .map(|(i, &h)| TrimStrip::new(&format!("G{i}"), h, "#ff0000", 1))
            .collect()
    }

    #[test]
    fn splits_global_sequence_at_zone_boundary() {
        let doc = two_column_doc();
        let sel = vec!["left".to_string(), "right".to_string()];
        let out = project_onto_zones(&doc, &sel, &strips(&[800, 800, 448]));

        let left: Vec<u32> = out.zones[0].strips.iter().map(|s| s.height).collect();
        let right: Vec<u32> = out.zones[1].strips.iter().map(|s| s.height).collect();
        // [0,800) fits; [800,1600) is cut at 1024.
        assert_eq!(left, vec![800, 224]);
        assert_eq!(right, vec![576, 448]);
        assert_eq!(left.iter().sum::<u32>(), 1024);
        assert_eq!(right.iter().sum::<u32>(), 1024);
    }

    #[test]
    fn each_zone_tiles_its_own_span() {
        let config = SheetConfig { width: 2048, height: 2048, ..SheetConfig::default() };
        let doc = Document {
            config,
            zones: vec![
                zone("a", 0.0, 1.0 / 3.0, LayoutMode::Vertical),
                zone("b", 1.0 / 3.0, 1.0 / 3.0, LayoutMode::Vertical),
                zone("c", 2.0 / 3.0, 1.0 / 3.0, LayoutMode::Vertical),
            ],
        };
        let sel = doc.all_zone_ids();
        let out = project_onto_zones(&doc, &sel, &strips(&[512, 512, 512, 512]));
        for z in &out.zones {
            let w = doc.config.width as f32;
            let span = ((z.x + z.width) * w).round() as u32 - (z.x * w).round() as u32;
            let total: u32 = z.strips.iter().map(|s| s.height).sum();
            assert_eq!(total, span, "zone {}", z.id);
            assert!(z.strips.iter().all(|s| s.height > 0));
        }
    }

    #[test]
    fn unselected_zones_are_untouched() {
        let mut doc = two_column_doc();
        doc.zones[1].strips = strips(&[1024]);
        let old_id = doc.zones[1].strips[0].id.clone();
        let sel = vec!["left".to_string()];
        let out = project_onto_zones(&doc, &sel, &strips(&[1024]));
        assert_eq!(out.zones[1].strips[0].id, old_id);
        assert_eq!(out.zones[0].strips.len(), 1);
    }

    #[test]
    fn local_strips_get_fresh_ids() {
        let doc = two_column_doc();
        let globals = strips(&[2048]);
        let global_id = globals[0].id.clone();
        let sel = doc.all_zone_ids();
        let out = project_onto_zones(&doc, &sel, &globals);
        assert_ne!(out.zones[0].strips[0].id, global_id);
        assert_ne!(out.zones[0].strips[0].id, out.zones[1].strips[0].id);
    }

    #[test]
    fn master_axis_governs_mixed_orientations() {
        let mut doc = two_column_doc();
        // Right zone is horizontal, but the vertical master projects on X.
        doc.zones[1].layout_mode = LayoutMode::Horizontal;
        let sel = vec!["left".to_string(), "right".to_string()];
        let out = project_onto_zones(&doc, &sel, &strips(&[1024, 1024]));
        let right_total: u32 = out.zones[1].strips.iter().map(|s| s.height).sum();
        assert_eq!(right_total, 1024);
    }

    #[test]
    fn empty_selection_is_a_no_op() {
        let doc = two_column_doc();
        let out = project_onto_zones(&doc, &[], &strips(&[2048]));
        assert_eq!(out, doc);
    }

    #[test]
    fn segments_outside_every_zone_are_dropped() {
        let doc = two_column_doc();
        let sel = vec!["left".to_string()];
        // Second global strip lies wholly in the right half.
        let out = project_onto_zones(&doc, &sel, &strips(&[1024, 1024]));
        assert_eq!(out.zones[0].strips.len(), 1);
        assert_eq!(out.zones[0].strips[0].height, 1024);
    }
}
