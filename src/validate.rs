//! Size validation: per zone, the sum of strip sizes versus the zone's
//! target extent in pixels. Pure recomputation over the document — nothing
//! is cached and nothing is ever auto-corrected here. A mismatch is an
//! advisory state the editor surfaces, not an error.

use std::collections::HashMap;

use crate::sheet::Document;

/// Fit report for one zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneFit {
    /// Sum of the zone's strip sizes, in pixels.
    pub current_size: i32,
    /// Zone extent along its main axis × sheet resolution, rounded.
    pub target_size: i32,
    /// `target - current`. Positive means under-filled.
    pub remaining: i32,
    pub is_valid: bool,
}

/// Fit report for the whole document.
#[derive(Clone, Debug, Default)]
pub struct ValidationResult {
    /// AND over all zones.
    pub is_valid: bool,
    pub zones: HashMap<String, ZoneFit>,
}

impl ValidationResult {
    pub fn zone(&self, id: &str) -> Option<&ZoneFit> {
        self.zones.get(id)
    }
}

/// Compute the fit of every zone against the current sheet configuration.
pub fn validate(doc: &Document) -> ValidationResult {
    let mut zones = HashMap::with_capacity(doc.zones.len());
    let mut all_valid = true;

    for zone in &doc.zones {
        let current: u32 = zone.strips.iter().map(|s| s.height).sum();
        let target = zone.target_size(&doc.config);
        // Sub-pixel slack from the normalized zone extent is tolerated.
        let is_valid = (current as f32 - target).abs() < 1.0;
        if !is_valid {
            all_valid = false;
        }
        zones.insert(
            zone.id.clone(),
            ZoneFit {
                current_size: current as i32,
                target_size: target.round() as i32,
                remaining: (target - current as f32).round() as i32,
                is_valid,
            },
        );
    }

    ValidationResult { is_valid: all_valid, zones }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{Document, SheetConfig, TrimStrip, TrimZone};

    fn doc_with_heights(heights: &[u32]) -> Document {
        let strips = heights
            .iter()
            .enumerate()
            .map(|(i, &h)| TrimStrip::new(&format!("S{i}"), h, "#ff0000", 1))
            .collect();
        let mut zone = TrimZone::full_sheet(strips);
        // Target 1000 px on a 2000 px sheet.
        zone.height = 0.5;
        let config = SheetConfig { width: 2000, height: 2000, ..SheetConfig::default() };
        Document { config, zones: vec![zone] }
    }

    #[test]
    fn exact_fill_is_valid() {
        let doc = doc_with_heights(&[600, 400]);
        let v = validate(&doc);
        let fit = v.zone("main_zone").unwrap();
        assert!(fit.is_valid);
        assert_eq!(fit.current_size, 1000);
        assert_eq!(fit.target_size, 1000);
        assert_eq!(fit.remaining, 0);
        assert!(v.is_valid);
    }

    #[test]
    fn underfill_reports_remaining() {
        let doc = doc_with_heights(&[600, 300]);
        let v = validate(&doc);
        let fit = v.zone("main_zone").unwrap();
        assert!(!fit.is_valid);
        assert_eq!(fit.current_size, 900);
        assert_eq!(fit.remaining, 100);
        assert!(!v.is_valid);
    }

    #[test]
    fn overfill_is_invalid_with_negative_remaining() {
        let doc = doc_with_heights(&[600, 500]);
        let fit = validate(&doc).zone("main_zone").copied().unwrap();
        assert!(!fit.is_valid);
        assert_eq!(fit.remaining, -100);
    }

    #[test]
    fn document_validity_is_and_over_zones() {
        let mut doc = doc_with_heights(&[1000]);
        let mut bad = TrimZone::full_sheet(vec![TrimStrip::new("X", 10, "#fff", 1)]);
        bad.id = "bad".to_string();
        bad.height = 0.5;
        doc.zones.push(bad);
        let v = validate(&doc);
        assert!(v.zone("main_zone").unwrap().is_valid);
        assert!(!v.zone("bad").unwrap().is_valid);
        assert!(!v.is_valid);
    }

    #[test]
    fn vertical_zone_targets_width() {
        let mut doc = doc_with_heights(&[500]);
        doc.zones[0].layout_mode = crate::sheet::LayoutMode::Vertical;
        doc.zones[0].width = 0.25;
        let fit = validate(&doc).zone("main_zone").copied().unwrap();
        assert_eq!(fit.target_size, 500);
        assert!(fit.is_valid);
    }
}
