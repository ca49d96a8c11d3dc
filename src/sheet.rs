//! Document model for a trim sheet: the square canvas configuration, the
//! rectangular zones subdividing it, and the colored strips stacked inside
//! each zone. Everything here serializes to the camelCase JSON produced by
//! the export format, so saved sheets round-trip byte-compatibly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::palette_color;

/// Square canvas resolutions offered by the resolution switcher.
pub const RESOLUTIONS: [u32; 3] = [1024, 2048, 4096];

/// Texel density targets in pixels per meter.
pub const TEXEL_DENSITY_OPTIONS: [u32; 6] = [128, 256, 512, 1024, 2048, 4096];

/// Mint a fresh unique id for a zone or strip. Ids are plain strings on the
/// wire; uuids guarantee no collisions when a strip is duplicated into
/// several zones at once.
pub fn mint_id() -> String {
    Uuid::new_v4().simple().to_string()
}

// ============================================================================
// Enums
// ============================================================================

/// How the whole sheet is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// Flat ID-map colors.
    #[default]
    Solid,
    /// Flat colors plus a depth-simulating gradient overlay per segment.
    Gradient,
    /// Wireframe: only segment outlines are kept.
    Outline,
}

/// What fills the inside of a wireframe segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineFillStyle {
    #[default]
    Solid,
    Transparent,
}

/// Stacking direction for strips within a zone. Horizontal zones stack
/// strips top-to-bottom (strip size consumes zone height); vertical zones
/// stack left-to-right (strip size consumes zone width).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Horizontal,
    Vertical,
}

/// Per-strip fill pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillType {
    #[default]
    Flat,
    Checker,
    Noise,
    GradientV,
}

impl FillType {
    pub fn label(&self) -> &'static str {
        match self {
            FillType::Flat => "Solid Color (ID Map)",
            FillType::Checker => "Checker Pattern",
            FillType::Noise => "Noise Overlay",
            FillType::GradientV => "Gradient Overlay",
        }
    }

    pub fn all() -> &'static [FillType] {
        &[FillType::Flat, FillType::Checker, FillType::Noise, FillType::GradientV]
    }
}

// ============================================================================
// Core records
// ============================================================================

/// Canvas-level configuration. Width and height are always equal; resolution
/// changes go through [`crate::ops::layout::change_resolution`] which updates
/// both sides symmetrically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetConfig {
    pub width: u32,
    pub height: u32,
    /// Export filename stem (`{name}.png`, `{name}.json`).
    pub name: String,
    pub render_style: RenderStyle,
    /// Border width in pixels, used only when `render_style` is `Outline`.
    pub outline_thickness: u32,
    pub outline_fill_style: OutlineFillStyle,
    pub show_texel_density: bool,
    /// Pixels per meter for the physical-scale reference grid.
    pub texel_density_target: u32,
    /// Hex color of the dashed subdivision grid lines.
    pub strip_grid_color: String,
    /// Saturation multiplier, 0.0–2.0 with 1.0 neutral.
    pub global_saturation: f32,
    /// Brightness multiplier, 0.0–2.0 with 1.0 neutral.
    pub global_brightness: f32,
    /// Whether the saturation/brightness filters bake into the exported
    /// raster. On-screen rendering always applies them.
    pub export_post_processing: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            width: 2048,
            height: 2048,
            name: "T_Trim_Layout".to_string(),
            render_style: RenderStyle::Solid,
            outline_thickness: 4,
            outline_fill_style: OutlineFillStyle::Solid,
            show_texel_density: false,
            texel_density_target: 512,
            strip_grid_color: "#000000".to_string(),
            global_saturation: 1.0,
            global_brightness: 1.0,
            export_post_processing: true,
        }
    }
}

/// One ordered segment of a zone's stack.
///
/// `height` is the size in pixels along the zone's *main* axis — the field
/// name is historical and applies to width when the zone is vertical.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimStrip {
    pub id: String,
    pub name: String,
    pub height: u32,
    pub fill_type: FillType,
    pub base_color: String,
    /// Count of equal cross-axis slices, always ≥ 1.
    pub subdivisions: u32,
    /// One color per subdivision. Length always equals `subdivisions`;
    /// call [`TrimStrip::sync_subdivision_colors`] after editing either.
    pub subdivision_colors: Vec<String>,
}

impl TrimStrip {
    /// New strip with a fresh id and subdivision colors seeded from the base.
    pub fn new(name: &str, height: u32, base_color: &str, subdivisions: u32) -> Self {
        let subs = subdivisions.max(1);
        TrimStrip {
            id: mint_id(),
            name: name.to_string(),
            height,
            fill_type: FillType::Flat,
            base_color: base_color.to_string(),
            subdivisions: subs,
            subdivision_colors: vec![base_color.to_string(); subs as usize],
        }
    }

    pub fn with_fill(mut self, fill: FillType) -> Self {
        self.fill_type = fill;
        self
    }

    /// Restore `subdivision_colors.len() == subdivisions`, preserving
    /// overlapping indices and padding new slots with the base color.
    pub fn sync_subdivision_colors(&mut self) {
        self.subdivisions = self.subdivisions.max(1);
        let want = self.subdivisions as usize;
        if self.subdivision_colors.len() > want {
            self.subdivision_colors.truncate(want);
        } else {
            while self.subdivision_colors.len() < want {
                self.subdivision_colors.push(self.base_color.clone());
            }
        }
    }

    /// Color of subdivision `i`, falling back to the base color when the
    /// stored list is short (possible on hand-edited imports).
    pub fn subdivision_color(&self, i: usize) -> &str {
        self.subdivision_colors
            .get(i)
            .map(String::as_str)
            .unwrap_or(&self.base_color)
    }
}

/// A rectangular region of the sheet holding an ordered strip stack.
/// Position and size are normalized 0–1 fractions of the sheet; zones may
/// overlap or leave gaps — no partition is enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimZone {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub layout_mode: LayoutMode,
    pub strips: Vec<TrimStrip>,
}

impl TrimZone {
    /// Full-sheet zone wrapping a strip list (used by the built-in presets).
    pub fn full_sheet(strips: Vec<TrimStrip>) -> Self {
        TrimZone {
            id: "main_zone".to_string(),
            name: "Main Layout".to_string(),
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            layout_mode: LayoutMode::Horizontal,
            strips,
        }
    }

    /// Size in pixels this zone's strips should sum to, measured along the
    /// zone's main axis at the given sheet configuration.
    pub fn target_size(&self, config: &SheetConfig) -> f32 {
        match self.layout_mode {
            LayoutMode::Vertical => self.width * config.width as f32,
            LayoutMode::Horizontal => self.height * config.height as f32,
        }
    }
}

/// The whole in-memory document: canvas config plus zone list. Zone order
/// only affects iteration/display. Mutators never edit in place — they take
/// a document and hand back an independent copy (see [`crate::ops`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub config: SheetConfig,
    pub zones: Vec<TrimZone>,
}

impl Document {
    pub fn zone(&self, id: &str) -> Option<&TrimZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Ids of all zones, in document order. The usual "select everything"
    /// argument for the bulk mutators.
    pub fn all_zone_ids(&self) -> Vec<String> {
        self.zones.iter().map(|z| z.id.clone()).collect()
    }
}

impl Default for Document {
    /// The startup document is the Mixed Production preset.
    fn default() -> Self {
        presets()
            .into_iter()
            .find(|p| p.id == "mixed_standard")
            .map(|p| Document { config: p.config, zones: p.zones })
            .unwrap_or(Document { config: SheetConfig::default(), zones: Vec::new() })
    }
}

// ============================================================================
// Built-in presets
// ============================================================================

/// A named, shippable starting layout.
#[derive(Clone, Debug)]
pub struct Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub config: SheetConfig,
    pub zones: Vec<TrimZone>,
}

fn preset_config(name: &str) -> SheetConfig {
    SheetConfig { name: name.to_string(), ..SheetConfig::default() }
}

// (name, height, palette index, subdivisions)
fn strip_rows(rows: &[(&str, u32, usize, u32)]) -> Vec<TrimStrip> {
    rows.iter()
        .map(|&(name, height, color_idx, subs)| {
            TrimStrip::new(name, height, palette_color(color_idx), subs)
        })
        .collect()
}

/// All built-in presets. Fresh ids are minted on every call so loading the
/// same preset twice never aliases strip ids.
pub fn presets() -> Vec<Preset> {
    let uniform: Vec<TrimStrip> = (0..8)
        .map(|i| TrimStrip::new(&format!("Strip_{}_256px", i + 1), 256, palette_color(i), 1))
        .collect();

    let mixed = strip_rows(&[
        ("Main_Surface_Tiling", 512, 0, 1),
        ("Secondary_Surface", 256, 1, 1),
        ("Large_Trim_A", 256, 2, 1),
        ("Large_Trim_B", 256, 3, 1),
        ("Medium_Trim_A", 128, 4, 1),
        ("Medium_Trim_B", 128, 5, 1),
        ("Pattern_Grate_C", 128, 6, 4),
        ("Detail_Strip_A", 128, 7, 1),
        ("Micro_Trim_A", 64, 8, 1),
        ("Micro_Trim_B", 64, 9, 1),
        ("Border_Cap_A", 64, 10, 1),
        ("Border_Cap_B", 64, 11, 1),
    ]);

    let scifi = strip_rows(&[
        ("Hazard_Trim_Top", 64, 0, 16),
        ("Cabling_Bundle", 128, 1, 1),
        ("Small_Vents", 128, 2, 8),
        ("Tech_Panel_Main", 512, 3, 2),
        ("Large_Intake_Fan", 512, 4, 1),
        ("Greeble_Mechanism", 256, 5, 4),
        ("Pipes_Insulated", 256, 6, 1),
        ("Floor_Grating", 128, 7, 1),
        ("Warning_Stripe_Bot", 64, 8, 16),
    ]);

    let stone = strip_rows(&[
        ("Large_Slabs_A", 256, 0, 1),
        ("Large_Slabs_B", 256, 1, 1),
        ("Medium_Bricks_A", 128, 2, 1),
        ("Medium_Bricks_B", 128, 3, 1),
        ("Rough_Courses_Mixed", 256, 4, 1),
        ("Small_Tiles_A", 128, 5, 8),
        ("Small_Tiles_B", 128, 6, 8),
        ("Ornate_Trim_High", 256, 7, 1),
        ("Base_Molding", 256, 8, 1),
        ("Decal_Runes", 256, 9, 4),
    ]);

    let ultimate = vec![
        TrimStrip::new("LARGE_COVERAGE_AREA", 1024, "#60a5fa", 1),
        TrimStrip::new("MEDIUM_DETAIL_A", 256, "#e879f9", 1),
        TrimStrip::new("MEDIUM_DETAIL_B", 256, "#d946ef", 2),
        TrimStrip::new("SMALL_TRIM_A", 128, "#fdba74", 1),
        TrimStrip::new("SMALL_TRIM_B", 128, "#fb923c", 1),
        TrimStrip::new("END_CAPS_ROW", 128, "#86efac", 8),
        TrimStrip::new("DECALS_ROW", 128, "#4ade80", 8),
    ];

    vec![
        Preset {
            id: "uniform_256",
            label: "Uniform 8x 256px",
            config: preset_config("T_Uniform_Layout"),
            zones: vec![TrimZone::full_sheet(uniform)],
        },
        Preset {
            id: "mixed_standard",
            label: "Mixed Production (Standard)",
            config: preset_config("T_Mixed_Layout"),
            zones: vec![TrimZone::full_sheet(mixed)],
        },
        Preset {
            id: "scifi_complex",
            label: "Sci-Fi Complex Panel",
            config: preset_config("T_SciFi_Panel"),
            zones: vec![TrimZone::full_sheet(scifi)],
        },
        Preset {
            id: "stone_hierarchy",
            label: "Ancient Stone Wall",
            config: preset_config("T_Stone_Wall"),
            zones: vec![TrimZone::full_sheet(stone)],
        },
        Preset {
            id: "ultimate_stack",
            label: "Ultimate Trim Stack",
            config: preset_config("T_Ultimate_Layout"),
            zones: vec![TrimZone::full_sheet(ultimate)],
        },
    ]
}

/// Look up a preset by id.
pub fn preset_by_id(id: &str) -> Option<Preset> {
    presets().into_iter().find(|p| p.id == id)
}
