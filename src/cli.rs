// ============================================================================
// TrimForge CLI — headless trim sheet generation via command-line arguments
// ============================================================================
//
// Usage examples:
//   trimforge --preset scifi_complex --output sheet.png
//   trimforge -i layout.json --fill-remaining -o sheet.png --export-json out.json
//   trimforge --layout quad --randomize --seed 7 -o sheet.png
//   trimforge -i layout.json --validate
//
// Operations compose left to right on the in-memory document in a fixed
// pipeline order: load → resolution → layout → orientation → template →
// randomize → project → fill-remaining → colorize → overlays → outputs.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::generators::{random_strips, template_strips, ZoneTemplate};
use crate::io;
use crate::ops;
use crate::projection::project_onto_zones;
use crate::raster::{render_document, RenderMode, RenderOptions};
use crate::sheet::{preset_by_id, presets, Document, LayoutMode, TrimZone};
use crate::text::load_label_font;
use crate::validate::validate;
use crate::{log_err, log_info};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// TrimForge headless trim sheet generator.
///
/// Build, mutate, validate, and render trim sheet layouts without a GUI.
#[derive(Parser, Debug)]
#[command(
    name = "trimforge",
    about = "TrimForge headless trim sheet generator",
    long_about = "Generate trim sheet layout textures from presets, saved JSON\n\
                  layouts, or randomized strip stacks, and export them as PNG\n\
                  plus round-trippable JSON.\n\n\
                  Example:\n  \
                  trimforge --preset scifi_complex -o sheet.png\n  \
                  trimforge -i layout.json --fill-remaining --export-json out.json"
)]
pub struct CliArgs {
    /// Input layout JSON file. When omitted, start from --preset or the
    /// default mixed production layout.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Built-in preset id: uniform_256, mixed_standard, scifi_complex,
    /// stone_hierarchy, ultimate_stack. Ignored when --input is given.
    #[arg(short, long, value_name = "ID")]
    pub preset: Option<String>,

    /// List the built-in presets and zone templates, then exit.
    #[arg(long)]
    pub list: bool,

    /// Replace the zone topology: single, quad, split_h, split_v, six_pack,
    /// grid_9. Each new zone is seeded with the default strip fill.
    #[arg(long, value_name = "TOPOLOGY")]
    pub layout: Option<String>,

    /// Change the square sheet resolution (1024, 2048, or 4096), rescaling
    /// every strip proportionally.
    #[arg(short, long, value_name = "PIXELS")]
    pub resolution: Option<u32>,

    /// Zone ids to operate on. Defaults to every zone; the first id is the
    /// primary zone for template/projection/colorize operations.
    #[arg(short, long, value_name = "ZONE_ID", num_args = 1..)]
    pub select: Vec<String>,

    /// Set the stacking orientation of the selected zones: horizontal, vertical.
    #[arg(long, value_name = "MODE")]
    pub orientation: Option<String>,

    /// Replace the selected zones' strips with a named template: classic,
    /// uniform_4, uniform_8, single, detail_stack.
    #[arg(short, long, value_name = "NAME")]
    pub template: Option<String>,

    /// Replace the selected zones' strips with a weighted-random stack that
    /// exactly fills each zone.
    #[arg(long)]
    pub randomize: bool,

    /// Maximum strip count for --randomize.
    #[arg(long, default_value_t = 8, value_name = "N")]
    pub max_strips: u32,

    /// Tile the primary zone's strip sequence across the whole sheet and
    /// project it onto all selected zones, keeping boundaries aligned.
    #[arg(long)]
    pub project: bool,

    /// Append a reserve checker strip filling each selected zone's remaining
    /// space.
    #[arg(long)]
    pub fill_remaining: bool,

    /// Recolor every strip subdivision with shuffled hue-distributed colors.
    #[arg(long)]
    pub colorize: bool,

    /// Texel density target in pixels per meter for the reference overlay.
    #[arg(long, value_name = "PX_PER_M")]
    pub density: Option<u32>,

    /// Draw the texel density reference grid on the output.
    #[arg(long)]
    pub texel_grid: bool,

    /// Print the per-zone validation report. Exit code is non-zero when any
    /// zone does not exactly fill its target size.
    #[arg(long)]
    pub validate: bool,

    /// Output PNG file path.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the (possibly mutated) layout back out as JSON.
    #[arg(long, value_name = "FILE")]
    pub export_json: Option<PathBuf>,

    /// Seed for the random generators. Same seed, same sheet.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Print per-step timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the whole pipeline and return an OS exit code.
/// `0` = success, `1` = any error or a failed --validate check.
pub fn run(args: CliArgs) -> ExitCode {
    if args.list {
        print_catalog();
        return ExitCode::SUCCESS;
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // -- Step 1: starting document ---------------------------------------
    let mut doc = match load_base_document(&args) {
        Ok(d) => d,
        Err(msg) => {
            eprintln!("error: {}", msg);
            log_err!("{}", msg);
            return ExitCode::FAILURE;
        }
    };

    // -- Step 2: structural operations -----------------------------------
    if let Err(msg) = apply_operations(&mut doc, &args, &mut rng) {
        eprintln!("error: {}", msg);
        log_err!("{}", msg);
        return ExitCode::FAILURE;
    }

    if let Some(density) = args.density {
        doc.config.texel_density_target = density;
    }
    if args.texel_grid {
        doc.config.show_texel_density = true;
    }

    // -- Step 3: validation report ----------------------------------------
    let mut validation_failed = false;
    if args.validate {
        let report = validate(&doc);
        for zone in &doc.zones {
            if let Some(fit) = report.zone(&zone.id) {
                let status = if fit.is_valid { "ok" } else { "MISMATCH" };
                println!(
                    "{:<12} {:>5}px of {:>5}px  remaining {:>5}  [{}]",
                    zone.id, fit.current_size, fit.target_size, fit.remaining, status
                );
            }
        }
        if !report.is_valid {
            eprintln!("validation failed: one or more zones do not fill their target size");
            validation_failed = true;
        }
    }

    // -- Step 4: outputs ---------------------------------------------------
    if let Some(path) = &args.output {
        // A directory target gets the sheet's own name, `{name}.png`.
        let path = if path.is_dir() {
            path.join(format!("{}.png", doc.config.name))
        } else {
            path.clone()
        };
        let path = &path;
        let start = Instant::now();
        let font = load_label_font();
        let image = render_document(
            &doc,
            RenderMode::Export,
            &RenderOptions::default(),
            font.as_ref(),
            &mut rng,
        );
        if let Err(e) = io::write_png(&image, path) {
            eprintln!("error: PNG export failed: {}", e);
            log_err!("PNG export to {} failed: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        log_info!("Exported {}x{} PNG to {}", image.width(), image.height(), path.display());
        if args.verbose {
            println!(
                "rendered {} ({:.0}ms)",
                path.display(),
                start.elapsed().as_secs_f64() * 1000.0
            );
        }
    }

    if let Some(path) = &args.export_json {
        if let Err(e) = io::save_json(&doc, path) {
            eprintln!("error: JSON export failed: {}", e);
            log_err!("JSON export to {} failed: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        if args.verbose {
            println!("wrote layout {}", path.display());
        }
    }

    if validation_failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Pipeline steps
// ============================================================================

fn load_base_document(args: &CliArgs) -> Result<Document, String> {
    if let Some(path) = &args.input {
        let doc = io::load_json(path)
            .map_err(|e| format!("could not load '{}': {}", path.display(), e))?;
        log_info!("Loaded layout from {}", path.display());
        return Ok(doc);
    }
    if let Some(id) = &args.preset {
        let preset = preset_by_id(id).ok_or_else(|| {
            format!(
                "unknown preset '{}' (available: {})",
                id,
                presets().iter().map(|p| p.id).collect::<Vec<_>>().join(", ")
            )
        })?;
        return Ok(Document { config: preset.config, zones: preset.zones });
    }
    Ok(Document::default())
}

fn apply_operations(doc: &mut Document, args: &CliArgs, rng: &mut StdRng) -> Result<(), String> {
    if let Some(size) = args.resolution {
        if !crate::sheet::RESOLUTIONS.contains(&size) {
            return Err(format!(
                "unsupported resolution {} (use one of {:?})",
                size,
                crate::sheet::RESOLUTIONS
            ));
        }
        *doc = ops::change_resolution(doc, size);
    }

    if let Some(name) = &args.layout {
        let preset = ops::LayoutPreset::parse(name)
            .ok_or_else(|| format!("unknown layout topology '{}'", name))?;
        *doc = ops::generate_layout(doc, preset);
    }

    // Selection resolves after any topology change replaced the zone ids.
    let selection = if args.select.is_empty() { doc.all_zone_ids() } else { args.select.clone() };
    for id in &selection {
        if doc.zone(id).is_none() {
            return Err(format!(
                "unknown zone id '{}' (zones: {})",
                id,
                doc.all_zone_ids().join(", ")
            ));
        }
    }

    if let Some(mode) = &args.orientation {
        let mode = match mode.as_str() {
            "horizontal" => LayoutMode::Horizontal,
            "vertical" => LayoutMode::Vertical,
            other => return Err(format!("unknown orientation '{}'", other)),
        };
        *doc = ops::set_orientation(doc, &selection, mode);
    }

    // Template/randomize against one zone fill that zone's own extent; a
    // multi-zone selection instead generates one sheet-spanning sequence and
    // projects it, so the pattern stays continuous across zone boundaries.
    if let Some(name) = &args.template {
        let template = ZoneTemplate::parse(name)
            .ok_or_else(|| format!("unknown zone template '{}'", name))?;
        if selection.len() > 1 {
            let globals = template_strips(template, sheet_span(doc, &selection), 0);
            *doc = project_onto_zones(doc, &selection, &globals);
        } else {
            *doc = replace_strips(doc, &selection, |zone, seed| {
                template_strips(template, zone.target_size(&doc.config).round() as u32, seed)
            });
        }
    }

    if args.randomize {
        if args.max_strips == 0 {
            return Err("--max-strips must be at least 1".to_string());
        }
        let max = args.max_strips;
        if selection.len() > 1 {
            let globals = random_strips(rng, sheet_span(doc, &selection), max);
            *doc = project_onto_zones(doc, &selection, &globals);
        } else {
            let zones = doc
                .zones
                .iter()
                .map(|z| {
                    if selection.contains(&z.id) {
                        let target = z.target_size(&doc.config).round() as u32;
                        TrimZone { strips: random_strips(rng, target, max), ..z.clone() }
                    } else {
                        z.clone()
                    }
                })
                .collect();
            *doc = Document { config: doc.config.clone(), zones };
        }
    }

    if args.project {
        let master = selection
            .first()
            .and_then(|id| doc.zone(id))
            .ok_or_else(|| "--project needs at least one selected zone".to_string())?;
        if master.strips.is_empty() {
            return Err(format!("--project: primary zone '{}' has no strips", master.id));
        }
        // Repeat the master's pattern until it covers the sheet, so zones
        // beyond the master's own span still get a slice.
        let span = sheet_span(doc, &selection);
        let mut globals: Vec<crate::sheet::TrimStrip> = Vec::new();
        let mut pos = 0u32;
        'tile: loop {
            for s in &master.strips {
                if pos >= span {
                    break 'tile;
                }
                let mut strip = s.clone();
                strip.height = strip.height.min(span - pos).max(1);
                pos += strip.height;
                globals.push(strip);
            }
        }
        *doc = project_onto_zones(doc, &selection, &globals);
    }

    if args.fill_remaining {
        *doc = ops::fill_remaining(doc, &selection);
    }

    if args.colorize {
        *doc = ops::unique_colors(doc, &selection, rng);
    }

    Ok(())
}

/// Sheet dimension along the primary selected zone's axis, the span a
/// sheet-level strip sequence is generated against before projection.
fn sheet_span(doc: &Document, selection: &[String]) -> u32 {
    let vertical = selection
        .first()
        .and_then(|id| doc.zone(id))
        .map(|z| z.layout_mode == LayoutMode::Vertical)
        .unwrap_or(false);
    if vertical { doc.config.width } else { doc.config.height }
}

/// Swap the strip stack of each selected zone, staggering the generator seed
/// per zone position so siblings don't come out identical.
fn replace_strips<F>(doc: &Document, selection: &[String], make: F) -> Document
where
    F: Fn(&TrimZone, u32) -> Vec<crate::sheet::TrimStrip>,
{
    let zones = doc
        .zones
        .iter()
        .enumerate()
        .map(|(i, z)| {
            if selection.contains(&z.id) {
                TrimZone { strips: make(z, i as u32), ..z.clone() }
            } else {
                z.clone()
            }
        })
        .collect();
    Document { config: doc.config.clone(), zones }
}

fn print_catalog() {
    println!("Presets:");
    for p in presets() {
        println!("  {:<16} {}", p.id, p.label);
    }
    println!("\nZone templates:");
    for t in ZoneTemplate::all() {
        println!("  {:<16} {}", t.id(), t.label());
    }
    println!("\nLayout topologies:");
    println!("  single, quad, split_h, split_v, six_pack, grid_9");
}
