//! Strip generators: the three algorithms that populate a zone with an
//! ordered strip sequence for a pixel target size. The template and
//! default-seed generators are deterministic; the weighted-random generator
//! draws from whatever [`rand::Rng`] the caller hands in, so tests can pin a
//! seeded one.

use rand::Rng;

use crate::color::{PALETTE, palette_color};
use crate::sheet::TrimStrip;

// ============================================================================
// Default-seed generator
// ============================================================================

/// Basic 25% / 50% / 25% fill (trim / main / detail) so a freshly created
/// zone is never empty. `seed_offset` shifts the palette so sibling zones in
/// a generated layout get distinct but reproducible colors.
pub fn default_zone_strips(zone_px: u32, seed_offset: u32) -> Vec<TrimStrip> {
    let color_start = (seed_offset * 3) as usize;

    let main = zone_px / 2;
    let trim = zone_px / 4;
    let detail = zone_px - main - trim;

    vec![
        TrimStrip::new("Top_Trim", trim, palette_color(color_start), 1),
        TrimStrip::new("Main_Fill", main, palette_color(color_start + 1), 1),
        TrimStrip::new("Detail_Bottom", detail, palette_color(color_start + 2), 4),
    ]
}

// ============================================================================
// Named templates
// ============================================================================

/// Fixed layout recipes for common trim sheet patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneTemplate {
    /// 20% trim / 60% main / 20% trim.
    Classic,
    Uniform4,
    Uniform8,
    /// One strip covering everything.
    Single,
    /// Alternating 128/64 px detail strips until the space runs out.
    DetailStack,
}

impl ZoneTemplate {
    pub fn label(&self) -> &'static str {
        match self {
            ZoneTemplate::Classic => "Classic (Trim/Main/Trim)",
            ZoneTemplate::Uniform4 => "Uniform 4x",
            ZoneTemplate::Uniform8 => "Uniform 8x",
            ZoneTemplate::Single => "Single Fill",
            ZoneTemplate::DetailStack => "Detail Stack",
        }
    }

    pub fn all() -> &'static [ZoneTemplate] {
        &[
            ZoneTemplate::Classic,
            ZoneTemplate::Uniform4,
            ZoneTemplate::Uniform8,
            ZoneTemplate::Single,
            ZoneTemplate::DetailStack,
        ]
    }

    /// Stable string key, the inverse of [`ZoneTemplate::parse`].
    pub fn id(&self) -> &'static str {
        match self {
            ZoneTemplate::Classic => "classic",
            ZoneTemplate::Uniform4 => "uniform_4",
            ZoneTemplate::Uniform8 => "uniform_8",
            ZoneTemplate::Single => "single",
            ZoneTemplate::DetailStack => "detail_stack",
        }
    }

    pub fn parse(s: &str) -> Option<ZoneTemplate> {
        match s {
            "classic" => Some(ZoneTemplate::Classic),
            "uniform_4" => Some(ZoneTemplate::Uniform4),
            "uniform_8" => Some(ZoneTemplate::Uniform8),
            "single" => Some(ZoneTemplate::Single),
            "detail_stack" => Some(ZoneTemplate::DetailStack),
            _ => None,
        }
    }
}

fn uniform_strips(total_size: u32, n: u32, seed: u32) -> Vec<TrimStrip> {
    let h = total_size / n;
    let rem = total_size - h * n;
    (0..n)
        .map(|i| {
            let height = if i == n - 1 { h + rem } else { h };
            TrimStrip::new(
                &format!("Uniform_{}", i + 1),
                height,
                palette_color((seed + i) as usize),
                1,
            )
        })
        .collect()
}

/// Expand a template against a pixel target size. All templates except
/// `DetailStack` sum exactly to `total_size`; the detail stack stops at the
/// last whole step and may leave a remainder unfilled. That underfill is
/// deliberate and surfaced by validation, not rounded away here.
pub fn template_strips(template: ZoneTemplate, total_size: u32, seed: u32) -> Vec<TrimStrip> {
    match template {
        ZoneTemplate::Classic => {
            let trim = (total_size as f32 * 0.2).floor() as u32;
            let main = total_size - trim * 2;
            vec![
                TrimStrip::new("Top_Trim", trim, palette_color(seed as usize), 1),
                TrimStrip::new("Main_Fill", main, palette_color(seed as usize + 1), 1),
                TrimStrip::new("Bot_Trim", trim, palette_color(seed as usize + 2), 1),
            ]
        }
        ZoneTemplate::Uniform4 => uniform_strips(total_size, 4, seed),
        ZoneTemplate::Uniform8 => uniform_strips(total_size, 8, seed),
        ZoneTemplate::Single => {
            vec![TrimStrip::new("Full_Coverage", total_size, palette_color(seed as usize), 1)]
        }
        ZoneTemplate::DetailStack => {
            let mut strips = Vec::new();
            let mut current = 0u32;
            let mut idx = 0u32;
            while current < total_size {
                let step = if idx % 2 == 0 { 128 } else { 64 };
                let h = step.min(total_size - current);
                if h == 0 {
                    break;
                }
                let subs = if idx % 3 == 0 { 4 } else { 1 };
                strips.push(TrimStrip::new(
                    &format!("Detail_{}", idx + 1),
                    h,
                    palette_color((seed + idx) as usize),
                    subs,
                ));
                current += h;
                idx += 1;
            }
            strips
        }
    }
}

// ============================================================================
// Weighted-random generator
// ============================================================================

/// (size, relative weight) option table for the random fill.
const WEIGHTED_OPTIONS: [(u32, u32); 6] =
    [(1024, 2), (512, 4), (256, 5), (128, 4), (64, 2), (32, 1)];

/// Randomly fill `target_size` pixels with at most `max_strips` strips.
///
/// Draws strip sizes from a weighted option table, steering toward larger
/// sizes when few slots remain for a lot of space so late slots are not
/// starved. The final slot (and the no-option fallback) emit an exact-fit
/// strip, so the emitted sizes never sum past `target_size` and the loop
/// always terminates within `max_strips` strips.
pub fn random_strips<R: Rng>(rng: &mut R, target_size: u32, max_strips: u32) -> Vec<TrimStrip> {
    let max_strips = max_strips.max(1);
    let mut strips: Vec<TrimStrip> = Vec::new();
    let mut current_total = 0u32;
    let mut strip_count = 0u32;

    while current_total < target_size {
        let remaining = target_size - current_total;
        let slots_left = max_strips - strip_count;

        // Last slot: close out with an exact fit. Large closers get a coin-
        // flipped subdivision so they are not one giant solid block.
        if slots_left == 1 {
            let base = palette_color(strip_count as usize);
            let mut subs = 1u32;
            if remaining >= 512 && rng.gen_bool(0.5) {
                subs = 4;
            } else if remaining >= 256 && rng.gen_bool(0.5) {
                subs = 2;
            }
            let mut strip =
                TrimStrip::new(&format!("Strip_{}_Fill", strip_count + 1), remaining, base, subs);
            strip.subdivision_colors = coin_flip_colors(rng, base, subs);
            strips.push(strip);
            break;
        }

        let mut options: Vec<(u32, u32)> = WEIGHTED_OPTIONS
            .iter()
            .copied()
            .filter(|&(size, _)| size <= remaining)
            .collect();

        // Load balancing: with lots of space per remaining slot, drop the
        // small sizes (keeping the unfiltered set if nothing would survive).
        let avg_per_slot = remaining as f32 / slots_left as f32;
        if avg_per_slot > 400.0 {
            let large: Vec<_> = options.iter().copied().filter(|&(s, _)| s >= 256).collect();
            if !large.is_empty() {
                options = large;
            }
        } else if avg_per_slot > 150.0 {
            let medium: Vec<_> = options.iter().copied().filter(|&(s, _)| s >= 64).collect();
            if !medium.is_empty() {
                options = medium;
            }
        }

        // Remaining space smaller than every option: exact fit and stop.
        if options.is_empty() {
            let base = palette_color(strip_count as usize);
            strips.push(TrimStrip::new(&format!("Fill_{remaining}"), remaining, base, 1));
            break;
        }

        let total_weight: u32 = options.iter().map(|&(_, w)| w).sum();
        let mut draw = rng.gen_range(0..total_weight);
        let mut selected = options[0].0;
        for &(size, weight) in &options {
            if draw < weight {
                selected = size;
                break;
            }
            draw -= weight;
        }

        let mut subs = 1u32;
        if rng.gen_bool(0.3) {
            subs = [2, 4, 8][rng.gen_range(0..3)];
        }
        let base = palette_color(strip_count as usize);
        let mut strip = TrimStrip::new(
            &format!("Strip_{}_{}px", strip_count + 1, selected),
            selected,
            base,
            subs,
        );
        if subs > 1 {
            strip.subdivision_colors = coin_flip_colors(rng, base, subs);
        }
        strips.push(strip);
        current_total += selected;
        strip_count += 1;
    }

    strips
}

/// Per-subdivision colors: each slot keeps the base color or swaps to a
/// random palette entry, 50/50.
fn coin_flip_colors<R: Rng>(rng: &mut R, base: &str, subs: u32) -> Vec<String> {
    (0..subs)
        .map(|_| {
            if rng.gen_bool(0.5) {
                base.to_string()
            } else {
                PALETTE[rng.gen_range(0..PALETTE.len())].to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn total(strips: &[TrimStrip]) -> u32 {
        strips.iter().map(|s| s.height).sum()
    }

    #[test]
    fn default_strips_sum_exactly() {
        for px in [1000u32, 1024, 2048, 333, 7] {
            let strips = default_zone_strips(px, 0);
            assert_eq!(strips.len(), 3);
            assert_eq!(total(&strips), px);
        }
    }

    #[test]
    fn default_strips_seed_shifts_palette() {
        let a = default_zone_strips(1024, 0);
        let b = default_zone_strips(1024, 1);
        assert_ne!(a[0].base_color, b[0].base_color);
    }

    #[test]
    fn exact_templates_sum_exactly() {
        for template in [
            ZoneTemplate::Classic,
            ZoneTemplate::Uniform4,
            ZoneTemplate::Uniform8,
            ZoneTemplate::Single,
        ] {
            for size in [4u32, 100, 1000, 1001, 2048, 4095] {
                let strips = template_strips(template, size, 3);
                assert_eq!(total(&strips), size, "{template:?} @ {size}");
            }
        }
    }

    #[test]
    fn uniform_4_remainder_lands_on_last_strip() {
        let strips = template_strips(ZoneTemplate::Uniform4, 1000, 0);
        let heights: Vec<u32> = strips.iter().map(|s| s.height).collect();
        assert_eq!(heights, vec![250, 250, 250, 250]);

        let strips = template_strips(ZoneTemplate::Uniform4, 1001, 0);
        let heights: Vec<u32> = strips.iter().map(|s| s.height).collect();
        assert_eq!(heights, vec![250, 250, 250, 251]);
    }

    #[test]
    fn detail_stack_never_overfills() {
        for size in [100u32, 192, 500, 2048] {
            let strips = template_strips(ZoneTemplate::DetailStack, size, 0);
            assert!(total(&strips) <= size);
            assert!(strips.iter().all(|s| s.height > 0));
        }
        // 128 + 64 + 128 ... on 192 lands exactly.
        assert_eq!(total(&template_strips(ZoneTemplate::DetailStack, 192, 0)), 192);
    }

    #[test]
    fn detail_stack_subdivides_every_third_strip() {
        let strips = template_strips(ZoneTemplate::DetailStack, 2048, 0);
        for (i, s) in strips.iter().enumerate() {
            let expect = if i % 3 == 0 { 4 } else { 1 };
            assert_eq!(s.subdivisions, expect);
            assert_eq!(s.subdivision_colors.len(), s.subdivisions as usize);
        }
    }

    #[test]
    fn random_strips_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for seed in 0..50u64 {
            rng = StdRng::seed_from_u64(seed);
            for (target, max) in [(2048u32, 8u32), (1000, 4), (4096, 16), (50, 1), (31, 3)] {
                let strips = random_strips(&mut rng, target, max);
                assert!(strips.len() <= max as usize, "target {target} max {max}");
                assert!(total(&strips) <= target);
                assert!(strips.iter().all(|s| s.height > 0));
            }
        }
    }

    #[test]
    fn random_strips_fill_exactly_when_slots_run_out() {
        // max_strips = 1 always takes the final-slot branch: exact fill.
        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let strips = random_strips(&mut rng, 1777, 1);
            assert_eq!(strips.len(), 1);
            assert_eq!(total(&strips), 1777);
        }
    }

    #[test]
    fn random_strips_subdivision_invariant_holds() {
        let mut rng = StdRng::seed_from_u64(11);
        let strips = random_strips(&mut rng, 4096, 16);
        for s in &strips {
            assert!(s.subdivisions >= 1);
            assert_eq!(s.subdivision_colors.len(), s.subdivisions as usize);
        }
    }

    #[test]
    fn random_strips_ids_are_unique() {
        let mut rng = StdRng::seed_from_u64(3);
        let strips = random_strips(&mut rng, 4096, 16);
        let mut ids: Vec<&str> = strips.iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), strips.len());
    }

    #[test]
    fn random_strips_deterministic_for_fixed_seed() {
        let a = random_strips(&mut StdRng::seed_from_u64(42), 2048, 8);
        let b = random_strips(&mut StdRng::seed_from_u64(42), 2048, 8);
        let ha: Vec<u32> = a.iter().map(|s| s.height).collect();
        let hb: Vec<u32> = b.iter().map(|s| s.height).collect();
        assert_eq!(ha, hb);
    }

    #[test]
    fn zero_target_yields_no_strips() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(random_strips(&mut rng, 0, 8).is_empty());
    }
}
