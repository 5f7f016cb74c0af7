//! Post-clustering passes that make the palette visually useful.
//!
//! Both passes preserve order. The diversity pass is greedy: the first
//! color seen wins over any later near-duplicate, and nothing is rebalanced.

use crate::color::{Rgb, rgb_distance};
use crate::config::ExtractConfig;

/// Cutoffs for the near-black / near-white exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TonalCutoffs {
    pub dark: u8,
    pub light: u8,
}

impl Default for TonalCutoffs {
    fn default() -> Self {
        Self { dark: 25, light: 230 }
    }
}

impl TonalCutoffs {
    /// All three channels strictly below `dark`, or all strictly above `light`.
    pub fn is_extreme(&self, c: Rgb) -> bool {
        let near_black = c.red < self.dark && c.green < self.dark && c.blue < self.dark;
        let near_white = c.red > self.light && c.green > self.light && c.blue > self.light;
        near_black || near_white
    }
}

pub fn drop_tonal_extremes(colors: &[Rgb], cutoffs: TonalCutoffs) -> Vec<Rgb> {
    colors
        .iter()
        .copied()
        .filter(|&c| !cutoffs.is_extreme(c))
        .collect()
}

/// Keep a color only if it is at least `threshold` away from every color
/// kept before it.
pub fn enforce_diversity(colors: &[Rgb], threshold: f32) -> Vec<Rgb> {
    let mut kept: Vec<Rgb> = Vec::with_capacity(colors.len());
    for &color in colors {
        if kept.iter().all(|&k| rgb_distance(color, k) >= threshold) {
            kept.push(color);
        }
    }
    kept
}

/// Run both passes and truncate to the palette size from `config`.
pub fn filter_palette(centroids: &[Rgb], config: &ExtractConfig) -> Vec<Rgb> {
    let cutoffs = TonalCutoffs {
        dark: config.dark_cutoff,
        light: config.light_cutoff,
    };
    let toned = drop_tonal_extremes(centroids, cutoffs);
    let mut diverse = enforce_diversity(&toned, config.diversity_threshold);
    diverse.truncate(config.max_colors);

    tracing::debug!(
        centroids = centroids.len(),
        after_tonal = toned.len(),
        kept = diverse.len(),
        "Filtered palette"
    );
    diverse
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::Srgb;

    #[test]
    fn near_black_and_near_white_are_dropped() {
        let cutoffs = TonalCutoffs::default();
        assert!(cutoffs.is_extreme(Srgb::new(0, 0, 0)));
        assert!(cutoffs.is_extreme(Srgb::new(24, 24, 24)));
        assert!(cutoffs.is_extreme(Srgb::new(231, 255, 240)));
        // a single channel at the cutoff keeps it
        assert!(!cutoffs.is_extreme(Srgb::new(25, 0, 0)));
        assert!(!cutoffs.is_extreme(Srgb::new(230, 255, 255)));
        // dark red is not near-black
        assert!(!cutoffs.is_extreme(Srgb::new(120, 5, 5)));
    }

    #[test]
    fn diversity_is_first_seen_wins() {
        let colors = [
            Srgb::new(100, 100, 100),
            Srgb::new(110, 100, 100), // 10 away from the first
            Srgb::new(200, 20, 20),
            Srgb::new(100, 112, 100), // 12 away from the first
        ];
        let kept = enforce_diversity(&colors, 20.0);
        assert_eq!(kept, vec![Srgb::new(100, 100, 100), Srgb::new(200, 20, 20)]);
    }

    #[test]
    fn distance_equal_to_threshold_is_kept() {
        let colors = [Srgb::new(0, 0, 100), Srgb::new(0, 0, 120)];
        assert_eq!(enforce_diversity(&colors, 20.0).len(), 2);
    }

    #[test]
    fn diversity_pass_is_idempotent() {
        let colors: Vec<Rgb> = (0..40u8)
            .map(|i| Srgb::new(i.wrapping_mul(37), i.wrapping_mul(11), 255 - i * 6))
            .collect();
        let once = enforce_diversity(&colors, 20.0);
        let twice = enforce_diversity(&once, 20.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn result_is_truncated_in_survival_order() {
        let colors: Vec<Rgb> = (0..8u8).map(|i| Srgb::new(40 + i * 25, 60, 90)).collect();
        let config = ExtractConfig::default();
        let kept = filter_palette(&colors, &config);
        assert_eq!(kept, colors[..6].to_vec());
    }

    #[test]
    fn all_white_input_gives_empty_palette() {
        let colors = vec![Srgb::new(250, 250, 250), Srgb::new(255, 255, 255)];
        assert!(filter_palette(&colors, &ExtractConfig::default()).is_empty());
    }
}
