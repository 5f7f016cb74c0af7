//! Tunables for one extraction run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PaletteError, Result};
use crate::namer::{DistanceMetric, NameList};

/// Knobs for sampling, clustering, filtering and naming.
///
/// Every field has a default, so a JSON config file only needs the values it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Samples per axis; the sampler reads at most `grid_size²` pixels
    pub grid_size: u32,
    /// k for k-means; deliberately larger than `max_colors`
    pub cluster_count: usize,
    pub max_iterations: usize,
    pub convergence: f32,
    /// A centroid with every channel below this is dropped as near-black
    pub dark_cutoff: u8,
    /// A centroid with every channel above this is dropped as near-white
    pub light_cutoff: u8,
    /// Minimum RGB distance between two kept colors
    pub diversity_threshold: f32,
    pub max_colors: usize,
    /// Fixed k-means seed; `None` draws a fresh one every run
    pub seed: Option<u64>,
    pub name_list: NameList,
    pub distance: DistanceMetric,
    pub load_timeout_ms: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            grid_size: 30,
            cluster_count: 8,
            max_iterations: 20,
            convergence: 1e-4,
            dark_cutoff: 25,
            light_cutoff: 230,
            diversity_threshold: 20.0,
            max_colors: 6,
            seed: None,
            name_list: NameList::Html,
            distance: DistanceMetric::DeltaE,
            load_timeout_ms: 15_000,
        }
    }
}

impl ExtractConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(PaletteError::invalid_parameter("grid_size", self.grid_size));
        }
        // kmeans_colors stores assignments as u8
        if self.cluster_count == 0 || self.cluster_count > u8::MAX as usize {
            return Err(PaletteError::invalid_parameter(
                "cluster_count",
                self.cluster_count,
            ));
        }
        if self.max_iterations == 0 {
            return Err(PaletteError::invalid_parameter(
                "max_iterations",
                self.max_iterations,
            ));
        }
        if !(self.convergence.is_finite() && self.convergence >= 0.0) {
            return Err(PaletteError::invalid_parameter("convergence", self.convergence));
        }
        if self.dark_cutoff > self.light_cutoff {
            return Err(PaletteError::invalid_parameter(
                "dark_cutoff",
                format!("{} (above light_cutoff {})", self.dark_cutoff, self.light_cutoff),
            ));
        }
        if !(self.diversity_threshold.is_finite() && self.diversity_threshold >= 0.0) {
            return Err(PaletteError::invalid_parameter(
                "diversity_threshold",
                self.diversity_threshold,
            ));
        }
        if self.max_colors == 0 {
            return Err(PaletteError::invalid_parameter("max_colors", self.max_colors));
        }
        if self.load_timeout_ms == 0 {
            return Err(PaletteError::invalid_parameter(
                "load_timeout_ms",
                self.load_timeout_ms,
            ));
        }
        Ok(())
    }

    /// Seed for this run: the configured one, or a fresh random draw.
    pub fn run_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            getrandom::u64().unwrap_or_else(|e| {
                tracing::warn!(%e, "No entropy available, falling back to seed 0");
                0
            })
        })
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = ExtractConfig::default();
        assert_eq!(config.grid_size, 30);
        assert_eq!(config.cluster_count, 8);
        assert_eq!(config.max_colors, 6);
        assert_eq!((config.dark_cutoff, config.light_cutoff), (25, 230));
        assert_eq!(config.diversity_threshold, 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn fixed_seed_is_used_verbatim() {
        let config = ExtractConfig {
            seed: Some(42),
            ..Default::default()
        };
        assert_eq!(config.run_seed(), 42);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: ExtractConfig =
            serde_json::from_str(r#"{"max_colors": 4, "name_list": "roygbiv", "distance": "euclidean"}"#)
                .unwrap();
        assert_eq!(config.max_colors, 4);
        assert_eq!(config.name_list, NameList::Roygbiv);
        assert_eq!(config.distance, DistanceMetric::Euclidean);
        assert_eq!(config.grid_size, 30);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn zero_sized_settings_are_rejected() {
        let bad = [
            ExtractConfig { grid_size: 0, ..Default::default() },
            ExtractConfig { cluster_count: 0, ..Default::default() },
            ExtractConfig { cluster_count: 300, ..Default::default() },
            ExtractConfig { max_colors: 0, ..Default::default() },
            ExtractConfig { diversity_threshold: -1.0, ..Default::default() },
            ExtractConfig { dark_cutoff: 240, ..Default::default() },
            ExtractConfig { load_timeout_ms: 0, ..Default::default() },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(PaletteError::InvalidParameter { .. })
            ));
        }
    }
}
