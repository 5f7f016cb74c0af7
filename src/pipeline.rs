//! Image → named palette, end to end.

use image::{GenericImageView, Rgba};
use serde::{Deserialize, Serialize};

use crate::cluster::{KmeansParams, cluster_colors};
use crate::color::{Rgb, hex_to_rgb, rgb_string, rgb_to_hex};
use crate::config::ExtractConfig;
use crate::error::Result;
use crate::filter::filter_palette;
use crate::namer::NameCandidates;
use crate::sampler::sample_grid;

/// A named palette color as handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub hex: String,
    pub name: String,
}

impl PaletteEntry {
    pub fn rgb(&self) -> Result<Rgb> {
        hex_to_rgb(&self.hex)
    }

    /// `rgb(r, g, b)` form for the clipboard.
    pub fn rgb_string(&self) -> Result<String> {
        self.rgb().map(rgb_string)
    }
}

/// Ordered output of one extraction run. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    pub entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaletteEntry> {
        self.entries.iter()
    }

    pub fn hexes(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.hex.as_str()).collect()
    }
}

/// Sample, cluster, filter and name `image`.
///
/// The k-means seed comes from `config.seed`, or a fresh draw when unset.
/// Returns `InsufficientSamples` when the image has no opaque pixel. A
/// palette emptied by the filters is a normal `Ok` result.
pub fn extract_palette<I, N>(image: &I, config: &ExtractConfig, namer: &N) -> Result<Palette>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
    N: NameCandidates + ?Sized,
{
    config.validate()?;
    let seed = config.run_seed();

    let samples = sample_grid(image, config.grid_size);
    let clusters = cluster_colors(
        &samples,
        KmeansParams {
            k: config.cluster_count,
            max_iterations: config.max_iterations,
            convergence: config.convergence,
            seed,
        },
    )?;
    let centroids: Vec<Rgb> = clusters.iter().map(|c| c.centroid).collect();
    let kept = filter_palette(&centroids, config);

    let entries = kept
        .into_iter()
        .map(|color| {
            let hex = rgb_to_hex(color);
            let name = namer.best_name(&hex);
            PaletteEntry { hex, name }
        })
        .collect();
    Ok(Palette { entries })
}
