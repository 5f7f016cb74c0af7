//! k-means clustering of sampled colors in RGB space.

use std::collections::HashMap;

use kmeans_colors::get_kmeans;
use palette::Srgb;

use crate::color::Rgb;
use crate::error::{PaletteError, Result};

/// One k-means group: its rounded mean color and how many samples fell in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    pub centroid: Rgb,
    pub count: usize,
}

/// Parameters forwarded to the k-means run.
#[derive(Debug, Clone, Copy)]
pub struct KmeansParams {
    pub k: usize,
    pub max_iterations: usize,
    pub convergence: f32,
    pub seed: u64,
}

/// Group `samples` into `min(k, distinct colors)` clusters.
///
/// Seeding is k-means++ (via `kmeans_colors`), so with a fixed `seed` the
/// result is reproducible and with a fresh seed it may vary between runs.
/// Centroids come back in the engine's own order, which the palette filter
/// relies on.
pub fn cluster_colors(samples: &[Rgb], params: KmeansParams) -> Result<Vec<Cluster>> {
    if samples.is_empty() {
        return Err(PaletteError::InsufficientSamples);
    }
    if params.k == 0 || params.k > u8::MAX as usize {
        return Err(PaletteError::invalid_parameter("cluster_count", params.k));
    }

    let distinct = distinct_colors(samples);
    if distinct.len() <= params.k {
        // every distinct color is already its own optimal centroid
        tracing::debug!(clusters = distinct.len(), "Few distinct colors, skipping k-means");
        return Ok(distinct
            .into_iter()
            .map(|(centroid, count)| Cluster { centroid, count })
            .collect());
    }

    let buf: Vec<Srgb<f32>> = samples.iter().map(|c| c.into_format()).collect();
    let kmeans = get_kmeans(
        params.k,
        params.max_iterations,
        params.convergence,
        false,
        &buf,
        params.seed,
    );

    let mut counts = vec![0usize; kmeans.centroids.len()];
    for &idx in &kmeans.indices {
        counts[idx as usize] += 1;
    }

    let clusters: Vec<Cluster> = kmeans
        .centroids
        .iter()
        .zip(counts)
        .map(|(c, count)| Cluster {
            centroid: Srgb::new(to_channel(c.red), to_channel(c.green), to_channel(c.blue)),
            count,
        })
        .collect();

    tracing::debug!(
        k = params.k,
        seed = params.seed,
        score = kmeans.score,
        clusters = clusters.len(),
        "k-means finished"
    );
    Ok(clusters)
}

/// Distinct colors in first-seen order, with how often each occurs.
fn distinct_colors(samples: &[Rgb]) -> Vec<(Rgb, usize)> {
    let mut slots: HashMap<(u8, u8, u8), usize> = HashMap::new();
    let mut out: Vec<(Rgb, usize)> = Vec::new();
    for &c in samples {
        let slot = *slots.entry((c.red, c.green, c.blue)).or_insert_with(|| {
            out.push((c, 0));
            out.len() - 1
        });
        out[slot].1 += 1;
    }
    out
}

/// Round a `[0, 1]` mean coordinate to the nearest 8-bit channel value.
fn to_channel(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
