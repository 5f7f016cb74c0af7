//! Owns the current image and palette and publishes new results in order.
//!
//! Every `open` takes a source generation from a monotonically increasing
//! counter when it starts. A finished open publishes only if its generation
//! is newer than the one on display. A `regenerate` remembers the generation
//! of the image it re-extracted and publishes only while that image is still
//! on display, so it can never outrank an open. Failed loads never touch the
//! published state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::config::ExtractConfig;
use crate::error::{PaletteError, Result};
use crate::fetch::ImageFetcher;
use crate::namer::{ColorNameTable, NameCandidates};
use crate::pipeline::{Palette, extract_palette};
use crate::source::{ImageSource, LoadedImage, SourceKind};

/// What the UI should show for the current image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "colors", rename_all = "kebab-case")]
pub enum PaletteState {
    /// Nothing has been published yet
    Pending,
    Ready(Palette),
    /// Filters removed every candidate ("no colors found")
    Empty,
    /// The image had no opaque pixels to sample
    NothingExtracted,
}

impl PaletteState {
    fn from_extraction(result: Result<Palette>) -> Result<Self> {
        match result {
            Ok(palette) if palette.is_empty() => Ok(PaletteState::Empty),
            Ok(palette) => Ok(PaletteState::Ready(palette)),
            Err(PaletteError::InsufficientSamples) => Ok(PaletteState::NothingExtracted),
            Err(e) => Err(e),
        }
    }

    pub fn palette(&self) -> Option<&Palette> {
        match self {
            PaletteState::Ready(palette) => Some(palette),
            _ => None,
        }
    }
}

/// Outcome of one `open` or `regenerate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publish {
    /// This run is now the displayed state
    Published(Snapshot),
    /// A newer source was published first; this result was discarded
    Stale { generation: u64, current: u64 },
}

/// Copy of the published state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Number of results published so far
    pub version: u64,
    /// Source generation of the displayed image; 0 before the first open
    pub generation: u64,
    pub source: Option<SourceKind>,
    pub palette: PaletteState,
}

struct Published {
    version: u64,
    generation: u64,
    image: Option<Arc<LoadedImage>>,
    palette: PaletteState,
}

/// What a finished run was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    /// A newly loaded source
    Open { generation: u64 },
    /// The image that was on display as `generation`
    Regenerate { generation: u64 },
}

impl Run {
    fn generation(self) -> u64 {
        match self {
            Run::Open { generation } | Run::Regenerate { generation } => generation,
        }
    }

    fn supersedes(self, displayed: u64) -> bool {
        match self {
            Run::Open { generation } => generation > displayed,
            Run::Regenerate { generation } => generation == displayed,
        }
    }
}

/// Coordinates loading, extraction and publication for one viewer.
pub struct PaletteStudio<F, N> {
    fetcher: F,
    namer: N,
    config: ExtractConfig,
    generations: AtomicU64,
    published: Mutex<Published>,
}

impl<F, N> PaletteStudio<F, N>
where
    F: ImageFetcher,
    N: NameCandidates,
{
    pub fn new(fetcher: F, namer: N, config: ExtractConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fetcher,
            namer,
            config,
            generations: AtomicU64::new(0),
            published: Mutex::new(Published {
                version: 0,
                generation: 0,
                image: None,
                palette: PaletteState::Pending,
            }),
        })
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Load `source` and, if it decodes, extract and publish its palette.
    ///
    /// Invalid URLs are rejected before a generation is issued or anything
    /// is fetched. Loads that fail or exceed the configured timeout leave the
    /// previous image and palette in place.
    pub async fn open(&self, source: ImageSource) -> Result<Publish> {
        if let ImageSource::Url(raw) = &source {
            crate::source::validate_image_url(raw)?;
        }
        let generation = self.next_generation();
        let kind = source.kind();

        let timeout = self.config.load_timeout();
        let loaded = match tokio::time::timeout(timeout, source.resolve(&self.fetcher)).await {
            Ok(Ok(loaded)) => loaded,
            Ok(Err(e)) => {
                tracing::warn!(%e, source = %kind, generation, "Image load failed");
                return Err(e);
            }
            Err(_) => {
                tracing::warn!(source = %kind, generation, ?timeout, "Image load timed out");
                return Err(PaletteError::load_failed(format!(
                    "loading {kind} timed out after {timeout:?}"
                )));
            }
        };

        let image = Arc::new(loaded);
        let palette = self.extract(&image)?;
        Ok(self.publish(Run::Open { generation }, image, palette))
    }

    /// Re-run extraction on the current image; results vary unless a seed is configured.
    ///
    /// The result is dropped if another source was published meanwhile.
    pub async fn regenerate(&self) -> Result<Publish> {
        let (generation, image) = {
            let published = self.lock();
            let image = published.image.clone().ok_or(PaletteError::NoImage)?;
            (published.generation, image)
        };
        let palette = self.extract(&image)?;
        Ok(self.publish(Run::Regenerate { generation }, image, palette))
    }

    pub fn snapshot(&self) -> Snapshot {
        snapshot_of(&self.lock())
    }

    /// Currently displayed image, if any.
    pub fn current_image(&self) -> Option<Arc<LoadedImage>> {
        self.lock().image.clone()
    }

    fn extract(&self, image: &LoadedImage) -> Result<PaletteState> {
        let rgba = image.image.to_rgba8();
        PaletteState::from_extraction(extract_palette(&rgba, &self.config, &self.namer))
    }

    fn publish(&self, run: Run, image: Arc<LoadedImage>, palette: PaletteState) -> Publish {
        let mut published = self.lock();
        if !run.supersedes(published.generation) {
            tracing::info!(?run, current = published.generation, "Discarding stale palette");
            return Publish::Stale {
                generation: run.generation(),
                current: published.generation,
            };
        }
        published.version += 1;
        published.generation = run.generation();
        published.image = Some(image);
        published.palette = palette;
        Publish::Published(snapshot_of(&published))
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock(&self) -> MutexGuard<'_, Published> {
        // state is replaced wholesale under the lock, so a poisoned guard is still consistent
        self.published.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<F: ImageFetcher> PaletteStudio<F, ColorNameTable> {
    /// Studio naming colors with the table and metric chosen in `config`.
    pub fn from_config(fetcher: F, config: ExtractConfig) -> Result<Self> {
        let namer = ColorNameTable::from_config(&config);
        Self::new(fetcher, namer, config)
    }
}

fn snapshot_of(published: &Published) -> Snapshot {
    Snapshot {
        version: published.version,
        generation: published.generation,
        source: published.image.as_ref().map(|i| i.kind.clone()),
        palette: published.palette.clone(),
    }
}
