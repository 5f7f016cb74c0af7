use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_to_palette_wasm::export::{encode_png, render_palette_card};
use image_to_palette_wasm::{
    ColorNameTable, DistanceMetric, ExtractConfig, HttpFetcher, ImageSource, MemoNamer, NameList,
    PaletteState, PaletteStudio, Publish, Snapshot,
};

/// Extract a named color palette from an image file, an image URL, or the
/// bundled default image.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Image path or http(s) URL; omit to use the bundled default image
    input: Option<String>,

    /// JSON file with extraction settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of k-means clusters before filtering
    #[arg(short = 'k', long)]
    clusters: Option<usize>,

    /// Samples per axis
    #[arg(short, long)]
    grid: Option<u32>,

    /// Maximum palette size
    #[arg(short = 'n', long)]
    max_colors: Option<usize>,

    /// Minimum RGB distance between palette colors
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Fixed seed for reproducible palettes
    #[arg(short, long)]
    seed: Option<u64>,

    /// Reference table used for color names
    #[arg(long, value_enum)]
    names: Option<NameList>,

    /// Distance used to rank color names
    #[arg(long, value_enum)]
    distance: Option<DistanceMetric>,

    /// Give up on remote images after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Extract this many times, regenerating after the first run
    #[arg(short, long, default_value_t = 1)]
    runs: usize,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write a PNG palette card (image plus swatches) here
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    fn extract_config(&self) -> Result<ExtractConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => ExtractConfig::default(),
        };
        if let Some(k) = self.clusters {
            config.cluster_count = k;
        }
        if let Some(grid) = self.grid {
            config.grid_size = grid;
        }
        if let Some(n) = self.max_colors {
            config.max_colors = n;
        }
        if let Some(t) = self.threshold {
            config.diversity_threshold = t;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(list) = self.names {
            config.name_list = list;
        }
        if let Some(metric) = self.distance {
            config.distance = metric;
        }
        if let Some(ms) = self.timeout_ms {
            config.load_timeout_ms = ms;
        }
        Ok(config)
    }

    fn image_source(&self) -> Result<ImageSource> {
        Ok(match &self.input {
            None => ImageSource::Default,
            Some(s) if s.contains("://") => ImageSource::Url(s.clone()),
            Some(path) => {
                ImageSource::Upload(fs::read(path).with_context(|| format!("reading {path}"))?)
            }
        })
    }
}

fn print_snapshot(snapshot: &Snapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }
    match &snapshot.palette {
        PaletteState::Ready(palette) => {
            for entry in palette.iter() {
                println!("{}  {}", entry.hex, entry.name);
            }
        }
        PaletteState::Empty => println!("No colors found."),
        PaletteState::NothingExtracted => println!("Nothing extracted: image is fully transparent."),
        PaletteState::Pending => println!("No palette yet."),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_to_palette_wasm=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let args = Args::parse();
    if args.runs == 0 {
        bail!("--runs must be at least 1");
    }
    let config = args.extract_config()?;
    let fetcher = HttpFetcher::new(config.load_timeout())?;
    let namer = MemoNamer::new(ColorNameTable::from_config(&config));
    let studio = PaletteStudio::new(fetcher, namer, config)?;

    let source = args.image_source()?;
    let mut outcome = studio.open(source).await.map_err(|e| {
        let message = e.user_message();
        anyhow::Error::new(e).context(message)
    })?;
    for run in 0..args.runs {
        if run > 0 {
            outcome = studio.regenerate().await?;
            println!();
        }
        if let Publish::Published(snapshot) = &outcome {
            print_snapshot(snapshot, args.json)?;
        }
    }

    if let Some(out_path) = &args.export {
        let image = studio.current_image().context("no image loaded")?;
        let snapshot = studio.snapshot();
        let palette = snapshot.palette.palette().cloned().unwrap_or_default();
        let png = encode_png(&render_palette_card(&image.image, &palette)?)?;
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(out_path, png)?;
        eprintln!("Saved → {}", out_path.display());
    }

    Ok(())
}
