//! Extract a small, diverse, named color palette from a raster image.
//!
//! The pipeline samples a fixed grid of pixels, clusters them with k-means in
//! RGB, drops near-black/near-white clusters, enforces a minimum distance
//! between the survivors and names each one against a reference table.
//!
//! ```rust,no_run
//! use image_to_palette_wasm::{ColorNameTable, ExtractConfig, extract_palette_bytes};
//!
//! let bytes = std::fs::read("photo.jpg")?;
//! let palette = extract_palette_bytes(&bytes, &ExtractConfig::default(), &ColorNameTable::default())?;
//! for entry in palette.iter() {
//!     println!("{} {}", entry.hex, entry.name);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

pub mod cluster;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod namer;
pub mod names;
pub mod pipeline;
pub mod sampler;
pub mod source;

#[cfg(not(target_arch = "wasm32"))]
pub mod fetch;
#[cfg(not(target_arch = "wasm32"))]
pub mod studio;

pub use color::{Rgb, hex_to_rgb, rgb_distance, rgb_to_hex};
pub use config::ExtractConfig;
pub use error::{PaletteError, Result};
pub use namer::{ColorNameTable, DistanceMetric, MemoNamer, NameCandidate, NameCandidates, NameList};
pub use pipeline::{Palette, PaletteEntry, extract_palette};
pub use source::{ImageSource, LoadedImage, SourceKind, validate_image_url};

#[cfg(not(target_arch = "wasm32"))]
pub use fetch::{HttpFetcher, ImageFetcher};
#[cfg(not(target_arch = "wasm32"))]
pub use studio::{PaletteState, PaletteStudio, Publish, Snapshot};

/// Decode `input` and extract its palette in one call.
pub fn extract_palette_bytes<N>(input: &[u8], config: &ExtractConfig, namer: &N) -> Result<Palette>
where
    N: NameCandidates + ?Sized,
{
    let img = source::decode_image(input)?.to_rgba8();
    extract_palette(&img, config, namer)
}

// ------------------------------------------------------------
// JavaScript bindings
// ------------------------------------------------------------

fn palette_to_js(palette: &Palette) -> std::result::Result<Array, JsValue> {
    let out = Array::new();
    for entry in palette.iter() {
        let obj = Object::new();
        Reflect::set(&obj, &JsValue::from_str("hex"), &JsValue::from_str(&entry.hex))?;
        Reflect::set(&obj, &JsValue::from_str("name"), &JsValue::from_str(&entry.name))?;
        out.push(&obj);
    }
    Ok(out)
}

fn js_config(seed: Option<u64>) -> ExtractConfig {
    ExtractConfig {
        seed,
        ..Default::default()
    }
}

/// Extract `[{hex, name}, ...]` from encoded image bytes.
///
/// Throws with a user-facing message when the bytes do not decode or the
/// image has no opaque pixels; an empty array means every color was filtered.
#[wasm_bindgen(js_name = extractPalette)]
pub fn extract_palette_js(input: Vec<u8>, seed: Option<u64>) -> std::result::Result<Array, JsValue> {
    let config = js_config(seed);
    let palette = extract_palette_bytes(&input, &config, &ColorNameTable::from_config(&config))
        .map_err(|e| JsValue::from_str(&e.user_message()))?;
    palette_to_js(&palette)
}

/// Palette of the bundled default image.
#[wasm_bindgen(js_name = defaultPalette)]
pub fn default_palette_js(seed: Option<u64>) -> std::result::Result<Array, JsValue> {
    extract_palette_js(source::DEFAULT_IMAGE.to_vec(), seed)
}

/// Whether `url` would be accepted as a remote image source.
#[wasm_bindgen(js_name = isValidImageUrl)]
pub fn is_valid_image_url(url: &str) -> bool {
    validate_image_url(url).is_ok()
}
