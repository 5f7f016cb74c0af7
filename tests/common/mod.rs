//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use image_to_palette_wasm::{ImageFetcher, PaletteError, Result};
use reqwest::Url;

/// PNG-encode a solid `width × height` image.
pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    png(&RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

pub fn png(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode test PNG");
    buf
}

/// Smooth multi-hue image with far more distinct colors than clusters.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let b = 255 - r / 2 - g / 3;
        Rgba([r, g, b, 255])
    })
}

/// In-memory fetcher: answers per URL path after an optional delay and
/// counts how often it was asked.
#[derive(Default)]
pub struct FakeFetcher {
    routes: HashMap<String, (Duration, Option<Vec<u8>>)>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, path: &str, delay: Duration, body: Vec<u8>) -> Self {
        self.routes.insert(path.to_string(), (delay, Some(body)));
        self
    }

    pub fn fail(mut self, path: &str) -> Self {
        self.routes.insert(path.to_string(), (Duration::ZERO, None));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some((delay, body)) = self.routes.get(url.path()) else {
            return Err(PaletteError::load_failed(format!("404 for {url}")));
        };
        tokio::time::sleep(*delay).await;
        body.clone()
            .ok_or_else(|| PaletteError::load_failed(format!("connection reset for {url}")))
    }
}
