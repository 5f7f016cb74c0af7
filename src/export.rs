//! Shareable palette card: the source image above a row of swatches.

use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage, imageops, imageops::FilterType};

use crate::error::{PaletteError, Result};
use crate::pipeline::Palette;

const CARD_WIDTH: u32 = 720;
const SWATCH_HEIGHT: u32 = 120;
const GUTTER: u32 = 12;
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Render `source` scaled to the card width, followed by one swatch per
/// palette entry. An empty palette renders the image alone.
pub fn render_palette_card(source: &DynamicImage, palette: &Palette) -> Result<RgbaImage> {
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 {
        return Err(PaletteError::load_failed("cannot export an empty image"));
    }
    let inner = CARD_WIDTH - 2 * GUTTER;
    let thumb_h = ((h as f32) * inner as f32 / w as f32).round().max(1.0) as u32;
    let thumb = imageops::resize(source, inner, thumb_h, FilterType::Triangle);

    let swatch_band = if palette.is_empty() { 0 } else { SWATCH_HEIGHT + GUTTER };
    let card_h = GUTTER + thumb_h + swatch_band + GUTTER;
    let mut card = RgbaImage::from_pixel(CARD_WIDTH, card_h, BACKGROUND);
    imageops::overlay(&mut card, &thumb, GUTTER as i64, GUTTER as i64);

    let n = palette.len() as u32;
    if n > 0 {
        let top = GUTTER + thumb_h + GUTTER;
        let slot = inner / n;
        for (i, entry) in palette.iter().enumerate() {
            let color = entry.rgb()?;
            let fill = Rgba([color.red, color.green, color.blue, 255]);
            let left = GUTTER + i as u32 * slot;
            // last swatch absorbs the rounding remainder
            let right = if i as u32 == n - 1 { GUTTER + inner } else { left + slot };
            for y in top..top + SWATCH_HEIGHT {
                for x in left..right {
                    card.put_pixel(x, y, fill);
                }
            }
        }
    }
    Ok(card)
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buf);
        image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| PaletteError::image_load("PNG encode error", e))?;
    }
    Ok(buf)
}
