use palette::Srgb;

use crate::error::{PaletteError, Result};

/// 8-bit sRGB triple, the unit every pipeline stage works in.
pub type Rgb = Srgb<u8>;

/// Format as canonical uppercase `#RRGGBB`.
pub fn rgb_to_hex(color: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

/// Parse `#RRGGBB` (the leading `#` is optional, digits are case-insensitive).
pub fn hex_to_rgb(hex: &str) -> Result<Rgb> {
    let invalid = || PaletteError::InvalidHex {
        value: hex.to_string(),
    };
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
    };
    Ok(Srgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Euclidean distance in RGB space.
pub fn rgb_distance(a: Rgb, b: Rgb) -> f32 {
    let dr = a.red as f32 - b.red as f32;
    let dg = a.green as f32 - b.green as f32;
    let db = a.blue as f32 - b.blue as f32;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// CSS-style `rgb(r, g, b)` string, the form handed to the clipboard.
pub fn rgb_string(color: Rgb) -> String {
    format!("rgb({}, {}, {})", color.red, color.green, color.blue)
}
