//! Grid sampling of decoded images.

use image::{GenericImageView, Rgba};
use palette::Srgb;

use crate::color::Rgb;

/// Read a `grid_size × grid_size` lattice of pixels, skipping fully
/// transparent ones.
///
/// Cell `(x, y)` maps to pixel `(floor(x / grid_size * width),
/// floor(y / grid_size * height))`, so images smaller than the grid simply
/// repeat pixels. Rows are walked top to bottom, left to right.
pub fn sample_grid<I>(image: &I, grid_size: u32) -> Vec<Rgb>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || grid_size == 0 {
        return Vec::new();
    }

    let grid = grid_size as u64;
    let mut samples = Vec::with_capacity((grid * grid) as usize);
    for y in 0..grid {
        // integer form of floor(y / grid * height); exact for any size
        let py = (y * height as u64 / grid) as u32;
        for x in 0..grid {
            let px = (x * width as u64 / grid) as u32;
            let Rgba([r, g, b, a]) = image.get_pixel(px, py);
            if a == 0 {
                continue;
            }
            samples.push(Srgb::new(r, g, b));
        }
    }

    tracing::debug!(
        width,
        height,
        grid_size,
        samples = samples.len(),
        "Sampled image grid"
    );
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn opaque_image_yields_full_grid() {
        let img = RgbaImage::from_pixel(640, 480, Rgba([12, 34, 56, 255]));
        let samples = sample_grid(&img, 30);
        assert_eq!(samples.len(), 900);
        assert!(samples.iter().all(|&c| c == Srgb::new(12, 34, 56)));
    }

    #[test]
    fn transparent_image_yields_nothing() {
        let img = RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 0]));
        assert!(sample_grid(&img, 30).is_empty());
    }

    #[test]
    fn partially_transparent_pixels_are_kept() {
        let img = RgbaImage::from_pixel(30, 30, Rgba([200, 10, 10, 1]));
        assert_eq!(sample_grid(&img, 30).len(), 900);
    }

    #[test]
    fn image_smaller_than_grid_repeats_pixels() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let samples = sample_grid(&img, 30);
        assert_eq!(samples.len(), 900);
        // left half of every row reads pixel 0, right half pixel 1
        let red = samples.iter().filter(|c| **c == Srgb::new(255, 0, 0)).count();
        assert_eq!(red, 450);
    }

    #[test]
    fn grid_coordinates_follow_floor_formula() {
        // 90 px wide: column x samples pixel 3x; mark only those columns
        let img = RgbaImage::from_fn(90, 1, |x, _| {
            if x % 3 == 0 {
                Rgba([0, 128, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let samples = sample_grid(&img, 30);
        assert_eq!(samples.len(), 900);
    }

    #[test]
    fn transparent_half_is_skipped() {
        let img = RgbaImage::from_fn(60, 60, |x, _| {
            if x < 30 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([10, 200, 30, 255])
            }
        });
        assert_eq!(sample_grid(&img, 30).len(), 450);
    }

    #[test]
    fn empty_image_is_handled() {
        let img = RgbaImage::new(0, 0);
        assert!(sample_grid(&img, 30).is_empty());
    }
}
