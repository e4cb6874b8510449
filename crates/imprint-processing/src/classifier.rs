//! Per-page color/grayscale classification.
//!
//! Pages are sampled on a square grid rather than scanned exhaustively: the
//! stride scales with the page's pixel count so roughly 10,000 pixels are
//! examined regardless of render resolution. Near-white and near-black
//! samples are background and text, which say nothing about whether the page
//! needs color printing, so they are skipped. The color threshold is
//! deliberately tiny: one small logo must tip a page into the color bucket.

use image::DynamicImage;

/// Classification outcome for a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Color,
    Grayscale,
}

/// All channels above this are treated as page background.
const NEAR_WHITE_FLOOR: u8 = 245;
/// All channels below this are treated as printed text.
const NEAR_BLACK_CEIL: u8 = 10;
/// Maximum pairwise channel difference for a sample to count as gray.
const GRAY_CHANNEL_TOLERANCE: i16 = 12;
/// Fraction of colored samples above which the page is color.
const COLOR_FRACTION_THRESHOLD: f64 = 0.001;

fn sample_stride(width: u32, height: u32) -> u32 {
    let stride = ((width as f64 * height as f64).sqrt() / 100.0).floor() as u32;
    stride.max(1)
}

fn is_gray_sample(r: u8, g: u8, b: u8) -> bool {
    let (r, g, b) = (r as i16, g as i16, b as i16);
    (r - g).abs() <= GRAY_CHANNEL_TOLERANCE
        && (g - b).abs() <= GRAY_CHANNEL_TOLERANCE
        && (r - b).abs() <= GRAY_CHANNEL_TOLERANCE
}

/// Classify one rendered page as color or grayscale.
pub fn classify(image: &DynamicImage) -> PageKind {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let stride = sample_stride(width, height);

    let mut sampled = 0u64;
    let mut colored = 0u64;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            sampled += 1;
            let [r, g, b] = rgb.get_pixel(x, y).0;

            let near_white = r > NEAR_WHITE_FLOOR && g > NEAR_WHITE_FLOOR && b > NEAR_WHITE_FLOOR;
            let near_black = r < NEAR_BLACK_CEIL && g < NEAR_BLACK_CEIL && b < NEAR_BLACK_CEIL;
            if !near_white && !near_black && !is_gray_sample(r, g, b) {
                colored += 1;
            }
            x += stride;
        }
        y += stride;
    }

    let color_fraction = if sampled > 0 {
        colored as f64 / sampled as f64
    } else {
        0.0
    };

    if color_fraction > COLOR_FRACTION_THRESHOLD {
        PageKind::Color
    } else {
        PageKind::Grayscale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid_page(width: u32, height: u32, pixel: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(pixel)))
    }

    #[test]
    fn blank_white_page_is_grayscale() {
        assert_eq!(classify(&solid_page(400, 600, [255, 255, 255])), PageKind::Grayscale);
    }

    #[test]
    fn black_text_page_is_grayscale() {
        assert_eq!(classify(&solid_page(400, 600, [0, 0, 0])), PageKind::Grayscale);
    }

    #[test]
    fn neutral_gray_page_is_grayscale() {
        assert_eq!(classify(&solid_page(400, 600, [128, 128, 128])), PageKind::Grayscale);
    }

    #[test]
    fn tint_within_tolerance_is_grayscale() {
        // Channel spread of 8 stays inside the gray tolerance of 12.
        assert_eq!(classify(&solid_page(400, 600, [120, 128, 124])), PageKind::Grayscale);
    }

    #[test]
    fn saturated_page_is_color() {
        assert_eq!(classify(&solid_page(400, 600, [200, 40, 40])), PageKind::Color);
    }

    #[test]
    fn spread_just_past_tolerance_is_color() {
        // |G - B| = 13 exceeds the tolerance, so every sample counts colored.
        assert_eq!(classify(&solid_page(400, 600, [100, 113, 100])), PageKind::Color);
    }

    #[test]
    fn small_logo_on_white_page_tips_to_color() {
        // 200x200 page sampled at stride 2; a 20x20 logo yields 100 colored
        // samples out of 10,000 - two orders of magnitude past the threshold.
        let mut page = RgbImage::from_pixel(200, 200, Rgb([255, 255, 255]));
        for y in 0..20 {
            for x in 0..20 {
                page.put_pixel(x, y, Rgb([220, 30, 30]));
            }
        }
        assert_eq!(classify(&DynamicImage::ImageRgb8(page)), PageKind::Color);
    }

    #[test]
    fn colored_fraction_at_threshold_stays_grayscale() {
        // 100x100 page sampled at stride 1: exactly 10 colored samples out of
        // 10,000 sits on the threshold, which must not be exceeded.
        let mut page = RgbImage::from_pixel(100, 100, Rgb([128, 128, 128]));
        for x in 0..10 {
            page.put_pixel(x, 50, Rgb([100, 150, 100]));
        }
        assert_eq!(classify(&DynamicImage::ImageRgb8(page)), PageKind::Grayscale);
    }

    #[test]
    fn stride_bounds_sampling_for_large_pages() {
        assert_eq!(super::sample_stride(100, 100), 1);
        assert_eq!(super::sample_stride(2000, 2000), 20);
        assert_eq!(super::sample_stride(1, 1), 1);
    }
}
