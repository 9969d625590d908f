//! SSIM-based image set similarity.
//!
//! Every image in the first set finds its best match in the second set
//! by structural similarity on grayscale-converted images; the document
//! score is the mean of those best-match scores. The metric is
//! intrinsically asymmetric: unmatched images in the second set are
//! never counted, so `score(a, b)` and `score(b, a)` may differ.

use crate::error::{PdfSimError, Result};
use crate::similarity::text::round2;
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

// SSIM stabilization constants for 8-bit dynamic range.
const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

/// SSIM sliding-window side length.
const WINDOW: u32 = 7;

/// Image similarity percentage between two sets of raster images.
///
/// For each image in `set_a`, the best SSIM score against all of
/// `set_b` is selected (each pairwise score rounded to two decimals
/// before the max). The result is the mean of the best-match scores,
/// scaled to a percentage and rounded to two decimals.
///
/// # Errors
///
/// Returns [`PdfSimError::InvalidComparison`] when either set is empty:
/// the mean over zero elements (or a best-match over zero candidates)
/// is undefined and must not be silently coerced.
pub fn image_similarity(set_a: &[RgbImage], set_b: &[RgbImage]) -> Result<f64> {
    if set_a.is_empty() {
        return Err(PdfSimError::InvalidComparison(
            "source document has no embedded images".to_string(),
        ));
    }
    if set_b.is_empty() {
        return Err(PdfSimError::InvalidComparison(
            "compared document has no embedded images".to_string(),
        ));
    }

    let grays_b: Vec<GrayImage> = set_b.iter().map(imageops::grayscale).collect();

    let mut total = 0.0;
    for img_a in set_a {
        let gray_a = imageops::grayscale(img_a);
        let mut best = 0.0_f64;
        for gray_b in &grays_b {
            let resized = resize_area(gray_b, gray_a.width(), gray_a.height());
            let score = round2(ssim(&gray_a, &resized));
            if score > best {
                best = score;
            }
        }
        total += best;
    }

    let mean = total / set_a.len() as f64;
    Ok(round2(mean * 100.0))
}

/// Resize `src` to `width` x `height` with area-style interpolation:
/// pixel-area averaging when shrinking, bilinear when growing.
fn resize_area(src: &GrayImage, width: u32, height: u32) -> GrayImage {
    let (src_w, src_h) = src.dimensions();
    if (src_w, src_h) == (width, height) {
        return src.clone();
    }
    if width <= src_w && height <= src_h {
        let mut out = GrayImage::new(width, height);
        for y in 0..height {
            let sy0 = (u64::from(y) * u64::from(src_h) / u64::from(height)) as u32;
            let sy1 = ((u64::from(y + 1) * u64::from(src_h)).div_ceil(u64::from(height)) as u32)
                .min(src_h);
            for x in 0..width {
                let sx0 = (u64::from(x) * u64::from(src_w) / u64::from(width)) as u32;
                let sx1 = ((u64::from(x + 1) * u64::from(src_w)).div_ceil(u64::from(width)) as u32)
                    .min(src_w);
                let mut sum = 0u64;
                let mut count = 0u64;
                for sy in sy0..sy1 {
                    for sx in sx0..sx1 {
                        sum += u64::from(src.get_pixel(sx, sy)[0]);
                        count += 1;
                    }
                }
                let value = if count == 0 {
                    0
                } else {
                    ((sum as f64 / count as f64).round()) as u8
                };
                out.put_pixel(x, y, image::Luma([value]));
            }
        }
        out
    } else {
        imageops::resize(src, width, height, FilterType::Triangle)
    }
}

/// Mean structural similarity over uniform square windows.
///
/// Both images must share dimensions. Local statistics use sample
/// normalization (`n - 1`); the window shrinks for images smaller than
/// the nominal 7x7. Result is clamped to `[0, 1]`.
fn ssim(a: &GrayImage, b: &GrayImage) -> f64 {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let (width, height) = a.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let win = WINDOW.min(width).min(height);
    let n = f64::from(win * win);
    let mut sum = 0.0;
    let mut windows = 0u64;

    for y0 in 0..=(height - win) {
        for x0 in 0..=(width - win) {
            let (mut sa, mut sb, mut saa, mut sbb, mut sab) = (0.0, 0.0, 0.0, 0.0, 0.0);
            for y in y0..y0 + win {
                for x in x0..x0 + win {
                    let pa = f64::from(a.get_pixel(x, y)[0]);
                    let pb = f64::from(b.get_pixel(x, y)[0]);
                    sa += pa;
                    sb += pb;
                    saa += pa * pa;
                    sbb += pb * pb;
                    sab += pa * pb;
                }
            }
            let mu_a = sa / n;
            let mu_b = sb / n;
            let (var_a, var_b, cov) = if n > 1.0 {
                (
                    (saa - n * mu_a * mu_a) / (n - 1.0),
                    (sbb - n * mu_b * mu_b) / (n - 1.0),
                    (sab - n * mu_a * mu_b) / (n - 1.0),
                )
            } else {
                (0.0, 0.0, 0.0)
            };
            let numerator = (2.0 * mu_a * mu_b + C1) * (2.0 * cov + C2);
            let denominator = (mu_a * mu_a + mu_b * mu_b + C1) * (var_a + var_b + C2);
            sum += numerator / denominator;
            windows += 1;
        }
    }

    (sum / windows as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, value: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([value, value, value]))
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let v = ((x * 13 + y * 7) % 256) as u8;
            Rgb([v, v, v])
        })
    }

    #[test]
    fn identical_sets_score_100() {
        let set = vec![gradient(16, 16), solid(16, 16, 200)];
        assert_eq!(image_similarity(&set, &set).unwrap(), 100.0);
    }

    #[test]
    fn empty_source_set_is_invalid() {
        let set = vec![gradient(8, 8)];
        match image_similarity(&[], &set) {
            Err(PdfSimError::InvalidComparison(_)) => {}
            other => panic!("expected InvalidComparison, got {other:?}"),
        }
    }

    #[test]
    fn empty_candidate_set_is_invalid() {
        let set = vec![gradient(8, 8)];
        match image_similarity(&set, &[]) {
            Err(PdfSimError::InvalidComparison(_)) => {}
            other => panic!("expected InvalidComparison, got {other:?}"),
        }
    }

    #[test]
    fn best_match_asymmetry_is_preserved() {
        // Two images on one side, only one of them on the other: the
        // two-image side averages one perfect and one near-zero match,
        // the one-image side finds its perfect partner.
        let white = solid(16, 16, 255);
        let black = solid(16, 16, 0);
        let both = vec![white.clone(), black];
        let only_white = vec![white];

        let forward = image_similarity(&both, &only_white).unwrap();
        let backward = image_similarity(&only_white, &both).unwrap();

        assert_eq!(backward, 100.0);
        assert!(forward < 100.0);
        assert_eq!(forward, 50.0);
        assert_ne!(forward, backward);
    }

    #[test]
    fn candidate_resized_to_source_dimensions() {
        // A 2x nearest-neighbor enlargement collapses back to the
        // original under area averaging, so the match stays perfect.
        let small = gradient(8, 8);
        let big = RgbImage::from_fn(16, 16, |x, y| *small.get_pixel(x / 2, y / 2));
        let score = image_similarity(&[small], &[big]).unwrap();
        assert_eq!(score, 100.0);
    }

    #[test]
    fn dissimilar_images_score_low() {
        let score = image_similarity(&[solid(16, 16, 0)], &[solid(16, 16, 255)]).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn tiny_images_use_shrunk_window() {
        let tiny = solid(2, 2, 128);
        assert_eq!(image_similarity(&[tiny.clone()], &[tiny]).unwrap(), 100.0);
    }
}
