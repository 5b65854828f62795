//! Color sampling and dominant-color clustering

use crate::error::VisionError;
use crate::model::RawMask;
use crate::types::Palette;
use image::RgbImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Fixed clustering seed so identical inputs produce identical palettes
const CLUSTER_SEED: u64 = 42;

const MAX_KMEANS_ITERATIONS: usize = 30;

/// Encode an RGB triple as a lowercase `#rrggbb` string.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Mean color of the image under the mask's set pixels, as `#rrggbb`.
///
/// Callers must only pass masks with at least one set pixel; an empty
/// support is an internal failure, not a recoverable condition.
pub fn mean_mask_color(image: &RgbImage, mask: &RawMask) -> Result<String, VisionError> {
    let mut sum = [0u64; 3];
    let mut count = 0u64;

    for (x, y, pixel) in image.enumerate_pixels() {
        if mask.is_set(x, y) {
            sum[0] += pixel[0] as u64;
            sum[1] += pixel[1] as u64;
            sum[2] += pixel[2] as u64;
            count += 1;
        }
    }

    if count == 0 {
        return Err(VisionError::Segmentation(
            "Mask has no set pixels to sample".to_string(),
        ));
    }

    let channel = |total: u64| ((total as f64 / count as f64).round()).clamp(0.0, 255.0) as u8;
    Ok(rgb_to_hex(channel(sum[0]), channel(sum[1]), channel(sum[2])))
}

/// Cluster every pixel in RGB space and return the cluster centers as hex
/// colors in cluster-index order.
///
/// Uses k-means with a fixed seed, so repeated runs over the same image give
/// the same palette. Images with fewer distinct colors than `n_colors`
/// degenerate to duplicate entries rather than failing.
pub fn extract_palette(image: &RgbImage, n_colors: usize) -> Result<Palette, VisionError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(VisionError::InvalidImage(
            "Cannot extract a palette from a zero-area image".to_string(),
        ));
    }
    if n_colors == 0 {
        return Err(VisionError::Config(
            "Palette size must be at least 1".to_string(),
        ));
    }

    let pixels: Vec<ColorPoint> = image
        .pixels()
        .map(|p| ColorPoint {
            r: p[0] as f64,
            g: p[1] as f64,
            b: p[2] as f64,
        })
        .collect();

    let centers = kmeans(&pixels, n_colors);
    debug!("Clustered {} pixels into {} colors", pixels.len(), centers.len());

    Ok(Palette::new(centers.iter().map(ColorPoint::to_hex).collect()))
}

#[derive(Debug, Clone, Copy, Default)]
struct ColorPoint {
    r: f64,
    g: f64,
    b: f64,
}

impl ColorPoint {
    fn dist_sq(&self, other: &ColorPoint) -> f64 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        dr * dr + dg * dg + db * db
    }

    fn to_hex(&self) -> String {
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        rgb_to_hex(channel(self.r), channel(self.g), channel(self.b))
    }
}

fn nearest(point: &ColorPoint, centers: &[ColorPoint]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::MAX;
    for (i, center) in centers.iter().enumerate() {
        let d = point.dist_sq(center);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Lloyd's algorithm with k-means++ seeding driven by a fixed-seed RNG.
fn kmeans(pixels: &[ColorPoint], k: usize) -> Vec<ColorPoint> {
    let mut rng = StdRng::seed_from_u64(CLUSTER_SEED);

    let mut centers = Vec::with_capacity(k);
    centers.push(pixels[rng.gen_range(0..pixels.len())]);

    while centers.len() < k {
        let distances: Vec<f64> = pixels
            .iter()
            .map(|p| {
                centers
                    .iter()
                    .map(|c| p.dist_sq(c))
                    .fold(f64::MAX, f64::min)
            })
            .collect();

        let total: f64 = distances.iter().sum();
        if total <= f64::EPSILON {
            // Every remaining pixel coincides with an existing center.
            let first = centers[0];
            centers.resize(k, first);
            break;
        }

        let mut threshold = rng.gen::<f64>() * total;
        let mut chosen = pixels.len() - 1;
        for (i, d) in distances.iter().enumerate() {
            threshold -= d;
            if threshold <= 0.0 {
                chosen = i;
                break;
            }
        }
        centers.push(pixels[chosen]);
    }

    let mut assignments = vec![0usize; pixels.len()];
    for iteration in 0..MAX_KMEANS_ITERATIONS {
        let mut changed = false;
        for (i, pixel) in pixels.iter().enumerate() {
            let c = nearest(pixel, &centers);
            if assignments[i] != c {
                assignments[i] = c;
                changed = true;
            }
        }

        let mut sums = vec![ColorPoint::default(); k];
        let mut counts = vec![0usize; k];
        for (i, pixel) in pixels.iter().enumerate() {
            let c = assignments[i];
            sums[c].r += pixel.r;
            sums[c].g += pixel.g;
            sums[c].b += pixel.b;
            counts[c] += 1;
        }
        for c in 0..k {
            if counts[c] > 0 {
                let n = counts[c] as f64;
                centers[c] = ColorPoint {
                    r: sums[c].r / n,
                    g: sums[c].g / n,
                    b: sums[c].b / n,
                };
            }
        }

        if !changed && iteration > 0 {
            break;
        }
    }

    centers
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_rgb_to_hex_is_lowercase_and_padded() {
        assert_eq!(rgb_to_hex(51, 102, 153), "#336699");
        assert_eq!(rgb_to_hex(0, 0, 0), "#000000");
        assert_eq!(rgb_to_hex(255, 255, 255), "#ffffff");
        assert_eq!(rgb_to_hex(10, 171, 205), "#0aabcd");
    }

    #[test]
    fn test_mean_mask_color_averages_channelwise() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([100, 0, 200]));
        image.put_pixel(1, 0, Rgb([200, 0, 100]));
        let mask = RawMask::from_pixels(vec![true, true], 2, 1, 0.9).unwrap();
        assert_eq!(mean_mask_color(&image, &mask).unwrap(), "#960096");
    }

    #[test]
    fn test_mean_mask_color_ignores_unset_pixels() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([50, 60, 70]));
        image.put_pixel(1, 0, Rgb([255, 255, 255]));
        let mask = RawMask::from_pixels(vec![true, false], 2, 1, 0.9).unwrap();
        assert_eq!(mean_mask_color(&image, &mask).unwrap(), "#323c46");
    }

    #[test]
    fn test_mean_mask_color_rejects_empty_support() {
        let image = RgbImage::new(2, 2);
        let mask = RawMask::from_pixels(vec![false; 4], 2, 2, 0.9).unwrap();
        assert!(matches!(
            mean_mask_color(&image, &mask),
            Err(VisionError::Segmentation(_))
        ));
    }

    #[test]
    fn test_palette_of_solid_image_repeats_the_color() {
        let image = RgbImage::from_pixel(16, 16, Rgb([51, 102, 153]));
        let palette = extract_palette(&image, 3).unwrap();
        assert_eq!(palette.len(), 3);
        for color in palette.colors() {
            assert_eq!(color, "#336699");
        }
    }

    #[test]
    fn test_palette_is_deterministic() {
        let image = RgbImage::from_fn(32, 32, |x, y| {
            if (x + y) % 3 == 0 {
                Rgb([250, 10, 10])
            } else if x % 2 == 0 {
                Rgb([10, 250, 10])
            } else {
                Rgb([10, 10, 250])
            }
        });
        let first = extract_palette(&image, 3).unwrap();
        let second = extract_palette(&image, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_palette_recovers_well_separated_colors() {
        let image = RgbImage::from_fn(30, 30, |_, y| {
            if y < 10 {
                Rgb([255, 0, 0])
            } else if y < 20 {
                Rgb([0, 255, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let palette = extract_palette(&image, 3).unwrap();
        let mut colors: Vec<&str> = palette.colors().iter().map(|c| c.as_str()).collect();
        colors.sort_unstable();
        assert_eq!(colors, vec!["#0000ff", "#00ff00", "#ff0000"]);
    }

    #[test]
    fn test_palette_rejects_zero_area_image() {
        let image = RgbImage::new(0, 0);
        assert!(matches!(
            extract_palette(&image, 3),
            Err(VisionError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_palette_rejects_zero_colors() {
        let image = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        assert!(matches!(
            extract_palette(&image, 0),
            Err(VisionError::Config(_))
        ));
    }
}
