//! Color-region extractor: k-means quantization → per-cluster outlines.

use imageproc::contrast::otsu_level;
use log::warn;
use rayon::prelude::*;

use crate::extract::{contour, kmeans};
use crate::geom::{self, Polyline};
use crate::raster::{Mask, Raster};

/// Contours shorter than this are pixel noise.
const MIN_CONTOUR_POINTS: usize = 10;
/// Douglas-Peucker epsilon for region outlines (pixels).
const SIMPLIFY_EPSILON: f64 = 2.0;
/// Simplified outlines below this cannot enclose a region.
const MIN_SIMPLIFIED_POINTS: usize = 3;

/// Extract region outlines, one batch per color cluster.
///
/// Clusters are processed independently and emitted in ascending cluster
/// order; within a cluster, contours keep their scan discovery order.
pub fn extract(raster: &Raster, num_colors: u32, seed: u64) -> Vec<Polyline> {
    let width = raster.width();
    let height = raster.height();

    let mut samples = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let [r, g, b] = raster.rgb(x, y);
            samples.push([r as f64, g as f64, b as f64]);
        }
    }

    let quantization = match kmeans::quantize(&samples, num_colors as usize, seed) {
        Some(q) if !q.labels.is_empty() => q,
        _ => {
            warn!("color quantization produced no labels, falling back to threshold contours");
            return threshold_fallback(raster);
        }
    };

    let labels = &quantization.labels;
    // Per-cluster masks are independent; the ordered collect keeps the
    // cluster-ascending emission order.
    let per_cluster: Vec<Vec<Polyline>> = (0..quantization.centers.len() as u16)
        .into_par_iter()
        .map(|cluster| {
            let mask = Mask::from_fn(width, height, |x, y| {
                labels[y as usize * width as usize + x as usize] == cluster
            });
            trace_mask(&mask)
        })
        .collect();

    per_cluster.into_iter().flatten().collect()
}

/// Contour-trace one mask and clean the results.
fn trace_mask(mask: &Mask) -> Vec<Polyline> {
    contour::external_contours(mask)
        .into_iter()
        .filter(|c| c.len() >= MIN_CONTOUR_POINTS)
        .map(|c| geom::douglas_peucker(&c, SIMPLIFY_EPSILON))
        .filter(|c| c.len() >= MIN_SIMPLIFIED_POINTS)
        .collect()
}

/// Quantization failed: binarize the grayscale with Otsu's threshold and
/// trace the dark side once. An empty result is a valid output.
fn threshold_fallback(raster: &Raster) -> Vec<Polyline> {
    let gray = raster.to_gray_image();
    let threshold = otsu_level(&gray);
    let mask = Mask::from_fn(raster.width(), raster.height(), |x, y| {
        gray.get_pixel(x, y).0[0] < threshold
    });
    trace_mask(&mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Solid color block on a contrasting background.
    fn two_tone_raster(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity(4 * width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let inside = (8..24).contains(&x) && (8..24).contains(&y);
                let v = if inside { 20 } else { 240 };
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Raster::from_rgba(width, height, pixels).unwrap()
    }

    #[test]
    fn finds_the_dark_region_outline() {
        let raster = two_tone_raster(32, 32);
        let paths = extract(&raster, 2, 1);
        assert!(!paths.is_empty(), "expected at least the block outline");

        // Some outline must hug the dark block.
        let hugs_block = paths.iter().any(|path| {
            path.iter()
                .all(|p| (6.0..=25.0).contains(&p.x) && (6.0..=25.0).contains(&p.y))
        });
        assert!(hugs_block, "no outline near the dark block: {:?}", paths);
    }

    #[test]
    fn output_stays_in_pixel_bounds() {
        let raster = two_tone_raster(32, 32);
        for path in extract(&raster, 4, 9) {
            assert!(path.len() >= MIN_SIMPLIFIED_POINTS);
            for p in path {
                assert!((0.0..32.0).contains(&p.x) && (0.0..32.0).contains(&p.y));
            }
        }
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let raster = two_tone_raster(24, 24);
        assert_eq!(extract(&raster, 3, 5), extract(&raster, 3, 5));
    }
}
