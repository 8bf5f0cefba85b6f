//! Hatching extractor: tone quantization driving the advanced hatcher.

use rayon::prelude::*;

use crate::config::HatchingStyle;
use crate::geom::Polyline;
use crate::hatch;
use crate::raster::{Mask, Raster};

/// Quantize the grayscale into `num_colors` levels and hatch each level.
///
/// Level masks are independent; the ordered collect keeps the
/// level-ascending emission order.
pub fn extract(
    raster: &Raster,
    num_colors: u32,
    style: HatchingStyle,
    spacing: f64,
    angle: f64,
    seed: u64,
) -> Vec<Polyline> {
    let width = raster.width();
    let height = raster.height();
    let step = 255.0 / num_colors as f64;

    let mut gray = vec![0u8; width as usize * height as usize];
    for y in 0..height {
        for x in 0..width {
            gray[y as usize * width as usize + x as usize] = raster.gray(x, y);
        }
    }

    let per_level: Vec<Vec<Polyline>> = (0..num_colors - 1)
        .into_par_iter()
        .map(|level| {
            let cutoff = (level as f64 + 0.5) * step;
            let mask = Mask::from_fn(width, height, |x, y| {
                gray[y as usize * width as usize + x as usize] as f64 >= cutoff
            });
            let intensity = 1.0 - level as f64 / (num_colors - 1) as f64;
            hatch::hatch_mask(
                &mask,
                style,
                spacing,
                angle,
                intensity,
                seed.wrapping_add(level as u64),
            )
        })
        .collect();

    per_level.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;

    fn gradient_raster(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::new();
        for _y in 0..height {
            for x in 0..width {
                let v = (x * 255 / width.max(1)) as u8;
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Raster::from_rgba(width, height, pixels).unwrap()
    }

    #[test]
    fn emits_paths_for_a_gradient() {
        let raster = gradient_raster(48, 48);
        let paths = extract(&raster, 4, HatchingStyle::Parallel, 4.0, 0.0, 1);
        assert!(!paths.is_empty());
        for path in &paths {
            assert!(path.len() >= 2);
        }
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let raster = gradient_raster(32, 32);
        let a = extract(&raster, 3, HatchingStyle::Stippling, 5.0, 45.0, 11);
        let b = extract(&raster, 3, HatchingStyle::Stippling, 5.0, 45.0, 11);
        assert_eq!(a, b);
    }
}
