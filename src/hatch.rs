//! Artistic hatching: stroke generators clipped to a tone mask.

use kurbo::{Point, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::HatchingStyle;
use crate::extract::contour::external_contours;
use crate::geom::{normal, Polyline};
use crate::raster::Mask;

/// Intensity floor so sparse tones never explode the line spacing.
const MIN_INTENSITY: f64 = 0.3;
/// Candidate attempts per active sample in Bridson's algorithm.
const POISSON_K: usize = 30;

/// Generate hatch strokes for one tone level.
///
/// `intensity` is the normalized tone in (0, 1]; higher means denser.
/// Every emitted vertex lies on an inside pixel of `mask`.
pub fn hatch_mask(
    mask: &Mask,
    style: HatchingStyle,
    base_spacing: f64,
    angle: f64,
    intensity: f64,
    seed: u64,
) -> Vec<Polyline> {
    match style {
        HatchingStyle::Parallel => {
            parallel_lines(mask, base_spacing / intensity.max(MIN_INTENSITY), angle)
        }
        HatchingStyle::Cross => cross_hatch(mask, base_spacing, angle, intensity, seed),
        HatchingStyle::Contour => contour_hatch(mask, base_spacing, intensity),
        HatchingStyle::Stippling => stippling(mask, base_spacing, intensity, seed),
    }
}

// ── Parallel ─────────────────────────────────────────────

/// Sweep a family of parallel lines across the image at `angle` degrees,
/// keeping the maximal in-mask runs of each line.
fn parallel_lines(mask: &Mask, spacing: f64, angle: f64) -> Vec<Polyline> {
    let width = mask.width() as f64;
    let height = mask.height() as f64;
    let center = Point::new(width / 2.0, height / 2.0);
    let half_diagonal = (width * width + height * height).sqrt() / 2.0;

    let theta = angle.to_radians();
    let direction = Vec2::new(theta.cos(), theta.sin());
    let across = Vec2::new(-theta.sin(), theta.cos());

    // Roughly one sample per pixel along each line.
    let samples = ((2.0 * half_diagonal).floor() as usize).max(2);

    let mut paths = Vec::new();
    let mut offset = -half_diagonal;
    while offset <= half_diagonal {
        let base = center + across * offset;
        let line = (0..samples).map(|i| {
            let t = -half_diagonal
                + i as f64 * (2.0 * half_diagonal) / (samples - 1) as f64;
            base + direction * t
        });
        paths.extend(in_mask_runs(line, mask, 2));
        offset += spacing;
    }
    paths
}

/// Split a sampled line into maximal runs of in-mask points.
fn in_mask_runs<I>(points: I, mask: &Mask, min_points: usize) -> Vec<Polyline>
where
    I: Iterator<Item = Point>,
{
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for p in points {
        if mask.contains(p.x, p.y) {
            current.push(p);
        } else if current.len() >= min_points {
            runs.push(std::mem::take(&mut current));
        } else {
            current.clear();
        }
    }
    if current.len() >= min_points {
        runs.push(current);
    }
    runs
}

// ── Cross ────────────────────────────────────────────────

/// Layered cross-hatch: the tone picks how many of the four rotated
/// layers to draw; later layers are sparser and length-varied.
fn cross_hatch(mask: &Mask, base_spacing: f64, angle: f64, intensity: f64, seed: u64) -> Vec<Polyline> {
    let layers = (intensity * 4.0).ceil().max(1.0) as usize;
    let angles = [angle, angle + 90.0, angle + 45.0, angle + 135.0];
    let mut rng = StdRng::seed_from_u64(seed);

    let mut paths = Vec::new();
    for layer in 0..layers {
        let spacing = base_spacing * (1.0 + 0.3 * layer as f64);
        let lines = parallel_lines(mask, spacing, angles[layer % 4]);
        if layer == 0 {
            paths.extend(lines);
            continue;
        }
        for line in lines {
            // A factor above 1 cannot extend a clipped run, so the random
            // length variation acts as a symmetric trim.
            let factor = rng.gen_range(0.8f64..1.2).min(1.0);
            paths.push(trim_symmetric(line, factor));
        }
    }
    paths
}

/// Keep the middle `factor` of a polyline's points, at least two.
fn trim_symmetric(line: Polyline, factor: f64) -> Polyline {
    let n = line.len();
    let keep = ((n as f64 * factor).round() as usize).clamp(2, n);
    let start = (n - keep) / 2;
    line[start..start + keep].to_vec()
}

// ── Contour ──────────────────────────────────────────────

/// Concentric inward offsets of the mask's outlines.
///
/// The per-vertex normal offset can self-intersect on concave regions;
/// the wobble is accepted as part of the style rather than resolved with
/// polygon clipping.
fn contour_hatch(mask: &Mask, base_spacing: f64, intensity: f64) -> Vec<Polyline> {
    let spacing = base_spacing / (0.3 + 0.7 * intensity);
    let layers = (intensity * 8.0).ceil().max(1.0) as usize;

    let rings: Vec<Polyline> = external_contours(mask)
        .into_iter()
        .map(|mut c| {
            // The traced outline closes back on its start; the cyclic
            // offset and smoothing want each vertex once.
            if c.len() > 1 && c.first() == c.last() {
                c.pop();
            }
            c
        })
        .filter(|c| c.len() >= 3)
        .collect();

    let mut paths = Vec::new();
    for layer in 0..layers {
        for ring in &rings {
            // Traced outlines run clockwise in image coordinates, so the
            // averaged vertex normals point into the region.
            let offset = offset_ring(ring, layer as f64 * spacing);
            let smoothed = smooth_ring(&smooth_ring(&offset));

            // Close the loop, then keep what still lies in the mask.
            let mut closed = smoothed;
            if let Some(&first) = closed.first() {
                closed.push(first);
            }
            paths.extend(in_mask_runs(closed.into_iter(), mask, 3));
        }
    }
    paths
}

/// Offset every vertex of a closed ring along its averaged edge-normal
/// bisector.
fn offset_ring(ring: &Polyline, offset: f64) -> Polyline {
    if offset == 0.0 {
        return ring.clone();
    }
    let n = ring.len();
    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let curr = ring[i];
            let next = ring[(i + 1) % n];
            let bisector = normal(prev, curr) + normal(curr, next);
            let length = bisector.hypot();
            let direction = if length > 1e-12 {
                bisector / length
            } else {
                normal(prev, next)
            };
            curr + direction * offset
        })
        .collect()
}

/// One pass of (1, 2, 1) / 4 weighted smoothing on a cyclic sequence.
fn smooth_ring(ring: &Polyline) -> Polyline {
    let n = ring.len();
    if n < 3 {
        return ring.clone();
    }
    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let curr = ring[i];
            let next = ring[(i + 1) % n];
            Point::new(
                (prev.x + 2.0 * curr.x + next.x) / 4.0,
                (prev.y + 2.0 * curr.y + next.y) / 4.0,
            )
        })
        .collect()
}

// ── Stippling ────────────────────────────────────────────

/// Poisson-disk dots: blue-noise placement, density from the tone.
/// Each dot is a short two-point tick so the pen leaves a visible mark.
fn stippling(mask: &Mask, base_spacing: f64, intensity: f64, seed: u64) -> Vec<Polyline> {
    let min_dist = base_spacing * 0.5;
    let max_dist = base_spacing * 2.0;
    let width = mask.width() as f64;
    let height = mask.height() as f64;
    let target = (width * height * (intensity * 0.3) / (min_dist * min_dist)) as usize;

    let mut rng = StdRng::seed_from_u64(seed);
    let samples = poisson_disk(width, height, min_dist, max_dist, target, &mut rng);

    samples
        .into_iter()
        .filter(|p| mask.contains(p.x, p.y))
        .map(|p| {
            let tick = rng.gen_range(0.5..1.5);
            vec![p, Point::new(p.x + tick, p.y)]
        })
        .collect()
}

/// Bridson's algorithm: uniformly distributed samples with a minimum
/// pairwise distance, capped at `target` samples.
fn poisson_disk(
    width: f64,
    height: f64,
    min_dist: f64,
    max_dist: f64,
    target: usize,
    rng: &mut StdRng,
) -> Vec<Point> {
    if target == 0 || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }

    // Grid cells sized so each can hold at most one sample.
    let cell = min_dist / std::f64::consts::SQRT_2;
    let grid_w = (width / cell).ceil() as usize + 1;
    let grid_h = (height / cell).ceil() as usize + 1;
    let mut grid: Vec<Option<usize>> = vec![None; grid_w * grid_h];

    let cell_of = |p: Point| {
        let cx = (p.x / cell) as usize;
        let cy = (p.y / cell) as usize;
        (cx.min(grid_w - 1), cy.min(grid_h - 1))
    };

    let mut points = Vec::new();
    let mut active = Vec::new();

    let first = Point::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height));
    let (cx, cy) = cell_of(first);
    grid[cy * grid_w + cx] = Some(0);
    points.push(first);
    active.push(0);

    while !active.is_empty() && points.len() < target {
        let slot = rng.gen_range(0..active.len());
        let base = points[active[slot]];

        let mut placed = false;
        for _ in 0..POISSON_K {
            let radius = rng.gen_range(min_dist..max_dist);
            let theta = rng.gen_range(0.0..std::f64::consts::TAU);
            let candidate = Point::new(
                base.x + radius * theta.cos(),
                base.y + radius * theta.sin(),
            );
            if candidate.x < 0.0
                || candidate.y < 0.0
                || candidate.x >= width
                || candidate.y >= height
            {
                continue;
            }

            let (ccx, ccy) = cell_of(candidate);
            let clear = neighborhood(ccx, ccy, grid_w, grid_h).all(|(nx, ny)| {
                match grid[ny * grid_w + nx] {
                    Some(i) => points[i].distance(candidate) >= min_dist,
                    None => true,
                }
            });
            if clear {
                grid[ccy * grid_w + ccx] = Some(points.len());
                active.push(points.len());
                points.push(candidate);
                placed = true;
                break;
            }
        }
        if !placed {
            active.swap_remove(slot);
        }
    }

    points
}

/// The 5x5 cell block around (cx, cy), clipped to the grid.
fn neighborhood(
    cx: usize,
    cy: usize,
    grid_w: usize,
    grid_h: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let x0 = cx.saturating_sub(2);
    let y0 = cy.saturating_sub(2);
    let x1 = (cx + 2).min(grid_w - 1);
    let y1 = (cy + 2).min(grid_h - 1);
    (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| (x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mask() -> Mask {
        Mask::from_fn(100, 100, |x, y| (20..=80).contains(&x) && (20..=80).contains(&y))
    }

    #[test]
    fn parallel_vertices_stay_inside_mask() {
        let mask = square_mask();
        let paths = hatch_mask(&mask, HatchingStyle::Parallel, 5.0, 30.0, 0.8, 1);
        assert!(!paths.is_empty());
        for path in &paths {
            assert!(path.len() >= 2);
            for p in path {
                assert!(mask.contains(p.x, p.y), "vertex {:?} escaped the mask", p);
            }
        }
    }

    #[test]
    fn cross_emits_more_layers_at_full_intensity() {
        let mask = square_mask();
        let single = hatch_mask(&mask, HatchingStyle::Parallel, 5.0, 0.0, 1.0, 1);
        let crossed = hatch_mask(&mask, HatchingStyle::Cross, 5.0, 0.0, 1.0, 1);
        assert!(crossed.len() > single.len());
        for path in &crossed {
            for p in path {
                assert!(mask.contains(p.x, p.y));
            }
        }
    }

    #[test]
    fn contour_rings_shrink_inward() {
        let mask = square_mask();
        let paths = hatch_mask(&mask, HatchingStyle::Contour, 4.0, 0.0, 1.0, 1);
        assert!(!paths.is_empty());
        for path in &paths {
            assert!(path.len() >= 3);
            for p in path {
                assert!(mask.contains(p.x, p.y));
            }
        }
    }

    #[test]
    fn stippling_dots_respect_the_mask() {
        let mask = square_mask();
        let dots = hatch_mask(&mask, HatchingStyle::Stippling, 4.0, 0.0, 0.5, 1);
        assert!(!dots.is_empty());
        for dot in &dots {
            assert_eq!(dot.len(), 2);
            assert!(mask.contains(dot[0].x, dot[0].y));
            let dx = dot[1].x - dot[0].x;
            assert!((0.5..1.5).contains(&dx), "tick length {}", dx);
        }
    }

    #[test]
    fn stippling_keeps_minimum_spacing() {
        let mask = Mask::from_fn(60, 60, |_, _| true);
        let dots = hatch_mask(&mask, HatchingStyle::Stippling, 6.0, 0.0, 1.0, 3);
        let centers: Vec<Point> = dots.iter().map(|d| d[0]).collect();
        for (i, a) in centers.iter().enumerate() {
            for b in &centers[i + 1..] {
                assert!(
                    a.distance(*b) >= 3.0 - 1e-9,
                    "dots {:?} and {:?} too close",
                    a,
                    b
                );
            }
        }
    }
}
