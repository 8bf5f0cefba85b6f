//! Variable line-weight simulation: one centerline → several pen strokes.

use kurbo::Point;

use crate::config::WeightStyle;
use crate::geom::{normal, Polyline};
use crate::raster::Raster;

/// Offsets smaller than this are below pen resolution.
const MIN_OFFSET: f64 = 0.1;
/// Vertices sampled by the contrast analysis.
const ANALYSIS_SAMPLES: usize = 10;

/// A centerline with a pen-weight multiplier. 1.0 is a single neutral
/// stroke; above 1.0 the path widens into multiple strokes.
#[derive(Debug, Clone)]
pub struct WeightedPath {
    pub centerline: Polyline,
    pub weight: f64,
    pub style: WeightStyle,
}

/// What a stroke depicts, for the contrast-based weight analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightContext {
    /// Region boundaries: contrast thickens the stroke sharply.
    Outline,
    /// Interior detail lines: contrast thickens moderately.
    Detail,
    /// Fill strokes: contrast thins them instead.
    Fill,
}

/// Tiny index-seeded generator for the scribble jitter, so each copy
/// wobbles the same way on every run.
struct Lcg {
    state: u32,
}

impl Lcg {
    fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Uniform value in [0, 1].
    fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.state as f64 / u32::MAX as f64
    }

    /// Uniform value in [-1, 1].
    fn next_signed(&mut self) -> f64 {
        2.0 * self.next_f64() - 1.0
    }
}

/// Expand a weighted path into plottable strokes.
///
/// Weights at or below neutral plot as the bare centerline; a pen cannot
/// draw thinner than itself.
pub fn expand(path: &WeightedPath) -> Vec<Polyline> {
    if path.weight <= 1.0 || path.centerline.len() < 2 {
        return vec![path.centerline.clone()];
    }
    let thickness = (path.weight - 1.0) * 2.0;
    match path.style {
        WeightStyle::Parallel => parallel_strokes(&path.centerline, path.weight, thickness),
        WeightStyle::Outline => outline_strokes(&path.centerline, thickness),
        WeightStyle::Scribble => scribble_strokes(&path.centerline, thickness),
        WeightStyle::Zigzag => zigzag_strokes(&path.centerline, thickness),
    }
}

/// Offset a polyline along its vertex normals.
///
/// End vertices use the adjacent edge's normal; interior vertices use the
/// renormalized average of both edge normals. Offsets below pen
/// resolution return the input unchanged.
pub fn offset_polyline(line: &Polyline, offset: f64) -> Polyline {
    if offset.abs() < MIN_OFFSET || line.len() < 2 {
        return line.clone();
    }
    let n = line.len();
    (0..n)
        .map(|i| {
            let direction = if i == 0 {
                normal(line[0], line[1])
            } else if i == n - 1 {
                normal(line[n - 2], line[n - 1])
            } else {
                let sum = normal(line[i - 1], line[i]) + normal(line[i], line[i + 1]);
                let length = sum.hypot();
                if length > 1e-12 {
                    sum / length
                } else {
                    // Hairpin vertex: the bisector vanishes.
                    normal(line[i - 1], line[i])
                }
            };
            line[i] + direction * offset
        })
        .collect()
}

// ── Styles ───────────────────────────────────────────────

/// Evenly spaced parallel copies across the stroke width.
fn parallel_strokes(line: &Polyline, weight: f64, thickness: f64) -> Vec<Polyline> {
    let lines = ((weight * 2.0).ceil() as usize).max(1);
    if lines == 1 {
        return vec![line.clone()];
    }
    (0..lines)
        .map(|i| {
            let offset = -thickness / 2.0 + thickness * i as f64 / (lines - 1) as f64;
            offset_polyline(line, offset)
        })
        .collect()
}

/// Two outline strokes plus shortened interior fill passes.
fn outline_strokes(line: &Polyline, thickness: f64) -> Vec<Polyline> {
    let mut strokes = vec![
        offset_polyline(line, thickness / 2.0),
        offset_polyline(line, -thickness / 2.0),
    ];

    let spacing = (thickness / 8.0).max(0.5);
    let mut offset = -thickness / 2.0 + spacing;
    while offset < thickness / 2.0 {
        strokes.push(trim_ends(offset_polyline(line, offset)));
        offset += spacing;
    }
    strokes
}

/// Drop 10% of the points from each end, keeping at least a segment.
fn trim_ends(line: Polyline) -> Polyline {
    let n = line.len();
    let trim = n / 10;
    if n - 2 * trim < 2 {
        return line;
    }
    line[trim..n - trim].to_vec()
}

/// The centerline plus jittered copies, each from its own LCG stream.
fn scribble_strokes(line: &Polyline, thickness: f64) -> Vec<Polyline> {
    let copies = (thickness.min(4.0) * 3.0).ceil() as usize;
    let amplitude = thickness / 4.0;

    let mut strokes = vec![line.clone()];
    for copy in 0..copies {
        let mut rng = Lcg::new(copy as u32);
        let jittered: Polyline = line
            .iter()
            .map(|p| {
                Point::new(
                    p.x + rng.next_signed() * amplitude,
                    p.y + rng.next_signed() * amplitude,
                )
            })
            .collect();

        // Occasional midpoints break up long straight wobbles.
        let mut stroke = Vec::with_capacity(jittered.len());
        for i in 0..jittered.len() {
            stroke.push(jittered[i]);
            if i + 1 < jittered.len() && rng.next_f64() < 0.3 {
                stroke.push(jittered[i].midpoint(jittered[i + 1]));
            }
        }
        strokes.push(stroke);
    }
    strokes
}

/// A sawtooth weaving across the centerline, plus both outlines.
fn zigzag_strokes(line: &Polyline, thickness: f64) -> Vec<Polyline> {
    let half = thickness / 2.0;
    let mut saw = vec![line[0]];
    let mut flip = 1.0;

    for pair in line.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = a.distance(b);
        let steps = ((length / thickness.max(2.0)).floor() as usize).max(1);
        let across = normal(a, b);
        for step in 1..=steps {
            let t = step as f64 / steps as f64;
            saw.push(a.lerp(b, t) + across * (flip * half));
            flip = -flip;
        }
    }

    vec![
        saw,
        offset_polyline(line, half),
        offset_polyline(line, -half),
    ]
}

// ── Weight analysis ──────────────────────────────────────

/// Estimate a stroke weight from local raster contrast.
///
/// Samples up to ten equally spaced vertices; at each, contrast is the
/// grayscale span of the 3x3 neighborhood. The mean contrast is mapped
/// through the context curve.
pub fn analyze_weight(raster: &Raster, line: &Polyline, context: WeightContext) -> f64 {
    let n = line.len();
    if n == 0 {
        return 1.0;
    }
    let samples = n.min(ANALYSIS_SAMPLES);

    let mut total = 0.0;
    let mut valid = 0usize;
    for k in 0..samples {
        let index = if samples == 1 {
            0
        } else {
            k * (n - 1) / (samples - 1)
        };
        if let Some(contrast) = local_contrast(raster, line[index]) {
            total += contrast;
            valid += 1;
        }
    }
    let contrast = if valid > 0 { total / valid as f64 } else { 0.0 };

    match context {
        WeightContext::Outline => 1.0 + 2.0 * contrast,
        WeightContext::Detail => 1.0 + contrast,
        WeightContext::Fill => (1.0 - 0.5 * contrast).max(0.5),
    }
}

/// Grayscale (max - min) / 255 over the 3x3 neighborhood, None when the
/// vertex falls outside the raster.
fn local_contrast(raster: &Raster, p: Point) -> Option<f64> {
    let cx = p.x.round() as i64;
    let cy = p.y.round() as i64;
    if cx < 0 || cy < 0 || cx >= raster.width() as i64 || cy >= raster.height() as i64 {
        return None;
    }

    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for dy in -1..=1 {
        for dx in -1..=1 {
            let x = cx + dx;
            let y = cy + dy;
            if x < 0 || y < 0 || x >= raster.width() as i64 || y >= raster.height() as i64 {
                continue;
            }
            let v = raster.gray(x as u32, y as u32);
            min = min.min(v);
            max = max.max(v);
        }
    }
    Some((max - min) as f64 / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal_line() -> Polyline {
        (0..10).map(|i| Point::new(i as f64 * 5.0, 20.0)).collect()
    }

    #[test]
    fn zero_offset_returns_pointwise_equal_line() {
        let line = horizontal_line();
        assert_eq!(offset_polyline(&line, 0.0), line);
        assert_eq!(offset_polyline(&line, 0.05), line);
    }

    #[test]
    fn offset_translates_a_straight_line() {
        let line = horizontal_line();
        let shifted = offset_polyline(&line, 2.0);
        for (a, b) in line.iter().zip(shifted.iter()) {
            assert!((b.x - a.x).abs() < 1e-9);
            assert!((b.y - (a.y + 2.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn neutral_weight_passes_through() {
        let path = WeightedPath {
            centerline: horizontal_line(),
            weight: 1.0,
            style: WeightStyle::Parallel,
        };
        assert_eq!(expand(&path), vec![horizontal_line()]);
    }

    #[test]
    fn parallel_spreads_across_the_thickness() {
        let path = WeightedPath {
            centerline: horizontal_line(),
            weight: 2.0,
            style: WeightStyle::Parallel,
        };
        let strokes = expand(&path);
        assert_eq!(strokes.len(), 4, "ceil(2.0 * 2) copies");

        // Extremes sit at +-thickness/2 around the centerline.
        let thickness = 2.0;
        let ys: Vec<f64> = strokes.iter().map(|s| s[0].y).collect();
        assert!(ys.iter().any(|y| (y - (20.0 - thickness / 2.0)).abs() < 1e-9));
        assert!(ys.iter().any(|y| (y - (20.0 + thickness / 2.0)).abs() < 1e-9));
    }

    #[test]
    fn outline_includes_trimmed_fill() {
        let path = WeightedPath {
            centerline: horizontal_line(),
            weight: 3.0,
            style: WeightStyle::Outline,
        };
        let strokes = expand(&path);
        assert!(strokes.len() > 2, "outlines plus fill passes");
        // Fill passes are shorter than the outlines.
        let outline_len = strokes[0].len();
        assert!(strokes[2..].iter().all(|s| s.len() <= outline_len));
    }

    #[test]
    fn scribble_is_deterministic_and_bounded() {
        let path = WeightedPath {
            centerline: horizontal_line(),
            weight: 2.5,
            style: WeightStyle::Scribble,
        };
        let a = expand(&path);
        let b = expand(&path);
        assert_eq!(a, b);

        let thickness: f64 = 3.0;
        assert_eq!(a.len(), 1 + (thickness.min(4.0) * 3.0).ceil() as usize);
        // Jitter stays within +-thickness/4 per axis (midpoints interpolate).
        for stroke in &a[1..] {
            for p in stroke {
                assert!((p.y - 20.0).abs() <= thickness / 4.0 + 1e-9);
            }
        }
    }

    #[test]
    fn zigzag_weaves_between_the_outlines() {
        let path = WeightedPath {
            centerline: horizontal_line(),
            weight: 2.0,
            style: WeightStyle::Zigzag,
        };
        let strokes = expand(&path);
        assert_eq!(strokes.len(), 3);

        let thickness = 2.0;
        let saw = &strokes[0];
        assert!(saw.len() > horizontal_line().len(), "subdivided sawtooth");
        for p in &saw[1..] {
            assert!((p.y - 20.0).abs() <= thickness / 2.0 + 1e-9);
        }
    }

    #[test]
    fn analysis_maps_contrast_through_the_context() {
        // Flat gray: zero contrast everywhere.
        let flat = Raster::from_rgba(8, 8, vec![128; 8 * 8 * 4]).unwrap();
        let line: Polyline = vec![Point::new(2.0, 2.0), Point::new(5.0, 5.0)];
        assert_eq!(analyze_weight(&flat, &line, WeightContext::Outline), 1.0);
        assert_eq!(analyze_weight(&flat, &line, WeightContext::Fill), 1.0);

        // Checkerboard: maximum contrast.
        let mut pixels = Vec::new();
        for y in 0..8u32 {
            for x in 0..8u32 {
                let v = if (x + y) % 2 == 0 { 0 } else { 255 };
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let checker = Raster::from_rgba(8, 8, pixels).unwrap();
        let outline = analyze_weight(&checker, &line, WeightContext::Outline);
        assert!((outline - 3.0).abs() < 1e-9, "1 + 2 * 1.0, got {}", outline);
        let fill = analyze_weight(&checker, &line, WeightContext::Fill);
        assert!((fill - 0.5).abs() < 1e-9);
    }

    #[test]
    fn out_of_bounds_vertices_are_skipped() {
        let flat = Raster::from_rgba(4, 4, vec![200; 4 * 4 * 4]).unwrap();
        let line: Polyline = vec![Point::new(-10.0, -10.0), Point::new(2.0, 2.0)];
        // The off-raster vertex contributes nothing; the rest still counts.
        assert_eq!(analyze_weight(&flat, &line, WeightContext::Detail), 1.0);
    }
}
