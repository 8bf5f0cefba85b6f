//! Curve fitting: optimized polylines → cubic beziers, optionally arcs.
//!
//! Per polyline:
//! 1. Greedy window search for the longest sub-segment a single cubic
//!    covers within tolerance
//! 2. Control-point refinement by local perturbation
//! 3. Optional post-pass replacing near-circular cubics with arcs

use kurbo::{CubicBez, ParamCurve, Point, Vec2};

use crate::geom::Polyline;

/// Longest window (in polyline segments) a single cubic may cover.
const MAX_WINDOW: usize = 20;
/// Refinement rounds of the 3x3 control perturbation.
const REFINE_ROUNDS: usize = 5;
/// Perturbation step in pixels, applied on both axes.
const REFINE_STEP: f64 = 0.5;
/// Control arm length as a fraction of the chord.
const CONTROL_ARM: f64 = 0.3;
/// Samples taken along a cubic when testing for circularity.
const ARC_SAMPLES: usize = 11;
/// Below this determinant the circle fit is degenerate.
const DEGENERATE_DET: f64 = 1e-10;

/// A fitted plotter segment. Consumers match exhaustively; there is no
/// third shape.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveSegment {
    /// Cubic bezier.
    Bezier {
        start: Point,
        control1: Point,
        control2: Point,
        end: Point,
    },
    /// Circular arc from `start` to `end` around `center`.
    Arc {
        start: Point,
        end: Point,
        center: Point,
        radius: f64,
        clockwise: bool,
    },
}

impl CurveSegment {
    pub fn start(&self) -> Point {
        match *self {
            CurveSegment::Bezier { start, .. } | CurveSegment::Arc { start, .. } => start,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            CurveSegment::Bezier { end, .. } | CurveSegment::Arc { end, .. } => end,
        }
    }

    /// Point at parameter `t` in [0, 1]. Both shapes return `start` at
    /// 0 and `end` at 1 exactly.
    pub fn evaluate(&self, t: f64) -> Point {
        match *self {
            CurveSegment::Bezier {
                start,
                control1,
                control2,
                end,
            } => CubicBez::new(start, control1, control2, end).eval(t),
            CurveSegment::Arc {
                start,
                end,
                center,
                radius,
                clockwise,
            } => {
                if t <= 0.0 {
                    return start;
                }
                if t >= 1.0 {
                    return end;
                }
                let a0 = (start.y - center.y).atan2(start.x - center.x);
                let a1 = (end.y - center.y).atan2(end.x - center.x);
                let mut sweep = a1 - a0;
                if clockwise && sweep > 0.0 {
                    sweep -= std::f64::consts::TAU;
                } else if !clockwise && sweep < 0.0 {
                    sweep += std::f64::consts::TAU;
                }
                let angle = a0 + sweep * t;
                Point::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            }
        }
    }
}

// ── Bezier fitting ───────────────────────────────────────

/// Fit cubic beziers over a polyline.
///
/// Walks a greedy window left to right: the longest sub-segment whose
/// candidate cubic stays within `tolerance` (RMS) is emitted, refined.
/// Stubborn stretches fall back to a short pass-through cubic.
pub fn fit_curves(points: &Polyline, tolerance: f64) -> Vec<CurveSegment> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut i = 0;
    while i < n - 1 {
        let longest = (n - 1 - i).min(MAX_WINDOW);

        let mut accepted = None;
        for window in (2..=longest).rev() {
            let j = i + window;
            let candidate = candidate_cubic(points, i, j);
            if rms_error(&candidate, &points[i..=j]) <= tolerance {
                accepted = Some((refine(candidate, &points[i..=j]), j));
                break;
            }
        }

        match accepted {
            Some((cubic, j)) => {
                segments.push(to_segment(cubic));
                i = j;
            }
            None => {
                segments.push(simple_cubic(points, i));
                i += 2;
            }
        }
    }
    segments
}

/// Candidate cubic over `points[i..=j]`: chord endpoints, control arms
/// along the finite-difference tangents.
fn candidate_cubic(points: &[Point], i: usize, j: usize) -> CubicBez {
    let n = points.len();
    let start = points[i];
    let end = points[j];

    let start_tangent = if i == 0 {
        points[i + 1] - points[i]
    } else {
        points[i + 1] - points[i - 1]
    };
    let end_tangent = if j == n - 1 {
        points[j] - points[j - 1]
    } else {
        points[j + 1] - points[j - 1]
    };

    let arm = CONTROL_ARM * start.distance(end);
    CubicBez::new(
        start,
        start + unit_or_zero(start_tangent) * arm,
        end - unit_or_zero(end_tangent) * arm,
        end,
    )
}

fn unit_or_zero(v: Vec2) -> Vec2 {
    let length = v.hypot();
    if length > 1e-12 {
        v / length
    } else {
        Vec2::ZERO
    }
}

/// RMS distance between uniformly parameterized curve samples and the
/// polyline points they stand in for.
fn rms_error(cubic: &CubicBez, points: &[Point]) -> f64 {
    let m = points.len();
    if m < 2 {
        return 0.0;
    }
    let sum: f64 = points
        .iter()
        .enumerate()
        .map(|(k, &p)| {
            let t = k as f64 / (m - 1) as f64;
            let d = cubic.eval(t).distance(p);
            d * d
        })
        .sum();
    (sum / m as f64).sqrt()
}

/// Exhaustive 3x3 perturbation of each control point, keeping strict
/// improvements, for a fixed number of rounds.
fn refine(mut cubic: CubicBez, points: &[Point]) -> CubicBez {
    let offsets = [-REFINE_STEP, 0.0, REFINE_STEP];
    let mut error = rms_error(&cubic, points);

    for _ in 0..REFINE_ROUNDS {
        for control in 0..2 {
            let base = if control == 0 { cubic.p1 } else { cubic.p2 };
            let mut best = base;
            for dx in offsets {
                for dy in offsets {
                    let moved = Point::new(base.x + dx, base.y + dy);
                    let trial = if control == 0 {
                        CubicBez::new(cubic.p0, moved, cubic.p2, cubic.p3)
                    } else {
                        CubicBez::new(cubic.p0, cubic.p1, moved, cubic.p3)
                    };
                    let e = rms_error(&trial, points);
                    if e < error {
                        error = e;
                        best = moved;
                    }
                }
            }
            if control == 0 {
                cubic.p1 = best;
            } else {
                cubic.p2 = best;
            }
        }
    }
    cubic
}

/// Fallback cubic through up to three points, controls at the chord
/// midpoints. Advancing by two keeps the walk moving on noisy data.
fn simple_cubic(points: &[Point], i: usize) -> CurveSegment {
    let n = points.len();
    let j = (i + 2).min(n - 1);
    let start = points[i];
    let end = points[j];
    let (control1, control2) = if j == i + 2 {
        (points[i].midpoint(points[i + 1]), points[i + 1].midpoint(end))
    } else {
        let mid = start.midpoint(end);
        (mid, mid)
    };
    CurveSegment::Bezier {
        start,
        control1,
        control2,
        end,
    }
}

fn to_segment(cubic: CubicBez) -> CurveSegment {
    CurveSegment::Bezier {
        start: cubic.p0,
        control1: cubic.p1,
        control2: cubic.p2,
        end: cubic.p3,
    }
}

// ── Arc conversion ───────────────────────────────────────

/// Replace each near-circular bezier with an arc; everything else is
/// passed through unchanged.
pub fn convert_arcs(segments: Vec<CurveSegment>, tolerance: f64) -> Vec<CurveSegment> {
    segments
        .into_iter()
        .map(|segment| match segment {
            CurveSegment::Bezier { .. } => {
                try_arc(&segment, tolerance).unwrap_or(segment)
            }
            arc => arc,
        })
        .collect()
}

/// Sample the cubic and test the samples against a least-squares circle.
fn try_arc(segment: &CurveSegment, tolerance: f64) -> Option<CurveSegment> {
    let samples: Vec<Point> = (0..ARC_SAMPLES)
        .map(|k| segment.evaluate(k as f64 / (ARC_SAMPLES - 1) as f64))
        .collect();

    let (center, radius) = fit_circle(&samples)?;
    let max_deviation = samples
        .iter()
        .map(|p| (p.distance(center) - radius).abs())
        .fold(0.0, f64::max);
    if max_deviation > tolerance {
        return None;
    }

    let start = segment.start();
    let end = segment.end();
    let mid = segment.evaluate(0.5);
    let cross = (mid - start).cross(end - start);
    Some(CurveSegment::Arc {
        start,
        end,
        center,
        radius,
        clockwise: cross < 0.0,
    })
}

/// Algebraic (Kasa) least-squares circle fit.
///
/// Minimizes the residual of `x^2 + y^2 + Ax + By + C = 0` over the
/// samples via the 3x3 normal equations. Collinear samples make the
/// system singular; the caller keeps the bezier in that case.
fn fit_circle(points: &[Point]) -> Option<(Point, f64)> {
    let n = points.len() as f64;
    let (mut sx, mut sy, mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    let (mut sxz, mut syz, mut sz) = (0.0, 0.0, 0.0);
    for p in points {
        let z = p.x * p.x + p.y * p.y;
        sx += p.x;
        sy += p.y;
        sxx += p.x * p.x;
        syy += p.y * p.y;
        sxy += p.x * p.y;
        sxz += p.x * z;
        syz += p.y * z;
        sz += z;
    }

    // Normal equations for [A, B, C].
    let det = det3(sxx, sxy, sx, sxy, syy, sy, sx, sy, n);
    if det.abs() < DEGENERATE_DET {
        return None;
    }
    let a = det3(-sxz, sxy, sx, -syz, syy, sy, -sz, sy, n) / det;
    let b = det3(sxx, -sxz, sx, sxy, -syz, sy, sx, -sz, n) / det;
    let c = det3(sxx, sxy, -sxz, sxy, syy, -syz, sx, sy, -sz) / det;

    let center = Point::new(-a / 2.0, -b / 2.0);
    let radius_squared = (a * a + b * b) / 4.0 - c;
    if radius_squared <= 0.0 {
        return None;
    }
    Some((center, radius_squared.sqrt()))
}

#[allow(clippy::too_many_arguments)]
fn det3(
    m00: f64,
    m01: f64,
    m02: f64,
    m10: f64,
    m11: f64,
    m12: f64,
    m20: f64,
    m21: f64,
    m22: f64,
) -> f64 {
    m00 * (m11 * m22 - m12 * m21) - m01 * (m10 * m22 - m12 * m20)
        + m02 * (m10 * m21 - m11 * m20)
}
