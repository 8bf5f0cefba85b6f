//! Shared geometry utilities.

use kurbo::{Point, Vec2};

/// An ordered sequence of points interpreted as a connected open polyline.
/// Fewer than 2 points is not a drawable path.
pub type Polyline = Vec<Point>;

/// Distance from `p` to the infinite line through `a` and `b`.
///
/// Uses the implicit line form `|Ax + By + C| / sqrt(A^2 + B^2)`.
/// Falls back to point distance when `a == b`.
pub fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let la = b.y - a.y;
    let lb = a.x - b.x;
    let lc = b.x * a.y - a.x * b.y;
    let denom = (la * la + lb * lb).sqrt();
    if denom == 0.0 {
        return p.distance(a);
    }
    (la * p.x + lb * p.y + lc).abs() / denom
}

/// Unit vector perpendicular (90 degrees counter-clockwise) to `b - a`.
/// Returns `(0, 1)` when `a == b`.
pub fn normal(a: Point, b: Point) -> Vec2 {
    let edge = b - a;
    let length = edge.hypot();
    if length == 0.0 {
        return Vec2::new(0.0, 1.0);
    }
    Vec2::new(-edge.y / length, edge.x / length)
}

/// Ramer-Douglas-Peucker polyline simplification.
///
/// Recursively keeps the point of maximum perpendicular deviation from
/// the chord while it exceeds `epsilon`. Inputs of 2 or fewer points are
/// returned verbatim; otherwise the output always keeps both endpoints.
pub fn douglas_peucker(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_distance = 0.0;
    let mut max_index = 0;
    for (i, &p) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let d = perpendicular_distance(p, first, last);
        if d > max_distance {
            max_distance = d;
            max_index = i;
        }
    }

    if max_distance > epsilon {
        let mut left = douglas_peucker(&points[..=max_index], epsilon);
        let right = douglas_peucker(&points[max_index..], epsilon);
        // The split point appears in both halves; keep one copy.
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perpendicular_distance_to_horizontal_line() {
        let d = perpendicular_distance(
            Point::new(5.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((d - 3.0).abs() < 1e-12);
    }

    #[test]
    fn perpendicular_distance_degenerate_chord() {
        let a = Point::new(2.0, 2.0);
        let d = perpendicular_distance(Point::new(5.0, 6.0), a, a);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn normal_is_unit_and_perpendicular() {
        let n = normal(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((n.hypot() - 1.0).abs() < 1e-12);
        assert!((n.dot(Vec2::new(3.0, 4.0))).abs() < 1e-12);
    }

    #[test]
    fn normal_degenerate_edge() {
        let a = Point::new(1.0, 1.0);
        assert_eq!(normal(a, a), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn douglas_peucker_collapses_near_straight_line() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.1),
            Point::new(2.0, 0.0),
            Point::new(3.0, -0.1),
            Point::new(10.0, 0.0),
        ];
        let simplified = douglas_peucker(&points, 0.5);
        assert_eq!(simplified, vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
    }

    #[test]
    fn douglas_peucker_keeps_significant_corner() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 4.0),
            Point::new(10.0, 0.0),
        ];
        let simplified = douglas_peucker(&points, 0.5);
        assert_eq!(simplified.len(), 3, "corner above epsilon must survive");
    }

    #[test]
    fn douglas_peucker_short_input_verbatim() {
        let points = vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        assert_eq!(douglas_peucker(&points, 10.0), points);
    }

    #[test]
    fn douglas_peucker_is_idempotent() {
        let points: Vec<Point> = (0..40)
            .map(|i| {
                let x = i as f64;
                Point::new(x, (x * 0.7).sin() * 5.0)
            })
            .collect();
        let once = douglas_peucker(&points, 1.0);
        let twice = douglas_peucker(&once, 1.0);
        assert_eq!(once, twice);
    }
}
