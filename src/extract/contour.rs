//! External contour tracing over a binary mask.
//!
//! Components are discovered in raster scan order and each contributes
//! exactly one outer boundary, walked with a 4-connected radial sweep.
//! Collinear runs are compressed so only direction-change vertices are
//! emitted, like OpenCV's CHAIN_APPROX_SIMPLE.

use kurbo::Point;

use crate::geom::Polyline;
use crate::raster::Mask;

/// Clockwise 4-neighborhood in image coordinates (y down): E, S, W, N.
const DX: [i64; 4] = [1, 0, -1, 0];
const DY: [i64; 4] = [0, 1, 0, -1];

/// Flat boolean copy of the mask for cheap bounds-checked reads.
struct Bitmap {
    data: Vec<bool>,
    width: i64,
    height: i64,
}

impl Bitmap {
    fn from_mask(mask: &Mask) -> Self {
        let width = mask.width() as i64;
        let height = mask.height() as i64;
        let mut data = vec![false; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                data[(y * width + x) as usize] = mask.get(x, y);
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Out-of-bounds reads are background.
    fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return false;
        }
        self.data[(y * self.width + x) as usize]
    }

    fn index(&self, x: i64, y: i64) -> usize {
        (y * self.width + x) as usize
    }
}

/// Trace the outer boundary of every 4-connected component.
///
/// Contours are emitted in scan order of their topmost-leftmost pixel,
/// as open polylines of pixel coordinates (the closing edge back to the
/// first vertex is implicit for region outlines).
pub fn external_contours(mask: &Mask) -> Vec<Polyline> {
    let bitmap = Bitmap::from_mask(mask);
    let mut visited = vec![false; bitmap.data.len()];
    let mut contours = Vec::new();

    for y in 0..bitmap.height {
        for x in 0..bitmap.width {
            if !bitmap.get(x, y) || visited[bitmap.index(x, y)] {
                continue;
            }
            let boundary = trace_boundary(&bitmap, x, y);
            mark_component(&bitmap, &mut visited, x, y);

            let compressed = compress_runs(&boundary);
            contours.push(
                compressed
                    .into_iter()
                    .map(|(px, py)| Point::new(px as f64, py as f64))
                    .collect(),
            );
        }
    }

    contours
}

/// Radial-sweep boundary walk from the component's first scan-order pixel.
///
/// At each step the 4-neighborhood is searched clockwise starting one
/// turn left of the last move, which keeps the walk hugging the boundary.
/// The walk stops when it repeats its first move (position and direction),
/// so one-pixel-wide spurs are traversed down and back as expected. The
/// returned list ends back on the start pixel, closing the outline.
fn trace_boundary(bitmap: &Bitmap, x0: i64, y0: i64) -> Vec<(i64, i64)> {
    let mut points = vec![(x0, y0)];

    let mut x = x0;
    let mut y = y0;
    // The start pixel has no set neighbor above or to its left, so
    // pretending we arrived heading east makes the first search probe
    // north first and walk the boundary clockwise.
    let mut dir = 0usize;

    let mut first_state: Option<(i64, i64, usize)> = None;
    let step_cap = 4 * bitmap.data.len() + 4;

    for _ in 0..step_cap {
        let mut moved = false;
        let search_from = (dir + 3) % 4;
        for turn in 0..4 {
            let candidate = (search_from + turn) % 4;
            let nx = x + DX[candidate];
            let ny = y + DY[candidate];
            if bitmap.get(nx, ny) {
                x = nx;
                y = ny;
                dir = candidate;
                moved = true;
                break;
            }
        }
        if !moved {
            // Isolated pixel.
            break;
        }

        match first_state {
            None => first_state = Some((x, y, dir)),
            Some(state) => {
                if state == (x, y, dir) {
                    break;
                }
            }
        }
        points.push((x, y));
    }

    points
}

/// Keep only vertices where the walk changes direction.
fn compress_runs(points: &[(i64, i64)]) -> Vec<(i64, i64)> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut result = vec![points[0]];
    for window in points.windows(3) {
        let incoming = (window[1].0 - window[0].0, window[1].1 - window[0].1);
        let outgoing = (window[2].0 - window[1].0, window[2].1 - window[1].1);
        if incoming != outgoing {
            result.push(window[1]);
        }
    }
    result.push(points[points.len() - 1]);
    result
}

/// Flood-fill the 4-connected component so the scan never re-traces it.
fn mark_component(bitmap: &Bitmap, visited: &mut [bool], x0: i64, y0: i64) {
    let mut stack = vec![(x0, y0)];
    visited[bitmap.index(x0, y0)] = true;

    while let Some((x, y)) = stack.pop() {
        for d in 0..4 {
            let nx = x + DX[d];
            let ny = y + DY[d];
            if bitmap.get(nx, ny) && !visited[bitmap.index(nx, ny)] {
                visited[bitmap.index(nx, ny)] = true;
                stack.push((nx, ny));
            }
        }
    }
}
