//! Centerline extractor: horizontal ink runs stitched into strokes.

use kurbo::Point;

use crate::geom::Polyline;
use crate::raster::Raster;

/// A maximal horizontal run of ink pixels in one row.
///
/// The `used` flag is scoped to a single extraction: every run joins at
/// most one output path.
#[derive(Debug, Clone)]
struct RowRun {
    y: u32,
    x1: u32,
    x2: u32,
    mid: f64,
    used: bool,
}

impl RowRun {
    /// Horizontal gap between two runs' spans; 0 when they overlap.
    fn gap(&self, other: &RowRun) -> f64 {
        if self.x2 >= other.x1 && other.x2 >= self.x1 {
            0.0
        } else if self.x2 < other.x1 {
            (other.x1 - self.x2) as f64
        } else {
            (self.x1 - other.x2) as f64
        }
    }

    fn center(&self) -> Point {
        Point::new(self.mid, self.y as f64)
    }
}

/// Minimum stitched length worth plotting.
const MIN_PATH_RUNS: usize = 3;

/// Extract stroke centerlines.
///
/// Rows are scanned for maximal runs darker than `threshold`; each seed
/// run is then grown upward and downward to the closest compatible run
/// on each adjacent row, stopping at the first row with no candidate.
pub fn extract(raster: &Raster, threshold: u8, proximity: f64) -> Vec<Polyline> {
    let mut rows = detect_runs(raster, threshold);
    let max_gap = 2.0 * proximity;
    let mut paths = Vec::new();

    for y in 0..rows.len() {
        for i in 0..rows[y].len() {
            if rows[y][i].used {
                continue;
            }
            rows[y][i].used = true;

            // Grow upward from the seed, then downward, comparing each
            // candidate against the chain's current tip.
            let mut above = Vec::new();
            let mut tip = rows[y][i].clone();
            for yy in (0..y).rev() {
                match claim_closest(&mut rows[yy], &tip, max_gap) {
                    Some(run) => {
                        above.push(run.center());
                        tip = run;
                    }
                    None => break,
                }
            }

            let mut below = Vec::new();
            let mut tip = rows[y][i].clone();
            for row in rows.iter_mut().skip(y + 1) {
                match claim_closest(row, &tip, max_gap) {
                    Some(run) => {
                        below.push(run.center());
                        tip = run;
                    }
                    None => break,
                }
            }

            if above.len() + below.len() + 1 >= MIN_PATH_RUNS {
                let mut path: Polyline = above.into_iter().rev().collect();
                path.push(rows[y][i].center());
                path.extend(below);
                paths.push(path);
            }
        }
    }

    paths
}

/// Maximal runs of `(R+G+B)/3 < threshold` per row.
fn detect_runs(raster: &Raster, threshold: u8) -> Vec<Vec<RowRun>> {
    let mut rows = Vec::with_capacity(raster.height() as usize);
    for y in 0..raster.height() {
        let mut runs = Vec::new();
        let mut start: Option<u32> = None;
        for x in 0..raster.width() {
            let ink = raster.gray(x, y) < threshold;
            match (ink, start) {
                (true, None) => start = Some(x),
                (false, Some(x1)) => {
                    runs.push(make_run(y, x1, x - 1));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(x1) = start {
            runs.push(make_run(y, x1, raster.width() - 1));
        }
        rows.push(runs);
    }
    rows
}

fn make_run(y: u32, x1: u32, x2: u32) -> RowRun {
    RowRun {
        y,
        x1,
        x2,
        mid: (x1 + x2) as f64 / 2.0,
        used: false,
    }
}

/// Claim the cheapest unused run in `row` within the overlap gate.
/// Cost favors aligned midpoints over merely touching spans.
fn claim_closest(row: &mut [RowRun], tip: &RowRun, max_gap: f64) -> Option<RowRun> {
    let mut best: Option<(usize, f64)> = None;
    for (i, run) in row.iter().enumerate() {
        if run.used || run.gap(tip) > max_gap {
            continue;
        }
        let cost = (run.mid - tip.mid).abs() + 0.5 * run.gap(tip);
        if best.map_or(true, |(_, c)| cost < c) {
            best = Some((i, cost));
        }
    }
    best.map(|(i, _)| {
        row[i].used = true;
        row[i].clone()
    })
}
