//! Pen-travel optimization over an ordered path list.
//!
//! Three passes, in order: endpoint merging, 2-opt reordering, and a
//! greedy adjacent-swap cleanup. Travel is the summed pen-up distance
//! from each path's end to the next path's start.

use crate::geom::Polyline;

/// Strict-improvement epsilon for the reordering passes.
const IMPROVE_EPS: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    pub merge: bool,
    pub merge_threshold: f64,
    pub two_opt: bool,
    pub max_two_opt_passes: usize,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            merge: true,
            merge_threshold: crate::config::MERGE_THRESHOLD,
            two_opt: true,
            max_two_opt_passes: crate::config::MAX_TWO_OPT_PASSES,
        }
    }
}

/// Optimized ordering plus its travel accounting.
#[derive(Debug, Clone)]
pub struct Optimized {
    pub paths: Vec<Polyline>,
    pub total_distance: f64,
    /// Percent reduction of pen-up travel; 0 for empty input.
    pub improvement: f64,
}

/// Run the enabled passes and report the travel change.
pub fn optimize(paths: Vec<Polyline>, options: &OptimizeOptions) -> Optimized {
    let original = total_travel(&paths);

    let mut paths = paths;
    if options.merge {
        paths = merge_paths(paths, options.merge_threshold);
    }
    if options.two_opt {
        paths = two_opt(paths, options.max_two_opt_passes);
    }
    greedy_adjacent_swap(&mut paths);

    let total_distance = total_travel(&paths);
    let improvement = if original > 0.0 {
        (original - total_distance) / original * 100.0
    } else {
        0.0
    };
    Optimized {
        paths,
        total_distance,
        improvement,
    }
}

/// Summed pen-up travel across consecutive paths.
pub fn total_travel(paths: &[Polyline]) -> f64 {
    paths
        .windows(2)
        .map(|pair| travel_between(&pair[0], &pair[1]))
        .sum()
}

fn travel_between(a: &Polyline, b: &Polyline) -> f64 {
    match (a.last(), b.first()) {
        (Some(end), Some(start)) => end.distance(*start),
        _ => 0.0,
    }
}

// ── Merge ────────────────────────────────────────────────

/// Coalesce paths whose nearest endpoints are within `threshold`.
///
/// After every splice the inner scan restarts from the beginning: the
/// grown path has new endpoints that can reach earlier candidates. That
/// restart makes the worst case O(n^3), and the first-feasible scan
/// order is part of the output contract.
fn merge_paths(paths: Vec<Polyline>, threshold: f64) -> Vec<Polyline> {
    let mut used = vec![false; paths.len()];
    let mut result = Vec::new();

    for i in 0..paths.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut current = paths[i].clone();

        'scan: loop {
            for (j, candidate) in paths.iter().enumerate() {
                if used[j] {
                    continue;
                }
                if let Some(joined) = splice(&current, candidate, threshold) {
                    current = joined;
                    used[j] = true;
                    continue 'scan;
                }
            }
            break;
        }
        result.push(current);
    }
    result
}

/// Join `other` onto `current` if their best endpoint pairing is within
/// `threshold`, reversing whichever sides the pairing requires.
fn splice(current: &Polyline, other: &Polyline, threshold: f64) -> Option<Polyline> {
    let (cs, ce) = (*current.first()?, *current.last()?);
    let (os, oe) = (*other.first()?, *other.last()?);

    let pairings = [
        ce.distance(os), // append other
        ce.distance(oe), // append reversed other
        cs.distance(os), // reverse current, then append other
        cs.distance(oe), // prepend other
    ];
    let best = (0..4).fold(0, |best, k| {
        if pairings[k] < pairings[best] {
            k
        } else {
            best
        }
    });
    if pairings[best] > threshold {
        return None;
    }

    let mut joined = Vec::with_capacity(current.len() + other.len());
    match best {
        0 => {
            joined.extend_from_slice(current);
            joined.extend_from_slice(other);
        }
        1 => {
            joined.extend_from_slice(current);
            joined.extend(other.iter().rev().copied());
        }
        2 => {
            joined.extend(current.iter().rev().copied());
            joined.extend_from_slice(other);
        }
        _ => {
            joined.extend_from_slice(other);
            joined.extend_from_slice(current);
        }
    }
    Some(joined)
}

// ── 2-opt ────────────────────────────────────────────────

/// First-improvement 2-opt over the path order.
///
/// Paths are cities connected by end→start travel only; a reversal
/// changes every edge inside the reversed block (the paths themselves
/// are not flipped), so the travel delta is evaluated over the whole
/// affected range.
fn two_opt(paths: Vec<Polyline>, max_passes: usize) -> Vec<Polyline> {
    let n = paths.len();
    if n < 4 {
        return paths;
    }

    let mut order: Vec<usize> = (0..n).collect();
    for _ in 0..max_passes {
        let mut improved = false;
        for i in 1..n - 2 {
            for j in (i + 2)..n {
                let before = segment_travel(&paths, &order, i - 1, j);
                order[i..j].reverse();
                let after = segment_travel(&paths, &order, i - 1, j);
                if after + IMPROVE_EPS < before {
                    improved = true;
                } else {
                    order[i..j].reverse();
                }
            }
        }
        if !improved {
            break;
        }
    }

    let mut slots: Vec<Option<Polyline>> = paths.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect()
}

/// Travel along `order` positions `from..=to`.
fn segment_travel(paths: &[Polyline], order: &[usize], from: usize, to: usize) -> f64 {
    (from..to)
        .map(|k| travel_between(&paths[order[k]], &paths[order[k + 1]]))
        .sum()
}

// ── Greedy adjacent swap ─────────────────────────────────

/// Swap neighboring paths while doing so strictly shortens the travel
/// through them.
fn greedy_adjacent_swap(paths: &mut [Polyline]) {
    let n = paths.len();
    if n < 2 {
        return;
    }
    loop {
        let mut improved = false;
        for i in 0..n - 1 {
            let before = local_travel(paths, i);
            paths.swap(i, i + 1);
            let after = local_travel(paths, i);
            if after + IMPROVE_EPS < before {
                improved = true;
            } else {
                paths.swap(i, i + 1);
            }
        }
        if !improved {
            break;
        }
    }
}

/// Travel through the three edges touching positions i and i+1.
fn local_travel(paths: &[Polyline], i: usize) -> f64 {
    let mut travel = travel_between(&paths[i], &paths[i + 1]);
    if i > 0 {
        travel += travel_between(&paths[i - 1], &paths[i]);
    }
    if i + 2 < paths.len() {
        travel += travel_between(&paths[i + 1], &paths[i + 2]);
    }
    travel
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn path(points: &[(f64, f64)]) -> Polyline {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn empty_input_reports_zero() {
        let result = optimize(Vec::new(), &OptimizeOptions::default());
        assert!(result.paths.is_empty());
        assert_eq!(result.total_distance, 0.0);
        assert_eq!(result.improvement, 0.0);
    }

    #[test]
    fn near_touching_endpoints_merge() {
        let paths = vec![path(&[(0.0, 0.0), (10.0, 0.0)]), path(&[(11.0, 0.0), (20.0, 0.0)])];
        let result = optimize(paths, &OptimizeOptions::default());
        assert_eq!(result.paths.len(), 1);
        assert_eq!(
            result.paths[0],
            path(&[(0.0, 0.0), (10.0, 0.0), (11.0, 0.0), (20.0, 0.0)])
        );
    }

    #[test]
    fn merge_reverses_sides_when_needed() {
        // Both starts coincide: current must flip before appending.
        let paths = vec![path(&[(0.0, 0.0), (10.0, 0.0)]), path(&[(1.0, 0.0), (-9.0, 0.0)])];
        let options = OptimizeOptions {
            two_opt: false,
            ..OptimizeOptions::default()
        };
        let result = optimize(paths, &options);
        assert_eq!(result.paths.len(), 1);
        assert_eq!(
            result.paths[0],
            path(&[(10.0, 0.0), (0.0, 0.0), (1.0, 0.0), (-9.0, 0.0)])
        );
    }

    #[test]
    fn two_opt_swaps_the_interleaved_pair() {
        let p0 = path(&[(0.0, 0.0), (10.0, 0.0)]);
        let p1 = path(&[(100.0, 0.0), (110.0, 0.0)]);
        let p2 = path(&[(10.0, 1.0), (20.0, 1.0)]);
        let p3 = path(&[(110.0, 1.0), (120.0, 1.0)]);
        let original = vec![p0.clone(), p1.clone(), p2.clone(), p3.clone()];
        let before = total_travel(&original);

        let options = OptimizeOptions {
            merge: false,
            ..OptimizeOptions::default()
        };
        let result = optimize(original, &options);
        assert_eq!(result.paths, vec![p0, p2, p1, p3]);
        assert!(result.total_distance < before);
        assert!(result.improvement > 0.0);
    }

    #[test]
    fn travel_never_increases() {
        let paths = vec![
            path(&[(0.0, 0.0), (5.0, 5.0)]),
            path(&[(50.0, 0.0), (55.0, 5.0)]),
            path(&[(6.0, 6.0), (12.0, 2.0)]),
            path(&[(30.0, 30.0), (41.0, 7.0)]),
            path(&[(13.0, 2.0), (25.0, 25.0)]),
        ];
        let before = total_travel(&paths);
        let result = optimize(paths, &OptimizeOptions::default());
        assert!(result.total_distance <= before + 1e-9);
        assert!(result.improvement >= 0.0);
    }

    #[test]
    fn optimizing_twice_changes_nothing() {
        let paths = vec![
            path(&[(0.0, 0.0), (5.0, 5.0)]),
            path(&[(50.0, 0.0), (55.0, 5.0)]),
            path(&[(6.0, 6.0), (12.0, 2.0)]),
            path(&[(30.0, 30.0), (41.0, 7.0)]),
        ];
        let options = OptimizeOptions::default();
        let once = optimize(paths, &options);
        let travel_once = once.total_distance;
        let twice = optimize(once.paths, &options);
        assert!((twice.total_distance - travel_once).abs() < 1e-9);
        assert_eq!(twice.improvement, 0.0);
    }

    #[test]
    fn greedy_swap_orders_a_reversed_pair() {
        // Merge and 2-opt disabled: only the adjacent swap can act.
        let options = OptimizeOptions {
            merge: false,
            two_opt: false,
            ..OptimizeOptions::default()
        };
        let far = path(&[(50.0, 0.0), (51.0, 0.0)]);
        let near = path(&[(0.0, 0.0), (1.0, 0.0)]);
        // far.end -> near.start is 51, the swapped near.end -> far.start
        // only 49.
        let result = optimize(vec![far.clone(), near.clone()], &options);
        assert_eq!(result.paths, vec![near, far]);
    }
}
