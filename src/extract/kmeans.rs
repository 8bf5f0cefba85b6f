//! Seeded k-means color quantization in RGB space.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Lloyd iteration cap per restart.
const MAX_ITERATIONS: usize = 20;
/// A restart converges once every center moves less than this.
const CONVERGENCE_EPS: f64 = 1.0;
/// Independent random restarts; the lowest-inertia run wins.
const RESTARTS: usize = 10;

/// Result of one quantization: per-sample labels plus the cluster centers.
#[derive(Debug, Clone)]
pub struct Quantization {
    pub centers: Vec<[f64; 3]>,
    pub labels: Vec<u16>,
    pub inertia: f64,
}

/// Running accumulator for one cluster center.
#[derive(Debug, Clone, Default)]
struct Center {
    rgb: [f64; 3],
    sum: [f64; 3],
    count: u64,
}

impl Center {
    fn add_sample(&mut self, sample: [f64; 3]) {
        for c in 0..3 {
            self.sum[c] += sample[c];
        }
        self.count += 1;
    }

    /// Move the center to the cluster mean; returns the shift distance.
    /// Empty clusters keep their position.
    fn update(&mut self) -> f64 {
        let mut shift = 0.0;
        if self.count > 0 {
            let mut moved = [0.0; 3];
            for c in 0..3 {
                moved[c] = self.sum[c] / self.count as f64;
            }
            shift = squared_distance(self.rgb, moved).sqrt();
            self.rgb = moved;
        }
        self.sum = [0.0; 3];
        self.count = 0;
        shift
    }
}

/// Cluster `samples` into `k` groups. Returns `None` when there is
/// nothing to cluster, so the caller can fall back to thresholding.
pub fn quantize(samples: &[[f64; 3]], k: usize, seed: u64) -> Option<Quantization> {
    if samples.is_empty() || k == 0 {
        return None;
    }
    let k = k.min(samples.len());

    let mut rng = StdRng::seed_from_u64(seed);
    let mut best: Option<Quantization> = None;

    for _ in 0..RESTARTS {
        let run = lloyd_run(samples, k, &mut rng);
        if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }
    best
}

/// One restart: random initial centers, Lloyd iterations to convergence.
fn lloyd_run(samples: &[[f64; 3]], k: usize, rng: &mut StdRng) -> Quantization {
    let mut centers: Vec<Center> = (0..k)
        .map(|_| Center {
            rgb: samples[rng.gen_range(0..samples.len())],
            ..Center::default()
        })
        .collect();

    let mut labels = vec![0u16; samples.len()];
    for _ in 0..MAX_ITERATIONS {
        assign(samples, &centers, &mut labels);

        for (sample, &label) in samples.iter().zip(labels.iter()) {
            centers[label as usize].add_sample(*sample);
        }
        let max_shift = centers
            .iter_mut()
            .map(|center| center.update())
            .fold(0.0, f64::max);

        if max_shift < CONVERGENCE_EPS {
            break;
        }
    }
    assign(samples, &centers, &mut labels);

    let inertia = samples
        .par_iter()
        .zip(labels.par_iter())
        .map(|(sample, &label)| squared_distance(*sample, centers[label as usize].rgb))
        .sum();

    Quantization {
        centers: centers.into_iter().map(|c| c.rgb).collect(),
        labels,
        inertia,
    }
}

fn assign(samples: &[[f64; 3]], centers: &[Center], labels: &mut Vec<u16>) {
    *labels = samples
        .par_iter()
        .map(|sample| {
            let mut best_index = 0u16;
            let mut best_distance = f64::MAX;
            for (i, center) in centers.iter().enumerate() {
                let d = squared_distance(*sample, center.rgb);
                if d < best_distance {
                    best_distance = d;
                    best_index = i as u16;
                }
            }
            best_index
        })
        .collect();
}

fn squared_distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    (0..3).map(|c| (a[c] - b[c]) * (a[c] - b[c])).sum()
}
