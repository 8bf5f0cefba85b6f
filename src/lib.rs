//! img2plot: raster image → plotter-ready vector paths.
//!
//! Converts an RGBA raster into an ordered set of polylines or bezier/arc
//! segments for a pen plotter. The pipeline runs extraction (color
//! regions, centerlines, or hatching), optional line-weight expansion,
//! pen-travel optimization, and optional curve fitting.
//!
//! # Example
//!
//! ```no_run
//! use img2plot::{process, AdvancedOptions, ExtractMode, Options, Raster};
//! use std::path::Path;
//!
//! let raster = Raster::from_path(Path::new("drawing.png"))?;
//! let result = process(
//!     &raster,
//!     ExtractMode::ColorRegions,
//!     &Options::default(),
//!     &AdvancedOptions::default(),
//! )?;
//! // result.paths contains Vec<img2plot::Polyline>
//! # Ok::<(), img2plot::PlotError>(())
//! ```

#![forbid(unsafe_code)]

mod extract;

pub mod config;
pub mod error;
pub mod fit;
pub mod geom;
pub mod hatch;
pub mod optimize;
pub mod output;
pub mod raster;
pub mod weight;

// Re-export kurbo so downstream users get the same Point type
// carried by Polyline and CurveSegment.
pub use kurbo;

pub use config::{AdvancedOptions, ExtractMode, HatchingStyle, Options, WeightStyle};
pub use error::PlotError;
pub use fit::CurveSegment;
pub use geom::Polyline;
pub use raster::Raster;

use std::time::{Duration, Instant};

use log::debug;

use crate::weight::{WeightContext, WeightedPath};

/// The result of one pipeline run: ordered paths plus travel accounting.
#[derive(Debug, Clone)]
pub struct PlotResult {
    /// Plotter paths in drawing order, pixel coordinates, y down.
    pub paths: Vec<Polyline>,
    /// Pen-up travel across the final ordering, in pixels.
    pub total_travel: f64,
    /// Percent travel reduction achieved by the optimizer (0 when off).
    pub improvement: f64,
    pub elapsed: Duration,
}

/// Full pipeline: raster → ordered polylines.
///
/// Stages: extraction by `mode`, optional line-weight expansion (skipped
/// in Hatching mode), optional pen-travel optimization. Only input
/// validation can fail; extraction troubles degrade to fallbacks or an
/// empty output instead of surfacing.
pub fn process(
    raster: &Raster,
    mode: ExtractMode,
    options: &Options,
    advanced: &AdvancedOptions,
) -> Result<PlotResult, PlotError> {
    options.validate()?;
    advanced.validate()?;
    let t_start = Instant::now();

    // ── Extract ───────────────────────────────────────────
    let mut paths = extract::extract(raster, mode, options, advanced);
    paths.retain(|p| p.len() >= 2);
    debug!("extracted {} paths", paths.len());

    // ── Line weight ───────────────────────────────────────
    if advanced.variable_weight && mode != ExtractMode::Hatching {
        let context = match mode {
            ExtractMode::ColorRegions => WeightContext::Outline,
            _ => WeightContext::Detail,
        };
        paths = paths
            .into_iter()
            .flat_map(|centerline| {
                let weight = weight::analyze_weight(raster, &centerline, context);
                weight::expand(&WeightedPath {
                    centerline,
                    weight,
                    style: advanced.weight_style,
                })
            })
            .collect();
        debug!("weight expansion: {} strokes", paths.len());
    }

    // ── Optimize ──────────────────────────────────────────
    let (paths, total_travel, improvement) = if advanced.path_optimization {
        let optimized = optimize::optimize(
            paths,
            &optimize::OptimizeOptions {
                merge: advanced.path_merging,
                merge_threshold: config::MERGE_THRESHOLD,
                two_opt: advanced.two_opt,
                max_two_opt_passes: config::MAX_TWO_OPT_PASSES,
            },
        );
        debug!(
            "optimizer: travel {:.1}px, improvement {:.1}%",
            optimized.total_distance, optimized.improvement
        );
        (optimized.paths, optimized.total_distance, optimized.improvement)
    } else {
        let travel = optimize::total_travel(&paths);
        (paths, travel, 0.0)
    };

    Ok(PlotResult {
        paths,
        total_travel,
        improvement,
        elapsed: t_start.elapsed(),
    })
}

/// Full pipeline ending in fitted curves instead of raw polylines.
///
/// Runs [`process`], then fits each polyline to cubic beziers at
/// `curve_tolerance`, optionally replacing near-circular cubics with
/// arcs. Paths keep their optimized order; windows run left to right
/// along each polyline.
pub fn process_with_curves(
    raster: &Raster,
    mode: ExtractMode,
    options: &Options,
    advanced: &AdvancedOptions,
) -> Result<Vec<CurveSegment>, PlotError> {
    let result = process(raster, mode, options, advanced)?;

    let mut segments = Vec::new();
    for path in &result.paths {
        segments.extend(fit::fit_curves(path, advanced.curve_tolerance));
    }
    if advanced.arc_conversion {
        segments = fit::convert_arcs(segments, advanced.curve_tolerance);
    }
    debug!("fitted {} curve segments", segments.len());
    Ok(segments)
}
