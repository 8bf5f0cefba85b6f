//! Path extraction: raster → polylines, one strategy per mode.

pub mod centerline;
pub mod contour;
pub mod kmeans;
pub mod regions;
pub mod tone;

use crate::config::{AdvancedOptions, ExtractMode, Options};
use crate::geom::Polyline;
use crate::raster::Raster;

/// Run the extractor selected by `mode`.
pub fn extract(
    raster: &Raster,
    mode: ExtractMode,
    options: &Options,
    advanced: &AdvancedOptions,
) -> Vec<Polyline> {
    match mode {
        ExtractMode::ColorRegions => {
            regions::extract(raster, options.num_colors, advanced.seed)
        }
        ExtractMode::Centerline => {
            centerline::extract(raster, options.threshold, options.proximity)
        }
        ExtractMode::Hatching => tone::extract(
            raster,
            options.num_colors,
            advanced.hatching_style,
            options.hatch_spacing,
            options.hatch_angle,
            advanced.seed,
        ),
    }
}
