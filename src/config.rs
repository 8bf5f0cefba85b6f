use crate::error::PlotError;

/// Merge threshold applied by the top-level entry points (pixels).
pub(crate) const MERGE_THRESHOLD: f64 = 5.0;
/// 2-opt full-pass cap applied by the top-level entry points.
pub(crate) const MAX_TWO_OPT_PASSES: usize = 100;
/// Default seed for the k-means and Poisson-disk generators.
pub(crate) const DEFAULT_SEED: u64 = 0x5eed_1234;

/// How paths are pulled out of the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// K-means color quantization, one set of region outlines per cluster.
    ColorRegions,
    /// Row-run detection stitched into stroke centerlines.
    Centerline,
    /// Tone-quantized hatching.
    Hatching,
}

/// Hatch pattern used by the Hatching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatchingStyle {
    Parallel,
    Contour,
    Cross,
    Stippling,
}

/// How a weighted path is expanded into multiple pen strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightStyle {
    Parallel,
    Outline,
    Scribble,
    Zigzag,
}

/// Extraction parameters shared by all modes.
/// One flat struct, adjustable at runtime for editor sliders.
#[derive(Debug, Clone)]
pub struct Options {
    /// Number of k-means clusters (ColorRegions) or tone levels (Hatching), 2-32.
    pub num_colors: u32,
    /// Grayscale ink threshold for the Centerline mode (0-255).
    pub threshold: u8,
    /// Maximum horizontal drift when stitching centerline runs (pixels, 0-50).
    pub proximity: f64,
    /// Base hatch spacing in pixels (1-20).
    pub hatch_spacing: f64,
    /// Hatch angle in degrees (0-180).
    pub hatch_angle: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            num_colors: 6,
            threshold: 128,
            proximity: 5.0,
            hatch_spacing: 5.0,
            hatch_angle: 45.0,
        }
    }
}

impl Options {
    /// Check every documented range; the pipeline refuses to start on a
    /// violation rather than clamping silently.
    pub fn validate(&self) -> Result<(), PlotError> {
        range("num_colors", self.num_colors as f64, 2.0, 32.0)?;
        range("proximity", self.proximity, 0.0, 50.0)?;
        range("hatch_spacing", self.hatch_spacing, 1.0, 20.0)?;
        range("hatch_angle", self.hatch_angle, 0.0, 180.0)?;
        Ok(())
    }
}

fn range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), PlotError> {
    if !(min..=max).contains(&value) || !value.is_finite() {
        return Err(PlotError::OptionRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Post-extraction toggles: curve fitting, line weight, optimization.
#[derive(Debug, Clone)]
pub struct AdvancedOptions {
    /// Fit cubic beziers over the optimized polylines (curve entry point only).
    pub curve_fitting: bool,
    /// RMS tolerance for the bezier fit, in pixels.
    pub curve_tolerance: f64,
    /// Replace near-circular beziers with arcs.
    pub arc_conversion: bool,
    /// Pattern used by the Hatching mode.
    pub hatching_style: HatchingStyle,
    /// Expand paths into multiple strokes by local contrast.
    /// Ignored in Hatching mode (tone already encodes density).
    pub variable_weight: bool,
    /// Stroke pattern for the weight expansion.
    pub weight_style: WeightStyle,
    /// Run the pen-travel optimizer.
    pub path_optimization: bool,
    /// Coalesce near-touching endpoints before ordering (under optimization).
    pub path_merging: bool,
    /// Reorder paths with 2-opt (under optimization).
    pub two_opt: bool,
    /// Seed for the k-means and Poisson-disk generators.
    pub seed: u64,
}

impl Default for AdvancedOptions {
    fn default() -> Self {
        Self {
            curve_fitting: false,
            curve_tolerance: 2.0,
            arc_conversion: false,
            hatching_style: HatchingStyle::Parallel,
            variable_weight: false,
            weight_style: WeightStyle::Parallel,
            path_optimization: false,
            path_merging: true,
            two_opt: true,
            seed: DEFAULT_SEED,
        }
    }
}

impl AdvancedOptions {
    pub fn validate(&self) -> Result<(), PlotError> {
        if self.curve_tolerance <= 0.0 || !self.curve_tolerance.is_finite() {
            return Err(PlotError::OptionRange {
                name: "curve_tolerance",
                value: self.curve_tolerance,
                min: f64::MIN_POSITIVE,
                max: f64::INFINITY,
            });
        }
        Ok(())
    }
}
