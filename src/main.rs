use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use img2plot::output::svg;
use img2plot::{AdvancedOptions, ExtractMode, HatchingStyle, Options, Raster, WeightStyle};

#[derive(Parser)]
#[command(name = "img2plot", about = "Raster image to plotter-ready SVG paths")]
struct Cli {
    /// Input image path (PNG, JPEG, BMP)
    #[arg(short, long)]
    input: PathBuf,

    /// Output SVG path
    #[arg(short, long)]
    output: PathBuf,

    /// Extraction mode
    #[arg(short, long, value_enum, default_value = "color-regions")]
    mode: Mode,

    /// Color clusters / tone levels (2-32)
    #[arg(long, default_value = "6")]
    colors: u32,

    /// Centerline ink threshold (0-255)
    #[arg(long, default_value = "128")]
    threshold: u8,

    /// Centerline stitch proximity in pixels (0-50)
    #[arg(long, default_value = "5")]
    proximity: f64,

    /// Hatch spacing in pixels (1-20)
    #[arg(long, default_value = "5")]
    spacing: f64,

    /// Hatch angle in degrees (0-180)
    #[arg(long, default_value = "45")]
    angle: f64,

    /// Hatch pattern
    #[arg(long, value_enum, default_value = "parallel")]
    hatch_style: HatchArg,

    /// Fit cubic beziers over the optimized paths
    #[arg(long)]
    curves: bool,

    /// Curve fitting tolerance in pixels
    #[arg(long, default_value = "2.0")]
    tolerance: f64,

    /// Replace near-circular beziers with arcs (implies --curves)
    #[arg(long)]
    arcs: bool,

    /// Expand strokes by local contrast
    #[arg(long)]
    weight: bool,

    /// Stroke pattern for the weight expansion
    #[arg(long, value_enum, default_value = "parallel")]
    weight_style: WeightArg,

    /// Optimize pen travel
    #[arg(long)]
    optimize: bool,

    /// Skip endpoint merging under --optimize
    #[arg(long)]
    no_merge: bool,

    /// Skip 2-opt reordering under --optimize
    #[arg(long)]
    no_two_opt: bool,

    /// Seed for the randomized stages
    #[arg(long)]
    seed: Option<u64>,

    /// Invert the image before extraction (white-on-black sources)
    #[arg(long)]
    invert: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    ColorRegions,
    Centerline,
    Hatching,
}

#[derive(Clone, Copy, ValueEnum)]
enum HatchArg {
    Parallel,
    Contour,
    Cross,
    Stippling,
}

#[derive(Clone, Copy, ValueEnum)]
enum WeightArg {
    Parallel,
    Outline,
    Scribble,
    Zigzag,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mode = match cli.mode {
        Mode::ColorRegions => ExtractMode::ColorRegions,
        Mode::Centerline => ExtractMode::Centerline,
        Mode::Hatching => ExtractMode::Hatching,
    };

    let options = Options {
        num_colors: cli.colors,
        threshold: cli.threshold,
        proximity: cli.proximity,
        hatch_spacing: cli.spacing,
        hatch_angle: cli.angle,
    };

    let mut advanced = AdvancedOptions::default();
    advanced.curve_fitting = cli.curves || cli.arcs;
    advanced.curve_tolerance = cli.tolerance;
    advanced.arc_conversion = cli.arcs;
    advanced.hatching_style = match cli.hatch_style {
        HatchArg::Parallel => HatchingStyle::Parallel,
        HatchArg::Contour => HatchingStyle::Contour,
        HatchArg::Cross => HatchingStyle::Cross,
        HatchArg::Stippling => HatchingStyle::Stippling,
    };
    advanced.variable_weight = cli.weight;
    advanced.weight_style = match cli.weight_style {
        WeightArg::Parallel => WeightStyle::Parallel,
        WeightArg::Outline => WeightStyle::Outline,
        WeightArg::Scribble => WeightStyle::Scribble,
        WeightArg::Zigzag => WeightStyle::Zigzag,
    };
    advanced.path_optimization = cli.optimize;
    advanced.path_merging = !cli.no_merge;
    advanced.two_opt = !cli.no_two_opt;
    if let Some(seed) = cli.seed {
        advanced.seed = seed;
    }

    let mut raster = Raster::from_path(&cli.input)?;
    if cli.invert {
        raster.invert();
    }
    let (width, height) = (raster.width(), raster.height());

    if advanced.curve_fitting {
        let segments = img2plot::process_with_curves(&raster, mode, &options, &advanced)?;
        svg::write_curves(&cli.output, &segments, width, height)?;
        eprintln!(
            "Wrote {} curve segments to {}",
            segments.len(),
            cli.output.display()
        );
    } else {
        let result = img2plot::process(&raster, mode, &options, &advanced)?;
        svg::write_paths(&cli.output, &result.paths, width, height)?;
        eprintln!(
            "Wrote {} paths to {}  (travel {:.0}px, improvement {:.1}%, {}ms)",
            result.paths.len(),
            cli.output.display(),
            result.total_travel,
            result.improvement,
            result.elapsed.as_millis()
        );
    }

    Ok(())
}
