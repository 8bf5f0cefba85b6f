//! End-to-end pipeline tests on synthetic rasters.

use img2plot::{
    process, process_with_curves, AdvancedOptions, ExtractMode, HatchingStyle, Options, PlotError,
    Raster, WeightStyle,
};

/// Dark square on a light background.
fn block_raster(size: u32) -> Raster {
    let lo = size / 4;
    let hi = 3 * size / 4;
    let mut pixels = Vec::with_capacity(4 * (size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            let inside = (lo..hi).contains(&x) && (lo..hi).contains(&y);
            let v = if inside { 25 } else { 235 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    Raster::from_rgba(size, size, pixels).unwrap()
}

/// Thick dark vertical stroke.
fn stroke_raster(width: u32, height: u32) -> Raster {
    let mut pixels = Vec::new();
    for _y in 0..height {
        for x in 0..width {
            let ink = (width / 2 - 2..=width / 2 + 2).contains(&x);
            let v = if ink { 0 } else { 255 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    Raster::from_rgba(width, height, pixels).unwrap()
}

#[test]
fn color_regions_end_to_end() {
    let raster = block_raster(48);
    let result = process(
        &raster,
        ExtractMode::ColorRegions,
        &Options {
            num_colors: 2,
            ..Options::default()
        },
        &AdvancedOptions::default(),
    )
    .unwrap();

    assert!(!result.paths.is_empty());
    for path in &result.paths {
        assert!(path.len() >= 2);
        for p in path {
            assert!((0.0..48.0).contains(&p.x), "x out of bounds: {}", p.x);
            assert!((0.0..48.0).contains(&p.y), "y out of bounds: {}", p.y);
        }
    }
}

#[test]
fn centerline_end_to_end() {
    let raster = stroke_raster(32, 40);
    let result = process(
        &raster,
        ExtractMode::Centerline,
        &Options::default(),
        &AdvancedOptions::default(),
    )
    .unwrap();

    assert_eq!(result.paths.len(), 1, "one stroke, one centerline");
    let mid = 16.0;
    for p in &result.paths[0] {
        assert!((p.x - mid).abs() <= 1.0, "centerline strays to x={}", p.x);
    }
}

#[test]
fn hatching_end_to_end() {
    let raster = block_raster(64);
    let result = process(
        &raster,
        ExtractMode::Hatching,
        &Options {
            num_colors: 4,
            hatch_spacing: 4.0,
            ..Options::default()
        },
        &AdvancedOptions {
            hatching_style: HatchingStyle::Parallel,
            ..AdvancedOptions::default()
        },
    )
    .unwrap();

    assert!(!result.paths.is_empty());
    for path in &result.paths {
        for p in path {
            assert!((0.0..64.0).contains(&p.x) && (0.0..64.0).contains(&p.y));
        }
    }
}

#[test]
fn invalid_options_surface_to_the_caller() {
    let raster = block_raster(16);
    let bad = Options {
        num_colors: 1,
        ..Options::default()
    };
    match process(
        &raster,
        ExtractMode::ColorRegions,
        &bad,
        &AdvancedOptions::default(),
    ) {
        Err(PlotError::OptionRange { name, .. }) => assert_eq!(name, "num_colors"),
        other => panic!("expected OptionRange, got {:?}", other.map(|r| r.paths.len())),
    }
}

#[test]
fn optimization_never_lengthens_travel() {
    let raster = block_raster(64);
    let options = Options {
        num_colors: 4,
        hatch_spacing: 4.0,
        ..Options::default()
    };
    let plain = process(
        &raster,
        ExtractMode::Hatching,
        &options,
        &AdvancedOptions::default(),
    )
    .unwrap();
    let optimized = process(
        &raster,
        ExtractMode::Hatching,
        &options,
        &AdvancedOptions {
            path_optimization: true,
            ..AdvancedOptions::default()
        },
    )
    .unwrap();

    assert!(optimized.total_travel <= plain.total_travel + 1e-9);
    assert!(optimized.improvement >= 0.0);
}

#[test]
fn variable_weight_multiplies_strokes() {
    let raster = block_raster(48);
    let options = Options {
        num_colors: 2,
        ..Options::default()
    };
    let plain = process(
        &raster,
        ExtractMode::ColorRegions,
        &options,
        &AdvancedOptions::default(),
    )
    .unwrap();
    let weighted = process(
        &raster,
        ExtractMode::ColorRegions,
        &options,
        &AdvancedOptions {
            variable_weight: true,
            weight_style: WeightStyle::Parallel,
            ..AdvancedOptions::default()
        },
    )
    .unwrap();

    // Region outlines sit on a hard edge: contrast pushes the weight
    // above neutral, so each outline expands into several strokes.
    assert!(weighted.paths.len() > plain.paths.len());
}

#[test]
fn curve_pipeline_emits_connected_beziers() {
    let raster = block_raster(48);
    let segments = process_with_curves(
        &raster,
        ExtractMode::ColorRegions,
        &Options {
            num_colors: 2,
            ..Options::default()
        },
        &AdvancedOptions {
            curve_fitting: true,
            ..AdvancedOptions::default()
        },
    )
    .unwrap();

    assert!(!segments.is_empty());
    for segment in &segments {
        // Property: evaluation hits the endpoints exactly.
        assert_eq!(segment.evaluate(0.0), segment.start());
        assert_eq!(segment.evaluate(1.0), segment.end());
    }
}

#[test]
fn deterministic_for_a_fixed_seed() {
    let raster = block_raster(48);
    let options = Options {
        num_colors: 3,
        ..Options::default()
    };
    let advanced = AdvancedOptions {
        hatching_style: HatchingStyle::Stippling,
        seed: 99,
        ..AdvancedOptions::default()
    };
    let a = process(&raster, ExtractMode::Hatching, &options, &advanced).unwrap();
    let b = process(&raster, ExtractMode::Hatching, &options, &advanced).unwrap();
    assert_eq!(a.paths, b.paths);
}
