//! SVG export: the CLI's stand-in for a machine consumer.

use std::path::Path as FilePath;

use svg::node::element::path::Data;
use svg::node::element::Path;
use svg::Document;

use crate::error::PlotError;
use crate::fit::CurveSegment;
use crate::geom::Polyline;

/// One `<path>` element per polyline, stroke only.
pub fn paths_document(paths: &[Polyline], width: u32, height: u32) -> Document {
    let mut document = Document::new().set("viewBox", (0, 0, width, height));
    for path in paths {
        if path.len() < 2 {
            continue;
        }
        let mut data = Data::new().move_to((path[0].x, path[0].y));
        for p in &path[1..] {
            data = data.line_to((p.x, p.y));
        }
        document = document.add(stroke_path(data));
    }
    document
}

/// All curve segments in one `<path>`, with pen-up moves between
/// disconnected segments.
pub fn curves_document(segments: &[CurveSegment], width: u32, height: u32) -> Document {
    let mut data = Data::new();
    let mut pen: Option<kurbo::Point> = None;

    for segment in segments {
        let start = segment.start();
        if pen != Some(start) {
            data = data.move_to((start.x, start.y));
        }
        match *segment {
            CurveSegment::Bezier {
                control1,
                control2,
                end,
                ..
            } => {
                data = data.cubic_curve_to((
                    control1.x, control1.y, control2.x, control2.y, end.x, end.y,
                ));
            }
            CurveSegment::Arc {
                start,
                end,
                center,
                radius,
                clockwise,
            } => {
                let (large_arc, sweep) = arc_flags(start, end, center, clockwise);
                data = data.elliptical_arc_to((
                    radius, radius, 0.0, large_arc, sweep, end.x, end.y,
                ));
            }
        }
        pen = Some(segment.end());
    }

    Document::new()
        .set("viewBox", (0, 0, width, height))
        .add(stroke_path(data))
}

pub fn write_paths(
    file: &FilePath,
    paths: &[Polyline],
    width: u32,
    height: u32,
) -> Result<(), PlotError> {
    svg::save(file, &paths_document(paths, width, height))?;
    Ok(())
}

pub fn write_curves(
    file: &FilePath,
    segments: &[CurveSegment],
    width: u32,
    height: u32,
) -> Result<(), PlotError> {
    svg::save(file, &curves_document(segments, width, height))?;
    Ok(())
}

fn stroke_path(data: Data) -> Path {
    Path::new()
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", "1.0")
        .set("d", data)
}

/// Convert a center arc to SVG's endpoint flags.
///
/// In SVG's y-down user space, sweep=1 draws in the increasing-angle
/// direction, which matches the counter-clockwise orientation used by
/// the arc converter.
fn arc_flags(
    start: kurbo::Point,
    end: kurbo::Point,
    center: kurbo::Point,
    clockwise: bool,
) -> (f64, f64) {
    let a0 = (start.y - center.y).atan2(start.x - center.x);
    let a1 = (end.y - center.y).atan2(end.x - center.x);
    let mut sweep = a1 - a0;
    if clockwise && sweep > 0.0 {
        sweep -= std::f64::consts::TAU;
    } else if !clockwise && sweep < 0.0 {
        sweep += std::f64::consts::TAU;
    }
    let large_arc = if sweep.abs() > std::f64::consts::PI { 1.0 } else { 0.0 };
    let sweep_flag = if clockwise { 0.0 } else { 1.0 };
    (large_arc, sweep_flag)
}
