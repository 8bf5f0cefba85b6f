use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("failed to load image: {0}")]
    ImageLoad(String),

    #[error("raster is empty ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },

    #[error("pixel buffer holds {got} bytes, expected {expected} (4 * width * height)")]
    BufferSize { expected: usize, got: usize },

    #[error("option {name} = {value} outside valid range {min}..={max}")]
    OptionRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
