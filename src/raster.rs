//! Input raster and binary mask types.

use std::path::Path;

use image::{GrayImage, ImageReader, RgbaImage};

use crate::error::PlotError;

/// RGBA8 input raster, row-major, immutable during a pipeline run.
/// Alpha is carried but ignored by every stage.
#[derive(Debug, Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Wrap an in-memory RGBA8 buffer, validating the raster contract
    /// (width and height at least 1, buffer length 4 * width * height).
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, PlotError> {
        if width == 0 || height == 0 {
            return Err(PlotError::EmptyRaster { width, height });
        }
        let expected = 4 * width as usize * height as usize;
        if pixels.len() != expected {
            return Err(PlotError::BufferSize {
                expected,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_image(image: RgbaImage) -> Result<Self, PlotError> {
        let (width, height) = image.dimensions();
        Self::from_rgba(width, height, image.into_raw())
    }

    /// Decode an image file and convert it to RGBA8.
    pub fn from_path(path: &Path) -> Result<Self, PlotError> {
        let image = ImageReader::open(path)
            .map_err(|e| PlotError::ImageLoad(e.to_string()))?
            .decode()
            .map_err(|e| PlotError::ImageLoad(e.to_string()))?
            .into_rgba8();
        Self::from_image(image)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGB channels at (x, y). Alpha is dropped, no premultiplication.
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let i = 4 * (y as usize * self.width as usize + x as usize);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// Grayscale value `(R + G + B) / 3`.
    pub fn gray(&self, x: u32, y: u32) -> u8 {
        let [r, g, b] = self.rgb(x, y);
        ((r as u16 + g as u16 + b as u16) / 3) as u8
    }

    /// Full grayscale copy, used by the threshold fallback.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([self.gray(x, y)])
        })
    }

    /// Invert RGB in place (for white-on-black sources).
    pub fn invert(&mut self) {
        for (i, byte) in self.pixels.iter_mut().enumerate() {
            if i % 4 != 3 {
                *byte = 255 - *byte;
            }
        }
    }
}

/// Single-channel inside/outside image: non-zero pixels are "inside".
///
/// Extractors build one mask per cluster or tone level and drop it once
/// the paths for that unit have been emitted.
#[derive(Debug, Clone)]
pub struct Mask {
    image: GrayImage,
}

impl Mask {
    /// Build a mask from a per-pixel predicate.
    pub fn from_fn<F>(width: u32, height: u32, inside: F) -> Self
    where
        F: Fn(u32, u32) -> bool,
    {
        let image = GrayImage::from_fn(width, height, |x, y| {
            image::Luma([if inside(x, y) { 255 } else { 0 }])
        });
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether the integer pixel (x, y) is inside. Out of bounds is outside.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return false;
        }
        self.image.get_pixel(x as u32, y as u32).0[0] != 0
    }

    /// Whether the continuous point (x, y) lands on an inside pixel.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.get(x.round() as i64, y.round() as i64)
    }
}
