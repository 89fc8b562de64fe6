//! In-memory raster buffers and the transforms the variant battery
//! applies to them.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbImage};

/// Coefficients for luma conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Integer luma of one RGB pixel.
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8) as u8
}

/// Axis-aligned rotation applied to a preprocessing variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// No rotation
    R0,
    /// Quarter turn
    R90,
    /// Half turn
    R180,
    /// Three-quarter turn
    R270,
}

impl Rotation {
    /// Rotation angle in degrees, as used in technique labels.
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }
}

/// One in-memory raster image, either single-channel grayscale or
/// 3-channel color. Transforms return new buffers; a `Raster` is never
/// mutated after construction.
#[derive(Debug, Clone)]
pub enum Raster {
    /// 8-bit single-channel buffer
    Gray(GrayImage),
    /// 8-bit 3-channel buffer
    Rgb(RgbImage),
}

impl Raster {
    /// Build a raster from a decoded image file or frame, flattening
    /// any alpha channel to plain RGB.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Raster::Rgb(image.to_rgb8())
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        match self {
            Raster::Gray(img) => img.width(),
            Raster::Rgb(img) => img.width(),
        }
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        match self {
            Raster::Gray(img) => img.height(),
            Raster::Rgb(img) => img.height(),
        }
    }

    /// Channel count (1 or 3).
    pub fn channels(&self) -> u8 {
        match self {
            Raster::Gray(_) => 1,
            Raster::Rgb(_) => 3,
        }
    }

    /// Collapse to a single-channel luma buffer.
    pub fn to_gray(&self) -> GrayImage {
        match self {
            Raster::Gray(img) => img.clone(),
            Raster::Rgb(img) => {
                let mut gray = GrayImage::new(img.width(), img.height());
                for (dst, src) in gray.pixels_mut().zip(img.pixels()) {
                    dst[0] = luma(src[0], src[1], src[2]);
                }
                gray
            }
        }
    }

    /// Return a copy rotated by a multiple of 90 degrees.
    pub fn rotated(&self, rotation: Rotation) -> Raster {
        match rotation {
            Rotation::R0 => self.clone(),
            Rotation::R90 => match self {
                Raster::Gray(img) => Raster::Gray(imageops::rotate90(img)),
                Raster::Rgb(img) => Raster::Rgb(imageops::rotate90(img)),
            },
            Rotation::R180 => match self {
                Raster::Gray(img) => Raster::Gray(imageops::rotate180(img)),
                Raster::Rgb(img) => Raster::Rgb(imageops::rotate180(img)),
            },
            Rotation::R270 => match self {
                Raster::Gray(img) => Raster::Gray(imageops::rotate270(img)),
                Raster::Rgb(img) => Raster::Rgb(imageops::rotate270(img)),
            },
        }
    }

    /// Return a rescaled copy, or `None` when the target size is
    /// degenerate. Upscales use cubic interpolation, downscales an
    /// area-averaging filter.
    pub fn scaled(&self, factor: f32) -> Option<Raster> {
        let width = (self.width() as f32 * factor) as u32;
        let height = (self.height() as f32 * factor) as u32;
        if width == 0 || height == 0 {
            return None;
        }
        let filter = if factor > 1.0 {
            FilterType::CatmullRom
        } else {
            FilterType::Triangle
        };
        Some(match self {
            Raster::Gray(img) => Raster::Gray(imageops::resize(img, width, height, filter)),
            Raster::Rgb(img) => Raster::Rgb(imageops::resize(img, width, height, filter)),
        })
    }
}
