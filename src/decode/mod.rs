//! QR symbol location and decoding backends.

use crate::models::{Payload, Raster, Region};

/// Locate-and-decode primitive over one raster image.
///
/// Absence of a symbol is a normal outcome (empty vector), never an
/// error; implementations must not panic on malformed input.
pub trait QrDecode {
    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Decode every readable QR symbol in the image. Each payload
    /// always carries a bounding region; when the backend cannot
    /// report one, the whole-image region is substituted.
    fn decode(&self, image: &Raster) -> Vec<Payload>;
}

/// Decoder backed by the pure-Rust `rqrr` reader.
#[derive(Debug, Default)]
pub struct RqrrDecoder;

impl QrDecode for RqrrDecoder {
    fn name(&self) -> &'static str {
        "rqrr"
    }

    fn decode(&self, image: &Raster) -> Vec<Payload> {
        let width = image.width() as usize;
        let height = image.height() as usize;
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let gray = image.to_gray();
        let data = gray.as_raw();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| data[y * width + x]);

        let mut payloads = Vec::new();
        for grid in prepared.detect_grids() {
            // A grid that fails to decode is treated as no symbol
            let Ok((_, text)) = grid.decode() else {
                continue;
            };
            let corners = [
                (grid.bounds[0].x, grid.bounds[0].y),
                (grid.bounds[1].x, grid.bounds[1].y),
                (grid.bounds[2].x, grid.bounds[2].y),
                (grid.bounds[3].x, grid.bounds[3].y),
            ];
            let region = Region::from_corners(&corners)
                .unwrap_or_else(|| Region::full_frame(image.width(), image.height()));
            payloads.push(Payload { text, region });
        }
        payloads
    }
}

/// Select the decoding backend compiled into this build, or `None`
/// when no backend is present so callers can surface the missing
/// capability instead of failing mid-scan.
pub fn default_decoder() -> Option<Box<dyn QrDecode>> {
    Some(Box::new(RqrrDecoder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_blank_image_decodes_to_nothing() {
        let image = Raster::Gray(GrayImage::from_pixel(32, 32, Luma([255])));
        let payloads = RqrrDecoder.decode(&image);
        assert!(payloads.is_empty());
    }

    #[test]
    fn test_noise_does_not_panic() {
        let image = Raster::Gray(GrayImage::from_fn(64, 64, |x, y| {
            Luma([((x * 31 + y * 17) % 256) as u8])
        }));
        let _ = RqrrDecoder.decode(&image);
    }

    #[test]
    fn test_default_decoder_is_available() {
        let decoder = default_decoder().expect("backend compiled in");
        assert_eq!(decoder.name(), "rqrr");
    }
}
