//! Decoded QR payloads and their bounding regions.

/// Axis-aligned bounding region of a decoded symbol, in the coordinate
/// space of the image it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Region width in pixels
    pub width: u32,
    /// Region height in pixels
    pub height: u32,
}

impl Region {
    /// Region covering an entire frame.
    pub fn full_frame(width: u32, height: u32) -> Self {
        Region {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Bounding box of four corner points, clipped to non-negative
    /// coordinates. Returns `None` when the clipped box has no extent,
    /// so callers can substitute a whole-frame region.
    pub fn from_corners(corners: &[(i32, i32); 4]) -> Option<Self> {
        let xs = corners.map(|(x, _)| x.max(0) as u32);
        let ys = corners.map(|(_, y)| y.max(0) as u32);
        let min_x = xs.iter().copied().min().unwrap_or(0);
        let max_x = xs.iter().copied().max().unwrap_or(0);
        let min_y = ys.iter().copied().min().unwrap_or(0);
        let max_y = ys.iter().copied().max().unwrap_or(0);
        let width = max_x - min_x;
        let height = max_y - min_y;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Region {
            x: min_x,
            y: min_y,
            width,
            height,
        })
    }
}

/// Decoded content of one located QR symbol.
#[derive(Debug, Clone)]
pub struct Payload {
    /// Raw text content of the symbol
    pub text: String,
    /// Where the symbol was found
    pub region: Region,
}
