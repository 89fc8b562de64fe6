//! Image acquisition collaborators.
//!
//! The core consumes one [`Raster`] per request or frame and does not
//! care where it came from. Sources that need a runtime the build does
//! not carry (a camera backend, a streaming stack) report
//! [`CaptureError::Unavailable`] so callers can fall back to the
//! still-image path instead of terminating.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Raster;

/// Errors from frame acquisition.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The acquisition environment is missing in this runtime.
    #[error("acquisition environment unavailable: {0}")]
    Unavailable(String),
    /// A frame file could not be read or decoded as an image.
    #[error("failed to load frame: {0}")]
    Image(#[from] image::ImageError),
}

/// Yields one raster per call until the source is exhausted.
pub trait FrameSource {
    /// The next frame, or `Ok(None)` when the source has run dry.
    fn next_frame(&mut self) -> Result<Option<Raster>, CaptureError>;
}

/// Frame source over an ordered list of still-image files: the upload
/// path, and the fallback when no live acquisition is available.
#[derive(Debug)]
pub struct StillImageSource {
    paths: VecDeque<PathBuf>,
}

impl StillImageSource {
    /// Source that yields the given files in order.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl FrameSource for StillImageSource {
    fn next_frame(&mut self) -> Result<Option<Raster>, CaptureError> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };
        Ok(Some(load_raster(&path)?))
    }
}

/// Load one still image as a raster, flattening any alpha channel.
/// No validation beyond what image decoding itself enforces.
pub fn load_raster(path: &Path) -> Result<Raster, CaptureError> {
    Ok(Raster::from_dynamic(image::open(path)?))
}

/// Open the live camera source for this build.
///
/// No camera backend is compiled into fiscalqr; this always reports
/// the capability as unavailable so interactive callers can degrade to
/// still images.
pub fn open_camera() -> Result<Box<dyn FrameSource>, CaptureError> {
    Err(CaptureError::Unavailable(
        "no camera backend in this build".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_png(size: u32) -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX epoch")
            .as_nanos();
        let sequence = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
        path.push(format!("fiscalqr_frame_{nanos}_{sequence}.png"));
        GrayImage::from_pixel(size, size, Luma([200]))
            .save(&path)
            .expect("failed to write temp frame");
        path
    }

    #[test]
    fn test_still_source_yields_in_order_then_dries_up() {
        let first = temp_png(8);
        let second = temp_png(12);
        let mut source = StillImageSource::new([first.clone(), second.clone()]);

        let frame = source.next_frame().unwrap().expect("first frame");
        assert_eq!(frame.width(), 8);
        let frame = source.next_frame().unwrap().expect("second frame");
        assert_eq!(frame.width(), 12);
        assert!(source.next_frame().unwrap().is_none());

        let _ = std::fs::remove_file(first);
        let _ = std::fs::remove_file(second);
    }

    #[test]
    fn test_unreadable_frame_is_an_error() {
        let mut source = StillImageSource::new(["/nonexistent/fiscalqr-frame.png"]);
        assert!(source.next_frame().is_err());
    }

    #[test]
    fn test_camera_capability_is_reported_unavailable() {
        match open_camera() {
            Err(CaptureError::Unavailable(_)) => {}
            other => panic!("expected Unavailable, got {:?}", other.map(|_| ())),
        }
    }
}
