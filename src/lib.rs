//! fiscalqr - fiscal receipt QR code scanning library
//!
//! Extracts 44-digit access keys from QR codes in still images or
//! repeated camera frames. A cascade of preprocessing techniques
//! (thresholding, equalization, smoothing, rotations, rescales) is
//! tried until a payload decodes, then the key is isolated from the
//! payload text and recorded in a deduplicated CSV store.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// QR symbol location and decoding backends
pub mod decode;
/// Access key extraction from decoded QR text
pub mod extract;
/// Core data structures (Raster, Payload, Region)
pub mod models;
/// Original-first scan cascade over the preprocessing variants
pub mod pipeline;
/// Image preprocessing battery and variant generation
pub mod preprocess;
/// Per-stream scan state and the per-frame entry point
pub mod session;
/// Image acquisition collaborators
pub mod source;
/// Deduplicated access key persistence
pub mod store;

pub use decode::{QrDecode, RqrrDecoder, default_decoder};
pub use extract::{ACCESS_KEY_LEN, extract_key};
pub use models::{Payload, Raster, Region};
pub use pipeline::{ScanOutcome, locate_key_source};
pub use session::{FrameOutcome, ScanSession, process_frame};
pub use store::{KeyStore, StoreError};

/// Scanner bundling a decoding backend with the scan cascade.
pub struct Scanner {
    decoder: Box<dyn QrDecode>,
}

impl Scanner {
    /// Scanner over the default decoding backend.
    pub fn new() -> Self {
        Self {
            decoder: Box::new(RqrrDecoder),
        }
    }

    /// Scanner over a caller-provided decoding backend.
    pub fn with_decoder(decoder: Box<dyn QrDecode>) -> Self {
        Self { decoder }
    }

    /// Name of the active decoding backend.
    pub fn backend(&self) -> &'static str {
        self.decoder.name()
    }

    /// Run the full scan cascade over one image.
    pub fn scan(&self, image: &Raster) -> ScanOutcome {
        locate_key_source(self.decoder.as_ref(), image)
    }

    /// Process one frame end to end against a store and session.
    pub fn scan_frame(
        &self,
        store: &KeyStore,
        session: &mut ScanSession,
        frame: &Raster,
    ) -> Result<FrameOutcome, StoreError> {
        process_frame(self.decoder.as_ref(), store, session, frame)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}
