//! Original-first scan cascade over the preprocessing variants.
//!
//! An exhaustive, fixed-order linear search: the unmodified image is
//! tried first as the common case, then every variant in sequence
//! order until one decodes. There is no re-ranking and no deadline;
//! predictability wins over raw speed.

use tracing::{debug, trace};

use crate::decode::QrDecode;
use crate::models::{Payload, Raster};
use crate::preprocess::{VariantStep, generate_variants};

/// Technique label of the unmodified-input fast path.
pub const ORIGINAL_TECHNIQUE: &str = "Original";

/// Result of one full multi-technique scan of a single image.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// At least one QR payload was decoded.
    Detected {
        /// Every payload found in the winning image, in backend order
        payloads: Vec<Payload>,
        /// Label of the technique that produced the winning image
        technique: String,
        /// 1-based attempt index; the unmodified input is attempt 1
        attempt: usize,
    },
    /// Every variant was tried without finding a symbol.
    Exhausted {
        /// Final attempt index: produced variants plus two
        attempts: usize,
        /// Variants that could not be produced (degenerate resizes)
        skipped: usize,
    },
}

impl ScanOutcome {
    /// Whether a payload was decoded.
    pub fn is_detected(&self) -> bool {
        matches!(self, ScanOutcome::Detected { .. })
    }

    /// Human-readable technique label for status reporting.
    pub fn technique_label(&self) -> String {
        match self {
            ScanOutcome::Detected { technique, .. } => technique.clone(),
            ScanOutcome::Exhausted { attempts, .. } => {
                format!("no symbol after {attempts} attempts")
            }
        }
    }

    /// Attempt index this outcome was reached at.
    pub fn attempt(&self) -> usize {
        match self {
            ScanOutcome::Detected { attempt, .. } => *attempt,
            ScanOutcome::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Run the decoder over the unmodified image first, then over each
/// preprocessing variant in order, stopping at the first non-empty
/// decode. Per-variant failures never abort the scan: a skipped
/// variant is counted and the cascade moves on.
pub fn locate_key_source(decoder: &dyn QrDecode, image: &Raster) -> ScanOutcome {
    let payloads = decoder.decode(image);
    if !payloads.is_empty() {
        debug!(technique = ORIGINAL_TECHNIQUE, attempt = 1, "QR payload decoded");
        return ScanOutcome::Detected {
            payloads,
            technique: ORIGINAL_TECHNIQUE.to_string(),
            attempt: 1,
        };
    }

    let mut attempt = 1usize;
    let mut skipped = 0usize;
    for step in generate_variants(image) {
        let variant = match step {
            VariantStep::Produced(variant) => variant,
            VariantStep::Skipped { label } => {
                trace!(%label, "variant skipped");
                skipped += 1;
                continue;
            }
        };

        attempt += 1;
        trace!(technique = %variant.label, attempt, "decoding variant");
        let payloads = decoder.decode(&variant.image);
        if !payloads.is_empty() {
            debug!(technique = %variant.label, attempt, "QR payload decoded");
            return ScanOutcome::Detected {
                payloads,
                technique: variant.label,
                attempt,
            };
        }
    }

    let attempts = attempt + 1;
    debug!(attempts, skipped, "scan exhausted without a symbol");
    ScanOutcome::Exhausted { attempts, skipped }
}
