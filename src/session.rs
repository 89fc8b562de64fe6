//! Per-stream scan state and the per-frame entry point.
//!
//! A live stream is modeled as repeated calls to [`process_frame`]
//! with an externally owned [`ScanSession`]. Once a key has been found
//! (saved or duplicate) the session locks and later frames are skipped
//! at entry until the caller resets it. The pipeline itself stays
//! stateless; the session is the only cross-frame state.

use crate::decode::QrDecode;
use crate::extract::extract_key;
use crate::models::{Raster, Region};
use crate::pipeline::{ScanOutcome, locate_key_source};
use crate::store::{KeyStore, StoreError};

/// Scan state scoped to one interactive stream, owned by the caller.
#[derive(Debug, Default, Clone)]
pub struct ScanSession {
    locked: bool,
    last_key: Option<String>,
}

impl ScanSession {
    /// Fresh, unlocked session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether decoding is suppressed until [`reset`](Self::reset).
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The most recently saved key, if any.
    pub fn last_key(&self) -> Option<&str> {
        self.last_key.as_deref()
    }

    /// Re-arm a locked session so the next frame is processed again.
    pub fn reset(&mut self) {
        self.locked = false;
    }
}

/// Outcome of processing one frame, for the caller to render.
#[derive(Debug, Clone)]
pub enum FrameOutcome {
    /// The session is locked; nothing was attempted.
    Locked,
    /// The scan cascade found no symbol.
    NoSymbol {
        /// Final attempt index of the exhausted cascade
        attempts: usize,
    },
    /// A payload was decoded but carries no access key.
    KeyMissing {
        /// Raw payload text
        text: String,
        /// Where the symbol was found
        region: Region,
        /// Winning technique label
        technique: String,
        /// Winning attempt index
        attempt: usize,
    },
    /// A new key was extracted and persisted. Locks the session.
    Saved {
        /// The recorded access key
        key: String,
        /// Where the symbol was found
        region: Region,
        /// Winning technique label
        technique: String,
        /// Winning attempt index
        attempt: usize,
    },
    /// The extracted key was already on record. Locks the session.
    Duplicate {
        /// The already-recorded access key
        key: String,
        /// Where the symbol was found
        region: Region,
        /// Winning technique label
        technique: String,
        /// Winning attempt index
        attempt: usize,
    },
}

/// Process one frame end to end: scan cascade, key extraction, dedup
/// persistence. The lock flag is checked once at entry; store failures
/// propagate unchanged.
pub fn process_frame(
    decoder: &dyn QrDecode,
    store: &KeyStore,
    session: &mut ScanSession,
    frame: &Raster,
) -> Result<FrameOutcome, StoreError> {
    if session.locked {
        return Ok(FrameOutcome::Locked);
    }

    let (payloads, technique, attempt) = match locate_key_source(decoder, frame) {
        ScanOutcome::Exhausted { attempts, .. } => {
            return Ok(FrameOutcome::NoSymbol { attempts });
        }
        ScanOutcome::Detected {
            payloads,
            technique,
            attempt,
        } => (payloads, technique, attempt),
    };

    // Only the first payload feeds the key path
    let Some(payload) = payloads.into_iter().next() else {
        return Ok(FrameOutcome::NoSymbol { attempts: attempt });
    };

    let Some(key) = extract_key(&payload.text) else {
        return Ok(FrameOutcome::KeyMissing {
            text: payload.text,
            region: payload.region,
            technique,
            attempt,
        });
    };

    let saved = store.save_if_new(&key)?;
    session.locked = true;
    if saved {
        session.last_key = Some(key.clone());
        Ok(FrameOutcome::Saved {
            key,
            region: payload.region,
            technique,
            attempt,
        })
    } else {
        Ok(FrameOutcome::Duplicate {
            key,
            region: payload.region,
            technique,
            attempt,
        })
    }
}
