//! Media resource handles with explicit release
//!
//! A `MediaHandle` is the opaque locator for one generated audio payload.
//! The bytes behind it are a finite per-process resource: whoever owns the
//! handle must call `release` when the payload is evicted or the session
//! ends. Release is observable through `is_released`, so tests can verify
//! the resource lifecycle rather than trusting drop order.

use crate::error::{AudioError, AudioResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static HANDLE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique handle ID
fn next_handle_id() -> u64 {
    HANDLE_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Container format of a media payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    /// WAV container (engines that yield capturable audio)
    Wav,
    /// JSON stand-in payload (engines that speak through a device they own)
    Json,
}

impl MediaFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Wav => "wav",
            MediaFormat::Json => "json",
        }
    }
}

/// Opaque, explicitly-released reference to a playable media payload.
///
/// Clones share the same underlying slot: `release` on any clone frees the
/// bytes for all of them. Readers holding a byte `Arc` from `bytes()` finish
/// their read; no new reads are served after release.
#[derive(Debug, Clone)]
pub struct MediaHandle {
    id: u64,
    format: MediaFormat,
    bytes: Arc<Mutex<Option<Arc<Vec<u8>>>>>,
}

impl MediaHandle {
    pub fn new(format: MediaFormat, bytes: Vec<u8>) -> Self {
        Self {
            id: next_handle_id(),
            format,
            bytes: Arc::new(Mutex::new(Some(Arc::new(bytes)))),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn format(&self) -> MediaFormat {
        self.format
    }

    /// Current payload, or `None` once released
    pub fn bytes(&self) -> Option<Arc<Vec<u8>>> {
        self.bytes.lock().clone()
    }

    /// Payload size in bytes; 0 once released
    pub fn len(&self) -> usize {
        self.bytes.lock().as_ref().map_or(0, |b| b.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_released(&self) -> bool {
        self.bytes.lock().is_none()
    }

    /// Free the underlying payload, returning the number of bytes released.
    pub fn release(&self) -> AudioResult<usize> {
        match self.bytes.lock().take() {
            Some(b) => Ok(b.len()),
            None => Err(AudioError::AlreadyReleased(self.id)),
        }
    }
}
