//! Audio capture adapter. Recording itself happens in the UI; this side only
//! receives the finished buffer.

use tracing::info;
use transparent_core::capture::{CaptureError, CapturePayload, SourceHint};
use transparent_core::media;

use super::artifact_store::ArtifactStore;

pub struct AudioAdapter {
    store: ArtifactStore,
}

impl AudioAdapter {
    pub fn new(store: ArtifactStore) -> Self {
        Self { store }
    }

    /// Wraps a finished recording as an `audio/webm` payload and persists a copy.
    pub async fn capture(&self, recording: Vec<u8>) -> Result<CapturePayload, CaptureError> {
        if recording.is_empty() {
            return Err(CaptureError::Source("empty audio recording".to_string()));
        }

        self.store.persist(&recording).await;
        info!(size = recording.len(), "Audio captured");

        Ok(CapturePayload::new(
            recording,
            media::WEBM_AUDIO,
            SourceHint::Microphone,
        ))
    }
}
