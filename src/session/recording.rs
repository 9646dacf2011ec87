//! Best-effort stream recording
//!
//! Recording works by attaching an output-duplication option to the bound
//! source: the stream keeps rendering to the display while a copy is
//! muxed to a transport-stream file. Two caveats come with that approach
//! and both are deliberate:
//!
//! - engines apply source options on the *next* playback of the source,
//!   so a recording configured mid-playback starts writing only after the
//!   source is reloaded;
//! - [`stop_recording`](PlayerSession::stop_recording) clears session
//!   bookkeeping only. The engine side of an output graph cannot be
//!   detached from a live source; it ends when playback of that source
//!   ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::PlayerSession;
use crate::engine::EngineError;
use crate::error::{PlayerError, PlayerResult};
use crate::events::PlayerEvent;

/// Bookkeeping for an active recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingInfo {
    /// Destination file path
    pub path: String,
    /// When the recording was configured
    pub started_at: DateTime<Utc>,
}

/// Output graph duplicating playback to the display and a TS file.
///
/// The path lands in the descriptor verbatim.
fn output_descriptor(path: &str) -> String {
    format!(
        "#duplicate{{dst=display,dst=std{{access=file,mux=ts,dst={}}}}}",
        path
    )
}

impl PlayerSession {
    /// Configure recording of the current source to a TS file.
    ///
    /// Requires an initialized session with a loaded source and no active
    /// recording. Best-effort: see the module docs for when the engine
    /// actually starts writing.
    pub async fn start_recording(&self, path: &str) -> PlayerResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.initialized {
            return Err(PlayerError::NotInitialized);
        }
        if inner.recording.is_some() {
            return Err(PlayerError::AlreadyRecording);
        }
        let Some(source) = inner.source.clone() else {
            return Err(PlayerError::Engine(EngineError::NoSource));
        };
        if path.is_empty() {
            return Err(PlayerError::Engine(EngineError::InvalidLocation {
                url: path.to_string(),
            }));
        }

        source.add_option(&output_descriptor(path))?;
        inner.recording = Some(RecordingInfo {
            path: path.to_string(),
            started_at: Utc::now(),
        });
        drop(inner);

        self.emit(PlayerEvent::RecordingStarted {
            path: path.to_string(),
        });
        info!(session_id = %self.id, path, "recording configured on current source");
        Ok(())
    }

    /// Clear recording bookkeeping.
    ///
    /// Fails with [`PlayerError::NotRecording`] when no recording is
    /// active. Does not signal the engine; see the module docs.
    pub async fn stop_recording(&self) -> PlayerResult<()> {
        let mut inner = self.inner.lock().await;
        let Some(rec) = inner.recording.take() else {
            return Err(PlayerError::NotRecording);
        };
        drop(inner);

        self.emit(PlayerEvent::RecordingStopped {
            path: rec.path.clone(),
        });
        info!(session_id = %self.id, path = %rec.path, "recording bookkeeping cleared");
        Ok(())
    }

    /// Whether a recording is currently configured
    pub async fn is_recording(&self) -> bool {
        self.inner.lock().await.recording.is_some()
    }

    /// Destination and start time of the active recording, if any
    pub async fn recording_info(&self) -> Option<RecordingInfo> {
        self.inner.lock().await.recording.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_descriptor_shape() {
        assert_eq!(
            output_descriptor("/tmp/capture.ts"),
            "#duplicate{dst=display,dst=std{access=file,mux=ts,dst=/tmp/capture.ts}}"
        );
    }

    #[test]
    fn test_output_descriptor_takes_path_verbatim() {
        let descriptor = output_descriptor("C:\\Users\\tv\\rec 01.ts");
        assert!(descriptor.contains("dst=C:\\Users\\tv\\rec 01.ts"));
    }
}
