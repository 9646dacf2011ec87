//! Media engine abstraction
//!
//! The session layer never links a concrete media engine. It drives the
//! trait family in this module instead, and a backend crate (libVLC,
//! GStreamer, a test double) supplies the implementations:
//!
//! - [`MediaBackend`] creates engine instances from an [`EngineConfig`]
//! - [`MediaEngine`] creates players and opens sources
//! - [`MediaPlayer`] is the transport: play, stop, pause, volume, position
//! - [`MediaSource`] is one opened location: URL, statistics, output options
//!
//! All trait objects are `Send + Sync` and shared as `Arc<dyn ...>` so the
//! session can release and recreate a player while the engine instance
//! stays alive. Query methods are fallible on purpose: a wedged engine must
//! be able to surface faults through the health monitor instead of
//! returning stale values.
//!
//! [`mock`] ships an in-memory backend with scriptable state and failures.
//! It backs the crate's tests and works for headless hosts that only need
//! the control-plane semantics.

pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::EngineConfig;

/// Errors reported by engine backends
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Engine instance creation failed
    #[error("Engine instance creation failed: {reason}")]
    CreateFailed {
        /// Backend-reported reason
        reason: String,
    },

    /// The player has no bound source
    #[error("No source is bound to the player")]
    NoSource,

    /// The source exposes no statistics
    #[error("Source statistics are unavailable")]
    StatsUnavailable,

    /// The location string was rejected
    #[error("Invalid media location: {url}")]
    InvalidLocation {
        /// Rejected location
        url: String,
    },

    /// The engine refused a transport request
    #[error("Playback request rejected: {reason}")]
    PlaybackRejected {
        /// Backend-reported reason
        reason: String,
    },

    /// Any other backend fault
    #[error("Engine backend fault: {message}")]
    Backend {
        /// Backend-reported message
        message: String,
    },
}

/// Result type for engine backend calls
pub type EngineResult<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Create a generic backend fault
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Playback state as reported by the engine itself.
///
/// The session maps this onto its own coarser
/// [`PlaybackState`](crate::PlaybackState); states with no session-level
/// meaning (`Opening`, `Ended`) map to stopped there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// The engine is opening a location
    Opening,
    /// The engine is filling its input cache
    Buffering,
    /// Media is playing
    Playing,
    /// Playback is paused
    Paused,
    /// No media is playing
    Stopped,
    /// The media reached its end
    Ended,
    /// The engine entered an unrecoverable error state
    Error,
}

/// Opaque native rendering surface handle owned by the host.
///
/// On Windows this carries an HWND, on X11 a window id, on macOS an NSView
/// pointer. The session never interprets the value; it only stores it and
/// reattaches it when the player is recreated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    /// Wrap a raw native handle value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw native handle value
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// Transport statistics for the currently bound source.
///
/// Field meanings follow the counters live engines expose: input and demux
/// bitrates in kilobits per second, the lost audio buffer count, and the
/// displayed and lost picture counts. `Default` is the all-zero snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Input bitrate in kbit/s
    pub input_bitrate_kbps: f32,
    /// Demux bitrate in kbit/s
    pub demux_bitrate_kbps: f32,
    /// Audio buffers lost by the decoder
    pub lost_buffers: i64,
    /// Pictures displayed
    pub displayed_pictures: i64,
    /// Pictures lost before display
    pub lost_pictures: i64,
}

/// Factory for engine instances.
///
/// One backend serves many sessions; each session creates its own engine
/// instance so tearing one session down never disturbs another.
#[async_trait]
pub trait MediaBackend: Send + Sync + std::fmt::Debug {
    /// Backend name for logs ("vlc", "mock", ...)
    fn name(&self) -> &str;

    /// Create an engine instance configured with `config`'s rendered
    /// argument list.
    async fn create_engine(&self, config: &EngineConfig) -> EngineResult<Arc<dyn MediaEngine>>;
}

/// One live engine instance.
///
/// Outlives the players it creates: the recovery path drops a wedged player
/// and asks the same engine for a fresh one.
#[async_trait]
pub trait MediaEngine: Send + Sync + std::fmt::Debug {
    /// Create a player bound to this engine instance
    async fn create_player(&self) -> EngineResult<Arc<dyn MediaPlayer>>;

    /// Open a media location, producing a source that can be bound to a
    /// player created by this engine.
    async fn open_source(&self, url: &str) -> EngineResult<Arc<dyn MediaSource>>;
}

/// Transport control over one player instance.
#[async_trait]
pub trait MediaPlayer: Send + Sync + std::fmt::Debug {
    /// Attach the host's rendering surface
    fn attach_surface(&self, surface: SurfaceHandle) -> EngineResult<()>;

    /// Bind a source to the player, replacing any previous binding
    async fn set_source(&self, source: Arc<dyn MediaSource>) -> EngineResult<()>;

    /// Start or restart playback of the bound source
    async fn play(&self) -> EngineResult<()>;

    /// Stop playback
    async fn stop(&self) -> EngineResult<()>;

    /// Pause playback
    async fn pause(&self) -> EngineResult<()>;

    /// Whether the engine reports active playback
    fn is_playing(&self) -> EngineResult<bool>;

    /// Engine-reported playback state
    fn state(&self) -> EngineResult<EngineState>;

    /// Current playback position in milliseconds
    fn position_ms(&self) -> EngineResult<i64>;

    /// Current audio volume, 0 to 100
    fn volume(&self) -> EngineResult<i32>;

    /// Set the audio volume; values are pre-clamped by the session
    fn set_volume(&self, volume: i32) -> EngineResult<()>;
}

/// One opened media location.
pub trait MediaSource: Send + Sync + std::fmt::Debug {
    /// The location this source was opened from
    fn url(&self) -> &str;

    /// Read the source's transport statistics
    fn stats(&self) -> EngineResult<StatsSnapshot>;

    /// Attach an output-configuration option string.
    ///
    /// Engines apply source options on the next playback of the source,
    /// not retroactively.
    fn add_option(&self, option: &str) -> EngineResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_snapshot_serde_round_trip() {
        let snapshot = StatsSnapshot {
            input_bitrate_kbps: 5250.5,
            demux_bitrate_kbps: 5100.0,
            lost_buffers: 3,
            displayed_pictures: 1500,
            lost_pictures: 12,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: StatsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_stats_snapshot_default_is_all_zero() {
        let snapshot = StatsSnapshot::default();
        assert_eq!(snapshot.input_bitrate_kbps, 0.0);
        assert_eq!(snapshot.lost_buffers, 0);
        assert_eq!(snapshot.displayed_pictures, 0);
    }
}
