//! Session event notifications
//!
//! Sessions publish [`PlayerEvent`]s over a tokio broadcast channel so UI
//! layers can track playback without polling. Subscribe with
//! [`PlayerSession::subscribe`](crate::PlayerSession::subscribe); slow
//! subscribers lag and drop, they never block the session.

use serde::{Deserialize, Serialize};

use crate::session::PlaybackState;

/// Broadcast buffer depth per session
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events emitted by a playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// The session's playback state changed
    StateChanged {
        /// State before the transition
        previous: PlaybackState,
        /// State after the transition
        current: PlaybackState,
    },
    /// A source was loaded and playback started
    SourceLoaded {
        /// Location that was loaded
        url: String,
    },
    /// The player instance was recreated on the surviving engine
    PlayerRecreated,
    /// Recording was configured on the current source
    RecordingStarted {
        /// Recording destination path
        path: String,
    },
    /// Recording bookkeeping was cleared
    RecordingStopped {
        /// Recording destination path
        path: String,
    },
}
