//! Error types for playback session operations
//!
//! Every fallible session operation returns [`PlayerResult`] so callers can
//! tell an unrecoverable misuse (calling `load` before `initialize`) apart
//! from an engine fault that a player recreation may clear.

use thiserror::Error;

use crate::engine::EngineError;

/// Errors surfaced by [`PlayerSession`](crate::PlayerSession) operations
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Operation requires an initialized session
    #[error("Player session is not initialized")]
    NotInitialized,

    /// The session already holds a live engine and player
    #[error("Player session is already initialized")]
    AlreadyInitialized,

    /// The engine instance could not be created
    #[error("Failed to create engine instance: {reason}")]
    EngineCreateFailed {
        /// Backend-reported reason
        reason: String,
    },

    /// The player instance could not be created
    #[error("Failed to create player instance: {reason}")]
    PlayerCreateFailed {
        /// Backend-reported reason
        reason: String,
    },

    /// Recovery was requested but no engine instance exists
    #[error("No engine instance available for recovery")]
    EngineMissing,

    /// A source could not be opened or started
    #[error("Failed to load source '{url}': {reason}")]
    SourceLoadFailed {
        /// Source location that failed to load
        url: String,
        /// Backend-reported reason
        reason: String,
    },

    /// A recording is already active on this session
    #[error("Recording is already active")]
    AlreadyRecording,

    /// No recording is active on this session
    #[error("No recording is active")]
    NotRecording,

    /// Fault reported by the engine backend outside the named taxonomy
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Result type for playback session operations
pub type PlayerResult<T> = std::result::Result<T, PlayerError>;

impl PlayerError {
    /// Create an engine creation error
    pub fn engine_create(reason: impl Into<String>) -> Self {
        Self::EngineCreateFailed {
            reason: reason.into(),
        }
    }

    /// Create a player creation error
    pub fn player_create(reason: impl Into<String>) -> Self {
        Self::PlayerCreateFailed {
            reason: reason.into(),
        }
    }

    /// Create a source load error
    pub fn source_load(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceLoadFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether a retry or a player recreation has a chance of clearing
    /// this error.
    ///
    /// Lifecycle misuse (`NotInitialized`, `AlreadyRecording`, ...) is never
    /// recoverable by retrying; engine-side faults usually are.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::EngineCreateFailed { .. } => true,
            Self::PlayerCreateFailed { .. } => true,
            Self::SourceLoadFailed { .. } => true,
            Self::Engine(_) => true,
            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::EngineMissing
            | Self::AlreadyRecording
            | Self::NotRecording => false,
        }
    }

    /// Coarse error category for logging and metrics bridges
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotInitialized | Self::AlreadyInitialized => "lifecycle",
            Self::EngineCreateFailed { .. }
            | Self::PlayerCreateFailed { .. }
            | Self::EngineMissing => "engine_lifecycle",
            Self::SourceLoadFailed { .. } => "source",
            Self::AlreadyRecording | Self::NotRecording => "recording",
            Self::Engine(_) => "engine",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = PlayerError::source_load("udp://239.0.0.1:1234", "connection refused");
        assert_eq!(
            err.to_string(),
            "Failed to load source 'udp://239.0.0.1:1234': connection refused"
        );
        assert_eq!(
            PlayerError::NotInitialized.to_string(),
            "Player session is not initialized"
        );
    }

    #[test]
    fn test_recoverability_classification() {
        assert!(PlayerError::player_create("backend gone").is_recoverable());
        assert!(PlayerError::source_load("rtp://1.2.3.4", "timeout").is_recoverable());
        assert!(!PlayerError::NotInitialized.is_recoverable());
        assert!(!PlayerError::EngineMissing.is_recoverable());
        assert!(!PlayerError::AlreadyRecording.is_recoverable());
    }

    #[test]
    fn test_engine_error_conversion() {
        let err: PlayerError = EngineError::NoSource.into();
        assert!(matches!(err, PlayerError::Engine(EngineError::NoSource)));
        assert_eq!(err.category(), "engine");
    }
}
