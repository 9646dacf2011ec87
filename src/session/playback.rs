//! Transport control
//!
//! The playback half of [`PlayerSession`]: loading sources, stop, pause,
//! resume and volume, plus the observation getters the UI polls.
//!
//! State machine: `Stopped -> Loading -> Playing <-> Paused`, any state
//! reaches `Error` through a failed load and `Stopped` through
//! [`stop`](PlayerSession::stop). [`state`](PlayerSession::state) reports
//! what the engine says right now: state values with no session-level
//! meaning map to [`PlaybackState::Stopped`], a query fault maps to
//! [`PlaybackState::Error`]. A wedged engine must never read as "still
//! fine".

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

use super::{PlayerSession, SessionInner};
use crate::engine::{EngineError, EngineState};
use crate::error::{PlayerError, PlayerResult};
use crate::events::PlayerEvent;

/// Longest wait for the engine to settle after the stop that precedes a
/// source swap. Engines that take longer are swapped anyway.
const STOP_SETTLE_TIMEOUT: Duration = Duration::from_millis(100);

/// Poll interval while waiting for the engine to settle
const STOP_SETTLE_POLL: Duration = Duration::from_millis(10);

/// Session-level playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No media loaded or playback stopped
    Stopped,
    /// A source is being swapped in
    Loading,
    /// Media is playing
    Playing,
    /// Playback is paused
    Paused,
    /// The engine is filling its input cache
    Buffering,
    /// The last load failed
    Error,
}

impl PlaybackState {
    /// Lowercase state name as exposed to UI bridges
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Buffering => "buffering",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PlayerSession {
    /// Load a source URL and start playing it.
    ///
    /// If something is already playing, the current playback is stopped
    /// first and the engine is given up to 100 ms to wind down before the
    /// source is swapped; the wait happens with the session lock released
    /// so observation getters stay responsive.
    ///
    /// On success the URL is recorded, the freeze monitor restarts and the
    /// state machine lands in [`PlaybackState::Playing`]. On failure the
    /// error flag sticks, the state machine lands in
    /// [`PlaybackState::Error`] and the previous URL is no longer
    /// considered loaded.
    pub async fn load(&self, url: &str) -> PlayerResult<()> {
        if Url::parse(url).is_err() {
            return Err(PlayerError::source_load(url, "not a valid URL"));
        }

        // Phase 1: stop current playback under the lock
        let settling = {
            let mut inner = self.inner.lock().await;
            if !inner.initialized {
                return Err(PlayerError::NotInitialized);
            }
            let player = inner.player.clone().ok_or(PlayerError::NotInitialized)?;
            self.transition(&mut inner, PlaybackState::Loading);
            if player.is_playing().unwrap_or(false) {
                debug!(session_id = %self.id, "stopping current playback before source swap");
                if let Err(e) = player.stop().await {
                    warn!(session_id = %self.id, error = %e, "stop before source swap failed");
                }
                Some(player)
            } else {
                None
            }
        };

        // Phase 2: let the engine wind down, lock released
        if let Some(player) = settling {
            let deadline = Instant::now() + STOP_SETTLE_TIMEOUT;
            loop {
                match player.state() {
                    Ok(EngineState::Stopped) | Ok(EngineState::Ended) | Err(_) => break,
                    Ok(_) if Instant::now() >= deadline => {
                        debug!(session_id = %self.id, "engine still winding down; swapping anyway");
                        break;
                    }
                    Ok(_) => sleep(STOP_SETTLE_POLL).await,
                }
            }
        }

        // Phase 3: swap the source in
        let mut inner = self.inner.lock().await;
        if !inner.initialized {
            // Torn down while the lock was released
            return Err(PlayerError::NotInitialized);
        }
        let player = inner.player.clone().ok_or(PlayerError::NotInitialized)?;
        let engine = inner.engine.clone().ok_or(PlayerError::NotInitialized)?;

        let source = match engine.open_source(url).await {
            Ok(source) => source,
            Err(e) => return Err(self.fail_load(&mut inner, url, e)),
        };
        if let Err(e) = player.set_source(source.clone()).await {
            return Err(self.fail_load(&mut inner, url, e));
        }
        if let Err(e) = player.play().await {
            return Err(self.fail_load(&mut inner, url, e));
        }

        inner.source = Some(source);
        inner.current_url = Some(url.to_string());
        inner.in_error = false;
        inner.health.restart();
        self.transition(&mut inner, PlaybackState::Playing);
        drop(inner);

        self.emit(PlayerEvent::SourceLoaded {
            url: url.to_string(),
        });
        info!(session_id = %self.id, url, "source loaded and playing");
        Ok(())
    }

    fn fail_load(&self, inner: &mut SessionInner, url: &str, cause: EngineError) -> PlayerError {
        error!(session_id = %self.id, url, error = %cause, "source load failed");
        inner.current_url = None;
        inner.in_error = true;
        self.transition(inner, PlaybackState::Error);
        PlayerError::source_load(url, cause.to_string())
    }

    /// Stop playback.
    ///
    /// Disables the freeze monitor and clears the recorded URL and error
    /// flag. The bound source stays attached to the player until the next
    /// load, like engines leave media bound after a stop. An engine fault
    /// propagates and leaves the session state untouched.
    pub async fn stop(&self) -> PlayerResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.initialized {
            return Err(PlayerError::NotInitialized);
        }
        let player = inner.player.clone().ok_or(PlayerError::NotInitialized)?;
        player.stop().await?;

        inner.health.disable();
        inner.current_url = None;
        inner.in_error = false;
        self.transition(&mut inner, PlaybackState::Stopped);

        info!(session_id = %self.id, "playback stopped");
        Ok(())
    }

    /// Pause playback
    pub async fn pause(&self) -> PlayerResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.initialized {
            return Err(PlayerError::NotInitialized);
        }
        let player = inner.player.clone().ok_or(PlayerError::NotInitialized)?;
        player.pause().await?;
        if inner.state == PlaybackState::Playing {
            self.transition(&mut inner, PlaybackState::Paused);
        }
        debug!(session_id = %self.id, "playback paused");
        Ok(())
    }

    /// Resume paused playback; a no-op when the engine already plays
    pub async fn resume(&self) -> PlayerResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.initialized {
            return Err(PlayerError::NotInitialized);
        }
        let player = inner.player.clone().ok_or(PlayerError::NotInitialized)?;
        if player.is_playing().unwrap_or(false) {
            debug!(session_id = %self.id, "resume requested while already playing");
            return Ok(());
        }
        player.play().await?;
        self.transition(&mut inner, PlaybackState::Playing);
        debug!(session_id = %self.id, "playback resumed");
        Ok(())
    }

    /// Set the audio volume; values are clamped to 0..=100
    pub async fn set_volume(&self, volume: i32) -> PlayerResult<()> {
        let inner = self.inner.lock().await;
        if !inner.initialized {
            return Err(PlayerError::NotInitialized);
        }
        let player = inner.player.clone().ok_or(PlayerError::NotInitialized)?;
        let clamped = volume.clamp(0, 100);
        if clamped != volume {
            debug!(session_id = %self.id, requested = volume, clamped, "volume clamped");
        }
        player.set_volume(clamped)?;
        Ok(())
    }

    /// Current audio volume as reported by the engine
    pub async fn volume(&self) -> PlayerResult<i32> {
        let inner = self.inner.lock().await;
        if !inner.initialized {
            return Err(PlayerError::NotInitialized);
        }
        let player = inner.player.clone().ok_or(PlayerError::NotInitialized)?;
        Ok(player.volume()?)
    }

    /// Playback state as the engine reports it right now.
    ///
    /// Engine states with no session-level meaning and a missing player
    /// read as [`PlaybackState::Stopped`]. An engine that cannot answer
    /// the query reads as [`PlaybackState::Error`], agreeing with the
    /// freeze monitor's fail-safe reading of the same fault.
    pub async fn state(&self) -> PlaybackState {
        let inner = self.inner.lock().await;
        let Some(player) = inner.player.clone() else {
            return PlaybackState::Stopped;
        };
        match player.state() {
            Ok(EngineState::Playing) => PlaybackState::Playing,
            Ok(EngineState::Paused) => PlaybackState::Paused,
            Ok(EngineState::Buffering) => PlaybackState::Buffering,
            Ok(EngineState::Error) => PlaybackState::Error,
            Ok(_) => PlaybackState::Stopped,
            Err(_) => PlaybackState::Error,
        }
    }

    /// Whether the engine reports active playback
    pub async fn is_playing(&self) -> bool {
        let inner = self.inner.lock().await;
        match inner.player.as_ref() {
            Some(player) => player.is_playing().unwrap_or(false),
            None => false,
        }
    }

    /// URL of the currently loaded source, `None` when nothing is loaded
    pub async fn current_url(&self) -> Option<String> {
        self.inner.lock().await.current_url.clone()
    }

    /// Whether the last load left the session in the error state
    pub async fn is_in_error(&self) -> bool {
        self.inner.lock().await.in_error
    }
}
