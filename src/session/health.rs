//! Freeze detection
//!
//! Dead IPTV multicasts rarely announce themselves: the engine keeps
//! reporting `Playing` while the picture stands still. What does stop is
//! the playback position. The freeze monitor tracks the last position
//! advance and calls a stream frozen once it has stalled past a threshold
//! while the engine still claims to be playing.
//!
//! The monitor runs no timer of its own. The host samples on whatever
//! cadence fits (once a second is plenty for the 10 second default
//! threshold): call [`observe`](PlayerSession::observe) on each tick and
//! [`is_frozen`](PlayerSession::is_frozen) whenever a verdict is needed,
//! typically right before deciding to
//! [`recreate_player`](PlayerSession::recreate_player).

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::PlayerSession;
use crate::engine::EngineState;

/// Stall duration after which a playing stream counts as frozen
pub const DEFAULT_FREEZE_THRESHOLD: Duration = Duration::from_secs(10);

/// Freeze monitor bookkeeping, embedded in the session state
#[derive(Debug)]
pub(crate) struct HealthState {
    enabled: bool,
    last_position_ms: i64,
    last_advance: Instant,
}

impl HealthState {
    pub(crate) fn new() -> Self {
        Self {
            enabled: false,
            last_position_ms: 0,
            last_advance: Instant::now(),
        }
    }

    /// Arm the monitor for a freshly loaded source
    pub(crate) fn restart(&mut self) {
        self.enabled = true;
        self.last_position_ms = 0;
        self.last_advance = Instant::now();
    }

    pub(crate) fn disable(&mut self) {
        self.enabled = false;
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record an observed position; returns true when it advanced.
    ///
    /// Position 0 is not an advance: engines report 0 both before the
    /// first frame and while rebuffering a dead input.
    pub(crate) fn note_position(&mut self, position_ms: i64) -> bool {
        if position_ms != self.last_position_ms && position_ms > 0 {
            self.last_position_ms = position_ms;
            self.last_advance = Instant::now();
            true
        } else {
            false
        }
    }

    /// Time since the last recorded position advance
    pub(crate) fn stalled_for(&self) -> Duration {
        self.last_advance.elapsed()
    }
}

impl PlayerSession {
    /// Health sampling tick.
    ///
    /// Reads the playback position and refreshes the monitor when it
    /// advanced. Does nothing while monitoring is disabled or the engine
    /// is not playing; engine faults during the tick are swallowed, the
    /// verdict side handles them.
    pub async fn observe(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.health.is_enabled() {
            return;
        }
        let Some(player) = inner.player.clone() else {
            return;
        };
        match player.is_playing() {
            Ok(true) => {}
            Ok(false) | Err(_) => return,
        }
        let position_ms = match player.position_ms() {
            Ok(position) => position,
            Err(_) => return,
        };
        if inner.health.note_position(position_ms) {
            debug!(session_id = %self.id, position_ms, "playback position advanced");
        }
    }

    /// Whether the current stream counts as frozen.
    ///
    /// `false` while the session is uninitialized or monitoring is
    /// disabled (nothing was loaded, or playback was stopped). `true`
    /// immediately when the engine reports `Error` or `Ended`. A stream
    /// that is paused or still opening is not frozen. Otherwise the stream
    /// is frozen once the position has stalled for at least `threshold`.
    ///
    /// Fail-safe: an engine that cannot answer the state query is
    /// indistinguishable from a wedged one and reads as frozen.
    pub async fn is_frozen(&self, threshold: Duration) -> bool {
        let inner = self.inner.lock().await;
        if !inner.initialized || !inner.health.is_enabled() {
            return false;
        }
        let Some(player) = inner.player.clone() else {
            return false;
        };

        let state = match player.state() {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    session_id = %self.id,
                    error = %e,
                    "engine unresponsive during freeze check; reporting frozen"
                );
                return true;
            }
        };

        if state == EngineState::Error || state == EngineState::Ended {
            warn!(session_id = %self.id, engine_state = ?state, "engine left playback; reporting frozen");
            return true;
        }
        if state != EngineState::Playing {
            return false;
        }

        let stalled = inner.health.stalled_for();
        if stalled >= threshold {
            warn!(
                session_id = %self.id,
                stalled_ms = stalled.as_millis() as u64,
                threshold_ms = threshold.as_millis() as u64,
                "stream frozen: position stalled past threshold"
            );
            return true;
        }
        false
    }
}
