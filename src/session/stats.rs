//! Transport statistics with last-good caching
//!
//! Engines drop their statistics for a beat during rebuffering or source
//! swaps. A dashboard that polls once a second would flicker to zero every
//! time, so the session keeps the last snapshot that was read successfully
//! and serves it across read failures. Only a session that has never seen
//! a successful read reports the all-zero snapshot.

use tracing::debug;

use super::PlayerSession;
use crate::engine::StatsSnapshot;

impl PlayerSession {
    /// Read transport statistics for the loaded source.
    ///
    /// On success the snapshot is cached and returned. When the read fails
    /// (session uninitialized, no source bound, engine reports no
    /// statistics) the previously cached snapshot is returned unchanged.
    pub async fn stats(&self) -> StatsSnapshot {
        let mut inner = self.inner.lock().await;
        let Some(source) = inner.source.clone() else {
            return inner.stats_cache;
        };
        match source.stats() {
            Ok(snapshot) => {
                inner.stats_cache = snapshot;
                snapshot
            }
            Err(e) => {
                debug!(
                    session_id = %self.id,
                    error = %e,
                    "statistics read failed; serving cached snapshot"
                );
                inner.stats_cache
            }
        }
    }
}
