//! # Playback Core - IPTV Playback Supervision Library
//!
//! This crate supervises live stream playback on behalf of an IPTV client:
//! it owns the engine/player pair behind one [`PlayerSession`], detects
//! frozen streams, recovers wedged players without restarting the engine,
//! and keeps transport statistics readable across engine hiccups.
//!
//! ## Quick Start
//!
//! ```rust
//! use playback_core::engine::mock::MockBackend;
//! use playback_core::engine::SurfaceHandle;
//! use playback_core::{PlayerSession, DEFAULT_FREEZE_THRESHOLD};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Arc::new(MockBackend::new());
//!     let session = PlayerSession::new(backend.clone());
//!
//!     // Bind the engine to the host's rendering surface and tune in
//!     session.initialize(SurfaceHandle::new(0x52f0)).await?;
//!     session.load("udp://239.255.1.1:1234").await?;
//!     assert!(session.is_playing().await);
//!
//!     // Host-driven health sampling, typically once a second
//!     session.observe().await;
//!     if session.is_frozen(DEFAULT_FREEZE_THRESHOLD).await {
//!         session.recreate_player().await?;
//!     }
//!
//!     session.teardown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`session`]: the [`PlayerSession`] handle, playback state machine,
//!   freeze monitor, statistics cache and recording bookkeeping
//! - [`engine`]: the backend trait family a media engine implements, plus
//!   a scriptable mock backend
//! - [`recovery`]: caller-side retry helpers with exponential backoff
//! - [`events`]: broadcast notifications for UI layers
//!
//! ## Design notes
//!
//! - The engine instance outlives player instances, so recovering from a
//!   wedged player never pays the engine startup cost
//! - Freeze detection is position-stall based: a stream whose position has
//!   not advanced for 10 seconds while the engine claims to be playing is
//!   frozen
//! - The session never retries or recovers on its own; hosts drive
//!   recovery, usually through [`recovery::retry_with_backoff`]

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod recovery;
pub mod session;

// Re-export main types
pub use config::EngineConfig;
pub use engine::{EngineError, EngineResult, EngineState, StatsSnapshot, SurfaceHandle};
pub use error::{PlayerError, PlayerResult};
pub use events::PlayerEvent;
pub use session::{PlaybackState, PlayerSession, RecordingInfo, DEFAULT_FREEZE_THRESHOLD};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
