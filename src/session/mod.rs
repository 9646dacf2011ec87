//! Playback session management
//!
//! [`PlayerSession`] is the handle an IPTV client holds for one playback
//! pipeline. It owns an engine instance and the player created from it,
//! drives the playback state machine, and layers the supervision concerns
//! on top: freeze detection ([`health`]), player recovery, statistics
//! caching ([`stats`]) and best-effort recording ([`recording`]).
//!
//! Sessions are plain owned values. Two sessions never share state, so a
//! host can run picture-in-picture or prefetch pipelines side by side and
//! tear one down without disturbing the other. Dropping a session releases
//! the engine handles through reference counting; call
//! [`teardown`](PlayerSession::teardown) when release has to happen at a
//! deterministic point.
//!
//! The lifetime split matters for recovery: when a player wedges (common
//! after drivers rebuffer a dead multicast for too long), the session can
//! drop just the player and create a fresh one from the surviving engine
//! instance, which is much cheaper than a full engine restart and keeps
//! the host's rendering surface registered.

pub mod health;
pub mod playback;
pub mod recording;
pub mod stats;


pub use health::DEFAULT_FREEZE_THRESHOLD;
pub use playback::PlaybackState;
pub use recording::RecordingInfo;

use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::engine::{
    MediaBackend, MediaEngine, MediaPlayer, MediaSource, StatsSnapshot, SurfaceHandle,
};
use crate::error::{PlayerError, PlayerResult};
use crate::events::{PlayerEvent, EVENT_CHANNEL_CAPACITY};

use health::HealthState;

/// Mutable session state, guarded by one lock so operations serialize.
pub(crate) struct SessionInner {
    /// Engine instance; outlives players across recoveries
    pub(crate) engine: Option<Arc<dyn MediaEngine>>,
    /// Player instance; `Some` exactly while `initialized`
    pub(crate) player: Option<Arc<dyn MediaPlayer>>,
    /// Source bound to the player; survives stop, replaced on load
    pub(crate) source: Option<Arc<dyn MediaSource>>,
    /// Host rendering surface, reattached on player recreation
    pub(crate) surface: Option<SurfaceHandle>,
    /// Whether the session holds a usable engine and player pair
    pub(crate) initialized: bool,
    /// URL of the currently loaded source
    pub(crate) current_url: Option<String>,
    /// Sticky error flag, set by failed loads, cleared by stop/load/recreate
    pub(crate) in_error: bool,
    /// Intended playback state driving event emission
    pub(crate) state: PlaybackState,
    /// Freeze monitor bookkeeping
    pub(crate) health: HealthState,
    /// Last successfully read statistics snapshot
    pub(crate) stats_cache: StatsSnapshot,
    /// Active recording bookkeeping, `Some` while a recording is configured
    pub(crate) recording: Option<RecordingInfo>,
}

impl SessionInner {
    fn new() -> Self {
        Self {
            engine: None,
            player: None,
            source: None,
            surface: None,
            initialized: false,
            current_url: None,
            in_error: false,
            state: PlaybackState::Stopped,
            health: HealthState::new(),
            stats_cache: StatsSnapshot::default(),
            recording: None,
        }
    }
}

/// Supervised playback pipeline over a pluggable media engine.
///
/// Operations serialize on an internal lock; the session is `Send + Sync`
/// and is typically shared as `Arc<PlayerSession>` between the UI task and
/// a health sampling task.
pub struct PlayerSession {
    pub(crate) id: Uuid,
    pub(crate) backend: Arc<dyn MediaBackend>,
    pub(crate) config: EngineConfig,
    pub(crate) inner: Mutex<SessionInner>,
    pub(crate) event_tx: broadcast::Sender<PlayerEvent>,
}

impl PlayerSession {
    /// Create a session with the default live-stream engine configuration
    pub fn new(backend: Arc<dyn MediaBackend>) -> Self {
        Self::with_config(backend, EngineConfig::default())
    }

    /// Create a session with an explicit engine configuration
    pub fn with_config(backend: Arc<dyn MediaBackend>, config: EngineConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            id: Uuid::new_v4(),
            backend,
            config,
            inner: Mutex::new(SessionInner::new()),
            event_tx,
        }
    }

    /// Session id used in log correlation
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Engine configuration this session was created with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Subscribe to session events.
    ///
    /// Receivers that fall behind lag and drop events; they never block
    /// session operations.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_tx.subscribe()
    }

    /// Whether the session holds a usable engine and player pair
    pub async fn is_initialized(&self) -> bool {
        self.inner.lock().await.initialized
    }

    /// Create the engine instance and player, and attach the host's
    /// rendering surface.
    ///
    /// Calling this again with the same surface is a no-op; a different
    /// surface is rejected with [`PlayerError::AlreadyInitialized`] (tear
    /// the session down first to move it to another window).
    ///
    /// On engine creation failure nothing is retained. On player creation
    /// failure the freshly created engine is released as well, so a failed
    /// initialize always leaves the session empty.
    pub async fn initialize(&self, surface: SurfaceHandle) -> PlayerResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.initialized {
            if inner.surface == Some(surface) {
                debug!(session_id = %self.id, "already initialized with this surface");
                return Ok(());
            }
            return Err(PlayerError::AlreadyInitialized);
        }

        info!(
            session_id = %self.id,
            backend = self.backend.name(),
            surface = surface.raw(),
            "initializing playback session"
        );

        let engine = self
            .backend
            .create_engine(&self.config)
            .await
            .map_err(|e| PlayerError::engine_create(e.to_string()))?;

        let player = match engine.create_player().await {
            Ok(player) => player,
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "player creation failed; releasing engine");
                return Err(PlayerError::player_create(e.to_string()));
            }
        };

        player.attach_surface(surface)?;

        inner.engine = Some(engine);
        inner.player = Some(player);
        inner.surface = Some(surface);
        inner.initialized = true;

        info!(session_id = %self.id, "playback session initialized");
        Ok(())
    }

    /// Release the player and engine instances at a deterministic point.
    ///
    /// Stops playback first if any is active. Idempotent: tearing down a
    /// session that holds nothing is an `Ok` no-op.
    pub async fn teardown(&self) -> PlayerResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.engine.is_none() && inner.player.is_none() {
            return Ok(());
        }

        if let Some(player) = inner.player.take() {
            if let Err(e) = player.stop().await {
                warn!(session_id = %self.id, error = %e, "stop during teardown failed");
            }
        }
        inner.engine = None;
        inner.source = None;
        inner.surface = None;
        inner.initialized = false;
        inner.current_url = None;
        inner.in_error = false;
        inner.health.disable();
        if let Some(rec) = inner.recording.take() {
            debug!(session_id = %self.id, path = %rec.path, "dropping recording bookkeeping");
        }
        self.transition(&mut inner, PlaybackState::Stopped);

        info!(session_id = %self.id, "playback session torn down");
        Ok(())
    }

    /// Replace a wedged player with a fresh one on the surviving engine.
    ///
    /// Releases the current player, creates a new one from the same engine
    /// instance, reattaches the stored surface and clears the error flag.
    /// The last loaded URL is kept so the caller can
    /// [`load`](PlayerSession::load) it again.
    ///
    /// Fails with [`PlayerError::EngineMissing`] when no engine exists
    /// (recovery cannot run before the first
    /// [`initialize`](PlayerSession::initialize)). If player creation
    /// fails the engine is preserved and the session is left
    /// uninitialized, ready for another recovery attempt.
    pub async fn recreate_player(&self) -> PlayerResult<()> {
        let mut inner = self.inner.lock().await;
        let engine = inner.engine.clone().ok_or(PlayerError::EngineMissing)?;

        info!(session_id = %self.id, "recreating player on surviving engine");

        inner.player = None;
        inner.initialized = false;
        inner.health.disable();

        let player = match engine.create_player().await {
            Ok(player) => player,
            Err(e) => {
                warn!(
                    session_id = %self.id,
                    error = %e,
                    "player recreation failed; engine preserved"
                );
                self.transition(&mut inner, PlaybackState::Stopped);
                return Err(PlayerError::player_create(e.to_string()));
            }
        };

        if let Some(surface) = inner.surface {
            if let Err(e) = player.attach_surface(surface) {
                warn!(
                    session_id = %self.id,
                    error = %e,
                    "surface reattach failed; engine preserved"
                );
                self.transition(&mut inner, PlaybackState::Stopped);
                return Err(e.into());
            }
        }

        inner.player = Some(player);
        inner.initialized = true;
        inner.in_error = false;
        self.transition(&mut inner, PlaybackState::Stopped);
        self.emit(PlayerEvent::PlayerRecreated);

        info!(session_id = %self.id, "player recreated");
        Ok(())
    }

    /// Move the intended state machine and emit the transition
    pub(crate) fn transition(&self, inner: &mut SessionInner, next: PlaybackState) {
        if inner.state == next {
            return;
        }
        let previous = inner.state;
        inner.state = next;
        debug!(session_id = %self.id, %previous, %next, "playback state transition");
        self.emit(PlayerEvent::StateChanged {
            previous,
            current: next,
        });
    }

    /// Broadcast an event; nobody listening is fine
    pub(crate) fn emit(&self, event: PlayerEvent) {
        let _ = self.event_tx.send(event);
    }
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("id", &self.id)
            .field("backend", &self.backend.name())
            .finish()
    }
}
