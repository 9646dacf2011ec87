//! In-memory engine backend for testing and headless hosts
//!
//! [`MockBackend`] implements the whole engine trait family against shared
//! in-memory state. Tests script it: flip failure switches, set the
//! engine-reported state and position, and inspect what the session asked
//! the engine to do (surfaces attached, URLs opened, options added).

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    EngineError, EngineResult, EngineState, MediaBackend, MediaEngine, MediaPlayer, MediaSource,
    StatsSnapshot, SurfaceHandle,
};
use crate::config::EngineConfig;

/// Scripted behavior and recorded interactions, shared by the backend and
/// everything it creates.
#[derive(Debug)]
struct MockShared {
    // Failure switches
    fail_engine_create: bool,
    fail_player_create: bool,
    fail_source_open: bool,
    fail_play: bool,
    fail_stop: bool,
    fail_queries: bool,
    fail_attach_surface: bool,
    fail_add_option: bool,
    stall_on_stop: bool,

    // Engine-visible state
    state: EngineState,
    position_ms: i64,
    volume: i32,
    stats: Option<StatsSnapshot>,

    // Recorded interactions
    engines_created: usize,
    players_created: usize,
    last_engine_args: Vec<String>,
    attached_surfaces: Vec<SurfaceHandle>,
    opened_urls: Vec<String>,
    source_options: Vec<String>,
    play_calls: usize,
    stop_calls: usize,
}

impl Default for MockShared {
    fn default() -> Self {
        Self {
            fail_engine_create: false,
            fail_player_create: false,
            fail_source_open: false,
            fail_play: false,
            fail_stop: false,
            fail_queries: false,
            fail_attach_surface: false,
            fail_add_option: false,
            stall_on_stop: false,
            state: EngineState::Stopped,
            position_ms: 0,
            volume: 100,
            stats: None,
            engines_created: 0,
            players_created: 0,
            last_engine_args: Vec::new(),
            attached_surfaces: Vec::new(),
            opened_urls: Vec::new(),
            source_options: Vec::new(),
            play_calls: 0,
            stop_calls: 0,
        }
    }
}

fn locked(shared: &Mutex<MockShared>) -> MutexGuard<'_, MockShared> {
    // A mock never holds the lock across a panic point worth preserving
    shared.lock().unwrap_or_else(|e| e.into_inner())
}

/// Scriptable in-memory backend
#[derive(Debug, Clone)]
pub struct MockBackend {
    shared: Arc<Mutex<MockShared>>,
}

impl MockBackend {
    /// Create a backend with default behavior: all operations succeed, the
    /// engine reports stopped at position 0, volume 100, no statistics.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(MockShared::default())),
        }
    }

    /// Fail the next and all following engine creations
    pub fn set_fail_engine_create(&self, fail: bool) {
        locked(&self.shared).fail_engine_create = fail;
    }

    /// Fail the next and all following player creations
    pub fn set_fail_player_create(&self, fail: bool) {
        locked(&self.shared).fail_player_create = fail;
    }

    /// Fail the next and all following source opens
    pub fn set_fail_source_open(&self, fail: bool) {
        locked(&self.shared).fail_source_open = fail;
    }

    /// Fail play requests
    pub fn set_fail_play(&self, fail: bool) {
        locked(&self.shared).fail_play = fail;
    }

    /// Fail stop requests
    pub fn set_fail_stop(&self, fail: bool) {
        locked(&self.shared).fail_stop = fail;
    }

    /// Make state, playing and position queries return backend faults
    pub fn set_fail_queries(&self, fail: bool) {
        locked(&self.shared).fail_queries = fail;
    }

    /// Fail surface attachment on players
    pub fn set_fail_attach_surface(&self, fail: bool) {
        locked(&self.shared).fail_attach_surface = fail;
    }

    /// Fail option attachment on sources
    pub fn set_fail_add_option(&self, fail: bool) {
        locked(&self.shared).fail_add_option = fail;
    }

    /// Accept stop requests but keep reporting the playing state, like an
    /// engine that is slow to wind down its input thread
    pub fn set_stall_on_stop(&self, stall: bool) {
        locked(&self.shared).stall_on_stop = stall;
    }

    /// Set the engine-reported playback state
    pub fn set_engine_state(&self, state: EngineState) {
        locked(&self.shared).state = state;
    }

    /// Set the engine-reported position
    pub fn set_position_ms(&self, position_ms: i64) {
        locked(&self.shared).position_ms = position_ms;
    }

    /// Advance the engine-reported position
    pub fn advance_position(&self, delta_ms: i64) {
        locked(&self.shared).position_ms += delta_ms;
    }

    /// Set the statistics the source reports; `None` makes reads fail
    pub fn set_stats(&self, stats: Option<StatsSnapshot>) {
        locked(&self.shared).stats = stats;
    }

    /// Number of engine instances created
    pub fn engines_created(&self) -> usize {
        locked(&self.shared).engines_created
    }

    /// Number of player instances created
    pub fn players_created(&self) -> usize {
        locked(&self.shared).players_created
    }

    /// Argument list passed to the most recent engine creation
    pub fn last_engine_args(&self) -> Vec<String> {
        locked(&self.shared).last_engine_args.clone()
    }

    /// Every surface handle attached to a player, in order
    pub fn attached_surfaces(&self) -> Vec<SurfaceHandle> {
        locked(&self.shared).attached_surfaces.clone()
    }

    /// Every URL opened as a source, in order
    pub fn opened_urls(&self) -> Vec<String> {
        locked(&self.shared).opened_urls.clone()
    }

    /// Every option string added to a source, in order
    pub fn source_options(&self) -> Vec<String> {
        locked(&self.shared).source_options.clone()
    }

    /// Number of play requests the engine has seen
    pub fn play_calls(&self) -> usize {
        locked(&self.shared).play_calls
    }

    /// Number of stop requests the engine has seen
    pub fn stop_calls(&self) -> usize {
        locked(&self.shared).stop_calls
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create_engine(&self, config: &EngineConfig) -> EngineResult<Arc<dyn MediaEngine>> {
        let mut shared = locked(&self.shared);
        if shared.fail_engine_create {
            return Err(EngineError::CreateFailed {
                reason: "mock engine creation disabled".to_string(),
            });
        }
        shared.engines_created += 1;
        shared.last_engine_args = config.engine_args();
        Ok(Arc::new(MockEngine {
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// Engine instance created by [`MockBackend`]
#[derive(Debug)]
pub struct MockEngine {
    shared: Arc<Mutex<MockShared>>,
}

#[async_trait]
impl MediaEngine for MockEngine {
    async fn create_player(&self) -> EngineResult<Arc<dyn MediaPlayer>> {
        let mut shared = locked(&self.shared);
        if shared.fail_player_create {
            return Err(EngineError::CreateFailed {
                reason: "mock player creation disabled".to_string(),
            });
        }
        shared.players_created += 1;
        // A fresh player reports stopped at position 0
        shared.state = EngineState::Stopped;
        shared.position_ms = 0;
        Ok(Arc::new(MockPlayer {
            shared: Arc::clone(&self.shared),
        }))
    }

    async fn open_source(&self, url: &str) -> EngineResult<Arc<dyn MediaSource>> {
        let mut shared = locked(&self.shared);
        if shared.fail_source_open {
            return Err(EngineError::InvalidLocation {
                url: url.to_string(),
            });
        }
        shared.opened_urls.push(url.to_string());
        Ok(Arc::new(MockSource {
            shared: Arc::clone(&self.shared),
            url: url.to_string(),
        }))
    }
}

/// Player instance created by [`MockEngine`]
#[derive(Debug)]
pub struct MockPlayer {
    shared: Arc<Mutex<MockShared>>,
}

#[async_trait]
impl MediaPlayer for MockPlayer {
    fn attach_surface(&self, surface: SurfaceHandle) -> EngineResult<()> {
        let mut shared = locked(&self.shared);
        if shared.fail_attach_surface {
            return Err(EngineError::backend("mock surface attach disabled"));
        }
        shared.attached_surfaces.push(surface);
        Ok(())
    }

    async fn set_source(&self, _source: Arc<dyn MediaSource>) -> EngineResult<()> {
        Ok(())
    }

    async fn play(&self) -> EngineResult<()> {
        let mut shared = locked(&self.shared);
        shared.play_calls += 1;
        if shared.fail_play {
            return Err(EngineError::PlaybackRejected {
                reason: "mock playback disabled".to_string(),
            });
        }
        shared.state = EngineState::Playing;
        Ok(())
    }

    async fn stop(&self) -> EngineResult<()> {
        let mut shared = locked(&self.shared);
        shared.stop_calls += 1;
        if shared.fail_stop {
            return Err(EngineError::backend("mock stop disabled"));
        }
        if !shared.stall_on_stop {
            shared.state = EngineState::Stopped;
            shared.position_ms = 0;
        }
        Ok(())
    }

    async fn pause(&self) -> EngineResult<()> {
        let mut shared = locked(&self.shared);
        if shared.state == EngineState::Playing {
            shared.state = EngineState::Paused;
        }
        Ok(())
    }

    fn is_playing(&self) -> EngineResult<bool> {
        let shared = locked(&self.shared);
        if shared.fail_queries {
            return Err(EngineError::backend("mock queries disabled"));
        }
        Ok(shared.state == EngineState::Playing)
    }

    fn state(&self) -> EngineResult<EngineState> {
        let shared = locked(&self.shared);
        if shared.fail_queries {
            return Err(EngineError::backend("mock queries disabled"));
        }
        Ok(shared.state)
    }

    fn position_ms(&self) -> EngineResult<i64> {
        let shared = locked(&self.shared);
        if shared.fail_queries {
            return Err(EngineError::backend("mock queries disabled"));
        }
        Ok(shared.position_ms)
    }

    fn volume(&self) -> EngineResult<i32> {
        Ok(locked(&self.shared).volume)
    }

    fn set_volume(&self, volume: i32) -> EngineResult<()> {
        locked(&self.shared).volume = volume;
        Ok(())
    }
}

/// Source created by [`MockEngine::open_source`]
#[derive(Debug)]
pub struct MockSource {
    shared: Arc<Mutex<MockShared>>,
    url: String,
}

impl MediaSource for MockSource {
    fn url(&self) -> &str {
        &self.url
    }

    fn stats(&self) -> EngineResult<StatsSnapshot> {
        locked(&self.shared)
            .stats
            .ok_or(EngineError::StatsUnavailable)
    }

    fn add_option(&self, option: &str) -> EngineResult<()> {
        let mut shared = locked(&self.shared);
        if shared.fail_add_option {
            return Err(EngineError::backend("mock option attach disabled"));
        }
        shared.source_options.push(option.to_string());
        Ok(())
    }
}
