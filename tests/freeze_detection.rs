//! Freeze monitor scenarios driven the way hosts drive them: a sampling
//! tick once a second, a frozen verdict, then player recovery and reload.
//!
//! All tests run under a paused tokio clock so stall thresholds elapse
//! instantly.

use std::sync::Arc;
use std::time::Duration;

use playback_core::engine::mock::MockBackend;
use playback_core::engine::{EngineState, SurfaceHandle};
use playback_core::{PlayerSession, DEFAULT_FREEZE_THRESHOLD};

const CHANNEL: &str = "udp://239.255.0.20:1234";

async fn playing_session() -> (MockBackend, PlayerSession) {
    let backend = MockBackend::new();
    let session = PlayerSession::new(Arc::new(backend.clone()));
    session.initialize(SurfaceHandle::new(0x3000)).await.unwrap();
    session.load(CHANNEL).await.unwrap();
    (backend, session)
}

/// One host sampling tick: a second passes, the engine position may move,
/// the session observes.
async fn tick(backend: &MockBackend, session: &PlayerSession, position_ms: Option<i64>) {
    tokio::time::advance(Duration::from_secs(1)).await;
    if let Some(position) = position_ms {
        backend.set_position_ms(position);
    }
    session.observe().await;
}

#[tokio::test(start_paused = true)]
async fn test_healthy_stream_never_reads_frozen() {
    let (backend, session) = playing_session().await;

    for i in 1..=30 {
        tick(&backend, &session, Some(i * 1000)).await;
        assert!(!session.is_frozen(DEFAULT_FREEZE_THRESHOLD).await);
    }
}

#[tokio::test(start_paused = true)]
async fn test_stalled_stream_reads_frozen_after_threshold() {
    let (backend, session) = playing_session().await;

    // Three healthy seconds
    for i in 1..=3 {
        tick(&backend, &session, Some(i * 1000)).await;
    }
    assert!(!session.is_frozen(DEFAULT_FREEZE_THRESHOLD).await);

    // The multicast dies: position pins while the engine keeps "playing"
    for _ in 0..9 {
        tick(&backend, &session, None).await;
        assert!(!session.is_frozen(DEFAULT_FREEZE_THRESHOLD).await);
    }
    tick(&backend, &session, None).await;
    // Ten full seconds without an advance
    assert!(session.is_frozen(DEFAULT_FREEZE_THRESHOLD).await);
}

#[tokio::test(start_paused = true)]
async fn test_stall_exactly_at_threshold_counts_as_frozen() {
    let (backend, session) = playing_session().await;

    tick(&backend, &session, Some(1000)).await;
    tokio::time::advance(Duration::from_secs(10)).await;

    assert!(session.is_frozen(Duration::from_secs(10)).await);
}

#[tokio::test(start_paused = true)]
async fn test_custom_threshold_is_honored() {
    let (backend, session) = playing_session().await;

    tick(&backend, &session, Some(1000)).await;
    tokio::time::advance(Duration::from_secs(4)).await;

    assert!(session.is_frozen(Duration::from_secs(3)).await);
    assert!(!session.is_frozen(Duration::from_secs(30)).await);
}

#[tokio::test(start_paused = true)]
async fn test_freeze_recovery_round_trip() {
    let (backend, session) = playing_session().await;

    // Healthy, then the stream stalls past the threshold
    for i in 1..=3 {
        tick(&backend, &session, Some(i * 1000)).await;
    }
    for _ in 0..11 {
        tick(&backend, &session, None).await;
    }
    assert!(session.is_frozen(DEFAULT_FREEZE_THRESHOLD).await);

    // Host-driven recovery: fresh player on the surviving engine, then
    // reload the channel the session still remembers
    session.recreate_player().await.unwrap();
    assert_eq!(backend.engines_created(), 1);
    assert_eq!(backend.players_created(), 2);

    let url = session.current_url().await.expect("url kept for reload");
    session.load(&url).await.unwrap();
    assert!(session.is_playing().await);

    // The reload rearmed the monitor
    assert!(!session.is_frozen(DEFAULT_FREEZE_THRESHOLD).await);
    for i in 1..=5 {
        tick(&backend, &session, Some(i * 1000)).await;
    }
    assert!(!session.is_frozen(DEFAULT_FREEZE_THRESHOLD).await);
}

#[tokio::test(start_paused = true)]
async fn test_engine_error_state_skips_the_threshold() {
    let (backend, session) = playing_session().await;

    tick(&backend, &session, Some(1000)).await;
    assert!(!session.is_frozen(DEFAULT_FREEZE_THRESHOLD).await);

    backend.set_engine_state(EngineState::Error);
    assert!(session.is_frozen(DEFAULT_FREEZE_THRESHOLD).await);
}

#[tokio::test(start_paused = true)]
async fn test_unresponsive_engine_reads_frozen() {
    let (backend, session) = playing_session().await;

    tick(&backend, &session, Some(1000)).await;
    backend.set_fail_queries(true);

    assert!(session.is_frozen(DEFAULT_FREEZE_THRESHOLD).await);
}

#[tokio::test(start_paused = true)]
async fn test_zapping_resets_the_monitor() {
    let (backend, session) = playing_session().await;

    // Stall the first channel to the brink of the threshold
    tick(&backend, &session, Some(1000)).await;
    tokio::time::advance(Duration::from_secs(9)).await;

    // Zapping rearms the monitor; the stall clock starts over
    session.load("udp://239.255.0.21:1234").await.unwrap();
    tokio::time::advance(Duration::from_secs(2)).await;

    assert!(!session.is_frozen(DEFAULT_FREEZE_THRESHOLD).await);
}
