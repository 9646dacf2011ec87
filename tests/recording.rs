//! Recording session scenarios: configuring the output duplication on a
//! live source, the best-effort caveats, and bookkeeping lifetime.

use std::sync::Arc;

use playback_core::engine::mock::MockBackend;
use playback_core::engine::{EngineError, SurfaceHandle};
use playback_core::{PlayerError, PlayerEvent, PlayerSession};

const CHANNEL: &str = "udp://239.255.0.30:1234";
const RECORDING_PATH: &str = "/var/lib/tv/recordings/match-of-the-day.ts";

async fn playing_session() -> (MockBackend, PlayerSession) {
    let backend = MockBackend::new();
    let session = PlayerSession::new(Arc::new(backend.clone()));
    session.initialize(SurfaceHandle::new(0x4000)).await.unwrap();
    session.load(CHANNEL).await.unwrap();
    (backend, session)
}

#[tokio::test]
async fn test_recording_configures_output_duplication() {
    let (backend, session) = playing_session().await;
    let mut events = session.subscribe();

    session.start_recording(RECORDING_PATH).await.unwrap();

    // The source got the display + TS file duplication graph
    assert_eq!(
        backend.source_options(),
        vec![format!(
            "#duplicate{{dst=display,dst=std{{access=file,mux=ts,dst={}}}}}",
            RECORDING_PATH
        )]
    );
    assert!(session.is_recording().await);

    let info = session.recording_info().await.unwrap();
    assert_eq!(info.path, RECORDING_PATH);

    assert_eq!(
        events.try_recv().unwrap(),
        PlayerEvent::RecordingStarted {
            path: RECORDING_PATH.to_string()
        }
    );
}

#[tokio::test]
async fn test_recording_preconditions() {
    let backend = MockBackend::new();
    let session = PlayerSession::new(Arc::new(backend.clone()));

    // Uninitialized session
    assert!(matches!(
        session.start_recording(RECORDING_PATH).await,
        Err(PlayerError::NotInitialized)
    ));

    // Initialized but nothing loaded
    session.initialize(SurfaceHandle::new(0x4000)).await.unwrap();
    assert!(matches!(
        session.start_recording(RECORDING_PATH).await,
        Err(PlayerError::Engine(EngineError::NoSource))
    ));

    // With a source, recording starts; a second start is rejected
    session.load(CHANNEL).await.unwrap();
    session.start_recording(RECORDING_PATH).await.unwrap();
    assert!(matches!(
        session.start_recording("/tmp/other.ts").await,
        Err(PlayerError::AlreadyRecording)
    ));
}

#[tokio::test]
async fn test_stop_recording_clears_bookkeeping_only() {
    let (backend, session) = playing_session().await;

    session.start_recording(RECORDING_PATH).await.unwrap();
    session.stop_recording().await.unwrap();

    assert!(!session.is_recording().await);
    assert_eq!(session.recording_info().await, None);
    // The engine side is never signalled; the option stays on the source
    assert_eq!(backend.source_options().len(), 1);

    assert!(matches!(
        session.stop_recording().await,
        Err(PlayerError::NotRecording)
    ));
}

#[tokio::test]
async fn test_recording_bookkeeping_survives_source_swap() {
    let (backend, session) = playing_session().await;

    session.start_recording(RECORDING_PATH).await.unwrap();
    session.load("udp://239.255.0.31:1234").await.unwrap();

    // Bookkeeping is local; the duplication option stayed with the old
    // source and was not re-applied to the new one
    assert!(session.is_recording().await);
    assert_eq!(backend.source_options().len(), 1);
}

#[tokio::test]
async fn test_recording_restart_after_stop() {
    let (backend, session) = playing_session().await;

    session.start_recording("/tmp/first.ts").await.unwrap();
    session.stop_recording().await.unwrap();
    session.start_recording("/tmp/second.ts").await.unwrap();

    assert_eq!(
        session.recording_info().await.map(|r| r.path),
        Some("/tmp/second.ts".to_string())
    );
    assert_eq!(backend.source_options().len(), 2);
}
