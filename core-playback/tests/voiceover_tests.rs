//! One-shot voiceover tests.

mod common;

use common::*;

use bridge_traits::AudioAsset;
use core_playback::AudioSession;
use core_runtime::config::AudioConfig;
use core_runtime::events::{CoreEvent, PlaybackEvent, VoiceoverEvent};
use std::sync::Arc;

#[tokio::test]
async fn test_voiceover_restarts_from_beginning() {
    let device = FakeDevice::new();
    let session = initialized_session(&device).await;
    let voiceover = device.voiceover();
    let mut events = session.events().subscribe();

    session.voiceover().play_voiceover().await;

    assert!(voiceover.is_playing());
    assert!(!voiceover.is_looping());
    assert_eq!(voiceover.ops(), vec![Op::Stop, Op::Play]);
    assert_eq!(
        drain(&mut events),
        vec![CoreEvent::Voiceover(VoiceoverEvent::Started)]
    );
}

#[tokio::test]
async fn test_voiceover_ignores_enable_gate() {
    let device = FakeDevice::new();
    let session = initialized_session(&device).await;

    session.playback().set_enabled(false).await;
    session.voiceover().play_voiceover().await;

    assert!(device.voiceover().is_playing());
    assert!(!session.state().is_playing());
}

#[tokio::test]
async fn test_voiceover_leaves_background_untouched() {
    let device = FakeDevice::new();
    let session = initialized_session(&device).await;
    session.playback().play().await;
    device.background().clear_ops();

    session.voiceover().play_voiceover().await;

    assert!(device.background().ops().is_empty());
    assert!(session.state().is_playing());
}

#[tokio::test]
async fn test_rapid_voiceovers_never_overlap() {
    let device = FakeDevice::new();
    let session = initialized_session(&device).await;
    let voiceover = device.voiceover();
    let release = voiceover.hold(Op::Play);

    let first = {
        let controller = session.voiceover();
        spawn_started(async move { controller.play_voiceover().await }).await
    };
    let second = {
        let controller = session.voiceover();
        spawn_started(async move { controller.play_voiceover().await }).await
    };

    // The second call waits for the first stop/play pair to finish.
    assert_eq!(voiceover.ops(), vec![Op::Stop, Op::Play]);

    release.notify_one();
    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(voiceover.ops(), vec![Op::Stop, Op::Play, Op::Stop, Op::Play]);
    assert!(voiceover.is_playing());
}

#[tokio::test]
async fn test_voiceover_failure_is_published() {
    let device = FakeDevice::new();
    let session = initialized_session(&device).await;
    device.voiceover().fail(Op::Play);
    let mut events = session.events().subscribe();

    session.voiceover().play_voiceover().await;

    assert!(!device.voiceover().is_playing());
    assert!(matches!(
        drain(&mut events).as_slice(),
        [CoreEvent::Voiceover(VoiceoverEvent::Failed { .. })]
    ));
}

#[tokio::test]
async fn test_voiceover_without_asset_is_noop() {
    let device = FakeDevice::new();
    let config = AudioConfig::builder()
        .device(Arc::clone(&device) as _)
        .background_asset(AudioAsset::bundled(BACKGROUND))
        .build()
        .unwrap();
    let session = AudioSession::new(&config);
    session.initialize().await.unwrap();
    let mut events = session.events().subscribe();

    session.voiceover().play_voiceover().await;

    assert!(device.channel(VOICEOVER).is_none());
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn test_voiceover_before_initialize_is_noop() {
    let device = FakeDevice::new();
    let session = AudioSession::new(&config(Arc::clone(&device)));

    session.voiceover().play_voiceover().await;

    assert!(device.loads().is_empty());
}

#[tokio::test]
async fn test_queued_voiceover_skips_unloaded_channel() {
    let device = FakeDevice::new();
    let session = initialized_session(&device).await;
    let voiceover = device.voiceover();
    let release = voiceover.hold(Op::Play);
    let mut events = session.events().subscribe();

    let first = {
        let controller = session.voiceover();
        spawn_started(async move { controller.play_voiceover().await }).await
    };
    let second = {
        let controller = session.voiceover();
        spawn_started(async move { controller.play_voiceover().await }).await
    };

    session.teardown().await;
    release.notify_one();
    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(voiceover.ops(), vec![Op::Stop, Op::Play, Op::Unload]);
    assert!(!drain(&mut events)
        .iter()
        .any(|event| matches!(event, CoreEvent::Voiceover(VoiceoverEvent::Failed { .. }))));
}

#[tokio::test]
async fn test_rejected_voiceover_stop_is_published() {
    let device = FakeDevice::new();
    let session = initialized_session(&device).await;
    device.voiceover().fail(Op::Stop);
    let mut events = session.events().subscribe();

    session.voiceover().play_voiceover().await;

    let received = drain(&mut events);
    assert!(matches!(
        &received[0],
        CoreEvent::Playback(PlaybackEvent::DeviceError { operation, .. }) if operation == "voiceover_stop"
    ));
    assert_eq!(received[1], CoreEvent::Voiceover(VoiceoverEvent::Started));
    assert!(device.voiceover().is_playing());
}
