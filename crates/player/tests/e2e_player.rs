//! End-to-end track playback against the full mock rig: in-memory storage,
//! scripted decode engine, recording codec/compositor/panel.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use platform::audio::AudioConfig;
use platform::image::{ChromaSubsampling, DecodeEvent, RawImageInfo};
use platform::input::ControlEvent;
use platform::mocks::{
    FixedResolver, MemStorage, MockAudioSink, MockCompositor, MockControls, MockPanel,
    ScriptedAccelerator,
};
use platform::storage::Storage;
use platform::wait::PollBudget;
use player::{play_track, track_step, TrackOutcome};
use playback::AudioController;

const SCREEN_W: u32 = 480;
const SCREEN_H: u32 = 800;

fn cover_script() -> Vec<DecodeEvent> {
    vec![
        DecodeEvent::HeaderReady(RawImageInfo {
            width: 100,
            height: 90,
            subsampling: ChromaSubsampling::Ycbcr420,
        }),
        DecodeEvent::OutputReady { len: 10_000 },
        DecodeEvent::OutputReady { len: 6_000 },
        DecodeEvent::Complete,
    ]
}

fn full_album() -> MemStorage {
    let mut storage = MemStorage::new();
    storage.insert("Album/cover.jpg", &[0xD8u8; 4_000]);
    storage.insert("Album/meta.txt", b"The Man Who Sold The World\nDavid Bowie\n");
    storage.insert("Album/song.raw", &vec![0x42u8; 6_000]);
    storage
}

struct Rig {
    storage: MemStorage,
    controller: AudioController<MockAudioSink, platform::mocks::MemFile>,
    accel: ScriptedAccelerator,
    resolver: FixedResolver,
    compositor: MockCompositor,
    panel: MockPanel,
    cover_buf: Vec<u8>,
}

impl Rig {
    async fn new(storage: MemStorage) -> Self {
        let mut controller = AudioController::new(MockAudioSink::new());
        controller.init(AudioConfig::default()).await.unwrap();
        Self {
            storage,
            controller,
            accel: ScriptedAccelerator::new(&cover_script()),
            resolver: FixedResolver::supporting_all(),
            compositor: MockCompositor::new(SCREEN_W, SCREEN_H),
            panel: MockPanel::new(),
            cover_buf: vec![0u8; 40_000],
        }
    }

    async fn play(&mut self, controls: &mut MockControls, dir: &str) -> TrackOutcome {
        play_track(
            &mut self.storage,
            &mut self.controller,
            &mut self.accel,
            &self.resolver,
            &mut self.compositor,
            &mut self.panel,
            controls,
            &mut self.cover_buf,
            PollBudget::bounded(64),
            dir,
        )
        .await
        .unwrap()
    }
}

#[tokio::test]
async fn track_plays_cover_meta_and_audio_until_skip() {
    let mut rig = Rig::new(full_album()).await;
    let mut controls = MockControls::new(&[
        None,
        Some(ControlEvent::VolumeUp),
        Some(ControlEvent::PausePlay),
        Some(ControlEvent::Skip),
    ]);

    let outcome = rig.play(&mut controls, "Album").await;
    assert_eq!(outcome, TrackOutcome::Skipped);

    // Cover centred on true dimensions, stride on rounded ones.
    let blit = rig.compositor.blits[0];
    assert_eq!(blit.x, (SCREEN_W - 100) / 2);
    assert_eq!(blit.y, (SCREEN_H - 90) / 2 - player::COVER_Y_LIFT);
    assert_eq!((blit.width, blit.height), (100, 90));
    assert_eq!(blit.source_stride, 112);

    // Title ellipsized to 20 characters, artist short enough to keep.
    assert_eq!(rig.panel.titles, vec!["The Man Who Sold ..."]);
    assert_eq!(rig.panel.artists, vec!["David Bowie"]);

    // Audio started, volume stepped once, paused by the toggle, stopped on skip.
    let sink = rig.controller.sink();
    assert_eq!(sink.play_calls(), 1);
    assert_eq!(sink.volume(), 25);
    assert!(sink.is_paused());
    assert!(!sink.is_playing());
}

#[tokio::test]
async fn missing_cover_still_plays_audio() {
    let mut storage = MemStorage::new();
    storage.insert("Album/meta.txt", b"Title\nArtist\n");
    storage.insert("Album/song.raw", &vec![1u8; 4_096]);
    let mut rig = Rig::new(storage).await;
    let mut controls = MockControls::new(&[Some(ControlEvent::Skip)]);

    let outcome = rig.play(&mut controls, "Album").await;
    assert_eq!(outcome, TrackOutcome::Skipped);
    assert!(rig.compositor.blits.is_empty());
    assert_eq!(rig.controller.sink().play_calls(), 1);
}

#[tokio::test]
async fn unsupported_cover_is_skipped_but_track_plays() {
    let mut rig = Rig::new(full_album()).await;
    rig.resolver = FixedResolver::rejecting_all();
    let mut controls = MockControls::new(&[Some(ControlEvent::Skip)]);

    let outcome = rig.play(&mut controls, "Album").await;
    assert_eq!(outcome, TrackOutcome::Skipped);
    assert!(rig.compositor.blits.is_empty());
    assert_eq!(rig.controller.sink().play_calls(), 1);
}

#[tokio::test]
async fn missing_meta_shows_blank_lines() {
    let mut storage = MemStorage::new();
    storage.insert("Album/cover.jpg", &[0xD8u8; 1_000]);
    storage.insert("Album/song.raw", &vec![1u8; 4_096]);
    let mut rig = Rig::new(storage).await;
    let mut controls = MockControls::new(&[Some(ControlEvent::Skip)]);

    rig.play(&mut controls, "Album").await;
    assert_eq!(rig.panel.titles, vec![""]);
    assert_eq!(rig.panel.artists, vec![""]);
}

#[tokio::test]
async fn missing_audio_skips_the_track() {
    let mut storage = MemStorage::new();
    storage.insert("Album/cover.jpg", &[0xD8u8; 1_000]);
    storage.insert("Album/meta.txt", b"Title\nArtist\n");
    let mut rig = Rig::new(storage).await;
    let mut controls = MockControls::idle();

    let outcome = rig.play(&mut controls, "Album").await;
    assert_eq!(outcome, TrackOutcome::NoAudio);
    assert_eq!(rig.controller.sink().play_calls(), 0);
}

#[tokio::test]
async fn empty_audio_file_skips_the_track() {
    let mut storage = MemStorage::new();
    storage.insert("Album/song.raw", &[]);
    let mut rig = Rig::new(storage).await;
    let mut controls = MockControls::idle();

    let outcome = rig.play(&mut controls, "Album").await;
    assert_eq!(outcome, TrackOutcome::NoAudio);
    assert_eq!(rig.controller.sink().play_calls(), 0);
}

#[tokio::test]
async fn track_completes_when_codec_drains_the_stream() {
    // Drive the poll loop one step at a time, interleaving the transfer
    // signals the way the codec interrupt would. 3072 bytes = prime (2048)
    // plus one more half; the half that reads the tail gets the end marker.
    let mut storage = MemStorage::new();
    storage.insert("Album/song.raw", &vec![9u8; 3_072]);
    let mut rig = Rig::new(storage).await;
    let mut controls = MockControls::idle();

    let file = rig.storage.open_file("Album/song.raw").await.unwrap();
    rig.controller.start(file).await.unwrap();

    rig.controller.on_half_transfer();
    assert_eq!(track_step(&mut rig.controller, &mut controls).await.unwrap(), None);

    rig.controller.on_transfer_complete();
    assert_eq!(track_step(&mut rig.controller, &mut controls).await.unwrap(), None);

    rig.controller.on_half_transfer();
    assert_eq!(
        track_step(&mut rig.controller, &mut controls).await.unwrap(),
        Some(TrackOutcome::Completed)
    );
}
