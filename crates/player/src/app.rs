//! Per-track application flow.
//!
//! For every track directory the player shows the cover, shows the
//! metadata, starts the raw PCM stream and then sits in the cooperative
//! poll loop: service buffer refills, apply touch controls, yield. A
//! missing or broken asset degrades only itself — blank cover, blank text,
//! or a skipped track — and never takes the player down. Only codec
//! bring-up failure is fatal, and that happens before any track is played.

use embassy_futures::yield_now;

use artwork::{convert_decoded, decode_cover, show_cover};
use platform::audio::AudioSink;
use platform::display::{Compositor, TrackPanel};
use platform::image::{ConvertResolver, ImageAccelerator};
use platform::input::{ControlEvent, ControlSurface};
use platform::storage::{File, Storage};
use platform::wait::PollBudget;
use playback::{AudioController, StartError};

use crate::track::{asset_path, TrackMeta, COVER_ASSET, META_ASSET, META_BYTES, SONG_ASSET};

/// Pixels the cover is raised above centre, leaving room for the transport
/// controls on the lower part of the screen.
pub const COVER_Y_LIFT: u32 = 100;

/// How a track's playback ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrackOutcome {
    /// The stream ran to its end.
    Completed,
    /// The user skipped, or streaming was cut short by a storage fault.
    Skipped,
    /// The audio file was missing, unreadable or empty; nothing played.
    NoAudio,
}

/// Decode and display a track's cover art.
///
/// Every failure — missing file, unsupported image, engine fault, blit
/// fault — leaves the previous screen content in place and returns; cover
/// problems never block playback.
pub async fn show_track_cover<S, X, R, C>(
    storage: &mut S,
    accel: &mut X,
    resolver: &R,
    compositor: &mut C,
    cover_buf: &mut [u8],
    budget: PollBudget,
    dir: &str,
) where
    S: Storage,
    X: ImageAccelerator,
    R: ConvertResolver,
    C: Compositor,
{
    let Some(path) = asset_path(dir, COVER_ASSET) else {
        return;
    };
    let Ok(file) = storage.open_file(path.as_str()).await else {
        #[cfg(feature = "defmt")]
        defmt::warn!("no cover in {=str}, leaving screen as is", dir);
        return;
    };
    match decode_cover(file, resolver, accel, cover_buf, budget).await {
        Ok(image) => {
            let info = image.info;
            let rgb = convert_decoded(cover_buf, &image);
            if show_cover(compositor, rgb, &info, COVER_Y_LIFT).is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("cover blit failed for {=str}", dir);
            }
        }
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("cover decode failed for {=str}", dir);
        }
    }
}

/// Load and parse `meta.txt`, blank on any failure.
pub async fn load_track_meta<S: Storage>(storage: &mut S, dir: &str) -> TrackMeta {
    let Some(path) = asset_path(dir, META_ASSET) else {
        return TrackMeta::blank();
    };
    let Ok(mut file) = storage.open_file(path.as_str()).await else {
        return TrackMeta::blank();
    };

    let mut buf = [0u8; META_BYTES];
    let mut pos = 0;
    while pos < buf.len() {
        // pos < buf.len(), so buf[pos..] is a valid non-empty slice.
        #[allow(clippy::indexing_slicing)]
        match file.read(&mut buf[pos..]).await {
            Ok(0) => break,
            Ok(n) => pos = pos.saturating_add(n),
            Err(_) => return TrackMeta::blank(),
        }
    }
    // pos <= buf.len() by the loop bound.
    #[allow(clippy::indexing_slicing)]
    TrackMeta::parse(&buf[..pos])
}

/// One iteration of the playback poll loop.
///
/// Services a pending buffer refill, then applies at most one control
/// event. Returns `Some(outcome)` when the track is over. Exposed
/// separately from [`run_track`] so a deterministic harness can interleave
/// steps with simulated transfer signals.
pub async fn track_step<A, F, U>(
    controller: &mut AudioController<A, F>,
    controls: &mut U,
) -> Result<Option<TrackOutcome>, A::Error>
where
    A: AudioSink,
    F: File,
    U: ControlSurface,
{
    match controller.tick().await {
        Ok(true) => {}
        Ok(false) => return Ok(Some(TrackOutcome::Completed)),
        Err(_e) => {
            // A failed refill would loop stale audio forever; treat the
            // track as over rather than aborting the player.
            #[cfg(feature = "defmt")]
            defmt::warn!("storage fault mid-track, skipping");
            return Ok(Some(TrackOutcome::Skipped));
        }
    }

    match controls.poll_event() {
        Some(ControlEvent::PausePlay) => controller.pause_resume().await?,
        Some(ControlEvent::Skip) => return Ok(Some(TrackOutcome::Skipped)),
        Some(ControlEvent::VolumeUp) => {
            controller.volume_up().await?;
        }
        Some(ControlEvent::VolumeDown) => {
            controller.volume_down().await?;
        }
        None => {}
    }
    Ok(None)
}

/// Drive the poll loop until the track ends, then stop the codec and drop
/// the track's file handle.
///
/// Codec errors propagate; storage and control handling is absorbed by
/// [`track_step`].
pub async fn run_track<A, F, U>(
    controller: &mut AudioController<A, F>,
    controls: &mut U,
) -> Result<TrackOutcome, A::Error>
where
    A: AudioSink,
    F: File,
    U: ControlSurface,
{
    loop {
        if let Some(outcome) = track_step(controller, controls).await? {
            controller.stop().await?;
            return Ok(outcome);
        }
        yield_now().await;
    }
}

/// Play one track directory end to end: cover, metadata, audio.
///
/// # Errors
///
/// Only codec errors escape; every per-asset failure degrades to the
/// corresponding [`TrackOutcome`] or a blank asset.
#[allow(clippy::too_many_arguments)] // one collaborator per hardware unit
pub async fn play_track<S, A, X, R, C, P, U>(
    storage: &mut S,
    controller: &mut AudioController<A, S::File>,
    accel: &mut X,
    resolver: &R,
    compositor: &mut C,
    panel: &mut P,
    controls: &mut U,
    cover_buf: &mut [u8],
    cover_budget: PollBudget,
    dir: &str,
) -> Result<TrackOutcome, A::Error>
where
    S: Storage,
    A: AudioSink,
    X: ImageAccelerator,
    R: ConvertResolver,
    C: Compositor,
    P: TrackPanel,
    U: ControlSurface,
{
    show_track_cover(storage, accel, resolver, compositor, cover_buf, cover_budget, dir).await;

    let meta = load_track_meta(storage, dir).await;
    panel.show_title(meta.title.as_str());
    panel.show_artist(meta.artist.as_str());

    let Some(path) = asset_path(dir, SONG_ASSET) else {
        return Ok(TrackOutcome::NoAudio);
    };
    let Ok(file) = storage.open_file(path.as_str()).await else {
        #[cfg(feature = "defmt")]
        defmt::warn!("no audio in {=str}, skipping track", dir);
        return Ok(TrackOutcome::NoAudio);
    };
    match controller.start(file).await {
        Ok(()) => {}
        Err(StartError::Codec(e)) => return Err(e),
        Err(_) => return Ok(TrackOutcome::NoAudio),
    }

    run_track(controller, controls).await
}
