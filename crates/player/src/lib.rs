//! Application layer of the aria portable media player.
//!
//! Ties the streaming core together per track: locate the directory's
//! assets ([`track`]), decode and place the cover, show the metadata, and
//! drive the playback poll loop while applying touch controls ([`app`]).
//! Hardware bring-up, directory traversal and drawing primitives stay
//! outside, behind the `platform` traits.
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(clippy::unwrap_used)]

pub mod app;
pub mod track;

pub use app::{
    load_track_meta, play_track, run_track, show_track_cover, track_step, TrackOutcome,
    COVER_Y_LIFT,
};
pub use track::{asset_path, TrackMeta, COVER_ASSET, DISPLAY_CHARS, META_ASSET, SONG_ASSET};
