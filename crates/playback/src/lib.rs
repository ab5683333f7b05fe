//! Audio streaming core — double-buffered PCM feed from removable storage.
//!
//! Raw PCM tracks are streamed into a two-half buffer that a fixed-latency
//! codec consumes circularly. Codec transfer signals (interrupt domain)
//! record refill demand; the cooperative poll loop services it with storage
//! reads. [`session::AudioController`] wraps the protocol in a play / pause
//! / stop / volume state machine.
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(clippy::unwrap_used)]

pub mod session;
pub mod stream_buffer;
pub mod volume;

pub use session::{AudioController, SessionState, StartError};
pub use stream_buffer::{EndMarker, FillState, Half, StreamBuffer, PLAYBACK_BUFFER_BYTES};
pub use volume::Volume;
