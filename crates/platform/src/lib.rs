//! Hardware Abstraction Layer (HAL) for the aria portable media player.
//!
//! This crate provides trait-based abstractions for every hardware
//! collaborator of the streaming core, enabling development and testing
//! without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (player crate)
//!         ↓
//! Feature Layers (playback, artwork)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (BSP / vendor HAL glue, out of tree)
//! ```
//!
//! # Abstraction Levels
//!
//! - [`Storage`] / [`File`] - removable-media file access
//! - [`AudioSink`] - audio output codec (play/pause/resume/stop/volume)
//! - [`ImageAccelerator`] - chunked hardware image decode engine
//! - [`ConvertResolver`] - black-box pixel-format conversion lookup
//! - [`Compositor`] - decoded-image blit onto the frame buffer
//! - [`TrackPanel`] - title/artist text panel
//! - [`ControlSurface`] - resolved touch-screen control events
//! - [`wait`] - cooperative wait-for-flag primitive
//!
//! # Features
//!
//! - `std`: Enable standard library support (desktop storage backend, mocks)
//! - `defmt`: Enable defmt logging derives

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(async_fn_in_trait)] // single-threaded target, Send bounds not needed

pub mod audio;
pub mod display;
pub mod image;
pub mod input;
pub mod storage;
pub mod wait;

#[cfg(any(test, feature = "std"))]
pub mod mocks;
#[cfg(any(test, feature = "std"))]
pub mod storage_local;

// Re-export main high-level traits
pub use audio::{AudioConfig, AudioSink};
pub use display::{Compositor, TrackPanel};
pub use image::{
    ChromaSubsampling, ConvertResolver, DecodeEvent, ImageAccelerator, RawImageInfo,
    ResolvedConvert, YcbcrToRgbFn,
};
pub use input::{ControlEvent, ControlSurface};
pub use storage::{File, Storage};
pub use wait::{BudgetExhausted, PollBudget};
