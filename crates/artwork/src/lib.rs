//! Cover-art decode coordination — chunked hardware decode fed from storage.
//!
//! Bridges the hardware image decode engine's callback protocol to the
//! storage layer ([`decode::DecodeSession`]), tracks true vs. MCU-rounded
//! geometry ([`info::ImageInfo`]) and computes on-screen placement for the
//! padded output ([`compose`]).
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(clippy::unwrap_used)]

pub mod compose;
pub mod decode;
pub mod info;

pub use compose::{convert_decoded, placement, show_cover, Placement};
pub use decode::{
    decode_cover, CoverError, DecodeSession, DecodedImage, SessionError, CHUNK_BYTES,
    OUT_WINDOW_BYTES,
};
pub use info::ImageInfo;
