//! Hardware image decode engine abstraction.
//!
//! The real engine is interrupt-driven: a decode is launched with one input
//! chunk and an output window, and the engine then calls back when it needs
//! more input, when the stream header has been parsed, when a window of
//! decoded bytes is ready, and when the image is complete. This module
//! models those callbacks as [`DecodeEvent`]s delivered through
//! [`ImageAccelerator::poll`]:
//!
//! - hardware glue records each interrupt callback into a small event
//!   queue and drains it from `poll` (interrupt side is O(1), no I/O);
//! - the scripted mock in [`crate::mocks`] synthesizes the same events
//!   deterministically for host tests.
//!
//! The decode coordinator that consumes these events lives in the `artwork`
//! crate; it never talks to the engine registers directly.

/// Chroma subsampling mode of the compressed image.
///
/// Determines the engine's minimum coded unit (MCU) granularity and with it
/// the dimension rounding applied to the decoded output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChromaSubsampling {
    /// 4:2:0 — chroma sampled at half rate both ways; 16×16 MCU.
    Ycbcr420,
    /// 4:2:2 — chroma sampled at half rate horizontally; 16×8 MCU.
    Ycbcr422,
    /// 4:4:4 — no chroma subsampling; 8×8 MCU.
    Ycbcr444,
}

/// Image geometry as reported by the engine's header parse, before any
/// MCU rounding has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawImageInfo {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Chroma subsampling mode.
    pub subsampling: ChromaSubsampling,
}

/// Pixel-format conversion routine resolved by the decode engine's support
/// library for a given chroma configuration.
///
/// `(input, output, block_index, block_count) -> bytes_written`. The routine
/// is hardware-resolved and treated as a black box by the core; only the
/// handle is cached and later applied to the decoded bytes.
pub type YcbcrToRgbFn = fn(&[u8], &mut [u8], u32, u32) -> usize;

/// A cached conversion lookup result: the routine plus the total number of
/// MCU blocks in the image it was resolved for.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedConvert {
    /// Conversion routine for this chroma configuration.
    pub func: YcbcrToRgbFn,
    /// Total MCU block count of the image.
    pub mcu_blocks: u32,
}

/// Conversion lookup collaborator.
///
/// Resolution happens once per image, after the header parse, against the
/// MCU-rounded geometry. An unsupported configuration resolves to `None`.
pub trait ConvertResolver {
    /// Resolve the conversion routine for `info` (rounded dimensions).
    fn resolve(&self, info: &RawImageInfo) -> Option<ResolvedConvert>;
}

impl<T: ConvertResolver> ConvertResolver for &T {
    fn resolve(&self, info: &RawImageInfo) -> Option<ResolvedConvert> {
        (*self).resolve(info)
    }
}

/// One engine callback, reported in the order the hardware raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeEvent {
    /// The engine exhausted its input window; `consumed` is how many bytes
    /// of the last-supplied chunk it actually used (lookahead may leave a
    /// tail unconsumed). Answer with [`ImageAccelerator::supply`].
    NeedInput {
        /// Bytes of the last-supplied chunk the engine consumed.
        consumed: usize,
    },
    /// The compressed stream's header has been parsed.
    HeaderReady(RawImageInfo),
    /// `len` decoded bytes were written to the current output window.
    /// The driving loop re-arms the engine with the next window.
    OutputReady {
        /// Decoded bytes produced into the window.
        len: usize,
    },
    /// The image is fully decoded.
    Complete,
}

/// Chunked hardware image decoder.
pub trait ImageAccelerator {
    /// Error type
    type Error: core::fmt::Debug;

    /// Launch a decode with the first input chunk. `out_capacity` is the
    /// total number of output bytes the caller can accept; the engine must
    /// never be armed with a window beyond it.
    fn start(&mut self, input: &[u8], out_capacity: usize) -> Result<(), Self::Error>;

    /// Deliver at most one pending engine event, writing any decoded bytes
    /// into `output` (the currently armed window). Returns `None` when no
    /// event is pending yet.
    fn poll(&mut self, output: &mut [u8]) -> Result<Option<DecodeEvent>, Self::Error>;

    /// Re-arm the input stage with the next chunk, in response to
    /// [`DecodeEvent::NeedInput`].
    fn supply(&mut self, input: &[u8]) -> Result<(), Self::Error>;
}
