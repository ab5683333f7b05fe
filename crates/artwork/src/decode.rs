//! Cover-image decode coordination.
//!
//! The hardware decode engine pulls compressed input in chunks and pushes
//! decoded output in windows, entirely through callbacks. [`DecodeSession`]
//! owns the storage side of that conversation: a read-ahead chunk buffer,
//! the absolute file offset the next chunk must come from, and the running
//! decode state. Its four callback methods mirror the engine's callbacks
//! one-to-one and are equally invokable by real interrupt glue or by a test
//! harness — they contain no engine-specific code.
//!
//! [`decode_cover`] is the top-level blocking call: it primes the engine
//! with the first chunk, then pumps engine events into the session until
//! the image is complete.
//!
//! # Input rewind
//!
//! The engine may retain internal lookahead across calls: when it reports
//! having consumed only `K` of the `N` bytes last supplied, the next chunk
//! must start at the old position plus `K`, re-delivering the `N − K`
//! unconsumed bytes together with fresh data. Skipping or duplicating a
//! single byte here corrupts the whole rest of the image.

use platform::image::{ConvertResolver, DecodeEvent, ImageAccelerator, RawImageInfo, ResolvedConvert};
use platform::storage::File;
use platform::wait::PollBudget;

use crate::info::ImageInfo;

/// Read-ahead chunk size for compressed input, matching the largest read
/// the storage layer services in one go.
pub const CHUNK_BYTES: usize = 10_000;

/// Size of each output window armed on the engine.
pub const OUT_WINDOW_BYTES: usize = 10_000;

/// Errors from the storage-facing session callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError<E> {
    /// I/O error from the underlying file.
    Storage(E),
    /// The conversion lookup does not support this image configuration.
    UnsupportedImage,
}

/// Errors from a full [`decode_cover`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverError<SE, AE> {
    /// I/O error from the underlying file.
    Storage(SE),
    /// Error reported by the decode engine itself.
    Accelerator(AE),
    /// The conversion lookup does not support this image configuration.
    /// The cover is skipped; playback continues.
    UnsupportedImage,
    /// The engine completed without ever parsing a header.
    HeaderMissing,
    /// The poll budget ran out before the engine completed.
    Stalled,
}

impl<SE, AE> From<SessionError<SE>> for CoverError<SE, AE> {
    fn from(e: SessionError<SE>) -> Self {
        match e {
            SessionError::Storage(inner) => Self::Storage(inner),
            SessionError::UnsupportedImage => Self::UnsupportedImage,
        }
    }
}

/// A fully decoded image: byte count, geometry and the cached conversion
/// routine for turning the decoded MCUs into displayable pixels.
#[derive(Debug, Clone, Copy)]
pub struct DecodedImage {
    /// Total decoded bytes produced by the engine.
    pub bytes_decoded: usize,
    /// Image geometry (true and MCU-rounded dimensions).
    pub info: ImageInfo,
    /// Conversion routine resolved for this image's configuration.
    pub convert: ResolvedConvert,
}

/// Per-image decode state: storage cursor, chunk buffer, parsed geometry
/// and completion flag. Lives for exactly one decode call.
///
/// The chunk buffer is 10 kB; on the hardware target a session lives in a
/// static, not on a task stack.
pub struct DecodeSession<F, R> {
    file: F,
    resolver: R,
    chunk: [u8; CHUNK_BYTES],
    /// Bytes in the last-supplied chunk.
    supplied: usize,
    /// Absolute file position of the byte after the supplied chunk.
    file_offset: u64,
    info: Option<ImageInfo>,
    convert: Option<ResolvedConvert>,
    bytes_decoded: usize,
    complete: bool,
}

impl<F: File, R: ConvertResolver> DecodeSession<F, R> {
    /// Start a session reading from the beginning of `file`.
    pub fn new(file: F, resolver: R) -> Self {
        Self {
            file,
            resolver,
            chunk: [0u8; CHUNK_BYTES],
            supplied: 0,
            file_offset: 0,
            info: None,
            convert: None,
            bytes_decoded: 0,
            complete: false,
        }
    }

    /// Read the first chunk (offset 0) and return it for the engine launch.
    pub async fn prime(&mut self) -> Result<&[u8], SessionError<F::Error>> {
        self.read_chunk().await
    }

    /// Engine callback: it consumed `consumed` bytes of the last chunk and
    /// wants more input.
    ///
    /// Rewinds by the unconsumed tail (if any) before reading, so those
    /// bytes are re-delivered together with fresh data. `consumed` greater
    /// than the supplied length is a hardware contract violation and is
    /// treated as fully consumed.
    pub async fn need_more_input(
        &mut self,
        consumed: usize,
    ) -> Result<&[u8], SessionError<F::Error>> {
        if consumed != self.supplied {
            let unconsumed = self.supplied.saturating_sub(consumed) as u64;
            self.file_offset = self.file_offset.saturating_sub(unconsumed);
            self.file
                .seek(self.file_offset)
                .await
                .map_err(SessionError::Storage)?;
        }
        self.read_chunk().await
    }

    /// Engine callback: the stream header has been parsed.
    ///
    /// Applies MCU rounding and resolves the conversion routine for the
    /// rounded geometry. Invoked once per image.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnsupportedImage`] when no conversion routine exists
    /// for this configuration; the decode is abandoned and the cover
    /// skipped.
    pub fn header_parsed(&mut self, raw: RawImageInfo) -> Result<ImageInfo, SessionError<F::Error>> {
        let info = ImageInfo::from_header(raw);
        let convert = self
            .resolver
            .resolve(&info.padded())
            .ok_or(SessionError::UnsupportedImage)?;
        self.info = Some(info);
        self.convert = Some(convert);
        Ok(info)
    }

    /// Engine callback: `len` decoded bytes landed in the current window.
    pub fn output_ready(&mut self, len: usize) {
        self.bytes_decoded = self.bytes_decoded.saturating_add(len);
    }

    /// Engine callback: the image is fully decoded.
    pub fn decode_complete(&mut self) {
        self.complete = true;
    }

    /// Total decoded bytes so far; doubles as the output window cursor.
    pub fn bytes_decoded(&self) -> usize {
        self.bytes_decoded
    }

    /// `true` once [`decode_complete`](DecodeSession::decode_complete) ran.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Parsed geometry, once the header callback has run.
    pub fn info(&self) -> Option<ImageInfo> {
        self.info
    }

    /// Cached conversion routine, once the header callback has run.
    pub fn convert(&self) -> Option<ResolvedConvert> {
        self.convert
    }

    /// Read the next full chunk at the current offset.
    async fn read_chunk(&mut self) -> Result<&[u8], SessionError<F::Error>> {
        let mut pos = 0;
        while pos < self.chunk.len() {
            // pos < chunk.len(), so chunk[pos..] is a valid non-empty slice.
            #[allow(clippy::indexing_slicing)]
            let n = self
                .file
                .read(&mut self.chunk[pos..])
                .await
                .map_err(SessionError::Storage)?;
            if n == 0 {
                break;
            }
            pos = pos.saturating_add(n);
        }
        self.supplied = pos;
        self.file_offset = self.file_offset.saturating_add(pos as u64);
        // pos <= chunk.len() by the loop bound.
        #[allow(clippy::indexing_slicing)]
        Ok(&self.chunk[..pos])
    }
}

/// Decode one cover image to completion.
///
/// Primes the engine with the first chunk of `file` and a fixed-size output
/// window into `output`, then pumps engine events into the session: input
/// refills (with rewind), the header parse, output-window advances and the
/// completion flag. Idle polls spend one `budget` step each, so a test
/// harness can bound the wait while production waits indefinitely for the
/// hardware.
///
/// The engine is never armed with a window extending past `output`; a
/// stream that decodes to more than `output.len()` bytes simply stops
/// producing (clamped windows), it does not overrun.
pub async fn decode_cover<F, R, A>(
    file: F,
    resolver: R,
    accel: &mut A,
    output: &mut [u8],
    mut budget: PollBudget,
) -> Result<DecodedImage, CoverError<F::Error, A::Error>>
where
    F: File,
    R: ConvertResolver,
    A: ImageAccelerator,
{
    let mut session = DecodeSession::new(file, resolver);

    let first = session.prime().await.map_err(CoverError::from)?;
    accel
        .start(first, output.len())
        .map_err(CoverError::Accelerator)?;

    while !session.is_complete() {
        let window = out_window(output, session.bytes_decoded());
        match accel.poll(window).map_err(CoverError::Accelerator)? {
            Some(DecodeEvent::NeedInput { consumed }) => {
                let chunk = session
                    .need_more_input(consumed)
                    .await
                    .map_err(CoverError::from)?;
                accel.supply(chunk).map_err(CoverError::Accelerator)?;
            }
            Some(DecodeEvent::HeaderReady(raw)) => {
                session.header_parsed(raw).map_err(CoverError::from)?;
            }
            Some(DecodeEvent::OutputReady { len }) => session.output_ready(len),
            Some(DecodeEvent::Complete) => session.decode_complete(),
            None => budget.step().await.map_err(|_| CoverError::Stalled)?,
        }
    }

    let info = session.info().ok_or(CoverError::HeaderMissing)?;
    let convert = session.convert().ok_or(CoverError::HeaderMissing)?;
    Ok(DecodedImage {
        bytes_decoded: session.bytes_decoded(),
        info,
        convert,
    })
}

/// The output window starting at `cursor`, clamped to the caller's buffer.
fn out_window(output: &mut [u8], cursor: usize) -> &mut [u8] {
    let start = cursor.min(output.len());
    let end = cursor.saturating_add(OUT_WINDOW_BYTES).min(output.len());
    // start <= end <= output.len() by construction.
    #[allow(clippy::indexing_slicing)]
    &mut output[start..end]
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use platform::image::ChromaSubsampling;
    use platform::mocks::{FixedResolver, MemFile};

    fn bytes(n: usize) -> Vec<u8> {
        (0..n as u32).map(|i| (i % 241) as u8).collect()
    }

    #[tokio::test]
    async fn prime_reads_from_offset_zero() {
        let data = bytes(64);
        let mut session = DecodeSession::new(MemFile::new(&data), FixedResolver::supporting_all());
        let chunk = session.prime().await.unwrap();
        assert_eq!(chunk, data.as_slice());
    }

    #[tokio::test]
    async fn partial_consumption_rewinds_the_cursor() {
        // 30-byte file read in full; the engine consumed only 20 bytes, so
        // the next chunk must begin at byte 20 — nothing skipped, nothing
        // duplicated.
        let data = bytes(30);
        let mut session = DecodeSession::new(MemFile::new(&data), FixedResolver::supporting_all());
        session.prime().await.unwrap();
        let chunk = session.need_more_input(20).await.unwrap();
        assert_eq!(chunk, &data[20..]);
    }

    #[tokio::test]
    async fn full_consumption_reads_straight_ahead() {
        let data = bytes(CHUNK_BYTES + 500);
        let mut session = DecodeSession::new(MemFile::new(&data), FixedResolver::supporting_all());
        let first_len = session.prime().await.unwrap().len();
        assert_eq!(first_len, CHUNK_BYTES);
        let chunk = session.need_more_input(CHUNK_BYTES).await.unwrap();
        assert_eq!(chunk, &data[CHUNK_BYTES..]);
    }

    #[tokio::test]
    async fn repeated_rewinds_keep_byte_continuity() {
        let data = bytes(90);
        let mut session = DecodeSession::new(MemFile::new(&data), FixedResolver::supporting_all());
        session.prime().await.unwrap();
        // Engine consumes 40 of 90, then 30 of 50, then the rest.
        let chunk = session.need_more_input(40).await.unwrap();
        assert_eq!(chunk, &data[40..]);
        let chunk = session.need_more_input(30).await.unwrap();
        assert_eq!(chunk, &data[70..]);
    }

    #[tokio::test]
    async fn header_parse_rounds_and_resolves() {
        let mut session =
            DecodeSession::new(MemFile::new(&bytes(8)), FixedResolver::supporting_all());
        let info = session
            .header_parsed(RawImageInfo {
                width: 100,
                height: 90,
                subsampling: ChromaSubsampling::Ycbcr420,
            })
            .unwrap();
        assert_eq!((info.padded_width, info.padded_height), (112, 96));
        // Block count resolved against the rounded geometry: 7 × 6 MCUs.
        assert_eq!(session.convert().unwrap().mcu_blocks, 42);
    }

    #[tokio::test]
    async fn unsupported_configuration_is_reported_not_fatal() {
        let mut session =
            DecodeSession::new(MemFile::new(&bytes(8)), FixedResolver::rejecting_all());
        let err = session
            .header_parsed(RawImageInfo {
                width: 64,
                height: 64,
                subsampling: ChromaSubsampling::Ycbcr444,
            })
            .unwrap_err();
        assert_eq!(err, SessionError::UnsupportedImage);
    }

    #[test]
    fn output_ready_accumulates_the_cursor() {
        let mut session = DecodeSession::new(MemFile::new(&[]), FixedResolver::supporting_all());
        session.output_ready(4000);
        session.output_ready(2500);
        assert_eq!(session.bytes_decoded(), 6500);
        assert!(!session.is_complete());
        session.decode_complete();
        assert!(session.is_complete());
    }

    #[test]
    fn out_window_is_clamped_to_capacity() {
        let mut buf = [0u8; 12_000];
        assert_eq!(out_window(&mut buf, 0).len(), OUT_WINDOW_BYTES);
        assert_eq!(out_window(&mut buf, 10_000).len(), 2_000);
        assert_eq!(out_window(&mut buf, 12_000).len(), 0);
        assert_eq!(out_window(&mut buf, 20_000).len(), 0);
    }
}
