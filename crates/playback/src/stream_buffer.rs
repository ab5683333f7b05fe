//! Two-half streaming buffer between slow block storage and the audio codec.
//!
//! `StreamBuffer<N>` holds `N` bytes of raw PCM split into two equal halves.
//! The codec consumes the whole buffer circularly via DMA; each time it
//! finishes a half it raises a transfer signal, and the freed half must be
//! refilled from storage before the codec wraps back around to it.
//!
//! Two concurrency domains touch the buffer:
//!
//! - **interrupt domain**: [`demand`](StreamBuffer::demand) — records which
//!   half was consumed. O(1), no I/O, no allocation.
//! - **poll domain**: [`tick`](StreamBuffer::tick) — services the recorded
//!   demand with a storage read. Storage reads have unbounded latency and
//!   must never run in the interrupt handler that signals demand.
//!
//! Each field is written from exactly one domain (`fill` is handed over:
//! the interrupt side sets `NeedsFirst`/`NeedsSecond`, the poll side sets
//! `Full`; `end` and `data` are poll-side only), which is the invariant that
//! makes the protocol work without locking. This implementation is **not**
//! itself interrupt-safe or `Send`: real interrupt glue must invoke the
//! demand methods under a critical section.
//!
//! If the poll loop fails to refill a half before the codec re-consumes it,
//! the codec replays stale bytes — an audible underrun. The buffer cannot
//! detect or recover from that; keeping `tick()` ahead of the consume rate
//! is a liveness requirement on the caller.

use platform::storage::File;

/// Default playback buffer size in bytes.
pub const PLAYBACK_BUFFER_BYTES: usize = 2048;

/// One half of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Half {
    /// Bytes `0 .. N/2`.
    First,
    /// Bytes `N/2 .. N`.
    Second,
}

/// Refill obligation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FillState {
    /// Both halves hold valid data; nothing to do.
    Full,
    /// The first half has been consumed and awaits a refill.
    NeedsFirst,
    /// The second half has been consumed and awaits a refill.
    NeedsSecond,
}

/// Which half, once handed to the codec, is known to be the last valid one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EndMarker {
    /// End of stream not yet observed.
    None,
    /// The first half holds the final bytes.
    First,
    /// The second half holds the final bytes.
    Second,
}

/// Fixed-size two-half PCM buffer with end-of-stream tracking.
///
/// `N` must be even. A half is only ever reported full after it has been
/// completely populated: genuine file bytes, with any tail past end-of-file
/// zeroed. No half is handed to the codec in a partially written state.
pub struct StreamBuffer<const N: usize> {
    data: [u8; N],
    fill: FillState,
    end: EndMarker,
}

impl<const N: usize> StreamBuffer<N> {
    /// Create a zero-filled buffer with no pending demand.
    ///
    /// `const` so a buffer can live in a `static` on the hardware target.
    pub const fn new() -> Self {
        Self {
            data: [0u8; N],
            fill: FillState::Full,
            end: EndMarker::None,
        }
    }

    /// Forget any pending demand and end marker. Called when a new track
    /// starts; does not zero the data (the priming fill overwrites it).
    pub fn reset(&mut self) {
        self.fill = FillState::Full;
        self.end = EndMarker::None;
    }

    /// Record that the codec consumed `half` (interrupt domain, O(1)).
    ///
    /// The demand stays set until [`tick`](StreamBuffer::tick) services it.
    /// If the codec consumes the *other* half before then, that demand
    /// replaces this one — the underrun case described in the module docs.
    pub fn demand(&mut self, half: Half) {
        self.fill = match half {
            Half::First => FillState::NeedsFirst,
            Half::Second => FillState::NeedsSecond,
        };
    }

    /// Current refill obligation.
    pub fn fill_state(&self) -> FillState {
        self.fill
    }

    /// Which half is known to be the last valid one, if any.
    pub fn end_marker(&self) -> EndMarker {
        self.end
    }

    /// The whole buffer, for handing to the codec at playback start.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Fill the entire buffer from `file` (track start). Zero-pads any
    /// shortfall and returns the number of genuine bytes read. Does not set
    /// the end marker — the first demanded refill observes end-of-file.
    pub async fn prime<F: File>(&mut self, file: &mut F) -> Result<usize, F::Error> {
        self.fill = FillState::Full;
        self.end = EndMarker::None;
        fill_from(file, &mut self.data).await
    }

    /// Service a pending refill, if any (poll domain).
    ///
    /// Reads `N/2` bytes from `file` into the demanded half, zero-padding a
    /// short tail. The refill that first observes end-of-file sets the end
    /// marker to that half; the marker is never moved afterwards. Returns
    /// the half that was refilled, or `None` when the buffer was full.
    pub async fn tick<F: File>(&mut self, file: &mut F) -> Result<Option<Half>, F::Error> {
        let half = match self.fill {
            FillState::Full => return Ok(None),
            FillState::NeedsFirst => Half::First,
            FillState::NeedsSecond => Half::Second,
        };

        let half_len = N / 2;
        let start = match half {
            Half::First => 0,
            Half::Second => half_len,
        };
        // start + half_len <= N for both halves; N is even.
        #[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
        let slot = &mut self.data[start..start + half_len];
        fill_from(file, slot).await?;

        if file.eof() && self.end == EndMarker::None {
            self.end = match half {
                Half::First => EndMarker::First,
                Half::Second => EndMarker::Second,
            };
        }
        self.fill = FillState::Full;
        Ok(Some(half))
    }
}

impl<const N: usize> Default for StreamBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read into `buf` until it is full or the file is exhausted, then zero the
/// remainder. Returns the number of genuine bytes read.
async fn fill_from<F: File>(file: &mut F, buf: &mut [u8]) -> Result<usize, F::Error> {
    let mut pos = 0;
    while pos < buf.len() {
        // pos < buf.len(), so buf[pos..] is a valid non-empty slice.
        #[allow(clippy::indexing_slicing)]
        let n = file.read(&mut buf[pos..]).await?;
        if n == 0 {
            break;
        }
        pos = pos.saturating_add(n);
    }
    // pos <= buf.len(); everything past the last genuine byte is zeroed so
    // the codec never sees stale data from a previous track.
    #[allow(clippy::indexing_slicing)]
    for byte in &mut buf[pos..] {
        *byte = 0;
    }
    Ok(pos)
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
    use platform::mocks::MemFile;

    #[tokio::test]
    async fn tick_with_full_buffer_is_noop() {
        let mut buffer: StreamBuffer<64> = StreamBuffer::new();
        let mut file = MemFile::new(&[1u8; 64]);
        assert_eq!(buffer.tick(&mut file).await.unwrap(), None);
        assert_eq!(buffer.fill_state(), FillState::Full);
    }

    #[tokio::test]
    async fn demanded_half_is_refilled_with_file_bytes() {
        let mut buffer: StreamBuffer<8> = StreamBuffer::new();
        let mut file = MemFile::new(&[9u8; 8]);
        buffer.demand(Half::Second);
        assert_eq!(buffer.tick(&mut file).await.unwrap(), Some(Half::Second));
        assert_eq!(&buffer.as_bytes()[4..], &[9u8; 4]);
        // First half untouched.
        assert_eq!(&buffer.as_bytes()[..4], &[0u8; 4]);
        assert_eq!(buffer.fill_state(), FillState::Full);
    }

    #[tokio::test]
    async fn short_read_zero_pads_and_marks_end() {
        // 2048-byte buffer, 900 bytes left in the file, refill of the first
        // half: 900 genuine bytes, 124 zeros, end marker on that half.
        let contents: Vec<u8> = (0..900u32).map(|i| (i % 251) as u8).collect();
        let mut file = MemFile::new(&contents);
        let mut buffer: StreamBuffer<2048> = StreamBuffer::new();
        buffer.demand(Half::First);
        buffer.tick(&mut file).await.unwrap();
        assert_eq!(&buffer.as_bytes()[..900], contents.as_slice());
        assert_eq!(&buffer.as_bytes()[900..1024], &[0u8; 124][..]);
        assert_eq!(buffer.end_marker(), EndMarker::First);
    }

    #[tokio::test]
    async fn exact_fit_read_at_eof_still_marks_end() {
        // The file ends exactly at the half boundary: no padding needed,
        // but the end marker must still land on this half.
        let mut file = MemFile::new(&[3u8; 512]);
        let mut buffer: StreamBuffer<1024> = StreamBuffer::new();
        buffer.demand(Half::First);
        buffer.tick(&mut file).await.unwrap();
        assert_eq!(buffer.end_marker(), EndMarker::First);
    }

    #[tokio::test]
    async fn end_marker_is_set_exactly_once() {
        let mut file = MemFile::new(&[5u8; 100]);
        let mut buffer: StreamBuffer<512> = StreamBuffer::new();
        buffer.demand(Half::First);
        buffer.tick(&mut file).await.unwrap();
        assert_eq!(buffer.end_marker(), EndMarker::First);
        // Further refills past EOF read zero bytes and must not move it.
        buffer.demand(Half::Second);
        buffer.tick(&mut file).await.unwrap();
        assert_eq!(buffer.end_marker(), EndMarker::First);
        assert_eq!(&buffer.as_bytes()[256..], &[0u8; 256][..]);
    }

    #[tokio::test]
    async fn prime_reads_full_buffer_and_reports_count() {
        let contents: Vec<u8> = (0..2048u32).map(|i| (i % 256) as u8).collect();
        let mut file = MemFile::new(&contents);
        let mut buffer: StreamBuffer<2048> = StreamBuffer::new();
        let n = buffer.prime(&mut file).await.unwrap();
        assert_eq!(n, 2048);
        assert_eq!(buffer.as_bytes(), contents.as_slice());
        assert_eq!(buffer.end_marker(), EndMarker::None);
    }

    #[tokio::test]
    async fn prime_zero_pads_small_file_without_end_marker() {
        let mut file = MemFile::new(b"tiny");
        let mut buffer: StreamBuffer<16> = StreamBuffer::new();
        let n = buffer.prime(&mut file).await.unwrap();
        assert_eq!(n, 4);
        assert_eq!(&buffer.as_bytes()[..4], b"tiny");
        assert_eq!(&buffer.as_bytes()[4..], &[0u8; 12][..]);
        // End-of-file is observed by the first demanded refill, not here.
        assert_eq!(buffer.end_marker(), EndMarker::None);
    }

    #[tokio::test]
    async fn reset_clears_demand_and_marker() {
        let mut file = MemFile::new(&[1u8; 4]);
        let mut buffer: StreamBuffer<16> = StreamBuffer::new();
        buffer.demand(Half::First);
        buffer.tick(&mut file).await.unwrap();
        assert_eq!(buffer.end_marker(), EndMarker::First);
        buffer.reset();
        assert_eq!(buffer.end_marker(), EndMarker::None);
        assert_eq!(buffer.fill_state(), FillState::Full);
    }
}
