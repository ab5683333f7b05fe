//! Decoded image geometry.
//!
//! The decode engine emits whole MCUs, so its output buffer is laid out on
//! dimensions rounded up to the MCU granularity of the chroma subsampling
//! mode. What must actually be *shown* is the pre-rounding geometry. Both
//! are kept side by side here; collapsing them into one pair of fields is
//! how off-by-padding placement bugs happen.

use platform::image::{ChromaSubsampling, RawImageInfo};

/// Image geometry after the header parse: true (display) dimensions plus
/// the MCU-rounded dimensions describing the decoder's output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageInfo {
    /// True image width in pixels — what gets displayed.
    pub width: u32,
    /// True image height in pixels — what gets displayed.
    pub height: u32,
    /// Width of one decoded row in pixels (rounded up to MCU granularity).
    pub padded_width: u32,
    /// Number of decoded rows (rounded up to MCU granularity).
    pub padded_height: u32,
    /// Chroma subsampling mode of the compressed stream.
    pub subsampling: ChromaSubsampling,
}

impl ImageInfo {
    /// Build from header-parse geometry, applying the MCU rounding rule:
    ///
    /// | Subsampling | Width to | Height to |
    /// |-------------|----------|-----------|
    /// | 4:2:0       | 16       | 16        |
    /// | 4:2:2       | 16       | 8         |
    /// | 4:4:4       | 8        | 8         |
    pub fn from_header(raw: RawImageInfo) -> Self {
        let (gw, gh) = mcu_granularity(raw.subsampling);
        Self {
            width: raw.width,
            height: raw.height,
            padded_width: round_up(raw.width, gw),
            padded_height: round_up(raw.height, gh),
            subsampling: raw.subsampling,
        }
    }

    /// Horizontal padding pixels appended to each decoded row by MCU
    /// rounding. This is the source-side stride adjustment the compositor
    /// bridge skips per row.
    pub fn trailing_pixels(&self) -> u32 {
        self.padded_width.saturating_sub(self.width)
    }

    /// The rounded geometry, as handed to the conversion lookup (which
    /// operates on the decoder's physical output layout).
    pub fn padded(&self) -> RawImageInfo {
        RawImageInfo {
            width: self.padded_width,
            height: self.padded_height,
            subsampling: self.subsampling,
        }
    }
}

/// MCU granularity (width, height) for a subsampling mode.
fn mcu_granularity(subsampling: ChromaSubsampling) -> (u32, u32) {
    match subsampling {
        ChromaSubsampling::Ycbcr420 => (16, 16),
        ChromaSubsampling::Ycbcr422 => (16, 8),
        ChromaSubsampling::Ycbcr444 => (8, 8),
    }
}

/// Round `v` up to the next multiple of `granularity`.
#[allow(clippy::arithmetic_side_effects)] // granularity ∈ {8, 16}; v is a pixel dimension, far from u32::MAX
fn round_up(v: u32, granularity: u32) -> u32 {
    let rem = v % granularity;
    if rem == 0 {
        v
    } else {
        v + (granularity - rem)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    fn info(w: u32, h: u32, subsampling: ChromaSubsampling) -> ImageInfo {
        ImageInfo::from_header(RawImageInfo {
            width: w,
            height: h,
            subsampling,
        })
    }

    #[test]
    fn ycbcr420_rounds_both_dimensions_to_sixteen() {
        let i = info(100, 90, ChromaSubsampling::Ycbcr420);
        assert_eq!((i.padded_width, i.padded_height), (112, 96));
        assert_eq!((i.width, i.height), (100, 90));
    }

    #[test]
    fn ycbcr422_rounds_width_sixteen_height_eight() {
        let i = info(100, 90, ChromaSubsampling::Ycbcr422);
        assert_eq!((i.padded_width, i.padded_height), (112, 96));
        let i = info(97, 89, ChromaSubsampling::Ycbcr422);
        assert_eq!((i.padded_width, i.padded_height), (112, 96));
    }

    #[test]
    fn ycbcr444_rounds_both_dimensions_to_eight() {
        let i = info(100, 90, ChromaSubsampling::Ycbcr444);
        assert_eq!((i.padded_width, i.padded_height), (104, 96));
    }

    #[test]
    fn aligned_dimensions_are_left_alone() {
        let i = info(160, 128, ChromaSubsampling::Ycbcr420);
        assert_eq!((i.padded_width, i.padded_height), (160, 128));
        assert_eq!(i.trailing_pixels(), 0);
    }

    #[test]
    fn padded_dimensions_are_always_on_the_mcu_grid() {
        for w in 1..64u32 {
            for h in 1..64u32 {
                let i = info(w, h, ChromaSubsampling::Ycbcr420);
                assert_eq!(i.padded_width % 16, 0);
                assert_eq!(i.padded_height % 16, 0);
                let i = info(w, h, ChromaSubsampling::Ycbcr422);
                assert_eq!(i.padded_width % 16, 0);
                assert_eq!(i.padded_height % 8, 0);
                let i = info(w, h, ChromaSubsampling::Ycbcr444);
                assert_eq!(i.padded_width % 8, 0);
                assert_eq!(i.padded_height % 8, 0);
            }
        }
    }

    #[test]
    fn trailing_pixels_is_the_row_padding() {
        let i = info(100, 96, ChromaSubsampling::Ycbcr420);
        assert_eq!(i.trailing_pixels(), 12);
    }
}
