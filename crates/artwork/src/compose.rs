//! Compositor bridge: placing a decoded, MCU-padded image on screen.
//!
//! The decoded buffer is laid out on *rounded* dimensions, the screen shows
//! the *true* ones. The bridge therefore feeds the compositor two different
//! widths: `source_stride` (rounded — how far to step to reach the next
//! source row) and `width` (true — how many pixels of each row to show).
//! Destination placement likewise uses only the true dimensions.

use platform::display::Compositor;

use crate::decode::DecodedImage;
use crate::info::ImageInfo;

/// Where and how to blit a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Placement {
    /// Destination x: image centred horizontally.
    pub x: u32,
    /// Destination y: image centred vertically, lifted by `y_lift`.
    pub y: u32,
    /// Displayed width — the true image width.
    pub width: u32,
    /// Displayed height — the true image height.
    pub height: u32,
    /// Source row width — the MCU-rounded width; the compositor skips the
    /// trailing padding pixels of each row.
    pub source_stride: u32,
}

/// Centre `info` on a `screen_w × screen_h` screen, raised by `y_lift`
/// pixels to leave room for the transport controls below.
///
/// An image larger than the screen is pinned to the top-left edge rather
/// than given a negative origin.
pub fn placement(info: &ImageInfo, screen_w: u32, screen_h: u32, y_lift: u32) -> Placement {
    Placement {
        x: screen_w.saturating_sub(info.width) / 2,
        y: (screen_h.saturating_sub(info.height) / 2).saturating_sub(y_lift),
        width: info.width,
        height: info.height,
        source_stride: info.padded_width,
    }
}

/// Run the image's cached conversion routine over the decoded bytes.
///
/// Splits `buf` into the decoded region (front) and the conversion output
/// region (rest), converts, and returns the converted region. Mirrors the
/// in-place layout the hardware pipeline uses: decoded MCUs and displayable
/// pixels share one frame-sized buffer.
pub fn convert_decoded<'a>(buf: &'a mut [u8], image: &DecodedImage) -> &'a [u8] {
    let split = image.bytes_decoded.min(buf.len());
    // split <= buf.len() by the min above.
    #[allow(clippy::indexing_slicing)]
    let (decoded, out) = buf.split_at_mut(split);
    let produced = (image.convert.func)(decoded, out, 0, image.convert.mcu_blocks);
    let produced = produced.min(out.len());
    // produced <= out.len() by the min above.
    #[allow(clippy::indexing_slicing)]
    &out[..produced]
}

/// Blit a converted image onto the screen through `compositor`, centred
/// and lifted by `y_lift`.
pub fn show_cover<C: Compositor>(
    compositor: &mut C,
    rgb: &[u8],
    info: &ImageInfo,
    y_lift: u32,
) -> Result<(), C::Error> {
    let place = placement(info, compositor.width(), compositor.height(), y_lift);
    compositor.blit(
        rgb,
        place.x,
        place.y,
        place.width,
        place.height,
        place.source_stride,
    )
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
    use platform::image::{ChromaSubsampling, RawImageInfo};
    use platform::mocks::MockCompositor;

    fn info(w: u32, h: u32) -> ImageInfo {
        ImageInfo::from_header(RawImageInfo {
            width: w,
            height: h,
            subsampling: ChromaSubsampling::Ycbcr420,
        })
    }

    #[test]
    fn placement_centres_on_true_dimensions() {
        // 100 px wide image pads to 112, but centring must use 100:
        // (480 - 100) / 2 = 190, not (480 - 112) / 2 = 184.
        let place = placement(&info(100, 90), 480, 800, 100);
        assert_eq!(place.x, 190);
        assert_eq!(place.y, (800 - 90) / 2 - 100);
        assert_eq!((place.width, place.height), (100, 90));
    }

    #[test]
    fn stride_uses_rounded_width() {
        let place = placement(&info(100, 90), 480, 800, 0);
        assert_eq!(place.source_stride, 112);
        assert_eq!(place.source_stride - place.width, 12);
    }

    #[test]
    fn aligned_image_has_no_stride_padding() {
        let place = placement(&info(160, 128), 480, 800, 0);
        assert_eq!(place.source_stride, 160);
        assert_eq!(place.width, 160);
    }

    #[test]
    fn oversized_image_pins_to_origin() {
        let place = placement(&info(600, 900), 480, 800, 100);
        assert_eq!((place.x, place.y), (0, 0));
    }

    #[test]
    fn show_cover_forwards_placement_to_blit() {
        let mut compositor = MockCompositor::new(480, 800);
        let rgb = [0u8; 64];
        show_cover(&mut compositor, &rgb, &info(100, 90), 100).unwrap();
        let blit = compositor.blits[0];
        assert_eq!(blit.x, 190);
        assert_eq!(blit.width, 100);
        assert_eq!(blit.source_stride, 112);
        assert_eq!(blit.rgb_len, 64);
    }
}
