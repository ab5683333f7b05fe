//! Display compositor abstraction

/// Frame-buffer compositor trait.
///
/// Copies a decoded image into the frame buffer at a given position.
/// Drawing primitives and font rendering live behind the panel driver and
/// are not part of the streaming core.
pub trait Compositor {
    /// Error type
    type Error: core::fmt::Debug;

    /// Blit `width × height` pixels of `rgb` to `(x, y)`.
    ///
    /// `source_stride` is the width in pixels of one row of `rgb`, which may
    /// exceed `width` when the decoder padded rows to MCU granularity; the
    /// excess pixels of each row are skipped, not displayed.
    fn blit(
        &mut self,
        rgb: &[u8],
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        source_stride: u32,
    ) -> Result<(), Self::Error>;

    /// Screen width in pixels
    fn width(&self) -> u32;

    /// Screen height in pixels
    fn height(&self) -> u32;
}

/// Now-playing text panel.
///
/// Strings are already truncated for display by the caller.
pub trait TrackPanel {
    /// Show the track title line.
    fn show_title(&mut self, title: &str);

    /// Show the track artist line.
    fn show_artist(&mut self, artist: &str);
}
