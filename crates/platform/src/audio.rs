//! Audio output codec abstraction
//!
//! The codec consumes a caller-owned PCM buffer circularly once
//! [`AudioSink::play`] has been called, and reports progress through
//! half-transfer and transfer-complete signals. Those signals arrive in
//! interrupt context and are therefore not part of this trait: the
//! interrupt glue forwards them to the playback session's
//! `on_half_transfer` / `on_transfer_complete` methods.

/// Audio output codec trait
pub trait AudioSink {
    /// Error type
    type Error: core::fmt::Debug;

    /// Initialize the codec with a stream configuration and initial volume.
    /// Failure here is fatal to the whole player.
    fn init(
        &mut self,
        config: AudioConfig,
        volume: u8,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Begin circular playback of `pcm`. The codec keeps consuming the
    /// buffer until [`stop`](AudioSink::stop); the caller refills halves
    /// in response to the transfer signals.
    fn play(&mut self, pcm: &[u8]) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Suspend playback, keeping the stream position.
    fn pause(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Resume a paused stream.
    fn resume(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Stop playback and power down the output path.
    fn stop(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Set volume (0-100)
    fn set_volume(
        &mut self,
        volume: u8,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// Audio stream configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u8,
    /// Bit depth (16 or 24)
    pub bit_depth: u8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            bit_depth: 16,
        }
    }
}
