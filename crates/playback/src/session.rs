//! Playback session state machine.
//!
//! `AudioController` owns the codec handle, the two-half stream buffer and
//! the open audio file for the current track, and tracks the session state:
//!
//! ```text
//! Idle --init()--> Ready --start(file)--> Playing --last half consumed--> Finished
//!                    ^                       |
//!                    +-------- stop() -------+
//! ```
//!
//! The transfer-signal methods ([`on_half_transfer`] / [`on_transfer_complete`])
//! are the interrupt-domain edge: O(1) flag updates invoked by real codec
//! interrupt glue or by a test harness. All storage I/O happens in
//! [`tick`], the poll-domain edge. See the `stream_buffer` module docs for
//! the single-writer rules that make the split sound.
//!
//! [`on_half_transfer`]: AudioController::on_half_transfer
//! [`on_transfer_complete`]: AudioController::on_transfer_complete
//! [`tick`]: AudioController::tick

use platform::audio::{AudioConfig, AudioSink};
use platform::storage::File;

use crate::stream_buffer::{EndMarker, Half, StreamBuffer, PLAYBACK_BUFFER_BYTES};
use crate::volume::Volume;

/// Current session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Codec not initialised yet.
    Idle,
    /// Codec ready; no track loaded.
    Ready,
    /// A track is streaming.
    Playing,
    /// The final half of the track has been consumed by the codec.
    Finished,
}

/// Errors returned by [`AudioController::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError<SE, AE> {
    /// The codec has not been initialised (`init` not called or failed).
    NotInitialised,
    /// The priming fill read zero bytes; there is nothing to play.
    EmptyTrack,
    /// Storage error during the priming fill.
    Storage(SE),
    /// Codec error while starting playback.
    Codec(AE),
}

/// Playback session: codec + stream buffer + current track file.
///
/// Created once at boot; `start`/`stop` reset the per-track state. Dropping
/// the file handle on `stop` is what closes the previous track before the
/// next one opens — sessions never overlap.
pub struct AudioController<A: AudioSink, F: File> {
    sink: A,
    buffer: StreamBuffer<PLAYBACK_BUFFER_BYTES>,
    file: Option<F>,
    volume: Volume,
    paused: bool,
    state: SessionState,
}

impl<A: AudioSink, F: File> AudioController<A, F> {
    /// Wrap a codec handle. The controller starts `Idle`; call
    /// [`init`](AudioController::init) before anything else.
    pub fn new(sink: A) -> Self {
        Self {
            sink,
            buffer: StreamBuffer::new(),
            file: None,
            volume: Volume::default_level(),
            paused: false,
            state: SessionState::Idle,
        }
    }

    /// Bring up the codec. Failure is fatal to the player; the controller
    /// stays `Idle` and every later `start` is refused.
    pub async fn init(&mut self, config: AudioConfig) -> Result<(), A::Error> {
        self.sink.init(config, self.volume.get()).await?;
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Start playing `file`.
    ///
    /// Resets the per-track state, primes the whole buffer synchronously,
    /// un-pauses a paused codec, and begins playback — but only if the
    /// prime read at least one byte.
    ///
    /// # Errors
    ///
    /// [`StartError::NotInitialised`] before `init`; [`StartError::EmptyTrack`]
    /// when the file yields no data (the handle is dropped and the session
    /// stays out of `Playing`).
    pub async fn start(&mut self, mut file: F) -> Result<(), StartError<F::Error, A::Error>> {
        if self.state == SessionState::Idle {
            return Err(StartError::NotInitialised);
        }

        self.buffer.reset();
        let bytes = self
            .buffer
            .prime(&mut file)
            .await
            .map_err(StartError::Storage)?;
        if bytes == 0 {
            self.file = None;
            return Err(StartError::EmptyTrack);
        }
        self.file = Some(file);

        if self.paused {
            self.pause_resume().await.map_err(StartError::Codec)?;
        }
        self.sink
            .play(self.buffer.as_bytes())
            .await
            .map_err(StartError::Codec)?;
        self.state = SessionState::Playing;
        self.paused = false;
        Ok(())
    }

    /// Stop playback, drop the current track's file handle and return to
    /// `Ready`. Safe to call in any state after `init`.
    pub async fn stop(&mut self) -> Result<(), A::Error> {
        self.sink.stop().await?;
        self.file = None;
        if self.state != SessionState::Idle {
            self.state = SessionState::Ready;
        }
        Ok(())
    }

    /// Toggle pause/resume. A pure toggle: two consecutive calls return to
    /// the original state.
    pub async fn pause_resume(&mut self) -> Result<(), A::Error> {
        if self.paused {
            self.sink.resume().await?;
            self.paused = false;
        } else {
            self.sink.pause().await?;
            self.paused = true;
        }
        Ok(())
    }

    /// `true` while paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Step the volume up by 5 (saturating at 100) and push it to the
    /// codec. Returns the new percentage.
    pub async fn volume_up(&mut self) -> Result<u8, A::Error> {
        let level = self.volume.up();
        self.sink.set_volume(level).await?;
        Ok(level)
    }

    /// Step the volume down by 5 (saturating at 5) and push it to the
    /// codec. Returns the new percentage.
    pub async fn volume_down(&mut self) -> Result<u8, A::Error> {
        let level = self.volume.down();
        self.sink.set_volume(level).await?;
        Ok(level)
    }

    /// Current volume percentage.
    pub fn volume(&self) -> u8 {
        self.volume.get()
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The stream buffer (e.g. for wiring up the codec's DMA address).
    pub fn buffer(&self) -> &StreamBuffer<PLAYBACK_BUFFER_BYTES> {
        &self.buffer
    }

    /// The wrapped codec handle.
    pub fn sink(&self) -> &A {
        &self.sink
    }

    /// Codec signal: the first half of the buffer has been consumed
    /// (interrupt domain, O(1)).
    ///
    /// Records the refill demand; if the first half was marked as the last
    /// valid one, the session is finished and no refill will be attempted.
    pub fn on_half_transfer(&mut self) {
        if self.state == SessionState::Playing {
            self.buffer.demand(Half::First);
            if self.buffer.end_marker() == EndMarker::First {
                self.state = SessionState::Finished;
            }
        }
    }

    /// Codec signal: the second half of the buffer has been consumed
    /// (interrupt domain, O(1)).
    pub fn on_transfer_complete(&mut self) {
        if self.state == SessionState::Playing {
            self.buffer.demand(Half::Second);
            if self.buffer.end_marker() == EndMarker::Second {
                self.state = SessionState::Finished;
            }
        }
    }

    /// Poll-domain step: service any pending refill.
    ///
    /// Returns `true` while the track should keep playing; `false` once the
    /// session is `Finished` (the caller moves on to the next track). Must
    /// be called often enough to beat the codec's wrap-around; see the
    /// underrun note in the `stream_buffer` docs.
    pub async fn tick(&mut self) -> Result<bool, F::Error> {
        match self.state {
            SessionState::Playing => {
                if let Some(file) = self.file.as_mut() {
                    self.buffer.tick(file).await?;
                }
                Ok(true)
            }
            SessionState::Finished => Ok(false),
            SessionState::Idle | SessionState::Ready => Ok(true),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use platform::mocks::{MemFile, MockAudioSink, MockSinkError};

    fn controller() -> AudioController<MockAudioSink, MemFile> {
        AudioController::new(MockAudioSink::new())
    }

    async fn ready_controller() -> AudioController<MockAudioSink, MemFile> {
        let mut c = controller();
        c.init(AudioConfig::default()).await.unwrap();
        c
    }

    #[tokio::test]
    async fn init_failure_keeps_controller_idle() {
        let mut sink = MockAudioSink::new();
        sink.fail_init = true;
        let mut c: AudioController<_, MemFile> = AudioController::new(sink);
        assert_eq!(
            c.init(AudioConfig::default()).await,
            Err(MockSinkError::InitRefused)
        );
        assert_eq!(c.state(), SessionState::Idle);
        let err = c.start(MemFile::new(&[1u8; 64])).await.unwrap_err();
        assert!(matches!(err, StartError::NotInitialised));
    }

    #[tokio::test]
    async fn start_primes_buffer_and_plays() {
        let mut c = ready_controller().await;
        c.start(MemFile::new(&[0x11u8; 4096])).await.unwrap();
        assert_eq!(c.state(), SessionState::Playing);
        assert_eq!(c.sink().play_calls(), 1);
        assert_eq!(c.sink().played_len(), PLAYBACK_BUFFER_BYTES);
    }

    #[tokio::test]
    async fn start_on_empty_file_is_refused() {
        let mut c = ready_controller().await;
        let err = c.start(MemFile::new(&[])).await.unwrap_err();
        assert!(matches!(err, StartError::EmptyTrack));
        assert_eq!(c.state(), SessionState::Ready);
        assert_eq!(c.sink().play_calls(), 0);
    }

    #[tokio::test]
    async fn start_unpauses_a_paused_codec() {
        let mut c = ready_controller().await;
        c.pause_resume().await.unwrap();
        assert!(c.is_paused());
        c.start(MemFile::new(&[1u8; 4096])).await.unwrap();
        assert!(!c.is_paused());
        assert!(!c.sink().is_paused());
    }

    #[tokio::test]
    async fn pause_resume_twice_restores_state() {
        let mut c = ready_controller().await;
        let before = c.is_paused();
        c.pause_resume().await.unwrap();
        assert_eq!(c.is_paused(), !before);
        c.pause_resume().await.unwrap();
        assert_eq!(c.is_paused(), before);
    }

    #[tokio::test]
    async fn volume_steps_reach_codec() {
        let mut c = ready_controller().await;
        assert_eq!(c.volume_up().await.unwrap(), 25);
        assert_eq!(c.volume_down().await.unwrap(), 20);
        assert_eq!(c.sink().volume_history, vec![25, 20]);
    }

    #[tokio::test]
    async fn session_finishes_only_when_last_half_is_consumed() {
        // 3072 bytes: prime fills 2048, one refill of the first half reads
        // the final 1024 and hits EOF exactly; the session must not finish
        // until the codec reports consuming that same half.
        let mut c = ready_controller().await;
        c.start(MemFile::new(&[7u8; 3072])).await.unwrap();

        c.on_half_transfer();
        assert!(c.tick().await.unwrap());
        assert_eq!(c.state(), SessionState::Playing);

        // Codec consumes the second half (still genuine data from prime).
        c.on_transfer_complete();
        assert!(c.tick().await.unwrap());
        assert_eq!(c.state(), SessionState::Playing);

        // Codec wraps and consumes the first half — the marked one.
        c.on_half_transfer();
        assert_eq!(c.state(), SessionState::Finished);
        assert!(!c.tick().await.unwrap());
    }

    #[tokio::test]
    async fn transfer_signals_ignored_when_not_playing() {
        let mut c = ready_controller().await;
        c.on_half_transfer();
        c.on_transfer_complete();
        assert_eq!(c.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn stop_returns_to_ready_and_drops_track() {
        let mut c = ready_controller().await;
        c.start(MemFile::new(&[1u8; 4096])).await.unwrap();
        c.stop().await.unwrap();
        assert_eq!(c.state(), SessionState::Ready);
        assert!(!c.sink().is_playing());
        // A new track can start immediately.
        c.start(MemFile::new(&[2u8; 4096])).await.unwrap();
        assert_eq!(c.state(), SessionState::Playing);
    }
}
