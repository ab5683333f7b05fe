//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits for use
//! in unit and integration tests. Everything here is deterministic: the
//! audio sink and compositor record what they were handed, the storage is an
//! in-memory file map, and the image accelerator replays a scripted event
//! sequence in place of real decode interrupts.

#![cfg(any(test, feature = "std"))]

use std::collections::VecDeque;

use crate::audio::{AudioConfig, AudioSink};
use crate::display::{Compositor, TrackPanel};
use crate::image::{DecodeEvent, ImageAccelerator, RawImageInfo};
use crate::image::{ChromaSubsampling, ConvertResolver, ResolvedConvert};
use crate::input::{ControlEvent, ControlSurface};
use crate::storage::{File, Storage};

// ── In-memory storage ───────────────────────────────────────────────────────

/// Error type for the in-memory storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemStorageError {
    /// No file registered under the requested path.
    NotFound,
}

impl core::fmt::Display for MemStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "file not found"),
        }
    }
}

/// An open in-memory file.
#[derive(Debug)]
pub struct MemFile {
    data: Vec<u8>,
    pos: usize,
}

impl MemFile {
    /// Wrap `data` as a standalone file handle positioned at 0.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
        }
    }
}

impl File for MemFile {
    type Error = MemStorageError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = self.data.len().saturating_sub(self.pos);
        let n = buf.len().min(remaining);
        // n <= remaining and n <= buf.len() by construction.
        #[allow(clippy::indexing_slicing)]
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos.saturating_add(n)]);
        self.pos = self.pos.saturating_add(n);
        Ok(n)
    }

    async fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        // usize is at least 32 bits on all supported targets; test data is small.
        #[allow(clippy::cast_possible_truncation)]
        {
            self.pos = pos as usize;
        }
        Ok(pos)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }
}

/// In-memory `Storage` backed by a path → bytes map.
#[derive(Default)]
pub struct MemStorage {
    files: Vec<(String, Vec<u8>)>,
}

impl MemStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `path`, replacing any previous content.
    pub fn insert(&mut self, path: &str, bytes: &[u8]) {
        if let Some(slot) = self.files.iter_mut().find(|(p, _)| p == path) {
            slot.1 = bytes.to_vec();
        } else {
            self.files.push((path.to_string(), bytes.to_vec()));
        }
    }
}

impl Storage for MemStorage {
    type Error = MemStorageError;
    type File = MemFile;

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, data)| MemFile::new(data))
            .ok_or(MemStorageError::NotFound)
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        Ok(self.files.iter().any(|(p, _)| p == path))
    }
}

// ── Audio sink ──────────────────────────────────────────────────────────────

/// Error type for [`MockAudioSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSinkError {
    /// Scripted init failure (hardware bring-up refused).
    InitRefused,
}

/// Mock audio codec recording every command it receives.
pub struct MockAudioSink {
    /// Fail the next `init` call when set.
    pub fail_init: bool,
    inited: bool,
    playing: bool,
    paused: bool,
    volume: u8,
    play_calls: usize,
    played_len: usize,
    /// Every volume value pushed via `set_volume`, in order.
    pub volume_history: Vec<u8>,
}

impl MockAudioSink {
    /// Create a new mock sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fail_init: false,
            inited: false,
            playing: false,
            paused: false,
            volume: 0,
            play_calls: 0,
            played_len: 0,
            volume_history: Vec::new(),
        }
    }

    /// `true` after a successful `init`.
    pub fn is_inited(&self) -> bool {
        self.inited
    }

    /// `true` while a stream is playing (and not stopped).
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// `true` while paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Last volume value received.
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Number of `play` calls.
    pub fn play_calls(&self) -> usize {
        self.play_calls
    }

    /// Byte length of the last `play` buffer.
    pub fn played_len(&self) -> usize {
        self.played_len
    }
}

impl Default for MockAudioSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for MockAudioSink {
    type Error = MockSinkError;

    async fn init(&mut self, _config: AudioConfig, volume: u8) -> Result<(), Self::Error> {
        if self.fail_init {
            return Err(MockSinkError::InitRefused);
        }
        self.inited = true;
        self.volume = volume;
        Ok(())
    }

    async fn play(&mut self, pcm: &[u8]) -> Result<(), Self::Error> {
        self.playing = true;
        self.play_calls = self.play_calls.saturating_add(1);
        self.played_len = pcm.len();
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), Self::Error> {
        self.paused = true;
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), Self::Error> {
        self.paused = false;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        self.playing = false;
        Ok(())
    }

    async fn set_volume(&mut self, volume: u8) -> Result<(), Self::Error> {
        self.volume = volume;
        self.volume_history.push(volume);
        Ok(())
    }
}

// ── Image accelerator ───────────────────────────────────────────────────────

/// Scripted image decode engine.
///
/// Replays a fixed [`DecodeEvent`] sequence from `poll`, writing a fill
/// pattern into the armed output window on every `OutputReady`. Records
/// every input chunk it was handed (via `start` and `supply`) so tests can
/// check byte continuity across rewinds.
pub struct ScriptedAccelerator {
    script: VecDeque<DecodeEvent>,
    /// Every input chunk delivered, in order (`start` first).
    pub inputs: Vec<Vec<u8>>,
    /// Output capacity announced at `start`.
    pub out_capacity: usize,
    /// Total decoded bytes written across all windows.
    pub bytes_written: usize,
    fill: u8,
}

impl ScriptedAccelerator {
    /// Create an engine that will replay `script` in order.
    #[must_use]
    pub fn new(script: &[DecodeEvent]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            inputs: Vec::new(),
            out_capacity: 0,
            bytes_written: 0,
            fill: 0xA5,
        }
    }
}

impl ImageAccelerator for ScriptedAccelerator {
    type Error = core::convert::Infallible;

    fn start(&mut self, input: &[u8], out_capacity: usize) -> Result<(), Self::Error> {
        self.inputs.push(input.to_vec());
        self.out_capacity = out_capacity;
        Ok(())
    }

    fn poll(&mut self, output: &mut [u8]) -> Result<Option<DecodeEvent>, Self::Error> {
        let event = self.script.pop_front();
        if let Some(DecodeEvent::OutputReady { len }) = event {
            // The window the coordinator armed bounds what the engine may
            // write; a script asking for more than the window reports the
            // clamped amount, like real hardware stopping at the window end.
            let n = len.min(output.len());
            for byte in output.iter_mut().take(n) {
                *byte = self.fill;
            }
            self.bytes_written = self.bytes_written.saturating_add(n);
            return Ok(Some(DecodeEvent::OutputReady { len: n }));
        }
        Ok(event)
    }

    fn supply(&mut self, input: &[u8]) -> Result<(), Self::Error> {
        self.inputs.push(input.to_vec());
        Ok(())
    }
}

// ── Conversion lookup ───────────────────────────────────────────────────────

/// Conversion routine used by [`FixedResolver`]: copies nothing, reports the
/// whole output region as written. Stands in for the hardware-resolved
/// YCbCr→RGB table entry.
pub fn passthrough_convert(_input: &[u8], output: &mut [u8], _block: u32, _count: u32) -> usize {
    output.len()
}

/// A [`ConvertResolver`] with a fixed answer.
pub struct FixedResolver {
    supported: bool,
}

impl FixedResolver {
    /// Resolver that supports every configuration.
    #[must_use]
    pub fn supporting_all() -> Self {
        Self { supported: true }
    }

    /// Resolver that rejects every configuration (unsupported image).
    #[must_use]
    pub fn rejecting_all() -> Self {
        Self { supported: false }
    }
}

impl ConvertResolver for FixedResolver {
    fn resolve(&self, info: &RawImageInfo) -> Option<ResolvedConvert> {
        if !self.supported {
            return None;
        }
        let (gw, gh) = match info.subsampling {
            ChromaSubsampling::Ycbcr420 => (16, 16),
            ChromaSubsampling::Ycbcr422 => (16, 8),
            ChromaSubsampling::Ycbcr444 => (8, 8),
        };
        // Caller passes MCU-rounded dimensions, so both divisions are exact.
        let blocks = info
            .width
            .checked_div(gw)
            .unwrap_or(0)
            .saturating_mul(info.height.checked_div(gh).unwrap_or(0));
        Some(ResolvedConvert {
            func: passthrough_convert,
            mcu_blocks: blocks,
        })
    }
}

// ── Compositor & panel ──────────────────────────────────────────────────────

/// One recorded `blit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blit {
    /// Destination x in pixels.
    pub x: u32,
    /// Destination y in pixels.
    pub y: u32,
    /// Displayed width in pixels.
    pub width: u32,
    /// Displayed height in pixels.
    pub height: u32,
    /// Source row width in pixels.
    pub source_stride: u32,
    /// Length of the source byte slice.
    pub rgb_len: usize,
}

/// Mock compositor recording every blit.
pub struct MockCompositor {
    width: u32,
    height: u32,
    /// Every `blit` call received, in order.
    pub blits: Vec<Blit>,
}

impl MockCompositor {
    /// Create a mock screen of the given pixel dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            blits: Vec::new(),
        }
    }
}

impl Compositor for MockCompositor {
    type Error = core::convert::Infallible;

    fn blit(
        &mut self,
        rgb: &[u8],
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        source_stride: u32,
    ) -> Result<(), Self::Error> {
        self.blits.push(Blit {
            x,
            y,
            width,
            height,
            source_stride,
            rgb_len: rgb.len(),
        });
        Ok(())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Mock now-playing panel recording the text it was given.
#[derive(Default)]
pub struct MockPanel {
    /// Titles shown, in order.
    pub titles: Vec<String>,
    /// Artists shown, in order.
    pub artists: Vec<String>,
}

impl MockPanel {
    /// Create an empty panel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackPanel for MockPanel {
    fn show_title(&mut self, title: &str) {
        self.titles.push(title.to_string());
    }

    fn show_artist(&mut self, artist: &str) {
        self.artists.push(artist.to_string());
    }
}

// ── Control surface ─────────────────────────────────────────────────────────

/// Scripted control surface: each `poll_event` pops one scripted slot
/// (`None` = no touch during that poll). An exhausted script keeps
/// returning `None`.
pub struct MockControls {
    script: VecDeque<Option<ControlEvent>>,
}

impl MockControls {
    /// Create a surface replaying `script`, one slot per poll.
    #[must_use]
    pub fn new(script: &[Option<ControlEvent>]) -> Self {
        Self {
            script: script.iter().copied().collect(),
        }
    }

    /// Create a surface that never reports a touch.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            script: VecDeque::new(),
        }
    }
}

impl ControlSurface for MockControls {
    fn poll_event(&mut self) -> Option<ControlEvent> {
        self.script.pop_front().flatten()
    }
}
