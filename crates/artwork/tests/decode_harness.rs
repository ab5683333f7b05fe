//! Full decode runs against the scripted engine — the deterministic stand-in
//! for the interrupt-driven hardware callback sequence.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use artwork::{decode_cover, CoverError, CHUNK_BYTES};
use platform::image::{ChromaSubsampling, DecodeEvent, RawImageInfo};
use platform::mocks::{FixedResolver, MemFile, ScriptedAccelerator};
use platform::wait::PollBudget;

fn header(w: u32, h: u32) -> DecodeEvent {
    DecodeEvent::HeaderReady(RawImageInfo {
        width: w,
        height: h,
        subsampling: ChromaSubsampling::Ycbcr420,
    })
}

fn stream_bytes(n: usize) -> Vec<u8> {
    (0..n as u32).map(|i| (i % 247) as u8).collect()
}

#[tokio::test]
async fn full_decode_with_input_refill_and_rewind() {
    // 12 kB stream: the first 10 kB chunk is supplied at start; the engine
    // consumes 9 kB of it and asks for more. The refill must re-deliver the
    // unconsumed 1 kB together with the remaining 2 kB.
    let data = stream_bytes(CHUNK_BYTES + 2_000);
    let mut accel = ScriptedAccelerator::new(&[
        header(100, 90),
        DecodeEvent::NeedInput { consumed: 9_000 },
        DecodeEvent::OutputReady { len: 10_000 },
        DecodeEvent::OutputReady { len: 6_000 },
        DecodeEvent::Complete,
    ]);
    let mut output = vec![0u8; 40_000];

    let image = decode_cover(
        MemFile::new(&data),
        FixedResolver::supporting_all(),
        &mut accel,
        &mut output,
        PollBudget::bounded(16),
    )
    .await
    .unwrap();

    assert_eq!(image.bytes_decoded, 16_000);
    assert_eq!((image.info.width, image.info.height), (100, 90));
    assert_eq!((image.info.padded_width, image.info.padded_height), (112, 96));
    assert_eq!(image.convert.mcu_blocks, 7 * 6);

    // Chunk continuity: start chunk is bytes 0..10000, the refill begins at
    // byte 9000 — the engine's unconsumed kilobyte is delivered again.
    assert_eq!(accel.inputs.len(), 2);
    assert_eq!(accel.inputs[0], &data[..CHUNK_BYTES]);
    assert_eq!(accel.inputs[1], &data[9_000..]);
}

#[tokio::test]
async fn decoded_output_lands_in_consecutive_windows() {
    let data = stream_bytes(4_000);
    let mut accel = ScriptedAccelerator::new(&[
        header(64, 64),
        DecodeEvent::OutputReady { len: 10_000 },
        DecodeEvent::OutputReady { len: 10_000 },
        DecodeEvent::Complete,
    ]);
    let mut output = vec![0u8; 20_000];

    let image = decode_cover(
        MemFile::new(&data),
        FixedResolver::supporting_all(),
        &mut accel,
        &mut output,
        PollBudget::bounded(16),
    )
    .await
    .unwrap();

    assert_eq!(image.bytes_decoded, 20_000);
    // The scripted engine fills every window byte it is handed.
    assert!(output.iter().all(|&b| b == 0xA5));
}

#[tokio::test]
async fn truncated_stream_reaches_complete_without_overrun() {
    // The engine is driven to completion by the harness even though the
    // compressed stream is cut short; output capacity is tiny and the
    // windows must clamp to it rather than write past the end.
    let data = stream_bytes(600);
    let mut accel = ScriptedAccelerator::new(&[
        header(100, 90),
        DecodeEvent::OutputReady { len: 10_000 },
        DecodeEvent::OutputReady { len: 10_000 },
        DecodeEvent::Complete,
    ]);
    let mut output = vec![0u8; 1_000];

    let image = decode_cover(
        MemFile::new(&data),
        FixedResolver::supporting_all(),
        &mut accel,
        &mut output,
        PollBudget::bounded(16),
    )
    .await
    .unwrap();

    // First window is the whole kilobyte, the second is empty.
    assert_eq!(image.bytes_decoded, 1_000);
    assert_eq!(accel.bytes_written, 1_000);
}

#[tokio::test]
async fn unsupported_configuration_skips_the_cover() {
    let data = stream_bytes(200);
    let mut accel = ScriptedAccelerator::new(&[header(64, 64), DecodeEvent::Complete]);
    let mut output = vec![0u8; 1_000];

    let err = decode_cover(
        MemFile::new(&data),
        FixedResolver::rejecting_all(),
        &mut accel,
        &mut output,
        PollBudget::bounded(16),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoverError::UnsupportedImage));
}

#[tokio::test]
async fn completion_without_header_is_an_error() {
    let data = stream_bytes(200);
    let mut accel = ScriptedAccelerator::new(&[DecodeEvent::Complete]);
    let mut output = vec![0u8; 1_000];

    let err = decode_cover(
        MemFile::new(&data),
        FixedResolver::supporting_all(),
        &mut accel,
        &mut output,
        PollBudget::bounded(16),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoverError::HeaderMissing));
}

#[tokio::test]
async fn engine_that_never_completes_exhausts_the_budget() {
    // An empty script polls as "no event pending" forever; the bounded
    // budget turns the production-unbounded wait into a reported stall.
    let data = stream_bytes(200);
    let mut accel = ScriptedAccelerator::new(&[]);
    let mut output = vec![0u8; 1_000];

    let err = decode_cover(
        MemFile::new(&data),
        FixedResolver::supporting_all(),
        &mut accel,
        &mut output,
        PollBudget::bounded(8),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoverError::Stalled));
}
