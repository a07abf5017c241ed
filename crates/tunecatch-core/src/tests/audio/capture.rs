use crate::{
    AudioSource, CapturedAudio, MicrophoneCapturer,
    audio::chunk_buffer::{Append, ChunkBuffer, cap_samples},
};

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// WHAT: Chunks come back in the order they were appended
/// WHY: The WAV payload must be the recording in capture order
#[test]
fn given_appended_chunks_when_draining_then_capture_order_preserved() {
    // Given: A buffer with three distinct chunks
    let mut buf = ChunkBuffer::new(1_000);
    buf.push(&[0.1; 4]);
    buf.push(&[0.2; 4]);
    buf.push(&[0.3; 4]);

    // When: Draining
    let chunks = buf.drain();

    // Then: Order is unchanged
    let firsts: Vec<f32> = chunks.iter().map(|c| c[0]).collect();
    assert_eq!(firsts, vec![0.1, 0.2, 0.3]);
}

/// WHAT: Draining leaves the buffer empty
/// WHY: A stopped session must not leak audio into the next one
#[test]
fn given_filled_buffer_when_draining_then_buffer_empty() {
    // Given: A buffer holding audio
    let mut buf = ChunkBuffer::new(1_000);
    buf.push(&[0.5; 64]);
    buf.push(&[0.5; 64]);

    // When: Draining
    let drained = buf.drain();

    // Then: Everything moved out, nothing left behind
    assert_eq!(drained.len(), 2);
    assert_eq!(buf.chunk_count(), 0);
    assert_eq!(buf.sample_count(), 0);
}

/// WHAT: The cap truncates the chunk that crosses it and drops the rest
/// WHY: Bounded memory without rewriting already-captured audio
#[test]
fn given_buffer_near_cap_when_appending_then_tail_discarded() {
    // Given: A buffer with room for 10 samples, 8 used
    let mut buf = ChunkBuffer::new(10);
    assert_eq!(buf.push(&[1.0; 8]), Append::Appended);

    // When: Appending past the cap, then appending again
    let crossing = buf.push(&[2.0; 5]);
    let after = buf.push(&[3.0; 5]);

    // Then: Only the fitting prefix was kept and later audio is dropped
    assert_eq!(crossing, Append::CapReached);
    assert_eq!(after, Append::Dropped);
    assert_eq!(buf.sample_count(), 10);
    let chunks = buf.drain();
    assert_eq!(chunks, vec![vec![1.0; 8], vec![2.0; 2]]);
}

/// WHAT: Empty device callbacks add no chunk
/// WHY: A zero-length callback must not make an empty session look non-empty
#[test]
fn given_empty_callback_when_appending_then_no_chunk_stored() {
    // Given: An empty buffer
    let mut buf = ChunkBuffer::new(100);

    // When: Appending an empty slice
    let outcome = buf.push(&[]);

    // Then: Nothing stored
    assert_eq!(outcome, Append::Appended);
    assert_eq!(buf.chunk_count(), 0);
}

/// WHAT: A one second cap on a mono 48kHz device keeps exactly one second
/// WHY: The configured cap is in seconds, whatever the device format
#[test]
fn given_mono_48khz_and_one_second_cap_when_streaming_three_seconds_then_one_second_kept() {
    // Given: A buffer sized for one second of mono 48kHz
    let mut buf = ChunkBuffer::new(cap_samples(1, 48_000, 1));

    // When: 300 callbacks of 480 samples arrive (three seconds)
    for _ in 0..300 {
        buf.push(&[0.25; 480]);
    }

    // Then: Exactly 48,000 samples are kept
    assert_eq!(buf.sample_count(), 48_000);
    let kept: usize = buf.drain().iter().map(Vec::len).sum();
    assert_eq!(kept, 48_000);
}

/// WHAT: The sample cap scales with rate and channel count
/// WHY: Stereo and high-rate devices must not get a shorter or longer cap
#[test]
fn given_device_formats_when_sizing_cap_then_samples_cover_same_duration() {
    assert_eq!(cap_samples(1, 16_000, 1), 16_000);
    assert_eq!(cap_samples(2, 96_000, 2), 384_000);
    assert_eq!(cap_samples(0, 48_000, 2), 0);
}

/// WHAT: Reset clears audio and swaps in the next session's cap
/// WHY: The cap is only known once the device format is
#[test]
fn given_filled_buffer_when_resetting_then_empty_with_new_cap() {
    // Given: A buffer at its old cap
    let mut buf = ChunkBuffer::new(4);
    buf.push(&[1.0; 4]);

    // When: Resetting with a larger cap
    buf.reset(8);

    // Then: Empty, and eight samples fit before the cap
    assert_eq!(buf.chunk_count(), 0);
    assert_eq!(buf.push(&[2.0; 6]), Append::Appended);
    assert_eq!(buf.push(&[3.0; 6]), Append::CapReached);
    assert_eq!(buf.sample_count(), 8);
}

/// WHAT: Lock poison recovery preserves buffered chunks
/// WHY: Ensures audio data is never silently lost on mutex poison
#[test]
#[allow(clippy::unwrap_used, clippy::panic)]
fn given_poisoned_mutex_when_recovering_then_chunks_preserved() {
    // Given: A mutex poisoned by a panic while holding the lock
    let buf = Arc::new(Mutex::new(ChunkBuffer::new(1_000)));
    buf.lock().unwrap().push(&[0.5; 100]);
    let buf_clone = Arc::clone(&buf);

    let _ = std::thread::spawn(move || {
        let _guard = buf_clone.lock().unwrap();
        panic!("intentional panic to poison mutex");
    })
    .join();

    // When: Recovering from poisoned lock using unwrap_or_else
    let mut recovered = buf.lock().unwrap_or_else(|e| e.into_inner());

    // Then: Original chunk is fully preserved
    let chunks = recovered.drain();
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].iter().all(|&s| (s - 0.5).abs() < f32::EPSILON));
}

/// WHAT: Concurrent appends never exceed the cap or corrupt chunks
/// WHY: Validates Arc<Mutex<ChunkBuffer>> under callback contention
#[test]
#[allow(clippy::unwrap_used)]
fn given_concurrent_writers_when_appending_then_no_corruption() {
    // Given: Shared buffer simulating audio callback contention
    let buf = Arc::new(Mutex::new(ChunkBuffer::new(100_000)));
    let mut handles = vec![];

    // When: 4 threads append 1000 chunks of 48 samples each
    for i in 0..4u8 {
        let buf_clone = Arc::clone(&buf);
        handles.push(std::thread::spawn(move || {
            for _ in 0..1000 {
                let mut b = buf_clone.lock().unwrap_or_else(|e| e.into_inner());
                b.push(&[f32::from(i); 48]);
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    // Then: Cap respected and every stored chunk is homogeneous
    let mut b = buf.lock().unwrap();
    assert_eq!(b.sample_count(), 100_000);
    let chunks = b.drain();
    assert!(chunks.iter().all(|c| c.iter().all(|&s| s == c[0])));
}

/// WHAT: Captured audio reports its length from rate and channel count
/// WHY: Stop logging and payload sizing rely on it
#[test]
fn given_one_second_of_stereo_when_measuring_then_duration_one_second() {
    // Given: 48kHz stereo, 96,000 interleaved samples across two chunks
    let captured = CapturedAudio {
        chunks: vec![vec![0.0; 48_000], vec![0.0; 48_000]],
        sample_rate: 48_000,
        channels: 2,
    };

    // Then: One second, not empty, concatenation keeps every sample
    assert_eq!(captured.duration(), Duration::from_secs(1));
    assert!(!captured.is_empty());
    assert_eq!(captured.into_samples().len(), 96_000);
}

/// WHAT: A session whose chunks are all empty counts as empty
/// WHY: Such a session is skipped rather than uploaded
#[test]
fn given_only_empty_chunks_when_checking_then_captured_audio_is_empty() {
    let captured = CapturedAudio {
        chunks: vec![Vec::new(), Vec::new()],
        sample_rate: 48_000,
        channels: 1,
    };

    assert!(captured.is_empty());
    assert_eq!(captured.duration(), Duration::ZERO);
}

/// WHAT: A real microphone session opens, records and releases the device
/// WHY: stop() must drain every chunk and leave the buffer empty
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
fn given_default_microphone_when_recording_then_chunks_drained_on_stop() {
    // Given: A capturer on the default input device
    let mut capturer = MicrophoneCapturer::with_default_cap();

    // When: Recording for a quarter of a second
    capturer.start().unwrap();
    std::thread::sleep(Duration::from_millis(250));
    let captured = capturer.stop().unwrap();

    // Then: Audio came back in the device format and nothing is left buffered
    assert!(captured.sample_rate > 0);
    assert!(!captured.is_empty());
    assert_eq!(capturer.buffered_chunks(), 0);
}
