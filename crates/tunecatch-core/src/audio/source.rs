use crate::CoreResult;

use std::time::Duration;

/// Audio drained from a finished recording session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedAudio {
    /// Chunks in the order the device produced them (interleaved samples).
    pub chunks: Vec<Vec<f32>>,
    /// Device sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

impl CapturedAudio {
    /// True when the session produced no audio at all.
    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(Vec::is_empty)
    }

    /// Total interleaved sample count across all chunks.
    pub fn sample_count(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Recorded length.
    pub fn duration(&self) -> Duration {
        let frames_per_sec = self.sample_rate as u64 * self.channels.max(1) as u64;
        if frames_per_sec == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.sample_count() as f64 / frames_per_sec as f64)
    }

    /// Concatenates the chunks into one contiguous sample stream.
    pub fn into_samples(self) -> Vec<f32> {
        let mut samples = Vec::with_capacity(self.sample_count());
        for chunk in self.chunks {
            samples.extend(chunk);
        }
        samples
    }
}

/// A capture device that can be opened and closed once per session.
///
/// Implementations own the capture handle and the chunk buffer. `stop`
/// must not return until the device has finished delivering chunks, and
/// must leave the buffer empty.
pub trait AudioSource: Send {
    /// Acquires the device and begins appending chunks.
    fn start(&mut self) -> CoreResult<()>;

    /// Releases the device and drains every buffered chunk.
    fn stop(&mut self) -> CoreResult<CapturedAudio>;

    /// Number of chunks currently buffered.
    fn buffered_chunks(&self) -> usize;
}
