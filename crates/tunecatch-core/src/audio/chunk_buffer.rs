/// Default recording cap in seconds.
///
/// **Memory footprint at max capacity:**
/// - 48,000 Hz * 2 ch * 300 s * 4 bytes/f32 = ~115MB
/// - This is a hard upper bound; recognition clips are seconds long
pub(crate) const DEFAULT_MAX_RECORDING_SECS: u32 = 300;

/// Interleaved samples that make up `seconds` of audio in the given device
/// format.
pub(crate) fn cap_samples(seconds: u32, sample_rate: u32, channels: u16) -> usize {
    seconds as usize * sample_rate as usize * usize::from(channels)
}

/// Result of appending one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Append {
    /// The whole chunk was stored.
    Appended,
    /// The cap was hit by this chunk; anything past it was discarded.
    CapReached,
    /// The cap had already been hit; nothing was stored.
    Dropped,
}

/// Append-only, ordered store of the chunks produced by one recording
/// session.
///
/// Chunks are never reordered or rewritten. Once `max_samples` is reached
/// further audio is discarded rather than evicting older chunks.
#[derive(Debug)]
pub(crate) struct ChunkBuffer {
    chunks: Vec<Vec<f32>>,
    sample_count: usize,
    max_samples: usize,
}

impl ChunkBuffer {
    pub(crate) fn new(max_samples: usize) -> Self {
        Self {
            chunks: Vec::new(),
            sample_count: 0,
            max_samples,
        }
    }

    pub(crate) fn push(&mut self, data: &[f32]) -> Append {
        if data.is_empty() {
            return Append::Appended;
        }

        let room = self.max_samples.saturating_sub(self.sample_count);
        if room == 0 {
            return Append::Dropped;
        }

        let take = data.len().min(room);
        self.chunks.push(data[..take].to_vec());
        self.sample_count += take;

        if take < data.len() || self.sample_count == self.max_samples {
            Append::CapReached
        } else {
            Append::Appended
        }
    }

    /// Empties the buffer and applies a new cap for the next session.
    pub(crate) fn reset(&mut self, max_samples: usize) {
        self.chunks.clear();
        self.sample_count = 0;
        self.max_samples = max_samples;
    }

    /// Removes and returns every chunk in capture order, leaving the buffer
    /// empty and ready for the next session.
    pub(crate) fn drain(&mut self) -> Vec<Vec<f32>> {
        self.sample_count = 0;
        std::mem::take(&mut self.chunks)
    }

    pub(crate) fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub(crate) fn sample_count(&self) -> usize {
        self.sample_count
    }
}
