use crate::{AudioError, CoreError, CoreResult};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Mono FFT resampler used to shrink recognition uploads.
pub(crate) struct Resampler {
    inner: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub(crate) fn new(input_rate: u32, output_rate: u32) -> CoreResult<Self> {
        let inner = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            CHUNK_FRAMES,
            SUB_CHUNKS,
            1,
            FixedSync::Input,
        )
        .map_err(|e| resampling_error("create resampler", e))?;

        Ok(Self {
            inner,
            input_rate,
            output_rate,
        })
    }

    #[track_caller]
    #[instrument(skip(self, samples), fields(input_len = samples.len()))]
    pub(crate) fn resample(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let expected_len =
            (samples.len() as f64 * self.output_rate as f64 / self.input_rate as f64) as usize;
        let mut output = Vec::with_capacity(expected_len);

        let mut padded = vec![0.0f32; CHUNK_FRAMES];
        let max_out = self.inner.output_frames_max();
        let mut block_out = vec![0.0f32; max_out];

        for block in samples.chunks(CHUNK_FRAMES) {
            // The FFT resampler needs full blocks; zero-pad the tail.
            padded[..block.len()].copy_from_slice(block);
            padded[block.len()..].fill(0.0);

            let input = InterleavedSlice::new(&padded, 1, CHUNK_FRAMES)
                .map_err(|e| resampling_error("wrap input block", e))?;
            let mut out = InterleavedSlice::new_mut(&mut block_out, 1, max_out)
                .map_err(|e| resampling_error("wrap output block", e))?;

            let (_, written) = self
                .inner
                .process_into_buffer(&input, &mut out, None)
                .map_err(|e| resampling_error("resample block", e))?;

            output.extend_from_slice(&block_out[..written]);
        }

        output.truncate(expected_len);

        debug!(
            output_len = output.len(),
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            "Resampled recording"
        );

        Ok(output)
    }
}

#[track_caller]
fn resampling_error(step: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::from(AudioError::ResamplingError {
        reason: format!("Failed to {step}: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}
