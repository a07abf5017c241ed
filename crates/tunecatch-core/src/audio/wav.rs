//! Packaging of a drained recording into the `audio/wav` upload payload.

use crate::{
    AudioError, CoreResult,
    audio::{CapturedAudio, Resampler},
};

use std::{io::Cursor, panic::Location};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, instrument};

/// Sample rate the recognition backend normalises uploads to.
pub const RECOGNITION_SAMPLE_RATE: u32 = 16_000;

/// An encoded WAV file ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavPayload {
    /// Complete RIFF/WAVE bytes.
    pub bytes: Vec<u8>,
    /// Sample rate written in the header.
    pub sample_rate: u32,
    /// Channel count written in the header.
    pub channels: u16,
}

impl WavPayload {
    /// Builds the upload from a finished session.
    ///
    /// With `target_rate` set the recording is downmixed to mono and
    /// resampled to that rate first; otherwise the device format is kept.
    #[track_caller]
    #[instrument(skip(captured), fields(sample_count = captured.sample_count()))]
    pub fn from_captured(captured: CapturedAudio, target_rate: Option<u32>) -> CoreResult<Self> {
        let source_rate = captured.sample_rate;
        let channels = captured.channels.max(1);
        let samples = captured.into_samples();

        let payload = match target_rate {
            Some(rate) => {
                let mono = downmix(&samples, channels);
                let mono = if rate != source_rate && !mono.is_empty() {
                    Resampler::new(source_rate, rate)?.resample(&mono)?
                } else {
                    mono
                };
                Self::encode(&mono, rate, 1)?
            }
            None => Self::encode(&samples, source_rate, channels)?,
        };

        debug!(
            byte_len = payload.bytes.len(),
            sample_rate = payload.sample_rate,
            channels = payload.channels,
            "WAV payload built"
        );

        Ok(payload)
    }

    /// Encodes interleaved `f32` samples as 16-bit PCM.
    #[track_caller]
    pub fn encode(samples: &[f32], sample_rate: u32, channels: u16) -> CoreResult<Self> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
        {
            let mut writer = WavWriter::new(&mut cursor, spec).map_err(wav_error)?;
            for &sample in samples {
                writer.write_sample(to_pcm16(sample)).map_err(wav_error)?;
            }
            writer.finalize().map_err(wav_error)?;
        }

        Ok(Self {
            bytes: cursor.into_inner(),
            sample_rate,
            channels,
        })
    }
}

#[track_caller]
fn wav_error(source: hound::Error) -> AudioError {
    AudioError::WavEncoding {
        source,
        location: ErrorLocation::from(Location::caller()),
    }
}

pub(crate) fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Averages interleaved frames down to one channel.
pub(crate) fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let width = channels as usize;
    samples
        .chunks(width)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}
