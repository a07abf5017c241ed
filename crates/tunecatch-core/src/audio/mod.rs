mod capture;
pub(crate) mod chunk_buffer;
mod resampler;
mod source;
pub(crate) mod wav;

pub(crate) use resampler::Resampler;

pub use {
    capture::MicrophoneCapturer,
    source::{AudioSource, CapturedAudio},
    wav::{RECOGNITION_SAMPLE_RATE, WavPayload},
};
