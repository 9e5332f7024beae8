//! Intake of decoded sample buffers
//!
//! Decoding is the shell's job; this module validates what arrives and
//! derives the source duration. Validation failures are recoverable and
//! reported before any track or curve state exists.

use thiserror::Error;

use crate::types::Sample;

/// Errors raised while accepting a decoded source buffer
#[derive(Debug, Error)]
pub enum LoadError {
    /// The decoded buffer holds no samples
    #[error("decoded buffer is empty")]
    EmptyBuffer,

    /// The sample rate is unusable
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// A sample is NaN or infinite
    #[error("non-finite sample at index {0}")]
    NonFiniteSample(usize),
}

/// A decoded, validated mono sample buffer
///
/// Samples are expected in `[-1, 1]`; out-of-range but finite values are
/// accepted (decoders clip differently) and only affect the waveform
/// summary's extremes. Duration is derived from the buffer, never trusted
/// from the caller.
#[derive(Debug, Clone)]
pub struct DecodedSource {
    samples: Vec<Sample>,
    sample_rate: u32,
    duration: f64,
}

impl DecodedSource {
    /// Validate a decoded buffer and derive its duration
    pub fn new(samples: Vec<Sample>, sample_rate: u32) -> Result<Self, LoadError> {
        if samples.is_empty() {
            return Err(LoadError::EmptyBuffer);
        }
        if sample_rate == 0 {
            return Err(LoadError::InvalidSampleRate(sample_rate));
        }
        if let Some(idx) = samples.iter().position(|s| !s.is_finite()) {
            return Err(LoadError::NonFiniteSample(idx));
        }

        let duration = samples.len() as f64 / sample_rate as f64;
        log::debug!(
            "accepted decoded source: {} samples @ {} Hz = {:.2}s",
            samples.len(),
            sample_rate,
            duration
        );

        Ok(Self {
            samples,
            sample_rate,
            duration,
        })
    }

    /// Get the sample buffer
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Get the sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_buffer() {
        let source = DecodedSource::new(vec![0.0; 4800], 48000).unwrap();
        assert_eq!(source.sample_rate(), 48000);
        assert_eq!(source.duration(), 0.1);
        assert_eq!(source.samples().len(), 4800);
    }

    #[test]
    fn test_empty_buffer_rejected() {
        assert!(matches!(
            DecodedSource::new(Vec::new(), 48000),
            Err(LoadError::EmptyBuffer)
        ));
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(matches!(
            DecodedSource::new(vec![0.0; 10], 0),
            Err(LoadError::InvalidSampleRate(0))
        ));
    }

    #[test]
    fn test_non_finite_sample_rejected() {
        let mut samples = vec![0.0; 10];
        samples[3] = f32::NAN;
        assert!(matches!(
            DecodedSource::new(samples, 48000),
            Err(LoadError::NonFiniteSample(3))
        ));
    }
}
