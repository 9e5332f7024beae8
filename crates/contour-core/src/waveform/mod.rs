//! Waveform decimation for display
//!
//! Downsamples a decoded sample buffer into a fixed number of min/max
//! buckets, one per display column. The summary is computed once per
//! loaded buffer and recomputed wholesale on reload, never patched.

use serde::{Deserialize, Serialize};

use crate::types::Sample;

/// Fixed-size min/max summary of a sample buffer
///
/// Buckets are ordered left to right across the buffer; each holds the
/// `(min, max)` of its block with `min <= max`. Immutable after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveformSummary {
    buckets: Vec<(Sample, Sample)>,
}

impl WaveformSummary {
    /// Create an empty summary (nothing loaded yet)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the buckets
    pub fn buckets(&self) -> &[(Sample, Sample)] {
        &self.buckets
    }

    /// Get the number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check whether the summary holds no buckets
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Get a bucket by index
    pub fn get(&self, index: usize) -> Option<(Sample, Sample)> {
        self.buckets.get(index).copied()
    }
}

/// Decimate a sample buffer into `bucket_count` min/max buckets
///
/// `block_size = len / bucket_count` with truncating division; bucket `i`
/// scans samples `[i * block_size, (i + 1) * block_size)` and any trailing
/// samples beyond `bucket_count * block_size` are dropped. The truncation
/// is intentional and matched to the display layer's expectations.
///
/// An empty buffer, a zero bucket count, or fewer samples than buckets
/// (block size 0) all yield an empty summary.
pub fn summarize(samples: &[Sample], bucket_count: usize) -> WaveformSummary {
    if samples.is_empty() || bucket_count == 0 {
        return WaveformSummary::empty();
    }

    let block_size = samples.len() / bucket_count;
    if block_size == 0 {
        return WaveformSummary::empty();
    }

    let buckets = (0..bucket_count)
        .map(|i| {
            let start = i * block_size;
            let block = &samples[start..start + block_size];

            let mut min = f32::INFINITY;
            let mut max = f32::NEG_INFINITY;
            for &sample in block {
                min = min.min(sample);
                max = max.max(sample);
            }
            (min, max)
        })
        .collect();

    WaveformSummary { buckets }
}
