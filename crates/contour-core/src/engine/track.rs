//! Track - one audio source with its envelope and waveform summary

use crate::envelope::EnvelopeCurve;
use crate::loader::DecodedSource;
use crate::types::{SourceHandle, TrackId, TrackRole};
use crate::waveform::{summarize, WaveformSummary};

/// A loaded track in the mixer
///
/// Exclusive owner of its envelope curve and waveform summary; both are
/// created when the track is loaded and destroyed with it. The curve is
/// mutated only through [`curve_mut`](Self::curve_mut), which is the
/// single serialization point for UI edits and automation reads.
pub struct Track {
    id: TrackId,
    role: TrackRole,
    curve: EnvelopeCurve,
    waveform: WaveformSummary,
    duration: f64,
    source: SourceHandle,
    muted: bool,
}

impl Track {
    /// Create a track from a validated decoded source
    ///
    /// The waveform summary is computed here, once; the curve starts as
    /// the default two-breakpoint envelope over `domain_width`.
    pub fn new(
        id: TrackId,
        role: TrackRole,
        source: SourceHandle,
        decoded: &DecodedSource,
        waveform_buckets: usize,
        domain_width: f64,
    ) -> Self {
        let waveform = summarize(decoded.samples(), waveform_buckets);
        log::debug!(
            "track {}: {} loaded, {:.2}s, {} waveform buckets",
            id.index(),
            role.name(),
            decoded.duration(),
            waveform.len()
        );

        Self {
            id,
            role,
            curve: EnvelopeCurve::new(domain_width),
            waveform,
            duration: decoded.duration(),
            source,
            muted: false,
        }
    }

    /// Get the track id
    pub fn id(&self) -> TrackId {
        self.id
    }

    /// Get the track role
    pub fn role(&self) -> TrackRole {
        self.role
    }

    /// Check whether this is the primary track
    pub fn is_primary(&self) -> bool {
        self.role == TrackRole::Primary
    }

    /// Get the envelope curve
    pub fn curve(&self) -> &EnvelopeCurve {
        &self.curve
    }

    /// Get mutable access to the envelope curve
    pub fn curve_mut(&mut self) -> &mut EnvelopeCurve {
        &mut self.curve
    }

    /// Get the waveform summary
    pub fn waveform(&self) -> &WaveformSummary {
        &self.waveform
    }

    /// Get the effective duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Get the opaque source handle
    pub fn source(&self) -> SourceHandle {
        self.source
    }

    /// Check whether the track is user-muted
    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Set the user mute flag
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Toggle the user mute flag
    pub fn toggle_muted(&mut self) {
        self.muted = !self.muted;
    }

    /// Clamp the effective duration to the primary timeline
    ///
    /// Applied once at load time to secondary tracks: a secondary never
    /// outlives the primary it is synchronized to.
    pub(crate) fn clamp_duration(&mut self, primary_duration: f64) {
        if self.duration > primary_duration {
            log::debug!(
                "track {}: clamping duration {:.2}s -> {:.2}s",
                self.id.index(),
                self.duration,
                primary_duration
            );
            self.duration = primary_duration;
        }
    }
}
