//! Common types for Contour
//!
//! This module contains the fundamental types shared across the volume
//! automation engine: sample and level conventions, track identity, and
//! the opaque handle the engine uses to address external audio sources.

use serde::{Deserialize, Serialize};

/// Audio sample type (32-bit float, decoded samples arrive in [-1, 1])
pub type Sample = f32;

/// Width of the curve domain in editor units
///
/// Breakpoint positions live in `[0, DOMAIN_WIDTH]`; the automation loop
/// maps clock time into this domain before evaluating a curve.
pub const DOMAIN_WIDTH: f64 = 1000.0;

/// Default number of min/max buckets in a waveform summary
pub const DEFAULT_WAVEFORM_BUCKETS: usize = 500;

/// Lower bound of an envelope level (silence)
pub const MIN_LEVEL: f32 = 0.0;

/// Upper bound of an envelope level (unity gain)
pub const MAX_LEVEL: f32 = 1.0;

/// Level assigned to the two boundary breakpoints of a fresh curve
pub const DEFAULT_LEVEL: f32 = 1.0;

/// Track identifier assigned by the mixer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(usize);

impl TrackId {
    /// Create a track id from a raw index
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Role of a track within the mixer
///
/// The primary track anchors the shared timeline; secondary tracks are
/// auxiliary sources synchronized to it and may run out before it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackRole {
    Primary,
    Secondary,
}

impl TrackRole {
    /// Get the display name of this role
    pub fn name(&self) -> &'static str {
        match self {
            TrackRole::Primary => "Primary",
            TrackRole::Secondary => "Secondary",
        }
    }
}

/// Playback state of the transport clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Opaque handle to an external audio source
///
/// The engine never touches audio data through this handle; it only passes
/// it back to the [`AudioSink`](crate::engine::AudioSink) when starting,
/// stopping, or setting the gain of a source. The shell decides what the
/// raw value means (a buffer-source slot, a media element, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle(u64);

impl SourceHandle {
    /// Create a handle from a shell-assigned raw value
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value back
    pub fn raw(&self) -> u64 {
        self.0
    }
}
