//! Audio sink abstraction
//!
//! The engine computes gains; the shell owns the actual audio graph. This
//! trait is the seam between the two: source handles are opaque and every
//! call refers to a source the shell registered when loading a track.

use crate::types::SourceHandle;

/// Output side of the automation engine
///
/// Implementations must tolerate redundant calls: stopping a source that
/// is not running and closing an already-closed sink are both no-ops.
pub trait AudioSink {
    /// (Re)start a source so that it plays from `offset` seconds
    ///
    /// Sources are stateless playback handles; restarting is the only way
    /// to position one, so a seek is expressed as another `start_source`.
    fn start_source(&mut self, handle: SourceHandle, offset: f64);

    /// Halt a source; the handle stays valid for a later restart
    fn stop_source(&mut self, handle: SourceHandle);

    /// Apply `gain` to a source immediately, at the current host instant
    /// (no ramp, no smoothing)
    fn set_gain(&mut self, handle: SourceHandle, gain: f32);

    /// Tear down the sink and release every source. Idempotent; terminal
    /// for the playback session.
    fn close(&mut self);
}

/// Sink that discards everything
///
/// Useful for driving the engine without an audio backend, e.g. when only
/// the curve editor is open.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn start_source(&mut self, _handle: SourceHandle, _offset: f64) {}
    fn stop_source(&mut self, _handle: SourceHandle) {}
    fn set_gain(&mut self, _handle: SourceHandle, _gain: f32) {}
    fn close(&mut self) {}
}
