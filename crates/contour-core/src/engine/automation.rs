//! Gain automation loop - cooperative repeating task over the mixer
//!
//! The host owns a frame/timer service (the equivalent of an animation
//! frame callback); the loop owns the scheduling discipline. Scheduling
//! hands out a [`TickToken`], running a tick consumes it, and there is
//! never more than one live token per loop instance. Cancellation is
//! synchronous: once a token is revoked, presenting it does nothing.

use crate::types::TrackId;

use super::mixer::{MixerTick, TrackMixer};
use super::sink::AudioSink;
use super::track::Track;

/// Token identifying one scheduled invocation of the loop
///
/// Monotonic per loop instance; a token is valid until it is run,
/// superseded, or cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken(u64);

/// Outcome of presenting a token to [`AutomationLoop::run_tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick ran and the loop rescheduled itself; invoke again with
    /// the new token on the next host frame
    Scheduled(TickToken),
    /// Playback reached the end; all sources are stopped and no tick is
    /// pending
    Finished,
    /// The token was stale, the loop was cancelled, or the session is
    /// closed; nothing happened
    Skipped,
}

/// Cooperative gain automation over one mixer and one sink
///
/// Single-threaded by design: every entry point takes `&mut self`, so
/// curve edits issued between ticks and the tick's own reads are
/// serialized by construction. After [`close`](Self::close) the loop is
/// inert; no tick can run and no source can be touched again.
pub struct AutomationLoop<S: AudioSink> {
    mixer: TrackMixer,
    sink: S,
    pending: Option<TickToken>,
    next_token: u64,
    closed: bool,
}

impl<S: AudioSink> AutomationLoop<S> {
    /// Create a loop over a mixer and a sink
    pub fn new(mixer: TrackMixer, sink: S) -> Self {
        Self {
            mixer,
            sink,
            pending: None,
            next_token: 0,
            closed: false,
        }
    }

    /// Get the mixer (transport state, gains, waveforms)
    pub fn mixer(&self) -> &TrackMixer {
        &self.mixer
    }

    /// Get the mixer mutably (track loading, curve edits between ticks)
    pub fn mixer_mut(&mut self) -> &mut TrackMixer {
        &mut self.mixer
    }

    /// Convenience accessor for a track's mutable state
    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.mixer.track_mut(id)
    }

    /// Check whether a tick is currently scheduled
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Issue a fresh token, revoking any previously pending one
    fn schedule(&mut self) -> TickToken {
        let token = TickToken(self.next_token);
        self.next_token += 1;
        self.pending = Some(token);
        token
    }

    /// Revoke the pending token, if any
    fn cancel(&mut self) {
        self.pending = None;
    }

    /// Start or resume playback and schedule the first tick
    ///
    /// Returns the token the host must present on the next frame, or
    /// `None` when the loop is closed or the mixer has nothing to play.
    pub fn start(&mut self) -> Option<TickToken> {
        if self.closed {
            log::warn!("start ignored: session is closed");
            return None;
        }

        self.cancel();
        self.mixer.play(&mut self.sink);
        if !self.mixer.is_playing() {
            return None;
        }
        Some(self.schedule())
    }

    /// Pause playback, synchronously cancelling the pending tick
    pub fn pause(&mut self) {
        self.cancel();
        if !self.closed {
            self.mixer.pause(&mut self.sink);
        }
    }

    /// Stop playback, synchronously cancelling the pending tick
    pub fn stop(&mut self) {
        self.cancel();
        if !self.closed {
            self.mixer.stop(&mut self.sink);
        }
    }

    /// Seek the shared timeline; a playing loop keeps its pending tick
    pub fn seek(&mut self, t: f64) {
        if !self.closed {
            self.mixer.seek(t, &mut self.sink);
        }
    }

    /// Run one scheduled tick
    ///
    /// `host_delta` is the elapsed host-clock time since the previous
    /// tick. A stale or revoked token is a no-op; this is what makes the
    /// at-most-one-pending guarantee hold even if the host service fires
    /// a callback it was asked to cancel.
    pub fn run_tick(&mut self, token: TickToken, host_delta: f64) -> TickOutcome {
        if self.closed || self.pending != Some(token) {
            return TickOutcome::Skipped;
        }
        self.pending = None;

        match self.mixer.tick(host_delta, &mut self.sink) {
            MixerTick::Playing => TickOutcome::Scheduled(self.schedule()),
            MixerTick::Ended => TickOutcome::Finished,
            MixerTick::Idle => TickOutcome::Skipped,
        }
    }

    /// Tear down the playback session
    ///
    /// Cancels the pending tick, halts every source, closes the sink, and
    /// leaves the loop inert. Idempotent: repeated calls do nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.cancel();
        self.mixer.stop(&mut self.sink);
        self.sink.close();
        self.closed = true;
        log::info!("playback session closed");
    }
}

impl<S: AudioSink> Drop for AutomationLoop<S> {
    fn drop(&mut self) {
        self.close();
    }
}
