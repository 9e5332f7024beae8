//! Playback clock - transport position with pause/resume/seek/stop
//!
//! The clock is advanced by the automation loop from host-clock deltas; it
//! never reads wall time itself. A lock-free atomic mirror of position and
//! state lets a UI thread draw the playhead without locking.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use crate::types::PlayState;

/// Lock-free transport state for UI access
///
/// The automation thread writes these atomics whenever the clock changes;
/// readers only need visibility, so all operations use `Ordering::Relaxed`.
pub struct ClockAtomics {
    /// Current position, f64 seconds stored as raw bits
    position_bits: AtomicU64,
    /// Play state: 0=Stopped, 1=Playing, 2=Paused
    state: AtomicU8,
}

impl ClockAtomics {
    fn new() -> Self {
        Self {
            position_bits: AtomicU64::new(0f64.to_bits()),
            state: AtomicU8::new(0),
        }
    }

    /// Get the current position in seconds (lock-free)
    #[inline]
    pub fn position(&self) -> f64 {
        f64::from_bits(self.position_bits.load(Ordering::Relaxed))
    }

    /// Get the play state (lock-free)
    #[inline]
    pub fn play_state(&self) -> PlayState {
        match self.state.load(Ordering::Relaxed) {
            1 => PlayState::Playing,
            2 => PlayState::Paused,
            _ => PlayState::Stopped,
        }
    }

    /// Check if playing (lock-free)
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state.load(Ordering::Relaxed) == 1
    }
}

impl fmt::Debug for ClockAtomics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockAtomics")
            .field("position", &self.position())
            .field("state", &self.play_state())
            .finish()
    }
}

/// Result of advancing the clock by one host tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// Still inside the timeline; playback continues
    Advanced,
    /// The end was reached: the clock performed an implicit stop and the
    /// position was reset to 0
    Ended,
}

/// Transport clock for one playback session
///
/// State machine per the transitions on each method; `current position` is
/// always within `[0, total_duration]`.
#[derive(Debug)]
pub struct PlaybackClock {
    state: PlayState,
    position: f64,
    total_duration: f64,
    atomics: Arc<ClockAtomics>,
}

impl PlaybackClock {
    /// Create a stopped clock for a timeline of `total_duration` seconds
    pub fn new(total_duration: f64) -> Self {
        let clock = Self {
            state: PlayState::Stopped,
            position: 0.0,
            total_duration: total_duration.max(0.0),
            atomics: Arc::new(ClockAtomics::new()),
        };
        clock.sync_atomics();
        clock
    }

    /// Get a reference to the lock-free transport mirror
    ///
    /// A UI can clone this Arc once and read position/state every frame
    /// without touching the clock itself.
    pub fn atomics(&self) -> Arc<ClockAtomics> {
        Arc::clone(&self.atomics)
    }

    fn sync_atomics(&self) {
        let state_val = match self.state {
            PlayState::Stopped => 0,
            PlayState::Playing => 1,
            PlayState::Paused => 2,
        };
        self.atomics
            .position_bits
            .store(self.position.to_bits(), Ordering::Relaxed);
        self.atomics.state.store(state_val, Ordering::Relaxed);
    }

    /// Get the current play state
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Get the current position in seconds
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Get the total duration in seconds
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Check if the clock is playing
    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// Replace the timeline duration, clamping the position into the new
    /// range (used when a new primary track is loaded)
    pub fn set_total_duration(&mut self, total_duration: f64) {
        self.total_duration = total_duration.max(0.0);
        self.position = self.position.clamp(0.0, self.total_duration);
        self.sync_atomics();
    }

    /// Start or resume playback from the retained offset
    pub fn play(&mut self) {
        if self.state != PlayState::Playing {
            self.state = PlayState::Playing;
            self.sync_atomics();
        }
    }

    /// Pause, retaining the current position as the resume offset
    pub fn pause(&mut self) {
        if self.state == PlayState::Playing {
            self.state = PlayState::Paused;
            self.sync_atomics();
        }
    }

    /// Jump to `t` seconds, clamped into the timeline; valid in any state
    /// and does not change the play state
    pub fn seek(&mut self, t: f64) {
        let t = if t.is_finite() { t } else { 0.0 };
        self.position = t.clamp(0.0, self.total_duration);
        self.sync_atomics();
    }

    /// Stop: reset to position 0 and discard any retained offset
    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
        self.position = 0.0;
        self.sync_atomics();
    }

    /// Advance by the elapsed host-clock time since the last tick
    ///
    /// Only meaningful while playing; in any other state this is a no-op
    /// that reports [`ClockTick::Advanced`]. Reaching or passing the end
    /// performs an implicit [`stop`](Self::stop) and reports
    /// [`ClockTick::Ended`] instead of advancing past it.
    pub fn tick(&mut self, host_delta: f64) -> ClockTick {
        if self.state != PlayState::Playing {
            return ClockTick::Advanced;
        }

        let delta = if host_delta.is_finite() { host_delta.max(0.0) } else { 0.0 };
        let next = self.position + delta;
        if next >= self.total_duration {
            self.stop();
            return ClockTick::Ended;
        }

        self.position = next;
        self.sync_atomics();
        ClockTick::Advanced
    }
}
