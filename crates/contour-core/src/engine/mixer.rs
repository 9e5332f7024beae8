//! Multi-track mixer - N envelope tracks against one transport clock
//!
//! The clock is anchored to the primary track's timeline. Secondary tracks
//! are stateless playback handles: they are (re)started at the current
//! global position on every play/seek, and force-muted once the position
//! passes their (clamped) duration.

use thiserror::Error;

use crate::loader::DecodedSource;
use crate::types::{SourceHandle, TrackId, TrackRole, DEFAULT_WAVEFORM_BUCKETS, DOMAIN_WIDTH};

use super::clock::{ClockTick, PlaybackClock};
use super::sink::AudioSink;
use super::track::Track;

/// Errors raised by mixer track management
#[derive(Debug, Error)]
pub enum MixerError {
    /// A secondary track needs a primary timeline to attach to
    #[error("no primary track loaded")]
    NoPrimaryTrack,
}

/// Result of one mixer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerTick {
    /// The clock is not playing; nothing was evaluated
    Idle,
    /// Gains were written; playback continues
    Playing,
    /// The end of the timeline was reached; all sources were stopped
    Ended,
}

/// Coordinates envelope tracks sharing one playback clock
///
/// Track 0 (when loaded) is the primary; its native duration defines the
/// timeline. All transport operations go through the mixer so that the
/// clock and the shell's sources never disagree about the position.
pub struct TrackMixer {
    clock: PlaybackClock,
    tracks: Vec<Track>,
    next_track: usize,
    waveform_buckets: usize,
    domain_width: f64,
}

impl TrackMixer {
    /// Create an empty mixer with default waveform/domain parameters
    pub fn new() -> Self {
        Self::with_params(DEFAULT_WAVEFORM_BUCKETS, DOMAIN_WIDTH)
    }

    /// Create an empty mixer with explicit waveform bucket count and
    /// curve domain width
    pub fn with_params(waveform_buckets: usize, domain_width: f64) -> Self {
        Self {
            clock: PlaybackClock::new(0.0),
            tracks: Vec::new(),
            next_track: 0,
            waveform_buckets,
            domain_width,
        }
    }

    /// Get the transport clock
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Get the loaded tracks, primary first
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Look up a track by id
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id() == id)
    }

    /// Look up a track by id, mutably (curve edits, mute toggles)
    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id() == id)
    }

    /// Get the primary track, if loaded
    pub fn primary(&self) -> Option<&Track> {
        self.tracks.first().filter(|t| t.is_primary())
    }

    fn alloc_id(&mut self) -> TrackId {
        let id = TrackId::new(self.next_track);
        self.next_track += 1;
        id
    }

    /// Load (or replace) the primary track
    ///
    /// Resets the transport to a stopped state, anchors the timeline to
    /// the new track's duration, and re-clamps every secondary against it.
    pub fn load_primary(&mut self, decoded: &DecodedSource, source: SourceHandle) -> TrackId {
        let id = self.alloc_id();
        let track = Track::new(
            id,
            TrackRole::Primary,
            source,
            decoded,
            self.waveform_buckets,
            self.domain_width,
        );

        let duration = track.duration();
        if self.primary().is_some() {
            self.tracks[0] = track;
        } else {
            self.tracks.insert(0, track);
        }

        self.clock.stop();
        self.clock.set_total_duration(duration);
        for secondary in self.tracks.iter_mut().skip(1) {
            secondary.clamp_duration(duration);
        }

        log::info!("primary track {} loaded, timeline {:.2}s", id.index(), duration);
        id
    }

    /// Load a secondary track against the current primary timeline
    ///
    /// Fails (with no state created) when no primary is loaded. The new
    /// track's duration is clamped to the primary's at this point.
    pub fn load_secondary(
        &mut self,
        decoded: &DecodedSource,
        source: SourceHandle,
    ) -> Result<TrackId, MixerError> {
        let Some(primary) = self.primary() else {
            return Err(MixerError::NoPrimaryTrack);
        };
        let primary_duration = primary.duration();

        let id = self.alloc_id();
        let mut track = Track::new(
            id,
            TrackRole::Secondary,
            source,
            decoded,
            self.waveform_buckets,
            self.domain_width,
        );
        track.clamp_duration(primary_duration);
        self.tracks.push(track);

        log::info!("secondary track {} loaded", id.index());
        Ok(id)
    }

    /// Check whether the transport is playing
    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Start or resume playback
    ///
    /// Every source, primary and secondary, is (re)started at the current
    /// global position: the handles are stateless and must be told where
    /// to resume. No-op without a primary track.
    pub fn play<S: AudioSink>(&mut self, sink: &mut S) {
        if self.primary().is_none() {
            log::warn!("play ignored: no primary track");
            return;
        }

        self.clock.play();
        let offset = self.clock.position();
        for track in &self.tracks {
            sink.start_source(track.source(), offset);
        }
    }

    /// Pause, retaining the resume offset; all sources are halted
    pub fn pause<S: AudioSink>(&mut self, sink: &mut S) {
        self.clock.pause();
        for track in &self.tracks {
            sink.stop_source(track.source());
        }
    }

    /// Stop playback: halt and release all sources, reset the primary
    /// timeline to position 0
    pub fn stop<S: AudioSink>(&mut self, sink: &mut S) {
        self.clock.stop();
        for track in &self.tracks {
            sink.stop_source(track.source());
        }
    }

    /// Seek to `t` seconds (clamped); while playing, sources are restarted
    /// at the new offset without changing the play state
    pub fn seek<S: AudioSink>(&mut self, t: f64, sink: &mut S) {
        self.clock.seek(t);
        if self.clock.is_playing() {
            let offset = self.clock.position();
            for track in &self.tracks {
                sink.start_source(track.source(), offset);
            }
        }
    }

    /// Advance the clock and write the current gain of every track
    ///
    /// On reaching the end, stops all sources and reports
    /// [`MixerTick::Ended`]; the caller must not schedule further ticks.
    pub fn tick<S: AudioSink>(&mut self, host_delta: f64, sink: &mut S) -> MixerTick {
        if !self.clock.is_playing() {
            return MixerTick::Idle;
        }

        match self.clock.tick(host_delta) {
            ClockTick::Ended => {
                log::debug!("timeline ended, stopping all sources");
                for track in &self.tracks {
                    sink.stop_source(track.source());
                }
                MixerTick::Ended
            }
            ClockTick::Advanced => {
                let position = self.clock.position();
                for track in &self.tracks {
                    sink.set_gain(track.source(), Self::track_gain(&self.clock, track, position));
                }
                MixerTick::Playing
            }
        }
    }

    /// Evaluate the gain a track would receive at the current position
    pub fn current_gain(&self, id: TrackId) -> Option<f32> {
        let track = self.track(id)?;
        Some(Self::track_gain(&self.clock, track, self.clock.position()))
    }

    /// Gain policy for one track at one timeline position
    ///
    /// User mute and a secondary that has run out both force 0 regardless
    /// of the curve; the primary is never force-muted by duration.
    fn track_gain(clock: &PlaybackClock, track: &Track, position: f64) -> f32 {
        if track.muted() {
            return 0.0;
        }
        if !track.is_primary() && track.duration() < position {
            return 0.0;
        }

        let total = clock.total_duration();
        let domain_pos = if total > 0.0 {
            position / total * track.curve().domain_max()
        } else {
            0.0
        };
        track.curve().evaluate(domain_pos)
    }
}

impl Default for TrackMixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that records every call for assertions
    #[derive(Default)]
    struct RecordingSink {
        starts: Vec<(u64, f64)>,
        stops: Vec<u64>,
        gains: Vec<(u64, f32)>,
    }

    impl AudioSink for RecordingSink {
        fn start_source(&mut self, handle: SourceHandle, offset: f64) {
            self.starts.push((handle.raw(), offset));
        }
        fn stop_source(&mut self, handle: SourceHandle) {
            self.stops.push(handle.raw());
        }
        fn set_gain(&mut self, handle: SourceHandle, gain: f32) {
            self.gains.push((handle.raw(), gain));
        }
        fn close(&mut self) {}
    }

    fn decoded(seconds: f64) -> DecodedSource {
        DecodedSource::new(vec![0.0; (seconds * 100.0) as usize], 100).unwrap()
    }

    fn mixer_with_tracks() -> (TrackMixer, TrackId, TrackId) {
        let mut mixer = TrackMixer::with_params(50, 1000.0);
        let primary = mixer.load_primary(&decoded(10.0), SourceHandle::new(1));
        let secondary = mixer
            .load_secondary(&decoded(4.0), SourceHandle::new(2))
            .unwrap();
        (mixer, primary, secondary)
    }

    #[test]
    fn test_secondary_requires_primary() {
        let mut mixer = TrackMixer::new();
        let err = mixer.load_secondary(&decoded(4.0), SourceHandle::new(2));
        assert!(matches!(err, Err(MixerError::NoPrimaryTrack)));
        assert!(mixer.tracks().is_empty());
    }

    #[test]
    fn test_secondary_duration_clamped_at_load() {
        let mut mixer = TrackMixer::new();
        mixer.load_primary(&decoded(10.0), SourceHandle::new(1));
        let long = mixer
            .load_secondary(&decoded(25.0), SourceHandle::new(2))
            .unwrap();
        assert_eq!(mixer.track(long).unwrap().duration(), 10.0);
    }

    #[test]
    fn test_play_starts_sources_at_current_position() {
        let (mut mixer, _, _) = mixer_with_tracks();
        let mut sink = RecordingSink::default();

        mixer.seek(3.0, &mut sink);
        mixer.play(&mut sink);
        assert_eq!(sink.starts, vec![(1, 3.0), (2, 3.0)]);
    }

    #[test]
    fn test_pause_retains_offset_and_halts_sources() {
        let (mut mixer, _, _) = mixer_with_tracks();
        let mut sink = RecordingSink::default();

        mixer.play(&mut sink);
        mixer.tick(2.0, &mut sink);
        mixer.pause(&mut sink);
        assert_eq!(sink.stops, vec![1, 2]);
        assert_eq!(mixer.clock().position(), 2.0);

        sink.starts.clear();
        mixer.play(&mut sink);
        assert_eq!(sink.starts, vec![(1, 2.0), (2, 2.0)]);
    }

    #[test]
    fn test_run_out_secondary_is_force_muted() {
        let (mut mixer, primary, secondary) = mixer_with_tracks();
        let mut sink = RecordingSink::default();

        mixer.play(&mut sink);
        mixer.tick(5.0, &mut sink);

        // Secondary (duration 4) ran out at position 5; primary did not
        assert_eq!(mixer.current_gain(secondary), Some(0.0));
        assert_eq!(mixer.current_gain(primary), Some(1.0));
        let last_gains: Vec<(u64, f32)> = sink.gains.clone();
        assert!(last_gains.contains(&(2, 0.0)));
        assert!(last_gains.contains(&(1, 1.0)));
    }

    #[test]
    fn test_user_mute_forces_zero_gain() {
        let (mut mixer, primary, _) = mixer_with_tracks();
        mixer.track_mut(primary).unwrap().set_muted(true);
        assert_eq!(mixer.current_gain(primary), Some(0.0));
        mixer.track_mut(primary).unwrap().toggle_muted();
        assert_eq!(mixer.current_gain(primary), Some(1.0));
    }

    #[test]
    fn test_tick_maps_position_into_curve_domain() {
        let (mut mixer, primary, _) = mixer_with_tracks();
        let mut sink = RecordingSink::default();

        // Dip to 0.5 at the middle of the 1000-unit domain
        let curve = mixer.track_mut(primary).unwrap().curve_mut();
        curve.add_breakpoint(500.0, 0.5).unwrap();

        mixer.play(&mut sink);
        mixer.tick(5.0, &mut sink); // half of the 10s timeline
        assert_eq!(mixer.current_gain(primary), Some(0.5));
    }

    #[test]
    fn test_end_of_timeline_stops_everything() {
        let (mut mixer, _, _) = mixer_with_tracks();
        let mut sink = RecordingSink::default();

        mixer.play(&mut sink);
        assert_eq!(mixer.tick(11.0, &mut sink), MixerTick::Ended);
        assert_eq!(sink.stops, vec![1, 2]);
        assert!(!mixer.is_playing());
        assert_eq!(mixer.clock().position(), 0.0);
    }

    #[test]
    fn test_tick_while_stopped_is_idle() {
        let (mut mixer, _, _) = mixer_with_tracks();
        let mut sink = RecordingSink::default();
        assert_eq!(mixer.tick(1.0, &mut sink), MixerTick::Idle);
        assert!(sink.gains.is_empty());
    }

    #[test]
    fn test_reloading_primary_reclamps_secondaries() {
        let (mut mixer, _, secondary) = mixer_with_tracks();
        mixer.load_primary(&decoded(3.0), SourceHandle::new(9));
        assert_eq!(mixer.track(secondary).unwrap().duration(), 3.0);
        assert_eq!(mixer.clock().total_duration(), 3.0);
        assert!(!mixer.is_playing());
    }
}
