//! Playback engine - transport clock, tracks, mixer, and automation loop

mod automation;
mod clock;
mod mixer;
mod sink;
mod track;

pub use automation::{AutomationLoop, TickOutcome, TickToken};
pub use clock::{ClockAtomics, ClockTick, PlaybackClock};
pub use mixer::{MixerError, MixerTick, TrackMixer};
pub use sink::{AudioSink, NullSink};
pub use track::Track;
