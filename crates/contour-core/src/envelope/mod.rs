//! Volume envelope model
//!
//! [`EnvelopeCurve`] holds the ordered breakpoint sequence and evaluates
//! piecewise-linear gain; [`display_segments`] derives the smoothed path
//! the renderer draws. The two share the breakpoints but stay independent:
//! only `evaluate` is authoritative for audio.

mod curve;
mod display;

pub use curve::{Breakpoint, BreakpointId, CurveSnapshotError, EnvelopeCurve};
pub use display::{display_segments, CurvePoint, CurveSegment};
