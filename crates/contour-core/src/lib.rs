//! Contour Core - volume automation engine for the curve editor
//!
//! The UI shell feeds this library normalized inputs (breakpoint edits in
//! curve coordinates, decoded sample buffers, host-clock deltas) and gets
//! back interpolated levels, waveform summaries, and gain writes against
//! an abstract audio sink. Rendering, input capture, and audio decoding
//! all live outside.

pub mod config;
pub mod engine;
pub mod envelope;
pub mod loader;
pub mod types;
pub mod waveform;

pub use types::*;
