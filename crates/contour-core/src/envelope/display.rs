//! Smoothed display path for the envelope
//!
//! The renderer draws the envelope as a chain of cubic segments whose
//! control points sit at the midpoint x of each span. This is a purely
//! visual smoothing: it may diverge from the straight lines the gain is
//! computed from, and it must never feed back into
//! [`EnvelopeCurve::evaluate`].

use super::curve::EnvelopeCurve;

/// A point on the display path, in curve-domain coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub position: f64,
    pub level: f32,
}

/// One cubic segment of the display path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSegment {
    pub from: CurvePoint,
    pub ctrl1: CurvePoint,
    pub ctrl2: CurvePoint,
    pub to: CurvePoint,
}

/// Build the smoothed display path for a curve
///
/// Returns one segment per adjacent breakpoint pair. Both control points
/// sit at the midpoint position of the span, each holding its endpoint's
/// level, which gives the familiar ease-in/ease-out look.
pub fn display_segments(curve: &EnvelopeCurve) -> Vec<CurveSegment> {
    let points = curve.breakpoints();

    points
        .windows(2)
        .map(|pair| {
            let mid = (pair[0].position() + pair[1].position()) / 2.0;
            CurveSegment {
                from: CurvePoint {
                    position: pair[0].position(),
                    level: pair[0].level(),
                },
                ctrl1: CurvePoint {
                    position: mid,
                    level: pair[0].level(),
                },
                ctrl2: CurvePoint {
                    position: mid,
                    level: pair[1].level(),
                },
                to: CurvePoint {
                    position: pair[1].position(),
                    level: pair[1].level(),
                },
            }
        })
        .collect()
}
