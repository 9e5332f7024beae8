//! Envelope curve - ordered breakpoints with piecewise-linear evaluation
//!
//! The curve is the sole authority for audible volume: whatever the display
//! layer draws, gain always comes from [`EnvelopeCurve::evaluate`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{DEFAULT_LEVEL, DOMAIN_WIDTH, MAX_LEVEL, MIN_LEVEL};

/// Identifier of a breakpoint, stable across reordering
///
/// Assigned from a per-curve monotonic counter; moving a breakpoint past
/// its neighbours changes its index in the sequence but never its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BreakpointId(u64);

impl BreakpointId {
    /// Get the raw counter value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A (position, level) control point of the envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    id: BreakpointId,
    position: f64,
    level: f32,
}

impl Breakpoint {
    /// Get the breakpoint id
    pub fn id(&self) -> BreakpointId {
        self.id
    }

    /// Get the position in curve-domain units
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Get the level in `[0, 1]`
    pub fn level(&self) -> f32 {
        self.level
    }
}

/// Piecewise-linear volume envelope
///
/// Invariants, enforced by every mutator:
/// - at least 2 breakpoints, sorted ascending by position
/// - the first breakpoint is pinned at position 0, the last at
///   `domain_max`; neither can be removed, only their level may change
///
/// A fresh curve holds exactly the two boundary breakpoints at
/// [`DEFAULT_LEVEL`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CurveSnapshot")]
pub struct EnvelopeCurve {
    points: Vec<Breakpoint>,
    next_id: u64,
    domain_max: f64,
}

impl EnvelopeCurve {
    /// Create a curve spanning `[0, domain_max]` with the two boundary
    /// breakpoints at the default level
    ///
    /// A non-finite or non-positive `domain_max` falls back to
    /// [`DOMAIN_WIDTH`].
    pub fn new(domain_max: f64) -> Self {
        Self::with_level(domain_max, DEFAULT_LEVEL)
    }

    /// Create a curve with both boundary breakpoints at `level`
    pub fn with_level(domain_max: f64, level: f32) -> Self {
        let domain_max = if domain_max.is_finite() && domain_max > 0.0 {
            domain_max
        } else {
            DOMAIN_WIDTH
        };
        let level = level.clamp(MIN_LEVEL, MAX_LEVEL);
        Self {
            points: vec![
                Breakpoint { id: BreakpointId(0), position: 0.0, level },
                Breakpoint { id: BreakpointId(1), position: domain_max, level },
            ],
            next_id: 2,
            domain_max,
        }
    }

    /// Get the domain upper bound
    pub fn domain_max(&self) -> f64 {
        self.domain_max
    }

    /// Get the breakpoints, sorted ascending by position
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.points
    }

    /// Get the number of breakpoints (always >= 2)
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with collection types
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Look up a breakpoint by id
    pub fn breakpoint(&self, id: BreakpointId) -> Option<&Breakpoint> {
        self.points.iter().find(|bp| bp.id == id)
    }

    /// Insert a breakpoint at the sorted position
    ///
    /// The position is clamped into the domain first. Positions that land
    /// exactly on a domain boundary are silently rejected (those slots
    /// belong to the fixed endpoints) and `None` is returned. Existing ids
    /// are unaffected.
    pub fn add_breakpoint(&mut self, position: f64, level: f32) -> Option<BreakpointId> {
        if !position.is_finite() {
            return None;
        }
        let position = position.clamp(0.0, self.domain_max);
        if position == 0.0 || position == self.domain_max {
            return None;
        }

        let id = BreakpointId(self.next_id);
        self.next_id += 1;

        let idx = self.points.partition_point(|bp| bp.position < position);
        self.points.insert(
            idx,
            Breakpoint {
                id,
                position,
                level: sanitize_level(level),
            },
        );
        Some(id)
    }

    /// Move a breakpoint to a new position and level
    ///
    /// For the first or last breakpoint the new position is ignored and
    /// only the level is applied. Interior breakpoints are clamped into the
    /// domain and the sequence re-sorted: crossing a neighbour reorders the
    /// two points, it never merges or removes them. Returns false if `id`
    /// is unknown.
    pub fn move_breakpoint(&mut self, id: BreakpointId, new_position: f64, new_level: f32) -> bool {
        let Some(idx) = self.points.iter().position(|bp| bp.id == id) else {
            return false;
        };

        let level = sanitize_level(new_level);
        if idx == 0 || idx == self.points.len() - 1 {
            // Endpoint positions are immutable.
            self.points[idx].level = level;
            return true;
        }

        self.points[idx].level = level;
        if new_position.is_finite() {
            self.points[idx].position = new_position.clamp(0.0, self.domain_max);
        }

        // Stable sort keeps the pinned endpoints at the extremes when an
        // interior point is dragged onto a boundary position.
        self.points
            .sort_by(|a, b| a.position.total_cmp(&b.position));
        true
    }

    /// Remove a breakpoint
    ///
    /// No-op (returns false) for the first or last breakpoint, when only
    /// two remain, or when `id` is unknown.
    pub fn remove_breakpoint(&mut self, id: BreakpointId) -> bool {
        if self.points.len() <= 2 {
            return false;
        }
        let Some(idx) = self.points.iter().position(|bp| bp.id == id) else {
            return false;
        };
        if idx == 0 || idx == self.points.len() - 1 {
            return false;
        }
        self.points.remove(idx);
        true
    }

    /// Evaluate the envelope at a position
    ///
    /// The position is clamped into `[0, domain_max]`. A position that
    /// coincides with a breakpoint returns that breakpoint's level exactly;
    /// two breakpoints sharing a position resolve to the first of the equal
    /// group. Everything in between is linear interpolation.
    pub fn evaluate(&self, position: f64) -> f32 {
        debug_assert!(self.points.len() >= 2, "curve invariant violated");
        debug_assert!(self.points[0].position == 0.0, "first breakpoint unpinned");

        let pos = if position.is_finite() {
            position.clamp(0.0, self.domain_max)
        } else {
            0.0
        };

        // First breakpoint with position >= pos. The last breakpoint sits
        // at domain_max, so idx is always in range; idx == 0 only when pos
        // is exactly 0.
        let idx = self.points.partition_point(|bp| bp.position < pos);
        let right = &self.points[idx];
        if right.position == pos {
            return right.level;
        }

        let left = &self.points[idx - 1];
        let span = right.position - left.position;
        let t = ((pos - left.position) / span) as f32;
        left.level + (right.level - left.level) * t
    }
}

/// Clamp a level into `[0, 1]`, mapping non-finite input to silence
fn sanitize_level(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(MIN_LEVEL, MAX_LEVEL)
    } else {
        MIN_LEVEL
    }
}

/// Why a serialized curve was rejected on restore
#[derive(Debug, Error)]
pub enum CurveSnapshotError {
    #[error("curve needs at least 2 breakpoints, snapshot has {0}")]
    TooFewBreakpoints(usize),
    #[error("invalid curve domain {0}")]
    InvalidDomain(f64),
    #[error("breakpoints are not sorted within the domain")]
    UnsortedBreakpoints,
    #[error("boundary breakpoints are not pinned at 0 and domain_max")]
    UnpinnedEndpoints,
    #[error("id counter {next_id} does not cover breakpoint id {id}")]
    StaleIdCounter { next_id: u64, id: u64 },
}

/// Wire form of [`EnvelopeCurve`]; mutator invariants are re-checked before
/// the curve is accepted, so a hand-edited file cannot smuggle in a state
/// the mutators could never produce.
#[derive(Deserialize)]
struct CurveSnapshot {
    points: Vec<Breakpoint>,
    next_id: u64,
    domain_max: f64,
}

impl TryFrom<CurveSnapshot> for EnvelopeCurve {
    type Error = CurveSnapshotError;

    fn try_from(snapshot: CurveSnapshot) -> Result<Self, Self::Error> {
        if !snapshot.domain_max.is_finite() || snapshot.domain_max <= 0.0 {
            return Err(CurveSnapshotError::InvalidDomain(snapshot.domain_max));
        }
        if snapshot.points.len() < 2 {
            return Err(CurveSnapshotError::TooFewBreakpoints(snapshot.points.len()));
        }
        let in_domain = snapshot
            .points
            .iter()
            .all(|bp| bp.position.is_finite() && (0.0..=snapshot.domain_max).contains(&bp.position));
        let sorted = snapshot
            .points
            .windows(2)
            .all(|pair| pair[0].position <= pair[1].position);
        if !in_domain || !sorted {
            return Err(CurveSnapshotError::UnsortedBreakpoints);
        }
        let first = &snapshot.points[0];
        let last = &snapshot.points[snapshot.points.len() - 1];
        if first.position != 0.0 || last.position != snapshot.domain_max {
            return Err(CurveSnapshotError::UnpinnedEndpoints);
        }
        if let Some(bp) = snapshot.points.iter().find(|bp| bp.id.0 >= snapshot.next_id) {
            return Err(CurveSnapshotError::StaleIdCounter {
                next_id: snapshot.next_id,
                id: bp.id.0,
            });
        }

        let points = snapshot
            .points
            .into_iter()
            .map(|bp| Breakpoint {
                level: sanitize_level(bp.level),
                ..bp
            })
            .collect();
        Ok(Self {
            points,
            next_id: snapshot.next_id,
            domain_max: snapshot.domain_max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve_100() -> EnvelopeCurve {
        EnvelopeCurve::new(100.0)
    }

    #[test]
    fn test_new_curve_has_pinned_endpoints() {
        let curve = curve_100();
        assert_eq!(curve.len(), 2);
        assert_eq!(curve.breakpoints()[0].position(), 0.0);
        assert_eq!(curve.breakpoints()[1].position(), 100.0);
        assert_eq!(curve.breakpoints()[0].level(), DEFAULT_LEVEL);
    }

    #[test]
    fn test_add_rejects_boundary_positions() {
        let mut curve = curve_100();
        assert!(curve.add_breakpoint(0.0, 0.5).is_none());
        assert!(curve.add_breakpoint(100.0, 0.5).is_none());
        // Clamped onto a boundary is also rejected
        assert!(curve.add_breakpoint(-5.0, 0.5).is_none());
        assert!(curve.add_breakpoint(250.0, 0.5).is_none());
        assert_eq!(curve.len(), 2);
    }

    #[test]
    fn test_add_inserts_sorted_with_fresh_ids() {
        let mut curve = curve_100();
        let b = curve.add_breakpoint(75.0, 0.8).unwrap();
        let a = curve.add_breakpoint(25.0, 0.2).unwrap();
        assert_ne!(a, b);
        let positions: Vec<f64> = curve.breakpoints().iter().map(|p| p.position()).collect();
        assert_eq!(positions, vec![0.0, 25.0, 75.0, 100.0]);
    }

    #[test]
    fn test_evaluate_example_curve() {
        let mut curve = curve_100();
        curve.add_breakpoint(50.0, 0.5).unwrap();
        // Endpoints at 1.0, midpoint at 0.5
        assert_eq!(curve.evaluate(25.0), 0.75);
        assert_eq!(curve.evaluate(50.0), 0.5);
        assert_eq!(curve.evaluate(75.0), 0.75);
    }

    #[test]
    fn test_evaluate_exact_at_breakpoints() {
        let mut curve = curve_100();
        let id = curve.add_breakpoint(33.0, 0.37).unwrap();
        for bp in curve.breakpoints() {
            assert_eq!(curve.evaluate(bp.position()), bp.level());
        }
        assert_eq!(curve.breakpoint(id).unwrap().level(), 0.37);
    }

    #[test]
    fn test_evaluate_clamps_out_of_domain() {
        let mut curve = curve_100();
        curve.move_breakpoint(curve.breakpoints()[0].id(), 0.0, 0.2);
        assert_eq!(curve.evaluate(-10.0), 0.2);
        assert_eq!(curve.evaluate(1e9), curve.breakpoints().last().unwrap().level());
    }

    #[test]
    fn test_evaluate_monotonic_between_neighbours() {
        let mut curve = curve_100();
        curve.add_breakpoint(40.0, 0.1).unwrap();
        let mut prev = curve.evaluate(0.0);
        for i in 1..=40 {
            let v = curve.evaluate(i as f64);
            assert!(v <= prev, "expected non-increasing ramp, {v} > {prev}");
            prev = v;
        }
    }

    #[test]
    fn test_move_endpoint_keeps_position() {
        let mut curve = curve_100();
        let first = curve.breakpoints()[0].id();
        let last = curve.breakpoints()[1].id();
        assert!(curve.move_breakpoint(first, 42.0, 0.3));
        assert!(curve.move_breakpoint(last, -7.0, 0.6));
        assert_eq!(curve.breakpoints()[0].position(), 0.0);
        assert_eq!(curve.breakpoints()[0].level(), 0.3);
        assert_eq!(curve.breakpoints()[1].position(), 100.0);
        assert_eq!(curve.breakpoints()[1].level(), 0.6);
    }

    #[test]
    fn test_move_interior_reorders_on_crossing() {
        let mut curve = curve_100();
        let a = curve.add_breakpoint(30.0, 0.3).unwrap();
        let b = curve.add_breakpoint(60.0, 0.6).unwrap();
        // Drag a past b; both survive, order flips, ids stay
        assert!(curve.move_breakpoint(a, 80.0, 0.3));
        assert_eq!(curve.len(), 4);
        let ids: Vec<BreakpointId> = curve.breakpoints().iter().map(|p| p.id()).collect();
        assert_eq!(ids[1], b);
        assert_eq!(ids[2], a);
    }

    #[test]
    fn test_move_interior_clamps_level_and_position() {
        let mut curve = curve_100();
        let id = curve.add_breakpoint(50.0, 0.5).unwrap();
        assert!(curve.move_breakpoint(id, 200.0, 3.0));
        let bp = curve.breakpoint(id).unwrap();
        assert_eq!(bp.position(), 100.0);
        assert_eq!(bp.level(), 1.0);
        // Endpoint stays last despite the shared position
        assert_eq!(curve.breakpoints().last().unwrap().position(), 100.0);
        assert_ne!(curve.breakpoints().last().unwrap().id(), id);
    }

    #[test]
    fn test_equal_positions_resolve_to_first_of_group() {
        let mut curve = curve_100();
        let a = curve.add_breakpoint(50.0, 0.2).unwrap();
        curve.add_breakpoint(70.0, 0.9).unwrap();
        curve.move_breakpoint(a, 70.0, 0.2);
        // Two points at 70: the stable sort keeps the moved point ahead of
        // the one that was already there, and an exact hit reads the first
        // of the equal group without interpolating.
        assert_eq!(curve.evaluate(70.0), 0.2);
    }

    #[test]
    fn test_invalid_domain_falls_back_to_default() {
        for bad in [-10.0, 0.0, f64::NAN, f64::INFINITY] {
            let curve = EnvelopeCurve::new(bad);
            assert_eq!(curve.domain_max(), DOMAIN_WIDTH);
            assert_eq!(curve.evaluate(5.0), DEFAULT_LEVEL);
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut curve = curve_100();
        curve.add_breakpoint(40.0, 0.4).unwrap();
        let text = serde_yaml::to_string(&curve).unwrap();
        let restored: EnvelopeCurve = serde_yaml::from_str(&text).unwrap();
        assert_eq!(restored.breakpoints(), curve.breakpoints());
        assert_eq!(restored.evaluate(40.0), 0.4);
    }

    #[test]
    fn test_snapshot_restore_rejects_empty_points() {
        let text = "points: []\nnext_id: 0\ndomain_max: 100.0\n";
        let result: Result<EnvelopeCurve, _> = serde_yaml::from_str(text);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("at least 2 breakpoints"), "{err}");
    }

    #[test]
    fn test_snapshot_restore_rejects_unpinned_endpoints() {
        let text = "points:\n\
                    - id: 0\n  position: 5.0\n  level: 1.0\n\
                    - id: 1\n  position: 100.0\n  level: 1.0\n\
                    next_id: 2\n\
                    domain_max: 100.0\n";
        assert!(serde_yaml::from_str::<EnvelopeCurve>(text).is_err());
    }

    #[test]
    fn test_remove_rules() {
        let mut curve = curve_100();
        let first = curve.breakpoints()[0].id();
        let last = curve.breakpoints()[1].id();
        assert!(!curve.remove_breakpoint(first));
        assert!(!curve.remove_breakpoint(last));

        let mid = curve.add_breakpoint(50.0, 0.5).unwrap();
        assert!(!curve.remove_breakpoint(first));
        assert!(curve.remove_breakpoint(mid));
        assert_eq!(curve.len(), 2);
        // Back at the floor of 2, interior removal is gone too
        assert!(!curve.remove_breakpoint(mid));
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut curve = curve_100();
        let before = curve.breakpoints().to_vec();
        let bogus = BreakpointId(999);
        assert!(!curve.move_breakpoint(bogus, 10.0, 0.1));
        assert!(!curve.remove_breakpoint(bogus));
        assert_eq!(curve.breakpoints(), &before[..]);
    }
}
