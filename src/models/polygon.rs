// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Click-by-click construction of polygons and polylines.
//!
//! Each click produces a complete shape that replaces the previous one on
//! the canvas, so the in-progress annotation is always displayable.

use super::label::Label;
use super::shape::{LassoMode, Point, Shape, ShapeKind};
use crate::error::AnnotationError;

/// Clicks with a coordinate below this value abort the current gesture.
pub const MIN_COORDINATE: f64 = -1.0e6;

/// The point the canvas reports when the user aborts a gesture.
pub const CANCEL_POINT: Point = Point {
    x: f64::MIN,
    y: f64::MIN,
};

/// Minimum number of distinct clicks before a ring can be closed by
/// clicking its start point.
const MIN_RING_CLICKS: usize = 3;

/// Check if a point is the abort sentinel.
pub fn is_cancel_point(point: &Point) -> bool {
    !point.x.is_finite()
        || !point.y.is_finite()
        || point.x < MIN_COORDINATE
        || point.y < MIN_COORDINATE
}

/// Clicks collected for one gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPolygon {
    clicks: Vec<Point>,
    mode: LassoMode,
    label: Label,
}

impl PendingPolygon {
    fn start(first: Point, mode: LassoMode, label: Label) -> Self {
        Self {
            clicks: vec![first],
            mode,
            label,
        }
    }

    pub fn clicks(&self) -> &[Point] {
        &self.clicks
    }

    pub fn mode(&self) -> LassoMode {
        self.mode
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Points of the committed shape.
    ///
    /// Lines double their first point so a single click already draws a
    /// segment. Polygons always end on their first point.
    pub fn points(&self) -> Vec<Point> {
        let first = self.clicks[0];
        let mut points = Vec::with_capacity(self.clicks.len() + 1);
        match self.mode {
            LassoMode::Open => {
                points.push(first);
                points.extend_from_slice(&self.clicks);
            }
            LassoMode::Closed => {
                points.extend_from_slice(&self.clicks);
                points.push(first);
            }
        }
        points
    }

    pub fn to_shape(&self) -> Shape {
        let kind = match self.mode {
            LassoMode::Open => ShapeKind::Line,
            LassoMode::Closed => ShapeKind::Polygon,
        };
        Shape::new(kind, self.points(), self.label.clone())
    }
}

/// Accumulator state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AccumulatorState {
    #[default]
    Empty,
    Open(PendingPolygon),
    ClosedReadyForCommit(PendingPolygon),
}

/// What a click did to the gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum PointOutcome {
    /// A new gesture began; the shape should be appended
    Started(Shape),
    /// The gesture grew; the shape replaces the previous commit
    Extended(Shape),
    /// The ring was closed on its start point; the gesture is complete
    Closed(Shape),
    /// The gesture was aborted; any committed shape should be dropped
    Cancelled,
}

/// Builds polygons and lines from discrete clicks.
#[derive(Debug, Clone)]
pub struct PolygonAccumulator {
    state: AccumulatorState,
    close_tolerance: f64,
}

impl Default for PolygonAccumulator {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl PolygonAccumulator {
    /// Create an accumulator. Polygon clicks within `close_tolerance` pixels
    /// of the first point close the ring.
    pub fn new(close_tolerance: f64) -> Self {
        Self {
            state: AccumulatorState::Empty,
            close_tolerance,
        }
    }

    pub fn state(&self) -> &AccumulatorState {
        &self.state
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.state, AccumulatorState::Empty)
    }

    /// Label of the gesture in progress.
    pub fn pending_label(&self) -> Option<&Label> {
        match &self.state {
            AccumulatorState::Open(pending) | AccumulatorState::ClosedReadyForCommit(pending) => {
                Some(pending.label())
            }
            AccumulatorState::Empty => None,
        }
    }

    /// Feed one click into the gesture.
    ///
    /// `label` and `mode` only matter when the click starts a new gesture.
    pub fn add_point(
        &mut self,
        point: Point,
        label: Option<&Label>,
        mode: LassoMode,
    ) -> Result<PointOutcome, AnnotationError> {
        if is_cancel_point(&point) {
            self.state = AccumulatorState::Empty;
            return Ok(PointOutcome::Cancelled);
        }

        match std::mem::take(&mut self.state) {
            AccumulatorState::Open(mut pending) => {
                if self.closes_ring(&pending, &point) {
                    let shape = pending.to_shape();
                    self.state = AccumulatorState::ClosedReadyForCommit(pending);
                    return Ok(PointOutcome::Closed(shape));
                }
                pending.clicks.push(point);
                let shape = pending.to_shape();
                self.state = AccumulatorState::Open(pending);
                Ok(PointOutcome::Extended(shape))
            }
            AccumulatorState::Empty | AccumulatorState::ClosedReadyForCommit(_) => {
                let label = label.ok_or(AnnotationError::NoLabelSelected)?;
                let pending = PendingPolygon::start(point, mode, label.clone());
                let shape = pending.to_shape();
                self.state = AccumulatorState::Open(pending);
                Ok(PointOutcome::Started(shape))
            }
        }
    }

    /// Take a ring that was closed on its start point, resetting to `Empty`.
    pub fn complete_if_closed(&mut self) -> Option<Shape> {
        match std::mem::take(&mut self.state) {
            AccumulatorState::ClosedReadyForCommit(pending) => Some(pending.to_shape()),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// End the gesture, returning its final shape.
    pub fn finish(&mut self) -> Option<Shape> {
        match std::mem::take(&mut self.state) {
            AccumulatorState::Open(pending) | AccumulatorState::ClosedReadyForCommit(pending) => {
                Some(pending.to_shape())
            }
            AccumulatorState::Empty => None,
        }
    }

    /// Abort the gesture.
    pub fn cancel(&mut self) {
        self.state = AccumulatorState::Empty;
    }

    fn closes_ring(&self, pending: &PendingPolygon, point: &Point) -> bool {
        pending.mode == LassoMode::Closed
            && pending.clicks.len() >= MIN_RING_CLICKS
            && point.distance(&pending.clicks[0]) <= self.close_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::label::Rgb;

    fn label() -> Label {
        Label::new("road", Rgb(0, 0, 255))
    }

    fn shape_of(outcome: PointOutcome) -> Shape {
        match outcome {
            PointOutcome::Started(s) | PointOutcome::Extended(s) | PointOutcome::Closed(s) => s,
            PointOutcome::Cancelled => panic!("unexpected cancel"),
        }
    }

    #[test]
    fn test_polygon_closed_after_every_commit() {
        let mut acc = PolygonAccumulator::new(0.0);
        let clicks = [(10.0, 10.0), (40.0, 12.0), (38.0, 50.0), (5.0, 44.0), (1.0, 20.0)];

        for (i, (x, y)) in clicks.iter().enumerate() {
            let shape = shape_of(
                acc.add_point(Point::new(*x, *y), Some(&label()), LassoMode::Closed)
                    .unwrap(),
            );
            assert_eq!(shape.kind, ShapeKind::Polygon);
            assert_eq!(shape.points.first(), shape.points.last());
            assert_eq!(shape.points.len(), i + 2);
            assert_eq!(shape.points[i], Point::new(*x, *y));
        }
    }

    #[test]
    fn test_line_first_point_doubled_and_never_closed() {
        let mut acc = PolygonAccumulator::new(0.0);
        let first = shape_of(
            acc.add_point(Point::new(1.0, 1.0), Some(&label()), LassoMode::Open)
                .unwrap(),
        );
        assert_eq!(first.points, vec![Point::new(1.0, 1.0), Point::new(1.0, 1.0)]);

        for (x, y) in [(5.0, 1.0), (9.0, 4.0), (2.0, 7.0)] {
            let shape = shape_of(acc.add_point(Point::new(x, y), None, LassoMode::Open).unwrap());
            assert_eq!(shape.kind, ShapeKind::Line);
            assert_ne!(shape.points.first(), shape.points.last());
            assert_eq!(shape.points.last(), Some(&Point::new(x, y)));
        }
    }

    #[test]
    fn test_line_closes_only_when_start_clicked_again() {
        let mut acc = PolygonAccumulator::new(100.0);
        for (x, y) in [(1.0, 1.0), (5.0, 1.0), (5.0, 5.0)] {
            acc.add_point(Point::new(x, y), Some(&label()), LassoMode::Open)
                .unwrap();
        }
        let shape = shape_of(acc.add_point(Point::new(1.0, 1.0), None, LassoMode::Open).unwrap());
        assert_eq!(shape.points.first(), shape.points.last());
        assert!(matches!(acc.state(), AccumulatorState::Open(_)));
    }

    #[test]
    fn test_cancel_point_resets() {
        let mut acc = PolygonAccumulator::new(0.0);
        acc.add_point(Point::new(1.0, 1.0), Some(&label()), LassoMode::Closed)
            .unwrap();

        let outcome = acc.add_point(CANCEL_POINT, None, LassoMode::Closed).unwrap();
        assert_eq!(outcome, PointOutcome::Cancelled);
        assert!(acc.is_empty());
    }

    #[test]
    fn test_cancel_point_detection() {
        assert!(is_cancel_point(&CANCEL_POINT));
        assert!(is_cancel_point(&Point::new(f64::NAN, 3.0)));
        assert!(is_cancel_point(&Point::new(3.0, -2.0e6)));
        assert!(!is_cancel_point(&Point::new(-5.0, -5.0)));
    }

    #[test]
    fn test_first_point_requires_label() {
        let mut acc = PolygonAccumulator::new(0.0);
        assert_eq!(
            acc.add_point(Point::new(1.0, 1.0), None, LassoMode::Closed),
            Err(AnnotationError::NoLabelSelected)
        );
        assert!(acc.is_empty());
    }

    #[test]
    fn test_click_near_start_closes_ring() {
        let mut acc = PolygonAccumulator::new(3.0);
        for (x, y) in [(10.0, 10.0), (50.0, 10.0), (50.0, 50.0)] {
            acc.add_point(Point::new(x, y), Some(&label()), LassoMode::Closed)
                .unwrap();
        }

        let outcome = acc
            .add_point(Point::new(11.0, 11.0), None, LassoMode::Closed)
            .unwrap();
        let closed = match outcome {
            PointOutcome::Closed(shape) => shape,
            other => panic!("expected closed ring, got {:?}", other),
        };
        assert_eq!(closed.points.len(), 4);
        assert_eq!(closed.points[0], closed.points[3]);

        assert_eq!(acc.complete_if_closed(), Some(closed));
        assert!(acc.is_empty());
    }

    #[test]
    fn test_finish_returns_shape() {
        let mut acc = PolygonAccumulator::new(0.0);
        assert!(acc.finish().is_none());

        acc.add_point(Point::new(1.0, 1.0), Some(&label()), LassoMode::Open)
            .unwrap();
        acc.add_point(Point::new(2.0, 2.0), None, LassoMode::Open)
            .unwrap();
        let shape = acc.finish().unwrap();
        assert_eq!(shape.points.len(), 3);
        assert!(acc.is_empty());
    }
}
