// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Shape data structures.
//!
//! This module defines the persisted annotation record and the rules for
//! deriving one from a raw selection gesture.

use super::label::Label;
use crate::error::AnnotationError;
use serde::{Deserialize, Serialize};

/// A 2D point in image pixel coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Type of annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Box,
    Line,
    Polygon,
    Model,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Line => "line",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Model => "model",
        }
    }
}

/// Visibility of a shape on the canvas and in the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Drawn on the canvas
    #[default]
    Shown,
    /// Hidden from the canvas but still listed in the legend
    LegendOnly,
    /// Off the canvas and out of filtering; only toggling shows it again
    Removed,
}

/// Where a shape came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Source {
    #[default]
    User,
    Model { run_id: String, artifact: String },
}

/// Whether free-form gestures stay open (lines) or close into polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LassoMode {
    Open,
    #[default]
    Closed,
}

/// A raw selection gesture reported by the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Rectangular drag: `x = [x0, x1]`, `y = [y0, y1]`
    Range { x: [f64; 2], y: [f64; 2] },
    /// Free-form point list
    Lasso { x: Vec<f64>, y: Vec<f64> },
}

/// One annotation bound to an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub points: Vec<Point>,
    pub label: Label,
    #[serde(default)]
    pub visible: Visibility,
    #[serde(default = "default_show_in_legend")]
    pub show_in_legend: bool,
    #[serde(default)]
    pub source: Source,
}

fn default_show_in_legend() -> bool {
    true
}

impl Shape {
    /// Create a shape drawn by the user.
    pub fn new(kind: ShapeKind, points: Vec<Point>, label: Label) -> Self {
        Self {
            kind,
            points,
            label,
            visible: Visibility::Shown,
            show_in_legend: true,
            source: Source::User,
        }
    }

    /// Create a box from two opposite corners as a closed 5-point ring.
    pub fn new_box(x0: f64, y0: f64, x1: f64, y1: f64, label: Label) -> Self {
        Self::new(ShapeKind::Box, box_ring(x0, y0, x1, y1), label)
    }

    /// Legend name, e.g. `"car -box"`.
    pub fn name(&self) -> String {
        format!("{} -{}", self.label.name, self.kind.name())
    }

    /// Check if the shape is a closed ring.
    pub fn is_closed(&self) -> bool {
        matches!(self.kind, ShapeKind::Box | ShapeKind::Polygon)
    }

    pub fn is_shown(&self) -> bool {
        self.visible == Visibility::Shown
    }

    /// Whether the user has taken the shape out of the editing surface.
    pub fn is_dismissed(&self) -> bool {
        !self.show_in_legend || self.visible == Visibility::Removed
    }

    /// Corners `(x0, y0, x1, y1)` of a well-formed box.
    pub fn box_corners(&self) -> Option<(f64, f64, f64, f64)> {
        if self.kind != ShapeKind::Box || self.points.len() != 5 {
            return None;
        }
        let start = self.points[0];
        let opposite = self.points[2];
        Some((start.x, start.y, opposite.x, opposite.y))
    }

    /// Rewrite all five box points from new corners, keeping the ring closed.
    pub fn set_box_corners(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        self.points = box_ring(x0, y0, x1, y1);
    }
}

fn box_ring(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
    vec![
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
        Point::new(x0, y0),
    ]
}

/// Build a shape from a finished selection gesture.
///
/// Rectangular ranges become boxes. Free-form point lists become lines in
/// open mode and closed polygons otherwise.
pub fn create_from_selection(
    selection: &Selection,
    label: Option<&Label>,
    mode: LassoMode,
) -> Result<Shape, AnnotationError> {
    let label = label.ok_or(AnnotationError::NoLabelSelected)?.clone();

    match selection {
        Selection::Range { x, y } => Ok(Shape::new_box(x[0], y[0], x[1], y[1], label)),
        Selection::Lasso { x, y } => {
            if x.is_empty() || x.len() != y.len() {
                return Err(AnnotationError::EmptySelection);
            }
            let mut points: Vec<Point> = x
                .iter()
                .zip(y.iter())
                .map(|(&px, &py)| Point::new(px, py))
                .collect();

            let kind = match mode {
                LassoMode::Open => ShapeKind::Line,
                LassoMode::Closed => {
                    points.push(points[0]);
                    ShapeKind::Polygon
                }
            };
            Ok(Shape::new(kind, points, label))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::label::Rgb;

    fn car() -> Label {
        Label::new("car", Rgb(255, 0, 0))
    }

    #[test]
    fn test_range_becomes_closed_box() {
        let ranges = [
            ([10.0, 50.0], [20.0, 80.0]),
            ([50.0, 10.0], [80.0, 20.0]),
            ([0.0, 0.5], [-3.25, 1e4]),
        ];

        for (x, y) in ranges {
            let shape =
                create_from_selection(&Selection::Range { x, y }, Some(&car()), LassoMode::Closed)
                    .unwrap();
            assert_eq!(shape.kind, ShapeKind::Box);
            assert_eq!(shape.points.len(), 5);
            assert_eq!(shape.points[0], shape.points[4]);
            assert_eq!(shape.points[0], Point::new(x[0], y[0]));
            assert_eq!(shape.points[1], Point::new(x[1], y[0]));
            assert_eq!(shape.points[2], Point::new(x[1], y[1]));
            assert_eq!(shape.points[3], Point::new(x[0], y[1]));
        }
    }

    #[test]
    fn test_lasso_closed_mode_makes_polygon() {
        let selection = Selection::Lasso {
            x: vec![1.0, 5.0, 3.0],
            y: vec![1.0, 1.0, 4.0],
        };
        let shape = create_from_selection(&selection, Some(&car()), LassoMode::Closed).unwrap();

        assert_eq!(shape.kind, ShapeKind::Polygon);
        assert_eq!(shape.points.len(), 4);
        assert_eq!(shape.points.first(), shape.points.last());
        assert_eq!(shape.name(), "car -polygon");
    }

    #[test]
    fn test_lasso_open_mode_makes_line() {
        let selection = Selection::Lasso {
            x: vec![1.0, 5.0, 3.0],
            y: vec![1.0, 1.0, 4.0],
        };
        let shape = create_from_selection(&selection, Some(&car()), LassoMode::Open).unwrap();

        assert_eq!(shape.kind, ShapeKind::Line);
        assert_eq!(shape.points.len(), 3);
        assert_ne!(shape.points.first(), shape.points.last());
    }

    #[test]
    fn test_no_label_selected() {
        let selection = Selection::Range {
            x: [0.0, 1.0],
            y: [0.0, 1.0],
        };
        assert_eq!(
            create_from_selection(&selection, None, LassoMode::Closed),
            Err(AnnotationError::NoLabelSelected)
        );
    }

    #[test]
    fn test_empty_lasso_rejected() {
        let empty = Selection::Lasso {
            x: vec![],
            y: vec![],
        };
        let ragged = Selection::Lasso {
            x: vec![1.0, 2.0],
            y: vec![1.0],
        };
        assert_eq!(
            create_from_selection(&empty, Some(&car()), LassoMode::Closed),
            Err(AnnotationError::EmptySelection)
        );
        assert_eq!(
            create_from_selection(&ragged, Some(&car()), LassoMode::Open),
            Err(AnnotationError::EmptySelection)
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"type":"line","points":[{"x":1.0,"y":2.0}],"label":{"name":"a","color":"rgb(0,0,0)"}}"#;
        let shape: Shape = serde_json::from_str(json).unwrap();

        assert_eq!(shape.visible, Visibility::Shown);
        assert!(shape.show_in_legend);
        assert_eq!(shape.source, Source::User);
    }

    #[test]
    fn test_removed_visibility_from_metadata() {
        let json = r#"{"type":"box","points":[],"label":{"name":"a","color":"rgb(0,0,0)"},"visible":"removed"}"#;
        let shape: Shape = serde_json::from_str(json).unwrap();

        assert_eq!(shape.visible, Visibility::Removed);
        assert!(shape.show_in_legend);
        assert!(shape.is_dismissed());
        assert!(!shape.is_shown());
    }

    #[test]
    fn test_box_corners_roundtrip() {
        let mut shape = Shape::new_box(1.0, 2.0, 3.0, 4.0, car());
        assert_eq!(shape.box_corners(), Some((1.0, 2.0, 3.0, 4.0)));

        shape.set_box_corners(5.0, 6.0, 7.0, 8.0);
        assert_eq!(shape.box_corners(), Some((5.0, 6.0, 7.0, 8.0)));
        assert_eq!(shape.points[0], shape.points[4]);
    }
}
