// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Box resizing through a draggable overlay.
//!
//! While editing, each box is represented by an overlay rectangle and its
//! own trace is hidden. Leaving edit mode writes the dragged corners back
//! into the box points.

use super::shape::{Shape, ShapeKind, Visibility};
use std::collections::BTreeMap;

/// A rectangle on the editing overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    /// Overlay rectangles are drawn dashed to set them apart from traces
    pub dashed: bool,
}

/// Corner values reported by the overlay for one rectangle.
///
/// The overlay reports each field on its own, so any subset may be present.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RectEdit {
    pub x0: Option<f64>,
    pub y0: Option<f64>,
    pub x1: Option<f64>,
    pub y1: Option<f64>,
}

impl RectEdit {
    /// Full edit setting all four corners.
    pub fn corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: Some(x0),
            y0: Some(y0),
            x1: Some(x1),
            y1: Some(y1),
        }
    }

    /// Set a field by name (`x0`, `y0`, `x1`, `y1`). Unknown names are ignored.
    pub fn set(&mut self, field: &str, value: f64) -> bool {
        let slot = match field {
            "x0" => &mut self.x0,
            "y0" => &mut self.y0,
            "x1" => &mut self.x1,
            "y1" => &mut self.y1,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Later values win.
    fn merge(&mut self, other: RectEdit) {
        self.x0 = other.x0.or(self.x0);
        self.y0 = other.y0.or(self.y0);
        self.x1 = other.x1.or(self.x1);
        self.y1 = other.y1.or(self.y1);
    }

    pub fn apply(&self, rect: &OverlayRect) -> OverlayRect {
        OverlayRect {
            x0: self.x0.unwrap_or(rect.x0),
            y0: self.y0.unwrap_or(rect.y0),
            x1: self.x1.unwrap_or(rect.x1),
            y1: self.y1.unwrap_or(rect.y1),
            dashed: rect.dashed,
        }
    }
}

/// Overlay edits keyed by overlay rectangle index (draw order).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxEditState {
    edits: BTreeMap<usize, RectEdit>,
}

impl BoxEditState {
    pub fn record(&mut self, index: usize, edit: RectEdit) {
        self.edits.entry(index).or_default().merge(edit);
    }

    /// Record a relayout-style key such as `shapes[2].x0`.
    ///
    /// Returns false when the key does not name an overlay corner.
    pub fn record_key(&mut self, key: &str, value: f64) -> bool {
        let Some((index, field)) = parse_overlay_key(key) else {
            return false;
        };
        let mut edit = RectEdit::default();
        if !edit.set(field, value) {
            return false;
        }
        self.record(index, edit);
        true
    }

    pub fn get(&self, index: usize) -> Option<&RectEdit> {
        self.edits.get(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn clear(&mut self) {
        self.edits.clear();
    }
}

fn parse_overlay_key(key: &str) -> Option<(usize, &str)> {
    let rest = key.strip_prefix("shapes[")?;
    let (index, field) = rest.split_once("].")?;
    Some((index.parse().ok()?, field))
}

/// Box behind an overlay rectangle and how it was shown before editing.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EditTarget {
    index: usize,
    visible: Visibility,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum Mode {
    #[default]
    Display,
    Edit {
        overlay: Vec<OverlayRect>,
        targets: Vec<EditTarget>,
    },
}

/// Switches boxes between their display traces and the editing overlay.
#[derive(Debug, Clone, Default)]
pub struct BoxEditor {
    mode: Mode,
    edits: BoxEditState,
}

impl BoxEditor {
    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Edit { .. })
    }

    /// Move every box onto the overlay and hide its trace.
    ///
    /// Dismissed and removed boxes stay where they are. Does nothing if
    /// already editing.
    pub fn enter(&mut self, shapes: &mut [Shape]) -> &[OverlayRect] {
        if !self.is_editing() {
            let mut overlay = Vec::new();
            let mut targets = Vec::new();
            for (index, shape) in shapes.iter_mut().enumerate() {
                if shape.is_dismissed() {
                    continue;
                }
                if let Some((x0, y0, x1, y1)) = shape.box_corners() {
                    overlay.push(OverlayRect {
                        x0,
                        y0,
                        x1,
                        y1,
                        dashed: true,
                    });
                    targets.push(EditTarget {
                        index,
                        visible: shape.visible,
                    });
                    shape.visible = Visibility::LegendOnly;
                }
            }
            log::debug!("Entered box edit mode with {} boxes", overlay.len());
            self.edits.clear();
            self.mode = Mode::Edit { overlay, targets };
        }
        self.overlay()
    }

    /// Overlay rectangles as they were when edit mode began.
    pub fn overlay(&self) -> &[OverlayRect] {
        match &self.mode {
            Mode::Edit { overlay, .. } => overlay,
            Mode::Display => &[],
        }
    }

    /// Overlay rectangles with the edits recorded so far applied.
    pub fn current_overlay(&self) -> Vec<OverlayRect> {
        self.overlay()
            .iter()
            .enumerate()
            .map(|(i, rect)| match self.edits.get(i) {
                Some(edit) => edit.apply(rect),
                None => *rect,
            })
            .collect()
    }

    /// Shape index behind an overlay rectangle.
    pub fn target(&self, overlay_index: usize) -> Option<usize> {
        match &self.mode {
            Mode::Edit { targets, .. } => targets.get(overlay_index).map(|t| t.index),
            Mode::Display => None,
        }
    }

    pub fn edits(&self) -> &BoxEditState {
        &self.edits
    }

    /// Record an overlay edit. Ignored outside edit mode.
    pub fn record(&mut self, overlay_index: usize, edit: RectEdit) {
        if overlay_index < self.overlay().len() {
            self.edits.record(overlay_index, edit);
        }
    }

    /// Record a relayout-style overlay key. Ignored outside edit mode.
    pub fn record_key(&mut self, key: &str, value: f64) -> bool {
        match parse_overlay_key(key) {
            Some((index, _)) if index < self.overlay().len() => self.edits.record_key(key, value),
            _ => false,
        }
    }

    /// Write overlay edits back into the boxes and restore their visibility.
    ///
    /// Returns the number of boxes whose points were rewritten.
    pub fn leave(&mut self, shapes: &mut [Shape]) -> usize {
        let Mode::Edit { overlay, targets } = std::mem::take(&mut self.mode) else {
            return 0;
        };

        let mut rewritten = 0;
        for (overlay_index, (rect, target)) in overlay.iter().zip(targets.iter()).enumerate() {
            let Some(shape) = shapes.get_mut(target.index) else {
                log::warn!("Box {} vanished while editing", target.index);
                continue;
            };
            if shape.kind != ShapeKind::Box {
                continue;
            }
            if let Some(edit) = self.edits.get(overlay_index) {
                let edited = edit.apply(rect);
                shape.set_box_corners(edited.x0, edited.y0, edited.x1, edited.y1);
                rewritten += 1;
            }
            shape.visible = target.visible;
        }

        log::debug!("Left box edit mode, {} boxes rewritten", rewritten);
        self.edits.clear();
        rewritten
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::label::{Label, Rgb};
    use crate::models::shape::Point;

    fn shapes() -> Vec<Shape> {
        let label = Label::new("car", Rgb(255, 0, 0));
        vec![
            Shape::new_box(1.0, 2.0, 10.0, 20.0, label.clone()),
            Shape::new(
                ShapeKind::Line,
                vec![Point::new(0.0, 0.0), Point::new(3.0, 3.0)],
                label.clone(),
            ),
            Shape::new_box(30.5, 40.25, 60.0, 80.0, label.clone()),
            Shape::new_box(100.0, 100.0, 120.0, 130.0, label),
        ]
    }

    #[test]
    fn test_enter_hides_boxes_and_builds_overlay() {
        let mut set = shapes();
        let mut editor = BoxEditor::default();

        let overlay = editor.enter(&mut set).to_vec();
        assert_eq!(overlay.len(), 3);
        assert!(overlay.iter().all(|r| r.dashed));
        assert_eq!((overlay[1].x0, overlay[1].y1), (30.5, 80.0));

        assert_eq!(set[0].visible, Visibility::LegendOnly);
        assert_eq!(set[1].visible, Visibility::Shown);
        assert_eq!(editor.target(1), Some(2));
    }

    #[test]
    fn test_hidden_boxes_keep_their_visibility() {
        let mut set = shapes();
        set[0].visible = Visibility::LegendOnly;
        set[0].show_in_legend = false;
        set[2].visible = Visibility::LegendOnly;
        let mut editor = BoxEditor::default();

        let overlay = editor.enter(&mut set).to_vec();
        assert_eq!(overlay.len(), 2);
        assert_eq!(editor.target(0), Some(2));
        assert_eq!(set[3].visible, Visibility::LegendOnly);

        editor.record(0, RectEdit::corners(0.0, 0.0, 5.0, 5.0));
        assert_eq!(editor.leave(&mut set), 1);

        assert_eq!(set[0].visible, Visibility::LegendOnly);
        assert!(!set[0].show_in_legend);
        assert_eq!(set[0].box_corners(), Some((1.0, 2.0, 10.0, 20.0)));
        assert_eq!(set[2].visible, Visibility::LegendOnly);
        assert_eq!(set[2].box_corners(), Some((0.0, 0.0, 5.0, 5.0)));
        assert_eq!(set[3].visible, Visibility::Shown);
    }

    #[test]
    fn test_roundtrip_without_edits_is_identity() {
        let original = shapes();
        let mut set = original.clone();
        let mut editor = BoxEditor::default();

        editor.enter(&mut set);
        assert_eq!(editor.leave(&mut set), 0);

        assert_eq!(set, original);
        assert!(!editor.is_editing());
        assert!(editor.overlay().is_empty());
    }

    #[test]
    fn test_edit_one_box() {
        let original = shapes();
        let mut set = original.clone();
        let mut editor = BoxEditor::default();

        editor.enter(&mut set);
        editor.record(1, RectEdit::corners(35.0, 45.0, 65.0, 85.0));
        assert_eq!(editor.leave(&mut set), 1);

        assert_eq!(set[2].box_corners(), Some((35.0, 45.0, 65.0, 85.0)));
        assert_eq!(set[2].points[0], set[2].points[4]);
        assert_eq!(set[2].visible, Visibility::Shown);
        assert_eq!(set[0], original[0]);
        assert_eq!(set[1], original[1]);
        assert_eq!(set[3], original[3]);
    }

    #[test]
    fn test_partial_key_edits() {
        let mut set = shapes();
        let mut editor = BoxEditor::default();

        editor.enter(&mut set);
        assert!(editor.record_key("shapes[0].x1", 12.0));
        assert!(editor.record_key("shapes[0].y0", 3.0));
        assert!(!editor.record_key("shapes[0].fillcolor", 1.0));
        assert!(!editor.record_key("shapes[9].x0", 1.0));
        assert!(!editor.record_key("xaxis.range[0]", 1.0));
        editor.leave(&mut set);

        assert_eq!(set[0].box_corners(), Some((1.0, 3.0, 12.0, 20.0)));
    }

    #[test]
    fn test_current_overlay_reflects_edits() {
        let mut set = shapes();
        let mut editor = BoxEditor::default();

        editor.enter(&mut set);
        editor.record(
            2,
            RectEdit {
                x0: Some(90.0),
                ..Default::default()
            },
        );
        let current = editor.current_overlay();
        assert_eq!(current[2].x0, 90.0);
        assert_eq!(current[2].x1, 120.0);
        assert_eq!(current[0], editor.overlay()[0]);
    }

    #[test]
    fn test_record_outside_edit_mode_is_ignored() {
        let mut set = shapes();
        let mut editor = BoxEditor::default();

        editor.record(0, RectEdit::corners(0.0, 0.0, 1.0, 1.0));
        assert!(editor.edits().is_empty());
        assert_eq!(editor.leave(&mut set), 0);
    }
}
