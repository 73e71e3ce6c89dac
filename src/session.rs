// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation session state.
//!
//! The session owns everything an editing pass reads and writes: the
//! annotation set of the open image, the label table, the polygon gesture
//! in progress and the box editor. Each interaction is one method call.

use crate::error::{AnnotationError, InferenceError};
use crate::io::inference::{self, ModelRegistry};
use crate::io::serialization::ExportData;
use crate::io::store::{ImageId, ImageStore};
use crate::models::annotation_set::{AnnotationSet, LabelFilter};
use crate::models::box_edit::{BoxEditor, OverlayRect, RectEdit};
use crate::models::label::{Label, LabelTable};
use crate::models::polygon::{PolygonAccumulator, PointOutcome};
use crate::models::shape::{
    create_from_selection, LassoMode, Point, Selection, Shape, Visibility,
};
use anyhow::{bail, Result};

/// What pushing a snapshot displaced, so a redundant snapshot can be taken back.
#[derive(Debug)]
struct Checkpoint {
    /// Oldest state dropped to stay within the size limit
    evicted: Option<Vec<Shape>>,
    /// Redo states cleared by the push
    redo: Vec<Vec<Shape>>,
}

/// Bounded undo/redo history of annotation sets.
#[derive(Debug)]
struct History {
    undo_stack: Vec<Vec<Shape>>,
    redo_stack: Vec<Vec<Shape>>,
    max_size: usize,
}

impl History {
    fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: 50,
        }
    }

    /// Save the state before a change.
    fn push(&mut self, shapes: Vec<Shape>) -> Checkpoint {
        self.undo_stack.push(shapes);
        let evicted = (self.undo_stack.len() > self.max_size).then(|| self.undo_stack.remove(0));
        Checkpoint {
            evicted,
            redo: std::mem::take(&mut self.redo_stack),
        }
    }

    /// Take back the latest push. Must follow that push with no other in between.
    fn retract(&mut self, checkpoint: Checkpoint) {
        self.undo_stack.pop();
        if let Some(oldest) = checkpoint.evicted {
            self.undo_stack.insert(0, oldest);
        }
        self.redo_stack = checkpoint.redo;
    }

    fn undo(&mut self, current: Vec<Shape>) -> Option<Vec<Shape>> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    fn redo(&mut self, current: Vec<Shape>) -> Option<Vec<Shape>> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Editing state for one open image.
#[derive(Debug)]
pub struct AnnotatorSession {
    image_id: Option<ImageId>,
    set: AnnotationSet,
    labels: LabelTable,
    accumulator: PolygonAccumulator,
    /// Index of the shape the current click gesture keeps replacing
    live_shape: Option<usize>,
    /// Snapshot taken when the live shape was started
    live_checkpoint: Option<Checkpoint>,
    box_editor: BoxEditor,
    /// Snapshot taken when edit mode was entered
    edit_checkpoint: Option<Checkpoint>,
    lasso_mode: LassoMode,
    filter: Option<LabelFilter>,
    history: History,
}

impl AnnotatorSession {
    pub fn new(labels: Vec<Label>, close_tolerance: f64) -> Self {
        Self {
            image_id: None,
            set: AnnotationSet::default(),
            labels: LabelTable::new(labels),
            accumulator: PolygonAccumulator::new(close_tolerance),
            live_shape: None,
            live_checkpoint: None,
            box_editor: BoxEditor::default(),
            edit_checkpoint: None,
            lasso_mode: LassoMode::default(),
            filter: None,
            history: History::new(),
        }
    }

    pub fn image_id(&self) -> Option<&ImageId> {
        self.image_id.as_ref()
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.set
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn lasso_mode(&self) -> LassoMode {
        self.lasso_mode
    }

    pub fn is_editing(&self) -> bool {
        self.box_editor.is_editing()
    }

    pub fn is_drawing(&self) -> bool {
        !self.accumulator.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Load an image's annotations. On failure the session is unchanged.
    pub fn open_image<S: ImageStore + ?Sized>(&mut self, store: &S, id: &ImageId) -> Result<()> {
        let set = AnnotationSet::load_for(store, id, self.filter.as_ref())?;
        self.set = set;
        self.image_id = Some(id.clone());
        self.accumulator.cancel();
        self.live_shape = None;
        self.live_checkpoint = None;
        self.box_editor = BoxEditor::default();
        self.edit_checkpoint = None;
        self.history.clear();
        Ok(())
    }

    /// Persist the whole annotation set, applying pending box edits first.
    pub fn save<S: ImageStore + ?Sized>(&mut self, store: &mut S) -> Result<()> {
        let Some(id) = self.image_id.clone() else {
            bail!("no image is open");
        };
        self.finish_gesture();
        if self.is_editing() {
            self.leave_edit_mode();
        }
        self.set.save_to(store, &id)
    }

    /// Apply filter text. Blank text shows every shape.
    pub fn set_filter(&mut self, text: &str) {
        self.filter = LabelFilter::parse(text);
        match &self.filter {
            Some(filter) => self.set.apply_filter(filter),
            None => self.set.clear_filter(),
        }
    }

    pub fn select_label(&mut self, row: usize) {
        if self.labels.selected_row() != Some(row) {
            self.finish_gesture();
        }
        self.labels.select(row);
    }

    pub fn add_label(&mut self, label: Label) {
        self.labels.add(label);
    }

    pub fn set_lasso_mode(&mut self, mode: LassoMode) {
        if mode != self.lasso_mode {
            self.finish_gesture();
            self.lasso_mode = mode;
        }
    }

    fn ensure_drawing_allowed(&self) -> Result<(), AnnotationError> {
        if self.is_editing() {
            return Err(AnnotationError::EditModeActive);
        }
        Ok(())
    }

    /// Add a shape from a finished drag gesture. Returns its index.
    pub fn on_selection(&mut self, selection: &Selection) -> Result<usize, AnnotationError> {
        self.ensure_drawing_allowed()?;
        self.finish_gesture();

        let shape = create_from_selection(selection, self.labels.selected(), self.lasso_mode)?;
        self.history.push(self.set.shapes().to_vec());
        let index = self.set.append(shape);
        log::info!("Added {} at index {}", self.set.shapes()[index].name(), index);
        Ok(index)
    }

    /// Feed one click into the polygon or line being built.
    pub fn on_click(&mut self, point: Point) -> Result<PointOutcome, AnnotationError> {
        self.ensure_drawing_allowed()?;
        let outcome = self
            .accumulator
            .add_point(point, self.labels.selected(), self.lasso_mode)?;

        match &outcome {
            PointOutcome::Started(shape) => {
                self.live_checkpoint = Some(self.history.push(self.set.shapes().to_vec()));
                self.live_shape = Some(self.set.append(shape.clone()));
            }
            PointOutcome::Extended(shape) => self.commit_live(shape.clone()),
            PointOutcome::Closed(shape) => {
                self.commit_live(shape.clone());
                self.accumulator.complete_if_closed();
                self.live_shape = None;
                self.live_checkpoint = None;
                log::info!("Closed {}", shape.name());
            }
            PointOutcome::Cancelled => self.drop_live(),
        }
        log::debug!("Click at ({:.1}, {:.1})", point.x, point.y);
        Ok(outcome)
    }

    fn commit_live(&mut self, shape: Shape) {
        match self.live_shape {
            Some(index) if self.set.replace(index, shape.clone()).is_ok() => {}
            _ => self.live_shape = Some(self.set.append(shape)),
        }
    }

    fn drop_live(&mut self) {
        let checkpoint = self.live_checkpoint.take();
        if let Some(index) = self.live_shape.take() {
            if self.set.remove(index).is_ok() {
                if let Some(checkpoint) = checkpoint {
                    self.history.retract(checkpoint);
                }
                log::info!("Cancelled shape in progress");
            }
        }
    }

    /// End the click gesture, keeping what was drawn.
    pub fn finish_gesture(&mut self) -> Option<usize> {
        let finished = self.accumulator.finish();
        let index = self.live_shape.take();
        self.live_checkpoint = None;
        if let Some(shape) = finished {
            log::info!("Finished {} with {} points", shape.name(), shape.points.len());
        }
        index
    }

    /// End the click gesture and drop its shape.
    pub fn cancel_gesture(&mut self) {
        self.accumulator.cancel();
        self.drop_live();
    }

    /// Move boxes onto the editing overlay.
    pub fn enter_edit_mode(&mut self) -> Vec<OverlayRect> {
        self.finish_gesture();
        if !self.is_editing() {
            self.edit_checkpoint = Some(self.history.push(self.set.shapes().to_vec()));
        }
        self.box_editor.enter(self.set.shapes_mut()).to_vec()
    }

    /// Write overlay edits back into boxes. Returns the number rewritten.
    pub fn leave_edit_mode(&mut self) -> usize {
        if !self.is_editing() {
            return 0;
        }
        let rewritten = self.box_editor.leave(self.set.shapes_mut());
        if let Some(checkpoint) = self.edit_checkpoint.take() {
            if rewritten == 0 {
                self.history.retract(checkpoint);
            }
        }
        rewritten
    }

    /// Toggle edit mode. Returns whether edit mode is now active.
    pub fn toggle_edit_mode(&mut self) -> bool {
        if self.is_editing() {
            self.leave_edit_mode();
        } else {
            self.enter_edit_mode();
        }
        self.is_editing()
    }

    pub fn record_overlay_edit(&mut self, overlay_index: usize, edit: RectEdit) {
        self.box_editor.record(overlay_index, edit);
    }

    pub fn record_overlay_key(&mut self, key: &str, value: f64) -> bool {
        self.box_editor.record_key(key, value)
    }

    /// Overlay rectangles with recorded edits applied.
    pub fn overlay(&self) -> Vec<OverlayRect> {
        self.box_editor.current_overlay()
    }

    /// Toggle a shape between the canvas and legend-only.
    pub fn toggle_visibility(&mut self, index: usize) -> Result<(), AnnotationError> {
        self.ensure_drawing_allowed()?;
        let shape = self
            .set
            .shapes_mut()
            .get_mut(index)
            .ok_or(AnnotationError::NoSuchShape { index })?;
        shape.visible = match shape.visible {
            Visibility::Shown => Visibility::LegendOnly,
            Visibility::LegendOnly | Visibility::Removed => Visibility::Shown,
        };
        Ok(())
    }

    pub fn dismiss(&mut self, index: usize) -> Result<(), AnnotationError> {
        self.ensure_drawing_allowed()?;
        self.finish_gesture();
        let checkpoint = self.history.push(self.set.shapes().to_vec());
        self.set
            .dismiss(index)
            .inspect_err(|_| self.history.retract(checkpoint))
    }

    /// Remove dismissed shapes. Returns how many were removed.
    pub fn prune_removed(&mut self) -> usize {
        if self.is_editing() {
            return 0;
        }
        self.finish_gesture();
        let snapshot = self.set.shapes().to_vec();
        let removed = self.set.prune_removed();
        if removed > 0 {
            self.history.push(snapshot);
            log::info!("Pruned {} dismissed shapes", removed);
        }
        removed
    }

    pub fn delete(&mut self, index: usize) -> Result<Shape, AnnotationError> {
        self.ensure_drawing_allowed()?;
        self.finish_gesture();
        let snapshot = self.set.shapes().to_vec();
        let shape = self.set.remove(index)?;
        self.history.push(snapshot);
        Ok(shape)
    }

    pub fn undo(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }
        self.finish_gesture();
        match self.history.undo(self.set.shapes().to_vec()) {
            Some(previous) => {
                self.set.replace_all(previous);
                log::info!("Undo");
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }
        self.finish_gesture();
        match self.history.redo(self.set.shapes().to_vec()) {
            Some(next) => {
                self.set.replace_all(next);
                log::info!("Redo");
                true
            }
            None => false,
        }
    }

    /// Run a model on the open image and add its predictions.
    ///
    /// On failure nothing is added.
    pub fn run_inference<S, R>(
        &mut self,
        store: &S,
        registry: &R,
        run_id: &str,
    ) -> Result<usize, InferenceError>
    where
        S: ImageStore + ?Sized,
        R: ModelRegistry + ?Sized,
    {
        self.ensure_drawing_allowed()?;
        let Some(id) = self.image_id.clone() else {
            return Err(InferenceError::Backend(anyhow::anyhow!("no image is open")));
        };
        let (data, _) = store.get_image(&id)?;
        let shape = inference::predict_shape(registry, run_id, &data)?;

        self.finish_gesture();
        self.history.push(self.set.shapes().to_vec());
        Ok(self.set.append(shape))
    }

    /// Annotations of the open image in export form.
    pub fn export_data(&self, filename: &str) -> Option<ExportData> {
        let id = self.image_id.as_ref()?;
        Some(ExportData {
            image_id: id.clone(),
            filename: filename.to_string(),
            annotations: self.set.shapes().to_vec(),
        })
    }

    /// Replace the annotations with imported ones.
    pub fn import_shapes(&mut self, shapes: Vec<Shape>) -> Result<(), AnnotationError> {
        self.ensure_drawing_allowed()?;
        self.finish_gesture();
        self.history.push(self.set.shapes().to_vec());
        self.set.replace_all(shapes);
        if let Some(filter) = &self.filter {
            self.set.apply_filter(filter);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::media::png_fixture;
    use crate::io::store::{ImageMetadata, MemoryStore};
    use crate::models::label::{default_labels, Rgb};
    use crate::models::polygon::CANCEL_POINT;
    use crate::models::shape::ShapeKind;

    fn session_with_image() -> (AnnotatorSession, MemoryStore) {
        let mut store = MemoryStore::default();
        let id = store
            .put_image(&png_fixture(64, 48), "street", "image/png", ImageMetadata::default())
            .unwrap();
        let mut session = AnnotatorSession::new(default_labels(), 2.0);
        session.open_image(&store, &id).unwrap();
        session.select_label(0);
        (session, store)
    }

    fn range(x0: f64, y0: f64, x1: f64, y1: f64) -> Selection {
        Selection::Range {
            x: [x0, x1],
            y: [y0, y1],
        }
    }

    #[test]
    fn test_open_image_sets_anchor() {
        let (session, _) = session_with_image();
        let anchor = session.annotations().anchor().unwrap();
        assert_eq!((anchor.width, anchor.height), (64, 48));
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn test_open_missing_image_keeps_state() {
        let (mut session, store) = session_with_image();
        session.on_selection(&range(1.0, 1.0, 5.0, 5.0)).unwrap();

        assert!(session.open_image(&store, &"99999999".to_string()).is_err());
        assert_eq!(session.annotations().len(), 1);
    }

    #[test]
    fn test_selection_without_label() {
        let (mut session, _) = session_with_image();
        session.labels.clear_selection();
        assert_eq!(
            session.on_selection(&range(1.0, 1.0, 5.0, 5.0)),
            Err(AnnotationError::NoLabelSelected)
        );
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn test_clicks_replace_live_shape() {
        let (mut session, _) = session_with_image();
        for (x, y) in [(1.0, 1.0), (20.0, 1.0), (20.0, 20.0)] {
            session.on_click(Point::new(x, y)).unwrap();
        }

        assert_eq!(session.annotations().len(), 1);
        let shape = &session.annotations().shapes()[0];
        assert_eq!(shape.kind, ShapeKind::Polygon);
        assert_eq!(shape.points.len(), 4);
        assert_eq!(shape.points[0], shape.points[3]);
    }

    #[test]
    fn test_click_on_start_closes_polygon() {
        let (mut session, _) = session_with_image();
        for (x, y) in [(1.0, 1.0), (20.0, 1.0), (20.0, 20.0), (1.5, 1.5)] {
            session.on_click(Point::new(x, y)).unwrap();
        }
        assert!(!session.is_drawing());

        session.on_click(Point::new(30.0, 30.0)).unwrap();
        assert_eq!(session.annotations().len(), 2);
    }

    #[test]
    fn test_cancel_point_drops_shape() {
        let (mut session, _) = session_with_image();
        session.on_selection(&range(1.0, 1.0, 5.0, 5.0)).unwrap();
        session.on_click(Point::new(1.0, 1.0)).unwrap();
        session.on_click(Point::new(9.0, 9.0)).unwrap();
        assert_eq!(session.annotations().len(), 2);

        assert_eq!(session.on_click(CANCEL_POINT).unwrap(), PointOutcome::Cancelled);
        assert_eq!(session.annotations().len(), 1);
        assert_eq!(session.annotations().shapes()[0].kind, ShapeKind::Box);
    }

    #[test]
    fn test_mode_change_finishes_gesture() {
        let (mut session, _) = session_with_image();
        session.set_lasso_mode(LassoMode::Open);
        session.on_click(Point::new(1.0, 1.0)).unwrap();
        session.on_click(Point::new(9.0, 9.0)).unwrap();

        session.set_lasso_mode(LassoMode::Closed);
        assert!(!session.is_drawing());
        session.on_click(Point::new(30.0, 30.0)).unwrap();

        let kinds: Vec<_> = session.annotations().shapes().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, [ShapeKind::Line, ShapeKind::Polygon]);
    }

    #[test]
    fn test_drawing_rejected_while_editing() {
        let (mut session, _) = session_with_image();
        session.on_selection(&range(1.0, 1.0, 5.0, 5.0)).unwrap();
        session.enter_edit_mode();

        assert_eq!(
            session.on_click(Point::new(1.0, 1.0)),
            Err(AnnotationError::EditModeActive)
        );
        assert_eq!(
            session.on_selection(&range(0.0, 0.0, 1.0, 1.0)),
            Err(AnnotationError::EditModeActive)
        );
        assert!(!session.undo());
    }

    #[test]
    fn test_edit_mode_and_save() {
        let (mut session, mut store) = session_with_image();
        session.on_selection(&range(1.0, 1.0, 5.0, 5.0)).unwrap();
        session.on_selection(&range(10.0, 10.0, 20.0, 20.0)).unwrap();

        let overlay = session.enter_edit_mode();
        assert_eq!(overlay.len(), 2);
        assert!(session.record_overlay_key("shapes[1].x1", 25.0));

        // Saving while editing applies the overlay first.
        session.save(&mut store).unwrap();
        assert!(!session.is_editing());

        let id = session.image_id().unwrap().clone();
        let (_, record) = store.get_image(&id).unwrap();
        let saved = record.metadata().annotations;
        assert_eq!(saved[0].box_corners(), Some((1.0, 1.0, 5.0, 5.0)));
        assert_eq!(saved[1].box_corners(), Some((10.0, 10.0, 25.0, 20.0)));
        assert!(saved.iter().all(|s| s.visible == Visibility::Shown));
    }

    #[test]
    fn test_untouched_edit_mode_leaves_no_history() {
        let (mut session, _) = session_with_image();
        session.on_selection(&range(1.0, 1.0, 5.0, 5.0)).unwrap();
        session.toggle_edit_mode();
        session.toggle_edit_mode();

        assert!(session.undo());
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn test_undo_redo() {
        let (mut session, _) = session_with_image();
        session.on_selection(&range(1.0, 1.0, 5.0, 5.0)).unwrap();
        session.on_selection(&range(2.0, 2.0, 6.0, 6.0)).unwrap();

        assert!(session.undo());
        assert_eq!(session.annotations().len(), 1);
        assert!(session.redo());
        assert_eq!(session.annotations().len(), 2);
        assert!(!session.redo());
    }

    #[test]
    fn test_filter_dismiss_and_prune() {
        let (mut session, _) = session_with_image();
        session.add_label(Label::new("car", Rgb(1, 1, 1)));
        session.on_selection(&range(1.0, 1.0, 5.0, 5.0)).unwrap();
        session.select_label(4);
        session.on_selection(&range(2.0, 2.0, 6.0, 6.0)).unwrap();

        session.set_filter("car");
        let visible: Vec<_> = session.annotations().shapes().iter().map(|s| s.visible).collect();
        assert_eq!(visible, [Visibility::LegendOnly, Visibility::Shown]);

        session.dismiss(0).unwrap();
        assert_eq!(session.prune_removed(), 1);
        assert_eq!(session.annotations().shapes()[0].label.name, "car");

        session.set_filter("");
        assert!(session.annotations().shapes()[0].is_shown());
    }

    #[test]
    fn test_inference_adds_model_shape() {
        use crate::io::inference::{Model, TemplateModel};

        struct OneRun;
        impl ModelRegistry for OneRun {
            fn list_artifacts(&self, _run_id: &str) -> Result<Vec<String>> {
                Ok(vec!["model.json".into()])
            }
            fn load_model(&self, _run_id: &str, _artifact: &str) -> Result<Box<dyn Model>> {
                Ok(Box::new(TemplateModel {
                    x: vec![0.5],
                    y: vec![0.5],
                }))
            }
        }

        let (mut session, store) = session_with_image();
        let index = session.run_inference(&store, &OneRun, "run-1").unwrap();
        let shape = &session.annotations().shapes()[index];
        assert_eq!(shape.kind, ShapeKind::Model);
        assert_eq!(shape.points, vec![Point::new(32.0, 24.0)]);

        session.enter_edit_mode();
        let err = session.run_inference(&store, &OneRun, "run-1").unwrap_err();
        assert!(matches!(
            err,
            InferenceError::Annotation(AnnotationError::EditModeActive)
        ));
        assert_eq!(session.annotations().len(), 1);
    }

    #[test]
    fn test_dismissed_box_survives_edit_mode() {
        let (mut session, _) = session_with_image();
        session.on_selection(&range(1.0, 1.0, 5.0, 5.0)).unwrap();
        session.on_selection(&range(2.0, 2.0, 6.0, 6.0)).unwrap();
        session.dismiss(0).unwrap();

        assert_eq!(session.enter_edit_mode().len(), 1);
        session.leave_edit_mode();

        let dismissed = &session.annotations().shapes()[0];
        assert_eq!(dismissed.visible, Visibility::LegendOnly);
        assert!(!dismissed.show_in_legend);
        assert!(session.annotations().shapes()[1].is_shown());
        assert_eq!(session.prune_removed(), 1);
    }

    #[test]
    fn test_leave_edit_mode_when_not_editing() {
        let (mut session, _) = session_with_image();
        session.on_selection(&range(1.0, 1.0, 5.0, 5.0)).unwrap();

        assert_eq!(session.leave_edit_mode(), 0);
        assert!(session.can_undo());
        assert!(session.undo());
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn test_untouched_edit_mode_keeps_redo() {
        let (mut session, _) = session_with_image();
        session.on_selection(&range(1.0, 1.0, 5.0, 5.0)).unwrap();
        session.on_selection(&range(2.0, 2.0, 6.0, 6.0)).unwrap();
        assert!(session.undo());

        session.toggle_edit_mode();
        session.toggle_edit_mode();

        assert!(session.can_redo());
        assert!(session.redo());
        assert_eq!(session.annotations().len(), 2);
    }

    #[test]
    fn test_retract_restores_evicted_state() {
        let mut history = History::new();
        let label = Label::new("car", Rgb(1, 1, 1));
        for i in 0..50 {
            history.push(vec![Shape::new_box(0.0, 0.0, f64::from(i), 1.0, label.clone())]);
        }
        let oldest = history.undo_stack[0].clone();

        let checkpoint = history.push(Vec::new());
        assert_eq!(history.undo_stack.len(), 50);
        assert_ne!(history.undo_stack[0], oldest);

        history.retract(checkpoint);
        assert_eq!(history.undo_stack.len(), 50);
        assert_eq!(history.undo_stack[0], oldest);
    }
}
