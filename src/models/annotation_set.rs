// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The ordered collection of shapes bound to one image.

use super::shape::{Shape, Visibility};
use crate::error::AnnotationError;
use crate::io::media;
use crate::io::store::{ImageId, ImageStore};
use anyhow::Result;

/// Case-insensitive substring filter over shape names.
///
/// A leading `!` inverts the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFilter {
    needle: String,
    negated: bool,
}

impl LabelFilter {
    /// Parse filter text. Blank text yields no filter.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negated, needle) = match text.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, text),
        };
        if needle.is_empty() {
            return None;
        }
        Some(Self {
            needle: needle.to_lowercase(),
            negated,
        })
    }

    pub fn matches(&self, shape: &Shape) -> bool {
        let hit = shape.name().to_lowercase().contains(&self.needle);
        hit != self.negated
    }
}

/// Image size used to anchor the axes, even when no shapes exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisAnchor {
    pub width: u32,
    pub height: u32,
}

/// Shapes for one image in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationSet {
    shapes: Vec<Shape>,
    anchor: Option<AxisAnchor>,
}

impl AnnotationSet {
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self {
            shapes,
            anchor: None,
        }
    }

    /// Hydrate the set for an image from the store.
    ///
    /// With a filter, non-matching shapes stay in the set but are only
    /// listed in the legend.
    pub fn load_for<S: ImageStore + ?Sized>(
        store: &S,
        image_id: &ImageId,
        filter: Option<&LabelFilter>,
    ) -> Result<Self> {
        let (data, record) = store.get_image(image_id)?;
        let mut set = Self::new(record.metadata().annotations);

        set.anchor = match media::image_dimensions(&data) {
            Ok((width, height)) => Some(AxisAnchor { width, height }),
            Err(e) => {
                log::warn!("Could not read dimensions of image {}: {}", image_id, e);
                None
            }
        };

        if let Some(filter) = filter {
            set.apply_filter(filter);
        }
        log::info!("Loaded {} shapes for image {}", set.len(), image_id);
        Ok(set)
    }

    /// Overwrite the image's persisted annotations with this set.
    pub fn save_to<S: ImageStore + ?Sized>(&self, store: &mut S, image_id: &ImageId) -> Result<()> {
        let (_, record) = store.get_image(image_id)?;
        let mut metadata = record.metadata();
        metadata.annotations = self.shapes.clone();
        store.set_metadata(image_id, &metadata)?;
        log::info!("Saved {} shapes for image {}", self.len(), image_id);
        Ok(())
    }

    /// Show matching shapes and move the rest to the legend.
    ///
    /// Dismissed and removed shapes are left alone.
    pub fn apply_filter(&mut self, filter: &LabelFilter) {
        for shape in self.shapes.iter_mut().filter(|s| !s.is_dismissed()) {
            shape.visible = if filter.matches(shape) {
                Visibility::Shown
            } else {
                Visibility::LegendOnly
            };
        }
    }

    /// Show every shape again.
    pub fn clear_filter(&mut self) {
        for shape in &mut self.shapes {
            if shape.visible == Visibility::LegendOnly && shape.show_in_legend {
                shape.visible = Visibility::Shown;
            }
        }
    }

    /// Dismiss a shape from both canvas and legend.
    pub fn dismiss(&mut self, index: usize) -> Result<(), AnnotationError> {
        let shape = self
            .shapes
            .get_mut(index)
            .ok_or(AnnotationError::NoSuchShape { index })?;
        shape.visible = Visibility::LegendOnly;
        shape.show_in_legend = false;
        Ok(())
    }

    /// Drop every dismissed shape. Returns how many were removed.
    pub fn prune_removed(&mut self) -> usize {
        let before = self.shapes.len();
        self.shapes
            .retain(|s| !(s.visible == Visibility::LegendOnly && !s.show_in_legend));
        before - self.shapes.len()
    }

    pub fn append(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    pub fn replace(&mut self, index: usize, shape: Shape) -> Result<(), AnnotationError> {
        let slot = self
            .shapes
            .get_mut(index)
            .ok_or(AnnotationError::NoSuchShape { index })?;
        *slot = shape;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Shape, AnnotationError> {
        if index >= self.shapes.len() {
            return Err(AnnotationError::NoSuchShape { index });
        }
        Ok(self.shapes.remove(index))
    }

    pub fn replace_all(&mut self, shapes: Vec<Shape>) {
        self.shapes = shapes;
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shapes_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn anchor(&self) -> Option<AxisAnchor> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Option<AxisAnchor>) {
        self.anchor = anchor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::{ImageMetadata, ImageQuery, MemoryStore};
    use crate::models::label::{Label, Rgb};
    use crate::models::shape::ShapeKind;

    fn box_named(name: &str) -> Shape {
        Shape::new_box(0.0, 0.0, 1.0, 1.0, Label::new(name, Rgb(1, 2, 3)))
    }

    fn street() -> AnnotationSet {
        AnnotationSet::new(vec![box_named("car"), box_named("pedestrian")])
    }

    #[test]
    fn test_filter_partitions_visibility() {
        let mut set = street();
        assert_eq!(set.shapes()[0].name(), "car -box");

        set.apply_filter(&LabelFilter::parse("car").unwrap());
        assert_eq!(set.shapes()[0].visible, Visibility::Shown);
        assert_eq!(set.shapes()[1].visible, Visibility::LegendOnly);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_negated_filter_inverts() {
        let mut set = street();
        set.apply_filter(&LabelFilter::parse("!car").unwrap());
        assert_eq!(set.shapes()[0].visible, Visibility::LegendOnly);
        assert_eq!(set.shapes()[1].visible, Visibility::Shown);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let filter = LabelFilter::parse("  CAR ").unwrap();
        assert!(filter.matches(&box_named("Car")));
        assert!(LabelFilter::parse("").is_none());
        assert!(LabelFilter::parse("!").is_none());
    }

    #[test]
    fn test_prune_removed_is_idempotent() {
        let mut set = AnnotationSet::new(vec![
            box_named("apple"),
            box_named("banana"),
            box_named("cherry"),
            box_named("date"),
        ]);
        set.apply_filter(&LabelFilter::parse("!banana").unwrap());
        set.dismiss(2).unwrap();

        assert_eq!(set.prune_removed(), 1);
        let once = set.clone();
        assert_eq!(set.prune_removed(), 0);
        assert_eq!(set, once);

        let names: Vec<_> = set.shapes().iter().map(|s| s.label.name.clone()).collect();
        assert_eq!(names, ["apple", "banana", "date"]);
    }

    #[test]
    fn test_filter_keeps_dismissed_shapes_hidden() {
        let mut set = street();
        set.shapes_mut()[1].visible = Visibility::Removed;
        set.dismiss(0).unwrap();

        set.apply_filter(&LabelFilter::parse("!nothing").unwrap());
        assert_eq!(set.shapes()[0].visible, Visibility::LegendOnly);
        assert_eq!(set.shapes()[1].visible, Visibility::Removed);

        set.clear_filter();
        assert_eq!(set.shapes()[1].visible, Visibility::Removed);
        assert_eq!(set.prune_removed(), 1);
        assert_eq!(set.shapes()[0].label.name, "pedestrian");
    }

    #[test]
    fn test_dismiss_out_of_range() {
        let mut set = street();
        assert_eq!(set.dismiss(5), Err(AnnotationError::NoSuchShape { index: 5 }));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut set = AnnotationSet::default();
        set.append(box_named("z"));
        set.append(box_named("a"));
        set.append(box_named("m"));
        let names: Vec<_> = set.shapes().iter().map(|s| s.label.name.as_str()).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let mut store = MemoryStore::default();
        let id = store
            .put_image(
                b"not really an image",
                "street",
                "image/png",
                ImageMetadata::with_comments("morning"),
            )
            .unwrap();

        let mut set = street();
        set.append(Shape::new(
            ShapeKind::Line,
            vec![crate::models::shape::Point::new(2.0, 3.0)],
            Label::new("lane", Rgb(9, 9, 9)),
        ));
        set.save_to(&mut store, &id).unwrap();

        let filter = LabelFilter::parse("car").unwrap();
        let loaded = AnnotationSet::load_for(&store, &id, Some(&filter)).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.shapes()[0].visible, Visibility::Shown);
        assert_eq!(loaded.shapes()[2].visible, Visibility::LegendOnly);
        assert!(loaded.anchor().is_none());

        let records = store.find_images(&ImageQuery::default(), true, None).unwrap();
        assert_eq!(records[0].metadata().comments, "morning");
    }
}
