// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Model-assisted annotation.
//!
//! A model is looked up by run id, loaded from the run's predictor artifact
//! and asked for point predictions on one image. Predictions come back with
//! y measured from the bottom of the image and are flipped into image
//! coordinates before they become a shape.

use super::media;
use super::store::{ImageId, ImageMetadata, ImageStore};
use crate::error::InferenceError;
use crate::models::label::{Label, Rgb};
use crate::models::shape::{Point, Shape, ShapeKind, Source};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Predictor artifacts are files whose name starts with this prefix.
pub const MODEL_ARTIFACT_PREFIX: &str = "model";

/// Color given to model traces.
pub const MODEL_COLOR: Rgb = Rgb(255, 165, 0);

/// Raw point predictions, y measured from the image bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// A loaded predictor.
pub trait Model {
    fn predict(&self, image: &[u8]) -> Result<Prediction>;
}

/// Source of trained models.
pub trait ModelRegistry {
    /// Artifact paths recorded for a run.
    fn list_artifacts(&self, run_id: &str) -> Result<Vec<String>>;

    /// Load the model stored at `artifact` for a run.
    fn load_model(&self, run_id: &str, artifact: &str) -> Result<Box<dyn Model>>;
}

/// Find the single predictor artifact for a run.
pub fn resolve_artifact<R: ModelRegistry + ?Sized>(
    registry: &R,
    run_id: &str,
) -> Result<String, InferenceError> {
    let mut candidates: Vec<String> = registry
        .list_artifacts(run_id)?
        .into_iter()
        .filter(|path| {
            let name = path.rsplit('/').next().unwrap_or(path);
            name.starts_with(MODEL_ARTIFACT_PREFIX)
        })
        .collect();

    match candidates.len() {
        0 => Err(InferenceError::ModelNotFound {
            run_id: run_id.to_string(),
        }),
        1 => Ok(candidates.remove(0)),
        count => Err(InferenceError::AmbiguousArtifact {
            run_id: run_id.to_string(),
            count,
        }),
    }
}

/// Turn predictions into a model shape in image coordinates.
pub fn prediction_to_shape(
    prediction: &Prediction,
    image_height: u32,
    run_id: &str,
    artifact: &str,
) -> Result<Shape, InferenceError> {
    if prediction.x.is_empty() || prediction.x.len() != prediction.y.len() {
        return Err(InferenceError::MalformedPrediction {
            x: prediction.x.len(),
            y: prediction.y.len(),
        });
    }

    let height = f64::from(image_height);
    let points = prediction
        .x
        .iter()
        .zip(prediction.y.iter())
        .map(|(&x, &y)| Point::new(x, height - y))
        .collect();

    let mut shape = Shape::new(ShapeKind::Model, points, Label::new(run_id, MODEL_COLOR));
    shape.source = Source::Model {
        run_id: run_id.to_string(),
        artifact: artifact.to_string(),
    };
    Ok(shape)
}

fn run_model(
    model: &dyn Model,
    image: &[u8],
    run_id: &str,
    artifact: &str,
) -> Result<Shape, InferenceError> {
    let (_, height) = media::image_dimensions(image)?;
    let prediction = model.predict(image)?;
    prediction_to_shape(&prediction, height, run_id, artifact)
}

/// Resolve, load and run the model for one image.
pub fn predict_shape<R: ModelRegistry + ?Sized>(
    registry: &R,
    run_id: &str,
    image: &[u8],
) -> Result<Shape, InferenceError> {
    let artifact = resolve_artifact(registry, run_id)?;
    let model = registry.load_model(run_id, &artifact)?;
    log::info!("Running model '{}' from run {}", artifact, run_id);
    run_model(model.as_ref(), image, run_id, &artifact)
}

/// Check if the image already carries predictions from this run.
pub fn has_model_annotation(metadata: &ImageMetadata, run_id: &str) -> bool {
    metadata.annotations.iter().any(|shape| match &shape.source {
        Source::Model { run_id: id, .. } => id == run_id,
        Source::User => false,
    })
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: Vec<ImageId>,
    pub skipped: Vec<ImageId>,
}

/// Annotate a list of images with one run's model, one image at a time.
///
/// Images that already carry this run's predictions are skipped, so the
/// batch can be re-run after a failure.
pub fn batch_infer<S, R>(
    store: &mut S,
    registry: &R,
    run_id: &str,
    image_ids: &[ImageId],
) -> Result<BatchReport, InferenceError>
where
    S: ImageStore + ?Sized,
    R: ModelRegistry + ?Sized,
{
    let artifact = resolve_artifact(registry, run_id)?;
    let model = registry.load_model(run_id, &artifact)?;
    let mut report = BatchReport::default();

    for id in image_ids {
        let (data, record) = store.get_image(id)?;
        let mut metadata = record.metadata();
        if has_model_annotation(&metadata, run_id) {
            log::debug!("Image {} already has predictions from run {}", id, run_id);
            report.skipped.push(id.clone());
            continue;
        }

        let shape = run_model(model.as_ref(), &data, run_id, &artifact)?;
        metadata.annotations.push(shape);
        store.set_metadata(id, &metadata)?;
        report.processed.push(id.clone());
    }

    log::info!(
        "Batch inference for run {}: {} processed, {} skipped",
        run_id,
        report.processed.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Mean-shape keypoint predictor.
///
/// Stores keypoints normalized to `[0, 1]`, y measured from the bottom, and
/// scales them to each image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateModel {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Model for TemplateModel {
    fn predict(&self, image: &[u8]) -> Result<Prediction> {
        let (width, height) = media::image_dimensions(image)?;
        Ok(Prediction {
            x: self.x.iter().map(|x| x * f64::from(width)).collect(),
            y: self.y.iter().map(|y| y * f64::from(height)).collect(),
        })
    }
}

/// Registry where each run is a directory of artifact files.
#[derive(Debug, Clone)]
pub struct DirModelRegistry {
    root: PathBuf,
}

impl DirModelRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Run ids available in the registry.
    pub fn runs(&self) -> Result<Vec<String>> {
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read model directory {}", self.root.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                runs.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        runs.sort();
        Ok(runs)
    }
}

fn collect_files(base: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(base, &path, out)?;
        } else if let Ok(relative) = path.strip_prefix(base) {
            let parts: Vec<_> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            out.push(parts.join("/"));
        }
    }
    Ok(())
}

impl ModelRegistry for DirModelRegistry {
    fn list_artifacts(&self, run_id: &str) -> Result<Vec<String>> {
        let run_dir = self.root.join(run_id);
        let mut artifacts = Vec::new();
        collect_files(&run_dir, &run_dir, &mut artifacts)
            .with_context(|| format!("Failed to list artifacts of run {}", run_id))?;
        artifacts.sort();
        Ok(artifacts)
    }

    fn load_model(&self, run_id: &str, artifact: &str) -> Result<Box<dyn Model>> {
        let path = self.root.join(run_id).join(artifact);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read model {}", path.display()))?;
        let model: TemplateModel = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse model {}", path.display()))?;
        Ok(Box::new(model))
    }
}
