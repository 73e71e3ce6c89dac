// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for annotation, inference and upload operations.
//!
//! Storage and file I/O report errors through `anyhow`; the enums here cover
//! the failures callers are expected to match on.

use thiserror::Error;

/// Errors raised while turning user interaction into shapes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnotationError {
    /// A shape was drawn while no label row was selected
    #[error("no label selected")]
    NoLabelSelected,

    /// A free-form selection carried no usable points
    #[error("selection contains no points")]
    EmptySelection,

    /// Drawing was attempted while box edit mode is active
    #[error("box edit mode is active")]
    EditModeActive,

    /// A shape index outside the annotation set was referenced
    #[error("no shape at index {index}")]
    NoSuchShape {
        /// The requested index
        index: usize,
    },
}

/// Errors raised while resolving or running a model.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// No predictor artifact exists for the run
    #[error("no model artifact found for run '{run_id}'")]
    ModelNotFound {
        /// The run that was searched
        run_id: String,
    },

    /// More than one artifact could be the predictor
    #[error("run '{run_id}' has {count} candidate model artifacts")]
    AmbiguousArtifact {
        /// The run that was searched
        run_id: String,
        /// Number of candidates found
        count: usize,
    },

    /// The model returned mismatched coordinate arrays
    #[error("prediction has {x} x values but {y} y values")]
    MalformedPrediction {
        /// Length of the x array
        x: usize,
        /// Length of the y array
        y: usize,
    },

    /// The session cannot take predictions right now
    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    /// Loading or running the model failed
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Errors raised while ingesting uploaded files.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The uploaded file is neither a zip archive nor a decodable image
    #[error("'{filename}' is not a supported image")]
    NotAnImage {
        /// Name of the rejected file
        filename: String,
    },

    /// The zip archive could not be read
    #[error("failed to read zip archive '{filename}': {source}")]
    Archive {
        /// Name of the archive
        filename: String,
        /// Underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// Writing to the image store failed
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
