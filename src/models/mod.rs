// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data model.

pub mod annotation_set;
pub mod box_edit;
pub mod label;
pub mod polygon;
pub mod shape;
