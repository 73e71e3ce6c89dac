// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the annotator.

pub mod browser;
pub mod canvas;
pub mod labels;
pub mod toolbar;
pub mod uploader;
