// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image annotation with boxes, polylines and polygons.
//!
//! Images live in an [`io::store::ImageStore`]; each image carries its
//! annotations in its metadata. An [`session::AnnotatorSession`] edits the
//! annotations of one open image and the egui front-end in [`app`] drives it.

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod session;
pub mod ui;
pub mod util;
