// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: image store, media decoding, uploads, models and files.

pub mod filelist;
pub mod inference;
pub mod media;
pub mod serialization;
pub mod store;
pub mod upload;
