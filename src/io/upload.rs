// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image upload into the store.
//!
//! Single images are stored as-is. Zip archives are expanded and every
//! entry that decodes as an image is stored on its own.

use super::media;
use super::store::{ImageMetadata, ImageStore};
use crate::error::UploadError;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Largest archive entry read into memory.
pub const MAX_ENTRY_SIZE: u64 = 256 * 1024 * 1024;

/// Cap on buffer preallocation from the size an entry declares.
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// Check if a filename has a ZIP extension.
pub fn is_zip_file(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".zip")
}

/// Name an image is stored under: everything before the first `.`.
pub fn stored_name(filename: &str) -> &str {
    filename.split('.').next().unwrap_or(filename)
}

/// Skip hidden files and macOS metadata inside archives.
fn is_skipped_entry(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("__macosx") || lower.contains("/.") || lower.starts_with('.')
}

/// Store an uploaded file, returning the names of the images stored.
pub fn upload<S: ImageStore + ?Sized>(
    store: &mut S,
    filename: &str,
    data: &[u8],
    comments: &str,
) -> Result<Vec<String>, UploadError> {
    if is_zip_file(filename) {
        return upload_zip(store, filename, data, comments);
    }

    let content_type = media::content_type(data).ok_or_else(|| UploadError::NotAnImage {
        filename: filename.to_string(),
    })?;
    store.put_image(
        data,
        stored_name(filename),
        content_type,
        ImageMetadata::with_comments(comments),
    )?;
    log::info!("Uploaded '{}' ({})", filename, content_type);
    Ok(vec![filename.to_string()])
}

fn upload_zip<S: ImageStore + ?Sized>(
    store: &mut S,
    filename: &str,
    data: &[u8],
    comments: &str,
) -> Result<Vec<String>, UploadError> {
    let archive_error = |source| UploadError::Archive {
        filename: filename.to_string(),
        source,
    };
    let mut archive = ZipArchive::new(Cursor::new(data)).map_err(archive_error)?;
    log::debug!("ZIP '{}' contains {} entries", filename, archive.len());

    let mut stored = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(archive_error)?;
        let name = entry.name().to_string();
        if entry.is_dir() || is_skipped_entry(&name) {
            log::trace!("Skipping entry: {}", name);
            continue;
        }

        if entry.size() > MAX_ENTRY_SIZE {
            log::warn!(
                "Skipping '{}' from '{}': declared size {} exceeds {} bytes",
                name,
                filename,
                entry.size(),
                MAX_ENTRY_SIZE
            );
            continue;
        }

        let mut bytes = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
        if let Err(e) = entry.by_ref().take(MAX_ENTRY_SIZE + 1).read_to_end(&mut bytes) {
            log::warn!("Failed to read '{}' from '{}': {}", name, filename, e);
            continue;
        }
        if bytes.len() as u64 > MAX_ENTRY_SIZE {
            log::warn!("Skipping '{}' from '{}': larger than declared", name, filename);
            continue;
        }

        let Some(content_type) = media::content_type(&bytes) else {
            log::debug!("Skipping non-image entry: {}", name);
            continue;
        };
        store.put_image(
            &bytes,
            stored_name(&name),
            content_type,
            ImageMetadata::with_comments(comments),
        )?;
        stored.push(name);
    }

    log::info!("Uploaded {} images from ZIP '{}'", stored.len(), filename);
    Ok(stored)
}
