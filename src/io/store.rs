// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image store access.
//!
//! Images are stored as opaque blobs next to a JSON record holding the
//! filename, content type and free-form metadata. The metadata carries the
//! upload comments and the persisted annotation list.

use crate::models::shape::Shape;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Store-assigned image identifier.
pub type ImageId = String;

/// Metadata attached to a stored image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub annotations: Vec<Shape>,
}

impl ImageMetadata {
    pub fn with_comments(comments: impl Into<String>) -> Self {
        Self {
            comments: comments.into(),
            annotations: Vec::new(),
        }
    }

    /// Read metadata from an arbitrary JSON value.
    ///
    /// Anything that is not an object, or a malformed annotation list,
    /// yields empty defaults.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            if !value.is_null() {
                log::warn!("Ignoring non-object image metadata");
            }
            return Self::default();
        };

        let comments = object
            .get("comments")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let annotations = match object.get("annotations") {
            Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed annotation list: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        Self {
            comments,
            annotations,
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A stored image without its pixel data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    pub filename: String,
    pub content_type: String,
    /// Upload time in seconds since the Unix epoch
    pub uploaded_at: u64,
    #[serde(default)]
    pub metadata: Value,
}

impl ImageRecord {
    /// Parsed metadata, tolerant of malformed content.
    pub fn metadata(&self) -> ImageMetadata {
        ImageMetadata::from_value(&self.metadata)
    }
}

/// Filter for image lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageQuery {
    /// Only images whose filename is in this list
    pub filenames: Option<Vec<String>>,
}

impl ImageQuery {
    pub fn filenames(names: Vec<String>) -> Self {
        Self {
            filenames: Some(names),
        }
    }

    pub fn matches(&self, record: &ImageRecord) -> bool {
        match &self.filenames {
            Some(names) => names.iter().any(|n| n == &record.filename),
            None => true,
        }
    }
}

/// Point lookups and writes against an image store.
pub trait ImageStore {
    /// Find images matching `query`, newest first when `newest_first` is set.
    fn find_images(
        &self,
        query: &ImageQuery,
        newest_first: bool,
        limit: Option<usize>,
    ) -> Result<Vec<ImageRecord>>;

    /// Fetch an image's bytes and record.
    fn get_image(&self, id: &ImageId) -> Result<(Vec<u8>, ImageRecord)>;

    /// Store a new image, returning its id.
    fn put_image(
        &mut self,
        data: &[u8],
        filename: &str,
        content_type: &str,
        metadata: ImageMetadata,
    ) -> Result<ImageId>;

    /// Replace an image's metadata wholesale.
    fn set_metadata(&mut self, id: &ImageId, metadata: &ImageMetadata) -> Result<()>;
}

/// Ids are zero-padded sequence numbers, so id order is upload order.
fn sequence_id(sequence: u64) -> ImageId {
    format!("{:08}", sequence)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn select(
    mut records: Vec<ImageRecord>,
    query: &ImageQuery,
    newest_first: bool,
    limit: Option<usize>,
) -> Vec<ImageRecord> {
    records.retain(|r| query.matches(r));
    records.sort_by(|a, b| a.id.cmp(&b.id));
    if newest_first {
        records.reverse();
    }
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    records
}

/// In-memory image store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    images: Vec<(ImageRecord, Vec<u8>)>,
    next: u64,
}

impl MemoryStore {
    /// Insert an image with raw, possibly malformed, metadata.
    pub fn insert_raw(&mut self, data: &[u8], filename: &str, metadata: Value) -> ImageId {
        self.next += 1;
        let id = sequence_id(self.next);
        let record = ImageRecord {
            id: id.clone(),
            filename: filename.to_string(),
            content_type: "application/octet-stream".to_string(),
            uploaded_at: now_secs(),
            metadata,
        };
        self.images.push((record, data.to_vec()));
        id
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageStore for MemoryStore {
    fn find_images(
        &self,
        query: &ImageQuery,
        newest_first: bool,
        limit: Option<usize>,
    ) -> Result<Vec<ImageRecord>> {
        let records = self.images.iter().map(|(r, _)| r.clone()).collect();
        Ok(select(records, query, newest_first, limit))
    }

    fn get_image(&self, id: &ImageId) -> Result<(Vec<u8>, ImageRecord)> {
        match self.images.iter().find(|(r, _)| &r.id == id) {
            Some((record, data)) => Ok((data.clone(), record.clone())),
            None => bail!("image {} not found", id),
        }
    }

    fn put_image(
        &mut self,
        data: &[u8],
        filename: &str,
        content_type: &str,
        metadata: ImageMetadata,
    ) -> Result<ImageId> {
        let id = self.insert_raw(data, filename, metadata.to_value()?);
        if let Some((record, _)) = self.images.last_mut() {
            record.content_type = content_type.to_string();
        }
        Ok(id)
    }

    fn set_metadata(&mut self, id: &ImageId, metadata: &ImageMetadata) -> Result<()> {
        let value = metadata.to_value()?;
        match self.images.iter_mut().find(|(r, _)| &r.id == id) {
            Some((record, _)) => {
                record.metadata = value;
                Ok(())
            }
            None => bail!("image {} not found", id),
        }
    }
}

/// Image store kept in a directory: `<id>.bin` blobs with `<id>.json` records.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open a store, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create store directory {}", root.display()))?;
        log::info!("Opened image store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &ImageId) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    fn blob_path(&self, id: &ImageId) -> PathBuf {
        self.root.join(format!("{}.bin", id))
    }

    fn read_record(&self, path: &Path) -> Result<ImageRecord> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read record {}", path.display()))?;
        let record = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse record {}", path.display()))?;
        Ok(record)
    }

    fn write_record(&self, record: &ImageRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.record_path(&record.id), json)?;
        Ok(())
    }

    fn records(&self) -> Result<Vec<ImageRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping unreadable record: {:#}", e),
            }
        }
        Ok(records)
    }

    fn next_id(&self) -> Result<ImageId> {
        let last = self
            .records()?
            .iter()
            .filter_map(|r| r.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Ok(sequence_id(last + 1))
    }
}

impl ImageStore for DirStore {
    fn find_images(
        &self,
        query: &ImageQuery,
        newest_first: bool,
        limit: Option<usize>,
    ) -> Result<Vec<ImageRecord>> {
        Ok(select(self.records()?, query, newest_first, limit))
    }

    fn get_image(&self, id: &ImageId) -> Result<(Vec<u8>, ImageRecord)> {
        let path = self.record_path(id);
        if !path.exists() {
            bail!("image {} not found", id);
        }
        let record = self.read_record(&path)?;
        let data = fs::read(self.blob_path(id))
            .with_context(|| format!("Failed to read image data for {}", id))?;
        Ok((data, record))
    }

    fn put_image(
        &mut self,
        data: &[u8],
        filename: &str,
        content_type: &str,
        metadata: ImageMetadata,
    ) -> Result<ImageId> {
        let id = self.next_id()?;
        fs::write(self.blob_path(&id), data)
            .with_context(|| format!("Failed to write image data for {}", id))?;

        let record = ImageRecord {
            id: id.clone(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            uploaded_at: now_secs(),
            metadata: metadata.to_value()?,
        };
        self.write_record(&record)?;
        log::debug!("Stored '{}' as image {}", filename, id);
        Ok(id)
    }

    fn set_metadata(&mut self, id: &ImageId, metadata: &ImageMetadata) -> Result<()> {
        let path = self.record_path(id);
        if !path.exists() {
            bail!("image {} not found", id);
        }
        let mut record = self.read_record(&path)?;
        record.metadata = metadata.to_value()?;
        self.write_record(&record)
    }
}
