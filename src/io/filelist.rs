// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Filename lists used to narrow image lookups.

use anyhow::{Context, Result};
use std::path::Path;

/// Parse filenames from CSV or plain text: the first column of each row.
///
/// Blank rows and a leading `filename` header are skipped.
pub fn parse_filename_list(text: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut names = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed filename list at row {}", row + 1))?;
        let name = record.get(0).unwrap_or_default();
        if name.is_empty() || (row == 0 && name.eq_ignore_ascii_case("filename")) {
            continue;
        }
        names.push(name.to_string());
    }
    Ok(names)
}

/// Read a filename list from disk.
pub fn read_filename_list(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read filename list {}", path.display()))?;
    let names = parse_filename_list(&text)
        .with_context(|| format!("Failed to parse filename list {}", path.display()))?;
    log::info!("Read {} filenames from {}", names.len(), path.display());
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_with_header() {
        let text = "filename,notes\n\"cat\",tabby\n\ndog, brown\n";
        assert_eq!(parse_filename_list(text).unwrap(), ["cat", "dog"]);
    }

    #[test]
    fn test_quoted_names_keep_commas() {
        let text = "filename,notes\n\"smith, john\",x\n\"say \"\"cheese\"\"\"\n";
        assert_eq!(
            parse_filename_list(text).unwrap(),
            ["smith, john", "say \"cheese\""]
        );
    }

    #[test]
    fn test_parse_plain_list() {
        assert_eq!(parse_filename_list("a\nb\r\nc").unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn test_read_list_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.csv");
        std::fs::write(&path, "filename\nstreet\npark\n").unwrap();
        assert_eq!(read_filename_list(&path).unwrap(), ["street", "park"]);
    }

    #[test]
    fn test_read_missing_file() {
        assert!(read_filename_list(Path::new("/nonexistent/list.csv")).is_err());
    }
}
