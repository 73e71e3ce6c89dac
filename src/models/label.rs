// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation labels and the label table.
//!
//! Every shape takes its name and color from the label row that was selected
//! when it was drawn.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An RGB color, stored as `"rgb(r,g,b)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| format!("expected rgb(r,g,b), got '{}'", s))?;

        let channels: Vec<u8> = inner
            .split(',')
            .map(|c| c.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("invalid color channel in '{}': {}", s, e))?;

        match channels.as_slice() {
            [r, g, b] => Ok(Rgb(*r, *g, *b)),
            _ => Err(format!("expected three channels in '{}'", s)),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// A label name with its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: Rgb,
}

impl Label {
    pub fn new(name: impl Into<String>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// The labels offered when no configuration overrides them.
pub fn default_labels() -> Vec<Label> {
    vec![
        Label::new("label_1", Rgb(255, 0, 0)),
        Label::new("label_2", Rgb(0, 255, 0)),
        Label::new("label_3", Rgb(0, 0, 255)),
        Label::new("label_4", Rgb(255, 0, 255)),
    ]
}

/// Editable table of labels with at most one selected row.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    rows: Vec<Label>,
    selected: Option<usize>,
}

impl LabelTable {
    pub fn new(rows: Vec<Label>) -> Self {
        Self {
            rows,
            selected: None,
        }
    }

    pub fn rows(&self) -> &[Label] {
        &self.rows
    }

    /// Select a row. Out-of-range rows clear the selection.
    pub fn select(&mut self, row: usize) {
        self.selected = (row < self.rows.len()).then_some(row);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.selected
    }

    /// The currently selected label, if any.
    pub fn selected(&self) -> Option<&Label> {
        self.selected.and_then(|row| self.rows.get(row))
    }

    pub fn add(&mut self, label: Label) {
        self.rows.push(label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_parse_and_display() {
        let color: Rgb = "rgb(255, 0,12)".parse().unwrap();
        assert_eq!(color, Rgb(255, 0, 12));
        assert_eq!(color.to_string(), "rgb(255,0,12)");
    }

    #[test]
    fn test_rgb_rejects_bad_input() {
        assert!("rgb(1,2)".parse::<Rgb>().is_err());
        assert!("rgb(1,2,300)".parse::<Rgb>().is_err());
        assert!("#ff0000".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_label_serializes_color_as_string() {
        let json = serde_json::to_string(&Label::new("car", Rgb(1, 2, 3))).unwrap();
        assert_eq!(json, r#"{"name":"car","color":"rgb(1,2,3)"}"#);
    }

    #[test]
    fn test_selection() {
        let mut table = LabelTable::new(default_labels());
        assert!(table.selected().is_none());

        table.select(2);
        assert_eq!(table.selected().unwrap().name, "label_3");

        table.select(10);
        assert!(table.selected().is_none());
    }
}
