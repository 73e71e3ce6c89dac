// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image browser panel.

use crate::io::store::{ImageId, ImageRecord};

/// Command requested from the browser.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserAction {
    None,
    Open(ImageId),
    Refresh,
    LoadFilenameList,
    ClearFilenameList,
}

/// Display the list of stored images, newest first.
pub fn show(
    ui: &mut egui::Ui,
    images: &[ImageRecord],
    open_image: Option<&ImageId>,
    filename_list_len: Option<usize>,
) -> BrowserAction {
    let mut action = BrowserAction::None;

    ui.heading("Images");
    ui.separator();

    ui.horizontal(|ui| {
        if ui.button("⟳ Refresh").clicked() {
            action = BrowserAction::Refresh;
        }
        if ui
            .button("📄 File list…")
            .on_hover_text("Only show images named in a CSV file")
            .clicked()
        {
            action = BrowserAction::LoadFilenameList;
        }
    });

    if let Some(count) = filename_list_len {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(format!("Filtered by {} names", count)).weak());
            if ui.small_button("✖").clicked() {
                action = BrowserAction::ClearFilenameList;
            }
        });
    }

    ui.add_space(4.0);

    if images.is_empty() {
        ui.label(egui::RichText::new("No images").weak());
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for record in images {
            let is_open = open_image == Some(&record.id);
            let comments = record.metadata().comments;
            let response = ui
                .selectable_label(is_open, format!("{} ({})", record.filename, record.id));
            let response = if comments.is_empty() {
                response
            } else {
                response.on_hover_text(comments)
            };
            if response.clicked() && !is_open {
                action = BrowserAction::Open(record.id.clone());
            }
        }
    });

    action
}
