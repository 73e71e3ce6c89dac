// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Upload page: pick image or zip files and add them to the store.

/// Command requested from the upload page.
#[derive(Debug, Clone, PartialEq)]
pub enum UploaderAction {
    None,
    PickFiles,
}

/// Display the upload form and the names stored by the last upload.
pub fn show(ui: &mut egui::Ui, comments: &mut String, uploaded: &[String]) -> UploaderAction {
    let mut action = UploaderAction::None;

    ui.heading("Upload images");
    ui.separator();

    ui.label("Comments stored with every uploaded image:");
    ui.add(
        egui::TextEdit::multiline(comments)
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    );

    ui.add_space(8.0);
    if ui.button("📂 Choose files…").clicked() {
        action = UploaderAction::PickFiles;
    }
    ui.label(
        egui::RichText::new("Images are stored as-is, zip archives are unpacked")
            .italics()
            .weak(),
    );

    if !uploaded.is_empty() {
        ui.add_space(12.0);
        ui.label(format!("Uploaded {} images:", uploaded.len()));
        egui::ScrollArea::vertical().show(ui, |ui| {
            for name in uploaded {
                ui.label(name);
            }
        });
    }

    action
}
