// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label table and legend panel.
//!
//! The label table picks the label new shapes are drawn with. The legend
//! lists every shape of the open image with its visibility controls.

use crate::models::label::{Label, Rgb};
use crate::models::shape::Visibility;
use crate::session::AnnotatorSession;

/// Fields of the "add label" form.
#[derive(Debug, Clone)]
pub struct NewLabel {
    pub name: String,
    pub color: [u8; 3],
}

impl Default for NewLabel {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: [255, 255, 0],
        }
    }
}

/// Command requested from the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelsAction {
    None,
    SelectLabel(usize),
    AddLabel(Label),
    SetFilter(String),
    ToggleVisibility(usize),
    Dismiss(usize),
    Delete(usize),
    Prune,
}

/// Display the label table, the filter box and the legend.
pub fn show(
    ui: &mut egui::Ui,
    session: &AnnotatorSession,
    filter_text: &mut String,
    new_label: &mut NewLabel,
) -> LabelsAction {
    let mut action = LabelsAction::None;
    let editing = session.is_editing();

    ui.heading("Labels");
    ui.separator();

    let selected = session.labels().selected_row();
    for (row, label) in session.labels().rows().iter().enumerate() {
        ui.horizontal(|ui| {
            color_swatch(ui, label.color);
            if ui
                .selectable_label(selected == Some(row), &label.name)
                .clicked()
            {
                action = LabelsAction::SelectLabel(row);
            }
        });
    }

    ui.horizontal(|ui| {
        ui.color_edit_button_srgb(&mut new_label.color);
        ui.add(egui::TextEdit::singleline(&mut new_label.name).desired_width(100.0));
        let name = new_label.name.trim();
        if ui.add_enabled(!name.is_empty(), egui::Button::new("Add")).clicked() {
            let [r, g, b] = new_label.color;
            action = LabelsAction::AddLabel(Label::new(name, Rgb(r, g, b)));
            new_label.name.clear();
        }
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.label("Filter:");
        let response = ui.add_enabled(
            !editing,
            egui::TextEdit::singleline(filter_text)
                .hint_text("label or !label")
                .desired_width(140.0),
        );
        if response.changed() {
            action = LabelsAction::SetFilter(filter_text.clone());
        }
    });

    ui.add_space(8.0);
    ui.heading("Legend");
    ui.separator();

    let shapes = session.annotations().shapes();
    if shapes.is_empty() {
        ui.label(egui::RichText::new("No annotations").weak());
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (index, shape) in shapes.iter().enumerate() {
            if !shape.show_in_legend {
                continue;
            }
            ui.horizontal(|ui| {
                color_swatch(ui, shape.label.color);

                let text = match shape.visible {
                    Visibility::Shown => egui::RichText::new(shape.name()),
                    Visibility::LegendOnly => egui::RichText::new(shape.name()).weak(),
                    Visibility::Removed => egui::RichText::new(shape.name()).strikethrough(),
                };
                if ui
                    .add_enabled(!editing, egui::Label::new(text).sense(egui::Sense::click()))
                    .on_hover_text("Click to show or hide")
                    .clicked()
                {
                    action = LabelsAction::ToggleVisibility(index);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_enabled_ui(!editing, |ui| {
                        if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                            action = LabelsAction::Delete(index);
                        }
                        if ui.small_button("✖").on_hover_text("Dismiss").clicked() {
                            action = LabelsAction::Dismiss(index);
                        }
                    });
                });
            });
        }
    });

    ui.add_space(8.0);
    if ui
        .add_enabled(!editing, egui::Button::new("Prune hidden"))
        .on_hover_text("Permanently drop dismissed shapes")
        .clicked()
    {
        action = LabelsAction::Prune;
    }

    action
}

fn color_swatch(ui: &mut egui::Ui, color: Rgb) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
    ui.painter()
        .rect_filled(rect, 2.0, egui::Color32::from_rgb(color.0, color.1, color.2));
}
