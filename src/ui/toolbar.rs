// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! This module provides the toolbar for selecting the drawing tool, the
//! lasso mode and box editing, along with save and model inference.

use crate::app::Tool;
use crate::models::shape::LassoMode;
use crate::session::AnnotatorSession;

/// Command requested from the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    None,
    SetLassoMode(LassoMode),
    ToggleEditMode,
    Undo,
    Redo,
    Save,
    RunInference,
}

/// Display the toolbar with tool selection buttons.
pub fn show(
    ui: &mut egui::Ui,
    current_tool: &mut Tool,
    session: &AnnotatorSession,
    run_id: &mut String,
    inference_enabled: bool,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let editing = session.is_editing();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Tools:");
        ui.separator();

        ui.add_enabled_ui(!editing, |ui| {
            if ui.selectable_label(*current_tool == Tool::Box, "▭ Box").clicked() {
                *current_tool = Tool::Box;
            }
            if ui.selectable_label(*current_tool == Tool::Lasso, "➰ Lasso").clicked() {
                *current_tool = Tool::Lasso;
            }
            if ui.selectable_label(*current_tool == Tool::Click, "▱ Points").clicked() {
                *current_tool = Tool::Click;
            }

            ui.separator();

            let mode = session.lasso_mode();
            if ui.selectable_label(mode == LassoMode::Closed, "Closed").clicked() {
                action = ToolbarAction::SetLassoMode(LassoMode::Closed);
            }
            if ui.selectable_label(mode == LassoMode::Open, "Open").clicked() {
                action = ToolbarAction::SetLassoMode(LassoMode::Open);
            }
        });

        ui.separator();

        if ui.selectable_label(editing, "✏ Edit boxes").clicked() {
            action = ToolbarAction::ToggleEditMode;
        }

        ui.separator();

        if ui
            .add_enabled(session.can_undo() && !editing, egui::Button::new("⟲ Undo"))
            .clicked()
        {
            action = ToolbarAction::Undo;
        }
        if ui
            .add_enabled(session.can_redo() && !editing, egui::Button::new("⟳ Redo"))
            .clicked()
        {
            action = ToolbarAction::Redo;
        }
        if ui
            .add_enabled(session.image_id().is_some(), egui::Button::new("💾 Save"))
            .clicked()
        {
            action = ToolbarAction::Save;
        }

        ui.separator();

        ui.add_enabled_ui(inference_enabled && session.image_id().is_some(), |ui| {
            ui.label("Run:");
            ui.add(egui::TextEdit::singleline(run_id).desired_width(140.0));
            if ui
                .add_enabled(!run_id.trim().is_empty() && !editing, egui::Button::new("Infer"))
                .clicked()
            {
                action = ToolbarAction::RunInference;
            }
        });

        ui.separator();

        let tool_text = if editing {
            "Drag box corners to resize, drag inside a box to move it"
        } else {
            match current_tool {
                Tool::Box => "Drag to draw a box",
                Tool::Lasso => "Drag to draw a freehand outline",
                Tool::Click => {
                    "Click to add points, double-click or Escape to finish, right-click to cancel"
                }
            }
        };
        ui.label(egui::RichText::new(tool_text).italics().weak());
    });

    action
}
