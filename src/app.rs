// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the application structure that implements
//! the egui::App trait. It owns the image store, the model registry and
//! the annotation session, and routes UI actions between them.

use crate::config::Config;
use crate::error::UploadError;
use crate::io::inference::{self, DirModelRegistry};
use crate::io::store::{DirStore, ImageId, ImageQuery, ImageRecord, ImageStore};
use crate::io::{filelist, media, serialization, upload};
use crate::models::shape::LassoMode;
use crate::session::AnnotatorSession;
use crate::ui::canvas::{self, CanvasAction, CanvasDrag};
use crate::ui::labels::{self, LabelsAction, NewLabel};
use crate::ui::toolbar::{self, ToolbarAction};
use crate::ui::{browser, uploader};
use anyhow::{Context, Result};
use std::fmt::Display;
use std::path::PathBuf;

/// Drawing tool for the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Drag a rectangle
    #[default]
    Box,
    /// Drag a freehand outline
    Lasso,
    /// Click points one at a time
    Click,
}

/// Page shown in the central area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Annotate,
    Upload,
}

/// Main application state.
pub struct AnnotatorApp {
    config: Config,
    store: DirStore,
    /// Model registry, absent when no model directory is configured
    registry: Option<DirModelRegistry>,
    session: AnnotatorSession,

    page: Page,
    current_tool: Tool,
    drag: CanvasDrag,

    /// Images listed in the browser
    images: Vec<ImageRecord>,
    /// Filenames the browser is restricted to
    filename_list: Option<Vec<String>>,
    image_texture: Option<egui::TextureHandle>,

    filter_text: String,
    new_label: NewLabel,
    run_id: String,
    /// Runs found in the model registry when last listed
    runs: Vec<String>,

    upload_comments: String,
    uploaded: Vec<String>,

    /// Last message for the status bar
    status: Option<String>,
}

impl AnnotatorApp {
    /// Create the application, opening the configured store.
    pub fn new(config: Config) -> Result<Self> {
        let store = DirStore::open(&config.store_dir)?;
        let registry = config.model_dir.as_ref().map(DirModelRegistry::new);
        let settings = &config.settings;
        let session = AnnotatorSession::new(settings.labels.clone(), settings.close_tolerance);

        let mut app = Self {
            store,
            registry,
            session,
            page: Page::Annotate,
            current_tool: Tool::default(),
            drag: CanvasDrag::default(),
            images: Vec::new(),
            filename_list: None,
            image_texture: None,
            filter_text: String::new(),
            new_label: NewLabel::default(),
            run_id: String::new(),
            runs: Vec::new(),
            upload_comments: String::new(),
            uploaded: Vec::new(),
            status: None,
            config,
        };
        app.refresh_images();
        app.refresh_runs();
        Ok(app)
    }

    fn report_error(&mut self, context: &str, err: impl Display) {
        log::error!("{}: {}", context, err);
        self.status = Some(format!("{}: {}", context, err));
    }

    fn report(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.status = Some(message);
    }

    /// Reload the browser list from the store.
    fn refresh_images(&mut self) {
        let query = self
            .filename_list
            .clone()
            .map(ImageQuery::filenames)
            .unwrap_or_default();
        match self
            .store
            .find_images(&query, true, Some(self.config.settings.query_limit))
        {
            Ok(images) => self.images = images,
            Err(e) => self.report_error("Failed to list images", e),
        }
    }

    /// Reload the run list from the model registry.
    fn refresh_runs(&mut self) {
        let Some(registry) = &self.registry else {
            return;
        };
        match registry.runs() {
            Ok(runs) => self.runs = runs,
            Err(e) => {
                self.runs.clear();
                self.report_error("Failed to list model runs", e);
            }
        }
    }

    fn open_image(&mut self, id: ImageId, ctx: &egui::Context) {
        let result = (|| -> Result<egui::TextureHandle> {
            self.session.open_image(&self.store, &id)?;
            let (data, _) = self.store.get_image(&id)?;
            let loaded = media::decode_image(&data)?;
            let size = [loaded.width as usize, loaded.height as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
            Ok(ctx.load_texture("open_image", color_image, egui::TextureOptions::LINEAR))
        })();

        match result {
            Ok(texture) => {
                self.image_texture = Some(texture);
                self.drag = CanvasDrag::Idle;
                self.report(format!(
                    "Opened image {} with {} annotations",
                    id,
                    self.session.annotations().len()
                ));
            }
            Err(e) => {
                self.image_texture = None;
                self.report_error("Failed to open image", e);
            }
        }
    }

    fn open_filename(&self) -> String {
        self.session
            .image_id()
            .and_then(|id| self.images.iter().find(|r| &r.id == id))
            .map(|r| r.filename.clone())
            .unwrap_or_default()
    }

    fn save(&mut self) {
        match self.session.save(&mut self.store) {
            Ok(()) => {
                self.report(format!("Saved {} annotations", self.session.annotations().len()));
                self.refresh_images();
            }
            Err(e) => self.report_error("Failed to save", e),
        }
    }

    fn export_annotations(&mut self, path: PathBuf) {
        let Some(data) = self.session.export_data(&self.open_filename()) else {
            return;
        };
        match serialization::export_auto(&data, &path) {
            Ok(()) => self.report(format!("Exported annotations to {}", path.display())),
            Err(e) => self.report_error("Failed to export annotations", e),
        }
    }

    fn import_annotations(&mut self, path: PathBuf) {
        let data = match serialization::import_auto(&path) {
            Ok(data) => data,
            Err(e) => return self.report_error("Failed to import annotations", e),
        };
        if self.session.image_id() != Some(&data.image_id) {
            log::warn!(
                "Importing annotations of image {} into the open image",
                data.image_id
            );
        }
        let count = data.annotations.len();
        match self.session.import_shapes(data.annotations) {
            Ok(()) => self.report(format!("Imported {} annotations", count)),
            Err(e) => self.report_error("Failed to import annotations", e),
        }
    }

    fn run_inference(&mut self) {
        let Some(registry) = &self.registry else {
            return;
        };
        let run_id = self.run_id.trim().to_string();
        match self.session.run_inference(&self.store, registry, &run_id) {
            Ok(index) => self.report(format!("Added prediction of run {} at index {}", run_id, index)),
            Err(e) => self.report_error("Inference failed", e),
        }
    }

    /// Run the model over every image in the browser list.
    fn batch_inference(&mut self) {
        let Some(registry) = &self.registry else {
            return;
        };
        let run_id = self.run_id.trim().to_string();
        let ids: Vec<ImageId> = self.images.iter().map(|r| r.id.clone()).collect();
        match inference::batch_infer(&mut self.store, registry, &run_id, &ids) {
            Ok(report) => {
                self.report(format!(
                    "Run {}: annotated {} images, skipped {}",
                    run_id,
                    report.processed.len(),
                    report.skipped.len()
                ));
                self.refresh_images();
            }
            Err(e) => self.report_error("Batch inference failed", e),
        }
    }

    fn upload_files(&mut self, paths: Vec<PathBuf>) {
        self.uploaded.clear();
        for path in paths {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let result = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))
                .map_err(UploadError::from)
                .and_then(|data| {
                    upload::upload(&mut self.store, &filename, &data, &self.upload_comments)
                });
            match result {
                Ok(names) => self.uploaded.extend(names),
                Err(e) => self.report_error("Upload failed", e),
            }
        }
        if !self.uploaded.is_empty() {
            self.report(format!("Uploaded {} images", self.uploaded.len()));
        }
        self.refresh_images();
    }

    fn load_filename_list(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("File list", &["csv", "txt"])
            .pick_file()
        else {
            return;
        };
        match filelist::read_filename_list(&path) {
            Ok(names) => {
                self.report(format!("Loaded {} filenames", names.len()));
                self.filename_list = Some(names);
                self.refresh_images();
            }
            Err(e) => self.report_error("Failed to read file list", e),
        }
    }

    fn handle_toolbar(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::SetLassoMode(mode) => self.session.set_lasso_mode(mode),
            ToolbarAction::ToggleEditMode => {
                self.drag = CanvasDrag::Idle;
                let editing = self.session.toggle_edit_mode();
                log::info!("Box editing {}", if editing { "on" } else { "off" });
            }
            ToolbarAction::Undo => {
                self.session.undo();
            }
            ToolbarAction::Redo => {
                self.session.redo();
            }
            ToolbarAction::Save => self.save(),
            ToolbarAction::RunInference => self.run_inference(),
            ToolbarAction::None => {}
        }
    }

    fn handle_labels(&mut self, action: LabelsAction) {
        let result = match action {
            LabelsAction::SelectLabel(row) => {
                self.session.select_label(row);
                Ok(())
            }
            LabelsAction::AddLabel(label) => {
                self.session.add_label(label);
                Ok(())
            }
            LabelsAction::SetFilter(text) => {
                self.session.set_filter(&text);
                Ok(())
            }
            LabelsAction::ToggleVisibility(index) => self.session.toggle_visibility(index),
            LabelsAction::Dismiss(index) => self.session.dismiss(index),
            LabelsAction::Delete(index) => self.session.delete(index).map(|_| ()),
            LabelsAction::Prune => {
                let removed = self.session.prune_removed();
                self.report(format!("Pruned {} shapes", removed));
                Ok(())
            }
            LabelsAction::None => Ok(()),
        };
        if let Err(e) = result {
            self.report_error("Legend", e);
        }
    }

    fn handle_canvas(&mut self, action: CanvasAction) {
        let result = match action {
            CanvasAction::Select(selection) => self.session.on_selection(&selection).map(|_| ()),
            CanvasAction::Click(point) => self.session.on_click(point).map(|_| ()),
            CanvasAction::Finish => {
                self.session.finish_gesture();
                Ok(())
            }
            CanvasAction::OverlayEdit(index, edit) => {
                self.session.record_overlay_edit(index, edit);
                Ok(())
            }
            CanvasAction::None => Ok(()),
        };
        if let Err(e) = result {
            self.report_error("Cannot draw", e);
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.drag = CanvasDrag::Idle;
            if self.session.lasso_mode() == LassoMode::Open {
                self.session.finish_gesture();
            } else {
                self.session.cancel_gesture();
            }
        }

        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) {
            self.save();
        }
        if !self.session.is_editing() {
            if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
                self.session.undo();
            }
            if ctx.input(|i| {
                (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                    || (i.modifiers.command && i.key_pressed(egui::Key::Y))
            }) {
                self.session.redo();
            }
        }
    }

    fn show_menu(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let image_open = self.session.image_id().is_some();

        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.add_enabled(image_open, egui::Button::new("Save (Ctrl+S)")).clicked() {
                    self.save();
                    ui.close_menu();
                }
                ui.separator();
                if ui
                    .add_enabled(image_open, egui::Button::new("Load Annotations..."))
                    .clicked()
                {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Annotations", &["yaml", "yml", "json"])
                        .pick_file()
                    {
                        self.import_annotations(path);
                    }
                    ui.close_menu();
                }
                ui.add_enabled_ui(image_open, |ui| {
                    ui.menu_button("Export Annotations", |ui| {
                        if ui.button("Export as YAML...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("annotations.yaml")
                                .save_file()
                            {
                                self.export_annotations(path);
                            }
                            ui.close_menu();
                        }
                        if ui.button("Export as JSON...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("annotations.json")
                                .save_file()
                            {
                                self.export_annotations(path);
                            }
                            ui.close_menu();
                        }
                    });
                });
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                let editing = self.session.is_editing();
                if ui
                    .add_enabled(self.session.can_undo() && !editing, egui::Button::new("Undo (Ctrl+Z)"))
                    .clicked()
                {
                    self.session.undo();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(
                        self.session.can_redo() && !editing,
                        egui::Button::new("Redo (Ctrl+Shift+Z)"),
                    )
                    .clicked()
                {
                    self.session.redo();
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                if ui
                    .selectable_label(self.page == Page::Annotate, "Annotate")
                    .clicked()
                {
                    self.page = Page::Annotate;
                    ui.close_menu();
                }
                if ui.selectable_label(self.page == Page::Upload, "Upload").clicked() {
                    self.page = Page::Upload;
                    ui.close_menu();
                }
            });

            ui.add_enabled_ui(self.registry.is_some(), |ui| {
                let menu = ui.menu_button("Model", |ui| {
                    if self.runs.is_empty() {
                        ui.label("No runs found");
                    }
                    let mut picked = None;
                    for run in &self.runs {
                        if ui.selectable_label(&self.run_id == run, run).clicked() {
                            picked = Some(run.clone());
                        }
                    }
                    if let Some(run) = picked {
                        self.run_id = run;
                        ui.close_menu();
                    }
                    if ui.button("⟳ Refresh runs").clicked() {
                        self.refresh_runs();
                    }
                    ui.separator();
                    let can_batch = !self.run_id.trim().is_empty() && !self.images.is_empty();
                    if ui
                        .add_enabled(can_batch, egui::Button::new("Annotate listed images"))
                        .clicked()
                    {
                        self.batch_inference();
                        ui.close_menu();
                    }
                });
                if menu.response.clicked() {
                    self.refresh_runs();
                }
            });
        });
    }
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.show_menu(ctx, ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(self.status.as_deref().unwrap_or("Ready"));
        });

        if self.page == Page::Upload {
            let action = egui::CentralPanel::default()
                .show(ctx, |ui| {
                    uploader::show(ui, &mut self.upload_comments, &self.uploaded)
                })
                .inner;
            if action == uploader::UploaderAction::PickFiles {
                if let Some(paths) = rfd::FileDialog::new()
                    .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "zip"])
                    .pick_files()
                {
                    self.upload_files(paths);
                }
            }
            return;
        }

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(
                    ui,
                    &mut self.current_tool,
                    &self.session,
                    &mut self.run_id,
                    self.registry.is_some(),
                )
            })
            .inner;
        self.handle_toolbar(toolbar_action);

        let browser_action = egui::SidePanel::left("browser")
            .default_width(220.0)
            .show(ctx, |ui| {
                browser::show(
                    ui,
                    &self.images,
                    self.session.image_id(),
                    self.filename_list.as_ref().map(Vec::len),
                )
            })
            .inner;
        match browser_action {
            browser::BrowserAction::Open(id) => self.open_image(id, ctx),
            browser::BrowserAction::Refresh => self.refresh_images(),
            browser::BrowserAction::LoadFilenameList => self.load_filename_list(),
            browser::BrowserAction::ClearFilenameList => {
                self.filename_list = None;
                self.refresh_images();
            }
            browser::BrowserAction::None => {}
        }

        let labels_action = egui::SidePanel::right("labels")
            .default_width(250.0)
            .show(ctx, |ui| {
                labels::show(ui, &self.session, &mut self.filter_text, &mut self.new_label)
            })
            .inner;
        self.handle_labels(labels_action);

        self.handle_shortcuts(ctx);

        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                canvas::show(
                    ui,
                    &self.session,
                    &self.image_texture,
                    self.current_tool,
                    self.config.settings.display_height,
                    &mut self.drag,
                )
            })
            .inner;
        self.handle_canvas(canvas_action);
    }
}
