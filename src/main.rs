// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotator desktop application.
//!
//! Reads its configuration from the environment, opens the image store
//! and runs the egui front-end.

use annotator::app::AnnotatorApp;
use annotator::config::Config;
use anyhow::Result;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    log::info!("Using image store at {}", config.store_dir.display());
    match &config.model_dir {
        Some(dir) => log::info!("Using model runs from {}", dir.display()),
        None => log::info!("No model directory configured, inference disabled"),
    }
    let app = AnnotatorApp::new(config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Annotator"),
        ..Default::default()
    };

    eframe::run_native(
        "Annotator",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
