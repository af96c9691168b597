// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dragboard - drag and drop board
//!
//! A desktop application showing rectangles and video-backed rectangles
//! that can be picked up with the mouse, moved, and dropped.

mod app;
mod drag;
mod io;
mod models;
mod render;
mod ui;
mod util;

use anyhow::Result;
use app::DragBoardApp;
use models::config::AppConfig;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Optional configuration file as the only argument
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => io::serialization::load_config(&path)?,
        None => AppConfig::default(),
    };

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([320.0, 240.0])
            .with_title(config.window.title.clone()),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Dragboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DragBoardApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
