// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the scene, the drag session and the render
//! loop, and hands them to the canvas each frame.

use crate::drag::DragSession;
use crate::io::media;
use crate::models::config::AppConfig;
use crate::models::drawable::{Drawable, VideoRectangle};
use crate::models::scene::Scene;
use crate::render::RenderLoop;
use crate::ui::canvas::{self, TextureCache};
use std::time::Duration;

/// Largest playback step per frame, so media does not jump after the
/// window was idle or hidden.
const MAX_FRAME_DT: Duration = Duration::from_millis(250);

/// Main application state.
pub struct DragBoardApp {
    /// Active configuration
    config: AppConfig,

    /// Drawables on the board, in paint order
    scene: Scene,

    /// Pointer-to-drawable binding
    session: DragSession,

    /// Repeating render task
    render_loop: RenderLoop,

    /// Uploaded video frame textures
    textures: TextureCache,

    /// egui input time of the previous frame
    last_frame_time: Option<f64>,
}

impl DragBoardApp {
    /// Create the application from its configuration.
    pub fn new(config: AppConfig) -> Self {
        let scene = build_scene(&config);
        let render_loop = RenderLoop::new(config.render.frame_interval());
        Self {
            config,
            scene,
            session: DragSession::new(),
            render_loop,
            textures: TextureCache::default(),
            last_frame_time: None,
        }
    }

    /// Replace the board with the one described by `config`. Window
    /// settings only apply at startup.
    fn apply_config(&mut self, config: AppConfig) {
        self.session.end_drag();
        self.textures.clear();

        let paused = self.render_loop.handle().is_cancelled();
        self.render_loop = RenderLoop::new(config.render.frame_interval());
        if paused {
            self.render_loop.handle().cancel();
        }

        self.scene = build_scene(&config);
        self.config = config;
    }

    /// Load a configuration file and switch to its scene.
    fn open_scene(&mut self, path: std::path::PathBuf) {
        match crate::io::serialization::load_config(&path) {
            Ok(config) => self.apply_config(config),
            Err(e) => log::error!("{:#}", e),
        }
    }

    /// Playback time elapsed since the previous frame.
    fn frame_dt(&mut self, ctx: &egui::Context) -> Duration {
        let now = ctx.input(|i| i.time);
        let dt = self
            .last_frame_time
            .map(|last| Duration::from_secs_f64((now - last).max(0.0)))
            .unwrap_or(Duration::ZERO);
        self.last_frame_time = Some(now);
        dt.min(MAX_FRAME_DT)
    }

    fn status_text(&self) -> String {
        if self.scene.is_empty() {
            return "Empty board, open a scene from the File menu".to_string();
        }

        match self.session.dragged().and_then(|id| self.scene.get(id).map(|d| (id, d))) {
            Some((id, drawable)) => {
                let position = drawable.position();
                let bounds = drawable.bounds();
                let offset = self.session.grab_offset().unwrap_or_default();
                let mut text = format!(
                    "Dragging {} {} ({:.0}x{:.0}) at ({:.0}, {:.0}), held {:.0}, {:.0} from its corner",
                    drawable.kind_name(),
                    id.0,
                    bounds.width,
                    bounds.height,
                    position.x,
                    position.y,
                    -offset.dx,
                    -offset.dy
                );
                if let Drawable::Video(video) = drawable {
                    text.push_str(&format!(", {}", video_state(video)));
                }
                text
            }
            None => {
                let videos: Vec<&VideoRectangle> = self
                    .scene
                    .iter()
                    .filter_map(|drawable| match drawable {
                        Drawable::Video(video) => Some(video),
                        Drawable::Rectangle(_) => None,
                    })
                    .collect();
                let mut text = format!("{} shapes", self.scene.len());
                if !videos.is_empty() {
                    let loaded = videos.iter().filter(|video| video.is_loaded()).count();
                    text.push_str(&format!(", {} of {} videos loaded", loaded, videos.len()));
                }
                text.push_str(", press and drag to move one");
                text
            }
        }
    }
}

/// Playback state of a video as shown in the status bar.
fn video_state(video: &VideoRectangle) -> &'static str {
    let stream = video.stream();
    if !video.is_loaded() {
        if stream.is_decoding() {
            "loading"
        } else {
            "unavailable"
        }
    } else if stream.is_ended() {
        "ended"
    } else if stream.is_paused() {
        "paused"
    } else {
        "playing"
    }
}

fn build_scene(config: &AppConfig) -> Scene {
    Scene::from_description(
        &config.scene,
        config.interaction.playback_toggle,
        media::open_stream,
    )
}

impl eframe::App for DragBoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = self.frame_dt(ctx);
        let render_handle = self.render_loop.handle();

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Scene...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Scene", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            self.open_scene(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if render_handle.is_cancelled() {
                        if ui.button("Resume Rendering").clicked() {
                            render_handle.resume();
                            log::info!("Render loop resumed");
                            ui.close_menu();
                        }
                    } else if ui.button("Pause Rendering").clicked() {
                        render_handle.cancel();
                        log::info!("Render loop paused");
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.status_text());
                ui.separator();
                ui.label(format!(
                    "Frame {} every {} ms",
                    self.render_loop.frames(),
                    self.render_loop.interval().as_millis()
                ));
                if render_handle.is_cancelled() {
                    ui.separator();
                    ui.label(egui::RichText::new("Rendering paused").weak());
                }
            });
        });

        // Main canvas (center)
        let background = self.config.render.background;
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                canvas::show(
                    ui,
                    &mut self.scene,
                    &mut self.session,
                    &mut self.render_loop,
                    &mut self.textures,
                    background,
                    dt,
                );
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::{DrawableSpec, SceneDescription};
    use crate::models::drawable::Color;
    use crate::util::geometry::{Position, Size};

    fn rect_only_config() -> AppConfig {
        AppConfig {
            scene: SceneDescription {
                drawables: vec![DrawableSpec::Rectangle {
                    position: Position::new(30.0, 80.0),
                    size: Size::new(80.0, 40.0),
                    color: Color(0x0f0f0f),
                }],
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_status_follows_drag() {
        let mut app = DragBoardApp::new(rect_only_config());
        assert!(app.status_text().starts_with("1 shapes"));

        app.scene.pointer_down(&mut app.session, Position::new(40.0, 90.0));
        app.scene.pointer_move(&mut app.session, Position::new(100.0, 100.0));
        assert_eq!(
            app.status_text(),
            "Dragging rectangle 0 (80x40) at (90, 90), held 10, 10 from its corner"
        );
    }

    #[test]
    fn test_status_reports_video_loading() {
        let mut config = rect_only_config();
        config.scene.drawables.push(DrawableSpec::Video {
            position: Position::new(200.0, 20.0),
            size: Size::new(50.0, 50.0),
            loading_color: Color(0x000000),
            source: "https://example.com/clip.webm".to_string(),
            rotation_degrees: 0.0,
        });
        let mut app = DragBoardApp::new(config);
        assert_eq!(
            app.status_text(),
            "2 shapes, 0 of 1 videos loaded, press and drag to move one"
        );

        app.scene.pointer_down(&mut app.session, Position::new(210.0, 30.0));
        assert!(app.status_text().ends_with("from its corner, unavailable"));
    }

    #[test]
    fn test_status_for_empty_board() {
        let config = AppConfig {
            scene: SceneDescription { drawables: vec![] },
            ..Default::default()
        };
        let app = DragBoardApp::new(config);
        assert_eq!(app.status_text(), "Empty board, open a scene from the File menu");
    }

    #[test]
    fn test_apply_config_drops_drag_and_keeps_pause() {
        let mut app = DragBoardApp::new(rect_only_config());
        app.scene.pointer_down(&mut app.session, Position::new(40.0, 90.0));
        app.render_loop.handle().cancel();

        let mut config = rect_only_config();
        config.render.frame_interval_ms = 40;
        app.apply_config(config);

        assert!(!app.session.is_dragging());
        assert!(app.render_loop.handle().is_cancelled());
        assert_eq!(app.render_loop.interval(), Duration::from_millis(40));
    }
}
