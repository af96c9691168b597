// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! This module defines the configuration file structure: window settings,
//! render loop timing, interaction policy and the initial scene layout.
//! Every section has defaults so a partial file is valid.

use super::drawable::{Color, DEFAULT_VIDEO_ROTATION_DEGREES};
use crate::util::geometry::{Position, Size};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub interaction: InteractionConfig,
    pub scene: SceneDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Dragboard".to_string(),
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Delay between render loop frames
    pub frame_interval_ms: u64,
    /// Color the surface is cleared to each frame
    pub background: Color,
}

impl RenderConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            background: Color(0x282828),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub playback_toggle: PlaybackToggle,
}

/// When pressing the pointer toggles video playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackToggle {
    /// Only the drawable picked up by a pointer press is toggled.
    #[default]
    OnPick,
    /// Every video in the scene toggles on every pointer press, hit or
    /// not. Kept for compatibility with the legacy board.
    EveryHitTest,
}

/// Initial contents of the board, in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub drawables: Vec<DrawableSpec>,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            drawables: vec![
                DrawableSpec::Rectangle {
                    position: Position::new(10.0, 10.0),
                    size: Size::new(1.0, 1.0),
                    color: Color(0xff0000),
                },
                DrawableSpec::Rectangle {
                    position: Position::new(30.0, 80.0),
                    size: Size::new(80.0, 40.0),
                    color: Color(0x0f0f0f),
                },
                DrawableSpec::Video {
                    position: Position::new(1.0, 1.0),
                    size: Size::new(50.0, 50.0),
                    loading_color: Color::WHITE,
                    source: "media/sample.gif".to_string(),
                    rotation_degrees: DEFAULT_VIDEO_ROTATION_DEGREES,
                },
            ],
        }
    }
}

/// One drawable in a scene description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawableSpec {
    Rectangle {
        position: Position,
        size: Size,
        color: Color,
    },
    Video {
        position: Position,
        size: Size,
        #[serde(default = "default_loading_color")]
        loading_color: Color,
        source: String,
        #[serde(default = "default_rotation")]
        rotation_degrees: f64,
    },
}

fn default_loading_color() -> Color {
    Color::WHITE
}

fn default_rotation() -> f64 {
    DEFAULT_VIDEO_ROTATION_DEGREES
}
