// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawable shapes.
//!
//! This module defines the closed set of shapes that can be placed on the
//! board: plain rectangles and rectangles that show a video stream.

use crate::io::media::MediaStream;
use crate::render::Surface;
use crate::util::geometry::{Position, Size};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rotation applied to video rectangles unless configured otherwise.
pub const DEFAULT_VIDEO_ROTATION_DEGREES: f64 = 45.0;

/// Solid color as 0xRRGGBB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);

    /// Split into (red, green, blue) channels.
    pub fn rgb(self) -> (u8, u8, u8) {
        let [_, r, g, b] = self.0.to_be_bytes();
        (r, g, b)
    }
}

/// Strict containment test: points on an edge are outside.
fn contains(position: Position, bounds: Size, point: Position) -> bool {
    point.x > position.x
        && point.x < position.x + bounds.width
        && point.y > position.y
        && point.y < position.y + bounds.height
}

/// A solid axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub position: Position,
    pub bounds: Size,
    pub color: Color,
}

impl Rectangle {
    pub fn new(position: Position, bounds: Size, color: Color) -> Self {
        Self {
            position,
            bounds,
            color,
        }
    }

    pub fn hit_test(&self, point: Position) -> bool {
        contains(self.position, self.bounds, point)
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.set_fill_color(self.color);
        surface.fill_rect(
            self.position.x,
            self.position.y,
            self.bounds.width,
            self.bounds.height,
        );
    }

    pub fn move_to(&mut self, position: Position) {
        self.position = position;
    }
}

/// A rectangle that shows the current frame of a media stream, rotated
/// about its center.
#[derive(Debug)]
pub struct VideoRectangle {
    rect: Rectangle,
    stream: Box<dyn MediaStream>,
    is_loaded: bool,
    rotation_degrees: f64,
}

impl VideoRectangle {
    /// Create a video rectangle around an already requested stream.
    /// `loading_color` is kept for parity with plain rectangles but never
    /// painted: nothing is drawn until the stream is ready.
    pub fn new(
        position: Position,
        bounds: Size,
        loading_color: Color,
        stream: Box<dyn MediaStream>,
    ) -> Self {
        Self {
            rect: Rectangle::new(position, bounds, loading_color),
            stream,
            is_loaded: false,
            rotation_degrees: DEFAULT_VIDEO_ROTATION_DEGREES,
        }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub fn stream(&self) -> &dyn MediaStream {
        self.stream.as_ref()
    }

    /// Play if paused or ended, pause otherwise.
    pub fn toggle_playback(&mut self) {
        if self.stream.is_paused() || self.stream.is_ended() {
            self.stream.play();
            log::debug!("Video at ({}, {}) playing", self.rect.position.x, self.rect.position.y);
        } else {
            self.stream.pause();
            log::debug!("Video at ({}, {}) paused", self.rect.position.x, self.rect.position.y);
        }
    }

    /// Consume the stream's readiness notification.
    pub fn poll_media(&mut self) {
        if !self.is_loaded && self.stream.take_ready() {
            self.is_loaded = true;
            log::info!(
                "Video at ({}, {}) loaded its first frame",
                self.rect.position.x,
                self.rect.position.y
            );
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.stream.advance(dt);
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        if !self.is_loaded {
            return;
        }

        let Rectangle {
            position, bounds, ..
        } = self.rect;

        surface.save();
        surface.translate(
            position.x + bounds.width / 2.0,
            position.y + bounds.height / 2.0,
        );
        surface.rotate(self.rotation_degrees.to_radians());
        if let Some(frame) = self.stream.current_frame() {
            surface.draw_image(
                frame,
                -bounds.width / 2.0,
                -bounds.height / 2.0,
                bounds.width,
                bounds.height,
            );
        }
        surface.restore();
    }
}

/// Anything that can be placed on the board.
#[derive(Debug)]
pub enum Drawable {
    Rectangle(Rectangle),
    Video(VideoRectangle),
}

impl Drawable {
    fn rect(&self) -> &Rectangle {
        match self {
            Drawable::Rectangle(rect) => rect,
            Drawable::Video(video) => &video.rect,
        }
    }

    fn rect_mut(&mut self) -> &mut Rectangle {
        match self {
            Drawable::Rectangle(rect) => rect,
            Drawable::Video(video) => &mut video.rect,
        }
    }

    pub fn position(&self) -> Position {
        self.rect().position
    }

    pub fn bounds(&self) -> Size {
        self.rect().bounds
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Drawable::Rectangle(_) => "rectangle",
            Drawable::Video(_) => "video",
        }
    }

    /// Whether `point` lies strictly inside the drawable. Never has side
    /// effects, video playback included.
    pub fn hit_test(&self, point: Position) -> bool {
        self.rect().hit_test(point)
    }

    /// Hit test that also toggles video playback whatever the result.
    /// Used by the scene only in [`PlaybackToggle::EveryHitTest`] mode.
    ///
    /// [`PlaybackToggle::EveryHitTest`]: crate::models::config::PlaybackToggle::EveryHitTest
    pub fn hit_test_and_toggle(&mut self, point: Position) -> bool {
        let hit = self.hit_test(point);
        self.toggle_playback();
        hit
    }

    /// Toggle video playback. Rectangles have nothing to play.
    pub fn toggle_playback(&mut self) {
        if let Drawable::Video(video) = self {
            video.toggle_playback();
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        match self {
            Drawable::Rectangle(rect) => rect.render(surface),
            Drawable::Video(video) => video.render(surface),
        }
    }

    pub fn move_to(&mut self, position: Position) {
        self.rect_mut().move_to(position);
    }

    pub fn poll_media(&mut self) {
        if let Drawable::Video(video) = self {
            video.poll_media();
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        if let Drawable::Video(video) = self {
            video.advance(dt);
        }
    }
}

impl From<Rectangle> for Drawable {
    fn from(rect: Rectangle) -> Self {
        Drawable::Rectangle(rect)
    }
}

impl From<VideoRectangle> for Drawable {
    fn from(video: VideoRectangle) -> Self {
        Drawable::Video(video)
    }
}
