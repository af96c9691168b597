// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Surface that records drawing commands instead of painting.

use super::Surface;
use crate::io::media::VideoFrame;
use crate::models::drawable::Color;
use crate::util::geometry::Size;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    ClearRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    SetFillColor(Color),
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    DrawImage {
        stream_id: u64,
        frame_index: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
}

#[derive(Debug)]
pub struct RecordingSurface {
    size: Size,
    pub commands: Vec<SurfaceCommand>,
}

impl RecordingSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Current save/restore nesting; zero when every save was restored.
    pub fn depth(&self) -> i64 {
        self.commands.iter().fold(0, |depth, command| match command {
            SurfaceCommand::Save => depth + 1,
            SurfaceCommand::Restore => depth - 1,
            _ => depth,
        })
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(SurfaceCommand::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn set_fill_color(&mut self, color: Color) {
        self.commands.push(SurfaceCommand::SetFillColor(color));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(SurfaceCommand::FillRect {
            x,
            y,
            width,
            height,
        });
    }

    fn draw_image(&mut self, frame: &VideoFrame, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(SurfaceCommand::DrawImage {
            stream_id: frame.stream_id,
            frame_index: frame.index,
            x,
            y,
            width,
            height,
        });
    }

    fn save(&mut self) {
        self.commands.push(SurfaceCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(SurfaceCommand::Restore);
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        self.commands.push(SurfaceCommand::Translate(tx, ty));
    }

    fn rotate(&mut self, radians: f64) {
        self.commands.push(SurfaceCommand::Rotate(radians));
    }
}
