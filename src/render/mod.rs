// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing surface abstraction and the render loop.
//!
//! Drawables paint through the [`Surface`] trait, a small canvas-style API
//! with a save/restore transform stack. The [`RenderLoop`] drives one frame
//! per tick and asks a [`Scheduler`] for the next one, so frames can be
//! stepped by hand in tests.

#[cfg(test)]
pub mod recording;

use crate::io::media::VideoFrame;
use crate::models::drawable::Color;
use crate::models::scene::Scene;
use crate::util::geometry::Size;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Canvas-style drawing target. Coordinates pass through the current
/// transform.
pub trait Surface {
    /// Drawable area in surface coordinates.
    fn size(&self) -> Size;

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn set_fill_color(&mut self, color: Color);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Draw a whole frame scaled into the given rectangle.
    fn draw_image(&mut self, frame: &VideoFrame, x: f64, y: f64, width: f64, height: f64);

    /// Push the current transform.
    fn save(&mut self);

    /// Pop the transform pushed by the matching [`save`](Self::save).
    fn restore(&mut self);

    fn translate(&mut self, tx: f64, ty: f64);

    fn rotate(&mut self, radians: f64);
}

/// "Run the render loop again after `delay`".
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration);
}

/// Shared cancel switch for a [`RenderLoop`].
#[derive(Debug, Clone, Default)]
pub struct RenderLoopHandle {
    cancelled: Rc<Cell<bool>>,
}

impl RenderLoopHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn resume(&self) {
        self.cancelled.set(false);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Repeating render task: advance media, paint, reschedule.
#[derive(Debug)]
pub struct RenderLoop {
    interval: Duration,
    frames: u64,
    handle: RenderLoopHandle,
}

impl RenderLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            frames: 0,
            handle: RenderLoopHandle::default(),
        }
    }

    pub fn handle(&self) -> RenderLoopHandle {
        self.handle.clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame with `dt` of elapsed playback time. Returns `false`
    /// without touching anything once the loop has been cancelled.
    pub fn tick(
        &mut self,
        scene: &mut Scene,
        surface: &mut dyn Surface,
        scheduler: &mut dyn Scheduler,
        dt: Duration,
    ) -> bool {
        if self.handle.is_cancelled() {
            return false;
        }

        scene.tick(dt);
        scene.render(surface);
        self.frames += 1;
        scheduler.schedule(self.interval);
        true
    }
}
