// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drag session state machine.
//!
//! A [`DragSession`] binds at most one drawable to the pointer. While bound
//! it remembers where on the drawable the pointer grabbed it, so the
//! drawable follows the pointer without jumping its origin to the cursor.

use crate::models::drawable::Drawable;
use crate::models::scene::DrawableId;
use crate::util::geometry::{Offset, Position};

/// Binding between the pointer and one drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Grab {
    target: DrawableId,
    /// Drawable origin minus the pointer position at grab time
    offset: Offset,
}

/// Single-slot drag state. Idle when `grab` is `None`.
#[derive(Debug, Default)]
pub struct DragSession {
    grab: Option<Grab>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `candidate` to the pointer. Does nothing if a drag is already
    /// in progress: the first binding wins until [`end_drag`](Self::end_drag).
    ///
    /// Returns whether the binding was made.
    pub fn try_start_drag(
        &mut self,
        target: DrawableId,
        candidate: &Drawable,
        grab_point: Position,
    ) -> bool {
        if self.grab.is_some() {
            return false;
        }

        let offset = candidate.position() - grab_point;
        self.grab = Some(Grab { target, offset });
        log::info!(
            "Started dragging {} {} (offset {:.1}, {:.1})",
            candidate.kind_name(),
            target.0,
            offset.dx,
            offset.dy
        );
        true
    }

    /// Move the bound drawable so it keeps its grab offset from `pointer`.
    pub fn update_drag(&mut self, drawables: &mut [Drawable], pointer: Position) {
        let Some(grab) = self.grab else {
            return;
        };

        match drawables.get_mut(grab.target.0) {
            Some(drawable) => drawable.move_to(pointer + grab.offset),
            None => {
                log::warn!("Dragged drawable {} no longer exists", grab.target.0);
                self.grab = None;
            }
        }
    }

    /// Release the binding, if any.
    pub fn end_drag(&mut self) {
        if let Some(grab) = self.grab.take() {
            log::info!("Dropped drawable {}", grab.target.0);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    pub fn dragged(&self) -> Option<DrawableId> {
        self.grab.map(|grab| grab.target)
    }

    pub fn grab_offset(&self) -> Option<Offset> {
        self.grab.map(|grab| grab.offset)
    }
}
