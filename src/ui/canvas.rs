// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the board.
//!
//! This module provides the egui implementation of the drawing [`Surface`]
//! and translates raw egui pointer events into board pointer events in
//! surface coordinates.

use crate::drag::DragSession;
use crate::io::media::VideoFrame;
use crate::models::drawable::Color;
use crate::models::scene::{PointerEvent, Scene};
use crate::render::{RenderLoop, Scheduler, Surface};
use crate::util::geometry::{Position, Size, Transform2D};
use std::collections::HashMap;
use std::time::Duration;

/// Schedules the next render loop frame as an egui repaint.
struct RepaintScheduler<'a>(&'a egui::Context);

impl Scheduler for RepaintScheduler<'_> {
    fn schedule(&mut self, delay: Duration) {
        self.0.request_repaint_after(delay);
    }
}

/// Display the board canvas: route pointer input to the scene, then run
/// one render loop frame into the canvas area.
pub fn show(
    ui: &mut egui::Ui,
    scene: &mut Scene,
    session: &mut DragSession,
    render_loop: &mut RenderLoop,
    textures: &mut TextureCache,
    background: Color,
    dt: Duration,
) {
    let (rect, response) =
        ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

    // Menus and popups are separate layers above the canvas; while one of
    // them is under the pointer the canvas is not hovered
    let accepts_press = response.hovered();

    for event in pointer_events(ui, rect, accepts_press) {
        scene.handle_pointer(session, event);
    }

    if session.is_dragging() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
    } else if let Some(pos) = response.hover_pos() {
        if scene.drawable_at(to_surface(pos, &rect)).is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        }
    }

    let ctx = ui.ctx().clone();
    let mut surface = PainterSurface::new(ui, rect, background, textures);
    let mut scheduler = RepaintScheduler(&ctx);
    if !render_loop.tick(scene, &mut surface, &mut scheduler, dt) {
        // egui repaints the whole canvas on every update, paused or not
        scene.render(&mut surface);
    }
}

/// One texture per media stream, re-uploaded when the frame changes.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<u64, (usize, egui::TextureHandle)>,
}

impl TextureCache {
    fn texture_for(&mut self, ctx: &egui::Context, frame: &VideoFrame) -> egui::TextureId {
        let image = || {
            egui::ColorImage::from_rgba_unmultiplied(
                [frame.width as usize, frame.height as usize],
                &frame.pixels,
            )
        };

        match self.textures.get_mut(&frame.stream_id) {
            Some((index, texture)) => {
                if *index != frame.index {
                    texture.set(image(), egui::TextureOptions::LINEAR);
                    *index = frame.index;
                }
                texture.id()
            }
            None => {
                let texture = ctx.load_texture(
                    format!("video-{}", frame.stream_id),
                    image(),
                    egui::TextureOptions::LINEAR,
                );
                let id = texture.id();
                self.textures.insert(frame.stream_id, (frame.index, texture));
                id
            }
        }
    }

    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

/// [`Surface`] painting into an egui canvas area.
pub struct PainterSurface<'a> {
    painter: egui::Painter,
    ctx: egui::Context,
    textures: &'a mut TextureCache,
    origin: egui::Pos2,
    size: Size,
    background: egui::Color32,
    fill: egui::Color32,
    transform: Transform2D,
    stack: Vec<Transform2D>,
}

impl<'a> PainterSurface<'a> {
    pub fn new(
        ui: &egui::Ui,
        rect: egui::Rect,
        background: Color,
        textures: &'a mut TextureCache,
    ) -> Self {
        Self {
            painter: ui.painter_at(rect),
            ctx: ui.ctx().clone(),
            textures,
            origin: rect.min,
            size: Size::new(f64::from(rect.width()), f64::from(rect.height())),
            background: to_color32(background),
            fill: egui::Color32::BLACK,
            transform: Transform2D::IDENTITY,
            stack: Vec::new(),
        }
    }

    fn to_screen(&self, point: Position) -> egui::Pos2 {
        egui::pos2(
            self.origin.x + point.x as f32,
            self.origin.y + point.y as f32,
        )
    }

    /// Paint a quad given in surface coordinates, textured or solid.
    fn paint_quad(
        &self,
        texture: egui::TextureId,
        color: egui::Color32,
        corners: [Position; 4],
        uvs: [egui::Pos2; 4],
    ) {
        let mut mesh = egui::Mesh::with_texture(texture);
        for (corner, uv) in corners.into_iter().zip(uvs) {
            mesh.vertices.push(egui::epaint::Vertex {
                pos: self.to_screen(corner),
                uv,
                color,
            });
        }
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(0, 2, 3);
        self.painter.add(egui::Shape::mesh(mesh));
    }

    fn paint_solid(&self, color: egui::Color32, x: f64, y: f64, width: f64, height: f64) {
        let corners = self.transform.quad(x, y, width, height);
        let uv = egui::epaint::WHITE_UV;
        self.paint_quad(egui::TextureId::default(), color, corners, [uv; 4]);
    }
}

impl Surface for PainterSurface<'_> {
    fn size(&self) -> Size {
        self.size
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.paint_solid(self.background, x, y, width, height);
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill = to_color32(color);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.paint_solid(self.fill, x, y, width, height);
    }

    fn draw_image(&mut self, frame: &VideoFrame, x: f64, y: f64, width: f64, height: f64) {
        let texture = self.textures.texture_for(&self.ctx, frame);
        let uvs = [
            egui::pos2(0.0, 0.0),
            egui::pos2(1.0, 0.0),
            egui::pos2(1.0, 1.0),
            egui::pos2(0.0, 1.0),
        ];
        let corners = self.transform.quad(x, y, width, height);
        self.paint_quad(texture, egui::Color32::WHITE, corners, uvs);
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        // Unbalanced restores are ignored, like on an HTML canvas
        if let Some(transform) = self.stack.pop() {
            self.transform = transform;
        }
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        self.transform.translate(tx, ty);
    }

    fn rotate(&mut self, radians: f64) {
        self.transform.rotate(radians);
    }
}

fn to_color32(color: Color) -> egui::Color32 {
    let (r, g, b) = color.rgb();
    egui::Color32::from_rgb(r, g, b)
}

/// Convert a screen position to surface coordinates.
pub fn to_surface(pos: egui::Pos2, rect: &egui::Rect) -> Position {
    Position::new(f64::from(pos.x - rect.min.x), f64::from(pos.y - rect.min.y))
}

/// Collect this frame's pointer events for the canvas at `rect`.
///
/// Presses only count inside the canvas and while `accepts_press` is set;
/// releases count anywhere so a drag that leaves the canvas still ends.
pub fn pointer_events(
    ui: &egui::Ui,
    rect: egui::Rect,
    accepts_press: bool,
) -> Vec<PointerEvent> {
    ui.input(|input| {
        input
            .events
            .iter()
            .filter_map(|event| match event {
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed: true,
                    ..
                } if accepts_press && rect.contains(*pos) => {
                    Some(PointerEvent::Down(to_surface(*pos, &rect)))
                }
                egui::Event::PointerButton {
                    button: egui::PointerButton::Primary,
                    pressed: false,
                    ..
                } => Some(PointerEvent::Up),
                egui::Event::PointerMoved(pos) => {
                    Some(PointerEvent::Move(to_surface(*pos, &rect)))
                }
                egui::Event::PointerGone | egui::Event::WindowFocused(false) => {
                    Some(PointerEvent::Cancel)
                }
                _ => None,
            })
            .collect()
    })
}
