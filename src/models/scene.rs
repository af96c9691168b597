// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The board scene and its pointer driver.
//!
//! The scene owns its drawables in a single ordered list: insertion order
//! is paint order and also hit-test priority, so the first drawable under
//! the pointer is the one that gets picked up (not the topmost one).

use super::config::{DrawableSpec, PlaybackToggle, SceneDescription};
use super::drawable::{Drawable, Rectangle, VideoRectangle};
use crate::drag::DragSession;
use crate::io::media::MediaStream;
use crate::render::Surface;
use crate::util::geometry::Position;
use std::time::Duration;

/// Index of a drawable within its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawableId(pub usize);

/// Pointer input in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Position),
    Move(Position),
    Up,
    /// The pointer left the window or focus was lost mid-gesture.
    Cancel,
}

/// Ordered collection of drawables.
#[derive(Debug, Default)]
pub struct Scene {
    drawables: Vec<Drawable>,
    playback_toggle: PlaybackToggle,
}

impl Scene {
    pub fn new(playback_toggle: PlaybackToggle) -> Self {
        Self {
            drawables: Vec::new(),
            playback_toggle,
        }
    }

    /// Build a scene from its description. Video sources are requested
    /// through `open_stream`.
    pub fn from_description<F>(
        description: &SceneDescription,
        playback_toggle: PlaybackToggle,
        mut open_stream: F,
    ) -> Self
    where
        F: FnMut(&str) -> Box<dyn MediaStream>,
    {
        let mut scene = Scene::new(playback_toggle);
        for spec in &description.drawables {
            let drawable: Drawable = match spec {
                DrawableSpec::Rectangle {
                    position,
                    size,
                    color,
                } => Rectangle::new(*position, *size, *color).into(),
                DrawableSpec::Video {
                    position,
                    size,
                    loading_color,
                    source,
                    rotation_degrees,
                } => VideoRectangle::new(*position, *size, *loading_color, open_stream(source))
                    .with_rotation(*rotation_degrees)
                    .into(),
            };
            scene.push(drawable);
        }
        log::info!("Built scene with {} drawables", scene.len());
        scene
    }

    /// Append a drawable; it paints above and picks after everything
    /// already in the scene.
    pub fn push(&mut self, drawable: impl Into<Drawable>) -> DrawableId {
        self.drawables.push(drawable.into());
        DrawableId(self.drawables.len() - 1)
    }

    pub fn get(&self, id: DrawableId) -> Option<&Drawable> {
        self.drawables.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    /// Drawables in paint order.
    pub fn iter(&self) -> impl Iterator<Item = &Drawable> {
        self.drawables.iter()
    }

    /// First drawable containing `point`, in list order. No side effects.
    pub fn drawable_at(&self, point: Position) -> Option<DrawableId> {
        self.drawables
            .iter()
            .position(|drawable| drawable.hit_test(point))
            .map(DrawableId)
    }

    pub fn handle_pointer(&mut self, session: &mut DragSession, event: PointerEvent) {
        match event {
            PointerEvent::Down(point) => {
                self.pointer_down(session, point);
            }
            PointerEvent::Move(point) => self.pointer_move(session, point),
            PointerEvent::Up => self.pointer_up(session),
            PointerEvent::Cancel => self.pointer_cancelled(session),
        }
    }

    /// Pick up the first drawable under `point` unless a drag is already
    /// running. Returns the drawable that was picked up.
    pub fn pointer_down(
        &mut self,
        session: &mut DragSession,
        point: Position,
    ) -> Option<DrawableId> {
        match self.playback_toggle {
            PlaybackToggle::OnPick => {
                if session.is_dragging() {
                    return None;
                }
                let id = self.drawable_at(point)?;
                let drawable = &mut self.drawables[id.0];
                drawable.toggle_playback();
                session.try_start_drag(id, drawable, point).then_some(id)
            }
            PlaybackToggle::EveryHitTest => {
                // Scan everything so every video gets toggled
                let mut picked = None;
                for (index, drawable) in self.drawables.iter_mut().enumerate() {
                    if drawable.hit_test_and_toggle(point) && !session.is_dragging() {
                        let id = DrawableId(index);
                        if session.try_start_drag(id, drawable, point) {
                            picked = Some(id);
                        }
                    }
                }
                picked
            }
        }
    }

    pub fn pointer_move(&mut self, session: &mut DragSession, point: Position) {
        session.update_drag(&mut self.drawables, point);
    }

    pub fn pointer_up(&self, session: &mut DragSession) {
        session.end_drag();
    }

    pub fn pointer_cancelled(&self, session: &mut DragSession) {
        if session.is_dragging() {
            log::debug!("Pointer lost during drag, dropping in place");
        }
        session.end_drag();
    }

    /// Deliver media readiness and advance playback by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        for drawable in &mut self.drawables {
            drawable.poll_media();
            drawable.advance(dt);
        }
    }

    /// Clear the surface and paint every drawable in order.
    pub fn render(&self, surface: &mut dyn Surface) {
        let size = surface.size();
        surface.clear_rect(0.0, 0.0, size.width, size.height);
        for drawable in &self.drawables {
            drawable.render(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::media::{test_frame, FrameSequence, LoaderMessage};
    use crate::models::drawable::Color;
    use crate::render::recording::{RecordingSurface, SurfaceCommand};
    use crate::util::geometry::Size;
    use std::sync::mpsc::SyncSender;

    fn video_is_paused(scene: &Scene, id: DrawableId) -> bool {
        match scene.get(id) {
            Some(Drawable::Video(video)) => video.stream().is_paused(),
            other => panic!("expected a video, got {:?}", other),
        }
    }

    /// Two overlapping rectangles followed by a video off to the side.
    fn demo_scene(toggle: PlaybackToggle) -> (Scene, SyncSender<LoaderMessage>) {
        let mut scene = Scene::new(toggle);
        scene.push(Rectangle::new(
            Position::new(30.0, 80.0),
            Size::new(80.0, 40.0),
            Color(0x0f0f0f),
        ));
        scene.push(Rectangle::new(
            Position::new(50.0, 90.0),
            Size::new(80.0, 40.0),
            Color(0xff0000),
        ));
        let (stream, sender) = FrameSequence::with_channel("clip.gif");
        scene.push(VideoRectangle::new(
            Position::new(300.0, 300.0),
            Size::new(50.0, 50.0),
            Color::WHITE,
            Box::new(stream),
        ));
        (scene, sender)
    }

    #[test]
    fn test_picks_first_in_list_order() {
        let (mut scene, _sender) = demo_scene(PlaybackToggle::OnPick);
        let mut session = DragSession::new();

        // Overlap region: both rectangles collide, the first one wins
        let picked = scene.pointer_down(&mut session, Position::new(60.0, 100.0));
        assert_eq!(picked, Some(DrawableId(0)));
        assert_eq!(session.dragged(), Some(DrawableId(0)));
    }

    #[test]
    fn test_full_drag_gesture() {
        let (mut scene, _sender) = demo_scene(PlaybackToggle::OnPick);
        let mut session = DragSession::new();

        scene.handle_pointer(&mut session, PointerEvent::Down(Position::new(40.0, 90.0)));
        scene.handle_pointer(&mut session, PointerEvent::Move(Position::new(100.0, 100.0)));
        assert_eq!(scene.get(DrawableId(0)).unwrap().position(), Position::new(90.0, 90.0));

        scene.handle_pointer(&mut session, PointerEvent::Up);
        assert!(!session.is_dragging());

        scene.handle_pointer(&mut session, PointerEvent::Move(Position::new(0.0, 0.0)));
        assert_eq!(scene.get(DrawableId(0)).unwrap().position(), Position::new(90.0, 90.0));
    }

    #[test]
    fn test_press_on_empty_space_does_nothing() {
        let (mut scene, _sender) = demo_scene(PlaybackToggle::OnPick);
        let mut session = DragSession::new();

        assert_eq!(scene.pointer_down(&mut session, Position::new(5.0, 5.0)), None);
        assert!(!session.is_dragging());
        assert!(video_is_paused(&scene, DrawableId(2)));
    }

    #[test]
    fn test_press_while_dragging_keeps_binding() {
        let (mut scene, _sender) = demo_scene(PlaybackToggle::OnPick);
        let mut session = DragSession::new();

        scene.pointer_down(&mut session, Position::new(40.0, 90.0));
        assert_eq!(scene.pointer_down(&mut session, Position::new(320.0, 320.0)), None);
        assert_eq!(session.dragged(), Some(DrawableId(0)));
        assert!(video_is_paused(&scene, DrawableId(2)));
    }

    #[test]
    fn test_on_pick_toggles_only_picked_video() {
        let (mut scene, _sender) = demo_scene(PlaybackToggle::OnPick);
        let mut session = DragSession::new();

        scene.pointer_down(&mut session, Position::new(40.0, 90.0));
        scene.pointer_up(&mut session);
        assert!(video_is_paused(&scene, DrawableId(2)));

        // Moving across the video never touches playback
        scene.pointer_move(&mut session, Position::new(320.0, 320.0));
        assert!(video_is_paused(&scene, DrawableId(2)));

        assert_eq!(scene.pointer_down(&mut session, Position::new(320.0, 320.0)), Some(DrawableId(2)));
        assert!(!video_is_paused(&scene, DrawableId(2)));
    }

    #[test]
    fn test_every_hit_test_toggles_on_any_press() {
        let (mut scene, _sender) = demo_scene(PlaybackToggle::EveryHitTest);
        let mut session = DragSession::new();

        // Press far from the video still toggles it
        assert_eq!(scene.pointer_down(&mut session, Position::new(40.0, 90.0)), Some(DrawableId(0)));
        assert!(!video_is_paused(&scene, DrawableId(2)));
        scene.pointer_up(&mut session);

        assert_eq!(scene.pointer_down(&mut session, Position::new(5.0, 5.0)), None);
        assert!(video_is_paused(&scene, DrawableId(2)));
    }

    #[test]
    fn test_every_hit_test_first_collision_wins() {
        let (mut scene, _sender) = demo_scene(PlaybackToggle::EveryHitTest);
        let mut session = DragSession::new();

        assert_eq!(scene.pointer_down(&mut session, Position::new(60.0, 100.0)), Some(DrawableId(0)));
        assert_eq!(session.dragged(), Some(DrawableId(0)));
    }

    #[test]
    fn test_cancel_drops_in_place() {
        let (mut scene, _sender) = demo_scene(PlaybackToggle::OnPick);
        let mut session = DragSession::new();

        scene.handle_pointer(&mut session, PointerEvent::Down(Position::new(40.0, 90.0)));
        scene.handle_pointer(&mut session, PointerEvent::Move(Position::new(50.0, 100.0)));
        scene.handle_pointer(&mut session, PointerEvent::Cancel);

        assert!(!session.is_dragging());
        assert_eq!(scene.get(DrawableId(0)).unwrap().position(), Position::new(40.0, 90.0));
    }

    #[test]
    fn test_render_clears_then_paints_in_order() {
        let (mut scene, sender) = demo_scene(PlaybackToggle::OnPick);
        let mut surface = RecordingSurface::new(Size::new(400.0, 400.0));

        scene.render(&mut surface);
        assert_eq!(
            surface.commands[0],
            SurfaceCommand::ClearRect {
                x: 0.0,
                y: 0.0,
                width: 400.0,
                height: 400.0
            }
        );
        // Unloaded video adds nothing after the two rectangles
        assert_eq!(surface.commands.len(), 5);
        assert_eq!(surface.commands[1], SurfaceCommand::SetFillColor(Color(0x0f0f0f)));
        assert_eq!(surface.commands[3], SurfaceCommand::SetFillColor(Color(0xff0000)));

        sender.send(LoaderMessage::Frame(test_frame(40))).unwrap();
        scene.tick(Duration::from_millis(16));
        surface.commands.clear();
        scene.render(&mut surface);
        assert!(surface
            .commands
            .iter()
            .any(|command| matches!(command, SurfaceCommand::DrawImage { .. })));
    }

    #[test]
    fn test_from_description_uses_opener() {
        let description = SceneDescription::default();
        let mut requested = Vec::new();
        let scene = Scene::from_description(&description, PlaybackToggle::OnPick, |source| {
            requested.push(source.to_string());
            Box::new(FrameSequence::unavailable(source))
        });

        assert_eq!(scene.len(), 3);
        assert_eq!(requested, vec!["media/sample.gif".to_string()]);
        assert_eq!(scene.drawable_at(Position::new(50.0, 100.0)), Some(DrawableId(1)));
        assert!(matches!(scene.get(DrawableId(2)), Some(Drawable::Video(_))));
    }

    #[test]
    fn test_empty_scene() {
        let mut scene = Scene::new(PlaybackToggle::OnPick);
        assert!(scene.is_empty());
        assert_eq!(scene.iter().count(), 0);

        let mut session = DragSession::new();
        scene.pointer_down(&mut session, Position::new(10.0, 10.0));
        assert!(!session.is_dragging());

        scene.push(Rectangle::new(Position::new(0.0, 0.0), Size::new(20.0, 20.0), Color::WHITE));
        assert!(!scene.is_empty());
        assert_eq!(scene.iter().map(|d| d.kind_name()).collect::<Vec<_>>(), vec!["rectangle"]);
    }
}
