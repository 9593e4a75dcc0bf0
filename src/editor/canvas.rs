use egui::{Color32, CursorIcon, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, Vec2};

use sticker_studio::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use sticker_studio::{Action, Cursor, InputEvent, Point, Session};

const CHECKER_SIZE: f32 = 10.0;
const CHECKER_LIGHT: Color32 = Color32::from_gray(235);
const CHECKER_DARK: Color32 = Color32::from_gray(205);

/// Viewport size offered to the freehand tool.
pub const FREEHAND_VIEWPORT: Vec2 = Vec2::new(480.0, 360.0);

/// On-screen view of the sticker canvas.
pub struct CanvasView {
    pub zoom: f32,
    texture: Option<TextureHandle>,
    dirty: bool,
    cursor: Cursor,
    pointer_inside: bool,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self {
            zoom: 1.5,
            texture: None,
            dirty: true,
            cursor: Cursor::Default,
            pointer_inside: false,
        }
    }
}

impl CanvasView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-render on the next frame.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn screen_to_canvas(&self, screen_pos: Pos2, canvas_rect: Rect) -> Point {
        let local = screen_pos - canvas_rect.min;
        Point::new(local.x / self.zoom, local.y / self.zoom)
    }

    /// Draw the canvas and feed pointer input to the session. Returns the
    /// actions the app still has to carry out (confirmations, messages).
    /// While a dialog is open, pass `interactive = false` to ignore input.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        session: &mut Session,
        interactive: bool,
    ) -> Vec<Action> {
        let size = Vec2::new(CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32) * self.zoom;
        let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
        let rect = response.rect;

        let actions = if interactive {
            self.handle_input(ui, session, &response, rect)
        } else {
            Vec::new()
        };
        let mut pending = Vec::new();
        for action in actions {
            match action {
                Action::RenderNeeded => self.dirty = true,
                Action::SetCursor(cursor) => self.cursor = cursor,
                other => pending.push(other),
            }
        }

        if self.dirty {
            self.upload_texture(ui.ctx(), session);
        }

        paint_checkerboard(&painter, rect);
        if let Some(texture) = &self.texture {
            let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::GRAY));

        if response.hovered() || session.controller().is_dragging() {
            ui.ctx().set_cursor_icon(match self.cursor {
                Cursor::Default => CursorIcon::Default,
                Cursor::Grab => CursorIcon::Grab,
                Cursor::Grabbing => CursorIcon::Grabbing,
            });
        }

        pending
    }

    fn handle_input(
        &mut self,
        ui: &egui::Ui,
        session: &mut Session,
        response: &egui::Response,
        rect: Rect,
    ) -> Vec<Action> {
        let (latest, pressed, released, moved) = ui.input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.delta() != Vec2::ZERO,
            )
        });
        let inside = latest.is_some_and(|p| rect.contains(p));
        let mut actions = Vec::new();

        if response.double_clicked()
            && let Some(pos) = latest
        {
            let p = self.screen_to_canvas(pos, rect);
            actions.extend(session.handle_event(InputEvent::DoubleClick(p)));
        } else if pressed
            && inside
            && let Some(pos) = latest
        {
            let p = self.screen_to_canvas(pos, rect);
            actions.extend(session.handle_event(InputEvent::PointerDown(p)));
        }

        if moved
            && inside
            && let Some(pos) = latest
        {
            let p = self.screen_to_canvas(pos, rect);
            actions.extend(session.handle_event(InputEvent::PointerMove(p)));
        }

        if released {
            actions.extend(session.handle_event(InputEvent::PointerUp));
        } else if self.pointer_inside && !inside {
            actions.extend(session.handle_event(InputEvent::PointerLeave));
        }
        self.pointer_inside = inside;

        actions
    }

    fn upload_texture(&mut self, ctx: &egui::Context, session: &Session) {
        match session.render() {
            Ok(pixmap) => {
                let size = [pixmap.width() as usize, pixmap.height() as usize];
                let image = egui::ColorImage::from_rgba_premultiplied(size, pixmap.data());
                match &mut self.texture {
                    Some(texture) => texture.set(image, TextureOptions::LINEAR),
                    None => {
                        self.texture =
                            Some(ctx.load_texture("sticker-canvas", image, TextureOptions::LINEAR));
                    }
                }
                self.dirty = false;
            }
            Err(e) => tracing::error!(error = %e, "canvas render failed"),
        }
    }
}

/// Preview of the freehand tool, drawn in display coordinates.
#[derive(Default)]
pub struct FreehandView {
    texture: Option<TextureHandle>,
    dirty: bool,
}

impl FreehandView {
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn show(&mut self, ui: &mut egui::Ui, session: &mut Session) {
        let Some(tool) = session.freehand() else {
            return;
        };
        let display = session
            .scene()
            .image()
            .map(|img| tool.display_size(&img.bitmap))
            .unwrap_or((1, 1));
        let size = Vec2::new(display.0 as f32, display.1 as f32);
        let (response, painter) = ui.allocate_painter(size, Sense::drag());
        let rect = response.rect;

        let to_local = |pos: Pos2| {
            let local = pos - rect.min;
            Point::new(local.x, local.y)
        };
        if let Some(tool) = session.freehand_mut() {
            if response.drag_started()
                && let Some(pos) = response.interact_pointer_pos()
            {
                tool.pointer_down(to_local(pos));
                self.dirty = true;
            } else if response.dragged()
                && let Some(pos) = response.interact_pointer_pos()
            {
                self.dirty |= tool.pointer_move(to_local(pos));
            }
            if response.drag_stopped() {
                tool.pointer_up();
                self.dirty = true;
            }
        }

        if self.dirty || self.texture.is_none() {
            match session.freehand_preview() {
                Ok(Some(preview)) => {
                    let size = [preview.width() as usize, preview.height() as usize];
                    let image = egui::ColorImage::from_rgba_unmultiplied(size, preview.as_raw());
                    self.texture =
                        Some(ui.ctx().load_texture("freehand-preview", image, TextureOptions::LINEAR));
                    self.dirty = false;
                }
                Ok(None) => {}
                Err(e) => tracing::error!(error = %e, "freehand preview failed"),
            }
        }

        paint_checkerboard(&painter, rect);
        if let Some(texture) = &self.texture {
            let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }
    }
}

fn paint_checkerboard(painter: &egui::Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, CHECKER_LIGHT);
    let cols = (rect.width() / CHECKER_SIZE).ceil() as usize;
    let rows = (rect.height() / CHECKER_SIZE).ceil() as usize;
    for row in 0..rows {
        for col in (row % 2..cols).step_by(2) {
            let min = rect.min + Vec2::new(col as f32, row as f32) * CHECKER_SIZE;
            let cell = Rect::from_min_size(min, Vec2::splat(CHECKER_SIZE)).intersect(rect);
            painter.rect_filled(cell, 0.0, CHECKER_DARK);
        }
    }
}
