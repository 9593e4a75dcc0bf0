use std::collections::HashMap;

use eframe::egui;

use sticker_studio::consts::{EFFECT_SIZE_RANGE, IMAGE_SCALE_PERCENT_RANGE, TEXT_SIZE_RANGE};
use sticker_studio::store::{export_file_name, now_millis};
use sticker_studio::{
    Action, Background, Color, CropRect, EffectSymbol, FontWeight, InputEvent, JsonFileStore,
    LayerKind, LayerRef, MaskMode, Result, Session, StickerCollection, StudioConfig, Typeface,
    imaging,
};

use super::canvas::{CanvasView, FREEHAND_VIEWPORT, FreehandView};

#[derive(Debug, Clone, Copy, PartialEq)]
enum BackgroundChoice {
    Transparent,
    White,
    Custom,
}

pub struct StickerEditorApp {
    session: Session,
    collection: StickerCollection<JsonFileStore>,
    canvas: CanvasView,
    freehand_view: FreehandView,
    text_input: String,
    text_color: [u8; 3],
    bold: bool,
    border_on_cutout: bool,
    background_choice: BackgroundChoice,
    background_color: [u8; 3],
    pending_delete: Option<LayerRef>,
    pending_sticker_delete: Option<u64>,
    pending_clear: bool,
    crop_dialog: Option<CropRect>,
    thumbnails: HashMap<u64, egui::TextureHandle>,
    status_message: String,
}

impl StickerEditorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: StudioConfig) -> Self {
        let mut session = Session::from_config(&config).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "invalid settings, using defaults");
            Session::default()
        });
        let typeface = with_bundled_fonts(session.typeface().clone());
        session.set_typeface(typeface);
        let collection = StickerCollection::with_capacity(
            JsonFileStore::new(&config.store_path),
            config.capacity,
        );
        Self {
            session,
            collection,
            canvas: CanvasView::new(),
            freehand_view: FreehandView::default(),
            text_input: String::new(),
            text_color: [0, 0, 0],
            bold: false,
            border_on_cutout: true,
            background_choice: BackgroundChoice::Transparent,
            background_color: [255, 255, 255],
            pending_delete: None,
            pending_sticker_delete: None,
            pending_clear: false,
            crop_dialog: None,
            thumbnails: HashMap::new(),
            status_message: String::from("Ready - Open an image to begin"),
        }
    }

    /// Show the outcome of an operation in the status bar and redraw.
    fn report(&mut self, result: Result<String>) {
        match result {
            Ok(message) => self.status_message = message,
            Err(e) => {
                tracing::warn!(error = %e, "operation failed");
                self.status_message = format!("Error: {e}");
            }
        }
        self.canvas.invalidate();
    }

    fn open_image(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg"])
            .pick_file()
        {
            let result = std::fs::read(&path)
                .map_err(Into::into)
                .and_then(|bytes| self.session.upload(&bytes))
                .map(|_| format!("Loaded: {}", path.display()));
            self.report(result);
        }
    }

    fn auto_cutout(&mut self) {
        let result = self
            .session
            .auto_cutout(self.border_on_cutout)
            .map(|cleared| format!("Background removed ({cleared} pixels)"));
        self.report(result);
    }

    fn open_freehand(&mut self) {
        let result = self
            .session
            .open_freehand(FREEHAND_VIEWPORT.x, FREEHAND_VIEWPORT.y)
            .map(|_| String::from("Draw around the area to keep or erase"));
        self.freehand_view.invalidate();
        self.report(result);
    }

    fn open_crop(&mut self) {
        if let Some(image) = self.session.scene().image() {
            let (w, h) = image.bitmap.dimensions();
            self.crop_dialog = Some(CropRect::new(0, 0, w, h));
        }
    }

    fn save_sticker(&mut self) {
        let result = self
            .session
            .save_sticker(&mut self.collection)
            .map(|id| format!("Saved sticker {id}"));
        self.report(result);
    }

    fn export_current(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(export_file_name(now_millis()))
            .add_filter("PNG", &["png"])
            .save_file()
        else {
            return;
        };
        let result = self
            .session
            .export_png()
            .and_then(|png| Ok(std::fs::write(&path, png)?))
            .map(|_| format!("Exported: {}", path.display()));
        self.report(result);
    }

    fn export_all(&mut self) {
        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return;
        };
        let result = self
            .collection
            .export_all(&dir)
            .map(|written| format!("Exported {} stickers to {}", written.len(), dir.display()));
        self.report(result);
    }

    fn edit_sticker(&mut self, id: u64) {
        let result = self
            .collection
            .get(id)
            .cloned()
            .and_then(|record| self.session.edit_sticker(&record))
            .map(|_| String::from("Sticker loaded (texts and effects are part of the image)"));
        self.background_choice = BackgroundChoice::Transparent;
        self.report(result);
    }

    fn reset(&mut self) {
        self.session.reset();
        self.background_choice = BackgroundChoice::Transparent;
        self.text_input.clear();
        self.report(Ok(String::from("Reset")));
    }

    fn apply_background(&mut self) {
        self.session.scene_mut().background = match self.background_choice {
            BackgroundChoice::Transparent => Background::Transparent,
            BackgroundChoice::White => Background::Solid(Color::WHITE),
            BackgroundChoice::Custom => {
                let [r, g, b] = self.background_color;
                Background::Solid(Color::rgb(r, g, b))
            }
        };
        self.canvas.invalidate();
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open Image").clicked() {
                self.open_image();
            }

            ui.separator();

            let has_image = self.session.scene().image().is_some();
            if ui
                .add_enabled(has_image, egui::Button::new("Crop"))
                .clicked()
            {
                self.open_crop();
            }
            if ui
                .add_enabled(has_image, egui::Button::new("Auto Cutout"))
                .clicked()
            {
                self.auto_cutout();
            }
            ui.checkbox(&mut self.border_on_cutout, "Add border");
            if ui
                .add_enabled(has_image, egui::Button::new("Border"))
                .clicked()
            {
                let result = self
                    .session
                    .add_border()
                    .map(|_| String::from("Border added"));
                self.report(result);
            }
            if ui
                .add_enabled(has_image, egui::Button::new("Freehand"))
                .clicked()
            {
                self.open_freehand();
            }

            ui.separator();

            if ui.button("Save to Collection").clicked() {
                self.save_sticker();
            }
            if ui.button("Export PNG").clicked() {
                self.export_current();
            }
            if ui.button("Reset").clicked() {
                self.reset();
            }

            ui.separator();
            ui.add(egui::Slider::new(&mut self.canvas.zoom, 0.5..=3.0).text("Zoom"));
        });
    }

    fn render_side_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Text");
        let response = ui.text_edit_singleline(&mut self.text_input);
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            let content = std::mem::take(&mut self.text_input);
            for action in self.session.handle_event(InputEvent::KeyCommit(content)) {
                if let Action::Rejected(message) = action {
                    self.status_message = message;
                }
            }
            self.canvas.invalidate();
        }
        ui.horizontal(|ui| {
            ui.label("Color");
            if ui.color_edit_button_srgb(&mut self.text_color).changed() {
                let [r, g, b] = self.text_color;
                let color = Color::rgb(r, g, b);
                self.session.text_style_mut().color = color;
                self.session.scene_mut().set_text_color(color);
                self.canvas.invalidate();
            }
            if ui.checkbox(&mut self.bold, "Bold").changed() {
                let weight = if self.bold {
                    FontWeight::Bold
                } else {
                    FontWeight::Normal
                };
                self.session.text_style_mut().weight = weight;
                self.session.scene_mut().set_text_weight(weight);
                self.canvas.invalidate();
            }
        });

        ui.separator();
        ui.heading("Adjust");
        let selection = self.session.scene().selection();
        let (range, suffix) = match selection.map(|s| s.kind) {
            Some(LayerKind::Text) => (TEXT_SIZE_RANGE, "px"),
            Some(LayerKind::Effect) => (EFFECT_SIZE_RANGE, "px"),
            _ => (IMAGE_SCALE_PERCENT_RANGE, "%"),
        };
        let mut size = self.session.scene().size_value();
        if ui
            .add(egui::Slider::new(&mut size, range.0..=range.1).suffix(suffix).text("Size"))
            .changed()
        {
            self.session.scene_mut().set_size(size);
            self.canvas.invalidate();
        }
        let mut rotation = self.session.scene().rotation_value();
        if ui
            .add(egui::Slider::new(&mut rotation, 0.0..=359.0).suffix("°").text("Rotation"))
            .changed()
        {
            self.session.scene_mut().set_rotation(rotation);
            self.canvas.invalidate();
        }

        ui.separator();
        ui.heading("Effects");
        egui::Grid::new("effects_grid").show(ui, |ui| {
            for (i, symbol) in EffectSymbol::ALL.into_iter().enumerate() {
                if ui
                    .button(symbol.glyph())
                    .on_hover_text(symbol.name())
                    .clicked()
                {
                    self.session.scene_mut().add_effect(symbol);
                    self.canvas.invalidate();
                }
                if i % 6 == 5 {
                    ui.end_row();
                }
            }
        });

        ui.separator();
        ui.heading("Background");
        ui.horizontal(|ui| {
            let before = self.background_choice;
            ui.radio_value(
                &mut self.background_choice,
                BackgroundChoice::Transparent,
                "None",
            );
            ui.radio_value(&mut self.background_choice, BackgroundChoice::White, "White");
            ui.radio_value(&mut self.background_choice, BackgroundChoice::Custom, "Color");
            let color_changed = ui.color_edit_button_srgb(&mut self.background_color).changed();
            if before != self.background_choice
                || (color_changed && self.background_choice == BackgroundChoice::Custom)
            {
                self.apply_background();
            }
        });

        ui.separator();
        self.render_collection(ui);
    }

    fn render_collection(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(format!(
                "Collection ({}/{})",
                self.collection.len(),
                self.collection.capacity()
            ));
        });
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.collection.is_empty(), egui::Button::new("Export All"))
                .clicked()
            {
                self.export_all();
            }
            if ui
                .add_enabled(!self.collection.is_empty(), egui::Button::new("Clear All"))
                .clicked()
            {
                self.pending_clear = true;
            }
        });

        let mut edit = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("sticker_grid").show(ui, |ui| {
                let records: Vec<(u64, Vec<u8>)> = self
                    .collection
                    .records()
                    .iter()
                    .map(|r| (r.id, r.png.clone()))
                    .collect();
                for (i, (id, png)) in records.into_iter().enumerate() {
                    ui.vertical(|ui| {
                        if let Some(texture) = self.thumbnail(ui.ctx(), id, &png) {
                            ui.add(egui::Image::new(&texture).max_size(egui::vec2(74.0, 64.0)));
                        }
                        ui.horizontal(|ui| {
                            if ui.small_button("Edit").clicked() {
                                edit = Some(id);
                            }
                            if ui.small_button("Delete").clicked() {
                                self.pending_sticker_delete = Some(id);
                            }
                        });
                    });
                    if i % 3 == 2 {
                        ui.end_row();
                    }
                }
            });
        });
        if let Some(id) = edit {
            self.edit_sticker(id);
        }
    }

    fn thumbnail(
        &mut self,
        ctx: &egui::Context,
        id: u64,
        png: &[u8],
    ) -> Option<egui::TextureHandle> {
        if let Some(texture) = self.thumbnails.get(&id) {
            return Some(texture.clone());
        }
        let image = imaging::decode(png)
            .inspect_err(|e| tracing::warn!(id, error = %e, "unreadable sticker"))
            .ok()?;
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        let texture = ctx.load_texture(
            format!("sticker-{id}"),
            color_image,
            egui::TextureOptions::LINEAR,
        );
        self.thumbnails.insert(id, texture.clone());
        Some(texture)
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(target) = self.pending_delete {
            let mut answer = None;
            confirm_window(ctx, "Delete element", "Delete this element?", &mut answer);
            match answer {
                Some(true) => {
                    self.session.confirm_delete(target);
                    self.pending_delete = None;
                    self.canvas.invalidate();
                }
                Some(false) => self.pending_delete = None,
                None => {}
            }
        }

        if let Some(id) = self.pending_sticker_delete {
            let mut answer = None;
            confirm_window(ctx, "Delete sticker", "Delete this sticker?", &mut answer);
            match answer {
                Some(true) => {
                    self.pending_sticker_delete = None;
                    self.thumbnails.remove(&id);
                    let result = self
                        .collection
                        .remove(id)
                        .map(|_| format!("Deleted sticker {id}"));
                    self.report(result);
                }
                Some(false) => self.pending_sticker_delete = None,
                None => {}
            }
        }

        if self.pending_clear {
            let mut answer = None;
            let message = format!("Delete all {} stickers?", self.collection.len());
            confirm_window(ctx, "Clear collection", &message, &mut answer);
            match answer {
                Some(true) => {
                    self.pending_clear = false;
                    self.thumbnails.clear();
                    let result = self
                        .collection
                        .clear()
                        .map(|count| format!("Deleted {count} stickers"));
                    self.report(result);
                }
                Some(false) => self.pending_clear = false,
                None => {}
            }
        }

        if let Some(mut rect) = self.crop_dialog {
            let (max_w, max_h) = self
                .session
                .scene()
                .image()
                .map_or((0, 0), |image| image.bitmap.dimensions());
            let mut answer = None;
            egui::Window::new("Crop")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!("Image is {max_w} x {max_h}"));
                    egui::Grid::new("crop_grid").num_columns(2).show(ui, |ui| {
                        ui.label("X");
                        ui.add(egui::DragValue::new(&mut rect.x).range(0..=max_w.saturating_sub(1)));
                        ui.end_row();
                        ui.label("Y");
                        ui.add(egui::DragValue::new(&mut rect.y).range(0..=max_h.saturating_sub(1)));
                        ui.end_row();
                        ui.label("Width");
                        ui.add(egui::DragValue::new(&mut rect.width).range(1..=max_w));
                        ui.end_row();
                        ui.label("Height");
                        ui.add(egui::DragValue::new(&mut rect.height).range(1..=max_h));
                        ui.end_row();
                    });
                    ui.horizontal(|ui| {
                        if ui.button("Apply").clicked() {
                            answer = Some(true);
                        }
                        if ui.button("Cancel").clicked() {
                            answer = Some(false);
                        }
                    });
                });
            match answer {
                Some(true) => {
                    self.crop_dialog = None;
                    let result = self.session.apply_crop(rect).map(|_| {
                        format!(
                            "Cropped to {} x {} at ({}, {})",
                            rect.width, rect.height, rect.x, rect.y
                        )
                    });
                    self.report(result);
                }
                Some(false) => self.crop_dialog = None,
                None => self.crop_dialog = Some(rect),
            }
        }

        if self.session.freehand().is_some() {
            let mut apply = None;
            let mut close = false;
            egui::Window::new("Freehand")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    self.freehand_view.show(ui, &mut self.session);
                    ui.horizontal(|ui| {
                        if ui.button("Keep inside").clicked() {
                            apply = Some(MaskMode::Keep);
                        }
                        if ui.button("Erase inside").clicked() {
                            apply = Some(MaskMode::Remove);
                        }
                        if ui.button("Redraw").clicked()
                            && let Some(tool) = self.session.freehand_mut()
                        {
                            tool.reset();
                            self.freehand_view.invalidate();
                        }
                        if ui.button("Cancel").clicked() {
                            close = true;
                        }
                    });
                });
            if let Some(mode) = apply {
                let result = self
                    .session
                    .apply_freehand(mode)
                    .map(|_| String::from("Mask applied"));
                self.report(result);
            }
            if close {
                self.session.close_freehand();
            }
        }
    }
}

/// Fill gaps in `face` with egui's bundled text and emoji fonts, so text
/// still draws when neither a configured nor a system font was found.
fn with_bundled_fonts(mut face: Typeface) -> Typeface {
    let fonts = egui::FontDefinitions::default();
    let bytes = |name: &str| fonts.font_data.get(name).map(|data| data.font.to_vec());

    if !face.is_loaded()
        && let Some(data) = bytes("Ubuntu-Light")
    {
        match face.clone().with_font_bytes(data) {
            Ok(loaded) => {
                tracing::info!("using bundled text font");
                face = loaded;
            }
            Err(e) => tracing::warn!(error = %e, "bundled text font unusable"),
        }
    }
    if !face.has_emoji_font()
        && let Some(data) = bytes("NotoEmoji-Regular")
    {
        match face.clone().with_emoji_bytes(data) {
            Ok(loaded) => face = loaded,
            Err(e) => tracing::warn!(error = %e, "bundled emoji font unusable"),
        }
    }
    face
}

/// Yes/no modal. `answer` is set once the user picks.
fn confirm_window(ctx: &egui::Context, title: &str, message: &str, answer: &mut Option<bool>) {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(message);
            ui.horizontal(|ui| {
                if ui.button("Delete").clicked() {
                    *answer = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    *answer = Some(false);
                }
            });
        });
}

impl eframe::App for StickerEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Escape) {
                self.session.scene_mut().clear_selection();
                self.canvas.invalidate();
            }
        });

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status_message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!(
                        "Texts: {} | Effects: {}",
                        self.session.scene().texts().len(),
                        self.session.scene().effects().len()
                    ));
                });
            });
        });

        egui::SidePanel::right("controls_panel")
            .default_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_side_panel(ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let modal_open = self.pending_delete.is_some()
                || self.pending_sticker_delete.is_some()
                || self.pending_clear
                || self.crop_dialog.is_some()
                || self.session.freehand().is_some();
            ui.vertical_centered(|ui| {
                for action in self.canvas.show(ui, &mut self.session, !modal_open) {
                    match action {
                        Action::ConfirmDelete(target) => self.pending_delete = Some(target),
                        Action::Rejected(message) => self.status_message = message,
                        Action::RenderNeeded | Action::SetCursor(_) => {}
                    }
                }
            });
        });

        self.render_dialogs(ctx);
    }
}
