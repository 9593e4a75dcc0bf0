//! One editing session: the scene, the interaction controller, the open
//! freehand tool and the renderer, plus the image operations that tie them
//! together.
//!
//! Both front-ends drive a [`Session`]; it is the only place where a tool's
//! output is written back into the scene.

use image::RgbaImage;
use tiny_skia::Pixmap;

use crate::config::StudioConfig;
use crate::error::{Result, StickerError};
use crate::imaging::{
    self, BorderOptions, CropRect, CutoutOptions, FreehandTool, MaskMode, add_border,
    remove_background,
};
use crate::input::{Action, InputEvent, InteractionController};
use crate::render::Renderer;
use crate::scene::{ImageLayer, LayerId, LayerRef, Refit, Scene, TextStyle};
use crate::store::{StickerCollection, StickerRecord, StickerStore};
use crate::text::Typeface;

#[derive(Debug, Clone, Default)]
pub struct Session {
    scene: Scene,
    controller: InteractionController,
    renderer: Renderer,
    freehand: Option<FreehandTool>,
    cutout: CutoutOptions,
    border: BorderOptions,
}

impl Session {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            ..Self::default()
        }
    }

    /// Build a session from settings, loading the configured font if any.
    pub fn from_config(config: &StudioConfig) -> Result<Self> {
        let typeface = Typeface::load_or_fallback(config.font_path.as_deref());
        Ok(Self::new(Renderer::new(typeface)).with_options(
            config.cutout_options(),
            config.border_options()?,
        ))
    }

    pub fn with_options(mut self, cutout: CutoutOptions, border: BorderOptions) -> Self {
        self.cutout = cutout;
        self.border = border;
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn typeface(&self) -> &Typeface {
        self.renderer.typeface()
    }

    pub fn set_typeface(&mut self, typeface: Typeface) {
        self.renderer = Renderer::new(typeface);
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Style applied to the next committed text.
    pub fn text_style_mut(&mut self) -> &mut TextStyle {
        &mut self.controller.text_style
    }

    fn image(&self) -> Result<&ImageLayer> {
        self.scene.image().ok_or(StickerError::NoImage)
    }

    // --- Upload & image tools ---

    /// Decode an upload and install it as the image layer, fit to the canvas.
    /// On a decode failure the scene is unchanged.
    pub fn upload(&mut self, bytes: &[u8]) -> Result<LayerId> {
        let bitmap = imaging::decode(bytes)?;
        Ok(self.upload_image(bitmap))
    }

    pub fn upload_image(&mut self, bitmap: RgbaImage) -> LayerId {
        tracing::info!(width = bitmap.width(), height = bitmap.height(), "image uploaded");
        self.controller.cancel();
        self.freehand = None;
        self.scene.set_image(bitmap)
    }

    /// Replace the image with a rectangle of itself; the transform is reset.
    pub fn apply_crop(&mut self, rect: CropRect) -> Result<()> {
        let cropped = imaging::crop(&self.image()?.bitmap, rect)?;
        self.scene.replace_image(cropped, Refit::Full)
    }

    /// Flood-fill the background away, optionally adding the border.
    /// Returns the number of pixels cleared.
    pub fn auto_cutout(&mut self, with_border: bool) -> Result<usize> {
        let mut bitmap = self.image()?.bitmap.clone();
        let cleared = remove_background(&mut bitmap, &self.cutout)?;
        if with_border {
            let bordered = add_border(&bitmap, &self.border)?;
            self.scene.replace_image(bordered, Refit::Full)?;
        } else {
            self.scene.replace_image(bitmap, Refit::ScaleOnly)?;
        }
        Ok(cleared)
    }

    pub fn add_border(&mut self) -> Result<()> {
        let bordered = add_border(&self.image()?.bitmap, &self.border)?;
        self.scene.replace_image(bordered, Refit::Full)
    }

    // --- Freehand ---

    /// Open the freehand tool for the current image in a viewport of the
    /// given size.
    pub fn open_freehand(&mut self, max_width: f32, max_height: f32) -> Result<&mut FreehandTool> {
        let tool = FreehandTool::open(&self.image()?.bitmap, max_width, max_height)?;
        Ok(self.freehand.insert(tool))
    }

    pub fn freehand(&self) -> Option<&FreehandTool> {
        self.freehand.as_ref()
    }

    pub fn freehand_mut(&mut self) -> Option<&mut FreehandTool> {
        self.freehand.as_mut()
    }

    pub fn close_freehand(&mut self) {
        self.freehand = None;
    }

    pub fn freehand_preview(&self) -> Result<Option<RgbaImage>> {
        match (&self.freehand, self.scene.image()) {
            (Some(tool), Some(image)) => tool.preview(&image.bitmap).map(Some),
            _ => Ok(None),
        }
    }

    /// Apply the open tool's polygon and close it. On a validation failure
    /// the tool stays open and the image is untouched.
    pub fn apply_freehand(&mut self, mode: MaskMode) -> Result<()> {
        let tool = self
            .freehand
            .as_ref()
            .ok_or_else(|| StickerError::validation("freehand tool is not open"))?;
        let masked = tool.apply(&self.image()?.bitmap, mode)?;
        self.scene.replace_image(masked, Refit::Keep)?;
        self.freehand = None;
        Ok(())
    }

    // --- Interaction ---

    pub fn handle_event(&mut self, event: InputEvent) -> Vec<Action> {
        self.controller
            .handle(&mut self.scene, self.renderer.typeface(), event)
    }

    /// Carry out a deletion the user confirmed.
    pub fn confirm_delete(&mut self, target: LayerRef) -> bool {
        self.controller.cancel();
        self.scene.remove(target)
    }

    // --- Output ---

    pub fn render(&self) -> Result<Pixmap> {
        self.renderer.render(&self.scene)
    }

    pub fn flatten(&self) -> Result<RgbaImage> {
        self.renderer.flatten(&self.scene)
    }

    /// Flatten the scene to PNG bytes.
    pub fn export_png(&self) -> Result<Vec<u8>> {
        if !self.scene.has_content() {
            return Err(StickerError::validation("nothing to export"));
        }
        imaging::encode_png(&self.flatten()?)
    }

    /// Flatten and append to `collection`. Returns the new sticker id.
    pub fn save_sticker<S: StickerStore>(
        &self,
        collection: &mut StickerCollection<S>,
    ) -> Result<u64> {
        if !self.scene.has_content() {
            return Err(StickerError::validation("nothing to save"));
        }
        if collection.is_full() {
            return Err(StickerError::Capacity {
                max: collection.capacity(),
            });
        }
        let png = self.export_png()?;
        Ok(collection.add(png)?.id)
    }

    /// Load a saved sticker back as the only layer.
    pub fn edit_sticker(&mut self, record: &StickerRecord) -> Result<LayerId> {
        let bitmap = imaging::decode(&record.png)?;
        self.controller.cancel();
        self.freehand = None;
        tracing::info!(id = record.id, "sticker loaded for editing");
        Ok(self.scene.load_flattened(bitmap))
    }

    pub fn reset(&mut self) {
        self.scene.reset();
        self.controller.cancel();
        self.freehand = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::scene::EffectSymbol;
    use crate::store::MemoryStore;
    use image::Rgba;

    fn png(w: u32, h: u32, color: Rgba<u8>) -> Vec<u8> {
        imaging::encode_png(&RgbaImage::from_pixel(w, h, color)).unwrap()
    }

    #[test]
    fn test_tools_need_an_image() {
        let mut s = Session::default();
        assert!(matches!(s.auto_cutout(false), Err(StickerError::NoImage)));
        assert!(matches!(s.add_border(), Err(StickerError::NoImage)));
        assert!(matches!(
            s.apply_crop(CropRect::new(0, 0, 1, 1)),
            Err(StickerError::NoImage)
        ));
        assert!(s.open_freehand(100.0, 100.0).is_err());
    }

    #[test]
    fn test_bad_upload_leaves_scene() {
        let mut s = Session::default();
        s.upload(&png(10, 10, Rgba([1, 2, 3, 255]))).unwrap();
        let before = s.scene().image().unwrap().id;
        assert!(matches!(s.upload(b"junk"), Err(StickerError::Decode(_))));
        assert_eq!(s.scene().image().unwrap().id, before);
    }

    #[test]
    fn test_cutout_without_border_keeps_position() {
        let mut s = Session::default();
        s.upload(&png(37, 32, Rgba([255, 255, 255, 255]))).unwrap();
        s.scene_mut().set_rotation(20.0);
        let cleared = s.auto_cutout(false).unwrap();
        assert_eq!(cleared, 37 * 32);
        let t = s.scene().image().unwrap().transform;
        assert_eq!(t.rotation(), 20.0);
        assert_eq!(t.scale(), 10.0);
    }

    #[test]
    fn test_typeface_swap_changes_text_metrics() {
        let mut s = Session::default();
        s.handle_event(InputEvent::KeyCommit("Hello".into()));
        let estimated = s.flatten().unwrap();
        assert!(!s.typeface().is_loaded());

        s.set_typeface(crate::text::bundled_face());
        assert!(s.typeface().is_loaded());
        assert_eq!(s.scene().texts().len(), 1);
        let loaded = s.flatten().unwrap();
        assert!(loaded.pixels().any(|p| p[3] != 0));
        assert_ne!(estimated, loaded);
    }

    #[test]
    fn test_crop_resets_transform() {
        let mut s = Session::default();
        s.upload(&png(100, 100, Rgba([9, 9, 9, 255]))).unwrap();
        s.scene_mut().set_rotation(45.0);
        s.apply_crop(CropRect::new(0, 0, 37, 32)).unwrap();
        let image = s.scene().image().unwrap();
        assert_eq!(image.bitmap.dimensions(), (37, 32));
        assert_eq!(image.transform.rotation(), 0.0);
        assert_eq!(image.transform.scale(), 10.0);
    }

    #[test]
    fn test_freehand_apply_keeps_transform_and_closes() {
        let mut s = Session::default();
        s.upload(&png(20, 20, Rgba([0, 0, 255, 255]))).unwrap();
        s.scene_mut().set_rotation(90.0);

        let tool = s.open_freehand(20.0, 20.0).unwrap();
        tool.pointer_down(Point::new(1.0, 1.0));
        tool.pointer_move(Point::new(2.0, 2.0));
        tool.pointer_up();
        assert!(matches!(
            s.apply_freehand(MaskMode::Keep),
            Err(StickerError::Validation(_))
        ));
        assert!(s.freehand().is_some());

        let tool = s.freehand_mut().unwrap();
        tool.set_points(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 20.0),
            Point::new(0.0, 20.0),
        ]);
        s.apply_freehand(MaskMode::Remove).unwrap();
        assert!(s.freehand().is_none());
        let image = s.scene().image().unwrap();
        assert_eq!(image.bitmap.get_pixel(5, 10)[3], 0);
        assert_eq!(image.bitmap.get_pixel(15, 10)[3], 255);
        assert_eq!(image.transform.rotation(), 90.0);
    }

    #[test]
    fn test_save_requires_content() {
        let s = Session::default();
        let mut c = StickerCollection::open(MemoryStore::default());
        assert!(matches!(
            s.save_sticker(&mut c),
            Err(StickerError::Validation(_))
        ));
        assert!(c.is_empty());
    }

    #[test]
    fn test_save_then_edit_collapses_layers() {
        let mut s = Session::default();
        s.scene_mut()
            .add_effect_at(EffectSymbol::Heart, Point::new(100.0, 100.0));
        let mut c = StickerCollection::open(MemoryStore::default());
        let id = s.save_sticker(&mut c).unwrap();

        let record = c.get(id).unwrap().clone();
        let flat = imaging::decode(&record.png).unwrap();
        assert_eq!(flat.dimensions(), (370, 320));

        s.edit_sticker(&record).unwrap();
        assert!(s.scene().effects().is_empty());
        assert_eq!(s.scene().image().unwrap().transform.scale(), 1.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut s = Session::default();
        s.upload(&png(10, 10, Rgba([1, 1, 1, 255]))).unwrap();
        s.open_freehand(50.0, 50.0).unwrap();
        s.handle_event(InputEvent::KeyCommit("hi".into()));
        s.reset();
        assert!(!s.scene().has_content());
        assert!(s.freehand().is_none());
        assert!(!s.controller().is_dragging());
    }
}
