//! Shared numeric constants for the sticker canvas and its tools.

// ── Canvas ──────────────────────────────────────────────────────

/// Logical sticker width.
pub const CANVAS_WIDTH: u32 = 370;

/// Logical sticker height.
pub const CANVAS_HEIGHT: u32 = 320;

// ── Hit-testing ─────────────────────────────────────────────────

/// Padding around a text layer's measured box.
pub const TEXT_HIT_PADDING: f32 = 10.0;

/// Margin around an effect glyph's square box.
pub const EFFECT_HIT_MARGIN: f32 = 5.0;

// ── Layers ──────────────────────────────────────────────────────

pub const DEFAULT_FONT_SIZE: f32 = 40.0;
pub const DEFAULT_EFFECT_SIZE: f32 = 40.0;

/// Text added while an image is present sits this far above the bottom edge.
pub const TEXT_BOTTOM_OFFSET: f32 = 40.0;

/// Width of the white legibility stroke drawn under text.
pub const TEXT_STROKE_WIDTH: f32 = 18.0;

/// Random effect placement keeps this distance from every edge.
pub const EFFECT_EDGE_INSET: f32 = 30.0;

pub const TEXT_SIZE_RANGE: (f32, f32) = (10.0, 100.0);
pub const EFFECT_SIZE_RANGE: (f32, f32) = (10.0, 200.0);
/// Image scale range, in percent.
pub const IMAGE_SCALE_PERCENT_RANGE: (f32, f32) = (10.0, 200.0);

/// Smallest scale a transform may carry.
pub const MIN_SCALE: f32 = 1e-3;

// ── Selection outline ───────────────────────────────────────────

pub const SELECTION_COLOR: [u8; 3] = [0x63, 0x66, 0xF1];
pub const SELECTION_LINE_WIDTH: f32 = 2.0;
pub const SELECTION_DASH: [f32; 2] = [5.0, 5.0];

// ── Image tools ─────────────────────────────────────────────────

/// Per-channel tolerance of the background flood fill.
pub const CUTOUT_TOLERANCE: u8 = 50;

/// Silhouette border thickness.
pub const BORDER_THICKNESS: u32 = 8;

/// Angular stamps used to dilate the silhouette.
pub const BORDER_SAMPLES: u32 = 16;

/// A freehand polygon needs at least this many points.
pub const MIN_POLYGON_POINTS: usize = 3;

// ── Collection ──────────────────────────────────────────────────

/// Maximum number of saved stickers.
pub const MAX_STICKERS: usize = 40;
