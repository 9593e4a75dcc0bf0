//! # sticker-studio
//!
//! A Rust library for composing chat-app stickers on a fixed 370 × 320 canvas.
//!
//! ## Features
//!
//! - **Scene editing**: one photo plus text labels and emoji-style effect marks,
//!   each with its own position, size and rotation
//! - **Background removal**: scanline flood fill from the top-left corner
//! - **Silhouette border**: a white outline that hugs the subject
//! - **Freehand mask**: keep or erase a hand-drawn polygon
//! - **Collection**: up to 40 flattened PNG stickers persisted as JSON
//!
//! ## Example - Cutout with border
//!
//! ```rust,ignore
//! use sticker_studio::Session;
//!
//! let mut session = Session::default();
//! session.upload(&std::fs::read("photo.png").unwrap()).unwrap();
//! session.auto_cutout(true).unwrap();
//! std::fs::write("sticker.png", session.export_png().unwrap()).unwrap();
//! ```
//!
//! ## Example - Driving the canvas
//!
//! ```rust,ignore
//! use sticker_studio::{InputEvent, Point, Session};
//!
//! let mut session = Session::default();
//! session.handle_event(InputEvent::KeyCommit("Thanks!".into()));
//! session.handle_event(InputEvent::PointerDown(Point::new(185.0, 160.0)));
//! session.handle_event(InputEvent::PointerMove(Point::new(185.0, 120.0)));
//! session.handle_event(InputEvent::PointerUp);
//! ```

pub mod config;
pub mod consts;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod imaging;
pub mod input;
pub mod render;
pub mod scene;
pub mod session;
pub mod store;
pub mod text;

// Re-export commonly used items
pub use config::StudioConfig;
pub use error::{Result, StickerError};
pub use geometry::{Point, Transform};
pub use imaging::{CropRect, MaskMode};
pub use input::{Action, Cursor, InputEvent, InteractionController};
pub use render::Renderer;
pub use scene::{
    Background, Color, EffectSymbol, LayerId, LayerKind, LayerRef, Scene, TextStyle,
};
pub use session::Session;
pub use store::{JsonFileStore, MemoryStore, StickerCollection, StickerRecord, StickerStore};
pub use text::{FontWeight, Typeface};
