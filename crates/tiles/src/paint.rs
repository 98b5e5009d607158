//! Toolkit-neutral paint list produced by tiles.
//!
//! A front end walks the ops in order and maps each glyph to its own pixmap.

use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Folder,
    Playlist,
    Play,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

/// Translucent green used for the dwell indicator.
pub const PROGRESS_FILL: Rgba = Rgba(0, 255, 0, 120);

#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    /// Frame around the whole tile.
    Frame { rect: Rect, highlighted: bool },
    Glyph { glyph: Glyph, rect: Rect },
    FillRect { rect: Rect, color: Rgba },
    Label { text: String, rect: Rect },
}
