//! Scene graph of playable tiles.
//!
//! A [`Scene`] owns [`Tile`]s. A [`NestedTile`] owns a scene of its own, so a
//! canvas is a tree of scenes that is persisted as nested JSON objects, each
//! tile written as `{ "type": <tag>, "data": <fields> }`.

pub mod base;
pub mod dwell;
pub mod geometry;
pub mod json;
pub mod nested;
pub mod paint;
pub mod playlist;
pub mod scene;
pub mod tile;

pub use base::{MenuEntry, TileAction, TileBase, TileMode};
pub use dwell::{Dwell, ENTER_DELAY, NO_PROGRESS};
pub use geometry::{Point, Rect, Size};
pub use json::{ImportError, JsonObject};
pub use nested::NestedTile;
pub use paint::{Glyph, PaintOp, Rgba};
pub use playlist::{PlaylistEntry, PlaylistTile};
pub use scene::{ParsedScene, Scene, TileId};
pub use tile::{DropData, NESTED_TILE_TAG, PLAYLIST_TILE_TAG, Tile, TileEvent, TileKind};

pub use companion_catalog::{SharedCatalog, SoundFileCatalog, SoundFileRecord};
