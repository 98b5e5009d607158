//! The closed set of tile variants and the tag table used to persist them.

use std::time::Duration;

use companion_catalog::{SharedCatalog, SoundFileRecord};

use crate::base::{MenuEntry, TileBase, TileMode};
use crate::geometry::Rect;
use crate::json::{ImportError, JsonObject};
use crate::nested::NestedTile;
use crate::paint::PaintOp;
use crate::playlist::PlaylistTile;
use crate::scene::TileId;

/// Persisted type tag of [`PlaylistTile`].
pub const PLAYLIST_TILE_TAG: &str = "Tile::PlaylistTile";
/// Persisted type tag of [`NestedTile`].
pub const NESTED_TILE_TAG: &str = "Tile::NestedTile";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Playlist,
    Nested,
}

const TILE_KINDS: [(&str, TileKind); 2] = [
    (PLAYLIST_TILE_TAG, TileKind::Playlist),
    (NESTED_TILE_TAG, TileKind::Nested),
];

impl TileKind {
    /// Resolve a persisted tag. Unknown tags yield `None` and are skipped by
    /// readers.
    pub fn from_tag(tag: &str) -> Option<Self> {
        TILE_KINDS
            .iter()
            .find(|(known, _)| *known == tag)
            .map(|(_, kind)| *kind)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            TileKind::Playlist => PLAYLIST_TILE_TAG,
            TileKind::Nested => NESTED_TILE_TAG,
        }
    }

    /// Construct an empty tile of this kind, bound to `catalog`.
    pub fn construct(&self, catalog: &SharedCatalog) -> Tile {
        match self {
            TileKind::Playlist => {
                let mut tile = PlaylistTile::new();
                tile.set_sound_file_model(catalog.clone());
                Tile::Playlist(tile)
            }
            TileKind::Nested => Tile::Nested(NestedTile::new(catalog.clone())),
        }
    }
}

/// Something a tile wants the host to know or do.
#[derive(Debug, Clone, PartialEq)]
pub enum TileEvent {
    /// A nested tile asks to be entered.
    EnterContents { name: String },
    /// The front end should ask the user for a new name.
    ConfigureRequested { name: String },
    Activated { name: String, activated: bool },
    /// The host's active scene changed; `depth` 0 is the root.
    SceneChanged { depth: usize },
}

/// Payload of a drop onto a tile.
#[derive(Debug, Clone, PartialEq)]
pub enum DropData {
    SoundFiles(Vec<SoundFileRecord>),
    /// Tiles of the same scene being dragged onto the target.
    Tiles(Vec<TileId>),
}

#[derive(Debug, Clone)]
pub enum Tile {
    Playlist(PlaylistTile),
    Nested(NestedTile),
}

impl Tile {
    pub fn kind(&self) -> TileKind {
        match self {
            Tile::Playlist(_) => TileKind::Playlist,
            Tile::Nested(_) => TileKind::Nested,
        }
    }

    pub fn base(&self) -> &TileBase {
        match self {
            Tile::Playlist(t) => t.base(),
            Tile::Nested(t) => t.base(),
        }
    }

    pub fn base_mut(&mut self) -> &mut TileBase {
        match self {
            Tile::Playlist(t) => t.base_mut(),
            Tile::Nested(t) => t.base_mut(),
        }
    }

    pub fn name(&self) -> &str {
        self.base().name()
    }

    pub fn is_activated(&self) -> bool {
        self.base().is_activated()
    }

    pub fn init(&mut self) {
        match self {
            Tile::Playlist(t) => t.init(),
            Tile::Nested(t) => t.init(),
        }
    }

    pub fn bounding_rect(&self) -> Rect {
        self.base().bounding_rect()
    }

    /// Hit-test region in local coordinates. Every tile is hit over its
    /// whole bounding rect.
    pub fn shape(&self) -> Rect {
        self.bounding_rect()
    }

    pub fn to_json_object(&self) -> JsonObject {
        match self {
            Tile::Playlist(t) => t.to_json_object(),
            Tile::Nested(t) => t.to_json_object(),
        }
    }

    /// Apply a persisted object. On `Err` the tile is left as it was.
    pub fn set_from_json_object(&mut self, obj: &JsonObject) -> Result<(), ImportError> {
        match self {
            Tile::Playlist(t) => t.set_from_json_object(obj),
            Tile::Nested(t) => t.set_from_json_object(obj),
        }
    }

    pub fn on_activate(&mut self, events: &mut Vec<TileEvent>) {
        match self {
            Tile::Playlist(t) => t.on_activate(events),
            Tile::Nested(t) => t.on_activate(events),
        }
    }

    /// Left click. Activates unless the tile is in move mode or Ctrl is held.
    pub fn on_click(&mut self, ctrl_held: bool, events: &mut Vec<TileEvent>) {
        if self.base().accepts_click(ctrl_held) {
            self.on_activate(events);
        }
    }

    pub fn on_delete(&mut self) {
        match self {
            Tile::Playlist(t) => t.on_delete(),
            Tile::Nested(t) => t.on_delete(),
        }
    }

    pub fn receive_external_data(&mut self, data: &DropData) {
        match self {
            Tile::Playlist(t) => t.receive_external_data(data),
            Tile::Nested(t) => t.receive_external_data(data),
        }
    }

    pub fn drag_enter(&mut self) {
        if let Tile::Nested(t) = self {
            t.drag_enter();
        }
    }

    pub fn drag_leave(&mut self) {
        if let Tile::Nested(t) = self {
            t.drag_leave();
        }
    }

    /// Advance pending dwell deadlines by `dt`.
    pub fn advance(&mut self, dt: Duration) -> Option<TileEvent> {
        match self {
            Tile::Playlist(_) => None,
            Tile::Nested(t) => t.advance(dt),
        }
    }

    pub fn context_menu(&self) -> Vec<MenuEntry> {
        match self {
            Tile::Playlist(t) => t.context_menu(),
            Tile::Nested(t) => t.context_menu(),
        }
    }

    pub fn paint(&self) -> Vec<PaintOp> {
        match self {
            Tile::Playlist(t) => t.paint(),
            Tile::Nested(t) => t.paint(),
        }
    }

    /// Set the interaction mode of this tile and everything nested in it.
    pub fn set_mode(&mut self, mode: TileMode) {
        self.base_mut().set_mode(mode);
        if let Tile::Nested(t) = self {
            t.scene_mut().set_mode(mode);
        }
    }

    pub fn as_playlist(&self) -> Option<&PlaylistTile> {
        match self {
            Tile::Playlist(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_playlist_mut(&mut self) -> Option<&mut PlaylistTile> {
        match self {
            Tile::Playlist(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_nested(&self) -> Option<&NestedTile> {
        match self {
            Tile::Nested(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_nested_mut(&mut self) -> Option<&mut NestedTile> {
        match self {
            Tile::Nested(t) => Some(t),
            _ => None,
        }
    }
}

impl From<PlaylistTile> for Tile {
    fn from(tile: PlaylistTile) -> Self {
        Tile::Playlist(tile)
    }
}

impl From<NestedTile> for Tile {
    fn from(tile: NestedTile) -> Self {
        Tile::Nested(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use companion_catalog::InMemoryCatalog;

    #[test]
    fn test_tags_resolve_to_kinds() {
        assert_eq!(TileKind::from_tag("Tile::PlaylistTile"), Some(TileKind::Playlist));
        assert_eq!(TileKind::from_tag("Tile::NestedTile"), Some(TileKind::Nested));
        assert_eq!(TileKind::from_tag("UnknownWidget"), None);
        assert_eq!(TileKind::from_tag("NestedTile"), None);
    }

    #[test]
    fn test_construct_matches_kind() {
        let catalog = InMemoryCatalog::new().into_shared();
        for (tag, kind) in TILE_KINDS {
            let tile = kind.construct(&catalog);
            assert_eq!(tile.kind(), kind);
            assert_eq!(tile.kind().tag(), tag);
        }
    }

    #[test]
    fn test_constructed_playlist_is_bound_to_catalog() {
        let catalog = InMemoryCatalog::new().into_shared();
        let tile = TileKind::Playlist.construct(&catalog);
        assert!(tile.as_playlist().expect("playlist").has_sound_file_model());
    }

    #[test]
    fn test_click_respects_mode() {
        let catalog = InMemoryCatalog::new().into_shared();
        let mut tile = TileKind::Playlist.construct(&catalog);
        let mut events = Vec::new();

        tile.set_mode(TileMode::Move);
        tile.on_click(false, &mut events);
        assert!(!tile.is_activated());

        tile.set_mode(TileMode::Default);
        tile.on_click(true, &mut events);
        assert!(!tile.is_activated());

        tile.on_click(false, &mut events);
        assert!(tile.is_activated());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_default_shape_is_bounding_rect() {
        let catalog = InMemoryCatalog::new().into_shared();
        let tile = TileKind::Nested.construct(&catalog);
        assert_eq!(tile.shape(), tile.bounding_rect());
    }
}
