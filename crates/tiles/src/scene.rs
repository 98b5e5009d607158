use companion_catalog::SharedCatalog;
use indexmap::IndexMap;
use serde_json::Value;

use crate::base::TileMode;
use crate::geometry::{Point, Rect};
use crate::json::{self, ImportError, JsonObject};
use crate::tile::{Tile, TileKind};

/// Default bounds of a fresh scene.
pub const DEFAULT_SCENE_RECT: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 100.0,
    height: 100.0,
};

/// Identifies a tile within one scene. Ids are never reused by that scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u64);

/// Owns a set of tiles. Iteration follows insertion order, which is also
/// the order tiles are written out in.
#[derive(Debug, Clone)]
pub struct Scene {
    rect: Rect,
    tiles: IndexMap<TileId, Tile>,
    next_id: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Fully imported scene contents, not yet attached to a scene.
#[derive(Debug)]
pub struct ParsedScene {
    pub rect: Rect,
    pub tiles: Vec<Tile>,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_rect(DEFAULT_SCENE_RECT)
    }

    pub fn with_rect(rect: Rect) -> Self {
        Self {
            rect,
            tiles: IndexMap::new(),
            next_id: 1,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn add(&mut self, tile: impl Into<Tile>) -> TileId {
        let id = TileId(self.next_id);
        self.next_id += 1;
        self.tiles.insert(id, tile.into());
        id
    }

    /// Delete a tile, giving it the chance to release its resources first.
    pub fn remove(&mut self, id: TileId) -> bool {
        match self.tiles.shift_remove(&id) {
            Some(mut tile) => {
                tile.on_delete();
                true
            }
            None => false,
        }
    }

    /// Detach a tile without deleting it, e.g. to move it to another scene.
    pub fn take(&mut self, id: TileId) -> Option<Tile> {
        self.tiles.shift_remove(&id)
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub fn get_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(&id)
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn ids(&self) -> Vec<TileId> {
        self.tiles.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.tiles.iter().map(|(id, tile)| (*id, tile))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (TileId, &mut Tile)> {
        self.tiles.iter_mut().map(|(id, tile)| (*id, tile))
    }

    /// Delete every tile. Each one gets `on_delete` before the scene lets go.
    pub fn clear_tiles(&mut self) {
        for tile in self.tiles.values_mut() {
            tile.on_delete();
        }
        self.tiles.clear();
    }

    /// Topmost tile whose shape contains `p` (scene coordinates).
    pub fn tile_at(&self, p: Point) -> Option<TileId> {
        self.tiles.iter().rev().find_map(|(id, tile)| {
            let geometry = tile.base().geometry();
            let local = Point::new(p.x - geometry.x, p.y - geometry.y);
            tile.shape().contains(local).then_some(*id)
        })
    }

    pub fn set_mode(&mut self, mode: TileMode) {
        for tile in self.tiles.values_mut() {
            tile.set_mode(mode);
        }
    }

    /// Number of tiles in this scene and all nested scenes.
    pub fn total_tiles(&self) -> usize {
        self.tiles
            .values()
            .map(|t| 1 + t.as_nested().map_or(0, |n| n.scene().total_tiles()))
            .sum()
    }

    pub fn to_json_object(&self) -> JsonObject {
        let tiles: Vec<Value> = self
            .tiles
            .values()
            .map(|tile| {
                let mut entry = JsonObject::new();
                entry.insert("type".into(), tile.kind().tag().into());
                entry.insert("data".into(), tile.to_json_object().into());
                Value::Object(entry)
            })
            .collect();

        let mut obj = JsonObject::new();
        obj.insert("scene_rect".into(), json::rect_to_json(&self.rect).into());
        obj.insert("tiles".into(), Value::Array(tiles));
        obj
    }

    /// Build the tiles described by `obj` without attaching them anywhere.
    ///
    /// Entries that are not `{type, data}` objects, or whose type is not a
    /// known tile kind, are skipped. The first child that fails to import
    /// fails the whole scene.
    pub fn parse(obj: &JsonObject, catalog: &SharedCatalog) -> Result<ParsedScene, ImportError> {
        let rect = json::rect_from_json(json::object(obj, "scene_rect")?)?;
        let entries = json::array(obj, "tiles")?;

        let mut tiles = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let Some((tag, data)) = tile_entry(entry) else {
                log::debug!("Skipping malformed tile entry #{index}");
                continue;
            };
            let Some(kind) = TileKind::from_tag(tag) else {
                log::debug!("Skipping tile entry #{index} of unknown type '{tag}'");
                continue;
            };

            let mut tile = kind.construct(catalog);
            tile.base_mut().set_movable(true);
            tile.init();
            if let Err(e) = tile.set_from_json_object(data) {
                log::warn!("Could not set tile data from JSON ({e}), aborting. data: {data:?}");
                return Err(ImportError::Child {
                    index,
                    tag: tag.to_string(),
                    source: Box::new(e),
                });
            }
            tiles.push(tile);
        }

        Ok(ParsedScene { rect, tiles })
    }

    /// Swap in imported contents, deleting the current tiles.
    pub fn replace(&mut self, parsed: ParsedScene) {
        self.clear_tiles();
        self.rect = parsed.rect;
        for tile in parsed.tiles {
            self.add(tile);
        }
    }

    /// Parse and, only if every tile imported, replace this scene's contents.
    pub fn set_from_json_object(
        &mut self,
        obj: &JsonObject,
        catalog: &SharedCatalog,
    ) -> Result<(), ImportError> {
        let parsed = Self::parse(obj, catalog)?;
        self.replace(parsed);
        Ok(())
    }
}

fn tile_entry(entry: &Value) -> Option<(&str, &JsonObject)> {
    let obj = entry.as_object()?;
    let tag = obj.get("type")?.as_str()?;
    let data = obj.get("data")?.as_object()?;
    Some((tag, data))
}
