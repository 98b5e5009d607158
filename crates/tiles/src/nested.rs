//! Container tile: a tile that owns a scene of further tiles.
//!
//! Persisted as the base tile fields plus
//!
//! ```json
//! "contents": { "scene": { "scene_rect": { "x": 0, "y": 0, "width": 100, "height": 100 },
//!                          "tiles": [ { "type": "Tile::PlaylistTile", "data": { ... } } ] } }
//! ```
//!
//! Children are rebuilt by a single recursive descent, so a nested tile can
//! never end up inside itself.

use std::time::Duration;

use companion_catalog::SharedCatalog;

use crate::base::{MenuEntry, TileAction, TileBase};
use crate::dwell::Dwell;
use crate::json::{self, ImportError, JsonObject};
use crate::paint::{Glyph, PROGRESS_FILL, PaintOp};
use crate::scene::{Scene, TileId};
use crate::tile::{DropData, Tile, TileEvent};

#[derive(Debug, Clone)]
pub struct NestedTile {
    base: TileBase,
    scene: Scene,
    dwell: Dwell,
    catalog: SharedCatalog,
}

impl NestedTile {
    pub fn new(catalog: SharedCatalog) -> Self {
        Self {
            base: TileBase::new("Nested"),
            scene: Scene::new(),
            dwell: Dwell::Idle,
            catalog,
        }
    }

    pub fn base(&self) -> &TileBase {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut TileBase {
        &mut self.base
    }

    pub fn init(&mut self) {
        self.base.init();
        self.dwell.cancel();
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn sound_file_model(&self) -> &SharedCatalog {
        &self.catalog
    }

    /// Dwell progress in `0.1..=100.0`, or `-1.0` when no drag is hovering.
    pub fn progress(&self) -> f64 {
        self.dwell.progress()
    }

    pub fn dwell(&self) -> Dwell {
        self.dwell
    }

    pub fn add_tiles(&mut self, tiles: impl IntoIterator<Item = Tile>) -> Vec<TileId> {
        tiles.into_iter().map(|t| self.scene.add(t)).collect()
    }

    /// Notify every child of its deletion, then empty the scene.
    pub fn clear_tiles(&mut self) {
        self.scene.clear_tiles();
    }

    pub fn drag_enter(&mut self) {
        self.dwell.start();
    }

    pub fn drag_leave(&mut self) {
        self.dwell.cancel();
    }

    /// Dropped data ends a pending dwell; the host moves any dropped tiles.
    pub fn receive_external_data(&mut self, _data: &DropData) {
        self.dwell.cancel();
    }

    /// Advance the dwell clock. Once the deadline passes the tile asks to be
    /// entered.
    pub fn advance(&mut self, dt: Duration) -> Option<TileEvent> {
        self.dwell.advance(dt).then(|| self.on_contents())
    }

    /// Request that the host show this tile's scene.
    pub fn on_contents(&mut self) -> TileEvent {
        self.dwell.cancel();
        TileEvent::EnterContents {
            name: self.base.name().to_string(),
        }
    }

    /// Activate every child, then toggle this tile.
    pub fn on_activate(&mut self, events: &mut Vec<TileEvent>) {
        for (_, child) in self.scene.iter_mut() {
            child.on_activate(events);
        }
        let activated = self.base.toggle_activated();
        events.push(TileEvent::Activated {
            name: self.base.name().to_string(),
            activated,
        });
    }

    pub fn on_delete(&mut self) {
        self.dwell.cancel();
        self.clear_tiles();
    }

    pub fn context_menu(&self) -> Vec<MenuEntry> {
        let mut menu = vec![
            MenuEntry::Action(TileAction::Contents),
            MenuEntry::Action(TileAction::Configure),
            MenuEntry::Separator,
        ];
        menu.extend(self.base.context_menu());
        menu
    }

    pub fn paint(&self) -> Vec<PaintOp> {
        let mut ops = vec![PaintOp::Frame {
            rect: self.base.bounding_rect(),
            highlighted: self.dwell.is_active(),
        }];
        let p_rect = self.base.paint_rect();
        if !p_rect.is_empty() {
            ops.push(PaintOp::Glyph {
                glyph: Glyph::Folder,
                rect: p_rect,
            });
            ops.push(PaintOp::Glyph {
                glyph: self.base.play_state_glyph(),
                rect: p_rect,
            });
        }
        let progress = self.progress();
        if progress > 0.0 && progress < 100.0 {
            ops.push(PaintOp::FillRect {
                rect: p_rect.scaled_about_center(progress / 100.0),
                color: PROGRESS_FILL,
            });
        }
        ops
    }

    pub fn to_json_object(&self) -> JsonObject {
        let mut obj = self.base.to_json_object();
        let mut contents = JsonObject::new();
        contents.insert("scene".into(), self.scene.to_json_object().into());
        obj.insert("contents".into(), contents.into());
        obj
    }

    /// Replace name, geometry and children from `obj`.
    ///
    /// All children are built before anything is swapped in: on `Err` the
    /// tile, its scene rect and its current children are untouched.
    pub fn set_from_json_object(&mut self, obj: &JsonObject) -> Result<(), ImportError> {
        let fields = TileBase::parse(obj)?;
        let contents = json::object(obj, "contents")?;
        let scene_obj = json::object(contents, "scene")?;
        let parsed = Scene::parse(scene_obj, &self.catalog)?;

        self.base.apply(fields);
        self.scene.replace(parsed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwell::{ENTER_DELAY, NO_PROGRESS};
    use crate::geometry::Rect;
    use crate::playlist::PlaylistTile;
    use companion_catalog::{InMemoryCatalog, SoundFileCatalog, SoundFileRecord};
    use serde_json::{Value, json};

    fn catalog() -> SharedCatalog {
        InMemoryCatalog::from_records([
            SoundFileRecord::new(1, "kick", "drums/kick.wav"),
            SoundFileRecord::new(2, "snare", "drums/snare.wav"),
        ])
        .into_shared()
    }

    fn playlist(name: &str, ids: &[i64]) -> Tile {
        let catalog = catalog();
        let mut tile = PlaylistTile::new();
        tile.base_mut().set_name(name);
        for id in ids {
            if let Some(record) = catalog.sound_file(*id) {
                tile.add_sound_file(record);
            }
        }
        tile.set_sound_file_model(catalog);
        Tile::Playlist(tile)
    }

    fn nested(name: &str, children: Vec<Tile>) -> NestedTile {
        let mut tile = NestedTile::new(catalog());
        tile.base_mut().set_name(name);
        tile.add_tiles(children);
        tile
    }

    fn as_object(v: Value) -> JsonObject {
        v.as_object().cloned().expect("object")
    }

    fn reimport(tile: &NestedTile) -> NestedTile {
        let mut restored = NestedTile::new(catalog());
        restored
            .set_from_json_object(&tile.to_json_object())
            .expect("reimport");
        restored
    }

    #[test]
    fn test_export_layout() {
        let mut tile = nested("Set", vec![playlist("A", &[1])]);
        tile.scene_mut().set_rect(Rect::new(0.0, 0.0, 640.0, 480.0));

        let obj = Value::Object(tile.to_json_object());
        assert_eq!(obj["name"], json!("Set"));
        assert_eq!(obj["contents"]["scene"]["scene_rect"]["width"], json!(640.0));
        let tiles = obj["contents"]["scene"]["tiles"].as_array().expect("tiles");
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0]["type"], json!("Tile::PlaylistTile"));
        assert_eq!(tiles[0]["data"]["name"], json!("A"));
        assert_eq!(tiles[0]["data"]["playlist"], json!([1]));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let tile = nested(
            "Root",
            vec![
                playlist("A", &[1, 2]),
                Tile::Nested(nested("Inner", vec![playlist("B", &[2])])),
            ],
        );

        let exported = tile.to_json_object();
        let restored = reimport(&tile);

        assert_eq!(restored.to_json_object(), exported);
    }

    #[test]
    fn test_three_levels_survive_round_trip() {
        let inner = nested("Level 2", vec![playlist("Leaf", &[1])]);
        let middle = nested("Level 1", vec![Tile::Nested(inner)]);
        let outer = nested("Level 0", vec![Tile::Nested(middle)]);

        let restored = reimport(&outer);

        let (_, level1) = restored.scene().iter().next().expect("level 1");
        let level1 = level1.as_nested().expect("nested level 1");
        assert_eq!(level1.base().name(), "Level 1");
        let (_, level2) = level1.scene().iter().next().expect("level 2");
        let level2 = level2.as_nested().expect("nested level 2");
        assert_eq!(level2.base().name(), "Level 2");
        let (_, leaf) = level2.scene().iter().next().expect("leaf");
        let leaf = leaf.as_playlist().expect("playlist leaf");
        assert_eq!(leaf.base().name(), "Leaf");
        assert_eq!(leaf.entries().len(), 1);
    }

    #[test]
    fn test_scene_rect_is_restored_exactly() {
        let mut tile = nested("Rect", vec![]);
        let rect = Rect::new(-12.5, 7.25, 1920.0, 1080.5);
        tile.scene_mut().set_rect(rect);

        let restored = reimport(&tile);
        let got = restored.scene().rect();
        assert!((got.x - rect.x).abs() < 1e-9);
        assert!((got.y - rect.y).abs() < 1e-9);
        assert!((got.width - rect.width).abs() < 1e-9);
        assert!((got.height - rect.height).abs() < 1e-9);
    }

    #[test]
    fn test_missing_tiles_key_fails_and_adds_nothing() {
        let mut tile = NestedTile::new(catalog());
        let obj = as_object(json!({
            "name": "Broken",
            "position": { "x": 0, "y": 0 },
            "size": { "width": 100, "height": 100 },
            "contents": { "scene": { "scene_rect": { "x": 0, "y": 0, "width": 50, "height": 50 } } }
        }));

        let result = tile.set_from_json_object(&obj);

        assert_eq!(result, Err(ImportError::MissingKey("tiles".into())));
        assert!(tile.scene().is_empty());
        assert_eq!(tile.base().name(), "Nested");
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        let mut tile = NestedTile::new(catalog());
        let obj = as_object(json!({
            "name": "Mixed",
            "position": { "x": 0, "y": 0 },
            "size": { "width": 100, "height": 100 },
            "contents": { "scene": {
                "scene_rect": { "x": 0, "y": 0, "width": 100, "height": 100 },
                "tiles": [
                    { "type": "Tile::PlaylistTile", "data": {
                        "name": "A", "position": { "x": 0, "y": 0 },
                        "size": { "width": 10, "height": 10 }, "playlist": [1] } },
                    { "type": "UnknownWidget", "data": {} },
                    { "type": "Tile::NestedTile", "data": {
                        "name": "B", "position": { "x": 20, "y": 0 },
                        "size": { "width": 10, "height": 10 },
                        "contents": { "scene": {
                            "scene_rect": { "x": 0, "y": 0, "width": 100, "height": 100 },
                            "tiles": [] } } } }
                ]
            } }
        }));

        tile.set_from_json_object(&obj).expect("import");

        let names: Vec<&str> = tile.scene().iter().map(|(_, t)| t.name()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(tile.scene().iter().all(|(_, t)| t.base().is_movable()));
    }

    #[test]
    fn test_failing_child_leaves_existing_children_untouched() {
        let mut tile = nested("Keep", vec![playlist("Old", &[1])]);
        let obj = as_object(json!({
            "name": "New",
            "position": { "x": 0, "y": 0 },
            "size": { "width": 100, "height": 100 },
            "contents": { "scene": {
                "scene_rect": { "x": 0, "y": 0, "width": 300, "height": 300 },
                "tiles": [
                    { "type": "Tile::PlaylistTile", "data": {
                        "name": "Fine", "position": { "x": 0, "y": 0 },
                        "size": { "width": 10, "height": 10 }, "playlist": [] } },
                    { "type": "Tile::PlaylistTile", "data": { "name": "No geometry" } }
                ]
            } }
        }));

        let result = tile.set_from_json_object(&obj);

        assert!(matches!(result, Err(ImportError::Child { index: 1, .. })));
        let names: Vec<&str> = tile.scene().iter().map(|(_, t)| t.name()).collect();
        assert_eq!(names, vec!["Old"]);
        assert_eq!(tile.base().name(), "Keep");
        assert_eq!(tile.scene().rect(), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_reimport_replaces_children() {
        let source = nested("Source", vec![playlist("X", &[]), playlist("Y", &[])]);
        let mut target = nested("Target", vec![playlist("Old", &[])]);

        target
            .set_from_json_object(&source.to_json_object())
            .expect("import");
        target
            .set_from_json_object(&source.to_json_object())
            .expect("import again");

        let names: Vec<&str> = target.scene().iter().map(|(_, t)| t.name()).collect();
        assert_eq!(names, vec!["X", "Y"]);
    }

    #[test]
    fn test_drag_leave_cancels_dwell() {
        let mut tile = nested("Drop", vec![]);
        tile.drag_enter();
        assert!(tile.advance(Duration::from_millis(400)).is_none());
        assert!(tile.progress() > 0.0);

        tile.drag_leave();

        assert_eq!(tile.progress(), NO_PROGRESS);
        assert_eq!(tile.dwell(), Dwell::Idle);
        assert!(tile.advance(ENTER_DELAY).is_none());
    }

    #[test]
    fn test_dwell_completion_requests_contents_once() {
        let mut tile = nested("Folder", vec![]);
        tile.drag_enter();

        let event = tile.advance(ENTER_DELAY);

        assert_eq!(
            event,
            Some(TileEvent::EnterContents {
                name: "Folder".into()
            })
        );
        assert_eq!(tile.progress(), NO_PROGRESS);
        assert_eq!(tile.dwell(), Dwell::Idle);
        tile.drag_leave();
        assert!(tile.advance(ENTER_DELAY).is_none());
    }

    #[test]
    fn test_drop_cancels_dwell() {
        let mut tile = nested("Drop", vec![]);
        tile.drag_enter();
        tile.receive_external_data(&DropData::Tiles(vec![]));
        assert_eq!(tile.progress(), NO_PROGRESS);
        assert!(tile.advance(ENTER_DELAY).is_none());
    }

    #[test]
    fn test_activation_reaches_children_before_parent() {
        let mut tile = nested("Parent", vec![playlist("A", &[]), playlist("B", &[])]);
        let mut events = Vec::new();

        tile.on_activate(&mut events);

        let order: Vec<(&str, bool)> = events
            .iter()
            .map(|e| match e {
                TileEvent::Activated { name, activated } => (name.as_str(), *activated),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(order, vec![("A", true), ("B", true), ("Parent", true)]);
        assert!(tile.scene().iter().all(|(_, t)| t.is_activated()));
    }

    #[test]
    fn test_delete_cascades_to_children() {
        let mut child = nested("Child", vec![]);
        child.drag_enter();
        let mut tile = nested("Parent", vec![Tile::Nested(child), playlist("P", &[])]);
        let mut events = Vec::new();
        tile.on_activate(&mut events);
        tile.drag_enter();

        tile.on_delete();

        assert!(tile.scene().is_empty());
        assert_eq!(tile.progress(), NO_PROGRESS);
        tile.on_delete();
    }

    #[test]
    fn test_progress_indicator_scales_from_center() {
        let mut tile = nested("Paint", vec![]);
        assert!(!tile
            .paint()
            .iter()
            .any(|op| matches!(op, PaintOp::FillRect { .. })));

        tile.drag_enter();
        tile.advance(ENTER_DELAY / 2);

        let p_rect = tile.base().paint_rect();
        let fill = tile
            .paint()
            .into_iter()
            .find_map(|op| match op {
                PaintOp::FillRect { rect, color } => Some((rect, color)),
                _ => None,
            })
            .expect("progress fill");
        assert_eq!(fill.1, PROGRESS_FILL);
        assert!((fill.0.center().x - p_rect.center().x).abs() < 1e-9);
        assert!((fill.0.width - p_rect.width * 0.5005).abs() < 1e-9);
    }

    #[test]
    fn test_context_menu_leads_with_contents() {
        let tile = nested("Menu", vec![]);
        let menu = tile.context_menu();
        assert_eq!(menu[0], MenuEntry::Action(TileAction::Contents));
        assert_eq!(menu[1], MenuEntry::Action(TileAction::Configure));
        assert_eq!(menu[2], MenuEntry::Separator);
        assert_eq!(menu.last(), Some(&MenuEntry::Action(TileAction::Delete)));
    }
}
