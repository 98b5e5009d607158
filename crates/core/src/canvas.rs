use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use companion_catalog::SharedCatalog;
use companion_project::{
    OfflineReference, ProjectError, ProjectFormat, load_project, save_project,
};
use companion_tiles::{
    DropData, ImportError, JsonObject, NestedTile, PlaylistTile, Point, Scene, Tile, TileAction,
    TileEvent, TileId, TileMode,
};

/// Breadcrumb label of the root scene.
pub const ROOT_SCENE_NAME: &str = "Canvas";

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("no tile {0:?} in the active scene")]
    UnknownTile(TileId),

    #[error("tile {0:?} is not a nested tile")]
    NotNested(TileId),

    #[error("scene stack no longer matches the scene tree")]
    StaleSceneStack,

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Project(#[from] ProjectError),
}

#[derive(Debug, Clone)]
struct SceneFrame {
    tile: TileId,
    name: String,
}

/// Hosts the root scene and the stack of entered nested scenes.
///
/// The stack is a path of nested-tile ids from the root, so the root can
/// never be popped and every entered scene stays owned by its tile.
#[derive(Debug)]
pub struct Canvas {
    name: String,
    root: Scene,
    stack: Vec<SceneFrame>,
    catalog: SharedCatalog,
    mode: TileMode,
}

impl Canvas {
    pub fn new(catalog: SharedCatalog) -> Self {
        Self {
            name: String::new(),
            root: Scene::new(),
            stack: Vec::new(),
            catalog,
            mode: TileMode::Default,
        }
    }

    pub fn from_project(path: &Path, catalog: SharedCatalog) -> anyhow::Result<Self> {
        let mut canvas = Self::new(catalog);
        canvas
            .open(path)
            .with_context(|| format!("failed to open project {}", path.display()))?;
        Ok(canvas)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn sound_file_model(&self) -> SharedCatalog {
        self.catalog.clone()
    }

    pub fn mode(&self) -> TileMode {
        self.mode
    }

    pub fn root_scene(&self) -> &Scene {
        &self.root
    }

    pub fn active_scene(&self) -> &Scene {
        let mut scene = &self.root;
        for frame in &self.stack {
            match scene.get(frame.tile).and_then(Tile::as_nested) {
                Some(nested) => scene = nested.scene(),
                None => break,
            }
        }
        scene
    }

    pub fn active_scene_mut(&mut self) -> Result<&mut Scene, CanvasError> {
        let mut scene = &mut self.root;
        for frame in &self.stack {
            scene = scene
                .get_mut(frame.tile)
                .and_then(Tile::as_nested_mut)
                .ok_or(CanvasError::StaleSceneStack)?
                .scene_mut();
        }
        Ok(scene)
    }

    /// Number of entered scenes above the root.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn breadcrumb(&self) -> Vec<String> {
        std::iter::once(ROOT_SCENE_NAME.to_string())
            .chain(self.stack.iter().map(|f| f.name.clone()))
            .collect()
    }

    /// Enter the scene of nested tile `id` in the active scene.
    pub fn push_scene(&mut self, id: TileId) -> Result<(), CanvasError> {
        let nested = self.nested(id)?;
        let name = nested.base().name().to_string();
        log::debug!("Entering scene '{}' at depth {}", name, self.stack.len() + 1);
        self.stack.push(SceneFrame { tile: id, name });
        Ok(())
    }

    /// Return to the previous scene. Returns `false` at the root.
    pub fn pop_scene(&mut self) -> bool {
        match self.stack.pop() {
            Some(frame) => {
                log::debug!("Leaving scene '{}'", frame.name);
                true
            }
            None => false,
        }
    }

    pub fn pop_to_root(&mut self) {
        self.stack.clear();
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.active_scene().get(id)
    }

    fn tile_mut(&mut self, id: TileId) -> Result<&mut Tile, CanvasError> {
        self.active_scene_mut()?
            .get_mut(id)
            .ok_or(CanvasError::UnknownTile(id))
    }

    fn nested(&self, id: TileId) -> Result<&NestedTile, CanvasError> {
        self.tile(id)
            .ok_or(CanvasError::UnknownTile(id))?
            .as_nested()
            .ok_or(CanvasError::NotNested(id))
    }

    /// Add a tile to the active scene, in the canvas' current mode.
    pub fn add_tile(&mut self, tile: impl Into<Tile>) -> Result<TileId, CanvasError> {
        let mut tile = tile.into();
        tile.base_mut().set_movable(true);
        tile.set_mode(self.mode);
        Ok(self.active_scene_mut()?.add(tile))
    }

    pub fn add_playlist_tile(&mut self, name: &str, pos: Point) -> Result<TileId, CanvasError> {
        let mut tile = PlaylistTile::new();
        tile.set_sound_file_model(self.sound_file_model());
        tile.base_mut().set_name(name);
        tile.base_mut().set_position(pos);
        self.add_tile(tile)
    }

    pub fn add_nested_tile(&mut self, name: &str, pos: Point) -> Result<TileId, CanvasError> {
        let mut tile = NestedTile::new(self.sound_file_model());
        tile.base_mut().set_name(name);
        tile.base_mut().set_position(pos);
        self.add_tile(tile)
    }

    pub fn remove_tile(&mut self, id: TileId) -> Result<(), CanvasError> {
        if self.active_scene_mut()?.remove(id) {
            Ok(())
        } else {
            Err(CanvasError::UnknownTile(id))
        }
    }

    /// Rename a tile. Empty names are ignored and yield `false`.
    pub fn rename_tile(&mut self, id: TileId, name: &str) -> Result<bool, CanvasError> {
        Ok(self.tile_mut(id)?.base_mut().set_name(name))
    }

    /// Switch every tile, in every scene, to `mode`.
    pub fn set_mode(&mut self, mode: TileMode) {
        self.mode = mode;
        self.root.set_mode(mode);
    }

    pub fn drag_enter(&mut self, id: TileId) -> Result<(), CanvasError> {
        self.tile_mut(id)?.drag_enter();
        Ok(())
    }

    pub fn drag_leave(&mut self, id: TileId) -> Result<(), CanvasError> {
        self.tile_mut(id)?.drag_leave();
        Ok(())
    }

    /// Deliver dropped data to a tile. Tiles dropped onto a nested tile are
    /// moved into its scene.
    pub fn drop_data(&mut self, id: TileId, data: DropData) -> Result<(), CanvasError> {
        self.tile_mut(id)?.receive_external_data(&data);
        if let DropData::Tiles(ids) = &data {
            if self.nested(id).is_ok() {
                self.move_tiles_into(id, ids)?;
            }
        }
        Ok(())
    }

    /// Move tiles of the active scene into nested tile `target`.
    ///
    /// Every id is checked before anything moves, so either all tiles are
    /// reparented or none are. `target` itself is skipped. Returns the ids
    /// the tiles received in the target scene.
    pub fn move_tiles_into(
        &mut self,
        target: TileId,
        ids: &[TileId],
    ) -> Result<Vec<TileId>, CanvasError> {
        self.nested(target)?;
        let mut moving: Vec<TileId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if id == target || moving.contains(&id) {
                continue;
            }
            if !self.active_scene().contains(id) {
                return Err(CanvasError::UnknownTile(id));
            }
            moving.push(id);
        }

        let scene = self.active_scene_mut()?;
        let tiles: Vec<Tile> = moving.iter().filter_map(|id| scene.take(*id)).collect();
        let nested = scene
            .get_mut(target)
            .and_then(Tile::as_nested_mut)
            .ok_or(CanvasError::NotNested(target))?;
        Ok(nested.add_tiles(tiles))
    }

    /// Left click on a tile.
    pub fn click(&mut self, id: TileId, ctrl_held: bool) -> Result<Vec<TileEvent>, CanvasError> {
        let mut events = Vec::new();
        self.tile_mut(id)?.on_click(ctrl_held, &mut events);
        Ok(events)
    }

    pub fn activate(&mut self, id: TileId) -> Result<Vec<TileEvent>, CanvasError> {
        let mut events = Vec::new();
        self.tile_mut(id)?.on_activate(&mut events);
        Ok(events)
    }

    /// Run a context-menu action on a tile.
    pub fn trigger(&mut self, id: TileId, action: TileAction) -> Result<Vec<TileEvent>, CanvasError> {
        match action {
            TileAction::Contents => {
                let event = self
                    .tile_mut(id)?
                    .as_nested_mut()
                    .ok_or(CanvasError::NotNested(id))?
                    .on_contents();
                self.push_scene(id)?;
                Ok(vec![event, TileEvent::SceneChanged { depth: self.depth() }])
            }
            TileAction::Configure => {
                let name = self.tile_mut(id)?.name().to_string();
                Ok(vec![TileEvent::ConfigureRequested { name }])
            }
            TileAction::ClearPlaylist => {
                if let Some(playlist) = self.tile_mut(id)?.as_playlist_mut() {
                    playlist.clear_playlist();
                }
                Ok(Vec::new())
            }
            TileAction::Activate => self.activate(id),
            TileAction::Delete => {
                self.remove_tile(id)?;
                Ok(Vec::new())
            }
        }
    }

    /// Advance dwell deadlines in the active scene by `dt`. A nested tile
    /// whose dwell completes is entered.
    pub fn advance(&mut self, dt: Duration) -> Result<Vec<TileEvent>, CanvasError> {
        let mut fired = Vec::new();
        for (id, tile) in self.active_scene_mut()?.iter_mut() {
            if let Some(event) = tile.advance(dt) {
                fired.push((id, event));
            }
        }

        // Only the first completion in a tick is entered; ids of later ones
        // would be looked up in the wrong scene.
        let mut events = Vec::new();
        let mut entered = false;
        for (id, event) in fired {
            let enter = !entered && matches!(event, TileEvent::EnterContents { .. });
            events.push(event);
            if enter {
                self.push_scene(id)?;
                entered = true;
                events.push(TileEvent::SceneChanged { depth: self.depth() });
            }
        }
        Ok(events)
    }

    pub fn to_json_object(&self) -> JsonObject {
        self.root.to_json_object()
    }

    /// Replace the whole tree. On failure the canvas is left unchanged; on
    /// success the view returns to the root.
    pub fn set_from_json_object(&mut self, obj: &JsonObject) -> Result<(), CanvasError> {
        self.root.set_from_json_object(obj, &self.catalog)?;
        self.root.set_mode(self.mode);
        self.stack.clear();
        Ok(())
    }

    /// Delete every tile and return to the root.
    pub fn clear(&mut self) {
        self.root.clear_tiles();
        self.root = Scene::new();
        self.stack.clear();
        self.name.clear();
    }

    pub fn save(&self, path: &Path, format: ProjectFormat) -> Result<(), CanvasError> {
        save_project(path, self.name.clone(), &self.root, format)?;
        Ok(())
    }

    /// Load a project file, replacing the current tree. Returns the playlist
    /// references the catalog could not resolve.
    pub fn open(&mut self, path: &Path) -> Result<Vec<OfflineReference>, CanvasError> {
        let loaded = load_project(path, &self.catalog)?;
        self.root.clear_tiles();
        self.root = loaded.scene;
        self.root.set_mode(self.mode);
        self.stack.clear();
        self.name = loaded.name;
        Ok(loaded.offline_references)
    }
}
