pub mod canvas;

pub use canvas::{Canvas, CanvasError, ROOT_SCENE_NAME};

pub use companion_catalog::{InMemoryCatalog, SharedCatalog, SoundFileCatalog, SoundFileRecord};
pub use companion_project::{
    LoadedProject, OfflineReference, Project, ProjectError, ProjectFormat, ProjectMetadata,
    load_project, load_project_metadata, read_project, save_project, write_project,
};
pub use companion_tiles::{
    DropData, ImportError, JsonObject, MenuEntry, NestedTile, PaintOp, PlaylistTile, Point, Rect,
    Scene, Tile, TileAction, TileEvent, TileId, TileKind, TileMode,
};
