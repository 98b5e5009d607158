//! State and behaviour every tile variant shares.

use crate::geometry::{Point, Rect, Size};
use crate::json::{self, ImportError, JsonObject};
use crate::paint::Glyph;

pub const DEFAULT_TILE_SIZE: Size = Size {
    width: 100.0,
    height: 100.0,
};

/// Gap between the bounding rect and the area glyphs are painted into.
pub const PAINT_MARGIN: f64 = 4.0;

/// Interaction mode. In `Move` mode clicks rearrange tiles instead of
/// activating them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileMode {
    #[default]
    Default,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileAction {
    Contents,
    Configure,
    ClearPlaylist,
    Activate,
    Delete,
}

impl TileAction {
    pub fn label(&self) -> &'static str {
        match self {
            TileAction::Contents => "Contents...",
            TileAction::Configure => "Configure...",
            TileAction::ClearPlaylist => "Clear Playlist",
            TileAction::Activate => "Play/Stop",
            TileAction::Delete => "Delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Action(TileAction),
    Separator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileBase {
    name: String,
    mode: TileMode,
    activated: bool,
    movable: bool,
    geometry: Rect,
}

impl TileBase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: TileMode::Default,
            activated: false,
            movable: false,
            geometry: Rect::from_origin_size(Point::default(), DEFAULT_TILE_SIZE),
        }
    }

    /// Reset transient state after construction.
    pub fn init(&mut self) {
        self.activated = false;
        self.mode = TileMode::Default;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the tile. Empty names are ignored.
    pub fn set_name(&mut self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        self.name = name.to_string();
        true
    }

    pub fn mode(&self) -> TileMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TileMode) {
        self.mode = mode;
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn set_activated(&mut self, activated: bool) {
        self.activated = activated;
    }

    pub fn toggle_activated(&mut self) -> bool {
        self.activated = !self.activated;
        self.activated
    }

    pub fn is_movable(&self) -> bool {
        self.movable
    }

    pub fn set_movable(&mut self, movable: bool) {
        self.movable = movable;
    }

    /// Position and size in the owning scene's coordinates.
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn position(&self) -> Point {
        self.geometry.origin()
    }

    pub fn set_position(&mut self, pos: Point) {
        self.geometry.x = pos.x;
        self.geometry.y = pos.y;
    }

    pub fn size(&self) -> Size {
        self.geometry.size()
    }

    pub fn set_size(&mut self, size: Size) {
        self.geometry.width = size.width;
        self.geometry.height = size.height;
    }

    /// Paint extent in local coordinates.
    pub fn bounding_rect(&self) -> Rect {
        Rect::from_origin_size(Point::default(), self.size())
    }

    pub fn paint_rect(&self) -> Rect {
        self.bounding_rect().inset(PAINT_MARGIN)
    }

    /// Whether a left click should activate the tile.
    pub fn accepts_click(&self, ctrl_held: bool) -> bool {
        self.mode != TileMode::Move && !ctrl_held
    }

    pub fn play_state_glyph(&self) -> Glyph {
        if self.activated {
            Glyph::Stop
        } else {
            Glyph::Play
        }
    }

    /// Actions every tile offers, appended after the variant's own.
    pub fn context_menu(&self) -> Vec<MenuEntry> {
        vec![
            MenuEntry::Action(TileAction::Activate),
            MenuEntry::Action(TileAction::Delete),
        ]
    }

    pub fn to_json_object(&self) -> JsonObject {
        let mut obj = JsonObject::new();
        obj.insert("name".into(), self.name.clone().into());
        obj.insert("position".into(), json::point_to_json(self.position()).into());
        obj.insert("size".into(), json::size_to_json(self.size()).into());
        obj
    }

    /// Parse the shared fields without touching `self`; see [`Self::apply`].
    pub fn parse(obj: &JsonObject) -> Result<BaseFields, ImportError> {
        Ok(BaseFields {
            name: json::string(obj, "name")?.to_string(),
            position: json::point_from_json(json::object(obj, "position")?)?,
            size: json::size_from_json(json::object(obj, "size")?)?,
        })
    }

    pub fn apply(&mut self, fields: BaseFields) {
        self.name = fields.name;
        self.geometry = Rect::from_origin_size(fields.position, fields.size);
    }
}

/// Validated base fields, waiting to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseFields {
    pub name: String,
    pub position: Point,
    pub size: Size,
}
