//! Leaf tile holding an ordered list of sound-file references.

use companion_catalog::{SharedCatalog, SoundFileRecord};
use serde_json::Value;

use crate::base::{MenuEntry, TileAction, TileBase};
use crate::geometry::Rect;
use crate::json::{self, ImportError, JsonObject};
use crate::paint::{Glyph, PaintOp};
use crate::tile::{DropData, TileEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistEntry {
    Resolved(SoundFileRecord),
    /// Persisted id the catalog could not resolve. Kept so it is written
    /// back unchanged.
    Offline(i64),
}

impl PlaylistEntry {
    pub fn id(&self) -> i64 {
        match self {
            PlaylistEntry::Resolved(record) => record.id,
            PlaylistEntry::Offline(id) => *id,
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, PlaylistEntry::Offline(_))
    }
}

#[derive(Debug, Clone)]
pub struct PlaylistTile {
    base: TileBase,
    entries: Vec<PlaylistEntry>,
    catalog: Option<SharedCatalog>,
}

impl Default for PlaylistTile {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistTile {
    pub fn new() -> Self {
        Self {
            base: TileBase::new("Playlist"),
            entries: Vec::new(),
            catalog: None,
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
    }

    /// Bind the catalog persisted references are resolved against. Must be
    /// called before [`Self::set_from_json_object`].
    pub fn set_sound_file_model(&mut self, catalog: SharedCatalog) {
        self.catalog = Some(catalog);
    }

    pub fn has_sound_file_model(&self) -> bool {
        self.catalog.is_some()
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn offline_ids(&self) -> Vec<i64> {
        self.entries
            .iter()
            .filter(|e| e.is_offline())
            .map(PlaylistEntry::id)
            .collect()
    }

    pub fn add_sound_file(&mut self, record: SoundFileRecord) {
        self.entries.push(PlaylistEntry::Resolved(record));
    }

    pub fn remove_entry(&mut self, index: usize) -> Option<PlaylistEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear_playlist(&mut self) {
        self.entries.clear();
    }

    pub fn receive_external_data(&mut self, data: &DropData) {
        if let DropData::SoundFiles(records) = data {
            self.entries
                .extend(records.iter().cloned().map(PlaylistEntry::Resolved));
        }
    }

    pub fn on_activate(&mut self, events: &mut Vec<TileEvent>) {
        let activated = self.base.toggle_activated();
        events.push(TileEvent::Activated {
            name: self.base.name().to_string(),
            activated,
        });
    }

    /// Stops playback state. Calling it again is harmless.
    pub fn on_delete(&mut self) {
        self.base.set_activated(false);
    }

    pub fn context_menu(&self) -> Vec<MenuEntry> {
        let mut menu = vec![
            MenuEntry::Action(TileAction::Configure),
            MenuEntry::Action(TileAction::ClearPlaylist),
            MenuEntry::Separator,
        ];
        menu.extend(self.base.context_menu());
        menu
    }

    pub fn paint(&self) -> Vec<PaintOp> {
        let mut ops = vec![PaintOp::Frame {
            rect: self.base.bounding_rect(),
            highlighted: self.base.is_activated(),
        }];
        let p_rect = self.base.paint_rect();
        if !p_rect.is_empty() {
            ops.push(PaintOp::Glyph {
                glyph: Glyph::Playlist,
                rect: p_rect,
            });
            ops.push(PaintOp::Glyph {
                glyph: self.base.play_state_glyph(),
                rect: p_rect,
            });
            let badge = Rect::new(p_rect.x, p_rect.y, p_rect.width, p_rect.height / 4.0);
            ops.push(PaintOp::Label {
                text: self.entries.len().to_string(),
                rect: badge,
            });
        }
        ops
    }

    pub fn to_json_object(&self) -> JsonObject {
        let mut obj = self.base.to_json_object();
        let ids: Vec<Value> = self.entries.iter().map(|e| e.id().into()).collect();
        obj.insert("playlist".into(), Value::Array(ids));
        obj
    }

    pub fn set_from_json_object(&mut self, obj: &JsonObject) -> Result<(), ImportError> {
        let fields = TileBase::parse(obj)?;
        let ids = json::array(obj, "playlist")?
            .iter()
            .map(|v| {
                v.as_i64().ok_or_else(|| ImportError::WrongType {
                    key: "playlist".to_string(),
                    expected: "an array of integer ids",
                })
            })
            .collect::<Result<Vec<i64>, _>>()?;

        let entries: Vec<PlaylistEntry> = ids.into_iter().map(|id| self.resolve(id)).collect();
        let offline = entries.iter().filter(|e| e.is_offline()).count();
        if offline > 0 {
            log::warn!(
                "Playlist '{}': {} of {} sound files could not be resolved",
                fields.name,
                offline,
                entries.len()
            );
        }

        self.base.apply(fields);
        self.entries = entries;
        Ok(())
    }

    fn resolve(&self, id: i64) -> PlaylistEntry {
        self.catalog
            .as_ref()
            .and_then(|catalog| catalog.sound_file(id))
            .map(PlaylistEntry::Resolved)
            .unwrap_or(PlaylistEntry::Offline(id))
    }
}
