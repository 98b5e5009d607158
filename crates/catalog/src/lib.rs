use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

/// File extensions picked up by [`InMemoryCatalog::scan_directory`].
pub const SOUND_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "flac", "aiff"];

/// A sound file known to the catalog. Tiles persist only the `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundFileRecord {
    pub id: i64,
    pub name: String,
    pub path: PathBuf,
}

impl SoundFileRecord {
    pub fn new(id: i64, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Read-only lookup of sound files by id.
///
/// Leaf tiles resolve their persisted references against a catalog while
/// being deserialized; nothing in the tile graph writes to it.
pub trait SoundFileCatalog: fmt::Debug {
    /// Look up a single record, `None` if the id is unknown.
    fn sound_file(&self, id: i64) -> Option<SoundFileRecord>;

    /// All records, ordered by id.
    fn sound_files(&self) -> Vec<SoundFileRecord>;

    fn contains(&self, id: i64) -> bool {
        self.sound_file(id).is_some()
    }
}

/// Shared handle passed from the canvas down to the tiles.
pub type SharedCatalog = Arc<dyn SoundFileCatalog>;

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    records: BTreeMap<i64, SoundFileRecord>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = SoundFileRecord>) -> Self {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(record);
        }
        catalog
    }

    /// Insert or replace a record, returning the previous one with that id.
    pub fn insert(&mut self, record: SoundFileRecord) -> Option<SoundFileRecord> {
        self.records.insert(record.id, record)
    }

    pub fn remove(&mut self, id: i64) -> Option<SoundFileRecord> {
        self.records.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_shared(self) -> SharedCatalog {
        Arc::new(self)
    }

    /// Build a catalog from every sound file below `dir`.
    ///
    /// Files are sorted by path and numbered from 1 so repeated scans of an
    /// unchanged directory hand out the same ids.
    pub fn scan_directory(dir: &Path) -> anyhow::Result<Self> {
        let mut paths = collect_sound_files(dir)
            .with_context(|| format!("failed to scan sound directory {}", dir.display()))?;
        paths.sort();

        let records = paths.into_iter().enumerate().map(|(index, path)| {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            SoundFileRecord::new(index as i64 + 1, name, path)
        });

        let catalog = Self::from_records(records);
        log::info!(
            "Scanned {} sound files from {}",
            catalog.len(),
            dir.display()
        );
        Ok(catalog)
    }
}

impl SoundFileCatalog for InMemoryCatalog {
    fn sound_file(&self, id: i64) -> Option<SoundFileRecord> {
        self.records.get(&id).cloned()
    }

    fn sound_files(&self) -> Vec<SoundFileRecord> {
        self.records.values().cloned().collect()
    }
}

fn is_sound_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SOUND_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Sound files below `dir`. Symlinks are not followed, so a link cycle
/// cannot list the same file twice. Unreadable entries below the root are
/// skipped with a warning.
fn collect_sound_files(dir: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                log::warn!("Error accessing entry: {e}");
                continue;
            }
            Err(e) => return Err(e),
        };
        if entry.file_type().is_file() && is_sound_file(entry.path()) {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample_catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_records([
            SoundFileRecord::new(1, "kick", "drums/kick.wav"),
            SoundFileRecord::new(2, "snare", "drums/snare.wav"),
        ])
    }

    #[test]
    fn test_lookup_known_and_unknown_ids() {
        let catalog = sample_catalog();

        assert_eq!(catalog.sound_file(2).map(|r| r.name), Some("snare".to_string()));
        assert!(catalog.sound_file(3).is_none());
        assert!(catalog.contains(1));
        assert!(!catalog.contains(42));
    }

    #[test]
    fn test_insert_replaces_existing_record() {
        let mut catalog = sample_catalog();
        let previous = catalog.insert(SoundFileRecord::new(1, "kick-2", "drums/kick2.wav"));

        assert_eq!(previous.map(|r| r.name), Some("kick".to_string()));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.sound_file(1).expect("record").name, "kick-2");
    }

    #[test]
    fn test_sound_files_are_ordered_by_id() {
        let catalog = InMemoryCatalog::from_records([
            SoundFileRecord::new(9, "c", "c.wav"),
            SoundFileRecord::new(3, "a", "a.wav"),
            SoundFileRecord::new(5, "b", "b.wav"),
        ]);

        let ids: Vec<i64> = catalog.sound_files().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 5, 9]);
    }

    #[test]
    fn test_scan_directory_filters_and_numbers_files() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("perc");
        fs::create_dir_all(&nested).expect("create nested dir");

        fs::write(dir.path().join("b.wav"), b"").expect("write");
        fs::write(dir.path().join("a.MP3"), b"").expect("write");
        fs::write(dir.path().join("notes.txt"), b"").expect("write");
        fs::write(nested.join("clap.flac"), b"").expect("write");

        let catalog = InMemoryCatalog::scan_directory(dir.path()).expect("scan");

        assert_eq!(catalog.len(), 3);
        let names: Vec<String> = catalog.sound_files().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "b", "clap"]);
        assert_eq!(catalog.sound_file(1).expect("first").name, "a");
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_does_not_follow_symlink_cycles() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.wav"), b"").expect("write");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).expect("symlink");
        std::os::unix::fs::symlink(dir.path().join("a.wav"), dir.path().join("alias.wav"))
            .expect("symlink");

        let catalog = InMemoryCatalog::scan_directory(dir.path()).expect("scan");

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.sound_file(1).expect("record").name, "a");
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let result = InMemoryCatalog::scan_directory(Path::new("/nonexistent/sounds"));
        assert!(result.is_err());
    }

    #[test]
    fn test_shared_catalog_is_usable_as_trait_object() {
        let shared: SharedCatalog = sample_catalog().into_shared();
        assert_eq!(shared.sound_files().len(), 2);
    }
}
