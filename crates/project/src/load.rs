use crate::{PROJECT_VERSION, Project, ProjectError};
use companion_catalog::SharedCatalog;
use companion_tiles::{ImportError, NESTED_TILE_TAG, PLAYLIST_TILE_TAG, Scene, Tile};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A playlist reference the catalog could not resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineReference {
    /// Names of the tiles from the root down to the playlist, inclusive.
    pub tile_path: Vec<String>,
    pub sound_file_id: i64,
}

#[derive(Debug)]
pub struct LoadedProject {
    pub name: String,
    pub scene: Scene,
    /// References that will play nothing until the catalog knows them.
    pub offline_references: Vec<OfflineReference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: String,
    pub version: u32,
    pub tile_count: usize,
    pub nested_count: usize,
    /// Deepest chain of nested tiles; 0 when the root holds only leaves.
    pub max_depth: usize,
}

/// Read the envelope of a project file, JSON first, then MessagePack.
pub fn read_project(path: &Path) -> Result<Project, ProjectError> {
    let bytes = fs::read(path)?;

    let project: Project = match serde_json::from_slice(&bytes) {
        Ok(project) => project,
        // A MessagePack envelope never starts with '{', so keep the JSON error.
        Err(e) if looks_like_json(&bytes) => return Err(e.into()),
        Err(e) => {
            log::debug!("{} is not JSON ({e}), trying MessagePack", path.display());
            rmp_serde::decode::from_slice(&bytes)?
        }
    };

    if project.version != PROJECT_VERSION {
        return Err(ProjectError::UnsupportedVersion(project.version));
    }
    Ok(project)
}

fn looks_like_json(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{')
}

pub fn load_project_metadata(path: &Path) -> Result<ProjectMetadata, ProjectError> {
    let project = read_project(path)?;

    let mut metadata = ProjectMetadata {
        name: project.name,
        version: project.version,
        tile_count: 0,
        nested_count: 0,
        max_depth: 0,
    };
    count_tiles(&project.scene, 0, &mut metadata);
    Ok(metadata)
}

pub fn load_project(path: &Path, catalog: &SharedCatalog) -> Result<LoadedProject, ProjectError> {
    let project = read_project(path)?;

    let scene_obj = project
        .scene
        .as_object()
        .ok_or_else(|| ImportError::WrongType {
            key: "scene".to_string(),
            expected: "an object",
        })?;
    let mut scene = Scene::new();
    scene.set_from_json_object(scene_obj, catalog)?;

    let mut offline_references = Vec::new();
    collect_offline(&scene, &mut Vec::new(), &mut offline_references);
    if !offline_references.is_empty() {
        log::warn!(
            "Project '{}' has {} offline sound file references",
            project.name,
            offline_references.len()
        );
    }
    log::info!(
        "Loaded project '{}' ({} tiles) from {}",
        project.name,
        scene.total_tiles(),
        path.display()
    );

    Ok(LoadedProject {
        name: project.name,
        scene,
        offline_references,
    })
}

// Walks the raw JSON so metadata can be read without a catalog. Counts the
// same entries an import would keep.
fn count_tiles(scene: &Value, depth: usize, metadata: &mut ProjectMetadata) {
    let Some(tiles) = scene.get("tiles").and_then(Value::as_array) else {
        return;
    };
    for entry in tiles {
        let Some(tag) = entry.get("type").and_then(Value::as_str) else {
            continue;
        };
        if entry.get("data").and_then(Value::as_object).is_none() {
            continue;
        }
        match tag {
            PLAYLIST_TILE_TAG => metadata.tile_count += 1,
            NESTED_TILE_TAG => {
                metadata.tile_count += 1;
                metadata.nested_count += 1;
                metadata.max_depth = metadata.max_depth.max(depth + 1);
                if let Some(inner) = entry["data"].get("contents").and_then(|c| c.get("scene")) {
                    count_tiles(inner, depth + 1, metadata);
                }
            }
            _ => {}
        }
    }
}

fn collect_offline(scene: &Scene, path: &mut Vec<String>, out: &mut Vec<OfflineReference>) {
    for (_, tile) in scene.iter() {
        path.push(tile.name().to_string());
        match tile {
            Tile::Playlist(playlist) => {
                for id in playlist.offline_ids() {
                    out.push(OfflineReference {
                        tile_path: path.clone(),
                        sound_file_id: id,
                    });
                }
            }
            Tile::Nested(nested) => collect_offline(nested.scene(), path, out),
        }
        path.pop();
    }
}
