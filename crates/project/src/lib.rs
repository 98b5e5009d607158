mod load;
mod save;

use companion_tiles::ImportError;
use serde::{Deserialize, Serialize};

pub use load::{
    LoadedProject, OfflineReference, ProjectMetadata, load_project, load_project_metadata,
    read_project,
};
pub use save::{save_project, write_project};

/// Version written into every project file.
pub const PROJECT_VERSION: u32 = 1;

/// On-disk envelope around the root scene.
///
/// `scene` holds the `{ "scene_rect": ..., "tiles": [...] }` object exactly as
/// produced by `Scene::to_json_object`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub version: u32,
    pub scene: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    MessagePack,
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] rmp_serde::decode::Error),

    #[error("Unsupported project version {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid scene data: {0}")]
    InvalidScene(#[from] ImportError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_project() -> Project {
        Project {
            name: "Live Set".to_string(),
            version: PROJECT_VERSION,
            scene: json!({
                "scene_rect": { "x": 0.0, "y": 0.0, "width": 800.0, "height": 600.0 },
                "tiles": [
                    { "type": "Tile::PlaylistTile", "data": {
                        "name": "Intro", "position": { "x": 10.0, "y": 10.0 },
                        "size": { "width": 100.0, "height": 100.0 }, "playlist": [1, 2] } }
                ]
            }),
        }
    }

    #[test]
    fn test_project_json_roundtrip() {
        let project = sample_project();

        let text = serde_json::to_string(&project).expect("serialize");
        let decoded: Project = serde_json::from_str(&text).expect("deserialize");

        assert_eq!(decoded, project);
    }

    #[test]
    fn test_project_messagepack_roundtrip() {
        let project = sample_project();

        let bytes = rmp_serde::encode::to_vec(&project).expect("serialize");
        let decoded: Project = rmp_serde::decode::from_slice(&bytes).expect("deserialize");

        assert_eq!(decoded.name, project.name);
        assert_eq!(decoded.version, project.version);
        assert_eq!(decoded.scene["tiles"][0]["data"]["name"], json!("Intro"));
        assert_eq!(decoded.scene["scene_rect"]["width"], json!(800.0));
    }

    #[test]
    fn test_error_messages() {
        let err = ProjectError::UnsupportedVersion(7);
        assert!(err.to_string().contains('7'));

        let err = ProjectError::from(ImportError::MissingKey("tiles".into()));
        assert_eq!(err.to_string(), "Invalid scene data: missing key 'tiles'");
    }
}
