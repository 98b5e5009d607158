use crate::{PROJECT_VERSION, Project, ProjectError, ProjectFormat};
use companion_tiles::Scene;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn save_project(
    path: &Path,
    name: String,
    scene: &Scene,
    format: ProjectFormat,
) -> Result<(), ProjectError> {
    let project = Project {
        name,
        version: PROJECT_VERSION,
        scene: serde_json::Value::Object(scene.to_json_object()),
    };

    write_project(path, &project, format)?;
    log::info!(
        "Saved project '{}' ({} tiles) to {}",
        project.name,
        scene.total_tiles(),
        path.display()
    );
    Ok(())
}

pub fn write_project(
    path: &Path,
    project: &Project,
    format: ProjectFormat,
) -> Result<(), ProjectError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        ProjectFormat::Json => serde_json::to_writer_pretty(&mut writer, project)?,
        ProjectFormat::MessagePack => rmp_serde::encode::write(&mut writer, project)?,
    }
    writer.flush()?;

    Ok(())
}
