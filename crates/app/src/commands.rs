use anyhow::{Context, Result};
use companion_core::{
    Canvas, InMemoryCatalog, ProjectFormat, Scene, SharedCatalog, Tile, load_project,
    load_project_metadata, read_project, write_project,
};
use std::io::Write;
use std::path::Path;

pub fn open_catalog(dir: Option<&Path>) -> Result<SharedCatalog> {
    match dir {
        Some(dir) => Ok(InMemoryCatalog::scan_directory(dir)?.into_shared()),
        None => Ok(InMemoryCatalog::new().into_shared()),
    }
}

pub fn inspect(path: &Path, out: &mut dyn Write) -> Result<()> {
    let metadata = load_project_metadata(path)
        .with_context(|| format!("failed to read project {}", path.display()))?;
    writeln!(out, "name:     {}", metadata.name)?;
    writeln!(out, "version:  {}", metadata.version)?;
    writeln!(
        out,
        "tiles:    {} ({} nested, depth {})",
        metadata.tile_count, metadata.nested_count, metadata.max_depth
    )?;

    let loaded = load_project(path, &open_catalog(None)?)
        .with_context(|| format!("failed to load project {}", path.display()))?;
    write_tree(&loaded.scene, 0, out)?;
    Ok(())
}

fn write_tree(scene: &Scene, indent: usize, out: &mut dyn Write) -> Result<()> {
    for (_, tile) in scene.iter() {
        let pad = "  ".repeat(indent);
        match tile {
            Tile::Playlist(playlist) => {
                writeln!(
                    out,
                    "{pad}- {} [{} tracks]",
                    tile.name(),
                    playlist.entries().len()
                )?;
            }
            Tile::Nested(nested) => {
                writeln!(out, "{pad}+ {}/", tile.name())?;
                write_tree(nested.scene(), indent + 1, out)?;
            }
        }
    }
    Ok(())
}

/// Returns the number of offline references found.
pub fn validate(path: &Path, catalog: SharedCatalog, out: &mut dyn Write) -> Result<usize> {
    let mut canvas = Canvas::new(catalog);
    let offline = canvas
        .open(path)
        .with_context(|| format!("failed to load project {}", path.display()))?;

    if offline.is_empty() {
        writeln!(
            out,
            "{}: ok ({} tiles)",
            canvas.name(),
            canvas.root_scene().total_tiles()
        )?;
    } else {
        writeln!(out, "{}: {} offline references", canvas.name(), offline.len())?;
        for reference in &offline {
            writeln!(
                out,
                "  {} -> sound file {}",
                reference.tile_path.join("/"),
                reference.sound_file_id
            )?;
        }
    }
    Ok(offline.len())
}

pub fn convert(input: &Path, output: &Path, format: ProjectFormat) -> Result<()> {
    let project =
        read_project(input).with_context(|| format!("failed to read project {}", input.display()))?;
    write_project(output, &project, format)
        .with_context(|| format!("failed to write project {}", output.display()))?;
    log::info!("Converted {} to {}", input.display(), output.display());
    Ok(())
}

pub fn new_project(path: &Path, name: &str) -> Result<()> {
    let mut canvas = Canvas::new(open_catalog(None)?);
    canvas.set_name(name);
    canvas
        .save(path, ProjectFormat::Json)
        .with_context(|| format!("failed to write project {}", path.display()))?;
    Ok(())
}
