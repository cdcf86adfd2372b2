//! Expanding command-line paths into containers
//!
//! A path that is itself a container is returned unchanged. Any other
//! directory is searched recursively, in name order, for container
//! directories, manifest files and archives.

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{ContainerError, ContainerResult};
use super::opener::MANIFEST_FILE_NAME;

const CONTAINER_EXTENSIONS: [&str; 2] = ["json", "tar"];

/// Lists every container reachable from `path`
pub fn discover(path: &Path) -> ContainerResult<Vec<PathBuf>> {
    let metadata = fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ContainerError::NotFound(path.to_path_buf())
        } else {
            ContainerError::io(path, e)
        }
    })?;

    if !metadata.is_dir() || is_container_dir(path) {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut found = Vec::new();
    search(path, &mut found)?;
    Ok(found)
}

fn is_container_dir(path: &Path) -> bool {
    path.join(MANIFEST_FILE_NAME).is_file()
}

fn search(dir: &Path, found: &mut Vec<PathBuf>) -> ContainerResult<()> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| ContainerError::io(dir, e))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ContainerError::io(dir, e))?;
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            if is_container_dir(&entry) {
                found.push(entry);
            } else {
                search(&entry, found)?;
            }
        } else if entry
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| CONTAINER_EXTENSIONS.contains(&ext))
        {
            found.push(entry);
        }
    }
    Ok(())
}
