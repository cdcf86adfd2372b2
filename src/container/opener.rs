//! Opening containers from disk
//!
//! Three layouts are accepted:
//! - a directory holding `container.json`
//! - a bare manifest file
//! - a tar archive holding `container.json` at any depth

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use tar::Archive;

use super::errors::{ContainerError, ContainerResult};
use super::store::ManifestContainer;

/// Manifest file name inside a container directory or archive
pub const MANIFEST_FILE_NAME: &str = "container.json";

/// Opens the database or table at `path`
pub fn open(path: &Path) -> ContainerResult<ManifestContainer> {
    let metadata = fs::metadata(path).map_err(|e| not_found_or_io(path, e))?;

    let text = if metadata.is_dir() {
        let manifest = path.join(MANIFEST_FILE_NAME);
        if !manifest.is_file() {
            return Err(ContainerError::NotFound(path.to_path_buf()));
        }
        fs::read_to_string(&manifest).map_err(|e| ContainerError::io(&manifest, e))?
    } else {
        let bytes = fs::read(path).map_err(|e| ContainerError::io(path, e))?;
        if looks_like_json(&bytes) {
            String::from_utf8(bytes)
                .map_err(|e| ContainerError::corrupt(path, format!("manifest is not UTF-8: {}", e)))?
        } else {
            read_archived_manifest(path, &bytes)?
        }
    };

    ManifestContainer::from_json(path, &text)
}

fn not_found_or_io(path: &Path, e: io::Error) -> ContainerError {
    if e.kind() == io::ErrorKind::NotFound {
        ContainerError::NotFound(path.to_path_buf())
    } else {
        ContainerError::io(path, e)
    }
}

fn looks_like_json(bytes: &[u8]) -> bool {
    bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{')
}

fn read_archived_manifest(path: &Path, bytes: &[u8]) -> ContainerResult<String> {
    let corrupt = |e: io::Error| ContainerError::corrupt(path, format!("unreadable archive: {}", e));

    let mut archive = Archive::new(bytes);
    for entry in archive.entries().map_err(corrupt)? {
        let mut entry = entry.map_err(corrupt)?;
        let is_manifest = entry
            .path()
            .map_err(corrupt)?
            .file_name()
            .map_or(false, |name| name == OsStr::new(MANIFEST_FILE_NAME));
        if is_manifest {
            let mut text = String::new();
            entry.read_to_string(&mut text).map_err(corrupt)?;
            return Ok(text);
        }
    }

    Err(ContainerError::corrupt(
        path,
        format!("archive holds no {}", MANIFEST_FILE_NAME),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::visit::ObjectKind;
    use std::fs::File;
    use std::io::Write;
    use tar::{Builder, Header};
    use tempfile::TempDir;

    const TABLE: &str = r#"{"kind": "table", "name": "run", "columns": [{"name": "READ", "rows": [[1]]}]}"#;

    #[test]
    fn test_open_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(MANIFEST_FILE_NAME), TABLE).unwrap();

        let container = open(temp.path()).unwrap();
        assert_eq!(container.kind(), ObjectKind::Table);
        assert_eq!(container.name(), "run");
        assert_eq!(container.path(), temp.path());
    }

    #[test]
    fn test_open_bare_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.json");
        fs::write(&path, format!("\n  {}", TABLE)).unwrap();
        assert_eq!(open(&path).unwrap().name(), "run");
    }

    #[test]
    fn test_open_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.tar");
        let mut builder = Builder::new(File::create(&path).unwrap());
        let mut header = Header::new_gnu();
        header.set_size(TABLE.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "run/container.json", TABLE.as_bytes())
            .unwrap();
        builder.finish().unwrap();
        drop(builder);

        assert_eq!(open(&path).unwrap().name(), "run");
    }

    #[test]
    fn test_archive_without_manifest_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.tar");
        let mut builder = Builder::new(File::create(&path).unwrap());
        let mut header = Header::new_gnu();
        header.set_size(2);
        header.set_cksum();
        builder.append_data(&mut header, "README", &b"hi"[..]).unwrap();
        builder.finish().unwrap();
        drop(builder);

        assert!(matches!(open(&path), Err(ContainerError::Corrupt { .. })));
    }

    #[test]
    fn test_missing_paths_are_not_found() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            open(&temp.path().join("nope")),
            Err(ContainerError::NotFound(_))
        ));
        assert!(matches!(open(temp.path()), Err(ContainerError::NotFound(_))));
    }

    #[test]
    fn test_column_manifest_is_wrong_type() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("col.json");
        let mut file = File::create(&path).unwrap();
        file.write_all(br#"{"kind": "column", "name": "READ"}"#).unwrap();

        assert!(matches!(open(&path), Err(ContainerError::WrongType { .. })));
    }
}
