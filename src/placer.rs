// SPDX-License-Identifier: MIT

//! Collision-safe renames and moves
//!
//! All placements append `_{n}` suffixes (n starting at 1) until a free name
//! is found, so no existing file is ever clobbered. The pipeline is
//! single-threaded, so there is no locking around the existence probe.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{RenamerError, Result};

/// First free path in `dir` for `stem` + `extension`.
///
/// `extension` carries its leading dot (or is empty for extensionless files).
fn free_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut candidate = dir.join(format!("{stem}{extension}"));
    let mut counter = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{stem}_{counter}{extension}"));
        counter += 1;
    }
    candidate
}

/// Extension of `path` including the leading dot, or empty.
pub(crate) fn dotted_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

/// Rename `file` within its own directory to `desired_stem` + `extension`,
/// suffixing on collision. Returns the new path.
pub fn rename_in_place(file: &Path, desired_stem: &str, extension: &str) -> Result<PathBuf> {
    let dir = file.parent().ok_or_else(|| {
        RenamerError::FileSystem(std::io::Error::other(format!(
            "cannot determine parent directory of {file:?}"
        )))
    })?;

    let target = free_path(dir, desired_stem, extension);
    fs::rename(file, &target)?;
    info!("Renamed {:?} to {:?}", file.file_name(), target.file_name());

    Ok(target)
}

/// Move `file` into `destination_dir` (created if absent), keeping its
/// basename and suffixing on collision. Moving a file into the directory it
/// already occupies is a no-op.
pub fn move_to_dir(file: &Path, destination_dir: &Path) -> Result<PathBuf> {
    if file.parent() == Some(destination_dir) {
        return Ok(file.to_path_buf());
    }

    fs::create_dir_all(destination_dir)?;

    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let extension = dotted_extension(file);

    let target = free_path(destination_dir, &stem, &extension);
    fs::rename(file, &target)?;
    info!("Moved {:?} to {:?}", file, target);

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn test_rename_without_collision() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("IMG001.jpg");
        touch(&src);

        let out = rename_in_place(&src, "Charizard", ".jpg").unwrap();
        assert_eq!(out, dir.path().join("Charizard.jpg"));
        assert!(out.exists());
        assert!(!src.exists());
    }

    #[test]
    fn test_rename_collision_suffixes() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("Charizard.jpg"));

        let second = dir.path().join("IMG001.jpg");
        touch(&second);
        let out = rename_in_place(&second, "Charizard", ".jpg").unwrap();
        assert_eq!(out, dir.path().join("Charizard_1.jpg"));

        let third = dir.path().join("IMG002.jpg");
        touch(&third);
        let out = rename_in_place(&third, "Charizard", ".jpg").unwrap();
        assert_eq!(out, dir.path().join("Charizard_2.jpg"));
    }

    #[test]
    fn test_rename_without_parent_is_filesystem_error() {
        let err = rename_in_place(Path::new("/"), "x", ".jpg").unwrap_err();
        assert!(matches!(err, RenamerError::FileSystem(_)));
    }

    #[test]
    fn test_move_creates_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("Bolt.jpg");
        touch(&src);

        let dest = dir.path().join("Processed");
        let out = move_to_dir(&src, &dest).unwrap();
        assert_eq!(out, dest.join("Bolt.jpg"));
        assert!(out.exists());
        assert!(!src.exists());
    }

    #[test]
    fn test_move_collision_suffixes() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("Processed");
        fs::create_dir(&dest).unwrap();
        touch(&dest.join("Bolt.jpg"));

        let src = dir.path().join("Bolt.jpg");
        touch(&src);
        let out = move_to_dir(&src, &dest).unwrap();
        assert_eq!(out, dest.join("Bolt_1.jpg"));
    }

    #[test]
    fn test_move_into_own_directory_is_noop() {
        let dir = tempdir().unwrap();
        let error_dir = dir.path().join("Error");
        fs::create_dir(&error_dir).unwrap();
        let src = error_dir.join("Unknown.jpg");
        touch(&src);

        let out = move_to_dir(&src, &error_dir).unwrap();
        assert_eq!(out, src);
        assert!(src.exists());
        assert!(!error_dir.join("Unknown_1.jpg").exists());
    }

    #[test]
    fn test_extensionless_move() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("README");
        touch(&src);

        let dest = dir.path().join("Error");
        let out = move_to_dir(&src, &dest).unwrap();
        assert_eq!(out, dest.join("README"));
    }
}
