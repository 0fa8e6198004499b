//! ZIP extraction into the plugin directory.
//!
//! Files are written one at a time, overwriting entries with the same
//! name and leaving everything else in the target directory alone. There
//! is no rollback: a failure mid-extraction leaves the files already
//! written in place.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::{debug, info};

use super::UpdateError;

/// Extracts the full contents of a ZIP archive into `target`.
///
/// The archive handle lives inside this function and is released on every
/// return path, success or failure.
///
/// # Errors
/// `ArchiveOpen` when the file is missing or not a ZIP container,
/// `ArchiveExtract` for unreadable or unsafe entries, `Filesystem` for
/// write failures.
pub fn extract_zip(archive_path: &Path, target: &Path) -> Result<(), UpdateError> {
    let file = File::open(archive_path).map_err(|e| UpdateError::ArchiveOpen(e.to_string()))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| UpdateError::ArchiveOpen(e.to_string()))?;

    fs::create_dir_all(target)?;

    debug!(
        "[UPDATE] Extracting {} entries into {}",
        archive.len(),
        target.display()
    );

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| UpdateError::ArchiveExtract(e.to_string()))?;

        // Entries with `..` or absolute paths must not escape the target.
        let Some(relative) = entry.enclosed_name() else {
            return Err(UpdateError::ArchiveExtract(format!(
                "entry '{}' escapes the target directory",
                entry.name()
            )));
        };

        if relative.as_os_str().is_empty() {
            continue;
        }

        let outpath = target.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut outfile = File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)?;
        }
    }

    info!(
        "[UPDATE] Extracted {} into {}",
        archive_path.display(),
        target.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    /// Builds a ZIP file with the given (name, contents) entries.
    fn build_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).expect("create archive");
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        for (name, contents) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).expect("add dir");
            } else {
                writer.start_file(*name, options).expect("start file");
                writer.write_all(contents.as_bytes()).expect("write entry");
            }
        }

        writer.finish().expect("finish archive");
    }

    #[test]
    fn test_extracts_files_and_directories() {
        let dir = tempdir().expect("tempdir");
        let archive = dir.path().join("update.zip");
        let target = dir.path().join("plugin");

        build_zip(
            &archive,
            &[
                ("plugin.php", "<?php // v0.1.5"),
                ("assets/", ""),
                ("assets/style.css", "body {}"),
            ],
        );

        extract_zip(&archive, &target).expect("extract succeeds");

        assert_eq!(
            fs::read_to_string(target.join("plugin.php")).expect("entry file"),
            "<?php // v0.1.5"
        );
        assert_eq!(
            fs::read_to_string(target.join("assets/style.css")).expect("nested file"),
            "body {}"
        );
    }

    #[test]
    fn test_overwrites_same_names_and_keeps_unrelated_files() {
        let dir = tempdir().expect("tempdir");
        let archive = dir.path().join("update.zip");
        let target = dir.path().join("plugin");

        fs::create_dir_all(&target).expect("target dir");
        fs::write(target.join("plugin.php"), "<?php // v0.1.4").expect("old entry");
        fs::write(target.join("settings.ini"), "keep = me").expect("unrelated file");

        build_zip(&archive, &[("plugin.php", "<?php // v0.1.5")]);
        extract_zip(&archive, &target).expect("extract succeeds");

        assert_eq!(
            fs::read_to_string(target.join("plugin.php")).expect("entry file"),
            "<?php // v0.1.5"
        );
        assert_eq!(
            fs::read_to_string(target.join("settings.ini")).expect("unrelated file"),
            "keep = me"
        );
    }

    #[test]
    fn test_missing_archive_is_open_failure() {
        let dir = tempdir().expect("tempdir");
        let err = extract_zip(&dir.path().join("absent.zip"), dir.path()).unwrap_err();
        assert!(matches!(err, UpdateError::ArchiveOpen(_)));
    }

    #[test]
    fn test_non_zip_file_is_open_failure() {
        let dir = tempdir().expect("tempdir");
        let archive = dir.path().join("update.zip");
        fs::write(&archive, "not a zip").expect("junk file");

        let err = extract_zip(&archive, dir.path()).unwrap_err();
        assert!(matches!(err, UpdateError::ArchiveOpen(_)));
    }
}
