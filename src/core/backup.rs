use crate::errors::{AppError, AppResult};
use crate::store::Store;
use crate::utils::path::{ensure_writable, expand_tilde};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the store's files to `dest_file`.
    ///
    /// A single-file store (SQLite) is copied as-is unless `compress` is set.
    /// Multi-file stores (the JSON sheets) always end up in a `.zip`.
    /// Returns the path actually written.
    pub fn backup(
        store: &mut dyn Store,
        dest_file: &str,
        compress: bool,
        force: bool,
    ) -> AppResult<PathBuf> {
        let sources: Vec<PathBuf> = store.files().into_iter().filter(|p| p.exists()).collect();

        if sources.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Nothing to back up yet: {}", store.describe()),
            )
            .into());
        }

        let dest = expand_tilde(dest_file);
        let zipped = compress || sources.len() > 1;
        let final_path = if zipped {
            dest.with_extension("zip")
        } else {
            dest
        };

        if let Some(parent) = final_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        ensure_writable(&final_path, force)?;

        if zipped {
            write_zip(&final_path, &sources)?;
        } else {
            fs::copy(&sources[0], &final_path)?;
        }

        info!(dest = %final_path.display(), files = sources.len(), "backup written");
        store.audit(
            "backup",
            &final_path.to_string_lossy(),
            if zipped {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        )?;

        Ok(final_path)
    }
}

fn write_zip(zip_path: &Path, sources: &[PathBuf]) -> AppResult<()> {
    let file = fs::File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);

    for src in sources {
        let name = src
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| AppError::Other(format!("Invalid file name: {}", src.display())))?;

        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        zip.start_file(name, options)?;

        let mut f = fs::File::open(src)?;
        io::copy(&mut f, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::add_test_users;
    use crate::store::json::JsonStore;
    use crate::store::sqlite::SqliteStore;
    use tempfile::TempDir;

    #[test]
    fn sqlite_file_is_copied() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("c.sqlite");
        let mut store = SqliteStore::open(&db.to_string_lossy()).unwrap();
        add_test_users(&mut store).unwrap();

        let dest = dir.path().join("backups/c-copy.sqlite");
        let written = BackupLogic::backup(&mut store, &dest.to_string_lossy(), false, false).unwrap();

        assert_eq!(written, dest);
        let copy = SqliteStore::open(&dest.to_string_lossy()).unwrap();
        assert_eq!(copy.users().unwrap().len(), 5);
    }

    #[test]
    fn json_sheets_are_zipped_together() {
        let dir = TempDir::new().unwrap();
        let mut store =
            JsonStore::open(dir.path().join("data.json"), dir.path().join("users.json")).unwrap();
        add_test_users(&mut store).unwrap();
        store.save_sheet().unwrap();

        let dest = dir.path().join("sheets.bak");
        let written = BackupLogic::backup(&mut store, &dest.to_string_lossy(), false, false).unwrap();
        assert_eq!(written, dir.path().join("sheets.zip"));

        let archive = zip::ZipArchive::new(fs::File::open(&written).unwrap()).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["data.json", "users.json"]);
    }

    #[test]
    fn empty_store_has_nothing_to_back_up() {
        let dir = TempDir::new().unwrap();
        let mut store =
            JsonStore::open(dir.path().join("data.json"), dir.path().join("users.json")).unwrap();
        let dest = dir.path().join("x.zip");
        assert!(BackupLogic::backup(&mut store, &dest.to_string_lossy(), true, false).is_err());
    }
}
