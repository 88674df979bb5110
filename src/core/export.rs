//! Timesheet export: one row per entry, with the owner's name and the
//! minutes spent signed in.

use crate::errors::{AppError, AppResult};
use crate::store::Store;
use crate::utils::date::period_bounds;
use crate::utils::path::{ensure_writable, expand_tilde};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub date: String,
    pub user_id: String,
    pub name: String,
    pub user_type: String,
    pub time_in: String,
    pub time_out: Option<String>,
    pub minutes: Option<i64>,
}

const HEADERS: [&str; 7] = [
    "date", "user_id", "name", "user_type", "time_in", "time_out", "minutes",
];

pub struct ExportLogic;

impl ExportLogic {
    /// Build the rows for `range` (see `period_bounds`), or for every entry.
    pub fn rows(store: &dyn Store, range: Option<&str>, full_name: bool) -> AppResult<Vec<ExportRow>> {
        let (from, to) = match range {
            Some(r) => period_bounds(r).map_err(AppError::InvalidDate)?,
            None => (
                NaiveDate::from_ymd_opt(1, 1, 1).ok_or_else(|| AppError::Other("date bounds".into()))?,
                NaiveDate::from_ymd_opt(9999, 12, 31)
                    .ok_or_else(|| AppError::Other("date bounds".into()))?,
            ),
        };

        let mut rows = Vec::new();
        for e in store.entries_between(from, to)? {
            let user = store.user(&e.user_id)?;
            rows.push(ExportRow {
                date: e.date_str(),
                user_id: e.user_id.clone(),
                name: user
                    .as_ref()
                    .map(|u| u.display_name(full_name))
                    .unwrap_or_default(),
                user_type: user
                    .as_ref()
                    .map(|u| u.user_type.to_string())
                    .unwrap_or_default(),
                time_in: e.time_in_str(),
                time_out: e.time_out_str(),
                minutes: e.duration().map(|d| d.num_minutes()),
            });
        }
        Ok(rows)
    }

    /// Write the rows to `file`. Returns the number of rows written.
    pub fn export(
        store: &dyn Store,
        format: ExportFormat,
        file: &str,
        range: Option<&str>,
        force: bool,
        full_name: bool,
    ) -> AppResult<usize> {
        let rows = Self::rows(store, range, full_name)?;
        let path: PathBuf = expand_tilde(file);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        ensure_writable(&path, force)?;

        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_path(&path)?;
                if rows.is_empty() {
                    wtr.write_record(HEADERS)?;
                }
                for r in &rows {
                    wtr.serialize(r)?;
                }
                wtr.flush()?;
            }
            ExportFormat::Json => {
                let f = fs::File::create(&path)?;
                serde_json::to_writer_pretty(f, &rows)?;
            }
        }

        info!(file = %path.display(), rows = rows.len(), ?format, "export written");
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::add_test_users;
    use crate::models::entry::Entry;
    use crate::store::sqlite::SqliteStore;
    use chrono::NaiveTime;
    use tempfile::TempDir;

    fn store_with_entries() -> SqliteStore {
        let mut store = SqliteStore::in_memory().unwrap();
        add_test_users(&mut store).unwrap();

        let day = |d: u32, h: u32| {
            NaiveDate::from_ymd_opt(2016, 2, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
        };

        let mut closed = Entry::sign_in("888111111", day(17, 12));
        closed.time_out = NaiveTime::from_hms_opt(16, 45, 0);
        store.add_entry(&closed).unwrap();
        store.add_entry(&Entry::sign_in("888333333", day(17, 10))).unwrap();
        let mut march = Entry::sign_in("888000000", day(29, 9));
        march.time_out = NaiveTime::from_hms_opt(10, 0, 0);
        store.add_entry(&march).unwrap();
        store
    }

    #[test]
    fn rows_carry_names_and_minutes() {
        let store = store_with_entries();
        let rows = ExportLogic::rows(&store, Some("2016-02-17"), true).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Pippin Took");
        assert_eq!(rows[0].time_out, None);
        assert_eq!(rows[0].minutes, None);
        assert_eq!(rows[1].name, "Sam Gamgee");
        assert_eq!(rows[1].user_type, "Student");
        assert_eq!(rows[1].minutes, Some(4 * 60 + 45));
    }

    #[test]
    fn no_range_means_everything() {
        let store = store_with_entries();
        assert_eq!(ExportLogic::rows(&store, None, true).unwrap().len(), 3);
    }

    #[test]
    fn csv_has_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("feb.csv");
        let store = store_with_entries();

        let n = ExportLogic::export(
            &store,
            ExportFormat::Csv,
            &out.to_string_lossy(),
            Some("2016-02"),
            false,
            true,
        )
        .unwrap();

        assert_eq!(n, 3);
        let text = fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADERS.join(",").as_str()));
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn empty_csv_still_has_header() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("empty.csv");
        let store = store_with_entries();

        ExportLogic::export(&store, ExportFormat::Csv, &out.to_string_lossy(), Some("2015"), false, true)
            .unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap().trim(), HEADERS.join(","));
    }

    #[test]
    fn json_is_an_array_of_rows() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("all.json");
        let store = store_with_entries();

        ExportLogic::export(&store, ExportFormat::Json, &out.to_string_lossy(), None, false, false)
            .unwrap();
        let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(v.as_array().map(Vec::len), Some(3));
        assert_eq!(v[0]["name"], "Pippin");
    }

    #[test]
    fn invalid_range_is_rejected() {
        let store = store_with_entries();
        assert!(matches!(
            ExportLogic::rows(&store, Some("someday"), true),
            Err(AppError::InvalidDate(_))
        ));
    }
}
