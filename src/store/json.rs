//! Flat-file store made of two JSON documents:
//!
//! - the sheet (`data.json`): entry uuid → `{date, time_in, time_out, user_id}`
//! - the registry (`users.json`): user id → user fields
//!
//! A file that cannot be decoded is moved aside with a `.bak` extension and
//! loading continues from an empty document. Saves go through a temporary
//! file in the same directory followed by a rename.

use super::Store;
use crate::errors::{AppError, AppResult};
use crate::models::entry::Entry;
use crate::models::user::User;
use crate::models::user_type::UserType;
use crate::utils::date::{format_date, parse_date};
use crate::utils::time::{format_time, parse_time};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
struct EntryDoc {
    date: String,
    time_in: String,
    time_out: Option<String>,
    user_id: String,
}

impl EntryDoc {
    fn from_entry(e: &Entry) -> Self {
        Self {
            date: e.date_str(),
            time_in: e.time_in_str(),
            time_out: e.time_out_str(),
            user_id: e.user_id.clone(),
        }
    }

    fn into_entry(self, uuid: String) -> AppResult<Entry> {
        let time_out = match self.time_out {
            Some(t) => Some(parse_time(&t).ok_or(AppError::InvalidTime(t))?),
            None => None,
        };

        Ok(Entry {
            date: parse_date(&self.date).ok_or(AppError::InvalidDate(self.date))?,
            time_in: parse_time(&self.time_in).ok_or(AppError::InvalidTime(self.time_in))?,
            time_out,
            user_id: self.user_id,
            uuid,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UserDoc {
    date_joined: String,
    date_left: Option<String>,
    education_plan: bool,
    email: String,
    first_name: String,
    forgot_sign_out: bool,
    last_name: String,
    major: String,
    user_type: String,
}

impl UserDoc {
    fn from_user(u: &User) -> Self {
        Self {
            date_joined: format_date(u.date_joined),
            date_left: u.date_left.map(format_date),
            education_plan: u.education_plan,
            email: u.email.clone(),
            first_name: u.first_name.clone(),
            forgot_sign_out: u.forgot_sign_out,
            last_name: u.last_name.clone(),
            major: u.major.clone(),
            user_type: u.user_type.to_db_str().to_string(),
        }
    }

    fn into_user(self, user_id: String) -> AppResult<User> {
        let date_left = match self.date_left {
            Some(d) => Some(parse_date(&d).ok_or(AppError::InvalidDate(d))?),
            None => None,
        };

        Ok(User {
            user_type: UserType::from_db_str(&self.user_type)
                .ok_or(AppError::InvalidUserType(self.user_type))?,
            date_joined: parse_date(&self.date_joined)
                .ok_or(AppError::InvalidDate(self.date_joined))?,
            date_left,
            education_plan: self.education_plan,
            email: self.email,
            first_name: self.first_name,
            forgot_sign_out: self.forgot_sign_out,
            last_name: self.last_name,
            major: self.major,
            user_id,
        })
    }
}

fn decode_sheet(bytes: &[u8]) -> AppResult<BTreeMap<String, Entry>> {
    let doc: BTreeMap<String, EntryDoc> = serde_json::from_slice(bytes)?;
    doc.into_iter()
        .map(|(uuid, d)| {
            let entry = d.into_entry(uuid.clone())?;
            Ok((uuid, entry))
        })
        .collect()
}

fn decode_users(bytes: &[u8]) -> AppResult<BTreeMap<String, User>> {
    let doc: BTreeMap<String, UserDoc> = serde_json::from_slice(bytes)?;
    doc.into_iter()
        .map(|(id, d)| {
            let user = d.into_user(id.clone())?;
            Ok((id, user))
        })
        .collect()
}

/// Where a corrupt document is moved: same name with a `.bak` extension,
/// or `<stem>.<n>.bak` when earlier backups already exist.
pub fn backup_path(path: &Path) -> PathBuf {
    let first = path.with_extension("bak");
    if !first.exists() {
        return first;
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "sheet".to_string());

    (1..)
        .map(|n| path.with_file_name(format!("{}.{}.bak", stem, n)))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// Read and decode `path`.
///
/// - missing file → empty document
/// - undecodable file → renamed to [`backup_path`], empty document
fn load_or_recover<T: Default>(path: &Path, decode: fn(&[u8]) -> AppResult<T>) -> AppResult<T> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(file = %path.display(), "no sheet yet, starting empty");
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };

    match decode(&bytes) {
        Ok(doc) => Ok(doc),
        Err(err) => {
            let backup = backup_path(path);
            fs::rename(path, &backup)?;
            warn!(
                file = %path.display(),
                backup = %backup.display(),
                error = %err,
                "unreadable sheet moved aside, starting empty"
            );
            Ok(T::default())
        }
    }
}

/// Write `bytes` to a sibling temp file, flush it to disk, then rename it
/// over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> AppResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "sheet".to_string());
    let tmp = path.with_file_name(format!(".{}.tmp", name));

    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

pub struct JsonStore {
    data_file: PathBuf,
    users_file: PathBuf,
    sheet: BTreeMap<String, Entry>,
    users: BTreeMap<String, User>,
    /// UUIDs of open entries, kept in step with `sheet`.
    signed_in: Vec<String>,
}

impl JsonStore {
    pub fn open(data_file: PathBuf, users_file: PathBuf) -> AppResult<Self> {
        let sheet = load_or_recover(&data_file, decode_sheet)?;
        let users = load_or_recover(&users_file, decode_users)?;

        let mut store = Self {
            data_file,
            users_file,
            sheet,
            users,
            signed_in: Vec::new(),
        };
        store.refresh_signed_in();
        debug!(
            entries = store.sheet.len(),
            users = store.users.len(),
            signed_in = store.signed_in.len(),
            "json sheets loaded"
        );
        Ok(store)
    }

    /// UUIDs of the currently open entries.
    pub fn signed_in(&self) -> &[String] {
        &self.signed_in
    }

    pub fn len(&self) -> usize {
        self.sheet.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheet.is_empty()
    }

    fn refresh_signed_in(&mut self) {
        self.signed_in = self
            .sheet
            .values()
            .filter(|e| e.is_open())
            .map(|e| e.uuid.clone())
            .collect();
    }

    pub fn save_sheet(&self) -> AppResult<()> {
        let doc: BTreeMap<&str, EntryDoc> = self
            .sheet
            .iter()
            .map(|(k, e)| (k.as_str(), EntryDoc::from_entry(e)))
            .collect();
        write_atomic(&self.data_file, &serde_json::to_vec_pretty(&doc)?)
    }

    pub fn save_users(&self) -> AppResult<()> {
        let doc: BTreeMap<&str, UserDoc> = self
            .users
            .iter()
            .map(|(k, u)| (k.as_str(), UserDoc::from_user(u)))
            .collect();
        write_atomic(&self.users_file, &serde_json::to_vec_pretty(&doc)?)
    }

    /// Put `entry` in the sheet and persist; on a failed save the previous
    /// state is restored so memory never runs ahead of disk.
    fn put_entry(&mut self, entry: &Entry) -> AppResult<()> {
        let previous = self.sheet.insert(entry.uuid.clone(), entry.clone());
        self.refresh_signed_in();

        if let Err(e) = self.save_sheet() {
            match previous {
                Some(p) => self.sheet.insert(p.uuid.clone(), p),
                None => self.sheet.remove(&entry.uuid),
            };
            self.refresh_signed_in();
            return Err(e);
        }
        Ok(())
    }

    fn put_user(&mut self, user: &User) -> AppResult<()> {
        let previous = self.users.insert(user.user_id.clone(), user.clone());

        if let Err(e) = self.save_users() {
            match previous {
                Some(p) => self.users.insert(p.user_id.clone(), p),
                None => self.users.remove(&user.user_id),
            };
            return Err(e);
        }
        Ok(())
    }
}

impl Store for JsonStore {
    fn user(&self, user_id: &str) -> AppResult<Option<User>> {
        Ok(self.users.get(user_id).cloned())
    }

    fn users(&self) -> AppResult<Vec<User>> {
        let mut out: Vec<User> = self.users.values().cloned().collect();
        out.sort_by(|a, b| {
            (&a.last_name, &a.first_name, &a.user_id).cmp(&(&b.last_name, &b.first_name, &b.user_id))
        });
        Ok(out)
    }

    fn add_user(&mut self, user: &User) -> AppResult<()> {
        if self.users.contains_key(&user.user_id) {
            return Err(AppError::DuplicateUser(user.user_id.clone()));
        }
        self.put_user(user)
    }

    fn update_user(&mut self, user: &User) -> AppResult<()> {
        if !self.users.contains_key(&user.user_id) {
            return Err(AppError::UserNotFound(user.user_id.clone()));
        }
        self.put_user(user)
    }

    fn entry(&self, uuid: &str) -> AppResult<Option<Entry>> {
        Ok(self.sheet.get(uuid).cloned())
    }

    fn add_entry(&mut self, entry: &Entry) -> AppResult<()> {
        if self.sheet.contains_key(&entry.uuid) {
            return Err(AppError::Store(format!("duplicate entry {}", entry.uuid)));
        }
        if !self.users.contains_key(&entry.user_id) {
            return Err(AppError::UserNotFound(entry.user_id.clone()));
        }
        if entry.is_open() && self.open_entry_for(&entry.user_id)?.is_some() {
            return Err(AppError::Store(format!(
                "user {} already has an open entry",
                entry.user_id
            )));
        }
        self.put_entry(entry)
    }

    fn update_entry(&mut self, entry: &Entry) -> AppResult<()> {
        if !self.sheet.contains_key(&entry.uuid) {
            return Err(AppError::EntryNotFound(entry.uuid.clone()));
        }
        self.put_entry(entry)
    }

    fn open_entries(&self) -> AppResult<Vec<Entry>> {
        let mut out: Vec<Entry> = self
            .signed_in
            .iter()
            .filter_map(|uuid| self.sheet.get(uuid))
            .cloned()
            .collect();
        out.sort_by_key(|e| (e.date, e.time_in));
        Ok(out)
    }

    fn entries_between(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<Entry>> {
        let mut out: Vec<Entry> = self
            .sheet
            .values()
            .filter(|e| e.date >= from && e.date <= to)
            .cloned()
            .collect();
        out.sort_by_key(|e| (e.date, e.time_in));
        Ok(out)
    }

    fn files(&self) -> Vec<PathBuf> {
        vec![self.data_file.clone(), self.users_file.clone()]
    }

    fn describe(&self) -> String {
        format!(
            "json:{} (users: {})",
            self.data_file.display(),
            self.users_file.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use tempfile::TempDir;

    const SHEET: &str = r#"{
        "2ed2be60-693a-44fe-adc1-2803a674ec9b": {
            "date": "2016-02-17", "time_in": "10:45", "time_out": null, "user_id": "885894966"
        },
        "1f4f10a4-b0c6-43bf-94f4-9ce6e3e204d2": {
            "date": "2016-02-17", "time_in": "10:45", "time_out": "13:30", "user_id": "889870966"
        },
        "7b4ae0fc-3801-4412-998f-ace14829d150": {
            "date": "2016-02-17", "time_in": "12:45:09", "time_out": "16:44:56", "user_id": "889870966"
        }
    }"#;

    fn paths(dir: &TempDir) -> (PathBuf, PathBuf) {
        (dir.path().join("data.json"), dir.path().join("users.json"))
    }

    fn user(id: &str, first: &str, last: &str) -> User {
        User {
            user_id: id.into(),
            first_name: first.into(),
            last_name: last.into(),
            email: String::new(),
            major: String::new(),
            user_type: UserType::Student,
            date_joined: NaiveDate::from_ymd_opt(2015, 2, 16).unwrap(),
            date_left: None,
            education_plan: false,
            forgot_sign_out: false,
        }
    }

    #[test]
    fn missing_files_mean_empty_store() {
        let dir = TempDir::new().unwrap();
        let (data, users) = paths(&dir);
        let store = JsonStore::open(data.clone(), users).unwrap();

        assert!(store.is_empty());
        assert!(store.signed_in().is_empty());
        assert!(!data.exists());
    }

    #[test]
    fn loads_legacy_sheet_and_finds_signed_in() {
        let dir = TempDir::new().unwrap();
        let (data, users) = paths(&dir);
        fs::write(&data, SHEET).unwrap();

        let store = JsonStore::open(data, users).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.signed_in(), ["2ed2be60-693a-44fe-adc1-2803a674ec9b"]);

        let e = store
            .entry("1f4f10a4-b0c6-43bf-94f4-9ce6e3e204d2")
            .unwrap()
            .unwrap();
        assert_eq!(e.user_id, "889870966");
        assert_eq!(e.time_out, NaiveTime::from_hms_opt(13, 30, 0));
    }

    #[test]
    fn corrupt_sheet_is_moved_aside() {
        let dir = TempDir::new().unwrap();
        let (data, users) = paths(&dir);
        fs::write(&data, "this is invalid").unwrap();

        let store = JsonStore::open(data.clone(), users).unwrap();

        let backup = dir.path().join("data.bak");
        assert!(store.is_empty());
        assert!(!data.exists());
        assert_eq!(fs::read_to_string(backup).unwrap(), "this is invalid");
    }

    #[test]
    fn repeated_corruption_keeps_every_backup() {
        let dir = TempDir::new().unwrap();
        let (data, users) = paths(&dir);

        fs::write(&data, "first corrupt sheet").unwrap();
        JsonStore::open(data.clone(), users.clone()).unwrap();
        fs::write(&data, "second corrupt sheet").unwrap();
        JsonStore::open(data.clone(), users.clone()).unwrap();
        fs::write(&data, "third corrupt sheet").unwrap();
        JsonStore::open(data, users).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("data.bak")).unwrap(),
            "first corrupt sheet"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("data.1.bak")).unwrap(),
            "second corrupt sheet"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("data.2.bak")).unwrap(),
            "third corrupt sheet"
        );
    }

    #[test]
    fn well_formed_json_with_bad_fields_is_also_moved_aside() {
        let dir = TempDir::new().unwrap();
        let (data, users) = paths(&dir);
        fs::write(&users, r#"{"1": {"first_name": "Sam"}}"#).unwrap();

        let store = JsonStore::open(data, users.clone()).unwrap();
        assert!(store.users().unwrap().is_empty());
        assert!(!users.exists());
        assert!(dir.path().join("users.bak").exists());
    }

    #[test]
    fn save_then_load_reproduces_records() {
        let dir = TempDir::new().unwrap();
        let (data, users) = paths(&dir);

        let mut store = JsonStore::open(data.clone(), users.clone()).unwrap();
        let mut merry = user("888222222", "Merry", "Brandybuck");
        merry.date_left = NaiveDate::from_ymd_opt(2016, 3, 24);
        merry.forgot_sign_out = true;
        store.add_user(&merry).unwrap();
        store.add_user(&user("888333333", "Pippin", "Took")).unwrap();

        let at = NaiveDate::from_ymd_opt(2016, 2, 17)
            .unwrap()
            .and_hms_opt(10, 45, 48)
            .unwrap();
        let mut closed = Entry::sign_in("888222222", at);
        closed.time_out = NaiveTime::from_hms_opt(13, 30, 18);
        let open = Entry::sign_in("888333333", at);
        store.add_entry(&closed).unwrap();
        store.add_entry(&open).unwrap();

        let reloaded = JsonStore::open(data, users).unwrap();
        assert_eq!(reloaded.users().unwrap(), store.users().unwrap());
        assert_eq!(reloaded.sheet, store.sheet);
        assert_eq!(reloaded.signed_in(), [open.uuid.as_str()]);
        assert!(!dir.path().join(".data.json.tmp").exists());
    }

    #[test]
    fn signed_in_list_follows_writes() {
        let dir = TempDir::new().unwrap();
        let (data, users) = paths(&dir);
        let mut store = JsonStore::open(data, users).unwrap();
        store.add_user(&user("888000000", "Frodo", "Baggins")).unwrap();

        let at = NaiveDate::from_ymd_opt(2016, 2, 17)
            .unwrap()
            .and_hms_opt(10, 45, 0)
            .unwrap();
        let mut e = Entry::sign_in("888000000", at);
        store.add_entry(&e).unwrap();
        assert_eq!(store.signed_in(), [e.uuid.as_str()]);

        e.sign_out(at + chrono::TimeDelta::hours(1));
        store.update_entry(&e).unwrap();
        assert!(store.signed_in().is_empty());
    }

    #[test]
    fn second_open_entry_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (data, users) = paths(&dir);
        let mut store = JsonStore::open(data, users).unwrap();
        store.add_user(&user("888000000", "Frodo", "Baggins")).unwrap();

        let at = NaiveDate::from_ymd_opt(2016, 2, 17)
            .unwrap()
            .and_hms_opt(10, 45, 0)
            .unwrap();
        store.add_entry(&Entry::sign_in("888000000", at)).unwrap();
        assert!(store.add_entry(&Entry::sign_in("888000000", at)).is_err());
        assert_eq!(store.open_entries().unwrap().len(), 1);
    }

    #[test]
    fn entries_for_unknown_users_are_rejected() {
        let dir = TempDir::new().unwrap();
        let (data, users) = paths(&dir);
        let mut store = JsonStore::open(data, users).unwrap();
        let at = NaiveDate::from_ymd_opt(2016, 2, 17)
            .unwrap()
            .and_hms_opt(10, 45, 0)
            .unwrap();
        assert!(matches!(
            store.add_entry(&Entry::sign_in("888999999", at)),
            Err(AppError::UserNotFound(_))
        ));
    }
}
