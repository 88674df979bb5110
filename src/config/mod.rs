use crate::errors::{AppError, AppResult};
use crate::utils::time::parse_time;
use chrono::NaiveTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

pub mod check;

/// Which store backs the attendance data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_database")]
    pub database: String,
    /// Directory for the JSON sheets and the debug log.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_true")]
    pub full_user_names: bool,
    #[serde(default = "default_user_id_pattern")]
    pub user_id_pattern: String,
    #[serde(default = "default_true")]
    pub auto_sign_out: bool,
    /// Time-of-day recorded as `time_out` for entries left open overnight.
    #[serde(default = "default_auto_sign_out_time")]
    pub auto_sign_out_time: String,
    #[serde(default = "default_welcome_label")]
    pub welcome_label: String,

    /// Set by `--testdb`; never persisted.
    #[serde(skip)]
    pub test_store: bool,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_data_dir() -> String {
    Config::config_dir().to_string_lossy().to_string()
}
fn default_true() -> bool {
    true
}
fn default_user_id_pattern() -> String {
    r"^\d{9}$".to_string()
}
fn default_auto_sign_out_time() -> String {
    "23:59:59".to_string()
}
fn default_welcome_label() -> String {
    "Welcome to the Tutoring Center".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            database: default_database(),
            data_dir: default_data_dir(),
            full_user_names: default_true(),
            user_id_pattern: default_user_id_pattern(),
            auto_sign_out: default_true(),
            auto_sign_out_time: default_auto_sign_out_time(),
            welcome_label: default_welcome_label(),
            test_store: false,
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("chronophore")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".chronophore")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("chronophore.conf")
    }

    /// Return the full path of the default SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("chronophore.sqlite")
    }

    /// Load configuration from file, or return defaults if not found.
    /// Fields missing from the file take their default values.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write this configuration to the config file, creating the directory.
    pub fn save(&self) -> AppResult<()> {
        fs::create_dir_all(Self::config_dir())?;
        fs::write(Self::config_file(), serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Switch every store path to its test variant.
    ///
    /// The SQLite file becomes `test.sqlite` next to the configured database,
    /// the JSON sheets become `test-data.json` / `test-users.json`.
    pub fn use_test_store(&mut self) {
        self.test_store = true;
        self.database = PathBuf::from(&self.database)
            .with_file_name("test.sqlite")
            .to_string_lossy()
            .to_string();
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Entry sheet for the JSON backend.
    pub fn data_file(&self) -> PathBuf {
        let name = if self.test_store {
            "test-data.json"
        } else {
            "data.json"
        };
        self.data_dir().join(name)
    }

    /// User registry for the JSON backend.
    pub fn users_file(&self) -> PathBuf {
        let name = if self.test_store {
            "test-users.json"
        } else {
            "users.json"
        };
        self.data_dir().join(name)
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir().join("debug.log")
    }

    /// Parsed `auto_sign_out_time`.
    pub fn auto_sign_out_at(&self) -> AppResult<NaiveTime> {
        parse_time(&self.auto_sign_out_time).ok_or_else(|| {
            AppError::Config(format!(
                "auto_sign_out_time '{}' is not a valid HH:MM[:SS] time",
                self.auto_sign_out_time
            ))
        })
    }
}
