use crate::config::{Backend, Config};
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::{info, success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped for `--testdb`)
///  - the data directory
///  - the configured store, with its schema
pub fn handle(cfg: &Config) -> AppResult<()> {
    info("Initializing Chronophore…");

    if cfg.test_store {
        info("Test store: configuration file left untouched.");
    } else if Config::config_file().exists() {
        info(format!(
            "Config file already exists: {}",
            Config::config_file().display()
        ));
    } else {
        cfg.save()?;
        success(format!("Config file: {}", Config::config_file().display()));
    }

    std::fs::create_dir_all(cfg.data_dir())?;

    let mut store = open_store(cfg)?;
    let location = store.describe();

    if let Err(e) = store.audit("init", "", &format!("Store initialized at {}", location)) {
        warning(format!("Failed to write internal log: {}", e));
    }

    match cfg.backend {
        Backend::Sqlite => success(format!("Database: {}", cfg.database)),
        Backend::Json => success(format!(
            "Sheets: {} / {}",
            cfg.data_file().display(),
            cfg.users_file().display()
        )),
    }

    success("Chronophore initialization completed!");
    Ok(())
}
