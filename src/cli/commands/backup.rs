use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::BackupLogic;
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Backup {
        file,
        compress,
        force,
    } = cmd
    {
        let mut store = open_store(cfg)?;
        let written = BackupLogic::backup(store.as_mut(), file, *compress, *force)?;
        success(format!("Backup created: {}", written.display()));
    }

    Ok(())
}
