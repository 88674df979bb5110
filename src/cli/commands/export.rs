use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::export::ExportLogic;
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        range,
        force,
    } = cmd
    {
        let store = open_store(cfg)?;
        let n = ExportLogic::export(
            store.as_ref(),
            *format,
            file,
            range.as_deref(),
            *force,
            cfg.full_user_names,
        )?;
        success(format!("Exported {} entries to {}", n, file));
    }

    Ok(())
}
