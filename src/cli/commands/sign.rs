use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::attendance::{Attendance, UserIdFormat};
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::success;
use crate::utils::time::now;

/// Toggle one user and print the outcome.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sign { user_id } = cmd {
        let format = UserIdFormat::new(&cfg.user_id_pattern)?;
        let mut store = open_store(cfg)?;

        let status = Attendance::sign(store.as_mut(), &format, user_id, now(), cfg.full_user_names)?;
        success(status);
    }

    Ok(())
}
