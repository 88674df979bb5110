use crate::config::Config;
use crate::core::attendance::Attendance;
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::info;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let store = open_store(cfg)?;
    let names = Attendance::signed_in_names(store.as_ref(), cfg.full_user_names)?;

    if names.is_empty() {
        info("Nobody is signed in.");
        return Ok(());
    }

    println!("Currently signed in ({}):", names.len());
    for name in names {
        println!("  {}", name);
    }
    Ok(())
}
