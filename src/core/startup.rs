//! Work done once per process, before any front end is shown.

use crate::config::Config;
use crate::core::attendance::Attendance;
use crate::core::fixtures::add_test_users;
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::{info, warning};
use crate::utils::date::today;
use tracing::debug;

/// Seed fixture users (`--testdb`) and run the auto-sign-out sweep.
pub fn prepare(cfg: &Config, seed_fixtures: bool, sweep: bool) -> AppResult<()> {
    let sweep = sweep && cfg.auto_sign_out;
    if !seed_fixtures && !sweep {
        return Ok(());
    }

    let mut store = open_store(cfg)?;

    if seed_fixtures {
        let added = add_test_users(store.as_mut())?;
        if added > 0 {
            info(format!("Test store: added {} fixture users.", added));
        }
    }

    if sweep {
        let fallback = cfg.auto_sign_out_at()?;
        let closed = Attendance::auto_sign_out(store.as_mut(), today(), fallback)?;
        for e in &closed {
            warning(format!(
                "{} was still signed in from {}; signed out automatically.",
                e.user_id,
                e.date_str()
            ));
        }
        debug!(closed = closed.len(), "auto sign-out sweep done");
    }

    Ok(())
}
