//! Chronophore library root.
//! Exposes the CLI parser, the high-level run() function, and internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use tracing::debug;
use utils::path::expand_tilde;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cfg),
        Commands::Sign { .. } => cli::commands::sign::handle(&cli.command, cfg),
        Commands::Status => cli::commands::status::handle(cfg),
        Commands::Kiosk => cli::commands::kiosk::handle(cfg),
        Commands::User { action } => cli::commands::user::handle(action, cfg),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Backup { .. } => cli::commands::backup::handle(&cli.command, cfg),
        Commands::Export { .. } => cli::commands::export::handle(&cli.command, cfg),
    }
}

/// Apply the global command-line overrides on top of the loaded config.
pub fn apply_overrides(cli: &Cli, cfg: &mut Config) {
    if let Some(data) = &cli.data {
        cfg.data_dir = expand_tilde(data).to_string_lossy().to_string();
    }
    if let Some(db) = &cli.db {
        cfg.database = expand_tilde(db).to_string_lossy().to_string();
    }
    if let Some(backend) = cli.backend {
        cfg.backend = backend;
    }
    if cli.testdb {
        cfg.use_test_store();
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;
    apply_overrides(&cli, &mut cfg);

    let _guard = match logging::init(&cfg.log_file()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            ui::messages::warning(format!("Debug log disabled: {}", e));
            None
        }
    };

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        backend = ?cfg.backend,
        database = %cfg.database,
        data_dir = %cfg.data_dir,
        log_file = %cfg.log_file().display(),
        "chronophore starting"
    );

    if !matches!(cli.command, Commands::Config { .. }) {
        core::startup::prepare(&cfg, cli.testdb, cli.command.runs_startup_sweep())?;
    }

    dispatch(&cli, &cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Backend;

    #[test]
    fn overrides_apply_before_test_store() {
        let cli = Cli::parse_from([
            "chronophore",
            "--testdb",
            "--db",
            "/tmp/x/chronophore.sqlite",
            "--backend",
            "json",
            "status",
        ]);
        let mut cfg = Config::default();
        apply_overrides(&cli, &mut cfg);

        assert_eq!(cfg.database, "/tmp/x/test.sqlite");
        assert_eq!(cfg.backend, Backend::Json);
        assert!(cfg.test_store);
    }
}
