use crate::config::Backend;
use crate::core::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for Chronophore
/// Sign-in/sign-out attendance tracker for a tutoring center
#[derive(Parser)]
#[command(
    name = "chronophore",
    version = env!("CARGO_PKG_VERSION"),
    about = "Sign-in/sign-out attendance tracker: type an ID, toggle its status, see who is here",
    long_about = None
)]
pub struct Cli {
    /// Create and use a separate store seeded with test users
    #[arg(global = true, long = "testdb")]
    pub testdb: bool,

    /// Override the SQLite database path
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the data directory (JSON sheets, debug log)
    #[arg(global = true, long = "data")]
    pub data: Option<String>,

    /// Override the configured storage backend
    #[arg(global = true, long = "backend", value_enum)]
    pub backend: Option<Backend>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the configuration file and the store
    Init,

    /// Sign a user in, or out if they are already signed in
    Sign {
        /// The user's ID
        user_id: String,
    },

    /// Show who is currently signed in
    Status,

    /// Interactive sign-in screen (Ctrl-D or `quit` to leave)
    Kiosk,

    /// Manage registered users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show or check the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Report fields missing from the configuration file")]
        check: bool,

        #[arg(long = "fix", requires = "check", help = "Add missing fields with default values")]
        fix: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Editor to use with --edit")]
        editor: Option<String>,
    },

    /// Print the internal audit log (SQLite backend)
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Create a backup copy of the store
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, help = "Write a .zip archive")]
        compress: bool,

        #[arg(long, short = 'f', help = "Overwrite an existing file without asking")]
        force: bool,
    },

    /// Export entries as CSV or JSON
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "YYYY, YYYY-MM, YYYY-MM-DD or start:end (default: everything)"
        )]
        range: Option<String>,

        #[arg(long, short = 'f', help = "Overwrite an existing file without asking")]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a new user
    Add {
        /// The user's ID
        user_id: String,

        #[arg(long = "first")]
        first_name: String,

        #[arg(long = "last")]
        last_name: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        major: String,

        /// tutor or student
        #[arg(long = "type", default_value = "student")]
        user_type: String,

        /// Enrollment date (YYYY-MM-DD, default: today)
        #[arg(long)]
        joined: Option<String>,

        #[arg(long = "education-plan")]
        education_plan: bool,
    },

    /// List registered users
    List,

    /// Record the date a user left (YYYY-MM-DD, default: today)
    Leave {
        user_id: String,

        #[arg(long)]
        date: Option<String>,
    },
}

impl Commands {
    /// Commands that show or change attendance run the startup sweep first.
    pub fn runs_startup_sweep(&self) -> bool {
        matches!(
            self,
            Commands::Sign { .. } | Commands::Status | Commands::Kiosk | Commands::Export { .. }
        )
    }
}
