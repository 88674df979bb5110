//! User-facing terminal messages.
//! Diagnostics go through `tracing`; these helpers are for the person at the
//! keyboard.

use crate::utils::colors::{BLUE, BOLD, GREEN, RED, RESET, YELLOW};
use std::fmt;
use std::io::{self, Write};

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

fn line(color: &str, icon: &str, msg: impl fmt::Display) -> String {
    format!("{}{}{} {}{}", color, BOLD, icon, RESET, msg)
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}", line(BLUE, ICON_INFO, msg));
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}", line(GREEN, ICON_OK, msg));
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}", line(YELLOW, ICON_WARN, msg));
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}", line(RED, ICON_ERR, msg));
}

/// Section header, e.g. the kiosk welcome banner.
pub fn header<T: fmt::Display>(msg: T) {
    println!("{}{}=========== {} ==========={}", BLUE, BOLD, msg, RESET);
}

/// Print a prompt without a trailing newline.
pub fn prompt<T: fmt::Display>(msg: T) {
    print!("{}{}{} ", BOLD, msg, RESET);
    io::stdout().flush().ok();
}
