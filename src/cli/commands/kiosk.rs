//! Interactive sign-in screen.
//!
//! Each round redraws the banner, the list of who is signed in and the
//! outcome of the previous ID, then waits for the next line on stdin.

use crate::config::Config;
use crate::core::attendance::{Attendance, UserIdFormat};
use crate::errors::AppResult;
use crate::store::{Store, open_store};
use crate::ui::messages::{header, info, prompt, success, warning};
use crate::utils::time::now;
use std::io::{self, BufRead, IsTerminal};
use tracing::{debug, error as log_error};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const GENERIC_FAILURE: &str = "Something went wrong. Please try again or ask for help.";

enum Feedback {
    None,
    Ok(String),
    Failed(String),
}

fn redraw(store: &dyn Store, cfg: &Config, feedback: &Feedback) {
    if io::stdout().is_terminal() {
        print!("{}", CLEAR_SCREEN);
    }

    header(&cfg.welcome_label);

    match Attendance::signed_in_names(store, cfg.full_user_names) {
        Ok(names) if names.is_empty() => info("Nobody is signed in."),
        Ok(names) => {
            println!("Signed in ({}):", names.len());
            for name in &names {
                println!("  {}", name);
            }
        }
        Err(e) => {
            log_error!("cannot list signed-in users: {}", e);
            warning("Could not load the list of signed-in users.");
        }
    }
    println!();

    match feedback {
        Feedback::None => {}
        Feedback::Ok(msg) => success(msg),
        Feedback::Failed(msg) => warning(msg),
    }

    prompt("Enter Student ID:");
}

/// Run the kiosk loop over `input` until EOF or `quit`.
pub fn run<R: BufRead>(mut input: R, store: &mut dyn Store, cfg: &Config) -> AppResult<()> {
    let format = UserIdFormat::new(&cfg.user_id_pattern)?;
    let mut feedback = Feedback::None;
    let mut buf = Vec::new();

    loop {
        redraw(store, cfg, &feedback);

        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log_error!("cannot read kiosk input: {}", e);
                return Err(e.into());
            }
        }

        let line = String::from_utf8_lossy(&buf);
        let id = line.trim();

        if id.is_empty() {
            continue;
        }
        if id.eq_ignore_ascii_case("quit") {
            break;
        }

        feedback = match Attendance::sign(store, &format, id, now(), cfg.full_user_names) {
            Ok(status) => Feedback::Ok(status.to_string()),
            Err(e) if e.is_user_facing() => {
                debug!(input = id, "rejected: {}", e);
                Feedback::Failed(e.to_string())
            }
            Err(e) => {
                log_error!(input = id, "sign failed: {}", e);
                Feedback::Failed(GENERIC_FAILURE.into())
            }
        };
    }

    debug!("kiosk closed");
    Ok(())
}

pub fn handle(cfg: &Config) -> AppResult<()> {
    let mut store = open_store(cfg)?;
    let stdin = io::stdin();
    run(stdin.lock(), store.as_mut(), cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::add_test_users;
    use crate::store::sqlite::SqliteStore;
    use std::io::Cursor;

    fn store() -> SqliteStore {
        let mut s = SqliteStore::in_memory().unwrap();
        add_test_users(&mut s).unwrap();
        s
    }

    #[test]
    fn each_line_toggles_and_bad_input_keeps_going() {
        let mut s = store();
        let input = Cursor::new("888333333\n\nnot-an-id\n888999999\n888000000\n888333333\n");

        run(input, &mut s, &Config::default()).unwrap();

        let open: Vec<String> = s.open_entries().unwrap().into_iter().map(|e| e.user_id).collect();
        assert_eq!(open, vec!["888000000"]);
    }

    #[test]
    fn undecodable_line_does_not_end_the_session() {
        let mut s = store();
        let input = Cursor::new(b"\xff\xfe\n888333333\n".to_vec());

        run(input, &mut s, &Config::default()).unwrap();

        let open: Vec<String> = s.open_entries().unwrap().into_iter().map(|e| e.user_id).collect();
        assert_eq!(open, vec!["888333333"]);
    }

    #[test]
    fn quit_stops_reading() {
        let mut s = store();
        let input = Cursor::new("quit\n888333333\n");

        run(input, &mut s, &Config::default()).unwrap();

        assert!(s.open_entries().unwrap().is_empty());
    }
}
