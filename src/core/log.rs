use crate::errors::AppResult;
use crate::models::audit::AuditRecord;
use crate::store::Store;
use crate::ui::messages::info;
use crate::utils::colors::{BLUE, CYAN, GREEN, MAGENTA, RED, RESET, YELLOW};

const MAX_OP_WIDTH: usize = 60;

/// ANSI color for an audit operation.
fn color_for_operation(op: &str) -> &'static str {
    match op {
        "sign_in" => GREEN,
        "sign_out" => RED,
        "auto_sign_out" => YELLOW,
        "migration_applied" => MAGENTA,
        "backup" => BLUE,
        "init" => CYAN,
        _ => RESET,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
        out.push_str("...");
        out
    } else {
        s.to_string()
    }
}

pub struct LogLogic;

impl LogLogic {
    /// Render audit records as aligned lines, operation in color.
    pub fn render(records: &[AuditRecord]) -> String {
        let rows: Vec<(String, String, &AuditRecord)> = records
            .iter()
            .map(|r| {
                let date = chrono::DateTime::parse_from_rfc3339(&r.date)
                    .map(|dt| dt.format("%F %T").to_string())
                    .unwrap_or_else(|_| r.date.clone());
                let op_target = if r.target.is_empty() {
                    r.operation.clone()
                } else {
                    format!("{} ({})", r.operation, r.target)
                };
                (date, truncate(&op_target, MAX_OP_WIDTH), r)
            })
            .collect();

        let id_w = records.iter().map(|r| r.id.to_string().len()).max().unwrap_or(1);
        let date_w = rows.iter().map(|(d, _, _)| d.len()).max().unwrap_or(10);
        let op_w = rows
            .iter()
            .map(|(_, o, _)| o.chars().count())
            .max()
            .unwrap_or(10);

        let mut out = String::new();
        for (date, op_target, r) in rows {
            // color only the operation word, pad on the visible width
            let (op, rest) = op_target
                .split_once(' ')
                .map(|(a, b)| (a.to_string(), format!(" {}", b)))
                .unwrap_or_else(|| (op_target.clone(), String::new()));
            let padding = " ".repeat(op_w.saturating_sub(op_target.chars().count()));

            out.push_str(&format!(
                "{:>id_w$}: {:<date_w$} | {}{}{}{}{} => {}\n",
                r.id,
                date,
                color_for_operation(&r.operation),
                op,
                RESET,
                rest,
                padding,
                r.message,
                id_w = id_w,
                date_w = date_w
            ));
        }
        out
    }

    pub fn print_log(store: &dyn Store) -> AppResult<()> {
        let records = store.audit_log()?;

        if records.is_empty() {
            info(format!("No audit log entries in {}.", store.describe()));
            return Ok(());
        }

        println!("📜 Internal log:\n");
        print!("{}", Self::render(&records));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: i64, op: &str, target: &str, msg: &str) -> AuditRecord {
        AuditRecord {
            id,
            date: "2016-02-17T10:45:23+01:00".into(),
            operation: op.into(),
            target: target.into(),
            message: msg.into(),
        }
    }

    #[test]
    fn renders_one_line_per_record() {
        let out = LogLogic::render(&[
            rec(1, "init", "", "Store initialized"),
            rec(12, "sign_in", "888333333", "Signed in: Pippin Took"),
        ]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1: 2016-02-17 10:45:23 | "));
        assert!(lines[1].contains("(888333333)"));
        assert!(lines[1].ends_with("=> Signed in: Pippin Took"));
        assert!(lines[1].contains(GREEN));
    }

    #[test]
    fn long_targets_are_truncated() {
        let long = "x".repeat(100);
        let out = LogLogic::render(&[rec(1, "backup", &long, "Backup created")]);
        assert!(out.contains("..."));
        assert!(!out.contains(&long));
    }

    #[test]
    fn non_rfc3339_dates_are_kept_verbatim() {
        let mut r = rec(1, "migration_applied", "v1", "done");
        r.date = "2016-02-17 09:00:00".into();
        assert!(LogLogic::render(&[r]).contains("2016-02-17 09:00:00"));
    }
}
