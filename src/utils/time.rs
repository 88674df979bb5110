//! Time utilities: parsing HH:MM[:SS], second truncation, elapsed formatting.

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

/// Storage format for `time_in` / `time_out`.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Parse `HH:MM:SS`, falling back to `HH:MM` (older sheets had no seconds).
pub fn parse_time(t: &str) -> Option<NaiveTime> {
    let t = t.trim();
    NaiveTime::parse_from_str(t, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
        .ok()
}

pub fn format_time(t: NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// Drop sub-second precision so stored values round-trip exactly.
pub fn truncate_to_seconds<T: Timelike + Copy>(t: T) -> T {
    t.with_nanosecond(0).unwrap_or(t)
}

/// Wall-clock "now" in local time, second precision.
pub fn now() -> NaiveDateTime {
    truncate_to_seconds(Local::now().naive_local())
}

/// Render an elapsed duration as `HHh MMm`. Negative values clamp to zero.
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let mins = elapsed.num_minutes().max(0);
    format!("{:02}h {:02}m", mins / 60, mins % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_seconds() {
        assert_eq!(
            parse_time("10:45:23"),
            NaiveTime::from_hms_opt(10, 45, 23)
        );
        assert_eq!(parse_time(" 10:45 "), NaiveTime::from_hms_opt(10, 45, 0));
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_time("noon"), None);
    }

    #[test]
    fn truncation_drops_nanoseconds() {
        let t = NaiveTime::from_hms_nano_opt(9, 0, 1, 999_000_000).unwrap();
        assert_eq!(format_time(truncate_to_seconds(t)), "09:00:01");
    }

    #[test]
    fn elapsed_is_hours_and_minutes() {
        assert_eq!(format_elapsed(TimeDelta::seconds(2 * 3600 + 15 * 60 + 30)), "02h 15m");
        assert_eq!(format_elapsed(TimeDelta::zero()), "00h 00m");
        assert_eq!(format_elapsed(TimeDelta::minutes(-5)), "00h 00m");
    }
}
