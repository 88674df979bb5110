use crate::utils::date::format_date;
use crate::utils::time::{format_time, truncate_to_seconds};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use uuid::Uuid;

/// One sign-in/sign-out record.
///
/// `time_out == None` means the owner is currently signed in ("open" entry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub uuid: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub time_in: NaiveTime,
    pub time_out: Option<NaiveTime>,
}

impl Entry {
    /// Open a new entry for `user_id` at `at`, with a fresh UUID.
    pub fn sign_in(user_id: &str, at: NaiveDateTime) -> Self {
        let at = truncate_to_seconds(at);
        Self {
            uuid: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            date: at.date(),
            time_in: at.time(),
            time_out: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.time_out.is_none()
    }

    pub fn signed_in_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time_in)
    }

    /// Close the entry at `at` and return how long the user was signed in.
    pub fn sign_out(&mut self, at: NaiveDateTime) -> TimeDelta {
        let at = truncate_to_seconds(at);
        self.time_out = Some(at.time());
        (at - self.signed_in_at()).max(TimeDelta::zero())
    }

    /// Time between `time_in` and `time_out` on the entry's date.
    pub fn duration(&self) -> Option<TimeDelta> {
        self.time_out
            .map(|out| (out - self.time_in).max(TimeDelta::zero()))
    }

    pub fn date_str(&self) -> String {
        format_date(self.date)
    }

    pub fn time_in_str(&self) -> String {
        format_time(self.time_in)
    }

    pub fn time_out_str(&self) -> Option<String> {
        self.time_out.map(format_time)
    }
}
