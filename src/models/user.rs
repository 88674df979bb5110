use super::user_type::UserType;
use chrono::NaiveDate;

/// A registered person. Users are seeded out-of-band and never deleted;
/// only `date_left` and `forgot_sign_out` change over time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub major: String,
    pub user_type: UserType,
    pub date_joined: NaiveDate,
    pub date_left: Option<NaiveDate>,
    pub education_plan: bool,
    /// Sticky: set when the startup sweep had to close an entry for them.
    pub forgot_sign_out: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn display_name(&self, full_name: bool) -> String {
        if full_name {
            self.full_name()
        } else {
            self.first_name.clone()
        }
    }

    /// Still enrolled on `on`.
    pub fn is_active(&self, on: NaiveDate) -> bool {
        self.date_left.is_none_or(|left| left > on)
    }
}
