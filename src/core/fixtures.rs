//! Fixture users for `--testdb` runs.

use crate::errors::AppResult;
use crate::models::user::User;
use crate::models::user_type::UserType;
use crate::store::Store;
use chrono::NaiveDate;
use tracing::debug;

#[allow(clippy::too_many_arguments)]
fn fixture(
    user_id: &str,
    first_name: &str,
    last_name: &str,
    email: &str,
    major: &str,
    user_type: UserType,
    joined: (i32, u32, u32),
    left: Option<(i32, u32, u32)>,
    education_plan: bool,
    forgot_sign_out: bool,
) -> Option<User> {
    Some(User {
        user_id: user_id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        major: major.to_string(),
        user_type,
        date_joined: NaiveDate::from_ymd_opt(joined.0, joined.1, joined.2)?,
        date_left: match left {
            Some((y, m, d)) => Some(NaiveDate::from_ymd_opt(y, m, d)?),
            None => None,
        },
        education_plan,
        forgot_sign_out,
    })
}

pub fn test_users() -> Vec<User> {
    [
        fixture(
            "888000000", "Frodo", "Baggins", "baggins.frodo@gmail.com", "Medicine",
            UserType::Tutor, (2014, 12, 11), None, false, false,
        ),
        fixture(
            "888111111", "Sam", "Gamgee", "gamgee.samwise@gmail.com", "Agriculture",
            UserType::Student, (2015, 2, 16), None, true, false,
        ),
        fixture(
            "888222222", "Merry", "Brandybuck", "brandybuck.merriadoc@gmail.com", "Physics",
            UserType::Tutor, (2015, 4, 12), Some((2016, 3, 24)), true, true,
        ),
        fixture(
            "888333333", "Pippin", "Took", "took.peregrin@gmail.com", "Botany",
            UserType::Student, (2015, 2, 16), None, false, true,
        ),
        fixture(
            "888444444", "Gandalf", "the Grey", "mithrandir@gmail.com", "Computer Science",
            UserType::Tutor, (2010, 10, 10), None, false, false,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Add the fixture users that are not in `store` yet. Returns how many were added.
pub fn add_test_users(store: &mut dyn Store) -> AppResult<usize> {
    let mut added = 0;
    for user in test_users() {
        if store.user(&user.user_id)?.is_none() {
            store.add_user(&user)?;
            added += 1;
        }
    }
    debug!(added, "fixture users seeded");
    Ok(added)
}
