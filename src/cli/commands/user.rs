use crate::cli::parser::UserAction;
use crate::config::Config;
use crate::core::attendance::UserIdFormat;
use crate::errors::{AppError, AppResult};
use crate::models::user::User;
use crate::models::user_type::UserType;
use crate::store::open_store;
use crate::ui::messages::{info, success};
use crate::utils::date::{format_date, parse_date, today};
use crate::utils::table::Table;
use chrono::NaiveDate;

fn date_or_today(raw: Option<&str>) -> AppResult<NaiveDate> {
    match raw {
        Some(s) => parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string())),
        None => Ok(today()),
    }
}

/// Handle `user add | list | leave`
pub fn handle(action: &UserAction, cfg: &Config) -> AppResult<()> {
    let mut store = open_store(cfg)?;

    match action {
        UserAction::Add {
            user_id,
            first_name,
            last_name,
            email,
            major,
            user_type,
            joined,
            education_plan,
        } => {
            let user_id = user_id.trim();
            if !UserIdFormat::new(&cfg.user_id_pattern)?.is_valid(user_id) {
                return Err(AppError::InvalidUserId(user_id.to_string()));
            }

            let user_type = UserType::from_code(user_type)
                .ok_or_else(|| AppError::InvalidUserType(user_type.clone()))?;

            let user = User {
                user_id: user_id.to_string(),
                first_name: first_name.trim().to_string(),
                last_name: last_name.trim().to_string(),
                email: email.trim().to_string(),
                major: major.trim().to_string(),
                user_type,
                date_joined: date_or_today(joined.as_deref())?,
                date_left: None,
                education_plan: *education_plan,
                forgot_sign_out: false,
            };

            store.add_user(&user)?;
            store.audit("user_add", &user.user_id, &user.full_name())?;
            success(format!("Registered {} ({})", user.full_name(), user.user_id));
        }

        UserAction::List => {
            let users = store.users()?;
            if users.is_empty() {
                info("No users registered.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "Name", "Type", "Joined", "Left", "Forgot"]);
            for u in &users {
                table.add_row(vec![
                    u.user_id.clone(),
                    u.full_name(),
                    u.user_type.to_string(),
                    format_date(u.date_joined),
                    u.date_left.map(format_date).unwrap_or_default(),
                    if u.forgot_sign_out { "yes" } else { "" }.to_string(),
                ]);
            }
            print!("{}", table.render());
        }

        UserAction::Leave { user_id, date } => {
            let user_id = user_id.trim();
            let mut user = store
                .user(user_id)?
                .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

            let left = date_or_today(date.as_deref())?;
            user.date_left = Some(left);
            store.update_user(&user)?;
            store.audit("user_leave", user_id, &format_date(left))?;
            success(format!("{} left on {}", user.full_name(), format_date(left)));
        }
    }

    Ok(())
}
