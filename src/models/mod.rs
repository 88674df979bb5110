pub mod audit;
pub mod entry;
pub mod user;
pub mod user_type;
