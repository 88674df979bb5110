pub mod backup;
pub mod config;
pub mod export;
pub mod init;
pub mod kiosk;
pub mod log;
pub mod sign;
pub mod status;
pub mod user;
