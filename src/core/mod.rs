pub mod attendance;
pub mod backup;
pub mod export;
pub mod fixtures;
pub mod log;
pub mod startup;
