//! Utility modules — logging and time helpers

pub mod logger;
pub mod time;

pub use logger::init_logger;
pub use time::now_millis;
