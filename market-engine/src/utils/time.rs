//! Time helpers
//!
//! All timestamps in stored documents are `i64` Unix millis, UTC.

/// Current time as epoch milliseconds UTC
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
