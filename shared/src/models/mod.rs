//! Data models
//!
//! Documents are stored as JSON in the market store. Field names follow
//! the marketplace document schema (camelCase on the wire).

pub mod listing;
pub mod notification;
pub mod order;
pub mod user;

// Re-exports
pub use listing::*;
pub use notification::*;
pub use order::*;
pub use user::*;
