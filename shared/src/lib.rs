//! Shared types for the SmartBazaar marketplace
//!
//! Data models and domain enums used by the market engine and any
//! server/client surface built on top of it.

pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    Actor, Listing, ListingStatus, NewListing, Notification, NotificationType, Order,
    OrderHistoryItem, OrderStatus, UserRole,
};
