//! Notification Model

use serde::{Deserialize, Serialize};

/// Notification type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewMessage,
    OrderUpdate,
    NewOrder,
}

/// Notification entity
///
/// Stored under the recipient's notification collection; mutated only to
/// flip `is_read`, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Option<String>,
    /// Recipient user id
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    /// In-app route the notification points at, e.g. `/orders`
    pub link: String,
    pub is_read: bool,
    /// Epoch milliseconds UTC
    pub created_at: i64,
}
