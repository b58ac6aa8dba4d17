//! User identity types
//!
//! The engine never talks to the identity provider; callers hand it an
//! already-verified [`Actor`] (opaque user id plus role claim).

use serde::{Deserialize, Serialize};

/// Role claim supplied by the identity provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Farmer,
    Buyer,
}

/// Verified actor performing an engine operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: String,
    pub role: UserRole,
}

impl Actor {
    pub fn farmer(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: UserRole::Farmer,
        }
    }

    pub fn buyer(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: UserRole::Buyer,
        }
    }
}
