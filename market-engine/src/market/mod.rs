//! Order Lifecycle & Settlement Module
//!
//! - **engine**: [`MarketEngine`] — placement, transitions, queries
//! - **ledger**: pure stock reserve/restore operations
//! - **storage**: redb document store with version-checked writes
//! - **notify**: notification construction and broadcast fan-out
//! - **error**: the public [`EngineError`] taxonomy
//!
//! # Data Flow
//!
//! ```text
//! Buyer action → MarketEngine::place_order
//!     → read listing → pricing → ledger reserve
//!     → atomic write {listing, order, notification}
//!     → broadcast notification
//!
//! Farmer action → MarketEngine::transition_order
//!     → validate edge + ownership → (Rejected: ledger restore)
//!     → atomic write {order, [listing], notification}
//!     → broadcast notification
//! ```

pub mod engine;
pub mod error;
pub mod ledger;
pub mod notify;
pub mod storage;


// Re-exports
pub use engine::MarketEngine;
pub use error::{EngineError, EngineResult};
pub use notify::NotificationEmitter;
pub use storage::{MarketStore, StoreError, StoreResult, StoreTxn, TransactionRunner};
