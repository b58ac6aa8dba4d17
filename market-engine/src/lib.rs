//! SmartBazaar Order Lifecycle & Settlement Engine
//!
//! The one subsystem of the marketplace with real invariants: pricing
//! settlement, stock accounting, and order status transitions under
//! concurrent access. It is a plain library — no rendering framework, no
//! HTTP surface — callable from a server handler, CLI, or test harness
//! alike.
//!
//! # Module Structure
//!
//! ```text
//! market-engine/src/
//! ├── config.rs      # Settlement constants, env-overridable
//! ├── pricing/       # Pure settlement calculator
//! ├── market/        # Engine, ledger, storage, notifications, errors
//! └── utils/         # Logging and time helpers
//! ```
//!
//! # Example
//!
//! ```
//! use market_engine::{EngineConfig, MarketEngine};
//! use shared::models::{Actor, NewListing};
//!
//! let engine = MarketEngine::open_in_memory(EngineConfig::default()).unwrap();
//! let listing = engine
//!     .create_listing(
//!         &Actor::farmer("farmer-1"),
//!         NewListing {
//!             crop_name: "Wheat".to_string(),
//!             quantity: 100.0,
//!             unit: "kg".to_string(),
//!             price_per_unit: 50.0,
//!         },
//!     )
//!     .unwrap();
//! let order = engine
//!     .place_order(&Actor::buyer("buyer-1"), listing.id.as_deref().unwrap(), 20.0)
//!     .unwrap();
//! assert_eq!(order.total_price, 1250.0);
//! ```

pub mod config;
pub mod market;
pub mod pricing;
pub mod utils;

// Re-export public types
pub use config::EngineConfig;
pub use market::{EngineError, EngineResult, MarketEngine, MarketStore, TransactionRunner};
pub use pricing::{PricingBreakdown, compute_pricing};

// Re-export shared models for convenience
pub use shared::models::{
    Actor, Listing, ListingStatus, NewListing, Notification, NotificationType, Order,
    OrderHistoryItem, OrderStatus, UserRole,
};
