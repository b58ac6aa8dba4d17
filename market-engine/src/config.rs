//! Engine configuration
//!
//! All settlement constants can be overridden through environment
//! variables:
//!
//! | Environment variable | Default | Meaning |
//! |----------------------|---------|---------|
//! | DELIVERY_CHARGE | 250 | Flat delivery fee added to the buyer total (rupees) |
//! | COMMISSION_RATE | 0.02 | Platform cut of the subtotal, deducted from the farmer side |
//! | MAX_TXN_RETRIES | 3 | Conditional-write retries before surfacing a conflict |
//!
//! Orders snapshot these values at creation time; changing the
//! configuration never rewrites settled orders.

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Flat delivery fee in rupees, paid by the buyer
    pub delivery_charge: f64,
    /// Commission rate in [0, 1], absorbed from the farmer's earning
    pub commission_rate: f64,
    /// Bounded retries for version-conflicted transactions
    pub max_txn_retries: u32,
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to the
    /// observed production defaults
    pub fn from_env() -> Self {
        Self {
            delivery_charge: std::env::var("DELIVERY_CHARGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(250.0),
            commission_rate: std::env::var("COMMISSION_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.02),
            max_txn_retries: std::env::var("MAX_TXN_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delivery_charge: 250.0,
            commission_rate: 0.02,
            max_txn_retries: 3,
        }
    }
}
