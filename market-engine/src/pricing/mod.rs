//! Settlement pricing
//!
//! Pure computation of the money split for a purchase: subtotal,
//! platform commission, farmer earning, and buyer-facing total. No I/O —
//! the placement transaction feeds the result into the order document.

pub mod calculator;

pub use calculator::{PricingBreakdown, PricingError, compute_pricing};
