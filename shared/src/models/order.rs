//! Order Model
//!
//! Orders are financial records: the pricing fields are fixed at creation
//! from the listing snapshot and never recomputed, and orders are never
//! deleted — terminal statuses close them out.

use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Dispatched,
    InWarehouse,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Legal successor statuses
    ///
    /// Terminal statuses (`Rejected`, `Cancelled`, `Delivered`) have no
    /// successors, which also guards against double-rejection and the
    /// double stock restore it would cause.
    pub fn successors(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Accepted, OrderStatus::Rejected],
            OrderStatus::Accepted => &[OrderStatus::Dispatched, OrderStatus::Cancelled],
            OrderStatus::Dispatched => &[OrderStatus::InWarehouse],
            OrderStatus::InWarehouse => &[OrderStatus::OutForDelivery],
            OrderStatus::OutForDelivery => &[OrderStatus::Delivered],
            OrderStatus::Rejected | OrderStatus::Cancelled | OrderStatus::Delivered => &[],
        }
    }

    /// Whether `target` is directly reachable from this status
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        self.successors().contains(&target)
    }

    /// Whether this status closes the order
    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    /// Wire name, e.g. `in_warehouse`
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Dispatched => "dispatched",
            OrderStatus::InWarehouse => "in_warehouse",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Human-readable name for notification texts ("in warehouse")
    pub fn display_name(self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit trail entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistoryItem {
    pub status: OrderStatus,
    /// Epoch milliseconds UTC
    pub timestamp: i64,
}

/// Order entity — a buyer's purchase against a listing
///
/// `crop_name`, `quantity`, `unit` and `price_per_unit` are denormalized
/// snapshots taken from the listing at purchase time, so later listing
/// edits never retroactively change historical orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Option<String>,
    pub listing_id: String,
    pub buyer_id: String,
    pub farmer_id: String,
    pub crop_name: String,
    pub quantity: f64,
    pub unit: String,
    pub price_per_unit: f64,
    /// quantity x price_per_unit, in rupees
    pub subtotal: f64,
    /// Fixed at creation from the configured delivery charge
    pub delivery_charge: f64,
    /// Platform's cut of the subtotal, deducted from the farmer side
    pub commission: f64,
    /// subtotal - commission
    pub farmer_earning: f64,
    /// Buyer-facing total: subtotal + delivery_charge
    pub total_price: f64,
    pub status: OrderStatus,
    /// Append-only status audit trail, oldest first
    pub history: Vec<OrderHistoryItem>,
    /// Epoch milliseconds UTC
    pub created_at: i64,
}
