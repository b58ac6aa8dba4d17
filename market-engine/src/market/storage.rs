//! redb-based market document store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `listings` | `listing_id` | `Listing` | Produce batches with remaining stock |
//! | `orders` | `order_id` | `Order` | Financial records, never deleted |
//! | `notifications` | `(user_id, notification_id)` | `Notification` | Per-user notification collection |
//!
//! # Concurrency
//!
//! Listing documents carry a `version` bumped on every write. Writers that
//! validated against a pre-transaction read commit through
//! [`StoreTxn::put_listing_checked`], which rejects the write with
//! [`StoreError::VersionConflict`] when the stored version has moved — the
//! caller re-reads and retries a bounded number of times. redb serializes
//! write transactions, so a conditional write that passes the version check
//! is final.
//!
//! All documents are JSON-serialized; a document that fails to deserialize
//! into its typed model surfaces as [`StoreError::Serialization`] rather
//! than propagating undefined fields.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{Listing, Notification, Order};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Listings: key = listing_id, value = JSON-serialized Listing
const LISTINGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("listings");

/// Orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Notifications: key = (user_id, notification_id), value = JSON-serialized Notification
const NOTIFICATIONS_TABLE: TableDefinition<(&str, &str), &[u8]> =
    TableDefinition::new("notifications");

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Listing not found: {0}")]
    ListingNotFound(String),

    #[error("Document is missing its id")]
    MissingId,

    #[error("Version conflict on listing {listing_id}: expected {expected}, stored {stored}")]
    VersionConflict {
        listing_id: String,
        expected: u64,
        stored: u64,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Run operations inside one atomic write transaction
///
/// This is the engine's portability seam: the engine only ever touches the
/// store through this trait plus the read queries, so a different backend
/// can be swapped in by providing the same conditional-write semantics.
pub trait TransactionRunner {
    /// Execute `op` against a write transaction context
    ///
    /// Commits when `op` returns `Ok`, aborts when it returns `Err` — the
    /// operation's writes are all-or-nothing. The error type only needs a
    /// conversion from [`StoreError`] so domain errors pass through
    /// untouched.
    fn with_txn<T, E, F>(&self, op: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut StoreTxn<'_>) -> Result<T, E>;
}

/// Market document store backed by redb
#[derive(Clone)]
pub struct MarketStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for MarketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketStore").finish_non_exhaustive()
    }
}

impl MarketStore {
    /// Open or create the database at the given path
    ///
    /// redb commits with immediate durability, so a commit that returns is
    /// persistent even across power loss.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (tests and demos)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Create all tables so later read transactions never race table creation
    fn init_tables(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(LISTINGS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(NOTIFICATIONS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Read Queries ==========

    /// Get a listing by id
    pub fn get_listing(&self, listing_id: &str) -> StoreResult<Option<Listing>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LISTINGS_TABLE)?;
        match table.get(listing_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by id
    pub fn get_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All listings, unordered
    pub fn all_listings(&self) -> StoreResult<Vec<Listing>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LISTINGS_TABLE)?;
        let mut listings = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            listings.push(serde_json::from_slice(value.value())?);
        }
        Ok(listings)
    }

    /// All orders, unordered
    pub fn all_orders(&self) -> StoreResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    /// All notifications in a user's collection, unordered
    pub fn notifications_for_user(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NOTIFICATIONS_TABLE)?;
        let mut notifications = Vec::new();
        for result in table.range((user_id, "")..)? {
            let (key, value) = result?;
            if key.value().0 != user_id {
                break;
            }
            notifications.push(serde_json::from_slice(value.value())?);
        }
        Ok(notifications)
    }
}

impl TransactionRunner for MarketStore {
    fn with_txn<T, E, F>(&self, op: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut StoreTxn<'_>) -> Result<T, E>,
    {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| E::from(StoreError::from(e)))?;
        let result = {
            let mut ctx = StoreTxn { txn: &txn };
            op(&mut ctx)
        };
        match result {
            Ok(value) => {
                txn.commit().map_err(|e| E::from(StoreError::from(e)))?;
                Ok(value)
            }
            Err(err) => {
                // Abort failure is secondary to the operation error
                let _ = txn.abort();
                Err(err)
            }
        }
    }
}

/// Write transaction context: read-your-write document access plus
/// version-checked listing writes
pub struct StoreTxn<'a> {
    txn: &'a WriteTransaction,
}

impl StoreTxn<'_> {
    /// Get a listing as seen by this transaction
    pub fn get_listing(&self, listing_id: &str) -> StoreResult<Option<Listing>> {
        let table = self.txn.open_table(LISTINGS_TABLE)?;
        match table.get(listing_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order as seen by this transaction
    pub fn get_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let table = self.txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Insert a brand-new listing (version must be 0)
    pub fn insert_listing(&mut self, listing: &Listing) -> StoreResult<()> {
        let id = listing.id.as_deref().ok_or(StoreError::MissingId)?;
        let mut table = self.txn.open_table(LISTINGS_TABLE)?;
        let value = serde_json::to_vec(listing)?;
        table.insert(id, value.as_slice())?;
        Ok(())
    }

    /// Conditionally update a listing
    ///
    /// `listing.version` must equal the stored version (the version the
    /// caller validated against); on success the version is bumped in place
    /// and the document written. Fails with [`StoreError::VersionConflict`]
    /// when another writer got there first.
    pub fn put_listing_checked(&mut self, listing: &mut Listing) -> StoreResult<()> {
        let id = listing
            .id
            .clone()
            .ok_or(StoreError::MissingId)?;
        let mut table = self.txn.open_table(LISTINGS_TABLE)?;

        let stored_version = match table.get(id.as_str())? {
            Some(guard) => serde_json::from_slice::<Listing>(guard.value())?.version,
            None => return Err(StoreError::ListingNotFound(id)),
        };
        if stored_version != listing.version {
            return Err(StoreError::VersionConflict {
                listing_id: id,
                expected: listing.version,
                stored: stored_version,
            });
        }

        listing.version += 1;
        let value = serde_json::to_vec(listing)?;
        table.insert(id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Insert or overwrite an order document
    pub fn put_order(&mut self, order: &Order) -> StoreResult<()> {
        let id = order.id.as_deref().ok_or(StoreError::MissingId)?;
        let mut table = self.txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(id, value.as_slice())?;
        Ok(())
    }

    /// Append a notification to the recipient's collection
    pub fn push_notification(&mut self, notification: &Notification) -> StoreResult<()> {
        let id = notification.id.as_deref().ok_or(StoreError::MissingId)?;
        let mut table = self.txn.open_table(NOTIFICATIONS_TABLE)?;
        let value = serde_json::to_vec(notification)?;
        table.insert((notification.user_id.as_str(), id), value.as_slice())?;
        Ok(())
    }

    /// Flip a notification's `is_read` flag
    ///
    /// Returns whether the notification existed.
    pub fn mark_notification_read(&mut self, user_id: &str, notification_id: &str) -> StoreResult<bool> {
        let mut table = self.txn.open_table(NOTIFICATIONS_TABLE)?;
        let existing = match table.get((user_id, notification_id))? {
            Some(guard) => {
                let mut notification: Notification = serde_json::from_slice(guard.value())?;
                notification.is_read = true;
                Some(serde_json::to_vec(&notification)?)
            }
            None => None,
        };
        match existing {
            Some(value) => {
                table.insert((user_id, notification_id), value.as_slice())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
