//! Gateway and service traits for the transaction cache.

use async_trait::async_trait;

use crate::errors::Result;
use crate::transactions::transactions_model::{
    Category, LocalFilter, NewTransaction, ParsedTransaction, Transaction, TransactionFilters,
    TransactionUpdate,
};

/// Transaction-facing slice of the API gateway.
#[async_trait]
pub trait TransactionGateway: Send + Sync {
    async fn list(&self, filters: &TransactionFilters) -> Result<Vec<Transaction>>;

    /// Send free text to the backend parser. Returns a proposal only; the
    /// parser itself is an opaque external dependency.
    async fn parse(&self, input: &str) -> Result<ParsedTransaction>;

    async fn create(&self, new: &NewTransaction) -> Result<Transaction>;

    async fn update(&self, id: &str, update: &TransactionUpdate) -> Result<Transaction>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn categories(&self) -> Result<Vec<Category>>;
}

/// Service trait for the client-side transaction cache.
///
/// The local list is never ahead of the server: every mutation round-trips
/// first and applies locally only after the backend confirms
/// (confirm-then-apply, no optimistic updates, no rollback path).
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    /// Wait for the session gate, then perform the initial load of
    /// transactions and categories. Failures are logged, not returned.
    async fn initial_load(&self);

    /// Replace the entire local list with the server's filtered result.
    async fn load(&self, filters: TransactionFilters) -> Result<Vec<Transaction>>;

    /// Parse free text into a proposal. Never mutates the cache, whatever
    /// the confidence value.
    async fn parse(&self, input: &str) -> Result<ParsedTransaction>;

    /// Promote a confirmed proposal into a persisted transaction.
    async fn confirm(&self, parsed: ParsedTransaction) -> Result<Transaction>;

    /// Create a transaction; on success the server-returned record is
    /// prepended at index 0 (newest-first by insertion, not by date).
    async fn create(&self, new: NewTransaction) -> Result<Transaction>;

    /// Full-field update; on success the matching local record is replaced
    /// in place, preserving its position.
    async fn update(&self, id: &str, update: TransactionUpdate) -> Result<Transaction>;

    /// Delete; the local record is removed only after the server confirms.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Refresh the category list. On failure the previous value (the
    /// hardcoded fallback until a first success) stays in place.
    async fn load_categories(&self) -> Result<Vec<String>>;

    /// Snapshot of the current local list.
    fn transactions(&self) -> Vec<Transaction>;

    /// Snapshot of the current category names.
    fn categories(&self) -> Vec<String>;

    /// Pure, synchronous, read-only filter over the local list.
    fn filter_locally(&self, predicate: &dyn Fn(&Transaction) -> bool) -> Vec<Transaction>;

    /// Typed convenience over `filter_locally`.
    fn filtered(&self, filter: &LocalFilter) -> Vec<Transaction>;

    fn is_loading(&self) -> bool;
}
