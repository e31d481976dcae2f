//! SQLite storage implementation for the Pennyflow client.
//!
//! This crate is the only place in the client where Diesel dependencies
//! exist. It implements the device-state store trait defined in
//! `pennyflow-core` on top of a single key-value table, the durable home of
//! the bearer token, the serialized user record, the mirrored transaction
//! list, and the theme preference.
//!
//! ```text
//! core (domain)          connect (HTTP)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod state;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool};

// Re-export storage errors and the store implementation
pub use errors::StorageError;
pub use state::SqliteStateStore;

// Re-export from pennyflow-core for convenience
pub use pennyflow_core::errors::{Error, Result, StoreError};
