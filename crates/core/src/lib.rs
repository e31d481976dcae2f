//! Pennyflow Core - domain entities, services, and traits.
//!
//! This crate contains the client-side synchronization logic for Pennyflow:
//! the session store, the server-authoritative transaction and analytics
//! caches, and the device settings service. It is transport- and
//! storage-agnostic: HTTP access goes through the gateway traits implemented
//! by the `connect` crate, and durable device state goes through the state
//! store trait implemented by the `storage-sqlite` crate.

pub mod analytics;
pub mod constants;
pub mod errors;
pub mod session;
pub mod settings;
pub mod transactions;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
