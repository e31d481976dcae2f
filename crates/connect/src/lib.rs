//! Pennyflow Connect - HTTP client for the Pennyflow backend API.
//!
//! This crate provides the API gateway adapter: a shared `reqwest`-based
//! client that implements the gateway traits defined in `pennyflow-core`
//! (auth, transactions, analytics). It owns bearer-token injection and
//! error normalization; nothing outside this crate sees raw transport
//! details.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pennyflow_connect::ApiClient;
//!
//! let client = ApiClient::new("http://localhost:3001/api")?;
//! client.set_token(Some("access-token"));
//! let transactions = client.list(&Default::default()).await?;
//! ```

mod client;
mod error;
mod types;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::{ApiError, Result};
