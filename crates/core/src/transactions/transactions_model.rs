use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Result, ValidationError};

/// Whether a transaction adds to or subtracts from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// A persisted transaction as returned by the backend.
///
/// The id and timestamps are server-assigned; the client never fabricates
/// them. `confidence` is present only on parser-originated records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A parsed proposal returned by the backend's natural-language parser.
///
/// Never persisted: it exists only between the parse request and the user's
/// confirm/reject decision. Confirming promotes it via `create`; rejecting
/// simply drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransaction {
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub confidence: f64,
}

impl ParsedTransaction {
    /// Promote the proposal into a create payload, carrying the parser's
    /// confidence along.
    pub fn into_new(self) -> NewTransaction {
        NewTransaction {
            amount: self.amount,
            description: self.description,
            category: self.category,
            kind: self.kind,
            date: None,
            confidence: Some(self.confidence),
        }
    }
}

/// Payload for creating a transaction. `date` defaults server-side to now
/// when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl NewTransaction {
    /// Client-side checks performed before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.amount < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount.into());
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description").into());
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingField("category").into());
        }
        if let Some(confidence) = self.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(ValidationError::ConfidenceOutOfRange.into());
            }
        }
        Ok(())
    }
}

/// Full-field update payload. Partial updates are not supported by the
/// backend contract; every editable field must be supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: DateTime<Utc>,
}

impl TransactionUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.amount < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount.into());
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description").into());
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingField("category").into());
        }
        Ok(())
    }
}

/// Server-side list filters, passed through opaquely as query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilters {
    pub category: Option<String>,
    pub kind: Option<TransactionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl TransactionFilters {
    /// Query parameters in the order the backend documents them.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref category) = self.category {
            params.push(("category", category.clone()));
        }
        if let Some(kind) = self.kind {
            params.push(("type", kind.as_str().to_string()));
        }
        if let Some(start_date) = self.start_date {
            params.push(("startDate", start_date.to_string()));
        }
        if let Some(end_date) = self.end_date {
            params.push(("endDate", end_date.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset", offset.to_string()));
        }
        params
    }
}

/// Category record as returned by `GET /transactions/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
}

/// Pure client-side filter over the already-loaded list. Never fetches.
#[derive(Debug, Clone, Default)]
pub struct LocalFilter {
    pub category: Option<String>,
    pub kind: Option<TransactionType>,
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl LocalFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(ref category) = self.category {
            if &transaction.category != category {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if transaction.kind != kind {
                return false;
            }
        }
        if let Some((start, end)) = self.date_range {
            if transaction.date < start || transaction.date > end {
                return false;
            }
        }
        true
    }
}
