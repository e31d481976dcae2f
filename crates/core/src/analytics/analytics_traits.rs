//! Gateway and service traits for the analytics cache.

use async_trait::async_trait;

use crate::analytics::analytics_model::{
    AnalyticsOptions, AnalyticsSummary, CategoryData, MonthlyComparison, Period, TrendData,
};
use crate::errors::Result;

/// Analytics-facing slice of the API gateway. All aggregates are derived
/// server-side; the client only fetches and displays them.
#[async_trait]
pub trait AnalyticsGateway: Send + Sync {
    async fn summary(&self) -> Result<AnalyticsSummary>;

    async fn category_breakdown(&self, period: Period) -> Result<Vec<CategoryData>>;

    async fn trends(&self, days: u32) -> Result<Vec<TrendData>>;

    async fn monthly_comparison(&self) -> Result<Vec<MonthlyComparison>>;
}

/// Service trait for the client-side analytics cache.
#[async_trait]
pub trait AnalyticsServiceTrait: Send + Sync {
    /// Wait for the session gate, then run `load_all` with defaults.
    async fn initial_load(&self);

    async fn load_summary(&self) -> Result<AnalyticsSummary>;

    async fn load_category_breakdown(&self, period: Period) -> Result<Vec<CategoryData>>;

    async fn load_trends(&self, days: u32) -> Result<Vec<TrendData>>;

    async fn load_monthly_comparison(&self) -> Result<Vec<MonthlyComparison>>;

    /// Issue summary, breakdown, and trends as one unordered concurrent
    /// batch. A single loading flag stays true until every member settles;
    /// individual failures are logged and leave that slice's previous value
    /// untouched.
    async fn load_all(&self, options: AnalyticsOptions);

    fn summary(&self) -> AnalyticsSummary;

    fn category_breakdown(&self) -> Vec<CategoryData>;

    fn trends(&self) -> Vec<TrendData>;

    fn monthly_comparison(&self) -> Vec<MonthlyComparison>;

    fn is_loading(&self) -> bool;
}
