use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::{debug, error, warn};

use crate::analytics::analytics_model::{
    AnalyticsOptions, AnalyticsSummary, CategoryData, MonthlyComparison, Period, TrendData,
};
use crate::analytics::analytics_traits::{AnalyticsGateway, AnalyticsServiceTrait};
use crate::constants::{AUTH_TOKEN_KEY, DEFAULT_TREND_DAYS};
use crate::errors::Result;
use crate::session::SessionGate;
use crate::settings::StateStoreTrait;

/// Client-side mirror of the backend's derived aggregates.
///
/// Each slice (summary, breakdown, trends, monthly comparison) is fetched
/// independently and stored on success only; a failed fetch leaves the
/// previous value in place. Re-fetched on demand, never in the background.
pub struct AnalyticsService {
    gateway: Arc<dyn AnalyticsGateway>,
    store: Arc<dyn StateStoreTrait>,
    gate: SessionGate,
    summary: RwLock<AnalyticsSummary>,
    category_breakdown: RwLock<Vec<CategoryData>>,
    trends: RwLock<Vec<TrendData>>,
    monthly_comparison: RwLock<Vec<MonthlyComparison>>,
    loading: AtomicBool,
}

impl AnalyticsService {
    pub fn new(
        gateway: Arc<dyn AnalyticsGateway>,
        store: Arc<dyn StateStoreTrait>,
        gate: SessionGate,
    ) -> Self {
        AnalyticsService {
            gateway,
            store,
            gate,
            summary: RwLock::new(AnalyticsSummary::default()),
            category_breakdown: RwLock::new(Vec::new()),
            trends: RwLock::new(Vec::new()),
            monthly_comparison: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl AnalyticsServiceTrait for AnalyticsService {
    async fn initial_load(&self) {
        self.gate.ready().await;
        match self.store.get(AUTH_TOKEN_KEY) {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!("No session; skipping initial analytics load");
                return;
            }
            Err(e) => {
                warn!("State store unavailable, skipping analytics load: {}", e);
                return;
            }
        }
        self.load_all(AnalyticsOptions::default()).await;
    }

    async fn load_summary(&self) -> Result<AnalyticsSummary> {
        let fetched = self.gateway.summary().await?;
        if let Ok(mut summary) = self.summary.write() {
            *summary = fetched.clone();
        }
        Ok(fetched)
    }

    async fn load_category_breakdown(&self, period: Period) -> Result<Vec<CategoryData>> {
        let fetched = self.gateway.category_breakdown(period).await?;
        if let Ok(mut breakdown) = self.category_breakdown.write() {
            *breakdown = fetched.clone();
        }
        Ok(fetched)
    }

    async fn load_trends(&self, days: u32) -> Result<Vec<TrendData>> {
        let fetched = self.gateway.trends(days).await?;
        if let Ok(mut trends) = self.trends.write() {
            *trends = fetched.clone();
        }
        Ok(fetched)
    }

    async fn load_monthly_comparison(&self) -> Result<Vec<MonthlyComparison>> {
        let fetched = self.gateway.monthly_comparison().await?;
        if let Ok(mut comparison) = self.monthly_comparison.write() {
            *comparison = fetched.clone();
        }
        Ok(fetched)
    }

    async fn load_all(&self, options: AnalyticsOptions) {
        self.loading.store(true, Ordering::SeqCst);
        let period = options.period.unwrap_or_default();
        let days = options.trend_days.unwrap_or(DEFAULT_TREND_DAYS);

        // Unordered concurrent batch, joined on its union. Each member
        // stores its own slice on success; a failure here must not corrupt
        // the other slices.
        let (summary, breakdown, trends) = futures::join!(
            self.load_summary(),
            self.load_category_breakdown(period),
            self.load_trends(days),
        );

        if let Err(e) = summary {
            error!("Failed to load analytics summary: {}", e);
        }
        if let Err(e) = breakdown {
            error!("Failed to load category breakdown: {}", e);
        }
        if let Err(e) = trends {
            error!("Failed to load trend series: {}", e);
        }

        self.loading.store(false, Ordering::SeqCst);
    }

    fn summary(&self) -> AnalyticsSummary {
        self.summary
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn category_breakdown(&self) -> Vec<CategoryData> {
        self.category_breakdown
            .read()
            .map(|b| b.clone())
            .unwrap_or_default()
    }

    fn trends(&self) -> Vec<TrendData> {
        self.trends.read().map(|t| t.clone()).unwrap_or_default()
    }

    fn monthly_comparison(&self) -> Vec<MonthlyComparison> {
        self.monthly_comparison
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, GatewayError};
    use crate::settings::MemoryStateStore;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct MockAnalyticsGateway {
        fail_summary: AtomicBool,
        fail_breakdown: AtomicBool,
        fail_trends: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockAnalyticsGateway {
        fn unavailable() -> Error {
            Error::Gateway(GatewayError::Api {
                status: 503,
                message: "Service unavailable".to_string(),
            })
        }

        fn summary_fixture() -> AnalyticsSummary {
            AnalyticsSummary {
                total_income: dec!(4200),
                total_expenses: dec!(1800),
                savings: dec!(2400),
                monthly_change: 4.2,
            }
        }
    }

    #[async_trait]
    impl AnalyticsGateway for MockAnalyticsGateway {
        async fn summary(&self) -> Result<AnalyticsSummary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_summary.load(Ordering::SeqCst) {
                return Err(Self::unavailable());
            }
            Ok(Self::summary_fixture())
        }

        async fn category_breakdown(&self, period: Period) -> Result<Vec<CategoryData>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_breakdown.load(Ordering::SeqCst) {
                return Err(Self::unavailable());
            }
            Ok(vec![CategoryData {
                category: format!("Groceries ({})", period),
                amount: dec!(320.50),
                percentage: 17.8,
                color: Some("#36a2eb".to_string()),
            }])
        }

        async fn trends(&self, days: u32) -> Result<Vec<TrendData>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_trends.load(Ordering::SeqCst) {
                return Err(Self::unavailable());
            }
            Ok((0..days.min(3))
                .map(|i| TrendData {
                    date: NaiveDate::from_ymd_opt(2025, 6, 1 + i).unwrap(),
                    income: dec!(140),
                    expenses: dec!(60),
                    net: dec!(80),
                })
                .collect())
        }

        async fn monthly_comparison(&self) -> Result<Vec<MonthlyComparison>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![MonthlyComparison {
                month: "2025-06".to_string(),
                income: dec!(4200),
                expenses: dec!(1800),
            }])
        }
    }

    fn build() -> (AnalyticsService, Arc<MockAnalyticsGateway>) {
        let gateway = Arc::new(MockAnalyticsGateway::default());
        let service = AnalyticsService::new(
            gateway.clone(),
            Arc::new(MemoryStateStore::new()),
            SessionGate::open(),
        );
        (service, gateway)
    }

    #[tokio::test]
    async fn load_all_populates_every_slice() {
        let (service, gateway) = build();

        service.load_all(AnalyticsOptions::default()).await;

        assert_eq!(service.summary(), MockAnalyticsGateway::summary_fixture());
        assert_eq!(service.category_breakdown().len(), 1);
        assert_eq!(service.trends().len(), 3);
        assert!(!service.is_loading());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn slice_failure_leaves_previous_value_untouched() {
        let (service, gateway) = build();
        service.load_all(AnalyticsOptions::default()).await;
        let before = service.summary();

        gateway.fail_summary.store(true, Ordering::SeqCst);
        service.load_all(AnalyticsOptions::default()).await;

        // Summary fetch failed: its previous value survives, and the other
        // slices were still refreshed.
        assert_eq!(service.summary(), before);
        assert_eq!(service.category_breakdown().len(), 1);
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn all_slices_failing_leaves_defaults_and_clears_loading() {
        let (service, gateway) = build();
        gateway.fail_summary.store(true, Ordering::SeqCst);
        gateway.fail_breakdown.store(true, Ordering::SeqCst);
        gateway.fail_trends.store(true, Ordering::SeqCst);

        service.load_all(AnalyticsOptions::default()).await;

        assert_eq!(service.summary(), AnalyticsSummary::default());
        assert!(service.category_breakdown().is_empty());
        assert!(service.trends().is_empty());
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn options_are_passed_through() {
        let (service, _) = build();

        service
            .load_all(AnalyticsOptions {
                period: Some(Period::Year),
                trend_days: Some(2),
            })
            .await;

        assert_eq!(service.category_breakdown()[0].category, "Groceries (year)");
        assert_eq!(service.trends().len(), 2);
    }

    #[tokio::test]
    async fn monthly_comparison_loads_independently() {
        let (service, _) = build();
        let loaded = service.load_monthly_comparison().await.unwrap();
        assert_eq!(loaded, service.monthly_comparison());
    }
}
