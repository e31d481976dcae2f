use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::{debug, warn};

use crate::constants::{AUTH_TOKEN_KEY, FALLBACK_CATEGORIES, TRANSACTIONS_KEY};
use crate::errors::Result;
use crate::session::SessionGate;
use crate::settings::StateStoreTrait;
use crate::transactions::transactions_model::{
    Category, LocalFilter, NewTransaction, ParsedTransaction, Transaction, TransactionFilters,
    TransactionUpdate,
};
use crate::transactions::transactions_traits::{TransactionGateway, TransactionServiceTrait};

/// Client-side mirror of the backend's transaction and category lists.
///
/// All mutations are confirm-then-apply: the local list changes only after
/// the server acknowledges, so no rollback path exists. The confirmed list is
/// additionally mirrored into the device-state store (best-effort) under
/// [`TRANSACTIONS_KEY`]; sign-out clears that mirror.
pub struct TransactionService {
    gateway: Arc<dyn TransactionGateway>,
    store: Arc<dyn StateStoreTrait>,
    gate: SessionGate,
    transactions: RwLock<Vec<Transaction>>,
    categories: RwLock<Vec<String>>,
    loading: AtomicBool,
}

struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn hold(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        LoadingGuard(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl TransactionService {
    pub fn new(
        gateway: Arc<dyn TransactionGateway>,
        store: Arc<dyn StateStoreTrait>,
        gate: SessionGate,
    ) -> Self {
        TransactionService {
            gateway,
            store,
            gate,
            transactions: RwLock::new(Vec::new()),
            categories: RwLock::new(
                FALLBACK_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            ),
            loading: AtomicBool::new(false),
        }
    }

    /// Mirror the confirmed list into the state store. Best-effort: a
    /// storage failure downgrades to a warning, the in-memory cache stays
    /// authoritative for this session.
    async fn mirror_snapshot(&self) {
        let serialized = {
            let list = match self.transactions.read() {
                Ok(list) => list,
                Err(e) => {
                    warn!("Transaction cache lock poisoned: {}", e);
                    return;
                }
            };
            match serde_json::to_string(&*list) {
                Ok(s) => s,
                Err(e) => {
                    warn!("Failed to serialize transaction snapshot: {}", e);
                    return;
                }
            }
        };
        if let Err(e) = self.store.set(TRANSACTIONS_KEY, &serialized).await {
            warn!("Failed to mirror transaction snapshot: {}", e);
        }
    }
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    async fn initial_load(&self) {
        self.gate.ready().await;

        // Same readiness rule as the session store: no persisted token, no
        // initial fetch.
        match self.store.get(AUTH_TOKEN_KEY) {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!("No session; skipping initial transaction load");
                return;
            }
            Err(e) => {
                warn!("State store unavailable, skipping initial load: {}", e);
                return;
            }
        }

        if let Err(e) = self.load(TransactionFilters::default()).await {
            warn!("Failed to load transactions: {}", e);
        }
        if let Err(e) = self.load_categories().await {
            warn!("Failed to load categories: {}", e);
        }
    }

    async fn load(&self, filters: TransactionFilters) -> Result<Vec<Transaction>> {
        let _guard = LoadingGuard::hold(&self.loading);
        let fetched = self.gateway.list(&filters).await?;
        if let Ok(mut list) = self.transactions.write() {
            *list = fetched.clone();
        }
        self.mirror_snapshot().await;
        Ok(fetched)
    }

    async fn parse(&self, input: &str) -> Result<ParsedTransaction> {
        let _guard = LoadingGuard::hold(&self.loading);
        // Parsing returns a proposal only. The cache is deliberately not
        // touched here; promotion happens in `confirm`.
        self.gateway.parse(input).await
    }

    async fn confirm(&self, parsed: ParsedTransaction) -> Result<Transaction> {
        self.create(parsed.into_new()).await
    }

    async fn create(&self, new: NewTransaction) -> Result<Transaction> {
        new.validate()?;
        let _guard = LoadingGuard::hold(&self.loading);
        let created = self.gateway.create(&new).await?;
        if let Ok(mut list) = self.transactions.write() {
            list.insert(0, created.clone());
        }
        self.mirror_snapshot().await;
        Ok(created)
    }

    async fn update(&self, id: &str, update: TransactionUpdate) -> Result<Transaction> {
        update.validate()?;
        let _guard = LoadingGuard::hold(&self.loading);
        let updated = self.gateway.update(id, &update).await?;
        if let Ok(mut list) = self.transactions.write() {
            match list.iter().position(|t| t.id == id) {
                Some(index) => list[index] = updated.clone(),
                // The record may legitimately be outside the currently
                // loaded (filtered) window.
                None => debug!("Updated transaction {} not in local list", id),
            }
        }
        self.mirror_snapshot().await;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = LoadingGuard::hold(&self.loading);
        self.gateway.delete(id).await?;
        if let Ok(mut list) = self.transactions.write() {
            if let Some(index) = list.iter().position(|t| t.id == id) {
                list.remove(index);
            }
        }
        self.mirror_snapshot().await;
        Ok(())
    }

    async fn load_categories(&self) -> Result<Vec<String>> {
        let fetched = self.gateway.categories().await?;
        let names: Vec<String> = fetched.into_iter().map(|c| c.name).collect();
        if let Ok(mut categories) = self.categories.write() {
            *categories = names.clone();
        }
        Ok(names)
    }

    fn transactions(&self) -> Vec<Transaction> {
        self.transactions
            .read()
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    fn categories(&self) -> Vec<String> {
        self.categories
            .read()
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    fn filter_locally(&self, predicate: &dyn Fn(&Transaction) -> bool) -> Vec<Transaction> {
        self.transactions
            .read()
            .map(|list| list.iter().filter(|t| predicate(t)).cloned().collect())
            .unwrap_or_default()
    }

    fn filtered(&self, filter: &LocalFilter) -> Vec<Transaction> {
        self.filter_locally(&|t| filter.matches(t))
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
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use crate::transactions::transactions_model::TransactionType;

    /// Gateway double holding a fake server-side list.
    #[derive(Default)]
    struct MockTransactionGateway {
        server: Mutex<Vec<Transaction>>,
        server_categories: Mutex<Vec<Category>>,
        fail_categories: AtomicBool,
        fail_mutations: AtomicBool,
        parse_result: Mutex<Option<ParsedTransaction>>,
        next_id: AtomicUsize,
    }

    impl MockTransactionGateway {
        fn rejecting(&self) -> Result<()> {
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(Error::Gateway(GatewayError::Api {
                    status: 500,
                    message: "Internal server error".to_string(),
                }));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TransactionGateway for MockTransactionGateway {
        async fn list(&self, filters: &TransactionFilters) -> Result<Vec<Transaction>> {
            self.rejecting()?;
            let server = self.server.lock().unwrap();
            Ok(server
                .iter()
                .filter(|t| match filters.kind {
                    Some(kind) => t.kind == kind,
                    None => true,
                })
                .filter(|t| match &filters.category {
                    Some(category) => &t.category == category,
                    None => true,
                })
                .cloned()
                .collect())
        }

        async fn parse(&self, _input: &str) -> Result<ParsedTransaction> {
            self.rejecting()?;
            Ok(self
                .parse_result
                .lock()
                .unwrap()
                .clone()
                .expect("parse_result not primed"))
        }

        async fn create(&self, new: &NewTransaction) -> Result<Transaction> {
            self.rejecting()?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let now = Utc::now();
            let created = Transaction {
                id: format!("srv-{}", id),
                user_id: "u1".to_string(),
                amount: new.amount,
                description: new.description.clone(),
                category: new.category.clone(),
                kind: new.kind,
                date: new.date.unwrap_or(now),
                confidence: new.confidence,
                created_at: now,
                updated_at: now,
            };
            self.server.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn update(&self, id: &str, update: &TransactionUpdate) -> Result<Transaction> {
            self.rejecting()?;
            let mut server = self.server.lock().unwrap();
            let record = server.iter_mut().find(|t| t.id == id).ok_or_else(|| {
                Error::Gateway(GatewayError::Api {
                    status: 404,
                    message: "Transaction not found".to_string(),
                })
            })?;
            record.amount = update.amount;
            record.description = update.description.clone();
            record.category = update.category.clone();
            record.kind = update.kind;
            record.date = update.date;
            record.updated_at = Utc::now();
            Ok(record.clone())
        }

        async fn delete(&self, id: &str) -> Result<()> {
            self.rejecting()?;
            let mut server = self.server.lock().unwrap();
            let before = server.len();
            server.retain(|t| t.id != id);
            if server.len() == before {
                return Err(Error::Gateway(GatewayError::Api {
                    status: 404,
                    message: "Transaction not found".to_string(),
                }));
            }
            Ok(())
        }

        async fn categories(&self) -> Result<Vec<Category>> {
            if self.fail_categories.load(Ordering::SeqCst) {
                return Err(Error::Gateway(GatewayError::Network(
                    "connection refused".to_string(),
                )));
            }
            Ok(self.server_categories.lock().unwrap().clone())
        }
    }

    fn new_expense(description: &str) -> NewTransaction {
        NewTransaction {
            amount: dec!(6.50),
            description: description.to_string(),
            category: "Food & Dining".to_string(),
            kind: TransactionType::Expense,
            date: None,
            confidence: None,
        }
    }

    fn service_with(
        gateway: Arc<MockTransactionGateway>,
    ) -> (TransactionService, Arc<MemoryStateStore>) {
        let store = Arc::new(MemoryStateStore::new());
        let service = TransactionService::new(gateway, store.clone(), SessionGate::open());
        (service, store)
    }

    #[tokio::test]
    async fn create_prepends_confirmed_record_at_index_zero() {
        let gateway = Arc::new(MockTransactionGateway::default());
        let (service, _) = service_with(gateway);

        service.create(new_expense("First")).await.unwrap();
        let created = service.create(new_expense("Second")).await.unwrap();

        let list = service.transactions();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, created.id);
        assert_eq!(
            list.iter().filter(|t| t.id == created.id).count(),
            1,
            "new record must appear exactly once"
        );
    }

    #[tokio::test]
    async fn failed_create_leaves_local_list_untouched() {
        let gateway = Arc::new(MockTransactionGateway::default());
        let (service, _) = service_with(gateway.clone());
        service.create(new_expense("Kept")).await.unwrap();

        gateway.fail_mutations.store(true, Ordering::SeqCst);
        let result = service.create(new_expense("Dropped")).await;

        assert!(result.is_err());
        let list = service.transactions();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].description, "Kept");
    }

    #[tokio::test]
    async fn update_replaces_in_place_preserving_position_and_length() {
        let gateway = Arc::new(MockTransactionGateway::default());
        let (service, _) = service_with(gateway);
        service.create(new_expense("Oldest")).await.unwrap();
        let target = service.create(new_expense("Middle")).await.unwrap();
        service.create(new_expense("Newest")).await.unwrap();

        let update = TransactionUpdate {
            amount: dec!(12.00),
            description: "Middle, corrected".to_string(),
            category: "Groceries".to_string(),
            kind: TransactionType::Expense,
            date: Utc::now(),
        };
        service.update(&target.id, update).await.unwrap();

        let list = service.transactions();
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].id, target.id);
        assert_eq!(list[1].description, "Middle, corrected");
        assert_eq!(list[1].amount, dec!(12.00));
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_record_after_confirmation() {
        let gateway = Arc::new(MockTransactionGateway::default());
        let (service, _) = service_with(gateway);
        let doomed = service.create(new_expense("Doomed")).await.unwrap();
        service.create(new_expense("Survivor")).await.unwrap();

        service.delete(&doomed.id).await.unwrap();

        let list = service.transactions();
        assert_eq!(list.len(), 1);
        assert!(list.iter().all(|t| t.id != doomed.id));
    }

    #[tokio::test]
    async fn delete_of_missing_id_surfaces_server_error_without_mutation() {
        let gateway = Arc::new(MockTransactionGateway::default());
        let (service, _) = service_with(gateway);
        service.create(new_expense("Kept")).await.unwrap();

        let result = service.delete("no-such-id").await;

        assert!(matches!(
            result,
            Err(Error::Gateway(GatewayError::Api { status: 404, .. }))
        ));
        assert_eq!(service.transactions().len(), 1);
    }

    #[tokio::test]
    async fn parse_never_mutates_the_list() {
        let gateway = Arc::new(MockTransactionGateway::default());
        *gateway.parse_result.lock().unwrap() = Some(ParsedTransaction {
            amount: dec!(6.50),
            description: "Coffee at Starbucks".to_string(),
            category: "Food & Dining".to_string(),
            kind: TransactionType::Expense,
            confidence: 0.97,
        });
        let (service, _) = service_with(gateway);

        let proposal = service.parse("Coffee at Starbucks $6.50").await.unwrap();

        assert!(service.transactions().is_empty());
        assert_eq!(proposal.confidence, 0.97);
    }

    #[tokio::test]
    async fn confirm_promotes_proposal_into_the_list() {
        let gateway = Arc::new(MockTransactionGateway::default());
        let (service, _) = service_with(gateway);
        let proposal = ParsedTransaction {
            amount: dec!(6.50),
            description: "Coffee at Starbucks".to_string(),
            category: "Food & Dining".to_string(),
            kind: TransactionType::Expense,
            confidence: 0.97,
        };

        let created = service.confirm(proposal).await.unwrap();

        let list = service.transactions();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, created.id);
        assert_eq!(list[0].confidence, Some(0.97));
    }

    #[tokio::test]
    async fn load_with_filters_replaces_entire_list() {
        let gateway = Arc::new(MockTransactionGateway::default());
        let (service, _) = service_with(gateway);
        service.create(new_expense("Lunch")).await.unwrap();
        let mut income = new_expense("Salary");
        income.kind = TransactionType::Income;
        income.category = "Income".to_string();
        service.create(income).await.unwrap();

        let loaded = service
            .load(TransactionFilters {
                kind: Some(TransactionType::Income),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(loaded.len(), 1);
        assert!(loaded.iter().all(|t| t.kind == TransactionType::Income));
        // An empty filtered result is a valid state, not an error.
        let none = service
            .load(TransactionFilters {
                category: Some("Travel".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
        assert!(service.transactions().is_empty());
    }

    #[tokio::test]
    async fn categories_fall_back_until_first_success_then_keep_last_success() {
        let gateway = Arc::new(MockTransactionGateway::default());
        *gateway.server_categories.lock().unwrap() = vec![
            Category {
                name: "Rent".to_string(),
            },
            Category {
                name: "Coffee".to_string(),
            },
        ];
        let (service, _) = service_with(gateway.clone());

        // Before any fetch: the hardcoded fallback.
        assert_eq!(service.categories().len(), FALLBACK_CATEGORIES.len());

        // A failed fetch keeps the fallback.
        gateway.fail_categories.store(true, Ordering::SeqCst);
        assert!(service.load_categories().await.is_err());
        assert_eq!(service.categories().len(), FALLBACK_CATEGORIES.len());

        // First success replaces it.
        gateway.fail_categories.store(false, Ordering::SeqCst);
        service.load_categories().await.unwrap();
        assert_eq!(service.categories(), vec!["Rent", "Coffee"]);

        // A later failure keeps the last successful result, not the fallback.
        gateway.fail_categories.store(true, Ordering::SeqCst);
        assert!(service.load_categories().await.is_err());
        assert_eq!(service.categories(), vec!["Rent", "Coffee"]);
    }

    #[tokio::test]
    async fn filter_locally_is_pure_and_read_only() {
        let gateway = Arc::new(MockTransactionGateway::default());
        let (service, _) = service_with(gateway);
        service.create(new_expense("Coffee")).await.unwrap();
        let mut income = new_expense("Salary");
        income.kind = TransactionType::Income;
        service.create(income).await.unwrap();

        let expenses =
            service.filter_locally(&|t| t.kind == TransactionType::Expense);
        let typed = service.filtered(&LocalFilter {
            kind: Some(TransactionType::Income),
            ..Default::default()
        });

        assert_eq!(expenses.len(), 1);
        assert_eq!(typed.len(), 1);
        assert_eq!(service.transactions().len(), 2);
    }

    #[tokio::test]
    async fn confirmed_mutations_mirror_snapshot_into_store() {
        let gateway = Arc::new(MockTransactionGateway::default());
        let (service, store) = service_with(gateway);

        let created = service.create(new_expense("Mirrored")).await.unwrap();

        let snapshot = store.get(TRANSACTIONS_KEY).unwrap().expect("snapshot written");
        let mirrored: Vec<Transaction> = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored[0].id, created.id);
    }

    #[tokio::test]
    async fn initial_load_skips_without_persisted_token() {
        let gateway = Arc::new(MockTransactionGateway::default());
        gateway
            .server
            .lock()
            .unwrap()
            .push(Transaction {
                id: "srv-1".to_string(),
                user_id: "u1".to_string(),
                amount: dec!(1),
                description: "Pre-existing".to_string(),
                category: "Other".to_string(),
                kind: TransactionType::Expense,
                date: Utc::now(),
                confidence: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
        let (service, store) = service_with(gateway.clone());

        service.initial_load().await;
        assert!(service.transactions().is_empty());

        store.set(AUTH_TOKEN_KEY, "tok").await.unwrap();
        service.initial_load().await;
        assert_eq!(service.transactions().len(), 1);
    }
}
