mod config;

use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use config::Config;
use pennyflow_connect::ApiClient;
use pennyflow_core::analytics::{AnalyticsService, AnalyticsServiceTrait, Period};
use pennyflow_core::session::{Registration, SessionService, SessionServiceTrait, User};
use pennyflow_core::settings::{
    SettingsService, SettingsServiceTrait, StateStoreTrait, Theme,
};
use pennyflow_core::transactions::{
    NewTransaction, Transaction, TransactionFilters, TransactionService,
    TransactionServiceTrait, TransactionType, TransactionUpdate,
};
use pennyflow_storage_sqlite::{db, SqliteStateStore};

#[derive(Parser)]
#[command(name = "pennyflow", version, about = "Pennyflow personal finance tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and persist the session
    Login { email: String, password: String },
    /// Create an account
    Register {
        email: String,
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Sign out, clearing the persisted session and transaction snapshot
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the dashboard: aggregate totals plus recent transactions
    Dashboard,
    /// List transactions, optionally filtered server-side
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        kind: Option<TransactionType>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Parse free text into a proposed transaction (does not record it)
    Parse {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Parse free text and record it; without --yes only the proposal is shown
    Quick {
        #[arg(required = true)]
        text: Vec<String>,
        #[arg(long)]
        yes: bool,
    },
    /// Record a transaction with explicit fields
    Add {
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        kind: TransactionType,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Replace all editable fields of a transaction
    Update {
        id: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        kind: TransactionType,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Delete a transaction
    Delete { id: String },
    /// List known categories
    Categories,
    /// Show aggregate totals
    Summary,
    /// Per-category breakdown for a period
    Breakdown {
        #[arg(long, default_value_t = Period::Month)]
        period: Period,
    },
    /// Income/expense trend series
    Trends {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Month-over-month comparison
    Compare,
    /// Show or set the theme preference
    Theme { value: Option<Theme> },
    /// Probe backend health
    Health,
}

fn init_tracing() {
    let log_format = std::env::var("PENNYFLOW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

/// Everything the commands need, wired once at startup.
struct AppState {
    api: Arc<ApiClient>,
    session: Arc<SessionService>,
    transactions: Arc<TransactionService>,
    analytics: Arc<AnalyticsService>,
    settings: SettingsService,
}

async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let pool = db::init(&config.db_path)
        .with_context(|| format!("opening device-state store at {}", config.db_path))?;
    let store: Arc<dyn StateStoreTrait> = Arc::new(SqliteStateStore::new(pool));
    let api = Arc::new(ApiClient::new(&config.api_url).context("building API client")?);

    let session = Arc::new(SessionService::new(api.clone(), store.clone()));
    // Restore must settle before the caches perform their initial load;
    // the gate below observes its completion.
    session.restore().await;

    let transactions = Arc::new(TransactionService::new(
        api.clone(),
        store.clone(),
        session.gate(),
    ));
    let analytics = Arc::new(AnalyticsService::new(
        api.clone(),
        store.clone(),
        session.gate(),
    ));
    let settings = SettingsService::new(store);

    Ok(AppState {
        api,
        session,
        transactions,
        analytics,
        settings,
    })
}

fn require_session(state: &AppState) -> anyhow::Result<User> {
    match state.session.current_user() {
        Some(user) => Ok(user),
        None => bail!("Not signed in. Run `pennyflow login <email> <password>` first."),
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn print_transaction(t: &Transaction) {
    let confidence = t
        .confidence
        .map(|c| format!("  (parsed, {:.0}% confidence)", c * 100.0))
        .unwrap_or_default();
    println!(
        "{}  {}  {:>10}  {:<8}  {:<18}  {}{}",
        t.id,
        t.date.format("%Y-%m-%d"),
        t.amount,
        t.kind,
        t.category,
        t.description,
        confidence,
    );
}

async fn run(state: AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = state.session.login(&email, &password).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Command::Register {
            email,
            name,
            password,
            confirm,
        } => {
            let user = state
                .session
                .register(Registration {
                    email,
                    password,
                    password_confirm: confirm,
                    name,
                })
                .await?;
            println!("Account created for {} <{}>", user.name, user.email);
        }
        Command::Logout => {
            state.session.sign_out().await;
            println!("Signed out.");
        }
        Command::Whoami => {
            let user = require_session(&state)?;
            println!("{} <{}>", user.name, user.email);
        }
        Command::Dashboard => {
            require_session(&state)?;
            // Both caches wait on the session gate internally; the analytics
            // slices load as one concurrent batch.
            tokio::join!(
                state.transactions.initial_load(),
                state.analytics.initial_load()
            );
            let summary = state.analytics.summary();
            println!(
                "Income {:>10}   Expenses {:>10}   Savings {:>10}",
                summary.total_income, summary.total_expenses, summary.savings
            );
            println!();
            for t in state.transactions.transactions().iter().take(5) {
                print_transaction(t);
            }
        }
        Command::List {
            category,
            kind,
            start,
            end,
            limit,
            offset,
        } => {
            require_session(&state)?;
            let list = state
                .transactions
                .load(TransactionFilters {
                    category,
                    kind,
                    start_date: start,
                    end_date: end,
                    limit,
                    offset,
                })
                .await?;
            if list.is_empty() {
                println!("No transactions found.");
            }
            for t in &list {
                print_transaction(t);
            }
        }
        Command::Parse { text } => {
            require_session(&state)?;
            let proposal = state.transactions.parse(&text.join(" ")).await?;
            println!(
                "{}  {:>10}  {:<8}  {}  ({:.0}% confidence)",
                proposal.description,
                proposal.amount,
                proposal.kind,
                proposal.category,
                proposal.confidence * 100.0,
            );
        }
        Command::Quick { text, yes } => {
            require_session(&state)?;
            let proposal = state.transactions.parse(&text.join(" ")).await?;
            println!(
                "Proposed: {} {} ({}, {})  ({:.0}% confidence)",
                proposal.amount,
                proposal.description,
                proposal.kind,
                proposal.category,
                proposal.confidence * 100.0,
            );
            if yes {
                let created = state.transactions.confirm(proposal).await?;
                println!("Recorded as {}", created.id);
            } else {
                println!("Not recorded. Re-run with --yes to confirm.");
            }
        }
        Command::Add {
            amount,
            description,
            category,
            kind,
            date,
        } => {
            require_session(&state)?;
            let created = state
                .transactions
                .create(NewTransaction {
                    amount,
                    description,
                    category,
                    kind,
                    date: date.map(midnight_utc),
                    confidence: None,
                })
                .await?;
            println!("Recorded as {}", created.id);
        }
        Command::Update {
            id,
            amount,
            description,
            category,
            kind,
            date,
        } => {
            require_session(&state)?;
            let updated = state
                .transactions
                .update(
                    &id,
                    TransactionUpdate {
                        amount,
                        description,
                        category,
                        kind,
                        date: midnight_utc(date),
                    },
                )
                .await?;
            print_transaction(&updated);
        }
        Command::Delete { id } => {
            require_session(&state)?;
            state.transactions.delete(&id).await?;
            println!("Deleted {}", id);
        }
        Command::Categories => {
            require_session(&state)?;
            let names = state.transactions.load_categories().await?;
            for name in names {
                println!("{}", name);
            }
        }
        Command::Summary => {
            require_session(&state)?;
            let summary = state.analytics.load_summary().await?;
            println!("Income:   {:>12}", summary.total_income);
            println!("Expenses: {:>12}", summary.total_expenses);
            println!("Savings:  {:>12}", summary.savings);
            println!("Change:   {:>11.1}%", summary.monthly_change);
        }
        Command::Breakdown { period } => {
            require_session(&state)?;
            let breakdown = state.analytics.load_category_breakdown(period).await?;
            for row in breakdown {
                println!(
                    "{:<20}  {:>10}  {:>5.1}%",
                    row.category, row.amount, row.percentage
                );
            }
        }
        Command::Trends { days } => {
            require_session(&state)?;
            let trends = state.analytics.load_trends(days).await?;
            for point in trends {
                println!(
                    "{}  income {:>10}  expenses {:>10}  net {:>10}",
                    point.date, point.income, point.expenses, point.net
                );
            }
        }
        Command::Compare => {
            require_session(&state)?;
            let months = state.analytics.load_monthly_comparison().await?;
            for month in months {
                println!(
                    "{}  income {:>10}  expenses {:>10}",
                    month.month, month.income, month.expenses
                );
            }
        }
        Command::Theme { value } => match value {
            Some(theme) => {
                state.settings.set_theme(theme).await?;
                println!("Theme set to {}", theme);
            }
            None => println!("{}", state.settings.theme()),
        },
        Command::Health => {
            let health = state.api.health_check().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let config = Config::from_env();
    let state = build_state(&config).await?;
    run(state, cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_quick_entry() {
        let cli = Cli::try_parse_from(["pennyflow", "quick", "Coffee", "at", "Starbucks", "$6.50"])
            .unwrap();
        match cli.command {
            Command::Quick { text, yes } => {
                assert_eq!(text.join(" "), "Coffee at Starbucks $6.50");
                assert!(!yes);
            }
            _ => panic!("expected quick command"),
        }
    }

    #[test]
    fn cli_parses_typed_filters() {
        let cli = Cli::try_parse_from([
            "pennyflow", "list", "--kind", "income", "--start", "2025-01-01",
        ])
        .unwrap();
        match cli.command {
            Command::List { kind, start, .. } => {
                assert_eq!(kind, Some(TransactionType::Income));
                assert_eq!(start, Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
            }
            _ => panic!("expected list command"),
        }
    }
}
