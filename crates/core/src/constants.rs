/// State-store key holding the bearer token
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// State-store key holding the serialized user record
pub const AUTH_USER_KEY: &str = "auth_user";

/// State-store key holding the mirrored transaction list
pub const TRANSACTIONS_KEY: &str = "transactions";

/// State-store key holding the theme preference
pub const THEME_KEY: &str = "theme";

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Default number of days covered by the trend series
pub const DEFAULT_TREND_DAYS: u32 = 30;

/// Categories used until the first successful categories fetch
pub const FALLBACK_CATEGORIES: [&str; 10] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Income",
    "Groceries",
    "Travel",
    "Other",
];
