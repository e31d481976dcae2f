//! Environment-driven configuration for the CLI.

use pennyflow_connect::DEFAULT_API_URL;

pub struct Config {
    /// Base URL of the backend API, including the `/api` prefix.
    pub api_url: String,
    /// Path of the SQLite device-state database.
    pub db_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        // A missing .env file is fine; real environment variables still apply.
        let _ = dotenvy::dotenv();
        Config {
            api_url: std::env::var("PENNYFLOW_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            db_path: std::env::var("PENNYFLOW_DB_PATH")
                .unwrap_or_else(|_| "pennyflow.db".to_string()),
        }
    }
}
