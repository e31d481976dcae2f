//! Traits for device-local state and settings.

use async_trait::async_trait;

use crate::errors::Result;
use crate::settings::settings_model::Theme;

/// Durable key-value storage for device-local client state.
///
/// Keys are the fixed names in [`crate::constants`]: the bearer token, the
/// serialized user record, the mirrored transaction list, and the theme
/// preference. The session service is the only writer of the auth keys.
#[async_trait]
pub trait StateStoreTrait: Send + Sync {
    /// Read a value. Returns `None` if the key has never been set.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Service trait for device settings.
#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    /// Current theme preference, defaulting to `System` when unset or
    /// unreadable.
    fn theme(&self) -> Theme;

    async fn set_theme(&self, theme: Theme) -> Result<()>;
}
