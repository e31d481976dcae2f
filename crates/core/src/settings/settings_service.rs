use std::sync::Arc;

use async_trait::async_trait;
use log::warn;

use crate::constants::THEME_KEY;
use crate::errors::Result;
use crate::settings::settings_model::Theme;
use crate::settings::settings_traits::{SettingsServiceTrait, StateStoreTrait};

pub struct SettingsService {
    store: Arc<dyn StateStoreTrait>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn StateStoreTrait>) -> Self {
        SettingsService { store }
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn theme(&self) -> Theme {
        match self.store.get(THEME_KEY) {
            Ok(Some(value)) => value.parse().unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Failed to read theme preference: {}", e);
                Theme::default()
            }
        }
    }

    async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str()).await
    }
}
