pub mod memory_store;
pub mod settings_model;
pub mod settings_service;
pub mod settings_traits;

pub use memory_store::MemoryStateStore;
pub use settings_model::Theme;
pub use settings_service::SettingsService;
pub use settings_traits::{SettingsServiceTrait, StateStoreTrait};
