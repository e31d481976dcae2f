pub mod analytics_model;
pub mod analytics_service;
pub mod analytics_traits;

pub use analytics_model::*;
pub use analytics_service::AnalyticsService;
pub use analytics_traits::{AnalyticsGateway, AnalyticsServiceTrait};
