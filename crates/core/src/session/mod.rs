pub mod session_model;
pub mod session_service;
pub mod session_traits;

pub use session_model::*;
pub use session_service::{SessionGate, SessionService};
pub use session_traits::{AuthGateway, SessionServiceTrait};
