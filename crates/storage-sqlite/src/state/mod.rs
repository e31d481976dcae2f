pub mod model;
pub mod repository;

pub use model::DeviceStateRow;
pub use repository::SqliteStateStore;
