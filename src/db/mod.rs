mod creators;
mod daily;
mod pending;
mod schema;
mod store;

pub use creators::CreatorRegistry;
pub use daily::{app_day_date, DailyStatusTracker, DAY_BOUNDARY_HOUR};
pub use pending::PendingReturn;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
