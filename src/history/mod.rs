mod snapshot;
mod store;

pub use snapshot::Snapshot;
pub use store::{DEFAULT_HISTORY_CAPACITY, HistoryStore};
