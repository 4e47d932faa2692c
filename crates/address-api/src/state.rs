use address_db::AddressStore;
use chrono::{DateTime, Utc};

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub store: AddressStore,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: AddressStore) -> Self {
        Self {
            store,
            started_at: Utc::now(),
        }
    }
}
