use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::docstore::DocStore;

/// Shared handles for the request handlers. Both stores are constructed
/// once at boot and passed around by handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub docs: Arc<dyn DocStore>,
}

impl AppState {
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn docs(&self) -> &dyn DocStore {
        self.docs.as_ref()
    }
}
