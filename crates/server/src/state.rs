use std::sync::Arc;

use service::directory::{DirectoryPolicy, DirectoryService};
use service::storage::RecordStore;

/// Shared handler state: one directory over one injected store.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<DirectoryService<dyn RecordStore>>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, policy: DirectoryPolicy) -> Self {
        Self { directory: Arc::new(DirectoryService::new(store, policy)) }
    }
}
