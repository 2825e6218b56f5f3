use std::sync::Arc;

use crate::config::Config;
use crate::engine::Engine;
use crate::notify::Notifier;
use crate::store::Store;

/// Shared per-request context: the store, the allocation engine wired
/// over it, the notifier collaborator and the static configuration.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub engine: Engine,
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, config: Config) -> Self {
        Self {
            engine: Engine::new(store.clone()),
            store,
            notifier,
            config: Arc::new(config),
        }
    }
}
