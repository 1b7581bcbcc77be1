use std::sync::Arc;

use super::{
    arena::Arena,
    auth::{Authorizer, SharedSecret},
    clock::{Clock, SystemClock},
    config::Config,
    store::{FileStore, Store, StoreError},
};

pub struct AppState {
    pub config: Config,
    pub arena: Arena,
    pub authorizer: Arc<dyn Authorizer>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let store = FileStore::new(&config.db_path, &config.default_title)?;

        // Fail at startup rather than on the first request.
        store.load()?;

        let authorizer = Arc::new(SharedSecret::new(config.admin_password.clone()));

        Ok(Self::with_parts(
            config,
            Box::new(store),
            Arc::new(SystemClock),
            authorizer,
        ))
    }

    pub fn with_parts(
        config: Config,
        store: Box<dyn Store>,
        clock: Arc<dyn Clock>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            arena: Arena::new(store, clock),
            authorizer,
        })
    }
}
