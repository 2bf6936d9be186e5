use std::time::Duration;
use crate::server::database::store::Store;

pub(crate) struct AppState<S>
where S: Store
{
    store: S,
    db_timeout: Duration,
}

impl<S> AppState<S>
where S: Store
{
    pub fn new(store: S, db_timeout: Duration) -> Self {
        Self { store, db_timeout }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn db_timeout(&self) -> Duration {
        self.db_timeout
    }
}
