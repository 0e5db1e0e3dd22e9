use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    config::Config,
    notifications::{LogNotifier, Notifier},
};

/// Shared by every request through an `Extension` layer.
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Arc<Self> {
        Self::with_notifier(pool, config, Arc::new(LogNotifier))
    }

    pub fn with_notifier(
        pool: SqlitePool,
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            pool,
            config,
            notifier,
        })
    }
}
