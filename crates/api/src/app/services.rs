use std::sync::Arc;

use sqlx::PgPool;

use stockroom_store::{InMemoryPartStore, PartStore, PostgresPartStore};

/// Service handles shared by all request handlers.
///
/// The store is constructed once at startup and injected through the router;
/// handlers never reach for global connection state.
pub struct AppServices {
    store: Arc<dyn PartStore>,
}

impl AppServices {
    pub fn new(store: Arc<dyn PartStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn PartStore {
        self.store.as_ref()
    }
}

/// Select the backing store from the environment.
///
/// `USE_PERSISTENT_STORE=true` selects Postgres (requires `DATABASE_URL`);
/// anything else gets the in-memory store (dev/test).
pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORE")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set when USE_PERSISTENT_STORE=true");

        let pool = PgPool::connect(&database_url)
            .await
            .expect("failed to connect to Postgres");

        let store = PostgresPartStore::new(pool);
        store
            .ensure_schema()
            .await
            .expect("failed to ensure parts schema");

        tracing::info!("using Postgres part store");
        return AppServices::new(Arc::new(store));
    }

    tracing::info!("using in-memory part store");
    AppServices::new(Arc::new(InMemoryPartStore::new()))
}
