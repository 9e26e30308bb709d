pub mod app_config;
pub mod database;
pub mod memory;
pub mod account_repo;
pub mod property_repo;
pub mod booking_repo;
pub mod feedback_repo;

use std::sync::Arc;

use lodge_core::repository::{
    AccountRepository, BookingRepository, CommentRepository, PropertyRepository, SuggestionRepository,
};
use tracing::info;

pub use app_config::{Config, StorageBackend};
pub use database::DbClient;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreSetupError {
    #[error("Database configuration missing for the postgres backend")]
    MissingDatabaseConfig,
    #[error("Database connection failed: {0}")]
    Connection(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// The persistence collaborators, one handle per entity.
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountRepository>,
    pub properties: Arc<dyn PropertyRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub suggestions: Arc<dyn SuggestionRepository>,
}

impl Repositories {
    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            accounts: store.clone(),
            properties: store.clone(),
            bookings: store.clone(),
            comments: store.clone(),
            suggestions: store,
        }
    }

    pub fn postgres(db: &DbClient) -> Self {
        let feedback = Arc::new(feedback_repo::PgFeedbackRepository::new(db.pool.clone()));
        Self {
            accounts: Arc::new(account_repo::PgAccountRepository::new(db.pool.clone())),
            properties: Arc::new(property_repo::PgPropertyRepository::new(db.pool.clone())),
            bookings: Arc::new(booking_repo::PgBookingRepository::new(db.pool.clone())),
            comments: feedback.clone(),
            suggestions: feedback,
        }
    }

    /// Build the configured backend, running migrations for Postgres when enabled.
    pub async fn connect(config: &Config) -> Result<Self, StoreSetupError> {
        match config.storage.backend {
            StorageBackend::Memory => {
                let store = MemoryStore::new();
                for account in &config.storage.accounts {
                    store.register_account(*account).await;
                }
                info!("Using in-memory storage with {} seeded accounts", config.storage.accounts.len());
                Ok(Self::in_memory(Arc::new(store)))
            }
            StorageBackend::Postgres => {
                let database = config
                    .database
                    .as_ref()
                    .ok_or(StoreSetupError::MissingDatabaseConfig)?;
                let db = DbClient::new(&database.url, database.max_connections).await?;
                if database.run_migrations {
                    db.migrate().await?;
                }
                info!("Using Postgres storage");
                Ok(Self::postgres(&db))
            }
        }
    }
}
