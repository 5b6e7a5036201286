//! Eklavya application composition root
//!
//! Composes all domain routers into a single application.

use std::sync::Arc;

use axum::Router;
use eklavya_auth::{AuthBackend, AuthConfig};
use eklavya_bookings::{BookingService, BookingsRepositories, BookingsState};
use eklavya_common::config::{Config, LogFormat, StoreBackend};
use eklavya_common::{Clock, SystemClock};
use eklavya_directory::{AccountDirectory, StoreAccountDirectory};
use eklavya_scribes::{ScribesRepositories, ScribesState};
use eklavya_store::{DocumentStore, MemoryStore, PgDocumentStore, ResilienceConfig, ResilientStore};
use tower_http::trace::TraceLayer;
use tracing::info;

/// External collaborators the application is built on
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn DocumentStore>,
    pub directory: Arc<dyn AccountDirectory>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Store selected by configuration, wrapped with timeout and retry, and
    /// the account directory reading the same store.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let backend: Arc<dyn DocumentStore> = match config.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory store");
                Arc::new(MemoryStore::new())
            }
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required"))?;
                let store = PgDocumentStore::connect(url)
                    .await
                    .map_err(|e| anyhow::anyhow!("Database connection failed: {}", e))?;
                store
                    .migrate()
                    .await
                    .map_err(|e| anyhow::anyhow!("Database migration failed: {}", e))?;
                info!("Postgres store connected and migrated");
                Arc::new(store)
            }
        };

        let store: Arc<dyn DocumentStore> = Arc::new(ResilientStore::new(
            backend,
            ResilienceConfig {
                timeout: config.store_timeout(),
                max_retries: config.store_max_retries,
            },
        ));
        let directory = Arc::new(StoreAccountDirectory::new(Arc::clone(&store)));

        Ok(Self {
            store,
            directory,
            clock: Arc::new(SystemClock),
        })
    }
}

/// Create the main application router with all routes and middleware
pub fn create_app(config: &Config, collaborators: Collaborators) -> Router {
    let Collaborators {
        store,
        directory,
        clock,
    } = collaborators;

    let auth = AuthBackend::new(Arc::clone(&directory), AuthConfig::from_config(config));

    let scribes_repos = ScribesRepositories::new(Arc::clone(&store));
    let bookings_service = BookingService::new(
        BookingsRepositories::new(Arc::clone(&store)),
        scribes_repos.scribes.clone(),
        directory,
        clock,
    );

    let scribes_state = ScribesState {
        repos: scribes_repos,
        auth: auth.clone(),
    };
    let bookings_state = BookingsState {
        service: bookings_service,
        auth,
    };

    // Compose domain routers with shared infrastructure routes
    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(eklavya_scribes::routes().with_state(scribes_state))
        .merge(eklavya_bookings::routes().with_state(bookings_state))
        .layer(TraceLayer::new_for_http())
}

/// Install the global tracing subscriber
pub fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.rust_log));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .init(),
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
