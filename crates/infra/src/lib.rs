mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, MAX_RETRY_BACKOFF_MILLIS};
pub use repos::{
    DeleteResult, IMediaEventRepo, INotificationRepo, IReminderRepo, ISubscriptionRepo,
    IUserRepo, Repos,
};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, MockSys, RealSys};
use tracing::{info, warn};

#[derive(Clone)]
pub struct BingeContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub services: Services,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl BingeContext {
    async fn create(params: ContextParams) -> Self {
        let repos = match Repos::create_postgres(&params.postgres_connection_string).await {
            Ok(repos) => repos,
            Err(e) => panic!("Postgres credentials must be set and valid. Err: {:?}", e),
        };
        Self::with_repos(repos)
    }

    fn with_repos(repos: Repos) -> Self {
        let config = Config::new();
        let services = Services::create(&config, &repos);
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            services,
        }
    }
}

/// Will setup the infrastructure context given the environment.
/// Falls back to in-memory repositories when no database is configured.
pub async fn setup_context() -> BingeContext {
    match get_psql_connection_string() {
        Some(postgres_connection_string) => {
            BingeContext::create(ContextParams {
                postgres_connection_string,
            })
            .await
        }
        None => {
            info!("No DATABASE_URL given, state will only be kept in memory.");
            create_inmemory()
        }
    }
}

/// Context backed by in-memory repositories
pub fn create_inmemory() -> BingeContext {
    BingeContext::with_repos(Repos::create_inmemory())
}

fn get_psql_connection_string() -> Option<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING).ok()
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let connection_string = match get_psql_connection_string() {
        Some(connection_string) => connection_string,
        None => {
            warn!("No DATABASE_URL given, skipping migrations.");
            return Ok(());
        }
    };
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await?;

    sqlx::migrate!().run(&pool).await
}
