mod media_event;
mod notification;
mod reminder;
mod shared;
mod subscription;
mod user;

use media_event::{InMemoryMediaEventRepo, PostgresMediaEventRepo};
use notification::{InMemoryNotificationRepo, PostgresNotificationRepo};
use reminder::{InMemoryReminderRepo, PostgresReminderRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use subscription::{InMemorySubscriptionRepo, PostgresSubscriptionRepo};
use tracing::info;
use user::{InMemoryUserRepo, PostgresUserRepo};

pub use media_event::IMediaEventRepo;
pub use notification::INotificationRepo;
pub use reminder::IReminderRepo;
pub use shared::repo::DeleteResult;
pub use subscription::ISubscriptionRepo;
pub use user::IUserRepo;

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IMediaEventRepo>,
    pub subscriptions: Arc<dyn ISubscriptionRepo>,
    pub reminders: Arc<dyn IReminderRepo>,
    pub notifications: Arc<dyn INotificationRepo>,
    pub users: Arc<dyn IUserRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            events: Arc::new(PostgresMediaEventRepo::new(pool.clone())),
            subscriptions: Arc::new(PostgresSubscriptionRepo::new(pool.clone())),
            reminders: Arc::new(PostgresReminderRepo::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepo::new(pool.clone())),
            users: Arc::new(PostgresUserRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            events: Arc::new(InMemoryMediaEventRepo::new()),
            subscriptions: Arc::new(InMemorySubscriptionRepo::new()),
            reminders: Arc::new(InMemoryReminderRepo::new()),
            notifications: Arc::new(InMemoryNotificationRepo::new()),
            users: Arc::new(InMemoryUserRepo::new()),
        }
    }
}
