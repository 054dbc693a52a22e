mod inmemory;
mod postgres;

pub use inmemory::InMemorySubscriptionRepo;
pub use postgres::PostgresSubscriptionRepo;

use crate::repos::shared::repo::DeleteResult;
use binge_calendar_domain::{Subscription, ID};

#[async_trait::async_trait]
pub trait ISubscriptionRepo: Send + Sync {
    /// Fails if the user already has a `Subscription` for the event
    async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()>;
    async fn save(&self, subscription: &Subscription) -> anyhow::Result<()>;
    async fn find(&self, subscription_id: &ID) -> anyhow::Result<Option<Subscription>>;
    async fn find_by_user_and_event(&self, user_id: &ID, event_id: &ID) -> Option<Subscription>;
    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<Subscription>>;
    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<Subscription>>;
    async fn delete(&self, subscription_id: &ID) -> Option<Subscription>;
    async fn delete_by_event(&self, event_id: &ID) -> anyhow::Result<DeleteResult>;
}
