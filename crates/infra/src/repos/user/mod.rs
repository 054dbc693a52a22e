mod inmemory;
mod postgres;

pub use inmemory::InMemoryUserRepo;
pub use postgres::PostgresUserRepo;

use binge_calendar_domain::{UserProfile, ID};

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    /// Inserts or replaces the `UserProfile`
    async fn save(&self, user: &UserProfile) -> anyhow::Result<()>;
    async fn find(&self, user_id: &ID) -> Option<UserProfile>;
}
