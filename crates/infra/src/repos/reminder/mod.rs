mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderRepo;
pub use postgres::PostgresReminderRepo;

use crate::repos::shared::repo::DeleteResult;
use binge_calendar_domain::{ReminderInstance, ReminderPlan, ReminderState, ID};

/// Storage of `ReminderInstance`s.
///
/// Every state transition is a conditional update so that concurrent
/// dispatch ticks and materializations can never both win.
#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn bulk_insert(&self, reminders: &[ReminderInstance]) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<ReminderInstance>;
    async fn find_by_subscription(
        &self,
        subscription_id: &ID,
    ) -> anyhow::Result<Vec<ReminderInstance>>;
    /// Reminders that can be claimed at `now`, ordered by fire instant and
    /// then subscription
    async fn find_due(&self, now: i64, limit: usize) -> anyhow::Result<Vec<ReminderInstance>>;
    /// Moves a due reminder to `Claimed` with a lease that ends at
    /// `lease_until`. Returns `None` when somebody else got it first or
    /// it is no longer due.
    async fn claim(
        &self,
        reminder_id: &ID,
        now: i64,
        lease_until: i64,
    ) -> anyhow::Result<Option<ReminderInstance>>;
    /// Rolls a claim back to `Pending` and counts the failed attempt.
    /// Returns false if the claim was lost or a newer pending reminder
    /// took the place of this one.
    async fn release_claim(
        &self,
        claimed: &ReminderInstance,
        retry_at: i64,
    ) -> anyhow::Result<bool>;
    /// Moves a claim into a final state. Returns false if the claim was lost.
    async fn finish_claim(
        &self,
        claimed: &ReminderInstance,
        state: ReminderState,
    ) -> anyhow::Result<bool>;
    /// Hands the stored reminders of a subscription to `planner` and applies
    /// the returned plan. Only reminders in the plan that are still pending
    /// get suppressed. Plans for one subscription never overlap, the next
    /// planner sees everything the previous one wrote.
    async fn apply_plan(
        &self,
        subscription_id: &ID,
        planner: &(dyn for<'r> Fn(&'r [ReminderInstance]) -> ReminderPlan + Send + Sync),
    ) -> anyhow::Result<ReminderPlan>;
    async fn suppress_pending_by_subscription(&self, subscription_id: &ID)
        -> anyhow::Result<u64>;
    async fn delete_by_subscription(&self, subscription_id: &ID) -> anyhow::Result<DeleteResult>;
}
