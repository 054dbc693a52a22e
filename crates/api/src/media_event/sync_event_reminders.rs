use crate::{
    shared::usecase::{execute, UseCase},
    subscription::sync_subscription_reminders::SyncSubscriptionRemindersUseCase,
};
use binge_calendar_domain::MediaEvent;
use binge_calendar_infra::BingeContext;
use tracing::error;

/// Re-materializes the reminders of every `Subscription` of a `MediaEvent`
/// after catalog ingestion changed it
#[derive(Debug)]
pub struct SyncEventRemindersUseCase<'a> {
    pub event: &'a MediaEvent,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl<'a> UseCase for SyncEventRemindersUseCase<'a> {
    /// Number of subscriptions that were synced
    type Response = usize;

    type Error = UseCaseError;

    const NAME: &'static str = "SyncEventReminders";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        let subscriptions = ctx
            .repos
            .subscriptions
            .find_by_event(&self.event.id)
            .await
            .map_err(|e| {
                error!(
                    "Unable to find subscriptions of event {}. Err: {:?}",
                    self.event.id, e
                );
                UseCaseError::StorageError
            })?;

        let mut synced = 0;
        for subscription in &subscriptions {
            let usecase = SyncSubscriptionRemindersUseCase {
                subscription,
                event: self.event,
            };
            // A failing subscription must not hold back the others
            if execute(usecase, ctx).await.is_ok() {
                synced += 1;
            }
        }

        Ok(synced)
    }
}
