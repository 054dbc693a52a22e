use crate::shared::usecase::UseCase;
use binge_calendar_domain::{
    materialize_reminders, MediaEvent, ReminderInstance, ReminderPlan, Subscription,
};
use binge_calendar_infra::BingeContext;
use tracing::{error, warn};

const MAX_PLAN_ATTEMPTS: usize = 3;

/// Brings the stored `ReminderInstance`s of a `Subscription` in line with
/// the `Subscription` and its `MediaEvent`
#[derive(Debug)]
pub struct SyncSubscriptionRemindersUseCase<'a> {
    pub subscription: &'a Subscription,
    pub event: &'a MediaEvent,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl<'a> UseCase for SyncSubscriptionRemindersUseCase<'a> {
    type Response = ReminderPlan;

    type Error = UseCaseError;

    const NAME: &'static str = "SyncSubscriptionReminders";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let (subscription, event) = (self.subscription, self.event);
        let planner =
            |existing: &[ReminderInstance]| materialize_reminders(subscription, event, existing, now);

        let mut attempt = 1;
        loop {
            match ctx
                .repos
                .reminders
                .apply_plan(&subscription.id, &planner)
                .await
            {
                Ok(plan) => return Ok(plan),
                // A dispatcher releasing a claim can take the slot of a planned reminder
                Err(e) if attempt < MAX_PLAN_ATTEMPTS => {
                    warn!(
                        "Planning reminders of subscription {} failed on attempt {}, trying again. Err: {:?}",
                        subscription.id, attempt, e
                    );
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        "Unable to sync reminders of subscription {}. Err: {:?}",
                        subscription.id, e
                    );
                    return Err(UseCaseError::StorageError);
                }
            }
        }
    }
}
