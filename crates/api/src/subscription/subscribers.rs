use super::{
    add_subscription::AddSubscriptionUseCase,
    sync_subscription_reminders::SyncSubscriptionRemindersUseCase,
    update_subscription::UpdateSubscriptionUseCase,
};
use crate::shared::usecase::{execute, Subscriber};
use binge_calendar_domain::Subscription;
use binge_calendar_infra::BingeContext;
use tracing::error;

async fn sync_reminders(subscription: &Subscription, ctx: &BingeContext) {
    let event = match ctx.repos.events.find(&subscription.event_id).await {
        Ok(Some(event)) => event,
        Err(e) => {
            error!(
                "Unable to find event {} of subscription {}. Err: {:?}",
                subscription.event_id, subscription.id, e
            );
            return;
        }
        Ok(None) => {
            error!(
                "Subscription {} refers to the missing event {}",
                subscription.id, subscription.event_id
            );
            return;
        }
    };
    let sync_reminders = SyncSubscriptionRemindersUseCase {
        subscription,
        event: &event,
    };

    // Sideeffect, ignore result
    let _ = execute(sync_reminders, ctx).await;
}

pub struct CreateRemindersOnSubscriptionAdded;

#[async_trait::async_trait(?Send)]
impl Subscriber<AddSubscriptionUseCase> for CreateRemindersOnSubscriptionAdded {
    async fn notify(&self, subscription: &Subscription, ctx: &BingeContext) {
        sync_reminders(subscription, ctx).await;
    }
}

pub struct SyncRemindersOnSubscriptionUpdated;

#[async_trait::async_trait(?Send)]
impl Subscriber<UpdateSubscriptionUseCase> for SyncRemindersOnSubscriptionUpdated {
    async fn notify(&self, subscription: &Subscription, ctx: &BingeContext) {
        sync_reminders(subscription, ctx).await;
    }
}
