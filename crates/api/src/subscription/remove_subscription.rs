use crate::{
    error::BingeError,
    shared::{
        auth::protect_user_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use binge_calendar_api_structs::remove_subscription::*;
use binge_calendar_domain::{Subscription, ID};
use binge_calendar_infra::BingeContext;
use tracing::error;

fn handle_error(e: UseCaseError) -> BingeError {
    match e {
        UseCaseError::NotFound(subscription_id) => BingeError::NotFound(format!(
            "The subscription with id: {}, was not found.",
            subscription_id
        )),
        UseCaseError::StorageError => BingeError::InternalError,
    }
}

pub async fn remove_subscription_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<BingeContext>,
) -> Result<HttpResponse, BingeError> {
    let user_id = protect_user_route(&http_req)?;

    let usecase = RemoveSubscriptionUseCase {
        user_id,
        subscription_id: path_params.subscription_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Ok().json(APIResponse::new(subscription)))
        .map_err(handle_error)
}

/// Deletes a `Subscription` together with its reminders and notifications.
///
/// Pending reminders are suppressed first so that a dispatch tick running
/// at the same time can no longer claim them.
pub async fn cascade_delete_subscription(
    subscription: &Subscription,
    ctx: &BingeContext,
) -> anyhow::Result<()> {
    ctx.repos
        .reminders
        .suppress_pending_by_subscription(&subscription.id)
        .await?;
    ctx.repos
        .reminders
        .delete_by_subscription(&subscription.id)
        .await?;
    ctx.repos
        .notifications
        .delete_by_subscription(&subscription.id)
        .await?;
    ctx.repos.subscriptions.delete(&subscription.id).await;
    Ok(())
}

#[derive(Debug)]
pub struct RemoveSubscriptionUseCase {
    pub user_id: ID,
    pub subscription_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for RemoveSubscriptionUseCase {
    type Response = Subscription;

    type Error = UseCaseError;

    const NAME: &'static str = "RemoveSubscription";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        let subscription = match ctx.repos.subscriptions.find(&self.subscription_id).await {
            Ok(Some(subscription)) if subscription.user_id == self.user_id => subscription,
            Ok(_) => return Err(UseCaseError::NotFound(self.subscription_id.clone())),
            Err(e) => {
                error!(
                    "Unable to find subscription {}. Err: {:?}",
                    self.subscription_id, e
                );
                return Err(UseCaseError::StorageError);
            }
        };

        cascade_delete_subscription(&subscription, ctx)
            .await
            .map_err(|e| {
                error!(
                    "Unable to delete subscription {}. Err: {:?}",
                    subscription.id, e
                );
                UseCaseError::StorageError
            })?;

        Ok(subscription)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{movie_night, setup, ts};
    use binge_calendar_domain::{
        DeliveryMethod, NotificationRecord, ReminderInstance, ReminderState, RenderedMessage,
    };

    #[actix_web::test]
    async fn cascades_to_reminders_and_notifications() {
        let test = setup(ts(12, 0));
        let ctx = &test.ctx;
        let event = movie_night(ts(20, 0));
        ctx.repos.events.insert(&event).await.unwrap();
        let subscription = Subscription::new(ID::new(), event.id.clone(), 0);
        ctx.repos.subscriptions.insert(&subscription).await.unwrap();
        let reminder = ReminderInstance::new(
            &subscription.id,
            &subscription.user_id,
            &event.id,
            15,
            ts(19, 45),
            1,
            ReminderState::Pending,
            0,
        );
        ctx.repos
            .reminders
            .bulk_insert(&[reminder.clone()])
            .await
            .unwrap();
        let record = NotificationRecord::for_reminder(
            &reminder,
            RenderedMessage {
                title: "title".into(),
                body: "body".into(),
            },
            DeliveryMethod::InApp,
            0,
        );
        ctx.repos.notifications.insert_if_absent(&record).await.unwrap();

        let usecase = RemoveSubscriptionUseCase {
            user_id: ID::new(),
            subscription_id: subscription.id.clone(),
        };
        assert!(matches!(
            execute(usecase, ctx).await,
            Err(UseCaseError::NotFound(_))
        ));

        let usecase = RemoveSubscriptionUseCase {
            user_id: subscription.user_id.clone(),
            subscription_id: subscription.id.clone(),
        };
        assert!(execute(usecase, ctx).await.is_ok());
        assert!(ctx.repos.subscriptions.find(&subscription.id).await.unwrap().is_none());
        assert!(ctx.repos.reminders.find(&reminder.id).await.is_none());
        assert!(ctx
            .repos
            .notifications
            .find_by_reminder(&reminder.id)
            .await
            .unwrap()
            .is_none());
    }
}
