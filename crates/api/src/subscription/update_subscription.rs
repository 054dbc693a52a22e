use super::{reminder_limit, subscribers::SyncRemindersOnSubscriptionUpdated};
use crate::{
    error::BingeError,
    shared::{
        auth::protect_user_route,
        usecase::{execute, Subscriber, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use binge_calendar_api_structs::update_subscription::*;
use binge_calendar_domain::{
    DeliveryMethod, InvalidSubscriptionError, Subscription, WatchStatus, ID,
};
use binge_calendar_infra::BingeContext;
use tracing::error;

fn handle_error(e: UseCaseError) -> BingeError {
    match e {
        UseCaseError::NotFound(subscription_id) => BingeError::NotFound(format!(
            "The subscription with id: {}, was not found.",
            subscription_id
        )),
        UseCaseError::InvalidSubscription(e) => BingeError::BadClientData(e.to_string()),
        UseCaseError::StorageError => BingeError::InternalError,
    }
}

pub async fn update_subscription_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<BingeContext>,
) -> Result<HttpResponse, BingeError> {
    let user_id = protect_user_route(&http_req)?;

    let body = body.0;
    let usecase = UpdateSubscriptionUseCase {
        user_id,
        subscription_id: path_params.subscription_id.clone(),
        reminder_offsets: body.reminder_offsets,
        notifications_enabled: body.notifications_enabled,
        delivery_method: body.delivery_method,
        watch_status: body.watch_status,
        custom_title: body.custom_title,
        custom_notes: body.custom_notes,
        is_favorite: body.is_favorite,
        user_rating: body.user_rating,
        watch_progress: body.watch_progress,
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Ok().json(APIResponse::new(subscription)))
        .map_err(handle_error)
}

/// Updates the fields that are set, leaving the rest as they are
#[derive(Debug, Default)]
pub struct UpdateSubscriptionUseCase {
    pub user_id: ID,
    pub subscription_id: ID,
    pub reminder_offsets: Option<Vec<i64>>,
    pub notifications_enabled: Option<bool>,
    pub delivery_method: Option<DeliveryMethod>,
    pub watch_status: Option<WatchStatus>,
    pub custom_title: Option<String>,
    pub custom_notes: Option<String>,
    pub is_favorite: Option<bool>,
    pub user_rating: Option<u8>,
    pub watch_progress: Option<u8>,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    InvalidSubscription(InvalidSubscriptionError),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateSubscriptionUseCase {
    type Response = Subscription;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateSubscription";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        let mut subscription = match ctx.repos.subscriptions.find(&self.subscription_id).await {
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

        if let Some(offsets) = &self.reminder_offsets {
            // Limits apply to the write only, a downgraded user keeps what was set before
            let mut given = offsets.clone();
            given.sort_unstable_by(|a, b| b.cmp(a));
            if given != subscription.reminder_offsets {
                let profile = ctx.services.billing.get_user_profile(&self.user_id).await;
                subscription
                    .set_reminder_offsets(offsets, reminder_limit(&profile, &ctx.config))
                    .map_err(UseCaseError::InvalidSubscription)?;
            }
        }
        if self.user_rating.is_some() {
            subscription
                .set_user_rating(self.user_rating)
                .map_err(UseCaseError::InvalidSubscription)?;
        }
        if let Some(progress) = self.watch_progress {
            subscription
                .set_watch_progress(progress)
                .map_err(UseCaseError::InvalidSubscription)?;
        }
        if let Some(enabled) = self.notifications_enabled {
            subscription.notifications_enabled = enabled;
        }
        if let Some(delivery_method) = self.delivery_method {
            subscription.delivery_method = delivery_method;
        }
        if let Some(watch_status) = self.watch_status {
            subscription.watch_status = watch_status;
        }
        if let Some(is_favorite) = self.is_favorite {
            subscription.is_favorite = is_favorite;
        }
        if self.custom_title.is_some() {
            subscription.custom_title = self.custom_title.take();
        }
        if self.custom_notes.is_some() {
            subscription.custom_notes = self.custom_notes.take();
        }
        subscription.updated = ctx.sys.get_timestamp_millis();

        ctx.repos
            .subscriptions
            .save(&subscription)
            .await
            .map_err(|e| {
                error!("Unable to save subscription {}. Err: {:?}", subscription.id, e);
                UseCaseError::StorageError
            })?;

        Ok(subscription)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(SyncRemindersOnSubscriptionUpdated)]
    }
}
