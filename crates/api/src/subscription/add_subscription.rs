use super::{reminder_limit, subscribers::CreateRemindersOnSubscriptionAdded};
use crate::{
    error::BingeError,
    shared::{
        auth::protect_user_route,
        usecase::{execute, Subscriber, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use binge_calendar_api_structs::add_subscription::*;
use binge_calendar_domain::{
    DeliveryMethod, InvalidSubscriptionError, Subscription, WatchStatus, ID,
};
use binge_calendar_infra::BingeContext;
use tracing::error;

fn handle_error(e: UseCaseError) -> BingeError {
    match e {
        UseCaseError::EventNotFound(event_id) => BingeError::NotFound(format!(
            "The event with id: {}, was not found.",
            event_id
        )),
        UseCaseError::AlreadySubscribed(event_id) => BingeError::Conflict(format!(
            "The event with id: {}, is already in the calendar of the user.",
            event_id
        )),
        UseCaseError::InvalidSubscription(e) => BingeError::BadClientData(e.to_string()),
        UseCaseError::StorageError => BingeError::InternalError,
    }
}

pub async fn add_subscription_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<BingeContext>,
) -> Result<HttpResponse, BingeError> {
    let user_id = protect_user_route(&http_req)?;

    let body = body.0;
    let usecase = AddSubscriptionUseCase {
        user_id,
        event_id: body.event_id,
        reminder_offsets: body.reminder_offsets,
        notifications_enabled: body.notifications_enabled,
        delivery_method: body.delivery_method,
        watch_status: body.watch_status,
        custom_title: body.custom_title,
        custom_notes: body.custom_notes,
        is_favorite: body.is_favorite,
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Created().json(APIResponse::new(subscription)))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct AddSubscriptionUseCase {
    pub user_id: ID,
    pub event_id: ID,
    pub reminder_offsets: Vec<i64>,
    pub notifications_enabled: Option<bool>,
    pub delivery_method: Option<DeliveryMethod>,
    pub watch_status: Option<WatchStatus>,
    pub custom_title: Option<String>,
    pub custom_notes: Option<String>,
    pub is_favorite: Option<bool>,
}

#[derive(Debug)]
pub enum UseCaseError {
    EventNotFound(ID),
    AlreadySubscribed(ID),
    InvalidSubscription(InvalidSubscriptionError),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for AddSubscriptionUseCase {
    type Response = Subscription;

    type Error = UseCaseError;

    const NAME: &'static str = "AddSubscription";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        let event = ctx
            .repos
            .events
            .find(&self.event_id)
            .await
            .map_err(|e| {
                error!("Unable to find event {}. Err: {:?}", self.event_id, e);
                UseCaseError::StorageError
            })?
            .ok_or_else(|| UseCaseError::EventNotFound(self.event_id.clone()))?;

        if ctx
            .repos
            .subscriptions
            .find_by_user_and_event(&self.user_id, &event.id)
            .await
            .is_some()
        {
            return Err(UseCaseError::AlreadySubscribed(event.id));
        }

        let profile = ctx.services.billing.get_user_profile(&self.user_id).await;
        let now = ctx.sys.get_timestamp_millis();
        let mut subscription = Subscription::new(self.user_id.clone(), event.id.clone(), now);
        subscription
            .set_reminder_offsets(&self.reminder_offsets, reminder_limit(&profile, &ctx.config))
            .map_err(UseCaseError::InvalidSubscription)?;
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
        subscription.custom_title = self.custom_title.take();
        subscription.custom_notes = self.custom_notes.take();

        if let Err(e) = ctx.repos.subscriptions.insert(&subscription).await {
            // Lost a race against another add of the same event
            if ctx
                .repos
                .subscriptions
                .find_by_user_and_event(&self.user_id, &event.id)
                .await
                .is_some()
            {
                return Err(UseCaseError::AlreadySubscribed(event.id));
            }
            error!("Unable to store subscription. Err: {:?}", e);
            return Err(UseCaseError::StorageError);
        }

        Ok(subscription)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(CreateRemindersOnSubscriptionAdded)]
    }
}
