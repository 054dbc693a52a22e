use crate::{
    error::BingeError,
    shared::{
        auth::protect_user_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use binge_calendar_api_structs::get_subscription_reminders::*;
use binge_calendar_domain::{ReminderInstance, ID};
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

pub async fn get_subscription_reminders_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<BingeContext>,
) -> Result<HttpResponse, BingeError> {
    let user_id = protect_user_route(&http_req)?;

    let usecase = GetSubscriptionRemindersUseCase {
        user_id,
        subscription_id: path_params.subscription_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|reminders| HttpResponse::Ok().json(APIResponse::new(reminders)))
        .map_err(handle_error)
}

/// All `ReminderInstance`s of a `Subscription`, including the fired and
/// suppressed ones, ordered by fire instant
#[derive(Debug)]
pub struct GetSubscriptionRemindersUseCase {
    pub user_id: ID,
    pub subscription_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetSubscriptionRemindersUseCase {
    type Response = Vec<ReminderInstance>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetSubscriptionReminders";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        match ctx.repos.subscriptions.find(&self.subscription_id).await {
            Ok(Some(subscription)) if subscription.user_id == self.user_id => (),
            Ok(_) => return Err(UseCaseError::NotFound(self.subscription_id.clone())),
            Err(e) => {
                error!(
                    "Unable to find subscription {}. Err: {:?}",
                    self.subscription_id, e
                );
                return Err(UseCaseError::StorageError);
            }
        };

        ctx.repos
            .reminders
            .find_by_subscription(&self.subscription_id)
            .await
            .map_err(|e| {
                error!(
                    "Unable to find reminders of subscription {}. Err: {:?}",
                    self.subscription_id, e
                );
                UseCaseError::StorageError
            })
    }
}
