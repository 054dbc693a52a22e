use crate::{
    error::BingeError,
    shared::{
        auth::protect_user_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use binge_calendar_api_structs::get_subscription::*;
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

pub async fn get_subscription_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<BingeContext>,
) -> Result<HttpResponse, BingeError> {
    let user_id = protect_user_route(&http_req)?;

    let usecase = GetSubscriptionUseCase {
        user_id,
        subscription_id: path_params.subscription_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Ok().json(APIResponse::new(subscription)))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct GetSubscriptionUseCase {
    pub user_id: ID,
    pub subscription_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetSubscriptionUseCase {
    type Response = Subscription;

    type Error = UseCaseError;

    const NAME: &'static str = "GetSubscription";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        match ctx.repos.subscriptions.find(&self.subscription_id).await {
            Ok(Some(subscription)) if subscription.user_id == self.user_id => Ok(subscription),
            Ok(_) => Err(UseCaseError::NotFound(self.subscription_id.clone())),
            Err(e) => {
                error!(
                    "Unable to find subscription {}. Err: {:?}",
                    self.subscription_id, e
                );
                Err(UseCaseError::StorageError)
            }
        }
    }
}
