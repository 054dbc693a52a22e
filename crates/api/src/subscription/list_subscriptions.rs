use crate::{
    error::BingeError,
    shared::{
        auth::protect_user_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use binge_calendar_api_structs::list_subscriptions::*;
use binge_calendar_domain::{Subscription, ID};
use binge_calendar_infra::BingeContext;
use tracing::error;

fn handle_error(e: UseCaseError) -> BingeError {
    match e {
        UseCaseError::StorageError => BingeError::InternalError,
    }
}

pub async fn list_subscriptions_controller(
    http_req: HttpRequest,
    ctx: web::Data<BingeContext>,
) -> Result<HttpResponse, BingeError> {
    let user_id = protect_user_route(&http_req)?;

    let usecase = ListSubscriptionsUseCase { user_id };

    execute(usecase, &ctx)
        .await
        .map(|subscriptions| HttpResponse::Ok().json(APIResponse::new(subscriptions)))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct ListSubscriptionsUseCase {
    pub user_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for ListSubscriptionsUseCase {
    type Response = Vec<Subscription>;

    type Error = UseCaseError;

    const NAME: &'static str = "ListSubscriptions";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .subscriptions
            .find_by_user(&self.user_id)
            .await
            .map_err(|e| {
                error!(
                    "Unable to list subscriptions of user {}. Err: {:?}",
                    self.user_id, e
                );
                UseCaseError::StorageError
            })
    }
}
