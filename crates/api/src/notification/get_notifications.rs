use crate::{
    error::BingeError,
    shared::{
        auth::protect_user_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use binge_calendar_api_structs::get_notifications::*;
use binge_calendar_domain::{NotificationRecord, ID};
use binge_calendar_infra::BingeContext;

fn handle_error(e: UseCaseError) -> BingeError {
    match e {
        UseCaseError::StorageError => BingeError::InternalError,
    }
}

pub async fn get_notifications_controller(
    http_req: HttpRequest,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<BingeContext>,
) -> Result<HttpResponse, BingeError> {
    let user_id = protect_user_route(&http_req)?;

    let usecase = GetNotificationsUseCase {
        user_id,
        unread_only: query_params.unread.unwrap_or(false),
        limit: query_params.limit,
    };

    execute(usecase, &ctx)
        .await
        .map(|notifications| HttpResponse::Ok().json(APIResponse::new(notifications)))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct GetNotificationsUseCase {
    pub user_id: ID,
    pub unread_only: bool,
    pub limit: Option<usize>,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetNotificationsUseCase {
    type Response = Vec<NotificationRecord>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetNotifications";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        let max = ctx.config.notifications_query_limit;
        let limit = self.limit.map(|limit| limit.min(max)).unwrap_or(max);

        ctx.repos
            .notifications
            .find_by_user(&self.user_id, self.unread_only, limit)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
