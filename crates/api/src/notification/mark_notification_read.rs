use crate::{
    error::BingeError,
    shared::{
        auth::protect_user_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use binge_calendar_api_structs::mark_notification_read::*;
use binge_calendar_domain::{NotificationRecord, ID};
use binge_calendar_infra::BingeContext;
use tracing::error;

fn handle_error(e: UseCaseError) -> BingeError {
    match e {
        UseCaseError::NotFound(notification_id) => BingeError::NotFound(format!(
            "The notification with id: {}, was not found.",
            notification_id
        )),
        UseCaseError::StorageError => BingeError::InternalError,
    }
}

pub async fn mark_notification_read_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<BingeContext>,
) -> Result<HttpResponse, BingeError> {
    let user_id = protect_user_route(&http_req)?;

    let usecase = MarkNotificationReadUseCase {
        user_id,
        notification_id: path_params.notification_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|notification| HttpResponse::Ok().json(APIResponse::new(notification)))
        .map_err(handle_error)
}

/// Marks a notification as read. Marking it again keeps the first read
/// instant.
#[derive(Debug)]
pub struct MarkNotificationReadUseCase {
    pub user_id: ID,
    pub notification_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for MarkNotificationReadUseCase {
    type Response = NotificationRecord;

    type Error = UseCaseError;

    const NAME: &'static str = "MarkNotificationRead";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        match ctx
            .repos
            .notifications
            .mark_read(&self.notification_id, &self.user_id, now)
            .await
        {
            Ok(Some(notification)) => Ok(notification),
            Ok(None) => Err(UseCaseError::NotFound(self.notification_id.clone())),
            Err(e) => {
                error!(
                    "Unable to mark notification {} as read. Err: {:?}",
                    self.notification_id, e
                );
                Err(UseCaseError::StorageError)
            }
        }
    }
}
