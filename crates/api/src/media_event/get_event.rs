use crate::{
    error::BingeError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use binge_calendar_api_structs::get_event::*;
use binge_calendar_domain::{MediaEvent, ID};
use binge_calendar_infra::BingeContext;
use tracing::error;

fn handle_error(e: UseCaseError) -> BingeError {
    match e {
        UseCaseError::NotFound(event_id) => BingeError::NotFound(format!(
            "The event with id: {}, was not found.",
            event_id
        )),
        UseCaseError::StorageError => BingeError::InternalError,
    }
}

pub async fn get_event_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<BingeContext>,
) -> Result<HttpResponse, BingeError> {
    let usecase = GetEventUseCase {
        event_id: path_params.event_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(APIResponse::new(event)))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct GetEventUseCase {
    pub event_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetEventUseCase {
    type Response = MediaEvent;

    type Error = UseCaseError;

    const NAME: &'static str = "GetEvent";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .events
            .find(&self.event_id)
            .await
            .map_err(|e| {
                error!("Unable to find event {}. Err: {:?}", self.event_id, e);
                UseCaseError::StorageError
            })?
            .ok_or_else(|| UseCaseError::NotFound(self.event_id.clone()))
    }
}
