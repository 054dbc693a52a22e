use super::subscribers::SyncRemindersOnEventUpserted;
use crate::{
    error::BingeError,
    shared::{
        auth::protect_integration_route,
        usecase::{execute, Subscriber, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use binge_calendar_api_structs::upsert_event::*;
use binge_calendar_domain::{EventKind, EventStatus, InvalidEventError, MediaEvent, Platform, ID};
use binge_calendar_infra::BingeContext;
use chrono_tz::Tz;
use tracing::{error, info};

fn handle_error(e: UseCaseError) -> BingeError {
    match e {
        UseCaseError::InvalidEvent(e) => BingeError::BadClientData(e.to_string()),
        UseCaseError::StorageError => BingeError::InternalError,
    }
}

pub async fn upsert_event_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<BingeContext>,
) -> Result<HttpResponse, BingeError> {
    protect_integration_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = UpsertEventUseCase {
        event_id: path_params.event_id.clone(),
        title: body.title,
        description: body.description,
        kind: body.details,
        start_ts: body.start_ts,
        end_ts: body.end_ts,
        timezone: body.timezone,
        platforms: body.platforms,
        poster_url: body.poster_url,
        status: body.status,
        version: body.version,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.event, res.applied)))
        .map_err(handle_error)
}

/// Stores a `MediaEvent` written by catalog ingestion.
///
/// Writes that are not newer than the stored version are ignored, so
/// redelivered or reordered catalog updates can not roll an event back.
#[derive(Debug)]
pub struct UpsertEventUseCase {
    pub event_id: ID,
    pub title: String,
    pub description: Option<String>,
    pub kind: EventKind,
    pub start_ts: i64,
    pub end_ts: Option<i64>,
    pub timezone: Tz,
    pub platforms: Vec<Platform>,
    pub poster_url: Option<String>,
    pub status: EventStatus,
    pub version: i64,
}

#[derive(Debug)]
pub struct UpsertEventResponse {
    /// The stored event after the write
    pub event: MediaEvent,
    pub applied: bool,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidEvent(InvalidEventError),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpsertEventUseCase {
    type Response = UpsertEventResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "UpsertEvent";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        let event = MediaEvent {
            id: self.event_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            kind: self.kind.clone(),
            start_ts: self.start_ts,
            end_ts: self.end_ts,
            timezone: self.timezone,
            platforms: self.platforms.clone(),
            poster_url: self.poster_url.clone(),
            status: self.status,
            version: self.version,
            updated: ctx.sys.get_timestamp_millis(),
        };
        event.validate().map_err(UseCaseError::InvalidEvent)?;

        let applied = ctx.repos.events.upsert_if_newer(&event).await.map_err(|e| {
            error!("Unable to store event {}. Err: {:?}", event.id, e);
            UseCaseError::StorageError
        })?;
        if !applied {
            let stored = ctx
                .repos
                .events
                .find(&event.id)
                .await
                .map_err(|e| {
                    error!("Unable to find event {}. Err: {:?}", event.id, e);
                    UseCaseError::StorageError
                })?
                // Deleted right after the write was refused
                .ok_or(UseCaseError::StorageError)?;
            info!(
                "Ignoring version {} of event {}, version {} is already stored",
                event.version, event.id, stored.version
            );
            return Ok(UpsertEventResponse {
                event: stored,
                applied: false,
            });
        }

        Ok(UpsertEventResponse {
            event,
            applied: true,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(SyncRemindersOnEventUpserted)]
    }
}
