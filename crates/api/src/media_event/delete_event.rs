use crate::{
    error::BingeError,
    shared::{
        auth::protect_integration_route,
        usecase::{execute, UseCase},
    },
    subscription::remove_subscription::cascade_delete_subscription,
};
use actix_web::{web, HttpRequest, HttpResponse};
use binge_calendar_api_structs::delete_event::*;
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

pub async fn delete_event_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<BingeContext>,
) -> Result<HttpResponse, BingeError> {
    protect_integration_route(&http_req, &ctx)?;

    let usecase = DeleteEventUseCase {
        event_id: path_params.event_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(APIResponse::new(event)))
        .map_err(handle_error)
}

/// Removes a `MediaEvent` from the catalog together with every
/// `Subscription` to it
#[derive(Debug)]
pub struct DeleteEventUseCase {
    pub event_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteEventUseCase {
    type Response = MediaEvent;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteEvent";

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
            .ok_or_else(|| UseCaseError::NotFound(self.event_id.clone()))?;

        let subscriptions = ctx
            .repos
            .subscriptions
            .find_by_event(&event.id)
            .await
            .map_err(|e| {
                error!(
                    "Unable to find subscriptions of event {}. Err: {:?}",
                    event.id, e
                );
                UseCaseError::StorageError
            })?;
        for subscription in &subscriptions {
            cascade_delete_subscription(subscription, ctx)
                .await
                .map_err(|e| {
                    error!(
                        "Unable to delete subscription {} of event {}. Err: {:?}",
                        subscription.id, event.id, e
                    );
                    UseCaseError::StorageError
                })?;
        }

        ctx.repos
            .events
            .delete(&event.id)
            .await
            .ok_or(UseCaseError::StorageError)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{movie_night, setup, ts};
    use binge_calendar_domain::Subscription;

    #[actix_web::test]
    async fn deletes_event_with_its_subscriptions() {
        let test = setup(ts(12, 0));
        let ctx = &test.ctx;
        let event = movie_night(ts(20, 0));
        ctx.repos.events.insert(&event).await.unwrap();
        let subscriptions = (0..3)
            .map(|_| Subscription::new(ID::new(), event.id.clone(), 0))
            .collect::<Vec<_>>();
        for subscription in &subscriptions {
            ctx.repos.subscriptions.insert(subscription).await.unwrap();
        }

        let usecase = DeleteEventUseCase {
            event_id: event.id.clone(),
        };
        let deleted = execute(usecase, ctx).await.unwrap();
        assert_eq!(deleted.id, event.id);
        assert!(ctx.repos.events.find(&event.id).await.unwrap().is_none());
        assert!(ctx
            .repos
            .subscriptions
            .find_by_event(&event.id)
            .await
            .unwrap()
            .is_empty());

        let usecase = DeleteEventUseCase {
            event_id: event.id.clone(),
        };
        assert!(matches!(
            execute(usecase, ctx).await,
            Err(UseCaseError::NotFound(_))
        ));
    }
}
