use crate::{
    error::BingeError,
    shared::{
        auth::protect_integration_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use binge_calendar_api_structs::upsert_user_profile::*;
use binge_calendar_domain::{SubscriptionTier, UserProfile, ID};
use binge_calendar_infra::BingeContext;
use chrono_tz::Tz;

fn handle_error(e: UseCaseError) -> BingeError {
    match e {
        UseCaseError::StorageError => BingeError::InternalError,
    }
}

pub async fn upsert_user_profile_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<BingeContext>,
) -> Result<HttpResponse, BingeError> {
    protect_integration_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = UpsertUserProfileUseCase {
        user_id: path_params.user_id.clone(),
        tier: body.tier,
        timezone: body.timezone,
    };

    execute(usecase, &ctx)
        .await
        .map(|user| HttpResponse::Ok().json(APIResponse::new(user)))
        .map_err(handle_error)
}

/// Stores the tier and time zone the identity and billing collaborators
/// know about a user.
///
/// Existing subscriptions are left as they are when the tier changes, the
/// new reminder limit applies the next time the user edits their offsets.
#[derive(Debug)]
pub struct UpsertUserProfileUseCase {
    pub user_id: ID,
    pub tier: SubscriptionTier,
    pub timezone: Tz,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpsertUserProfileUseCase {
    type Response = UserProfile;

    type Error = UseCaseError;

    const NAME: &'static str = "UpsertUserProfile";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        let user = UserProfile {
            id: self.user_id.clone(),
            tier: self.tier,
            timezone: self.timezone,
            updated: ctx.sys.get_timestamp_millis(),
        };

        ctx.repos
            .users
            .save(&user)
            .await
            .map(|_| user)
            .map_err(|_| UseCaseError::StorageError)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{setup, ts};

    #[actix_web::test]
    async fn upserts_profile_seen_by_billing() {
        let test = setup(ts(12, 0));
        let ctx = &test.ctx;
        let user_id = ID::new();

        let profile = ctx.services.billing.get_user_profile(&user_id).await;
        assert_eq!(profile.tier, SubscriptionTier::Free);

        let usecase = UpsertUserProfileUseCase {
            user_id: user_id.clone(),
            tier: SubscriptionTier::Pro,
            timezone: chrono_tz::Europe::Oslo,
        };
        let user = execute(usecase, ctx).await.unwrap();
        assert_eq!(user.updated, ts(12, 0));

        let profile = ctx.services.billing.get_user_profile(&user_id).await;
        assert_eq!(profile.tier, SubscriptionTier::Pro);
        assert_eq!(profile.timezone, chrono_tz::Europe::Oslo);

        test.sys.set_timestamp_millis(ts(13, 0));
        let usecase = UpsertUserProfileUseCase {
            user_id: user_id.clone(),
            tier: SubscriptionTier::Free,
            timezone: chrono_tz::Europe::Oslo,
        };
        execute(usecase, ctx).await.unwrap();
        let stored = ctx.repos.users.find(&user_id).await.unwrap();
        assert_eq!(stored.tier, SubscriptionTier::Free);
        assert_eq!(stored.updated, ts(13, 0));
    }
}
