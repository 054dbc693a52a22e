use crate::error::BingeError;
use actix_web::HttpRequest;
use binge_calendar_domain::ID;
use binge_calendar_infra::BingeContext;

/// Header the identity gateway puts the authenticated user id in
pub const USER_ID_HEADER: &str = "binge-user-id";
/// Header catalog ingestion and billing authenticate with
pub const INTEGRATION_KEY_HEADER: &str = "binge-integration-key";

fn get_header<'a>(http_req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    http_req.headers().get(name)?.to_str().ok()
}

/// The user the request is made on behalf of. The identity gateway in front
/// of the service is trusted to have authenticated the user.
pub fn protect_user_route(http_req: &HttpRequest) -> Result<ID, BingeError> {
    let user_id = get_header(http_req, USER_ID_HEADER).ok_or_else(|| {
        BingeError::UnidentifiableClient(format!("Missing the `{}` header", USER_ID_HEADER))
    })?;
    user_id.parse::<ID>().map_err(|e| {
        BingeError::UnidentifiableClient(format!(
            "Malformed user id: `{}`. Error: {}",
            user_id, e
        ))
    })
}

/// Only the collaborators that know the integration secret are allowed
pub fn protect_integration_route(
    http_req: &HttpRequest,
    ctx: &BingeContext,
) -> Result<(), BingeError> {
    match get_header(http_req, INTEGRATION_KEY_HEADER) {
        Some(key) if key == ctx.config.integration_secret_code => Ok(()),
        Some(_) => Err(BingeError::Unauthorized(
            "Invalid integration key provided".into(),
        )),
        None => Err(BingeError::Unauthorized(format!(
            "Missing the `{}` header",
            INTEGRATION_KEY_HEADER
        ))),
    }
}
