use actix_web::{http::StatusCode, HttpResponse};
use binge_calendar_api_structs::APIErrorResponse;
use thiserror::Error;

/// Errors surfaced to HTTP clients. Every use case maps its own error type
/// into one of these.
#[derive(Error, Debug)]
pub enum BingeError {
    #[error("Internal server error")]
    InternalError,
    #[error("Invalid data provided: {0}")]
    BadClientData(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized request: {0}")]
    Unauthorized(String),
    #[error("Unidentifiable client, the `binge-user-id` header is required: {0}")]
    UnidentifiableClient(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl actix_web::error::ResponseError for BingeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadClientData(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) | Self::UnidentifiableClient(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(APIErrorResponse {
            status: status.as_u16(),
            message: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, ResponseError};

    #[actix_web::test]
    async fn renders_json_body() {
        let res = BingeError::Conflict("Already subscribed".into()).error_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let body = to_bytes(res.into_body()).await.unwrap();
        let body: APIErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.status, 409);
        assert_eq!(body.message, "Conflict: Already subscribed");
    }

    #[test]
    fn internal_errors_hide_details() {
        assert_eq!(BingeError::InternalError.to_string(), "Internal server error");
        assert_eq!(
            BingeError::UnidentifiableClient("missing".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
