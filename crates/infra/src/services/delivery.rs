use binge_calendar_domain::{DeliveryMethod, ID};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

/// A rendered reminder handed to the delivery collaborator
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRequest {
    pub reminder_id: ID,
    pub user_id: ID,
    pub event_id: ID,
    pub delivery_method: DeliveryMethod,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum DeliveryError {
    /// Worth retrying later: timeouts, connection problems and 5xx responses
    #[error("Transient delivery failure: {0}")]
    Transient(String),
    /// The collaborator rejected the request and will keep doing so
    #[error("Permanent delivery failure: {0}")]
    Permanent(String),
}

#[async_trait::async_trait]
pub trait IDeliveryService: Send + Sync {
    /// Resolves once the collaborator has accepted the request. Receipt by
    /// the user is not confirmed.
    async fn deliver(&self, request: &DeliveryRequest) -> Result<(), DeliveryError>;
}

/// Forwards reminders to an HTTP delivery gateway.
///
/// In-app reminders are served from the notification ledger and never leave
/// the service.
pub struct DeliveryGateway {
    client: Client,
    url: Option<Url>,
}

impl DeliveryGateway {
    pub fn new(url: Option<Url>) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

fn classify_status(status: StatusCode) -> Result<(), DeliveryError> {
    if status.is_success() {
        Ok(())
    } else if status.is_client_error() {
        Err(DeliveryError::Permanent(format!(
            "Delivery gateway rejected the request with status: {}",
            status
        )))
    } else {
        Err(DeliveryError::Transient(format!(
            "Delivery gateway responded with status: {}",
            status
        )))
    }
}

#[async_trait::async_trait]
impl IDeliveryService for DeliveryGateway {
    async fn deliver(&self, request: &DeliveryRequest) -> Result<(), DeliveryError> {
        if request.delivery_method == DeliveryMethod::InApp {
            return Ok(());
        }
        let url = match &self.url {
            Some(url) => url.clone(),
            None => {
                info!(
                    "No delivery gateway configured, accepting {} reminder {} for user {}",
                    request.delivery_method, request.reminder_id, request.user_id
                );
                return Ok(());
            }
        };

        let res = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    "Unable to reach delivery gateway for reminder {}. Err: {:?}",
                    request.reminder_id, e
                );
                DeliveryError::Transient(e.to_string())
            })?;
        classify_status(res.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(delivery_method: DeliveryMethod) -> DeliveryRequest {
        DeliveryRequest {
            reminder_id: ID::new(),
            user_id: ID::new(),
            event_id: ID::new(),
            delivery_method,
            title: "Oppenheimer starts in 1 hour".into(),
            message: "Oppenheimer starts at Fri Jul 21, 19:00 UTC.".into(),
        }
    }

    #[test]
    fn classifies_gateway_responses() {
        assert!(classify_status(StatusCode::ACCEPTED).is_ok());
        assert!(matches!(
            classify_status(StatusCode::UNPROCESSABLE_ENTITY),
            Err(DeliveryError::Permanent(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE),
            Err(DeliveryError::Transient(_))
        ));
    }

    #[tokio::test]
    async fn accepts_in_app_and_unrouted_deliveries() {
        let gateway = DeliveryGateway::new(None);
        assert!(gateway.deliver(&request(DeliveryMethod::InApp)).await.is_ok());
        assert!(gateway.deliver(&request(DeliveryMethod::Email)).await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_gateway_is_transient() {
        let gateway = DeliveryGateway::new(Some(Url::parse("http://127.0.0.1:1/deliver").unwrap()));
        assert!(matches!(
            gateway.deliver(&request(DeliveryMethod::Push)).await,
            Err(DeliveryError::Transient(_))
        ));
    }
}
