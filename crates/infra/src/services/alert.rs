use binge_calendar_domain::ID;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, warn};
use url::Url;

/// Something an operator has to look at
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub reminder_id: ID,
    pub subscription_id: ID,
    pub attempts: i64,
    pub reason: String,
}

#[async_trait::async_trait]
pub trait IAlertService: Send + Sync {
    async fn alert(&self, alert: &Alert);
}

/// Writes alerts to the error log and posts them to a webhook when one is
/// configured
pub struct AlertWebhook {
    client: Client,
    url: Option<Url>,
}

impl AlertWebhook {
    pub fn new(url: Option<Url>) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait::async_trait]
impl IAlertService for AlertWebhook {
    async fn alert(&self, alert: &Alert) {
        error!(
            "Reminder {} of subscription {} failed after {} attempts: {}",
            alert.reminder_id, alert.subscription_id, alert.attempts, alert.reason
        );
        let url = match &self.url {
            Some(url) => url.clone(),
            None => return,
        };
        let res = self.client.post(url).json(alert).send().await;
        match res {
            Ok(res) if res.status().is_success() => (),
            Ok(res) => warn!("Alert webhook responded with status: {}", res.status()),
            Err(e) => warn!("Unable to send alert to webhook. Err: {:?}", e),
        }
    }
}
