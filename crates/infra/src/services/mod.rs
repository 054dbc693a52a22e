mod alert;
mod billing;
mod delivery;

pub use alert::{Alert, AlertWebhook, IAlertService};
pub use billing::{BillingService, IBillingService};
pub use delivery::{DeliveryError, DeliveryGateway, DeliveryRequest, IDeliveryService};

use crate::{config::Config, repos::Repos};
use std::sync::Arc;

/// Clients for the collaborators the reminder engine talks to
#[derive(Clone)]
pub struct Services {
    pub delivery: Arc<dyn IDeliveryService>,
    pub alerts: Arc<dyn IAlertService>,
    pub billing: Arc<dyn IBillingService>,
}

impl Services {
    pub fn create(config: &Config, repos: &Repos) -> Self {
        Self {
            delivery: Arc::new(DeliveryGateway::new(config.delivery_gateway_url.clone())),
            alerts: Arc::new(AlertWebhook::new(config.alert_webhook_url.clone())),
            billing: Arc::new(BillingService::new(repos.users.clone())),
        }
    }
}
