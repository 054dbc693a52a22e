use binge_calendar_utils::create_random_secret;
use std::str::FromStr;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    /// Secret code the catalog ingestion and billing collaborators use
    /// to call the integration endpoints
    pub integration_secret_code: String,
    /// Port for the application to run on
    pub port: usize,
    /// Seconds between two ticks of the reminder dispatch loop
    pub dispatch_interval_secs: u64,
    /// Maximum number of due reminders handled by a single tick
    pub dispatch_batch_size: usize,
    /// Number of delivery attempts before a reminder is marked as failed
    pub max_delivery_attempts: i64,
    /// Delay before the first retry of a failed delivery. Doubled for
    /// every following attempt and capped at `MAX_RETRY_BACKOFF_MILLIS`.
    pub retry_backoff_millis: i64,
    /// How long a worker owns a claimed reminder before another worker
    /// is allowed to take it over
    pub claim_lease_millis: i64,
    /// Upper bound for a single call to the delivery collaborator
    pub delivery_timeout_millis: u64,
    /// Where delivery requests for non in-app reminders are sent
    pub delivery_gateway_url: Option<Url>,
    /// Where operational alerts are sent in addition to the logs
    pub alert_webhook_url: Option<Url>,
    /// Maximum reminders per event for free tier users
    pub free_tier_reminder_limit: usize,
    /// Maximum reminders per event for everybody else
    pub reminder_limit: usize,
    /// Maximum number of notifications returned when listing them
    pub notifications_query_limit: usize,
}

pub const MAX_RETRY_BACKOFF_MILLIS: i64 = 1000 * 60 * 30;

fn env_or_default<T: FromStr + ToString>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => match value.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default value: {}.",
                    key,
                    value,
                    default.to_string()
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn env_url(key: &str) -> Option<Url> {
    let value = std::env::var(key).ok()?;
    match Url::parse(&value) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("The given {}: {} is not a valid url: {:?}", key, value, e);
            None
        }
    }
}

impl Config {
    pub fn new() -> Self {
        let integration_secret_code = match std::env::var("INTEGRATION_SECRET_CODE") {
            Ok(code) => code,
            Err(_) => {
                info!("Did not find INTEGRATION_SECRET_CODE environment variable. Going to create one.");
                let code = create_random_secret(16);
                info!(
                    "Secret code for the integration endpoints was generated and set to: {}",
                    code
                );
                code
            }
        };

        let delivery_gateway_url = env_url("DELIVERY_GATEWAY_URL");
        if delivery_gateway_url.is_none() {
            info!("No DELIVERY_GATEWAY_URL given, reminders will only be delivered in-app.");
        }

        Self {
            integration_secret_code,
            port: env_or_default("PORT", 5000),
            dispatch_interval_secs: env_or_default::<u64>("REMINDER_DISPATCH_INTERVAL_SECS", 60).max(1),
            dispatch_batch_size: env_or_default::<usize>("REMINDER_DISPATCH_BATCH_SIZE", 500).max(1),
            max_delivery_attempts: env_or_default::<i64>("REMINDER_MAX_DELIVERY_ATTEMPTS", 5).max(1),
            retry_backoff_millis: env_or_default::<i64>("REMINDER_RETRY_BACKOFF_MILLIS", 1000 * 60).max(0),
            // A claim without a lease would be up for grabs right away
            claim_lease_millis: env_or_default::<i64>("REMINDER_CLAIM_LEASE_MILLIS", 1000 * 60 * 5).max(1),
            delivery_timeout_millis: env_or_default::<u64>("DELIVERY_TIMEOUT_MILLIS", 1000 * 10).max(1),
            delivery_gateway_url,
            alert_webhook_url: env_url("ALERT_WEBHOOK_URL"),
            free_tier_reminder_limit: env_or_default("FREE_TIER_REMINDER_LIMIT", 1),
            reminder_limit: env_or_default("REMINDER_LIMIT", 10),
            notifications_query_limit: 50,
        }
    }

    /// Backoff before the next delivery attempt after `attempts` failed ones
    pub fn retry_backoff(&self, attempts: i64) -> i64 {
        let exponent = (attempts.max(1) - 1).min(20) as u32;
        self.retry_backoff_millis
            .saturating_mul(2_i64.saturating_pow(exponent))
            .min(MAX_RETRY_BACKOFF_MILLIS)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
