use binge_calendar_domain::{EventKind, EventStatus, MediaEvent, Platform};
use binge_calendar_infra::{
    create_inmemory, Alert, BingeContext, DeliveryError, DeliveryRequest, IAlertService,
    IDeliveryService, MockSys,
};
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};

pub const MINUTE: i64 = 1000 * 60;

/// Millis of the given time on 2025-03-01 in UTC
pub fn ts(hour: u32, minute: u32) -> i64 {
    Utc.with_ymd_and_hms(2025, 3, 1, hour, minute, 0)
        .unwrap()
        .timestamp_millis()
}

/// Delivery collaborator that records requests and answers with the
/// queued results, accepting once the queue is empty
#[derive(Default)]
pub struct MockDelivery {
    pub requests: Mutex<Vec<DeliveryRequest>>,
    pub results: Mutex<Vec<Result<(), DeliveryError>>>,
}

impl MockDelivery {
    pub fn fail_with(&self, results: Vec<Result<(), DeliveryError>>) {
        *self.results.lock().unwrap() = results;
    }

    pub fn delivered(&self) -> Vec<DeliveryRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IDeliveryService for MockDelivery {
    async fn deliver(&self, request: &DeliveryRequest) -> Result<(), DeliveryError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            Ok(())
        } else {
            results.remove(0)
        }
    }
}

#[derive(Default)]
pub struct MockAlerts {
    pub alerts: Mutex<Vec<Alert>>,
}

#[async_trait::async_trait]
impl IAlertService for MockAlerts {
    async fn alert(&self, alert: &Alert) {
        self.alerts.lock().unwrap().push(alert.clone());
    }
}

pub struct TestContext {
    pub ctx: BingeContext,
    pub sys: Arc<MockSys>,
    pub delivery: Arc<MockDelivery>,
    pub alerts: Arc<MockAlerts>,
}

pub fn setup(now: i64) -> TestContext {
    let mut ctx = create_inmemory();
    let sys = Arc::new(MockSys::new(now));
    let delivery = Arc::new(MockDelivery::default());
    let alerts = Arc::new(MockAlerts::default());
    ctx.sys = sys.clone();
    ctx.services.delivery = delivery.clone();
    ctx.services.alerts = alerts.clone();
    ctx.config.retry_backoff_millis = MINUTE;
    ctx.config.claim_lease_millis = 5 * MINUTE;
    ctx.config.max_delivery_attempts = 3;
    ctx.config.free_tier_reminder_limit = 1;
    ctx.config.reminder_limit = 10;
    TestContext {
        ctx,
        sys,
        delivery,
        alerts,
    }
}

pub fn movie_night(start_ts: i64) -> MediaEvent {
    MediaEvent {
        id: Default::default(),
        title: "Dune: Part Two".into(),
        description: Some("Paul Atreides unites with the Fremen".into()),
        kind: EventKind::Movie {
            director: Some("Denis Villeneuve".into()),
            runtime_minutes: Some(166),
            release_type: Some("streaming".into()),
        },
        start_ts,
        end_ts: Some(start_ts + 166 * MINUTE),
        timezone: chrono_tz::America::Los_Angeles,
        platforms: vec![Platform::Streaming {
            service: "Max".into(),
        }],
        poster_url: None,
        status: EventStatus::Confirmed,
        version: 1,
        updated: 0,
    }
}
