use super::dispatch_reminder::{DispatchOutcome, DispatchReminderUseCase};
use crate::shared::usecase::{execute, UseCase};
use binge_calendar_infra::BingeContext;
use tracing::{error, info};

/// What a single tick of the dispatch loop did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub due: usize,
    /// Claimed by another worker first
    pub skipped: usize,
    pub fired: usize,
    pub stale: usize,
    pub retrying: usize,
    pub failed: usize,
    pub errors: usize,
}

impl DispatchSummary {
    fn record(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Fired | DispatchOutcome::AlreadyFired => self.fired += 1,
            DispatchOutcome::Stale => self.stale += 1,
            DispatchOutcome::Retrying => self.retrying += 1,
            DispatchOutcome::Failed => self.failed += 1,
            DispatchOutcome::ClaimLost => self.skipped += 1,
        }
    }
}

/// One tick of the dispatch loop. Claims the reminders that are due, oldest
/// first, and dispatches each of them.
#[derive(Debug)]
pub struct DispatchDueRemindersUseCase {}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DispatchDueRemindersUseCase {
    type Response = DispatchSummary;

    type Error = UseCaseError;

    const NAME: &'static str = "DispatchDueReminders";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let due = ctx
            .repos
            .reminders
            .find_due(now, ctx.config.dispatch_batch_size)
            .await
            .map_err(|e| {
                error!("Unable to find due reminders. Err: {:?}", e);
                UseCaseError::StorageError
            })?;

        let mut summary = DispatchSummary {
            due: due.len(),
            ..Default::default()
        };

        for reminder in due {
            let now = ctx.sys.get_timestamp_millis();
            let lease_until = now + ctx.config.claim_lease_millis;
            let claimed = match ctx.repos.reminders.claim(&reminder.id, now, lease_until).await {
                Ok(Some(claimed)) => claimed,
                Ok(None) => {
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!("Unable to claim reminder {}. Err: {:?}", reminder.id, e);
                    summary.errors += 1;
                    continue;
                }
            };

            let usecase = DispatchReminderUseCase { reminder: claimed };
            match execute(usecase, ctx).await {
                Ok(outcome) => summary.record(outcome),
                Err(_) => summary.errors += 1,
            }
        }

        if summary.due > 0 {
            info!("Reminder dispatch tick: {:?}", summary);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        shared::test_helpers::{movie_night, setup, ts, TestContext},
        subscription::sync_subscription_reminders::SyncSubscriptionRemindersUseCase,
    };
    use binge_calendar_domain::{
        DeliveryMethod, EventStatus, MediaEvent, NotificationRecord, ReminderInstance,
        ReminderState, RenderedMessage, Subscription, SubscriptionTier, UserProfile, ID,
    };
    use binge_calendar_infra::{
        DeleteResult, DeliveryError, DeliveryRequest, IDeliveryService, INotificationRepo,
        ISubscriptionRepo,
    };
    use futures::future::join_all;
    use std::sync::Arc;

    async fn subscribe(
        test: &TestContext,
        event: &MediaEvent,
        offsets: &[i64],
    ) -> (Subscription, Vec<ReminderInstance>) {
        let ctx = &test.ctx;
        let mut subscription =
            Subscription::new(ID::new(), event.id.clone(), ctx.sys.get_timestamp_millis());
        subscription.set_reminder_offsets(offsets, 10).unwrap();
        ctx.repos.subscriptions.insert(&subscription).await.unwrap();
        let usecase = SyncSubscriptionRemindersUseCase {
            subscription: &subscription,
            event,
        };
        let plan = execute(usecase, ctx).await.unwrap();
        (subscription, plan.create)
    }

    async fn tick(test: &TestContext) -> DispatchSummary {
        execute(DispatchDueRemindersUseCase {}, &test.ctx)
            .await
            .unwrap()
    }

    async fn reminders(test: &TestContext, subscription: &Subscription) -> Vec<ReminderInstance> {
        test.ctx
            .repos
            .reminders
            .find_by_subscription(&subscription.id)
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn fires_only_the_reminders_that_are_due() {
        let test = setup(ts(12, 0));
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        let (subscription, _) = subscribe(&test, &event, &[60, 15]).await;

        test.sys.set_timestamp_millis(ts(19, 5));
        let summary = tick(&test).await;
        assert_eq!(summary.due, 1);
        assert_eq!(summary.fired, 1);

        let stored = reminders(&test, &subscription).await;
        assert_eq!(stored[0].fire_ts, ts(19, 0));
        assert_eq!(stored[0].state, ReminderState::Fired);
        assert_eq!(stored[1].state, ReminderState::Pending);

        let notifications = test
            .ctx
            .repos
            .notifications
            .find_by_user(&subscription.user_id, false, 10)
            .await
            .unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].reminder_id, stored[0].id);
        assert_eq!(notifications[0].sent_ts, ts(19, 5));
        assert_eq!(notifications[0].title, "Dune: Part Two starts in 1 hour");

        let delivered = test.delivery.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].delivery_method, DeliveryMethod::InApp);

        // Nothing left to do until 19:45
        assert_eq!(tick(&test).await.due, 0);
    }

    #[actix_web::test]
    async fn renders_in_the_users_timezone() {
        let test = setup(ts(12, 0));
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        let (subscription, _) = subscribe(&test, &event, &[60]).await;
        let mut profile = UserProfile::new(subscription.user_id.clone());
        profile.tier = SubscriptionTier::Pro;
        profile.timezone = chrono_tz::Europe::Oslo;
        test.ctx.repos.users.save(&profile).await.unwrap();

        test.sys.set_timestamp_millis(ts(19, 0));
        tick(&test).await;
        let delivered = test.delivery.delivered();
        assert_eq!(
            delivered[0].message,
            "Dune: Part Two starts at Sat Mar 1, 21:00 CET on Max."
        );
    }

    #[actix_web::test]
    async fn catches_up_in_fire_order_after_downtime() {
        let test = setup(ts(12, 0));
        let late_show = movie_night(ts(22, 0));
        let early_show = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&late_show).await.unwrap();
        test.ctx.repos.events.insert(&early_show).await.unwrap();
        subscribe(&test, &late_show, &[60, 15]).await;
        subscribe(&test, &early_show, &[60, 15]).await;

        test.sys.set_timestamp_millis(ts(23, 0));
        let summary = tick(&test).await;
        assert_eq!(summary.fired, 4);

        let order = test
            .delivery
            .delivered()
            .iter()
            .map(|r| (r.event_id.clone(), r.title.clone()))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                (early_show.id.clone(), "Dune: Part Two starts in 1 hour".to_string()),
                (early_show.id.clone(), "Dune: Part Two starts in 15 minutes".to_string()),
                (late_show.id.clone(), "Dune: Part Two starts in 1 hour".to_string()),
                (late_show.id.clone(), "Dune: Part Two starts in 15 minutes".to_string()),
            ]
        );
    }

    #[actix_web::test]
    async fn respects_the_batch_size() {
        let mut test = setup(ts(12, 0));
        test.ctx.config.dispatch_batch_size = 1;
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        subscribe(&test, &event, &[60, 15]).await;

        test.sys.set_timestamp_millis(ts(20, 0));
        assert_eq!(tick(&test).await.fired, 1);
        assert_eq!(tick(&test).await.fired, 1);
        assert_eq!(tick(&test).await.due, 0);
    }

    #[actix_web::test]
    async fn concurrent_ticks_dispatch_once() {
        let test = setup(ts(12, 0));
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        let (subscription, _) = subscribe(&test, &event, &[15]).await;

        test.sys.set_timestamp_millis(ts(19, 45));
        let ticks = (0..8)
            .map(|_| execute(DispatchDueRemindersUseCase {}, &test.ctx))
            .collect::<Vec<_>>();
        let summaries = join_all(ticks)
            .await
            .into_iter()
            .map(|s| s.unwrap())
            .collect::<Vec<_>>();
        assert_eq!(summaries.iter().map(|s| s.fired).sum::<usize>(), 1);

        assert_eq!(test.delivery.delivered().len(), 1);
        let notifications = test
            .ctx
            .repos
            .notifications
            .find_by_user(&subscription.user_id, false, 10)
            .await
            .unwrap();
        assert_eq!(notifications.len(), 1);
    }

    #[actix_web::test]
    async fn retries_transient_failures_then_alerts() {
        let test = setup(ts(12, 0));
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        let (subscription, _) = subscribe(&test, &event, &[15]).await;
        let unavailable = || Err(DeliveryError::Transient("503".into()));
        test.delivery
            .fail_with(vec![unavailable(), unavailable(), unavailable()]);

        test.sys.set_timestamp_millis(ts(19, 45));
        assert_eq!(tick(&test).await.retrying, 1);
        let reminder = reminders(&test, &subscription).await.remove(0);
        assert_eq!(reminder.state, ReminderState::Pending);
        assert_eq!(reminder.attempts, 1);
        assert_eq!(reminder.retry_at, Some(ts(19, 46)));

        // Backoff has not passed yet
        assert_eq!(tick(&test).await.due, 0);

        test.sys.set_timestamp_millis(ts(19, 46));
        assert_eq!(tick(&test).await.retrying, 1);
        let reminder = reminders(&test, &subscription).await.remove(0);
        assert_eq!(reminder.attempts, 2);
        assert_eq!(reminder.retry_at, Some(ts(19, 48)));

        test.sys.set_timestamp_millis(ts(19, 48));
        assert_eq!(tick(&test).await.failed, 1);
        let reminder = reminders(&test, &subscription).await.remove(0);
        assert_eq!(reminder.state, ReminderState::Failed);

        let alerts = test.alerts.alerts.lock().unwrap().clone();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].reminder_id, reminder.id);
        assert_eq!(alerts[0].attempts, 3);
        assert!(test
            .ctx
            .repos
            .notifications
            .find_by_reminder(&reminder.id)
            .await
            .unwrap()
            .is_none());

        // Failed reminders are never retried
        test.sys.set_timestamp_millis(ts(23, 0));
        assert_eq!(tick(&test).await.due, 0);
    }

    #[actix_web::test]
    async fn permanent_failures_are_not_retried() {
        let test = setup(ts(12, 0));
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        let (subscription, _) = subscribe(&test, &event, &[15]).await;
        test.delivery
            .fail_with(vec![Err(DeliveryError::Permanent("400".into()))]);

        test.sys.set_timestamp_millis(ts(19, 45));
        assert_eq!(tick(&test).await.failed, 1);
        let reminder = reminders(&test, &subscription).await.remove(0);
        assert_eq!(reminder.state, ReminderState::Failed);
        assert_eq!(test.alerts.alerts.lock().unwrap().len(), 1);
        assert_eq!(test.delivery.delivered().len(), 1);
    }

    #[actix_web::test]
    async fn discards_claims_that_went_stale() {
        let test = setup(ts(12, 0));
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        let (subscription, created) = subscribe(&test, &event, &[15]).await;

        // The event changed after the reminder was claimed
        let claimed = test
            .ctx
            .repos
            .reminders
            .claim(&created[0].id, ts(19, 45), ts(19, 50))
            .await
            .unwrap()
            .unwrap();
        let mut moved = event.clone();
        moved.version = 2;
        moved.status = EventStatus::Postponed;
        assert!(test.ctx.repos.events.upsert_if_newer(&moved).await.unwrap());

        test.sys.set_timestamp_millis(ts(19, 45));
        let outcome = execute(DispatchReminderUseCase { reminder: claimed }, &test.ctx)
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Stale);
        assert!(test.delivery.delivered().is_empty());
        let reminder = reminders(&test, &subscription).await.remove(0);
        assert_eq!(reminder.state, ReminderState::Suppressed);
    }

    #[actix_web::test]
    async fn discards_claims_of_muted_subscriptions() {
        let test = setup(ts(12, 0));
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        let (mut subscription, _) = subscribe(&test, &event, &[15]).await;
        // Muted without the pending reminders being synced yet
        subscription.notifications_enabled = false;
        test.ctx.repos.subscriptions.save(&subscription).await.unwrap();

        test.sys.set_timestamp_millis(ts(19, 45));
        assert_eq!(tick(&test).await.stale, 1);
        assert!(test.delivery.delivered().is_empty());
    }

    struct SlowDelivery;

    #[async_trait::async_trait]
    impl IDeliveryService for SlowDelivery {
        async fn deliver(&self, _request: &DeliveryRequest) -> Result<(), DeliveryError> {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            Ok(())
        }
    }

    #[actix_web::test]
    async fn slow_delivery_is_a_transient_failure() {
        let mut test = setup(ts(12, 0));
        test.ctx.services.delivery = Arc::new(SlowDelivery);
        test.ctx.config.delivery_timeout_millis = 10;
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        let (subscription, _) = subscribe(&test, &event, &[15]).await;

        test.sys.set_timestamp_millis(ts(19, 45));
        assert_eq!(tick(&test).await.retrying, 1);
        let reminder = reminders(&test, &subscription).await.remove(0);
        assert_eq!(reminder.state, ReminderState::Pending);
        assert_eq!(reminder.attempts, 1);
    }

    #[actix_web::test]
    async fn expired_claim_with_a_record_is_not_delivered_again() {
        let test = setup(ts(12, 0));
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        let (subscription, created) = subscribe(&test, &event, &[15]).await;

        // A worker delivered and recorded the reminder, then died before
        // finishing its claim
        let crashed = test
            .ctx
            .repos
            .reminders
            .claim(&created[0].id, ts(19, 45), ts(19, 50))
            .await
            .unwrap()
            .unwrap();
        let record = NotificationRecord::for_reminder(
            &crashed,
            RenderedMessage {
                title: "Dune: Part Two starts in 15 minutes".into(),
                body: "Dune: Part Two starts at Sat Mar 1, 20:00 UTC on Max.".into(),
            },
            DeliveryMethod::InApp,
            ts(19, 45),
        );
        test.ctx
            .repos
            .notifications
            .insert_if_absent(&record)
            .await
            .unwrap();

        test.sys.set_timestamp_millis(ts(19, 49));
        assert_eq!(tick(&test).await.due, 0);

        // The lease has run out
        test.sys.set_timestamp_millis(ts(19, 51));
        let summary = tick(&test).await;
        assert_eq!(summary.fired, 1);
        assert!(test.delivery.delivered().is_empty());

        let reminder = reminders(&test, &subscription).await.remove(0);
        assert_eq!(reminder.state, ReminderState::Fired);
        let notifications = test
            .ctx
            .repos
            .notifications
            .find_by_user(&subscription.user_id, false, 10)
            .await
            .unwrap();
        assert_eq!(notifications, vec![record]);
    }

    #[actix_web::test]
    async fn reschedule_during_dispatch_discards_the_old_claim() {
        let test = setup(ts(12, 0));
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        let (subscription, created) = subscribe(&test, &event, &[15]).await;
        let claimed = test
            .ctx
            .repos
            .reminders
            .claim(&created[0].id, ts(19, 45), ts(19, 50))
            .await
            .unwrap()
            .unwrap();

        // Reschedule while the delivery is in flight, the claimed reminder
        // is out of reach for the materializer
        test.sys.set_timestamp_millis(ts(19, 46));
        let mut moved = event.clone();
        moved.version = 2;
        moved.start_ts = ts(21, 0);
        assert!(test.ctx.repos.events.upsert_if_newer(&moved).await.unwrap());
        let usecase = SyncSubscriptionRemindersUseCase {
            subscription: &subscription,
            event: &moved,
        };
        execute(usecase, &test.ctx).await.unwrap();

        let outcome = execute(DispatchReminderUseCase { reminder: claimed }, &test.ctx)
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Stale);

        let stored = reminders(&test, &subscription).await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].state, ReminderState::Suppressed);
        assert_eq!(stored[1].state, ReminderState::Pending);
        assert_eq!(stored[1].generation, 2);
    }

    /// Takes the next lookup failure off the list, if one is left
    fn next_failure(failures: &std::sync::Mutex<usize>) -> anyhow::Result<()> {
        let mut failures = failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(anyhow::Error::msg("connection reset by peer"));
        }
        Ok(())
    }

    struct FlakySubscriptions {
        inner: Arc<dyn ISubscriptionRepo>,
        failures: std::sync::Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl ISubscriptionRepo for FlakySubscriptions {
        async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()> {
            self.inner.insert(subscription).await
        }
        async fn save(&self, subscription: &Subscription) -> anyhow::Result<()> {
            self.inner.save(subscription).await
        }
        async fn find(&self, subscription_id: &ID) -> anyhow::Result<Option<Subscription>> {
            next_failure(&self.failures)?;
            self.inner.find(subscription_id).await
        }
        async fn find_by_user_and_event(
            &self,
            user_id: &ID,
            event_id: &ID,
        ) -> Option<Subscription> {
            self.inner.find_by_user_and_event(user_id, event_id).await
        }
        async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<Subscription>> {
            self.inner.find_by_user(user_id).await
        }
        async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<Subscription>> {
            self.inner.find_by_event(event_id).await
        }
        async fn delete(&self, subscription_id: &ID) -> Option<Subscription> {
            self.inner.delete(subscription_id).await
        }
        async fn delete_by_event(&self, event_id: &ID) -> anyhow::Result<DeleteResult> {
            self.inner.delete_by_event(event_id).await
        }
    }

    struct FlakyLedger {
        inner: Arc<dyn INotificationRepo>,
        failures: std::sync::Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl INotificationRepo for FlakyLedger {
        async fn insert_if_absent(&self, record: &NotificationRecord) -> anyhow::Result<bool> {
            self.inner.insert_if_absent(record).await
        }
        async fn find_by_reminder(
            &self,
            reminder_id: &ID,
        ) -> anyhow::Result<Option<NotificationRecord>> {
            next_failure(&self.failures)?;
            self.inner.find_by_reminder(reminder_id).await
        }
        async fn find_by_user(
            &self,
            user_id: &ID,
            unread_only: bool,
            limit: usize,
        ) -> anyhow::Result<Vec<NotificationRecord>> {
            self.inner.find_by_user(user_id, unread_only, limit).await
        }
        async fn mark_read(
            &self,
            notification_id: &ID,
            user_id: &ID,
            read_ts: i64,
        ) -> anyhow::Result<Option<NotificationRecord>> {
            self.inner.mark_read(notification_id, user_id, read_ts).await
        }
        async fn delete_by_subscription(
            &self,
            subscription_id: &ID,
        ) -> anyhow::Result<DeleteResult> {
            self.inner.delete_by_subscription(subscription_id).await
        }
    }

    #[actix_web::test]
    async fn failed_subscription_lookup_keeps_the_claim() {
        let mut test = setup(ts(12, 0));
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        let (subscription, _) = subscribe(&test, &event, &[15]).await;
        test.ctx.repos.subscriptions = Arc::new(FlakySubscriptions {
            inner: test.ctx.repos.subscriptions.clone(),
            failures: std::sync::Mutex::new(1),
        });

        test.sys.set_timestamp_millis(ts(19, 45));
        let summary = tick(&test).await;
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.stale, 0);
        assert!(test.delivery.delivered().is_empty());
        let reminder = reminders(&test, &subscription).await.remove(0);
        assert_eq!(reminder.state, ReminderState::Claimed);

        // Not suppressed, the reminder fires once the lease runs out
        test.sys.set_timestamp_millis(ts(19, 51));
        assert_eq!(tick(&test).await.fired, 1);
        assert_eq!(test.delivery.delivered().len(), 1);
        let reminder = reminders(&test, &subscription).await.remove(0);
        assert_eq!(reminder.state, ReminderState::Fired);
    }

    #[actix_web::test]
    async fn failed_ledger_lookup_does_not_deliver_again() {
        let mut test = setup(ts(12, 0));
        let event = movie_night(ts(20, 0));
        test.ctx.repos.events.insert(&event).await.unwrap();
        let (subscription, created) = subscribe(&test, &event, &[15]).await;

        // Delivered and recorded by a worker that died before finishing
        let crashed = test
            .ctx
            .repos
            .reminders
            .claim(&created[0].id, ts(19, 45), ts(19, 50))
            .await
            .unwrap()
            .unwrap();
        let record = NotificationRecord::for_reminder(
            &crashed,
            RenderedMessage {
                title: "Dune: Part Two starts in 15 minutes".into(),
                body: "Dune: Part Two starts at Sat Mar 1, 20:00 UTC on Max.".into(),
            },
            DeliveryMethod::InApp,
            ts(19, 45),
        );
        test.ctx
            .repos
            .notifications
            .insert_if_absent(&record)
            .await
            .unwrap();
        test.ctx.repos.notifications = Arc::new(FlakyLedger {
            inner: test.ctx.repos.notifications.clone(),
            failures: std::sync::Mutex::new(1),
        });

        test.sys.set_timestamp_millis(ts(19, 51));
        assert_eq!(tick(&test).await.errors, 1);
        assert!(test.delivery.delivered().is_empty());

        test.sys.set_timestamp_millis(ts(19, 57));
        assert_eq!(tick(&test).await.fired, 1);
        assert!(test.delivery.delivered().is_empty());
        let reminder = reminders(&test, &subscription).await.remove(0);
        assert_eq!(reminder.state, ReminderState::Fired);
    }
}
