use crate::shared::usecase::UseCase;
use binge_calendar_domain::{
    render_reminder, MediaEvent, NotificationRecord, ReminderInstance, ReminderState,
    Subscription,
};
use binge_calendar_infra::{Alert, BingeContext, DeliveryError, DeliveryRequest};
use std::time::Duration;
use tracing::{debug, error, warn};

/// What happened to a claimed reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Delivered and recorded in the notification ledger
    Fired,
    /// The ledger already had a record, a previous worker got this far
    AlreadyFired,
    /// The subscription or event changed after the reminder was claimed
    Stale,
    /// Delivery failed for now, the reminder is pending again
    Retrying,
    /// Delivery will not succeed, an alert was raised
    Failed,
    /// The lease ran out and another worker owns the reminder now
    ClaimLost,
}

/// Delivers a single claimed `ReminderInstance` and records it in the
/// notification ledger
#[derive(Debug)]
pub struct DispatchReminderUseCase {
    pub reminder: ReminderInstance,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

impl DispatchReminderUseCase {
    /// The subscription and event the claim was made for, if it is still
    /// meant to fire. A failed lookup leaves the claim untouched so the
    /// reminder is picked up again once the lease runs out.
    async fn find_target(
        &self,
        ctx: &BingeContext,
    ) -> Result<Option<(Subscription, MediaEvent)>, UseCaseError> {
        let reminder = &self.reminder;
        let subscription = match ctx.repos.subscriptions.find(&reminder.subscription_id).await {
            Ok(Some(subscription)) => subscription,
            Ok(None) => return Ok(None),
            Err(e) => {
                error!(
                    "Unable to find subscription {} of reminder {}. Err: {:?}",
                    reminder.subscription_id, reminder.id, e
                );
                return Err(UseCaseError::StorageError);
            }
        };
        if !subscription.notifications_enabled
            || !subscription
                .reminder_offsets
                .contains(&reminder.offset_minutes)
        {
            return Ok(None);
        }
        let event = match ctx.repos.events.find(&reminder.event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => return Ok(None),
            Err(e) => {
                error!(
                    "Unable to find event {} of reminder {}. Err: {:?}",
                    reminder.event_id, reminder.id, e
                );
                return Err(UseCaseError::StorageError);
            }
        };
        if !event.is_schedulable() || event.version != reminder.generation {
            return Ok(None);
        }
        Ok(Some((subscription, event)))
    }

    async fn finish(
        &self,
        state: ReminderState,
        outcome: DispatchOutcome,
        ctx: &BingeContext,
    ) -> Result<DispatchOutcome, UseCaseError> {
        match ctx.repos.reminders.finish_claim(&self.reminder, state).await {
            Ok(true) => Ok(outcome),
            Ok(false) => {
                warn!(
                    "Lost the claim on reminder {} before it could be marked as {:?}",
                    self.reminder.id, state
                );
                Ok(DispatchOutcome::ClaimLost)
            }
            Err(e) => {
                error!(
                    "Unable to mark reminder {} as {:?}. Err: {:?}",
                    self.reminder.id, state, e
                );
                Err(UseCaseError::StorageError)
            }
        }
    }

    async fn fail(
        &self,
        reason: String,
        attempts: i64,
        ctx: &BingeContext,
    ) -> Result<DispatchOutcome, UseCaseError> {
        let outcome = self
            .finish(ReminderState::Failed, DispatchOutcome::Failed, ctx)
            .await?;
        if outcome == DispatchOutcome::Failed {
            let alert = Alert {
                reminder_id: self.reminder.id.clone(),
                subscription_id: self.reminder.subscription_id.clone(),
                attempts,
                reason,
            };
            ctx.services.alerts.alert(&alert).await;
        }
        Ok(outcome)
    }

    async fn retry_later(
        &self,
        reason: String,
        ctx: &BingeContext,
    ) -> Result<DispatchOutcome, UseCaseError> {
        let attempts = self.reminder.attempts + 1;
        if attempts >= ctx.config.max_delivery_attempts {
            return self.fail(reason, attempts, ctx).await;
        }

        let retry_at = ctx.sys.get_timestamp_millis() + ctx.config.retry_backoff(attempts);
        match ctx.repos.reminders.release_claim(&self.reminder, retry_at).await {
            Ok(true) => Ok(DispatchOutcome::Retrying),
            // Either the claim expired or a reschedule put a newer reminder in place
            Ok(false) => {
                self.finish(ReminderState::Suppressed, DispatchOutcome::Stale, ctx)
                    .await
            }
            Err(e) => {
                error!(
                    "Unable to release the claim on reminder {}. Err: {:?}",
                    self.reminder.id, e
                );
                Err(UseCaseError::StorageError)
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DispatchReminderUseCase {
    type Response = DispatchOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "DispatchReminder";

    async fn execute(&mut self, ctx: &BingeContext) -> Result<Self::Response, Self::Error> {
        let reminder = &self.reminder;

        match ctx.repos.notifications.find_by_reminder(&reminder.id).await {
            Ok(Some(_)) => {
                return self
                    .finish(ReminderState::Fired, DispatchOutcome::AlreadyFired, ctx)
                    .await
            }
            Ok(None) => {}
            Err(e) => {
                error!(
                    "Unable to look up the notification of reminder {}. Err: {:?}",
                    reminder.id, e
                );
                return Err(UseCaseError::StorageError);
            }
        }

        let (subscription, event) = match self.find_target(ctx).await? {
            Some(target) => target,
            None => {
                debug!(
                    "Discarding stale reminder {} of subscription {}",
                    reminder.id, reminder.subscription_id
                );
                return self
                    .finish(ReminderState::Suppressed, DispatchOutcome::Stale, ctx)
                    .await;
            }
        };

        let profile = ctx
            .services
            .billing
            .get_user_profile(&reminder.user_id)
            .await;
        let message = render_reminder(
            &event,
            &subscription,
            reminder.offset_minutes,
            &profile.timezone,
        );
        let request = DeliveryRequest {
            reminder_id: reminder.id.clone(),
            user_id: reminder.user_id.clone(),
            event_id: reminder.event_id.clone(),
            delivery_method: subscription.delivery_method,
            title: message.title.clone(),
            message: message.body.clone(),
        };

        let timeout = Duration::from_millis(ctx.config.delivery_timeout_millis);
        let delivered = match tokio::time::timeout(timeout, ctx.services.delivery.deliver(&request))
            .await
        {
            Ok(res) => res,
            Err(_) => Err(DeliveryError::Transient(format!(
                "Delivery did not finish within {} ms",
                ctx.config.delivery_timeout_millis
            ))),
        };

        match delivered {
            Ok(()) => {
                let record = NotificationRecord::for_reminder(
                    reminder,
                    message,
                    subscription.delivery_method,
                    ctx.sys.get_timestamp_millis(),
                );
                if let Err(e) = ctx.repos.notifications.insert_if_absent(&record).await {
                    error!(
                        "Unable to record the notification of reminder {}. Err: {:?}",
                        reminder.id, e
                    );
                    return Err(UseCaseError::StorageError);
                }
                self.finish(ReminderState::Fired, DispatchOutcome::Fired, ctx)
                    .await
            }
            Err(DeliveryError::Transient(reason)) => {
                warn!(
                    "Transient failure delivering reminder {} on attempt {}: {}",
                    reminder.id,
                    reminder.attempts + 1,
                    reason
                );
                self.retry_later(reason, ctx).await
            }
            Err(DeliveryError::Permanent(reason)) => {
                warn!(
                    "Permanent failure delivering reminder {}: {}",
                    reminder.id, reason
                );
                self.fail(reason, reminder.attempts + 1, ctx).await
            }
        }
    }
}
