use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

/// One scheduled reminder for one offset of a `Subscription`.
///
/// Lifecycle:
/// `Pending -> Claimed -> Fired | Suppressed | Failed`, and `Claimed -> Pending`
/// when a dispatch attempt is rolled back. `Pending -> Suppressed` when the
/// materializer supersedes it. `Fired`, `Suppressed` and `Failed` are final.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderInstance {
    pub id: ID,
    pub subscription_id: ID,
    pub user_id: ID,
    pub event_id: ID,
    pub offset_minutes: i64,
    /// Instant in millis this reminder is due
    pub fire_ts: i64,
    pub state: ReminderState,
    /// Version of the `MediaEvent` this reminder was computed from
    pub generation: i64,
    /// Number of failed dispatch attempts
    pub attempts: i64,
    /// Expiry of the current claim. A crashed worker's claim can be taken
    /// over after this.
    pub claimed_until: Option<i64>,
    /// Backoff after a failed dispatch attempt
    pub retry_at: Option<i64>,
    pub created: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    Pending,
    Claimed,
    Fired,
    Suppressed,
    Failed,
}

text_enum!(ReminderState {
    Pending => "pending",
    Claimed => "claimed",
    Fired => "fired",
    Suppressed => "suppressed",
    Failed => "failed",
});

impl ReminderState {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Fired | Self::Suppressed | Self::Failed)
    }
}

impl ReminderInstance {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        subscription_id: &ID,
        user_id: &ID,
        event_id: &ID,
        offset_minutes: i64,
        fire_ts: i64,
        generation: i64,
        state: ReminderState,
        now: i64,
    ) -> Self {
        Self {
            id: Default::default(),
            subscription_id: subscription_id.clone(),
            user_id: user_id.clone(),
            event_id: event_id.clone(),
            offset_minutes,
            fire_ts,
            state,
            generation,
            attempts: 0,
            claimed_until: None,
            retry_at: None,
            created: now,
        }
    }

    /// Whether the dispatch loop should try to claim this reminder at `now`
    pub fn is_due(&self, now: i64) -> bool {
        match self.state {
            ReminderState::Pending => {
                self.fire_ts <= now && self.retry_at.map(|ts| ts <= now).unwrap_or(true)
            }
            // A claim that outlived its lease belongs to a worker that went away
            ReminderState::Claimed => self.claimed_until.map(|ts| ts < now).unwrap_or(true),
            _ => false,
        }
    }
}

impl Entity for ReminderInstance {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder(state: ReminderState) -> ReminderInstance {
        ReminderInstance::new(&ID::new(), &ID::new(), &ID::new(), 15, 1000, 1, state, 0)
    }

    #[test]
    fn pending_reminders_are_due_at_fire_ts() {
        let r = reminder(ReminderState::Pending);
        assert!(!r.is_due(999));
        assert!(r.is_due(1000));
        assert!(r.is_due(5000));
    }

    #[test]
    fn respects_retry_backoff() {
        let mut r = reminder(ReminderState::Pending);
        r.retry_at = Some(2000);
        assert!(!r.is_due(1500));
        assert!(r.is_due(2000));
    }

    #[test]
    fn claimed_reminders_are_due_when_lease_expires() {
        let mut r = reminder(ReminderState::Claimed);
        r.claimed_until = Some(3000);
        assert!(!r.is_due(3000));
        assert!(r.is_due(3001));
    }

    #[test]
    fn final_reminders_are_never_due() {
        for state in &[
            ReminderState::Fired,
            ReminderState::Suppressed,
            ReminderState::Failed,
        ] {
            assert!(state.is_final());
            assert!(!reminder(*state).is_due(i64::MAX));
        }
    }
}
