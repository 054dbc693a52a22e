use crate::{
    event::MediaEvent,
    reminder::{ReminderInstance, ReminderState},
    shared::entity::ID,
    subscription::Subscription,
};
use std::collections::HashSet;

/// Changes needed to bring the stored `ReminderInstance`s of a
/// `Subscription` in line with the current `Subscription` and `MediaEvent`.
#[derive(Debug, Default, PartialEq)]
pub struct ReminderPlan {
    /// New instances to insert, either `Pending` or `Suppressed`
    pub create: Vec<ReminderInstance>,
    /// `Pending` instances that are superseded
    pub suppress: Vec<ID>,
}

impl ReminderPlan {
    pub fn is_noop(&self) -> bool {
        self.create.is_empty() && self.suppress.is_empty()
    }
}

/// Computes which reminders should exist for a `Subscription` at `now`.
///
/// `existing` are all the instances stored for the subscription, in any state.
/// This is a pure function: applying the returned plan and calling it again
/// with the same inputs yields an empty plan.
///
/// Rules:
/// - Pending instances survive only if they match an offset of the
///   subscription and the current event version, and the event is
///   schedulable with notifications enabled. Everything else pending is
///   suppressed.
/// - An offset never gets a new instance for an event version it has already
///   been claimed, fired or failed for. Fired instances from older versions
///   are left untouched.
/// - A reminder whose fire instant is already in the past is recorded as
///   `Suppressed` instead of being fired late.
/// - Nothing changes when `existing` was planned for a newer event version
///   than `event`.
pub fn materialize_reminders(
    subscription: &Subscription,
    event: &MediaEvent,
    existing: &[ReminderInstance],
    now: i64,
) -> ReminderPlan {
    let mut plan = ReminderPlan::default();
    if existing.iter().any(|r| r.generation > event.version) {
        return plan;
    }
    let schedulable = event.is_schedulable() && subscription.notifications_enabled;

    let mut scheduled_offsets = HashSet::new();
    for reminder in existing
        .iter()
        .filter(|r| r.state == ReminderState::Pending)
    {
        let up_to_date = schedulable
            && reminder.generation == event.version
            && reminder.fire_ts == event.reminder_fire_ts(reminder.offset_minutes)
            && subscription
                .reminder_offsets
                .contains(&reminder.offset_minutes);

        // `insert` also guards against two pending instances for one offset
        if up_to_date && scheduled_offsets.insert(reminder.offset_minutes) {
            continue;
        }
        plan.suppress.push(reminder.id.clone());
    }

    if !schedulable {
        return plan;
    }

    for offset in &subscription.reminder_offsets {
        if scheduled_offsets.contains(offset) {
            continue;
        }
        let mut same_generation = existing
            .iter()
            .filter(|r| r.offset_minutes == *offset && r.generation == event.version)
            .peekable();
        let has_history = same_generation.peek().is_some();
        let already_handled = same_generation.any(|r| {
            matches!(
                r.state,
                ReminderState::Claimed | ReminderState::Fired | ReminderState::Failed
            )
        });
        if already_handled {
            continue;
        }

        let fire_ts = event.reminder_fire_ts(*offset);
        let state = if fire_ts >= now {
            ReminderState::Pending
        } else if !has_history {
            ReminderState::Suppressed
        } else {
            // Past due and the suppression is already on record
            continue;
        };

        plan.create.push(ReminderInstance::new(
            &subscription.id,
            &subscription.user_id,
            &event.id,
            *offset,
            fire_ts,
            event.version,
            state,
            now,
        ));
    }

    plan
}
