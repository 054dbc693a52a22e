use super::IReminderRepo;
use crate::repos::shared::{inmemory_repo::*, repo::DeleteResult};
use binge_calendar_domain::{ReminderInstance, ReminderPlan, ReminderState, ID};
use std::sync::Mutex;

pub struct InMemoryReminderRepo {
    reminders: Mutex<Vec<ReminderInstance>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: Mutex::new(Vec::new()),
        }
    }
}

fn holds_claim(stored: &ReminderInstance, claimed: &ReminderInstance) -> bool {
    stored.id == claimed.id
        && stored.state == ReminderState::Claimed
        && stored.claimed_until == claimed.claimed_until
}

/// Whether storing `reminder` would give its offset a second pending
/// reminder. Pending reminders in `replaced` do not count.
fn has_pending_twin(
    stored: &[ReminderInstance],
    reminder: &ReminderInstance,
    replaced: &[ID],
) -> bool {
    reminder.state == ReminderState::Pending
        && stored.iter().any(|r| {
            r.state == ReminderState::Pending
                && r.subscription_id == reminder.subscription_id
                && r.offset_minutes == reminder.offset_minutes
                && !replaced.contains(&r.id)
        })
}

fn pending_twin_error(reminder: &ReminderInstance) -> anyhow::Error {
    anyhow::Error::msg(format!(
        "Subscription {} already has a pending reminder for offset {}",
        reminder.subscription_id, reminder.offset_minutes
    ))
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn bulk_insert(&self, reminders: &[ReminderInstance]) -> anyhow::Result<()> {
        let mut stored = self.reminders.lock().unwrap();
        if let Some(twin) = reminders.iter().find(|r| has_pending_twin(&stored, r, &[])) {
            return Err(pending_twin_error(twin));
        }
        stored.extend(reminders.iter().cloned());
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<ReminderInstance> {
        find(reminder_id, &self.reminders)
    }

    async fn find_by_subscription(
        &self,
        subscription_id: &ID,
    ) -> anyhow::Result<Vec<ReminderInstance>> {
        let mut reminders = find_by(&self.reminders, |r| r.subscription_id == *subscription_id);
        reminders.sort_by_key(|r| r.fire_ts);
        Ok(reminders)
    }

    async fn find_due(&self, now: i64, limit: usize) -> anyhow::Result<Vec<ReminderInstance>> {
        let mut due = find_by(&self.reminders, |r| r.is_due(now));
        due.sort_by(|a, b| {
            a.fire_ts
                .cmp(&b.fire_ts)
                .then_with(|| a.subscription_id.inner_ref().cmp(b.subscription_id.inner_ref()))
        });
        due.truncate(limit);
        Ok(due)
    }

    async fn claim(
        &self,
        reminder_id: &ID,
        now: i64,
        lease_until: i64,
    ) -> anyhow::Result<Option<ReminderInstance>> {
        let claimed = update_many(
            &self.reminders,
            |r| r.id == *reminder_id && r.is_due(now),
            |r| {
                r.state = ReminderState::Claimed;
                r.claimed_until = Some(lease_until);
            },
        );
        Ok(claimed.into_iter().next())
    }

    async fn release_claim(
        &self,
        claimed: &ReminderInstance,
        retry_at: i64,
    ) -> anyhow::Result<bool> {
        let mut reminders = self.reminders.lock().unwrap();
        let replaced = reminders.iter().any(|r| {
            r.id != claimed.id
                && r.state == ReminderState::Pending
                && r.subscription_id == claimed.subscription_id
                && r.offset_minutes == claimed.offset_minutes
        });
        if replaced {
            return Ok(false);
        }
        match reminders.iter_mut().find(|r| holds_claim(r, claimed)) {
            Some(reminder) => {
                reminder.state = ReminderState::Pending;
                reminder.attempts += 1;
                reminder.claimed_until = None;
                reminder.retry_at = Some(retry_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn finish_claim(
        &self,
        claimed: &ReminderInstance,
        state: ReminderState,
    ) -> anyhow::Result<bool> {
        let finished = update_many(
            &self.reminders,
            |r| holds_claim(r, claimed),
            |r| {
                r.state = state;
                r.claimed_until = None;
            },
        );
        Ok(!finished.is_empty())
    }

    async fn apply_plan(
        &self,
        subscription_id: &ID,
        planner: &(dyn for<'r> Fn(&'r [ReminderInstance]) -> ReminderPlan + Send + Sync),
    ) -> anyhow::Result<ReminderPlan> {
        // The lock is held from the read until the plan is written
        let mut stored = self.reminders.lock().unwrap();
        let mut existing = stored
            .iter()
            .filter(|r| r.subscription_id == *subscription_id)
            .cloned()
            .collect::<Vec<_>>();
        existing.sort_by_key(|r| r.fire_ts);

        let plan = planner(&existing);
        if let Some(twin) = plan
            .create
            .iter()
            .find(|r| has_pending_twin(&stored, r, &plan.suppress))
        {
            return Err(pending_twin_error(twin));
        }
        for reminder in stored.iter_mut() {
            if reminder.state == ReminderState::Pending && plan.suppress.contains(&reminder.id) {
                reminder.state = ReminderState::Suppressed;
            }
        }
        stored.extend(plan.create.iter().cloned());
        Ok(plan)
    }

    async fn suppress_pending_by_subscription(
        &self,
        subscription_id: &ID,
    ) -> anyhow::Result<u64> {
        let suppressed = update_many(
            &self.reminders,
            |r| r.state == ReminderState::Pending && r.subscription_id == *subscription_id,
            |r| r.state = ReminderState::Suppressed,
        );
        Ok(suppressed.len() as u64)
    }

    async fn delete_by_subscription(&self, subscription_id: &ID) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.reminders, |r| {
            r.subscription_id == *subscription_id
        }))
    }
}
