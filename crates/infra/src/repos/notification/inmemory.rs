use super::INotificationRepo;
use crate::repos::shared::{inmemory_repo::*, repo::DeleteResult};
use binge_calendar_domain::{NotificationRecord, ID};
use std::sync::Mutex;

pub struct InMemoryNotificationRepo {
    notifications: Mutex<Vec<NotificationRecord>>,
}

impl InMemoryNotificationRepo {
    pub fn new() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl INotificationRepo for InMemoryNotificationRepo {
    async fn insert_if_absent(&self, record: &NotificationRecord) -> anyhow::Result<bool> {
        let mut notifications = self.notifications.lock().unwrap();
        if notifications
            .iter()
            .any(|n| n.reminder_id == record.reminder_id)
        {
            return Ok(false);
        }
        notifications.push(record.clone());
        Ok(true)
    }

    async fn find_by_reminder(
        &self,
        reminder_id: &ID,
    ) -> anyhow::Result<Option<NotificationRecord>> {
        Ok(find_by(&self.notifications, |n| n.reminder_id == *reminder_id)
            .into_iter()
            .next())
    }

    async fn find_by_user(
        &self,
        user_id: &ID,
        unread_only: bool,
        limit: usize,
    ) -> anyhow::Result<Vec<NotificationRecord>> {
        let mut notifications = find_by(&self.notifications, |n| {
            n.user_id == *user_id && !(unread_only && n.is_read())
        });
        notifications.sort_by(|a, b| b.sent_ts.cmp(&a.sent_ts));
        notifications.truncate(limit);
        Ok(notifications)
    }

    async fn mark_read(
        &self,
        notification_id: &ID,
        user_id: &ID,
        read_ts: i64,
    ) -> anyhow::Result<Option<NotificationRecord>> {
        let updated = update_many(
            &self.notifications,
            |n| n.id == *notification_id && n.user_id == *user_id,
            |n| n.mark_read(read_ts),
        );
        Ok(updated.into_iter().next())
    }

    async fn delete_by_subscription(&self, subscription_id: &ID) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.notifications, |n| {
            n.subscription_id == *subscription_id
        }))
    }
}
