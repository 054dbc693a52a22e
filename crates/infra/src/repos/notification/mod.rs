mod inmemory;
mod postgres;

pub use inmemory::InMemoryNotificationRepo;
pub use postgres::PostgresNotificationRepo;

use crate::repos::shared::repo::DeleteResult;
use binge_calendar_domain::{NotificationRecord, ID};

/// The notification ledger. Records are only ever appended, the read
/// instant is the single field that changes afterwards.
#[async_trait::async_trait]
pub trait INotificationRepo: Send + Sync {
    /// Stores the record unless the reminder already has one. Returns
    /// whether this call stored it.
    async fn insert_if_absent(&self, record: &NotificationRecord) -> anyhow::Result<bool>;
    async fn find_by_reminder(&self, reminder_id: &ID)
        -> anyhow::Result<Option<NotificationRecord>>;
    /// Newest first
    async fn find_by_user(
        &self,
        user_id: &ID,
        unread_only: bool,
        limit: usize,
    ) -> anyhow::Result<Vec<NotificationRecord>>;
    /// Sets the read instant if it is not set yet and returns the stored
    /// record. `None` if the user has no such notification.
    async fn mark_read(
        &self,
        notification_id: &ID,
        user_id: &ID,
        read_ts: i64,
    ) -> anyhow::Result<Option<NotificationRecord>>;
    async fn delete_by_subscription(&self, subscription_id: &ID) -> anyhow::Result<DeleteResult>;
}

#[cfg(test)]
mod tests {
    use crate::setup_context;
    use binge_calendar_domain::{
        DeliveryMethod, NotificationRecord, ReminderInstance, ReminderState, RenderedMessage, ID,
    };

    fn record(user_id: &ID, subscription_id: &ID, sent_ts: i64) -> NotificationRecord {
        let reminder = ReminderInstance::new(
            subscription_id,
            user_id,
            &ID::new(),
            15,
            sent_ts,
            1,
            ReminderState::Claimed,
            0,
        );
        NotificationRecord::for_reminder(
            &reminder,
            RenderedMessage {
                title: "Dune: Part Two starts in 15 minutes".into(),
                body: "Dune: Part Two starts at Fri Mar 1, 19:00 UTC.".into(),
            },
            DeliveryMethod::InApp,
            sent_ts,
        )
    }

    #[tokio::test]
    async fn keeps_one_record_per_reminder() {
        let ctx = setup_context().await;
        let first = record(&ID::new(), &ID::new(), 1000);
        let mut second = first.clone();
        second.id = ID::new();
        second.sent_ts = 2000;

        assert!(ctx.repos.notifications.insert_if_absent(&first).await.unwrap());
        assert!(!ctx.repos.notifications.insert_if_absent(&second).await.unwrap());

        let stored = ctx
            .repos
            .notifications
            .find_by_reminder(&first.reminder_id)
            .await
            .unwrap()
            .expect("To find notification");
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn lists_newest_first_and_marks_read() {
        let ctx = setup_context().await;
        let user_id = ID::new();
        let subscription_id = ID::new();
        let records = vec![
            record(&user_id, &subscription_id, 1000),
            record(&user_id, &subscription_id, 3000),
            record(&user_id, &subscription_id, 2000),
        ];
        for r in &records {
            ctx.repos.notifications.insert_if_absent(r).await.unwrap();
        }
        ctx.repos
            .notifications
            .insert_if_absent(&record(&ID::new(), &ID::new(), 4000))
            .await
            .unwrap();

        let listed = ctx
            .repos
            .notifications
            .find_by_user(&user_id, false, 10)
            .await
            .unwrap();
        assert_eq!(
            listed.iter().map(|r| r.sent_ts).collect::<Vec<_>>(),
            vec![3000, 2000, 1000]
        );

        // Someone else's notification can not be marked
        assert!(ctx
            .repos
            .notifications
            .mark_read(&records[1].id, &ID::new(), 5000)
            .await
            .unwrap()
            .is_none());

        let read = ctx
            .repos
            .notifications
            .mark_read(&records[1].id, &user_id, 5000)
            .await
            .unwrap()
            .expect("To mark notification as read");
        assert_eq!(read.read_ts, Some(5000));
        let read = ctx
            .repos
            .notifications
            .mark_read(&records[1].id, &user_id, 6000)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read.read_ts, Some(5000));

        let unread = ctx
            .repos
            .notifications
            .find_by_user(&user_id, true, 10)
            .await
            .unwrap();
        assert_eq!(
            unread.iter().map(|r| r.sent_ts).collect::<Vec<_>>(),
            vec![2000, 1000]
        );
        let limited = ctx
            .repos
            .notifications
            .find_by_user(&user_id, false, 1)
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);

        let res = ctx
            .repos
            .notifications
            .delete_by_subscription(&subscription_id)
            .await
            .unwrap();
        assert_eq!(res.deleted_count, 3);
    }
}
