use super::INotificationRepo;
use crate::repos::shared::repo::DeleteResult;
use binge_calendar_domain::{NotificationRecord, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use tracing::error;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRaw {
    notification_uid: Uuid,
    reminder_uid: Uuid,
    subscription_uid: Uuid,
    user_uid: Uuid,
    event_uid: Uuid,
    kind: String,
    title: String,
    message: String,
    delivery_method: String,
    sent_ts: i64,
    read_ts: Option<i64>,
}

impl TryFrom<NotificationRaw> for NotificationRecord {
    type Error = anyhow::Error;

    fn try_from(raw: NotificationRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.notification_uid.into(),
            reminder_id: raw.reminder_uid.into(),
            subscription_id: raw.subscription_uid.into(),
            user_id: raw.user_uid.into(),
            event_id: raw.event_uid.into(),
            kind: raw.kind.parse()?,
            title: raw.title,
            message: raw.message,
            delivery_method: raw.delivery_method.parse()?,
            sent_ts: raw.sent_ts,
            read_ts: raw.read_ts,
        })
    }
}

fn to_domain(raw: NotificationRaw) -> Option<NotificationRecord> {
    let notification_uid = raw.notification_uid;
    NotificationRecord::try_from(raw)
        .map_err(|e| {
            error!(
                "Unable to read stored notification {}. Err: {:?}",
                notification_uid, e
            )
        })
        .ok()
}

#[async_trait::async_trait]
impl INotificationRepo for PostgresNotificationRepo {
    async fn insert_if_absent(&self, n: &NotificationRecord) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO notifications
            (notification_uid, reminder_uid, subscription_uid, user_uid, event_uid, kind, title,
             message, delivery_method, sent_ts, read_ts)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (reminder_uid) DO NOTHING
            "#,
        )
        .bind(n.id.inner_ref())
        .bind(n.reminder_id.inner_ref())
        .bind(n.subscription_id.inner_ref())
        .bind(n.user_id.inner_ref())
        .bind(n.event_id.inner_ref())
        .bind(n.kind.as_str())
        .bind(&n.title)
        .bind(&n.message)
        .bind(n.delivery_method.as_str())
        .bind(n.sent_ts)
        .bind(n.read_ts)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn find_by_reminder(
        &self,
        reminder_id: &ID,
    ) -> anyhow::Result<Option<NotificationRecord>> {
        let raw = sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications AS n
            WHERE n.reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        raw.map(NotificationRecord::try_from).transpose()
    }

    async fn find_by_user(
        &self,
        user_id: &ID,
        unread_only: bool,
        limit: usize,
    ) -> anyhow::Result<Vec<NotificationRecord>> {
        let notifications = sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications AS n
            WHERE n.user_uid = $1 AND (NOT $2 OR n.read_ts IS NULL)
            ORDER BY n.sent_ts DESC
            LIMIT $3
            "#,
        )
        .bind(user_id.inner_ref())
        .bind(unread_only)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications.into_iter().filter_map(to_domain).collect())
    }

    async fn mark_read(
        &self,
        notification_id: &ID,
        user_id: &ID,
        read_ts: i64,
    ) -> anyhow::Result<Option<NotificationRecord>> {
        let raw = sqlx::query_as::<_, NotificationRaw>(
            r#"
            UPDATE notifications AS n
            SET read_ts = COALESCE(n.read_ts, $3)
            WHERE n.notification_uid = $1 AND n.user_uid = $2
            RETURNING *
            "#,
        )
        .bind(notification_id.inner_ref())
        .bind(user_id.inner_ref())
        .bind(read_ts)
        .fetch_optional(&self.pool)
        .await?;
        Ok(raw.and_then(to_domain))
    }

    async fn delete_by_subscription(&self, subscription_id: &ID) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM notifications AS n
            WHERE n.subscription_uid = $1
            "#,
        )
        .bind(subscription_id.inner_ref())
        .execute(&self.pool)
        .await?;
        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }
}
