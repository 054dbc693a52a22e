use super::ISubscriptionRepo;
use crate::repos::shared::repo::DeleteResult;
use binge_calendar_domain::{Subscription, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use tracing::error;

pub struct PostgresSubscriptionRepo {
    pool: PgPool,
}

impl PostgresSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SubscriptionRaw {
    subscription_uid: Uuid,
    user_uid: Uuid,
    event_uid: Uuid,
    reminder_offsets: Vec<i64>,
    notifications_enabled: bool,
    delivery_method: String,
    watch_status: String,
    custom_title: Option<String>,
    custom_notes: Option<String>,
    is_favorite: bool,
    user_rating: Option<i16>,
    watch_progress: i16,
    created: i64,
    updated: i64,
}

impl TryFrom<SubscriptionRaw> for Subscription {
    type Error = anyhow::Error;

    fn try_from(raw: SubscriptionRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.subscription_uid.into(),
            user_id: raw.user_uid.into(),
            event_id: raw.event_uid.into(),
            reminder_offsets: raw.reminder_offsets,
            notifications_enabled: raw.notifications_enabled,
            delivery_method: raw.delivery_method.parse()?,
            watch_status: raw.watch_status.parse()?,
            custom_title: raw.custom_title,
            custom_notes: raw.custom_notes,
            is_favorite: raw.is_favorite,
            user_rating: raw.user_rating.map(u8::try_from).transpose()?,
            watch_progress: u8::try_from(raw.watch_progress)?,
            created: raw.created,
            updated: raw.updated,
        })
    }
}

fn to_domain(raw: SubscriptionRaw) -> Option<Subscription> {
    let subscription_uid = raw.subscription_uid;
    Subscription::try_from(raw)
        .map_err(|e| {
            error!(
                "Unable to read stored subscription {}. Err: {:?}",
                subscription_uid, e
            )
        })
        .ok()
}

#[async_trait::async_trait]
impl ISubscriptionRepo for PostgresSubscriptionRepo {
    async fn insert(&self, s: &Subscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions
            (subscription_uid, user_uid, event_uid, reminder_offsets, notifications_enabled, delivery_method,
             watch_status, custom_title, custom_notes, is_favorite, user_rating, watch_progress, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(s.id.inner_ref())
        .bind(s.user_id.inner_ref())
        .bind(s.event_id.inner_ref())
        .bind(&s.reminder_offsets)
        .bind(s.notifications_enabled)
        .bind(s.delivery_method.as_str())
        .bind(s.watch_status.as_str())
        .bind(&s.custom_title)
        .bind(&s.custom_notes)
        .bind(s.is_favorite)
        .bind(s.user_rating.map(i16::from))
        .bind(i16::from(s.watch_progress))
        .bind(s.created)
        .bind(s.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, s: &Subscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE subscriptions SET
                reminder_offsets = $2,
                notifications_enabled = $3,
                delivery_method = $4,
                watch_status = $5,
                custom_title = $6,
                custom_notes = $7,
                is_favorite = $8,
                user_rating = $9,
                watch_progress = $10,
                updated = $11
            WHERE subscription_uid = $1
            "#,
        )
        .bind(s.id.inner_ref())
        .bind(&s.reminder_offsets)
        .bind(s.notifications_enabled)
        .bind(s.delivery_method.as_str())
        .bind(s.watch_status.as_str())
        .bind(&s.custom_title)
        .bind(&s.custom_notes)
        .bind(s.is_favorite)
        .bind(s.user_rating.map(i16::from))
        .bind(i16::from(s.watch_progress))
        .bind(s.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, subscription_id: &ID) -> anyhow::Result<Option<Subscription>> {
        let raw = sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            SELECT * FROM subscriptions AS s
            WHERE s.subscription_uid = $1
            "#,
        )
        .bind(subscription_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        raw.map(Subscription::try_from).transpose()
    }

    async fn find_by_user_and_event(&self, user_id: &ID, event_id: &ID) -> Option<Subscription> {
        let raw = sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            SELECT * FROM subscriptions AS s
            WHERE s.user_uid = $1 AND s.event_uid = $2
            "#,
        )
        .bind(user_id.inner_ref())
        .bind(event_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| error!("Unable to find subscription. Err: {:?}", e))
        .ok()??;
        to_domain(raw)
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<Subscription>> {
        let subscriptions = sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            SELECT * FROM subscriptions AS s
            WHERE s.user_uid = $1
            ORDER BY s.created
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;
        Ok(subscriptions.into_iter().filter_map(to_domain).collect())
    }

    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<Subscription>> {
        let subscriptions = sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            SELECT * FROM subscriptions AS s
            WHERE s.event_uid = $1
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;
        Ok(subscriptions.into_iter().filter_map(to_domain).collect())
    }

    async fn delete(&self, subscription_id: &ID) -> Option<Subscription> {
        let raw = sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            DELETE FROM subscriptions AS s
            WHERE s.subscription_uid = $1
            RETURNING *
            "#,
        )
        .bind(subscription_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| error!("Unable to delete subscription {}. Err: {:?}", subscription_id, e))
        .ok()??;
        to_domain(raw)
    }

    async fn delete_by_event(&self, event_id: &ID) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM subscriptions AS s
            WHERE s.event_uid = $1
            "#,
        )
        .bind(event_id.inner_ref())
        .execute(&self.pool)
        .await?;
        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }
}
