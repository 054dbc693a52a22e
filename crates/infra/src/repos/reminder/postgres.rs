use super::IReminderRepo;
use crate::repos::shared::repo::DeleteResult;
use binge_calendar_domain::{ReminderInstance, ReminderPlan, ReminderState, ID};
use sqlx::{types::Uuid, FromRow, PgConnection, PgPool};
use std::convert::TryFrom;
use tracing::error;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    subscription_uid: Uuid,
    user_uid: Uuid,
    event_uid: Uuid,
    offset_minutes: i64,
    fire_ts: i64,
    state: String,
    generation: i64,
    attempts: i64,
    claimed_until: Option<i64>,
    retry_at: Option<i64>,
    created: i64,
}

impl TryFrom<ReminderRaw> for ReminderInstance {
    type Error = anyhow::Error;

    fn try_from(raw: ReminderRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.reminder_uid.into(),
            subscription_id: raw.subscription_uid.into(),
            user_id: raw.user_uid.into(),
            event_id: raw.event_uid.into(),
            offset_minutes: raw.offset_minutes,
            fire_ts: raw.fire_ts,
            state: raw.state.parse()?,
            generation: raw.generation,
            attempts: raw.attempts,
            claimed_until: raw.claimed_until,
            retry_at: raw.retry_at,
            created: raw.created,
        })
    }
}

fn to_domain(raw: ReminderRaw) -> Option<ReminderInstance> {
    let reminder_uid = raw.reminder_uid;
    ReminderInstance::try_from(raw)
        .map_err(|e| error!("Unable to read stored reminder {}. Err: {:?}", reminder_uid, e))
        .ok()
}

fn to_uuids(ids: &[ID]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.inner_ref()).collect()
}

async fn insert_all(conn: &mut PgConnection, reminders: &[ReminderInstance]) -> anyhow::Result<()> {
    for r in reminders {
        sqlx::query(
            r#"
            INSERT INTO reminders
            (reminder_uid, subscription_uid, user_uid, event_uid, offset_minutes, fire_ts,
             state, generation, attempts, claimed_until, retry_at, created)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(r.id.inner_ref())
        .bind(r.subscription_id.inner_ref())
        .bind(r.user_id.inner_ref())
        .bind(r.event_id.inner_ref())
        .bind(r.offset_minutes)
        .bind(r.fire_ts)
        .bind(r.state.as_str())
        .bind(r.generation)
        .bind(r.attempts)
        .bind(r.claimed_until)
        .bind(r.retry_at)
        .bind(r.created)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn bulk_insert(&self, reminders: &[ReminderInstance]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        insert_all(&mut tx, reminders).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<ReminderInstance> {
        let raw = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| error!("Unable to find reminder {}. Err: {:?}", reminder_id, e))
        .ok()??;
        to_domain(raw)
    }

    async fn find_by_subscription(
        &self,
        subscription_id: &ID,
    ) -> anyhow::Result<Vec<ReminderInstance>> {
        let reminders = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.subscription_uid = $1
            ORDER BY r.fire_ts
            "#,
        )
        .bind(subscription_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;
        Ok(reminders.into_iter().filter_map(to_domain).collect())
    }

    async fn find_due(&self, now: i64, limit: usize) -> anyhow::Result<Vec<ReminderInstance>> {
        let reminders = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE
                (r.state = 'pending' AND r.fire_ts <= $1 AND (r.retry_at IS NULL OR r.retry_at <= $1))
                OR (r.state = 'claimed' AND (r.claimed_until IS NULL OR r.claimed_until < $1))
            ORDER BY r.fire_ts, r.subscription_uid
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(reminders.into_iter().filter_map(to_domain).collect())
    }

    async fn claim(
        &self,
        reminder_id: &ID,
        now: i64,
        lease_until: i64,
    ) -> anyhow::Result<Option<ReminderInstance>> {
        let raw = sqlx::query_as::<_, ReminderRaw>(
            r#"
            UPDATE reminders AS r
            SET state = 'claimed', claimed_until = $3
            WHERE r.reminder_uid = $1 AND (
                (r.state = 'pending' AND r.fire_ts <= $2 AND (r.retry_at IS NULL OR r.retry_at <= $2))
                OR (r.state = 'claimed' AND (r.claimed_until IS NULL OR r.claimed_until < $2))
            )
            RETURNING *
            "#,
        )
        .bind(reminder_id.inner_ref())
        .bind(now)
        .bind(lease_until)
        .fetch_optional(&self.pool)
        .await?;
        Ok(raw.and_then(to_domain))
    }

    async fn release_claim(
        &self,
        claimed: &ReminderInstance,
        retry_at: i64,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE reminders AS r
            SET state = 'pending', attempts = r.attempts + 1, claimed_until = NULL, retry_at = $3
            WHERE r.reminder_uid = $1 AND r.state = 'claimed' AND r.claimed_until = $2
            AND NOT EXISTS (
                SELECT 1 FROM reminders AS o
                WHERE o.subscription_uid = r.subscription_uid
                AND o.offset_minutes = r.offset_minutes
                AND o.state = 'pending'
            )
            "#,
        )
        .bind(claimed.id.inner_ref())
        .bind(claimed.claimed_until)
        .bind(retry_at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn finish_claim(
        &self,
        claimed: &ReminderInstance,
        state: ReminderState,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE reminders AS r
            SET state = $3, claimed_until = NULL
            WHERE r.reminder_uid = $1 AND r.state = 'claimed' AND r.claimed_until = $2
            "#,
        )
        .bind(claimed.id.inner_ref())
        .bind(claimed.claimed_until)
        .bind(state.as_str())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn apply_plan(
        &self,
        subscription_id: &ID,
        planner: &(dyn for<'r> Fn(&'r [ReminderInstance]) -> ReminderPlan + Send + Sync),
    ) -> anyhow::Result<ReminderPlan> {
        let mut tx = self.pool.begin().await?;
        // Serializes plans of the same subscription until commit
        sqlx::query(
            r#"
            SELECT 1 FROM subscriptions AS s
            WHERE s.subscription_uid = $1
            FOR UPDATE
            "#,
        )
        .bind(subscription_id.inner_ref())
        .execute(&mut *tx)
        .await?;

        let existing = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.subscription_uid = $1
            ORDER BY r.fire_ts
            "#,
        )
        .bind(subscription_id.inner_ref())
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(ReminderInstance::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;

        let plan = planner(&existing);
        if !plan.suppress.is_empty() {
            sqlx::query(
                r#"
                UPDATE reminders AS r
                SET state = 'suppressed'
                WHERE r.reminder_uid = ANY($1) AND r.state = 'pending'
                "#,
            )
            .bind(to_uuids(&plan.suppress))
            .execute(&mut *tx)
            .await?;
        }
        insert_all(&mut tx, &plan.create).await?;
        tx.commit().await?;
        Ok(plan)
    }

    async fn suppress_pending_by_subscription(
        &self,
        subscription_id: &ID,
    ) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE reminders AS r
            SET state = 'suppressed'
            WHERE r.subscription_uid = $1 AND r.state = 'pending'
            "#,
        )
        .bind(subscription_id.inner_ref())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn delete_by_subscription(&self, subscription_id: &ID) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM reminders AS r
            WHERE r.subscription_uid = $1
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
