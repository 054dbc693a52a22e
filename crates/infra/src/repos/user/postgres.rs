use super::IUserRepo;
use binge_calendar_domain::{UserProfile, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use tracing::error;

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRaw {
    user_uid: Uuid,
    tier: String,
    timezone: String,
    updated: i64,
}

impl TryFrom<UserRaw> for UserProfile {
    type Error = anyhow::Error;

    fn try_from(raw: UserRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.user_uid.into(),
            tier: raw.tier.parse()?,
            timezone: raw.timezone.parse().map_err(anyhow::Error::msg)?,
            updated: raw.updated,
        })
    }
}

#[async_trait::async_trait]
impl IUserRepo for PostgresUserRepo {
    async fn save(&self, user: &UserProfile) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users(user_uid, tier, timezone, updated)
            VALUES($1, $2, $3, $4)
            ON CONFLICT (user_uid) DO UPDATE SET
                tier = EXCLUDED.tier,
                timezone = EXCLUDED.timezone,
                updated = EXCLUDED.updated
            "#,
        )
        .bind(user.id.inner_ref())
        .bind(user.tier.as_str())
        .bind(user.timezone.name())
        .bind(user.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> Option<UserProfile> {
        let raw = sqlx::query_as::<_, UserRaw>(
            r#"
            SELECT * FROM users AS u
            WHERE u.user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| error!("Unable to find user {}. Err: {:?}", user_id, e))
        .ok()??;
        UserProfile::try_from(raw)
            .map_err(|e| error!("Unable to read stored user {}. Err: {:?}", user_id, e))
            .ok()
    }
}
