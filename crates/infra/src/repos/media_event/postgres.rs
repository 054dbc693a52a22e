use super::IMediaEventRepo;
use binge_calendar_domain::{EventKind, MediaEvent, Platform, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use std::convert::TryFrom;
use tracing::error;

pub struct PostgresMediaEventRepo {
    pool: PgPool,
}

impl PostgresMediaEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MediaEventRaw {
    event_uid: Uuid,
    title: String,
    description: Option<String>,
    kind: Json<EventKind>,
    start_ts: i64,
    end_ts: Option<i64>,
    timezone: String,
    platforms: Json<Vec<Platform>>,
    poster_url: Option<String>,
    status: String,
    version: i64,
    updated: i64,
}

impl TryFrom<MediaEventRaw> for MediaEvent {
    type Error = anyhow::Error;

    fn try_from(raw: MediaEventRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.event_uid.into(),
            title: raw.title,
            description: raw.description,
            kind: raw.kind.0,
            start_ts: raw.start_ts,
            end_ts: raw.end_ts,
            timezone: raw.timezone.parse().map_err(anyhow::Error::msg)?,
            platforms: raw.platforms.0,
            poster_url: raw.poster_url,
            status: raw.status.parse()?,
            version: raw.version,
            updated: raw.updated,
        })
    }
}

fn to_domain(raw: MediaEventRaw) -> Option<MediaEvent> {
    let event_uid = raw.event_uid;
    MediaEvent::try_from(raw)
        .map_err(|e| error!("Unable to read stored event {}. Err: {:?}", event_uid, e))
        .ok()
}

#[async_trait::async_trait]
impl IMediaEventRepo for PostgresMediaEventRepo {
    async fn insert(&self, e: &MediaEvent) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO media_events
            (event_uid, title, description, kind, start_ts, end_ts, timezone, platforms, poster_url, status, version, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(e.id.inner_ref())
        .bind(&e.title)
        .bind(&e.description)
        .bind(Json(&e.kind))
        .bind(e.start_ts)
        .bind(e.end_ts)
        .bind(e.timezone.name())
        .bind(Json(&e.platforms))
        .bind(&e.poster_url)
        .bind(e.status.as_str())
        .bind(e.version)
        .bind(e.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_if_newer(&self, e: &MediaEvent) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO media_events
            (event_uid, title, description, kind, start_ts, end_ts, timezone, platforms, poster_url, status, version, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (event_uid) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                kind = EXCLUDED.kind,
                start_ts = EXCLUDED.start_ts,
                end_ts = EXCLUDED.end_ts,
                timezone = EXCLUDED.timezone,
                platforms = EXCLUDED.platforms,
                poster_url = EXCLUDED.poster_url,
                status = EXCLUDED.status,
                version = EXCLUDED.version,
                updated = EXCLUDED.updated
            WHERE media_events.version < EXCLUDED.version
            "#,
        )
        .bind(e.id.inner_ref())
        .bind(&e.title)
        .bind(&e.description)
        .bind(Json(&e.kind))
        .bind(e.start_ts)
        .bind(e.end_ts)
        .bind(e.timezone.name())
        .bind(Json(&e.platforms))
        .bind(&e.poster_url)
        .bind(e.status.as_str())
        .bind(e.version)
        .bind(e.updated)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn find(&self, event_id: &ID) -> anyhow::Result<Option<MediaEvent>> {
        let raw = sqlx::query_as::<_, MediaEventRaw>(
            r#"
            SELECT * FROM media_events AS e
            WHERE e.event_uid = $1
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        raw.map(MediaEvent::try_from).transpose()
    }

    async fn find_many(&self, event_ids: &[ID]) -> anyhow::Result<Vec<MediaEvent>> {
        let ids = event_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        let events = sqlx::query_as::<_, MediaEventRaw>(
            r#"
            SELECT * FROM media_events AS e
            WHERE e.event_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(events.into_iter().filter_map(to_domain).collect())
    }

    async fn delete(&self, event_id: &ID) -> Option<MediaEvent> {
        let raw = sqlx::query_as::<_, MediaEventRaw>(
            r#"
            DELETE FROM media_events AS e
            WHERE e.event_uid = $1
            RETURNING *
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| error!("Unable to delete event {}. Err: {:?}", event_id, e))
        .ok()??;
        to_domain(raw)
    }
}
