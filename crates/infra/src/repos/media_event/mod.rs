mod inmemory;
mod postgres;

pub use inmemory::InMemoryMediaEventRepo;
pub use postgres::PostgresMediaEventRepo;

use binge_calendar_domain::{MediaEvent, ID};

#[async_trait::async_trait]
pub trait IMediaEventRepo: Send + Sync {
    async fn insert(&self, e: &MediaEvent) -> anyhow::Result<()>;
    /// Stores the event unless a version at least as new is already stored.
    /// Returns whether the event was written.
    async fn upsert_if_newer(&self, e: &MediaEvent) -> anyhow::Result<bool>;
    async fn find(&self, event_id: &ID) -> anyhow::Result<Option<MediaEvent>>;
    async fn find_many(&self, event_ids: &[ID]) -> anyhow::Result<Vec<MediaEvent>>;
    async fn delete(&self, event_id: &ID) -> Option<MediaEvent>;
}

#[cfg(test)]
mod tests {
    use crate::setup_context;
    use binge_calendar_domain::{EventKind, EventStatus, MediaEvent, Platform};
    use chrono_tz::Tz;

    fn episode() -> MediaEvent {
        MediaEvent {
            id: Default::default(),
            title: "Hello, Ms. Cobel".into(),
            description: None,
            kind: EventKind::TvShow {
                series_name: "Severance".into(),
                season_number: Some(2),
                episode_number: Some(1),
                episode_title: None,
            },
            start_ts: 1000 * 60 * 60,
            end_ts: Some(1000 * 60 * 120),
            timezone: Tz::America__New_York,
            platforms: vec![Platform::Streaming {
                service: "Apple TV+".into(),
            }],
            poster_url: None,
            status: EventStatus::Confirmed,
            version: 1,
            updated: 0,
        }
    }

    #[tokio::test]
    async fn crud() {
        let ctx = setup_context().await;
        let mut event = episode();
        ctx.repos.events.insert(&event).await.expect("To insert event");

        let res = ctx.repos.events.find(&event.id).await.unwrap().expect("To find event");
        assert_eq!(res, event);

        event.start_ts += 1000 * 60 * 60;
        event.version += 1;
        assert!(ctx.repos.events.upsert_if_newer(&event).await.unwrap());
        let res = ctx.repos.events.find(&event.id).await.unwrap().expect("To find event");
        assert_eq!(res.version, 2);
        assert_eq!(res.start_ts, event.start_ts);

        let other = episode();
        ctx.repos.events.insert(&other).await.unwrap();
        let many = ctx
            .repos
            .events
            .find_many(&[event.id.clone(), other.id.clone()])
            .await
            .unwrap();
        assert_eq!(many.len(), 2);

        assert!(ctx.repos.events.delete(&event.id).await.is_some());
        assert!(ctx.repos.events.find(&event.id).await.unwrap().is_none());
        assert!(ctx.repos.events.delete(&event.id).await.is_none());
    }

    #[tokio::test]
    async fn upsert_keeps_the_newest_version() {
        let ctx = setup_context().await;
        let mut event = episode();
        event.version = 3;
        assert!(ctx.repos.events.upsert_if_newer(&event).await.unwrap());

        let mut stale = event.clone();
        stale.version = 2;
        stale.start_ts += 1000 * 60 * 60;
        assert!(!ctx.repos.events.upsert_if_newer(&stale).await.unwrap());
        assert!(!ctx.repos.events.upsert_if_newer(&event).await.unwrap());

        let stored = ctx.repos.events.find(&event.id).await.unwrap().unwrap();
        assert_eq!(stored, event);

        let mut newer = event.clone();
        newer.version = 4;
        newer.status = EventStatus::Cancelled;
        assert!(ctx.repos.events.upsert_if_newer(&newer).await.unwrap());
        let stored = ctx.repos.events.find(&event.id).await.unwrap().unwrap();
        assert_eq!(stored, newer);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_upserts_never_roll_back() {
        let ctx = setup_context().await;
        let base = episode();
        let handles = (1..=8)
            .rev()
            .map(|version| {
                let events = ctx.repos.events.clone();
                let mut event = base.clone();
                event.version = version;
                tokio::spawn(async move { events.upsert_if_newer(&event).await.unwrap() })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = ctx.repos.events.find(&base.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 8);
    }
}
